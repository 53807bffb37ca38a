use tracing::{debug, instrument, warn};

use crate::{decode_payload, Context, HandlerError, Identifier, ResultEnvelope};

/// Stores the payload under its `id`.
///
/// The payload bytes are stored exactly as received, so a later [`read`](crate::read) returns
/// the same text. Nothing is written unless the payload decodes and carries a usable `id`.
#[instrument(level = "debug", skip_all, fields(codec = ctx.codec().name(), len = payload.len()))]
pub fn create(ctx: &Context, payload: &[u8]) -> ResultEnvelope {
    match store(ctx, payload) {
        Ok(id) => {
            debug!(%id, "stored todo");
            ResultEnvelope::Created { id }
        }
        Err(err) => {
            warn!(kind = %err.kind(), error = %err.describe(), "failed to create todo");
            err.into()
        }
    }
}

fn store(ctx: &Context, payload: &[u8]) -> Result<Identifier, HandlerError> {
    let payload = decode_payload(ctx.codec(), payload)?;
    let id = payload.required_id()?;
    ctx.host_services().kv().set(&id.key(), payload.raw())?;
    Ok(id)
}
