use tracing::{debug, instrument, warn};
use wasmcloud_todo_keyvalue::StoreError;

use crate::{decode_payload, Context, HandlerError, ResultEnvelope};

/// Looks up a todo by `id`, or lists all stored identifiers when the payload has no `id`.
///
/// An `id` that is absent or falsy (`null`, `false`, `""`, `0`) selects listing. An unknown
/// `id` is a failure, not an empty success.
#[instrument(level = "debug", skip_all, fields(codec = ctx.codec().name(), len = payload.len()))]
pub fn read(ctx: &Context, payload: &[u8]) -> ResultEnvelope {
    lookup(ctx, payload).unwrap_or_else(|err| {
        warn!(kind = %err.kind(), error = %err.describe(), "failed to read todo");
        err.into()
    })
}

fn lookup(ctx: &Context, payload: &[u8]) -> Result<ResultEnvelope, HandlerError> {
    let payload = decode_payload(ctx.codec(), payload)?;
    let kv = ctx.host_services().kv();
    let Some(id) = payload.optional_id()? else {
        let keys = kv.keys()?;
        debug!(count = keys.len(), "listed todo keys");
        return Ok(ResultEnvelope::Keys { keys });
    };
    let key = id.key();
    let value = kv.get(&key)?.ok_or(StoreError::NotFound(key))?;
    let todo = ctx.codec().decode(&value)?.into_owned();
    debug!(%id, "read todo");
    Ok(ResultEnvelope::Todo { todo })
}
