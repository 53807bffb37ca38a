//! Guest-side handlers of the todo component.
//!
//! The host invokes [`create`] or [`read`] with an invocation [`Context`] carrying its
//! capabilities and the raw payload bytes. Each handler performs one key-value operation and
//! always returns a [`ResultEnvelope`]; failures are reported inside the envelope and never
//! escape to the host.

mod codec;
mod config;
mod context;
mod create;
mod envelope;
mod error;
mod operation;
mod payload;
mod read;

pub use codec::{CodecKind, PayloadCodec, Utf8, Utf8Lossy};
pub use config::{TodoConfig, CONFIG_BUCKET, CONFIG_CODEC, DEFAULT_BUCKET};
pub use context::{Context, HostServices};
pub use create::create;
pub use envelope::{Failure, ResultEnvelope, Status};
pub use error::{ErrorKind, HandlerError};
pub use operation::{Operation, UnknownOperation};
pub use payload::{decode_payload, Identifier, Payload};
pub use read::read;

pub use wasmcloud_todo_keyvalue as keyvalue;
