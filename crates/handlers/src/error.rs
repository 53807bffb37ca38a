use core::fmt;

use serde::{Deserialize, Serialize};
use wasmcloud_todo_keyvalue::StoreError;

/// Every way a handler invocation can fail
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Bytes are not valid UTF-8 text
    #[error("invalid UTF-8 text")]
    Decode(#[from] core::str::Utf8Error),
    /// Text is not valid JSON
    #[error("invalid JSON")]
    Parse(#[from] serde_json::Error),
    /// Payload is well-formed JSON, but lacks a usable identifier
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl HandlerError {
    pub fn invalid_payload(reason: impl Into<String>) -> Self {
        Self::InvalidPayload(reason.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode(..) => ErrorKind::Decode,
            Self::Parse(..) => ErrorKind::Parse,
            Self::InvalidPayload(..) => ErrorKind::InvalidPayload,
            Self::Store(..) => ErrorKind::Store,
        }
    }

    /// Renders the error followed by its chain of sources, separated by `: `
    pub fn describe(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            out.push_str(": ");
            out.push_str(&err.to_string());
            source = err.source();
        }
        out
    }
}

/// Error kind reported in a failure envelope
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Decode,
    Parse,
    InvalidPayload,
    Store,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Decode => "decode",
            Self::Parse => "parse",
            Self::InvalidPayload => "invalid_payload",
            Self::Store => "store",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
