use core::fmt;
use core::str::FromStr;

use std::borrow::Cow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::HandlerError;

/// Conversion of raw bytes into text, applied to payloads and to stored records
pub trait PayloadCodec {
    /// Name used in logs and configuration
    fn name(&self) -> &'static str;

    /// Decodes `bytes` as text, failing with [`HandlerError::Decode`]
    fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>, HandlerError>;
}

/// Strict UTF-8, rejecting any invalid sequence
#[derive(Clone, Copy, Debug, Default)]
pub struct Utf8;

impl PayloadCodec for Utf8 {
    fn name(&self) -> &'static str {
        CodecKind::Utf8.as_str()
    }

    fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>, HandlerError> {
        let text = core::str::from_utf8(bytes)?;
        Ok(Cow::Borrowed(text))
    }
}

/// UTF-8 replacing invalid sequences with U+FFFD, never fails
#[derive(Clone, Copy, Debug, Default)]
pub struct Utf8Lossy;

impl PayloadCodec for Utf8Lossy {
    fn name(&self) -> &'static str {
        CodecKind::Utf8Lossy.as_str()
    }

    fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>, HandlerError> {
        Ok(String::from_utf8_lossy(bytes))
    }
}

/// Configurable selection of a built-in [`PayloadCodec`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodecKind {
    #[default]
    Utf8,
    Utf8Lossy,
}

impl CodecKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Utf8 => "utf8",
            Self::Utf8Lossy => "utf8-lossy",
        }
    }

    pub fn codec(self) -> Arc<dyn PayloadCodec + Send + Sync> {
        match self {
            Self::Utf8 => Arc::new(Utf8),
            Self::Utf8Lossy => Arc::new(Utf8Lossy),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodecKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "utf8-lossy" | "utf8_lossy" | "utf-8-lossy" => Ok(Self::Utf8Lossy),
            other => anyhow::bail!("unknown codec `{other}`, expected `utf8` or `utf8-lossy`"),
        }
    }
}
