use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::{HandlerError, PayloadCodec};

const ID_FIELD: &str = "id";

/// Identifier of a todo, as carried in the payload's `id` field
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    String(String),
    Number(Number),
}

impl Identifier {
    /// Key the todo is stored under. Numbers use their canonical text, so `42`, `42.0`, `4.2e1`
    /// and `"42"` share a key.
    pub fn key(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Number(n) => number_key(n),
        }
    }
}

/// Whole floats below this magnitude are written without a fraction or exponent
const MAX_PLAIN_FLOAT: f64 = 1e21;

fn number_key(n: &Number) -> String {
    match n.as_f64().filter(|_| n.is_f64()) {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.fract() == 0.0 && f.abs() < MAX_PLAIN_FLOAT => format!("{f:.0}"),
        _ => n.to_string(),
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Number(n) => fmt::Display::fmt(n, f),
        }
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<u64> for Identifier {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

/// A decoded payload, borrowing the raw bytes it was decoded from
#[derive(Debug)]
pub struct Payload<'a> {
    raw: &'a [u8],
    fields: Map<String, Value>,
}

/// Decodes `raw` into text using `codec` and parses it as a JSON object
pub fn decode_payload<'a>(
    codec: &dyn PayloadCodec,
    raw: &'a [u8],
) -> Result<Payload<'a>, HandlerError> {
    let text = codec.decode(raw)?;
    match serde_json::from_str(&text)? {
        Value::Object(fields) => Ok(Payload { raw, fields }),
        other => Err(HandlerError::invalid_payload(format!(
            "expected a JSON object, got {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(..) => "a boolean",
        Value::Number(..) => "a number",
        Value::String(..) => "a string",
        Value::Array(..) => "an array",
        Value::Object(..) => "an object",
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => true,
    }
}

fn identifier(value: &Value) -> Result<Identifier, HandlerError> {
    match value {
        Value::String(s) if s.is_empty() => Err(HandlerError::invalid_payload("`id` is empty")),
        Value::String(s) => Ok(Identifier::String(s.clone())),
        Value::Number(n) => Ok(Identifier::Number(n.clone())),
        Value::Null => Err(HandlerError::invalid_payload("`id` is null")),
        other => Err(HandlerError::invalid_payload(format!(
            "`id` must be a string or a number, got {}",
            json_type(other)
        ))),
    }
}

impl<'a> Payload<'a> {
    /// The exact bytes the payload was decoded from
    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Identifier a todo is created under; it must be present and non-empty
    pub fn required_id(&self) -> Result<Identifier, HandlerError> {
        let id = self
            .fields
            .get(ID_FIELD)
            .ok_or_else(|| HandlerError::invalid_payload("missing `id`"))?;
        identifier(id)
    }

    /// Identifier a todo is looked up by. Absent or falsy values (`null`, `false`, `""`, `0`)
    /// select listing instead and yield `None`.
    pub fn optional_id(&self) -> Result<Option<Identifier>, HandlerError> {
        match self.fields.get(ID_FIELD) {
            Some(id) if is_truthy(id) => identifier(id).map(Some),
            _ => Ok(None),
        }
    }
}
