use serde::ser::SerializeMap as _;
use serde::{Deserialize, Serialize, Serializer};

use crate::{ErrorKind, HandlerError, Identifier};

/// Outcome marker carried by every envelope
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failed,
}

/// Description of a failed invocation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&HandlerError> for Failure {
    fn from(err: &HandlerError) -> Self {
        Self {
            kind: err.kind(),
            message: err.describe(),
        }
    }
}

impl From<HandlerError> for Failure {
    fn from(err: HandlerError) -> Self {
        Self::from(&err)
    }
}

/// Value returned to the host by every handler invocation.
///
/// On the wire only the fields of the active variant are present, next to `status`:
///
/// ```json
/// {"id": "a", "status": "success"}
/// {"keys": ["a", "b"], "status": "success"}
/// {"todo": "{\"id\":\"a\"}", "status": "success"}
/// {"status": "failed", "error": {"kind": "parse", "message": "..."}}
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "WireEnvelope")]
pub enum ResultEnvelope {
    /// A todo was stored under `id`
    Created { id: Identifier },
    /// All stored identifiers
    Keys { keys: Vec<String> },
    /// The stored todo, as text
    Todo { todo: String },
    Failed { error: Failure },
}

impl ResultEnvelope {
    pub fn status(&self) -> Status {
        match self {
            Self::Failed { .. } => Status::Failed,
            _ => Status::Success,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == Status::Success
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }
}

impl From<HandlerError> for ResultEnvelope {
    fn from(err: HandlerError) -> Self {
        Self::Failed {
            error: err.into(),
        }
    }
}

impl Serialize for ResultEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            Self::Created { id } => map.serialize_entry("id", id)?,
            Self::Keys { keys } => map.serialize_entry("keys", keys)?,
            Self::Todo { todo } => map.serialize_entry("todo", todo)?,
            Self::Failed { error } => {
                map.serialize_entry("status", &Status::Failed)?;
                map.serialize_entry("error", error)?;
                return map.end();
            }
        }
        map.serialize_entry("status", &Status::Success)?;
        map.end()
    }
}

#[derive(Deserialize)]
struct WireEnvelope {
    status: Status,
    #[serde(default)]
    id: Option<Identifier>,
    #[serde(default)]
    keys: Option<Vec<String>>,
    #[serde(default)]
    todo: Option<String>,
    #[serde(default)]
    error: Option<Failure>,
}

impl TryFrom<WireEnvelope> for ResultEnvelope {
    type Error = String;

    fn try_from(wire: WireEnvelope) -> Result<Self, Self::Error> {
        match wire {
            WireEnvelope {
                status: Status::Failed,
                error: Some(error),
                ..
            } => Ok(Self::Failed { error }),
            WireEnvelope {
                status: Status::Failed,
                ..
            } => Err("failed envelope without `error`".into()),
            WireEnvelope {
                status: Status::Success,
                id: Some(id),
                keys: None,
                todo: None,
                ..
            } => Ok(Self::Created { id }),
            WireEnvelope {
                status: Status::Success,
                id: None,
                keys: Some(keys),
                todo: None,
                ..
            } => Ok(Self::Keys { keys }),
            WireEnvelope {
                status: Status::Success,
                id: None,
                keys: None,
                todo: Some(todo),
                ..
            } => Ok(Self::Todo { todo }),
            WireEnvelope {
                status: Status::Success,
                ..
            } => Err("success envelope must carry exactly one of `id`, `keys` or `todo`".into()),
        }
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;
    use wasmcloud_todo_keyvalue::StoreError;

    use super::*;

    #[test]
    fn created_wire_form() {
        let envelope = ResultEnvelope::Created {
            id: Identifier::from("a"),
        };
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "id": "a", "status": "success" })
        );
        assert!(envelope.is_success());
    }

    #[test]
    fn numeric_id_keeps_its_type() {
        let envelope: ResultEnvelope =
            serde_json::from_value(json!({ "id": 7, "status": "success" })).unwrap();
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "id": 7, "status": "success" })
        );
    }

    #[test]
    fn failure_wire_form() {
        let envelope = ResultEnvelope::from(HandlerError::Store(StoreError::NotFound(
            "missing".into(),
        )));
        assert_eq!(envelope.status(), Status::Failed);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "status": "failed",
                "error": {
                    "kind": "store",
                    "message": "no value stored under key `missing`",
                },
            })
        );
    }

    #[test]
    fn parse_wire_forms() {
        let keys: ResultEnvelope =
            serde_json::from_str(r#"{"keys":["a","b"],"status":"success"}"#).unwrap();
        assert_eq!(
            keys,
            ResultEnvelope::Keys {
                keys: vec!["a".into(), "b".into()]
            }
        );
        let todo: ResultEnvelope =
            serde_json::from_str(r#"{"todo":"{}","status":"success"}"#).unwrap();
        assert_eq!(todo, ResultEnvelope::Todo { todo: "{}".into() });
    }

    #[test]
    fn reject_ambiguous_wire_forms() {
        assert!(serde_json::from_str::<ResultEnvelope>(r#"{"status":"failed"}"#).is_err());
        assert!(serde_json::from_str::<ResultEnvelope>(r#"{"status":"success"}"#).is_err());
        assert!(serde_json::from_str::<ResultEnvelope>(
            r#"{"id":"a","keys":[],"status":"success"}"#
        )
        .is_err());
    }
}
