use core::fmt;
use core::str::FromStr;

use crate::{create, read, Context, ResultEnvelope};

/// Handler the host can invoke by name
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Read,
}

/// Returned when parsing an [`Operation`] from a name no handler is exported under
#[derive(Debug, thiserror::Error)]
#[error("unknown operation `{0}`, expected `create` or `read`")]
pub struct UnknownOperation(pub String);

impl Operation {
    pub const ALL: [Operation; 2] = [Operation::Create, Operation::Read];

    pub fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
        }
    }

    /// Invokes the handler for this operation
    pub fn invoke(self, ctx: &Context, payload: &[u8]) -> ResultEnvelope {
        match self {
            Self::Create => create(ctx, payload),
            Self::Read => read(ctx, payload),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}
