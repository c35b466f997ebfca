//! Operation groups and effect tags

use crate::value::Value;
use std::fmt;
use std::str::FromStr;

/// The built-in value kinds that operations can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Group {
    String,
    Array,
    Object,
    Error,
}

impl Group {
    /// All groups in registry order
    pub const ALL: [Group; 4] = [Group::String, Group::Array, Group::Object, Group::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            Group::String => "string",
            Group::Array => "array",
            Group::Object => "object",
            Group::Error => "error",
        }
    }

    /// The group whose prototype serves a value, if any
    pub fn of(value: &Value) -> Option<Group> {
        match value {
            Value::String(_) => Some(Group::String),
            Value::List(_) => Some(Group::Array),
            Value::Map(_) => Some(Group::Object),
            Value::Error { .. } => Some(Group::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-sensitive match; near misses are not corrected.
impl FromStr for Group {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Group::String),
            "array" => Ok(Group::Array),
            "object" => Ok(Group::Object),
            "error" => Ok(Group::Error),
            _ => Err(()),
        }
    }
}

/// Side effects an operation may perform beyond computing its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Mutates its receiver in place
    Mutation,
    /// Touches the host filesystem
    IO,
}
