//! Runtime value representation

pub mod error;
mod json;

pub use error::{ValueError, ValueResult};

use indexmap::IndexMap;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;
use std::sync::Arc;

/// Insertion-ordered key/value mapping
pub type Map = IndexMap<String, Value, BuildHasherDefault<FxHasher>>;

/// Signature of a callback carried inside a value
pub type NativeFn = dyn Fn(&[Value]) -> crate::Result<Value> + Send + Sync;

/// Runtime value types
#[derive(Clone)]
pub enum Value {
    /// Absent / null value
    Nil,

    /// Boolean value
    Boolean(bool),

    /// Integer value
    Integer(i64),

    /// Floating point value
    Float(f64),

    /// Text value
    String(String),

    /// Ordered sequence
    List(Vec<Value>),

    /// Key/value mapping
    Map(Map),

    /// Raised error value
    Error {
        kind: String,
        message: String,
        stack_trace: Option<Vec<String>>,
    },

    /// Native function, used to pass callbacks to operations
    NativeFunction { name: String, function: Arc<NativeFn> },
}

impl Value {
    /// Wrap a closure as a callable value
    pub fn native<F>(name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[Value]) -> crate::Result<Value> + Send + Sync + 'static,
    {
        Value::NativeFunction {
            name: name.into(),
            function: Arc::new(function),
        }
    }

    /// Build an error value with no stack frames
    pub fn error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Value::Error {
            kind: kind.into(),
            message: message.into(),
            stack_trace: None,
        }
    }

    /// Convert a Rust error into an error value; the source chain becomes the stack.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut frames = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            frames.push(cause.to_string());
            source = cause.source();
        }
        Value::Error {
            kind: "Error".to_string(),
            message: err.to_string(),
            stack_trace: Some(frames),
        }
    }

    /// Empty mapping
    pub fn map() -> Self {
        Value::Map(Map::default())
    }

    /// Type checking predicates
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error { .. })
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::NativeFunction { .. })
    }

    /// Mappings and sequences
    pub fn is_container(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_))
    }

    /// Type conversion helpers
    pub fn as_integer(&self) -> ValueResult<i64> {
        match self {
            Value::Integer(n) => Ok(*n),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(*f as i64),
            _ => Err(ValueError::TypeError {
                expected: "integer",
                actual: self.type_name(),
            }),
        }
    }

    pub fn as_number(&self) -> ValueResult<f64> {
        match self {
            Value::Integer(n) => Ok(*n as f64),
            Value::Float(f) => Ok(*f),
            _ => Err(ValueError::TypeError {
                expected: "number",
                actual: self.type_name(),
            }),
        }
    }

    pub fn as_string(&self) -> ValueResult<&str> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(ValueError::TypeError {
                expected: "string",
                actual: self.type_name(),
            }),
        }
    }

    pub fn as_list(&self) -> ValueResult<&[Value]> {
        match self {
            Value::List(items) => Ok(items),
            _ => Err(ValueError::TypeError {
                expected: "list",
                actual: self.type_name(),
            }),
        }
    }

    pub fn as_map(&self) -> ValueResult<&Map> {
        match self {
            Value::Map(map) => Ok(map),
            _ => Err(ValueError::TypeError {
                expected: "map",
                actual: self.type_name(),
            }),
        }
    }

    /// Get type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Error { .. } => "error",
            Value::NativeFunction { .. } => "native-function",
        }
    }

    /// Check if value is truthy: nil, false, zero, NaN and "" are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Boolean(b) => *b,
            Value::Integer(n) => *n != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Shallow identity-style equality.
    ///
    /// Primitives compare by value. Lists, maps and errors are distinct
    /// objects and never equal anything, even a structurally identical copy.
    /// Native functions compare by pointer.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
                numeric_eq(self, other)
            }
            (
                Value::NativeFunction { function: a, .. },
                Value::NativeFunction { function: b, .. },
            ) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Invoke a native function value
    pub fn call(&self, args: &[Value]) -> crate::Result<Value> {
        match self {
            Value::NativeFunction { function, .. } => function(args),
            other => Err(crate::Error::Type(format!(
                "{} is not callable",
                other.type_name()
            ))),
        }
    }

    /// The string form used when a value is interpolated into text
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }
}

fn numeric_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x == y,
        _ => match (a.as_number(), b.as_number()) {
            (Ok(x), Ok(y)) => x == y,
            _ => false,
        },
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        let sign = if f > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{:.0}", f)
    } else {
        format!("{}", f)
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Boolean(b) => write!(f, "Boolean({})", b),
            Value::Integer(n) => write!(f, "Integer({})", n),
            Value::Float(x) => write!(f, "Float({})", x),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::List(items) => f.debug_list().entries(items).finish(),
            Value::Map(map) => f.debug_map().entries(map.iter()).finish(),
            Value::Error { kind, message, .. } => write!(f, "Error({}: {})", kind, message),
            Value::NativeFunction { name, .. } => {
                f.debug_struct("NativeFunction").field("name", name).finish()
            }
        }
    }
}

/// Structural equality, used by tests and assertions; operations that need
/// identity semantics use [`Value::strict_eq`].
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
                numeric_eq(self, other)
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
            }
            (
                Value::Error {
                    kind: k1,
                    message: m1,
                    ..
                },
                Value::Error {
                    kind: k2,
                    message: m2,
                    ..
                },
            ) => k1 == k2 && m1 == m2,
            (
                Value::NativeFunction { function: a, .. },
                Value::NativeFunction { function: b, .. },
            ) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    if !item.is_nil() {
                        write!(f, "{}", item)?;
                    }
                }
                Ok(())
            }
            Value::Map(_) => write!(f, "[object Object]"),
            Value::Error { kind, message, .. } => write!(f, "{}: {}", kind, message),
            Value::NativeFunction { name, .. } => write!(f, "function {}() {{ [native code] }}", name),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n as i64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Integer(n as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Nil)
    }
}

#[cfg(test)]
#[path = "../value_tests.rs"]
mod tests;
