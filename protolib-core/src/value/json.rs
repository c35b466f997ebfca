//! JSON conversion for runtime values

use super::{Map, Value};
use crate::Result;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Largest float that still converts to an integer without loss
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl Value {
    /// Parse JSON text into a value
    pub fn from_json_str(text: &str) -> Result<Value> {
        let parsed: serde_json::Value = serde_json::from_str(text)?;
        Ok(Value::from(parsed))
    }

    /// Standard serialization; fails on native functions
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&Json {
            value: self,
            safe: false,
        })?)
    }

    /// Lenient serialization that drops anything JSON cannot represent
    pub fn to_json_safe(&self) -> String {
        serde_json::to_string(&Json {
            value: self,
            safe: true,
        })
        .unwrap_or_else(|_| "null".to_string())
    }

    /// The `{stack, message}` mapping of an error value
    pub fn error_object(&self) -> Option<Map> {
        match self {
            Value::Error {
                kind,
                message,
                stack_trace,
            } => {
                let mut stack = format!("{}: {}", kind, message);
                for frame in stack_trace.iter().flatten() {
                    stack.push_str("\n    at ");
                    stack.push_str(frame);
                }
                let mut obj = Map::default();
                obj.insert("stack".to_string(), Value::String(stack));
                obj.insert("message".to_string(), Value::String(message.clone()));
                Some(obj)
            }
            _ => None,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => Value::Map(
                obj.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        Json {
            value: self,
            safe: false,
        }
        .serialize(serializer)
    }
}

struct Json<'a> {
    value: &'a Value,
    safe: bool,
}

impl Json<'_> {
    fn nested<'b>(&self, value: &'b Value) -> Json<'b> {
        Json {
            value,
            safe: self.safe,
        }
    }

    fn serialize_entries<S: Serializer>(
        &self,
        map: &Map,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_map(None)?;
        for (key, value) in map {
            if self.safe && value.is_callable() {
                continue;
            }
            out.serialize_entry(key, &self.nested(value))?;
        }
        out.end()
    }
}

impl Serialize for Json<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.value {
            Value::Nil => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::Float(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*f as i64)
            }
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    if self.safe && item.is_callable() {
                        seq.serialize_element(&())?;
                    } else {
                        seq.serialize_element(&self.nested(item))?;
                    }
                }
                seq.end()
            }
            Value::Map(map) => self.serialize_entries(map, serializer),
            err @ Value::Error { .. } => match err.error_object() {
                Some(obj) => self.serialize_entries(&obj, serializer),
                None => serializer.serialize_unit(),
            },
            Value::NativeFunction { name, .. } => {
                if self.safe {
                    serializer.serialize_unit()
                } else {
                    Err(S::Error::custom(format!(
                        "cannot serialize native function '{}'",
                        name
                    )))
                }
            }
        }
    }
}
