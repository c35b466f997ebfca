//! Error value operations

use crate::registry::{Operation, Registry};
use anyhow::{anyhow, Result};
use protolib_core::{Group, Map, Value};

/// Plain-data views of an error
pub trait ErrorExt {
    /// `{stack, message}`
    fn obj(&self) -> Map;

    /// `obj()` serialized as JSON
    fn json(&self) -> String {
        Value::Map(self.obj()).to_json_safe()
    }
}

/// Non-error values have no attributes to report.
impl ErrorExt for Value {
    fn obj(&self) -> Map {
        self.error_object().unwrap_or_default()
    }
}

impl ErrorExt for anyhow::Error {
    fn obj(&self) -> Map {
        Value::from_error(&**self).obj()
    }
}

pub fn register(registry: &mut Registry) {
    registry.register_all(vec![
        Operation::pure(Group::Error, "obj", error_obj, 0, Some(0), "Error attributes as a mapping"),
        Operation::pure(Group::Error, "json", error_json, 0, Some(0), "Error attributes as JSON"),
    ]);
}

fn error_obj(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    receiver
        .error_object()
        .map(Value::Map)
        .ok_or_else(|| anyhow!("error:obj: expected error, got {}", receiver.type_name()))
}

fn error_json(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    if !receiver.is_error() {
        anyhow::bail!("error:json: expected error, got {}", receiver.type_name());
    }
    Ok(Value::from(ErrorExt::json(&*receiver)))
}
