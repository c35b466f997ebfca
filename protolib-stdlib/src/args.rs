//! Argument extraction shared by the dynamic adapters

use crate::strings::StrExt;
use anyhow::{anyhow, Result};
use protolib_core::{Map, Value};

pub(crate) fn receiver_str<'a>(op: &str, receiver: &'a Value) -> Result<&'a str> {
    match receiver {
        Value::String(s) => Ok(s),
        other => Err(anyhow!("{}: expected string, got {}", op, other.type_name())),
    }
}

pub(crate) fn receiver_list<'a>(op: &str, receiver: &'a Value) -> Result<&'a [Value]> {
    match receiver {
        Value::List(items) => Ok(items),
        other => Err(anyhow!("{}: expected list, got {}", op, other.type_name())),
    }
}

pub(crate) fn receiver_map<'a>(op: &str, receiver: &'a Value) -> Result<&'a Map> {
    match receiver {
        Value::Map(map) => Ok(map),
        other => Err(anyhow!("{}: expected map, got {}", op, other.type_name())),
    }
}

pub(crate) fn receiver_map_mut<'a>(op: &str, receiver: &'a mut Value) -> Result<&'a mut Map> {
    match receiver {
        Value::Map(map) => Ok(map),
        other => Err(anyhow!("{}: expected map, got {}", op, other.type_name())),
    }
}

/// Missing and nil arguments are both absent
pub(crate) fn opt_arg(args: &[Value], index: usize) -> Option<&Value> {
    args.get(index).filter(|v| !v.is_nil())
}

pub(crate) fn opt_str<'a>(op: &str, args: &'a [Value], index: usize) -> Result<Option<&'a str>> {
    match opt_arg(args, index) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(anyhow!(
            "{}: expected string argument {}, got {}",
            op,
            index + 1,
            other.type_name()
        )),
    }
}

pub(crate) fn req_str<'a>(op: &str, args: &'a [Value], index: usize) -> Result<&'a str> {
    opt_str(op, args, index)?.ok_or_else(|| anyhow!("{}: missing string argument {}", op, index + 1))
}

pub(crate) fn opt_int(op: &str, args: &[Value], index: usize) -> Result<Option<i64>> {
    match opt_arg(args, index) {
        None => Ok(None),
        Some(v) => v
            .as_integer()
            .map(Some)
            .map_err(|e| anyhow!("{}: argument {}: {}", op, index + 1, e)),
    }
}

pub(crate) fn req_int(op: &str, args: &[Value], index: usize) -> Result<i64> {
    opt_int(op, args, index)?.ok_or_else(|| anyhow!("{}: missing integer argument {}", op, index + 1))
}

pub(crate) fn opt_map<'a>(op: &str, args: &'a [Value], index: usize) -> Result<Option<&'a Map>> {
    match opt_arg(args, index) {
        None => Ok(None),
        Some(Value::Map(map)) => Ok(Some(map)),
        Some(other) => Err(anyhow!(
            "{}: expected map argument {}, got {}",
            op,
            index + 1,
            other.type_name()
        )),
    }
}

pub(crate) fn req_map<'a>(op: &str, args: &'a [Value], index: usize) -> Result<&'a Map> {
    opt_map(op, args, index)?.ok_or_else(|| anyhow!("{}: missing map argument {}", op, index + 1))
}

pub(crate) fn flag(args: &[Value], index: usize) -> bool {
    args.get(index).map(Value::is_truthy).unwrap_or(false)
}

pub(crate) fn callback<'a>(op: &str, args: &'a [Value], index: usize) -> Result<Option<&'a Value>> {
    match opt_arg(args, index) {
        None => Ok(None),
        Some(f) if f.is_callable() => Ok(Some(f)),
        Some(other) => Err(anyhow!(
            "{}: expected function argument {}, got {}",
            op,
            index + 1,
            other.type_name()
        )),
    }
}

/// Key lists arrive as variadic names, one list, or one delimiter-split string.
pub(crate) fn key_list(args: &[Value]) -> Vec<String> {
    match args {
        [Value::String(s)] => s.arr(None),
        [Value::List(items)] => items.iter().map(Value::to_display_string).collect(),
        _ => args
            .iter()
            .filter(|v| !v.is_nil())
            .map(Value::to_display_string)
            .collect(),
    }
}
