//! Sequence operations

use crate::args::{callback, flag, opt_arg, opt_int, opt_str, receiver_list};
use crate::registry::{Operation, Registry};
use crate::strings::StrExt;
use anyhow::Result;
use protolib_core::{Group, Map, Value};

/// Extension operations on sequences of values
pub trait ArrayExt {
    /// Uppercase string elements; others pass through
    fn uc(&self) -> Vec<Value>;

    /// Lowercase string elements; others pass through
    fn lc(&self) -> Vec<Value>;

    /// Keep the first occurrence of each element under strict equality.
    /// Containers are never equal to anything, so they are always kept.
    fn unique(&self) -> Vec<Value>;

    /// Trim string elements, optionally dropping falsy elements first
    fn trim(&self, non_empty: bool) -> Vec<Value>;

    /// Flatten nested lists up to `depth` levels
    fn flat(&self, depth: usize) -> Vec<Value>;

    /// The element `n` positions before the last
    fn last_at(&self, n: usize) -> Option<&Value>;

    /// The sole element of a one-element list; `None` for an empty list when `filtered`
    fn unpack(&self, filtered: bool) -> Value;

    /// Fold records into a map from `key_field` to `val_field`, collecting repeats into lists
    fn keyval(&self, key_field: &str, val_field: &str) -> Map;

    fn index_of_obj<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&Value) -> bool;

    /// First map whose `field` strictly equals `value`
    fn item(&self, field: &str, value: &Value) -> Option<&Value>;

    fn contains_item(&self, value: &Value) -> bool;

    /// Consecutive chunks of `n`; zero returns the list unchanged
    fn split_every(&self, n: usize) -> Vec<Value>;

    fn json(&self) -> protolib_core::Result<String>;
}

impl ArrayExt for [Value] {
    fn uc(&self) -> Vec<Value> {
        map_strings(self, <str as StrExt>::uc)
    }

    fn lc(&self) -> Vec<Value> {
        map_strings(self, <str as StrExt>::lc)
    }

    fn unique(&self) -> Vec<Value> {
        let mut out: Vec<Value> = Vec::with_capacity(self.len());
        for v in self {
            if !out.iter().any(|seen| seen.strict_eq(v)) {
                out.push(v.clone());
            }
        }
        out
    }

    fn trim(&self, non_empty: bool) -> Vec<Value> {
        self.iter()
            .filter(|v| !non_empty || v.is_truthy())
            .map(|v| match v {
                Value::String(s) => Value::from(s.trim()),
                other => other.clone(),
            })
            .collect()
    }

    fn flat(&self, depth: usize) -> Vec<Value> {
        let mut out = Vec::with_capacity(self.len());
        flatten_into(self, depth, &mut out);
        out
    }

    fn last_at(&self, n: usize) -> Option<&Value> {
        let i = self.len().checked_sub(n)?.checked_sub(1)?;
        self.get(i)
    }

    fn unpack(&self, filtered: bool) -> Value {
        match self {
            [only] => only.clone(),
            [] if filtered => Value::Nil,
            _ => Value::List(self.to_vec()),
        }
    }

    fn keyval(&self, key_field: &str, val_field: &str) -> Map {
        let mut out = Map::default();
        for record in self.iter().filter_map(|v| v.as_map().ok()) {
            let Some(key) = record.get(key_field) else {
                continue;
            };
            let value = record.get(val_field).cloned().unwrap_or(Value::Nil);
            match out.get_mut(&key.to_display_string()) {
                Some(Value::List(seen)) => seen.push(value),
                Some(existing) => {
                    let first = std::mem::replace(existing, Value::Nil);
                    *existing = Value::List(vec![first, value]);
                }
                None => {
                    out.insert(key.to_display_string(), value);
                }
            }
        }
        out
    }

    fn index_of_obj<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&Value) -> bool,
    {
        self.iter().position(predicate)
    }

    fn item(&self, field: &str, value: &Value) -> Option<&Value> {
        self.iter().find(|v| {
            v.as_map()
                .ok()
                .and_then(|m| m.get(field))
                .is_some_and(|f| f.strict_eq(value))
        })
    }

    fn contains_item(&self, value: &Value) -> bool {
        self.iter().any(|v| v.strict_eq(value))
    }

    fn split_every(&self, n: usize) -> Vec<Value> {
        if n == 0 {
            return self.to_vec();
        }
        self.chunks(n).map(|c| Value::List(c.to_vec())).collect()
    }

    fn json(&self) -> protolib_core::Result<String> {
        Value::List(self.to_vec()).to_json()
    }
}

fn map_strings(items: &[Value], f: fn(&str) -> String) -> Vec<Value> {
    items
        .iter()
        .map(|v| match v {
            Value::String(s) => Value::from(f(s)),
            other => other.clone(),
        })
        .collect()
}

fn flatten_into(items: &[Value], depth: usize, out: &mut Vec<Value>) {
    for v in items {
        match v {
            Value::List(inner) if depth > 0 => flatten_into(inner, depth - 1, out),
            other => out.push(other.clone()),
        }
    }
}

/// Register all array operations
pub fn register(registry: &mut Registry) {
    registry.register_all(vec![
        Operation::pure(Group::Array, "uc", array_uc, 0, Some(0), "Uppercase string elements"),
        Operation::pure(Group::Array, "lc", array_lc, 0, Some(0), "Lowercase string elements"),
        Operation::pure(Group::Array, "unique", array_unique, 0, Some(0), "Remove repeated elements"),
        Operation::pure(Group::Array, "trim", array_trim, 0, Some(1), "Trim string elements"),
        Operation::pure(Group::Array, "flat", array_flat, 0, Some(1), "Flatten nested lists"),
        Operation::pure(Group::Array, "last", array_last, 0, Some(1), "Element N positions from the end"),
        Operation::pure(Group::Array, "unpack", array_unpack, 0, None, "Unwrap a one-element list"),
        Operation::pure(Group::Array, "keyval", array_keyval, 0, Some(2), "Fold records into a map"),
        Operation::pure(Group::Array, "indexOfObj", array_index_of_obj, 1, Some(1), "Index of the first element matching a predicate"),
        Operation::pure(Group::Array, "json", array_json, 0, Some(0), "Serialize as JSON"),
        Operation::pure(Group::Array, "item", array_item, 0, Some(2), "First record whose field equals a value"),
        Operation::pure(Group::Array, "contains", array_contains, 0, Some(1), "Membership test"),
        Operation::pure(Group::Array, "split", array_split, 0, Some(1), "Partition into chunks"),
    ]);
}

fn array_uc(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    Ok(Value::List(receiver_list("array:uc", receiver)?.uc()))
}

fn array_lc(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    Ok(Value::List(receiver_list("array:lc", receiver)?.lc()))
}

fn array_unique(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    Ok(Value::List(receiver_list("array:unique", receiver)?.unique()))
}

fn array_trim(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let items = receiver_list("array:trim", receiver)?;
    Ok(Value::List(items.trim(flag(args, 0))))
}

fn array_flat(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let items = receiver_list("array:flat", receiver)?;
    let depth = opt_int("array:flat", args, 0)?.unwrap_or(1).max(0) as usize;
    Ok(Value::List(items.flat(depth)))
}

fn array_last(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let items = receiver_list("array:last", receiver)?;
    let n = opt_int("array:last", args, 0)?.unwrap_or(0);
    let found = usize::try_from(n).ok().and_then(|n| items.last_at(n));
    Ok(found.cloned().unwrap_or(Value::Nil))
}

fn array_unpack(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let items = receiver_list("array:unpack", receiver)?;
    Ok(items.unpack(!args.is_empty()))
}

fn array_keyval(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let items = receiver_list("array:keyval", receiver)?;
    let key = opt_str("array:keyval", args, 0)?.unwrap_or("k");
    let val = opt_str("array:keyval", args, 1)?.unwrap_or("v");
    Ok(Value::Map(items.keyval(key, val)))
}

fn array_index_of_obj(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let items = receiver_list("array:indexOfObj", receiver)?;
    let Some(predicate) = callback("array:indexOfObj", args, 0)? else {
        anyhow::bail!("array:indexOfObj: missing predicate");
    };

    // A failing predicate aborts the search.
    let mut failure = None;
    let found = items.index_of_obj(|v| match predicate.call(std::slice::from_ref(v)) {
        Ok(result) => result.is_truthy(),
        Err(e) => {
            failure = Some(e);
            true
        }
    });
    if let Some(e) = failure {
        return Err(e.into());
    }
    Ok(found.map(Value::from).unwrap_or(Value::Integer(-1)))
}

fn array_json(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    Ok(Value::from(receiver_list("array:json", receiver)?.json()?))
}

fn array_item(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let items = receiver_list("array:item", receiver)?;
    let (Some(field), Some(value)) = (opt_arg(args, 0), opt_arg(args, 1)) else {
        return Ok(Value::Nil);
    };
    let found = items.item(&field.to_display_string(), value);
    Ok(found.cloned().unwrap_or(Value::Nil))
}

fn array_contains(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let items = receiver_list("array:contains", receiver)?;
    let needle = args.first().unwrap_or(&Value::Nil);
    Ok(Value::Boolean(items.contains_item(needle)))
}

fn array_split(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let items = receiver_list("array:split", receiver)?;
    let n = opt_int("array:split", args, 0)?.unwrap_or(0).max(0) as usize;
    Ok(Value::List(items.split_every(n)))
}
