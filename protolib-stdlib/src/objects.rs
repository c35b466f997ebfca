//! Mapping operations
//!
//! Operations named with a trailing `p` (`mvp`, `rmp`) return a new mapping;
//! their plain counterparts (`mv`, `rm`) and `assign`, `setpath`, `uc`, `lc`
//! change the receiver in place.

use crate::args::{callback, flag, key_list, opt_arg, opt_map, opt_str, receiver_map, receiver_map_mut, req_map, req_str};
use crate::arrays::ArrayExt;
use crate::registry::{Operation, Registry};
use crate::strings::StrExt;
use anyhow::{anyhow, Result};
use protolib_core::{Group, Map, Value};

/// Extension operations on mappings
pub trait ObjectExt {
    /// Values in key order
    fn vals(&self) -> Vec<Value>;

    /// Call `f` with each value in key order
    fn each_val<F>(&self, f: F)
    where
        F: FnMut(&Value);

    /// Uppercase the values at `keys`, or every value when `keys` is empty
    fn uc(&mut self, keys: &[String]);

    /// Lowercase the values at `keys`, or every value when `keys` is empty
    fn lc(&mut self, keys: &[String]);

    /// A new mapping holding only the listed keys that exist
    fn pick(&self, keys: &[String]) -> Map;

    /// Fold over the keys with a mutable accumulator
    fn fold_keys<A, F>(&self, acc: A, f: F) -> A
    where
        F: FnMut(&Map, &str, &mut A);

    /// `{key_field: k, val_field: v}` records in key order
    fn keyval(&self, key_field: &str, val_field: &str) -> Vec<Value>;

    /// `key<ks>value` lines joined by `rs`
    fn keyval_text(&self, ks: &str, rs: &str) -> String;

    /// Merge into a new mapping; later sources win
    fn concat(&self, sources: &[&Map]) -> Map;

    /// Merge into the receiver; later sources win
    fn assign(&mut self, sources: &[&Map]);

    /// Rename keys in place; a falsy new name deletes the key
    fn mv(&mut self, renames: &Map);

    /// Rename keys into a new mapping, keeping key order
    fn mvp(&self, renames: &Map) -> Map;

    fn rm(&mut self, keys: &[String]);

    fn rmp(&self, keys: &[String]) -> Map;

    /// Receiver keys absent from `other`
    fn not_in(&self, other: &Map) -> Vec<String>;

    /// Value at a `/` or `.` separated path
    fn getpath(&self, path: &str) -> Option<&Value>;

    /// Assign at a `/` or `.` separated path, creating intermediate mappings
    fn setpath(&mut self, path: &str, value: Value);

    fn json(&self, safe: bool) -> protolib_core::Result<String>;
}

impl ObjectExt for Map {
    fn vals(&self) -> Vec<Value> {
        self.values().cloned().collect()
    }

    fn each_val<F>(&self, f: F)
    where
        F: FnMut(&Value),
    {
        self.values().for_each(f);
    }

    fn uc(&mut self, keys: &[String]) {
        convert_case(self, keys, |v| match v {
            Value::String(s) => Value::from(s.uc()),
            Value::List(items) => Value::List(items.uc()),
            other => other.clone(),
        });
    }

    fn lc(&mut self, keys: &[String]) {
        convert_case(self, keys, |v| match v {
            Value::String(s) => Value::from(s.lc()),
            Value::List(items) => Value::List(items.lc()),
            other => other.clone(),
        });
    }

    fn pick(&self, keys: &[String]) -> Map {
        keys.iter()
            .filter_map(|k| self.get(k).map(|v| (k.clone(), v.clone())))
            .collect()
    }

    fn fold_keys<A, F>(&self, mut acc: A, mut f: F) -> A
    where
        F: FnMut(&Map, &str, &mut A),
    {
        for key in self.keys() {
            f(self, key, &mut acc);
        }
        acc
    }

    fn keyval(&self, key_field: &str, val_field: &str) -> Vec<Value> {
        self.iter()
            .map(|(k, v)| {
                let mut record = Map::default();
                record.insert(key_field.to_string(), Value::from(k.as_str()));
                record.insert(val_field.to_string(), v.clone());
                Value::Map(record)
            })
            .collect()
    }

    fn keyval_text(&self, ks: &str, rs: &str) -> String {
        self.iter()
            .map(|(k, v)| format!("{}{}{}", k, ks, v.to_display_string()))
            .collect::<Vec<_>>()
            .join(rs)
    }

    fn concat(&self, sources: &[&Map]) -> Map {
        let mut out = self.clone();
        out.assign(sources);
        out
    }

    fn assign(&mut self, sources: &[&Map]) {
        for source in sources {
            self.extend(source.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }

    fn mv(&mut self, renames: &Map) {
        for (from, to) in renames {
            let Some(value) = self.shift_remove(from) else {
                continue;
            };
            if to.is_truthy() {
                self.insert(to.to_display_string(), value);
            }
        }
    }

    fn mvp(&self, renames: &Map) -> Map {
        let mut out = Map::default();
        for (key, value) in self {
            match renames.get(key) {
                Some(to) if to.is_truthy() => {
                    out.insert(to.to_display_string(), value.clone());
                }
                Some(_) => {}
                None => {
                    out.insert(key.clone(), value.clone());
                }
            }
        }
        out
    }

    fn rm(&mut self, keys: &[String]) {
        for key in keys {
            self.shift_remove(key);
        }
    }

    fn rmp(&self, keys: &[String]) -> Map {
        let mut out = self.clone();
        out.rm(keys);
        out
    }

    fn not_in(&self, other: &Map) -> Vec<String> {
        self.keys()
            .filter(|k| !other.contains_key(*k))
            .cloned()
            .collect()
    }

    fn getpath(&self, path: &str) -> Option<&Value> {
        let segments = path_segments(path);
        let (last, parents) = segments.split_last()?;
        let mut current = self;
        for segment in parents {
            current = current.get(*segment)?.as_map().ok()?;
        }
        current.get(*last)
    }

    fn setpath(&mut self, path: &str, value: Value) {
        let segments = path_segments(path);
        let Some((last, parents)) = segments.split_last() else {
            return;
        };
        let mut current = self;
        for segment in parents {
            let slot = current
                .entry(segment.to_string())
                .or_insert_with(Value::map);
            if !slot.is_map() {
                *slot = Value::map();
            }
            current = match slot {
                Value::Map(inner) => inner,
                _ => return,
            };
        }
        current.insert(last.to_string(), value);
    }

    fn json(&self, safe: bool) -> protolib_core::Result<String> {
        let value = Value::Map(self.clone());
        if safe {
            Ok(value.to_json_safe())
        } else {
            value.to_json()
        }
    }
}

fn convert_case(map: &mut Map, keys: &[String], f: impl Fn(&Value) -> Value) {
    if keys.is_empty() {
        map.values_mut().for_each(|v| *v = f(v));
        return;
    }
    for key in keys {
        if let Some(v) = map.get_mut(key) {
            *v = f(v);
        }
    }
}

fn path_segments(path: &str) -> Vec<&str> {
    path.split(['/', '.']).collect()
}

/// Register all object operations
pub fn register(registry: &mut Registry) {
    registry.register_all(vec![
        // Queries
        Operation::pure(Group::Object, "isEmpty", object_is_empty, 0, Some(0), "Check for no keys"),
        Operation::pure(Group::Object, "keys", object_keys, 0, Some(0), "Keys in insertion order"),
        Operation::pure(Group::Object, "vals", object_vals, 0, Some(1), "Values, or call a function with each"),
        Operation::pure(Group::Object, "slice", object_slice, 1, None, "Copy only the named keys"),
        Operation::pure(Group::Object, "notIn", object_not_in, 1, Some(1), "Keys absent from another mapping"),
        Operation::pure(Group::Object, "getpath", object_getpath, 1, Some(1), "Value at a nested path"),

        // Iteration
        Operation::pure(Group::Object, "map", object_map, 1, Some(2), "Fold over keys"),
        Operation::pure(Group::Object, "each", object_each, 1, Some(1), "Call a function with each key"),

        // Conversion
        Operation::pure(Group::Object, "keyval", object_keyval, 0, Some(2), "Convert to key/value records"),
        Operation::pure(Group::Object, "keyvalText", object_keyval_text, 0, Some(2), "Serialize as key=value lines"),
        Operation::pure(Group::Object, "json", object_json, 0, Some(1), "Serialize as JSON"),

        // Merging and renaming
        Operation::pure(Group::Object, "concat", object_concat, 0, None, "Merge into a new mapping"),
        Operation::mutating(Group::Object, "assign", object_assign, 0, None, "Merge into this mapping"),
        Operation::mutating(Group::Object, "mv", object_mv, 1, Some(1), "Rename keys in place"),
        Operation::pure(Group::Object, "mvp", object_mvp, 1, Some(1), "Rename keys into a new mapping"),
        Operation::mutating(Group::Object, "rm", object_rm, 0, None, "Delete keys in place"),
        Operation::pure(Group::Object, "rmp", object_rmp, 0, None, "Copy without the given keys"),
        Operation::mutating(Group::Object, "setpath", object_setpath, 2, Some(2), "Assign at a nested path"),

        // Case
        Operation::mutating(Group::Object, "uc", object_uc, 0, None, "Uppercase values in place"),
        Operation::mutating(Group::Object, "lc", object_lc, 0, None, "Lowercase values in place"),
    ]);
}

fn object_is_empty(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    Ok(Value::Boolean(receiver_map("object:isEmpty", receiver)?.is_empty()))
}

fn object_keys(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    let map = receiver_map("object:keys", receiver)?;
    Ok(Value::List(map.keys().map(|k| Value::from(k.as_str())).collect()))
}

fn object_vals(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let map = receiver_map("object:vals", receiver)?;
    match callback("object:vals", args, 0)? {
        Some(f) => {
            for value in map.values() {
                f.call(std::slice::from_ref(value))?;
            }
            Ok(Value::Nil)
        }
        None => Ok(Value::List(map.vals())),
    }
}

fn object_slice(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let map = receiver_map("object:slice", receiver)?;
    Ok(Value::Map(map.pick(&key_list(args))))
}

fn object_not_in(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let map = receiver_map("object:notIn", receiver)?;
    let other = req_map("object:notIn", args, 0)?;
    Ok(Value::List(map.not_in(other).into_iter().map(Value::from).collect()))
}

fn object_getpath(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let map = receiver_map("object:getpath", receiver)?;
    let path = req_str("object:getpath", args, 0)?;
    Ok(map.getpath(path).cloned().unwrap_or(Value::Nil))
}

fn object_map(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let map = receiver_map("object:map", receiver)?;
    let Some(f) = callback("object:map", args, 0)? else {
        anyhow::bail!("object:map: missing function");
    };
    let seed = opt_arg(args, 1).cloned().unwrap_or_else(Value::map);

    // The callback sees the accumulator by value; a non-nil return replaces it.
    map.fold_keys(Ok(seed), |map, key, acc: &mut Result<Value>| {
        let Ok(current) = acc else {
            return;
        };
        let call = [Value::Map(map.clone()), Value::from(key), current.clone()];
        match f.call(&call) {
            Ok(Value::Nil) => {}
            Ok(next) => *current = next,
            Err(e) => *acc = Err(e.into()),
        }
    })
}

fn object_each(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let map = receiver_map("object:each", receiver)?;
    let Some(f) = callback("object:each", args, 0)? else {
        anyhow::bail!("object:each: missing function");
    };
    let this = Value::Map(map.clone());
    for key in map.keys() {
        f.call(&[Value::from(key.as_str()), this.clone()])?;
    }
    Ok(Value::Nil)
}

fn object_keyval(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let map = receiver_map("object:keyval", receiver)?;
    if matches!(args.first(), Some(Value::Map(_))) {
        return Err(anyhow!(
            "object:keyval: expected field names; use keyvalText to serialize as lines"
        ));
    }
    let key = opt_str("object:keyval", args, 0)?.unwrap_or("k");
    let val = opt_str("object:keyval", args, 1)?.unwrap_or("v");
    Ok(Value::List(map.keyval(key, val)))
}

fn object_keyval_text(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let map = receiver_map("object:keyvalText", receiver)?;
    // Separators come either positionally or as an {ks, rs} options map.
    let (ks, rs) = match opt_map("object:keyvalText", args, 0) {
        Ok(Some(opts)) => (
            opts.get("ks").map(Value::to_display_string),
            opts.get("rs").map(Value::to_display_string),
        ),
        _ => (
            opt_str("object:keyvalText", args, 0)?.map(str::to_string),
            opt_str("object:keyvalText", args, 1)?.map(str::to_string),
        ),
    };
    Ok(Value::from(map.keyval_text(
        ks.as_deref().unwrap_or("="),
        rs.as_deref().unwrap_or("\n"),
    )))
}

fn object_json(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let map = receiver_map("object:json", receiver)?;
    Ok(Value::from(map.json(flag(args, 0))?))
}

fn object_concat(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let map = receiver_map("object:concat", receiver)?;
    let sources = map_sources("object:concat", args)?;
    Ok(Value::Map(map.concat(&sources)))
}

fn object_assign(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let sources = map_sources("object:assign", args)?;
    receiver_map_mut("object:assign", receiver)?.assign(&sources);
    Ok(receiver.clone())
}

fn object_mv(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let renames = req_map("object:mv", args, 0)?;
    receiver_map_mut("object:mv", receiver)?.mv(renames);
    Ok(receiver.clone())
}

fn object_mvp(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let map = receiver_map("object:mvp", receiver)?;
    let renames = req_map("object:mvp", args, 0)?;
    Ok(Value::Map(map.mvp(renames)))
}

fn object_rm(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    receiver_map_mut("object:rm", receiver)?.rm(&key_list(args));
    Ok(receiver.clone())
}

fn object_rmp(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let map = receiver_map("object:rmp", receiver)?;
    Ok(Value::Map(map.rmp(&key_list(args))))
}

fn object_setpath(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let path = req_str("object:setpath", args, 0)?;
    let value = args.get(1).cloned().unwrap_or(Value::Nil);
    receiver_map_mut("object:setpath", receiver)?.setpath(path, value);
    Ok(receiver.clone())
}

fn object_uc(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    receiver_map_mut("object:uc", receiver)?.uc(&key_list(args));
    Ok(Value::Nil)
}

fn object_lc(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    receiver_map_mut("object:lc", receiver)?.lc(&key_list(args));
    Ok(Value::Nil)
}

fn map_sources<'a>(op: &str, args: &'a [Value]) -> Result<Vec<&'a Map>> {
    args.iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nil())
        .map(|(i, _)| req_map(op, args, i))
        .collect()
}
