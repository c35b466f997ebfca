//! Tests for the operation registry

use anyhow::Result;
use protolib_core::{Effect, Group, Value};
use protolib_stdlib::registry::{Operation, Registry};

// Test operation implementations
fn test_len(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    match receiver {
        Value::String(s) => Ok(Value::from(s.chars().count())),
        _ => anyhow::bail!("len: expected string"),
    }
}

fn test_push(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    match receiver {
        Value::List(items) => {
            items.extend(args.iter().cloned());
            Ok(Value::from(items.len()))
        }
        _ => anyhow::bail!("push: expected list"),
    }
}

fn test_variadic(_receiver: &mut Value, args: &[Value]) -> Result<Value> {
    Ok(Value::from(args.len()))
}

#[test]
fn test_operation_creation() {
    let len = Operation::pure(Group::String, "len", test_len, 0, Some(0), "Character count");

    assert_eq!(len.name, "len");
    assert_eq!(len.group, Group::String);
    assert_eq!(len.qualified_name(), "string:len");
    assert!(len.effects.is_empty());
    assert!(!len.is_mutating());
    assert_eq!(len.doc, "Character count");

    let push = Operation::mutating(Group::Array, "push", test_push, 1, None, "Append values");
    assert!(push.is_mutating());
    assert_eq!(push.effects, vec![Effect::Mutation]);

    let io = Operation::effectful(Group::String, "touch", test_len, 0, Some(0), vec![Effect::IO], "Touch");
    assert_eq!(io.effects, vec![Effect::IO]);
}

#[test]
fn test_argument_validation() {
    let op = Operation::pure(Group::String, "test", test_variadic, 2, Some(3), "Test operation");

    // Too few arguments
    assert!(op.validate_args(1).is_err());

    // Valid argument counts
    assert!(op.validate_args(2).is_ok());
    assert!(op.validate_args(3).is_ok());

    // Too many arguments
    assert!(op.validate_args(4).is_err());

    // Variadic
    let variadic = Operation::pure(Group::String, "variadic", test_variadic, 0, None, "Variadic");
    assert!(variadic.validate_args(0).is_ok());
    assert!(variadic.validate_args(100).is_ok());
}

#[test]
fn test_operation_call() {
    let len = Operation::pure(Group::String, "len", test_len, 0, Some(0), "Character count");

    let mut s = Value::from("héllo");
    assert_eq!(len.call(&mut s, &[]).unwrap(), Value::Integer(5));

    // Invalid argument count
    let err = len.call(&mut s, &[Value::Nil]).unwrap_err();
    assert!(err.to_string().contains("expected at most 0 arguments"));

    // Receiver from the wrong group
    let err = len.call(&mut Value::Integer(3), &[]).unwrap_err();
    assert_eq!(err.to_string(), "string:len: expected string receiver, got integer");
}

#[test]
fn test_mutating_call_changes_receiver() {
    let push = Operation::mutating(Group::Array, "push", test_push, 1, None, "Append values");
    let mut list = Value::List(vec![Value::Integer(1)]);

    let len = push.call(&mut list, &[Value::Integer(2), Value::Integer(3)]).unwrap();

    assert_eq!(len, Value::Integer(3));
    assert_eq!(list.as_list().unwrap().len(), 3);
}

#[test]
fn test_registry_lookup() {
    let mut registry = Registry::empty();
    assert!(registry.is_empty());

    registry.register_all(vec![
        Operation::pure(Group::String, "len", test_len, 0, Some(0), "Character count"),
        Operation::mutating(Group::Array, "push", test_push, 1, None, "Append values"),
    ]);

    assert_eq!(registry.len(), 2);
    assert!(registry.contains(Group::String, "len"));
    assert!(!registry.contains(Group::Array, "len"));
    assert!(registry.lookup("array:push").is_some());
    assert!(registry.lookup("array").is_none());
    assert!(registry.lookup("arrays:push").is_none());
    assert!(registry.operations(Group::Error).is_empty());
}

#[test]
fn test_same_name_replaces_in_place() {
    let mut registry = Registry::empty();
    registry.register_all(vec![
        Operation::pure(Group::String, "a", test_len, 0, Some(0), "first"),
        Operation::pure(Group::String, "b", test_len, 0, Some(0), "second"),
        Operation::pure(Group::String, "a", test_variadic, 0, None, "replacement"),
    ]);

    let names: Vec<_> = registry
        .operations(Group::String)
        .iter()
        .map(|op| op.name.as_str())
        .collect();
    assert_eq!(names, ["a", "b"]);
    assert_eq!(registry.get(Group::String, "a").unwrap().doc, "replacement");
}

#[test]
fn test_builtin_registry() {
    let registry = Registry::global();

    for name in ["uc", "lc", "tc", "sprintf", "unindent", "heredoc", "trimln", "arr", "split",
                 "splitn", "nth", "extract", "keyval", "q", "tr", "json", "path", "cat", "ls"] {
        assert!(registry.contains(Group::String, name), "string:{}", name);
    }
    for name in ["unique", "trim", "flat", "last", "unpack", "keyval", "indexOfObj", "item",
                 "contains", "split", "json", "uc", "lc"] {
        assert!(registry.contains(Group::Array, name), "array:{}", name);
    }
    for name in ["isEmpty", "keys", "vals", "map", "each", "uc", "lc", "keyval", "keyvalText",
                 "concat", "assign", "mv", "mvp", "rm", "rmp", "notIn", "getpath", "setpath",
                 "json", "slice"] {
        assert!(registry.contains(Group::Object, name), "object:{}", name);
    }
    assert!(registry.contains(Group::Error, "obj"));
    assert!(registry.contains(Group::Error, "json"));

    assert!(registry.get(Group::String, "cat").unwrap().effects.contains(&Effect::IO));
    assert!(registry.get(Group::Object, "mv").unwrap().is_mutating());
    assert!(!registry.get(Group::Object, "mvp").unwrap().is_mutating());
}

#[test]
fn test_qualified_names_follow_group_order() {
    let names = Registry::global().qualified_names();
    let first_array = names.iter().position(|n| n.starts_with("array:")).unwrap();
    let last_string = names.iter().rposition(|n| n.starts_with("string:")).unwrap();
    assert!(last_string < first_array);
    assert_eq!(names.last().map(String::as_str), Some("error:json"));
}
