//! Tests for error value operations

use protolib_core::{Error, Value};
use protolib_stdlib::{ErrorExt, Registry};

fn raised() -> Value {
    Value::Error {
        kind: "TypeError".to_string(),
        message: "x is undefined".to_string(),
        stack_trace: Some(vec!["run (main.rs:10)".to_string(), "main (main.rs:2)".to_string()]),
    }
}

#[test]
fn test_obj_has_stack_then_message() {
    let obj = raised().obj();
    assert_eq!(obj.keys().collect::<Vec<_>>(), ["stack", "message"]);
    assert_eq!(obj.get("message"), Some(&Value::from("x is undefined")));
    assert_eq!(
        obj.get("stack"),
        Some(&Value::from(
            "TypeError: x is undefined\n    at run (main.rs:10)\n    at main (main.rs:2)"
        ))
    );
}

#[test]
fn test_json() {
    let err = Value::error("Error", "boom");
    assert_eq!(err.json(), r#"{"stack":"Error: boom","message":"boom"}"#);
}

#[test]
fn test_non_error_has_no_attributes() {
    assert!(Value::Integer(1).obj().is_empty());
    assert_eq!(Value::from("x").json(), "{}");
}

#[test]
fn test_rust_error_chain() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
    let err = anyhow::Error::new(Error::Io(io)).context("loading config");

    let obj = err.obj();
    assert_eq!(obj.get("message"), Some(&Value::from("loading config")));
    let stack = obj.get("stack").unwrap().to_display_string();
    assert!(stack.starts_with("Error: loading config\n    at IO error: no such file"));
    assert!(stack.ends_with("    at no such file"));
}

#[test]
fn test_registered_operations() {
    let registry = Registry::global();

    let mut err = Value::error("RangeError", "out of range");
    let obj = registry.lookup("error:obj").unwrap().call(&mut err, &[]).unwrap();
    assert_eq!(
        obj.as_map().unwrap().get("stack"),
        Some(&Value::from("RangeError: out of range"))
    );

    let json = registry.lookup("error:json").unwrap().call(&mut err, &[]).unwrap();
    assert_eq!(
        json,
        Value::from(r#"{"stack":"RangeError: out of range","message":"out of range"}"#)
    );

    assert!(registry
        .lookup("error:obj")
        .unwrap()
        .call(&mut Value::map(), &[])
        .is_err());
}
