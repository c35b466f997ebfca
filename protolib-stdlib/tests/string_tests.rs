//! Tests for string operations

use protolib_core::{Error, Value};
use protolib_stdlib::{Fallback, Pattern, Registry, StrExt};
use std::sync::{Arc, Mutex};

fn call(qualified: &str, receiver: &str, args: &[Value]) -> anyhow::Result<Value> {
    let mut receiver = Value::from(receiver);
    Registry::global()
        .lookup(qualified)
        .unwrap()
        .call(&mut receiver, args)
}

fn strings(items: &[&str]) -> Value {
    Value::List(items.iter().map(|s| Value::from(*s)).collect())
}

#[test]
fn test_case_conversion() {
    assert_eq!("Hello".uc(), "HELLO");
    assert_eq!("Hello".lc(), "hello");
    assert_eq!("hello wORLD a".tc(), "Hello World a");
    assert_eq!("it's o'neil".tc(), "It's o'Neil");
    assert_eq!(call("string:tc", "snake_case word", &[]).unwrap(), Value::from("Snake_case Word"));
}

#[test]
fn test_sprintf_named() {
    let mut params = protolib_core::Map::default();
    params.insert("name".to_string(), Value::from("Bob"));
    params.insert("age".to_string(), Value::Integer(3));

    let s = "%{name} is %{age}, hi %{name}".sprintf(&Value::Map(params));
    assert_eq!(s, "Bob is 3, hi Bob");
}

#[test]
fn test_sprintf_positional_skips_containers() {
    let params = Value::List(vec![Value::from("a"), Value::List(vec![]), Value::Integer(2)]);
    assert_eq!("%s-%s-%s".sprintf(&params), "a-2-%s");
    // Substituted text is not rescanned.
    assert_eq!("%s %s".sprintf(&strings(&["%s", "x"])), "%s x");
}

#[test]
fn test_sprintf_scalar_is_unchanged() {
    assert_eq!("%s".sprintf(&Value::Integer(1)), "%s");
    assert_eq!(call("string:sprintf", "%{a}", &[]).unwrap(), Value::from("%{a}"));
}

#[test]
fn test_unindent() {
    assert_eq!("  x\n  y".unindent(), "x\ny");
    assert_eq!("\n    a\n      b\n    c\n".unindent(), "a\n  b\nc");
    // Lines indented less than the first line are left alone.
    assert_eq!("    a\n  b".unindent(), "a\n  b");
}

#[test]
fn test_heredoc_and_trimln() {
    assert_eq!("x\n\ny".heredoc(), "x \ny");
    assert_eq!("  one\n  two\n\n  three".heredoc(), "one two \nthree");
    assert_eq!("  a\n   b\n\n  c  ".trimln(), "a b \nc");
}

#[test]
fn test_arr_default_delimiters() {
    assert_eq!("a/b/c".arr(None), ["a", "b", "c"]);
    assert_eq!("a|b;c".arr(None), ["a", "b", "c"]);
    assert_eq!("a, b.c\td e".arr(None), ["a", "b", "c", "d", "e"]);
}

#[test]
fn test_arr_custom_delimiters() {
    assert_eq!("a-b_c d".arr(Some("-_")), ["a", "b", "c d"]);
    assert_eq!("a,b".arr(Some("")), ["a,b"]);
    assert_eq!(
        call("string:split", "1:2", &[Value::from(":")]).unwrap(),
        strings(&["1", "2"])
    );
}

#[test]
fn test_arr_delimiters_are_a_character_class() {
    assert_eq!("a1b2c".arr(Some("0-9")), ["a", "b", "c"]);
    assert_eq!("x42y".arr(Some("0-9")), ["x", "y"]);
    assert_eq!(
        call("string:arr", "a1b2c", &[Value::from("0-9")]).unwrap(),
        strings(&["a", "b", "c"])
    );
    assert_eq!("k7v8w9".split_limit(2, Some("0-9")), ["k", "v8w9"]);
    assert_eq!("a1b22c".nth(-1, Some("0-9")), "c");

    // Characters that do not form a valid class are taken literally.
    assert_eq!("a[b]c".arr(Some("[]")), ["a", "b", "c"]);
    assert_eq!("a\\b".arr(Some("\\")), ["a", "b"]);
}

#[test]
fn test_arr_with_callback() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let f = Value::native("collect", move |args| {
        sink.lock().unwrap().push(args[0].to_display_string());
        Ok(Value::Nil)
    });

    let result = call("string:arr", "x y z", &[Value::Nil, f]).unwrap();

    assert_eq!(result, Value::Nil);
    assert_eq!(*seen.lock().unwrap(), ["x", "y", "z"]);
}

#[test]
fn test_splitn_keeps_remainder() {
    assert_eq!("a b c d".split_limit(2, None), ["a", "b c d"]);
    assert_eq!("a b".split_limit(5, None), ["a", "b"]);
    assert_eq!("a b c".split_limit(0, None), ["a", "b", "c"]);
    assert_eq!("a b c".split_limit(1, None), ["a b c"]);
}

#[test]
fn test_nth() {
    assert_eq!("a,b,c".nth(0, None), "a");
    assert_eq!("a,b,c".nth(-1, None), "c");
    assert_eq!("a,b,c".nth(3, None), "");
    assert_eq!("a,b,c".nth(-4, None), "");
    assert_eq!(call("string:nth", "x y", &[Value::Integer(1)]).unwrap(), Value::from("y"));
}

#[test]
fn test_extract_single_and_multiple_captures() {
    let one: Pattern = r"/(\d+)/".parse().unwrap();
    assert_eq!("key: 42".extract(&one, Fallback::Empty), Value::from("42"));

    let two: Pattern = r"(\w+)=(\w+)".parse().unwrap();
    assert_eq!("a=b".extract(&two, Fallback::Empty), strings(&["a", "b"]));
}

#[test]
fn test_extract_global_collects_every_match() {
    let global: Pattern = r"/(\w)(\d)/g".parse().unwrap();
    assert!(global.is_global());
    assert_eq!("a1 b2".extract(&global, Fallback::Empty), strings(&["a", "1", "b", "2"]));
}

#[test]
fn test_extract_flags() {
    let insensitive: Pattern = "/(abc)/i".parse().unwrap();
    assert_eq!("xABCx".extract(&insensitive, Fallback::Empty), Value::from("ABC"));
}

#[test]
fn test_extract_fallbacks() {
    let digits: Pattern = r"(\d+)".parse().unwrap();
    assert_eq!("none".extract(&digits, Fallback::Empty), Value::List(vec![]));
    assert_eq!("none".extract(&digits, Fallback::Original), Value::from("none"));
    assert_eq!(
        "none".extract(&digits, Fallback::Value(Value::Integer(0))),
        Value::Integer(0)
    );

    assert_eq!(
        call("string:extract", "none", &[Value::from(r"(\d+)"), Value::Boolean(true)]).unwrap(),
        Value::from("none")
    );
}

#[test]
fn test_extract_invalid_pattern_uses_fallback() {
    assert!(Pattern::new("(").is_err());
    assert_eq!(
        call("string:extract", "abc", &[Value::from("(")]).unwrap(),
        Value::List(vec![])
    );
    assert_eq!(
        call("string:extract", "abc", &[Value::from("("), Value::from("dflt")]).unwrap(),
        Value::from("dflt")
    );
}

#[test]
fn test_keyval_coerces_numerals() {
    let map = "a=1\nb=x\nc=1.5\nd=1.".keyval("=", "\n", false);
    assert_eq!(map.get("a"), Some(&Value::Integer(1)));
    assert_eq!(map.get("b"), Some(&Value::from("x")));
    assert_eq!(map.get("c"), Some(&Value::Float(1.5)));
    assert_eq!(map.get("d"), Some(&Value::from("1.")));
}

#[test]
fn test_keyval_quote_all_and_records() {
    let map = "a=1\n\nb=x=y\nflag".keyval("=", "\n", true);
    assert_eq!(map.keys().collect::<Vec<_>>(), ["a", "b", "flag"]);
    assert_eq!(map.get("a"), Some(&Value::from("1")));
    assert_eq!(map.get("b"), Some(&Value::from("x=y")));
    assert_eq!(map.get("flag"), Some(&Value::Nil));

    let custom = call("string:keyval", "a:1;b:2", &[Value::from(":"), Value::from(";")]).unwrap();
    assert_eq!(custom.as_map().unwrap().get("b"), Some(&Value::Integer(2)));
}

#[test]
fn test_quote() {
    assert_eq!("hi".q("'"), "'hi'");
    assert_eq!("'hi'".q("'"), "'hi'");
    assert_eq!("x".q("{}"), "{x}");
    assert_eq!("{x}".q("{}"), "{x}");
    assert_eq!("x".q(""), "\"x\"");
    assert_eq!(call("string:q", "hi", &[]).unwrap(), Value::from("'hi'"));
}

#[test]
fn test_tr() {
    assert_eq!("hello".tr("el", "ip"), "hippo");
    assert_eq!("abc".tr("abc", "x"), "xbc");
    assert_eq!("hello".tr("l", ""), "hello");
    assert_eq!("hello".tr("z", "y"), "hello");
}

#[test]
fn test_json() {
    assert_eq!("   ".json().unwrap(), Value::map());
    let parsed = " {\"a\": [1, \"b\"]} ".json().unwrap();
    assert_eq!(
        parsed.as_map().unwrap().get("a"),
        Some(&Value::List(vec![Value::Integer(1), Value::from("b")]))
    );
    assert!(matches!("{bad".json(), Err(Error::Parse(_))));
    assert!(call("string:json", "[1,", &[]).is_err());
}

#[test]
fn test_wrong_receiver_is_rejected() {
    let err = Registry::global()
        .lookup("string:uc")
        .unwrap()
        .call(&mut Value::Integer(1), &[])
        .unwrap_err();
    assert!(err.to_string().contains("expected string receiver"));
}
