#[cfg(test)]
mod tests {
    use crate::group::Group;
    use crate::value::*;

    fn map_of(entries: &[(&str, Value)]) -> Value {
        let mut map = Map::default();
        for (k, v) in entries {
            map.insert(k.to_string(), v.clone());
        }
        Value::Map(map)
    }

    // ===== Predicates and accessors =====

    #[test]
    fn test_value_type_predicates() {
        assert!(Value::Integer(42).is_number());
        assert!(Value::Float(3.5).is_number());
        assert!(Value::from("hi").is_string());
        assert!(Value::Nil.is_nil());
        assert!(Value::List(vec![]).is_list());
        assert!(Value::List(vec![]).is_container());
        assert!(Value::map().is_map());
        assert!(Value::error("TypeError", "bad").is_error());
        assert!(Value::native("noop", |_| Ok(Value::Nil)).is_callable());
    }

    #[test]
    fn test_accessor_type_errors() {
        let err = Value::Integer(1).as_string().unwrap_err();
        assert_eq!(err.to_string(), "expected string, got integer");
        assert_eq!(Value::Float(4.0).as_integer().unwrap(), 4);
        assert!(Value::Float(4.5).as_integer().is_err());
    }

    #[test]
    fn test_group_of_value() {
        assert_eq!(Group::of(&Value::from("x")), Some(Group::String));
        assert_eq!(Group::of(&Value::List(vec![])), Some(Group::Array));
        assert_eq!(Group::of(&Value::map()), Some(Group::Object));
        assert_eq!(Group::of(&Value::error("Error", "x")), Some(Group::Error));
        assert_eq!(Group::of(&Value::Integer(1)), None);
    }

    #[test]
    fn test_group_parse_is_exact() {
        assert_eq!("array".parse::<Group>(), Ok(Group::Array));
        assert!("arrays".parse::<Group>().is_err());
        assert!("String".parse::<Group>().is_err());
    }

    // ===== Truthiness and equality =====

    #[test]
    fn test_truthiness() {
        for falsy in [
            Value::Nil,
            Value::Boolean(false),
            Value::Integer(0),
            Value::Float(0.0),
            Value::Float(f64::NAN),
            Value::from(""),
        ] {
            assert!(!falsy.is_truthy(), "{:?} should be falsy", falsy);
        }
        assert!(Value::from("0").is_truthy());
        assert!(Value::List(vec![]).is_truthy());
        assert!(Value::map().is_truthy());
    }

    #[test]
    fn test_strict_eq_is_shallow() {
        assert!(Value::Integer(2).strict_eq(&Value::Float(2.0)));
        assert!(Value::from("a").strict_eq(&Value::from("a")));
        assert!(!Value::Float(f64::NAN).strict_eq(&Value::Float(f64::NAN)));

        let obj = map_of(&[("n", Value::Integer(1))]);
        assert!(!obj.strict_eq(&obj.clone()));
        assert!(!Value::List(vec![]).strict_eq(&Value::List(vec![])));

        let f = Value::native("f", |_| Ok(Value::Nil));
        assert!(f.strict_eq(&f.clone()));
        assert!(!f.strict_eq(&Value::native("f", |_| Ok(Value::Nil))));
    }

    #[test]
    fn test_structural_eq() {
        let a = map_of(&[("a", Value::Integer(1)), ("b", Value::from("x"))]);
        let b = map_of(&[("b", Value::from("x")), ("a", Value::Float(1.0))]);
        assert_eq!(a, b);
        assert_ne!(a, Value::map());
    }

    // ===== Display =====

    #[test]
    fn test_display_form() {
        assert_eq!(Value::Integer(3).to_display_string(), "3");
        assert_eq!(Value::Float(1.0).to_display_string(), "1");
        assert_eq!(Value::Float(0.5).to_display_string(), "0.5");
        assert_eq!(Value::Float(f64::INFINITY).to_display_string(), "Infinity");
        assert_eq!(Value::Nil.to_display_string(), "null");
        assert_eq!(
            Value::List(vec![Value::Integer(1), Value::from("b")]).to_display_string(),
            "1,b"
        );
        assert_eq!(Value::map().to_display_string(), "[object Object]");
        assert_eq!(
            Value::error("TypeError", "nope").to_display_string(),
            "TypeError: nope"
        );
    }

    // ===== Native functions =====

    #[test]
    fn test_native_call() {
        let double = Value::native("double", |args| {
            Ok(Value::Integer(args[0].as_integer()? * 2))
        });
        assert_eq!(double.call(&[Value::Integer(21)]).unwrap(), Value::Integer(42));
        assert!(Value::Integer(1).call(&[]).is_err());
    }

    // ===== JSON =====

    #[test]
    fn test_json_preserves_key_order() {
        let v = Value::from_json_str(r#"{"z":1,"a":[true,null,1.5],"m":"x"}"#).unwrap();
        assert_eq!(v.as_map().unwrap().keys().collect::<Vec<_>>(), ["z", "a", "m"]);
        assert_eq!(v.to_json().unwrap(), r#"{"z":1,"a":[true,null,1.5],"m":"x"}"#);
    }

    #[test]
    fn test_json_whole_floats_print_as_integers() {
        assert_eq!(Value::Float(3.0).to_json().unwrap(), "3");
    }

    #[test]
    fn test_json_rejects_native_unless_safe() {
        let v = map_of(&[
            ("a", Value::Integer(1)),
            ("f", Value::native("f", |_| Ok(Value::Nil))),
            (
                "l",
                Value::List(vec![Value::native("g", |_| Ok(Value::Nil))]),
            ),
        ]);
        assert!(v.to_json().is_err());
        assert_eq!(v.to_json_safe(), r#"{"a":1,"l":[null]}"#);
    }

    #[test]
    fn test_error_value_serializes_stack_then_message() {
        let err = Value::Error {
            kind: "Error".to_string(),
            message: "test".to_string(),
            stack_trace: Some(vec!["main (app.rs:1)".to_string()]),
        };
        assert_eq!(
            err.to_json().unwrap(),
            r#"{"stack":"Error: test\n    at main (app.rs:1)","message":"test"}"#
        );
    }

    #[test]
    fn test_from_error_collects_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let wrapped = crate::Error::Io(io);
        match Value::from_error(&wrapped) {
            Value::Error {
                message,
                stack_trace,
                ..
            } => {
                assert_eq!(message, "IO error: disk on fire");
                assert_eq!(stack_trace, Some(vec!["disk on fire".to_string()]));
            }
            other => panic!("expected error value, got {:?}", other),
        }
    }
}
