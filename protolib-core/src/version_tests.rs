#[cfg(test)]
mod tests {
    use crate::version::*;
    use crate::Error;
    use proptest::prelude::*;

    #[test]
    fn test_pack_layout() {
        let v = Version::parse("1.2.3").unwrap();
        assert_eq!(v.packed(), 1 | (2 << 10) | (3 << 20));
        assert_eq!(Version::parse("0.0.0").unwrap().packed(), 0);
        assert_eq!(
            Version::parse("1023.1023.1023").unwrap().packed(),
            (1 << 30) - 1
        );
    }

    #[test]
    fn test_wrong_part_count() {
        for bad in ["1.2", "1.2.3.4", "", "1"] {
            match Version::parse(bad) {
                Err(Error::InvalidVersion { version, .. }) => assert_eq!(version, bad),
                other => panic!("expected invalid version for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_part_too_large_names_the_part() {
        let err = Version::parse("1.1024.0").unwrap_err();
        assert!(err.to_string().contains("1024 is too large"));
    }

    #[test]
    fn test_non_numeric_part() {
        let err = Version::parse("1.x.0").unwrap_err();
        assert!(err.to_string().contains("'x' is not a number"));
    }

    #[test]
    fn test_new_rejects_large_parts() {
        assert!(Version::new(1, 2, 3).is_ok());
        assert!(Version::new(0, 0, 1024).is_err());
    }

    #[test]
    fn test_from_packed_restores_parts() {
        let v = Version::from_packed(5 | (6 << 10) | (7 << 20));
        assert_eq!((v.major(), v.minor(), v.patch()), (5, 6, 7));
        assert_eq!(v.to_string(), "5.6.7");
    }

    #[test]
    fn test_ordering_is_dotted() {
        let a = Version::parse("1.0.0").unwrap();
        let b = Version::parse("0.9.9").unwrap();
        assert!(a > b);
        assert!(Version::parse("1.2.10").unwrap() > Version::parse("1.2.9").unwrap());
    }

    #[test]
    fn test_info_is_camel_case() {
        let info = Version::parse("0.3.2").unwrap().info();
        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(
            json,
            format!(r#"{{"semanticVersion":"0.3.2","packedInteger":{}}}"#, 3 << 10 | 2 << 20)
        );
    }

    proptest! {
        #[test]
        fn prop_order_matches_tuple_order(
            a in (0u32..1024, 0u32..1024, 0u32..1024),
            b in (0u32..1024, 0u32..1024, 0u32..1024),
        ) {
            let va = Version::new(a.0, a.1, a.2).unwrap();
            let vb = Version::new(b.0, b.1, b.2).unwrap();
            prop_assert_eq!(va.cmp(&vb), a.cmp(&b));
            prop_assert_eq!(Version::from_packed(va.packed()), va);
        }
    }
}
