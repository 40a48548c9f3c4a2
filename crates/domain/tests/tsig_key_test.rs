use ferrous_q_domain::{DomainError, TsigAlgorithm, TsigKey};

#[test]
fn test_two_part_spec_defaults_to_hmac_md5() {
    for spec in ["key:c2VjcmV0", "transfer.example.:AAAA", "k:x"] {
        let key = TsigKey::parse(spec).unwrap();
        assert_eq!(key.algorithm, TsigAlgorithm::HmacMd5, "spec {}", spec);
    }
}

#[test]
fn test_two_part_spec_splits_name_and_secret() {
    let key = TsigKey::parse("transfer:c2VjcmV0").unwrap();

    assert_eq!(&*key.name, "transfer.");
    assert_eq!(&*key.secret, "c2VjcmV0");
}

#[test]
fn test_sha256_spec() {
    let key = TsigKey::parse("hmac-sha256:transfer:c2VjcmV0").unwrap();

    assert_eq!(key.algorithm, TsigAlgorithm::HmacSha256);
    assert_eq!(&*key.name, "transfer.");
    assert_eq!(&*key.secret, "c2VjcmV0");
}

#[test]
fn test_sha1_spec() {
    let key = TsigKey::parse("hmac-sha1:transfer:c2VjcmV0").unwrap();

    assert_eq!(key.algorithm, TsigAlgorithm::HmacSha1);
}

#[test]
fn test_explicit_md5_takes_name_from_second_segment() {
    let key = TsigKey::parse("hmac-md5:transfer:c2VjcmV0").unwrap();

    assert_eq!(key.algorithm, TsigAlgorithm::HmacMd5);
    assert_eq!(&*key.name, "transfer.");
}

#[test]
fn test_unknown_algorithm_in_three_part_form_fails() {
    for spec in [
        "hmac-sha512:transfer:c2VjcmV0",
        "md5:transfer:c2VjcmV0",
        "transfer:c2VjcmV0:extra",
        "HMAC-SHA256:transfer:c2VjcmV0",
    ] {
        assert!(
            matches!(TsigKey::parse(spec), Err(DomainError::InvalidTsigKey(_))),
            "spec {} should be rejected",
            spec
        );
    }
}

#[test]
fn test_single_segment_fails() {
    assert!(TsigKey::parse("justakey").is_err());
    assert!(TsigKey::parse("").is_err());
}

#[test]
fn test_empty_name_or_secret_fails() {
    assert!(TsigKey::parse(":c2VjcmV0").is_err());
    assert!(TsigKey::parse("transfer:").is_err());
}

#[test]
fn test_debug_output_hides_secret() {
    let key = TsigKey::parse("transfer:c2VjcmV0").unwrap();

    assert!(!format!("{:?}", key).contains("c2VjcmV0"));
}
