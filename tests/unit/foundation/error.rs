use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        WildwoodError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        WildwoodError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        WildwoodError::encode("x")
            .to_string()
            .contains("encode error:")
    );
    assert!(
        WildwoodError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = WildwoodError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_become_serde_errors() {
    let err: WildwoodError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, WildwoodError::Serde(_)));
}
