use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ChartError::load_failure("x")
            .to_string()
            .contains("load failure:")
    );
    assert!(
        ChartError::malformed("x")
            .to_string()
            .contains("malformed input:")
    );
    assert!(
        ChartError::animation("x")
            .to_string()
            .contains("animation error:")
    );
    assert!(
        ChartError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ChartError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("disk gone");
    let err = ChartError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("disk gone"));
    assert!(!err.is_load_failure());
}

#[test]
fn load_failure_is_classified() {
    assert!(ChartError::load_failure("alcohol.json").is_load_failure());
    assert!(!ChartError::malformed("alcohol.json").is_load_failure());
}
