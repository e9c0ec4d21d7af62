use super::*;

#[test]
fn display_prefixes_are_stable() {
    let cases = [
        (TradeAnimError::validation("x"), "validation error:"),
        (TradeAnimError::import("x"), "import error:"),
        (TradeAnimError::render("x"), "render error:"),
        (TradeAnimError::service("x"), "service error:"),
        (TradeAnimError::serde("x"), "serialization error:"),
    ];
    for (err, prefix) in cases {
        assert!(err.to_string().starts_with(prefix), "{err}");
    }
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("disk gone");
    let err = TradeAnimError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("disk gone"));
}
