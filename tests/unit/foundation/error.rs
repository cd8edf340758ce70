use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        GifcaptionError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(GifcaptionError::font("x").to_string().contains("font error:"));
    assert!(
        GifcaptionError::layout("x")
            .to_string()
            .contains("layout error:")
    );
    assert!(GifcaptionError::codec("x").to_string().contains("codec error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = GifcaptionError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
