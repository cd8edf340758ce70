/// Result alias used across gifcaption APIs.
pub type GifcaptionResult<T> = Result<T, GifcaptionError>;

#[derive(thiserror::Error, Debug)]
/// Top-level error type for gifcaption operations.
///
/// Every variant is terminal for the call that produced it: nothing is retried internally and
/// no partial output is returned alongside an error.
pub enum GifcaptionError {
    /// Caller-supplied options or configuration violate an invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested font is unregistered, unreadable or fails to parse.
    #[error("font error: {0}")]
    Font(String),

    /// Wrapped caption cannot be composited onto the target canvas.
    #[error("layout error: {0}")]
    Layout(String),

    /// Animation container or raster encoding/decoding failed.
    #[error("codec error: {0}")]
    Codec(String),

    /// Wrapped lower-level error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GifcaptionError {
    /// Build a [`GifcaptionError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GifcaptionError::Font`] value.
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`GifcaptionError::Layout`] value.
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`GifcaptionError::Codec`] value.
    pub fn codec(msg: impl Into<String>) -> Self {
        Self::Codec(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
