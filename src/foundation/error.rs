/// Convenience result type used across statcard.
pub type StatcardResult<T> = Result<T, StatcardError>;

/// Top-level error taxonomy used by renderer APIs.
///
/// Asset-resolution failures are *not* represented here: the resolver
/// capability is infallible by contract and missing images only degrade the
/// layer they belong to.
#[derive(thiserror::Error, Debug)]
pub enum StatcardError {
    /// Invalid caller-provided profile/character data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal drawing invariant violations (surface sizes, buffer lengths).
    #[error("render error: {0}")]
    Render(String),

    /// The finished surface could not be serialized to PNG.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StatcardError {
    /// Build a [`StatcardError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StatcardError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`StatcardError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            StatcardError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            StatcardError::render("x")
                .to_string()
                .contains("render error:")
        );
        assert!(
            StatcardError::encode("x")
                .to_string()
                .contains("encode error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = StatcardError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
