/// Convenience result type used across the crate.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Top-level error taxonomy used by rendering APIs.
#[derive(thiserror::Error, Debug)]
pub enum CanvasError {
    /// Invalid user-provided configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// A required font could not be read or registered.
    #[error("font registration error: '{name}' from '{path}': {cause:#}")]
    FontRegistration {
        /// Logical font name requested by the config.
        name: String,
        /// Font file path.
        path: String,
        /// Underlying failure.
        cause: anyhow::Error,
    },

    /// The background image could not be fetched or decoded.
    #[error("background load error: '{url}': {source}")]
    BackgroundLoad {
        /// Offending image reference.
        url: String,
        /// Underlying failure.
        source: Box<CanvasError>,
    },

    /// An avatar image could not be fetched or decoded.
    #[error("avatar load error: '{url}': {source}")]
    AvatarLoad {
        /// Offending image reference.
        url: String,
        /// Underlying failure.
        source: Box<CanvasError>,
    },

    /// Font resolution or text shaping failed.
    #[error("text error: {0}")]
    Text(String),

    /// Encoding the final surface failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CanvasError {
    /// Build a [`CanvasError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CanvasError::Text`] value.
    pub fn text(msg: impl Into<String>) -> Self {
        Self::Text(msg.into())
    }

    /// Build a [`CanvasError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`CanvasError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`CanvasError::FontRegistration`] value.
    pub fn font_registration(
        name: impl Into<String>,
        path: impl Into<String>,
        cause: impl Into<anyhow::Error>,
    ) -> Self {
        Self::FontRegistration {
            name: name.into(),
            path: path.into(),
            cause: cause.into(),
        }
    }

    /// Wrap `source` as a [`CanvasError::BackgroundLoad`] for `url`.
    pub fn background_load(url: impl Into<String>, source: CanvasError) -> Self {
        Self::BackgroundLoad {
            url: url.into(),
            source: Box::new(source),
        }
    }

    /// Wrap `source` as a [`CanvasError::AvatarLoad`] for `url`.
    pub fn avatar_load(url: impl Into<String>, source: CanvasError) -> Self {
        Self::AvatarLoad {
            url: url.into(),
            source: Box::new(source),
        }
    }
}

impl From<serde_json::Error> for CanvasError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
