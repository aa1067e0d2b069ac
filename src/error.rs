//! Error types for the minimap core.

/// Error returned by rendering and lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum MinimapError {
    /// An edge declared a side label other than `left`, `right`, `top` or `bottom`.
    #[error("invalid edge side: {side:?}")]
    InvalidSide { side: String },
    /// A concrete surface failed to mount or draw.
    #[error("surface error: {0}")]
    Surface(String),
    /// A host canvas document could not be decoded into a snapshot.
    #[error("failed to decode canvas snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
    /// Settings could not be parsed or applied.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Error returned when reading or writing [`crate::config::MinimapSettings`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The persisted settings object is not valid JSON of the expected shape.
    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),
    /// The settings UI wrote a key the minimap does not recognize.
    #[error("unknown settings key: {0}")]
    UnknownKey(String),
    /// The settings UI wrote a value that does not parse for its key.
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}
