/// Convenience result type used across chartweave.
pub type ChartResult<T> = Result<T, ChartError>;

/// Top-level error taxonomy used by pipeline and scene APIs.
#[derive(thiserror::Error, Debug)]
pub enum ChartError {
    /// A required source table could not be loaded.
    #[error("load failure: {0}")]
    LoadFailure(String),

    /// A loaded table, or a point handed to an encoding, lacks required columns or shape.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Invalid transition parameters.
    #[error("animation error: {0}")]
    Animation(String),

    /// Invalid configuration or caller-provided arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChartError {
    /// Build a [`ChartError::LoadFailure`] value.
    pub fn load_failure(msg: impl Into<String>) -> Self {
        Self::LoadFailure(msg.into())
    }

    /// Build a [`ChartError::MalformedInput`] value.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    /// Build a [`ChartError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`ChartError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ChartError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// True for failures that happened before any data reached the pipeline.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, Self::LoadFailure(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
