/// Convenience result type used across tradeanim.
pub type TradeAnimResult<T> = Result<T, TradeAnimError>;

/// Top-level error taxonomy.
///
/// Every variant is scoped to the single operation that produced it; nothing here is meant to
/// end an editing session.
#[derive(thiserror::Error, Debug)]
pub enum TradeAnimError {
    /// Invalid user-provided data, settings, or requests.
    #[error("validation error: {0}")]
    Validation(String),

    /// Input that could not be turned into candles (CSV, vision output).
    #[error("import error: {0}")]
    Import(String),

    /// Failures while rasterizing or encoding frames.
    #[error("render error: {0}")]
    Render(String),

    /// External collaborator failures (render service, vision delegate, timeouts).
    #[error("service error: {0}")]
    Service(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TradeAnimError {
    /// Build a [`TradeAnimError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TradeAnimError::Import`] value.
    pub fn import(msg: impl Into<String>) -> Self {
        Self::Import(msg.into())
    }

    /// Build a [`TradeAnimError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`TradeAnimError::Service`] value.
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    /// Build a [`TradeAnimError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
