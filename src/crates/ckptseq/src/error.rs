//! Error types shared by every stage.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, StageError>;

/// Errors a stage can surface, either at construction or from `next`/`setstate`.
///
/// `next()` itself never uses this type to signal end-of-stream — that is `Ok(None)` — so every
/// variant here is either a construction-time configuration mistake or a genuine fault.
#[derive(Error, Debug)]
pub enum StageError {
    /// A stage was constructed with an invalid configuration (bad shard id, zero buffer size,
    /// zero batch size, empty dataset for an infinite source, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A `Multiplex` control stream selected a data stream that was already exhausted.
    #[error("multiplex underflow: data stream {index} exhausted while selected")]
    Underflow { index: usize },

    /// A checkpoint token failed to (de)serialize.
    #[error("token serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A checkpoint token failed to (de)serialize via the binary codec.
    #[error("token binary serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// An error propagated from a user-supplied closure or an upstream stage outside this crate.
    #[error("upstream error: {0}")]
    Upstream(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StageError {
    /// Wrap an arbitrary error so it can cross the `Stage` boundary.
    pub fn upstream<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        StageError::Upstream(Box::new(err))
    }
}
