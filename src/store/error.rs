/// Errors raised by the ad store.
///
/// Callers computing suggestions only ever see `Unavailable` surface as a
/// failure; the remaining variants come from the CRUD paths.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("Store: unavailable: {0}")]
    Unavailable(String),

    #[error("Store: {entity} not found (id={id})")]
    NotFound { entity: &'static str, id: String },

    /// A write was rejected before touching persistence.
    #[error("Store: invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Store: JSON error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
