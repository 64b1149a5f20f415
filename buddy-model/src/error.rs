use thiserror::Error;

/// Result type for entity operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by [`Entity`](crate::Entity) reads and writes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The entity was marked deleted and is inert.
    #[error("this object has been deleted")]
    Disposed,

    /// The entity is not in a state that allows the operation.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A caller-supplied argument was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A stored value cannot be represented as the requested type.
    #[error("cannot convert field {field} from {found} to {expected}")]
    TypeConversion {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A value failed to parse into a core type (geolocation, URI, ...).
    #[error(transparent)]
    Types(#[from] buddy_types::Error),
}
