//! Error types for field runtime operations.

use thiserror::Error;

/// Error type for field operations.
///
/// Generated `combine`/`split` pairs never fail, so these only cover misuse of
/// the interactive API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Variant tag not declared by a polymorphic field.
    #[error("unknown variant '{tag}' for field '{label}'")]
    UnknownVariant {
        /// Label of the polymorphic field.
        label: String,
        /// Requested tag.
        tag: String,
    },

    /// Option index outside an enum leaf's option list.
    #[error("option index {index} out of range for field '{label}' with {len} options")]
    OptionOutOfRange {
        /// Label of the leaf field.
        label: String,
        /// Requested index.
        index: usize,
        /// Number of options.
        len: usize,
    },

    /// Leaf field has no option list.
    #[error("field '{label}' has no options")]
    NoOptions {
        /// Label of the leaf field.
        label: String,
    },
}

/// Result type alias for field operations.
pub type Result<T> = std::result::Result<T, FieldError>;
