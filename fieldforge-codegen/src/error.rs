//! Error types for code generation.

use thiserror::Error;

/// Error type for code generation operations.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Schema parsing error.
    #[error("schema parse error: {0}")]
    Parse(#[from] fieldforge_schema::ParseError),

    /// Schema validation error.
    #[error("schema error: {0}")]
    Schema(#[from] fieldforge_schema::SchemaError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Code generation error.
    #[error("generation error: {message}")]
    Generation {
        /// Error message.
        message: String,
    },

    /// Request names a type missing from the catalog.
    #[error("unknown type '{type_name}'")]
    UnknownType {
        /// Type name.
        type_name: String,
    },

    /// The subject of a request cannot be edited.
    #[error("type '{type_name}' is unsupported: {reason}")]
    Unsupported {
        /// Subject type.
        type_name: String,
        /// Classification reason.
        reason: String,
    },

    /// A member reachable from the subject cannot be edited and unsupported
    /// members are not tolerated.
    #[error("member '{member}' of '{owner}' is unsupported: {reason}")]
    UnsupportedMember {
        /// Owning product or variant.
        owner: String,
        /// Member name.
        member: String,
        /// Classification reason.
        reason: String,
    },

    /// Factory requested for a type without a companion slot.
    #[error("type '{type_name}' has no companion slot to attach a factory to")]
    MissingCompanion {
        /// Subject type.
        type_name: String,
    },

    /// Factory requested for a type that is not a product or sum.
    #[error("type '{type_name}' is a {kind}, factories need a product or sum")]
    NotFactoryTarget {
        /// Subject type.
        type_name: String,
        /// Descriptor kind.
        kind: String,
    },
}

impl CodegenError {
    /// Creates a generation error with the given message.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }
}
