//! Prelude module for convenient imports.
//!
//! ```ignore
//! use fieldforge::prelude::*;
//! ```

pub use fieldforge_derive::PreviewField;

// Runtime
pub use fieldforge_core::{
    BoxedField, Combined1, Combined2, Combined3, Combined4, Combined5, Combined6, Combined7,
    Combined8, Combined9, Combined10, Field, FieldError, FieldFactory, FieldShape, Nullable,
    Observer, ObserverId, Polymorphic, SharedFactory, Transform,
};

// Schema and generation
pub use fieldforge_codegen::{CodegenError, Generator, GeneratorConfig};
pub use fieldforge_schema::{
    Classification, FieldSchema, GenerationRequest, NameCase, TypeCatalog, TypeDescriptor,
};
