//! # FieldForge
//!
//! Type-driven generation of editable, observable fields.
//!
//! FieldForge looks at the shape of a type and generates a field factory for
//! it: primitives and enumerations become leaves, products become combined
//! fields with one child per member, closed sums become polymorphic fields
//! with one child per variant. Nesting is handled recursively, so a single
//! request yields an editor tree for the whole value.
//!
//! ## Quick Start
//!
//! ```ignore
//! use fieldforge::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq, PreviewField)]
//! struct Point {
//!     x: f64,
//!     y: f64,
//! }
//!
//! let mut field = Point::point(None, Point { x: 1.0, y: 2.0 });
//! field.edit(|(x, _)| x.set(3.0));
//! assert_eq!(field.value(), Point { x: 3.0, y: 2.0 });
//! ```
//!
//! Schemas can also be compiled from XML in a build script, see
//! [`codegen::build::compile_schema`].
//!
//! ## Crate Organization
//!
//! - [`core`] - Field trait and runtime combinators
//! - [`schema`] - Type descriptors, schema parsing and classification
//! - [`codegen`] - Rust code generation from descriptors

pub mod prelude;

/// Field trait and runtime combinators.
pub mod core {
    pub use fieldforge_core::*;
}

/// Type descriptors, schema parsing and classification.
pub mod schema {
    pub use fieldforge_schema::*;
}

/// Code generation from type descriptors.
pub mod codegen {
    pub use fieldforge_codegen::*;
}

pub use fieldforge_derive::PreviewField;

// Re-export commonly used items at the crate root
pub use fieldforge_core::{Field, FieldError, FieldFactory, FieldShape, ObserverId};
pub use fieldforge_codegen::{CodegenError, Generator, GeneratorConfig};
pub use fieldforge_schema::{Classification, FieldSchema, TypeCatalog, TypeDescriptor};
