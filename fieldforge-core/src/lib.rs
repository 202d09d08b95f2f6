//! # FieldForge Core
//!
//! Runtime field combinators used by code produced by `fieldforge-codegen`.
//!
//! This crate provides:
//! - The [`Field`] trait: an editable, observable value cell
//! - Leaf factories for primitives, enumerations and singletons
//! - `Combined1` through `Combined10` for product types
//! - [`Polymorphic`] for closed sums, [`Nullable`] for optional values and
//!   [`Transform`] for value wrappers
//! - [`FieldFactory`], the interface every generated factory implements

pub mod combined;
pub mod error;
pub mod factory;
pub mod field;
pub mod leaf;
pub mod nullable;
pub mod polymorphic;
pub mod transform;

pub use combined::{
    Combined1, Combined2, Combined3, Combined4, Combined5, Combined6, Combined7, Combined8,
    Combined9, Combined10, MAX_ARITY,
};
pub use error::{FieldError, Result};
pub use factory::{FieldFactory, FnFactory, SharedFactory};
pub use field::{BoxedField, Field, FieldShape, Observer, ObserverId, Observers};
pub use leaf::{
    BoolField, EnumField, F32Field, F64Field, Fixed, FixedField, I32Field, I64Field, Leaf,
    StringField, U8Field,
};
pub use nullable::{Nullable, NullableField};
pub use polymorphic::{Polymorphic, Variant};
pub use transform::{Transform, TransformField};
