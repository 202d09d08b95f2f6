//! # FieldForge Schema
//!
//! Type descriptors, schema parsing and type classification.
//!
//! This crate provides:
//! - The type descriptor model and the name-indexed type catalog
//! - XML field schema parsing and validation
//! - Classification of types into primitives, enums, singletons, products and sums
//! - Recursive member and variant resolution with a per-pass memo
//! - Naming of generated factories, functions and accessors

pub mod classify;
pub mod error;
pub mod naming;
pub mod parser;
pub mod resolve;
pub mod types;
pub mod validation;

pub use classify::{
    Classification, MAX_MEMBERS, MemberModifiers, ProductShape, ResolvedMember, ResolvedVariant,
    SumShape, TypeClassifier, TypeShape, ValueWrapper,
};
pub use error::{ParseError, SchemaError};
pub use naming::{NameCase, NamingResolver, ResolvedName};
pub use parser::{parse_schema, parse_schema_file};
pub use resolve::{PropertyResolver, ResolutionPass, SubclassResolver, value_wrapper_of};
pub use types::{
    ConstructorStyle, Directive, FieldSchema, GenerationRequest, MemberDescriptor, PrimitiveKind,
    TypeCatalog, TypeDescriptor, TypeKind,
};
pub use validation::validate_schema;
