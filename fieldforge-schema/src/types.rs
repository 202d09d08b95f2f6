//! Type descriptor definitions.
//!
//! This module contains the structural representation of the types a field
//! schema describes: primitives, enumerations, singletons, products, sums,
//! opaque types and externally generated types. Descriptors are plain data and
//! are never mutated once added to a [`TypeCatalog`].

use crate::naming::NameCase;
use std::collections::HashMap;

/// Complete field schema: declared types plus generation requests.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    /// Package name, used in generated module docs.
    pub package: String,
    /// Path of the runtime crate generated code refers to, if overridden.
    pub runtime: Option<String>,
    /// Whether unsupported members become caller-supplied factories.
    pub tolerate_unsupported: bool,
    /// Casing of derived function names.
    pub name_case: NameCase,
    /// Declared types.
    pub catalog: TypeCatalog,
    /// Generation requests in declaration order.
    pub requests: Vec<GenerationRequest>,
}

impl FieldSchema {
    /// Creates a new empty schema.
    #[must_use]
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            runtime: None,
            tolerate_unsupported: false,
            name_case: NameCase::default(),
            catalog: TypeCatalog::new(),
            requests: Vec::new(),
        }
    }

    /// Adds a type definition to the schema.
    pub fn add_type(&mut self, descriptor: TypeDescriptor) {
        self.catalog.add_type(descriptor);
    }

    /// Adds a generation request.
    pub fn add_request(&mut self, request: GenerationRequest) {
        self.requests.push(request);
    }
}

/// Name-indexed collection of type descriptors.
///
/// The seven primitive types are always present. Declared types keep their
/// declaration order.
#[derive(Debug, Clone)]
pub struct TypeCatalog {
    types: Vec<TypeDescriptor>,
    builtin_count: usize,
    type_map: HashMap<String, usize>,
}

impl TypeCatalog {
    /// Creates a catalog holding only the primitive types.
    #[must_use]
    pub fn new() -> Self {
        let mut catalog = Self {
            types: Vec::new(),
            builtin_count: 0,
            type_map: HashMap::new(),
        };
        for kind in PrimitiveKind::ALL {
            catalog.add_type(TypeDescriptor::primitive(kind));
        }
        catalog.builtin_count = catalog.types.len();
        catalog
    }

    /// Adds a type definition. A later definition with the same name shadows
    /// the earlier one for lookups.
    pub fn add_type(&mut self, descriptor: TypeDescriptor) {
        let name = descriptor.name.clone();
        let index = self.types.len();
        self.types.push(descriptor);
        self.type_map.insert(name, index);
    }

    /// Looks up a type by qualified name.
    #[must_use]
    pub fn get_type(&self, name: &str) -> Option<&TypeDescriptor> {
        self.type_map.get(name).map(|&idx| &self.types[idx])
    }

    /// Returns true if a type with the given name exists.
    #[must_use]
    pub fn has_type(&self, name: &str) -> bool {
        self.type_map.contains_key(name)
    }

    /// Returns the declared (non-primitive) types in declaration order.
    #[must_use]
    pub fn declared(&self) -> &[TypeDescriptor] {
        &self.types[self.builtin_count..]
    }
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Structural description of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Qualified name, a Rust path such as `crate::geo::Point` or `Shape::Circle`.
    pub name: String,
    /// Kind-specific content.
    pub kind: TypeKind,
}

impl TypeDescriptor {
    /// Creates a primitive descriptor.
    #[must_use]
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self {
            name: kind.rust_name().to_string(),
            kind: TypeKind::Primitive(kind),
        }
    }

    /// Creates an enumeration descriptor.
    #[must_use]
    pub fn enumeration(name: impl Into<String>, entries: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Enumeration { entries },
        }
    }

    /// Creates a singleton descriptor.
    #[must_use]
    pub fn singleton(name: impl Into<String>, is_valueless: bool) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Singleton { is_valueless },
        }
    }

    /// Creates a product descriptor with a companion slot.
    #[must_use]
    pub fn product(
        name: impl Into<String>,
        style: ConstructorStyle,
        members: Vec<MemberDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Product {
                members,
                style,
                has_companion: true,
                is_value: false,
            },
        }
    }

    /// Creates a sum descriptor with a companion slot.
    #[must_use]
    pub fn sum(name: impl Into<String>, variants: Vec<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Sum {
                variants,
                has_companion: true,
            },
        }
    }

    /// Creates an opaque descriptor.
    #[must_use]
    pub fn opaque(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Opaque,
        }
    }

    /// Creates a descriptor for a type whose factory already exists.
    #[must_use]
    pub fn external(name: impl Into<String>, factory: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::External {
                factory: factory.into(),
            },
        }
    }

    /// Sets the companion slot flag of a product or sum.
    #[must_use]
    pub fn with_companion(mut self, companion: bool) -> Self {
        match &mut self.kind {
            TypeKind::Product { has_companion, .. } | TypeKind::Sum { has_companion, .. } => {
                *has_companion = companion;
            }
            _ => {}
        }
        self
    }

    /// Marks a product as a value wrapper.
    #[must_use]
    pub fn with_value(mut self, value: bool) -> Self {
        if let TypeKind::Product { is_value, .. } = &mut self.kind {
            *is_value = value;
        }
        self
    }

    /// Returns the last path segment of the qualified name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    /// Returns the kind name used in diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Returns the members of a product, empty for other kinds.
    #[must_use]
    pub fn members(&self) -> &[MemberDescriptor] {
        match &self.kind {
            TypeKind::Product { members, .. } => members,
            _ => &[],
        }
    }

    /// Returns the variants of a sum, empty for other kinds.
    #[must_use]
    pub fn variants(&self) -> &[TypeDescriptor] {
        match &self.kind {
            TypeKind::Sum { variants, .. } => variants,
            _ => &[],
        }
    }
}

/// Returns the last `::` segment of a path.
#[must_use]
pub fn simple_name(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Kind-specific descriptor content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// Built-in primitive.
    Primitive(PrimitiveKind),
    /// Enumeration with ordered entry names.
    Enumeration {
        /// Entry names in declaration order.
        entries: Vec<String>,
    },
    /// Type with exactly one instance.
    Singleton {
        /// True if the instance is a bare path (`Dot`), false for a
        /// zero-argument marker constructor (`Marker {}`).
        is_valueless: bool,
    },
    /// Type with named members and a constructor.
    Product {
        /// Members in constructor order.
        members: Vec<MemberDescriptor>,
        /// Constructor shape.
        style: ConstructorStyle,
        /// True if an inherent `impl` block can be attached to the type.
        has_companion: bool,
        /// True for value wrappers (newtypes).
        is_value: bool,
    },
    /// Closed sum of variants.
    Sum {
        /// Direct variants, each an inline descriptor named `Owner::Variant`.
        variants: Vec<TypeDescriptor>,
        /// True if an inherent `impl` block can be attached to the type.
        has_companion: bool,
    },
    /// Type the engine cannot decompose.
    Opaque,
    /// Type whose factory was generated elsewhere.
    External {
        /// Path of the factory type.
        factory: String,
    },
}

impl TypeKind {
    /// Returns the kind name used in diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Primitive(_) => "primitive",
            Self::Enumeration { .. } => "enumeration",
            Self::Singleton { .. } => "singleton",
            Self::Product { .. } => "product",
            Self::Sum { .. } => "sum",
            Self::Opaque => "opaque",
            Self::External { .. } => "external",
        }
    }
}

/// One member of a product type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDescriptor {
    /// Member name; `0`, `1`, ... for positional constructors.
    pub name: String,
    /// Qualified name of the member type.
    pub type_name: String,
    /// True if the member is `Option<type_name>`.
    pub nullable: bool,
}

impl MemberDescriptor {
    /// Creates a non-nullable member.
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable: false,
        }
    }

    /// Creates a nullable member.
    #[must_use]
    pub fn nullable(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            nullable: true,
            ..Self::new(name, type_name)
        }
    }
}

/// Constructor shape of a product type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConstructorStyle {
    /// `Type { a, b }`.
    #[default]
    Named,
    /// `Type(a, b)`.
    Positional,
}

impl ConstructorStyle {
    /// Parses a constructor style from its schema name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "named" => Some(Self::Named),
            "positional" => Some(Self::Positional),
            _ => None,
        }
    }
}

/// Built-in primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `String`.
    String,
    /// `i32`.
    Int32,
    /// `i64`.
    Int64,
    /// `f32`.
    Float32,
    /// `f64`.
    Float64,
    /// `bool`.
    Bool,
    /// `u8`.
    Byte,
}

impl PrimitiveKind {
    /// All primitive kinds.
    pub const ALL: [Self; 7] = [
        Self::String,
        Self::Int32,
        Self::Int64,
        Self::Float32,
        Self::Float64,
        Self::Bool,
        Self::Byte,
    ];

    /// Returns the Rust type name, which is also the qualified type name.
    #[must_use]
    pub const fn rust_name(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Int32 => "i32",
            Self::Int64 => "i64",
            Self::Float32 => "f32",
            Self::Float64 => "f64",
            Self::Bool => "bool",
            Self::Byte => "u8",
        }
    }

    /// Returns the kind name used in diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Bool => "bool",
            Self::Byte => "byte",
        }
    }

    /// Parses a primitive kind from its Rust type name.
    #[must_use]
    pub fn from_rust_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.rust_name() == name)
    }

    /// Returns a Rust expression evaluating to the default value.
    #[must_use]
    pub const fn default_expr(&self) -> &'static str {
        match self {
            Self::String => "String::new()",
            Self::Int32 | Self::Int64 | Self::Byte => "0",
            Self::Float32 | Self::Float64 => "0.0",
            Self::Bool => "false",
        }
    }
}

/// How a generated entry point is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// Module-level function returning a field for any type.
    Field,
    /// Factory struct plus a companion function on a product or sum.
    Factory,
}

/// Request to generate an entry point for one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Qualified name of the subject type.
    pub type_name: String,
    /// Explicit function name; derived from the type name when absent.
    pub function_name: Option<String>,
    /// Whether the label parameter defaults to the function name.
    pub auto_label: bool,
    /// Whether the entry point edits `Option<type_name>`.
    pub nullable: bool,
    /// Entry point kind.
    pub directive: Directive,
}

impl GenerationRequest {
    /// Creates a factory request.
    #[must_use]
    pub fn factory(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            function_name: None,
            auto_label: true,
            nullable: false,
            directive: Directive::Factory,
        }
    }

    /// Creates a field request.
    #[must_use]
    pub fn field(type_name: impl Into<String>) -> Self {
        Self {
            directive: Directive::Field,
            ..Self::factory(type_name)
        }
    }

    /// Sets an explicit function name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = Some(name.into());
        self
    }

    /// Sets whether the label defaults to the function name.
    #[must_use]
    pub fn with_auto_label(mut self, auto_label: bool) -> Self {
        self.auto_label = auto_label;
        self
    }

    /// Sets whether the entry point edits an optional value.
    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}
