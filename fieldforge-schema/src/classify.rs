//! Type classification.
//!
//! [`TypeClassifier`] makes the per-type shape decision without looking at
//! member types. The recursive part, classifying members and variants with a
//! pass-scoped memo, lives in [`crate::resolve`]. Together they map every
//! descriptor to exactly one [`Classification`].

use crate::resolve::ResolutionPass;
use crate::types::{
    ConstructorStyle, MemberDescriptor, PrimitiveKind, TypeCatalog, TypeDescriptor, TypeKind,
};
use std::fmt;
use std::rc::Rc;

/// Largest number of members a product may have.
pub const MAX_MEMBERS: usize = 10;

/// How a type is edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Built-in primitive leaf.
    Primitive(PrimitiveKind),
    /// Enumeration leaf with entries in declaration order.
    Enum(Vec<String>),
    /// Constant singleton.
    Singleton {
        /// True for a bare path, false for a `Marker {}` constructor.
        is_valueless: bool,
    },
    /// Product of 1 to 10 members.
    Product(ProductShape),
    /// Closed sum whose variants are all products or singletons.
    Sum(SumShape),
    /// Type with an existing factory at the given path.
    External(String),
    /// Type that cannot be edited, with the reason.
    Unsupported(String),
}

impl Classification {
    /// Returns the classification name used in diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Primitive(_) => "primitive",
            Self::Enum(_) => "enum",
            Self::Singleton { .. } => "singleton",
            Self::Product(_) => "product",
            Self::Sum(_) => "sum",
            Self::External(_) => "external",
            Self::Unsupported(_) => "unsupported",
        }
    }

    /// Returns false for `Unsupported`.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }

    /// Returns the reason of an `Unsupported` classification.
    #[must_use]
    pub fn unsupported_reason(&self) -> Option<&str> {
        match self {
            Self::Unsupported(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => write!(f, "primitive({})", kind.name()),
            Self::Enum(entries) => write!(f, "enum[{}]", entries.join(", ")),
            Self::Singleton { is_valueless: true } => f.write_str("singleton"),
            Self::Singleton { is_valueless: false } => f.write_str("singleton(marker)"),
            Self::Product(product) => {
                f.write_str("product(")?;
                for (i, member) in product.members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", member.name, member.classification.kind_name())?;
                    if member.modifiers.nullable {
                        f.write_str("?")?;
                    }
                }
                f.write_str(")")
            }
            Self::Sum(sum) => {
                let names: Vec<&str> = sum.variants.iter().map(|v| v.name.as_str()).collect();
                write!(f, "sum[{}]", names.join(" | "))
            }
            Self::External(path) => write!(f, "external({path})"),
            Self::Unsupported(reason) => write!(f, "unsupported: {reason}"),
        }
    }
}

/// Resolved members of a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductShape {
    /// Constructor shape.
    pub style: ConstructorStyle,
    /// Members in constructor order.
    pub members: Vec<ResolvedMember>,
}

/// One classified product member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMember {
    /// Member name.
    pub name: String,
    /// Qualified name of the declared member type.
    pub type_name: String,
    /// Classification of the member type. For value wrappers this is the
    /// wrapped primitive.
    pub classification: Rc<Classification>,
    /// Member modifiers.
    pub modifiers: MemberModifiers,
}

/// Modifiers carried by a member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberModifiers {
    /// Member is `Option<type_name>`.
    pub nullable: bool,
    /// Member type is a value wrapper around a primitive.
    pub value_wrapper: Option<ValueWrapper>,
}

/// A one-member product flagged as a value, wrapping a primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueWrapper {
    /// Wrapped primitive.
    pub primitive: PrimitiveKind,
    /// Name of the wrapped member (`0` for tuple structs).
    pub member: String,
    /// Constructor shape of the wrapper.
    pub style: ConstructorStyle,
}

/// Resolved variants of a sum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumShape {
    /// Variants in declaration order.
    pub variants: Vec<ResolvedVariant>,
}

/// One classified sum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariant {
    /// Variant name (last path segment).
    pub name: String,
    /// Qualified variant name, `Owner::Variant`.
    pub type_name: String,
    /// `Product` or `Singleton`.
    pub classification: Rc<Classification>,
}

/// Non-recursive shape decision for one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape<'a> {
    /// Built-in primitive.
    Primitive(PrimitiveKind),
    /// Enumeration with at least one entry.
    Enum(&'a [String]),
    /// Singleton.
    Singleton {
        /// See [`Classification::Singleton`].
        is_valueless: bool,
    },
    /// Product with 1 to 10 members whose types are still unclassified.
    Product {
        /// Constructor shape.
        style: ConstructorStyle,
        /// Unresolved members.
        members: &'a [MemberDescriptor],
    },
    /// Sum with at least one variant, variants still unclassified.
    Sum {
        /// Unresolved variants.
        variants: &'a [TypeDescriptor],
    },
    /// Type with an existing factory.
    External(&'a str),
    /// Terminal failure with its reason.
    Unsupported(String),
}

/// Maps descriptors to their shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeClassifier;

impl TypeClassifier {
    /// Decides the shape of a top-level type.
    ///
    /// Products and sums need a companion slot to host the generated factory.
    #[must_use]
    pub fn shape(descriptor: &TypeDescriptor) -> TypeShape<'_> {
        Self::decide(descriptor, true)
    }

    /// Decides the shape of a sum variant. Variants are hosted by the sum's
    /// factory, so no companion slot is needed.
    #[must_use]
    pub fn variant_shape(descriptor: &TypeDescriptor) -> TypeShape<'_> {
        Self::decide(descriptor, false)
    }

    /// Classifies a descriptor and everything reachable from it in a fresh
    /// resolution pass.
    #[must_use]
    pub fn classify(catalog: &TypeCatalog, descriptor: &TypeDescriptor) -> Rc<Classification> {
        ResolutionPass::new(catalog).classify(descriptor)
    }

    fn decide(descriptor: &TypeDescriptor, require_companion: bool) -> TypeShape<'_> {
        let name = &descriptor.name;

        if let Some(kind) = PrimitiveKind::from_rust_name(name) {
            return TypeShape::Primitive(kind);
        }

        match &descriptor.kind {
            TypeKind::Primitive(kind) => TypeShape::Primitive(*kind),
            TypeKind::Enumeration { entries } if entries.is_empty() => {
                TypeShape::Unsupported(format!("enumeration '{name}' has no entries"))
            }
            TypeKind::Enumeration { entries } => TypeShape::Enum(entries),
            TypeKind::Singleton { is_valueless } => TypeShape::Singleton {
                is_valueless: *is_valueless,
            },
            TypeKind::Product {
                members,
                style,
                has_companion,
                ..
            } => {
                if require_companion && !has_companion {
                    TypeShape::Unsupported(format!("product '{name}' has no companion slot"))
                } else if members.is_empty() || members.len() > MAX_MEMBERS {
                    TypeShape::Unsupported(format!(
                        "product '{name}' member count {} out of range 1..={MAX_MEMBERS}",
                        members.len()
                    ))
                } else {
                    TypeShape::Product {
                        style: *style,
                        members,
                    }
                }
            }
            TypeKind::Sum {
                variants,
                has_companion,
            } => {
                if require_companion && !has_companion {
                    TypeShape::Unsupported(format!("sum '{name}' has no companion slot"))
                } else if variants.is_empty() {
                    TypeShape::Unsupported(format!("sum '{name}' has no variants"))
                } else {
                    TypeShape::Sum { variants }
                }
            }
            TypeKind::External { factory } => TypeShape::External(factory),
            TypeKind::Opaque => TypeShape::Unsupported(format!(
                "type '{name}' is opaque: not a primitive, enumeration, singleton, product or sum"
            )),
        }
    }
}
