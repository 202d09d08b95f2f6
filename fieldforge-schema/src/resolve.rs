//! Recursive resolution of product members and sum variants.
//!
//! A [`ResolutionPass`] owns the memo for one generation pass: every
//! descriptor is classified at most once, and the classification is shared by
//! every place that references the type. Types still being classified sit on an
//! in-progress stack; meeting one of them again means the type is its own
//! descendant, and every type on that loop is classified as unsupported.

use crate::classify::{
    Classification, MemberModifiers, ProductShape, ResolvedMember, ResolvedVariant, SumShape,
    TypeClassifier, TypeShape, ValueWrapper,
};
use crate::types::{MemberDescriptor, PrimitiveKind, TypeCatalog, TypeDescriptor, TypeKind};
use std::collections::HashMap;
use std::rc::Rc;

/// Memo and cycle state for one generation pass.
#[derive(Debug)]
pub struct ResolutionPass<'a> {
    catalog: &'a TypeCatalog,
    memo: HashMap<String, Rc<Classification>>,
    in_progress: Vec<String>,
    cyclic: HashMap<String, String>,
}

impl<'a> ResolutionPass<'a> {
    /// Creates a pass over `catalog` with an empty memo.
    #[must_use]
    pub fn new(catalog: &'a TypeCatalog) -> Self {
        Self {
            catalog,
            memo: HashMap::new(),
            in_progress: Vec::new(),
            cyclic: HashMap::new(),
        }
    }

    /// Returns the catalog member types are looked up in.
    #[must_use]
    pub fn catalog(&self) -> &'a TypeCatalog {
        self.catalog
    }

    /// Returns the memoized classification of a type, if already classified.
    #[must_use]
    pub fn memoized(&self, name: &str) -> Option<Rc<Classification>> {
        self.memo.get(name).cloned()
    }

    /// Returns the number of memoized classifications.
    #[must_use]
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }

    /// Classifies a type by name. Unknown names are unsupported.
    pub fn classify_name(&mut self, name: &str) -> Rc<Classification> {
        let catalog = self.catalog;
        match catalog.get_type(name) {
            Some(descriptor) => self.classify(descriptor),
            None => Rc::new(Classification::Unsupported(format!(
                "unknown type '{name}'"
            ))),
        }
    }

    /// Classifies a top-level type.
    pub fn classify(&mut self, descriptor: &TypeDescriptor) -> Rc<Classification> {
        self.classify_as(descriptor, false)
    }

    /// Classifies a sum variant.
    pub fn classify_variant(&mut self, descriptor: &TypeDescriptor) -> Rc<Classification> {
        self.classify_as(descriptor, true)
    }

    fn classify_as(&mut self, descriptor: &TypeDescriptor, as_variant: bool) -> Rc<Classification> {
        let name = descriptor.name.as_str();

        if let Some(done) = self.memo.get(name) {
            return Rc::clone(done);
        }

        if let Some(start) = self.in_progress.iter().position(|entry| entry == name) {
            let mut path: Vec<&str> = self.in_progress[start..]
                .iter()
                .map(String::as_str)
                .collect();
            path.push(name);
            let path = path.join(" -> ");
            tracing::warn!("Circular type reference: {}", path);

            for entry in &self.in_progress[start..] {
                self.cyclic
                    .entry(entry.clone())
                    .or_insert_with(|| path.clone());
            }
            return Rc::new(Classification::Unsupported(format!(
                "circular type reference: {path}"
            )));
        }

        self.in_progress.push(name.to_string());

        let shape = if as_variant {
            TypeClassifier::variant_shape(descriptor)
        } else {
            TypeClassifier::shape(descriptor)
        };

        let classification = match shape {
            TypeShape::Primitive(kind) => Classification::Primitive(kind),
            TypeShape::Enum(entries) => Classification::Enum(entries.to_vec()),
            TypeShape::Singleton { is_valueless } => Classification::Singleton { is_valueless },
            TypeShape::Product { style, members } => Classification::Product(ProductShape {
                style,
                members: PropertyResolver::resolve(self, members),
            }),
            TypeShape::Sum { variants } => match SubclassResolver::resolve(self, name, variants) {
                Ok(variants) => Classification::Sum(SumShape { variants }),
                Err(reason) => Classification::Unsupported(reason),
            },
            TypeShape::External(factory) => Classification::External(factory.to_string()),
            TypeShape::Unsupported(reason) => Classification::Unsupported(reason),
        };

        self.in_progress.pop();

        let classification = match self.cyclic.remove(name) {
            Some(path) => Classification::Unsupported(format!("circular type reference: {path}")),
            None => classification,
        };

        tracing::debug!("Classified '{}' as {}", name, classification.kind_name());

        let classification = Rc::new(classification);
        self.memo.insert(name.to_string(), Rc::clone(&classification));
        classification
    }
}

/// Resolves the members of a product.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyResolver;

impl PropertyResolver {
    /// Classifies each member in constructor order.
    ///
    /// Unsupported members stay in the list; deciding what to do with them is
    /// left to the generator.
    pub fn resolve(pass: &mut ResolutionPass<'_>, members: &[MemberDescriptor]) -> Vec<ResolvedMember> {
        let mut resolved = Vec::with_capacity(members.len());

        for member in members {
            let wrapper = pass
                .catalog()
                .get_type(&member.type_name)
                .and_then(value_wrapper_of);
            let classification = match &wrapper {
                Some(wrapper) => Rc::new(Classification::Primitive(wrapper.primitive)),
                None => pass.classify_name(&member.type_name),
            };

            resolved.push(ResolvedMember {
                name: member.name.clone(),
                type_name: member.type_name.clone(),
                classification,
                modifiers: MemberModifiers {
                    nullable: member.nullable,
                    value_wrapper: wrapper,
                },
            });
        }

        resolved
    }
}

/// Resolves the variants of a sum.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubclassResolver;

impl SubclassResolver {
    /// Classifies each variant in declaration order.
    ///
    /// # Errors
    /// Returns the reason the whole sum is unsupported when a variant is
    /// neither a product nor a singleton.
    pub fn resolve(
        pass: &mut ResolutionPass<'_>,
        owner: &str,
        variants: &[TypeDescriptor],
    ) -> Result<Vec<ResolvedVariant>, String> {
        let mut resolved = Vec::with_capacity(variants.len());

        for variant in variants {
            let classification = pass.classify_variant(variant);
            match classification.as_ref() {
                Classification::Product(_) | Classification::Singleton { .. } => {}
                Classification::Unsupported(reason) => {
                    return Err(format!(
                        "variant {} of {} is unsupported: {}",
                        variant.simple_name(),
                        owner,
                        reason
                    ));
                }
                other => {
                    return Err(format!(
                        "variant {} of {} is {}, expected product or singleton",
                        variant.simple_name(),
                        owner,
                        other.kind_name()
                    ));
                }
            }

            resolved.push(ResolvedVariant {
                name: variant.simple_name().to_string(),
                type_name: variant.name.clone(),
                classification,
            });
        }

        Ok(resolved)
    }
}

/// Detects a value wrapper: a product flagged as a value with exactly one
/// non-nullable primitive member.
#[must_use]
pub fn value_wrapper_of(descriptor: &TypeDescriptor) -> Option<ValueWrapper> {
    match &descriptor.kind {
        TypeKind::Product {
            members,
            style,
            is_value: true,
            ..
        } => match members.as_slice() {
            [member] if !member.nullable => {
                PrimitiveKind::from_rust_name(&member.type_name).map(|primitive| ValueWrapper {
                    primitive,
                    member: member.name.clone(),
                    style: *style,
                })
            }
            _ => None,
        },
        _ => None,
    }
}
