//! Schema validation utilities.
//!
//! Validation rejects schemas that are malformed as data: duplicate names
//! inside a type, misnumbered positional members, requests naming undeclared
//! types. Types that are well formed but cannot be edited (empty enumerations,
//! oversized products, unknown member types) pass validation and are reported
//! by classification instead.

use crate::error::SchemaError;
use crate::types::{ConstructorStyle, FieldSchema, TypeDescriptor, TypeKind};
use std::collections::HashSet;

/// Validates a parsed schema for correctness.
///
/// # Arguments
/// * `schema` - The schema to validate
///
/// # Returns
/// Ok(()) if valid, or SchemaError describing the issue.
///
/// # Errors
/// Returns `SchemaError` if validation fails.
pub fn validate_schema(schema: &FieldSchema) -> Result<(), SchemaError> {
    for descriptor in schema.catalog.declared() {
        validate_type(descriptor)?;
    }
    validate_requests(schema)?;
    Ok(())
}

/// Validates one type definition, descending into sum variants.
pub fn validate_type(descriptor: &TypeDescriptor) -> Result<(), SchemaError> {
    if descriptor.name.is_empty() {
        return Err(SchemaError::validation("type with empty name"));
    }

    match &descriptor.kind {
        TypeKind::Enumeration { entries } => {
            let mut seen = HashSet::new();
            for entry in entries {
                if !seen.insert(entry) {
                    return Err(SchemaError::duplicate_name("entry", &descriptor.name, entry));
                }
            }
        }
        TypeKind::Product { members, style, .. } => {
            let mut seen = HashSet::new();
            for (index, member) in members.iter().enumerate() {
                if !seen.insert(&member.name) {
                    return Err(SchemaError::duplicate_name(
                        "member",
                        &descriptor.name,
                        &member.name,
                    ));
                }
                if *style == ConstructorStyle::Positional && member.name != index.to_string() {
                    return Err(SchemaError::validation(format!(
                        "positional member '{}' of '{}' must be named '{}'",
                        member.name, descriptor.name, index
                    )));
                }
            }
        }
        TypeKind::Sum { variants, .. } => {
            let mut seen = HashSet::new();
            for variant in variants {
                if !seen.insert(&variant.name) {
                    return Err(SchemaError::duplicate_name(
                        "variant",
                        &descriptor.name,
                        variant.simple_name(),
                    ));
                }
                validate_type(variant)?;
            }
        }
        TypeKind::External { factory } if factory.is_empty() => {
            return Err(SchemaError::validation(format!(
                "external type '{}' has an empty factory path",
                descriptor.name
            )));
        }
        _ => {}
    }

    Ok(())
}

/// Validates generation requests against the catalog.
fn validate_requests(schema: &FieldSchema) -> Result<(), SchemaError> {
    for request in &schema.requests {
        if !schema.catalog.has_type(&request.type_name) {
            return Err(SchemaError::TypeNotFound {
                name: request.type_name.clone(),
            });
        }
        if let Some(name) = &request.function_name {
            if !is_identifier(name) {
                return Err(SchemaError::validation(format!(
                    "function name '{}' for type '{}' is not a valid identifier",
                    name, request.type_name
                )));
            }
        }
    }
    Ok(())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
