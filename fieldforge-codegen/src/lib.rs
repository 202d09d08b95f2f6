//! # FieldForge Codegen
//!
//! Field factory generation from field schemas.
//!
//! This crate provides:
//! - Factory struct generation for products, sums and product variants
//! - Entry point generation for `generate` and `generateField` requests
//! - Generator configuration seeded from the schema
//! - Build script integration

pub mod build;
pub mod config;
pub mod error;
pub mod generator;

pub use config::{DEFAULT_RUNTIME_PATH, GeneratorConfig};
pub use error::CodegenError;
pub use generator::Generator;

use fieldforge_schema::FieldSchema;

/// Generates Rust code from a field schema XML string.
///
/// The generator configuration is taken from the schema root attributes.
///
/// # Arguments
/// * `xml` - Field schema content
///
/// # Returns
/// Generated Rust code as a string.
///
/// # Errors
/// Returns `CodegenError` if parsing, validation, or generation fails.
pub fn generate_from_xml(xml: &str) -> Result<String, CodegenError> {
    let schema = fieldforge_schema::parse_schema(xml)?;
    let config = GeneratorConfig::from_schema(&schema);
    generate_schema(&schema, config)
}

/// Generates Rust code from a field schema file.
///
/// # Arguments
/// * `path` - Path to the field schema file
///
/// # Returns
/// Generated Rust code as a string.
///
/// # Errors
/// Returns `CodegenError` if reading, parsing, validation, or generation fails.
pub fn generate_from_file(path: &std::path::Path) -> Result<String, CodegenError> {
    let xml = std::fs::read_to_string(path)?;
    generate_from_xml(&xml)
}

/// Validates a parsed schema and generates all of its requests.
///
/// # Errors
/// Returns `CodegenError` if validation or generation fails.
pub fn generate_schema(schema: &FieldSchema, config: GeneratorConfig) -> Result<String, CodegenError> {
    fieldforge_schema::validate_schema(schema)?;
    Generator::with_config(&schema.catalog, config).generate(&schema.requests)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
        <fieldSchema package="demo" runtime="::fieldforge::core">
            <types>
                <product name="Point">
                    <member name="x" type="f64"/>
                    <member name="y" type="f64"/>
                </product>
            </types>
            <generate type="Point"/>
        </fieldSchema>
    "#;

    #[test]
    fn test_generate_from_xml_uses_schema_runtime() {
        let output = generate_from_xml(SCHEMA).expect("Failed to generate");
        assert!(output.contains("impl ::fieldforge::core::FieldFactory<Point> for PointFieldFactory"));
        assert!(output.contains("pub fn point(label: Option<&str>, initial_value: Point)"));
    }

    #[test]
    fn test_generate_schema_validates_first() {
        let xml = r#"
            <fieldSchema package="demo">
                <types>
                    <product name="Pair">
                        <member name="a" type="i32"/>
                        <member name="a" type="i32"/>
                    </product>
                </types>
            </fieldSchema>
        "#;
        let err = generate_from_xml(xml).expect_err("duplicate member should fail");
        assert!(matches!(err, CodegenError::Schema(_)));
    }

    #[test]
    fn test_generate_from_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("points.xml");
        std::fs::write(&path, SCHEMA).expect("Failed to write schema");

        let output = generate_from_file(&path).expect("Failed to generate");
        assert!(output.contains("pub struct PointFieldFactory;"));

        let missing = generate_from_file(&dir.path().join("missing.xml"));
        assert!(matches!(missing, Err(CodegenError::Io(_))));
    }

    #[test]
    fn test_parse_error_surfaces() {
        let err = generate_from_xml("<fieldSchema><types><bogus name=\"X\"/></types></fieldSchema>")
            .expect_err("unknown element should fail");
        assert!(matches!(err, CodegenError::Parse(_)));
    }
}
