//! Build script helpers.
//!
//! ```ignore
//! // build.rs
//! fn main() {
//!     fieldforge_codegen::build::compile_schema("schema/fields.xml", "fields.rs")
//!         .expect("field schema should generate");
//! }
//!
//! // src/lib.rs
//! include!(concat!(env!("OUT_DIR"), "/fields.rs"));
//! ```

use crate::error::CodegenError;
use crate::generate_from_file;
use std::path::{Path, PathBuf};

/// Generates `out_file` inside `OUT_DIR` from a schema file and registers the
/// schema for rebuilds.
///
/// # Arguments
/// * `schema_path` - Path to the field schema
/// * `out_file` - File name, relative to `OUT_DIR`
///
/// # Returns
/// Path of the written file.
///
/// # Errors
/// Returns `CodegenError` if `OUT_DIR` is not set, or if generation or
/// writing fails.
pub fn compile_schema(
    schema_path: impl AsRef<Path>,
    out_file: impl AsRef<Path>,
) -> Result<PathBuf, CodegenError> {
    let out_dir = std::env::var_os("OUT_DIR")
        .ok_or_else(|| CodegenError::generation("OUT_DIR is not set, run from a build script"))?;
    let schema_path = schema_path.as_ref();
    println!("cargo:rerun-if-changed={}", schema_path.display());
    compile_schema_to(schema_path, Path::new(&out_dir), out_file)
}

/// Generates `file_name` inside `out_dir` from a schema file.
///
/// # Errors
/// Returns `CodegenError` if generation or writing fails.
pub fn compile_schema_to(
    schema_path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    file_name: impl AsRef<Path>,
) -> Result<PathBuf, CodegenError> {
    let code = generate_from_file(schema_path.as_ref())?;
    let target = out_dir.as_ref().join(file_name);
    std::fs::write(&target, code)?;
    tracing::info!("Wrote generated fields to {}", target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_schema_to_writes_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let schema = dir.path().join("fields.xml");
        std::fs::write(
            &schema,
            r#"<fieldSchema package="demo">
                <types>
                    <enum name="Level"><entry name="Low"/><entry name="High"/></enum>
                </types>
                <generateField type="Level" name="level"/>
            </fieldSchema>"#,
        )
        .expect("Failed to write schema");

        let target =
            compile_schema_to(&schema, dir.path(), "fields.rs").expect("Failed to compile schema");
        assert_eq!(target, dir.path().join("fields.rs"));

        let code = std::fs::read_to_string(&target).expect("Failed to read output");
        assert!(code.contains("pub fn level(label: Option<&str>, initial_value: Level)"));
        assert!(code.contains("::fieldforge_core::EnumField::new(vec![Level::Low, Level::High])"));
    }

    #[test]
    fn test_compile_schema_to_missing_schema() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let result = compile_schema_to(dir.path().join("nope.xml"), dir.path(), "out.rs");
        assert!(matches!(result, Err(CodegenError::Io(_))));
        assert!(!dir.path().join("out.rs").exists());
    }
}
