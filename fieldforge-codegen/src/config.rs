//! Generator configuration.

use fieldforge_schema::{FieldSchema, NameCase};

/// Default path of the runtime crate referenced by generated code.
pub const DEFAULT_RUNTIME_PATH: &str = "::fieldforge_core";

/// Settings for one generator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    runtime_path: String,
    tolerate_unsupported: bool,
    name_case: NameCase,
    emit_docs: bool,
}

impl GeneratorConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
            tolerate_unsupported: false,
            name_case: NameCase::Snake,
            emit_docs: true,
        }
    }

    /// Creates a configuration seeded from the schema root attributes.
    #[must_use]
    pub fn from_schema(schema: &FieldSchema) -> Self {
        let config = Self::new()
            .tolerate_unsupported(schema.tolerate_unsupported)
            .name_case(schema.name_case);
        match &schema.runtime {
            Some(runtime) => config.runtime_path(runtime.clone()),
            None => config,
        }
    }

    /// Sets the runtime crate path, e.g. `::fieldforge::core`.
    #[must_use]
    pub fn runtime_path(mut self, path: impl Into<String>) -> Self {
        self.runtime_path = path.into().trim_end_matches("::").to_string();
        self
    }

    /// Sets whether unsupported members become caller-supplied factories
    /// instead of failing generation.
    #[must_use]
    pub fn tolerate_unsupported(mut self, tolerate: bool) -> Self {
        self.tolerate_unsupported = tolerate;
        self
    }

    /// Sets the casing of derived function names.
    #[must_use]
    pub fn name_case(mut self, case: NameCase) -> Self {
        self.name_case = case;
        self
    }

    /// Sets whether doc comments are emitted on generated items.
    #[must_use]
    pub fn emit_docs(mut self, emit: bool) -> Self {
        self.emit_docs = emit;
        self
    }

    /// Returns the runtime crate path.
    #[must_use]
    pub fn runtime(&self) -> &str {
        &self.runtime_path
    }

    /// Returns true if unsupported members are tolerated.
    #[must_use]
    pub const fn tolerates_unsupported(&self) -> bool {
        self.tolerate_unsupported
    }

    /// Returns the casing of derived function names.
    #[must_use]
    pub const fn case(&self) -> NameCase {
        self.name_case
    }

    /// Returns true if doc comments are emitted.
    #[must_use]
    pub const fn docs(&self) -> bool {
        self.emit_docs
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.runtime(), "::fieldforge_core");
        assert!(!config.tolerates_unsupported());
        assert_eq!(config.case(), NameCase::Snake);
        assert!(config.docs());
    }

    #[test]
    fn test_builder_overrides() {
        let config = GeneratorConfig::new()
            .runtime_path("::fieldforge::core::")
            .tolerate_unsupported(true)
            .name_case(NameCase::LowerCamel)
            .emit_docs(false);
        assert_eq!(config.runtime(), "::fieldforge::core");
        assert!(config.tolerates_unsupported());
        assert_eq!(config.case(), NameCase::LowerCamel);
        assert!(!config.docs());
    }

    #[test]
    fn test_from_schema() {
        let mut schema = FieldSchema::new("demo");
        schema.runtime = Some("crate::runtime".to_string());
        schema.tolerate_unsupported = true;
        schema.name_case = NameCase::LowerCamel;

        let config = GeneratorConfig::from_schema(&schema);
        assert_eq!(config.runtime(), "crate::runtime");
        assert!(config.tolerates_unsupported());
        assert_eq!(config.case(), NameCase::LowerCamel);

        let overridden = GeneratorConfig::from_schema(&schema).tolerate_unsupported(false);
        assert!(!overridden.tolerates_unsupported());
    }
}
