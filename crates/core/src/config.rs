//! Converter configuration.
//!
//! Built in code or parsed from a TOML string. Reading the file from disk is
//! left to the caller.

use serde::Deserialize;
use typebridge_common::Casing;

use crate::error::ConvertError;

/// Options controlling how the registry is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterConfig {
    /// Namespace wrapping every emitted declaration.
    pub namespace: String,
    /// Casing for class, enum and union names.
    pub type_casing: Casing,
    /// Casing for properties and constants.
    pub property_casing: Casing,
    /// Casing for enum members.
    pub enum_member_casing: Casing,
    /// Turn unions of record shapes into sealed union families.
    pub class_unions: bool,
    /// Largest union family generated when `class_unions` is on.
    pub max_class_union_arity: usize,
    /// Emit `[JsonPropertyName]` when the rendered name differs from the source.
    pub json_attributes: bool,
    /// Name of the static class holding module-level constants.
    pub constants_class: String,
    /// Extra comment lines placed under the auto-generated marker.
    pub header: Option<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            namespace: "Generated".to_string(),
            type_casing: Casing::Pascal,
            property_casing: Casing::Pascal,
            enum_member_casing: Casing::Pascal,
            class_unions: false,
            max_class_union_arity: 8,
            json_attributes: true,
            constants_class: "Constants".to_string(),
            header: None,
        }
    }
}

impl ConverterConfig {
    /// Parse a config from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConvertError> {
        Ok(toml::from_str(text)?)
    }

    /// Set the enclosing namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Toggle class-union generation.
    pub fn with_class_unions(mut self, enabled: bool) -> Self {
        self.class_unions = enabled;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConverterConfig::default();
        assert_eq!(config.namespace, "Generated");
        assert_eq!(config.type_casing, Casing::Pascal);
        assert!(!config.class_unions);
        assert_eq!(config.max_class_union_arity, 8);
        assert!(config.json_attributes);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = ConverterConfig::from_toml_str(
            r#"
namespace = "Acme.Models"
property_casing = "camel"
class_unions = true
"#,
        )
        .unwrap();
        assert_eq!(config.namespace, "Acme.Models");
        assert_eq!(config.property_casing, Casing::Camel);
        assert_eq!(config.enum_member_casing, Casing::Pascal);
        assert!(config.class_unions);
        assert_eq!(config.constants_class, "Constants");
    }

    #[test]
    fn test_from_toml_rejects_unknown_keys() {
        let err = ConverterConfig::from_toml_str("nmespace = \"x\"").unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));
    }

    #[test]
    fn test_from_toml_rejects_bad_casing() {
        assert!(ConverterConfig::from_toml_str("type_casing = \"screaming\"").is_err());
    }
}
