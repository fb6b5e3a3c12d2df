//! Conversion pipeline.
//!
//! The pipeline is:
//! 1. Ingest: declaration facts -> IR nodes in a fresh `TypeRegistry`
//! 2. Consolidate: merge structurally identical nodes
//! 3. Prune: keep what public or rendered declarations reach
//! 4. Codegen: registry -> `CsFile` (C# AST)
//! 5. Emit: `CsFile` -> String (via Emit trait)

use tracing::{debug, info};
use typebridge_common::facts::{parse_facts_json, DeclarationFact};

use crate::config::ConverterConfig;
use crate::csharp::{codegen_file, Emit};
use crate::diagnostics::Diagnostics;
use crate::error::ConvertError;
use crate::factory::TypeFactory;
use crate::registry::TypeRegistry;

/// Rendered module plus everything worth telling the caller about it.
#[derive(Debug)]
pub struct ConversionOutput {
    /// Generated C# source.
    pub text: String,
    /// Non-fatal findings from every stage.
    pub diagnostics: Diagnostics,
}

/// Runs conversions with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConverterConfig,
}

impl Converter {
    /// Converter using `config` for every run.
    pub const fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub const fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convert facts into one C# module. Each call uses its own registry.
    pub fn run(&self, facts: &[DeclarationFact]) -> Result<ConversionOutput, ConvertError> {
        let mut registry = self.build_registry(facts)?;
        let file = codegen_file(&registry, &self.config);
        debug!(
            declarations = file.declarations.len(),
            namespace = %file.namespace,
            "Generated C# declarations"
        );

        let text = file.emit();
        let diagnostics = registry.take_diagnostics();
        info!(
            bytes = text.len(),
            diagnostics = diagnostics.len(),
            warnings = diagnostics.warnings().count(),
            "Conversion finished"
        );
        Ok(ConversionOutput { text, diagnostics })
    }

    /// Parse a JSON facts document and convert it.
    pub fn run_json(&self, json: &str) -> Result<ConversionOutput, ConvertError> {
        let facts = parse_facts_json(json)?;
        self.run(&facts)
    }

    /// Ingest, consolidate and prune, stopping short of code generation.
    pub fn build_registry(&self, facts: &[DeclarationFact]) -> Result<TypeRegistry, ConvertError> {
        let mut registry = TypeRegistry::new();
        TypeFactory::new(&mut registry, &self.config, facts).ingest()?;

        let merged = registry.consolidate();
        let pruned = registry.prune();
        info!(
            facts = facts.len(),
            merged,
            pruned,
            live = registry.live_count(),
            "Built type registry"
        );
        Ok(registry)
    }
}

/// Convert facts with the default configuration.
pub fn convert(facts: &[DeclarationFact]) -> Result<String, ConvertError> {
    Ok(Converter::default().run(facts)?.text)
}

/// Convert a JSON facts document with the default configuration.
pub fn convert_json(json: &str) -> Result<String, ConvertError> {
    Ok(Converter::default().run_json(json)?.text)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use typebridge_common::facts::{PropertyFact, TypeDescription};
    use typebridge_common::PrimitiveKind;

    fn string() -> TypeDescription {
        TypeDescription::primitive(PrimitiveKind::String)
    }

    #[test]
    fn test_convert_wraps_namespace() {
        let facts = vec![DeclarationFact::new(
            "Greeting",
            TypeDescription::object(vec![PropertyFact::new("text", string())]),
        )
        .public()];
        let text = convert(&facts).unwrap();
        assert!(text.starts_with("// <auto-generated />\n"));
        assert!(text.contains("namespace Generated\n{\n"));
        assert!(text.contains("    public class Greeting\n"));
        assert!(text.contains("        public string Text { get; set; }"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_empty_input() {
        let text = convert(&[]).unwrap();
        assert!(text.contains("namespace Generated\n{\n}\n"));
    }

    #[test]
    fn test_run_is_repeatable() {
        let facts = vec![DeclarationFact::new(
            "Greeting",
            TypeDescription::object(vec![PropertyFact::new("text", string())]),
        )
        .public()];
        let converter = Converter::new(ConverterConfig::default().with_namespace("Acme"));
        let first = converter.run(&facts).unwrap();
        let second = converter.run(&facts).unwrap();
        assert_eq!(first.text, second.text);
        assert_eq!(converter.config().namespace, "Acme");
    }

    #[test]
    fn test_bad_json_is_fatal() {
        let err = convert_json("{ not json").unwrap_err();
        assert!(matches!(err, ConvertError::Facts(_)));
    }
}
