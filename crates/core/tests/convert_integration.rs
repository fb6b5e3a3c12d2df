//! End-to-end tests for the conversion pipeline.
//!
//! Each test feeds declaration facts (as Rust values or JSON) through
//! `Converter` and checks the emitted C#.
//!
//! Set `TYPEBRIDGE_LOG=debug` to see pipeline logs.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Once;

use similar::{ChangeTag, TextDiff};
use tracing_subscriber::EnvFilter;
use typebridge_common::facts::{
    DeclarationFact, EnumMemberFact, EnumValue, IndexKey, PropertyFact, TypeDescription,
    TypeParameterFact,
};
use typebridge_common::PrimitiveKind;
use typebridge_core::{Converter, ConverterConfig, DiagnosticKind};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env("TYPEBRIDGE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

fn string() -> TypeDescription {
    TypeDescription::primitive(PrimitiveKind::String)
}

fn number() -> TypeDescription {
    TypeDescription::primitive(PrimitiveKind::Number)
}

fn record(name: &str, properties: Vec<PropertyFact>) -> DeclarationFact {
    DeclarationFact::new(name, TypeDescription::object(properties))
}

fn run(config: ConverterConfig, facts: &[DeclarationFact]) -> String {
    init_tracing();
    Converter::new(config).run(facts).unwrap().text
}

/// Compare generated text line by line, panicking with a diff on mismatch.
fn assert_text(expected: &str, actual: &str) {
    if expected == actual {
        return;
    }
    let diff = TextDiff::from_lines(expected, actual);
    let mut output = String::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        output.push_str(sign);
        output.push_str(change.value());
        if change.missing_newline() {
            output.push('\n');
        }
    }
    panic!("generated C# differs from expected:\n{output}");
}

#[test]
fn test_identical_internal_shape_collapses_into_public() {
    let shape = || {
        vec![
            PropertyFact::new("id", number()),
            PropertyFact::new("name", string()),
            PropertyFact::new("tags", TypeDescription::array(string())),
        ]
    };
    let facts = vec![
        record("User", shape()).public(),
        record("InternalUser", shape()).internal(),
    ];

    let expected = r#"// <auto-generated />
using System;
using System.Collections.Generic;
using System.Text.Json.Serialization;

namespace Generated
{
    public class User
    {
        [JsonPropertyName("id")]
        public double Id { get; set; }

        [JsonPropertyName("name")]
        public string Name { get; set; }

        [JsonPropertyName("tags")]
        public string[] Tags { get; set; }
    }
}
"#;
    assert_text(expected, &run(ConverterConfig::default(), &facts));
}

#[test]
fn test_generics_instances_dictionaries_and_enums() {
    let facts = vec![
        record(
            "Page",
            vec![
                PropertyFact::new(
                    "items",
                    TypeDescription::array(TypeDescription::type_parameter("T")),
                ),
                PropertyFact::new("total", number()),
            ],
        )
        .with_type_parameter(TypeParameterFact::new("T"))
        .public(),
        record("User", vec![PropertyFact::new("id", number())]).public(),
        DeclarationFact::new(
            "UserPage",
            TypeDescription::generic_reference("Page", vec![TypeDescription::reference("User")]),
        )
        .public(),
        DeclarationFact::new("Scores", TypeDescription::dictionary(IndexKey::String, number()))
            .public(),
        DeclarationFact::new(
            "Status",
            TypeDescription::union(vec![
                TypeDescription::string_literal("active"),
                TypeDescription::string_literal("archived"),
            ]),
        )
        .public(),
    ];

    let mut config = ConverterConfig::default().with_namespace("Shop");
    config.json_attributes = false;

    let expected = r#"// <auto-generated />
using System;
using System.Collections.Generic;
using System.Runtime.Serialization;

namespace Shop
{
    public enum Status
    {
        [EnumMember(Value = "active")]
        Active,
        [EnumMember(Value = "archived")]
        Archived,
    }

    public class Page<T>
    {
        public T[] Items { get; set; }

        public double Total { get; set; }
    }

    public class User
    {
        public double Id { get; set; }
    }

    public class Scores : Dictionary<string, double>
    {
    }

    public class UserPage : Page<User>
    {
    }
}
"#;
    assert_text(expected, &run(config, &facts));
}

#[test]
fn test_generic_and_recursive_aliases() {
    let t = || TypeDescription::type_parameter("T");
    let user = || vec![TypeDescription::reference("User")];
    let facts = vec![
        DeclarationFact::new("Map", TypeDescription::dictionary(IndexKey::String, t()))
            .with_type_parameter(TypeParameterFact::new("T"))
            .public(),
        DeclarationFact::new("Users", TypeDescription::array(t()))
            .with_type_parameter(TypeParameterFact::new("T")),
        DeclarationFact::new(
            "Tree",
            TypeDescription::dictionary(IndexKey::String, TypeDescription::reference("Tree")),
        )
        .public(),
        record("User", vec![PropertyFact::new("id", number())]).public(),
        record(
            "Holder",
            vec![
                PropertyFact::new("lookup", TypeDescription::generic_reference("Map", user())),
                PropertyFact::new("list", TypeDescription::generic_reference("Users", user())),
                PropertyFact::new("root", TypeDescription::reference("Tree")),
            ],
        )
        .public(),
    ];

    init_tracing();
    let output = Converter::default().run(&facts).unwrap();
    let text = output.text;
    assert!(text.contains("public class Map<T> : Dictionary<string, T>\n"));
    assert!(text.contains("public class Tree : Dictionary<string, Tree>\n"));
    assert!(text.contains("public Map<User> Lookup { get; set; }"));
    assert!(text.contains("public User[] List { get; set; }"));
    assert!(text.contains("public Tree Root { get; set; }"));
    assert_eq!(
        output
            .diagnostics
            .of_kind(DiagnosticKind::UnresolvedType)
            .count(),
        0
    );
}

#[test]
fn test_private_chains_are_pruned() {
    let facts = vec![
        record("Orphan", vec![PropertyFact::new("next", TypeDescription::reference("OrphanChild"))]),
        record("OrphanChild", vec![PropertyFact::new("label", string())]),
        record("Order", vec![PropertyFact::new("line", TypeDescription::reference("OrderLine"))])
            .public(),
        record("OrderLine", vec![PropertyFact::new("quantity", number())]),
    ];

    let text = run(ConverterConfig::default(), &facts);
    assert!(text.contains("public class Order\n"));
    assert!(text.contains("public class OrderLine\n"));
    assert!(text.contains("public OrderLine Line { get; set; }"));
    assert!(!text.contains("Orphan"));
}

#[test]
fn test_name_conflict_renames_second_declaration() {
    let facts = vec![
        record("Item", vec![PropertyFact::new("label", string())])
            .with_origin("a.ts:Item")
            .public(),
        record("Item", vec![PropertyFact::new("weight", number())])
            .with_origin("b.ts:Item")
            .public(),
    ];

    init_tracing();
    let output = Converter::default().run(&facts).unwrap();
    assert!(output.text.contains("public class Item\n"));
    assert!(output.text.contains("public class Item1\n"));
    assert_eq!(output.diagnostics.of_kind(DiagnosticKind::Renamed).count(), 1);
}

#[test]
fn test_rename_is_undone_when_the_original_is_pruned() {
    let facts = vec![
        record("Item", vec![PropertyFact::new("label", string())]).with_origin("a.ts:Item"),
        record("Item", vec![PropertyFact::new("weight", number())])
            .with_origin("b.ts:Item")
            .public(),
    ];

    let text = run(ConverterConfig::default(), &facts);
    assert!(text.contains("public class Item\n"));
    assert!(text.contains("public double Weight { get; set; }"));
    assert!(!text.contains("Item1"));
    assert!(!text.contains("Label"));
}

#[test]
fn test_property_order_does_not_affect_collapse() {
    let facts = vec![
        record(
            "User",
            vec![
                PropertyFact::new("id", number()),
                PropertyFact::new("name", string()),
            ],
        )
        .public(),
        record(
            "Account",
            vec![
                PropertyFact::new("name", string()),
                PropertyFact::new("id", number()),
            ],
        )
        .public(),
        record("Order", vec![PropertyFact::new("buyer", TypeDescription::reference("Account"))])
            .public(),
    ];

    let text = run(ConverterConfig::default(), &facts);
    assert!(text.contains("public class User\n"));
    assert!(!text.contains("class Account"));
    assert!(text.contains("public User Buyer { get; set; }"));
}

#[test]
fn test_output_is_deterministic() {
    let facts = vec![
        record("B", vec![PropertyFact::new("a", TypeDescription::reference("A"))]).public(),
        record("A", vec![PropertyFact::new("b", TypeDescription::reference("B"))]).public(),
        record(
            "C",
            vec![PropertyFact::new(
                "mode",
                TypeDescription::union(vec![
                    TypeDescription::string_literal("on"),
                    TypeDescription::string_literal("off"),
                ]),
            )],
        )
        .public(),
    ];

    let first = run(ConverterConfig::default(), &facts);
    for _ in 0..5 {
        assert_text(&first, &run(ConverterConfig::default(), &facts));
    }
}

#[test]
fn test_consolidation_is_idempotent() {
    let facts = vec![
        record("User", vec![PropertyFact::new("id", number())]).public(),
        record("Customer", vec![PropertyFact::new("id", number())]),
        record("Team", vec![PropertyFact::new("lead", TypeDescription::reference("Customer"))])
            .public(),
    ];

    init_tracing();
    let mut registry = Converter::default().build_registry(&facts).unwrap();
    let live = registry.live_count();
    let declarations = registry.declarations();

    assert_eq!(registry.consolidate(), 0);
    assert_eq!(registry.live_count(), live);
    assert_eq!(registry.declarations(), declarations);
}

#[test]
fn test_enum_values_only_at_sequence_breaks() {
    let facts = vec![
        DeclarationFact::new(
            "Level",
            TypeDescription::Enum {
                members: vec![
                    EnumMemberFact::new("Low", Some(EnumValue::Number(0.0))),
                    EnumMemberFact::new("Mid", Some(EnumValue::Number(1.0))),
                    EnumMemberFact::new("High", Some(EnumValue::Number(5.0))),
                    EnumMemberFact::new("Max", Some(EnumValue::Number(6.0))),
                ],
            },
        )
        .public(),
    ];

    let text = run(ConverterConfig::default(), &facts);
    assert!(text.contains(
        "    public enum Level\n    {\n        Low,\n        Mid,\n        High = 5,\n        Max,\n    }\n"
    ));
    assert!(!text.contains("EnumMember"));
}

#[test]
fn test_class_unions_are_opt_in() {
    let facts = vec![
        record("Circle", vec![PropertyFact::new("radius", number())]).public(),
        record("Square", vec![PropertyFact::new("side", number())]).public(),
        record(
            "Drawing",
            vec![PropertyFact::new(
                "shape",
                TypeDescription::union(vec![
                    TypeDescription::reference("Circle"),
                    TypeDescription::reference("Square"),
                ]),
            )],
        )
        .public(),
    ];

    let plain = run(ConverterConfig::default(), &facts);
    assert!(plain.contains("public object Shape { get; set; }"));
    assert!(!plain.contains("Union2"));

    let text = run(ConverterConfig::default().with_class_unions(true), &facts);
    assert!(text.contains("public abstract class Union2<T1, T2>\n"));
    assert!(text.contains("public Union2<Circle, Square> Shape { get; set; }"));
    assert!(text.contains("public sealed class Case2 : Union2<T1, T2>"));
    // Union families come before records.
    assert!(text.find("class Union2").unwrap() < text.find("class Circle").unwrap());
}

#[test]
fn test_class_union_bases_keep_their_arity() {
    let union = |names: &[&str]| {
        TypeDescription::union(names.iter().map(|n| TypeDescription::reference(*n)).collect())
    };
    let facts = vec![
        record("Union2", vec![PropertyFact::new("label", string())]).public(),
        record("Circle", vec![PropertyFact::new("radius", number())]).public(),
        record("Square", vec![PropertyFact::new("side", number())]).public(),
        record("Triangle", vec![PropertyFact::new("base", number())]).public(),
        record(
            "Holder",
            vec![
                PropertyFact::new("two", union(&["Circle", "Square"])),
                PropertyFact::new("three", union(&["Circle", "Square", "Triangle"])),
            ],
        )
        .public(),
    ];

    let text = run(ConverterConfig::default().with_class_unions(true), &facts);
    assert!(text.contains("public class Union2\n"));
    assert!(text.contains("public abstract class Union2Base<T1, T2>\n"));
    assert!(text.contains("public abstract class Union3<T1, T2, T3>\n"));
    assert!(text.contains("public Union2Base<Circle, Square> Two { get; set; }"));
    assert!(text.contains("public Union3<Circle, Square, Triangle> Three { get; set; }"));
}

#[test]
fn test_constants_class() {
    let facts = vec![
        DeclarationFact::constant("maxItems", "50").public(),
        DeclarationFact::constant("regions", r#"["eu", "us"] as const"#).public(),
        DeclarationFact::constant("startedAt", "Date.now()").public(),
    ];

    init_tracing();
    let output = Converter::default().run(&facts).unwrap();
    let text = &output.text;
    assert!(text.contains("public static class Constants\n"));
    assert!(text.contains("public const double MaxItems = 50;"));
    assert!(text.contains(r#"public static readonly string[] Regions = new string[] { "eu", "us" };"#));
    assert!(text.contains("public static readonly object StartedAt = null;"));
    assert!(text.contains("/// Initializer `Date.now()` is not a constant expression."));
    assert_eq!(
        output
            .diagnostics
            .of_kind(DiagnosticKind::UnresolvedInitializer)
            .count(),
        1
    );
}

#[test]
fn test_unresolved_property_is_dropped_with_warning() {
    let facts = vec![
        record(
            "Profile",
            vec![
                PropertyFact::new("owner", TypeDescription::reference("Missing")),
                PropertyFact::new("bio", string()).optional(),
            ],
        )
        .public(),
    ];

    init_tracing();
    let output = Converter::default().run(&facts).unwrap();
    assert!(!output.text.contains("Owner"));
    assert!(output.text.contains("public string? Bio { get; set; }"));
    let warnings: Vec<_> = output.diagnostics.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, DiagnosticKind::UnresolvedType);
    assert_eq!(warnings[0].subject, "Profile.owner");
}

#[test]
fn test_json_facts_and_toml_config() {
    let json = r#"[
      {
        "name": "shipment",
        "isPublic": true,
        "comment": "A parcel on its way.",
        "body": { "type": { "kind": "object", "properties": [
          { "name": "trackingId", "type": { "kind": "primitive", "name": "string" }, "readonly": true },
          { "name": "weightKg", "type": { "kind": "primitive", "name": "number" }, "initializer": "1.5" },
          { "name": "dimensions", "type": { "kind": "object", "properties": [
            { "name": "width", "type": { "kind": "primitive", "name": "number" } }
          ] } }
        ] } }
      }
    ]"#;
    let config = ConverterConfig::from_toml_str(
        r#"
            namespace = "Logistics"
            property_casing = "camel"
            header = "Generated from shipment.ts"
        "#,
    )
    .unwrap();

    init_tracing();
    let text = Converter::new(config).run_json(json).unwrap().text;
    assert!(text.starts_with("// <auto-generated />\n// Generated from shipment.ts\n"));
    assert!(text.contains("namespace Logistics\n"));
    assert!(text.contains("    /// <summary>\n    /// A parcel on its way.\n    /// </summary>\n    public class Shipment\n"));
    assert!(text.contains("public string trackingId { get; }"));
    assert!(text.contains("public double weightKg { get; set; } = 1.5;"));
    assert!(text.contains("public ShipmentDimensionsClass dimensions { get; set; }"));
    assert!(text.contains("public class ShipmentDimensionsClass\n"));
    assert!(!text.contains("JsonPropertyName"));
}

#[test]
fn test_invalid_config_is_fatal() {
    let err = ConverterConfig::from_toml_str("unknown_key = true").unwrap_err();
    assert!(err.to_string().contains("converter config"));
}
