//! C# code emission via the Emit trait.
//!
//! Each AST type renders itself at indentation level zero; containers indent
//! their children with [`indent`].

use super::types::{
    CsClass, CsDecl, CsEnum, CsEnumMember, CsExpr, CsField, CsFile, CsProperty, CsStaticClass,
    CsType, CsUnionFamily,
};
use super::utils::{doc_comment, escape_cs_string, format_number, indent};

/// Trait for emitting C# code from AST nodes.
pub trait Emit {
    /// Convert the AST node to its C# source text.
    fn emit(&self) -> String;
}

// =============================================================================
// Types and expressions
// =============================================================================

impl Emit for CsType {
    fn emit(&self) -> String {
        match self {
            CsType::Named { name, args } if args.is_empty() => name.clone(),
            CsType::Named { name, args } => {
                let args: Vec<String> = args.iter().map(Emit::emit).collect();
                format!("{name}<{}>", args.join(", "))
            }
            CsType::Array(inner) => format!("{}[]", inner.emit()),
        }
    }
}

impl Emit for CsExpr {
    fn emit(&self) -> String {
        match self {
            CsExpr::Null => "null".to_string(),
            CsExpr::Default => "default".to_string(),
            CsExpr::Bool(b) => b.to_string(),
            CsExpr::Number(n) => format_number(*n),
            CsExpr::String(s) => format!("\"{}\"", escape_cs_string(s)),
            CsExpr::Array { element, items } if items.is_empty() => {
                format!("new {}[0]", element.emit())
            }
            CsExpr::Array { element, items } => {
                let items: Vec<String> = items.iter().map(Emit::emit).collect();
                format!("new {}[] {{ {} }}", element.emit(), items.join(", "))
            }
        }
    }
}

// =============================================================================
// Members
// =============================================================================

impl Emit for CsProperty {
    fn emit(&self) -> String {
        let mut output = String::new();
        if let Some(comment) = &self.comment {
            output.push_str(&doc_comment(comment));
        }
        if let Some(json_name) = &self.json_name {
            output.push_str(&format!(
                "[JsonPropertyName(\"{}\")]\n",
                escape_cs_string(json_name)
            ));
        }
        let nullable = if self.nullable { "?" } else { "" };
        let accessors = if self.readonly {
            "{ get; }"
        } else {
            "{ get; set; }"
        };
        output.push_str(&format!(
            "public {}{nullable} {} {accessors}",
            self.ty.emit(),
            self.name
        ));
        if let Some(initializer) = &self.initializer {
            output.push_str(&format!(" = {};", initializer.emit()));
        }
        output
    }
}

impl Emit for CsEnumMember {
    fn emit(&self) -> String {
        let mut output = String::new();
        if let Some(wire) = &self.wire {
            output.push_str(&format!(
                "[EnumMember(Value = \"{}\")]\n",
                escape_cs_string(wire)
            ));
        }
        output.push_str(&self.name);
        if let Some(value) = self.value {
            output.push_str(&format!(" = {value}"));
        }
        output.push(',');
        output
    }
}

impl Emit for CsField {
    fn emit(&self) -> String {
        let mut output = String::new();
        if let Some(comment) = &self.comment {
            output.push_str(&doc_comment(comment));
        }
        let modifier = if self.is_const {
            "const"
        } else {
            "static readonly"
        };
        output.push_str(&format!(
            "public {modifier} {} {} = {};",
            self.ty.emit(),
            self.name,
            self.value.emit()
        ));
        output
    }
}

// =============================================================================
// Declarations
// =============================================================================

/// `Name<T1, T2>` or `Name`.
fn declared_name(name: &str, generics: &[String]) -> String {
    if generics.is_empty() {
        name.to_string()
    } else {
        format!("{name}<{}>", generics.join(", "))
    }
}

/// `{ ... }` block with members separated by blank lines.
fn block(members: &[String]) -> String {
    if members.is_empty() {
        return "{\n}".to_string();
    }
    format!("{{\n{}\n}}", indent(&members.join("\n\n"), 1))
}

impl Emit for CsClass {
    fn emit(&self) -> String {
        let mut output = String::new();
        if let Some(comment) = &self.comment {
            output.push_str(&doc_comment(comment));
        }
        output.push_str("public class ");
        output.push_str(&declared_name(&self.name, &self.generics));
        if let Some(base) = &self.base {
            output.push_str(" : ");
            output.push_str(&base.emit());
        }
        output.push('\n');

        let mut members: Vec<String> = Vec::new();
        if let Some(constructor) = &self.constructor {
            let params: Vec<String> = constructor
                .params
                .iter()
                .map(|p| format!("{} {}", p.ty.emit(), p.name))
                .collect();
            let args: Vec<&str> = constructor.params.iter().map(|p| p.name.as_str()).collect();
            members.push(format!(
                "public {}({})\n    : base({})\n{{\n}}",
                self.name,
                params.join(", "),
                args.join(", ")
            ));
        }
        members.extend(self.properties.iter().map(Emit::emit));
        output.push_str(&block(&members));
        output
    }
}

impl Emit for CsEnum {
    fn emit(&self) -> String {
        let mut output = String::new();
        if let Some(comment) = &self.comment {
            output.push_str(&doc_comment(comment));
        }
        if self.string_converter {
            output.push_str("[JsonConverter(typeof(JsonStringEnumConverter))]\n");
        }
        output.push_str(&format!("public enum {}\n", self.name));
        let members: Vec<String> = self.members.iter().map(Emit::emit).collect();
        if members.is_empty() {
            output.push_str("{\n}");
        } else {
            output.push_str(&format!("{{\n{}\n}}", indent(&members.join("\n"), 1)));
        }
        output
    }
}

impl Emit for CsStaticClass {
    fn emit(&self) -> String {
        let fields: Vec<String> = self.fields.iter().map(Emit::emit).collect();
        format!("public static class {}\n{}", self.name, block(&fields))
    }
}

impl Emit for CsUnionFamily {
    fn emit(&self) -> String {
        let params: Vec<String> = (1..=self.arity).map(|i| format!("T{i}")).collect();
        let full = declared_name(&self.name, &params);

        let visits: Vec<String> = (1..=self.arity)
            .map(|i| format!("TResult VisitCase{i}(T{i} value);"))
            .collect();
        let visitor = format!(
            "public interface IVisitor<TResult>\n{{\n{}\n}}",
            indent(&visits.join("\n"), 1)
        );

        let mut members = vec![
            format!("private {}()\n{{\n}}", self.name),
            visitor,
            "public abstract TResult Match<TResult>(IVisitor<TResult> visitor);".to_string(),
        ];
        for i in 1..=self.arity {
            members.push(format!(
                "public sealed class Case{i} : {full}\n{{\n{}\n}}",
                indent(
                    &format!(
                        "public Case{i}(T{i} value)\n{{\n    Value = value;\n}}\n\n\
                         public T{i} Value {{ get; }}\n\n\
                         public override TResult Match<TResult>(IVisitor<TResult> visitor) => visitor.VisitCase{i}(Value);"
                    ),
                    1
                )
            ));
        }

        format!("public abstract class {full}\n{}", block(&members))
    }
}

impl Emit for CsDecl {
    fn emit(&self) -> String {
        match self {
            CsDecl::Class(class) => class.emit(),
            CsDecl::Enum(enumeration) => enumeration.emit(),
            CsDecl::Constants(constants) => constants.emit(),
            CsDecl::Union(family) => family.emit(),
        }
    }
}

impl Emit for CsFile {
    fn emit(&self) -> String {
        let mut output = String::from("// <auto-generated />\n");
        for line in &self.header {
            if line.is_empty() {
                output.push_str("//\n");
            } else {
                output.push_str(&format!("// {line}\n"));
            }
        }
        for using in &self.usings {
            output.push_str(&format!("using {using};\n"));
        }
        output.push('\n');

        output.push_str(&format!("namespace {}\n{{\n", self.namespace));
        let declarations: Vec<String> = self.declarations.iter().map(Emit::emit).collect();
        if !declarations.is_empty() {
            output.push_str(&indent(&declarations.join("\n\n"), 1));
            output.push('\n');
        }
        output.push_str("}\n");
        output
    }
}
