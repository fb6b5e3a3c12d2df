//! C# declaration AST.
//!
//! Only the constructs the converter emits are modelled:
//! - CsType: type references (named, generic, jagged arrays)
//! - CsExpr: constant expressions used as initializers
//! - CsDecl: classes, enums, the constants class and union families
//! - CsFile: the namespace-wrapped module

/// Type reference: `string`, `List<T>`, `User[][]`.
#[derive(Debug, Clone, PartialEq)]
pub enum CsType {
    /// Named type, optionally with generic arguments.
    Named {
        /// Type name.
        name: String,
        /// Generic arguments; empty for a plain name.
        args: Vec<CsType>,
    },
    /// `T[]`
    Array(Box<CsType>),
}

impl CsType {
    /// Plain named type.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// `name<args>`
    pub fn generic(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Named {
            name: name.into(),
            args,
        }
    }

    /// `object`
    pub fn object() -> Self {
        Self::named("object")
    }

    /// `element[]`
    pub fn array_of(element: Self) -> Self {
        Self::Array(Box::new(element))
    }

    /// Keyword types that can be declared `const`.
    pub fn is_const_keyword(&self) -> bool {
        matches!(self, Self::Named { name, args } if args.is_empty()
            && matches!(name.as_str(), "string" | "double" | "bool"))
    }
}

/// Constant expression.
#[derive(Debug, Clone, PartialEq)]
pub enum CsExpr {
    /// `null`
    Null,
    /// `default`
    Default,
    /// `true` / `false`
    Bool(bool),
    /// Numeric literal.
    Number(f64),
    /// Escaped string literal.
    String(String),
    /// `new T[] { ... }`
    Array {
        /// Element type.
        element: CsType,
        /// Element values.
        items: Vec<CsExpr>,
    },
}

/// Auto-property of a class.
#[derive(Debug, Clone, PartialEq)]
pub struct CsProperty {
    /// Member name.
    pub name: String,
    /// Source name, emitted as `[JsonPropertyName]` when present.
    pub json_name: Option<String>,
    /// Property type.
    pub ty: CsType,
    /// Emit a `?` after the type.
    pub nullable: bool,
    /// `{ get; }` instead of `{ get; set; }`.
    pub readonly: bool,
    /// ` = value;` after the accessors.
    pub initializer: Option<CsExpr>,
    /// Doc comment.
    pub comment: Option<String>,
}

/// Constructor parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct CsParam {
    /// Parameter type.
    pub ty: CsType,
    /// Parameter name.
    pub name: String,
}

/// Constructor forwarding its parameters to the base class.
#[derive(Debug, Clone, PartialEq)]
pub struct CsConstructor {
    /// Parameters, passed to `base(...)` in order.
    pub params: Vec<CsParam>,
}

/// `public class Name<T> : Base`
#[derive(Debug, Clone, PartialEq)]
pub struct CsClass {
    /// Class name.
    pub name: String,
    /// Generic parameter names.
    pub generics: Vec<String>,
    /// Base type, if any.
    pub base: Option<CsType>,
    /// Doc comment.
    pub comment: Option<String>,
    /// Properties in declaration order.
    pub properties: Vec<CsProperty>,
    /// Forwarding constructor, emitted before the properties.
    pub constructor: Option<CsConstructor>,
}

/// One enum member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsEnumMember {
    /// Member name.
    pub name: String,
    /// Explicit value, emitted as `= n`.
    pub value: Option<i64>,
    /// Serialized value, emitted as `[EnumMember(Value = ...)]`.
    pub wire: Option<String>,
}

/// `public enum Name`
#[derive(Debug, Clone, PartialEq)]
pub struct CsEnum {
    /// Enum name.
    pub name: String,
    /// Doc comment.
    pub comment: Option<String>,
    /// Members in declaration order.
    pub members: Vec<CsEnumMember>,
    /// Add a string-enum converter attribute.
    pub string_converter: bool,
}

/// Field of the constants class.
#[derive(Debug, Clone, PartialEq)]
pub struct CsField {
    /// Field name.
    pub name: String,
    /// Field type.
    pub ty: CsType,
    /// Initializer.
    pub value: CsExpr,
    /// `const` when true, `static readonly` otherwise.
    pub is_const: bool,
    /// Doc comment.
    pub comment: Option<String>,
}

/// `public static class Name` holding module-level constants.
#[derive(Debug, Clone, PartialEq)]
pub struct CsStaticClass {
    /// Class name.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<CsField>,
}

/// Abstract `UnionN<T1..TN>` base with a visitor and sealed cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsUnionFamily {
    /// Base class name.
    pub name: String,
    /// Number of cases.
    pub arity: usize,
}

/// Top-level declaration inside the namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum CsDecl {
    /// Record, dictionary, tuple or instance class.
    Class(CsClass),
    /// String-union enum.
    Enum(CsEnum),
    /// Constants class.
    Constants(CsStaticClass),
    /// Class-union family.
    Union(CsUnionFamily),
}

/// Complete generated file.
#[derive(Debug, Clone, PartialEq)]
pub struct CsFile {
    /// Extra comment lines after the auto-generated marker.
    pub header: Vec<String>,
    /// Namespaces imported with `using`.
    pub usings: Vec<String>,
    /// Enclosing namespace.
    pub namespace: String,
    /// Declarations in emission order.
    pub declarations: Vec<CsDecl>,
}
