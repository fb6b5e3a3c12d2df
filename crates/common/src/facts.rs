//! Declaration facts consumed by the type factory.
//!
//! Facts are produced by whatever walks the source syntax tree. They are plain
//! data with serde support so a collaborator can hand them over as Rust values
//! or as JSON (`camelCase` fields, `kind`-tagged type descriptions).

use serde::{Deserialize, Serialize};

/// One top-level declaration: an interface, type alias, enum, class or constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationFact {
    /// Declared name as written in the source.
    pub name: String,
    /// Stable id of the originating symbol (e.g. `module.ts:User`).
    #[serde(default)]
    pub origin_id: Option<String>,
    /// Nesting depth of the declaration (0 for module level).
    #[serde(default)]
    pub level: u32,
    /// Whether the declaration is exported.
    #[serde(default)]
    pub is_public: bool,
    /// Whether the declaration is marked internal.
    #[serde(default)]
    pub internal: bool,
    /// Explicit render request. Defaults to `is_public` when absent.
    #[serde(default)]
    pub render: Option<bool>,
    /// Doc comment attached to the declaration.
    #[serde(default)]
    pub comment: Option<String>,
    /// Generic parameters declared on the type.
    #[serde(default)]
    pub type_parameters: Vec<TypeParameterFact>,
    /// What the declaration introduces.
    pub body: FactBody,
}

impl DeclarationFact {
    /// Create a type declaration fact with default flags.
    pub fn new(name: impl Into<String>, ty: TypeDescription) -> Self {
        Self {
            name: name.into(),
            origin_id: None,
            level: 0,
            is_public: false,
            internal: false,
            render: None,
            comment: None,
            type_parameters: Vec::new(),
            body: FactBody::Type(ty),
        }
    }

    /// Create a constant declaration fact.
    pub fn constant(name: impl Into<String>, initializer: impl Into<String>) -> Self {
        Self {
            body: FactBody::Constant {
                initializer: initializer.into(),
                declared: None,
            },
            ..Self::new(name, TypeDescription::Primitive {
                name: PrimitiveKind::Any,
            })
        }
    }

    /// Mark the fact as exported.
    pub fn public(mut self) -> Self {
        self.is_public = true;
        self
    }

    /// Mark the fact as internal.
    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    /// Set the stable origin id.
    pub fn with_origin(mut self, origin_id: impl Into<String>) -> Self {
        self.origin_id = Some(origin_id.into());
        self
    }

    /// Set the nesting depth.
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Attach a doc comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Append a generic parameter.
    pub fn with_type_parameter(mut self, parameter: TypeParameterFact) -> Self {
        self.type_parameters.push(parameter);
        self
    }

    /// Whether the declaration should be rendered even when unreferenced.
    pub fn should_render(&self) -> bool {
        self.render.unwrap_or(self.is_public)
    }
}

/// What a declaration introduces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FactBody {
    /// A type: interface, alias, enum or class shape.
    Type(TypeDescription),
    /// A module-level constant, collected into the constants bucket.
    Constant {
        /// Initializer source text.
        initializer: String,
        /// Declared type annotation, if any.
        #[serde(default)]
        declared: Option<TypeDescription>,
    },
}

/// A generic parameter on a declaration, e.g. `T = string`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeParameterFact {
    /// Parameter name.
    pub name: String,
    /// Default argument, if declared.
    #[serde(default)]
    pub default: Option<TypeDescription>,
}

impl TypeParameterFact {
    /// Parameter without a default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    /// Set the default argument.
    pub fn with_default(mut self, default: TypeDescription) -> Self {
        self.default = Some(default);
        self
    }
}

/// Semantic description of a type as resolved by the source checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeDescription {
    /// Intrinsic type: `string`, `number`, `any`, ...
    Primitive {
        /// Which intrinsic.
        name: PrimitiveKind,
    },
    /// `"active"`
    StringLiteral {
        /// Literal text without quotes.
        value: String,
    },
    /// `42`
    NumberLiteral {
        /// Literal value.
        value: f64,
    },
    /// `true`
    BooleanLiteral {
        /// Literal value.
        value: bool,
    },
    /// `Status.Active`
    #[serde(rename_all = "camelCase")]
    EnumLiteral {
        /// Declaring enum, when the checker knows it.
        #[serde(default)]
        enum_name: Option<String>,
        /// Member name.
        member: String,
        /// Member value, when known.
        #[serde(default)]
        value: Option<EnumValue>,
    },
    /// `A | B | null`
    Union {
        /// Union arms, nullish ones included.
        members: Vec<TypeDescription>,
    },
    /// `enum Status { ... }`
    Enum {
        /// Members in declaration order.
        members: Vec<EnumMemberFact>,
    },
    /// Object shape: interface body, type literal or mapped type.
    #[serde(rename_all = "camelCase")]
    Object {
        /// Named members.
        #[serde(default)]
        properties: Vec<PropertyFact>,
        /// `[key: K]: V` signatures.
        #[serde(default)]
        index_signatures: Vec<IndexSignatureFact>,
    },
    /// `T[]`
    Array {
        /// Element type.
        element: Box<TypeDescription>,
    },
    /// `[string, number]`
    Tuple {
        /// Element types in order.
        elements: Vec<TypeDescription>,
    },
    /// Reference to another declaration, optionally instantiated.
    #[serde(rename_all = "camelCase")]
    Reference {
        /// Referenced name as written.
        name: String,
        /// Origin id of the referenced symbol, preferred over the name.
        #[serde(default)]
        origin_id: Option<String>,
        /// Generic arguments.
        #[serde(default)]
        type_arguments: Vec<TypeDescription>,
    },
    /// A generic parameter in scope, e.g. `T`.
    TypeParameter {
        /// Parameter name.
        name: String,
    },
}

impl TypeDescription {
    /// Intrinsic type.
    pub const fn primitive(name: PrimitiveKind) -> Self {
        Self::Primitive { name }
    }

    /// String literal type.
    pub fn string_literal(value: impl Into<String>) -> Self {
        Self::StringLiteral {
            value: value.into(),
        }
    }

    /// Reference by name, without arguments.
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Reference {
            name: name.into(),
            origin_id: None,
            type_arguments: Vec::new(),
        }
    }

    /// Reference by name with generic arguments.
    pub fn generic_reference(name: impl Into<String>, type_arguments: Vec<Self>) -> Self {
        Self::Reference {
            name: name.into(),
            origin_id: None,
            type_arguments,
        }
    }

    /// Generic parameter in scope.
    pub fn type_parameter(name: impl Into<String>) -> Self {
        Self::TypeParameter { name: name.into() }
    }

    /// `element[]`
    pub fn array(element: Self) -> Self {
        Self::Array {
            element: Box::new(element),
        }
    }

    /// Union of `members`.
    pub const fn union(members: Vec<Self>) -> Self {
        Self::Union { members }
    }

    /// Object shape without index signatures.
    pub const fn object(properties: Vec<PropertyFact>) -> Self {
        Self::Object {
            properties,
            index_signatures: Vec::new(),
        }
    }

    /// Object shape holding a single index signature.
    pub fn dictionary(key: IndexKey, value: Self) -> Self {
        Self::Object {
            properties: Vec::new(),
            index_signatures: vec![IndexSignatureFact {
                key,
                value: Box::new(value),
            }],
        }
    }

    /// `null` or `undefined`.
    pub const fn is_nullish(&self) -> bool {
        matches!(
            self,
            Self::Primitive {
                name: PrimitiveKind::Null | PrimitiveKind::Undefined
            }
        )
    }
}

/// Intrinsic source types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `object`
    Object,
    /// `any`
    Any,
    /// `null`
    Null,
    /// `undefined`
    Undefined,
    /// `unknown`
    Unknown,
}

impl PrimitiveKind {
    /// Source spelling, also used as the registry identity key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Any => "any",
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::Unknown => "unknown",
        }
    }
}

/// Enum member value: numeric or string-valued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    /// `A = 3`
    Number(f64),
    /// `A = "a"`
    String(String),
}

/// One member of an `enum` declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMemberFact {
    /// Member name.
    pub name: String,
    /// Explicit value; `None` continues the implicit sequence.
    #[serde(default)]
    pub value: Option<EnumValue>,
}

impl EnumMemberFact {
    /// Member with an optional explicit value.
    pub fn new(name: impl Into<String>, value: Option<EnumValue>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Key type of an index signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKey {
    /// `[key: string]`
    String,
    /// `[key: number]`
    Number,
}

/// `[key: string]: V`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSignatureFact {
    /// Key type.
    pub key: IndexKey,
    /// Value type.
    pub value: Box<TypeDescription>,
}

/// A property of an object shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFact {
    /// Property name as written.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: TypeDescription,
    /// `name?: T`
    #[serde(default)]
    pub optional: bool,
    /// `readonly name: T`
    #[serde(default)]
    pub readonly: bool,
    /// Array rank already peeled off by the collaborator.
    #[serde(default)]
    pub array_depth: u8,
    /// Doc comment.
    #[serde(default)]
    pub comment: Option<String>,
    /// Initializer source text, evaluated by [`crate::literal::evaluate`].
    #[serde(default)]
    pub initializer: Option<String>,
}

impl PropertyFact {
    /// Required, writable property.
    pub fn new(name: impl Into<String>, ty: TypeDescription) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            readonly: false,
            array_depth: 0,
            comment: None,
            initializer: None,
        }
    }

    /// Mark as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Mark as read-only.
    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    /// Set the peeled-off array rank.
    pub fn with_array_depth(mut self, depth: u8) -> Self {
        self.array_depth = depth;
        self
    }

    /// Attach a doc comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Attach initializer source text.
    pub fn with_initializer(mut self, initializer: impl Into<String>) -> Self {
        self.initializer = Some(initializer.into());
        self
    }
}

/// Parse a JSON array of declaration facts.
pub fn parse_facts_json(json: &str) -> Result<Vec<DeclarationFact>, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_fact() {
        let json = r#"[
          {
            "name": "User",
            "isPublic": true,
            "body": {
              "type": {
                "kind": "object",
                "properties": [
                  { "name": "id", "type": { "kind": "primitive", "name": "number" } },
                  { "name": "tags", "type": { "kind": "primitive", "name": "string" }, "arrayDepth": 1, "optional": true }
                ]
              }
            }
          }
        ]"#;

        let facts = parse_facts_json(json).unwrap();
        assert_eq!(facts.len(), 1);
        let fact = &facts[0];
        assert_eq!(fact.name, "User");
        assert!(fact.is_public);
        assert!(fact.should_render());

        let FactBody::Type(TypeDescription::Object { properties, .. }) = &fact.body else {
            panic!("expected object body, got {:?}", fact.body);
        };
        assert_eq!(properties.len(), 2);
        assert_eq!(properties[1].array_depth, 1);
        assert!(properties[1].optional);
        assert_eq!(
            properties[0].ty,
            TypeDescription::primitive(PrimitiveKind::Number)
        );
    }

    #[test]
    fn test_parse_enum_and_constant_facts() {
        let json = r#"[
          {
            "name": "Level",
            "body": { "type": { "kind": "enum", "members": [
              { "name": "Low", "value": 0 },
              { "name": "High", "value": 5 },
              { "name": "Named", "value": "named" }
            ] } }
          },
          { "name": "MAX_ITEMS", "isPublic": true, "body": { "constant": { "initializer": "50" } } }
        ]"#;

        let facts = parse_facts_json(json).unwrap();
        let FactBody::Type(TypeDescription::Enum { members }) = &facts[0].body else {
            panic!("expected enum body");
        };
        assert_eq!(members[1].value, Some(EnumValue::Number(5.0)));
        assert_eq!(members[2].value, Some(EnumValue::String("named".into())));
        assert!(!facts[0].should_render());
        assert!(matches!(facts[1].body, FactBody::Constant { .. }));
    }

    #[test]
    fn test_render_flag_overrides_visibility() {
        let mut fact = DeclarationFact::new("Hidden", TypeDescription::object(vec![])).public();
        fact.render = Some(false);
        assert!(!fact.should_render());
    }

    #[test]
    fn test_nullish() {
        assert!(TypeDescription::primitive(PrimitiveKind::Null).is_nullish());
        assert!(TypeDescription::primitive(PrimitiveKind::Undefined).is_nullish());
        assert!(!TypeDescription::primitive(PrimitiveKind::Any).is_nullish());
    }
}
