//! IR node types.
//!
//! Nodes live in the registry arena and point at each other through
//! [`NodeId`]s, so self-referential and mutually recursive shapes are plain
//! data. A reference site is a [`TypeUse`]: a target plus array depth and
//! generic arguments.

use std::fmt;

use typebridge_common::facts::{IndexKey, PrimitiveKind};
use typebridge_common::literal::ConstValue;

/// Index of a node in the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Arena slot.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a reference site points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// Another node in the registry.
    Node(NodeId),
    /// A generic parameter of the enclosing declaration, by name.
    Generic(String),
}

/// A reference to a type from a property, argument or element position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeUse {
    /// Referenced node or generic parameter.
    pub target: TypeRef,
    /// Number of `[]` wrapped around the target.
    pub array_depth: u8,
    /// Generic arguments applied to the target.
    pub type_arguments: Vec<TypeUse>,
}

impl TypeUse {
    /// Plain reference to a node.
    pub const fn node(id: NodeId) -> Self {
        Self {
            target: TypeRef::Node(id),
            array_depth: 0,
            type_arguments: Vec::new(),
        }
    }

    /// Reference to a generic parameter in scope.
    pub fn generic(name: impl Into<String>) -> Self {
        Self {
            target: TypeRef::Generic(name.into()),
            array_depth: 0,
            type_arguments: Vec::new(),
        }
    }

    /// Replace the generic arguments.
    pub fn with_arguments(mut self, type_arguments: Vec<TypeUse>) -> Self {
        self.type_arguments = type_arguments;
        self
    }

    /// Set the array rank.
    pub const fn with_array_depth(mut self, array_depth: u8) -> Self {
        self.array_depth = array_depth;
        self
    }

    /// Target node, if the target is not a generic parameter.
    pub const fn node_id(&self) -> Option<NodeId> {
        match self.target {
            TypeRef::Node(id) => Some(id),
            TypeRef::Generic(_) => None,
        }
    }

    /// Every node id mentioned by this use, arguments included.
    pub fn node_ids(&self, out: &mut Vec<NodeId>) {
        if let TypeRef::Node(id) = self.target {
            out.push(id);
        }
        for arg in &self.type_arguments {
            arg.node_ids(out);
        }
    }

    /// Whether a generic parameter appears anywhere in this use.
    pub fn mentions_generic(&self, name: &str) -> bool {
        matches!(&self.target, TypeRef::Generic(g) if g == name)
            || self.type_arguments.iter().any(|a| a.mentions_generic(name))
    }

    /// Rewrite node targets through `f`, arguments included.
    pub fn map_nodes(&mut self, f: &impl Fn(NodeId) -> NodeId) {
        if let TypeRef::Node(id) = &mut self.target {
            *id = f(*id);
        }
        for arg in &mut self.type_arguments {
            arg.map_nodes(f);
        }
    }
}

/// Discriminant of [`Structure`], also the first hash component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// [`Structure::Record`]
    Record,
    /// [`Structure::Array`]
    Array,
    /// [`Structure::StringUnion`]
    StringUnion,
    /// [`Structure::Primitive`]
    Primitive,
    /// [`Structure::Dictionary`]
    Dictionary,
    /// [`Structure::Const`]
    Const,
    /// [`Structure::Tuple`]
    Tuple,
    /// [`Structure::Instance`]
    Instance,
    /// [`Structure::ClassUnion`]
    ClassUnion,
    /// [`Structure::ClassUnionInstance`]
    ClassUnionInstance,
}

impl TokenType {
    /// Stable label, used in hashes and error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::Array => "array",
            Self::StringUnion => "string-union",
            Self::Primitive => "primitive",
            Self::Dictionary => "dictionary",
            Self::Const => "const",
            Self::Tuple => "tuple",
            Self::Instance => "instance",
            Self::ClassUnion => "class-union",
            Self::ClassUnionInstance => "class-union-instance",
        }
    }

    /// Emission bucket; `None` for kinds that only ever render inline.
    pub const fn declaration_kind(self) -> Option<DeclarationKind> {
        match self {
            Self::Const => Some(DeclarationKind::Const),
            Self::StringUnion => Some(DeclarationKind::Enum),
            Self::ClassUnion => Some(DeclarationKind::ClassUnion),
            Self::Record => Some(DeclarationKind::Record),
            Self::Tuple => Some(DeclarationKind::Tuple),
            Self::Dictionary => Some(DeclarationKind::Dictionary),
            Self::Instance => Some(DeclarationKind::Instance),
            Self::Primitive | Self::Array | Self::ClassUnionInstance => None,
        }
    }
}

/// Declaration kinds in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeclarationKind {
    /// The constants class.
    Const,
    /// String unions.
    Enum,
    /// Class-union bases.
    ClassUnion,
    /// Records.
    Record,
    /// Named tuples.
    Tuple,
    /// Named dictionaries.
    Dictionary,
    /// Named generic instantiations.
    Instance,
}

/// Type parameter of a declared shape.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericParam {
    /// Parameter name.
    pub name: String,
    /// Argument used when a reference omits it.
    pub default: Option<TypeUse>,
}

/// Record member.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Source name.
    pub name: String,
    /// Declared type.
    pub ty: TypeUse,
    /// Optional or nullable in the source.
    pub optional: bool,
    /// Read-only in the source.
    pub readonly: bool,
    /// Doc comment.
    pub comment: Option<String>,
    /// Evaluated initializer.
    pub default: Option<ConstValue>,
}

impl Property {
    /// Required, writable property.
    pub fn new(name: impl Into<String>, ty: TypeUse) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            readonly: false,
            comment: None,
            default: None,
        }
    }

    /// Set optionality.
    pub const fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }
}

/// Member of a string union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    /// Source member name or literal text.
    pub name: String,
    /// Explicit value, present only where the implicit sequence breaks.
    pub value: Option<i64>,
    /// Serialized string value for string-valued members.
    pub wire: Option<String>,
}

impl EnumMember {
    /// Member continuing the implicit value sequence.
    pub fn implicit(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            wire: None,
        }
    }
}

/// Entry of the constants bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    /// Source name.
    pub name: String,
    /// Declared or inferred type.
    pub ty: TypeUse,
    /// Evaluated value; null when the initializer was not constant.
    pub value: ConstValue,
    /// Doc comment.
    pub comment: Option<String>,
}

/// Variant payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Structure {
    /// Object shape with named properties.
    Record {
        /// Type parameters of the declaration.
        generics: Vec<GenericParam>,
        /// Members in declaration order.
        properties: Vec<Property>,
    },
    /// Named array alias, rendered inline.
    Array {
        /// Type parameters of the declaration.
        generics: Vec<GenericParam>,
        /// Element type.
        element: TypeUse,
    },
    /// Enum or literal union.
    StringUnion {
        /// Members in declaration order.
        members: Vec<EnumMember>,
    },
    /// Intrinsic type singleton.
    Primitive(PrimitiveKind),
    /// Index-signature shape.
    Dictionary {
        /// Type parameters of the declaration.
        generics: Vec<GenericParam>,
        /// Key type.
        key: IndexKey,
        /// Value type.
        value: TypeUse,
    },
    /// Module-level constants bucket.
    Const {
        /// Entries in declaration order.
        constants: Vec<Constant>,
    },
    /// Fixed-length tuple.
    Tuple {
        /// Type parameters of the declaration.
        generics: Vec<GenericParam>,
        /// Element types.
        elements: Vec<TypeUse>,
    },
    /// Generic declaration applied to arguments.
    Instance {
        /// Type parameters of the declaration.
        generics: Vec<GenericParam>,
        /// Generic declaration.
        base: NodeId,
        /// Arguments in parameter order.
        arguments: Vec<TypeUse>,
    },
    /// Synthetic N-ary union base.
    ClassUnion {
        /// Number of cases.
        arity: usize,
    },
    /// A union of records, rendered as its base applied to the members.
    ClassUnionInstance {
        /// The [`Structure::ClassUnion`] of matching arity.
        base: NodeId,
        /// Member records in union order.
        members: Vec<TypeUse>,
    },
}

impl Structure {
    /// Record without generics or properties.
    pub const fn empty_record() -> Self {
        Self::Record {
            generics: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Array alias without generics.
    pub const fn array(element: TypeUse) -> Self {
        Self::Array {
            generics: Vec::new(),
            element,
        }
    }

    /// Dictionary without generics.
    pub const fn dictionary(key: IndexKey, value: TypeUse) -> Self {
        Self::Dictionary {
            generics: Vec::new(),
            key,
            value,
        }
    }

    /// Tuple without generics.
    pub const fn tuple(elements: Vec<TypeUse>) -> Self {
        Self::Tuple {
            generics: Vec::new(),
            elements,
        }
    }

    /// Instance without generics.
    pub const fn instance(base: NodeId, arguments: Vec<TypeUse>) -> Self {
        Self::Instance {
            generics: Vec::new(),
            base,
            arguments,
        }
    }

    /// Attach declaration type parameters. Shapes without parameters ignore them.
    pub fn with_generics(mut self, params: Vec<GenericParam>) -> Self {
        if let Some(generics) = self.generics_mut() {
            *generics = params;
        }
        self
    }

    /// Discriminant.
    pub const fn token_type(&self) -> TokenType {
        match self {
            Self::Record { .. } => TokenType::Record,
            Self::Array { .. } => TokenType::Array,
            Self::StringUnion { .. } => TokenType::StringUnion,
            Self::Primitive(_) => TokenType::Primitive,
            Self::Dictionary { .. } => TokenType::Dictionary,
            Self::Const { .. } => TokenType::Const,
            Self::Tuple { .. } => TokenType::Tuple,
            Self::Instance { .. } => TokenType::Instance,
            Self::ClassUnion { .. } => TokenType::ClassUnion,
            Self::ClassUnionInstance { .. } => TokenType::ClassUnionInstance,
        }
    }

    /// Every type use held by this structure, in declaration order.
    ///
    /// Generic parameter defaults come first.
    pub fn type_uses(&self) -> Vec<&TypeUse> {
        let own: Vec<&TypeUse> = match self {
            Self::Record { properties, .. } => properties.iter().map(|p| &p.ty).collect(),
            Self::Array { element, .. } => vec![element],
            Self::Dictionary { value, .. } => vec![value],
            Self::Const { constants } => constants.iter().map(|c| &c.ty).collect(),
            Self::Tuple { elements, .. } => elements.iter().collect(),
            Self::Instance { arguments, .. } => arguments.iter().collect(),
            Self::ClassUnionInstance { members, .. } => members.iter().collect(),
            Self::StringUnion { .. } | Self::Primitive(_) | Self::ClassUnion { .. } => Vec::new(),
        };
        self.generics()
            .iter()
            .filter_map(|g| g.default.as_ref())
            .chain(own)
            .collect()
    }

    /// Mutable counterpart of [`Self::type_uses`].
    pub fn type_uses_mut(&mut self) -> Vec<&mut TypeUse> {
        let (mut uses, own): (Vec<&mut TypeUse>, Vec<&mut TypeUse>) = match self {
            Self::Record {
                generics,
                properties,
            } => (
                defaults_mut(generics),
                properties.iter_mut().map(|p| &mut p.ty).collect(),
            ),
            Self::Array { generics, element } => (defaults_mut(generics), vec![element]),
            Self::Dictionary {
                generics, value, ..
            } => (defaults_mut(generics), vec![value]),
            Self::Tuple { generics, elements } => {
                (defaults_mut(generics), elements.iter_mut().collect())
            }
            Self::Instance {
                generics,
                arguments,
                ..
            } => (defaults_mut(generics), arguments.iter_mut().collect()),
            Self::Const { constants } => {
                (Vec::new(), constants.iter_mut().map(|c| &mut c.ty).collect())
            }
            Self::ClassUnionInstance { members, .. } => (Vec::new(), members.iter_mut().collect()),
            Self::StringUnion { .. } | Self::Primitive(_) | Self::ClassUnion { .. } => {
                (Vec::new(), Vec::new())
            }
        };
        uses.extend(own);
        uses
    }

    /// Nodes this structure points at directly.
    pub fn outgoing(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            Self::Instance { base, .. } | Self::ClassUnionInstance { base, .. } => out.push(*base),
            _ => {}
        }
        for use_ in self.type_uses() {
            use_.node_ids(&mut out);
        }
        out
    }

    /// Rewrite every node reference through `f`.
    pub fn map_nodes(&mut self, f: &impl Fn(NodeId) -> NodeId) {
        match self {
            Self::Instance { base, .. } | Self::ClassUnionInstance { base, .. } => *base = f(*base),
            _ => {}
        }
        for use_ in self.type_uses_mut() {
            use_.map_nodes(f);
        }
    }

    /// Type parameters of a declared shape; empty for everything else.
    pub fn generics(&self) -> &[GenericParam] {
        match self {
            Self::Record { generics, .. }
            | Self::Array { generics, .. }
            | Self::Dictionary { generics, .. }
            | Self::Tuple { generics, .. }
            | Self::Instance { generics, .. } => generics,
            _ => &[],
        }
    }

    /// Mutable type parameters of a declared shape.
    pub fn generics_mut(&mut self) -> Option<&mut Vec<GenericParam>> {
        match self {
            Self::Record { generics, .. }
            | Self::Array { generics, .. }
            | Self::Dictionary { generics, .. }
            | Self::Tuple { generics, .. }
            | Self::Instance { generics, .. } => Some(generics),
            _ => None,
        }
    }
}

fn defaults_mut(generics: &mut [GenericParam]) -> Vec<&mut TypeUse> {
    generics
        .iter_mut()
        .filter_map(|g| g.default.as_mut())
        .collect()
}

/// Visibility and rendering flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFlags {
    /// Marked internal in the source.
    pub internal: bool,
    /// Exported from the source module.
    pub is_public: bool,
    /// Reachable from a public node.
    pub is_descendant_of_public: bool,
    /// Rendered even when nothing references it.
    pub should_be_rendered: bool,
    /// Synthesized without a source name.
    pub anonymous: bool,
}

/// One logical type in the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct IrNode {
    /// Display name, unique among live nodes.
    pub name: String,
    /// Assigned by the registry on insertion.
    pub identity_key: String,
    /// Stable origin id from the facts, if any.
    pub origin_id: Option<String>,
    /// Shape.
    pub structure: Structure,
    /// Visibility and rendering flags.
    pub flags: NodeFlags,
    /// Nesting depth; synthesized nodes sit one below their parent.
    pub level: u32,
    /// Doc comment.
    pub comment: Option<String>,
    /// Name before a collision rename.
    pub disambiguated_from: Option<String>,
    /// Memoized structural hash; `None` after any mutation.
    pub hash: Option<String>,
}

impl IrNode {
    /// Node with default flags at level 0.
    pub fn new(name: impl Into<String>, structure: Structure) -> Self {
        Self {
            name: name.into(),
            identity_key: String::new(),
            origin_id: None,
            structure,
            flags: NodeFlags::default(),
            level: 0,
            comment: None,
            disambiguated_from: None,
            hash: None,
        }
    }

    /// Set the origin id used in the identity key.
    pub fn with_origin(mut self, origin_id: impl Into<String>) -> Self {
        self.origin_id = Some(origin_id.into());
        self
    }

    /// Replace the flags.
    pub const fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the nesting depth.
    pub const fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Set the doc comment.
    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    /// Mark as exported and rendered.
    pub const fn public(mut self) -> Self {
        self.flags.is_public = true;
        self.flags.should_be_rendered = true;
        self
    }

    /// Discriminant of the structure.
    pub const fn token_type(&self) -> TokenType {
        self.structure.token_type()
    }

    /// Whether this is a primitive singleton.
    pub const fn is_primitive(&self) -> bool {
        matches!(self.structure, Structure::Primitive(_))
    }

    /// Survivor heuristic among structurally equal nodes.
    pub fn value_score(&self) -> i64 {
        100 * i64::from(self.flags.should_be_rendered) + 100 * i64::from(self.flags.is_public)
            - i64::from(self.level)
    }

    /// Forget the memoized hash.
    pub fn reset_hash(&mut self) {
        self.hash = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_score() {
        let mut node = IrNode::new("User", Structure::empty_record()).with_level(2);
        assert_eq!(node.value_score(), -2);
        node.flags.is_public = true;
        assert_eq!(node.value_score(), 98);
        node.flags.should_be_rendered = true;
        assert_eq!(node.value_score(), 198);
    }

    #[test]
    fn test_outgoing_includes_defaults_and_bases() {
        let structure = Structure::Record {
            generics: vec![GenericParam {
                name: "T".into(),
                default: Some(TypeUse::node(NodeId(3))),
            }],
            properties: vec![Property::new(
                "items",
                TypeUse::node(NodeId(4)).with_arguments(vec![TypeUse::generic("T")]),
            )],
        };
        assert_eq!(structure.outgoing(), vec![NodeId(3), NodeId(4)]);

        let instance = Structure::instance(NodeId(7), vec![TypeUse::node(NodeId(1))]);
        assert_eq!(instance.outgoing(), vec![NodeId(7), NodeId(1)]);

        let dictionary = Structure::dictionary(IndexKey::String, TypeUse::generic("T"))
            .with_generics(vec![GenericParam {
                name: "T".into(),
                default: Some(TypeUse::node(NodeId(5))),
            }]);
        assert_eq!(dictionary.generics().len(), 1);
        assert_eq!(dictionary.outgoing(), vec![NodeId(5)]);
    }

    #[test]
    fn test_map_nodes() {
        let mut structure = Structure::ClassUnionInstance {
            base: NodeId(1),
            members: vec![TypeUse::node(NodeId(2)), TypeUse::node(NodeId(3))],
        };
        structure.map_nodes(&|id| if id == NodeId(2) { NodeId(9) } else { id });
        assert_eq!(structure.outgoing(), vec![NodeId(1), NodeId(9), NodeId(3)]);
    }

    #[test]
    fn test_declaration_order() {
        assert!(DeclarationKind::Const < DeclarationKind::Enum);
        assert!(DeclarationKind::Enum < DeclarationKind::ClassUnion);
        assert!(DeclarationKind::Record < DeclarationKind::Instance);
        assert_eq!(TokenType::Array.declaration_kind(), None);
    }
}
