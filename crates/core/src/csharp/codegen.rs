//! Code generation from the type registry to the C# AST.
//!
//! This module lowers every retained declaration of a consolidated registry
//! into C# AST nodes (classes, enums, union families, the constants class).
//! Anonymous helper shapes are rendered inline at their use sites.
//!
//! The generated AST can then be emitted to strings via the `Emit` trait.

use std::collections::{HashMap, HashSet};

use typebridge_common::casing::{convert, format_for_enum, NamePosition};
use typebridge_common::facts::{IndexKey, PrimitiveKind};
use typebridge_common::ConstValue;

use super::types::{
    CsClass, CsConstructor, CsDecl, CsEnum, CsEnumMember, CsExpr, CsField, CsFile, CsParam,
    CsProperty, CsStaticClass, CsType, CsUnionFamily,
};
use super::utils::sanitize_identifier;
use crate::config::ConverterConfig;
use crate::ir::{
    Constant, EnumMember, GenericParam, IrNode, NodeId, Property, Structure, TypeRef, TypeUse,
};
use crate::registry::TypeRegistry;

/// Generate a complete C# file from a consolidated registry.
pub fn codegen_file(registry: &TypeRegistry, config: &ConverterConfig) -> CsFile {
    let order = registry.declarations();
    let mut codegen = Codegen::new(registry, config);
    codegen.assign_names(&order);

    let declarations = order
        .iter()
        .filter_map(|id| codegen.declaration(*id))
        .collect();

    CsFile {
        header: config
            .header
            .as_deref()
            .map(|h| h.lines().map(str::to_string).collect())
            .unwrap_or_default(),
        usings: codegen.usings(),
        namespace: config.namespace.clone(),
        declarations,
    }
}

struct Codegen<'a> {
    registry: &'a TypeRegistry,
    config: &'a ConverterConfig,
    names: HashMap<NodeId, String>,
    /// Nodes currently being rendered inline, to cut self-referential shapes.
    visiting: HashSet<NodeId>,
    /// Generic parameters bound while an alias is rendered inline.
    bindings: HashMap<String, CsType>,
    uses_serialization: bool,
    uses_json: bool,
}

impl<'a> Codegen<'a> {
    fn new(registry: &'a TypeRegistry, config: &'a ConverterConfig) -> Self {
        Self {
            registry,
            config,
            names: HashMap::new(),
            visiting: HashSet::new(),
            bindings: HashMap::new(),
            uses_serialization: false,
            uses_json: false,
        }
    }

    /// Give every declaration a unique, cased, sanitized C# name.
    fn assign_names(&mut self, order: &[NodeId]) {
        let mut taken = HashSet::new();
        for id in order {
            let node = self.registry.node(*id);
            let base = if matches!(node.structure, Structure::Const { .. }) {
                sanitize_identifier(&self.config.constants_class)
            } else {
                sanitize_identifier(&convert(
                    &node.name,
                    self.config.type_casing,
                    NamePosition::Declaration,
                ))
            };
            self.names.insert(*id, unique(base, &mut taken));
        }
    }

    fn usings(&self) -> Vec<String> {
        let mut usings = vec![
            "System".to_string(),
            "System.Collections.Generic".to_string(),
        ];
        if self.uses_serialization {
            usings.push("System.Runtime.Serialization".to_string());
        }
        if self.uses_json {
            usings.push("System.Text.Json.Serialization".to_string());
        }
        usings
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn declaration(&mut self, id: NodeId) -> Option<CsDecl> {
        let registry = self.registry;
        let node = registry.node(id);
        let name = self.names.get(&id)?.clone();

        let decl = match &node.structure {
            Structure::Record {
                generics,
                properties,
            } => CsDecl::Class(self.record(name, node, generics, properties)),
            Structure::StringUnion { members } => {
                CsDecl::Enum(self.enumeration(name, node, members))
            }
            Structure::Const { constants } => {
                CsDecl::Constants(self.constants(name, constants))
            }
            Structure::ClassUnion { arity } => CsDecl::Union(CsUnionFamily {
                name,
                arity: *arity,
            }),
            Structure::Dictionary { key, value, .. } => {
                let base =
                    CsType::generic("Dictionary", vec![key_type(*key), self.type_use(value)]);
                CsDecl::Class(derived_class(name, node, base, None))
            }
            Structure::Instance {
                base, arguments, ..
            } => {
                let base = self.node_type(*base, arguments);
                CsDecl::Class(derived_class(name, node, base, None))
            }
            Structure::Tuple { elements, .. } => {
                let items: Vec<CsType> = elements.iter().map(|e| self.type_use(e)).collect();
                let params = items
                    .iter()
                    .enumerate()
                    .map(|(i, ty)| CsParam {
                        ty: ty.clone(),
                        name: format!("item{}", i + 1),
                    })
                    .collect();
                let base = CsType::generic("Tuple", items);
                CsDecl::Class(derived_class(
                    name,
                    node,
                    base,
                    Some(CsConstructor { params }),
                ))
            }
            Structure::Array { .. }
            | Structure::Primitive(_)
            | Structure::ClassUnionInstance { .. } => return None,
        };
        Some(decl)
    }

    fn record(
        &mut self,
        name: String,
        node: &IrNode,
        generics: &[GenericParam],
        properties: &[Property],
    ) -> CsClass {
        let mut taken = HashSet::new();
        let properties = properties
            .iter()
            .map(|p| self.property(&name, p, &mut taken))
            .collect();

        CsClass {
            generics: generics
                .iter()
                .map(|g| sanitize_identifier(&g.name))
                .collect(),
            name,
            base: None,
            comment: node.comment.clone(),
            properties,
            constructor: None,
        }
    }

    fn property(
        &mut self,
        class_name: &str,
        property: &Property,
        taken: &mut HashSet<String>,
    ) -> CsProperty {
        let mut name = sanitize_identifier(&convert(
            &property.name,
            self.config.property_casing,
            NamePosition::Member,
        ));
        // A member may not share its enclosing type's name.
        if name == class_name {
            name.push_str("Value");
        }
        let name = unique(name, taken);

        let json_name = (self.config.json_attributes && name != property.name)
            .then(|| property.name.clone());
        if json_name.is_some() {
            self.uses_json = true;
        }

        let ty = self.type_use(&property.ty);
        let initializer = property
            .default
            .as_ref()
            .map(|value| const_expr(value, &ty, false));

        CsProperty {
            name,
            json_name,
            ty,
            nullable: property.optional,
            readonly: property.readonly,
            initializer,
            comment: property.comment.clone(),
        }
    }

    fn enumeration(&mut self, name: String, node: &IrNode, members: &[EnumMember]) -> CsEnum {
        let casing = self.config.enum_member_casing;
        let mut taken = HashSet::new();
        let members: Vec<CsEnumMember> = members
            .iter()
            .enumerate()
            .map(|(i, member)| {
                let formatted = format_for_enum(
                    &convert(&member.name, casing, NamePosition::Member),
                    casing,
                );
                let base = if formatted.is_empty() {
                    format!("Value{i}")
                } else {
                    sanitize_identifier(&formatted)
                };
                CsEnumMember {
                    name: unique(base, &mut taken),
                    value: member.value,
                    wire: member.wire.clone(),
                }
            })
            .collect();

        let has_wire = members.iter().any(|m| m.wire.is_some());
        let string_converter = has_wire && self.config.json_attributes;
        self.uses_serialization |= has_wire;
        self.uses_json |= string_converter;

        CsEnum {
            name,
            comment: node.comment.clone(),
            members,
            string_converter,
        }
    }

    fn constants(&mut self, name: String, constants: &[Constant]) -> CsStaticClass {
        let mut taken = HashSet::new();
        let fields = constants
            .iter()
            .map(|constant| {
                let mut field_name = sanitize_identifier(&convert(
                    &constant.name,
                    self.config.property_casing,
                    NamePosition::Member,
                ));
                if field_name == name {
                    field_name.push_str("Value");
                }
                let ty = self.type_use(&constant.ty);
                let value = const_expr(&constant.value, &ty, true);
                let is_const = ty.is_const_keyword()
                    && !matches!(constant.value, ConstValue::Null | ConstValue::Array(_));
                CsField {
                    name: unique(field_name, &mut taken),
                    ty,
                    value,
                    is_const,
                    comment: constant.comment.clone(),
                }
            })
            .collect();

        CsStaticClass { name, fields }
    }

    // =========================================================================
    // Type references
    // =========================================================================

    fn type_use(&mut self, use_: &TypeUse) -> CsType {
        let mut ty = match &use_.target {
            TypeRef::Generic(name) => match self.bindings.get(name) {
                Some(bound) => bound.clone(),
                None => CsType::named(sanitize_identifier(name)),
            },
            TypeRef::Node(id) => self.node_type(*id, &use_.type_arguments),
        };
        for _ in 0..use_.array_depth {
            ty = CsType::array_of(ty);
        }
        ty
    }

    fn node_type(&mut self, id: NodeId, arguments: &[TypeUse]) -> CsType {
        let registry = self.registry;
        let id = registry.resolve(id);
        let node = registry.node(id);

        match &node.structure {
            Structure::Primitive(kind) => primitive_type(*kind),
            Structure::Array { generics, element } => {
                let frame = self.bind(id, generics, arguments);
                self.guarded(id, |this| {
                    let outer = std::mem::replace(&mut this.bindings, frame);
                    let ty = CsType::array_of(this.type_use(element));
                    this.bindings = outer;
                    ty
                })
            }
            Structure::ClassUnionInstance { base, members } => {
                self.guarded(id, |this| this.node_type(*base, members))
            }
            Structure::Dictionary { key, value, .. } if node.flags.anonymous => {
                self.guarded(id, |this| {
                    CsType::generic("Dictionary", vec![key_type(*key), this.type_use(value)])
                })
            }
            Structure::Tuple { elements, .. } if node.flags.anonymous => self.guarded(id, |this| {
                CsType::generic(
                    "Tuple",
                    elements.iter().map(|e| this.type_use(e)).collect(),
                )
            }),
            Structure::Instance {
                base, arguments, ..
            } if node.flags.anonymous => {
                self.guarded(id, |this| this.node_type(*base, arguments))
            }
            Structure::ClassUnion { arity } => {
                let Some(name) = self.names.get(&id).cloned() else {
                    return CsType::object();
                };
                let args = (0..*arity)
                    .map(|i| match arguments.get(i) {
                        Some(argument) => self.type_use(argument),
                        None => CsType::object(),
                    })
                    .collect();
                CsType::generic(name, args)
            }
            structure => {
                let Some(name) = self.names.get(&id).cloned() else {
                    return CsType::object();
                };
                let generics = structure.generics();
                if generics.is_empty() {
                    return CsType::named(name);
                }
                let args = generics
                    .iter()
                    .enumerate()
                    .map(|(i, param)| match (arguments.get(i), &param.default) {
                        (Some(argument), _) => self.type_use(argument),
                        (None, Some(default)) => self.guarded(id, |this| this.type_use(default)),
                        (None, None) => CsType::object(),
                    })
                    .collect();
                CsType::generic(name, args)
            }
        }
    }

    /// Render type arguments for `generics`, falling back to defaults, then `object`.
    fn bind(
        &mut self,
        id: NodeId,
        generics: &[GenericParam],
        arguments: &[TypeUse],
    ) -> HashMap<String, CsType> {
        generics
            .iter()
            .enumerate()
            .map(|(i, param)| {
                let ty = match (arguments.get(i), &param.default) {
                    (Some(argument), _) => self.type_use(argument),
                    (None, Some(default)) => self.guarded(id, |this| this.type_use(default)),
                    (None, None) => CsType::object(),
                };
                (param.name.clone(), ty)
            })
            .collect()
    }

    /// Render `id` through `f` unless it is already on the stack.
    fn guarded(&mut self, id: NodeId, f: impl FnOnce(&mut Self) -> CsType) -> CsType {
        if !self.visiting.insert(id) {
            return CsType::object();
        }
        let ty = f(self);
        self.visiting.remove(&id);
        ty
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Class deriving from a framework generic, with no members of its own.
fn derived_class(
    name: String,
    node: &IrNode,
    base: CsType,
    constructor: Option<CsConstructor>,
) -> CsClass {
    CsClass {
        name,
        generics: node
            .structure
            .generics()
            .iter()
            .map(|g| sanitize_identifier(&g.name))
            .collect(),
        base: Some(base),
        comment: node.comment.clone(),
        properties: Vec::new(),
        constructor,
    }
}

fn primitive_type(kind: PrimitiveKind) -> CsType {
    match kind {
        PrimitiveKind::String => CsType::named("string"),
        PrimitiveKind::Number => CsType::named("double"),
        PrimitiveKind::Boolean => CsType::named("bool"),
        PrimitiveKind::Object
        | PrimitiveKind::Any
        | PrimitiveKind::Null
        | PrimitiveKind::Undefined
        | PrimitiveKind::Unknown => CsType::object(),
    }
}

fn key_type(key: IndexKey) -> CsType {
    match key {
        IndexKey::String => CsType::named("string"),
        IndexKey::Number => CsType::named("double"),
    }
}

/// Constant expression for `value` declared as `ty`.
///
/// A null property default becomes `default` so value-typed members stay
/// valid; constants keep a literal `null`.
fn const_expr(value: &ConstValue, ty: &CsType, in_constant: bool) -> CsExpr {
    match value {
        ConstValue::Null if in_constant => CsExpr::Null,
        ConstValue::Null => CsExpr::Default,
        ConstValue::Bool(b) => CsExpr::Bool(*b),
        ConstValue::Number(n) => CsExpr::Number(*n),
        ConstValue::String(s) => CsExpr::String(s.clone()),
        ConstValue::Array(items) => {
            let element = match ty {
                CsType::Array(inner) => (**inner).clone(),
                CsType::Named { .. } => CsType::object(),
            };
            let items = items
                .iter()
                .map(|item| const_expr(item, &element, true))
                .collect();
            CsExpr::Array { element, items }
        }
    }
}

/// `base`, or `base1`, `base2`, ... when already taken.
fn unique(base: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(base.clone()) {
        return base;
    }
    let mut n = 1u32;
    loop {
        let candidate = format!("{base}{n}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
