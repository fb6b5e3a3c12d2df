//! Declaration facts to IR nodes.
//!
//! The factory walks the facts in order and builds each declaration on first
//! encounter, so a property that references a later declaration builds it on
//! the spot. Records are registered as empty shells before their properties
//! are resolved, which lets self and mutual references find them.
//!
//! Union classification, first match wins:
//! 1. only string literals (besides null/undefined) -> string union
//! 2. exactly one non-null member -> that member, made optional
//! 3. only enum literals -> string union derived from the enum
//! 4. only numbers -> `number`
//! 5. only strings -> `string`
//! 6. only booleans -> `boolean`
//! 7. record shapes, when class unions are enabled -> class-union instance
//! 8. anything else -> `object`

use std::collections::{HashMap, HashSet};

use tracing::debug;
use typebridge_common::casing::to_pascal_case;
use typebridge_common::facts::{
    DeclarationFact, EnumMemberFact, EnumValue, FactBody, IndexKey, IndexSignatureFact,
    PrimitiveKind, PropertyFact, TypeDescription,
};
use typebridge_common::literal::{self, ConstValue};

use crate::config::ConverterConfig;
use crate::diagnostics::DiagnosticKind;
use crate::error::ConvertError;
use crate::ir::{
    Constant, EnumMember, GenericParam, IrNode, NodeFlags, NodeId, Property, Structure, TypeRef,
    TypeUse,
};
use crate::registry::TypeRegistry;

/// A resolved reference site.
#[derive(Debug, Clone)]
struct Resolved {
    ty: TypeUse,
    /// The source type admitted null or undefined.
    nullable: bool,
}

impl Resolved {
    const fn plain(ty: TypeUse) -> Self {
        Self {
            ty,
            nullable: false,
        }
    }
}

/// Naming and generic context for nested resolution.
#[derive(Debug, Clone)]
struct Scope {
    /// Prefix for synthesized names.
    name: String,
    level: u32,
    generics: Vec<String>,
}

impl Scope {
    fn nested(&self, name: String) -> Self {
        Self {
            name,
            level: self.level + 1,
            generics: self.generics.clone(),
        }
    }
}

/// Outcome of the literal-union rules.
enum LiteralUnion {
    Members(Vec<EnumMember>),
    Existing(NodeId),
}

/// Builds IR nodes from declaration facts into a registry.
#[derive(Debug)]
pub struct TypeFactory<'a> {
    registry: &'a mut TypeRegistry,
    config: &'a ConverterConfig,
    facts: &'a [DeclarationFact],
    by_name: HashMap<&'a str, Vec<usize>>,
    by_origin: HashMap<&'a str, usize>,
    built: HashMap<usize, NodeId>,
    in_progress: HashSet<usize>,
}

impl<'a> TypeFactory<'a> {
    /// Factory writing into `registry`. Nothing is built until [`Self::ingest`].
    pub fn new(
        registry: &'a mut TypeRegistry,
        config: &'a ConverterConfig,
        facts: &'a [DeclarationFact],
    ) -> Self {
        let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut by_origin = HashMap::new();
        for (index, fact) in facts.iter().enumerate() {
            if matches!(fact.body, FactBody::Constant { .. }) {
                continue;
            }
            by_name.entry(fact.name.as_str()).or_default().push(index);
            if let Some(origin) = &fact.origin_id {
                by_origin.insert(origin.as_str(), index);
            }
        }
        Self {
            registry,
            config,
            facts,
            by_name,
            by_origin,
            built: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Build every declaration.
    pub fn ingest(&mut self) -> Result<(), ConvertError> {
        for index in 0..self.facts.len() {
            self.declaration(index)?;
        }
        debug!(
            facts = self.facts.len(),
            nodes = self.registry.live_count(),
            "Ingested declaration facts"
        );
        Ok(())
    }

    /// Node for the declaration at `index`, building it on first request.
    fn declaration(&mut self, index: usize) -> Result<Option<NodeId>, ConvertError> {
        if let Some(&id) = self.built.get(&index) {
            return Ok(Some(self.registry.resolve(id)));
        }
        let facts = self.facts;
        let fact = &facts[index];
        if !self.in_progress.insert(index) {
            self.registry.diagnostics_mut().report(
                DiagnosticKind::UnresolvedType,
                &fact.name,
                "declaration refers to itself through aliases only",
            );
            return Ok(None);
        }

        let result = match &fact.body {
            FactBody::Constant {
                initializer,
                declared,
            } => self.constant(fact, initializer, declared.as_ref()).map(Some),
            FactBody::Type(description) => self.classify(index, fact, description),
        };
        self.in_progress.remove(&index);

        let id = result?;
        if let Some(id) = id {
            self.built.insert(index, id);
        }
        Ok(id)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn classify(
        &mut self,
        index: usize,
        fact: &'a DeclarationFact,
        description: &'a TypeDescription,
    ) -> Result<Option<NodeId>, ConvertError> {
        let scope = Scope {
            name: fact.name.clone(),
            level: fact.level,
            generics: fact.type_parameters.iter().map(|p| p.name.clone()).collect(),
        };

        match description {
            TypeDescription::Primitive { name } => Ok(Some(self.registry.primitive(*name))),
            TypeDescription::StringLiteral { .. }
            | TypeDescription::NumberLiteral { .. }
            | TypeDescription::BooleanLiteral { .. } => {
                Ok(self.resolve_use(description, &scope, "")?.and_then(|r| r.ty.node_id()))
            }
            TypeDescription::Enum { members } => {
                let members = self.enum_members(&fact.name, members.iter().map(enum_fact_pair));
                self.named(fact, Structure::StringUnion { members }).map(Some)
            }
            TypeDescription::Union { members } => {
                let non_null: Vec<&TypeDescription> =
                    members.iter().filter(|m| !m.is_nullish()).collect();
                match self.literal_union(&fact.name, &non_null) {
                    Some(LiteralUnion::Members(members)) => {
                        self.named(fact, Structure::StringUnion { members }).map(Some)
                    }
                    Some(LiteralUnion::Existing(id)) => Ok(Some(id)),
                    None => match self.resolve_union(members, &scope, "")? {
                        Some(resolved) => self.alias_or_wrap(fact, resolved.ty, &scope).map(Some),
                        None => Ok(None),
                    },
                }
            }
            TypeDescription::Object {
                properties,
                index_signatures,
            } => {
                if let Some(signature) = dictionary_signature(properties, index_signatures) {
                    // Registered before the value so a self-referencing value finds it.
                    let generics = self.type_parameters(fact, &scope)?;
                    let placeholder = TypeUse::node(self.registry.primitive(PrimitiveKind::Object));
                    let id = self.named(
                        fact,
                        Structure::dictionary(signature.key, placeholder).with_generics(generics),
                    )?;
                    self.built.insert(index, id);
                    let value = self.dictionary_value(signature, &scope, &fact.name)?;
                    if let Structure::Dictionary { value: slot, .. } =
                        &mut self.registry.node_mut(id).structure
                    {
                        *slot = value;
                    }
                    return Ok(Some(id));
                }

                let id = self.named(fact, Structure::empty_record())?;
                self.built.insert(index, id);
                for param in self.type_parameters(fact, &scope)? {
                    self.registry.add_generic_parameter(id, param);
                }
                self.populate_record(id, properties, &scope)?;
                Ok(Some(id))
            }
            TypeDescription::Array { element } => {
                let generics = self.type_parameters(fact, &scope)?;
                let element = self.resolve_or_object(element, &scope, "Item")?;
                self.named(fact, Structure::array(element).with_generics(generics))
                    .map(Some)
            }
            TypeDescription::Tuple { elements } => {
                let generics = self.type_parameters(fact, &scope)?;
                let elements = self.tuple_elements(elements, &scope)?;
                self.named(fact, Structure::tuple(elements).with_generics(generics))
                    .map(Some)
            }
            TypeDescription::Reference { .. }
            | TypeDescription::EnumLiteral { .. }
            | TypeDescription::TypeParameter { .. } => {
                match self.resolve_use(description, &scope, "")? {
                    Some(resolved) => self.alias_or_wrap(fact, resolved.ty, &scope).map(Some),
                    None => {
                        self.registry.diagnostics_mut().report(
                            DiagnosticKind::UnresolvedType,
                            &fact.name,
                            "declaration body could not be resolved",
                        );
                        Ok(None)
                    }
                }
            }
        }
    }

    /// Type parameters of a declaration, defaults resolved in its scope.
    fn type_parameters(
        &mut self,
        fact: &'a DeclarationFact,
        scope: &Scope,
    ) -> Result<Vec<GenericParam>, ConvertError> {
        let mut params = Vec::with_capacity(fact.type_parameters.len());
        for parameter in &fact.type_parameters {
            let default = match &parameter.default {
                Some(default) => self
                    .resolve_use(default, scope, &parameter.name)?
                    .map(|r| r.ty),
                None => None,
            };
            params.push(GenericParam {
                name: parameter.name.clone(),
                default,
            });
        }
        Ok(params)
    }

    /// Register a node carrying the declaration's name and flags.
    fn named(
        &mut self,
        fact: &DeclarationFact,
        structure: Structure,
    ) -> Result<NodeId, ConvertError> {
        let mut node = IrNode::new(&fact.name, structure)
            .with_flags(NodeFlags {
                internal: fact.internal,
                is_public: fact.is_public,
                should_be_rendered: fact.should_render(),
                ..NodeFlags::default()
            })
            .with_level(fact.level)
            .with_comment(fact.comment.clone());
        if let Some(origin) = &fact.origin_id {
            node = node.with_origin(origin);
        }
        self.registry.add_type(node)
    }

    /// A declaration whose body is another type: alias plain node uses, wrap
    /// arrays and instantiations in a named node.
    fn alias_or_wrap(
        &mut self,
        fact: &'a DeclarationFact,
        ty: TypeUse,
        scope: &Scope,
    ) -> Result<NodeId, ConvertError> {
        let TypeRef::Node(target) = ty.target else {
            return Ok(self.registry.primitive(PrimitiveKind::Object));
        };
        if ty.array_depth > 0 {
            let generics = self.type_parameters(fact, scope)?;
            let element = TypeUse {
                array_depth: ty.array_depth - 1,
                ..ty
            };
            return self.named(fact, Structure::array(element).with_generics(generics));
        }
        if ty.type_arguments.is_empty() {
            return Ok(target);
        }
        let generics = self.type_parameters(fact, scope)?;
        self.named(
            fact,
            Structure::instance(target, ty.type_arguments).with_generics(generics),
        )
    }

    fn constant(
        &mut self,
        fact: &DeclarationFact,
        initializer: &str,
        declared: Option<&'a TypeDescription>,
    ) -> Result<NodeId, ConvertError> {
        let (value, comment) =
            self.evaluate_initializer(&fact.name, initializer, fact.comment.clone());
        let scope = Scope {
            name: self.config.constants_class.clone(),
            level: fact.level,
            generics: Vec::new(),
        };
        let declared = match declared {
            Some(declared) => self.resolve_use(declared, &scope, &fact.name)?,
            None => None,
        };
        let ty = match declared {
            Some(resolved) => resolved.ty,
            None => self.infer_use(&value),
        };
        Ok(self.registry.add_const(Constant {
            name: fact.name.clone(),
            ty,
            value,
            comment,
        }))
    }

    // =========================================================================
    // Records
    // =========================================================================

    fn populate_record(
        &mut self,
        id: NodeId,
        properties: &'a [PropertyFact],
        scope: &Scope,
    ) -> Result<(), ConvertError> {
        for fact in properties {
            let subject = format!("{}.{}", scope.name, fact.name);
            let Some(resolved) = self.resolve_use(&fact.ty, scope, &fact.name)? else {
                self.registry.diagnostics_mut().report(
                    DiagnosticKind::UnresolvedType,
                    &subject,
                    "property type could not be resolved; property skipped",
                );
                continue;
            };

            let mut ty = resolved.ty;
            ty.array_depth = ty.array_depth.saturating_add(fact.array_depth);

            let mut comment = fact.comment.clone();
            let default = match &fact.initializer {
                Some(text) => {
                    let (value, note) = self.evaluate_initializer(&subject, text, comment.take());
                    comment = note;
                    Some(value)
                }
                None => None,
            };

            self.registry.add_property(
                id,
                Property {
                    name: fact.name.clone(),
                    ty,
                    optional: fact.optional || resolved.nullable,
                    readonly: fact.readonly,
                    comment,
                    default,
                },
            );
        }
        Ok(())
    }

    /// Synthesize an internal record for an inline object type.
    fn anonymous_record(
        &mut self,
        name: String,
        properties: &'a [PropertyFact],
        scope: &Scope,
    ) -> Result<TypeUse, ConvertError> {
        let nested = scope.nested(name.clone());
        let id = self.anonymous(name, Structure::empty_record(), nested.level)?;
        self.populate_record(id, properties, &nested)?;

        // Generic parameters of the enclosing declaration used inside the
        // inline shape become parameters of the synthesized record.
        let used: Vec<String> = match &self.registry.node(id).structure {
            Structure::Record { properties, .. } => nested
                .generics
                .iter()
                .filter(|g| properties.iter().any(|p| p.ty.mentions_generic(g)))
                .cloned()
                .collect(),
            _ => Vec::new(),
        };
        for name in &used {
            self.registry.add_generic_parameter(
                id,
                GenericParam {
                    name: name.clone(),
                    default: None,
                },
            );
        }
        Ok(TypeUse::node(id).with_arguments(used.into_iter().map(TypeUse::generic).collect()))
    }

    fn anonymous(
        &mut self,
        name: String,
        structure: Structure,
        level: u32,
    ) -> Result<NodeId, ConvertError> {
        let node = IrNode::new(name, structure)
            .with_level(level)
            .with_flags(NodeFlags {
                internal: true,
                anonymous: true,
                ..NodeFlags::default()
            });
        self.registry.add_type(node)
    }

    // =========================================================================
    // Reference sites
    // =========================================================================

    /// Resolve a type description in property, argument or element position.
    fn resolve_use(
        &mut self,
        description: &'a TypeDescription,
        scope: &Scope,
        member: &str,
    ) -> Result<Option<Resolved>, ConvertError> {
        let resolved = match description {
            TypeDescription::Primitive { name } => Some(Resolved {
                ty: TypeUse::node(self.registry.primitive(*name)),
                nullable: description.is_nullish(),
            }),
            TypeDescription::StringLiteral { .. } => Some(self.primitive_use(PrimitiveKind::String)),
            TypeDescription::NumberLiteral { .. } => Some(self.primitive_use(PrimitiveKind::Number)),
            TypeDescription::BooleanLiteral { .. } => {
                Some(self.primitive_use(PrimitiveKind::Boolean))
            }
            TypeDescription::EnumLiteral {
                enum_name, member, ..
            } => self
                .enum_literal(enum_name.as_deref(), member)?
                .map(|id| Resolved::plain(TypeUse::node(id))),
            TypeDescription::Union { members } => self.resolve_union(members, scope, member)?,
            TypeDescription::Enum { members } => {
                let name = synthesized_name(&scope.name, member, "Enum");
                let members = self.enum_members(&name, members.iter().map(enum_fact_pair));
                let id = self.anonymous(name, Structure::StringUnion { members }, scope.level + 1)?;
                Some(Resolved::plain(TypeUse::node(id)))
            }
            TypeDescription::Object {
                properties,
                index_signatures,
            } => {
                if let Some(signature) = dictionary_signature(properties, index_signatures) {
                    let prefix = synthesized_name(&scope.name, member, "");
                    let value = self.dictionary_value(signature, scope, &prefix)?;
                    let id = self.anonymous(
                        format!("{prefix}Dictionary"),
                        Structure::dictionary(signature.key, value),
                        scope.level + 1,
                    )?;
                    Some(Resolved::plain(TypeUse::node(id)))
                } else {
                    let name = synthesized_name(&scope.name, member, "Class");
                    Some(Resolved::plain(self.anonymous_record(name, properties, scope)?))
                }
            }
            TypeDescription::Array { element } => {
                self.resolve_use(element, scope, member)?.map(|mut r| {
                    r.ty.array_depth = r.ty.array_depth.saturating_add(1);
                    r
                })
            }
            TypeDescription::Tuple { elements } => {
                let nested = scope.nested(synthesized_name(&scope.name, member, ""));
                let elements = self.tuple_elements(elements, &nested)?;
                let id = self.anonymous(
                    format!("{}Tuple", nested.name),
                    Structure::tuple(elements),
                    nested.level,
                )?;
                Some(Resolved::plain(TypeUse::node(id)))
            }
            TypeDescription::Reference {
                name,
                origin_id,
                type_arguments,
            } => self.reference(name, origin_id.as_deref(), type_arguments, scope, member)?,
            TypeDescription::TypeParameter { name } => scope
                .generics
                .iter()
                .any(|g| g == name)
                .then(|| Resolved::plain(TypeUse::generic(name.clone()))),
        };
        Ok(resolved)
    }

    fn primitive_use(&mut self, kind: PrimitiveKind) -> Resolved {
        Resolved::plain(TypeUse::node(self.registry.primitive(kind)))
    }

    fn resolve_or_object(
        &mut self,
        description: &'a TypeDescription,
        scope: &Scope,
        member: &str,
    ) -> Result<TypeUse, ConvertError> {
        Ok(match self.resolve_use(description, scope, member)? {
            Some(resolved) => resolved.ty,
            None => TypeUse::node(self.registry.primitive(PrimitiveKind::Object)),
        })
    }

    fn tuple_elements(
        &mut self,
        elements: &'a [TypeDescription],
        scope: &Scope,
    ) -> Result<Vec<TypeUse>, ConvertError> {
        let mut uses = Vec::with_capacity(elements.len());
        for (i, element) in elements.iter().enumerate() {
            uses.push(self.resolve_or_object(element, scope, &format!("Item{}", i + 1))?);
        }
        Ok(uses)
    }

    /// Value type of a dictionary; an inline object becomes `{prefix}Value`.
    fn dictionary_value(
        &mut self,
        signature: &'a IndexSignatureFact,
        scope: &Scope,
        prefix: &str,
    ) -> Result<TypeUse, ConvertError> {
        if let TypeDescription::Object {
            properties,
            index_signatures,
        } = signature.value.as_ref()
        {
            if dictionary_signature(properties, index_signatures).is_none() {
                let name = format!("{}Value", to_pascal_case(prefix));
                return self.anonymous_record(name, properties, scope);
            }
        }
        let nested = scope.nested(prefix.to_string());
        self.resolve_or_object(&signature.value, &nested, "Value")
    }

    fn reference(
        &mut self,
        name: &str,
        origin_id: Option<&str>,
        type_arguments: &'a [TypeDescription],
        scope: &Scope,
        member: &str,
    ) -> Result<Option<Resolved>, ConvertError> {
        if scope.generics.iter().any(|g| g == name) && type_arguments.is_empty() {
            return Ok(Some(Resolved::plain(TypeUse::generic(name))));
        }

        let target = match origin_id.and_then(|origin| self.by_origin.get(origin).copied()) {
            Some(index) => self.declaration(index)?,
            None => match self.by_name.get(name).and_then(|indices| indices.first().copied()) {
                Some(index) => self.declaration(index)?,
                None => {
                    if let Some(resolved) = self.builtin_reference(name, type_arguments, scope, member)? {
                        return Ok(Some(resolved));
                    }
                    self.registry.find_by_type_text(name)
                }
            },
        };
        let Some(target) = target else {
            return Ok(None);
        };

        let mut arguments = Vec::with_capacity(type_arguments.len());
        for argument in type_arguments {
            arguments.push(self.resolve_or_object(argument, scope, member)?);
        }
        Ok(Some(Resolved::plain(
            TypeUse::node(target).with_arguments(arguments),
        )))
    }

    /// `Array<T>`, `ReadonlyArray<T>` and `Record<K, V>` when no declaration
    /// of that name exists.
    fn builtin_reference(
        &mut self,
        name: &str,
        type_arguments: &'a [TypeDescription],
        scope: &Scope,
        member: &str,
    ) -> Result<Option<Resolved>, ConvertError> {
        match (name, type_arguments) {
            ("Array" | "ReadonlyArray", [element]) => {
                Ok(self.resolve_use(element, scope, member)?.map(|mut r| {
                    r.ty.array_depth = r.ty.array_depth.saturating_add(1);
                    r
                }))
            }
            ("Record", [key, value]) => {
                let key = match key {
                    TypeDescription::Primitive {
                        name: PrimitiveKind::Number,
                    }
                    | TypeDescription::NumberLiteral { .. } => IndexKey::Number,
                    _ => IndexKey::String,
                };
                let prefix = synthesized_name(&scope.name, member, "");
                let nested = scope.nested(prefix.clone());
                let value = self.resolve_or_object(value, &nested, "Value")?;
                let id = self.anonymous(
                    format!("{prefix}Dictionary"),
                    Structure::dictionary(key, value),
                    nested.level,
                )?;
                Ok(Some(Resolved::plain(TypeUse::node(id))))
            }
            _ => Ok(None),
        }
    }

    fn enum_literal(
        &mut self,
        enum_name: Option<&str>,
        member: &str,
    ) -> Result<Option<NodeId>, ConvertError> {
        // Make sure the enum itself has been built before searching for it.
        if let Some(indices) = enum_name.and_then(|name| self.by_name.get(name)).cloned() {
            for index in indices {
                self.declaration(index)?;
            }
        }
        Ok(self.registry.find_union_containing(member, enum_name))
    }

    // =========================================================================
    // Unions
    // =========================================================================

    fn resolve_union(
        &mut self,
        members: &'a [TypeDescription],
        scope: &Scope,
        member: &str,
    ) -> Result<Option<Resolved>, ConvertError> {
        let non_null: Vec<&'a TypeDescription> =
            members.iter().filter(|m| !m.is_nullish()).collect();
        let nullable = non_null.len() != members.len();
        let with_nullable = |ty: TypeUse| Resolved { ty, nullable };

        if non_null.is_empty() {
            let id = self.registry.primitive(PrimitiveKind::Null);
            return Ok(Some(with_nullable(TypeUse::node(id))));
        }

        let name = synthesized_name(&scope.name, member, "Enum");
        match self.literal_union(&name, &non_null) {
            Some(LiteralUnion::Members(members)) => {
                let id = self.anonymous(name, Structure::StringUnion { members }, scope.level + 1)?;
                return Ok(Some(with_nullable(TypeUse::node(id))));
            }
            Some(LiteralUnion::Existing(id)) => return Ok(Some(with_nullable(TypeUse::node(id)))),
            None => {}
        }

        if let [only] = non_null.as_slice() {
            return Ok(self.resolve_use(*only, scope, member)?.map(|r| Resolved {
                ty: r.ty,
                nullable: nullable || r.nullable,
            }));
        }

        let collapsed = if non_null.iter().all(|m| is_numeric(m)) {
            Some(PrimitiveKind::Number)
        } else if non_null.iter().all(|m| is_stringy(m)) {
            Some(PrimitiveKind::String)
        } else if non_null.iter().all(|m| is_boolean(m)) {
            Some(PrimitiveKind::Boolean)
        } else {
            None
        };
        if let Some(kind) = collapsed {
            let id = self.registry.primitive(kind);
            return Ok(Some(with_nullable(TypeUse::node(id))));
        }

        if let Some(ty) = self.class_union(&non_null, scope, member)? {
            return Ok(Some(with_nullable(ty)));
        }

        self.registry.diagnostics_mut().report(
            DiagnosticKind::LossyUnion,
            format!("{}.{member}", scope.name),
            format!("union of {} members collapsed to object", non_null.len()),
        );
        let id = self.registry.primitive(PrimitiveKind::Object);
        Ok(Some(with_nullable(TypeUse::node(id))))
    }

    fn literal_union(
        &mut self,
        subject: &str,
        non_null: &[&'a TypeDescription],
    ) -> Option<LiteralUnion> {
        if non_null.is_empty() {
            return None;
        }

        if non_null
            .iter()
            .all(|m| matches!(m, TypeDescription::StringLiteral { .. }))
        {
            let mut seen = HashSet::new();
            let members = non_null
                .iter()
                .filter_map(|m| match m {
                    TypeDescription::StringLiteral { value } => Some(value),
                    _ => None,
                })
                .filter(|value| seen.insert(value.as_str()))
                .map(|value| EnumMember {
                    name: value.clone(),
                    value: None,
                    wire: Some(value.clone()),
                })
                .collect();
            return Some(LiteralUnion::Members(members));
        }

        if non_null.len() == 1 {
            return None;
        }

        let literals: Option<Vec<(&str, &str, Option<&EnumValue>)>> = non_null
            .iter()
            .map(|m| match m {
                TypeDescription::EnumLiteral {
                    enum_name,
                    member,
                    value,
                } => Some((enum_name.as_deref().unwrap_or_default(), member.as_str(), value.as_ref())),
                _ => None,
            })
            .collect();
        let literals = literals?;

        if let Some(existing) = self.existing_enum(&literals) {
            return Some(LiteralUnion::Existing(existing));
        }
        let members = self.enum_members(
            subject,
            literals.iter().map(|(_, member, value)| (*member, *value)),
        );
        Some(LiteralUnion::Members(members))
    }

    /// The declared enum covering exactly these literals, if there is one.
    fn existing_enum(&mut self, literals: &[(&str, &str, Option<&EnumValue>)]) -> Option<NodeId> {
        let &(enum_name, first, _) = literals.first()?;
        if enum_name.is_empty() || literals.iter().any(|(name, _, _)| *name != enum_name) {
            return None;
        }
        if let Some(indices) = self.by_name.get(enum_name).cloned() {
            for index in indices {
                // A failure here resurfaces when the enum is built on its own.
                if self.declaration(index).is_err() {
                    return None;
                }
            }
        }
        let id = self.registry.find_union_containing(first, Some(enum_name))?;
        match &self.registry.node(id).structure {
            Structure::StringUnion { members }
                if members.len() == literals.len()
                    && literals
                        .iter()
                        .all(|(_, m, _)| members.iter().any(|existing| existing.name == *m)) =>
            {
                Some(id)
            }
            _ => None,
        }
    }

    /// Members with explicit values only where `previous + 1` breaks.
    fn enum_members<'m>(
        &mut self,
        subject: &str,
        members: impl Iterator<Item = (&'m str, Option<&'m EnumValue>)>,
    ) -> Vec<EnumMember> {
        let mut out: Vec<EnumMember> = Vec::new();
        let mut expected: i64 = 0;

        for (name, value) in members {
            if out.iter().any(|m| m.name == name) {
                continue;
            }
            let mut member = EnumMember::implicit(name);
            match value {
                Some(EnumValue::Number(n))
                    if n.fract() == 0.0
                        && (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(n) =>
                {
                    let n = *n as i64;
                    if n != expected {
                        member.value = Some(n);
                    }
                    expected = n.saturating_add(1);
                }
                Some(EnumValue::Number(n)) => {
                    let problem = if n.fract() == 0.0 {
                        "is outside the int range"
                    } else {
                        "is not integral"
                    };
                    self.registry.diagnostics_mut().report(
                        DiagnosticKind::NonIntegralEnum,
                        format!("{subject}.{name}"),
                        format!("value {n} {problem}; using the implicit value"),
                    );
                    expected = expected.saturating_add(1);
                }
                Some(EnumValue::String(s)) => {
                    member.wire = Some(s.clone());
                    expected = expected.saturating_add(1);
                }
                None => expected = expected.saturating_add(1),
            }
            out.push(member);
        }
        out
    }

    fn class_union(
        &mut self,
        non_null: &[&'a TypeDescription],
        scope: &Scope,
        member: &str,
    ) -> Result<Option<TypeUse>, ConvertError> {
        let arity = non_null.len();
        if !self.config.class_unions || !(2..=self.config.max_class_union_arity).contains(&arity) {
            return Ok(None);
        }
        if !non_null.iter().all(|m| {
            matches!(
                m,
                TypeDescription::Object { .. } | TypeDescription::Reference { .. }
            )
        }) {
            return Ok(None);
        }

        let prefix = synthesized_name(&scope.name, member, "");
        let mut uses = Vec::with_capacity(arity);
        for (i, description) in non_null.iter().enumerate() {
            let option = format!("{member}Option{}", i + 1);
            let Some(resolved) = self.resolve_use(*description, scope, &option)? else {
                return Ok(None);
            };
            let is_record = resolved.ty.array_depth == 0
                && resolved.ty.node_id().is_some_and(|id| {
                    matches!(self.registry.node(id).structure, Structure::Record { .. })
                });
            if !is_record {
                return Ok(None);
            }
            uses.push(resolved.ty);
        }

        let base = self.registry.class_union_base(arity)?;
        let id = self.anonymous(
            format!("{prefix}Union"),
            Structure::ClassUnionInstance {
                base,
                members: uses,
            },
            scope.level + 1,
        )?;
        Ok(Some(TypeUse::node(id)))
    }

    // =========================================================================
    // Initializers
    // =========================================================================

    /// Evaluate an initializer, falling back to null with an explanatory note.
    fn evaluate_initializer(
        &mut self,
        subject: &str,
        text: &str,
        comment: Option<String>,
    ) -> (ConstValue, Option<String>) {
        match literal::evaluate(text) {
            Ok(value) => (value, comment),
            Err(err) => {
                self.registry.diagnostics_mut().report(
                    DiagnosticKind::UnresolvedInitializer,
                    subject,
                    format!("`{text}`: {err}"),
                );
                let note = format!("Initializer `{text}` is not a constant expression.");
                let comment = match comment {
                    Some(existing) => format!("{existing}\n{note}"),
                    None => note,
                };
                (ConstValue::Null, Some(comment))
            }
        }
    }

    fn infer_use(&mut self, value: &ConstValue) -> TypeUse {
        let kind = match value {
            ConstValue::Null => PrimitiveKind::Object,
            ConstValue::Bool(_) => PrimitiveKind::Boolean,
            ConstValue::Number(_) => PrimitiveKind::Number,
            ConstValue::String(_) => PrimitiveKind::String,
            ConstValue::Array(items) => {
                let mut element: Option<TypeUse> = None;
                for item in items.iter().filter(|item| !item.is_null()) {
                    let inferred = self.infer_use(item);
                    element = match element {
                        Some(existing) if existing != inferred => {
                            Some(self.object_use())
                        }
                        Some(existing) => Some(existing),
                        None => Some(inferred),
                    };
                }
                let mut element = match element {
                    Some(element) => element,
                    None => self.object_use(),
                };
                element.array_depth = element.array_depth.saturating_add(1);
                return element;
            }
        };
        TypeUse::node(self.registry.primitive(kind))
    }

    fn object_use(&mut self) -> TypeUse {
        TypeUse::node(self.registry.primitive(PrimitiveKind::Object))
    }
}

/// The single index signature of an object with no named properties.
fn dictionary_signature<'d>(
    properties: &[PropertyFact],
    index_signatures: &'d [IndexSignatureFact],
) -> Option<&'d IndexSignatureFact> {
    match index_signatures {
        [signature] if properties.is_empty() => Some(signature),
        _ => None,
    }
}

fn enum_fact_pair(member: &EnumMemberFact) -> (&str, Option<&EnumValue>) {
    (member.name.as_str(), member.value.as_ref())
}

/// `{Parent}{Member}{suffix}` in Pascal case.
fn synthesized_name(parent: &str, member: &str, suffix: &str) -> String {
    format!("{}{}{suffix}", to_pascal_case(parent), to_pascal_case(member))
}

fn is_numeric(description: &TypeDescription) -> bool {
    matches!(
        description,
        TypeDescription::Primitive {
            name: PrimitiveKind::Number
        } | TypeDescription::NumberLiteral { .. }
    )
}

fn is_stringy(description: &TypeDescription) -> bool {
    matches!(
        description,
        TypeDescription::Primitive {
            name: PrimitiveKind::String
        } | TypeDescription::StringLiteral { .. }
    )
}

fn is_boolean(description: &TypeDescription) -> bool {
    matches!(
        description,
        TypeDescription::Primitive {
            name: PrimitiveKind::Boolean
        } | TypeDescription::BooleanLiteral { .. }
    )
}
