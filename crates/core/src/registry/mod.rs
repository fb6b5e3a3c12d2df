//! Type registry: the per-run arena of IR nodes.
//!
//! The registry assigns identity keys, resolves display-name collisions,
//! tracks redirects left behind by `replace` and consolidation, and answers
//! the lookups the factory needs while facts are still being ingested.
//!
//! ## Module Structure
//!
//! - `hash`: structural fingerprints
//! - `consolidate`: hash-bucket deduplication
//! - `reachability`: pruning, descendant flags and name prettification

mod consolidate;
mod hash;
mod reachability;

use std::collections::{HashMap, HashSet};

use tracing::debug;
use typebridge_common::facts::PrimitiveKind;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::ConvertError;
use crate::ir::{
    Constant, DeclarationKind, EnumMember, GenericParam, IrNode, NodeFlags, NodeId, Property,
    Structure,
};

/// Identity key of the module-level constants bucket.
pub const CONSTANTS_KEY: &str = "__constants__";

/// Display-name prefix of synthetic class-union bases (`Union2`, `Union3`, ...).
pub const CLASS_UNION_PREFIX: &str = "Union";

/// Arena of IR nodes for one conversion run.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    nodes: Vec<IrNode>,
    by_key: HashMap<String, NodeId>,
    by_name: HashMap<String, NodeId>,
    redirects: HashMap<NodeId, NodeId>,
    primitives: HashMap<PrimitiveKind, NodeId>,
    constants: Option<NodeId>,
    /// Synthetic class-union base per arity.
    union_bases: HashMap<usize, NodeId>,
    /// Cycle-free subtree hashes, shared across hash roots.
    hash_memo: HashMap<NodeId, String>,
    hashes_dirty: bool,
    /// Outgoing references per live node, recorded by consolidation.
    edges: HashMap<NodeId, Vec<NodeId>>,
    /// Set by `prune`; `None` means everything live is retained.
    retained: Option<HashSet<NodeId>>,
    next_synthetic: u32,
    diagnostics: Diagnostics,
}

impl TypeRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a node, returning the id callers should use for it.
    ///
    /// A node whose identity key is already present is not added; the
    /// existing node is returned. A display-name collision renames the
    /// newcomer, except for synthetic class-union bases where the candidate
    /// with the higher value score wins.
    pub fn add_type(&mut self, mut node: IrNode) -> Result<NodeId, ConvertError> {
        let key = self.identity_key_for(&mut node)?;
        if let Some(&existing) = self.by_key.get(&key) {
            return Ok(self.resolve(existing));
        }
        node.identity_key.clone_from(&key);

        if !node.is_primitive() {
            while let Some(other) = self.live_by_name(&node.name) {
                let same_union_base = match (&node.structure, &self.nodes[other.index()].structure) {
                    (Structure::ClassUnion { arity: a }, Structure::ClassUnion { arity: b }) => a == b,
                    _ => false,
                };

                if same_union_base {
                    if node.value_score() > self.nodes[other.index()].value_score() {
                        return Ok(self.replace_node(other, node));
                    }
                    self.by_key.insert(key, other);
                    return Ok(other);
                }

                let renamed = disambiguate(&node);
                self.diagnostics.report(
                    DiagnosticKind::Renamed,
                    &node.name,
                    format!(
                        "name already taken by {}, renamed to {renamed}",
                        self.nodes[other.index()].identity_key
                    ),
                );
                if node.disambiguated_from.is_none() {
                    node.disambiguated_from = Some(node.name.clone());
                }
                node.name = renamed;
            }
        }

        Ok(self.push(node))
    }

    /// Substitute the node registered under `old_key`.
    ///
    /// Lookups by the old key or the old id resolve to the new node
    /// afterwards. Returns `None` when `old_key` is unknown.
    pub fn replace(&mut self, old_key: &str, mut node: IrNode) -> Result<Option<NodeId>, ConvertError> {
        let Some(&old) = self.by_key.get(old_key) else {
            return Ok(None);
        };
        let key = self.identity_key_for(&mut node)?;
        node.identity_key = key;
        let old = self.resolve(old);
        Ok(Some(self.replace_node(old, node)))
    }

    fn replace_node(&mut self, old: NodeId, node: IrNode) -> NodeId {
        let old_key = self.nodes[old.index()].identity_key.clone();
        let old_name = self.nodes[old.index()].name.clone();
        if self.by_name.get(&old_name) == Some(&old) {
            self.by_name.remove(&old_name);
        }
        let new = self.push(node);
        self.redirects.insert(old, new);
        self.by_key.insert(old_key, new);
        debug!(old = %old, new = %new, "Replaced node");
        self.invalidate_hashes();
        new
    }

    fn push(&mut self, node: IrNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.by_key.insert(node.identity_key.clone(), id);
        if !node.is_primitive() || !self.by_name.contains_key(&node.name) {
            self.by_name.insert(node.name.clone(), id);
        }
        self.nodes.push(node);
        self.hashes_dirty = true;
        id
    }

    /// Derive the identity key, issuing a synthetic origin id when needed.
    fn identity_key_for(&mut self, node: &mut IrNode) -> Result<String, ConvertError> {
        match &node.structure {
            Structure::Primitive(kind) => Ok(kind.as_str().to_string()),
            Structure::Const { .. } => Ok(CONSTANTS_KEY.to_string()),
            structure => {
                if node.name.trim().is_empty() {
                    return Err(ConvertError::MissingIdentity {
                        kind: structure.token_type().as_str(),
                    });
                }
                let origin = match &node.origin_id {
                    Some(origin) => origin.clone(),
                    None => {
                        self.next_synthetic += 1;
                        let origin = format!("synthetic-{}", self.next_synthetic);
                        node.origin_id = Some(origin.clone());
                        origin
                    }
                };
                Ok(format!("{}#{origin}", node.name))
            }
        }
    }

    /// Singleton node for a primitive.
    pub fn primitive(&mut self, kind: PrimitiveKind) -> NodeId {
        if let Some(&id) = self.primitives.get(&kind) {
            return id;
        }
        let mut node = IrNode::new(kind.as_str(), Structure::Primitive(kind));
        node.identity_key = kind.as_str().to_string();
        let id = self.push(node);
        self.primitives.insert(kind, id);
        id
    }

    /// Synthetic class-union base of the given arity.
    ///
    /// Bases are keyed by arity, so a user type that takes the `UnionN`
    /// name pushes the base aside without handing it another arity's name.
    pub fn class_union_base(&mut self, arity: usize) -> Result<NodeId, ConvertError> {
        if let Some(&existing) = self.union_bases.get(&arity) {
            return Ok(self.resolve(existing));
        }
        let node = IrNode::new(
            format!("{CLASS_UNION_PREFIX}{arity}"),
            Structure::ClassUnion { arity },
        )
        .with_flags(NodeFlags {
            internal: true,
            ..NodeFlags::default()
        });
        let id = self.add_type(node)?;
        self.union_bases.insert(arity, id);
        Ok(id)
    }

    // =========================================================================
    // Incremental mutation
    // =========================================================================

    /// Append a property to a record. A property name already present is kept.
    pub fn add_property(&mut self, id: NodeId, property: Property) {
        let id = self.resolve(id);
        if let Structure::Record { properties, .. } = &mut self.nodes[id.index()].structure {
            if !properties.iter().any(|p| p.name == property.name) {
                properties.push(property);
            }
        }
        self.touch(id);
    }

    /// Append an enum member. Duplicate member names are dropped.
    pub fn add_member(&mut self, id: NodeId, member: EnumMember) {
        let id = self.resolve(id);
        if let Structure::StringUnion { members } = &mut self.nodes[id.index()].structure {
            if !members.iter().any(|m| m.name == member.name) {
                members.push(member);
            }
        }
        self.touch(id);
    }

    /// Append a type parameter to a declared shape. A name already present is kept.
    pub fn add_generic_parameter(&mut self, id: NodeId, param: GenericParam) {
        let id = self.resolve(id);
        if let Some(generics) = self.nodes[id.index()].structure.generics_mut() {
            if !generics.iter().any(|g| g.name == param.name) {
                generics.push(param);
            }
        }
        self.touch(id);
    }

    /// Add an entry to the constants bucket, creating the bucket on first use.
    pub fn add_const(&mut self, constant: Constant) -> NodeId {
        let id = match self.constants {
            Some(id) => self.resolve(id),
            None => {
                let mut node = IrNode::new(CONSTANTS_KEY, Structure::Const { constants: Vec::new() })
                    .public();
                node.identity_key = CONSTANTS_KEY.to_string();
                let id = self.push(node);
                self.constants = Some(id);
                id
            }
        };
        if let Structure::Const { constants } = &mut self.nodes[id.index()].structure {
            if !constants.iter().any(|c| c.name == constant.name) {
                constants.push(constant);
            }
        }
        self.touch(id);
        id
    }

    fn touch(&mut self, id: NodeId) {
        self.nodes[id.index()].reset_hash();
        self.hashes_dirty = true;
    }

    /// Drop every memoized hash.
    pub fn invalidate_hashes(&mut self) {
        for node in &mut self.nodes {
            node.reset_hash();
        }
        self.hash_memo.clear();
        self.hashes_dirty = false;
    }

    fn rename(&mut self, id: NodeId, name: String) {
        let old = std::mem::replace(&mut self.nodes[id.index()].name, name.clone());
        if self.by_name.get(&old) == Some(&id) {
            self.by_name.remove(&old);
        }
        self.by_name.insert(name, id);
    }

    /// Point `from` at `to` and retire `from` from the live set.
    fn redirect(&mut self, from: NodeId, to: NodeId) {
        let key = self.nodes[from.index()].identity_key.clone();
        let name = self.nodes[from.index()].name.clone();
        if self.by_name.get(&name) == Some(&from) {
            self.by_name.remove(&name);
        }
        self.by_key.insert(key, to);
        self.redirects.insert(from, to);
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Follow redirects to the live node.
    pub fn resolve(&self, id: NodeId) -> NodeId {
        resolve_in(&self.redirects, id)
    }

    /// Node by id, following redirects.
    pub fn node(&self, id: NodeId) -> &IrNode {
        &self.nodes[self.resolve(id).index()]
    }

    /// Mutable node by id, following redirects. Marks hashes stale.
    pub fn node_mut(&mut self, id: NodeId) -> &mut IrNode {
        let id = self.resolve(id);
        self.hashes_dirty = true;
        &mut self.nodes[id.index()]
    }

    /// Live node registered under an identity key.
    pub fn get_by_key(&self, key: &str) -> Option<NodeId> {
        self.by_key.get(key).map(|id| self.resolve(*id))
    }

    /// Whether `id` exists and has not been redirected.
    pub fn is_live(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len() && !self.redirects.contains_key(&id)
    }

    /// Live node ids in insertion order.
    pub fn live_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32)
            .map(NodeId)
            .filter(|id| !self.redirects.contains_key(id))
    }

    /// Number of live nodes.
    pub fn live_count(&self) -> usize {
        self.nodes.len() - self.redirects.len()
    }

    fn live_by_name(&self, name: &str) -> Option<NodeId> {
        let id = *self.by_name.get(name)?;
        (self.is_live(id) && self.nodes[id.index()].name == name).then_some(id)
    }

    /// Live node with this display name.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.live_by_name(name)
            .or_else(|| self.live_ids().find(|id| self.nodes[id.index()].name == name))
    }

    /// The constants bucket, once any constant was added.
    pub const fn constants(&self) -> Option<NodeId> {
        self.constants
    }

    /// Find a live node from rendered type text such as `Page<User>[]`.
    ///
    /// Array suffixes and generic argument lists are stripped before the name
    /// is matched.
    pub fn find_by_type_text(&self, text: &str) -> Option<NodeId> {
        let name = strip_type_text(text);
        if name.is_empty() {
            return None;
        }
        self.find_by_name(name)
    }

    /// Find the string-union node declaring `member`.
    ///
    /// `hint` narrows candidates by union name. Several candidates without a
    /// usable hint is reported and treated as not found.
    pub fn find_union_containing(&mut self, member: &str, hint: Option<&str>) -> Option<NodeId> {
        let candidates: Vec<NodeId> = self
            .live_ids()
            .filter(|id| match &self.nodes[id.index()].structure {
                Structure::StringUnion { members } => members.iter().any(|m| m.name == member),
                _ => false,
            })
            .collect();

        if let Some(hint) = hint {
            let hinted: Vec<NodeId> = candidates
                .iter()
                .copied()
                .filter(|id| {
                    let node = &self.nodes[id.index()];
                    node.name == hint || node.disambiguated_from.as_deref() == Some(hint)
                })
                .collect();
            if let [only] = hinted.as_slice() {
                return Some(*only);
            }
        }

        match candidates.as_slice() {
            [] => None,
            [only] => Some(*only),
            many => {
                let names: Vec<&str> = many
                    .iter()
                    .map(|id| self.nodes[id.index()].name.as_str())
                    .collect();
                self.diagnostics.report(
                    DiagnosticKind::AmbiguousUnion,
                    member,
                    format!("member is declared by {}", names.join(", ")),
                );
                None
            }
        }
    }

    // =========================================================================
    // Emission
    // =========================================================================

    /// Whether the last `prune` kept `id`. Everything is retained before pruning.
    pub fn is_retained(&self, id: NodeId) -> bool {
        let id = self.resolve(id);
        self.retained.as_ref().map_or(true, |set| set.contains(&id))
    }

    /// Whether a node renders by name rather than inline.
    pub fn is_declared(&self, id: NodeId) -> bool {
        let node = self.node(id);
        match &node.structure {
            Structure::Dictionary { .. } | Structure::Tuple { .. } | Structure::Instance { .. } => {
                !node.flags.anonymous
            }
            Structure::Const { constants } => !constants.is_empty(),
            structure => structure.token_type().declaration_kind().is_some(),
        }
    }

    /// Retained declarations sorted by kind, then by name.
    pub fn declarations(&self) -> Vec<NodeId> {
        let mut ids: Vec<(DeclarationKind, &str, NodeId)> = self
            .live_ids()
            .filter(|id| self.is_retained(*id) && self.is_declared(*id))
            .filter_map(|id| {
                let node = &self.nodes[id.index()];
                node.token_type()
                    .declaration_kind()
                    .map(|kind| (kind, node.name.as_str(), id))
            })
            .collect();
        ids.sort();
        ids.into_iter().map(|(_, _, id)| id).collect()
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Findings so far.
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Findings so far, for reporting.
    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Move the findings out, leaving an empty collection.
    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }
}

pub(crate) fn resolve_in(redirects: &HashMap<NodeId, NodeId>, id: NodeId) -> NodeId {
    let mut current = id;
    // Bounded walk; redirects never form a cycle but a bad chain must not hang.
    for _ in 0..=redirects.len() {
        match redirects.get(&current) {
            Some(next) => current = *next,
            None => break,
        }
    }
    current
}

/// Next display name for a node whose name is taken.
///
/// A class-union base named `UnionN` becomes `UnionNBase` first, since
/// bumping the digits would land on the base of another arity.
fn disambiguate(node: &IrNode) -> String {
    match node.structure {
        Structure::ClassUnion { arity } if node.name == format!("{CLASS_UNION_PREFIX}{arity}") => {
            format!("{}Base", node.name)
        }
        _ => next_disambiguated_name(&node.name),
    }
}

/// `User` -> `User1`, `User1` -> `User2`.
fn next_disambiguated_name(name: &str) -> String {
    let stem = name.trim_end_matches(|c: char| c.is_ascii_digit());
    let suffix = &name[stem.len()..];
    match suffix.parse::<u64>() {
        Ok(n) if !stem.is_empty() => format!("{stem}{}", n + 1),
        _ => format!("{name}1"),
    }
}

/// Strip array suffixes and generic argument lists from rendered type text.
fn strip_type_text(text: &str) -> &str {
    let mut rest = text.trim();
    loop {
        let Some(stripped) = rest.strip_suffix(']') else {
            break;
        };
        let Some(open) = stripped.rfind('[') else {
            break;
        };
        if !stripped[open + 1..].chars().all(|c| c == ',' || c.is_whitespace()) {
            break;
        }
        rest = stripped[..open].trim_end();
    }
    match rest.find('<') {
        Some(open) => rest[..open].trim(),
        None => rest,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ir::TypeUse;
    use typebridge_common::literal::ConstValue;

    fn record(name: &str, origin: &str) -> IrNode {
        IrNode::new(name, Structure::empty_record()).with_origin(origin)
    }

    #[test]
    fn test_identity_keys() {
        let mut registry = TypeRegistry::new();
        let string = registry.primitive(PrimitiveKind::String);
        assert_eq!(registry.node(string).identity_key, "string");
        assert_eq!(registry.primitive(PrimitiveKind::String), string);

        let user = registry.add_type(record("User", "src/user.ts:1")).unwrap();
        assert_eq!(registry.node(user).identity_key, "User#src/user.ts:1");

        let anon = registry
            .add_type(IrNode::new("Anon", Structure::empty_record()))
            .unwrap();
        assert_eq!(registry.node(anon).identity_key, "Anon#synthetic-1");

        let number = registry.primitive(PrimitiveKind::Number);
        let constants = registry.add_const(Constant {
            name: "MAX".into(),
            ty: TypeUse::node(number),
            value: ConstValue::Number(3.0),
            comment: None,
        });
        assert_eq!(registry.node(constants).identity_key, CONSTANTS_KEY);
    }

    #[test]
    fn test_empty_name_is_fatal() {
        let mut registry = TypeRegistry::new();
        let err = registry
            .add_type(IrNode::new("  ", Structure::empty_record()))
            .unwrap_err();
        assert!(matches!(err, ConvertError::MissingIdentity { kind: "record" }));
    }

    #[test]
    fn test_same_key_returns_existing() {
        let mut registry = TypeRegistry::new();
        let a = registry.add_type(record("User", "1")).unwrap();
        let b = registry.add_type(record("User", "1")).unwrap();
        assert_eq!(a, b);
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_rename_on_conflict() {
        let mut registry = TypeRegistry::new();
        let first = registry.add_type(record("User", "a")).unwrap();
        let second = registry.add_type(record("User", "b")).unwrap();
        let third = registry.add_type(record("User", "c")).unwrap();

        assert_eq!(registry.node(first).name, "User");
        assert_eq!(registry.node(second).name, "User1");
        assert_eq!(registry.node(third).name, "User2");
        assert_eq!(
            registry.node(third).disambiguated_from.as_deref(),
            Some("User")
        );
        assert_eq!(
            registry
                .diagnostics()
                .of_kind(DiagnosticKind::Renamed)
                .count(),
            3
        );
    }

    #[test]
    fn test_rename_increments_existing_suffix() {
        assert_eq!(next_disambiguated_name("User"), "User1");
        assert_eq!(next_disambiguated_name("User1"), "User2");
        assert_eq!(next_disambiguated_name("Vec9"), "Vec10");
        assert_eq!(next_disambiguated_name("42"), "421");
    }

    #[test]
    fn test_replace_redirects_key_and_id() {
        let mut registry = TypeRegistry::new();
        let old = registry.add_type(record("User", "a")).unwrap();
        let new = registry
            .replace("User#a", record("Person", "b"))
            .unwrap()
            .unwrap();

        assert_ne!(old, new);
        assert_eq!(registry.resolve(old), new);
        assert_eq!(registry.get_by_key("User#a"), Some(new));
        assert_eq!(registry.node(old).name, "Person");
        assert!(!registry.is_live(old));
        assert!(registry.replace("Missing#x", record("X", "x")).unwrap().is_none());
    }

    #[test]
    fn test_class_union_base_keeps_higher_score() {
        let mut registry = TypeRegistry::new();
        let low = registry
            .add_type(IrNode::new("Union2", Structure::ClassUnion { arity: 2 }).with_level(3))
            .unwrap();
        let high = registry
            .add_type(IrNode::new("Union2", Structure::ClassUnion { arity: 2 }).public())
            .unwrap();
        assert_ne!(low, high);
        assert_eq!(registry.resolve(low), high);
        assert_eq!(registry.node(high).name, "Union2");

        let lower = registry
            .add_type(IrNode::new("Union2", Structure::ClassUnion { arity: 2 }).with_level(9))
            .unwrap();
        assert_eq!(lower, high);
        assert_eq!(registry.class_union_base(2).unwrap(), high);
    }

    #[test]
    fn test_class_union_bases_are_keyed_by_arity() {
        let mut registry = TypeRegistry::new();
        let user = registry.add_type(record("Union2", "u")).unwrap();
        let two = registry.class_union_base(2).unwrap();
        let three = registry.class_union_base(3).unwrap();

        assert_ne!(two, three);
        assert_eq!(registry.node(user).name, "Union2");
        assert_eq!(registry.node(two).name, "Union2Base");
        assert_eq!(registry.node(three).name, "Union3");
        assert!(matches!(registry.node(two).structure, Structure::ClassUnion { arity: 2 }));
        assert!(matches!(registry.node(three).structure, Structure::ClassUnion { arity: 3 }));
        assert_eq!(registry.class_union_base(2).unwrap(), two);
    }

    #[test]
    fn test_incremental_mutation_dedupes() {
        let mut registry = TypeRegistry::new();
        let string = registry.primitive(PrimitiveKind::String);
        let user = registry.add_type(record("User", "a")).unwrap();
        registry.add_property(user, Property::new("name", TypeUse::node(string)));
        registry.add_property(user, Property::new("name", TypeUse::node(string)));
        registry.add_generic_parameter(
            user,
            GenericParam {
                name: "T".into(),
                default: None,
            },
        );

        let Structure::Record {
            generics,
            properties,
        } = &registry.node(user).structure
        else {
            panic!("expected record");
        };
        assert_eq!(properties.len(), 1);
        assert_eq!(generics.len(), 1);

        let status = registry
            .add_type(IrNode::new("Status", Structure::StringUnion { members: vec![] }))
            .unwrap();
        registry.add_member(status, EnumMember::implicit("Active"));
        registry.add_member(status, EnumMember::implicit("Active"));
        assert!(matches!(
            &registry.node(status).structure,
            Structure::StringUnion { members } if members.len() == 1
        ));
    }

    #[test]
    fn test_find_by_type_text() {
        let mut registry = TypeRegistry::new();
        let page = registry.add_type(record("Page", "p")).unwrap();
        assert_eq!(registry.find_by_type_text("Page<User>[]"), Some(page));
        assert_eq!(registry.find_by_type_text(" Page[][] "), Some(page));
        assert_eq!(registry.find_by_type_text("Page[,]"), Some(page));
        assert_eq!(registry.find_by_type_text("Missing"), None);
        assert_eq!(registry.find_by_type_text("[]"), None);
    }

    #[test]
    fn test_find_union_containing() {
        let mut registry = TypeRegistry::new();
        let status = registry
            .add_type(IrNode::new(
                "Status",
                Structure::StringUnion {
                    members: vec![EnumMember::implicit("Active"), EnumMember::implicit("Closed")],
                },
            ))
            .unwrap();
        let state = registry
            .add_type(IrNode::new(
                "State",
                Structure::StringUnion {
                    members: vec![EnumMember::implicit("Active")],
                },
            ))
            .unwrap();

        assert_eq!(registry.find_union_containing("Closed", None), Some(status));
        assert_eq!(registry.find_union_containing("Active", Some("State")), Some(state));
        assert_eq!(registry.find_union_containing("Active", None), None);
        assert_eq!(
            registry
                .diagnostics()
                .of_kind(DiagnosticKind::AmbiguousUnion)
                .count(),
            1
        );
        assert_eq!(registry.find_union_containing("Missing", None), None);
    }

    #[test]
    fn test_declarations_order() {
        let mut registry = TypeRegistry::new();
        let number = registry.primitive(PrimitiveKind::Number);
        registry.add_type(record("Zebra", "z")).unwrap();
        registry.add_type(record("Apple", "a")).unwrap();
        registry
            .add_type(IrNode::new("Color", Structure::StringUnion { members: vec![] }))
            .unwrap();
        registry.add_const(Constant {
            name: "LIMIT".into(),
            ty: TypeUse::node(number),
            value: ConstValue::Number(1.0),
            comment: None,
        });

        let names: Vec<&str> = registry
            .declarations()
            .into_iter()
            .map(|id| registry.node(id).name.as_str())
            .collect();
        assert_eq!(names, vec![CONSTANTS_KEY, "Color", "Apple", "Zebra"]);
    }
}
