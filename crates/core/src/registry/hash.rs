//! Structural fingerprints.
//!
//! A node's hash covers its token type and shape, never its display name
//! (primitives excepted), so identical shapes declared under different names
//! hash equal. Property entries are hashed one by one and sorted before the
//! final digest, making the result independent of insertion order.
//!
//! A reference back to a node already on the traversal stack hashes as
//! [`CYCLE_MARKER`]. Subtrees that hit the marker depend on where the walk
//! started, so only cycle-free subtree hashes are memoized.

use std::collections::{HashMap, HashSet};

use sha2::{Digest, Sha256};

use super::TypeRegistry;
use crate::ir::{NodeId, Structure, TypeRef, TypeUse};

/// Stands in for a reference back onto the traversal stack.
pub const CYCLE_MARKER: &str = "<cycle>";

struct StructuralHasher<'a> {
    registry: &'a TypeRegistry,
    memo: &'a mut HashMap<NodeId, String>,
    visiting: HashSet<NodeId>,
    cycle_hits: usize,
}

impl StructuralHasher<'_> {
    fn node_hash(&mut self, id: NodeId) -> String {
        let id = self.registry.resolve(id);
        if let Some(hash) = self.memo.get(&id) {
            return hash.clone();
        }
        if self.visiting.contains(&id) {
            self.cycle_hits += 1;
            return CYCLE_MARKER.to_string();
        }

        let hits_before = self.cycle_hits;
        self.visiting.insert(id);
        let hash = self.compute(id);
        self.visiting.remove(&id);

        if self.cycle_hits == hits_before {
            self.memo.insert(id, hash.clone());
        }
        hash
    }

    fn compute(&mut self, id: NodeId) -> String {
        let registry = self.registry;
        let node = &registry.nodes[id.index()];
        let mut digest = Sha256::new();
        feed(&mut digest, "token", node.token_type().as_str());
        let generics = node.structure.generics();
        if !generics.is_empty() {
            let names: Vec<&str> = generics.iter().map(|g| g.name.as_str()).collect();
            feed(&mut digest, "generics", &names.join(","));
        }

        match &node.structure {
            Structure::Primitive(kind) => feed(&mut digest, "name", kind.as_str()),
            Structure::Record { properties, .. } => {
                let mut entries: Vec<String> = properties
                    .iter()
                    .map(|p| {
                        let entry = format!(
                            "{}:{}#{}#{}#{}",
                            p.name,
                            self.target_hash(&p.ty.target),
                            p.optional,
                            p.ty.array_depth,
                            self.arguments_hash(&p.ty.type_arguments),
                        );
                        hex::encode(Sha256::digest(entry.as_bytes()))
                    })
                    .collect();
                entries.sort_unstable();
                for entry in &entries {
                    feed(&mut digest, "property", entry);
                }
            }
            Structure::StringUnion { members } => {
                for member in members {
                    let value = member.value.map(|v| v.to_string()).unwrap_or_default();
                    let wire = member.wire.as_deref().unwrap_or_default();
                    feed(
                        &mut digest,
                        "member",
                        &format!("{}={value}={wire}", member.name),
                    );
                }
            }
            Structure::Array { element, .. } => {
                let element = self.use_hash(element);
                feed(&mut digest, "element", &element);
            }
            Structure::Dictionary { key, value, .. } => {
                feed(&mut digest, "index", &format!("{key:?}"));
                let value = self.use_hash(value);
                feed(&mut digest, "value", &value);
            }
            Structure::Const { constants } => {
                for constant in constants {
                    let ty = self.use_hash(&constant.ty);
                    feed(
                        &mut digest,
                        "const",
                        &format!("{}:{ty}:{}", constant.name, constant.value),
                    );
                }
            }
            Structure::Tuple { elements, .. } => {
                feed(&mut digest, "arity", &elements.len().to_string());
                for element in elements {
                    let element = self.use_hash(element);
                    feed(&mut digest, "element", &element);
                }
            }
            Structure::Instance {
                base, arguments, ..
            } => {
                let base = self.node_hash(*base);
                feed(&mut digest, "base", &base);
                let arguments = self.arguments_hash(arguments);
                feed(&mut digest, "arguments", &arguments);
            }
            Structure::ClassUnion { arity } => feed(&mut digest, "arity", &arity.to_string()),
            Structure::ClassUnionInstance { base, members } => {
                let base = self.node_hash(*base);
                feed(&mut digest, "base", &base);
                let members = self.arguments_hash(members);
                feed(&mut digest, "members", &members);
            }
        }

        hex::encode(digest.finalize())
    }

    fn target_hash(&mut self, target: &TypeRef) -> String {
        match target {
            TypeRef::Node(id) => self.node_hash(*id),
            TypeRef::Generic(name) => format!("generic:{name}"),
        }
    }

    fn use_hash(&mut self, use_: &TypeUse) -> String {
        format!(
            "{}#{}#{}",
            self.target_hash(&use_.target),
            use_.array_depth,
            self.arguments_hash(&use_.type_arguments)
        )
    }

    fn arguments_hash(&mut self, arguments: &[TypeUse]) -> String {
        arguments
            .iter()
            .map(|a| self.use_hash(a))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Length-delimited labelled field.
fn feed(digest: &mut Sha256, label: &str, value: &str) {
    digest.update(label.as_bytes());
    digest.update([0]);
    digest.update((value.len() as u64).to_le_bytes());
    digest.update(value.as_bytes());
}

impl TypeRegistry {
    /// Structural hash of a node, memoized until the next mutation.
    pub fn structural_hash(&mut self, id: NodeId) -> String {
        if self.hashes_dirty {
            self.invalidate_hashes();
        }
        let id = self.resolve(id);
        if let Some(hash) = &self.nodes[id.index()].hash {
            return hash.clone();
        }
        let hash = self.hash_root(id);
        self.nodes[id.index()].hash = Some(hash.clone());
        hash
    }

    /// Hash every live node.
    pub(crate) fn compute_hashes(&mut self) {
        if self.hashes_dirty {
            self.invalidate_hashes();
        }
        let ids: Vec<NodeId> = self.live_ids().collect();
        for id in ids {
            if self.nodes[id.index()].hash.is_none() {
                let hash = self.hash_root(id);
                self.nodes[id.index()].hash = Some(hash);
            }
        }
    }

    fn hash_root(&mut self, id: NodeId) -> String {
        let mut memo = std::mem::take(&mut self.hash_memo);
        let hash = StructuralHasher {
            registry: self,
            memo: &mut memo,
            visiting: HashSet::new(),
            cycle_hits: 0,
        }
        .node_hash(id);
        self.hash_memo = memo;
        hash
    }
}
