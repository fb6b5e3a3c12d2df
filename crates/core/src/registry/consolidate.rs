//! Post-ingest deduplication.
//!
//! Live nodes are bucketed by structural hash. Within a bucket the node with
//! the highest value score survives (ties keep insertion order) and every
//! other member is redirected to it.

use std::cmp::Reverse;
use std::collections::HashMap;

use tracing::{debug, info};

use super::{TypeRegistry, resolve_in};
use crate::ir::NodeId;

impl TypeRegistry {
    /// Merge structurally identical nodes. Returns how many were redirected.
    ///
    /// Passes repeat until one merges nothing: collapsing a longer cycle can
    /// make it hash equal to a shorter one. Running it again on an already
    /// consolidated registry merges nothing.
    pub fn consolidate(&mut self) -> usize {
        let mut merged = 0;
        loop {
            let pass = self.merge_pass();
            merged += pass;
            if pass == 0 {
                break;
            }
        }
        self.record_edges();

        info!(merged, live = self.live_count(), "Consolidated registry");
        merged
    }

    fn merge_pass(&mut self) -> usize {
        self.invalidate_hashes();
        self.canonicalize_references();
        self.compute_hashes();

        let mut buckets: Vec<Vec<NodeId>> = Vec::new();
        let mut bucket_of: HashMap<String, usize> = HashMap::new();
        for id in self.live_ids().collect::<Vec<_>>() {
            let Some(hash) = self.nodes[id.index()].hash.clone() else {
                continue;
            };
            match bucket_of.get(&hash) {
                Some(&index) => buckets[index].push(id),
                None => {
                    bucket_of.insert(hash, buckets.len());
                    buckets.push(vec![id]);
                }
            }
        }

        let mut merged = 0;
        for mut bucket in buckets.into_iter().filter(|b| b.len() > 1) {
            bucket.sort_by_key(|id| Reverse(self.nodes[id.index()].value_score()));
            let survivor = bucket[0];
            for &loser in &bucket[1..] {
                debug!(
                    survivor = %self.nodes[survivor.index()].name,
                    merged = %self.nodes[loser.index()].name,
                    "Merging structurally identical node"
                );
                self.absorb_flags(survivor, loser);
                self.redirect(loser, survivor);
                merged += 1;
            }
        }

        if merged > 0 {
            self.canonicalize_references();
        }
        merged
    }

    /// A survivor stands in for the merged node, so it must stay rendered
    /// wherever the merged one would have been.
    fn absorb_flags(&mut self, survivor: NodeId, loser: NodeId) {
        let loser_flags = self.nodes[loser.index()].flags;
        let flags = &mut self.nodes[survivor.index()].flags;
        flags.should_be_rendered |= loser_flags.should_be_rendered;
        flags.is_public |= loser_flags.is_public;
        flags.anonymous &= loser_flags.anonymous;
    }

    /// Rewrite every reference, generic defaults included, through redirects.
    fn canonicalize_references(&mut self) {
        let redirects = std::mem::take(&mut self.redirects);
        for (index, node) in self.nodes.iter_mut().enumerate() {
            if redirects.contains_key(&NodeId(index as u32)) {
                continue;
            }
            node.structure.map_nodes(&|id| resolve_in(&redirects, id));
        }
        self.redirects = redirects;
    }

    /// Register outgoing references of every live node.
    pub(crate) fn record_edges(&mut self) {
        let mut edges = HashMap::new();
        for id in self.live_ids() {
            let mut targets: Vec<NodeId> = self.nodes[id.index()]
                .structure
                .outgoing()
                .into_iter()
                .map(|target| self.resolve(target))
                .collect();
            targets.sort_unstable();
            targets.dedup();
            edges.insert(id, targets);
        }
        self.edges = edges;
    }

    /// References recorded for `id` by the last consolidation.
    pub fn outgoing(&self, id: NodeId) -> &[NodeId] {
        self.edges
            .get(&self.resolve(id))
            .map_or(&[][..], Vec::as_slice)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use crate::ir::{IrNode, NodeFlags, NodeId, Property, Structure, TypeUse};
    use crate::registry::TypeRegistry;
    use typebridge_common::facts::PrimitiveKind;

    fn user_like(registry: &mut TypeRegistry, name: &str, flags: NodeFlags, level: u32) -> NodeId {
        let string = registry.primitive(PrimitiveKind::String);
        let number = registry.primitive(PrimitiveKind::Number);
        let id = registry
            .add_type(
                IrNode::new(name, Structure::empty_record())
                    .with_flags(flags)
                    .with_level(level),
            )
            .unwrap();
        registry.add_property(id, Property::new("id", TypeUse::node(number)));
        registry.add_property(id, Property::new("name", TypeUse::node(string)));
        id
    }

    fn public_flags() -> NodeFlags {
        NodeFlags {
            is_public: true,
            should_be_rendered: true,
            ..NodeFlags::default()
        }
    }

    #[test]
    fn test_public_node_survives() {
        let mut registry = TypeRegistry::new();
        let internal = user_like(
            &mut registry,
            "InternalUser",
            NodeFlags {
                internal: true,
                ..NodeFlags::default()
            },
            0,
        );
        let public = user_like(&mut registry, "User", public_flags(), 0);

        assert_eq!(registry.consolidate(), 1);
        assert_eq!(registry.resolve(internal), public);
        assert!(!registry.is_live(internal));
        assert_eq!(registry.node(internal).name, "User");
    }

    #[test]
    fn test_tie_keeps_insertion_order() {
        let mut registry = TypeRegistry::new();
        let first = user_like(&mut registry, "First", NodeFlags::default(), 1);
        let second = user_like(&mut registry, "Second", NodeFlags::default(), 1);
        registry.consolidate();
        assert_eq!(registry.resolve(second), first);
    }

    #[test]
    fn test_lower_level_wins() {
        let mut registry = TypeRegistry::new();
        let deep = user_like(&mut registry, "Deep", NodeFlags::default(), 3);
        let shallow = user_like(&mut registry, "Shallow", NodeFlags::default(), 1);
        registry.consolidate();
        assert_eq!(registry.resolve(deep), shallow);
    }

    #[test]
    fn test_consolidate_is_idempotent() {
        let mut registry = TypeRegistry::new();
        user_like(&mut registry, "A", NodeFlags::default(), 0);
        user_like(&mut registry, "B", public_flags(), 0);
        user_like(&mut registry, "C", NodeFlags::default(), 2);

        assert_eq!(registry.consolidate(), 2);
        let live: Vec<NodeId> = registry.live_ids().collect();
        assert_eq!(registry.consolidate(), 0);
        assert_eq!(registry.live_ids().collect::<Vec<_>>(), live);
    }

    #[test]
    fn test_cycles_of_different_length_collapse_in_one_call() {
        let mut registry = TypeRegistry::new();
        let add = |registry: &mut TypeRegistry, name: &str| {
            registry
                .add_type(IrNode::new(name, Structure::empty_record()).with_flags(public_flags()))
                .unwrap()
        };
        let x = add(&mut registry, "X");
        let y = add(&mut registry, "Y");
        let z = add(&mut registry, "Z");
        registry.add_property(x, Property::new("next", TypeUse::node(x)));
        registry.add_property(y, Property::new("next", TypeUse::node(z)));
        registry.add_property(z, Property::new("next", TypeUse::node(y)));

        assert_eq!(registry.consolidate(), 2);
        assert_eq!(registry.resolve(y), x);
        assert_eq!(registry.resolve(z), x);
        let live: Vec<NodeId> = registry.live_ids().collect();
        assert_eq!(registry.consolidate(), 0);
        assert_eq!(registry.live_ids().collect::<Vec<_>>(), live);
    }

    #[test]
    fn test_references_follow_merges() {
        let mut registry = TypeRegistry::new();
        let public = user_like(&mut registry, "User", public_flags(), 0);
        let copy = user_like(&mut registry, "UserCopy", NodeFlags::default(), 1);

        let team = registry
            .add_type(IrNode::new("Team", Structure::empty_record()).with_flags(public_flags()))
            .unwrap();
        registry.add_property(team, Property::new("lead", TypeUse::node(copy)));

        registry.consolidate();
        let Structure::Record { properties, .. } = &registry.node(team).structure else {
            unreachable!()
        };
        assert_eq!(properties[0].ty.node_id(), Some(public));
        assert!(registry.outgoing(team).contains(&public));
    }

    #[test]
    fn test_nested_duplicates_collapse_parents() {
        let mut registry = TypeRegistry::new();
        let string = registry.primitive(PrimitiveKind::String);
        let mut parents = Vec::new();
        for (parent, child) in [("Order", "OrderAddressClass"), ("Invoice", "InvoiceAddressClass")] {
            let child_id = registry
                .add_type(IrNode::new(child, Structure::empty_record()).with_level(1))
                .unwrap();
            registry.add_property(child_id, Property::new("city", TypeUse::node(string)));
            let parent_id = registry
                .add_type(IrNode::new(parent, Structure::empty_record()))
                .unwrap();
            registry.add_property(parent_id, Property::new("address", TypeUse::node(child_id)));
            parents.push((parent_id, child_id));
        }

        assert_eq!(registry.consolidate(), 2);
        assert_eq!(registry.resolve(parents[1].0), parents[0].0);
        assert_eq!(registry.resolve(parents[1].1), parents[0].1);
    }
}
