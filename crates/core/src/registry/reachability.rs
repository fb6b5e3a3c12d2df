//! Pruning and name prettification.
//!
//! Roots are nodes that are public or explicitly rendered. Everything reached
//! from a root through property types, generic arguments and defaults, union
//! members or instance bases is retained and flagged as a descendant of a
//! public node. The rest is dropped from emission.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, info};

use super::TypeRegistry;
use crate::ir::NodeId;

impl TypeRegistry {
    /// Compute the retained set. Returns how many live nodes were pruned.
    pub fn prune(&mut self) -> usize {
        self.record_edges();

        let roots: Vec<NodeId> = self
            .live_ids()
            .filter(|id| {
                let flags = self.nodes[id.index()].flags;
                flags.is_public || flags.should_be_rendered
            })
            .collect();

        let mut retained: HashSet<NodeId> = roots.iter().copied().collect();
        let mut queue: VecDeque<NodeId> = roots.into_iter().collect();
        let mut descendants = Vec::new();

        while let Some(id) = queue.pop_front() {
            for &target in self.outgoing(id) {
                descendants.push(target);
                if retained.insert(target) {
                    queue.push_back(target);
                }
            }
        }

        for id in descendants {
            self.nodes[id.index()].flags.is_descendant_of_public = true;
        }

        let pruned = self.live_count() - retained.len();
        self.retained = Some(retained);
        self.prettify_names();

        info!(
            pruned,
            retained = self.live_count() - pruned,
            "Pruned unreachable nodes"
        );
        pruned
    }

    /// Restore pre-collision names that no retained node claims any more.
    fn prettify_names(&mut self) {
        let retained: Vec<NodeId> = self
            .live_ids()
            .filter(|id| self.is_retained(*id))
            .collect();
        let mut taken: HashSet<String> = retained
            .iter()
            .map(|id| self.nodes[id.index()].name.clone())
            .collect();

        for id in retained {
            let Some(original) = self.nodes[id.index()].disambiguated_from.clone() else {
                continue;
            };
            if taken.contains(&original) {
                continue;
            }
            let current = self.nodes[id.index()].name.clone();
            debug!(from = %current, to = %original, "Restoring original name");
            taken.remove(&current);
            taken.insert(original.clone());
            self.rename(id, original);
            self.nodes[id.index()].disambiguated_from = None;
        }
    }
}
