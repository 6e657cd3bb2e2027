//! Pass 3: Break-edge selection.
//!
//! Inside every cyclic component, members get a canonical position from
//! their scope rank and declaration order. Any edge that points backwards
//! in that order is broken. What remains points strictly forward, so no
//! cycle survives. The result is deterministic but not minimal.

use crate::pass1_graph::{DependencyGraph, EdgeKey};
use crate::pass2_scc::SccPartition;
use modeweave_interchange::{Mode, ModeArena, ModeIndex};
use std::collections::{BTreeSet, HashMap};

/// Scope rank of a mode: `string` sorts first, `subst` last.
pub fn canonical_rank(mode: &Mode) -> u8 {
    match mode.scope_name() {
        Some("string") => 0,
        Some("subst") => 2,
        _ => 1,
    }
}

/// Members of `component` sorted by `(rank, declaration order)`.
pub fn canonical_order(component: &[ModeIndex], modes: &ModeArena) -> Vec<ModeIndex> {
    let mut members = component.to_vec();
    members.sort_by_key(|&idx| (canonical_rank(&modes[idx]), idx));
    members
}

/// Structural keys of the edges that must not be honored by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreakSet {
    keys: BTreeSet<EdgeKey>,
}

impl BreakSet {
    pub fn from_keys(keys: impl IntoIterator<Item = EdgeKey>) -> Self {
        BreakSet {
            keys: keys.into_iter().collect(),
        }
    }

    pub fn is_broken(&self, key: EdgeKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in `(source, relation, position)` order.
    pub fn iter(&self) -> impl Iterator<Item = &EdgeKey> + '_ {
        self.keys.iter()
    }
}

/// Choose the break edges for every non-trivial component.
pub fn select_break_edges(
    graph: &DependencyGraph,
    sccs: &SccPartition,
    modes: &ModeArena,
) -> BreakSet {
    let mut keys = BTreeSet::new();
    for component in sccs.non_trivial() {
        let order = canonical_order(component, modes);
        let position: HashMap<ModeIndex, usize> =
            order.iter().enumerate().map(|(i, &m)| (m, i)).collect();

        for &source in component {
            for edge in graph.edges_from(source) {
                let Some(&target_pos) = position.get(&edge.target) else {
                    continue;
                };
                if position[&source] > target_pos {
                    tracing::debug!(
                        source = %modes[source].id,
                        relation = %edge.relation,
                        position = edge.position,
                        target = %modes[edge.target].id,
                        "breaking edge"
                    );
                    keys.insert(edge.key());
                }
            }
        }
    }
    BreakSet { keys }
}
