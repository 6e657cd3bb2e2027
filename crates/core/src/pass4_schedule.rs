//! Pass 4: Declaration scheduling.
//!
//! Kahn's algorithm over the graph minus break edges. A mode becomes ready
//! once every mode it references by name has been scheduled; among ready
//! modes the earliest-declared goes first. Repeated references to the same
//! target count as one dependency.
//!
//! If a cycle somehow survives break selection, the scheduler gives up and
//! returns declaration order, reporting the residual modes.

use crate::pass1_graph::DependencyGraph;
use crate::pass3_breaks::BreakSet;
use modeweave_interchange::{ModeArena, ModeIndex};
use std::collections::{BTreeSet, HashSet};

/// Declaration order for the generated file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    /// Every mode exactly once.
    pub order: Vec<ModeIndex>,
    /// Modes left unscheduled by Kahn's algorithm. Non-empty only when
    /// `order` fell back to declaration order.
    pub residual: Vec<ModeIndex>,
}

impl Schedule {
    pub fn is_fallback(&self) -> bool {
        !self.residual.is_empty()
    }
}

/// Schedule modes so every name reference points at an earlier declaration.
pub fn schedule(graph: &DependencyGraph, breaks: &BreakSet, modes: &ModeArena) -> Schedule {
    let n = graph.node_count();
    let mut pending = vec![0usize; n];
    let mut dependents: Vec<Vec<ModeIndex>> = vec![Vec::new(); n];

    for source in 0..n {
        let source = ModeIndex(source);
        let mut seen = HashSet::new();
        for edge in graph.edges_from(source) {
            if breaks.is_broken(edge.key()) || !seen.insert(edge.target) {
                continue;
            }
            pending[source.get()] += 1;
            dependents[edge.target.get()].push(source);
        }
    }

    let mut ready: BTreeSet<ModeIndex> = (0..n)
        .filter(|&i| pending[i] == 0)
        .map(ModeIndex)
        .collect();
    let mut order = Vec::with_capacity(n);

    while let Some(next) = ready.pop_first() {
        order.push(next);
        for &dependent in &dependents[next.get()] {
            let count = &mut pending[dependent.get()];
            *count -= 1;
            if *count == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() == n {
        return Schedule {
            order,
            residual: Vec::new(),
        };
    }

    let scheduled: HashSet<ModeIndex> = order.iter().copied().collect();
    let residual: Vec<ModeIndex> = (0..n)
        .map(ModeIndex)
        .filter(|m| !scheduled.contains(m))
        .collect();
    tracing::warn!(
        residual = ?residual.iter().map(|&m| modes[m].id.as_str()).collect::<Vec<_>>(),
        "cycle survived break selection; falling back to declaration order"
    );
    Schedule {
        order: (0..n).map(ModeIndex).collect(),
        residual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass1_graph::{build_graph, Relation};
    use crate::pass1_graph::EdgeKey;
    use modeweave_interchange::{Mode, ModeRef};

    fn arena(links: &[&[usize]]) -> ModeArena {
        ModeArena::new(
            links
                .iter()
                .enumerate()
                .map(|(i, targets)| Mode {
                    id: format!("m{}", i),
                    contains: targets.iter().map(|t| ModeRef::Mode(ModeIndex(*t))).collect(),
                    ..Mode::default()
                })
                .collect(),
        )
    }

    fn ids(order: &[ModeIndex]) -> Vec<usize> {
        order.iter().map(|m| m.get()).collect()
    }

    #[test]
    fn dependencies_come_first() {
        // m0 -> m2, m1 -> m0
        let modes = arena(&[&[2], &[0], &[]]);
        let s = schedule(&build_graph(&modes), &BreakSet::default(), &modes);
        assert_eq!(ids(&s.order), vec![2, 0, 1]);
        assert!(!s.is_fallback());
    }

    #[test]
    fn ties_follow_declaration_order() {
        let modes = arena(&[&[], &[], &[], &[]]);
        let s = schedule(&build_graph(&modes), &BreakSet::default(), &modes);
        assert_eq!(ids(&s.order), vec![0, 1, 2, 3]);
    }

    #[test]
    fn duplicate_references_count_once() {
        let modes = arena(&[&[1, 1], &[]]);
        let s = schedule(&build_graph(&modes), &BreakSet::default(), &modes);
        assert_eq!(ids(&s.order), vec![1, 0]);
        assert!(!s.is_fallback());
    }

    #[test]
    fn broken_edges_are_ignored() {
        let modes = arena(&[&[1], &[0]]);
        let breaks = BreakSet::from_keys([EdgeKey::new(ModeIndex(1), Relation::Contains, 0)]);
        let s = schedule(&build_graph(&modes), &breaks, &modes);
        assert_eq!(ids(&s.order), vec![1, 0]);
    }

    #[test]
    fn residual_cycle_falls_back_to_declaration_order() {
        let modes = arena(&[&[], &[2], &[1], &[]]);
        let s = schedule(&build_graph(&modes), &BreakSet::default(), &modes);
        assert!(s.is_fallback());
        assert_eq!(ids(&s.order), vec![0, 1, 2, 3]);
        assert_eq!(ids(&s.residual), vec![1, 2]);
    }
}
