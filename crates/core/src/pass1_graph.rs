//! Pass 1: Dependency graph construction.
//!
//! One node per mode. Every `contains`, `variants` and `starts` reference
//! becomes an edge from the referencing mode to the referenced one, except
//! self-references, which never produce edges. Edges carry the structural
//! key `(source, relation, position)` so later passes can tell individual
//! occurrences apart.

use modeweave_interchange::{ModeArena, ModeIndex, ModeRef};
use serde::Serialize;
use std::fmt;

/// Which structural field an edge came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Contains,
    Variants,
    Starts,
}

impl Relation {
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Contains => "contains",
            Relation::Variants => "variants",
            Relation::Starts => "starts",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one reference occurrence.
///
/// `position` is the index within the list for `contains` and `variants`,
/// and always 0 for `starts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EdgeKey {
    pub source: ModeIndex,
    pub relation: Relation,
    pub position: usize,
}

impl EdgeKey {
    pub fn new(source: ModeIndex, relation: Relation, position: usize) -> Self {
        EdgeKey {
            source,
            relation,
            position,
        }
    }
}

/// A directed dependency: `source` cannot be declared before `target`
/// unless this edge is broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub source: ModeIndex,
    pub relation: Relation,
    pub position: usize,
    pub target: ModeIndex,
}

impl Edge {
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.source, self.relation, self.position)
    }
}

/// Adjacency lists indexed by source mode.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: Vec<Vec<Edge>>,
}

impl DependencyGraph {
    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    /// Outgoing edges of `node` in structural order.
    pub fn edges_from(&self, node: ModeIndex) -> &[Edge] {
        self.edges.get(node.get()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every edge, grouped by source in declaration order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().flatten()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }
}

/// Build the dependency graph for `modes`.
///
/// Per source, edges appear as `contains` in list order, then `variants`
/// in list order, then `starts`.
pub fn build_graph(modes: &ModeArena) -> DependencyGraph {
    let mut edges = Vec::with_capacity(modes.len());
    for (idx, mode) in modes.iter() {
        let mut out = Vec::new();
        push_list(&mut out, idx, Relation::Contains, &mode.contains);
        push_list(&mut out, idx, Relation::Variants, &mode.variants);
        if let Some(target) = mode.starts.and_then(|r| r.target_of(idx)) {
            out.push(Edge {
                source: idx,
                relation: Relation::Starts,
                position: 0,
                target,
            });
        }
        edges.push(out);
    }
    let graph = DependencyGraph { edges };
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built dependency graph"
    );
    graph
}

fn push_list(out: &mut Vec<Edge>, source: ModeIndex, relation: Relation, refs: &[ModeRef]) {
    for (position, r) in refs.iter().enumerate() {
        if let Some(target) = r.target_of(source) {
            out.push(Edge {
                source,
                relation,
                position,
                target,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modeweave_interchange::Mode;

    fn mode(id: &str) -> Mode {
        Mode {
            id: id.to_string(),
            ..Mode::default()
        }
    }

    #[test]
    fn self_references_produce_no_edges() {
        let mut a = mode("a");
        a.contains = vec![ModeRef::SelfRef, ModeRef::Mode(ModeIndex(0))];
        a.starts = Some(ModeRef::Mode(ModeIndex(0)));
        let graph = build_graph(&ModeArena::new(vec![a]));
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn edges_keep_relation_and_position() {
        let mut a = mode("a");
        a.contains = vec![ModeRef::SelfRef, ModeRef::Mode(ModeIndex(1))];
        a.variants = vec![ModeRef::Mode(ModeIndex(2)), ModeRef::Mode(ModeIndex(1))];
        a.starts = Some(ModeRef::Mode(ModeIndex(2)));
        let graph = build_graph(&ModeArena::new(vec![a, mode("b"), mode("c")]));

        let keys: Vec<(Relation, usize, usize)> = graph
            .edges_from(ModeIndex(0))
            .iter()
            .map(|e| (e.relation, e.position, e.target.get()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (Relation::Contains, 1, 1),
                (Relation::Variants, 0, 2),
                (Relation::Variants, 1, 1),
                (Relation::Starts, 0, 2),
            ]
        );
        assert!(graph.edges_from(ModeIndex(1)).is_empty());
        assert!(graph.edges_from(ModeIndex(9)).is_empty());
    }

    #[test]
    fn duplicate_references_are_distinct_edges() {
        let mut a = mode("a");
        a.contains = vec![ModeRef::Mode(ModeIndex(1)), ModeRef::Mode(ModeIndex(1))];
        let graph = build_graph(&ModeArena::new(vec![a, mode("b")]));
        let keys: Vec<EdgeKey> = graph.edges().map(Edge::key).collect();
        assert_eq!(
            keys,
            vec![
                EdgeKey::new(ModeIndex(0), Relation::Contains, 0),
                EdgeKey::new(ModeIndex(0), Relation::Contains, 1),
            ]
        );
    }
}
