//! Pass 2: Strongly connected components.
//!
//! Tarjan's algorithm, run iteratively with an explicit frame stack so that
//! deep grammars cannot overflow the call stack. Roots are visited in
//! declaration order and successors in edge order, which makes the output
//! deterministic.

use crate::pass1_graph::DependencyGraph;
use modeweave_interchange::ModeIndex;

/// Partition of the mode set into strongly connected components.
#[derive(Debug, Clone, Default)]
pub struct SccPartition {
    /// Components in the order Tarjan completes them (reverse topological).
    pub components: Vec<Vec<ModeIndex>>,
    /// Component index for every mode.
    pub component_of: Vec<usize>,
}

impl SccPartition {
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Components with more than one member. Self-loops never reach the
    /// graph, so only these can hold a cycle.
    pub fn non_trivial(&self) -> impl Iterator<Item = &[ModeIndex]> + '_ {
        self.components
            .iter()
            .filter(|c| c.len() > 1)
            .map(Vec::as_slice)
    }

    pub fn same_component(&self, a: ModeIndex, b: ModeIndex) -> bool {
        match (self.component_of.get(a.get()), self.component_of.get(b.get())) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }
}

const UNVISITED: usize = usize::MAX;

struct Frame {
    node: usize,
    cursor: usize,
}

/// Compute the strongly connected components of `graph`.
pub fn find_sccs(graph: &DependencyGraph) -> SccPartition {
    let n = graph.node_count();
    let mut index = vec![UNVISITED; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut next_index = 0usize;

    let mut components: Vec<Vec<ModeIndex>> = Vec::new();
    let mut component_of = vec![0usize; n];

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }
        let mut frames = vec![Frame {
            node: root,
            cursor: 0,
        }];
        index[root] = next_index;
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;

        while let Some(frame) = frames.last_mut() {
            let v = frame.node;
            let edges = graph.edges_from(ModeIndex(v));
            if frame.cursor < edges.len() {
                let w = edges[frame.cursor].target.get();
                frame.cursor += 1;
                if index[w] == UNVISITED {
                    index[w] = next_index;
                    lowlink[w] = next_index;
                    next_index += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    frames.push(Frame { node: w, cursor: 0 });
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w]);
                }
                continue;
            }

            frames.pop();
            if let Some(parent) = frames.last() {
                lowlink[parent.node] = lowlink[parent.node].min(lowlink[v]);
            }
            if lowlink[v] == index[v] {
                let id = components.len();
                let mut component = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component_of[w] = id;
                    component.push(ModeIndex(w));
                    if w == v {
                        break;
                    }
                }
                component.sort();
                components.push(component);
            }
        }
    }

    let partition = SccPartition {
        components,
        component_of,
    };
    tracing::debug!(
        components = partition.len(),
        cyclic = partition.non_trivial().count(),
        "computed strongly connected components"
    );
    partition
}
