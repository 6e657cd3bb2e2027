//! Property-based tests for the mode graph passes
//!
//! For arbitrary reference graphs:
//! - Removing break edges leaves an acyclic graph
//! - Every cyclic component loses at least one edge
//! - The schedule is a permutation in which every named reference points back
//! - Compilation is deterministic

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

use modeweave_core::{compile, CompiledGrammar, Relation};
use modeweave_interchange::{GrammarDocument, Language, Mode, ModeArena, ModeIndex, ModeRef};

// ============================================================================
// Generators
// ============================================================================

const SCOPES: &[Option<&str>] = &[None, Some("string"), Some("subst"), Some("keyword")];

fn arb_ref(n: usize) -> impl Strategy<Value = ModeRef> {
    prop_oneof![
        1 => Just(ModeRef::SelfRef),
        6 => (0..n).prop_map(|i| ModeRef::Mode(ModeIndex(i))),
    ]
}

fn arb_mode(n: usize) -> impl Strategy<Value = (usize, Vec<ModeRef>, Vec<ModeRef>, Option<ModeRef>)> {
    (
        0..SCOPES.len(),
        prop::collection::vec(arb_ref(n), 0..4),
        prop::collection::vec(arb_ref(n), 0..2),
        prop::option::of(arb_ref(n)),
    )
}

fn arb_document() -> impl Strategy<Value = GrammarDocument> {
    (1usize..10).prop_flat_map(|n| {
        prop::collection::vec(arb_mode(n), n).prop_map(|specs| {
            let modes = specs
                .into_iter()
                .enumerate()
                .map(|(i, (scope, contains, variants, starts))| Mode {
                    id: format!("m{}", i),
                    scope: SCOPES[scope].map(str::to_string),
                    contains,
                    variants,
                    starts,
                    ..Mode::default()
                })
                .collect();
            GrammarDocument {
                version: 1,
                language: Language::default(),
                modes: ModeArena::new(modes),
            }
        })
    })
}

// ============================================================================
// Helpers
// ============================================================================

/// Edges that survive break selection, as (source, target) pairs.
fn kept_edges(compiled: &CompiledGrammar) -> Vec<(usize, usize)> {
    compiled
        .graph
        .edges()
        .filter(|e| !compiled.breaks.is_broken(e.key()))
        .map(|e| (e.source.get(), e.target.get()))
        .collect()
}

fn is_acyclic(n: usize, edges: &[(usize, usize)]) -> bool {
    let mut indegree = vec![0usize; n];
    let mut out: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(s, t) in edges {
        indegree[t] += 1;
        out[s].push(t);
    }
    let mut queue: Vec<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
    let mut seen = 0;
    while let Some(v) = queue.pop() {
        seen += 1;
        for &w in &out[v] {
            indegree[w] -= 1;
            if indegree[w] == 0 {
                queue.push(w);
            }
        }
    }
    seen == n
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_graph_minus_breaks_is_acyclic(doc in arb_document()) {
        let compiled = compile(&doc);
        prop_assert!(is_acyclic(doc.modes.len(), &kept_edges(&compiled)));
    }

    #[test]
    fn prop_every_cyclic_component_loses_an_edge(doc in arb_document()) {
        let compiled = compile(&doc);
        for component in compiled.sccs.non_trivial() {
            let members: HashSet<ModeIndex> = component.iter().copied().collect();
            let broken_inside = compiled
                .breaks
                .iter()
                .filter(|k| members.contains(&k.source))
                .count();
            prop_assert!(broken_inside > 0);
        }
    }

    #[test]
    fn prop_breaks_stay_inside_components(doc in arb_document()) {
        let compiled = compile(&doc);
        for edge in compiled.graph.edges() {
            if compiled.breaks.is_broken(edge.key()) {
                prop_assert!(compiled.sccs.same_component(edge.source, edge.target));
            }
        }
    }

    #[test]
    fn prop_schedule_is_a_valid_permutation(doc in arb_document()) {
        let compiled = compile(&doc);
        let order = &compiled.schedule.order;
        prop_assert!(!compiled.schedule.is_fallback());
        prop_assert_eq!(order.len(), doc.modes.len());

        let position: HashMap<ModeIndex, usize> =
            order.iter().enumerate().map(|(i, &m)| (m, i)).collect();
        prop_assert_eq!(position.len(), doc.modes.len());

        for edge in compiled.graph.edges() {
            if !compiled.breaks.is_broken(edge.key()) {
                prop_assert!(position[&edge.target] < position[&edge.source]);
            }
        }
    }

    #[test]
    fn prop_compilation_is_deterministic(doc in arb_document()) {
        let a = compile(&doc);
        let b = compile(&doc);
        prop_assert_eq!(a.schedule, b.schedule);
        prop_assert_eq!(a.breaks, b.breaks);
    }

    #[test]
    fn prop_starts_edges_use_position_zero(doc in arb_document()) {
        let compiled = compile(&doc);
        for edge in compiled.graph.edges() {
            if edge.relation == Relation::Starts {
                prop_assert_eq!(edge.position, 0);
            }
        }
    }
}
