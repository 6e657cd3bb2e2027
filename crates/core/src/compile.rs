//! Four-pass compiler front end: grammar document -> declaration schedule.
//!
//! A thin orchestrator over the pass modules. Emission lives in the
//! codegen crate and consumes [`CompiledGrammar`].

use crate::pass1_graph::{self, DependencyGraph};
use crate::pass2_scc::{self, SccPartition};
use crate::pass3_breaks::{self, BreakSet};
use crate::pass4_schedule::{self, Schedule};
use modeweave_interchange::GrammarDocument;

/// Everything emission needs besides the document itself.
#[derive(Debug, Clone)]
pub struct CompiledGrammar {
    pub graph: DependencyGraph,
    pub sccs: SccPartition,
    pub breaks: BreakSet,
    pub schedule: Schedule,
}

/// Run passes 1 through 4 over a resolved document.
pub fn compile(doc: &GrammarDocument) -> CompiledGrammar {
    // Pass 1: dependency graph
    let graph = pass1_graph::build_graph(&doc.modes);

    // Pass 2: strongly connected components
    let sccs = pass2_scc::find_sccs(&graph);

    // Pass 3: break edges
    let breaks = pass3_breaks::select_break_edges(&graph, &sccs, &doc.modes);

    // Pass 4: declaration order
    let schedule = pass4_schedule::schedule(&graph, &breaks, &doc.modes);

    tracing::debug!(
        modes = doc.modes.len(),
        break_edges = breaks.len(),
        fallback = schedule.is_fallback(),
        "compiled mode graph"
    );
    CompiledGrammar {
        graph,
        sccs,
        breaks,
        schedule,
    }
}
