//! modeweave-core: grammar IR validation and mode graph compilation.
//!
//! Turns a resolved grammar document into a declaration schedule in four
//! passes:
//!
//! - [`build_graph()`] -- Pass 1, dependency graph over modes
//! - [`find_sccs()`] -- Pass 2, strongly connected components
//! - [`select_break_edges()`] -- Pass 3, edges to inline instead of name
//! - [`schedule()`] -- Pass 4, Kahn ordering with declaration-order fallback
//!
//! [`compile()`] runs all four. Validation of raw JSON documents lives in
//! [`validate`] and reports [`Diagnostic`]s.

pub mod compile;
pub mod error;
pub mod pass1_graph;
pub mod pass2_scc;
pub mod pass3_breaks;
pub mod pass4_schedule;
pub mod validate;

// ── Convenience re-exports: key types ────────────────────────────────

pub use compile::CompiledGrammar;
pub use error::Diagnostic;
pub use pass1_graph::{DependencyGraph, Edge, EdgeKey, Relation};
pub use pass2_scc::SccPartition;
pub use pass3_breaks::BreakSet;
pub use pass4_schedule::Schedule;
pub use validate::ValidationReport;

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use compile::compile;
pub use pass1_graph::build_graph;
pub use pass2_scc::find_sccs;
pub use pass3_breaks::{canonical_order, canonical_rank, select_break_edges};
pub use pass4_schedule::schedule;
pub use validate::{collect_ir_files, validate_document, validate_file, validate_paths};
