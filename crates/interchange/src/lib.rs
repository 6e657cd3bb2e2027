//! modeweave-interchange: Grammar IR types and loading.
//!
//! Provides typed structs for the portable grammar description (modes,
//! patterns, keywords, scopes and the language descriptor) and a single
//! `from_interchange()` entry point that turns a `serde_json::Value`
//! document into a [`GrammarDocument`].
//!
//! Modes are stored in a [`ModeArena`] and addressed by [`ModeIndex`].
//! Structural references (`contains`, `variants`, `starts`) are resolved
//! to indices at load time, so cyclic grammars need no shared ownership.

pub mod deserialize;
pub mod types;

pub use deserialize::{from_interchange, InterchangeError};
pub use types::*;
