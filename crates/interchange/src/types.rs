//! Typed structs representing the grammar IR document.
//!
//! A document is a language descriptor plus a flat, ordered list of modes.
//! Declaration order is significant: it is the tie-breaker for every
//! ordering decision the compiler makes, and it is exactly the order of
//! [`ModeIndex`] values in the [`ModeArena`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Index;

/// The only IR schema version this crate understands.
pub const IR_VERSION: u64 = 1;

/// Stable index of a mode in its [`ModeArena`] (its declaration position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ModeIndex(pub usize);

impl ModeIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for ModeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A structural reference from one mode to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeRef {
    /// The literal `"self"` marker.
    SelfRef,
    /// A resolved reference to a declared mode.
    Mode(ModeIndex),
}

impl ModeRef {
    /// The referenced mode, treating both the self-marker and an explicit
    /// reference to `owner` as a self-reference.
    pub fn target_of(self, owner: ModeIndex) -> Option<ModeIndex> {
        match self {
            ModeRef::SelfRef => None,
            ModeRef::Mode(idx) if idx == owner => None,
            ModeRef::Mode(idx) => Some(idx),
        }
    }
}

// ── Patterns ────────────────────────────────────────────────────────

/// How the pattern source was written upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Regex,
    String,
}

/// A regex (or literal-string) source plus its flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub kind: PatternKind,
    pub source: String,
    /// The `i` flag.
    pub case_insensitive: bool,
    /// The `u` flag. Carried for completeness; the target has no channel for it.
    pub unicode: bool,
}

impl Pattern {
    pub fn regex(source: impl Into<String>) -> Self {
        Pattern {
            kind: PatternKind::Regex,
            source: source.into(),
            case_insensitive: false,
            unicode: false,
        }
    }
}

// ── Keywords ────────────────────────────────────────────────────────

/// Keyword categories attached to a mode or to the language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keywords {
    /// Tokenizing pattern (`$pattern` upstream).
    pub pattern: Option<Pattern>,
    pub keyword: Vec<String>,
    pub literal: Vec<String>,
    pub built_in: Vec<String>,
    pub type_words: Vec<String>,
    /// Named categories beyond the four standard ones.
    pub custom: BTreeMap<String, Vec<String>>,
    /// Whitespace-delimited words with optional `|<weight>` suffixes.
    pub raw: Option<String>,
}

// ── Scopes ──────────────────────────────────────────────────────────

/// Semantic class attached to matched text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Simple(String),
    /// Capture-group index to scope name.
    Indexed(BTreeMap<u32, String>),
}

/// Embedded sub-language association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubLanguage {
    Single(String),
    Multiple(Vec<String>),
}

// ── Mode ────────────────────────────────────────────────────────────

/// Boolean switches on a mode. All default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeFlags {
    pub exclude_begin: bool,
    pub exclude_end: bool,
    pub return_begin: bool,
    pub return_end: bool,
    pub ends_with_parent: bool,
    pub ends_parent: bool,
    pub skip: bool,
}

/// One pattern-matching rule node in the grammar graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mode {
    pub id: String,
    pub scope: Option<String>,
    pub class_name: Option<String>,
    pub begin: Option<Pattern>,
    pub end: Option<Pattern>,
    pub match_pattern: Option<Pattern>,
    pub keywords: Option<Keywords>,
    pub begin_keywords: Option<String>,
    pub illegal: Option<Pattern>,
    pub flags: ModeFlags,
    pub relevance: Option<i64>,
    pub sub_language: Option<SubLanguage>,
    pub begin_scope: Option<Scope>,
    pub end_scope: Option<Scope>,
    pub contains: Vec<ModeRef>,
    pub variants: Vec<ModeRef>,
    pub starts: Option<ModeRef>,
}

impl Mode {
    /// The scope name used for ranking: `scope`, falling back to `className`.
    pub fn scope_name(&self) -> Option<&str> {
        self.scope.as_deref().or(self.class_name.as_deref())
    }
}

// ── Language ────────────────────────────────────────────────────────

/// The top-level language descriptor. Never a dependency target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Language {
    pub name: Option<String>,
    pub aliases: Vec<String>,
    pub disable_autodetect: bool,
    pub case_insensitive: bool,
    pub unicode_regex: bool,
    pub keywords: Option<Keywords>,
    pub illegal: Option<Pattern>,
    pub class_name_aliases: BTreeMap<String, String>,
    pub contains: Vec<ModeRef>,
}

// ── Arena ───────────────────────────────────────────────────────────

/// Flat, immutable collection of modes addressed by [`ModeIndex`].
#[derive(Debug, Clone, Default)]
pub struct ModeArena {
    modes: Vec<Mode>,
    by_id: HashMap<String, ModeIndex>,
}

impl ModeArena {
    /// Build an arena from modes in declaration order.
    ///
    /// Later duplicates of an id shadow nothing: the first declaration wins
    /// the id lookup. Duplicate ids are rejected by validation upstream.
    pub fn new(modes: Vec<Mode>) -> Self {
        let mut by_id = HashMap::with_capacity(modes.len());
        for (i, mode) in modes.iter().enumerate() {
            by_id.entry(mode.id.clone()).or_insert(ModeIndex(i));
        }
        ModeArena { modes, by_id }
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    pub fn lookup(&self, id: &str) -> Option<ModeIndex> {
        self.by_id.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModeIndex, &Mode)> + '_ {
        self.modes.iter().enumerate().map(|(i, m)| (ModeIndex(i), m))
    }
}

impl Index<ModeIndex> for ModeArena {
    type Output = Mode;

    fn index(&self, idx: ModeIndex) -> &Mode {
        &self.modes[idx.0]
    }
}

/// A loaded grammar IR document.
#[derive(Debug, Clone)]
pub struct GrammarDocument {
    pub version: u64,
    pub language: Language,
    pub modes: ModeArena,
}
