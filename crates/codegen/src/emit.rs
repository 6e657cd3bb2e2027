//! Mode and language expression emission.
//!
//! A scheduled mode is declared once under a stable name and referenced by
//! that name from later declarations. References across a break edge
//! cannot use the name (it is declared later, or never declared before the
//! reference), so they are expanded inline instead. Inline expansion
//! tracks the modes on the current expansion path; a mode met again on
//! that path is rendered shallow, without structural fields, which bounds
//! the recursion by the number of modes.

use crate::literal::{
    dict_expr, keywords_expr, normalize_raw_keywords, pattern_expr, scope_expr, string_array,
    sublanguage_expr, swift_string,
};
use modeweave_core::{BreakSet, EdgeKey, Relation};
use modeweave_interchange::{Language, Mode, ModeArena, ModeIndex, ModeRef};
use std::collections::HashSet;

/// Declaration name of every mode, indexed by [`ModeIndex`].
#[derive(Debug, Clone)]
pub struct DeclNames(Vec<String>);

impl DeclNames {
    pub fn new(modes: &ModeArena) -> Self {
        DeclNames(modes.iter().map(|(_, m)| format!("mode_{}", m.id)).collect())
    }

    pub fn name(&self, idx: ModeIndex) -> &str {
        &self.0[idx.get()]
    }
}

/// Pre-rendered structural fields of a mode. All `None` renders shallow.
#[derive(Debug, Clone, Default)]
pub struct StructuralRefs {
    pub contains: Option<String>,
    pub variants: Option<String>,
    pub starts: Option<String>,
}

impl StructuralRefs {
    fn from_parts(contains: Vec<String>, variants: Vec<String>, starts: Option<String>) -> Self {
        StructuralRefs {
            contains: (!contains.is_empty()).then(|| format!("[{}]", contains.join(", "))),
            variants: (!variants.is_empty())
                .then(|| format!("HLJS.variants([{}])", variants.join(", "))),
            starts: starts.map(|s| format!("ModeBox({})", s)),
        }
    }
}

/// Render a `Mode(...)` constructor with arguments in the fixed order.
///
/// Absent and empty values are omitted. Boolean flags appear only when set.
pub fn render_mode(mode: &Mode, refs: &StructuralRefs) -> String {
    let mut keywords = keywords_expr(mode.keywords.as_ref());
    if keywords.is_none() && is_literal_scope(mode) {
        if let Some(begin_keywords) = &mode.begin_keywords {
            let tokens = normalize_raw_keywords(begin_keywords);
            keywords = string_array(&tokens).map(|arr| format!("HLJS.kw(keyword: {})", arr));
        }
    }

    let flag = |set: bool| set.then(|| "true".to_string());
    let flags = &mode.flags;

    let args: [(&str, Option<String>); 22] = [
        ("scope", mode.scope.as_deref().map(swift_string)),
        ("className", mode.class_name.as_deref().map(swift_string)),
        ("begin", pattern_expr(mode.begin.as_ref())),
        ("end", pattern_expr(mode.end.as_ref())),
        ("match", pattern_expr(mode.match_pattern.as_ref())),
        ("keywords", keywords),
        ("illegal", pattern_expr(mode.illegal.as_ref())),
        ("contains", refs.contains.clone()),
        ("variants", refs.variants.clone()),
        ("relevance", mode.relevance.map(|r| r.to_string())),
        ("excludeBegin", flag(flags.exclude_begin)),
        ("excludeEnd", flag(flags.exclude_end)),
        ("returnBegin", flag(flags.return_begin)),
        ("returnEnd", flag(flags.return_end)),
        ("endsWithParent", flag(flags.ends_with_parent)),
        ("endsParent", flag(flags.ends_parent)),
        ("skip", flag(flags.skip)),
        ("subLanguage", sublanguage_expr(mode.sub_language.as_ref())),
        ("beginScope", scope_expr(mode.begin_scope.as_ref())),
        ("endScope", scope_expr(mode.end_scope.as_ref())),
        ("starts", refs.starts.clone()),
        ("beginKeywords", mode.begin_keywords.as_deref().map(swift_string)),
    ];

    let rendered: Vec<String> = args
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| format!("{}: {}", key, v)))
        .collect();
    format!("Mode({})", rendered.join(", "))
}

/// `beginKeywords` doubles as the keyword list for literal modes.
fn is_literal_scope(mode: &Mode) -> bool {
    mode.scope.as_deref() == Some("literal") || mode.class_name.as_deref() == Some("literal")
}

/// Renders declarations and inline expansions for one compiled grammar.
pub struct Emitter<'a> {
    modes: &'a ModeArena,
    breaks: &'a BreakSet,
    names: DeclNames,
}

impl<'a> Emitter<'a> {
    pub fn new(modes: &'a ModeArena, breaks: &'a BreakSet) -> Self {
        Emitter {
            modes,
            breaks,
            names: DeclNames::new(modes),
        }
    }

    pub fn name(&self, idx: ModeIndex) -> &str {
        self.names.name(idx)
    }

    fn is_broken(&self, source: ModeIndex, relation: Relation, position: usize) -> bool {
        self.breaks.is_broken(EdgeKey::new(source, relation, position))
    }

    /// A fresh inline expansion with an empty expansion path.
    fn expand(&self, idx: ModeIndex) -> String {
        self.inline_expr(idx, &mut HashSet::new())
    }

    /// The right-hand side of `let mode_<id> = ...` for a scheduled mode.
    pub fn declaration(&self, idx: ModeIndex) -> String {
        let mode = &self.modes[idx];

        let contains = mode
            .contains
            .iter()
            .enumerate()
            .map(|(pos, r)| match r.target_of(idx) {
                None => ".self".to_string(),
                Some(t) if self.is_broken(idx, Relation::Contains, pos) => {
                    format!(".mode({})", self.expand(t))
                }
                Some(t) => format!(".mode({})", self.name(t)),
            })
            .collect();

        let variants = mode
            .variants
            .iter()
            .enumerate()
            .map(|(pos, r)| match r.target_of(idx) {
                // A mode cannot name itself inside its own declaration.
                None => self.expand(idx),
                Some(t) if self.is_broken(idx, Relation::Variants, pos) => self.expand(t),
                Some(t) => self.name(t).to_string(),
            })
            .collect();

        let starts = mode.starts.map(|r| match r.target_of(idx) {
            None => self.expand(idx),
            Some(t) if self.is_broken(idx, Relation::Starts, 0) => self.expand(t),
            Some(t) => self.name(t).to_string(),
        });

        render_mode(mode, &StructuralRefs::from_parts(contains, variants, starts))
    }

    /// Expand `idx` inline. Modes already on `active` render shallow.
    pub fn inline_expr(&self, idx: ModeIndex, active: &mut HashSet<ModeIndex>) -> String {
        let mode = &self.modes[idx];
        if !active.insert(idx) {
            return render_mode(mode, &StructuralRefs::default());
        }

        let contains = mode
            .contains
            .iter()
            .map(|r| match r.target_of(idx) {
                None => ".self".to_string(),
                Some(t) => format!(".mode({})", self.inline_expr(t, active)),
            })
            .collect();

        let variants = mode
            .variants
            .iter()
            .map(|r| self.inline_expr(resolve(*r, idx), active))
            .collect();

        let starts = mode
            .starts
            .map(|r| self.inline_expr(resolve(r, idx), active));

        active.remove(&idx);
        render_mode(mode, &StructuralRefs::from_parts(contains, variants, starts))
    }

    /// Arguments of the `Language(...)` constructor, one per line.
    pub fn language_args(&self, language: &Language, lang_id: &str) -> Vec<String> {
        let mut args = Vec::new();
        let name = language.name.as_deref().unwrap_or(lang_id);
        args.push(format!("name: {}", swift_string(name)));

        if let Some(aliases) = string_array(&language.aliases) {
            args.push(format!("aliases: {}", aliases));
        }
        if language.disable_autodetect {
            args.push("disableAutodetect: true".to_string());
        }
        if language.case_insensitive {
            args.push("caseInsensitive: true".to_string());
        }
        if language.unicode_regex {
            args.push("unicodeRegex: true".to_string());
        }
        if let Some(kw) = keywords_expr(language.keywords.as_ref()) {
            args.push(format!("keywords: {}", kw));
        }
        if let Some(illegal) = pattern_expr(language.illegal.as_ref()) {
            args.push(format!("illegal: {}", illegal));
        }

        let contains: Vec<String> = language
            .contains
            .iter()
            .map(|r| match r {
                ModeRef::SelfRef => ".self".to_string(),
                ModeRef::Mode(t) => format!(".mode({})", self.name(*t)),
            })
            .collect();
        if !contains.is_empty() {
            args.push(format!("contains: [{}]", contains.join(", ")));
        }

        if let Some(aliases) = dict_expr(&language.class_name_aliases) {
            args.push(format!("classNameAliases: {}", aliases));
        }
        args
    }
}

/// The mode a reference points at, with self-references meaning `owner`.
fn resolve(r: ModeRef, owner: ModeIndex) -> ModeIndex {
    r.target_of(owner).unwrap_or(owner)
}
