//! Swift literal rendering for IR values.
//!
//! Every function here is pure and deterministic: maps are emitted in
//! sorted key order, and absent or empty values render as `None` so the
//! caller can omit the argument entirely.

use modeweave_interchange::{Keywords, Pattern, Scope, SubLanguage};
use std::collections::BTreeMap;

/// A double-quoted Swift string literal.
///
/// Escapes backslash, double quote, newline, carriage return and tab.
/// All other characters pass through unchanged.
pub fn swift_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// Escape a literal `[` that appears inside a character class.
///
/// Upstream regex dialects accept an unescaped `[` inside `[...]`; the
/// target engine reads it as a nested class. Escaped characters are copied
/// through verbatim and never open or close a class.
pub fn sanitize_regex_source(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut in_class = false;
    let mut chars = source.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                out.push(ch);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '[' if in_class => out.push_str("\\["),
            '[' => {
                in_class = true;
                out.push(ch);
            }
            ']' if in_class => {
                in_class = false;
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// `HLJS.re("...")` for a pattern, with an inline `(?i)` for the `i` flag.
pub fn pattern_expr(pattern: Option<&Pattern>) -> Option<String> {
    let pattern = pattern?;
    let mut source = sanitize_regex_source(&pattern.source);
    if pattern.case_insensitive {
        source.insert_str(0, "(?i)");
    }
    Some(format!("HLJS.re({})", swift_string(&source)))
}

/// Split raw keyword text on whitespace and drop `|<digits>` weight suffixes.
pub fn normalize_raw_keywords(raw: &str) -> Vec<String> {
    raw.split_whitespace()
        .map(strip_weight)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_weight(token: &str) -> &str {
    match token.rfind('|') {
        Some(bar)
            if bar + 1 < token.len() && token[bar + 1..].bytes().all(|b| b.is_ascii_digit()) =>
        {
            &token[..bar]
        }
        _ => token,
    }
}

/// `[ "a", "b" ]` without the spaces, or `None` for an empty list.
pub fn string_array(items: &[String]) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    let joined: Vec<String> = items.iter().map(|s| swift_string(s)).collect();
    Some(format!("[{}]", joined.join(", ")))
}

/// `HLJS.kw(...)` for a keyword set.
///
/// Raw words are appended to the `keyword` category. Empty categories are
/// omitted. A keyword set with nothing left renders as `Keywords()`.
pub fn keywords_expr(keywords: Option<&Keywords>) -> Option<String> {
    let keywords = keywords?;

    let mut keyword = keywords.keyword.clone();
    if let Some(raw) = &keywords.raw {
        keyword.extend(normalize_raw_keywords(raw));
    }

    let mut parts = Vec::new();
    if let Some(p) = pattern_expr(keywords.pattern.as_ref()) {
        parts.push(format!("pattern: {}", p));
    }
    let categories = [
        ("keyword", &keyword),
        ("literal", &keywords.literal),
        ("builtIn", &keywords.built_in),
        ("type", &keywords.type_words),
    ];
    for (label, words) in categories {
        if let Some(arr) = string_array(words) {
            parts.push(format!("{}: {}", label, arr));
        }
    }

    let custom: Vec<String> = keywords
        .custom
        .iter()
        .filter_map(|(name, words)| {
            string_array(words).map(|arr| format!("{}: {}", swift_string(name), arr))
        })
        .collect();
    if !custom.is_empty() {
        parts.push(format!("custom: [{}]", custom.join(", ")));
    }

    if parts.is_empty() {
        return Some("Keywords()".to_string());
    }
    Some(format!("HLJS.kw({})", parts.join(", ")))
}

/// `Scope.simple("x")` or `Scope.indexed([1: "x", 2: "y"])`.
pub fn scope_expr(scope: Option<&Scope>) -> Option<String> {
    match scope? {
        Scope::Simple(name) => Some(format!("Scope.simple({})", swift_string(name))),
        Scope::Indexed(groups) => {
            let items: Vec<String> = groups
                .iter()
                .map(|(index, name)| format!("{}: {}", index, swift_string(name)))
                .collect();
            Some(format!("Scope.indexed([{}])", items.join(", ")))
        }
    }
}

pub fn sublanguage_expr(sub: Option<&SubLanguage>) -> Option<String> {
    match sub? {
        SubLanguage::Single(name) if name.is_empty() => None,
        SubLanguage::Single(name) => Some(format!("SubLanguage.single({})", swift_string(name))),
        SubLanguage::Multiple(names) if names.is_empty() => None,
        SubLanguage::Multiple(names) => {
            let joined: Vec<String> = names.iter().map(|n| swift_string(n)).collect();
            Some(format!("SubLanguage.multiple([{}])", joined.join(", ")))
        }
    }
}

/// `["k": "v"]` in key order, or `None` when empty.
pub fn dict_expr(map: &BTreeMap<String, String>) -> Option<String> {
    if map.is_empty() {
        return None;
    }
    let items: Vec<String> = map
        .iter()
        .map(|(k, v)| format!("{}: {}", swift_string(k), swift_string(v)))
        .collect();
    Some(format!("[{}]", items.join(", ")))
}
