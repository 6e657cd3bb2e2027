//! Deserialization from grammar IR JSON into typed structs.
//!
//! The main entry point is [`from_interchange`], which takes a
//! `&serde_json::Value` and produces a [`GrammarDocument`]. The loader
//! assumes the document already passed validation; anything it cannot
//! interpret is still reported as an [`InterchangeError`] rather than a
//! panic.

use crate::types::*;
use serde_json::Value;
use std::collections::BTreeMap;

/// Errors during grammar IR deserialization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterchangeError {
    /// The document is missing a required top-level field.
    #[error("document missing required field: '{field}'")]
    MissingField { field: String },
    /// A mode has a field that cannot be interpreted.
    #[error("mode '{id}': {message}")]
    ModeError { id: String, message: String },
    /// A structural reference names no declared mode.
    #[error("{owner}.{field}: unknown ref '{target}'")]
    UnresolvedRef {
        owner: String,
        field: String,
        target: String,
    },
    /// The document structure is invalid.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

/// Deserialize a grammar IR document into typed structs.
///
/// Mode ids are collected first so that references can point forward and
/// backward alike; each reference is then resolved to a [`ModeIndex`].
pub fn from_interchange(doc: &Value) -> Result<GrammarDocument, InterchangeError> {
    let version = doc
        .get("version")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| InterchangeError::MissingField {
            field: "version".to_string(),
        })?;

    let language_obj = doc
        .get("language")
        .filter(|l| l.is_object())
        .ok_or_else(|| InterchangeError::MissingField {
            field: "language".to_string(),
        })?;

    let mode_objs = match doc.get("modes") {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(arr)) => arr.as_slice(),
        Some(_) => {
            return Err(InterchangeError::InvalidDocument(
                "'modes' is not a list".to_string(),
            ))
        }
    };

    let mut ids = Vec::with_capacity(mode_objs.len());
    for obj in mode_objs {
        ids.push(required_str(obj, "id")?);
    }
    let resolver = Resolver::new(&ids);

    let mut modes = Vec::with_capacity(mode_objs.len());
    for (obj, id) in mode_objs.iter().zip(ids.iter()) {
        modes.push(parse_mode(obj, id, &resolver)?);
    }

    let language = parse_language(language_obj, &resolver)?;

    Ok(GrammarDocument {
        version,
        language,
        modes: ModeArena::new(modes),
    })
}

// ── Reference resolution ────────────────────────────────────────────

struct Resolver {
    by_id: BTreeMap<String, ModeIndex>,
}

impl Resolver {
    fn new(ids: &[String]) -> Self {
        let mut by_id = BTreeMap::new();
        for (i, id) in ids.iter().enumerate() {
            by_id.entry(id.clone()).or_insert(ModeIndex(i));
        }
        Resolver { by_id }
    }

    fn resolve(&self, value: &Value, owner: &str, field: &str) -> Result<ModeRef, InterchangeError> {
        if value.as_str() == Some("self") {
            return Ok(ModeRef::SelfRef);
        }
        let target = value.get("ref").and_then(|r| r.as_str()).ok_or_else(|| {
            InterchangeError::InvalidDocument(format!("{}.{}: invalid ref '{}'", owner, field, value))
        })?;
        self.by_id
            .get(target)
            .copied()
            .map(ModeRef::Mode)
            .ok_or_else(|| InterchangeError::UnresolvedRef {
                owner: owner.to_string(),
                field: field.to_string(),
                target: target.to_string(),
            })
    }

    fn resolve_list(
        &self,
        obj: &Value,
        field: &str,
        owner: &str,
    ) -> Result<Vec<ModeRef>, InterchangeError> {
        match obj.get(field) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(arr)) => arr
                .iter()
                .map(|r| self.resolve(r, owner, field))
                .collect(),
            Some(_) => Err(InterchangeError::InvalidDocument(format!(
                "{}.{}: not a list",
                owner, field
            ))),
        }
    }
}

// ── Parsing helpers ─────────────────────────────────────────────────

fn required_str(obj: &Value, field: &str) -> Result<String, InterchangeError> {
    obj.get(field)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .ok_or_else(|| InterchangeError::InvalidDocument(format!("mode missing '{}' field", field)))
}

/// A non-empty string field. Empty strings and non-strings read as absent.
fn opt_str(obj: &Value, field: &str) -> Option<String> {
    obj.get(field)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn flag(obj: &Value, field: &str) -> bool {
    obj.get(field).and_then(|v| v.as_bool()).unwrap_or(false)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(arr)) => arr
            .iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect(),
        Some(Value::String(s)) => s.split_whitespace().map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

fn parse_pattern(obj: &Value, field: &str, owner: &str) -> Result<Option<Pattern>, InterchangeError> {
    let value = match obj.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(v) => v,
    };
    let invalid = |message: String| InterchangeError::ModeError {
        id: owner.to_string(),
        message,
    };

    let source = value
        .get("source")
        .and_then(|s| s.as_str())
        .ok_or_else(|| invalid(format!("{}: pattern missing 'source'", field)))?
        .to_string();

    let kind = match value.get("type").and_then(|t| t.as_str()) {
        None | Some("regex") => PatternKind::Regex,
        Some("string") => PatternKind::String,
        Some(other) => return Err(invalid(format!("{}: unsupported pattern type '{}'", field, other))),
    };

    let flags = value.get("flags").and_then(|f| f.as_str()).unwrap_or("");

    Ok(Some(Pattern {
        kind,
        source,
        case_insensitive: flags.contains('i'),
        unicode: flags.contains('u'),
    }))
}

fn parse_keywords(obj: &Value, owner: &str) -> Result<Option<Keywords>, InterchangeError> {
    let value = match obj.get("keywords") {
        None | Some(Value::Null) => return Ok(None),
        Some(v) => v,
    };

    if let Some(raw) = value.as_str() {
        if raw.is_empty() {
            return Ok(None);
        }
        return Ok(Some(Keywords {
            raw: Some(raw.to_string()),
            ..Keywords::default()
        }));
    }

    let map = match value.as_object() {
        Some(map) if !map.is_empty() => map,
        Some(_) => return Ok(None),
        None => {
            return Err(InterchangeError::ModeError {
                id: owner.to_string(),
                message: "keywords is not an object".to_string(),
            })
        }
    };

    let custom = map
        .get("custom")
        .and_then(|c| c.as_object())
        .map(|c| {
            c.iter()
                .map(|(k, v)| (k.clone(), string_list(Some(v))))
                .collect::<BTreeMap<_, _>>()
        })
        .unwrap_or_default();

    Ok(Some(Keywords {
        pattern: parse_pattern(value, "pattern", owner)?,
        keyword: string_list(map.get("keyword")),
        literal: string_list(map.get("literal")),
        built_in: string_list(map.get("built_in")),
        type_words: string_list(map.get("type")),
        custom,
        raw: opt_str(value, "raw"),
    }))
}

fn parse_scope(obj: &Value, field: &str, owner: &str) -> Result<Option<Scope>, InterchangeError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(Scope::Simple(s.clone()))),
        Some(Value::Object(map)) => {
            let mut indexed = BTreeMap::new();
            for (k, v) in map {
                let group = k.parse::<u32>().map_err(|_| InterchangeError::ModeError {
                    id: owner.to_string(),
                    message: format!("{}: capture index '{}' is not a number", field, k),
                })?;
                if let Some(name) = v.as_str() {
                    indexed.insert(group, name.to_string());
                }
            }
            Ok(Some(Scope::Indexed(indexed)))
        }
        Some(other) => Err(InterchangeError::ModeError {
            id: owner.to_string(),
            message: format!("{}: unsupported scope '{}'", field, other),
        }),
    }
}

fn parse_sub_language(obj: &Value) -> Option<SubLanguage> {
    match obj.get("subLanguage")? {
        Value::String(s) if !s.is_empty() => Some(SubLanguage::Single(s.clone())),
        Value::Array(arr) if !arr.is_empty() => Some(SubLanguage::Multiple(
            arr.iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect(),
        )),
        _ => None,
    }
}

fn parse_mode(obj: &Value, id: &str, resolver: &Resolver) -> Result<Mode, InterchangeError> {
    let owner = format!("mode {}", id);

    let starts = match obj.get("starts") {
        None | Some(Value::Null) => None,
        Some(v) => Some(resolver.resolve(v, &owner, "starts")?),
    };

    // Booleans and fractional relevance are not integer weights.
    let relevance = obj.get("relevance").and_then(|r| r.as_i64());

    Ok(Mode {
        id: id.to_string(),
        scope: opt_str(obj, "scope"),
        class_name: opt_str(obj, "className"),
        begin: parse_pattern(obj, "begin", id)?,
        end: parse_pattern(obj, "end", id)?,
        match_pattern: parse_pattern(obj, "match", id)?,
        keywords: parse_keywords(obj, id)?,
        begin_keywords: opt_str(obj, "beginKeywords"),
        illegal: parse_pattern(obj, "illegal", id)?,
        flags: ModeFlags {
            exclude_begin: flag(obj, "excludeBegin"),
            exclude_end: flag(obj, "excludeEnd"),
            return_begin: flag(obj, "returnBegin"),
            return_end: flag(obj, "returnEnd"),
            ends_with_parent: flag(obj, "endsWithParent"),
            ends_parent: flag(obj, "endsParent"),
            skip: flag(obj, "skip"),
        },
        relevance,
        sub_language: parse_sub_language(obj),
        begin_scope: parse_scope(obj, "beginScope", id)?,
        end_scope: parse_scope(obj, "endScope", id)?,
        contains: resolver.resolve_list(obj, "contains", &owner)?,
        variants: resolver.resolve_list(obj, "variants", &owner)?,
        starts,
    })
}

fn parse_language(obj: &Value, resolver: &Resolver) -> Result<Language, InterchangeError> {
    let class_name_aliases = obj
        .get("classNameAliases")
        .and_then(|a| a.as_object())
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();

    Ok(Language {
        name: opt_str(obj, "name"),
        aliases: string_list(obj.get("aliases")),
        disable_autodetect: flag(obj, "disableAutodetect"),
        case_insensitive: flag(obj, "caseInsensitive"),
        unicode_regex: flag(obj, "unicodeRegex"),
        keywords: parse_keywords(obj, "language")?,
        illegal: parse_pattern(obj, "illegal", "language")?,
        class_name_aliases,
        contains: resolver.resolve_list(obj, "contains", "language")?,
    })
}
