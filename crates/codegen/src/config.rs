//! Generator configuration.
//!
//! Paths are relative to a repository root. Defaults reproduce the
//! conventional layout; a `modeweave.toml` at the root overrides any field:
//!
//! ```toml
//! ir-dir = "tools/ir"
//! output-dir = "Sources/SwiftHighlight/Languages"
//! template-dir = "tools/templates"
//!
//! [display-names]
//! json = "JSON"
//!
//! [template-overrides]
//! python = "Python.swift"
//! ```

use crate::CodegenError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name looked up at the repository root by [`GeneratorConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "modeweave.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneratorConfig {
    /// Repository root every relative path resolves against.
    #[serde(skip)]
    pub root: PathBuf,
    /// Where `<lang>.json` IR documents live.
    pub ir_dir: PathBuf,
    /// Where generated `<Base>.swift` files go.
    pub output_dir: PathBuf,
    /// Where hand-maintained override files live.
    pub template_dir: PathBuf,
    /// Language ids whose display casing is not plain capitalization.
    pub display_names: BTreeMap<String, String>,
    /// Language ids copied from a template instead of generated.
    pub template_overrides: BTreeMap<String, String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            root: PathBuf::from("."),
            ir_dir: PathBuf::from("tools/ir"),
            output_dir: PathBuf::from("Sources/SwiftHighlight/Languages"),
            template_dir: PathBuf::from("tools/templates"),
            display_names: BTreeMap::from([("json".to_string(), "JSON".to_string())]),
            template_overrides: BTreeMap::from([
                ("python".to_string(), "Python.swift".to_string()),
                ("swift".to_string(), "Swift.swift".to_string()),
            ]),
        }
    }
}

impl GeneratorConfig {
    /// Defaults rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        GeneratorConfig {
            root: root.into(),
            ..GeneratorConfig::default()
        }
    }

    /// Read a TOML config file. Fields it omits keep their defaults.
    pub fn load(path: &Path, root: impl Into<PathBuf>) -> Result<Self, CodegenError> {
        let content = std::fs::read_to_string(path).map_err(|source| CodegenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: GeneratorConfig =
            toml::from_str(&content).map_err(|e| CodegenError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        config.root = root.into();
        Ok(config)
    }

    /// Load `modeweave.toml` from `root` when present, defaults otherwise.
    pub fn discover(root: &Path) -> Result<Self, CodegenError> {
        let candidate = root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "loading generator config");
            Self::load(&candidate, root)
        } else {
            Ok(Self::with_root(root))
        }
    }

    fn resolve(&self, dir: &Path) -> PathBuf {
        self.root.join(dir)
    }

    /// Default IR location for `lang`.
    pub fn input_path(&self, lang: &str) -> PathBuf {
        self.resolve(&self.ir_dir).join(format!("{}.json", lang))
    }

    /// Output file stem: the display name, or the id capitalized with the
    /// rest lowercased.
    pub fn file_base(&self, lang: &str) -> String {
        match self.display_names.get(lang) {
            Some(name) => name.clone(),
            None => {
                let mut chars = lang.chars();
                match chars.next() {
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                    None => String::new(),
                }
            }
        }
    }

    /// Suffix of `register<Name>()`: the display name, or the id with only
    /// its first character uppercased.
    pub fn register_name(&self, lang: &str) -> String {
        match self.display_names.get(lang) {
            Some(name) => name.clone(),
            None => {
                let mut chars = lang.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }

    /// Default output location for `lang`.
    pub fn output_path(&self, lang: &str) -> PathBuf {
        self.resolve(&self.output_dir)
            .join(format!("{}.swift", self.file_base(lang)))
    }

    /// Template file to copy for `lang`, if it is overridden.
    pub fn template_for(&self, lang: &str) -> Option<PathBuf> {
        self.template_overrides
            .get(lang)
            .map(|file| self.resolve(&self.template_dir).join(file))
    }
}
