//! modeweave-codegen: Swift highlighting declarations from grammar IR.
//!
//! Consumes grammar IR JSON (through modeweave-interchange), compiles the
//! mode graph with modeweave-core, and renders one Swift source file per
//! language. Languages listed as template overrides are copied verbatim
//! from a hand-maintained file instead.

pub mod config;
pub mod emit;
pub mod literal;
pub mod swift;

pub use config::GeneratorConfig;

use modeweave_core::{CompiledGrammar, Diagnostic};
use modeweave_interchange::{GrammarDocument, InterchangeError};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Error type for generation.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// The document could not be turned into a mode arena.
    #[error("invalid IR: {0}")]
    Interchange(#[from] InterchangeError),

    /// The input file is not valid JSON.
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Validation found problems; generation did not start.
    #[error("{} has {} validation error(s)", path.display(), diagnostics.len())]
    Invalid {
        path: PathBuf,
        diagnostics: Vec<Diagnostic>,
    },

    /// A cycle survived break selection and strict mode is on.
    #[error("unresolved reference cycle among modes: {}", modes.join(", "))]
    ResidualCycle { modes: Vec<String> },

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

/// Options for rendering a single language.
#[derive(Debug, Clone)]
pub struct SwiftOptions {
    /// Language id, used for the function and registration names.
    pub lang: String,
    /// Suffix of the generated `register<Name>()` method.
    pub register_name: String,
    /// Fail instead of falling back to declaration order.
    pub strict: bool,
}

/// Compile an IR document and render its Swift source.
///
/// The document is expected to have passed validation; this only fails on
/// problems the loader itself cannot get past, or on a residual cycle in
/// strict mode.
pub fn generate_swift(ir: &Value, options: &SwiftOptions) -> Result<String, CodegenError> {
    let doc = modeweave_interchange::from_interchange(ir)?;
    render_document(&doc, options).map(|(swift, _)| swift)
}

/// Render an already-loaded document. Also returns the break-edge count.
fn render_document(
    doc: &GrammarDocument,
    options: &SwiftOptions,
) -> Result<(String, usize), CodegenError> {
    let compiled = modeweave_core::compile(doc);
    let swift = render_compiled(doc, &compiled, options)?;
    Ok((swift, compiled.breaks.len()))
}

/// Render a document whose mode graph has already been compiled.
///
/// A fallback schedule renders in declaration order unless `strict` is set,
/// in which case the residual modes are reported instead.
pub fn render_compiled(
    doc: &GrammarDocument,
    compiled: &CompiledGrammar,
    options: &SwiftOptions,
) -> Result<String, CodegenError> {
    if compiled.schedule.is_fallback() && options.strict {
        return Err(CodegenError::ResidualCycle {
            modes: compiled
                .schedule
                .residual
                .iter()
                .map(|&m| doc.modes[m].id.clone())
                .collect(),
        });
    }

    tracing::debug!(
        lang = %options.lang,
        modes = doc.modes.len(),
        break_edges = compiled.breaks.len(),
        "rendering swift source"
    );
    Ok(swift::render_file(
        doc,
        compiled,
        &options.lang,
        &options.register_name,
    ))
}

/// One `generate` invocation. `None` paths fall back to the config defaults.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub lang: String,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub strict: bool,
}

/// What `generate_language` wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedFile {
    Compiled {
        path: PathBuf,
        modes: usize,
        break_edges: usize,
    },
    /// Copied verbatim from a template override.
    Template { path: PathBuf, template: PathBuf },
}

impl GeneratedFile {
    pub fn path(&self) -> &Path {
        match self {
            GeneratedFile::Compiled { path, .. } | GeneratedFile::Template { path, .. } => path,
        }
    }
}

/// Validate, compile and write the Swift file for one language.
pub fn generate_language(
    request: &GenerateRequest,
    config: &GeneratorConfig,
) -> Result<GeneratedFile, CodegenError> {
    let lang = request.lang.as_str();
    let output = request
        .output
        .clone()
        .unwrap_or_else(|| config.output_path(lang));

    if let Some(template) = config.template_for(lang) {
        let content = read_file(&template)?;
        write_file(&output, &content)?;
        tracing::debug!(lang, template = %template.display(), "copied template override");
        return Ok(GeneratedFile::Template {
            path: output,
            template,
        });
    }

    let input = request
        .input
        .clone()
        .unwrap_or_else(|| config.input_path(lang));
    let text = read_file(&input)?;
    let ir: Value = serde_json::from_str(&text).map_err(|e| CodegenError::Parse {
        path: input.clone(),
        message: e.to_string(),
    })?;

    let diagnostics = modeweave_core::validate_document(&ir, &input.display().to_string());
    if !diagnostics.is_empty() {
        return Err(CodegenError::Invalid {
            path: input,
            diagnostics,
        });
    }

    let doc = modeweave_interchange::from_interchange(&ir)?;
    let options = SwiftOptions {
        lang: lang.to_string(),
        register_name: config.register_name(lang),
        strict: request.strict,
    };
    let (swift, break_edges) = render_document(&doc, &options)?;
    write_file(&output, &swift)?;

    Ok(GeneratedFile::Compiled {
        path: output,
        modes: doc.modes.len(),
        break_edges,
    })
}

fn read_file(path: &Path) -> Result<String, CodegenError> {
    std::fs::read_to_string(path).map_err(|source| CodegenError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), CodegenError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| CodegenError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, content).map_err(|source| CodegenError::Io {
        path: path.to_path_buf(),
        source,
    })
}
