use std::path::Path;
use std::process;

use modeweave_codegen::{
    generate_language, CodegenError, GenerateRequest, GeneratedFile, GeneratorConfig,
};

use crate::{report_error, OutputFormat};

pub(crate) fn cmd_generate(
    request: &GenerateRequest,
    root: &Path,
    config_path: Option<&Path>,
    output: OutputFormat,
    quiet: bool,
) {
    let config = match config_path {
        Some(path) => GeneratorConfig::load(path, root),
        None => GeneratorConfig::discover(root),
    };
    let config = match config {
        Ok(c) => {
            tracing::debug!(
                output_dir = %c.output_dir.display(),
                "loaded generator config"
            );
            c
        }
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    match generate_language(request, &config) {
        Ok(generated) => {
            tracing::debug!(
                lang = %request.lang,
                path = %generated.path().display(),
                "generate finished"
            );
            if quiet {
                return;
            }
            match (&generated, output) {
                (GeneratedFile::Compiled { path, .. }, OutputFormat::Text) => {
                    println!("Generated {}", path.display());
                }
                (GeneratedFile::Template { path, template }, OutputFormat::Text) => {
                    println!("Copied {} to {}", template.display(), path.display());
                }
                (
                    GeneratedFile::Compiled {
                        path,
                        modes,
                        break_edges,
                    },
                    OutputFormat::Json,
                ) => {
                    println!(
                        "{}",
                        serde_json::json!({
                            "lang": request.lang,
                            "output": path.display().to_string(),
                            "modes": modes,
                            "break_edges": break_edges,
                        })
                    );
                }
                (GeneratedFile::Template { path, template }, OutputFormat::Json) => {
                    println!(
                        "{}",
                        serde_json::json!({
                            "lang": request.lang,
                            "output": path.display().to_string(),
                            "template": template.display().to_string(),
                        })
                    );
                }
            }
        }
        Err(CodegenError::Invalid { path, diagnostics }) => {
            match output {
                OutputFormat::Text => {
                    if !quiet {
                        eprintln!("invalid IR: {}", path.display());
                        for diagnostic in &diagnostics {
                            eprintln!("  - {}", diagnostic);
                        }
                    }
                }
                OutputFormat::Json => {
                    let json = serde_json::json!({
                        "error": "invalid IR",
                        "input": path.display().to_string(),
                        "errors": diagnostics.iter().map(|d| d.to_json_value()).collect::<Vec<_>>(),
                    });
                    eprintln!(
                        "{}",
                        serde_json::to_string_pretty(&json).unwrap_or_default()
                    );
                }
            }
            process::exit(1);
        }
        Err(e) => {
            report_error(&format!("generate failed: {}", e), output, quiet);
            process::exit(1);
        }
    }
}
