use std::path::{Path, PathBuf};
use std::process;

use modeweave_core::{collect_ir_files, validate_paths};

use crate::{report_error, OutputFormat};

pub(crate) fn cmd_validate(
    inputs: &[PathBuf],
    dir: Option<&Path>,
    output: OutputFormat,
    quiet: bool,
) {
    let mut paths: Vec<PathBuf> = inputs.to_vec();
    if let Some(dir) = dir {
        match collect_ir_files(dir) {
            Ok(found) => paths.extend(found),
            Err(e) => {
                let msg = format!("error reading directory '{}': {}", dir.display(), e);
                report_error(&msg, output, quiet);
                process::exit(1);
            }
        }
    }

    if paths.is_empty() {
        report_error(
            "no IR documents to validate: pass --input or --dir",
            output,
            quiet,
        );
        process::exit(1);
    }

    let report = validate_paths(&paths);
    tracing::debug!(
        checked = report.checked,
        diagnostics = report.diagnostics.len(),
        "validated IR documents"
    );

    if report.is_valid() {
        if !quiet {
            match output {
                OutputFormat::Text => println!("IR validation passed."),
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::json!({ "valid": true, "checked": report.checked })
                    );
                }
            }
        }
        return;
    }

    match output {
        OutputFormat::Text => {
            if !quiet {
                for diagnostic in &report.diagnostics {
                    println!("{}", diagnostic);
                }
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "valid": false,
                "checked": report.checked,
                "errors": report
                    .diagnostics
                    .iter()
                    .map(|d| d.to_json_value())
                    .collect::<Vec<_>>(),
            });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
        }
    }
    process::exit(1);
}
