//! Swift source file assembly.

use crate::emit::Emitter;
use modeweave_core::CompiledGrammar;
use modeweave_interchange::GrammarDocument;

/// Render the complete `<Base>.swift` file for a compiled grammar.
///
/// Lines are joined with `\n` and the file ends with a single newline.
pub fn render_file(
    doc: &GrammarDocument,
    compiled: &CompiledGrammar,
    lang: &str,
    register_name: &str,
) -> String {
    let emitter = Emitter::new(&doc.modes, &compiled.breaks);
    let mut lines: Vec<String> = vec![
        "import Foundation".to_string(),
        String::new(),
        format!("public func {}Language(_ hljs: Highlight) -> Language {{", lang),
    ];

    for &idx in &compiled.schedule.order {
        lines.push(format!(
            "    let {} = {}",
            emitter.name(idx),
            emitter.declaration(idx)
        ));
        lines.push(String::new());
    }

    let args = emitter.language_args(&doc.language, lang);
    lines.push("    return Language(".to_string());
    let last = args.len().saturating_sub(1);
    for (i, arg) in args.iter().enumerate() {
        let suffix = if i < last { "," } else { "" };
        lines.push(format!("        {}{}", arg, suffix));
    }
    lines.push("    )".to_string());
    lines.push("}".to_string());
    lines.push(String::new());

    lines.push("public extension Highlight {".to_string());
    lines.push(format!("    func register{}() {{", register_name));
    lines.push(format!(
        "        registerLanguage({}) {{ hljs in {}Language(hljs) }}",
        crate::literal::swift_string(lang),
        lang
    ));
    lines.push("    }".to_string());
    lines.push("}".to_string());
    lines.push(String::new());

    lines.join("\n")
}
