//! Human-readable diagnostics.

use scamp_types::{CompileErrors, ScampError};

pub fn format_error(file: &str, err: &ScampError) -> String {
    let mut out = format!("error[{}]: {}", err.code, err.message);
    if let Some(span) = err.span {
        out.push_str(&format!("\n  --> {file}:{}:{}", span.start_line, span.start_col));
    }
    if let Some(snippet) = &err.snippet {
        for line in snippet.lines() {
            out.push_str(&format!("\n   | {line}"));
        }
    }
    if let Some(hint) = &err.hint {
        out.push_str(&format!("\n   = hint: {hint}"));
    }
    out
}

pub fn print_errors(file: &str, errors: &CompileErrors) {
    for err in &errors.errors {
        eprintln!("{}\n", format_error(file, err));
    }
    let hidden = errors.total_errors.saturating_sub(errors.errors.len());
    if hidden > 0 {
        eprintln!("... and {hidden} more error(s)");
    }
}
