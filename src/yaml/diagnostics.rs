//! YAML error diagnostics pointing at the offending line of a record file

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// YAML syntax or schema error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("invalid record: {message}")]
#[diagnostic(code(cqt::yaml::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    /// The underlying error message
    message: String,
}

impl YamlSyntaxError {
    /// Create an error from a serde_yml error
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));

        let offset = line_col_to_offset(source, line, column);
        let message = err.to_string();
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help,
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors from reading a YAML record
#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert 1-based line/column to a byte offset
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut line_start = 0;
    for (n, text) in source.split_inclusive('\n').enumerate() {
        if n + 1 == line {
            let within = text
                .char_indices()
                .nth(column.saturating_sub(1))
                .map(|(i, _)| i)
                .unwrap_or(text.len().saturating_sub(1));
            return line_start + within;
        }
        line_start += text.len();
    }
    source.len().saturating_sub(1)
}

/// Suggest a fix based on the error message
fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("test_stage") || msg_lower.contains("clay_testing") {
        return Some(
            "Valid stages: clay_testing, pressing, drying, bisque_firing, glaze_testing, \
             breaking_strength, dimensional, water_absorption, surface_quality"
                .to_string(),
        );
    }

    if msg_lower.contains("record prefix") || msg_lower.contains("<prefix><yyyymmdd>") {
        return Some("IDs look like LOT20250124001 or SAMP20250124001".to_string());
    }

    if msg_lower.contains("pei class") {
        return Some("Write the PEI class as 0-5 or \"PEI III\"".to_string());
    }

    if msg_lower.contains("expected f64") || msg_lower.contains("expected a number") {
        return Some("Readings must be plain numbers with a '.' decimal separator, e.g. 5.8".to_string());
    }

    if msg_lower.contains("tab") {
        return Some(
            "YAML requires spaces for indentation, not tabs. Replace tabs with spaces.".to_string(),
        );
    }

    if msg_lower.contains("duplicate") {
        return Some("Each key can only appear once. Remove or rename the duplicate key.".to_string());
    }

    if msg_lower.contains("mapping values are not allowed") {
        return Some("You may be missing a space after ':' or have incorrect indentation.".to_string());
    }

    if msg_lower.contains("missing field") {
        return Some("Records need at least id, created and author; samples also batch and test_stage".to_string());
    }

    None
}
