//! Error adapter for converting CliError to miette diagnostics.
//!
//! This module provides the bridge between the CLI's standard error type and
//! miette's rich diagnostic formatting. JSON decode errors carry the input
//! text, so they are rendered with a label pointing at the offending line.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};
use serde_json::error::Category;

use stencil::StencilError;

use crate::{config::ConfigError, error::CliError};

/// Adapter implementing [`MietteDiagnostic`] for a [`CliError`].
pub struct ErrorAdapter<'a>(pub &'a CliError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            CliError::Io(_) => "stencil::io",
            CliError::Config(_) | CliError::Stencil(StencilError::Config(_)) => "stencil::config",
            CliError::Json { .. } | CliError::Stencil(StencilError::Serialization(_)) => {
                "stencil::json"
            }
            CliError::Validation { .. } => "stencil::validation",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            CliError::Config(ConfigError::MissingFile(_)) => {
                "check the path passed to --config"
            }
            CliError::Config(ConfigError::Validation(_))
            | CliError::Stencil(StencilError::Config(_)) => {
                "min_benefit_ratio must be in [0, 1) and grid.min_confidence in [0, 1]"
            }
            CliError::Validation { .. } => "each mismatch is logged at the `warn` level",
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match &self.0 {
            CliError::Json { src, .. } => Some(src as &dyn miette::SourceCode),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let CliError::Json { src, err, .. } = &self.0 else {
            return None;
        };
        let offset = json_offset(src, err.line(), err.column())?;
        let span = SourceSpan::new(offset.into(), 0);

        Some(Box::new(std::iter::once(LabeledSpan::new_primary_with_span(
            Some(json_label(err).to_string()),
            span,
        ))))
    }
}

/// Short label text for a serde_json error category.
fn json_label(err: &serde_json::Error) -> &'static str {
    match err.classify() {
        Category::Io => "read failed here",
        Category::Syntax => "syntax error here",
        Category::Data => "unexpected value here",
        Category::Eof => "input ends here",
    }
}

/// Byte offset of a 1-based `line`/`column` position reported by serde_json.
fn json_offset(src: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let line_start: usize = src
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    Some((line_start + column.saturating_sub(1)).min(src.len()))
}
