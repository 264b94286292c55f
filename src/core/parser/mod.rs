//! Per-file source analysis.
//!
//! [`SourceParser::parse`] is a pure function of `(content, path)`: it picks a
//! [`LanguageStrategy`] by extension, tries the syntax-tree walk, and drops to
//! line-oriented regex extraction when the walk cannot be completed. It never fails.

pub mod complexity;
pub mod fallback;
pub mod imports;
pub mod language;
pub mod security;
pub mod strategies;
pub mod variables;

use tracing::{debug, warn};

use crate::core::errors::ParseError;
use crate::core::types::{Complexity, FunctionDef, SecurityIssue, VariableDef};

pub use complexity::ComplexityThresholds;
pub use language::Language;
pub use strategies::{strategy_for, Extraction, LanguageStrategy};

/// Everything extracted from one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    pub functions: Vec<FunctionDef>,
    pub variables: Vec<VariableDef>,
    pub complexity: Complexity,
    pub imports: Vec<String>,
    pub security_issues: Vec<SecurityIssue>,
    /// Whether definitions came from the regex fallback.
    pub used_fallback: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SourceParser {
    thresholds: ComplexityThresholds,
}

impl SourceParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: ComplexityThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ComplexityThresholds {
        &self.thresholds
    }

    pub fn parse(&self, content: &str, path: &str) -> ParsedFile {
        let language = Language::from_path(path);
        let strategy = strategy_for(language);

        let (mut extraction, used_fallback) = match strategy.try_structured(content, path) {
            Ok(extraction) => (extraction, false),
            Err(ParseError::GrammarUnavailable { .. }) => {
                (strategy.fallback_regex(content, path), true)
            }
            Err(err) => {
                warn!(path, error = %err, "structured parse failed, falling back to regex");
                (strategy.fallback_regex(content, path), true)
            }
        };

        variables::count_usages(content, &mut extraction.variables);

        let parsed = ParsedFile {
            functions: extraction.functions,
            variables: extraction.variables,
            complexity: complexity::measure(content, &self.thresholds),
            imports: imports::detect_imports(content, language),
            security_issues: security::detect_security(content, path),
            used_fallback,
        };

        debug!(
            path,
            language = %language,
            functions = parsed.functions.len(),
            imports = parsed.imports.len(),
            fallback = used_fallback,
            "parsed file"
        );

        parsed
    }
}
