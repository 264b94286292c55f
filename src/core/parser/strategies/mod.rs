use std::collections::HashSet;

use tree_sitter::{Node, Parser, Tree};

use crate::core::call_resolver::CallMap;
use crate::core::errors::ParseError;
use crate::core::types::{FunctionDef, VariableDef};

use super::fallback;
use super::language::Language;

pub mod javascript;
pub mod python;
pub mod rust;

/// Functions and variables pulled out of one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub functions: Vec<FunctionDef>,
    pub variables: Vec<VariableDef>,
}

/// Per-language extraction strategy.
///
/// `try_structured` walks a real syntax tree and fails on anything it cannot parse;
/// `fallback_regex` never fails. Callers always try the structured path first.
pub trait LanguageStrategy: Send + Sync {
    /// Get the language this strategy handles
    fn language(&self) -> Language;

    /// Extract definitions from a syntax tree
    fn try_structured(&self, source: &str, path: &str) -> Result<Extraction, ParseError>;

    /// Line-oriented extraction used when the tree walk fails
    fn fallback_regex(&self, source: &str, path: &str) -> Extraction {
        Extraction {
            functions: fallback::extract_functions(source, path, self.language()),
            variables: fallback::extract_variables(source, path),
        }
    }

    /// Find calls to known names by walking the syntax tree
    fn try_structured_calls(
        &self,
        source: &str,
        path: &str,
        known: &HashSet<String>,
    ) -> Result<CallMap, ParseError>;
}

/// Strategy for languages without a grammar in the stack: always falls back.
pub struct RegexOnlyStrategy {
    language: Language,
}

impl RegexOnlyStrategy {
    pub fn new(language: Language) -> Self {
        Self { language }
    }
}

impl LanguageStrategy for RegexOnlyStrategy {
    fn language(&self) -> Language {
        self.language
    }

    fn try_structured(&self, _source: &str, _path: &str) -> Result<Extraction, ParseError> {
        Err(ParseError::GrammarUnavailable {
            language: self.language.to_string(),
        })
    }

    fn try_structured_calls(
        &self,
        _source: &str,
        _path: &str,
        _known: &HashSet<String>,
    ) -> Result<CallMap, ParseError> {
        Err(ParseError::GrammarUnavailable {
            language: self.language.to_string(),
        })
    }
}

/// Select the strategy for a language.
pub fn strategy_for(language: Language) -> Box<dyn LanguageStrategy> {
    match language {
        Language::TypeScript | Language::Tsx | Language::JavaScript => {
            Box::new(javascript::ScriptStrategy::new(language))
        }
        Language::Python => Box::new(python::PythonStrategy::new()),
        Language::Rust => Box::new(rust::RustStrategy::new()),
        other => Box::new(RegexOnlyStrategy::new(other)),
    }
}

/// Common utilities for tree-walking strategies
pub mod utils {
    use super::*;

    /// Get the text content of a node
    pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
        &source[node.byte_range()]
    }

    /// 1-based line on which a node starts
    pub fn start_line(node: &Node) -> u32 {
        node.start_position().row as u32 + 1
    }

    pub fn end_line(node: &Node) -> u32 {
        node.end_position().row as u32 + 1
    }

    /// Parse `source` and reject trees containing syntax errors.
    pub fn parse_strict(
        parser: &mut Parser,
        source: &str,
        path: &str,
    ) -> Result<Tree, ParseError> {
        let tree = parser.parse(source, None).ok_or_else(|| ParseError::NoTree {
            path: path.to_string(),
        })?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(ParseError::Syntax {
                path: path.to_string(),
                line: first_error_line(&root).unwrap_or(1),
            });
        }

        Ok(tree)
    }

    fn first_error_line(node: &Node) -> Option<usize> {
        if node.is_error() || node.is_missing() {
            return Some(node.start_position().row + 1);
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.has_error() {
                if let Some(line) = first_error_line(&child) {
                    return Some(line);
                }
            }
        }
        None
    }

    /// Source lines `start..=end` (1-based, clamped) joined back together.
    pub fn snippet(source: &str, start: u32, end: u32) -> String {
        let lines: Vec<&str> = source.split('\n').collect();
        let from = (start.max(1) - 1) as usize;
        let to = (end as usize).min(lines.len());
        if from >= to {
            return String::new();
        }
        lines[from..to].join("\n")
    }

    /// Does any return statement in `body` carry a value? Nested function
    /// scopes listed in `scope_kinds` are not descended into.
    pub fn returns_value(body: &Node, return_kind: &str, scope_kinds: &[&str]) -> bool {
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            if child.kind() == return_kind {
                if child.named_child_count() > 0
                    && (0..child.named_child_count())
                        .filter_map(|i| child.named_child(i))
                        .any(|n| n.kind() != "comment")
                {
                    return true;
                }
                continue;
            }
            if scope_kinds.contains(&child.kind()) {
                continue;
            }
            if returns_value(&child, return_kind, scope_kinds) {
                return true;
            }
        }
        false
    }
}
