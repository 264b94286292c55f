//! Line-oriented regex extraction used when a structured parse is unavailable
//! or fails. Never errors; at worst returns nothing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::constants::limits::SNIPPET_FALLBACK_LINES;
use crate::core::types::{FunctionDef, FunctionKind, VariableDef, VariableKind};

use super::language::Language;
use super::strategies::utils::snippet;

static PYTHON_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*def\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*\(").unwrap());

static GO_FUNC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^func\s+(?:\([^)]+\)\s*)?([a-zA-Z_][a-zA-Z0-9_]*)\s*\(").unwrap()
});

static JAVA_METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)(?:public|private|protected|static|\s)\s+[\w<>\[\]]+\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*\([^)]*\)\s*\{",
    )
    .unwrap()
});

static RUST_FN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?:pub\s+)?fn\s+([a-zA-Z_][a-zA-Z0-9_]*)").unwrap());

static RUBY_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*def\s+([a-zA-Z_][a-zA-Z0-9_]*)").unwrap());

static PHP_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:public|private|protected)?\s*function\s+([a-zA-Z_][a-zA-Z0-9_]*)")
        .unwrap()
});

static C_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[a-zA-Z_][a-zA-Z0-9_]*\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*\(").unwrap()
});

static SCRIPT_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:function\s+([a-zA-Z_]\w*)|(?:const|let|var)\s+([a-zA-Z_]\w*)\s*=\s*(?:async\s*)?(?:function|\([^)]*\)\s*=>))",
    )
    .unwrap()
});

static DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(?:\s*)(const|let|var)\s+([A-Za-z_$][\w$]*)").unwrap());

/// Keywords the looser patterns can mistake for a function name.
const CONTROL_KEYWORDS: &[&str] = &["if", "for", "while", "switch"];

fn pattern_for(language: Language) -> Option<&'static Regex> {
    match language {
        Language::Python => Some(&PYTHON_DEF),
        Language::Go => Some(&GO_FUNC),
        Language::Java | Language::CSharp => Some(&JAVA_METHOD),
        Language::Rust => Some(&RUST_FN),
        Language::Ruby => Some(&RUBY_DEF),
        Language::Php => Some(&PHP_FUNCTION),
        Language::C => Some(&C_FUNCTION),
        Language::TypeScript | Language::Tsx | Language::JavaScript => Some(&SCRIPT_FUNCTION),
        Language::Unknown => None,
    }
}

/// 1-based line containing byte offset `offset`.
pub(crate) fn line_at(source: &str, offset: usize) -> u32 {
    source[..offset].matches('\n').count() as u32 + 1
}

fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map_or(0, |idx| idx + 1)
}

pub fn extract_functions(source: &str, path: &str, language: Language) -> Vec<FunctionDef> {
    let Some(pattern) = pattern_for(language) else {
        return Vec::new();
    };

    let mut functions = Vec::new();
    for caps in pattern.captures_iter(source) {
        let Some(name) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        if CONTROL_KEYWORDS.contains(&name.as_str()) {
            continue;
        }

        // Anchor on the name, not the match start: `\s*` may swallow blank lines.
        let line = line_at(source, name.start());
        let indented = source[line_start(source, name.start())..]
            .starts_with(|c: char| c == ' ' || c == '\t');

        let kind = match language {
            Language::Java | Language::CSharp | Language::C => FunctionKind::Method,
            _ if caps.get(2).is_some() && caps[0].ends_with("=>") => FunctionKind::Arrow,
            _ => FunctionKind::Function,
        };

        functions.push(FunctionDef {
            name: name.as_str().to_string(),
            file: path.to_string(),
            line,
            code: snippet(source, line, line + SNIPPET_FALLBACK_LINES as u32),
            kind,
            is_top_level: !indented || matches!(language, Language::Go | Language::C),
            is_class_method: false,
            params: Vec::new(),
            returns_value: false,
            call_sites: Vec::new(),
            total_calls: 0,
            is_dead: false,
        });
    }
    functions
}

/// `const`/`let`/`var` declarations by line shape. Every match is treated as top-level.
pub fn extract_variables(source: &str, path: &str) -> Vec<VariableDef> {
    DECLARATION
        .captures_iter(source)
        .map(|caps| {
            let keyword = &caps[1];
            VariableDef {
                name: caps[2].to_string(),
                file: path.to_string(),
                line: caps.get(1).map_or(1, |m| line_at(source, m.start())),
                kind: VariableKind::from_keyword(keyword),
                value_type: None,
                is_top_level: true,
                usage_lines: Vec::new(),
                total_usages: 0,
            }
        })
        .collect()
}
