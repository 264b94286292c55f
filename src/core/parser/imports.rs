use once_cell::sync::Lazy;
use regex::Regex;

use super::language::Language;

static SCRIPT_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:import|from)\s+['"]([^'"]+)['"]"#).unwrap());

static SCRIPT_REQUIRE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"require\(['"]([^'"]+)['"]\)"#).unwrap());

static PYTHON_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(?:from|import)\s+([a-zA-Z0-9_.]+)").unwrap());

static GO_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"import\s+(?:[A-Za-z_.]\w*\s+)?['"]([^'"]+)['"]"#).unwrap());

static GO_IMPORT_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"import\s*\(([^)]*)\)").unwrap());

static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"['"]([^'"]+)['"]"#).unwrap());

/// Literal import targets in source order, de-duplicated. Resolution to files
/// happens later in the graph builder.
pub fn detect_imports(source: &str, language: Language) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let mut push = |target: &str| {
        if !found.iter().any(|existing| existing == target) {
            found.push(target.to_string());
        }
    };

    match language {
        Language::TypeScript | Language::Tsx | Language::JavaScript => {
            for caps in SCRIPT_IMPORT.captures_iter(source) {
                push(&caps[1]);
            }
            for caps in SCRIPT_REQUIRE.captures_iter(source) {
                push(&caps[1]);
            }
        }
        Language::Python => {
            for caps in PYTHON_IMPORT.captures_iter(source) {
                push(&caps[1]);
            }
        }
        Language::Go => {
            for caps in GO_IMPORT.captures_iter(source) {
                push(&caps[1]);
            }
            for block in GO_IMPORT_BLOCK.captures_iter(source) {
                for caps in QUOTED.captures_iter(&block[1]) {
                    push(&caps[1]);
                }
            }
        }
        _ => {}
    }

    found
}
