use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::types::VariableDef;

static DECLARED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:const|let|var)\s+([A-Za-z_$][\w$]*)").unwrap());

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Whole-token occurrences of `name` in `line`.
fn count_tokens(line: &str, name: &str) -> u32 {
    line.match_indices(name)
        .filter(|(idx, _)| {
            let before = line[..*idx].chars().next_back();
            let after = line[idx + name.len()..].chars().next();
            !before.map_or(false, is_ident_char) && !after.map_or(false, is_ident_char)
        })
        .count() as u32
}

fn declares(line: &str, name: &str) -> bool {
    DECLARED_NAME
        .captures_iter(line)
        .any(|caps| &caps[1] == name)
}

/// Fill `usage_lines`/`total_usages` by raw token matching.
///
/// Not scope-aware: same-named identifiers in unrelated scopes are counted too.
/// The variable's own line and any line declaring the same name are skipped.
pub fn count_usages(source: &str, variables: &mut [VariableDef]) {
    let lines: Vec<&str> = source.split('\n').collect();

    for var in variables.iter_mut() {
        if var.name.is_empty() {
            continue;
        }
        let mut usage_lines = Vec::new();
        let mut total = 0;
        for (idx, line) in lines.iter().enumerate() {
            let line_no = idx as u32 + 1;
            if line_no == var.line || declares(line, &var.name) {
                continue;
            }
            let hits = count_tokens(line, &var.name);
            if hits > 0 {
                usage_lines.push(line_no);
                total += hits;
            }
        }
        var.usage_lines = usage_lines;
        var.total_usages = total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::VariableKind;
    use pretty_assertions::assert_eq;

    fn var(name: &str, line: u32) -> VariableDef {
        VariableDef {
            name: name.to_string(),
            file: "a.js".to_string(),
            line,
            kind: VariableKind::Const,
            value_type: None,
            is_top_level: true,
            usage_lines: Vec::new(),
            total_usages: 0,
        }
    }

    #[test]
    fn test_counts_token_occurrences_excluding_declaration() {
        let source = "const count = 1;\nlog(count + count);\nconst counter = count;\nrecount();\n";
        let mut vars = vec![var("count", 1)];
        count_usages(source, &mut vars);
        assert_eq!(vars[0].usage_lines, vec![2, 3]);
        assert_eq!(vars[0].total_usages, 3);
    }

    #[test]
    fn test_declaration_line_without_keyword_is_skipped() {
        let source = "LIMIT = 10\nprint(LIMIT)\n";
        let mut vars = vec![var("LIMIT", 1)];
        count_usages(source, &mut vars);
        assert_eq!(vars[0].usage_lines, vec![2]);
        assert_eq!(vars[0].total_usages, 1);
    }

    #[test]
    fn test_dollar_names_match_as_tokens() {
        let source = "var $el = q();\n$el.show(); $elem.hide();\n";
        let mut vars = vec![var("$el", 1)];
        count_usages(source, &mut vars);
        assert_eq!(vars[0].total_usages, 1);
    }
}
