use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::types::{SecurityIssue, Severity};

struct Rule {
    pattern: Regex,
    severity: Severity,
    title: &'static str,
    desc: &'static str,
    /// Lines containing any of these are never reported by this rule.
    unless: &'static [&'static str],
}

/// Environment and configuration lookups that look like assignments but hold no secret.
const SECRET_SOURCES: &[&str] = &[
    "process.env",
    "config.",
    "os.environ",
    "os.getenv",
    "env::var",
    "System.getenv",
];

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule {
            pattern: Regex::new(
                r#"(?i)(?:password|passwd|pwd|secret|api_key|apikey|token|auth)\s*[=:]\s*['"][^'"]{8,}['"]"#,
            )
            .unwrap(),
            severity: Severity::High,
            title: "Hardcoded Secret",
            desc: "Potential hardcoded credential detected.",
            unless: SECRET_SOURCES,
        },
        Rule {
            pattern: Regex::new(r"(?i)(?:query|execute|select|insert|update|delete).*(?:\+|\$\{)")
                .unwrap(),
            severity: Severity::High,
            title: "SQL Injection Risk",
            desc: "Potential SQL injection via string concatenation.",
            unless: &[],
        },
        Rule {
            pattern: Regex::new(r"dangerouslySetInnerHTML|\.innerHTML\s*=[^=]|v-html").unwrap(),
            severity: Severity::Medium,
            title: "XSS Risk",
            desc: "Injecting raw HTML can lead to XSS.",
            unless: &[],
        },
        Rule {
            pattern: Regex::new(r"\beval\s*\(|new\s+Function\s*\(").unwrap(),
            severity: Severity::High,
            title: "Dynamic Code Execution",
            desc: "Use of eval() or new Function() is dangerous.",
            unless: &[],
        },
    ]
});

/// Scan every line against every rule; one issue per (line, rule) match.
pub fn detect_security(source: &str, path: &str) -> Vec<SecurityIssue> {
    let mut issues = Vec::new();

    for (idx, line) in source.split('\n').enumerate() {
        for rule in RULES.iter() {
            if !rule.pattern.is_match(line) {
                continue;
            }
            if rule.unless.iter().any(|marker| line.contains(marker)) {
                continue;
            }
            issues.push(SecurityIssue {
                severity: rule.severity,
                title: rule.title.to_string(),
                file: path.to_string(),
                line: idx as u32 + 1,
                desc: rule.desc.to_string(),
                code: line.trim().to_string(),
            });
        }
    }

    issues
}
