//! Call-site discovery against a global set of known function names.
//!
//! Attribution is by name only. Two unrelated functions sharing a name anywhere
//! in the repository are treated as the same callee.

use std::collections::{BTreeMap, HashSet};

use regex::Regex;
use tracing::debug;

use crate::core::errors::ParseError;
use crate::core::parser::{strategy_for, Language};
use crate::core::types::CallSite;

/// Calls to one name within one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallInfo {
    pub total_calls: u32,
    pub call_sites: Vec<CallSite>,
}

impl CallInfo {
    pub fn record(&mut self, line: u32, caller: Option<&str>) {
        self.total_calls += 1;
        self.call_sites.push(CallSite {
            line,
            caller: caller.map(str::to_string),
            file: None,
        });
    }
}

/// Called name -> calls, ordered by name.
pub type CallMap = BTreeMap<String, CallInfo>;

pub fn record_call(calls: &mut CallMap, name: &str, line: u32, caller: Option<&str>) {
    calls.entry(name.to_string()).or_default().record(line, caller);
}

/// Find every call in `content` to a name in `known`.
///
/// Uses the structured walk when the language has one and the file parses,
/// otherwise the line-scoped regex search.
pub fn find_calls(content: &str, path: &str, known: &HashSet<String>) -> CallMap {
    if known.is_empty() || content.is_empty() {
        return CallMap::new();
    }

    let strategy = strategy_for(Language::from_path(path));
    match strategy.try_structured_calls(content, path, known) {
        Ok(calls) => calls,
        Err(ParseError::GrammarUnavailable { .. }) => find_calls_by_pattern(content, known),
        Err(err) => {
            debug!(path, error = %err, "call walk failed, using pattern search");
            find_calls_by_pattern(content, known)
        }
    }
}

/// Regex search for `name(`, skipping lines that declare `name` itself.
pub fn find_calls_by_pattern(content: &str, known: &HashSet<String>) -> CallMap {
    let mut calls = CallMap::new();
    let lines: Vec<&str> = content.split('\n').collect();

    // Sorted so call sites within a name come out in a stable order.
    let mut names: Vec<&String> = known.iter().collect();
    names.sort();

    for name in names {
        // Cheap pre-filter before compiling per-name patterns.
        if !content.contains(name.as_str()) {
            continue;
        }
        let escaped = regex::escape(name);
        let Ok(call) = Regex::new(&format!(r"\b{escaped}\s*\(")) else {
            continue;
        };
        let Ok(declaration) = Regex::new(&format!(
            r"(?:(?:function|def|fn|func)\s+{escaped}\s*\()|(?:(?:const|let|var)\s+{escaped}\s*=)"
        )) else {
            continue;
        };

        for (idx, line) in lines.iter().enumerate() {
            if declaration.is_match(line) {
                continue;
            }
            for _ in call.find_iter(line) {
                record_call(&mut calls, name, idx as u32 + 1, None);
            }
        }
    }

    calls
}
