use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::constants::complexity::{HIGH_ABOVE, MEDIUM_ABOVE};
use crate::core::types::{Complexity, ComplexityLevel};

/// Branch-shaped tokens, each occurrence adding one to the score.
/// `else if` is counted on top of its `if`.
static BRANCHES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\bif\s*\(",
        r"\belse\s+if\s*\(",
        r"\bwhile\s*\(",
        r"\bfor\s*\(",
        r"\bcase\s+",
        r"\bcatch\s*\(",
        r"\?\s*[^:]+\s*:",
        r"&&",
        r"\|\|",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Scores strictly above `medium_above` are medium, above `high_above` high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityThresholds {
    pub medium_above: u32,
    pub high_above: u32,
}

impl Default for ComplexityThresholds {
    fn default() -> Self {
        Self {
            medium_above: MEDIUM_ABOVE,
            high_above: HIGH_ABOVE,
        }
    }
}

impl ComplexityThresholds {
    pub fn level(&self, score: u32) -> ComplexityLevel {
        if score > self.high_above {
            ComplexityLevel::High
        } else if score > self.medium_above {
            ComplexityLevel::Medium
        } else {
            ComplexityLevel::Low
        }
    }
}

/// Textual cyclomatic estimate: 1 plus one per branch token. Empty input scores 0.
pub fn score(source: &str) -> u32 {
    if source.is_empty() {
        return 0;
    }
    1 + BRANCHES
        .iter()
        .map(|re| re.find_iter(source).count() as u32)
        .sum::<u32>()
}

pub fn measure(source: &str, thresholds: &ComplexityThresholds) -> Complexity {
    let score = score(source);
    Complexity {
        score,
        level: thresholds.level(score),
    }
}
