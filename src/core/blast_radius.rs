use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::core::constants::limits::BLAST_RADIUS_DEPTH;
use crate::core::types::{Connection, FileRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl ImpactLevel {
    fn classify(direct: usize, fns_used: usize) -> Self {
        if direct >= 8 || fns_used >= 5 {
            Self::Critical
        } else if direct >= 4 || fns_used >= 3 {
            Self::High
        } else if direct >= 2 || fns_used >= 1 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        })
    }
}

/// A file reached by the breadth-first walk, at the shallowest depth it was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachedFile {
    pub file: String,
    pub depth: u32,
}

/// Impact of changing one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlastRadius {
    pub file: String,
    /// Direct dependents (depth 1).
    pub affected: Vec<String>,
    pub transitive: Vec<ReachedFile>,
    pub count: usize,
    pub transitive_count: usize,
    pub percent: u32,
    pub level: ImpactLevel,
    pub depth: u32,
    pub fns_used: usize,
    pub total_calls: u32,
    pub dependencies: Vec<String>,
    pub impact_score: f64,
    pub centrality: usize,
}

/// Adjacency built once from a connection list, reusable across many queries.
#[derive(Debug, Default)]
pub struct BlastRadiusCalculator {
    exported_to: BTreeMap<String, BTreeSet<String>>,
    imported_from: BTreeMap<String, BTreeSet<String>>,
    fn_usage: BTreeMap<String, BTreeMap<String, u32>>,
    connected_files: usize,
    max_depth: u32,
}

impl BlastRadiusCalculator {
    pub fn new(connections: &[Connection], files: &[FileRecord]) -> Self {
        Self::with_depth(connections, files, BLAST_RADIUS_DEPTH)
    }

    pub fn with_depth(connections: &[Connection], files: &[FileRecord], max_depth: u32) -> Self {
        let mut calc = Self {
            max_depth,
            ..Self::default()
        };

        for conn in connections {
            calc.exported_to
                .entry(conn.source.clone())
                .or_default()
                .insert(conn.target.clone());
            calc.imported_from
                .entry(conn.target.clone())
                .or_default()
                .insert(conn.source.clone());
            // Edges without a count still mean at least one use.
            *calc
                .fn_usage
                .entry(conn.source.clone())
                .or_default()
                .entry(conn.function.clone())
                .or_default() += conn.count.max(1);
        }

        calc.connected_files = files
            .iter()
            .filter(|f| calc.is_connected(&f.path))
            .count();
        calc
    }

    fn is_connected(&self, path: &str) -> bool {
        self.exported_to.contains_key(path) || self.imported_from.contains_key(path)
    }

    /// Every file that appears in any edge.
    pub fn connected_paths(&self) -> BTreeSet<&str> {
        self.exported_to
            .keys()
            .chain(self.imported_from.keys())
            .map(String::as_str)
            .collect()
    }

    pub fn calculate(&self, file: &str) -> BlastRadius {
        let direct: Vec<String> = self
            .exported_to
            .get(file)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();

        let transitive = self.walk(file, &direct);

        let usage = self.fn_usage.get(file);
        let fns_used = usage.map_or(0, BTreeMap::len);
        let total_calls = usage.map_or(0, |m| m.values().sum());

        let dependencies: Vec<String> = self
            .imported_from
            .get(file)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();

        let impact = direct.len() as f64
            + transitive
                .iter()
                .filter(|r| r.depth > 1)
                .map(|r| 1.0 / r.depth as f64)
                .sum::<f64>();

        let percent = if self.connected_files > 0 {
            (direct.len() as f64 / self.connected_files as f64 * 100.0).round() as u32
        } else {
            0
        };

        BlastRadius {
            file: file.to_string(),
            count: direct.len(),
            transitive_count: transitive.len(),
            percent,
            level: ImpactLevel::classify(direct.len(), fns_used),
            depth: transitive.iter().map(|r| r.depth).max().unwrap_or(0),
            fns_used,
            total_calls,
            centrality: direct.len() + dependencies.len() + fns_used,
            dependencies,
            impact_score: (impact * 10.0).round() / 10.0,
            affected: direct,
            transitive,
        }
    }

    /// Breadth-first from the direct dependents. The origin and direct dependents
    /// count as visited up front, so every file keeps its shallowest depth.
    fn walk(&self, origin: &str, direct: &[String]) -> Vec<ReachedFile> {
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(origin);
        visited.extend(direct.iter().map(String::as_str));

        let mut queue: VecDeque<(&str, u32)> = direct.iter().map(|f| (f.as_str(), 1)).collect();
        let mut reached = Vec::new();

        while let Some((file, depth)) = queue.pop_front() {
            if depth > self.max_depth {
                continue;
            }
            reached.push(ReachedFile {
                file: file.to_string(),
                depth,
            });
            for next in self.exported_to.get(file).into_iter().flatten() {
                if visited.insert(next.as_str()) {
                    queue.push_back((next.as_str(), depth + 1));
                }
            }
        }

        reached
    }

    /// Blast radius of every connected file, most central first.
    pub fn calculate_all(&self) -> Vec<BlastRadius> {
        let mut all: Vec<BlastRadius> = self
            .connected_paths()
            .into_iter()
            .map(|path| self.calculate(path))
            .collect();
        all.sort_by(|a, b| b.centrality.cmp(&a.centrality).then_with(|| a.file.cmp(&b.file)));
        all
    }
}

/// One-shot blast radius for `file`.
pub fn blast_radius(file: &str, connections: &[Connection], files: &[FileRecord]) -> BlastRadius {
    BlastRadiusCalculator::new(connections, files).calculate(file)
}

pub fn blast_radius_all(connections: &[Connection], files: &[FileRecord]) -> Vec<BlastRadius> {
    BlastRadiusCalculator::new(connections, files).calculate_all()
}
