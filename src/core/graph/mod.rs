//! Dependency graph construction.
//!
//! Two passes over the analyzed files:
//!
//! 1. [`SymbolTable::build`] indexes every function definition by name.
//! 2. Each file is resolved independently (in parallel) against the frozen table,
//!    and the per-file results are folded into a [`ResolutionContext`] keyed by
//!    `(source, target, fn)`.
//!
//! Call edges point from the file that **defines** a function to the file that
//! **calls** it. Import edges point from the importing file to the imported one.

pub mod imports;
pub mod symbols;

use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::core::call_resolver::{self, CallMap};
use crate::core::types::{CallSite, Connection, FileRecord};

pub use imports::ImportResolver;
pub use symbols::{DefinitionRef, SymbolTable};

type EdgeKey = (String, String, String);

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct EdgeAccumulator {
    count: u32,
    lines: Vec<u32>,
}

/// Mutable state of the resolution pass.
///
/// Every update is a lookup-or-insert on a key, so merging contexts in any
/// order gives the same result.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    edges: BTreeMap<EdgeKey, EdgeAccumulator>,
    call_sites: HashMap<DefinitionRef, (u32, Vec<CallSite>)>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an import edge unless one already exists.
    pub fn add_import(&mut self, importer: &str, imported: &str) {
        self.edges
            .entry((
                importer.to_string(),
                imported.to_string(),
                Connection::IMPORT.to_string(),
            ))
            .or_insert(EdgeAccumulator {
                count: 1,
                lines: Vec::new(),
            });
    }

    /// Fold the calls found in `caller_file` into edges and definition bookkeeping.
    pub fn add_calls(&mut self, table: &SymbolTable, caller_file: &str, calls: &CallMap) {
        for (name, info) in calls {
            for def in table.definitions(name) {
                let definer = table.file_path(*def);
                if definer == caller_file {
                    continue;
                }

                let edge = self
                    .edges
                    .entry((definer.to_string(), caller_file.to_string(), name.clone()))
                    .or_default();
                edge.count += info.total_calls;
                edge.lines.extend(info.call_sites.iter().map(|site| site.line));

                let (total, sites) = self.call_sites.entry(*def).or_default();
                *total += info.total_calls;
                sites.extend(info.call_sites.iter().map(|site| CallSite {
                    line: site.line,
                    caller: site.caller.clone(),
                    file: Some(caller_file.to_string()),
                }));
            }
        }
    }

    pub fn merge(mut self, other: ResolutionContext) -> Self {
        for (key, acc) in other.edges {
            let is_import = key.2 == Connection::IMPORT;
            match self.edges.get_mut(&key) {
                Some(existing) if !is_import => {
                    existing.count += acc.count;
                    existing.lines.extend(acc.lines);
                }
                Some(_) => {}
                None => {
                    self.edges.insert(key, acc);
                }
            }
        }
        for (def, (total, sites)) in other.call_sites {
            let entry = self.call_sites.entry(def).or_default();
            entry.0 += total;
            entry.1.extend(sites);
        }
        self
    }

    /// Sorted connections; each edge's `lines` sorted too.
    pub fn connections(&self) -> Vec<Connection> {
        self.edges
            .iter()
            .map(|((source, target, function), acc)| {
                let mut lines = acc.lines.clone();
                lines.sort_unstable();
                Connection {
                    source: source.clone(),
                    target: target.clone(),
                    function: function.clone(),
                    count: acc.count,
                    lines,
                }
            })
            .collect()
    }

    /// Write call totals and sites back onto the definitions they belong to.
    pub fn apply_call_sites(&self, files: &mut [FileRecord]) {
        for file in files.iter_mut() {
            if let Some(functions) = file.functions.as_mut() {
                for function in functions.iter_mut() {
                    function.call_sites.clear();
                    function.total_calls = 0;
                }
            }
        }

        for (def, (total, sites)) in &self.call_sites {
            let Some(function) = files
                .get_mut(def.file)
                .and_then(|f| f.functions.as_mut())
                .and_then(|fns| fns.get_mut(def.function))
            else {
                continue;
            };
            let mut sites = sites.clone();
            sites.sort_by(|a, b| {
                a.file
                    .cmp(&b.file)
                    .then(a.line.cmp(&b.line))
                    .then_with(|| a.caller.cmp(&b.caller))
            });
            function.total_calls = *total;
            function.call_sites = sites;
        }
    }
}

/// Everything pass 2 learns about one file.
struct FileResolution<'a> {
    path: &'a str,
    imports: Vec<&'a str>,
    calls: CallMap,
}

#[derive(Debug, Default)]
pub struct GraphBuilder;

impl GraphBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the connection list and backfill `callSites`/`totalCalls` on `files`.
    pub fn build(&self, files: &mut [FileRecord]) -> Vec<Connection> {
        let table = SymbolTable::build(files);
        debug!(
            names = table.names().len(),
            definitions = table.definition_count(),
            "symbol table built"
        );

        let context = self.resolve(files, &table);
        context.apply_call_sites(files);

        let connections = context.connections();
        info!(connections = connections.len(), "dependency graph built");
        connections
    }

    /// Pass 2. `files` is only read here.
    pub fn resolve(&self, files: &[FileRecord], table: &SymbolTable) -> ResolutionContext {
        let resolver = ImportResolver::new(files);

        files
            .par_iter()
            .filter_map(|file| {
                let content = file.content.as_deref()?;
                Some(resolve_file(file, content, &resolver, table))
            })
            .fold(ResolutionContext::new, |mut context, resolution| {
                for imported in &resolution.imports {
                    context.add_import(resolution.path, imported);
                }
                context.add_calls(table, resolution.path, &resolution.calls);
                context
            })
            .reduce(ResolutionContext::new, ResolutionContext::merge)
    }
}

fn resolve_file<'a>(
    file: &'a FileRecord,
    content: &str,
    resolver: &ImportResolver<'a>,
    table: &SymbolTable,
) -> FileResolution<'a> {
    let imports = file
        .raw_imports
        .iter()
        .flatten()
        .filter_map(|raw| resolver.resolve(&file.path, raw))
        .collect();

    FileResolution {
        path: &file.path,
        imports,
        calls: call_resolver::find_calls(content, &file.path, table.names()),
    }
}
