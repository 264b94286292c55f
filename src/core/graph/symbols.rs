use std::collections::{HashMap, HashSet};

use crate::core::types::FileRecord;

/// Position of one function definition: `files[file].functions[function]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionRef {
    pub file: usize,
    pub function: usize,
}

/// Global `name -> definitions` index built once before call resolution.
///
/// Read-only after [`SymbolTable::build`], so pass 2 can share it across threads.
#[derive(Debug, Default)]
pub struct SymbolTable {
    by_name: HashMap<String, Vec<DefinitionRef>>,
    names: HashSet<String>,
    paths: Vec<String>,
}

impl SymbolTable {
    pub fn build(files: &[FileRecord]) -> Self {
        let mut table = Self {
            paths: files.iter().map(|f| f.path.clone()).collect(),
            ..Self::default()
        };

        for (file_idx, file) in files.iter().enumerate() {
            let Some(functions) = &file.functions else {
                continue;
            };
            for (fn_idx, function) in functions.iter().enumerate() {
                table
                    .by_name
                    .entry(function.name.clone())
                    .or_default()
                    .push(DefinitionRef {
                        file: file_idx,
                        function: fn_idx,
                    });
                table.names.insert(function.name.clone());
            }
        }

        table
    }

    /// Every function name defined anywhere.
    pub fn names(&self) -> &HashSet<String> {
        &self.names
    }

    pub fn definitions(&self, name: &str) -> &[DefinitionRef] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn file_path(&self, def: DefinitionRef) -> &str {
        &self.paths[def.file]
    }

    /// Total number of definitions, counting duplicates by name.
    pub fn definition_count(&self) -> usize {
        self.by_name.values().map(Vec::len).sum()
    }
}
