use std::collections::HashSet;

use glob::Pattern;

use crate::core::constants::{extensions, IGNORED_DIRS};
use crate::core::errors::ConfigError;
use crate::core::types::FileRecord;

/// Decides which listed paths become [`FileRecord`]s.
#[derive(Debug, Clone)]
pub struct FileFilter {
    ignored_dirs: HashSet<String>,
    excludes: Vec<Pattern>,
}

impl Default for FileFilter {
    fn default() -> Self {
        Self {
            ignored_dirs: IGNORED_DIRS.iter().map(|d| d.to_string()).collect(),
            excludes: Vec::new(),
        }
    }
}

impl FileFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ignored_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_exclude_patterns(mut self, patterns: &[String]) -> Result<Self, ConfigError> {
        self.excludes = patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| ConfigError::InvalidValue {
                    field: "scan.exclude_patterns".to_string(),
                    reason: format!("{p}: {e}"),
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    /// Is any directory component of `path` (the file name aside) ignored?
    pub fn in_ignored_dir(&self, path: &str) -> bool {
        let mut parts: Vec<&str> = path.split('/').collect();
        parts.pop();
        parts.iter().any(|part| self.ignored_dirs.contains(*part))
    }

    pub fn is_dir_ignored(&self, dir_name: &str) -> bool {
        self.ignored_dirs.contains(dir_name)
    }

    pub fn includes(&self, path: &str) -> bool {
        let name = path.rsplit('/').next().unwrap_or(path);
        !self.in_ignored_dir(path)
            && !extensions::is_binary(name)
            && !self.excludes.iter().any(|p| p.matches(path))
    }

    /// Metadata record for an included path, `None` if filtered out.
    pub fn record(&self, path: &str, size: u64) -> Option<FileRecord> {
        if !self.includes(path) {
            return None;
        }
        let name = path.rsplit('/').next().unwrap_or(path);
        Some(FileRecord::from_path(path, size, extensions::is_code(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("src/index.ts", true)]
    #[test_case("node_modules/react/index.js", false)]
    #[test_case("packages/app/dist/bundle.js", false)]
    #[test_case("assets/logo.png", false)]
    #[test_case("dist", true ; "file named like an ignored dir")]
    #[test_case("README.md", true)]
    fn test_default_filter(path: &str, included: bool) {
        assert_eq!(FileFilter::new().includes(path), included);
    }

    #[test]
    fn test_exclude_patterns() {
        let filter = FileFilter::new()
            .with_exclude_patterns(&["**/*.test.ts".to_string(), "docs/*".to_string()])
            .unwrap();
        assert!(!filter.includes("src/a.test.ts"));
        assert!(!filter.includes("docs/guide.md"));
        assert!(filter.includes("src/a.ts"));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let result = FileFilter::new().with_exclude_patterns(&["[".to_string()]);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_record_classifies_code() {
        let filter = FileFilter::new();
        let record = filter.record("src/main.rs", 42).unwrap();
        assert!(record.is_code);
        assert_eq!(record.folder, "src");
        assert!(!filter.record("README.md", 1).unwrap().is_code);
        assert!(filter.record("vendor/x.go", 1).is_none());
    }
}
