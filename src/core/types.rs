use serde::{Deserialize, Serialize};
use std::fmt;

/// One repository file. Metadata is filled at listing time, the optional
/// analysis fields only for code files whose content was fetched and parsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub path: String,
    pub name: String,
    pub folder: String,
    pub size: u64,
    pub is_code: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<FunctionDef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Vec<VariableDef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Complexity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_imports: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_issues: Option<Vec<SecurityIssue>>,
}

impl FileRecord {
    /// Build a metadata-only record from a POSIX-style relative path.
    pub fn from_path(path: impl Into<String>, size: u64, is_code: bool) -> Self {
        let path = path.into();
        let (folder, name) = match path.rfind('/') {
            Some(idx) => (path[..idx].to_string(), path[idx + 1..].to_string()),
            None => ("root".to_string(), path.clone()),
        };

        Self {
            path,
            name,
            folder,
            size,
            is_code,
            content: None,
            line_count: None,
            functions: None,
            variables: None,
            complexity: None,
            raw_imports: None,
            security_issues: None,
        }
    }

    /// Whether the analysis phase populated this record.
    pub fn is_analyzed(&self) -> bool {
        self.content.is_some()
    }

    /// Folder used for relative import resolution (empty for top-level files).
    pub fn parent_dir(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[..idx],
            None => "",
        }
    }

    pub fn function_count(&self) -> usize {
        self.functions.as_ref().map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    Function,
    Arrow,
    Method,
}

/// Where a function was called from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct CallSite {
    pub line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// A function, method or named function expression discovered in one file.
///
/// Identity is `(file, name, line)`; the same name may be defined in many files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDef {
    pub name: String,
    pub file: String,
    pub line: u32,
    pub code: String,
    #[serde(rename = "type")]
    pub kind: FunctionKind,
    pub is_top_level: bool,
    #[serde(default)]
    pub is_class_method: bool,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default)]
    pub returns_value: bool,
    #[serde(default)]
    pub call_sites: Vec<CallSite>,
    #[serde(default)]
    pub total_calls: u32,
    #[serde(default)]
    pub is_dead: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Const,
    Let,
    Var,
    Unknown,
}

impl VariableKind {
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "const" => Self::Const,
            "let" => Self::Let,
            "var" => Self::Var,
            _ => Self::Unknown,
        }
    }
}

/// Shallow shape of a variable's initializer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Boolean,
    Null,
    Array,
    Object,
    Function,
    Call,
    Instance,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VariableDef {
    pub name: String,
    pub file: String,
    pub line: u32,
    pub kind: VariableKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    pub is_top_level: bool,
    #[serde(default)]
    pub usage_lines: Vec<u32>,
    #[serde(default)]
    pub total_usages: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Complexity {
    pub score: u32,
    pub level: ComplexityLevel,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// One heuristic security finding on one line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecurityIssue {
    pub severity: Severity,
    pub title: String,
    pub file: String,
    pub line: u32,
    pub desc: String,
    pub code: String,
}

/// Graph edge. `function == "import"` marks an import edge (importer -> imported file);
/// any other value is a call edge pointing from the defining file to the calling file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Connection {
    pub source: String,
    pub target: String,
    #[serde(rename = "fn")]
    pub function: String,
    pub count: u32,
    #[serde(default)]
    pub lines: Vec<u32>,
}

impl Connection {
    pub const IMPORT: &'static str = "import";

    pub fn is_import(&self) -> bool {
        self.function == Self::IMPORT
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PatternKind {
    Singleton,
    Factory,
    Observer,
    Provider,
    Hook,
    Component,
}

impl PatternKind {
    pub const ALL: [PatternKind; 6] = [
        Self::Singleton,
        Self::Factory,
        Self::Observer,
        Self::Provider,
        Self::Hook,
        Self::Component,
    ];

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Component => "🧩",
            Self::Hook => "🪝",
            _ => "🏗️",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Singleton => "Singleton",
            Self::Factory => "Factory",
            Self::Observer => "Observer",
            Self::Provider => "Provider",
            Self::Hook => "Hook",
            Self::Component => "Component",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PatternSeverity {
    #[default]
    Info,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatternFile {
    pub name: String,
    pub path: String,
    pub fns: usize,
    pub lines: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pattern {
    pub name: PatternKind,
    pub icon: String,
    pub desc: String,
    #[serde(default)]
    pub severity: PatternSeverity,
    pub files: Vec<PatternFile>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisStats {
    pub files: usize,
    pub code_files: usize,
    pub functions: usize,
    pub dead: usize,
    pub connections: usize,
    pub avg_complexity: u32,
    pub total_lines: usize,
}

/// The serializable artifact handed to presentation layers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub files: Vec<FileRecord>,
    pub connections: Vec<Connection>,
    pub stats: AnalysisStats,
    pub patterns: Vec<Pattern>,
    pub security_issues: Vec<SecurityIssue>,
}

impl AnalysisResult {
    pub fn file(&self, path: &str) -> Option<&FileRecord> {
        self.files.iter().find(|f| f.path == path)
    }

    /// All function definitions across every analyzed file.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.files
            .iter()
            .filter_map(|f| f.functions.as_ref())
            .flatten()
    }

    pub fn dead_functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.functions().filter(|f| f.is_dead)
    }
}
