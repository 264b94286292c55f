use crate::core::constants::languages;
use std::fmt;

/// Language families recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    TypeScript,
    Tsx,
    JavaScript,
    Python,
    Rust,
    Go,
    Java,
    CSharp,
    Ruby,
    Php,
    C,
    Unknown,
}

impl Language {
    pub fn from_path(path: &str) -> Self {
        let lower = path.to_lowercase();
        let ext = match lower.rsplit_once('.') {
            Some((_, ext)) => ext,
            None => return Self::Unknown,
        };

        match ext {
            "ts" | "mts" | "cts" => Self::TypeScript,
            "tsx" => Self::Tsx,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "py" => Self::Python,
            "rs" => Self::Rust,
            "go" => Self::Go,
            "java" => Self::Java,
            "cs" => Self::CSharp,
            "rb" => Self::Ruby,
            "php" => Self::Php,
            "c" | "cpp" | "cc" | "h" | "hpp" => Self::C,
            _ => Self::Unknown,
        }
    }

    /// JavaScript family, parsed by the TypeScript/TSX grammars.
    pub fn is_script(&self) -> bool {
        matches!(self, Self::TypeScript | Self::Tsx | Self::JavaScript)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TypeScript | Self::Tsx => languages::TYPESCRIPT,
            Self::JavaScript => languages::JAVASCRIPT,
            Self::Python => languages::PYTHON,
            Self::Rust => languages::RUST,
            Self::Go => languages::GO,
            Self::Java | Self::CSharp => languages::JAVA,
            Self::Ruby => languages::RUBY,
            Self::Php => languages::PHP,
            Self::C => languages::C,
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
