/// Shared constants for listing, fetching and scoring.
///
/// Extension lists and ignored directories mirror what the analysis front end
/// has always filtered on, so snapshots stay comparable across versions.

/// File classification by extension
pub mod extensions {
    /// Extensions counted as source code.
    pub const CODE: &[&str] = &[
        ".js", ".jsx", ".ts", ".tsx", ".mjs", ".cjs", ".py", ".java", ".go", ".rb", ".php",
        ".vue", ".svelte", ".rs", ".c", ".cpp", ".cc", ".h", ".hpp", ".cs", ".swift", ".kt",
        ".kts", ".scala", ".clj", ".ex", ".exs", ".erl", ".hs", ".lua", ".r", ".jl", ".dart",
        ".elm", ".fs", ".fsx", ".ml", ".pl", ".pm", ".sh", ".bash", ".zsh", ".fish", ".ps1",
        ".psm1", ".groovy", ".gradle",
    ];

    /// Binary extensions never listed at all.
    pub const BINARY: &[&str] = &[
        ".png", ".jpg", ".jpeg", ".gif", ".ico", ".webp", ".bmp", ".woff", ".woff2", ".ttf",
        ".eot", ".otf", ".pdf", ".zip", ".tar", ".gz", ".rar", ".7z", ".exe", ".dll", ".so",
        ".dylib", ".bin", ".dat", ".db", ".sqlite", ".mp3", ".mp4", ".wav", ".avi", ".mov",
        ".webm",
    ];

    /// Case-insensitive suffix test against an extension list.
    pub fn has_any(name: &str, list: &[&str]) -> bool {
        let lower = name.to_lowercase();
        list.iter().any(|ext| lower.ends_with(ext))
    }

    pub fn is_code(name: &str) -> bool {
        has_any(name, CODE)
    }

    pub fn is_binary(name: &str) -> bool {
        has_any(name, BINARY)
    }
}

/// Directories skipped during listing (build output, dependency caches, VCS metadata)
pub const IGNORED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "vendor",
    "dist",
    "build",
    "__pycache__",
    ".next",
    "coverage",
    ".turbo",
    "out",
    ".vercel",
];

/// Limits applied by the pipeline
pub mod limits {
    /// Files at or above this many bytes are kept as metadata only.
    pub const MAX_FILE_SIZE: u64 = 200_000;
    /// Concurrent content fetches in flight.
    pub const MAX_CONCURRENT_FETCHES: usize = 10;
    /// Response cache lifetime in seconds.
    pub const CACHE_TTL_SECONDS: u64 = 300;
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;
    /// Maximum BFS depth for transitive blast radius.
    pub const BLAST_RADIUS_DEPTH: u32 = 3;
    /// Lines captured after a declaration when the extent is unknown.
    pub const SNIPPET_FALLBACK_LINES: usize = 10;
    /// Below this remaining budget, optional enrichment calls are skipped without a token.
    pub const ENRICHMENT_MIN_REMAINING: u32 = 20;
}

/// Complexity level thresholds (score strictly greater than the bound)
pub mod complexity {
    pub const MEDIUM_ABOVE: u32 = 15;
    pub const HIGH_ABOVE: u32 = 30;
}

/// Language identifiers used in logs and grammar errors
pub mod languages {
    pub const TYPESCRIPT: &str = "typescript";
    pub const JAVASCRIPT: &str = "javascript";
    pub const PYTHON: &str = "python";
    pub const RUST: &str = "rust";
    pub const GO: &str = "go";
    pub const JAVA: &str = "java";
    pub const RUBY: &str = "ruby";
    pub const PHP: &str = "php";
    pub const C: &str = "c";
}
