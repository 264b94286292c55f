use crate::core::types::FileRecord;

/// Maps raw import strings onto known file paths.
///
/// Candidates are tried in path order, so the first match is stable across runs.
/// External packages simply fail to resolve.
pub struct ImportResolver<'a> {
    paths: Vec<&'a str>,
}

fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..name_start + dot],
        _ => path,
    }
}

/// `a == b` or `a` ends with `/b`.
fn ends_with_segments(path: &str, suffix: &str) -> bool {
    path == suffix
        || (path.len() > suffix.len()
            && path.ends_with(suffix)
            && path.as_bytes()[path.len() - suffix.len() - 1] == b'/')
}

/// Join `relative` onto `dir`, folding `.` and `..` segments. `None` if it climbs above the root.
fn join_relative(dir: &str, relative: &str) -> Option<String> {
    let mut segments: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
    for part in relative.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments.join("/"))
}

impl<'a> ImportResolver<'a> {
    pub fn new(files: &'a [FileRecord]) -> Self {
        let mut paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        paths.sort_unstable();
        Self { paths }
    }

    pub fn resolve(&self, importer: &str, raw: &str) -> Option<&'a str> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let dir = importer.rfind('/').map_or("", |i| &importer[..i]);

        if raw.starts_with("./") || raw.starts_with("../") {
            let joined = join_relative(dir, raw)?;
            return self.find(importer, |path| {
                let bare = strip_extension(path);
                path == joined || bare == joined || bare == format!("{joined}/index")
            });
        }

        if importer.ends_with(".py") && !raw.contains('/') {
            let target = python_module_path(dir, raw)?;
            return self.find(importer, |path| {
                let bare = strip_extension(path);
                ends_with_segments(bare, &target) || bare == format!("{target}/__init__")
            });
        }

        self.find(importer, |path| {
            ends_with_segments(path, raw) || ends_with_segments(strip_extension(path), raw)
        })
    }

    fn find(&self, importer: &str, matches: impl Fn(&str) -> bool) -> Option<&'a str> {
        self.paths
            .iter()
            .copied()
            .find(|path| *path != importer && matches(path))
    }
}

/// `pkg.mod` -> `pkg/mod`; leading dots climb from the importer's package.
fn python_module_path(dir: &str, module: &str) -> Option<String> {
    let dots = module.chars().take_while(|c| *c == '.').count();
    let dotted = &module[dots..];
    if dotted.is_empty() {
        return None;
    }
    let slashed = dotted.replace('.', "/");
    if dots == 0 {
        return Some(slashed);
    }

    let mut base: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
    for _ in 1..dots {
        base.pop()?;
    }
    base.push(&slashed);
    Some(base.join("/"))
}
