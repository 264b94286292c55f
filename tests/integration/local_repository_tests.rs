use std::fs;
use std::sync::Arc;

use codescope::config::CodeScopeConfig;
use codescope::core::pipeline::{AnalysisPipeline, NoProgress};
use codescope::core::repository::LocalRepositoryClient;
use codescope::core::types::PatternKind;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn checkout() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    for sub in ["src/hooks", "src/components", "node_modules/left-pad", "tests"] {
        fs::create_dir_all(root.join(sub)).unwrap();
    }

    fs::write(
        root.join("src/hooks/useCounter.ts"),
        "export function useCounter() {\n  return 0;\n}\n",
    )
    .unwrap();
    fs::write(
        root.join("src/components/Counter.tsx"),
        "import { useCounter } from '../hooks/useCounter';\n\nexport function Counter() {\n  const value = useCounter();\n  return value;\n}\n",
    )
    .unwrap();
    fs::write(
        root.join("src/index.ts"),
        "import { Counter } from './components/Counter';\n\nCounter();\n",
    )
    .unwrap();
    fs::write(root.join("tests/counter.test.ts"), "export function check() {}\n").unwrap();
    fs::write(root.join("node_modules/left-pad/index.js"), "module.exports = 1;\n").unwrap();
    dir
}

#[tokio::test]
async fn analyzes_a_local_checkout() {
    let dir = checkout();
    let client = LocalRepositoryClient::new(dir.path());
    let repo = client.repository_id();
    assert_eq!(repo.owner, "local");

    let result = AnalysisPipeline::new(Arc::new(client))
        .analyze(&repo, &NoProgress)
        .await
        .unwrap();

    let paths: Vec<&str> = result.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "src/components/Counter.tsx",
            "src/hooks/useCounter.ts",
            "src/index.ts",
            "tests/counter.test.ts",
        ]
    );

    let edges: Vec<(&str, &str, &str)> = result
        .connections
        .iter()
        .map(|c| (c.source.as_str(), c.target.as_str(), c.function.as_str()))
        .collect();
    assert!(edges.contains(&(
        "src/hooks/useCounter.ts",
        "src/components/Counter.tsx",
        "useCounter"
    )));
    assert!(edges.contains(&("src/components/Counter.tsx", "src/index.ts", "Counter")));
    assert!(edges.contains(&("src/index.ts", "src/components/Counter.tsx", "import")));

    let dead: Vec<&str> = result.dead_functions().map(|f| f.name.as_str()).collect();
    assert_eq!(dead, vec!["check"]);

    let hooks = result
        .patterns
        .iter()
        .find(|p| p.name == PatternKind::Hook)
        .unwrap();
    assert_eq!(hooks.files[0].path, "src/hooks/useCounter.ts");
}

#[tokio::test]
async fn config_exclusions_apply_to_local_walks() {
    let dir = checkout();
    let config = CodeScopeConfig::from_toml_str(
        "[scan]\nexclude_patterns = [\"tests/*\"]\n",
        std::path::Path::new("inline.toml"),
    )
    .unwrap();

    let client = LocalRepositoryClient::new(dir.path()).with_filter(config.file_filter().unwrap());
    let repo = client.repository_id();
    let result = AnalysisPipeline::with_options(Arc::new(client), config.pipeline_options())
        .analyze(&repo, &NoProgress)
        .await
        .unwrap();

    assert!(result.file("tests/counter.test.ts").is_none());
    assert_eq!(result.stats.files, 3);
    assert_eq!(result.stats.dead, 0);
}
