use std::sync::Arc;

use codescope::core::graph::GraphBuilder;
use codescope::core::metrics::mark_dead_code;
use codescope::core::parser::SourceParser;
use codescope::core::pipeline::{AnalysisPipeline, NoProgress};
use codescope::core::repository::InMemoryRepositoryClient;
use codescope::core::types::{Connection, FileRecord};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::fixtures::{helper_repository, lines_at, nine_file_repository, repo_id};

/// Parse `sources` into analyzed records, the way the pipeline fills them.
fn analyzed(sources: &[(&str, String)]) -> Vec<FileRecord> {
    let parser = SourceParser::new();
    sources
        .iter()
        .map(|(path, content)| {
            let parsed = parser.parse(content, path);
            let mut record = FileRecord::from_path(*path, content.len() as u64, true);
            record.content = Some(content.clone());
            record.functions = Some(parsed.functions);
            record.variables = Some(parsed.variables);
            record.complexity = Some(parsed.complexity);
            record.raw_imports = Some(parsed.imports);
            record
        })
        .collect()
}

#[tokio::test]
async fn call_edge_points_from_definer_to_caller() {
    let result = AnalysisPipeline::new(Arc::new(helper_repository()))
        .analyze(&repo_id(), &NoProgress)
        .await
        .unwrap();

    assert_eq!(
        result.connections,
        vec![
            Connection {
                source: "a.ts".into(),
                target: "b.ts".into(),
                function: "helper".into(),
                count: 2,
                lines: vec![10, 20],
            },
            Connection {
                source: "b.ts".into(),
                target: "a.ts".into(),
                function: "import".into(),
                count: 1,
                lines: vec![],
            },
        ]
    );

    let helper = result.functions().find(|f| f.name == "helper").unwrap();
    assert_eq!(helper.total_calls, 2);
    assert!(!helper.is_dead);
    assert!(helper
        .call_sites
        .iter()
        .all(|site| site.file.as_deref() == Some("b.ts")));
}

#[test]
fn exported_function_without_callers_is_dead() {
    let mut files = analyzed(&[
        ("a.ts", "export function foo() {\n  return 1;\n}\n".to_string()),
        ("b.ts", "export const b = 1;\n".to_string()),
    ]);
    GraphBuilder::new().build(&mut files);
    assert_eq!(mark_dead_code(&mut files), 1);
    let foo = &files[0].functions.as_ref().unwrap()[0];
    assert!(foo.is_dead);
    assert_eq!(foo.total_calls, 0);

    let mut files = analyzed(&[
        ("a.ts", "export function foo() {\n  return 1;\n}\n".to_string()),
        ("b.ts", "import { foo } from './a';\nexport const b = foo();\n".to_string()),
    ]);
    let connections = GraphBuilder::new().build(&mut files);
    assert_eq!(mark_dead_code(&mut files), 0);
    let foo = &files[0].functions.as_ref().unwrap()[0];
    assert!(!foo.is_dead);
    assert_eq!(foo.total_calls, 1);
    assert!(connections
        .iter()
        .any(|c| c.function == "foo" && c.source == "a.ts" && c.target == "b.ts"));
}

#[test]
fn dead_flag_matches_incoming_call_edges() {
    let mut files = analyzed(&[
        ("lib/math.ts", "export function add(a, b) {\n  return a + b;\n}\n\nexport function sub(a, b) {\n  return a - b;\n}\n".to_string()),
        ("lib/util.py", "def unused():\n    return 1\n\ndef used():\n    return 2\n".to_string()),
        (
            "app.ts",
            lines_at(&[
                (1, "import { add } from './lib/math';"),
                (3, "export const total = add(1, 2);"),
            ]),
        ),
        ("main.py", "from lib.util import used\n\nprint(used())\n".to_string()),
    ]);
    let connections = GraphBuilder::new().build(&mut files);
    mark_dead_code(&mut files);

    for file in &files {
        for function in file.functions.iter().flatten().filter(|f| f.is_top_level) {
            let has_edge = connections.iter().any(|c| {
                !c.is_import() && c.function == function.name && c.source == function.file
            });
            assert_eq!(function.is_dead, !has_edge, "{} in {}", function.name, function.file);
        }
    }
}

#[tokio::test]
async fn repeated_runs_are_identical() {
    let pipeline = AnalysisPipeline::new(Arc::new(nine_file_repository()));
    let first = pipeline.analyze(&repo_id(), &NoProgress).await.unwrap();
    let second = pipeline.analyze(&repo_id(), &NoProgress).await.unwrap();

    assert_eq!(first.connections, second.connections);
    assert_eq!(first.stats, second.stats);
    assert_eq!(first.patterns, second.patterns);
    assert_eq!(first.stats.dead, 0);
    assert_eq!(first.stats.connections, 18);
}

fn ring_sources() -> Vec<(&'static str, String)> {
    vec![
        ("src/a.ts", "import { b } from './b';\nexport function a() {\n  return b() + b();\n}\n".to_string()),
        ("src/b.ts", "import { c } from './c';\nexport function b() {\n  return c();\n}\n".to_string()),
        ("src/c.ts", "import { a } from './a';\nexport function c() {\n  return a();\n}\n".to_string()),
        ("src/d.ts", "import { a, b } from './a';\nexport const d = a() + b();\n".to_string()),
        ("src/e.ts", "export function lonely() {\n  return 0;\n}\n".to_string()),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn connections_do_not_depend_on_file_order(
        order in Just((0..5usize).collect::<Vec<_>>()).prop_shuffle()
    ) {
        let sources = ring_sources();
        let mut baseline = analyzed(&sources);
        let expected = GraphBuilder::new().build(&mut baseline);

        let shuffled: Vec<(&str, String)> = order.iter().map(|&i| sources[i].clone()).collect();
        let mut files = analyzed(&shuffled);
        let connections = GraphBuilder::new().build(&mut files);

        prop_assert_eq!(connections, expected);
    }
}

#[tokio::test]
async fn in_memory_snapshot_reanalysis_matches() {
    let pipeline = AnalysisPipeline::new(Arc::new(helper_repository()));
    let first = pipeline.analyze(&repo_id(), &NoProgress).await.unwrap();

    let replay = InMemoryRepositoryClient::from_records(&first.files);
    let again = AnalysisPipeline::new(Arc::new(replay))
        .analyze(&repo_id(), &NoProgress)
        .await
        .unwrap();
    assert_eq!(again.connections, first.connections);
    assert_eq!(again.stats, first.stats);
}
