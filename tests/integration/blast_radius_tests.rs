use codescope::core::blast_radius::{blast_radius, BlastRadiusCalculator, ImpactLevel, ReachedFile};
use codescope::core::types::{Connection, FileRecord};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn edge(source: &str, target: &str) -> Connection {
    Connection {
        source: source.into(),
        target: target.into(),
        function: "f".into(),
        count: 1,
        lines: vec![1],
    }
}

fn records(paths: &[&str]) -> Vec<FileRecord> {
    paths.iter().map(|p| FileRecord::from_path(*p, 1, true)).collect()
}

#[test]
fn chain_stops_at_depth_three() {
    let connections = vec![edge("a", "b"), edge("b", "c"), edge("c", "d"), edge("d", "e")];
    let files = records(&["a", "b", "c", "d", "e"]);

    let radius = blast_radius("a", &connections, &files);
    assert_eq!(radius.affected, vec!["b".to_string()]);
    assert_eq!(
        radius.transitive,
        vec![
            ReachedFile { file: "b".into(), depth: 1 },
            ReachedFile { file: "c".into(), depth: 2 },
            ReachedFile { file: "d".into(), depth: 3 },
        ]
    );
    assert_eq!(radius.transitive_count, 3);
    assert_eq!(radius.depth, 3);
    assert_eq!(radius.level, ImpactLevel::Medium);
}

#[test]
fn shortcut_keeps_minimum_depth() {
    // a -> b -> c -> d, plus a -> d directly
    let connections = vec![edge("a", "b"), edge("b", "c"), edge("c", "d"), edge("a", "d")];
    let files = records(&["a", "b", "c", "d"]);

    let radius = blast_radius("a", &connections, &files);
    let d = radius.transitive.iter().find(|r| r.file == "d").unwrap();
    assert_eq!(d.depth, 1);
    assert_eq!(radius.count, 2);
    assert_eq!(radius.percent, 50);
}

#[test]
fn calculate_all_orders_by_centrality() {
    let connections = vec![edge("hub", "a"), edge("hub", "b"), edge("hub", "c"), edge("a", "b")];
    let files = records(&["hub", "a", "b", "c", "isolated"]);

    let all = BlastRadiusCalculator::new(&connections, &files).calculate_all();
    assert_eq!(all[0].file, "hub");
    assert!(all.iter().all(|r| r.file != "isolated"));
}

proptest! {
    #[test]
    fn reach_is_bounded_by_depth(
        edges in prop::collection::vec((0u8..12, 0u8..12), 0..40),
        origin in 0u8..12,
    ) {
        let connections: Vec<Connection> = edges
            .iter()
            .filter(|(s, t)| s != t)
            .map(|(s, t)| edge(&format!("f{s}"), &format!("f{t}")))
            .collect();
        let paths: Vec<String> = (0..12).map(|i| format!("f{i}")).collect();
        let files: Vec<FileRecord> = paths
            .iter()
            .map(|p| FileRecord::from_path(p.clone(), 1, true))
            .collect();

        let origin_path = format!("f{origin}");
        let radius = blast_radius(&origin_path, &connections, &files);
        let within_depth = radius.transitive.iter().all(|r| (1..=3).contains(&r.depth));
        let origin_excluded = radius.transitive.iter().all(|r| r.file != origin_path);
        prop_assert!(within_depth);
        prop_assert!(origin_excluded);
        prop_assert_eq!(radius.transitive.iter().filter(|r| r.depth == 1).count(), radius.count);
        prop_assert!(radius.depth <= 3);
    }
}
