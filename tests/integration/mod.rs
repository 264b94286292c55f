// Integration test modules
#[path = "../common/mod.rs"]
mod common;

mod blast_radius_tests;
mod graph_tests;
mod local_repository_tests;
mod pipeline_tests;
mod snapshot_tests;
