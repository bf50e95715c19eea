//! Test fixture loading utilities

use std::path::PathBuf;

use linkage_core::{Entity, EntityRecord, LinkConfig, LinkedGroup};

/// Get the path to a fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_fixtures")
        .join(name)
}

/// Load a fixture file as a string
pub fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", name))
}

/// Load the character graph as loading records
#[allow(dead_code)]
pub fn graph_records() -> Vec<EntityRecord> {
    serde_json::from_str(&load_fixture("graph.json")).expect("graph fixture should parse")
}

/// A group built from the fixture configuration, without data
#[allow(dead_code)]
pub fn configured_group() -> LinkedGroup {
    let config = LinkConfig::load(&fixture_path("linked.toml")).expect("fixture config is valid");
    LinkedGroup::new(config).expect("fixture config registers")
}

/// Five points on the diagonal, entity `i` at `(i, i)`
#[allow(dead_code)]
pub fn diagonal() -> Vec<Entity> {
    (1..=5usize)
        .map(|i| Entity::new(i).at(i as f64, i as f64))
        .collect()
}
