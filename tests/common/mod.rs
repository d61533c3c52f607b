#![allow(dead_code)]

pub mod fixtures;

use std::io::Write;
use tempfile::NamedTempFile;

/// JSON file in the system temp directory, removed when dropped.
pub fn temp_json(name: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix(&format!("fleetmetrics_{}_", name))
        .suffix(".json")
        .tempfile()
        .expect("Failed to create temporary JSON file");
    file.write_all(content.as_bytes())
        .expect("Failed to write temporary JSON file");
    file.flush().expect("Failed to flush temporary JSON file");
    file
}
