//! Test fixtures for integration tests.

use std::path::{Path, PathBuf};

use serde_json::json;

/// Two biology and two physics abstracts, QASPER layout.
pub fn qasper_corpus() -> serde_json::Value {
    json!({
        "bio-1": {"title": "Protein folding", "abstract": "Chains fold into shapes."},
        "phy-1": {"title": "Black holes", "abstract": "Event horizons trap light."},
        "bio-2": {"title": "Gene regulation", "abstract": "Switches control expression."},
        "phy-2": {"title": "Dark matter", "abstract": "Mass we cannot see."},
        "misc-1": {"title": "Survey methods", "abstract": "Asking questions well."}
    })
}

pub fn anchors() -> serde_json::Value {
    json!([
        {"category": "Biology", "document_id": "bio-1"},
        {"category": "Physics", "document_id": "phy-1"}
    ])
}

pub fn write_json(dir: &Path, name: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

/// Axis 0 is biology, axis 1 physics, axis 2 everything else.
pub fn vector_for(id: &str) -> Vec<f32> {
    match id {
        "bio-1" => vec![1.0, 0.0, 0.0],
        "bio-2" => vec![0.9, 0.1, 0.1],
        "phy-1" => vec![0.0, 1.0, 0.0],
        "phy-2" => vec![0.1, 0.9, 0.1],
        _ => vec![0.2, 0.2, 0.9],
    }
}
