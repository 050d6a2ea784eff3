//! Every runtime dependency of riskmap-controls is referenced from `src/`.

use std::path::Path;

fn source_text() -> String {
    let src = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut text = String::new();
    for entry in std::fs::read_dir(src).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|e| e.to_str()) == Some("rs") {
            text.push_str(&std::fs::read_to_string(&path).unwrap());
        }
    }
    text
}

#[test]
fn runtime_dependencies_are_used() {
    let manifest =
        std::fs::read_to_string(Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml")).unwrap();
    let doc: toml::Value = manifest.parse().unwrap();
    let deps = doc["dependencies"].as_table().unwrap();
    let text = source_text();

    for name in deps.keys() {
        let ident = name.replace('-', "_");
        assert!(
            text.contains(&format!("{ident}::")),
            "dependency {name} is not referenced from src/"
        );
    }
}

#[test]
fn json_and_tracing_are_dev_only() {
    let manifest =
        std::fs::read_to_string(Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml")).unwrap();
    let doc: toml::Value = manifest.parse().unwrap();
    assert!(doc["dependencies"].get("serde_json").is_none());
    assert!(doc["dependencies"].get("tracing").is_none());
    assert!(doc["dev-dependencies"].get("serde_json").is_some());
}
