#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Manifest policy tests.
//!
//! Non-test code must stay panic-free, and the crate must keep building
//! without the WebSocket transport. Both are enforced through Cargo.toml, so
//! these tests parse it and fail if the policy drifts.

use std::path::PathBuf;

fn manifest() -> toml::Table {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read '{}': {e}", path.display()));
    text.parse::<toml::Table>()
        .unwrap_or_else(|e| panic!("Cargo.toml is not valid TOML: {e}"))
}

fn table<'a>(parent: &'a toml::Table, key: &str) -> &'a toml::Table {
    parent
        .get(key)
        .and_then(toml::Value::as_table)
        .unwrap_or_else(|| panic!("Cargo.toml is missing [{key}]"))
}

#[test]
fn panic_free_lints_are_denied() {
    let manifest = manifest();
    let clippy = table(table(&manifest, "lints"), "clippy");

    for lint in [
        "unwrap_used",
        "expect_used",
        "panic",
        "todo",
        "unimplemented",
        "indexing_slicing",
    ] {
        assert_eq!(
            clippy.get(lint).and_then(toml::Value::as_str),
            Some("deny"),
            "[lints.clippy] must deny `{lint}`"
        );
    }
}

#[test]
fn websocket_transport_is_default_but_optional() {
    let manifest = manifest();
    let features = table(&manifest, "features");

    let default: Vec<&str> = features["default"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(toml::Value::as_str)
        .collect();
    assert_eq!(default, ["transport-websocket"]);

    let deps = table(&manifest, "dependencies");
    for dep in ["tokio-tungstenite", "futures-util"] {
        let optional = table(deps, dep)
            .get("optional")
            .and_then(toml::Value::as_bool);
        assert_eq!(optional, Some(true), "`{dep}` must stay optional");
    }
}

#[test]
fn binary_requires_the_websocket_feature() {
    let manifest = manifest();
    let bins = manifest["bin"].as_array().expect("[[bin]] array");
    let bin = bins
        .iter()
        .filter_map(toml::Value::as_table)
        .find(|bin| bin.get("name").and_then(toml::Value::as_str) == Some("pong-bot-client"))
        .expect("pong-bot-client binary");

    let required: Vec<&str> = bin["required-features"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(toml::Value::as_str)
        .collect();
    assert_eq!(required, ["transport-websocket"]);
}
