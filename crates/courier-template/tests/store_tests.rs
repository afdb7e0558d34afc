// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File-backed template store tests.

use std::collections::BTreeMap;
use std::io::Write;

use courier_core::{HealthStatus, PluginAdapter, TemplateStore};
use courier_template::{JsonTemplateStore, render};

fn write_templates(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn loads_and_renders_from_disk() {
    let file = write_templates(
        r#"[
            {"id": "promo", "name": "Promo", "body": "Hello {{ name }} from {{company}}"},
            {"id": "bye", "name": "Bye", "body": "Bye"}
        ]"#,
    );
    let store = JsonTemplateStore::new(file.path());
    assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);

    let templates = store.load_templates().await.unwrap();
    assert_eq!(templates.len(), 2);

    let mut fields = BTreeMap::new();
    fields.insert("name".to_string(), "Ana".to_string());
    fields.insert("company".to_string(), "ACME".to_string());
    assert_eq!(
        render(&templates["promo"].body, &fields),
        "Hello Ana from ACME"
    );
}

#[tokio::test]
async fn reload_picks_up_edits() {
    let file = write_templates(r#"[{"id": "t", "body": "v1"}]"#);
    let store = JsonTemplateStore::new(file.path());
    assert_eq!(store.load_templates().await.unwrap()["t"].body, "v1");

    std::fs::write(file.path(), r#"[{"id": "t", "body": "v2"}]"#).unwrap();
    assert_eq!(store.load_templates().await.unwrap()["t"].body, "v2");
}
