//! Integration tests for the classify → extract pipeline.

use pkghook::engine::{self, Candidate, TAG_PATH, classify};
use pkghook::error::{ClassificationError, EventError, ExtractionError};
use pkghook::model::{EventKind, EventVariant, FieldValue, LogRecord};
use pkghook::sink::MemorySink;
use serde_json::{Value, json};

fn run(raw: Value) -> Result<engine::Delivery, EventError> {
    engine::process_value(&raw)
}

fn missing(path: &str) -> EventError {
    EventError::Extraction(ExtractionError::MissingField(path.to_string()))
}

fn str_field<'a>(record: &'a LogRecord, name: &str) -> Option<&'a str> {
    match record.get(name) {
        Some(FieldValue::Str(value)) => Some(value.as_str()),
        _ => None,
    }
}

fn package_payload() -> Value {
    json!({
        "action": "published",
        "package": {
            "id": 1234,
            "name": "hello-world",
            "namespace": "octo-org",
            "description": "",
            "ecosystem": "CONTAINER",
            "package_type": "CONTAINER",
            "html_url": "https://github.com/orgs/octo-org/packages/container/package/hello-world",
            "created_at": "2024-01-01T00:00:00Z",
            "owner": {"login": "octo-org"},
            "registry": {
                "about_url": "https://docs.github.com/packages",
                "name": "GitHub CONTAINER registry",
                "type": "CONTAINER",
                "url": "https://ghcr.io/octo-org",
                "vendor": "GitHub Inc",
            },
            "package_version": {
                "id": 99,
                "version": "sha256:0123",
                "name": "sha256:0123",
                "summary": "",
                "installation_command": "docker pull ghcr.io/octo-org/hello-world:1.2.0",
                "container_metadata": {
                    "tag": {"name": "1.2.0", "digest": "sha256:0123"},
                    "labels": {},
                },
                "package_files": [],
            },
        },
        "repository": {"full_name": "octo-org/hello-world"},
    })
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn scenario_a_minimal_package() {
    let raw = json!({
        "package": {
            "name": "foo",
            "registry": {"url": "r"},
            "package_version": {
                "name": "1.0",
                "container_metadata": {"tag": {"name": "latest"}},
            },
        },
    });

    let delivery = run(raw).unwrap();
    assert_eq!(delivery.kind(), EventKind::Package);

    let fields: Vec<(&str, &FieldValue)> = delivery
        .record
        .fields()
        .iter()
        .map(|(name, value)| (name.as_str(), value))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("name", &FieldValue::from("foo")),
            ("registry.url", &FieldValue::from("r")),
            ("package_version.name", &FieldValue::from("1.0")),
            ("tag", &FieldValue::from("latest")),
        ]
    );
}

#[test]
fn scenario_b_empty_push() {
    let delivery = run(json!({"after": "abc", "before": "def", "commits": []})).unwrap();
    assert_eq!(delivery.kind(), EventKind::Push);
    assert_eq!(str_field(&delivery.record, "after"), Some("abc"));
    assert_eq!(str_field(&delivery.record, "before"), Some("def"));
    assert_eq!(
        delivery.record.get("commits_count"),
        Some(&FieldValue::Int(0))
    );
    assert_eq!(
        delivery.record.get("commits"),
        Some(&FieldValue::Seq(vec![]))
    );
}

#[test]
fn scenario_c_package_without_registry() {
    assert_eq!(
        run(json!({"package": {"name": "foo"}})).unwrap_err(),
        missing("package.registry")
    );
}

#[test]
fn scenario_d_empty_object_is_unrecognized() {
    assert_eq!(
        run(json!({})).unwrap_err(),
        EventError::Classification(ClassificationError::Unrecognized)
    );
}

#[test]
fn scenario_e_array_is_not_an_object() {
    assert_eq!(
        run(json!([{"package": {}}])).unwrap_err(),
        EventError::Classification(ClassificationError::NotAnObject)
    );
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn package_record_contains_every_string_field_with_prefix() {
    let raw = package_payload();
    let delivery = run(raw.clone()).unwrap();
    let record = &delivery.record;

    let sources = [
        ("", &raw["package"]),
        ("registry.", &raw["package"]["registry"]),
        ("package_version.", &raw["package"]["package_version"]),
    ];
    let mut expected = 0;
    for (prefix, object) in sources {
        for (key, value) in object.as_object().unwrap() {
            let name = format!("{prefix}{key}");
            match value.as_str() {
                Some(s) => {
                    expected += 1;
                    assert_eq!(str_field(record, &name), Some(s), "field {name}");
                }
                None => assert!(record.get(&name).is_none(), "{name} should be skipped"),
            }
        }
    }

    assert_eq!(record.len(), expected + 1);
    let (last_name, last_value) = record.fields().last().unwrap();
    assert_eq!(last_name, "tag");
    assert_eq!(last_value, &FieldValue::from("1.2.0"));
    assert!(record.get("owner").is_none());
}

#[test]
fn every_missing_package_level_reports_its_path() {
    let mut no_package = package_payload();
    no_package["package"] = json!("hello-world");
    // A non-object package is not a package envelope at all.
    assert_eq!(
        run(no_package).unwrap_err(),
        EventError::Classification(ClassificationError::Unrecognized)
    );

    let mut no_registry = package_payload();
    no_registry["package"]
        .as_object_mut()
        .unwrap()
        .remove("registry");
    assert_eq!(run(no_registry).unwrap_err(), missing("package.registry"));

    let mut no_version = package_payload();
    no_version["package"]["package_version"] = json!(null);
    assert_eq!(
        run(no_version).unwrap_err(),
        missing("package.package_version")
    );

    let mut no_tag = package_payload();
    no_tag["package"]["package_version"]["container_metadata"]["tag"]
        .as_object_mut()
        .unwrap()
        .remove("name");
    assert_eq!(run(no_tag).unwrap_err(), missing(TAG_PATH));
}

#[test]
fn registry_checked_before_package_version() {
    // Both are missing: the registry is reported because it is validated first.
    assert_eq!(
        run(json!({"package": {}})).unwrap_err(),
        missing("package.registry")
    );
}

#[test]
fn commits_count_matches_array_length() {
    for n in [0usize, 1, 3, 20] {
        let commits: Vec<Value> = (0..n)
            .map(|i| json!({"id": format!("c{i}"), "message": format!("commit {i}")}))
            .collect();
        let delivery = run(json!({
            "after": "head",
            "before": "base",
            "commits": commits,
        }))
        .unwrap();

        assert_eq!(
            delivery.record.get("commits_count"),
            Some(&FieldValue::Int(n as u64))
        );
        match &delivery.variant {
            EventVariant::Push(push) => assert_eq!(push.commits.len(), n),
            other => panic!("expected push, got {other:?}"),
        }
    }
}

#[test]
fn push_commits_keep_their_order_and_fields() {
    let delivery = run(json!({
        "ref": "refs/heads/main",
        "after": "2222",
        "before": "1111",
        "commits": [
            {
                "id": "aaaa",
                "tree_id": "t1",
                "message": "first",
                "timestamp": "2024-01-01T00:00:00Z",
                "url": "https://example.com/commit/aaaa",
                "added": ["src/lib.rs"],
                "removed": [],
                "modified": ["README.md"],
            },
            {"id": "bbbb", "message": "second"},
        ],
    }))
    .unwrap();

    assert!(delivery.record.get("ref").is_none());
    match delivery.record.get("commits") {
        Some(FieldValue::Seq(commits)) => {
            assert_eq!(commits.len(), 2);
            assert_eq!(commits[0]["id"], "aaaa");
            assert_eq!(commits[0]["modified"], json!(["README.md"]));
            assert_eq!(commits[1]["id"], "bbbb");
        }
        other => panic!("expected commits, got {other:?}"),
    }
}

#[test]
fn each_commit_keeps_its_own_field_set() {
    let commits = json!([
        {"id": "aaaa", "added": ["a.rs"], "message": "first"},
        {"id": "bbbb", "removed": ["old.rs"], "url": null},
        {"id": 3, "modified": ["m.rs", 4], "timestamp": "2024-01-02T00:00:00Z"},
        {},
    ]);
    let delivery = run(json!({"after": "2222", "before": "1111", "commits": commits})).unwrap();

    assert_eq!(
        delivery.record.get("commits_count"),
        Some(&FieldValue::Int(4))
    );
    match delivery.record.get("commits") {
        Some(FieldValue::Seq(logged)) => assert_eq!(&Value::Array(logged.clone()), &commits),
        other => panic!("expected commits, got {other:?}"),
    }

    let push = match &delivery.variant {
        EventVariant::Push(push) => push,
        other => panic!("expected push, got {other:?}"),
    };
    let [first, second, third, fourth] = push.commits.as_slice() else {
        panic!("expected four commits, got {}", push.commits.len());
    };

    assert_eq!(first.id, "aaaa");
    assert!(first.added.contains("a.rs"));
    assert!(first.removed.is_empty());

    assert_eq!(second.id, "bbbb");
    assert!(second.added.is_empty());
    assert!(second.removed.contains("old.rs"));
    assert_eq!(second.url, "");
    assert_eq!(second.message, "");

    assert_eq!(third.id, "");
    assert_eq!(third.modified.len(), 1);
    assert!(third.modified.contains("m.rs"));
    assert_eq!(third.timestamp, "2024-01-02T00:00:00Z");

    assert!(fourth.id.is_empty() && fourth.added.is_empty() && fourth.message.is_empty());
}

#[test]
fn malformed_commit_fields_do_not_reject_the_push() {
    for commit in [
        json!({"id": "c1", "added": null, "message": "m"}),
        json!({"id": 1}),
        json!("c1"),
    ] {
        let delivery = run(json!({"after": "a", "before": "b", "commits": [commit]})).unwrap();
        assert_eq!(delivery.kind(), EventKind::Push);
        assert_eq!(
            delivery.record.get("commits_count"),
            Some(&FieldValue::Int(1))
        );
    }
}

#[test]
fn classification_is_total_over_objects() {
    let inputs = [
        json!({}),
        json!({"package": {}}),
        json!({"package": 1}),
        json!({"commits": []}),
        json!({"after": "a", "before": "b"}),
        json!({"after": "a"}),
        json!({"zen": "Keep it logically awesome."}),
    ];
    for raw in inputs {
        let candidate = classify(&raw).unwrap();
        assert!(matches!(
            candidate,
            Candidate::Event(EventKind::Package | EventKind::Push) | Candidate::Unknown
        ));
    }
}

#[test]
fn processing_is_idempotent() {
    let raw = package_payload();
    let first = run(raw.clone()).unwrap();
    let second = run(raw).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.record.to_json().unwrap(),
        second.record.to_json().unwrap()
    );
}

#[test]
fn process_emits_record_to_sink() {
    let sink = MemorySink::new();
    let body = serde_json::to_vec(&package_payload()).unwrap();

    let delivery = engine::process(&body, &sink).unwrap();

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].0, EventKind::Package);
    assert_eq!(records[0].1, delivery.record);
}

#[test]
fn empty_body_is_not_an_object() {
    let sink = MemorySink::new();
    assert_eq!(
        engine::process(b"", &sink).unwrap_err(),
        EventError::Classification(ClassificationError::NotAnObject)
    );
    assert!(sink.is_empty());
}
