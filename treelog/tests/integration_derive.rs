//! `#[derive(ToPayload)]` on application types.

#![cfg(feature = "derive")]

use std::marker::PhantomData;

use serde_json::json;
use treelog::{Data, Payload, REDACTED_MARKER, Redactor, ToPayload, testing::TestLogger};

#[derive(ToPayload)]
struct Credentials {
    user: String,
    password: String,
    #[payload(rename = "type")]
    kind: &'static str,
    #[payload(skip)]
    #[allow(dead_code)]
    internal: std::time::Instant,
}

#[derive(ToPayload)]
struct Point(i32, i32);

#[derive(ToPayload)]
struct Marker;

#[derive(ToPayload)]
struct Wrapper<T> {
    value: T,
}

#[derive(ToPayload)]
struct TypedId<T> {
    id: u64,
    _kind: PhantomData<T>,
}

struct NotPayload;

fn credentials() -> Credentials {
    Credentials {
        user: "alice".into(),
        password: "hunter2".into(),
        kind: "basic",
        internal: std::time::Instant::now(),
    }
}

#[test]
fn named_struct_becomes_record() {
    let Payload::Record(record) = credentials().to_payload() else {
        panic!("expected a record");
    };
    assert_eq!(record.name(), "Credentials");
    let names: Vec<_> = record.fields().iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, ["user", "password", "type"]);
}

#[test]
fn tuple_and_unit_structs() {
    assert_eq!(Point(1, 2).to_payload().to_json(), json!([1, 2]));
    assert_eq!(Marker.to_payload(), Payload::Null);
}

#[test]
fn generic_fields_are_bounded() {
    let wrapped = Wrapper {
        value: vec!["a", "b"],
    };
    assert_eq!(wrapped.to_payload().to_json(), json!({"value": ["a", "b"]}));

    // `NotPayload` does not implement `ToPayload`; only the marker uses it.
    let id: TypedId<NotPayload> = TypedId {
        id: 9,
        _kind: PhantomData,
    };
    assert_eq!(id.to_payload().to_json(), json!({"id": 9, "_kind": null}));
}

#[test]
fn derived_records_are_redacted_by_field_name() {
    let logger = TestLogger::from_logger(
        treelog::Logger::new("test").with_redactor(Redactor::with_defaults().unwrap()),
    );
    logger.info("login", [Data::new().with("credentials", credentials())]);

    assert_eq!(
        serde_json::to_value(&logger.logs()[0].data).unwrap(),
        json!({"credentials": {"user": "alice", "password": REDACTED_MARKER, "type": "basic"}})
    );
}
