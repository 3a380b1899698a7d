//! Replaying logger output from a plain-text stream.

use std::{io::Cursor, sync::mpsc};

use treelog::{
    Address, Data, LogLevel, Payload, Task, parse_line, reconstruct, reconstruct::reconstruct_into,
    testing::TestLogger,
};

#[test]
fn address_round_trip() {
    let tasks = vec![Task::new("task-1", "1"), Task::new("task-2", "2")];
    let address = Address::encode(&tasks, "action");
    assert_eq!(address.message, "task-1.task-2.action");
    assert_eq!(address.session, "1.2");

    let decoded = Address::decode(&address.wire_message("source"), &address.session).unwrap();
    assert_eq!(decoded.tasks, tasks);
    assert_eq!(decoded.action, "action");
}

#[test]
fn logger_output_reconstructs_sessions() {
    let logger = TestLogger::new("app");
    let outer = logger.session("outer", []);
    let _skipped = outer.session("skipped", []);
    let inner = outer.session("inner", [Data::new().with("k", "v")]);
    inner.error("failed", Some(&std::io::Error::other("nope")), []);

    let mut stream = b"starting up\n".to_vec();
    stream.extend_from_slice(b"[app.0] ");
    stream.extend_from_slice(&logger.buffer());

    let entries: Vec<_> = reconstruct(Cursor::new(stream)).collect();
    assert_eq!(entries.len(), 2);
    assert!(!entries[0].is_structured());

    let log = entries[1].log.as_ref().unwrap();
    assert_eq!(log.source, "app");
    assert_eq!(log.level, LogLevel::Error);
    assert_eq!(
        log.tasks,
        vec![Task::new("outer", "1"), Task::new("inner", "2")]
    );
    assert_eq!(log.action, "failed");
    assert_eq!(log.error.as_deref(), Some("nope"));
    assert_eq!(log.data.get("k").and_then(Payload::as_str), Some("v"));
    assert!(!log.data.contains_key("session"));
    assert_eq!(log.message(), "app.outer.inner.failed");
    assert_eq!(log.session(), "1.2");
}

#[test]
fn channel_receives_every_line() {
    let (tx, rx) = mpsc::channel();
    reconstruct_into(Cursor::new("one\ntwo\n{\"broken\": \n"), &tx);
    drop(tx);

    let entries: Vec<_> = rx.iter().collect();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|entry| !entry.is_structured()));
}

#[test]
fn dotted_names_are_a_known_limitation() {
    let logger = TestLogger::new("app");
    logger.session("v1.2", []).info("done", []);

    let entry = parse_line(&logger.buffer());
    assert!(!entry.is_structured());
}
