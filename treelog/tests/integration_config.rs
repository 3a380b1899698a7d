//! Building loggers from configuration.

use std::{
    io::{self, Write},
    sync::Arc,
};

use parking_lot::Mutex;
use treelog::{Data, LogLevel, LoggerConfig, REDACTED_MARKER, WireRecord};

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn records(out: &SharedBuffer) -> Vec<WireRecord> {
    out.0
        .lock()
        .split(|&b| b == b'\n')
        .filter(|line| !line.is_empty())
        .map(|line| WireRecord::decode(line).unwrap())
        .collect()
}

#[test]
fn builds_a_working_logger() {
    let config: LoggerConfig = serde_json::from_str(
        r#"{
            "log_level": "info",
            "redact_secrets": true,
            "time_format": "rfc3339",
            "max_data_string_length": 20
        }"#,
    )
    .unwrap();
    let out = SharedBuffer::default();
    let (logger, sink) = config.build("svc", out.clone()).unwrap();
    assert_eq!(sink.min_level(), LogLevel::Info);

    logger.debug("ignored", []);
    logger.info(
        "login",
        [Data::new()
            .with("password", "hunter2")
            .with("note", "aaaaaaaaaaaaaaaaaaaaaaaaa")],
    );
    logger.flush();

    let records = records(&out);
    assert_eq!(records.len(), 1);
    assert_eq!(
        serde_json::to_value(&records[0].data).unwrap(),
        serde_json::json!({"password": REDACTED_MARKER, "note": "aaaaaaaa-(truncated)"})
    );
    assert!(records[0].timestamp.ends_with('Z'));
}

#[test]
fn returned_sink_changes_level_at_runtime() {
    let out = SharedBuffer::default();
    let (logger, sink) = LoggerConfig::default().build("svc", out.clone()).unwrap();

    logger.debug("before", []);
    sink.set_min_level(LogLevel::Debug);
    logger.debug("after", []);
    logger.flush();

    let messages: Vec<_> = records(&out).into_iter().map(|r| r.message).collect();
    assert_eq!(messages, ["svc.after"]);
}
