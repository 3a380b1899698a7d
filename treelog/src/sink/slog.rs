//! Forwarding records into a `slog::Logger`.
//!
//! [`SlogSink`] decodes each wire line and re-emits it as a `slog` record:
//!
//! - the message is the dotted record message;
//! - `source` carries the logger component;
//! - `data` carries the record data as a nested serde value, which requires
//!   `slog`'s `nested-values` feature.
//!
//! Levels map as debug → `Debug`, info → `Info`, error and fatal → `Error`.
//! Lines that do not decode are skipped.

use serde_json::Value as JsonValue;

use super::Sink;
use crate::{level::LogLevel, record::WireRecord};

/// A sink that re-emits records through `slog`.
#[derive(Clone, Debug)]
pub struct SlogSink {
    logger: slog::Logger,
}

impl SlogSink {
    pub fn new(logger: slog::Logger) -> Self {
        Self { logger }
    }
}

impl Sink for SlogSink {
    fn log(&self, level: LogLevel, payload: &[u8]) {
        let wire = match WireRecord::decode(payload) {
            Ok(wire) => wire,
            Err(err) => {
                tracing::debug!(error = %err, "slog sink received an undecodable record");
                return;
            }
        };
        let data = serde_json::to_value(&wire.data).unwrap_or(JsonValue::Null);
        let source = wire.source.as_str();
        let message = wire.message.as_str();

        match level {
            LogLevel::Debug => {
                slog::debug!(self.logger, "{}", message; "source" => source, "data" => slog::Serde(data));
            }
            LogLevel::Info => {
                slog::info!(self.logger, "{}", message; "source" => source, "data" => slog::Serde(data));
            }
            LogLevel::Error | LogLevel::Fatal => {
                slog::error!(self.logger, "{}", message; "source" => source, "data" => slog::Serde(data));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fmt::Arguments,
        sync::{Arc, Mutex},
    };

    use serde_json::{Value as JsonValue, json};
    use slog::{Drain, KV, Never, OwnedKVList, Record};

    use super::SlogSink;
    use crate::{
        level::LogLevel,
        payload::Data,
        record::{LogRecord, TimeFormat},
        sink::Sink,
    };

    #[derive(Debug, Clone)]
    struct Captured {
        level: slog::Level,
        message: String,
        source: Option<String>,
        data: Option<JsonValue>,
    }

    #[derive(Clone, Default)]
    struct CapturingDrain(Arc<Mutex<Vec<Captured>>>);

    struct Fields {
        source: Option<String>,
        data: Option<JsonValue>,
    }

    impl slog::Serializer for Fields {
        fn emit_arguments(&mut self, key: slog::Key, val: &Arguments<'_>) -> slog::Result {
            if key == "source" {
                self.source = Some(val.to_string());
            }
            Ok(())
        }

        fn emit_str(&mut self, key: slog::Key, val: &str) -> slog::Result {
            if key == "source" {
                self.source = Some(val.to_owned());
            }
            Ok(())
        }

        fn emit_serde(&mut self, key: slog::Key, val: &dyn slog::SerdeValue) -> slog::Result {
            if key == "data" {
                self.data = serde_json::to_value(val.as_serde()).ok();
            }
            Ok(())
        }
    }

    impl Drain for CapturingDrain {
        type Ok = ();
        type Err = Never;

        fn log(&self, record: &Record<'_>, _values: &OwnedKVList) -> Result<(), Never> {
            let mut fields = Fields {
                source: None,
                data: None,
            };
            record.kv().serialize(record, &mut fields).unwrap();
            self.0.lock().unwrap().push(Captured {
                level: record.level(),
                message: record.msg().to_string(),
                source: fields.source,
                data: fields.data,
            });
            Ok(())
        }
    }

    fn line(level: LogLevel) -> Vec<u8> {
        LogRecord {
            timestamp: chrono::Utc::now(),
            source: "api".into(),
            message: "api.request.done".into(),
            session: "2".into(),
            level,
            data: Data::new().with("status", 200),
            error: None,
            trace: None,
        }
        .encode(TimeFormat::UnixEpoch)
    }

    #[test]
    fn forwards_message_source_and_data() {
        let drain = CapturingDrain::default();
        let sink = SlogSink::new(slog::Logger::root(drain.clone(), slog::o!()));

        sink.log(LogLevel::Info, &line(LogLevel::Info));

        let captured = drain.0.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].level, slog::Level::Info);
        assert_eq!(captured[0].message, "api.request.done");
        assert_eq!(captured[0].source.as_deref(), Some("api"));
        assert_eq!(
            captured[0].data,
            Some(json!({"status": 200, "session": "2"}))
        );
    }

    #[test]
    fn maps_levels() {
        let drain = CapturingDrain::default();
        let sink = SlogSink::new(slog::Logger::root(drain.clone(), slog::o!()));

        for level in LogLevel::ALL {
            sink.log(level, &line(level));
        }

        let levels: Vec<_> = drain.0.lock().unwrap().iter().map(|c| c.level).collect();
        assert_eq!(
            levels,
            [
                slog::Level::Debug,
                slog::Level::Info,
                slog::Level::Error,
                slog::Level::Error
            ]
        );
    }

    #[test]
    fn skips_undecodable_lines() {
        let drain = CapturingDrain::default();
        let sink = SlogSink::new(slog::Logger::root(drain.clone(), slog::o!()));
        sink.log(LogLevel::Info, b"not json\n");
        assert!(drain.0.lock().unwrap().is_empty());
    }
}
