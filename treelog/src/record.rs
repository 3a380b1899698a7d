//! Log records and their line-oriented JSON wire format.
//!
//! A [`LogRecord`] is what a logger assembles per call. Before it leaves the
//! process it is flattened into a [`WireRecord`]:
//!
//! - the session path, error text and trace are folded into `data` under
//!   `session`, `error` and `trace`;
//! - the timestamp is rendered according to the [`TimeFormat`];
//! - empty data is written as `null`.
//!
//! Two line shapes exist. Unix-epoch mode writes
//! `{"timestamp","source","message","log_level","data"}` with an integer level;
//! RFC 3339 mode writes `{"timestamp","level","source","message","data"}` with
//! the level name. [`WireRecord`] reads either.

use std::{fmt, str::FromStr};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    level::LogLevel,
    payload::{Data, Payload},
};

pub const SESSION_KEY: &str = "session";
pub const ERROR_KEY: &str = "error";
pub const TRACE_KEY: &str = "trace";

// =============================================================================
// TimeFormat
// =============================================================================

/// How timestamps are rendered on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeFormat {
    /// Seconds since the epoch as a decimal string with nanosecond precision.
    #[default]
    #[serde(rename = "unix-epoch")]
    UnixEpoch,
    /// RFC 3339 in UTC with nanosecond precision. Also switches the line to the
    /// level-name shape.
    #[serde(rename = "rfc3339")]
    Rfc3339,
}

impl TimeFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeFormat::UnixEpoch => "unix-epoch",
            TimeFormat::Rfc3339 => "rfc3339",
        }
    }

    pub fn format(self, timestamp: &DateTime<Utc>) -> String {
        match self {
            TimeFormat::UnixEpoch => format!(
                "{}.{:09}",
                timestamp.timestamp(),
                timestamp.timestamp_subsec_nanos()
            ),
            TimeFormat::Rfc3339 => timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
        }
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unix-epoch" => Ok(TimeFormat::UnixEpoch),
            "rfc3339" => Ok(TimeFormat::Rfc3339),
            other => Err(format!("unknown time format `{other}`")),
        }
    }
}

/// Parses a wire timestamp written in either format.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    let (secs, fraction) = value.split_once('.').unwrap_or((value, ""));
    let secs: i64 = secs.parse().ok()?;
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let nanos = fraction
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(9)
        .fold(0_u32, |acc, digit| acc * 10 + u32::from(digit - b'0'));
    DateTime::from_timestamp(secs, nanos)
}

// =============================================================================
// LogRecord
// =============================================================================

/// One emitted event, before it is flattened for the wire.
#[derive(Clone, Debug, PartialEq)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    /// Full dotted message, logger component first.
    pub message: String,
    /// Dotted session path; empty for root-level records.
    pub session: String,
    pub level: LogLevel,
    pub data: Data,
    pub error: Option<String>,
    pub trace: Option<String>,
}

impl LogRecord {
    /// Returns `data` with session, error and trace folded in.
    pub fn wire_data(&self) -> Data {
        let mut data = self.data.clone();
        if !self.session.is_empty() {
            data.insert(SESSION_KEY, self.session.as_str());
        }
        if let Some(error) = &self.error {
            data.insert(ERROR_KEY, error.as_str());
        }
        if let Some(trace) = &self.trace {
            data.insert(TRACE_KEY, trace.as_str());
        }
        data
    }

    pub fn to_wire(&self, format: TimeFormat) -> WireRecord {
        WireRecord {
            timestamp: format.format(&self.timestamp),
            source: self.source.clone(),
            message: self.message.clone(),
            log_level: self.level,
            data: self.wire_data(),
        }
    }

    /// Encodes the record as one newline-terminated JSON line.
    pub fn encode(&self, format: TimeFormat) -> Vec<u8> {
        self.to_wire(format).encode(format)
    }
}

// =============================================================================
// WireRecord
// =============================================================================

/// The JSON object written for every record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireRecord {
    pub timestamp: String,
    pub source: String,
    pub message: String,
    #[serde(alias = "level")]
    pub log_level: LogLevel,
    #[serde(
        default,
        serialize_with = "serialize_data",
        deserialize_with = "deserialize_data"
    )]
    pub data: Data,
}

#[derive(Serialize)]
struct PrettyLine<'a> {
    timestamp: &'a str,
    level: &'static str,
    source: &'a str,
    message: &'a str,
    data: NullIfEmpty<'a>,
}

impl WireRecord {
    /// Encodes the record in the line shape for `format`, with a trailing newline.
    ///
    /// When the data cannot be serialized, the line is written anyway with the
    /// data replaced by the error and a debug dump of the original.
    pub fn encode(&self, format: TimeFormat) -> Vec<u8> {
        match self.try_encode(format, &self.data) {
            Ok(line) => line,
            Err(err) => {
                tracing::debug!(source = %self.source, message = %self.message, error = %err, "record data failed to serialise");
                let fallback = Data::new()
                    .with("serialisation error", err.to_string())
                    .with("data_dump", format!("{:?}", self.data));
                self.try_encode(format, &fallback).unwrap_or_default()
            }
        }
    }

    fn try_encode(&self, format: TimeFormat, data: &Data) -> Result<Vec<u8>, serde_json::Error> {
        let mut line = match format {
            TimeFormat::UnixEpoch => serde_json::to_vec(&UnixLine {
                timestamp: &self.timestamp,
                source: &self.source,
                message: &self.message,
                log_level: self.log_level,
                data: NullIfEmpty(data),
            })?,
            TimeFormat::Rfc3339 => serde_json::to_vec(&PrettyLine {
                timestamp: &self.timestamp,
                level: self.log_level.as_str(),
                source: &self.source,
                message: &self.message,
                data: NullIfEmpty(data),
            })?,
        };
        line.push(b'\n');
        Ok(line)
    }

    /// Decodes one JSON line in either shape.
    pub fn decode(line: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(line)
    }

    /// The session path folded into `data`, if any.
    pub fn session(&self) -> Option<&str> {
        self.data.get(SESSION_KEY).and_then(Payload::as_str)
    }

    /// The error text folded into `data`, if any.
    pub fn error(&self) -> Option<&str> {
        self.data.get(ERROR_KEY).and_then(Payload::as_str)
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

#[derive(Serialize)]
struct UnixLine<'a> {
    timestamp: &'a str,
    source: &'a str,
    message: &'a str,
    log_level: LogLevel,
    data: NullIfEmpty<'a>,
}

struct NullIfEmpty<'a>(&'a Data);

impl Serialize for NullIfEmpty<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_empty() {
            serializer.serialize_none()
        } else {
            self.0.serialize(serializer)
        }
    }
}

fn serialize_data<S: Serializer>(data: &Data, serializer: S) -> Result<S::Ok, S::Error> {
    NullIfEmpty(data).serialize(serializer)
}

fn deserialize_data<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Data, D::Error> {
    Option::<Data>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::{Value, json};

    use super::{LogRecord, TimeFormat, WireRecord, parse_timestamp};
    use crate::{level::LogLevel, payload::Data};

    fn at() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 5_000).unwrap()
    }

    fn record() -> LogRecord {
        LogRecord {
            timestamp: at(),
            source: "api".into(),
            message: "api.request.done".into(),
            session: "1".into(),
            level: LogLevel::Error,
            data: Data::new().with("path", "/users"),
            error: Some("boom".into()),
            trace: None,
        }
    }

    fn line(bytes: &[u8]) -> Value {
        assert_eq!(bytes.last(), Some(&b'\n'));
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn unix_epoch_line_shape() {
        let value = line(&record().encode(TimeFormat::UnixEpoch));
        assert_eq!(
            value,
            json!({
                "timestamp": "1700000000.000005000",
                "source": "api",
                "message": "api.request.done",
                "log_level": 2,
                "data": {"path": "/users", "session": "1", "error": "boom"},
            })
        );
    }

    #[test]
    fn rfc3339_line_shape() {
        let value = line(&record().encode(TimeFormat::Rfc3339));
        assert_eq!(value["timestamp"], "2023-11-14T22:13:20.000005000Z");
        assert_eq!(value["level"], "error");
        assert!(value.get("log_level").is_none());
    }

    #[test]
    fn empty_data_is_null() {
        let mut record = record();
        record.data = Data::new();
        record.session.clear();
        record.error = None;
        let value = line(&record.encode(TimeFormat::UnixEpoch));
        assert_eq!(value["data"], Value::Null);
    }

    #[test]
    fn decodes_both_shapes() {
        for format in [TimeFormat::UnixEpoch, TimeFormat::Rfc3339] {
            let wire = WireRecord::decode(&record().encode(format)).unwrap();
            assert_eq!(wire.log_level, LogLevel::Error);
            assert_eq!(wire.session(), Some("1"));
            assert_eq!(wire.error(), Some("boom"));
            assert_eq!(wire.timestamp(), Some(at()));
        }
    }

    #[test]
    fn decodes_null_data() {
        let wire = WireRecord::decode(
            br#"{"timestamp":"1.5","source":"a","message":"a.b","log_level":0,"data":null}"#,
        )
        .unwrap();
        assert!(wire.data.is_empty());
    }

    #[test]
    fn parses_unix_timestamps() {
        assert_eq!(parse_timestamp("10.5"), Utc.timestamp_opt(10, 500_000_000).single());
        assert_eq!(parse_timestamp("10"), Utc.timestamp_opt(10, 0).single());
        assert_eq!(parse_timestamp("10.x"), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn time_format_serde_names() {
        assert_eq!(serde_json::to_string(&TimeFormat::Rfc3339).unwrap(), "\"rfc3339\"");
        assert_eq!(
            serde_json::from_str::<TimeFormat>("\"unix-epoch\"").unwrap(),
            TimeFormat::UnixEpoch
        );
    }
}
