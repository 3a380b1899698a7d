//! Replaying structured records out of plain-text log streams.
//!
//! Log streams often mix structured lines with whatever else a process
//! printed, and structured lines may carry a prefix added by a supervisor
//! (`[app] 2024-01-01 {"timestamp":...}`). Each line is handled independently:
//!
//! - a line without `{` is not structured;
//! - otherwise the first JSON value starting at the first `{` is decoded as a
//!   wire record, and anything after it is ignored;
//! - `session`, `trace` and `error` are lifted out of the data and must be
//!   strings;
//! - the message and session are decoded back into the task path.
//!
//! Any failure marks the line as not structured; it never stops the stream.

use std::{io::BufRead, sync::mpsc::Sender};

use chrono::{DateTime, Utc};

use crate::{
    address::{Address, AddressError, Task},
    level::LogLevel,
    payload::{Data, Payload},
    record::{ERROR_KEY, SESSION_KEY, TRACE_KEY, WireRecord, parse_timestamp},
};

/// Why a line could not be read as a structured record.
#[derive(Debug, thiserror::Error)]
pub enum ReconstructError {
    #[error("line contains no JSON object")]
    NoJson,
    #[error("invalid record JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid timestamp `{0}`")]
    Timestamp(String),
    #[error("data field `{0}` is not a string")]
    FieldType(&'static str),
    #[error(transparent)]
    Address(#[from] AddressError),
}

/// A structured record recovered from a line.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub source: String,
    pub tasks: Vec<Task>,
    pub action: String,
    pub error: Option<String>,
    pub trace: Option<String>,
    /// Record data with session, error and trace removed.
    pub data: Data,
}

impl LogEntry {
    /// The dotted wire message, component first.
    pub fn message(&self) -> String {
        Address::encode(&self.tasks, &self.action).wire_message(&self.source)
    }

    pub fn session(&self) -> String {
        Address::encode(&self.tasks, &self.action).session
    }
}

/// One input line and what could be recovered from it.
#[derive(Debug)]
pub struct Entry {
    /// The line as read, without its terminator.
    pub raw: Vec<u8>,
    pub log: Result<LogEntry, ReconstructError>,
}

impl Entry {
    pub fn is_structured(&self) -> bool {
        self.log.is_ok()
    }
}

/// Parses one line.
pub fn parse_line(line: &[u8]) -> Entry {
    Entry {
        raw: line.to_vec(),
        log: parse_record(line),
    }
}

fn parse_record(line: &[u8]) -> Result<LogEntry, ReconstructError> {
    let start = line
        .iter()
        .position(|&b| b == b'{')
        .ok_or(ReconstructError::NoJson)?;
    let wire: WireRecord = serde_json::Deserializer::from_slice(&line[start..])
        .into_iter::<WireRecord>()
        .next()
        .ok_or(ReconstructError::NoJson)??;

    let timestamp = parse_timestamp(&wire.timestamp)
        .ok_or_else(|| ReconstructError::Timestamp(wire.timestamp.clone()))?;

    let mut data = wire.data;
    let error = take_string(&mut data, ERROR_KEY)?;
    let trace = take_string(&mut data, TRACE_KEY)?;
    let session = take_string(&mut data, SESSION_KEY)?.unwrap_or_default();

    let address = Address::decode(&wire.message, &session)?;

    Ok(LogEntry {
        timestamp,
        level: wire.log_level,
        source: wire.source,
        tasks: address.tasks,
        action: address.action,
        error,
        trace,
        data,
    })
}

fn take_string(data: &mut Data, key: &'static str) -> Result<Option<String>, ReconstructError> {
    match data.remove(key) {
        None => Ok(None),
        Some(Payload::String(value)) => Ok(Some(value)),
        Some(_) => Err(ReconstructError::FieldType(key)),
    }
}

/// Iterator over the lines of a reader, see [`reconstruct`].
#[derive(Debug)]
pub struct Entries<R> {
    reader: R,
}

impl<R: BufRead> Iterator for Entries<R> {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        let mut line = Vec::new();
        match self.reader.read_until(b'\n', &mut line) {
            Ok(0) => None,
            Ok(_) => {
                if line.last() == Some(&b'\n') {
                    line.pop();
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                }
                Some(parse_line(&line))
            }
            Err(err) => {
                tracing::debug!(error = %err, "stopped reading log stream");
                None
            }
        }
    }
}

/// Parses every line of `reader`, structured or not.
///
/// The iterator ends at end of input or at the first read error.
pub fn reconstruct<R: BufRead>(reader: R) -> Entries<R> {
    Entries { reader }
}

/// Sends every parsed line of `reader` to `out`.
///
/// Stops early when the receiving side has hung up.
pub fn reconstruct_into<R: BufRead>(reader: R, out: &Sender<Entry>) {
    for entry in reconstruct(reader) {
        if out.send(entry).is_err() {
            tracing::trace!("entry receiver dropped, stopping");
            return;
        }
    }
}
