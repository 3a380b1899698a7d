//! Forwarding records as `tracing` events.
//!
//! [`TracingSink`] decodes each wire line and emits one event with target
//! `treelog`. The event message is the dotted record message; `source` and
//! `data` are fields, with `data` rendered as compact JSON since `tracing`
//! field values are flat.

use super::Sink;
use crate::{level::LogLevel, record::WireRecord};

/// A sink that re-emits records as `tracing` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl Sink for TracingSink {
    fn log(&self, level: LogLevel, payload: &[u8]) {
        let wire = match WireRecord::decode(payload) {
            Ok(wire) => wire,
            Err(err) => {
                ::tracing::debug!(error = %err, "tracing sink received an undecodable record");
                return;
            }
        };
        let data = serde_json::to_string(&wire.data).unwrap_or_default();
        let source = wire.source.as_str();
        let message = wire.message.as_str();

        match level {
            LogLevel::Debug => {
                ::tracing::debug!(target: "treelog", source, data = %data, "{message}");
            }
            LogLevel::Info => {
                ::tracing::info!(target: "treelog", source, data = %data, "{message}");
            }
            LogLevel::Error | LogLevel::Fatal => {
                ::tracing::error!(target: "treelog", source, data = %data, "{message}");
            }
        }
    }
}
