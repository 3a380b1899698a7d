//! Destinations for serialized records.
//!
//! This module provides:
//!
//! - **[`Sink`]**: the contract a logger writes to. Sinks receive a level and an
//!   already-encoded line; they never report failure to the caller.
//! - **[`DeliverySink`]**: bounded, non-blocking delivery to any writer through
//!   one background consumer.
//! - **[`WriterSink`]**: synchronous delivery, one locked write per record.
//! - **[`ReconfigurableSink`]**: a wrapper whose minimum level can change at
//!   runtime.
//! - Forwarding sinks for `slog` and `tracing` behind the `slog` and
//!   `tracing-sink` features.

mod delivery;
mod reconfigurable;
#[cfg(feature = "slog")]
pub mod slog;
#[cfg(feature = "tracing-sink")]
pub mod tracing;
mod writer;

use std::sync::Arc;

pub use delivery::{DEFAULT_QUEUE_CAPACITY, DeliverySink};
pub use reconfigurable::ReconfigurableSink;
pub use writer::WriterSink;

use crate::level::LogLevel;

/// A destination for encoded records.
///
/// `log` is best effort: implementations swallow their own failures so that a
/// broken destination can never break the code that is logging.
pub trait Sink: Send + Sync {
    fn log(&self, level: LogLevel, payload: &[u8]);

    /// Blocks until everything accepted so far has reached the destination.
    ///
    /// Destinations without buffering keep the default, which returns at once.
    fn flush(&self) {}
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn log(&self, level: LogLevel, payload: &[u8]) {
        (**self).log(level, payload);
    }

    fn flush(&self) {
        (**self).flush();
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn log(&self, level: LogLevel, payload: &[u8]) {
        (**self).log(level, payload);
    }

    fn flush(&self) {
        (**self).flush();
    }
}
