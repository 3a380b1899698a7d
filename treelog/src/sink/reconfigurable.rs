use std::sync::atomic::{AtomicU8, Ordering};

use super::Sink;
use crate::level::LogLevel;

/// Wraps a sink with a minimum level that can be changed while logging.
///
/// The wrapped sink still applies its own filtering; this only narrows it.
#[derive(Debug)]
pub struct ReconfigurableSink<S> {
    sink: S,
    min_level: AtomicU8,
}

impl<S: Sink> ReconfigurableSink<S> {
    pub fn new(sink: S, min_level: LogLevel) -> Self {
        Self {
            sink,
            min_level: AtomicU8::new(min_level.as_u8()),
        }
    }

    pub fn min_level(&self) -> LogLevel {
        LogLevel::from_u8(self.min_level.load(Ordering::Relaxed)).unwrap_or_default()
    }

    pub fn set_min_level(&self, level: LogLevel) {
        self.min_level.store(level.as_u8(), Ordering::Relaxed);
    }

    pub fn inner(&self) -> &S {
        &self.sink
    }
}

impl<S: Sink> Sink for ReconfigurableSink<S> {
    fn log(&self, level: LogLevel, payload: &[u8]) {
        if level < self.min_level() {
            return;
        }
        self.sink.log(level, payload);
    }

    fn flush(&self) {
        self.sink.flush();
    }
}
