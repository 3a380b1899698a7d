//! In-memory sinks and loggers for tests.
//!
//! ```
//! use treelog::{Data, testing::TestLogger};
//!
//! let logger = TestLogger::new("test");
//! logger.info("hello", [Data::new().with("n", 1)]);
//!
//! let logs = logger.logs();
//! assert_eq!(logs[0].message, "test.hello");
//! ```

use std::{
    ops::Deref,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use parking_lot::Mutex;

use crate::{level::LogLevel, logger::Logger, record::WireRecord, sink::Sink};

/// Captures every line it receives.
#[derive(Debug)]
pub struct TestSink {
    contents: Mutex<Vec<u8>>,
    flushes: AtomicUsize,
    min_level: LogLevel,
}

impl Default for TestSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSink {
    /// A sink that accepts every level.
    pub fn new() -> Self {
        Self::with_min_level(LogLevel::Debug)
    }

    pub fn with_min_level(min_level: LogLevel) -> Self {
        Self {
            contents: Mutex::new(Vec::new()),
            flushes: AtomicUsize::new(0),
            min_level,
        }
    }

    /// Raw bytes received so far.
    pub fn buffer(&self) -> Vec<u8> {
        self.contents.lock().clone()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.contents.lock().clear();
    }

    /// Decodes every captured line, stopping at the first that does not decode.
    pub fn try_logs(&self) -> Result<Vec<WireRecord>, serde_json::Error> {
        self.contents
            .lock()
            .split(|&b| b == b'\n')
            .filter(|line| !line.is_empty())
            .map(WireRecord::decode)
            .collect()
    }

    /// Decoded records. Lines that do not decode are skipped.
    pub fn logs(&self) -> Vec<WireRecord> {
        self.contents
            .lock()
            .split(|&b| b == b'\n')
            .filter_map(|line| WireRecord::decode(line).ok())
            .collect()
    }
}

impl Sink for TestSink {
    fn log(&self, level: LogLevel, payload: &[u8]) {
        if level < self.min_level {
            return;
        }
        self.contents.lock().extend_from_slice(payload);
    }

    fn flush(&self) {
        self.flushes.fetch_add(1, Ordering::SeqCst);
    }
}

/// A [`Logger`] with a [`TestSink`] already registered.
#[derive(Debug)]
pub struct TestLogger {
    logger: Logger,
    sink: Arc<TestSink>,
}

impl TestLogger {
    pub fn new(component: &str) -> Self {
        Self::from_logger(Logger::new(component))
    }

    /// Registers a fresh [`TestSink`] on an already configured logger.
    pub fn from_logger(logger: Logger) -> Self {
        let sink = Arc::new(TestSink::new());
        logger.register_sink(Arc::clone(&sink));
        Self { logger, sink }
    }

    pub fn sink(&self) -> &TestSink {
        &self.sink
    }

    pub fn logs(&self) -> Vec<WireRecord> {
        self.sink.logs()
    }

    pub fn buffer(&self) -> Vec<u8> {
        self.sink.buffer()
    }
}

impl Deref for TestLogger {
    type Target = Logger;

    fn deref(&self) -> &Logger {
        &self.logger
    }
}

#[cfg(test)]
mod tests {
    use super::{TestLogger, TestSink};
    use crate::{level::LogLevel, sink::Sink};

    #[test]
    fn filters_below_min_level() {
        let sink = TestSink::with_min_level(LogLevel::Error);
        sink.log(LogLevel::Info, b"{}\n");
        assert!(sink.buffer().is_empty());
    }

    #[test]
    fn try_logs_reports_garbage() {
        let sink = TestSink::new();
        sink.log(LogLevel::Info, b"garbage\n");
        assert!(sink.try_logs().is_err());
        assert!(sink.logs().is_empty());
    }

    #[test]
    fn test_logger_captures_sessions() {
        let logger = TestLogger::new("test");
        logger.session("child", []).debug("ping", []);
        let logs = logger.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].message, "test.child.ping");
    }
}
