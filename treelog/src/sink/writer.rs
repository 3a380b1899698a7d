use std::io::Write;

use parking_lot::Mutex;

use super::Sink;
use crate::level::LogLevel;

/// Writes each record synchronously on the calling thread.
///
/// Concurrent callers are serialized by a lock around the writer, so lines
/// never interleave. Records below `min_level` are ignored.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: Mutex<W>,
    min_level: LogLevel,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W, min_level: LogLevel) -> Self {
        Self {
            writer: Mutex::new(writer),
            min_level,
        }
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn log(&self, level: LogLevel, payload: &[u8]) {
        if level < self.min_level {
            return;
        }
        let mut writer = self.writer.lock();
        if let Err(err) = writer.write_all(payload) {
            tracing::debug!(error = %err, "writer sink failed to write record");
        }
    }

    fn flush(&self) {
        if let Err(err) = self.writer.lock().flush() {
            tracing::debug!(error = %err, "writer sink failed to flush");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::WriterSink;
    use crate::{level::LogLevel, sink::Sink};

    #[test]
    fn writes_records_at_or_above_min_level() {
        let sink = WriterSink::new(Vec::new(), LogLevel::Info);
        sink.log(LogLevel::Debug, b"debug\n");
        sink.log(LogLevel::Info, b"info\n");
        sink.log(LogLevel::Fatal, b"fatal\n");
        sink.flush();
        assert_eq!(sink.into_inner(), b"info\nfatal\n");
    }
}
