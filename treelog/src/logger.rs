//! The emitting side: [`Logger`] and nested sessions.
//!
//! A logger owns a component name, the task path of the session it represents,
//! ambient data merged into every record, and a shared list of sinks. Each
//! emit call:
//!
//! 1. merges ambient data with the call-site data (call site wins);
//! 2. addresses the record from the task path and the action;
//! 3. folds session, error and trace into the data, then redacts and truncates
//!    it when configured;
//! 4. encodes one line and hands it to every registered sink.
//!
//! Sessions and `with_data` derivations share the sink list with the logger
//! they came from, so a sink registered later still sees their records.

use std::{
    backtrace::Backtrace,
    borrow::Cow,
    error::Error as StdError,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use chrono::Utc;
use parking_lot::RwLock;

use crate::{
    address::{Address, Task},
    level::LogLevel,
    payload::Data,
    record::{LogRecord, TimeFormat},
    redaction::Redactor,
    sink::Sink,
    truncation::Truncator,
};

type SinkList = Arc<RwLock<Vec<Arc<dyn Sink>>>>;

/// Panic payload raised by [`Logger::fatal`] once the record has been flushed.
///
/// Supervisors can recover it with `catch_unwind` and `downcast_ref::<Fatal>()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fatal {
    /// Wire message of the fatal record, component first.
    pub message: String,
    /// Text of the error passed to `fatal`, if any.
    pub error: Option<String>,
}

impl fmt::Display for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            Some(error) => write!(f, "{}: {error}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl StdError for Fatal {}

#[derive(Clone, Debug, Default)]
struct Transforms {
    redactor: Option<Redactor>,
    truncator: Truncator,
    time_format: TimeFormat,
}

impl Transforms {
    fn apply(&self, data: Data) -> Data {
        let data = match &self.redactor {
            Some(redactor) => changed(redactor.redact_data(&data)).unwrap_or(data),
            None => data,
        };
        changed(self.truncator.truncate_data(&data)).unwrap_or(data)
    }
}

fn changed<T: Clone>(value: Cow<'_, T>) -> Option<T> {
    match value {
        Cow::Owned(value) => Some(value),
        Cow::Borrowed(_) => None,
    }
}

/// Emits records for one component and session path.
///
/// Cloning a logger is cheap; clones share sinks, ambient data and the
/// session counter.
#[derive(Clone)]
pub struct Logger {
    component: Arc<str>,
    tasks: Arc<[Task]>,
    data: Data,
    sinks: SinkList,
    next_session: Arc<AtomicU64>,
    transforms: Arc<Transforms>,
}

impl Logger {
    pub fn new(component: impl Into<String>) -> Self {
        let component: String = component.into();
        Self {
            component: component.into(),
            tasks: Arc::from(Vec::new()),
            data: Data::new(),
            sinks: Arc::default(),
            next_session: Arc::default(),
            transforms: Arc::default(),
        }
    }

    /// Redacts every record's data with `redactor` before it is encoded.
    #[must_use]
    pub fn with_redactor(mut self, redactor: Redactor) -> Self {
        Arc::make_mut(&mut self.transforms).redactor = Some(redactor);
        self
    }

    /// Truncates long strings in every record's data. Zero disables truncation.
    #[must_use]
    pub fn with_max_data_length(mut self, max_length: usize) -> Self {
        Arc::make_mut(&mut self.transforms).truncator = Truncator::new(max_length);
        self
    }

    #[must_use]
    pub fn with_time_format(mut self, time_format: TimeFormat) -> Self {
        Arc::make_mut(&mut self.transforms).time_format = time_format;
        self
    }

    /// Adds a sink for this logger and every logger derived from it.
    pub fn register_sink<S: Sink + 'static>(&self, sink: S) {
        self.sinks.write().push(Arc::new(sink));
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    /// Dotted task path of this logger, component first.
    pub fn session_name(&self) -> String {
        std::iter::once(&*self.component)
            .chain(self.tasks.iter().map(|task| task.name.as_str()))
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Ambient data merged into every record.
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Starts a nested session.
    ///
    /// The child's task path is this logger's plus one task named `name`. Its
    /// session component is the next value of this logger's counter, starting
    /// at 1. Its ambient data is this logger's merged with `data`.
    #[must_use]
    pub fn session(&self, name: &str, data: impl IntoIterator<Item = Data>) -> Logger {
        let id = self.next_session.fetch_add(1, Ordering::Relaxed) + 1;
        let mut tasks = self.tasks.to_vec();
        tasks.push(Task::new(name, id.to_string()));

        Logger {
            component: Arc::clone(&self.component),
            tasks: tasks.into(),
            data: merge_all(&self.data, data),
            sinks: Arc::clone(&self.sinks),
            next_session: Arc::default(),
            transforms: Arc::clone(&self.transforms),
        }
    }

    /// Derives a logger with extra ambient data and the same session.
    #[must_use]
    pub fn with_data(&self, data: Data) -> Logger {
        Logger {
            data: self.data.merged(&data),
            ..self.clone()
        }
    }

    pub fn debug(&self, action: &str, data: impl IntoIterator<Item = Data>) {
        self.emit(LogLevel::Debug, action, None, data, None);
    }

    pub fn info(&self, action: &str, data: impl IntoIterator<Item = Data>) {
        self.emit(LogLevel::Info, action, None, data, None);
    }

    pub fn error(
        &self,
        action: &str,
        error: Option<&dyn StdError>,
        data: impl IntoIterator<Item = Data>,
    ) {
        self.emit(LogLevel::Error, action, error, data, None);
    }

    /// Logs at fatal level with a captured backtrace, flushes every sink, and
    /// unwinds with a [`Fatal`] payload.
    pub fn fatal(
        &self,
        action: &str,
        error: Option<&dyn StdError>,
        data: impl IntoIterator<Item = Data>,
    ) -> ! {
        let trace = Backtrace::force_capture().to_string();
        let message = self.emit(LogLevel::Fatal, action, error, data, Some(trace));
        self.flush();
        std::panic::panic_any(Fatal {
            message,
            error: error.map(ToString::to_string),
        })
    }

    /// Flushes every registered sink.
    pub fn flush(&self) {
        for sink in self.snapshot_sinks() {
            sink.flush();
        }
    }

    fn emit(
        &self,
        level: LogLevel,
        action: &str,
        error: Option<&dyn StdError>,
        data: impl IntoIterator<Item = Data>,
        trace: Option<String>,
    ) -> String {
        let address = Address::encode(&self.tasks, action);
        let message = address.wire_message(&self.component);
        let record = LogRecord {
            timestamp: Utc::now(),
            source: self.component.to_string(),
            message: message.clone(),
            session: address.session,
            level,
            data: merge_all(&self.data, data),
            error: error.map(ToString::to_string),
            trace,
        };

        let time_format = self.transforms.time_format;
        let mut wire = record.to_wire(time_format);
        wire.data = self.transforms.apply(wire.data);
        let line = wire.encode(time_format);

        for sink in self.snapshot_sinks() {
            sink.log(level, &line);
        }
        message
    }

    // Sinks are called without the list lock held.
    fn snapshot_sinks(&self) -> Vec<Arc<dyn Sink>> {
        self.sinks.read().clone()
    }
}

fn merge_all(base: &Data, extra: impl IntoIterator<Item = Data>) -> Data {
    let mut merged = base.clone();
    for data in extra {
        merged.merge(data);
    }
    merged
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("session_name", &self.session_name())
            .field("tasks", &self.tasks)
            .field("data", &self.data)
            .field("sinks", &self.sinks.read().len())
            .finish_non_exhaustive()
    }
}
