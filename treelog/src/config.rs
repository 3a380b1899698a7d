//! Building a logger from plain configuration.
//!
//! [`LoggerConfig`] deserializes from any serde format; missing fields take
//! their defaults. [`LoggerConfig::build`] wires a [`Logger`] to one
//! [`DeliverySink`] behind a [`ReconfigurableSink`], and returns the sink so the
//! minimum level can be changed while the process runs.

use std::{
    io::{self, Write},
    sync::Arc,
};

use serde::{Deserialize, Serialize};

use crate::{
    level::{LevelParseError, LogLevel},
    logger::Logger,
    record::TimeFormat,
    redaction::{Redactor, RedactorError},
    sink::{DEFAULT_QUEUE_CAPACITY, DeliverySink, ReconfigurableSink},
};

/// Error building a logger from a [`LoggerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid log level: {0}")]
    LogLevel(#[from] LevelParseError),
    #[error("invalid redaction pattern: {0}")]
    Redactor(#[from] RedactorError),
    #[error("failed to start delivery sink: {0}")]
    Io(#[from] io::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Minimum level name: `debug`, `info`, `error` or `fatal`.
    pub log_level: String,
    pub redact_secrets: bool,
    /// Value patterns used when `redact_secrets` is set; the defaults when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redact_patterns: Option<Vec<String>>,
    pub time_format: TimeFormat,
    /// Longest string kept in record data. Zero keeps everything.
    pub max_data_string_length: usize,
    pub queue_capacity: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info.to_string(),
            redact_secrets: false,
            redact_patterns: None,
            time_format: TimeFormat::default(),
            max_data_string_length: 0,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl LoggerConfig {
    pub fn min_level(&self) -> Result<LogLevel, LevelParseError> {
        self.log_level.parse()
    }

    /// Compiles the redactor this configuration asks for, if any.
    pub fn redactor(&self) -> Result<Option<Redactor>, RedactorError> {
        if !self.redact_secrets {
            return Ok(None);
        }
        Redactor::new(None, self.redact_patterns.as_deref()).map(Some)
    }

    /// Builds a logger for `component` delivering to `writer`.
    pub fn build<W>(
        &self,
        component: &str,
        writer: W,
    ) -> Result<(Logger, Arc<ReconfigurableSink<DeliverySink>>), ConfigError>
    where
        W: Write + Send + 'static,
    {
        let min_level = self.min_level()?;
        let redactor = self.redactor()?;

        let delivery = DeliverySink::with_capacity(writer, LogLevel::Debug, self.queue_capacity)?;
        let sink = Arc::new(ReconfigurableSink::new(delivery, min_level));

        let mut logger = Logger::new(component)
            .with_time_format(self.time_format)
            .with_max_data_length(self.max_data_string_length);
        if let Some(redactor) = redactor {
            logger = logger.with_redactor(redactor);
        }
        logger.register_sink(Arc::clone(&sink));

        tracing::debug!(
            component,
            %min_level,
            time_format = %self.time_format,
            redact = self.redact_secrets,
            max_data_string_length = self.max_data_string_length,
            "logger configured"
        );
        Ok((logger, sink))
    }

    pub fn build_stdout(
        &self,
        component: &str,
    ) -> Result<(Logger, Arc<ReconfigurableSink<DeliverySink>>), ConfigError> {
        self.build(component, io::stdout())
    }
}
