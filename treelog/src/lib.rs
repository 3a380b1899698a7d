//! Structured event logging with session addressing, redaction, and non-blocking delivery.
//!
//! This crate separates:
//! - **Payloads**: the tree of values an event carries ([`Payload`], [`Data`]).
//! - **Transforms**: redaction and truncation over arbitrary payload trees,
//!   sharing one copy-on-write walker.
//! - **Delivery**: sinks that receive serialized records, including the bounded,
//!   non-blocking [`DeliverySink`].
//!
//! A [`Logger`] assembles a record per call, addresses it with the dotted
//! `component.task.action` scheme, applies the configured transforms and fans the
//! serialized line out to every registered sink.
//!
//! ```no_run
//! use treelog::{Data, DeliverySink, LogLevel, Logger};
//!
//! let logger = Logger::new("api");
//! logger.register_sink(DeliverySink::stdout(LogLevel::Info)?);
//!
//! let request = logger.session("request", [Data::new().with("path", "/users")]);
//! request.info("started", []);
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! What it does not do:
//! - guarantee delivery (sinks drop entries under pressure)
//! - install a `tracing` subscriber or parse command-line flags

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[cfg(feature = "derive")]
pub use treelog_derive::ToPayload;

#[allow(unused_extern_crates)]
extern crate self as treelog;

// Module declarations
pub mod address;
pub mod config;
pub mod level;
pub mod logger;
pub mod payload;
pub mod reconstruct;
pub mod record;
pub mod redaction;
pub mod sink;
pub mod testing;
pub mod truncation;
pub mod walk;

pub use address::{Address, AddressError, DecodedAddress, Task};
pub use config::{ConfigError, LoggerConfig};
pub use level::{LevelParseError, LogLevel};
pub use logger::{Fatal, Logger};
pub use payload::{Data, Payload, PayloadError, Record, ToPayload};
pub use reconstruct::{
    Entry, LogEntry, ReconstructError, parse_line, reconstruct, reconstruct_into,
};
pub use record::{LogRecord, TimeFormat, WireRecord};
pub use redaction::{PatternSet, REDACTED_MARKER, Redactor, RedactorBuilder, RedactorError};
pub use sink::{DEFAULT_QUEUE_CAPACITY, DeliverySink, ReconfigurableSink, Sink, WriterSink};
pub use truncation::{TRUNCATION_SUFFIX, Truncator, truncate_str};
pub use walk::{Visitor, walk, walk_data};
