//! Pattern-driven redaction of payload trees.
//!
//! This module provides:
//!
//! - **`patterns`**: [`PatternSet`], an ordered list of compiled regexes, and the
//!   default key and value patterns.
//! - **[`Redactor`]**: a [`Visitor`](crate::walk::Visitor) that replaces
//!   sensitive values with [`REDACTED_MARKER`].
//!
//! Two rules apply while walking:
//!
//! - **Keys**: when a map key or record field name matches any key pattern, the
//!   whole value under it is replaced, whatever its shape. Nothing below it is
//!   visited.
//! - **Values**: any other string leaf matching a value pattern is replaced.
//!
//! Redaction is one-way. The marker carries no information about the original
//! value, and trees with nothing to redact come back by reference.

mod error;
mod patterns;

use std::borrow::Cow;

pub use error::RedactorError;
pub use patterns::{DEFAULT_KEY_PATTERNS, DEFAULT_VALUE_PATTERNS, PatternSet};

use crate::{
    payload::{Data, Payload},
    walk::{self, Visitor},
};

/// Replacement written in place of every redacted value.
pub const REDACTED_MARKER: &str = "*REDACTED*";

// =============================================================================
// Redactor
// =============================================================================

/// Redacts values by key name and by string content.
#[derive(Clone, Debug)]
pub struct Redactor {
    keys: PatternSet,
    values: PatternSet,
}

impl Redactor {
    /// Compiles the given pattern sources. `None` selects the default set.
    pub fn new<S: AsRef<str>>(
        key_patterns: Option<&[S]>,
        value_patterns: Option<&[S]>,
    ) -> Result<Self, RedactorError> {
        let keys = match key_patterns {
            Some(patterns) => PatternSet::compile(patterns)?,
            None => PatternSet::compile(DEFAULT_KEY_PATTERNS)?,
        };
        let values = match value_patterns {
            Some(patterns) => PatternSet::compile(patterns)?,
            None => PatternSet::compile(DEFAULT_VALUE_PATTERNS)?,
        };
        Ok(Self { keys, values })
    }

    /// Starts a builder. Pattern sets left unset use the defaults.
    pub fn builder() -> RedactorBuilder {
        RedactorBuilder::default()
    }

    /// Builds a redactor with [`DEFAULT_KEY_PATTERNS`] and [`DEFAULT_VALUE_PATTERNS`].
    pub fn with_defaults() -> Result<Self, RedactorError> {
        Self::builder().build()
    }

    /// Builds a redactor from explicit pattern sets.
    pub fn from_sets(keys: PatternSet, values: PatternSet) -> Self {
        Self { keys, values }
    }

    pub fn key_patterns(&self) -> &PatternSet {
        &self.keys
    }

    pub fn value_patterns(&self) -> &PatternSet {
        &self.values
    }

    /// Redacts a payload tree.
    pub fn apply<'a>(&self, payload: &'a Payload) -> Cow<'a, Payload> {
        walk::walk(payload, self)
    }

    /// Redacts every entry of `data`.
    pub fn redact_data<'a>(&self, data: &'a Data) -> Cow<'a, Data> {
        walk::walk_data(data, self)
    }

    /// Redacts a JSON document.
    ///
    /// The input must decode as JSON; otherwise [`RedactorError::Decode`] is
    /// returned and nothing is produced.
    pub fn redact_json(&self, input: &[u8]) -> Result<Vec<u8>, RedactorError> {
        let payload: Payload = serde_json::from_slice(input).map_err(RedactorError::Decode)?;
        let redacted = self.apply(&payload);
        serde_json::to_vec(redacted.as_ref()).map_err(RedactorError::Encode)
    }
}

impl Visitor for Redactor {
    fn visit_leaf(&self, leaf: &Payload) -> Option<Payload> {
        match leaf {
            Payload::String(value) if value != REDACTED_MARKER && self.values.is_match(value) => {
                Some(marker())
            }
            _ => None,
        }
    }

    fn visit_key(&self, key: &str) -> Option<Payload> {
        self.keys.is_match(key).then(marker)
    }
}

fn marker() -> Payload {
    Payload::String(REDACTED_MARKER.to_owned())
}

// =============================================================================
// RedactorBuilder
// =============================================================================

/// Collects pattern sources before compiling them into a [`Redactor`].
#[derive(Clone, Debug, Default)]
pub struct RedactorBuilder {
    key_patterns: Option<Vec<String>>,
    value_patterns: Option<Vec<String>>,
}

impl RedactorBuilder {
    /// Replaces the default key patterns.
    #[must_use]
    pub fn key_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_patterns = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Replaces the default value patterns.
    #[must_use]
    pub fn value_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value_patterns = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Compiles every pattern.
    ///
    /// The first pattern that fails to compile is reported as
    /// [`RedactorError::InvalidPattern`].
    pub fn build(self) -> Result<Redactor, RedactorError> {
        Redactor::new(self.key_patterns.as_deref(), self.value_patterns.as_deref())
    }
}

// =============================================================================
// Tests
// =============================================================================
