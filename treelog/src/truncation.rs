//! Length limits for string values inside payload trees.
//!
//! Long strings are cut and suffixed with [`TRUNCATION_SUFFIX`] so that the
//! result is exactly `max_length` bytes. Strings no longer than the suffix are
//! never touched, and neither is anything when the limit itself is shorter than
//! the suffix.
//!
//! Lengths are measured in bytes. When the cut point falls inside a multi-byte
//! character it moves back to the previous character boundary, so the result
//! can be a few bytes shorter than `max_length` but is always valid UTF-8.

use std::borrow::Cow;

use crate::{
    payload::{Data, Payload},
    walk::{self, Visitor},
};

/// Marker appended to truncated strings.
pub const TRUNCATION_SUFFIX: &str = "-(truncated)";

/// Truncates `value` to `max_length` bytes, including the suffix.
///
/// `max_length == 0` disables truncation.
pub fn truncate_str(value: &str, max_length: usize) -> Cow<'_, str> {
    let suffix_len = TRUNCATION_SUFFIX.len();
    if max_length == 0
        || value.len() <= suffix_len
        || value.len() <= max_length
        || max_length < suffix_len
    {
        return Cow::Borrowed(value);
    }

    let mut cut = max_length - suffix_len;
    while !value.is_char_boundary(cut) {
        cut -= 1;
    }
    Cow::Owned(format!("{}{TRUNCATION_SUFFIX}", &value[..cut]))
}

/// Truncates every long string found in a payload tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Truncator {
    max_length: usize,
}

impl Truncator {
    /// Creates a truncator. A `max_length` of zero disables it.
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn is_enabled(&self) -> bool {
        self.max_length != 0
    }

    pub fn apply<'a>(&self, payload: &'a Payload) -> Cow<'a, Payload> {
        if !self.is_enabled() {
            return Cow::Borrowed(payload);
        }
        walk::walk(payload, self)
    }

    pub fn truncate_data<'a>(&self, data: &'a Data) -> Cow<'a, Data> {
        if !self.is_enabled() {
            return Cow::Borrowed(data);
        }
        walk::walk_data(data, self)
    }
}

impl Visitor for Truncator {
    fn visit_leaf(&self, leaf: &Payload) -> Option<Payload> {
        match leaf {
            Payload::String(value) => match truncate_str(value, self.max_length) {
                Cow::Owned(truncated) => Some(Payload::String(truncated)),
                Cow::Borrowed(_) => None,
            },
            _ => None,
        }
    }
}
