//! Copy-on-write traversal of payload trees.
//!
//! [`walk`] visits a [`Payload`] depth-first and rebuilds it bottom-up using a
//! [`Visitor`]. The result is a `Cow`:
//!
//! - `Cow::Borrowed` means nothing in the subtree changed. The borrowed value is
//!   the input itself, so callers can rely on pointer identity to skip work.
//! - `Cow::Owned` means at least one leaf or keyed entry was rewritten. Only the
//!   containers on the path to a change are reallocated; unchanged siblings are
//!   cloned as-is.
//!
//! Redaction and truncation are both visitors over this walker.

use std::{borrow::Cow, sync::Arc};

use crate::payload::{Data, Payload, Record};

/// Per-node rewrite rules applied by [`walk`].
pub trait Visitor {
    /// Rewrites a primitive node (`Null`, `Bool`, `Number`, `String`).
    ///
    /// Returning `None` keeps the leaf unchanged.
    fn visit_leaf(&self, leaf: &Payload) -> Option<Payload>;

    /// Replaces the whole value stored under `key` in a map or record.
    ///
    /// When this returns `Some`, the value is not walked any further.
    fn visit_key(&self, _key: &str) -> Option<Payload> {
        None
    }
}

/// Walks `payload` with `visitor`, returning the input itself when unchanged.
pub fn walk<'a, V>(payload: &'a Payload, visitor: &V) -> Cow<'a, Payload>
where
    V: Visitor + ?Sized,
{
    match payload {
        Payload::List(items) => match walk_items(items, visitor) {
            Some(items) => Cow::Owned(Payload::List(items)),
            None => Cow::Borrowed(payload),
        },
        Payload::Map(data) => match walk_entries(data.iter(), data.len(), visitor) {
            Some(entries) => Cow::Owned(Payload::Map(entries.into_iter().collect())),
            None => Cow::Borrowed(payload),
        },
        Payload::Record(record) => {
            let fields = record.fields().iter().map(|(key, value)| (key, value));
            match walk_entries(fields, record.fields().len(), visitor) {
                Some(fields) => Cow::Owned(Payload::Record(Record::from_parts(
                    record.name(),
                    fields,
                ))),
                None => Cow::Borrowed(payload),
            }
        }
        Payload::Shared(inner) => match walk(inner, visitor) {
            Cow::Borrowed(_) => Cow::Borrowed(payload),
            Cow::Owned(changed) => Cow::Owned(Payload::Shared(Arc::new(changed))),
        },
        leaf => visitor
            .visit_leaf(leaf)
            .map_or(Cow::Borrowed(payload), Cow::Owned),
    }
}

/// Walks every value of `data`, returning the input map itself when unchanged.
pub fn walk_data<'a, V>(data: &'a Data, visitor: &V) -> Cow<'a, Data>
where
    V: Visitor + ?Sized,
{
    match walk_entries(data.iter(), data.len(), visitor) {
        Some(entries) => Cow::Owned(entries.into_iter().collect()),
        None => Cow::Borrowed(data),
    }
}

fn walk_items<V>(items: &[Payload], visitor: &V) -> Option<Vec<Payload>>
where
    V: Visitor + ?Sized,
{
    let mut rebuilt: Option<Vec<Payload>> = None;
    for (index, item) in items.iter().enumerate() {
        match walk(item, visitor) {
            Cow::Owned(changed) => rebuilt
                .get_or_insert_with(|| {
                    let mut out = Vec::with_capacity(items.len());
                    out.extend_from_slice(&items[..index]);
                    out
                })
                .push(changed),
            Cow::Borrowed(same) => {
                if let Some(out) = rebuilt.as_mut() {
                    out.push(same.clone());
                }
            }
        }
    }
    rebuilt
}

fn walk_entries<'a, I, V>(entries: I, len: usize, visitor: &V) -> Option<Vec<(String, Payload)>>
where
    I: Iterator<Item = (&'a String, &'a Payload)>,
    V: Visitor + ?Sized,
{
    let mut seen: Vec<(&'a String, &'a Payload)> = Vec::with_capacity(len);
    let mut rebuilt: Option<Vec<(String, Payload)>> = None;

    for (key, value) in entries {
        let next = match visitor.visit_key(key) {
            Some(replacement) if replacement != *value => Cow::Owned(replacement),
            Some(_) => Cow::Borrowed(value),
            None => walk(value, visitor),
        };
        match next {
            Cow::Owned(changed) => rebuilt
                .get_or_insert_with(|| {
                    let mut out = Vec::with_capacity(len);
                    out.extend(seen.iter().map(|(k, v)| ((*k).clone(), (*v).clone())));
                    out
                })
                .push((key.clone(), changed)),
            Cow::Borrowed(same) => match rebuilt.as_mut() {
                Some(out) => out.push((key.clone(), same.clone())),
                None => seen.push((key, same)),
            },
        }
    }
    rebuilt
}

// =============================================================================
// Tests
// =============================================================================
