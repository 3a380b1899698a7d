//! `ToPayload` implementations for standard library types.
//!
//! Conversions are explicit: a type enters a payload tree only through
//! [`ToPayload`]. Application structs usually get it from
//! `#[derive(ToPayload)]`; everything here covers scalars, strings and the
//! common std containers.
//!
//! ## Map Keys
//!
//! Only maps keyed by strings convert into [`Payload::Map`]. Other key types are
//! not supported because payload maps are string-keyed on the wire.
//!
//! ## Non-finite Floats
//!
//! `NaN` and infinities have no JSON representation and convert to
//! [`Payload::Null`].

use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    hash::BuildHasher,
    marker::PhantomData,
    sync::Arc,
};

use chrono::{DateTime, SecondsFormat, TimeZone};
use serde_json::{Number, Value as JsonValue};

use super::{Data, Payload};

/// Converts a value into a [`Payload`] tree.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be converted into a log payload",
    label = "this type does not implement `ToPayload`",
    note = "use `#[derive(ToPayload)]` on the type definition",
    note = "or convert it with `Data::from_serialize` if it implements `Serialize`"
)]
pub trait ToPayload {
    fn to_payload(&self) -> Payload;
}

// =============================================================================
// Scalars
// =============================================================================

macro_rules! impl_to_payload_number {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToPayload for $ty {
                fn to_payload(&self) -> Payload {
                    Payload::Number(Number::from(*self))
                }
            }
        )*
    };
}

impl_to_payload_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl ToPayload for f64 {
    fn to_payload(&self) -> Payload {
        Number::from_f64(*self).map_or(Payload::Null, Payload::Number)
    }
}

impl ToPayload for f32 {
    fn to_payload(&self) -> Payload {
        f64::from(*self).to_payload()
    }
}

impl ToPayload for bool {
    fn to_payload(&self) -> Payload {
        Payload::Bool(*self)
    }
}

impl ToPayload for char {
    fn to_payload(&self) -> Payload {
        Payload::String(self.to_string())
    }
}

impl ToPayload for () {
    fn to_payload(&self) -> Payload {
        Payload::Null
    }
}

impl<T: ?Sized> ToPayload for PhantomData<T> {
    fn to_payload(&self) -> Payload {
        Payload::Null
    }
}

impl ToPayload for str {
    fn to_payload(&self) -> Payload {
        Payload::String(self.to_owned())
    }
}

impl ToPayload for String {
    fn to_payload(&self) -> Payload {
        Payload::String(self.clone())
    }
}

impl ToPayload for Cow<'_, str> {
    fn to_payload(&self) -> Payload {
        Payload::String(self.as_ref().to_owned())
    }
}

impl<Tz> ToPayload for DateTime<Tz>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    fn to_payload(&self) -> Payload {
        Payload::String(self.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

// =============================================================================
// Payload values
// =============================================================================

impl ToPayload for Payload {
    fn to_payload(&self) -> Payload {
        self.clone()
    }
}

impl ToPayload for Data {
    fn to_payload(&self) -> Payload {
        Payload::Map(self.clone())
    }
}

impl ToPayload for JsonValue {
    fn to_payload(&self) -> Payload {
        Payload::from(self.clone())
    }
}

// =============================================================================
// Wrappers
// =============================================================================

impl<T: ToPayload + ?Sized> ToPayload for &T {
    fn to_payload(&self) -> Payload {
        (**self).to_payload()
    }
}

impl<T: ToPayload + ?Sized> ToPayload for Box<T> {
    fn to_payload(&self) -> Payload {
        (**self).to_payload()
    }
}

impl<T: ToPayload + ?Sized> ToPayload for Arc<T> {
    fn to_payload(&self) -> Payload {
        Payload::Shared(Arc::new((**self).to_payload()))
    }
}

impl<T: ToPayload> ToPayload for Option<T> {
    fn to_payload(&self) -> Payload {
        self.as_ref().map_or(Payload::Null, ToPayload::to_payload)
    }
}

// =============================================================================
// Sequences
// =============================================================================

impl<T: ToPayload> ToPayload for [T] {
    fn to_payload(&self) -> Payload {
        Payload::List(self.iter().map(ToPayload::to_payload).collect())
    }
}

impl<T: ToPayload, const N: usize> ToPayload for [T; N] {
    fn to_payload(&self) -> Payload {
        self.as_slice().to_payload()
    }
}

impl<T: ToPayload> ToPayload for Vec<T> {
    fn to_payload(&self) -> Payload {
        self.as_slice().to_payload()
    }
}

// =============================================================================
// Maps (string keys only)
// =============================================================================

impl<K, V> ToPayload for BTreeMap<K, V>
where
    K: AsRef<str>,
    V: ToPayload,
{
    fn to_payload(&self) -> Payload {
        Payload::Map(
            self.iter()
                .map(|(key, value)| (key.as_ref().to_owned(), value.to_payload()))
                .collect(),
        )
    }
}

impl<K, V, S> ToPayload for HashMap<K, V, S>
where
    K: AsRef<str>,
    V: ToPayload,
    S: BuildHasher,
{
    fn to_payload(&self) -> Payload {
        Payload::Map(
            self.iter()
                .map(|(key, value)| (key.as_ref().to_owned(), value.to_payload()))
                .collect(),
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use super::ToPayload;
    use crate::payload::Payload;

    #[test]
    fn numbers_convert_to_json_numbers() {
        assert_eq!(7_u8.to_payload(), Payload::Number(7.into()));
        assert_eq!((-3_i64).to_payload(), Payload::Number((-3).into()));
    }

    #[test]
    fn non_finite_floats_become_null() {
        assert_eq!(f64::NAN.to_payload(), Payload::Null);
        assert_eq!(f32::INFINITY.to_payload(), Payload::Null);
        assert!(matches!(1.5_f64.to_payload(), Payload::Number(_)));
    }

    #[test]
    fn option_none_is_null() {
        let value: Option<String> = None;
        assert!(value.to_payload().is_null());
        assert_eq!(Some("x").to_payload(), Payload::String("x".into()));
    }

    #[test]
    fn arc_converts_to_shared() {
        let value = Arc::new(String::from("pointee"));
        match value.to_payload() {
            Payload::Shared(inner) => assert_eq!(inner.as_str(), Some("pointee")),
            other => panic!("expected shared payload, got {other:?}"),
        }
    }

    #[test]
    fn string_keyed_maps_convert_to_maps() {
        let mut map = HashMap::new();
        map.insert("k".to_string(), vec![1, 2]);
        match map.to_payload() {
            Payload::Map(data) => {
                assert_eq!(
                    data.get("k"),
                    Some(&Payload::List(vec![
                        Payload::Number(1.into()),
                        Payload::Number(2.into())
                    ]))
                );
            }
            other => panic!("expected map payload, got {other:?}"),
        }
    }
}
