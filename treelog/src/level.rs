//! Severity levels.

use std::{fmt, str::FromStr};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, Visitor},
};

/// Severity of a record, ordered from least to most severe.
///
/// On the wire a level is written as its integer value. Reading accepts either
/// the integer or the lowercase name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Error = 2,
    Fatal = 3,
}

/// Error parsing a level name or number.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level `{0}`")]
pub struct LevelParseError(pub String);

impl LogLevel {
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(usize::from(value)).copied()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| LevelParseError(s.to_owned()))
    }
}

impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LevelVisitor)
    }
}

#[derive(Clone, Copy)]
struct LevelVisitor;

impl Visitor<'_> for LevelVisitor {
    type Value = LogLevel;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a log level between 0 and 3 or its name")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<LogLevel, E> {
        u8::try_from(value)
            .ok()
            .and_then(LogLevel::from_u8)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Unsigned(value), &self))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<LogLevel, E> {
        u64::try_from(value)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
            .and_then(|value| self.visit_u64(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<LogLevel, E> {
        value.parse().map_err(E::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{LevelParseError, LogLevel};

    #[test]
    fn levels_are_ordered_by_severity() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Fatal);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("DEBUG".parse(), Ok(LogLevel::Debug));
        assert_eq!("Info".parse(), Ok(LogLevel::Info));
        assert_eq!(
            "verbose".parse::<LogLevel>(),
            Err(LevelParseError("verbose".into()))
        );
    }

    #[test]
    fn serializes_as_integer() {
        assert_eq!(serde_json::to_string(&LogLevel::Error).unwrap(), "2");
    }

    #[test]
    fn deserializes_integer_or_name() {
        assert_eq!(serde_json::from_str::<LogLevel>("3").unwrap(), LogLevel::Fatal);
        assert_eq!(serde_json::from_str::<LogLevel>("\"debug\"").unwrap(), LogLevel::Debug);
        assert!(serde_json::from_str::<LogLevel>("4").is_err());
        assert!(serde_json::from_str::<LogLevel>("-1").is_err());
    }
}
