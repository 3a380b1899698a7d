//! Compiled pattern sets and the default credential patterns.

use regex::Regex;

use super::RedactorError;

/// Key patterns used when none are configured: any key containing `pwd` or
/// `pass`, ignoring case.
pub const DEFAULT_KEY_PATTERNS: &[&str] = &["(?i)pwd", "(?i)pass"];

const AWS_ACCESS_KEY_ID: &str = r"AKIA[A-Z0-9]{16}";
const AWS_SECRET_ACCESS_KEY: &str =
    r#"KEY["']?\s*(?::|=>|=)\s*["']?[A-Z0-9/\+=]{40}["']?"#;
const CRYPT_MD5: &str = r"\$1\$[A-Z0-9./]{1,16}\$[A-Z0-9./]{22}";
const CRYPT_SHA256: &str = r"\$5\$[A-Z0-9./]{1,16}\$[A-Z0-9./]{43}";
const CRYPT_SHA512: &str = r"\$6\$[A-Z0-9./]{1,16}\$[A-Z0-9./]{86}";
const PRIVATE_KEY_HEADER: &str = r"-----BEGIN(.*)PRIVATE KEY-----";

/// Value patterns used when none are configured: AWS access keys, crypt(3)
/// hashes and PEM private key headers.
pub const DEFAULT_VALUE_PATTERNS: &[&str] = &[
    AWS_ACCESS_KEY_ID,
    AWS_SECRET_ACCESS_KEY,
    CRYPT_MD5,
    CRYPT_SHA256,
    CRYPT_SHA512,
    PRIVATE_KEY_HEADER,
];

/// An ordered list of compiled regular expressions.
///
/// Matching is unanchored: a pattern matches when it is found anywhere in the
/// input.
#[derive(Clone, Debug, Default)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Compiles `sources` in order.
    pub fn compile<S: AsRef<str>>(sources: &[S]) -> Result<Self, RedactorError> {
        let patterns = sources
            .iter()
            .map(|source| {
                let source = source.as_ref();
                Regex::new(source).map_err(|err| RedactorError::InvalidPattern {
                    pattern: source.to_owned(),
                    source: err,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Returns `true` when any pattern matches `input`.
    pub fn is_match(&self, input: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(input))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Source text of each pattern, in order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }
}
