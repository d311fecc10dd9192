use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Postgres truncates identifiers longer than NAMEDATALEN - 1 bytes.
const MAX_IDENT_LEN: usize = 63;

static IDENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+$").expect("identifier pattern is valid")
});

/// A feed identifier that has been checked to be safe as a relation name.
///
/// The only way to get one is [`FeedIdent::parse`], so any `FeedIdent` can be
/// rendered into SQL through [`FeedIdent::quoted`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedIdent(String);

impl FeedIdent {
    /// Validate a caller-supplied identifier.
    ///
    /// Returns `None` for empty, overlong or non `[A-Za-z0-9_-]` input.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() || raw.len() > MAX_IDENT_LEN || !IDENT_PATTERN.is_match(raw) {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted relation reference, with embedded quotes doubled.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0.replace('"', "\"\""))
    }
}

impl fmt::Display for FeedIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
