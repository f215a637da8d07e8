//! Stop identifiers and stop records.

use std::fmt;

use serde::Serialize;

/// Longest stop identifier accepted in a request path.
const MAX_STOP_ID_LEN: usize = 32;

/// Error returned when parsing an invalid stop identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop ID: {reason}")]
pub struct InvalidStopId {
    reason: &'static str,
}

/// A transit-system stop identifier that is safe to place in a URL path.
///
/// KMB stop IDs are 16 hex characters, but the directory is not
/// guaranteed to stick to that, so any short ASCII alphanumeric string
/// is accepted.
///
/// # Examples
///
/// ```
/// use stop_board::domain::StopId;
///
/// let id = StopId::parse("18492910339410B1").unwrap();
/// assert_eq!(id.as_str(), "18492910339410B1");
///
/// // Path separators are rejected
/// assert!(StopId::parse("../stop").is_err());
///
/// // Empty is rejected
/// assert!(StopId::parse("").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StopId(String);

impl StopId {
    /// Parse a stop ID, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidStopId> {
        let s = s.trim();

        if s.is_empty() {
            return Err(InvalidStopId {
                reason: "must not be empty",
            });
        }

        if s.len() > MAX_STOP_ID_LEN {
            return Err(InvalidStopId {
                reason: "must be at most 32 characters",
            });
        }

        if !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(InvalidStopId {
                reason: "must be ASCII letters and digits",
            });
        }

        Ok(StopId(s.to_string()))
    }

    /// Returns the stop ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stop from the remote directory. Read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stop {
    /// Transit-system identifier.
    pub id: String,

    /// Primary (Traditional Chinese) name.
    pub name_primary: String,

    /// Secondary (English) name.
    pub name_secondary: String,
}

impl Stop {
    /// Whether either name contains `needle`, which must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.name_primary.to_lowercase().contains(needle)
            || self.name_secondary.to_lowercase().contains(needle)
    }
}
