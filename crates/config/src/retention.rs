//! Retention switch shared by the logger and stream sections

use jot_core::Retention;
use serde::Deserialize;

/// How much history a section keeps
///
/// Accepts the keywords `"off"` and `"unbounded"`, or a plain integer
/// bound on the number of entries kept.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RetentionSpec {
    /// Keep nothing (default)
    #[default]
    Off,
    /// Keep every entry
    Unbounded,
    /// Keep the last n entries; 0 keeps nothing
    #[serde(untagged)]
    Last(usize),
}

impl RetentionSpec {
    /// The runtime retention policy this spec selects
    pub fn to_retention(self) -> Retention {
        match self {
            Self::Off => Retention::Off,
            Self::Unbounded => Retention::Unbounded,
            Self::Last(n) => Retention::Last(n),
        }
    }
}
