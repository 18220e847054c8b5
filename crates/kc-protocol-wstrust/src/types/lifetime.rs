//! Token lifetime.

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WsTrustResult;

/// Requested or issued token lifetime.
///
/// Both instants are optional on the wire; a lifetime with neither is never
/// written. The wire carries milliseconds, so the constructors and
/// [`parse_instant`] truncate finer instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lifetime {
    /// When the token becomes valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// When the token expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
}

impl Lifetime {
    /// Creates a lifetime from explicit instants.
    #[must_use]
    pub fn new(created: Option<DateTime<Utc>>, expires: Option<DateTime<Utc>>) -> Self {
        Self {
            created: created.map(to_millis),
            expires: expires.map(to_millis),
        }
    }

    /// Creates a lifetime starting at `created` and lasting `duration`.
    #[must_use]
    pub fn starting_at(created: DateTime<Utc>, duration: Duration) -> Self {
        Self::new(Some(created), Some(created + duration))
    }

    /// Returns true if neither instant is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.created.is_none() && self.expires.is_none()
    }

    /// Returns true if `now` falls within the lifetime.
    #[must_use]
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.created.map_or(true, |created| now >= created)
            && self.expires.map_or(true, |expires| now < expires)
    }
}

/// Formats an instant as `yyyy-MM-ddTHH:mm:ss.fffZ`.
#[must_use]
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an `xs:dateTime` into UTC.
///
/// # Errors
///
/// Returns a wire-format error if the text is not an RFC 3339 timestamp.
pub fn parse_instant(text: &str) -> WsTrustResult<DateTime<Utc>> {
    Ok(to_millis(DateTime::parse_from_rfc3339(text.trim())?.with_timezone(&Utc)))
}

fn to_millis(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(3)
}
