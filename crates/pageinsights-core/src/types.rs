//! Session-level domain records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// The authenticated user's own profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    /// Square avatar URL as resolved by the provider. No size is guaranteed.
    pub picture_url: String,
    #[serde(default)]
    pub profile_link: String,
}

/// A page administered by the authenticated user.
///
/// Field names follow the `me/accounts` payload so entries deserialize
/// directly from the provider response.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub name: String,
    pub access_token: String,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("access_token", &"[redacted]")
            .finish()
    }
}

/// Optional calendar-date bounds for an insights query.
///
/// Unset bounds are resolved at fetch time and never stored here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl DateRange {
    #[must_use]
    pub fn new(since: Option<NaiveDate>, until: Option<NaiveDate>) -> Self {
        Self { since, until }
    }

    /// Builds a range from raw date-picker strings.
    ///
    /// `None` and empty strings both mean "unset".
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDate`] if a non-empty value is not `YYYY-MM-DD`.
    pub fn parse(since: Option<&str>, until: Option<&str>) -> Result<Self, CoreError> {
        Ok(Self {
            since: parse_calendar_date(since)?,
            until: parse_calendar_date(until)?,
        })
    }
}

fn parse_calendar_date(raw: Option<&str>) -> Result<Option<NaiveDate>, CoreError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| CoreError::InvalidDate {
                input: s.to_string(),
            }),
    }
}
