//! HTTP metadata stored alongside cached bodies
//!
//! Status lines, headers and dates are kept in their textual wire form so the
//! index document stays readable and round-trips byte-for-byte.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// IMF-fixdate, the preferred HTTP-date form (`Sun, 06 Nov 1994 08:49:37 GMT`)
const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
/// Obsolete RFC 850 form (`Sunday, 06-Nov-94 08:49:37 GMT`)
const RFC_850: &str = "%A, %d-%b-%y %H:%M:%S GMT";
/// ANSI C `asctime()` form, whitespace-collapsed before parsing
const ASCTIME: &str = "%a %b %d %H:%M:%S %Y";

/// Render a timestamp as an IMF-fixdate HTTP-date
#[must_use]
pub fn format_http_date(date: &DateTime<Utc>) -> String {
    date.format(IMF_FIXDATE).to_string()
}

/// Parse any of the three HTTP-date forms accepted by HTTP/1.1 recipients
///
/// # Errors
///
/// Returns [`Error::InvalidDate`] if the value matches none of the forms.
pub fn parse_http_date(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();
    let collapsed = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");

    NaiveDateTime::parse_from_str(trimmed, IMF_FIXDATE)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, RFC_850))
        .or_else(|_| NaiveDateTime::parse_from_str(&collapsed, ASCTIME))
        .map(|naive| naive.and_utc())
        .map_err(|_| Error::InvalidDate {
            value: value.to_string(),
        })
}

/// Drop sub-second precision, which HTTP-dates cannot represent
#[must_use]
pub fn truncate_to_seconds(date: DateTime<Utc>) -> DateTime<Utc> {
    date.with_nanosecond(0).unwrap_or(date)
}

/// Response status line: protocol version, status code and reason phrase
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatusLine {
    /// Protocol version, e.g. `HTTP/1.1`
    pub version: String,
    /// Numeric status code
    pub code: u16,
    /// Reason phrase, possibly empty
    pub reason: String,
}

impl StatusLine {
    /// Build a status line with an explicit version and reason
    #[must_use]
    pub fn new(version: impl Into<String>, code: u16, reason: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            code,
            reason: reason.into(),
        }
    }

    /// `HTTP/1.1 200 OK`
    #[must_use]
    pub fn ok() -> Self {
        Self::new("HTTP/1.1", 200, "OK")
    }

    /// Check that the line reads back unchanged from its textual form
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStatusLine`] for a malformed version, a code
    /// outside `100..=999`, or a reason with surrounding whitespace.
    pub fn validate(&self) -> Result<()> {
        let line = self.to_string();
        match line.parse::<Self>() {
            Ok(parsed) if parsed == *self => Ok(()),
            _ => Err(Error::InvalidStatusLine { line }),
        }
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reason.is_empty() {
            write!(f, "{} {}", self.version, self.code)
        } else {
            write!(f, "{} {} {}", self.version, self.code, self.reason)
        }
    }
}

fn is_valid_version(version: &str) -> bool {
    let Some((protocol, number)) = version.split_once('/') else {
        return false;
    };
    if protocol.is_empty() || !protocol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }
    let (major, minor) = number.split_once('.').unwrap_or((number, "0"));
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    digits(major) && digits(minor)
}

impl FromStr for StatusLine {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidStatusLine {
            line: s.to_string(),
        };
        let line = s.trim();
        let (version, rest) = line.split_once(' ').ok_or_else(invalid)?;
        if !is_valid_version(version) {
            return Err(invalid());
        }

        let rest = rest.trim_start();
        let (code, reason) = rest.split_once(' ').unwrap_or((rest, ""));
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let code = code.parse::<u16>().map_err(|_| invalid())?;

        Ok(Self::new(version, code, reason))
    }
}

/// A single response header, kept in arrival order by [`crate::CacheEntry`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Header {
    /// Header name as received
    pub name: String,
    /// Header value with surrounding whitespace removed
    pub value: String,
}

impl Header {
    /// Build a header from a name and value
    ///
    /// Surrounding whitespace is stripped from both, as when parsing.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            value: value.into().trim().to_string(),
        }
    }

    /// Check that the header reads back unchanged from `Name: value` form
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`] for an empty name, or a name holding
    /// whitespace or a colon.
    pub fn validate(&self) -> Result<()> {
        let header = self.to_string();
        match header.parse::<Self>() {
            Ok(parsed) if parsed == *self => Ok(()),
            _ => Err(Error::InvalidHeader { header }),
        }
    }

    /// Case-insensitive name comparison
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

impl FromStr for Header {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidHeader {
            header: s.to_string(),
        };
        let (name, value) = s.split_once(':').ok_or_else(invalid)?;
        let name = name.trim();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(invalid());
        }
        Ok(Self::new(name, value.trim()))
    }
}

// Headers and status lines travel through the index in their textual form.

impl Serialize for Header {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Header {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for StatusLine {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StatusLine {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Serde adapter storing `DateTime<Utc>` as an HTTP-date string
pub mod http_date {
    use super::{format_http_date, parse_http_date};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize as IMF-fixdate
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_http_date(date))
    }

    /// Deserialize from any accepted HTTP-date form
    ///
    /// # Errors
    ///
    /// Fails when the string is not an HTTP-date.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_http_date(&raw).map_err(serde::de::Error::custom)
    }
}
