// HTTP handlers, one module per resource

pub mod auth;
pub mod choices;
pub mod groups;
pub mod questions;
pub mod users;

use chrono::{DateTime, Utc};

use crate::api::links::{resolve, LinkError, Resource};

const DATETIME_FORMAT_ERROR: &str = "Datetime has wrong format. Use one of these formats instead: YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z].";

/// Parses an RFC 3339 timestamp from a request body
///
/// Seconds may be omitted, as in `2024-05-01T09:30Z`.
pub(crate) fn parse_datetime(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%#z"))
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| DATETIME_FORMAT_ERROR.to_string())
}

/// Resolves an inbound hyperlink, rendering failures as field messages
pub(crate) fn parse_link(url: &str, expected: Resource) -> Result<i64, String> {
    resolve(url, expected).map_err(|e: LinkError| e.to_string())
}
