//! SQLite helper utilities for type conversion
//!
//! SQLite has no native timestamp or UUID types. Timestamps are stored as
//! RFC 3339 TEXT and user keys as UUID strings; this module converts between
//! those representations and the Rust types used by the repositories.

use anyhow::{Result, anyhow};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

// ============================================================================
// Key Helpers
// ============================================================================

/// Generate a new user key
#[inline]
pub fn new_user_key() -> String {
    Uuid::new_v4().to_string()
}

// ============================================================================
// Timestamp Helpers (stored as RFC 3339 TEXT in SQLite)
// ============================================================================

/// Get current UTC timestamp as an RFC 3339 string for SQLite.
///
/// Always microsecond precision with a `Z` suffix so stored values sort
/// lexicographically in time order.
#[inline]
pub fn now_iso8601() -> String {
    datetime_to_str(Utc::now())
}

/// Convert a chrono DateTime to the stored string form
#[inline]
pub fn datetime_to_str(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp to DateTime
#[inline]
pub fn str_to_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // SQLite's datetime() format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
                .map_err(|e| anyhow!("Invalid datetime '{}': {}", s, e))
        })
}

/// Map a timestamp parse failure into a row decode error
pub fn decode_datetime(s: &str) -> sqlx::Result<DateTime<Utc>> {
    str_to_datetime(s).map_err(|e| sqlx::Error::Decode(e.into()))
}
