//! Identifier and timestamp helpers shared by the transition functions.

use crate::error::AppError;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// RFC 3339 in UTC. Falls back to the unix timestamp for the
/// out-of-range years the formatter refuses.
pub fn format_timestamp(at: OffsetDateTime) -> String {
    let utc = at.to_offset(UtcOffset::UTC);
    utc.format(&Rfc3339)
        .unwrap_or_else(|_| utc.unix_timestamp().to_string())
}

pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, AppError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|_| AppError::invalid_data("timestamp must be RFC3339"))
}

pub fn format_date(date: Date) -> String {
    let format = format_description!("[year]-[month]-[day]");
    date.format(&format)
        .unwrap_or_else(|_| date.to_string())
}

pub fn parse_date(value: &str) -> Result<Date, AppError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(value.trim(), &format)
        .map_err(|_| AppError::invalid_input("date must be YYYY-MM-DD"))
}

pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

pub fn today() -> Date {
    OffsetDateTime::now_utc().to_offset(local_offset()).date()
}

/// Calendar day a timestamp falls on once shifted into `offset`.
pub fn local_date_of(timestamp: &str, offset: UtcOffset) -> Option<Date> {
    parse_timestamp(timestamp)
        .ok()
        .map(|at| at.to_offset(offset).date())
}
