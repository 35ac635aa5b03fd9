// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

pub const DATE_LAYOUT: &str = "YYYY-MM-DD";
pub const NOT_MODIFIED: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    InvalidDate,
    InvalidTimestamp,
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate => write!(f, "invalid date value; expected {DATE_LAYOUT}"),
            Self::InvalidTimestamp => f.write_str("invalid timestamp value"),
        }
    }
}

impl std::error::Error for FormatError {}

pub fn format_amount(amount: f64) -> String {
    format!("{amount}")
}

pub fn format_business_date(date: Date) -> String {
    date.format(&format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

/// Accepts a bare `YYYY-MM-DD` or anything that starts with one, such as a
/// full ISO timestamp.
pub fn parse_business_date(input: &str) -> Result<Date, FormatError> {
    let trimmed = input.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    Date::parse(head, &format_description!("[year]-[month]-[day]"))
        .map_err(|_| FormatError::InvalidDate)
}

/// RFC 3339 first. Anything without an offset, `T` or space separated and
/// with or without fractional seconds, is read as UTC.
pub fn parse_timestamp(input: &str) -> Result<OffsetDateTime, FormatError> {
    let trimmed = input.trim();
    if let Ok(value) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(value);
    }

    let naive = trimmed.replacen('T', " ", 1);
    PrimitiveDateTime::parse(
        &naive,
        &format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            &naive,
            &format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
        )
    })
    .map(PrimitiveDateTime::assume_utc)
    .map_err(|_| FormatError::InvalidTimestamp)
}

pub fn format_timestamp(value: OffsetDateTime) -> String {
    value
        .format(&Rfc3339)
        .unwrap_or_else(|_| format_modification_stamp(value))
}

/// Layout the backend expects for the `modified` column.
pub fn format_modification_stamp(value: OffsetDateTime) -> String {
    value
        .format(&format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .unwrap_or_else(|_| value.to_string())
}

pub fn format_clock(value: OffsetDateTime) -> String {
    value
        .format(&format_description!(
            "[hour repr:12 padding:none]:[minute] [period]"
        ))
        .unwrap_or_else(|_| value.time().to_string())
}

pub fn format_modified_clock(value: Option<OffsetDateTime>) -> String {
    value.map_or_else(|| NOT_MODIFIED.to_owned(), format_clock)
}

#[cfg(test)]
mod tests {
    use super::{
        FormatError, format_amount, format_business_date, format_clock,
        format_modification_stamp, format_modified_clock, format_timestamp,
        parse_business_date, parse_timestamp,
    };
    use time::macros::datetime;
    use time::{Date, Month};

    #[test]
    fn whole_amounts_have_no_fraction() {
        assert_eq!(format_amount(50.0), "50");
        assert_eq!(format_amount(12.5), "12.5");
    }

    #[test]
    fn business_date_round_trip_and_prefix() -> Result<(), FormatError> {
        let expected = Date::from_calendar_date(2026, Month::March, 2).expect("valid date");
        assert_eq!(parse_business_date("2026-03-02")?, expected);
        assert_eq!(parse_business_date("2026-03-02T00:00:00.000Z")?, expected);
        assert_eq!(format_business_date(expected), "2026-03-02");
        assert_eq!(
            parse_business_date("03/02/2026"),
            Err(FormatError::InvalidDate)
        );
        Ok(())
    }

    #[test]
    fn timestamps_accept_rfc3339_and_plain_layout() -> Result<(), FormatError> {
        assert_eq!(
            parse_timestamp("2026-03-02T14:05:00Z")?,
            datetime!(2026-03-02 14:05:00 UTC)
        );
        assert_eq!(
            parse_timestamp("2026-03-02 14:05:00")?,
            datetime!(2026-03-02 14:05:00 UTC)
        );
        assert_eq!(parse_timestamp("yesterday"), Err(FormatError::InvalidTimestamp));
        Ok(())
    }

    #[test]
    fn timestamps_without_offset_read_as_utc() -> Result<(), FormatError> {
        let expected = datetime!(2026-03-02 12:34:56 UTC);
        assert_eq!(parse_timestamp("2026-03-02T12:34:56")?, expected);
        assert_eq!(parse_timestamp("2026-03-02T12:34:56.000")?, expected);
        assert_eq!(
            parse_timestamp("2026-03-02 12:34:56.123")?,
            datetime!(2026-03-02 12:34:56.123 UTC)
        );
        assert_eq!(
            parse_timestamp("2026-03-02T12:34:56.000+05:30")?,
            datetime!(2026-03-02 12:34:56 +05:30)
        );
        assert_eq!(
            parse_timestamp("2026-03-02T12:34"),
            Err(FormatError::InvalidTimestamp)
        );
        Ok(())
    }

    #[test]
    fn timestamp_formats() {
        let value = datetime!(2026-03-02 14:05:09 UTC);
        assert_eq!(format_timestamp(value), "2026-03-02T14:05:09Z");
        assert_eq!(format_modification_stamp(value), "2026-03-02 14:05:09");
        assert_eq!(format_clock(value), "2:05 PM");
        assert_eq!(format_clock(datetime!(2026-03-02 00:30:00 UTC)), "12:30 AM");
    }

    #[test]
    fn clock_shows_the_stamp_offset_without_local_conversion() -> Result<(), FormatError> {
        let naive = parse_timestamp("2026-03-02 14:05:09")?;
        assert_eq!(format_clock(naive), "2:05 PM");
        let offset = parse_timestamp("2026-03-02T14:05:09+05:30")?;
        assert_eq!(format_clock(offset), "2:05 PM");
        Ok(())
    }

    #[test]
    fn missing_modification_shows_placeholder() {
        assert_eq!(format_modified_clock(None), "N/A");
    }
}
