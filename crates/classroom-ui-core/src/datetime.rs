#![forbid(unsafe_code)]

//! `YYYY-MM-DD HH:MM` display formatting.
//!
//! Values are wall-clock times; nothing here converts between time zones.

use time::macros::format_description;
use time::{Date, PrimitiveDateTime};

/// Format a local date-time as `YYYY-MM-DD HH:MM` (24-hour, zero-padded).
///
/// `None` formats as the empty string.
#[must_use]
pub fn format_date_time(value: Option<PrimitiveDateTime>) -> String {
    value
        .and_then(|dt| {
            dt.format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
                .ok()
        })
        .unwrap_or_default()
}

/// Parse and format a date string as handed over by a page template.
///
/// For native hosts. In the browser, values go through `new Date(value)` so
/// zoned strings and timestamps land in the user's local time.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]` and the `T`-separated ISO
/// forms. Fractional seconds and a trailing `Z` are dropped; the wall clock
/// is kept as written. Empty or unparseable input yields `""`.
#[must_use]
pub fn format_date_time_str(input: &str) -> String {
    format_date_time(parse_local(input))
}

/// Parse the accepted input forms into a wall-clock date-time.
#[must_use]
pub fn parse_local(input: &str) -> Option<PrimitiveDateTime> {
    let trimmed = input.trim().trim_end_matches('Z');
    if trimmed.is_empty() {
        return None;
    }
    let whole = trimmed.split_once('.').map_or(trimmed, |(head, _)| head);
    let s = whole.replacen('T', " ", 1);
    PrimitiveDateTime::parse(
        &s,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(&s, format_description!("[year]-[month]-[day] [hour]:[minute]"))
    })
    .ok()
    .or_else(|| {
        Date::parse(&s, format_description!("[year]-[month]-[day]"))
            .ok()
            .map(Date::midnight)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use time::macros::datetime;

    #[test]
    fn none_is_empty() {
        assert_eq!(format_date_time(None), "");
    }

    #[test]
    fn pads_every_component() {
        assert_eq!(
            format_date_time(Some(datetime!(2024-03-05 09:07))),
            "2024-03-05 09:07"
        );
        assert_eq!(
            format_date_time(Some(datetime!(2023-12-31 23:59:59))),
            "2023-12-31 23:59"
        );
    }

    #[test]
    fn string_forms() {
        assert_eq!(format_date_time_str(""), "");
        assert_eq!(format_date_time_str("   "), "");
        assert_eq!(format_date_time_str("not a date"), "");
        assert_eq!(format_date_time_str("2024-03-05"), "2024-03-05 00:00");
        assert_eq!(format_date_time_str("2024-03-05T09:07"), "2024-03-05 09:07");
        assert_eq!(format_date_time_str("2024-03-05 09:07:42"), "2024-03-05 09:07");
        assert_eq!(
            format_date_time_str("2024-03-05T09:07:42.123456Z"),
            "2024-03-05 09:07"
        );
    }
}
