use super::normalizer::non_empty;
use super::schema::{CanonicalField, SchemaMapping};
use crate::workflows::feedback::{FeedbackRecord, SentimentLabel};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Largest serial day number spreadsheets accept (9999-12-31).
const MAX_SERIAL_DAY: f64 = 2_958_465.0;

/// Builds a record from one CSV row. `None` means the timestamp could not be read.
pub(crate) fn parse_row(row: &csv::StringRecord, mapping: &SchemaMapping) -> Option<FeedbackRecord> {
    let cell = |field: CanonicalField| {
        mapping
            .column(field)
            .and_then(|index| row.get(index))
            .and_then(non_empty)
    };
    let owned = |field: CanonicalField| cell(field).map(str::to_string);

    let timestamp = parse_timestamp(cell(CanonicalField::Date)?, cell(CanonicalField::Hour))?;

    Some(FeedbackRecord {
        timestamp,
        comment: owned(CanonicalField::Comment),
        rating: cell(CanonicalField::RatingDescription).and_then(SentimentLabel::from_rating),
        area: owned(CanonicalField::Area).unwrap_or_default(),
        room: owned(CanonicalField::Room).unwrap_or_default(),
        location: owned(CanonicalField::Location),
        critical_point: owned(CanonicalField::CriticalPoints),
        highlight: owned(CanonicalField::Highlights),
    })
}

/// Reads the date cell; the hour cell fills in the time when the date carries none.
pub(crate) fn parse_timestamp(date: &str, hour: Option<&str>) -> Option<NaiveDateTime> {
    let (timestamp, has_time) = parse_date_cell(date.trim())?;
    if has_time {
        return Some(timestamp);
    }

    match hour.and_then(parse_time_of_day) {
        Some(time) => Some(timestamp.date().and_time(time)),
        None => Some(timestamp),
    }
}

fn parse_date_cell(value: &str) -> Option<(NaiveDateTime, bool)> {
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some((dt.naive_local(), true));
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some((dt, true));
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some((date.and_time(NaiveTime::MIN), false));
        }
    }

    parse_serial(value)
}

/// Spreadsheet serial date: days since 1899-12-30, fraction is time of day.
fn parse_serial(value: &str) -> Option<(NaiveDateTime, bool)> {
    let serial: f64 = value.parse().ok()?;
    if !serial.is_finite() || !(1.0..=MAX_SERIAL_DAY).contains(&serial) {
        return None;
    }

    let days = serial.trunc();
    let seconds = ((serial - days) * 86_400.0).round() as i64;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(NaiveTime::MIN);
    let timestamp = epoch
        .checked_add_signed(Duration::days(days as i64))?
        .checked_add_signed(Duration::seconds(seconds))?;

    Some((timestamp, seconds != 0))
}

fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    for format in ["%H:%M:%S", "%H:%M"] {
        if let Ok(time) = NaiveTime::parse_from_str(value, format) {
            return Some(time);
        }
    }

    if let Ok(hour) = value.parse::<u32>() {
        return NaiveTime::from_hms_opt(hour, 0, 0);
    }

    // fraction of a day, as spreadsheets store times
    let fraction: f64 = value.parse().ok()?;
    if !(0.0..1.0).contains(&fraction) {
        return None;
    }
    let seconds = (fraction * 86_400.0).round() as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds.min(86_399), 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .expect("valid date")
            .and_hms_opt(h, min, 0)
            .expect("valid time")
    }

    #[test]
    fn accepts_iso_and_day_first_encodings() {
        assert_eq!(parse_timestamp("2025-03-01 14:05", None), Some(at(2025, 3, 1, 14, 5)));
        assert_eq!(parse_timestamp("01/03/2025", None), Some(at(2025, 3, 1, 0, 0)));
        assert_eq!(
            parse_timestamp("2025-03-01T09:30:00-03:00", None),
            Some(at(2025, 3, 1, 9, 30))
        );
    }

    #[test]
    fn serial_days_use_the_spreadsheet_epoch() {
        assert_eq!(parse_timestamp("45717", None), Some(at(2025, 3, 1, 0, 0)));
        assert_eq!(parse_timestamp("45717.75", None), Some(at(2025, 3, 1, 18, 0)));
    }

    #[test]
    fn hour_column_fills_date_only_cells() {
        assert_eq!(parse_timestamp("2025-03-01", Some("13:45")), Some(at(2025, 3, 1, 13, 45)));
        assert_eq!(parse_timestamp("2025-03-01", Some("8")), Some(at(2025, 3, 1, 8, 0)));
        assert_eq!(parse_timestamp("2025-03-01", Some("0.5")), Some(at(2025, 3, 1, 12, 0)));
        // a date that already carries a time keeps it
        assert_eq!(
            parse_timestamp("2025-03-01 10:00", Some("13:45")),
            Some(at(2025, 3, 1, 10, 0))
        );
        assert_eq!(parse_timestamp("2025-03-01", Some("tarde")), Some(at(2025, 3, 1, 0, 0)));
    }

    #[test]
    fn rejects_unreadable_dates() {
        assert_eq!(parse_timestamp("ayer", None), None);
        assert_eq!(parse_timestamp("", None), None);
        assert_eq!(parse_timestamp("-4", None), None);
        assert_eq!(parse_timestamp("31/02/2025", None), None);
    }
}
