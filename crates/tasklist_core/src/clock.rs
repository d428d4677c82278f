use crate::error::AppError;
use std::cell::Cell;
use std::rc::Rc;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// Source of "now" for creation and completion stamps.
pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Manually driven clock. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Rc<Cell<OffsetDateTime>>,
}

impl FixedClock {
    pub fn new(now: OffsetDateTime) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    pub fn set(&self, now: OffsetDateTime) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.now.get()
    }
}

pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// UTC timestamp with millisecond precision and a `Z` suffix.
pub fn iso_timestamp(at: OffsetDateTime) -> Result<String, AppError> {
    at.to_offset(UtcOffset::UTC)
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        ))
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

/// Milliseconds since the Unix epoch.
pub fn unix_millis(at: OffsetDateTime) -> i128 {
    at.unix_timestamp_nanos() / 1_000_000
}

/// Parses a stored deadline or timestamp.
///
/// RFC 3339 values carry their own offset. Naive date-times
/// (`YYYY-MM-DDTHH:MM[:SS]`) are read in `offset`; bare dates are UTC midnight.
pub fn parse_timestamp(value: &str, offset: UtcOffset) -> Option<OffsetDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(parsed);
    }

    let with_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let without_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]");
    if let Ok(parsed) = PrimitiveDateTime::parse(value, with_seconds)
        .or_else(|_| PrimitiveDateTime::parse(value, without_seconds))
    {
        return Some(parsed.assume_offset(offset));
    }

    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc())
}

/// Long Indonesian date-time, e.g. `1 Januari 2025 pukul 10.00.00`.
///
/// `None` when the instant cannot be represented in `offset`.
pub fn format_long(at: OffsetDateTime, offset: UtcOffset) -> Option<String> {
    let local = at.checked_to_offset(offset)?;
    Some(format!(
        "{} {} {} pukul {:02}.{:02}.{:02}",
        local.day(),
        month_name(local.month()),
        local.year(),
        local.hour(),
        local.minute(),
        local.second()
    ))
}

/// Formats a stored value for display; unparseable values are shown as-is.
pub fn format_stored(value: &str, offset: UtcOffset) -> String {
    parse_timestamp(value, offset)
        .and_then(|parsed| format_long(parsed, offset))
        .unwrap_or_else(|| value.to_string())
}

fn month_name(month: Month) -> &'static str {
    match month {
        Month::January => "Januari",
        Month::February => "Februari",
        Month::March => "Maret",
        Month::April => "April",
        Month::May => "Mei",
        Month::June => "Juni",
        Month::July => "Juli",
        Month::August => "Agustus",
        Month::September => "September",
        Month::October => "Oktober",
        Month::November => "November",
        Month::December => "Desember",
    }
}
