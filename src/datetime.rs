//! Conversion between picker output, display strings and due instants.
//!
//! All instants are computed in a fixed UTC+8 offset regardless of the
//! device timezone. Changing the offset moves every persisted reminder.

use std::fmt::Display;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use thiserror::Error;

use crate::task::DueInstant;

pub const REMINDER_UTC_OFFSET_SECS: i32 = 8 * 3600;

const INSTANT_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("Time of day is out of range. [hour = {hour}, minute = {minute}]")]
    TimeOutOfRange { hour: u32, minute: u32 },

    #[error("Cannot interpret '{0}' as a reminder instant")]
    UnparseableInstant(String),

    #[error("Cannot parse display date '{0}'")]
    InvalidDisplayDate(String),

    #[error("Cannot parse display time '{0}'")]
    InvalidDisplayTime(String),
}

/// Calendar date as a date picker yields it. `month` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickedDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Clock time in 24-hour form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickedTime {
    pub hour: u32,
    pub minute: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDateTime {
    pub display_date: String,
    /// `HH:mm:00`, used only to build the instant.
    pub time_24h: String,
    pub display_time: String,
    pub due: DueInstant,
}

pub fn reminder_offset() -> FixedOffset {
    FixedOffset::east_opt(REMINDER_UTC_OFFSET_SECS).expect("UTC+8 is always in bounds.")
}

pub fn normalize(
    date: PickedDate,
    time: PickedTime,
) -> Result<NormalizedDateTime, NormalizationError> {
    if time.hour > 23 || time.minute > 59 {
        return Err(NormalizationError::TimeOutOfRange {
            hour: time.hour,
            minute: time.minute,
        });
    }

    let display_date = format_display_date(date);
    let time_24h = format!("{:02}:{:02}:00", time.hour, time.minute);
    let display_time = format_display_time(time.hour, time.minute);
    let due = parse_instant(&format!("{display_date} {time_24h}"))?;

    Ok(NormalizedDateTime {
        display_date,
        time_24h,
        display_time,
        due,
    })
}

pub fn format_display_date(date: PickedDate) -> String {
    format!("{:02}/{:02}/{}", date.day, date.month, date.year)
}

pub fn format_display_time(hour24: u32, minute: u32) -> String {
    let period = if hour24 < 12 { "A.M" } else { "P.M" };
    let hour = match hour24 {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };

    format!("{hour:02}:{minute:02} {period}")
}

/// Inverse of [`format_display_time`]. Accepts `09:15 A.M`, `9:15 am`, `09:15PM`.
pub fn parse_display_time(text: &str) -> Result<PickedTime, NormalizationError> {
    let invalid = || NormalizationError::InvalidDisplayTime(text.to_owned());

    let cleaned = text.replace('.', "");
    let (hour_part, rest) = cleaned.split_once(':').ok_or_else(invalid)?;
    let rest = rest.trim();
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (minute_part, period) = rest.split_at(digits_end);

    let hour12: u32 = hour_part.trim().parse().map_err(|_| invalid())?;
    let minute: u32 = minute_part.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&hour12) || minute > 59 {
        return Err(invalid());
    }

    let hour = match (period.trim().to_ascii_uppercase().as_str(), hour12) {
        ("PM", 12) => 12,
        ("PM", h) => h + 12,
        ("AM", 12) => 0,
        ("AM", h) => h,
        _ => return Err(invalid()),
    };

    Ok(PickedTime { hour, minute })
}

pub fn parse_display_date(text: &str) -> Result<PickedDate, NormalizationError> {
    let invalid = || NormalizationError::InvalidDisplayDate(text.to_owned());

    let parts = text
        .trim()
        .split('/')
        .map(|part| part.parse::<i64>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;
    let &[day, month, year] = parts.as_slice() else {
        return Err(invalid());
    };

    let day = u32::try_from(day).map_err(|_| invalid())?;
    let month = u32::try_from(month).map_err(|_| invalid())?;
    let year = i32::try_from(year).map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;

    Ok(PickedDate { year, month, day })
}

/// The UTC+8 interpretation of a stored `(display_date, display_time)` pair.
pub fn due_instant_of(
    display_date: &str,
    display_time: &str,
) -> Result<DueInstant, NormalizationError> {
    let date = parse_display_date(display_date)?;
    let time = parse_display_time(display_time)?;

    normalize(date, time).map(|normalized| normalized.due)
}

pub fn format_created_at<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format(CREATED_AT_FORMAT).to_string()
}

fn parse_instant(text: &str) -> Result<DueInstant, NormalizationError> {
    let unparseable = || NormalizationError::UnparseableInstant(text.to_owned());

    let naive = NaiveDateTime::parse_from_str(text, INSTANT_FORMAT).map_err(|_| unparseable())?;
    let at = reminder_offset()
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(unparseable)?;

    Ok(DueInstant::from_millis(at.timestamp_millis()))
}
