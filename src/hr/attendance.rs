use chrono::{Datelike, NaiveDate, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::id_text;

/// Identifies the employee whose attendance is requested.
///
/// Ids are passed to the backend exactly as given.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StaffRef {
    pub staff_id: Value,
    pub site_id: Value,
    pub branch_id: Value,
}

/// One attendance record as returned by the backend.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct AttendanceEntry {
    /// Day of the record, `DD-MM-YYYY`.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub staff_id: Option<Value>,
    #[serde(default)]
    pub day_check_in_time: Option<String>,
    #[serde(default)]
    pub day_check_out_time: Option<String>,
    #[serde(default, rename = "night_check_In_time", alias = "night_check_in_time")]
    pub night_check_in_time: Option<String>,
    #[serde(default)]
    pub night_check_out_time: Option<String>,
}

impl AttendanceEntry {
    /// Parsed `date`, if present and well-formed.
    pub fn day(&self) -> Option<NaiveDate> {
        let raw = self.date.as_deref()?.trim();
        NaiveDate::parse_from_str(raw, "%d-%m-%Y").ok()
    }

    /// Time between check-in and check-out.
    ///
    /// The day shift is used when both of its times are present, otherwise the
    /// night shift. A check-out earlier than the check-in is taken to be on
    /// the next day. Missing or unparseable times give zero.
    pub fn worked_time(&self) -> TimeDelta {
        let pair = match (&self.day_check_in_time, &self.day_check_out_time) {
            (Some(check_in), Some(check_out)) if has_text(check_in) && has_text(check_out) => {
                Some((check_in, check_out))
            }
            _ => match (&self.night_check_in_time, &self.night_check_out_time) {
                (Some(check_in), Some(check_out)) if has_text(check_in) && has_text(check_out) => {
                    Some((check_in, check_out))
                }
                _ => None,
            },
        };

        let Some((check_in, check_out)) = pair else {
            return TimeDelta::zero();
        };
        match (parse_clock(check_in), parse_clock(check_out)) {
            (Some(start), Some(end)) => {
                let span = end - start;
                if span < TimeDelta::zero() {
                    span + TimeDelta::days(1)
                } else {
                    span
                }
            }
            _ => TimeDelta::zero(),
        }
    }
}

fn has_text(value: &str) -> bool {
    !value.trim().is_empty()
}

const CLOCK_FORMATS: &[&str] = &["%I:%M:%S %p", "%I:%M %p", "%H:%M:%S", "%H:%M"];

/// Parses a clock time such as `9:05:30 am` or `9:05 am`. 24-hour times are
/// accepted too; seconds are optional.
pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let normalized = raw.trim().to_ascii_uppercase();
    CLOCK_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(&normalized, format).ok())
}

/// Renders a duration as `HH:MM:SS`; hours are not wrapped at 24.
pub fn format_hms(duration: TimeDelta) -> String {
    let total = duration.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Keeps the entries of `staff_id` dated in the same calendar month as `month`.
///
/// Entries without a parseable date are dropped. Ids compare by their text
/// form, so `7` and `"7"` match.
pub fn filter_month(
    entries: impl IntoIterator<Item = AttendanceEntry>,
    staff_id: &Value,
    month: NaiveDate,
) -> Vec<AttendanceEntry> {
    let wanted = id_text(staff_id);
    entries
        .into_iter()
        .filter(|entry| {
            let in_month = entry
                .day()
                .is_some_and(|day| day.year() == month.year() && day.month() == month.month());
            let same_staff = wanted.is_some()
                && entry.staff_id.as_ref().and_then(id_text) == wanted;
            in_month && same_staff
        })
        .collect()
}
