// Calendar-day lookup keys
//
// Daily minute totals live in the synchronized partition under a key derived
// from the local calendar date, e.g. `3/7/2024`.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate};

/// Lookup key for a calendar day: `month/day/year`, without zero padding.
pub fn date_key(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

/// Lookup key for the local calendar day containing `instant`.
pub fn date_key_for(instant: &DateTime<Local>) -> String {
    date_key(instant.date_naive())
}

/// Lookup key for today in the local time zone.
pub fn today_key() -> String {
    date_key_for(&Local::now())
}

/// The seven days of the Sunday-start week containing `date`.
pub fn week_dates(date: NaiveDate) -> [NaiveDate; 7] {
    let sunday = date - Duration::days(i64::from(date.weekday().num_days_from_sunday()));
    std::array::from_fn(|offset| sunday + Duration::days(offset as i64))
}

/// Lookup keys for the Sunday-start week containing `date`, Sunday first.
pub fn week_keys(date: NaiveDate) -> [String; 7] {
    week_dates(date).map(date_key)
}
