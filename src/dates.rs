use chrono::{Datelike, NaiveDate};

use crate::config;

/// Input mask for the birth-date field: digits only, slashes inserted after
/// the day and month, truncated to DD/MM/YYYY length.
pub fn mask_input(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let mut out = String::with_capacity(10);
    for (i, ch) in digits.chars().take(8).enumerate() {
        if i == 2 || i == 4 {
            out.push('/');
        }
        out.push(ch);
    }
    out
}

/// Parse a DD/MM/YYYY string into a calendar date. Rejects anything that
/// does not split into three numeric parts or does not name a real day
/// (31/02/2010 and the like fail the round-trip).
pub fn parse_birth_date(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = parts[0].trim().parse().ok()?;
    let month: u32 = parts[1].trim().parse().ok()?;
    let year: i32 = parts[2].trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn birth_year_in_range(date: &NaiveDate) -> bool {
    (config::BIRTH_YEAR_MIN..=config::BIRTH_YEAR_MAX).contains(&date.year())
}
