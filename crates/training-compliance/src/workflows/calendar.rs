//! Date parsing and calendar-month arithmetic shared by the evaluators.
//!
//! Source documents carry dates as `DD/MM/YYYY` strings, with occasional ISO
//! dates or RFC 3339 timestamps from newer writers.

use chrono::{DateTime, Datelike, Months, NaiveDate};

const LEGACY_FORMAT: &str = "%d/%m/%Y";

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, LEGACY_FORMAT) {
        return Some(date);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    None
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(LEGACY_FORMAT).to_string()
}

/// Whole calendar months from `start` to `today`, ignoring the day of month.
/// A start date in the future counts as zero.
pub fn months_between(today: NaiveDate, start: NaiveDate) -> u32 {
    let years = today.year() - start.year();
    let months = today.month() as i32 - start.month() as i32;
    (years * 12 + months).max(0) as u32
}

/// Adds calendar months, clamping to the last day of shorter months.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Serde adapters rendering dates in the legacy `DD/MM/YYYY` form.
pub mod serde_date {
    use super::{format_date, parse_date};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_date(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognized date '{raw}'")))
    }

    pub mod option {
        use super::super::{format_date, parse_date};
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match date {
                Some(date) => serializer.serialize_some(&format_date(*date)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let opt = Option::<String>::deserialize(deserializer)?;
            opt.filter(|value| !value.trim().is_empty())
                .map(|value| {
                    parse_date(&value).ok_or_else(|| {
                        serde::de::Error::custom(format!("unrecognized date '{value}'"))
                    })
                })
                .transpose()
        }
    }
}
