use chrono::NaiveDate;

/// Parses a strict `DD/MM/YYYY` date. Anything else, including dates that
/// do not exist on the calendar, yields `None`.
pub fn parse_br_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    let bytes = trimmed.as_bytes();
    if bytes.len() != 10 || bytes[2] != b'/' || bytes[5] != b'/' {
        return None;
    }

    let all_digits = bytes
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != 2 && *index != 5)
        .all(|(_, byte)| byte.is_ascii_digit());
    if !all_digits {
        return None;
    }

    let day: u32 = trimmed[0..2].parse().ok()?;
    let month: u32 = trimmed[3..5].parse().ok()?;
    let year: i32 = trimmed[6..10].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn format_br_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

/// Parses `YYYY-MM`.
pub fn parse_year_month(text: &str) -> Option<YearMonth> {
    let (year, month) = text.trim().split_once('-')?;
    if year.len() != 4 || !(1..=2).contains(&month.len()) {
        return None;
    }
    if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    (1..=12)
        .contains(&month)
        .then_some(YearMonth { year, month })
}
