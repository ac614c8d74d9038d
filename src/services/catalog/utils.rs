use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Day-month-year and year-month-day layouts tried first, in order.
pub const DATE_FORMATS: [&str; 10] = [
    "%d.%m.%Y", "%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y",
    "%d.%m.%y", "%d/%m/%y", "%y-%m-%d", "%d-%m-%y",
    "%Y.%m.%d", "%Y/%m/%d",
];

const DATETIME_FORMATS: [&str; 14] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

const NAMED_MONTH_FORMATS: [&str; 6] = [
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d-%b-%Y",
    "%m/%d/%Y",
];

/// Month-and-year layouts, parsed as the first day of that month.
const MONTH_YEAR_FORMATS: [&str; 2] = ["%d %B %Y", "%d %b %Y"];

type Attempt = fn(&str) -> bool;

fn fixed_date_formats(s: &str) -> bool {
    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(s, fmt).is_ok())
}

fn datetime_formats(s: &str) -> bool {
    DATETIME_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(s, fmt).is_ok())
}

fn rfc3339(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
}

fn rfc2822(s: &str) -> bool {
    DateTime::parse_from_rfc2822(s).is_ok()
}

fn named_month_formats(s: &str) -> bool {
    NAMED_MONTH_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(s, fmt).is_ok())
}

fn is_four_digit_year(s: &str) -> bool {
    s.len() == 4 && s.chars().all(|c| c.is_ascii_digit())
}

/// `2023-01` and `01.2023`. The year must have four digits so decimals such as
/// `12.5` stay numbers.
fn year_month(s: &str) -> bool {
    if let Some((year, month)) = s.split_once('-') {
        if is_four_digit_year(year)
            && NaiveDate::parse_from_str(&format!("{}-{}-01", year, month), "%Y-%m-%d").is_ok()
        {
            return true;
        }
    }
    if let Some((month, year)) = s.split_once('.') {
        if is_four_digit_year(year)
            && NaiveDate::parse_from_str(&format!("01.{}.{}", month, year), "%d.%m.%Y").is_ok()
        {
            return true;
        }
    }
    false
}

/// `Jan 2023` and `January 2023`.
fn month_name_year(s: &str) -> bool {
    let with_day = format!("1 {}", s);
    MONTH_YEAR_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(&with_day, fmt).is_ok())
}

/// Evaluated in order until one accepts. Everything after the fixed layouts is
/// the generic fallback.
const DATE_ATTEMPTS: [Attempt; 7] = [
    fixed_date_formats,
    datetime_formats,
    rfc3339,
    rfc2822,
    named_month_formats,
    year_month,
    month_name_year,
];

pub fn is_date_string(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() {
        return false;
    }
    DATE_ATTEMPTS.iter().any(|attempt| attempt(s))
}

/// Comma decimal separators become periods and whitespace is dropped before parsing.
pub fn is_numeric_string(s: &str) -> bool {
    let normalized: String = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    !normalized.is_empty() && normalized.parse::<f64>().is_ok()
}
