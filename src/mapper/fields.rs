use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;

//Trim and cut a free-text field to at most `max` characters. Empty and
//whitespace-only values collapse to None. Character count, not bytes: the
//export carries accented Spanish text.
pub fn truncate(value: Option<&str>, max: usize) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(max).collect())
}

//Currency and numeric columns arrive as "$1,234.56" style strings. Strips the
//currency symbol, thousands separators and whitespace, then parses strictly;
//anything left that is not a plain decimal is None.
pub fn parse_number(value: Option<&str>) -> Option<Decimal> {
    let raw = value?;
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

//Dates come in two shapes: "31/01/2020" (day first) or ISO-8601. Impossible
//calendar dates map to None rather than erroring the row.
pub fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.contains('/') {
        let mut parts = trimmed.splitn(3, '/');
        let day: u32 = parts.next()?.trim().parse().ok()?;
        let month: u32 = parts.next()?.trim().parse().ok()?;
        let year: i32 = parts.next()?.trim().parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(trimmed).ok().map(|dt| dt.date_naive())
}

//Boolean columns hold Spanish yes/no tokens. Everything outside the accepted
//set, including empty, is false.
pub fn parse_flag(value: Option<&str>) -> bool {
    let Some(raw) = value else {
        return false;
    };
    matches!(
        raw.trim().to_lowercase().as_str(),
        "si" | "sí" | "true" | "1" | "yes"
    )
}
