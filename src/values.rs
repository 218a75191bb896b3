//! Cell values and the date/amount parsing shared by all engines.

use std::borrow::Cow;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::layout::{AmountParseConfig, DateFormatConfig};

/// One cell of a tabular statement, as read from CSV or a worksheet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl CellValue {
    /// Trims, and maps blank text to `Empty`.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self::Empty
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Empty => Cow::Borrowed(""),
            Self::Text(s) => Cow::Borrowed(s.as_str()),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Cow::Owned(format!("{n:.0}")),
            Self::Number(n) => Cow::Owned(n.to_string()),
            Self::Date(d) => Cow::Owned(d.format("%Y-%m-%d").to_string()),
        }
    }

    /// Non-blank trimmed text, if any.
    pub fn text(&self) -> Option<String> {
        let text = self.as_text();
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

/// Largest serial Excel accepts (9999-12-31).
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

/// Excel serial day number to a date. Day 0 is 1899-12-30 so that the
/// 1900 leap-year bug lines up for every date after February 1900.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(1.0..=EXCEL_MAX_SERIAL).contains(&serial) {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial.trunc() as i64))
}

fn is_time_suffix(rest: &str) -> bool {
    let rest = rest.trim();
    if rest.is_empty() {
        return true;
    }
    let rest = rest.strip_prefix('T').unwrap_or(rest);
    // fractional seconds from ISO stamps: 00:00:00.000
    let rest = rest.split_once('.').map_or(rest, |(clock, _)| clock);
    let parts: Vec<&str> = rest.split(':').collect();
    (2..=3).contains(&parts.len())
        && parts
            .iter()
            .all(|p| (1..=2).contains(&p.len()) && p.chars().all(|c| c.is_ascii_digit()))
}

impl DateFormatConfig {
    /// Tries the primary pattern, then each fallback. A trailing clock time
    /// (`14:22`, `14:22:05` or ISO `T00:00:00`) after the date is tolerated.
    pub fn parse_str(&self, raw: &str) -> Option<NaiveDate> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }
        for pattern in self.patterns() {
            if let Ok(date) = NaiveDate::parse_from_str(s, pattern) {
                return Some(date);
            }
            if let Ok((date, rest)) = NaiveDate::parse_and_remainder(s, pattern) {
                if is_time_suffix(rest) {
                    return Some(date);
                }
            }
        }
        None
    }
}

pub fn parse_date(cell: &CellValue, config: &DateFormatConfig) -> Option<NaiveDate> {
    match cell {
        CellValue::Empty => None,
        CellValue::Date(d) => Some(*d),
        CellValue::Number(n) => excel_serial_to_date(*n),
        CellValue::Text(s) => config.parse_str(s),
    }
}

/// Rewrites `s` so that `.` is the only separator left, as the decimal point.
/// When both `.` and `,` appear the later one is the decimal point, and a
/// repeated decimal point makes the amount ambiguous.
fn normalize_separators(s: &str, config: &AmountParseConfig) -> Option<String> {
    if s.contains('.') && s.contains(',') {
        let (decimal, group) = if s.rfind('.') > s.rfind(',') { ('.', ',') } else { (',', '.') };
        if s.matches(decimal).count() > 1 {
            return None;
        }
        return Some(s.replace(group, "").replace(decimal, "."));
    }

    let mut s = s.to_string();
    if config.decimal_separator == '.' && !s.contains('.') {
        // "12,50" in a dot-decimal file: a last comma with 1-2 trailing digits is the decimal point.
        if let Some(pos) = s.rfind(',') {
            let tail = &s[pos + 1..];
            if (1..=2).contains(&tail.len()) {
                s = format!("{}.{}", s[..pos].replace(',', ""), tail);
            }
        }
    }
    if let Some(group) = config.grouping_separator {
        if group != config.decimal_separator {
            s = s.replace(group, "");
        }
    }
    match config.decimal_separator {
        '.' => s = s.replace(',', ""),
        ',' => {
            if s.contains(',') {
                s = s.replace('.', "").replace(',', ".");
            }
        }
        other => {
            s = s.replace('.', "").replace(other, ".");
        }
    }
    Some(s)
}

/// Parses a locale-formatted amount such as `-1 234,56 ₽`, `(500.00)` or `$1,234.50`.
///
/// Returns `None` for text that does not reduce to a plain decimal number.
pub fn parse_amount_str(raw: &str, config: &AmountParseConfig) -> Option<Decimal> {
    let mut s = raw.trim().to_string();
    for symbol in &config.currency_symbols {
        if !symbol.is_empty() {
            s = s.replace(symbol.as_str(), "");
        }
    }
    let mut s: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\'' && *c != '\u{202f}')
        .map(|c| if c == '\u{2212}' { '-' } else { c })
        .collect();

    let mut negative = false;
    if config.parentheses_negative && s.starts_with('(') && s.ends_with(')') && s.len() > 2 {
        negative = true;
        s = s[1..s.len() - 1].to_string();
    }
    if let Some(rest) = s.strip_prefix('+') {
        s = rest.to_string();
    } else if let Some(rest) = s.strip_prefix('-') {
        negative = !negative;
        s = rest.to_string();
    }

    let s = normalize_separators(&s, config)?;

    if s.is_empty()
        || s.chars().filter(|c| *c == '.').count() > 1
        || !s.chars().all(|c| c.is_ascii_digit() || c == '.')
        || !s.chars().any(|c| c.is_ascii_digit())
    {
        return None;
    }
    let value = Decimal::from_str(&s).ok()?;
    Some(if negative { -value } else { value })
}

pub fn parse_amount(cell: &CellValue, config: &AmountParseConfig) -> Option<Decimal> {
    match cell {
        CellValue::Empty | CellValue::Date(_) => None,
        CellValue::Number(n) => Decimal::from_f64(*n).map(|d| d.round_dp(6).normalize()),
        CellValue::Text(s) => parse_amount_str(s, config),
    }
}
