//! Declarative descriptions of statement layouts.
//!
//! Everything here is plain data: built once, never mutated, and shared
//! read-only between concurrent imports.

use regex::Regex;

use crate::error::{ImportError, Result};
use crate::values::CellValue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    ByIndex(usize),
    ByName(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        Self::ByIndex(0)
    }
}

/// Zero-based column positions. `None` means the layout has no such column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    pub date: Option<usize>,
    pub description: Option<usize>,
    pub amount: Option<usize>,
    pub category: Option<usize>,
    pub currency: Option<usize>,
    pub note: Option<usize>,
    pub debit: Option<usize>,
    pub credit: Option<usize>,
    /// Income/expense flag column, read by [`AmountSign::Indicator`].
    pub direction: Option<usize>,
}

impl ColumnMapping {
    /// Used by the generic layouts when no header row can be found.
    pub fn positional() -> Self {
        Self {
            date: Some(0),
            description: Some(1),
            amount: Some(2),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormatConfig {
    /// chrono strftime pattern, e.g. `%d.%m.%Y`.
    pub primary: String,
    pub fallbacks: Vec<String>,
    pub locale: String,
}

impl Default for DateFormatConfig {
    fn default() -> Self {
        Self {
            primary: "%Y-%m-%d".to_string(),
            fallbacks: vec![
                "%d.%m.%Y".to_string(),
                "%d/%m/%Y".to_string(),
                "%m/%d/%Y".to_string(),
            ],
            locale: "en".to_string(),
        }
    }
}

impl DateFormatConfig {
    pub fn primary_only(pattern: &str, locale: &str) -> Self {
        Self {
            primary: pattern.to_string(),
            fallbacks: Vec::new(),
            locale: locale.to_string(),
        }
    }

    /// Conventional day/month order for a locale tag such as `ru-RU` or `en-US`.
    pub fn for_locale(locale: &str) -> Self {
        let lang = locale.split(['-', '_']).next().unwrap_or("").to_lowercase();
        let primary = match lang.as_str() {
            "ru" | "de" | "uk" | "be" | "kk" => "%d.%m.%Y",
            "fr" | "es" | "it" | "pt" => "%d/%m/%Y",
            "en" if locale.to_lowercase().ends_with("us") => "%m/%d/%Y",
            "en" => "%d/%m/%Y",
            _ => "%Y-%m-%d",
        };
        let mut fallbacks: Vec<String> = ["%Y-%m-%d", "%d.%m.%Y"]
            .iter()
            .filter(|f| **f != primary)
            .map(|f| f.to_string())
            .collect();
        fallbacks.dedup();
        Self {
            primary: primary.to_string(),
            fallbacks,
            locale: locale.to_string(),
        }
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.fallbacks.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountSign {
    /// One signed amount column; negative means expense.
    Signed,
    /// Separate debit (expense) and credit (income) columns.
    DebitCredit,
    /// Amount plus a direction column. The value equal to `expense_value`
    /// (case-insensitive) forces an expense; any other value keeps the
    /// amount's own sign.
    Indicator { expense_value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountParseConfig {
    pub decimal_separator: char,
    pub grouping_separator: Option<char>,
    pub currency_symbols: Vec<String>,
    pub parentheses_negative: bool,
    pub sign: AmountSign,
}

impl Default for AmountParseConfig {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            grouping_separator: Some(','),
            currency_symbols: ["$", "€", "£", "₽", "руб.", "руб", "RUB", "USD", "EUR"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            parentheses_negative: true,
            sign: AmountSign::Signed,
        }
    }
}

impl AmountParseConfig {
    pub fn for_locale(locale: &str) -> Self {
        let lang = locale.split(['-', '_']).next().unwrap_or("").to_lowercase();
        let (decimal_separator, grouping_separator) = match lang.as_str() {
            "ru" | "uk" | "be" | "kk" | "fr" => (',', None),
            "de" | "es" | "it" | "pt" => (',', Some('.')),
            _ => ('.', Some(',')),
        };
        Self {
            decimal_separator,
            grouping_separator,
            ..Self::default()
        }
    }

    pub fn with_sign(mut self, sign: AmountSign) -> Self {
        self.sign = sign;
        self
    }
}

/// Keyword sets used to find a header row when a layout does not fix its columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDetection {
    pub scan_rows: usize,
    pub date: Vec<String>,
    pub amount: Vec<String>,
    pub debit: Vec<String>,
    pub credit: Vec<String>,
    pub description: Vec<String>,
    pub category: Vec<String>,
    pub currency: Vec<String>,
    /// Income/expense flag column ("Тип": "Доход" / "Расход").
    pub direction: Vec<String>,
    /// Direction value that marks an expense when a direction column is found.
    pub expense_value: String,
}

fn terms(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for HeaderDetection {
    fn default() -> Self {
        Self {
            scan_rows: 30,
            date: terms(&["date", "дата"]),
            amount: terms(&["amount", "sum", "сумма"]),
            debit: terms(&["debit", "withdrawal", "дебет", "расход", "списание"]),
            credit: terms(&["credit", "deposit", "кредит", "приход", "зачисление"]),
            description: terms(&[
                "description",
                "payee",
                "details",
                "memo",
                "описание",
                "назначение",
                "примечание",
            ]),
            category: terms(&["category", "категория"]),
            currency: terms(&["currency", "валюта"]),
            direction: terms(&["type", "тип"]),
            expense_value: "Расход".to_string(),
        }
    }
}

impl HeaderDetection {
    /// Finds the first row that names a date column and either an amount column
    /// or both debit and credit columns. Returns the number of rows up to and
    /// including that header, and the mapping it implies.
    pub fn infer(&self, rows: &[Vec<CellValue>]) -> Option<(usize, ColumnMapping)> {
        for (idx, row) in rows.iter().take(self.scan_rows).enumerate() {
            let mut mapping = ColumnMapping::default();
            for (col, cell) in row.iter().enumerate() {
                let text = cell.as_text().trim().to_lowercase();
                if text.is_empty() {
                    continue;
                }
                let hit = |list: &[String]| list.iter().any(|t| text.contains(t.as_str()));
                let slots: [(&mut Option<usize>, &Vec<String>); 8] = [
                    (&mut mapping.date, &self.date),
                    (&mut mapping.debit, &self.debit),
                    (&mut mapping.credit, &self.credit),
                    (&mut mapping.amount, &self.amount),
                    (&mut mapping.currency, &self.currency),
                    (&mut mapping.category, &self.category),
                    (&mut mapping.direction, &self.direction),
                    (&mut mapping.description, &self.description),
                ];
                for (slot, list) in slots {
                    if slot.is_none() && hit(list) {
                        *slot = Some(col);
                        break;
                    }
                }
            }
            let has_amount =
                mapping.amount.is_some() || (mapping.debit.is_some() && mapping.credit.is_some());
            if mapping.date.is_some() && has_amount {
                return Some((idx + 1, mapping));
            }
        }
        None
    }
}

/// Tabular layout for spreadsheet and delimited statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableParseConfig {
    pub sheet: SheetSelector,
    pub header_rows: usize,
    pub columns: ColumnMapping,
    pub date_format: DateFormatConfig,
    pub amount: AmountParseConfig,
    pub default_currency: String,
    pub skip_empty_rows: bool,
    pub min_populated_cells: usize,
    /// Field delimiter for delimited text; sniffed when `None`.
    pub delimiter: Option<u8>,
    /// Lower-case prefixes of the first cell that mark totals and balance rows.
    pub summary_markers: Vec<String>,
    /// When set and `columns` is empty, the header row decides the mapping.
    pub header_detection: Option<HeaderDetection>,
}

impl Default for TableParseConfig {
    fn default() -> Self {
        Self {
            sheet: SheetSelector::default(),
            header_rows: 0,
            columns: ColumnMapping::default(),
            date_format: DateFormatConfig::default(),
            amount: AmountParseConfig::default(),
            default_currency: "RUB".to_string(),
            skip_empty_rows: true,
            min_populated_cells: 1,
            delimiter: None,
            summary_markers: Vec::new(),
            header_detection: None,
        }
    }
}

impl TableParseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.columns.date.is_none() && self.header_detection.is_none() {
            return Err(ImportError::InvalidLayout(
                "no date column and no header detection".into(),
            ));
        }
        match self.amount.sign {
            AmountSign::DebitCredit
                if self.header_detection.is_none()
                    && (self.columns.debit.is_none() || self.columns.credit.is_none()) =>
            {
                Err(ImportError::InvalidLayout(
                    "debit/credit sign needs both columns".into(),
                ))
            }
            AmountSign::Indicator { .. } if self.columns.direction.is_none() => Err(
                ImportError::InvalidLayout("indicator sign needs a direction column".into()),
            ),
            _ => Ok(()),
        }
    }
}

/// Line and record patterns for statements extracted from PDF.
#[derive(Debug, Clone)]
pub struct TextPatternSet {
    /// Records are only looked for after the first line matching this marker.
    pub table_start: Option<Regex>,
    /// Page headers, footers and totals; dropped before grouping.
    pub skip_lines: Vec<Regex>,
    /// A line matching this begins a new record.
    pub record_start: Regex,
    /// Applied to continuation lines before they are appended to a record.
    pub continuation_strip: Option<Regex>,
    /// Applied to the whole record (lines joined by a space). Named groups:
    /// `date` and `amount` are required; `sign`, `currency`, `description`,
    /// `details`, `category`, `time` and `note` are optional.
    pub record: Regex,
    pub max_record_lines: usize,
    pub date_format: DateFormatConfig,
    pub amount: AmountParseConfig,
    pub default_currency: String,
    /// Lower-case description fragments that mark an unsigned amount as income.
    pub income_markers: Vec<String>,
    pub unsigned_is_expense: bool,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| ImportError::InvalidLayout(format!("bad pattern {pattern:?}: {e}")))
}

impl TextPatternSet {
    pub fn new(record_start: &str, record: &str) -> Result<Self> {
        let set = Self {
            table_start: None,
            skip_lines: Vec::new(),
            record_start: compile(record_start)?,
            continuation_strip: None,
            record: compile(record)?,
            max_record_lines: 8,
            date_format: DateFormatConfig::default(),
            amount: AmountParseConfig::default(),
            default_currency: "RUB".to_string(),
            income_markers: Vec::new(),
            unsigned_is_expense: false,
        };
        set.validate()?;
        Ok(set)
    }

    pub fn table_start(mut self, pattern: &str) -> Result<Self> {
        self.table_start = Some(compile(pattern)?);
        Ok(self)
    }

    pub fn skip_lines(mut self, patterns: &[&str]) -> Result<Self> {
        self.skip_lines = patterns.iter().map(|p| compile(p)).collect::<Result<_>>()?;
        Ok(self)
    }

    pub fn continuation_strip(mut self, pattern: &str) -> Result<Self> {
        self.continuation_strip = Some(compile(pattern)?);
        Ok(self)
    }

    pub fn income_markers(mut self, markers: &[&str]) -> Self {
        self.income_markers = markers.iter().map(|m| m.to_lowercase()).collect();
        self
    }

    fn validate(&self) -> Result<()> {
        for group in ["date", "amount"] {
            if !self.record.capture_names().flatten().any(|n| n == group) {
                return Err(ImportError::InvalidLayout(format!(
                    "record pattern has no `{group}` group"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(cells: &[&str]) -> Vec<CellValue> {
        cells.iter().map(|c| CellValue::from_text(c)).collect()
    }

    #[test]
    fn test_validate_requires_date_source() {
        let config = TableParseConfig::default();
        assert!(matches!(config.validate(), Err(ImportError::InvalidLayout(_))));

        let with_date = TableParseConfig {
            columns: ColumnMapping {
                date: Some(0),
                ..ColumnMapping::default()
            },
            ..TableParseConfig::default()
        };
        assert!(with_date.validate().is_ok());

        let detected = TableParseConfig {
            header_detection: Some(HeaderDetection::default()),
            ..TableParseConfig::default()
        };
        assert!(detected.validate().is_ok());
    }

    #[test]
    fn test_validate_sign_columns() {
        let config = TableParseConfig {
            columns: ColumnMapping {
                date: Some(0),
                debit: Some(2),
                ..ColumnMapping::default()
            },
            amount: AmountParseConfig::default().with_sign(AmountSign::DebitCredit),
            ..TableParseConfig::default()
        };
        assert!(config.validate().is_err());

        let config = TableParseConfig {
            columns: ColumnMapping {
                date: Some(0),
                amount: Some(1),
                ..ColumnMapping::default()
            },
            amount: AmountParseConfig::default().with_sign(AmountSign::Indicator {
                expense_value: "expense".into(),
            }),
            ..TableParseConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_header_detection_russian() {
        let rows = vec![
            text_row(&["Выписка по счёту", "", ""]),
            text_row(&["Дата операции", "Описание", "Сумма", "Категория"]),
            text_row(&["01.03.2024", "Кофе", "-150,00", "Кафе"]),
        ];
        let (header_rows, mapping) = HeaderDetection::default().infer(&rows).unwrap();
        assert_eq!(header_rows, 2);
        assert_eq!(mapping.date, Some(0));
        assert_eq!(mapping.description, Some(1));
        assert_eq!(mapping.amount, Some(2));
        assert_eq!(mapping.category, Some(3));
    }

    #[test]
    fn test_header_detection_debit_credit() {
        let rows = vec![text_row(&["Status", "Date", "Description", "Debit", "Credit"])];
        let (header_rows, mapping) = HeaderDetection::default().infer(&rows).unwrap();
        assert_eq!(header_rows, 1);
        assert_eq!(mapping.date, Some(1));
        assert_eq!(mapping.debit, Some(3));
        assert_eq!(mapping.credit, Some(4));
        assert_eq!(mapping.amount, None);
    }

    #[test]
    fn test_header_detection_none() {
        let rows = vec![text_row(&["2024-01-01", "Coffee", "-3.50"])];
        assert!(HeaderDetection::default().infer(&rows).is_none());
    }

    #[test]
    fn test_locale_defaults() {
        assert_eq!(DateFormatConfig::for_locale("ru-RU").primary, "%d.%m.%Y");
        assert_eq!(DateFormatConfig::for_locale("en-US").primary, "%m/%d/%Y");
        assert_eq!(DateFormatConfig::for_locale("xx").primary, "%Y-%m-%d");
        assert_eq!(AmountParseConfig::for_locale("ru").decimal_separator, ',');
        assert_eq!(AmountParseConfig::for_locale("de-DE").grouping_separator, Some('.'));
        assert_eq!(AmountParseConfig::for_locale("en").decimal_separator, '.');
    }

    #[test]
    fn test_text_pattern_requires_groups() {
        let err = TextPatternSet::new(r"^\d", r"^(?P<date>\S+)").unwrap_err();
        assert!(err.to_string().contains("amount"));
        assert!(TextPatternSet::new(r"^\d", r"^(?P<date>\S+) (?P<amount>\S+)$").is_ok());
        assert!(TextPatternSet::new(r"^(", r"x").is_err());
    }
}
