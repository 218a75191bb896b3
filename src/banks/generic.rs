//! Fallback handlers: one per format, no bank-specific column assumptions.

use crate::error::Result;
use crate::handler::{HandlerDescriptor, Layout};
use crate::layout::{HeaderDetection, TableParseConfig, TextPatternSet};
use crate::models::FileFormat;

use super::AMOUNT;

const SUMMARY_MARKERS: [&str; 6] = ["итого", "всего", "total", "баланс", "balance", "остаток"];

/// Header row decides the columns; without one, date/description/amount by position.
pub fn table_layout(default_currency: &str) -> TableParseConfig {
    let mut config = TableParseConfig {
        header_detection: Some(HeaderDetection::default()),
        default_currency: default_currency.to_string(),
        summary_markers: SUMMARY_MARKERS.iter().map(|m| m.to_string()).collect(),
        ..TableParseConfig::default()
    };
    // the app's own CSV export stamps dates as 2024-03-01_14-22-05
    config.date_format.fallbacks.push("%Y-%m-%d_%H-%M-%S".to_string());
    config
}

/// A line that starts with a date and ends with an amount, optionally signed
/// and followed by a currency.
pub fn text_patterns(default_currency: &str) -> Result<TextPatternSet> {
    let date = r"\d{2}[./]\d{2}[./]\d{4}|\d{4}-\d{2}-\d{2}";
    let record = format!(
        r"^(?P<date>{date})(?:\s+(?P<time>\d{{1,2}}:\d{{2}}(?::\d{{2}})?))?\s+(?P<description>.+?)\s+(?P<sign>[+\-\x{{2212}}])?\s*(?P<amount>{AMOUNT})\s*(?P<currency>₽|руб\.?|RUB|USD|EUR|\$|€)?$"
    );
    let mut set = TextPatternSet::new(&format!(r"^(?:{date})\s"), &record)?;
    set.default_currency = default_currency.to_string();
    set.max_record_lines = 3;
    Ok(set)
}

pub fn csv_handler(default_currency: &str) -> HandlerDescriptor {
    let config = table_layout(default_currency);
    HandlerDescriptor::fallback("generic_csv", "CSV (generic)", FileFormat::Delimited, move |_| {
        Ok(Layout::Table(config.clone()))
    })
}

pub fn excel_handler(default_currency: &str) -> HandlerDescriptor {
    let config = table_layout(default_currency);
    HandlerDescriptor::fallback(
        "generic_excel",
        "Excel (generic)",
        FileFormat::Spreadsheet,
        move |_| Ok(Layout::Table(config.clone())),
    )
}

pub fn text_handler(default_currency: &str) -> HandlerDescriptor {
    let currency = default_currency.to_string();
    HandlerDescriptor::fallback(
        "generic_text",
        "PDF / text (generic)",
        FileFormat::ExtractedText,
        move |_| Ok(Layout::Text(text_patterns(&currency)?)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorizer::CategoryRules;
    use crate::engine::delimited::read_rows;
    use crate::engine::table::parse_rows;
    use crate::engine::text::parse_text;
    use crate::models::DiagnosticReason;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn parse_csv(data: &str) -> crate::models::ImportResult {
        let config = table_layout("RUB");
        let rows = read_rows(data.as_bytes(), config.delimiter).unwrap();
        parse_rows(&rows, &config, "generic", &CategoryRules::default())
    }

    #[test]
    fn test_csv_with_english_header() {
        let result = parse_csv(
            "Date,Description,Amount,Currency\n\
             2024-03-01,Coffee,-3.50,usd\n\
             2024-03-02,Salary,\"2,000.00\",\n\
             Total,,1996.50,\n",
        );
        let txns = result.transactions();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].money.amount, Decimal::new(-350, 2));
        assert_eq!(txns[0].money.currency, "USD");
        assert_eq!(txns[1].money.amount, Decimal::new(200000, 2));
        assert_eq!(txns[1].money.currency, "RUB");
        assert_eq!(result.diagnostics()[0].reason, DiagnosticReason::SummaryRow);
        assert_eq!(result.diagnostics()[0].row, 3);
    }

    #[test]
    fn test_csv_app_export_with_direction_column() {
        let result = parse_csv(
            "ID;Дата;Описание;Сумма;Тип\n\
             1;2024-03-01_14-22-05;Продукты;1 500,00;Расход\n\
             2;2024-03-02_09-00-00;Зарплата;80 000,00;Доход\n",
        );
        assert_eq!(result.skipped(), 0, "{:?}", result.diagnostics());
        let txns = result.transactions();
        assert_eq!(txns[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(txns[0].money.amount, Decimal::new(-150000, 2));
        assert_eq!(txns[1].money.amount, Decimal::new(8000000, 2));
    }

    #[test]
    fn test_signed_amount_survives_unknown_direction_value() {
        let result = parse_csv(
            "Date,Description,Type,Amount\n\
             2024-03-01,Coffee,Sale,-3.50\n\
             2024-03-02,Refund,Return,1.00\n",
        );
        assert_eq!(result.skipped(), 0, "{:?}", result.diagnostics());
        let amounts: Vec<Decimal> = result.transactions().iter().map(|t| t.money.amount).collect();
        assert_eq!(amounts, vec![Decimal::new(-350, 2), Decimal::new(100, 2)]);
    }

    #[test]
    fn test_russian_write_off_keeps_its_sign() {
        let result = parse_csv(
            "Дата;Описание;Тип;Сумма\n\
             01.03.2024;Магнит;Списание;-1500,00\n",
        );
        assert_eq!(result.succeeded(), 1, "{:?}", result.diagnostics());
        assert_eq!(result.transactions()[0].money.amount, Decimal::new(-150000, 2));
    }

    #[test]
    fn test_headerless_csv_is_positional() {
        let result = parse_csv("01.03.2024;Кофе;-150,00\n02.03.2024;Чай;-90,00\n");
        assert_eq!(result.succeeded(), 2);
        assert_eq!(result.transactions()[1].description.as_deref(), Some("Чай"));
    }

    #[test]
    fn test_text_lines() {
        let text = "\
Statement
2024-03-01 Coffee shop -3.50 USD
01.03.2024 14:05 Заказ 12345 150,00 ₽
02.03.2024 Зарплата +80 000,00
";
        let result = parse_text(text, &text_patterns("RUB").unwrap(), "generic", &CategoryRules::default());
        assert_eq!(result.skipped(), 0, "{:?}", result.diagnostics());
        let txns = result.transactions();
        assert_eq!(txns[0].money.amount, Decimal::new(-350, 2));
        assert_eq!(txns[0].money.currency, "USD");
        assert_eq!(txns[1].description.as_deref(), Some("Заказ 12345"));
        assert_eq!(txns[1].money.amount, Decimal::new(15000, 2));
        assert_eq!(txns[2].money.amount, Decimal::new(8000000, 2));
        assert_eq!(txns[2].money.currency, "RUB");
    }
}
