//! T-Bank (formerly Tinkoff): PDF statements and the CSV operations export.

use crate::detect::{BankDetector, BankSignature};
use crate::error::Result;
use crate::handler::{HandlerDescriptor, Layout};
use crate::layout::{
    AmountParseConfig, ColumnMapping, DateFormatConfig, TableParseConfig, TextPatternSet,
};
use crate::models::FileFormat;

use super::{AMOUNT, DAY};

pub const SIGNATURE: BankSignature = BankSignature {
    id: "tbank",
    keywords: &["tinkoff", "тинькофф", "tbank", "т-банк", "тбанк"],
    indicators: &["тинькофф", "tinkoff", "т-банк", "тбанк", "tbank"],
};

/// PDF rows: operation date and time, debit date and time, amount in the
/// operation currency, amount in the card currency, description, card tail.
///
/// ```text
/// 01.03.2024 14:22 02.03.2024 00:00 -450,00 ₽ -450,00 ₽ Кофейня Зерно 1234
/// ```
pub fn pdf_patterns() -> Result<TextPatternSet> {
    let rub = r"[₽PР]";
    let record = format!(
        r"^(?P<date>{DAY})(?:\s+(?P<time>\d{{2}}:\d{{2}}))?\s+{DAY}(?:\s+\d{{2}}:\d{{2}})?\s+(?P<sign>[+\-\x{{2212}}])?\s*(?P<amount>{AMOUNT})\s*{rub}\s+[+\-\x{{2212}}]?\s*(?:{AMOUNT})\s*{rub}\s+(?P<description>.+?)(?:\s+(?P<note>\d{{4}}))?$"
    );
    let mut set = TextPatternSet::new(
        &format!(r"^{DAY}(?:\s+\d{{2}}:\d{{2}})?\s+{DAY}"),
        &record,
    )?
    .table_start(r"(?i)дата и время операции|дата\s+операции\s+дата\s+списания")?
    .skip_lines(&[
        r"(?i)^итого:",
        r"(?i)^баланс на (начало|конец) периода",
        r"(?i)^выписка сформирована:",
        r"(?i)^пополнения:",
        r"(?i)^расходы:",
        r"(?i)^с уважением,",
        r"(?i)^руководитель",
        r"(?i)^ао «т(инькофф)?(-)?банк»",
        r"(?i)^бик",
        r"(?i)^страница \d+ из \d+",
        r"^\d{2}:\d{2}$",
    ])?;
    set.date_format = DateFormatConfig::primary_only("%d.%m.%Y", "ru-RU");
    set.amount = AmountParseConfig::for_locale("ru-RU");
    set.amount.currency_symbols.push("Р".into());
    set.unsigned_is_expense = true;
    set.max_record_lines = 4;
    Ok(set)
}

/// Operations export: `;`-separated, quoted, one header row.
/// Columns: operation date, payment date, card, status, operation amount,
/// operation currency, payment amount, payment currency, cashback, category,
/// MCC, description, bonuses.
pub fn csv_layout() -> TableParseConfig {
    TableParseConfig {
        header_rows: 1,
        columns: ColumnMapping {
            date: Some(0),
            amount: Some(4),
            currency: Some(5),
            category: Some(9),
            description: Some(11),
            ..ColumnMapping::default()
        },
        date_format: DateFormatConfig::primary_only("%d.%m.%Y", "ru-RU"),
        amount: AmountParseConfig::for_locale("ru-RU"),
        delimiter: Some(b';'),
        min_populated_cells: 3,
        ..TableParseConfig::default()
    }
}

pub fn pdf_handler(detector: BankDetector) -> HandlerDescriptor {
    HandlerDescriptor::for_bank(
        "tbank",
        "Т-Банк (PDF)",
        &[FileFormat::ExtractedText],
        detector,
        |_| Ok(Layout::Text(pdf_patterns()?)),
    )
}

fn has_operations_header(sample: &str) -> bool {
    sample.contains("дата операции") && sample.contains("номер карты")
}

pub fn csv_handler(detector: BankDetector) -> HandlerDescriptor {
    HandlerDescriptor::for_bank(
        "tbank_csv",
        "Т-Банк (CSV)",
        &[FileFormat::Delimited],
        detector,
        |_| Ok(Layout::Table(csv_layout())),
    )
    .with_sniffer(has_operations_header)
}
