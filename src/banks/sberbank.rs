//! Sberbank debit card statements (PDF).
//!
//! Each operation is printed as a main line followed by a description line:
//!
//! ```text
//! 01.03.2024 14:22 254981 Супермаркеты 1 234,56 48 765,44
//! 01.03.2024 MAGNIT MM. Операция по карте ****1234
//! ```
//!
//! The main line carries date, time, authorisation code, category, amount and
//! balance. Amounts without a sign are expenses; income is printed with `+`.

use crate::detect::{BankDetector, BankSignature};
use crate::error::Result;
use crate::handler::{HandlerDescriptor, Layout};
use crate::layout::{AmountParseConfig, DateFormatConfig, TextPatternSet};
use crate::models::FileFormat;

use super::{AMOUNT, DAY};

pub const SIGNATURE: BankSignature = BankSignature {
    id: "sberbank",
    keywords: &["sberbank", "сбербанк", "sber", "сбер"],
    indicators: &["сбербанк", "sberbank"],
};

pub fn patterns() -> Result<TextPatternSet> {
    let record = format!(
        r"^(?P<date>{DAY})\s+(?P<time>\d{{2}}:\d{{2}})\s+\d+\s+(?P<category>.+?)\s+(?P<sign>[+\-\x{{2212}}])?\s*(?P<amount>{AMOUNT})\s+(?:{AMOUNT})(?:\s+(?P<description>.+))?$"
    );
    let mut set = TextPatternSet::new(&format!(r"^{DAY}\s+\d{{2}}:\d{{2}}\s"), &record)?
        .table_start(r"(?i)расшифровка операций")?
        .continuation_strip(&format!(r"^{DAY}\s+"))?
        .skip_lines(&[
            r"(?i)^выписка по сч[её]ту.*страница \d+ из \d+",
            r"(?i)^продолжение на следующей странице",
            r"(?i)^дата формирования \d{2}\.\d{2}\.\d{4}$",
            r"(?i)^пао сбербанк\. генеральная лицензия",
            r"(?i)^денежные средства списываются",
            r"(?i)^отображаются только обработанные",
            r"(?i)^до 30 дней\.$",
            r"^\d$",
            r"(?i)^дата списания / зачисления",
            r"(?i)^по курсу банка на дату обработки операции$",
            r"(?i)^дата операции \(мск\)",
            r"(?i)^итого",
        ])?;
    set.date_format = DateFormatConfig::primary_only("%d.%m.%Y", "ru-RU");
    set.amount = AmountParseConfig::for_locale("ru-RU");
    set.unsigned_is_expense = true;
    set.max_record_lines = 4;
    Ok(set)
}

pub fn handler(detector: BankDetector) -> HandlerDescriptor {
    HandlerDescriptor::for_bank(
        "sberbank",
        "Сбербанк (PDF)",
        &[FileFormat::ExtractedText],
        detector,
        |_| Ok(Layout::Text(patterns()?)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorizer::CategoryRules;
    use crate::engine::text::parse_text;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    const STATEMENT: &str = "\
ПАО Сбербанк
Выписка по счёту дебетовой карты
Расшифровка операций
ДАТА ОПЕРАЦИИ (МСК) КАТЕГОРИЯ СУММА В ВАЛЮТЕ СЧЁТА ОСТАТОК СРЕДСТВ
01.03.2024 14:22 254981 Супермаркеты 1 234,56 48 765,44
01.03.2024 MAGNIT MM. Операция по карте ****1234
02.03.2024 09:05 000000 Перевод на карту +15 000,00 63 765,44
02.03.2024 Перевод от И. Иванов
Выписка по счёту дебетовой карты Страница 2 из 3
03.03.2024 18:40 771234 Рестораны и кафе 890,00 62 875,44
03.03.2024 COFFEE HOUSE
";

    #[test]
    fn test_parses_two_line_records() {
        let result = parse_text(STATEMENT, &patterns().unwrap(), "sberbank", &CategoryRules::default());
        assert_eq!(result.skipped(), 0, "{:?}", result.diagnostics());
        let txns = result.transactions();
        assert_eq!(txns.len(), 3);

        assert_eq!(txns[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(txns[0].money.amount, Decimal::new(-123456, 2));
        assert_eq!(txns[0].category.as_deref(), Some("Супермаркеты"));
        assert_eq!(
            txns[0].description.as_deref(),
            Some("MAGNIT MM. Операция по карте ****1234")
        );
        assert_eq!(txns[0].note.as_deref(), Some("14:22"));
        assert_eq!(txns[0].source_row, 4);

        assert_eq!(txns[1].money.amount, Decimal::new(1500000, 2));
        assert_eq!(txns[2].money.amount, Decimal::new(-89000, 2));
        assert_eq!(txns[2].category.as_deref(), Some("Рестораны и кафе"));
        assert!(txns.iter().all(|t| t.money.currency == "RUB"));
    }

    #[test]
    fn test_signature_matches_content() {
        let veto = crate::banks::shared_veto();
        let d = BankDetector::new(SIGNATURE, veto);
        assert!(d.matches("statement.pdf", "ПАО Сбербанк\nРасшифровка операций"));
        assert!(d.matches("Выписка_сбер.pdf", ""));
        assert!(!d.matches("statement.pdf", "АО «Тинькофф Банк»"));
    }
}
