//! Ozon Bank account statements (PDF).
//!
//! One line per operation: date, optional time, optional document number,
//! description, signed amount with currency, then the running balance.

use crate::detect::{BankDetector, BankSignature};
use crate::error::Result;
use crate::handler::{HandlerDescriptor, Layout};
use crate::layout::{AmountParseConfig, DateFormatConfig, TextPatternSet};
use crate::models::FileFormat;

use super::{AMOUNT, DAY};

pub const SIGNATURE: BankSignature = BankSignature {
    id: "ozon",
    keywords: &["ozon", "озон"],
    indicators: &["ozon банк", "озон банк", "ozon bank"],
};

const CURRENCY: &str = r"₽|RUB|РУБ|USD|EUR";

pub fn patterns() -> Result<TextPatternSet> {
    let record = format!(
        r"^(?P<date>{DAY})\s+(?:(?P<time>\d{{2}}:\d{{2}}(?::\d{{2}})?)\s+)?(?:(?P<note>\d{{6,}})\s+)?(?P<description>.+?)\s+(?P<sign>[+\-\x{{2212}}])\s*(?P<amount>{AMOUNT})\s*(?P<currency>{CURRENCY})(?:\s+.*)?$"
    );
    let mut set = TextPatternSet::new(&format!(r"^{DAY}\s"), &record)?
        .table_start(r"(?i)(дата и время.*описание операции|дата операции.*назначение платежа)")?
        .skip_lines(&[
            r"(?i)^итого:",
            r"(?i)^перенесено со страницы",
            r"(?i)^продолжение на странице",
            r"(?i)^обороты по сч[её]ту за период",
            r"(?i)^входящий остаток на начало периода",
            r"(?i)^исходящий остаток на конец периода",
            r"(?i)^страница \d+ из \d+",
            r"(?i)^сформировано .* \d{2}:\d{2}:\d{2}",
            r"(?i)^подпись банка",
            r"(?i)^выписка по сч[её]ту №",
            r"(?i)^период: с .* по ",
            r"(?i)^дата и время\s+(мск\s+)?описание операции",
        ])?;
    set.date_format = DateFormatConfig::primary_only("%d.%m.%Y", "ru-RU");
    set.amount = AmountParseConfig::for_locale("ru-RU");
    set.max_record_lines = 4;
    Ok(set)
}

pub fn handler(detector: BankDetector) -> HandlerDescriptor {
    HandlerDescriptor::for_bank(
        "ozon",
        "Ozon Банк (PDF)",
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
    use crate::models::DiagnosticReason;
    use rust_decimal::Decimal;

    const STATEMENT: &str = "\
ООО «Озон Банк»
Выписка по счёту № 40817810000000000001
Период: с 01.03.2024 по 31.03.2024
ДАТА И ВРЕМЯ МСК ОПИСАНИЕ ОПЕРАЦИИ СУММА В ВАЛЮТЕ ОПЕРАЦИИ ОСТАТОК НА СЧЕТЕ
01.03.2024 12:30:01 Оплата заказа на Ozon - 2 499,00 RUB 7 501,00 RUB
02.03.2024 08:00:00 Пополнение
через СБП + 10 000,00 RUB 17 501,00 RUB
Страница 1 из 2
03.03.2024 Кешбэк за покупки + 25,00 ₽
04.03.2024 19:10 Непонятная строка без суммы
";

    #[test]
    fn test_parses_statement() {
        let result = parse_text(STATEMENT, &patterns().unwrap(), "ozon", &CategoryRules::default());
        let txns = result.transactions();
        assert_eq!(txns.len(), 3);
        assert_eq!(txns[0].money.amount, Decimal::new(-249900, 2));
        assert_eq!(txns[0].description.as_deref(), Some("Оплата заказа на Ozon"));
        assert_eq!(txns[0].note.as_deref(), Some("12:30:01"));
        assert_eq!(txns[1].money.amount, Decimal::new(1000000, 2));
        assert_eq!(txns[1].description.as_deref(), Some("Пополнение через СБП"));
        assert_eq!(txns[2].money.amount, Decimal::new(2500, 2));
        assert_eq!(txns[2].money.currency, "RUB");

        assert_eq!(result.diagnostics().len(), 1);
        assert_eq!(result.diagnostics()[0].reason, DiagnosticReason::UnsegmentedRecord);
        assert_eq!(result.diagnostics()[0].row, 9);
    }
}
