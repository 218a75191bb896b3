//! Alfa-Bank operation history exported to Excel.
//!
//! Two title rows, then one operation per row: date in column A, operation
//! code in D and category in E. The export carries no usable amount column,
//! so amounts stay at zero and the user fills them in later.

use crate::detect::{BankDetector, BankSignature};
use crate::handler::{HandlerDescriptor, Layout};
use crate::layout::{
    AmountParseConfig, ColumnMapping, DateFormatConfig, SheetSelector, TableParseConfig,
};
use crate::models::FileFormat;

pub const SIGNATURE: BankSignature = BankSignature {
    id: "alfabank",
    keywords: &["alfabank", "альфабанк", "альфа-банк", "alfa", "альфа"],
    indicators: &["альфа-банк", "alfa-bank", "alfabank"],
};

pub fn layout() -> TableParseConfig {
    TableParseConfig {
        sheet: SheetSelector::ByIndex(0),
        header_rows: 2,
        columns: ColumnMapping {
            date: Some(0),
            description: Some(3),
            category: Some(4),
            ..ColumnMapping::default()
        },
        date_format: DateFormatConfig::primary_only("%d.%m.%Y", "ru"),
        amount: AmountParseConfig {
            decimal_separator: ',',
            grouping_separator: None,
            currency_symbols: vec!["₽".into(), "руб".into(), "RUB".into()],
            ..AmountParseConfig::default()
        },
        default_currency: "RUB".to_string(),
        skip_empty_rows: true,
        min_populated_cells: 1,
        ..TableParseConfig::default()
    }
}

pub fn handler(detector: BankDetector) -> HandlerDescriptor {
    HandlerDescriptor::for_bank(
        "alfabank",
        "Альфа-Банк (Excel)",
        &[FileFormat::Spreadsheet],
        detector,
        |_| Ok(Layout::Table(layout())),
    )
}
