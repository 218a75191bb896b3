//! Row-to-transaction conversion shared by delimited and spreadsheet input.

use rust_decimal::Decimal;

use crate::categorizer::{strip_category_label, CategoryRules};
use crate::layout::{AmountSign, ColumnMapping, TableParseConfig};
use crate::models::{CanonicalTransaction, DiagnosticReason, ImportResult, Money, RowDiagnostic};
use crate::values::{parse_amount, parse_date, CellValue};

/// A physical row, or the reason it could not be read at all.
pub type RawRow = std::result::Result<Vec<CellValue>, String>;

/// Column mapping and sign rule actually used for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLayout {
    pub header_rows: usize,
    pub columns: ColumnMapping,
    pub sign: AmountSign,
}

pub fn resolve_layout(rows: &[RawRow], config: &TableParseConfig) -> ResolvedLayout {
    let fixed = ResolvedLayout {
        header_rows: config.header_rows,
        columns: config.columns.clone(),
        sign: config.amount.sign.clone(),
    };
    let Some(detection) = config.header_detection.as_ref() else {
        return fixed;
    };
    if !config.columns.is_empty() {
        return fixed;
    }
    let readable: Vec<Vec<CellValue>> = rows
        .iter()
        .take(detection.scan_rows)
        .map(|r| r.clone().unwrap_or_default())
        .collect();
    match detection.infer(&readable) {
        Some((header_rows, columns)) => {
            let sign = if columns.amount.is_none() {
                AmountSign::DebitCredit
            } else if columns.direction.is_some() {
                AmountSign::Indicator {
                    expense_value: detection.expense_value.clone(),
                }
            } else {
                AmountSign::Signed
            };
            log::debug!("header row {} gives {columns:?}", header_rows - 1);
            ResolvedLayout {
                header_rows,
                columns,
                sign,
            }
        }
        None => {
            log::debug!("no header row found, using positional columns");
            ResolvedLayout {
                header_rows: config.header_rows,
                columns: ColumnMapping::positional(),
                sign: AmountSign::Signed,
            }
        }
    }
}

fn cell(row: &[CellValue], idx: Option<usize>) -> &CellValue {
    idx.and_then(|i| row.get(i)).unwrap_or(&CellValue::Empty)
}

fn is_summary(row: &[CellValue], markers: &[String]) -> bool {
    if markers.is_empty() {
        return false;
    }
    row.iter()
        .find(|c| !c.is_empty())
        .map(|c| {
            let text = c.as_text().trim().to_lowercase();
            markers.iter().any(|m| text.starts_with(m.as_str()))
        })
        .unwrap_or(false)
}

/// Converts every row after the header block, in physical order.
pub fn parse_rows(
    rows: &[RawRow],
    config: &TableParseConfig,
    bank: &str,
    rules: &CategoryRules,
) -> ImportResult {
    let layout = resolve_layout(rows, config);
    let mut result = ImportResult::new();

    for (idx, raw) in rows.iter().enumerate().skip(layout.header_rows) {
        let row = match raw {
            Ok(row) => row,
            Err(e) => {
                result.push_diagnostic(RowDiagnostic::with_detail(
                    idx,
                    DiagnosticReason::UnreadableRow,
                    e.clone(),
                ));
                continue;
            }
        };
        let populated = row.iter().filter(|c| !c.is_empty()).count();
        if config.skip_empty_rows && populated < config.min_populated_cells {
            result.push_diagnostic(RowDiagnostic::with_detail(
                idx,
                DiagnosticReason::InsufficientPopulatedCells,
                format!("{populated} of {} required cells", config.min_populated_cells),
            ));
            continue;
        }
        if is_summary(row, &config.summary_markers) {
            result.push_diagnostic(RowDiagnostic::new(idx, DiagnosticReason::SummaryRow));
            continue;
        }
        match convert_row(idx, row, config, &layout, bank, rules) {
            Ok(txn) => result.push_transaction(txn),
            Err(diagnostic) => result.push_diagnostic(diagnostic),
        }
    }
    result
}

fn convert_row(
    idx: usize,
    row: &[CellValue],
    config: &TableParseConfig,
    layout: &ResolvedLayout,
    bank: &str,
    rules: &CategoryRules,
) -> std::result::Result<CanonicalTransaction, RowDiagnostic> {
    let columns = &layout.columns;

    let date_cell = cell(row, columns.date);
    let date = parse_date(date_cell, &config.date_format).ok_or_else(|| {
        RowDiagnostic::with_detail(idx, DiagnosticReason::DateFormatMismatch, date_cell.as_text())
    })?;

    let description = cell(row, columns.description).text();
    let category = cell(row, columns.category)
        .text()
        .and_then(|raw| strip_category_label(&raw))
        .or_else(|| {
            description
                .as_deref()
                .and_then(|d| rules.categorize(d))
                .map(str::to_string)
        });
    let note = cell(row, columns.note).text();

    let amount = read_amount(idx, row, config, layout)?;
    let currency = cell(row, columns.currency)
        .text()
        .map(|c| c.to_uppercase())
        .unwrap_or_else(|| config.default_currency.clone());

    Ok(CanonicalTransaction {
        date,
        money: Money::new(amount, currency),
        description,
        category,
        note,
        bank: bank.to_string(),
        source_row: idx,
    })
}

fn read_amount(
    idx: usize,
    row: &[CellValue],
    config: &TableParseConfig,
    layout: &ResolvedLayout,
) -> std::result::Result<Decimal, RowDiagnostic> {
    let columns = &layout.columns;
    let parse = |col: Option<usize>| -> std::result::Result<Option<Decimal>, RowDiagnostic> {
        let c = cell(row, col);
        if c.is_empty() {
            return Ok(None);
        }
        parse_amount(c, &config.amount).map(Some).ok_or_else(|| {
            RowDiagnostic::with_detail(idx, DiagnosticReason::AmountUnparseable, c.as_text())
        })
    };

    match &layout.sign {
        AmountSign::Signed => match columns.amount {
            None => Ok(Decimal::ZERO),
            Some(_) => parse(columns.amount)?
                .ok_or_else(|| RowDiagnostic::new(idx, DiagnosticReason::AmountMissing)),
        },
        AmountSign::DebitCredit => {
            let debit = parse(columns.debit)?;
            let credit = parse(columns.credit)?;
            match (debit, credit) {
                (None, None) => Err(RowDiagnostic::new(idx, DiagnosticReason::AmountMissing)),
                (d, c) => Ok(c.unwrap_or_default().abs() - d.unwrap_or_default().abs()),
            }
        }
        AmountSign::Indicator { expense_value } => {
            let amount = parse(columns.amount)?
                .ok_or_else(|| RowDiagnostic::new(idx, DiagnosticReason::AmountMissing))?;
            match cell(row, columns.direction).text() {
                Some(flag) if flag.to_lowercase() == expense_value.to_lowercase() => {
                    Ok(-amount.abs())
                }
                _ => Ok(amount),
            }
        }
    }
}
