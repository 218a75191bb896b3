//! Segmentation and record extraction for text pulled out of PDF statements.

use crate::categorizer::{strip_category_label, CategoryRules};
use crate::layout::TextPatternSet;
use crate::models::{CanonicalTransaction, DiagnosticReason, ImportResult, Money, RowDiagnostic};
use crate::values::parse_amount_str;

struct PendingRecord {
    start_line: usize,
    lines: Vec<String>,
}

/// Groups lines into records and converts each record. Diagnostics point at
/// the zero-based line a record started on.
pub fn parse_text(
    text: &str,
    patterns: &TextPatternSet,
    bank: &str,
    rules: &CategoryRules,
) -> ImportResult {
    let lines: Vec<&str> = text.lines().collect();
    let start = match &patterns.table_start {
        Some(marker) => match lines.iter().position(|l| marker.is_match(l)) {
            Some(pos) => pos + 1,
            None => {
                log::debug!("{bank}: table marker not found, scanning whole document");
                0
            }
        },
        None => 0,
    };

    let mut result = ImportResult::new();
    let mut current: Option<PendingRecord> = None;
    for (idx, raw) in lines.iter().enumerate().skip(start) {
        let line = raw.replace('\u{0}', "");
        let line = line.trim();
        if line.is_empty() || patterns.skip_lines.iter().any(|re| re.is_match(line)) {
            continue;
        }
        if patterns.record_start.is_match(line) {
            if let Some(record) = current.take() {
                finish_record(record, patterns, bank, rules, &mut result);
            }
            current = Some(PendingRecord {
                start_line: idx,
                lines: vec![line.to_string()],
            });
            continue;
        }
        if let Some(record) = current.as_mut() {
            let continuation = match &patterns.continuation_strip {
                Some(re) => re.replace(line, "").trim().to_string(),
                None => line.to_string(),
            };
            if !continuation.is_empty() {
                record.lines.push(continuation);
            }
        }
    }
    if let Some(record) = current.take() {
        finish_record(record, patterns, bank, rules, &mut result);
    }
    result
}

fn finish_record(
    record: PendingRecord,
    patterns: &TextPatternSet,
    bank: &str,
    rules: &CategoryRules,
    result: &mut ImportResult,
) {
    match convert_record(&record, patterns, bank, rules) {
        Ok(txn) => result.push_transaction(txn),
        Err(diagnostic) => result.push_diagnostic(diagnostic),
    }
}

fn convert_record(
    record: &PendingRecord,
    patterns: &TextPatternSet,
    bank: &str,
    rules: &CategoryRules,
) -> std::result::Result<CanonicalTransaction, RowDiagnostic> {
    let row = record.start_line;
    if record.lines.len() > patterns.max_record_lines {
        return Err(RowDiagnostic::with_detail(
            row,
            DiagnosticReason::UnsegmentedRecord,
            format!("record spans {} lines", record.lines.len()),
        ));
    }
    let joined = record.lines.join(" ");
    let caps = patterns.record.captures(&joined).ok_or_else(|| {
        RowDiagnostic::with_detail(row, DiagnosticReason::UnsegmentedRecord, record.lines[0].clone())
    })?;
    let group = |name: &str| {
        caps.name(name)
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let raw_date = group("date").unwrap_or_default();
    let date = patterns.date_format.parse_str(&raw_date).ok_or_else(|| {
        RowDiagnostic::with_detail(row, DiagnosticReason::DateFormatMismatch, raw_date.clone())
    })?;

    let raw_amount =
        group("amount").ok_or_else(|| RowDiagnostic::new(row, DiagnosticReason::AmountMissing))?;
    let parsed = parse_amount_str(&raw_amount, &patterns.amount).ok_or_else(|| {
        RowDiagnostic::with_detail(row, DiagnosticReason::AmountUnparseable, raw_amount.clone())
    })?;

    let description = match (group("description"), group("details")) {
        (Some(d), Some(extra)) => Some(format!("{d} {extra}")),
        (d, extra) => d.or(extra),
    };
    let explicit_sign = group("sign").or_else(|| match raw_amount.chars().next() {
        Some('+') => Some("+".to_string()),
        Some('-' | '\u{2212}') => Some("-".to_string()),
        _ => None,
    });
    let amount = match explicit_sign.as_deref() {
        Some("+") => parsed.abs(),
        Some(_) => -parsed.abs(),
        None => {
            let lower = description.as_deref().unwrap_or("").to_lowercase();
            if patterns.income_markers.iter().any(|m| lower.contains(m.as_str())) {
                parsed.abs()
            } else if patterns.unsigned_is_expense {
                -parsed.abs()
            } else {
                parsed
            }
        }
    };

    let category = group("category")
        .and_then(|c| strip_category_label(&c))
        .or_else(|| {
            description
                .as_deref()
                .and_then(|d| rules.categorize(d))
                .map(str::to_string)
        });
    let note = match (group("time"), group("note")) {
        (Some(t), Some(n)) => Some(format!("{t} {n}")),
        (t, n) => t.or(n),
    };
    let currency = group("currency")
        .map(|c| normalize_currency(&c))
        .unwrap_or_else(|| patterns.default_currency.clone());

    Ok(CanonicalTransaction {
        date,
        money: Money::new(amount, currency),
        description,
        category,
        note,
        bank: bank.to_string(),
        source_row: row,
    })
}

fn normalize_currency(raw: &str) -> String {
    match raw.trim().trim_end_matches('.').to_lowercase().as_str() {
        "₽" | "руб" | "р" | "rub" => "RUB".to_string(),
        "$" | "usd" => "USD".to_string(),
        "€" | "eur" => "EUR".to_string(),
        other => other.to_uppercase(),
    }
}
