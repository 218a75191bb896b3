use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Broad family of an input file, decided once from its extension (or magic bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    Delimited,
    Spreadsheet,
    ExtractedText,
}

impl FileFormat {
    pub const ALL: [FileFormat; 3] = [Self::Delimited, Self::Spreadsheet, Self::ExtractedText];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Delimited => "delimited",
            Self::Spreadsheet => "spreadsheet",
            Self::ExtractedText => "extracted_text",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Delimited => 0,
            Self::Spreadsheet => 1,
            Self::ExtractedText => 2,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Money {
    /// Negative for expenses, positive for income.
    pub amount: Decimal,
    pub currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    pub fn is_expense(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }
}

/// Format-independent output record. Built only by the parsing engines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalTransaction {
    pub date: NaiveDate,
    pub money: Money,
    pub description: Option<String>,
    pub category: Option<String>,
    pub note: Option<String>,
    pub bank: String,
    /// Zero-based row (tables) or line (extracted text) the record started on.
    pub source_row: usize,
}

impl CanonicalTransaction {
    /// Category if the statement or the rules supplied one, otherwise the raw description.
    pub fn label(&self) -> &str {
        self.category
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticReason {
    InsufficientPopulatedCells,
    DateFormatMismatch,
    AmountMissing,
    AmountUnparseable,
    SummaryRow,
    UnreadableRow,
    UnsegmentedRecord,
}

impl DiagnosticReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientPopulatedCells => "insufficient-populated-cells",
            Self::DateFormatMismatch => "date-format-mismatch",
            Self::AmountMissing => "amount-missing",
            Self::AmountUnparseable => "amount-unparseable",
            Self::SummaryRow => "summary-row",
            Self::UnreadableRow => "unreadable-row",
            Self::UnsegmentedRecord => "unsegmented-record",
        }
    }
}

impl fmt::Display for DiagnosticReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why one row or record did not become a transaction. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowDiagnostic {
    pub row: usize,
    pub reason: DiagnosticReason,
    pub detail: Option<String>,
}

impl RowDiagnostic {
    pub fn new(row: usize, reason: DiagnosticReason) -> Self {
        Self {
            row,
            reason,
            detail: None,
        }
    }

    pub fn with_detail(row: usize, reason: DiagnosticReason, detail: impl Into<String>) -> Self {
        Self {
            row,
            reason,
            detail: Some(detail.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportOutcome {
    /// Nothing to import and nothing wrong: a header-only or blank statement.
    Empty,
    Complete,
    Partial,
    /// Rows were present but none could be converted.
    NothingParsed,
}

/// Transactions and diagnostics in source order.
///
/// `succeeded + skipped == attempted` always holds because the only way to add
/// to either list is through [`ImportResult::push_transaction`] and
/// [`ImportResult::push_diagnostic`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    transactions: Vec<CanonicalTransaction>,
    diagnostics: Vec<RowDiagnostic>,
    attempted: usize,
}

impl ImportResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_transaction(&mut self, txn: CanonicalTransaction) {
        self.attempted += 1;
        self.transactions.push(txn);
    }

    pub fn push_diagnostic(&mut self, diagnostic: RowDiagnostic) {
        log::debug!(
            "row {} skipped: {}{}",
            diagnostic.row,
            diagnostic.reason,
            diagnostic
                .detail
                .as_deref()
                .map(|d| format!(" ({d})"))
                .unwrap_or_default()
        );
        self.attempted += 1;
        self.diagnostics.push(diagnostic);
    }

    pub fn transactions(&self) -> &[CanonicalTransaction] {
        &self.transactions
    }

    pub fn diagnostics(&self) -> &[RowDiagnostic] {
        &self.diagnostics
    }

    pub fn attempted(&self) -> usize {
        self.attempted
    }

    pub fn succeeded(&self) -> usize {
        self.transactions.len()
    }

    pub fn skipped(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty() && self.diagnostics.is_empty()
    }

    pub fn outcome(&self) -> ImportOutcome {
        match (self.transactions.is_empty(), self.diagnostics.is_empty()) {
            (true, true) => ImportOutcome::Empty,
            (false, true) => ImportOutcome::Complete,
            (false, false) => ImportOutcome::Partial,
            (true, false) => ImportOutcome::NothingParsed,
        }
    }
}

/// What the orchestrator hands back for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub file_name: String,
    pub format: FileFormat,
    pub handler: String,
    pub bank: String,
    /// SHA-256 of the input bytes, hex encoded.
    pub checksum: String,
    pub result: ImportResult,
}
