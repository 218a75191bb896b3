//! Bank statement import: CSV, spreadsheet and PDF exports in, canonical
//! transactions and per-row diagnostics out.

pub mod banks;
pub mod categorizer;
pub mod detect;
pub mod engine;
pub mod error;
pub mod filetype;
pub mod fmt;
pub mod handler;
pub mod layout;
pub mod models;
pub mod orchestrator;
pub mod settings;
pub mod sink;
pub mod source;
pub mod values;

pub use error::{ImportError, Result};
pub use handler::BankHandler;
pub use models::{
    CanonicalTransaction, DiagnosticReason, FileFormat, ImportOutcome, ImportReport,
    ImportResult, Money, RowDiagnostic,
};
pub use orchestrator::ImportOrchestrator;
pub use settings::Settings;
pub use sink::{JsonLinesSink, MemorySink, TransactionSink};
pub use source::ImportSource;
