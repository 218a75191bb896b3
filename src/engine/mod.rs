//! Configurable parsing engines. Banks differ only in the layout they hand in.

pub mod delimited;
pub mod spreadsheet;
pub mod table;
pub mod text;

use crate::categorizer::CategoryRules;
use crate::error::Result;
use crate::layout::{TableParseConfig, TextPatternSet};
use crate::models::{FileFormat, ImportResult};
use crate::source::ImportSource;

/// A ready-to-run parser for one file format and one bank layout.
#[derive(Debug, Clone)]
pub enum ParserEngine {
    Delimited { bank: String, config: TableParseConfig },
    Spreadsheet { bank: String, config: TableParseConfig },
    Text { bank: String, patterns: TextPatternSet },
}

impl ParserEngine {
    pub fn bank(&self) -> &str {
        match self {
            Self::Delimited { bank, .. } | Self::Spreadsheet { bank, .. } | Self::Text { bank, .. } => {
                bank
            }
        }
    }

    pub fn format(&self) -> FileFormat {
        match self {
            Self::Delimited { .. } => FileFormat::Delimited,
            Self::Spreadsheet { .. } => FileFormat::Spreadsheet,
            Self::Text { .. } => FileFormat::ExtractedText,
        }
    }

    /// File-level failures (unreadable workbook, failed PDF extraction) are
    /// errors; everything row-level ends up in the result's diagnostics.
    pub fn parse(&self, source: &ImportSource, rules: &CategoryRules) -> Result<ImportResult> {
        let result = match self {
            Self::Delimited { bank, config } => {
                let rows = delimited::read_rows(source.bytes(), config.delimiter)?;
                table::parse_rows(&rows, config, bank, rules)
            }
            Self::Spreadsheet { bank, config } => {
                let rows = spreadsheet::read_rows(source.bytes(), &config.sheet)?;
                table::parse_rows(&rows, config, bank, rules)
            }
            Self::Text { bank, patterns } => text::parse_text(source.text()?, patterns, bank, rules),
        };
        log::info!(
            "{}: {} parsed, {} skipped from {}",
            self.bank(),
            result.succeeded(),
            result.skipped(),
            source.file_name()
        );
        Ok(result)
    }
}
