//! One handler interface, composed from small strategy values per bank.

use std::fmt;
use std::sync::Arc;

use crate::detect::BankDetector;
use crate::engine::ParserEngine;
use crate::error::{ImportError, Result};
use crate::layout::{TableParseConfig, TextPatternSet};
use crate::models::FileFormat;
use crate::source::ImportSource;

pub trait BankHandler: Send + Sync {
    /// Stable identifier, e.g. `alfabank` or `generic_csv`.
    fn id(&self) -> &str;
    fn display_name(&self) -> &str;
    /// Bank identifier stamped on every transaction this handler produces.
    fn bank(&self) -> &str;
    fn formats(&self) -> &[FileFormat];

    fn supports_format(&self, format: FileFormat) -> bool {
        self.formats().contains(&format)
    }

    fn can_handle(&self, source: &ImportSource, format: FileFormat) -> bool;

    fn create_parser(&self, format: FileFormat) -> Result<ParserEngine>;

    fn is_fallback(&self) -> bool {
        false
    }
}

/// The layout a handler binds to one of its formats.
#[derive(Debug, Clone)]
pub enum Layout {
    Table(TableParseConfig),
    Text(TextPatternSet),
}

/// Extra content check on the bounded sample, after the detector agreed.
pub type ContentSniffer = fn(&str) -> bool;
pub type LayoutFactory = Arc<dyn Fn(FileFormat) -> Result<Layout> + Send + Sync>;

pub struct HandlerDescriptor {
    id: &'static str,
    display_name: &'static str,
    bank: &'static str,
    formats: Vec<FileFormat>,
    /// `None` marks a generic fallback that accepts any file of its formats.
    detector: Option<BankDetector>,
    sniffer: Option<ContentSniffer>,
    factory: LayoutFactory,
}

impl HandlerDescriptor {
    pub fn for_bank(
        id: &'static str,
        display_name: &'static str,
        formats: &[FileFormat],
        detector: BankDetector,
        factory: impl Fn(FileFormat) -> Result<Layout> + Send + Sync + 'static,
    ) -> Self {
        let bank = detector.signature().id;
        Self {
            id,
            display_name,
            bank,
            formats: formats.to_vec(),
            detector: Some(detector),
            sniffer: None,
            factory: Arc::new(factory),
        }
    }

    pub fn fallback(
        id: &'static str,
        display_name: &'static str,
        format: FileFormat,
        factory: impl Fn(FileFormat) -> Result<Layout> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            display_name,
            bank: "generic",
            formats: vec![format],
            detector: None,
            sniffer: None,
            factory: Arc::new(factory),
        }
    }

    pub fn with_sniffer(mut self, sniffer: ContentSniffer) -> Self {
        self.sniffer = Some(sniffer);
        self
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("id", &self.id)
            .field("formats", &self.formats)
            .field("fallback", &self.detector.is_none())
            .finish()
    }
}

impl BankHandler for HandlerDescriptor {
    fn id(&self) -> &str {
        self.id
    }

    fn display_name(&self) -> &str {
        self.display_name
    }

    fn bank(&self) -> &str {
        self.bank
    }

    fn formats(&self) -> &[FileFormat] {
        &self.formats
    }

    fn can_handle(&self, source: &ImportSource, format: FileFormat) -> bool {
        if !self.supports_format(format) {
            return false;
        }
        let Some(detector) = &self.detector else {
            return true;
        };
        let sample = source.sample(format);
        detector.matches(source.file_name(), sample)
            && self.sniffer.map_or(true, |sniff| sniff(&sample.to_lowercase()))
    }

    fn create_parser(&self, format: FileFormat) -> Result<ParserEngine> {
        if !self.supports_format(format) {
            return Err(ImportError::UnsupportedFormatForHandler {
                handler: self.id.to_string(),
                format,
            });
        }
        let bank = self.bank.to_string();
        match ((self.factory)(format)?, format) {
            (Layout::Table(config), FileFormat::Delimited) => {
                config.validate()?;
                Ok(ParserEngine::Delimited { bank, config })
            }
            (Layout::Table(config), FileFormat::Spreadsheet) => {
                config.validate()?;
                Ok(ParserEngine::Spreadsheet { bank, config })
            }
            (Layout::Text(patterns), FileFormat::ExtractedText) => {
                Ok(ParserEngine::Text { bank, patterns })
            }
            (_, format) => Err(ImportError::InvalidLayout(format!(
                "layout does not fit {format} input"
            ))),
        }
    }

    fn is_fallback(&self) -> bool {
        self.detector.is_none()
    }
}
