use sha2::{Digest, Sha256};

use crate::banks;
use crate::categorizer::CategoryRules;
use crate::engine::ParserEngine;
use crate::error::{ImportError, Result};
use crate::filetype::{extension_of, FileTypeChain};
use crate::handler::BankHandler;
use crate::models::{FileFormat, ImportReport};
use crate::settings::Settings;
use crate::source::ImportSource;

/// A handler chosen for a file together with the parser it built.
pub struct ResolvedParser<'a> {
    pub handler: &'a dyn BankHandler,
    pub engine: ParserEngine,
}

/// Owns the ordered handler list and runs one file end to end.
///
/// Immutable after construction; one orchestrator can serve concurrent
/// imports of different files.
pub struct ImportOrchestrator {
    file_types: FileTypeChain,
    handlers: Vec<Box<dyn BankHandler>>,
    rules: CategoryRules,
    sniff_bytes: usize,
}

impl ImportOrchestrator {
    pub fn new(handlers: Vec<Box<dyn BankHandler>>) -> Self {
        Self {
            file_types: FileTypeChain::default(),
            handlers,
            rules: CategoryRules::default(),
            sniff_bytes: Settings::default().sniff_bytes,
        }
    }

    /// Built-in banks and fallbacks, configured from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            rules: CategoryRules::compile(&settings.category_rules)?,
            sniff_bytes: settings.sniff_bytes,
            ..Self::new(banks::default_handlers(settings))
        })
    }

    pub fn handlers(&self) -> &[Box<dyn BankHandler>] {
        &self.handlers
    }

    pub fn source(&self, file_name: impl Into<String>, bytes: Vec<u8>) -> ImportSource {
        ImportSource::new(file_name, bytes).with_sniff_limit(self.sniff_bytes)
    }

    pub fn resolve_format(&self, source: &ImportSource) -> Result<FileFormat> {
        let ext = extension_of(source.file_name());
        self.file_types
            .resolve_with_content(ext, source.head())
            .ok_or_else(|| ImportError::UnsupportedFileType(source.file_name().to_string()))
    }

    /// First handler that claims the file builds the parser. A claimed handler
    /// that cannot build one is an error; later handlers are not consulted.
    pub fn resolve_parser(&self, source: &ImportSource, format: FileFormat) -> Result<ResolvedParser<'_>> {
        let handler = self
            .handlers
            .iter()
            .find(|h| h.can_handle(source, format))
            .ok_or_else(|| ImportError::NoHandlerMatched {
                file_name: source.file_name().to_string(),
                format,
            })?;
        log::debug!("{} claimed {}", handler.id(), source.file_name());
        let engine = handler
            .create_parser(format)
            .map_err(|e| ImportError::HandlerConstruction {
                handler: handler.id().to_string(),
                source: Box::new(e),
            })?;
        Ok(ResolvedParser {
            handler: handler.as_ref(),
            engine,
        })
    }

    pub fn import(&self, source: &ImportSource) -> Result<ImportReport> {
        let format = self.resolve_format(source)?;
        let resolved = self.resolve_parser(source, format)?;
        let result = resolved.engine.parse(source, &self.rules)?;
        Ok(ImportReport {
            file_name: source.file_name().to_string(),
            format,
            handler: resolved.handler.id().to_string(),
            bank: resolved.engine.bank().to_string(),
            checksum: checksum(source.bytes()),
            result,
        })
    }
}

pub fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
