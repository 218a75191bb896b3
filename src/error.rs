use thiserror::Error;

use crate::models::FileFormat;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("No handler recognises {file_name} ({format})")]
    NoHandlerMatched { file_name: String, format: FileFormat },

    #[error("Handler '{handler}' failed to build a parser: {source}")]
    HandlerConstruction {
        handler: String,
        #[source]
        source: Box<ImportError>,
    },

    #[error("Handler '{handler}' does not support {format} files")]
    UnsupportedFormatForHandler { handler: String, format: FileFormat },

    #[error("Corrupt file: {0}")]
    CorruptFile(String),

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Sink error: {0}")]
    Sink(String),
}

impl ImportError {
    /// Stable tag for callers that map failures to their own wording.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedFileType(_) => "unsupported-file-type",
            Self::NoHandlerMatched { .. } => "no-handler-matched",
            Self::HandlerConstruction { .. } => "handler-construction",
            Self::UnsupportedFormatForHandler { .. } => "unsupported-format-for-handler",
            Self::CorruptFile(_) => "corrupt-file",
            Self::InvalidLayout(_) => "invalid-layout",
            Self::Io(_) => "io",
            Self::Csv(_) => "corrupt-file",
            Self::Sink(_) => "sink",
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_are_distinct_for_fatal_errors() {
        let unsupported = ImportError::UnsupportedFileType("docx".into());
        let no_handler = ImportError::NoHandlerMatched {
            file_name: "a.csv".into(),
            format: FileFormat::Delimited,
        };
        let construction = ImportError::HandlerConstruction {
            handler: "alfabank".into(),
            source: Box::new(ImportError::InvalidLayout("no date column".into())),
        };
        let corrupt = ImportError::CorruptFile("truncated".into());
        let kinds = [
            unsupported.kind(),
            no_handler.kind(),
            construction.kind(),
            corrupt.kind(),
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_construction_error_names_handler() {
        let err = ImportError::HandlerConstruction {
            handler: "sberbank".into(),
            source: Box::new(ImportError::InvalidLayout("bad regex".into())),
        };
        let msg = err.to_string();
        assert!(msg.contains("sberbank"));
        assert!(msg.contains("bad regex"));
    }
}
