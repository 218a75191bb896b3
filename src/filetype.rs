//! Extension-driven file format resolution.

use crate::models::FileFormat;

pub trait FileTypeDetector: Send + Sync {
    fn matches(&self, extension: &str) -> bool;
    fn format(&self) -> FileFormat;
}

/// Detector backed by a fixed extension list.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionDetector {
    format: FileFormat,
    extensions: &'static [&'static str],
}

impl ExtensionDetector {
    pub const fn new(format: FileFormat, extensions: &'static [&'static str]) -> Self {
        Self { format, extensions }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        self.extensions
    }
}

impl FileTypeDetector for ExtensionDetector {
    fn matches(&self, extension: &str) -> bool {
        let ext = normalize(extension);
        self.extensions.iter().any(|e| *e == ext)
    }

    fn format(&self) -> FileFormat {
        self.format
    }
}

pub const DELIMITED: ExtensionDetector =
    ExtensionDetector::new(FileFormat::Delimited, &["csv", "tsv"]);
pub const SPREADSHEET: ExtensionDetector =
    ExtensionDetector::new(FileFormat::Spreadsheet, &["xlsx", "xls", "xlsm", "ods"]);
pub const EXTRACTED_TEXT: ExtensionDetector =
    ExtensionDetector::new(FileFormat::ExtractedText, &["pdf", "txt"]);

fn normalize(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}

/// Ordered detector list. First match wins.
pub struct FileTypeChain {
    detectors: Vec<Box<dyn FileTypeDetector>>,
}

impl Default for FileTypeChain {
    fn default() -> Self {
        Self::new(vec![
            Box::new(DELIMITED),
            Box::new(SPREADSHEET),
            Box::new(EXTRACTED_TEXT),
        ])
    }
}

impl FileTypeChain {
    pub fn new(detectors: Vec<Box<dyn FileTypeDetector>>) -> Self {
        Self { detectors }
    }

    /// `None` means unsupported: a reportable outcome, not a bug.
    pub fn resolve(&self, extension: &str) -> Option<FileFormat> {
        self.detectors
            .iter()
            .find(|d| d.matches(extension))
            .map(|d| d.format())
    }

    /// Extension first; magic bytes only when the extension is unknown.
    pub fn resolve_with_content(&self, extension: &str, head: &[u8]) -> Option<FileFormat> {
        if let Some(format) = self.resolve(extension) {
            return Some(format);
        }
        let sniffed = sniff_format(head);
        if let Some(format) = sniffed {
            log::debug!("format {format} inferred from content (extension '{extension}')");
        }
        sniffed
    }
}

const OLE2_MAGIC: [u8; 4] = [0xD0, 0xCF, 0x11, 0xE0];

pub fn sniff_format(head: &[u8]) -> Option<FileFormat> {
    if head.starts_with(b"%PDF-") {
        return Some(FileFormat::ExtractedText);
    }
    if head.starts_with(b"PK\x03\x04") || head.starts_with(&OLE2_MAGIC) {
        return Some(FileFormat::Spreadsheet);
    }
    let line_end = head
        .iter()
        .position(|b| *b == b'\n')
        .unwrap_or(head.len());
    let first_line = &head[..line_end];
    if first_line.is_empty() || first_line.iter().any(|b| *b == 0) {
        return None;
    }
    let text = String::from_utf8_lossy(first_line);
    if text.contains(',') || text.contains(';') || text.contains('\t') {
        return Some(FileFormat::Delimited);
    }
    None
}

pub fn extension_of(file_name: &str) -> &str {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
}
