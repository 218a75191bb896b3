//! In-memory handle on one input file.

use std::cell::OnceCell;
use std::path::Path;

use crate::engine::delimited::decode_utf16;
use crate::error::{ImportError, Result};
use crate::models::FileFormat;
use crate::values::CellValue;

/// Rows of a worksheet read for detection only.
const SAMPLE_SHEET_ROWS: usize = 15;

/// The bytes of one statement plus lazily computed views of them.
///
/// Detection only ever sees a bounded prefix ([`ImportSource::sample`]); engines
/// read the whole thing. Extracted PDF text is computed at most once per source.
pub struct ImportSource {
    file_name: String,
    bytes: Vec<u8>,
    sniff_limit: usize,
    samples: [OnceCell<String>; 3],
    text: OnceCell<std::result::Result<String, String>>,
}

impl ImportSource {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            sniff_limit: 2048,
            samples: Default::default(),
            text: OnceCell::new(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Ok(Self::new(file_name, bytes))
    }

    pub fn with_sniff_limit(mut self, limit: usize) -> Self {
        self.sniff_limit = limit.max(1);
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn head(&self) -> &[u8] {
        &self.bytes[..self.bytes.len().min(self.sniff_limit)]
    }

    /// Bounded text sample used by content detectors. Failures to read the
    /// content yield an empty sample; the engine reports the real error later.
    pub fn sample(&self, format: FileFormat) -> &str {
        self.samples[format.index()].get_or_init(|| {
            let sample = match format {
                FileFormat::Delimited => {
                    String::from_utf8_lossy(&decode_utf16(self.head())).into_owned()
                }
                FileFormat::Spreadsheet => spreadsheet_sample(&self.bytes),
                FileFormat::ExtractedText => self.text().map(str::to_string).unwrap_or_default(),
            };
            truncate_chars(sample, self.sniff_limit)
        })
    }

    /// Full statement text: PDF text extraction, or the bytes as UTF-8 for
    /// pre-extracted `.txt` files.
    pub fn text(&self) -> Result<&str> {
        self.text
            .get_or_init(|| extract_text(&self.bytes))
            .as_deref()
            .map_err(|e| ImportError::CorruptFile(e.clone()))
    }
}

fn truncate_chars(mut s: String, limit: usize) -> String {
    if let Some((idx, _)) = s.char_indices().nth(limit) {
        s.truncate(idx);
    }
    s
}

fn extract_text(bytes: &[u8]) -> std::result::Result<String, String> {
    if bytes.starts_with(b"%PDF-") {
        return extract_pdf_text(bytes);
    }
    let text = String::from_utf8_lossy(bytes);
    Ok(text.trim_start_matches('\u{feff}').to_string())
}

#[cfg(feature = "pdf")]
fn extract_pdf_text(bytes: &[u8]) -> std::result::Result<String, String> {
    log::debug!("extracting text from {} byte PDF", bytes.len());
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| format!("failed to extract PDF text: {e}"))
}

#[cfg(not(feature = "pdf"))]
fn extract_pdf_text(_bytes: &[u8]) -> std::result::Result<String, String> {
    Err("PDF support is not enabled in this build".to_string())
}

fn spreadsheet_sample(bytes: &[u8]) -> String {
    match crate::engine::spreadsheet::read_rows(bytes, &Default::default()) {
        Ok(rows) => rows
            .iter()
            .take(SAMPLE_SHEET_ROWS)
            .filter_map(|row| row.as_ref().ok())
            .map(|cells| {
                cells
                    .iter()
                    .filter(|c| !c.is_empty())
                    .map(CellValue::as_text)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Err(e) => {
            log::debug!("no spreadsheet sample: {e}");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimited_sample_is_bounded() {
        let bytes = "дата;сумма\n".repeat(500).into_bytes();
        let source = ImportSource::new("export.csv", bytes).with_sniff_limit(64);
        assert_eq!(source.head().len(), 64);
        assert!(source.sample(FileFormat::Delimited).chars().count() <= 64);
    }

    #[test]
    fn test_utf16_delimited_sample_is_readable() {
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend("Дата;Сумма\n".encode_utf16().flat_map(u16::to_le_bytes));
        let source = ImportSource::new("export.csv", bytes);
        assert!(source.sample(FileFormat::Delimited).starts_with("Дата;Сумма"));
    }

    #[test]
    fn test_plain_text_is_its_own_extraction() {
        let source = ImportSource::new("statement.txt", "\u{feff}Расшифровка операций\n".as_bytes().to_vec());
        assert_eq!(source.text().unwrap(), "Расшифровка операций\n");
        assert!(source.sample(FileFormat::ExtractedText).starts_with("Расшифровка"));
    }

    #[test]
    fn test_garbage_spreadsheet_gives_empty_sample() {
        let source = ImportSource::new("broken.xlsx", b"not a workbook".to_vec());
        assert_eq!(source.sample(FileFormat::Spreadsheet), "");
    }

    #[test]
    fn test_from_path_keeps_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        std::fs::write(&path, "a,b\n").unwrap();
        let source = ImportSource::from_path(&path).unwrap();
        assert_eq!(source.file_name(), "export.csv");
        assert_eq!(source.bytes(), b"a,b\n");
    }
}
