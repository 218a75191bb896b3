use std::borrow::Cow;

use crate::error::{ImportError, Result};
use crate::values::CellValue;

use super::table::RawRow;

const CANDIDATE_DELIMITERS: [u8; 4] = [b';', b',', b'\t', b'|'];

/// Picks the candidate that occurs most often on the first non-blank line.
/// Ties go to the earlier candidate; no candidate at all means comma.
pub fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes
        .split(|b| *b == b'\n')
        .find(|line| line.iter().any(|b| !b.is_ascii_whitespace()))
        .unwrap_or(&[]);
    CANDIDATE_DELIMITERS
        .iter()
        .map(|d| (*d, first_line.iter().filter(|b| *b == d).count()))
        .fold((b',', 0), |best, cur| if cur.1 > best.1 { cur } else { best })
        .0
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
}

/// Re-encodes UTF-16 text marked by a byte-order mark as UTF-8. Anything
/// without one is passed through untouched.
pub fn decode_utf16(bytes: &[u8]) -> Cow<'_, [u8]> {
    let (body, little_endian) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (rest, true),
        [0xFE, 0xFF, rest @ ..] => (rest, false),
        _ => return Cow::Borrowed(bytes),
    };
    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            let pair = [pair[0], pair[1]];
            if little_endian {
                u16::from_le_bytes(pair)
            } else {
                u16::from_be_bytes(pair)
            }
        })
        .collect();
    log::debug!("decoding UTF-16 {} input", if little_endian { "LE" } else { "BE" });
    Cow::Owned(String::from_utf16_lossy(&units).into_bytes())
}

/// Reads every record into cells. A record the reader rejects becomes an
/// `Err` row so later rows keep their positions.
pub fn read_rows(bytes: &[u8], delimiter: Option<u8>) -> Result<Vec<RawRow>> {
    let decoded = decode_utf16(bytes);
    let bytes = decoded.as_ref();
    let head = &bytes[..bytes.len().min(1024)];
    if head.contains(&0) {
        return Err(ImportError::CorruptFile(
            "binary content in a delimited file".to_string(),
        ));
    }
    let bytes = strip_bom(bytes);
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(bytes));
    log::debug!("reading delimited rows with {:?}", delimiter as char);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);
    let rows = rdr
        .byte_records()
        .map(|record| match record {
            Ok(record) => Ok(record
                .iter()
                .map(|field| CellValue::from_text(&String::from_utf8_lossy(field)))
                .collect()),
            Err(e) => Err(e.to_string()),
        })
        .collect();
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter(b"a;b;c\n1;2;3"), b';');
        assert_eq!(sniff_delimiter(b"a,b,c\n"), b',');
        assert_eq!(sniff_delimiter(b"\n\na\tb\tc"), b'\t');
        assert_eq!(sniff_delimiter(b"a|b"), b'|');
        assert_eq!(sniff_delimiter(b"plain"), b',');
        assert_eq!(sniff_delimiter(b"\"1,5\";\"2,5\";x"), b';');
    }

    #[test]
    fn test_read_rows_semicolon_with_bom() {
        let data = "\u{feff}Дата;Сумма\n01.03.2024;\"-1 234,56\"\n";
        let rows = read_rows(data.as_bytes(), None).unwrap();
        assert_eq!(rows.len(), 2);
        let header = rows[0].as_ref().unwrap();
        assert_eq!(header[0], CellValue::Text("Дата".into()));
        let data_row = rows[1].as_ref().unwrap();
        assert_eq!(data_row[1], CellValue::Text("-1 234,56".into()));
    }

    #[test]
    fn test_read_rows_flexible_widths() {
        let rows = read_rows(b"a,b,c\n1\n2,,\n", Some(b',')).unwrap();
        assert_eq!(rows[1].as_ref().unwrap().len(), 1);
        assert_eq!(rows[2].as_ref().unwrap()[1], CellValue::Empty);
    }

    #[test]
    fn test_utf16_with_bom_is_decoded() {
        let text = "Дата;Сумма\n01.03.2024;-1,00\n";
        let mut le = vec![0xFF, 0xFE];
        le.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
        let mut be = vec![0xFE, 0xFF];
        be.extend(text.encode_utf16().flat_map(u16::to_be_bytes));

        for bytes in [le, be] {
            let rows = read_rows(&bytes, None).unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].as_ref().unwrap()[0], CellValue::Text("Дата".into()));
            assert_eq!(rows[1].as_ref().unwrap()[1], CellValue::Text("-1,00".into()));
        }
    }

    #[test]
    fn test_binary_is_corrupt() {
        let err = read_rows(b"PK\x03\x04\x00\x00binary", None).unwrap_err();
        assert_eq!(err.kind(), "corrupt-file");
    }
}
