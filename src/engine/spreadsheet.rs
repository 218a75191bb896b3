use crate::error::{ImportError, Result};
use crate::layout::SheetSelector;

use super::table::RawRow;

#[cfg(feature = "spreadsheet")]
pub fn read_rows(bytes: &[u8], sheet: &SheetSelector) -> Result<Vec<RawRow>> {
    use std::io::Cursor;

    use calamine::{open_workbook_auto_from_rs, Reader};

    use crate::values::CellValue;

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ImportError::CorruptFile(format!("cannot open workbook: {e}")))?;
    let range = match sheet {
        SheetSelector::ByIndex(idx) => workbook
            .worksheet_range_at(*idx)
            .ok_or_else(|| ImportError::CorruptFile(format!("workbook has no sheet {idx}")))?,
        SheetSelector::ByName(name) => workbook.worksheet_range(name),
    }
    .map_err(|e| ImportError::CorruptFile(format!("cannot read sheet: {e}")))?;

    // calamine ranges start at the first used cell; pad so indices stay physical.
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<RawRow> = vec![Ok(Vec::new()); row_offset];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; col_offset];
        cells.extend(row.iter().map(cell_value));
        rows.push(Ok(cells));
    }
    Ok(rows)
}

#[cfg(feature = "spreadsheet")]
fn cell_value(cell: &calamine::Data) -> crate::values::CellValue {
    use calamine::Data;
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::values::{excel_serial_to_date, CellValue};

    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) | Data::DurationIso(s) => CellValue::from_text(s),
        // ODS stores dates as ISO text, with or without a clock part
        Data::DateTimeIso(s) => s
            .trim()
            .parse::<NaiveDateTime>()
            .map(|dt| dt.date())
            .or_else(|_| s.trim().parse::<NaiveDate>())
            .map(CellValue::Date)
            .unwrap_or_else(|_| CellValue::from_text(s)),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => match excel_serial_to_date(dt.as_f64()) {
            Some(date) => CellValue::Date(date),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::Error(e) => CellValue::Text(format!("#{e:?}")),
    }
}

#[cfg(not(feature = "spreadsheet"))]
pub fn read_rows(_bytes: &[u8], _sheet: &SheetSelector) -> Result<Vec<RawRow>> {
    Err(ImportError::CorruptFile(
        "spreadsheet support is not enabled in this build".to_string(),
    ))
}


#[cfg(all(test, feature = "spreadsheet"))]
mod tests {
    use super::testing::xlsx;
    use super::*;
    use crate::values::CellValue;

    #[test]
    fn test_reads_inline_strings_with_physical_rows() {
        let bytes = xlsx(&[
            vec!["Альфа-Банк"],
            vec![],
            vec!["01.03.2024", "", "", "Кофе"],
        ]);
        let rows = read_rows(&bytes, &SheetSelector::ByIndex(0)).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].as_ref().unwrap()[0], CellValue::Text("Альфа-Банк".into()));
        assert!(rows[1].as_ref().unwrap().iter().all(CellValue::is_empty));
        let last = rows[2].as_ref().unwrap();
        assert_eq!(last[0], CellValue::Text("01.03.2024".into()));
        assert_eq!(last[3], CellValue::Text("Кофе".into()));
    }

    #[test]
    fn test_sheet_by_name() {
        let bytes = xlsx(&[vec!["x"]]);
        assert!(read_rows(&bytes, &SheetSelector::ByName("Выписка".into())).is_ok());
        assert!(read_rows(&bytes, &SheetSelector::ByName("Missing".into())).is_err());
        assert!(read_rows(&bytes, &SheetSelector::ByIndex(3)).is_err());
    }

    #[test]
    fn test_iso_datetime_cells_become_dates() {
        use calamine::Data;
        use chrono::NaiveDate;

        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            cell_value(&Data::DateTimeIso("2024-03-01T00:00:00".into())),
            CellValue::Date(day)
        );
        assert_eq!(cell_value(&Data::DateTimeIso("2024-03-01".into())), CellValue::Date(day));
        assert_eq!(
            cell_value(&Data::DateTimeIso("not a date".into())),
            CellValue::Text("not a date".into())
        );
    }

    #[test]
    fn test_not_a_workbook() {
        let err = read_rows(b"definitely not zip", &SheetSelector::ByIndex(0)).unwrap_err();
        assert_eq!(err.kind(), "corrupt-file");
    }
}
