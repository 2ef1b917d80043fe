//! Member recap upload — validates the QPR Excel workbook and reports what it
//! contains. The recap is not fed into scoring.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Reader, Xlsx};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

pub const RECAP_SHEET: &str = "Recap Point Penilaian";
/// Zero-based sheet row holding the column headers; the first row is a title.
pub const HEADER_ROW: usize = 1;

#[derive(Debug, Error)]
pub enum RecapError {
    #[error("Only .xlsx files are accepted")]
    NotXlsx,

    #[error("Excel format does not match: {0}")]
    Workbook(#[from] calamine::XlsxError),

    #[error("Sheet '{RECAP_SHEET}' has no header row")]
    MissingHeader,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecapSummary {
    pub file_name: String,
    pub columns: Vec<String>,
    pub member_rows: usize,
}

/// Opens the workbook, reads the recap sheet's header row, and counts the
/// non-empty rows beneath it.
pub fn read_recap(file_name: &str, bytes: &[u8]) -> Result<RecapSummary, RecapError> {
    if !file_name.to_ascii_lowercase().ends_with(".xlsx") {
        return Err(RecapError::NotXlsx);
    }

    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let range = workbook.worksheet_range(RECAP_SHEET)?;

    // The range starts at the first used cell, not at A1.
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let skip = HEADER_ROW.saturating_sub(first_row);

    let mut rows = range.rows().skip(skip);
    let columns: Vec<String> = rows
        .next()
        .ok_or(RecapError::MissingHeader)?
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if columns.is_empty() {
        return Err(RecapError::MissingHeader);
    }

    let member_rows = rows
        .filter(|row| row.iter().any(|cell| !cell.to_string().trim().is_empty()))
        .count();

    info!("Recap '{file_name}' read: {member_rows} rows, {} columns", columns.len());

    Ok(RecapSummary {
        file_name: file_name.to_string(),
        columns,
        member_rows,
    })
}

#[cfg(test)]
mod tests {
    use rust_xlsxwriter::Workbook;

    use super::*;

    const HEADER: &[&str] = &["No", "Nama", "Divisi", "Total Point"];

    /// Builds an .xlsx in memory with one sheet, writing `rows` from `first_row`
    /// down. An empty slice leaves that row blank.
    fn workbook(sheet: &str, first_row: u32, rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet).unwrap();
        for (offset, cells) in rows.iter().enumerate() {
            for (col, value) in cells.iter().enumerate() {
                worksheet
                    .write_string(first_row + offset as u32, col as u16, *value)
                    .unwrap();
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_reads_header_below_title_row() {
        let bytes = workbook(
            RECAP_SHEET,
            0,
            &[
                &["Recap Point Penilaian QPR II"],
                HEADER,
                &["1", "Budi Santoso", "Media", "78"],
                &["2", "Sari", "Acara", "81"],
            ],
        );

        let summary = read_recap("QPR II.xlsx", &bytes).unwrap();
        assert_eq!(summary.columns, HEADER);
        assert_eq!(summary.member_rows, 2);
        assert_eq!(summary.file_name, "QPR II.xlsx");
    }

    #[test]
    fn test_used_range_starting_at_header_row() {
        // No title cell, so the used range begins on the header row itself.
        let bytes = workbook(
            RECAP_SHEET,
            HEADER_ROW as u32,
            &[
                HEADER,
                &["1", "Budi Santoso", "Media", "78"],
                &[],
                &["2", "Sari", "Acara", "81"],
            ],
        );

        let summary = read_recap("qpr.xlsx", &bytes).unwrap();
        assert_eq!(summary.columns, HEADER);
        assert_eq!(summary.member_rows, 2);
    }

    #[test]
    fn test_missing_recap_sheet() {
        let bytes = workbook("Sheet1", 0, &[HEADER]);
        let err = read_recap("qpr.xlsx", &bytes).unwrap_err();
        assert!(matches!(err, RecapError::Workbook(_)));
    }

    #[test]
    fn test_title_without_header_row() {
        let bytes = workbook(RECAP_SHEET, 0, &[&["Recap Point Penilaian QPR II"]]);
        let err = read_recap("qpr.xlsx", &bytes).unwrap_err();
        assert!(matches!(err, RecapError::MissingHeader));
    }

    #[test]
    fn test_rejects_non_xlsx_names() {
        assert!(matches!(
            read_recap("qpr.csv", b"a,b,c"),
            Err(RecapError::NotXlsx)
        ));
        assert!(matches!(read_recap("qpr", b""), Err(RecapError::NotXlsx)));
    }

    #[test]
    fn test_rejects_bytes_that_are_not_a_workbook() {
        let err = read_recap("QPR II.XLSX", b"definitely not a zip archive").unwrap_err();
        assert!(matches!(err, RecapError::Workbook(_)));
        assert!(err.to_string().starts_with("Excel format does not match"));
    }
}
