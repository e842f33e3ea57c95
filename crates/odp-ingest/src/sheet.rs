//! Workbook decoding
//!
//! Converts uploaded workbook bytes into a plain cell grid. The pipeline
//! core never sees `calamine` types; everything downstream works on [`Cell`]
//! so the decoder can be swapped without touching normalization.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDate;
use std::io::Cursor;
use thiserror::Error;

/// One spreadsheet cell, reduced to the shapes the normalizer understands
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
}

/// Errors produced while decoding workbook bytes
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to open workbook: {0}")]
    Open(String),

    #[error("Workbook has no sheets")]
    NoSheets,

    #[error("Failed to read sheet '{name}': {message}")]
    Sheet { name: String, message: String },
}

/// Decode the first sheet of a workbook into a row-major cell grid
///
/// Formula cells arrive as their cached values; error cells and anything
/// else calamine cannot represent become [`Cell::Empty`], matching the
/// pipeline's treatment of missing data.
pub fn decode_first_sheet(bytes: &[u8]) -> Result<Vec<Vec<Cell>>, DecodeError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook =
        open_workbook_auto_from_rs(cursor).map_err(|e| DecodeError::Open(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(DecodeError::NoSheets)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| DecodeError::Sheet {
            name: sheet_name.clone(),
            message: e.to_string(),
        })?;

    let grid = range
        .rows()
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    Ok(grid)
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        // Keep the raw serial; date-typed fields convert it through the
        // workbook epoch during normalization.
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) => Cell::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_text_and_numbers() {
        assert_eq!(convert_cell(&Data::String("abc".into())), Cell::Text("abc".into()));
        assert_eq!(convert_cell(&Data::Int(42)), Cell::Number(42.0));
        assert_eq!(convert_cell(&Data::Float(1.5)), Cell::Number(1.5));
        assert_eq!(convert_cell(&Data::Empty), Cell::Empty);
    }

    #[test]
    fn test_error_cells_become_empty() {
        assert_eq!(
            convert_cell(&Data::Error(calamine::CellErrorType::Div0)),
            Cell::Empty
        );
    }

    #[test]
    fn test_decode_rejects_garbage_bytes() {
        let result = decode_first_sheet(b"definitely not a workbook");
        assert!(matches!(result, Err(DecodeError::Open(_))));
    }
}
