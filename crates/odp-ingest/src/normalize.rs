//! Row normalization
//!
//! Converts one raw row into a typed [`NormalizedRecord`] using the column
//! map. Normalization never fails: date and numeric cells that cannot be
//! parsed resolve to documented sentinels (`2000-01-01` and `0`) instead of
//! nulls or errors, because downstream consumers and the brand predicate
//! rely on every mapped field being defined.

use crate::header::ColumnMap;
use crate::schema::{field_spec, FieldKind, DEFAULT_DATE};
use crate::sheet::Cell;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// A typed value produced by normalization
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Trimmed string; canonical empty marker is `""`
    Text(String),
    /// ISO `YYYY-MM-DD` string
    Date(String),
    /// Parsed amount/quantity/counter
    Number(f64),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Date(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// One normalized order line, keyed by canonical field name
///
/// Carries the upload's agreement label and derived code; both are injected
/// by the normalizer and win over any same-named column in the sheet.
/// Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub acuerdo_marco: String,
    pub codigo_acuerdo_marco: String,
    values: BTreeMap<&'static str, FieldValue>,
}

impl NormalizedRecord {
    /// Value for a mapped canonical field
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Text value for a mapped field (`Some("")` is the empty marker)
    pub fn text(&self, field: &str) -> Option<&str> {
        self.values.get(field).and_then(FieldValue::as_text)
    }

    /// Numeric value for a mapped field
    pub fn number(&self, field: &str) -> Option<f64> {
        self.values.get(field).and_then(FieldValue::as_number)
    }

    /// The order identifier, when the column was mapped and non-empty
    pub fn order_id(&self) -> Option<&str> {
        self.text("orden_electronica").filter(|s| !s.is_empty())
    }

    /// Mapped fields and their values, in canonical-name order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> + '_ {
        self.values.iter().map(|(name, value)| (*name, value))
    }
}

/// Whether a cell counts as empty for normalization purposes
///
/// Empty markers used by the catalog exports: blank cells, `"-"` and
/// `"N/A"` (any case).
pub fn is_empty_cell(cell: &Cell) -> bool {
    match cell {
        Cell::Empty => true,
        Cell::Text(s) => {
            let trimmed = s.trim();
            trimmed.is_empty() || trimmed == "-" || trimmed.eq_ignore_ascii_case("n/a")
        },
        _ => false,
    }
}

/// Whether an entire raw row is structurally blank
pub fn is_blank_row(row: &[Cell]) -> bool {
    row.iter().all(is_empty_cell)
}

/// Normalize one raw row into a record
///
/// Every field present in the column map yields a value; unmapped fields
/// are absent. Cells past the end of a short row are treated as empty.
pub fn normalize_row(
    row: &[Cell],
    columns: &ColumnMap,
    agreement_label: &str,
    agreement_code: &str,
) -> NormalizedRecord {
    const MISSING: Cell = Cell::Empty;

    let mut values = BTreeMap::new();

    for (field, idx) in columns.iter() {
        let cell = row.get(idx).unwrap_or(&MISSING);
        let kind = field_spec(field).map(|spec| spec.kind).unwrap_or(FieldKind::Text);

        let value = match kind {
            FieldKind::Date => FieldValue::Date(normalize_date(cell)),
            FieldKind::Numeric => FieldValue::Number(normalize_number(cell)),
            FieldKind::Text => FieldValue::Text(normalize_text(cell)),
        };

        values.insert(field, value);
    }

    // The upload's agreement identity wins over any same-named sheet column.
    values.insert(
        "acuerdo_marco",
        FieldValue::Text(agreement_label.to_string()),
    );

    NormalizedRecord {
        acuerdo_marco: agreement_label.to_string(),
        codigo_acuerdo_marco: agreement_code.to_string(),
        values,
    }
}

/// Normalize a date cell to an ISO `YYYY-MM-DD` string
///
/// Accepts workbook serials (1900 epoch), native dates, and `D/M/YYYY` or
/// `DD-MM-YYYY` strings. Anything else resolves to [`DEFAULT_DATE`].
pub fn normalize_date(cell: &Cell) -> String {
    if is_empty_cell(cell) {
        return DEFAULT_DATE.to_string();
    }

    let parsed = match cell {
        Cell::Date(date) => Some(*date),
        Cell::Number(serial) => date_from_serial(*serial),
        Cell::Text(s) => parse_date_string(s.trim()),
        _ => None,
    };

    parsed
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| DEFAULT_DATE.to_string())
}

/// Convert a 1900-system workbook serial to a calendar date
///
/// Serials 1-59 predate the phantom 1900-02-29 the format inherited from
/// Lotus 1-2-3 and use the 1899-12-31 base; later serials use 1899-12-30 so
/// real dates from 1900-03-01 onward line up.
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > 2_958_465.0 {
        return None;
    }

    let days = serial.trunc() as u64;
    let base = if days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };

    base.checked_add_days(chrono::Days::new(days))
}

fn parse_date_string(s: &str) -> Option<NaiveDate> {
    // Day-first forms used in the exports, then ISO pass-through.
    NaiveDate::parse_from_str(s, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d-%m-%Y"))
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

/// Normalize a numeric cell
///
/// Strips everything outside `[0-9.,-]`, treats the first comma as a
/// decimal separator, and falls back to the longest parseable prefix the
/// way lenient float parsers do. Unparseable cells resolve to `0`.
pub fn normalize_number(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(n) => *n,
        Cell::Text(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
                .collect();
            parse_loose_float(&cleaned.replacen(',', ".", 1)).unwrap_or(0.0)
        },
        _ => 0.0,
    }
}

fn parse_loose_float(s: &str) -> Option<f64> {
    if let Ok(v) = s.parse::<f64>() {
        return Some(v);
    }
    // Longest valid prefix, e.g. "1.234.56" parses as 1.234.
    (1..s.len())
        .rev()
        .find_map(|end| s[..end].parse::<f64>().ok())
}

fn normalize_text(cell: &Cell) -> String {
    if is_empty_cell(cell) {
        return String::new();
    }
    match cell {
        Cell::Text(s) => s.trim().to_string(),
        Cell::Number(n) => n.to_string(),
        Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
        Cell::Bool(b) => b.to_string(),
        Cell::Empty => String::new(),
    }
}
