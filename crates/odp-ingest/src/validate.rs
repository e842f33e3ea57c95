//! Row filtering and validation
//!
//! Decides, per normalized row, whether it is kept, filtered out by the
//! voided-order convention, or rejected with a diagnostic. The three
//! outcomes plus the silent blank-row skip are mutually exclusive; every
//! row ends in exactly one of them, so the upload summary accounts for
//! every line of the sheet.

use crate::normalize::NormalizedRecord;
use crate::schema::{REQUIRED_FIELDS, RUC_FIELDS};

/// Rows with more than this many validation errors abort the upload
///
/// Past this point the file is almost certainly the wrong template or has
/// its header in the wrong row; producing thousands of per-row errors
/// helps nobody.
pub const MAX_ROW_ERRORS: usize = 100;

/// At most this many diagnostics are returned to the caller
pub const MAX_REPORTED_ERRORS: usize = 20;

/// Order identifiers ending in this suffix mark voided/placeholder lines
pub const VOIDED_ORDER_SUFFIX: &str = "-0";

/// Whether the order identifier marks a voided line (filtered, not errored)
pub fn is_voided_order(order_id: &str) -> bool {
    order_id.ends_with(VOIDED_ORDER_SUFFIX)
}

/// Validate one normalized record
///
/// `sheet_row` is the 1-based row number in the original sheet and is
/// embedded in every diagnostic so operators can jump straight to the
/// offending line in the file they uploaded.
pub fn validate_record(record: &NormalizedRecord, sheet_row: usize) -> Vec<String> {
    let mut errors = Vec::new();

    for field in REQUIRED_FIELDS {
        let missing = record.text(field).map_or(true, str::is_empty);
        if missing {
            errors.push(format!(
                "Row {}: required field '{}' is empty",
                sheet_row, field
            ));
        }
    }

    for field in RUC_FIELDS {
        if let Some(ruc) = record.text(field).filter(|s| !s.is_empty()) {
            if !is_valid_ruc(ruc) {
                errors.push(format!(
                    "Row {}: invalid RUC in '{}': {}",
                    sheet_row, field, ruc
                ));
            }
        }
    }

    errors
}

/// Peruvian RUC: exactly 11 ASCII digits
fn is_valid_ruc(ruc: &str) -> bool {
    ruc.len() == 11 && ruc.bytes().all(|b| b.is_ascii_digit())
}
