//! Header resolution
//!
//! Locates each canonical field's column inside the export's header row.
//! Matching is two-phase per field: every alias is tried for an exact match
//! before any alias is tried for a normalized match, so an exact header
//! always beats one that only matches after case/diacritic folding. A
//! column claimed by an earlier field in vocabulary order is never handed
//! to a later field.

use crate::schema::{FieldSpec, FIELDS, REQUIRED_FIELDS};
use crate::sheet::Cell;
use std::collections::HashSet;
use thiserror::Error;

/// Mapping from canonical field name to its 0-based column index
///
/// Built once per upload from the header row; read-only afterward. Fields
/// absent from the file are simply not present in the map.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    entries: Vec<(&'static str, usize)>,
}

impl ColumnMap {
    /// Column index for a canonical field, if the file has it
    pub fn get(&self, field: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, idx)| *idx)
    }

    /// Mapped fields in vocabulary order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Errors produced during header resolution
#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("Missing required columns: {}", fields.join(", "))]
    MissingRequired { fields: Vec<String> },
}

/// Fold a header or alias for tolerant comparison
///
/// Lowercases, strips Spanish diacritics, drops punctuation (underscore
/// survives, matching snake_case aliases) and collapses runs of whitespace.
pub fn normalize_header(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_space = true;

    for c in input.to_lowercase().chars() {
        let c = fold_diacritic(c);
        if c.is_alphanumeric() || c == '_' {
            out.push(c);
            last_was_space = false;
        } else if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        }
        // Everything else (punctuation) is dropped.
    }

    out.trim_end().to_string()
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        other => other,
    }
}

/// Resolve the column map from the header row
///
/// # Errors
///
/// Returns [`HeaderError::MissingRequired`] naming every required field
/// that could not be located; the upload is rejected before any data row
/// is read.
pub fn resolve_columns(header_row: &[Cell]) -> Result<ColumnMap, HeaderError> {
    let texts: Vec<Option<String>> = header_row.iter().map(header_text).collect();

    let mut map = ColumnMap::default();
    let mut claimed: HashSet<usize> = HashSet::new();

    for field in FIELDS {
        if let Some(idx) = locate_field(field, &texts, &claimed) {
            claimed.insert(idx);
            map.entries.push((field.name, idx));
        }
    }

    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|name| map.get(name).is_none())
        .map(|name| name.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(HeaderError::MissingRequired { fields: missing });
    }

    tracing::debug!(
        mapped = map.len(),
        total = FIELDS.len(),
        "Header columns resolved"
    );

    Ok(map)
}

/// Two-phase scan for one field: exact over all aliases, then normalized
fn locate_field(
    field: &FieldSpec,
    texts: &[Option<String>],
    claimed: &HashSet<usize>,
) -> Option<usize> {
    for alias in field.aliases {
        let alias = alias.trim();
        for (idx, text) in texts.iter().enumerate() {
            if claimed.contains(&idx) {
                continue;
            }
            if let Some(text) = text {
                if text.trim() == alias {
                    return Some(idx);
                }
            }
        }
    }

    for alias in field.aliases {
        let normalized_alias = normalize_header(alias);
        for (idx, text) in texts.iter().enumerate() {
            if claimed.contains(&idx) {
                continue;
            }
            if let Some(text) = text {
                if normalize_header(text) == normalized_alias {
                    return Some(idx);
                }
            }
        }
    }

    None
}

fn header_text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Text(s) => Some(s.clone()),
        Cell::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
