//! Brand watch list and alert derivation
//!
//! A small set of monitored brands triggers alert records when they appear
//! in an order's product-brand field. Matching is pattern-based because the
//! exports write the brand cell inconsistently (`ZEUS`, `MARCA: ZEUS`,
//! `Marca Zeus`, the fused `HOPELIFE`, ...).

use crate::normalize::NormalizedRecord;
use serde::{Deserialize, Serialize};

/// One monitored brand and the spellings that count as a sighting
#[derive(Debug)]
pub struct WatchedBrand {
    pub name: &'static str,
    pub patterns: &'static [&'static str],
}

/// The watch list, in match-priority order
pub const WATCHED_BRANDS: &[WatchedBrand] = &[
    WatchedBrand {
        name: "WORLDLIFE",
        patterns: &["WORLDLIFE", "MARCA: WORLDLIFE", "MARCA:WORLDLIFE", "MARCA WORLDLIFE"],
    },
    WatchedBrand {
        name: "HOPE LIFE",
        patterns: &[
            "HOPE LIFE",
            "MARCA: HOPE LIFE",
            "MARCA:HOPE LIFE",
            "MARCA HOPE LIFE",
            "HOPELIFE",
            "MARCA: HOPELIFE",
        ],
    },
    WatchedBrand {
        name: "ZEUS",
        patterns: &["ZEUS", "MARCA: ZEUS", "MARCA:ZEUS", "MARCA ZEUS"],
    },
    WatchedBrand {
        name: "VALHALLA",
        patterns: &["VALHALLA", "MARCA: VALHALLA", "MARCA:VALHALLA", "MARCA VALHALLA"],
    },
];

/// Workflow state a newly derived alert starts in
pub const ALERT_STATUS_PENDING: &str = "pending";

/// A brand sighting on one order line
///
/// Keyed by (`orden_electronica`, `acuerdo_marco`). Alerts are upserted,
/// never replaced: the `status` field is advanced by the follow-up
/// workflow outside this crate and must survive re-uploads of the same
/// agreement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub orden_electronica: String,
    pub acuerdo_marco: String,
    pub brand_name: String,
    pub status: String,
    pub notes: String,
}

/// First watched brand mentioned in a brand cell, if any
pub fn detect_brand(brand_text: &str) -> Option<&'static str> {
    let upper = brand_text.trim().to_uppercase();
    if upper.is_empty() {
        return None;
    }

    WATCHED_BRANDS
        .iter()
        .find(|brand| brand.patterns.iter().any(|p| upper.contains(p)))
        .map(|brand| brand.name)
}

/// Derive at most one alert per accepted record
pub fn derive_alerts(records: &[NormalizedRecord]) -> Vec<AlertRecord> {
    records
        .iter()
        .filter_map(|record| {
            let brand_text = record.text("marca_ficha_producto")?;
            let brand = detect_brand(brand_text)?;
            let order_id = record.order_id()?;

            Some(AlertRecord {
                orden_electronica: order_id.to_string(),
                acuerdo_marco: record.acuerdo_marco.clone(),
                brand_name: brand.to_string(),
                status: ALERT_STATUS_PENDING.to_string(),
                notes: format!(
                    "Automatically detected in marca_ficha_producto: \"{}\"",
                    brand_text
                ),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::resolve_columns;
    use crate::normalize::normalize_row;
    use crate::sheet::Cell;

    #[test]
    fn test_detect_brand_plain() {
        assert_eq!(detect_brand("ZEUS"), Some("ZEUS"));
        assert_eq!(detect_brand("zeus"), Some("ZEUS"));
        assert_eq!(detect_brand("  Valhalla  "), Some("VALHALLA"));
        assert_eq!(detect_brand("ACME"), None);
        assert_eq!(detect_brand(""), None);
    }

    #[test]
    fn test_detect_brand_prefixed_spellings() {
        assert_eq!(detect_brand("MARCA: ZEUS"), Some("ZEUS"));
        assert_eq!(detect_brand("marca:worldlife"), Some("WORLDLIFE"));
        assert_eq!(detect_brand("HOPELIFE"), Some("HOPE LIFE"));
        assert_eq!(detect_brand("Marca: Hope Life"), Some("HOPE LIFE"));
    }

    #[test]
    fn test_detect_brand_embedded_in_longer_text() {
        assert_eq!(detect_brand("GUANTES ZEUS TALLA M"), Some("ZEUS"));
    }

    #[test]
    fn test_first_watch_list_match_wins() {
        // Both WORLDLIFE and ZEUS appear; the watch list order decides.
        assert_eq!(detect_brand("WORLDLIFE / ZEUS"), Some("WORLDLIFE"));
    }

    #[test]
    fn test_derive_alerts_keyed_by_order_and_agreement() {
        let header: Vec<Cell> = [
            "Orden Electrónica",
            "Razón Social Entidad",
            "Ruc Entidad",
            "Razón Social Proveedor",
            "Ruc Proveedor",
            "Marca Ficha Producto",
        ]
        .iter()
        .map(|t| Cell::Text(t.to_string()))
        .collect();
        let columns = resolve_columns(&header).unwrap();

        let rows = [
            vec!["E-2024-1-1", "Entidad", "20131257750", "Prov", "20481234567", "ZEUS"],
            vec!["E-2024-2-1", "Entidad", "20131257750", "Prov", "20481234567", "ACME"],
            vec!["E-2024-3-1", "Entidad", "20131257750", "Prov", "20481234567", "MARCA: HOPELIFE"],
        ];
        let records: Vec<_> = rows
            .iter()
            .map(|cells| {
                let row: Vec<Cell> = cells.iter().map(|c| Cell::Text(c.to_string())).collect();
                normalize_row(&row, &columns, "EXT-CE-2024-11 Cómputo", "EXT-CE-2024-11")
            })
            .collect();

        let alerts = derive_alerts(&records);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].orden_electronica, "E-2024-1-1");
        assert_eq!(alerts[0].acuerdo_marco, "EXT-CE-2024-11 Cómputo");
        assert_eq!(alerts[0].brand_name, "ZEUS");
        assert_eq!(alerts[0].status, ALERT_STATUS_PENDING);
        assert_eq!(alerts[1].brand_name, "HOPE LIFE");
    }

    #[test]
    fn test_no_alert_without_brand_column() {
        let header: Vec<Cell> = [
            "Orden Electrónica",
            "Razón Social Entidad",
            "Ruc Entidad",
            "Razón Social Proveedor",
            "Ruc Proveedor",
        ]
        .iter()
        .map(|t| Cell::Text(t.to_string()))
        .collect();
        let columns = resolve_columns(&header).unwrap();
        let row: Vec<Cell> = ["E-2024-1-1", "Entidad", "20131257750", "Prov", "20481234567"]
            .iter()
            .map(|c| Cell::Text(c.to_string()))
            .collect();
        let record = normalize_row(&row, &columns, "EXT", "EXT");

        assert!(derive_alerts(&[record]).is_empty());
    }
}
