//! Canonical field vocabulary for agreement order exports
//!
//! The catalog exports the same logical columns under many spellings
//! (accented/unaccented, upper/lower case, abbreviated, with stray spaces
//! from manual edits). The vocabulary is kept as an ordered table of
//! accepted spellings per field so the header resolver stays a single
//! generic matching routine. Table order matters twice: fields earlier in
//! the table claim contested columns first, and aliases earlier in a
//! field's list are preferred over later ones.

/// Value type a canonical field normalizes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Trimmed string; empty-equivalent cells become `""`
    Text,
    /// ISO `YYYY-MM-DD` string; unparseable cells become the sentinel date
    Date,
    /// `f64`; unparseable cells become `0`
    Numeric,
}

/// One canonical field and its accepted header spellings, in preference order
#[derive(Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub aliases: &'static [&'static str],
}

/// Sentinel for date cells that are empty or unparseable
pub const DEFAULT_DATE: &str = "2000-01-01";

/// Header row position in the export template (0-based; the 6th sheet row)
pub const HEADER_ROW_INDEX: usize = 5;

/// First data row in the export template (0-based; the 7th sheet row)
pub const DATA_ROW_INDEX: usize = 6;

/// Fields that must be present as columns and non-empty per row
pub const REQUIRED_FIELDS: &[&str] = &[
    "orden_electronica",
    "razon_social_entidad",
    "ruc_entidad",
    "razon_social_proveedor",
    "ruc_proveedor",
];

/// Fields holding Peruvian tax ids; when present they must be 11 digits
pub const RUC_FIELDS: &[&str] = &["ruc_entidad", "ruc_proveedor"];

/// The full vocabulary, in claim-priority order
///
/// The spellings come from real exports; some entries preserve template
/// defects (stray interior spaces, the `PROVEVEDOR` typo) seen in files
/// circulated by buying entities.
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "orden_electronica",
        kind: FieldKind::Text,
        aliases: &[
            "Orden Electrónica",
            "ORDEN ELECTRÓNICA",
            "Orden Electronica",
            "ORDEN ELECTRONICA",
            "orden_electronica",
        ],
    },
    FieldSpec {
        name: "nro_orden_fisica",
        kind: FieldKind::Text,
        aliases: &[
            "Nro. Orden Física",
            "NRO. ORDEN FÍSICA",
            "Nro Orden Fisica",
            "NRO ORDEN FISICA",
            "Número Orden Física",
            "Nro Orden Física",
            "N ro Orden Física",
        ],
    },
    FieldSpec {
        name: "fecha_publicacion",
        kind: FieldKind::Date,
        aliases: &[
            "Fecha Publicación",
            "FECHA PUBLICACIÓN",
            "Fecha de Publicación",
            "FECHA DE PUBLICACIÓN",
            "Fecha Publicacion",
            "FECHA PUBLICACION",
            "fecha_publicacion",
        ],
    },
    FieldSpec {
        name: "fecha_aceptacion",
        kind: FieldKind::Date,
        aliases: &[
            "Fecha Aceptación",
            "FECHA ACEPTACIÓN",
            "Fecha de Aceptación",
            "FECHA DE ACEPTACIÓN",
            "Fecha Aceptacion",
            "FECHA ACEPTACION",
        ],
    },
    FieldSpec {
        name: "razon_social_entidad",
        kind: FieldKind::Text,
        aliases: &[
            "Razón Social Entidad",
            "RAZÓN SOCIAL ENTIDAD",
            "Razon Social Entidad",
            "RAZON SOCIAL ENTIDAD",
            "Entidad",
        ],
    },
    FieldSpec {
        name: "ruc_entidad",
        kind: FieldKind::Text,
        aliases: &["Ruc Entidad", "RUC ENTIDAD", "RUC Entidad", "ruc_entidad"],
    },
    FieldSpec {
        name: "unidad_ejecutora",
        kind: FieldKind::Text,
        aliases: &["Unidad Ejecutora", "UNIDAD EJECUTORA", "unidad_ejecutora"],
    },
    FieldSpec {
        name: "razon_social_proveedor",
        kind: FieldKind::Text,
        aliases: &[
            "Razón Social Proveedor",
            "RAZÓN SOCIAL PROVEEDOR",
            "Razon Social Proveedor",
            "RAZON SOCIAL PROVEEDOR",
            "Proveedor",
        ],
    },
    FieldSpec {
        name: "ruc_proveedor",
        kind: FieldKind::Text,
        aliases: &[
            "Ruc Proveedor",
            "RUC PROVEVEDOR",
            "RUC Proveedor",
            "ruc_proveedor",
        ],
    },
    FieldSpec {
        name: "direccion_proveedor",
        kind: FieldKind::Text,
        aliases: &[
            "Dirección Proveedor",
            "DIRECCIÓN PROVEEDOR",
            "Direccion Proveedor",
            "DIRECCION PROVEEDOR",
        ],
    },
    FieldSpec {
        name: "descripcion_ficha_producto",
        kind: FieldKind::Text,
        aliases: &[
            "Descripción Ficha Producto",
            "DESCRIPCIÓN FICHA PRODUCTO",
            "Descripcion Ficha Producto",
            "DESCRIPCION FICHA PRODUCTO",
            "Descripción Producto",
            "Descripcion Producto",
        ],
    },
    FieldSpec {
        name: "marca_ficha_producto",
        kind: FieldKind::Text,
        aliases: &[
            "Marca Ficha Producto",
            "MARCA FICHA PRODUCTO",
            "Marca Producto",
            "MARCA PRODUCTO",
        ],
    },
    FieldSpec {
        name: "nro_parte",
        kind: FieldKind::Text,
        aliases: &["Nro. Parte", "NRO. PARTE", "Nro Parte", "NRO PARTE", "Número Parte"],
    },
    FieldSpec {
        name: "categoria",
        kind: FieldKind::Text,
        aliases: &["Categoría", "CATEGORÍA", "Categoria", "CATEGORIA"],
    },
    FieldSpec {
        name: "catalogo",
        kind: FieldKind::Text,
        aliases: &["Catálogo", "CATÁLOGO", "Catalogo", "CATALOGO"],
    },
    FieldSpec {
        name: "cantidad_entrega",
        kind: FieldKind::Numeric,
        aliases: &["Cantidad Entrega", "CANTIDAD ENTREGA", "Cantidad", "CANTIDAD"],
    },
    FieldSpec {
        name: "precio_unitario",
        kind: FieldKind::Numeric,
        aliases: &["Precio Unitario", "PRECIO UNITARIO", "Precio Unit", "PRECIO UNIT"],
    },
    FieldSpec {
        name: "sub_total",
        kind: FieldKind::Numeric,
        aliases: &["Sub Total", "SUB TOTAL", "SubTotal", "SUBTOTAL"],
    },
    FieldSpec {
        name: "igv_entrega",
        kind: FieldKind::Numeric,
        aliases: &["IGV Entrega", "IGV ENTREGA", "IGV", "igv"],
    },
    FieldSpec {
        name: "monto_total_entrega",
        kind: FieldKind::Numeric,
        aliases: &[
            "Monto Total Entrega",
            "MONTO TOTAL ENTREGA",
            "Monto Total",
            "MONTO TOTAL",
            "Total",
        ],
    },
    FieldSpec {
        name: "fecha_inicio_entrega",
        kind: FieldKind::Date,
        aliases: &[
            "Fecha Inicio Entrega",
            "FECHA INICIO ENTREGA",
            "Fecha Inicio",
            "FECHA INICIO",
        ],
    },
    FieldSpec {
        name: "fecha_fin_entrega",
        kind: FieldKind::Date,
        aliases: &["Fecha Fin Entrega", "FECHA FIN ENTREGA", "Fecha Fin", "FECHA FIN"],
    },
    FieldSpec {
        name: "plazo_entrega",
        kind: FieldKind::Numeric,
        aliases: &["Plazo Entrega", "PLAZO ENTREGA", "Plazo", "PLAZO", "Plaz o Entrega"],
    },
    FieldSpec {
        name: "direccion_entrega",
        kind: FieldKind::Text,
        aliases: &[
            "Dirección Entrega",
            "DIRECCIÓN ENTREGA",
            "Direccion Entrega",
            "DIRECCION ENTREGA",
        ],
    },
    FieldSpec {
        name: "estado_orden_electronica",
        kind: FieldKind::Text,
        aliases: &[
            "Estado Orden Electrónica",
            "ESTADO ORDEN ELECTRÓNICA",
            "Estado Orden Electronica",
            "ESTADO ORDEN ELECTRONICA",
            "Estado de la Orden Electrónica",
            "ESTADO DE LA ORDEN ELECTRÓNICA",
            "Estado",
        ],
    },
    FieldSpec {
        name: "procedimiento",
        kind: FieldKind::Text,
        aliases: &["Procedimiento", "PROCEDIMIENTO"],
    },
    FieldSpec {
        name: "tipo_compra",
        kind: FieldKind::Text,
        aliases: &["Tipo Compra", "TIPO COMPRA", "Tipo de Compra", "TIPO DE COMPRA"],
    },
    FieldSpec {
        name: "nro_entrega",
        kind: FieldKind::Numeric,
        aliases: &["Nro. Entrega", "NRO. ENTREGA", "Nro Entrega", "NRO ENTREGA"],
    },
    FieldSpec {
        name: "total_entregas",
        kind: FieldKind::Numeric,
        aliases: &["Total Entregas", "TOTAL ENTREGAS"],
    },
    FieldSpec {
        name: "dep_entrega",
        kind: FieldKind::Text,
        aliases: &["Dep. Entrega", "DEP. ENTREGA", "Dep Entrega", "DEP ENTREGA"],
    },
    FieldSpec {
        name: "prov_entrega",
        kind: FieldKind::Text,
        aliases: &["Prov. Entrega", "PROV. ENTREGA", "Prov Entrega", "PROV ENTREGA"],
    },
    FieldSpec {
        name: "dist_entrega",
        kind: FieldKind::Text,
        aliases: &["Dist. Entrega", "DIST. ENTREGA", "Dist Entrega", "DIST ENTREGA"],
    },
    FieldSpec {
        name: "link_ficha_producto",
        kind: FieldKind::Text,
        aliases: &["Link Ficha Producto", "LINK FICHA PRODUCTO"],
    },
    FieldSpec {
        name: "orden_digitalizada",
        kind: FieldKind::Text,
        aliases: &["Orden Digitalizada", "ORDEN DIGITALIZADA"],
    },
    FieldSpec {
        name: "acuerdo_marco",
        kind: FieldKind::Text,
        aliases: &["Acuerdo Marco", "ACUERDO MARCO", "acuerdo_marco"],
    },
    FieldSpec {
        name: "fecha_inicio_vigencia",
        kind: FieldKind::Date,
        aliases: &["Fecha Inicio Vigencia", "FECHA INICIO VIGENCIA"],
    },
    FieldSpec {
        name: "fecha_fin_vigencia",
        kind: FieldKind::Date,
        aliases: &["Fecha Fin Vigencia", "FECHA FIN VIGENCIA"],
    },
    FieldSpec {
        name: "estado",
        kind: FieldKind::Text,
        aliases: &["Estado", "ESTADO"],
    },
    FieldSpec {
        name: "tipo_contratacion",
        kind: FieldKind::Text,
        aliases: &[
            "Tipo Contratación",
            "TIPO CONTRATACIÓN",
            "Tipo Contratacion",
            "TIPO CONTRATACION",
        ],
    },
    FieldSpec {
        name: "modalidad_seleccion",
        kind: FieldKind::Text,
        aliases: &[
            "Modalidad Selección",
            "MODALIDAD SELECCIÓN",
            "Modalidad Seleccion",
            "MODALIDAD SELECCION",
        ],
    },
    FieldSpec {
        name: "objeto_contratacion",
        kind: FieldKind::Text,
        aliases: &[
            "Objeto Contratación",
            "OBJETO CONTRATACIÓN",
            "Objeto Contratacion",
            "OBJETO CONTRATACION",
        ],
    },
    FieldSpec {
        name: "entidad_contratante",
        kind: FieldKind::Text,
        aliases: &["Entidad Contratante", "ENTIDAD CONTRATANTE"],
    },
    FieldSpec {
        name: "proveedor",
        kind: FieldKind::Text,
        aliases: &["Proveedor", "PROVEEDOR"],
    },
    FieldSpec {
        name: "monto_adjudicado",
        kind: FieldKind::Numeric,
        aliases: &["Monto Adjudicado", "MONTO ADJUDICADO"],
    },
];

/// Look up a field's spec by canonical name
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.name == name)
}

/// Derive the short agreement code from the user-supplied label
///
/// The code is the first whitespace-delimited token of the trimmed label,
/// e.g. `"EXT-CE-2024-11 Catálogo de Cómputo"` -> `"EXT-CE-2024-11"`.
pub fn agreement_code(label: &str) -> &str {
    label.trim().split_whitespace().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields_are_in_vocabulary() {
        for name in REQUIRED_FIELDS {
            assert!(field_spec(name).is_some(), "missing spec for {}", name);
        }
    }

    #[test]
    fn test_vocabulary_names_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for field in FIELDS {
            assert!(seen.insert(field.name), "duplicate field {}", field.name);
        }
    }

    #[test]
    fn test_date_fields_follow_naming_convention() {
        for field in FIELDS {
            if field.kind == FieldKind::Date {
                assert!(field.name.contains("fecha"), "{} is a date field", field.name);
            }
        }
    }

    #[test]
    fn test_agreement_code_takes_first_token() {
        assert_eq!(agreement_code("EXT-CE-2024-11 Catálogo de Cómputo"), "EXT-CE-2024-11");
        assert_eq!(agreement_code("  IM-CE-2023-5  "), "IM-CE-2023-5");
        assert_eq!(agreement_code(""), "");
    }
}
