//! Name columns and the comparison key derived from them.

use crate::config::NamesConfig;
use crate::error::ReconError;
use crate::model::{NormalizedKey, Table};

/// Where a row's identity comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameSchema {
    /// Family, given and patronymic columns, joined in that order.
    Parts { family: usize, given: usize, patronymic: usize },
    /// A single full-name column, used verbatim.
    FullName { column: usize },
}

impl NameSchema {
    /// Prefer the exact three-part headers; otherwise take the first header
    /// containing one of the full-name keywords.
    pub fn detect(table: &Table, names: &NamesConfig) -> Result<Self, ReconError> {
        if let [family, given, patronymic] = names.parts.as_slice() {
            if let (Some(family), Some(given), Some(patronymic)) =
                (table.column(family), table.column(given), table.column(patronymic))
            {
                return Ok(Self::Parts { family, given, patronymic });
            }
        }

        let keywords: Vec<String> =
            names.full_name_keywords.iter().map(|k| k.to_lowercase()).collect();
        table
            .headers
            .iter()
            .position(|h| {
                let lower = h.to_lowercase();
                keywords.iter().any(|k| lower.contains(k.as_str()))
            })
            .map(|column| Self::FullName { column })
            .ok_or_else(|| ReconError::MissingNameColumns {
                parts: names.parts.clone(),
                keywords: names.full_name_keywords.clone(),
            })
    }

    /// Columns consumed to build identity.
    pub fn columns(&self) -> Vec<usize> {
        match *self {
            Self::Parts { family, given, patronymic } => vec![family, given, patronymic],
            Self::FullName { column } => vec![column],
        }
    }

    /// Identity text of a row before normalization.
    pub fn identity(&self, table: &Table, row: usize) -> String {
        match *self {
            Self::Parts { family, given, patronymic } => [family, given, patronymic]
                .iter()
                .map(|&col| table.cell(row, col))
                .filter(|cell| !cell.is_blank())
                .map(|cell| cell.as_text().trim().to_string())
                .collect::<Vec<_>>()
                .join(" "),
            Self::FullName { column } => table.cell(row, column).as_text(),
        }
    }
}

/// Lower-case, collapse whitespace runs, trim. Blank input yields the empty key.
pub fn normalize_name(raw: &str) -> NormalizedKey {
    NormalizedKey(raw.split_whitespace().map(str::to_lowercase).collect::<Vec<_>>().join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        let mut t = Table::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            t.push_row(row.iter().map(|v| CellValue::from(*v)).collect());
        }
        t
    }

    #[test]
    fn normalize_collapses_and_lowercases() {
        assert_eq!(normalize_name("  Иванов   ИВАН\tИванович ").as_str(), "иванов иван иванович");
        assert_eq!(normalize_name("Smith\n John").as_str(), "smith john");
    }

    #[test]
    fn normalize_blank_is_empty() {
        assert!(normalize_name("").is_empty());
        assert!(normalize_name(" \t \n").is_empty());
    }

    #[test]
    fn detect_prefers_parts() {
        let t = table(&["источник", "ФИО", "Фамилия", "Имя", "Отчество"], &[]);
        let schema = NameSchema::detect(&t, &NamesConfig::default()).unwrap();
        assert_eq!(schema, NameSchema::Parts { family: 2, given: 3, patronymic: 4 });
    }

    #[test]
    fn detect_full_name_by_keyword() {
        let t = table(&["источник", "Табельный", "Полное имя сотрудника"], &[]);
        let schema = NameSchema::detect(&t, &NamesConfig::default()).unwrap();
        assert_eq!(schema, NameSchema::FullName { column: 2 });
    }

    #[test]
    fn detect_needs_all_three_parts() {
        // Only two parts present: the "Фамилия" header still matches as a full-name column.
        let t = table(&["источник", "Фамилия", "Имя"], &[]);
        let schema = NameSchema::detect(&t, &NamesConfig::default()).unwrap();
        assert_eq!(schema, NameSchema::FullName { column: 1 });
    }

    #[test]
    fn detect_fails_without_name_columns() {
        let t = table(&["источник", "Отдел"], &[]);
        let err = NameSchema::detect(&t, &NamesConfig::default()).unwrap_err();
        assert!(err.is_input_schema());
    }

    #[test]
    fn parts_skip_blank_and_trim() {
        let t = table(
            &["Фамилия", "Имя", "Отчество"],
            &[&[" Петров ", "Пётр", ""], &["", "", "  "]],
        );
        let schema = NameSchema::detect(&t, &NamesConfig::default()).unwrap();
        assert_eq!(schema.identity(&t, 0), "Петров Пётр");
        assert_eq!(schema.identity(&t, 1), "");
    }

    #[test]
    fn full_name_identity_is_verbatim() {
        let t = table(&["ФИО"], &[&["  Сидоров  Пётр "]]);
        let schema = NameSchema::detect(&t, &NamesConfig::default()).unwrap();
        assert_eq!(schema.identity(&t, 0), "  Сидоров  Пётр ");
        assert_eq!(normalize_name(&schema.identity(&t, 0)).as_str(), "сидоров пётр");
    }

    #[test]
    fn numeric_parts_render_as_text() {
        let mut t = Table::new(vec!["Фамилия".into(), "Имя".into(), "Отчество".into()]);
        t.push_row(vec![CellValue::text("Agent"), CellValue::Number(7.0), CellValue::Empty]);
        let schema = NameSchema::detect(&t, &NamesConfig::default()).unwrap();
        assert_eq!(schema.identity(&t, 0), "Agent 7");
    }
}
