// Spreadsheet import (xlsx, xls, xlsb, ods) and styled xlsx export

use std::path::Path;
use std::time::Instant;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::Timelike;
use rust_xlsxwriter::{Color, Format, Workbook as XlsxWorkbook, Worksheet};
use unicode_width::UnicodeWidthStr;

use namematch_recon::{CellValue, MatchStatus, OutputTable, Source, Table};

use crate::normalize_headers;

/// Fill for fully matched primary rows (light green)
pub const FILL_FULL: u32 = 0xC6EFCE;
/// Fill for partially matched primary rows (light yellow)
pub const FILL_PARTIAL: u32 = 0xFFEB9C;
/// Fill for primary rows without a match (light red)
pub const FILL_NONE: u32 = 0xFFC7CE;

const MIN_COLUMN_WIDTH: f64 = 8.0;
const MAX_COLUMN_WIDTH: f64 = 60.0;

// ============================================================================
// Import
// ============================================================================

/// Read one worksheet into a [`Table`]. Uses `sheet` when given, otherwise the
/// first sheet of the workbook. The first row is the header.
pub fn import(path: &Path, sheet: Option<&str>) -> Result<Table, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open spreadsheet {}: {}", path.display(), e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| {
                format!("sheet '{}' not found (available: {})", wanted, sheet_names.join(", "))
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| "spreadsheet contains no sheets".to_string())?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", name, e))?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header) => header.iter().map(|c| cell_from_data(c).as_text()).collect(),
        None => return Err(format!("sheet '{}' is empty", name)),
    };
    let mut table = Table::new(normalize_headers(headers));

    for row in rows {
        let cells: Vec<CellValue> = row.iter().map(cell_from_data).collect();
        if cells.iter().all(CellValue::is_blank) {
            continue;
        }
        table.push_row(cells);
    }

    log::debug!(
        "read {} data rows, {} columns from sheet '{}'",
        table.rows.len(),
        table.headers.len(),
        name
    );
    Ok(table)
}

fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) if ndt.num_seconds_from_midnight() == 0 => {
                CellValue::Text(ndt.format("%Y-%m-%d").to_string())
            }
            Some(ndt) => CellValue::Text(ndt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from(s.as_str()),
    }
}

// ============================================================================
// Export
// ============================================================================

#[derive(Debug, Default)]
pub struct ExportResult {
    pub rows_exported: usize,
    pub rows_styled: usize,
    pub columns: usize,
    pub export_duration_ms: u128,
}

impl ExportResult {
    pub fn summary(&self) -> String {
        format!(
            "{} rows, {} columns ({} highlighted) in {}ms",
            self.rows_exported, self.columns, self.rows_styled, self.export_duration_ms
        )
    }
}

/// Fill colour for a result row. Secondary rows stay unstyled.
pub fn status_fill(status: MatchStatus, source: Source) -> Option<u32> {
    if source == Source::Secondary {
        return None;
    }
    match status {
        MatchStatus::FullMatch => Some(FILL_FULL),
        MatchStatus::PartialMatch => Some(FILL_PARTIAL),
        MatchStatus::NoMatch | MatchStatus::EmptyIdentity => Some(FILL_NONE),
        MatchStatus::UnmatchedSecondary => None,
    }
}

/// Write the result table to a single-sheet xlsx workbook: bold frozen header,
/// status fills on primary rows, fitted column widths and an auto-filter.
pub fn export(table: &OutputTable, path: &Path) -> Result<ExportResult, String> {
    let start_time = Instant::now();
    let mut result = ExportResult { columns: table.headers.len(), ..Default::default() };

    let mut xlsx_workbook = XlsxWorkbook::new();
    let worksheet = xlsx_workbook.add_worksheet();

    let header_format = Format::new().set_bold();
    for (col, header) in table.headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, header, &header_format)
            .map_err(|e| format!("Failed to write header: {}", e))?;
    }

    let plain = Format::new();
    for (i, row) in table.rows.iter().enumerate() {
        let xl_row = (i + 1) as u32;
        let format = match status_fill(row.status, row.source) {
            Some(rgb) => {
                result.rows_styled += 1;
                Format::new().set_background_color(Color::RGB(rgb))
            }
            None => plain.clone(),
        };
        for col in 0..table.headers.len() {
            let cell = row.cells.get(col).unwrap_or(&CellValue::Empty);
            write_cell(worksheet, xl_row, col as u16, cell, &format)
                .map_err(|e| format!("Failed to write row {}: {}", xl_row + 1, e))?;
        }
        result.rows_exported += 1;
    }

    for (col, width) in column_widths(table).into_iter().enumerate() {
        worksheet
            .set_column_width(col as u16, width)
            .map_err(|e| format!("Failed to set column {} width: {}", col, e))?;
    }

    if !table.headers.is_empty() {
        let last_col = (table.headers.len() - 1) as u16;
        worksheet
            .autofilter(0, 0, table.rows.len() as u32, last_col)
            .map_err(|e| format!("Failed to set autofilter: {}", e))?;
    }
    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| format!("Failed to set freeze panes: {}", e))?;

    xlsx_workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file {}: {}", path.display(), e))?;

    result.export_duration_ms = start_time.elapsed().as_millis();
    Ok(result)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    format: &Format,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    match cell {
        // Blank cells still carry the row fill
        CellValue::Empty => worksheet.write_blank(row, col, format)?,
        CellValue::Text(s) => worksheet.write_string_with_format(row, col, s, format)?,
        CellValue::Number(n) => worksheet.write_number_with_format(row, col, *n, format)?,
        CellValue::Bool(b) => worksheet.write_boolean_with_format(row, col, *b, format)?,
    };
    Ok(())
}

/// Display width of the longest value per column, padded and clamped.
fn column_widths(table: &OutputTable) -> Vec<f64> {
    table
        .headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let longest = table
                .rows
                .iter()
                .filter_map(|r| r.cells.get(col))
                .map(|c| c.as_text().width())
                .chain(std::iter::once(header.width()))
                .max()
                .unwrap_or(0);
            (longest as f64 + 2.0).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
        })
        .collect()
}
