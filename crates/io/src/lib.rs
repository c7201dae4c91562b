// File I/O: load the input table, write the result table

use std::path::Path;

use namematch_recon::Table;

pub mod csv;
pub mod output;
pub mod xlsx;

/// Input formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Spreadsheet,
    Csv,
    Tsv,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(Self::Spreadsheet),
            "csv" | "txt" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            _ => None,
        }
    }
}

/// Load the first sheet (or the named one) of a spreadsheet, or a delimited text file.
pub fn load_table(path: &Path, sheet: Option<&str>) -> Result<Table, String> {
    match TableFormat::from_path(path) {
        Some(TableFormat::Spreadsheet) => xlsx::import(path, sheet),
        Some(TableFormat::Csv) => csv::import(path),
        Some(TableFormat::Tsv) => csv::import_with_delimiter(path, b'\t'),
        None => Err(format!(
            "unsupported input format: {} (expected xlsx, xls, xlsb, ods, csv or tsv)",
            path.display()
        )),
    }
}

/// Blank headers become `Unnamed: N`; repeats get `.1`, `.2` suffixes.
pub(crate) fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for (i, header) in raw.into_iter().enumerate() {
        let base = if header.trim().is_empty() { format!("Unnamed: {i}") } else { header };
        let mut candidate = base.clone();
        let mut n = 1;
        while out.contains(&candidate) {
            candidate = format!("{base}.{n}");
            n += 1;
        }
        out.push(candidate);
    }
    out
}
