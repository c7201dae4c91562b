// CSV/TSV import/export

use std::io::Read;
use std::path::Path;

use namematch_recon::{CellValue, OutputTable, Table};

use crate::normalize_headers;

pub fn import(path: &Path) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter)
}

pub fn import_with_delimiter(path: &Path, delimiter: u8) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, delimiter)
}

/// Delimiter candidates in preference order. Russian-locale Excel writes `;`.
const DELIMITERS: [u8; 4] = [b';', b'\t', b',', b'|'];

/// Pick the delimiter that splits the header into more than one field and is
/// confirmed by the most of the next few data rows; wider headers break ties,
/// then preference order. Falls back to `,`.
fn sniff_delimiter(content: &str) -> u8 {
    let mut lines = content
        .trim_start_matches('\u{feff}')
        .lines()
        .filter(|l| !l.trim().is_empty());
    let Some(header) = lines.next() else {
        return b',';
    };
    let sample: Vec<&str> = lines.take(5).collect();

    let mut best: Option<(u8, usize, usize)> = None;
    for delim in DELIMITERS {
        let width = field_count(header, delim);
        if width <= 1 {
            continue;
        }
        let agreeing = sample.iter().filter(|l| field_count(l, delim) == width).count();
        let better = match best {
            Some((_, a, w)) => (agreeing, width) > (a, w),
            None => true,
        };
        if better {
            best = Some((delim, agreeing, width));
        }
    }
    best.map(|(delim, _, _)| delim).unwrap_or(b',')
}

/// Fields on one line, honouring quotes.
fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map(|r| r.len())
        .unwrap_or(1)
}

/// Read file and convert to UTF-8 if needed. Non-UTF-8 input is decoded as
/// Windows-1251, the usual encoding of Cyrillic CSV exported from Excel.
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| format!("cannot open {}: {e}", path.display()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            log::info!("{} is not UTF-8, decoding as Windows-1251", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1251.decode(&bytes);
            decoded.into_owned()
        }
    };
    Ok(text.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(text))
}

fn import_from_string(content: &str, delimiter: u8) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let headers = match records.next() {
        Some(header) => header.map_err(|e| e.to_string())?.iter().map(str::to_string).collect(),
        None => return Err("input file is empty".to_string()),
    };
    let mut table = Table::new(normalize_headers(headers));

    for result in records {
        let record = result.map_err(|e| e.to_string())?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        table.push_row(record.iter().map(CellValue::from).collect());
    }

    Ok(table)
}

/// Write the result table as UTF-8 CSV. Styling is not representable and is dropped.
pub fn export(table: &OutputTable, path: &Path) -> Result<(), String> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| format!("cannot create {}: {e}", path.display()))?;
    writer.write_record(&table.headers).map_err(|e| e.to_string())?;
    for row in &table.rows {
        writer
            .write_record(row.cells.iter().map(CellValue::as_text))
            .map_err(|e| e.to_string())?;
    }
    writer.flush().map_err(|e| format!("cannot write {}: {e}", path.display()))
}
