//! Merge verdicts back with the original rows.

use std::collections::HashMap;

use crate::config::MatchConfig;
use crate::model::{
    CellValue, MatchOutcome, OutputRow, OutputTable, Record, RecordId, Source, Table, Verdict,
};
use crate::normalize::NameSchema;

/// Build the output table: primary rows in input order, then unclaimed
/// secondary rows in input order. Each row carries the source tag, status
/// label, matched name, score and primary name, followed by the pass-through
/// columns.
pub fn assemble(
    table: &Table,
    schema: &NameSchema,
    records: &[Record],
    verdicts: &[Verdict],
    config: &MatchConfig,
) -> OutputTable {
    let by_id: HashMap<RecordId, &Record> = records.iter().map(|r| (r.id, r)).collect();
    let source_col = table.column(&config.source.column);
    let passthrough = passthrough_columns(table, schema, config);

    let out = &config.output;
    let mut headers = vec![
        config.source.column.clone(),
        out.status_column.clone(),
        out.matched_name_column.clone(),
        out.score_column.clone(),
        out.primary_name_column.clone(),
    ];
    headers.extend(passthrough.iter().map(|&c| table.headers[c].clone()));

    let name_of = |id: RecordId| -> CellValue {
        by_id.get(&id).map(|r| CellValue::from(r.name.as_str())).unwrap_or(CellValue::Empty)
    };

    let mut primary_rows = Vec::new();
    let mut secondary_rows = Vec::new();
    for verdict in verdicts {
        let status = verdict.outcome.status();
        let (record, source, primary_name, matched_name) = match (&verdict.primary, &verdict.outcome) {
            (Some(p), MatchOutcome::FullMatch { secondary, .. })
            | (Some(p), MatchOutcome::PartialMatch { secondary, .. }) => {
                (*p, Source::Primary, name_of(*p), name_of(*secondary))
            }
            (Some(p), _) => (*p, Source::Primary, name_of(*p), CellValue::Empty),
            (None, MatchOutcome::UnmatchedSecondary { secondary }) => {
                (*secondary, Source::Secondary, CellValue::Empty, name_of(*secondary))
            }
            (None, _) => continue,
        };

        let row = record.index();
        let mut cells = Vec::with_capacity(headers.len());
        cells.push(source_col.map(|c| table.cell(row, c).clone()).unwrap_or(CellValue::Empty));
        cells.push(CellValue::text(config.labels.label(status)));
        cells.push(matched_name);
        cells.push(CellValue::Number(f64::from(verdict.outcome.score())));
        cells.push(primary_name);
        cells.extend(passthrough.iter().map(|&c| table.cell(row, c).clone()));

        let out_row = OutputRow { record, source, status, cells };
        match source {
            Source::Primary => primary_rows.push(out_row),
            Source::Secondary => secondary_rows.push(out_row),
        }
    }

    primary_rows.sort_by_key(|r| r.record);
    secondary_rows.sort_by_key(|r| r.record);
    primary_rows.extend(secondary_rows);

    OutputTable { headers, rows: primary_rows }
}

/// Input columns copied to the output, in their original order. Identity
/// columns, the source column, blank/"Unnamed" headers and headers that clash
/// with a computed column are left out.
pub fn passthrough_columns(table: &Table, schema: &NameSchema, config: &MatchConfig) -> Vec<usize> {
    let identity = schema.columns();
    let lower = |s: &str| s.trim().to_lowercase();

    let mut skip: Vec<String> = vec![lower(&config.source.column)];
    skip.extend(config.names.parts.iter().map(|p| lower(p)));
    skip.extend(config.names.drop_columns.iter().map(|d| lower(d)));
    let out = &config.output;
    skip.extend(
        [
            &out.status_column,
            &out.matched_name_column,
            &out.score_column,
            &out.primary_name_column,
        ]
        .iter()
        .map(|h| lower(h)),
    );

    table
        .headers
        .iter()
        .enumerate()
        .filter(|(i, h)| {
            let h = lower(h);
            let is_identity_part = matches!(schema, NameSchema::Parts { .. }) && identity.contains(i);
            !is_identity_part && !h.is_empty() && !h.contains("unnamed") && !skip.contains(&h)
        })
        .map(|(i, _)| i)
        .collect()
}
