use std::collections::HashMap;

use log::{debug, info, warn};

use crate::assemble::assemble;
use crate::config::{MatchConfig, SourceConfig};
use crate::error::ReconError;
use crate::model::{
    MatchOutcome, NormalizedKey, ReconMeta, ReconResult, Record, RecordId, Source, Table, Verdict,
};
use crate::normalize::{normalize_name, NameSchema};
use crate::score::{score, ScoreMethod};
use crate::summary::compute_summary;

/// Run reconciliation over a loaded table. Returns verdicts, the assembled
/// output table and a summary.
pub fn run(config: &MatchConfig, table: &Table) -> Result<ReconResult, ReconError> {
    let schema = NameSchema::detect(table, &config.names)?;
    info!("identity columns: {:?}", schema_headers(table, &schema));

    let ingested = ingest(table, &schema, &config.source)?;
    let (primary, secondary): (Vec<Record>, Vec<Record>) = ingested
        .records
        .iter()
        .cloned()
        .partition(|r| r.source == Source::Primary);

    info!(
        "{} primary record(s), {} secondary record(s), {} unclassified row(s)",
        primary.len(),
        secondary.len(),
        ingested.unclassified
    );

    if primary.is_empty() {
        return Err(ReconError::EmptyPartition {
            side: Source::Primary,
            keyword: config.source.primary_keyword.clone(),
        });
    }
    if secondary.is_empty() {
        return Err(ReconError::EmptyPartition {
            side: Source::Secondary,
            keyword: config.source.secondary_keyword.clone(),
        });
    }

    let recon = reconcile(&primary, &secondary, config.threshold, config.scorer);
    let output = assemble(table, &schema, &ingested.records, &recon.verdicts, config);
    let summary = compute_summary(table.rows.len(), &ingested, &recon);

    Ok(ReconResult {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            threshold: config.threshold,
            scorer: config.scorer.to_string(),
        },
        summary,
        verdicts: recon.verdicts,
        table: output,
    })
}

fn schema_headers<'a>(table: &'a Table, schema: &NameSchema) -> Vec<&'a str> {
    schema
        .columns()
        .into_iter()
        .filter_map(|c| table.headers.get(c).map(String::as_str))
        .collect()
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// Classified rows, in table order.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub records: Vec<Record>,
    /// Rows whose source tag matched neither keyword. They take no further part.
    pub unclassified: usize,
}

/// Classify a raw source tag. The primary keyword is checked first, so a tag
/// containing both keywords is primary.
pub fn classify_source(raw: &str, source: &SourceConfig) -> Option<Source> {
    let tag = raw.trim().to_lowercase();
    if tag.contains(&source.primary_keyword.trim().to_lowercase()) {
        Some(Source::Primary)
    } else if tag.contains(&source.secondary_keyword.trim().to_lowercase()) {
        Some(Source::Secondary)
    } else {
        None
    }
}

pub fn ingest(
    table: &Table,
    schema: &NameSchema,
    source: &SourceConfig,
) -> Result<Ingested, ReconError> {
    let source_col = table.column(&source.column).ok_or_else(|| {
        ReconError::MissingSourceColumn { column: source.column.clone() }
    })?;

    let mut records = Vec::with_capacity(table.rows.len());
    let mut unclassified = 0;
    for row in 0..table.rows.len() {
        match classify_source(&table.cell(row, source_col).as_text(), source) {
            Some(side) => records.push(Record {
                id: RecordId(row),
                source: side,
                name: schema.identity(table, row),
            }),
            None => unclassified += 1,
        }
    }

    if unclassified > 0 {
        warn!("{unclassified} row(s) match neither source keyword and are left out");
    }

    Ok(Ingested { records, unclassified })
}

// ---------------------------------------------------------------------------
// Secondary lookup
// ---------------------------------------------------------------------------

/// Key → secondary record. A repeated key keeps the slot of its first
/// occurrence but stores the latest record, so scans visit keys in order of
/// first appearance. Claimed keys are removed.
struct SecondaryIndex<'a> {
    slots: Vec<Option<(NormalizedKey, &'a Record)>>,
    positions: HashMap<NormalizedKey, usize>,
}

impl<'a> SecondaryIndex<'a> {
    fn new() -> Self {
        Self { slots: Vec::new(), positions: HashMap::new() }
    }

    /// Insert or overwrite. Returns the record that was replaced, if any.
    fn insert(&mut self, key: NormalizedKey, record: &'a Record) -> Option<&'a Record> {
        if let Some(&pos) = self.positions.get(&key) {
            let slot = self.slots[pos].as_mut()?;
            return Some(std::mem::replace(&mut slot.1, record));
        }
        self.positions.insert(key.clone(), self.slots.len());
        self.slots.push(Some((key, record)));
        None
    }

    fn claim(&mut self, key: &NormalizedKey) -> Option<&'a Record> {
        let pos = self.positions.remove(key)?;
        self.slots[pos].take().map(|(_, record)| record)
    }

    fn len(&self) -> usize {
        self.positions.len()
    }

    fn iter(&self) -> impl Iterator<Item = (&NormalizedKey, &'a Record)> + '_ {
        self.slots.iter().flatten().map(|(key, record)| (key, *record))
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// One verdict per primary record, in input order, then one per
    /// unclaimed secondary key, in lookup order.
    pub verdicts: Vec<Verdict>,
    /// Secondary records overwritten in the lookup by a later record with the same key.
    pub shadowed: Vec<RecordId>,
}

/// Greedy two-pass matching: exact key first, else the best-scoring remaining
/// secondary key (first seen wins ties) if it reaches `threshold`. Each
/// secondary record is claimed at most once.
pub fn reconcile(
    primary: &[Record],
    secondary: &[Record],
    threshold: u8,
    method: ScoreMethod,
) -> Reconciliation {
    let mut index = SecondaryIndex::new();
    let mut shadowed = Vec::new();
    for record in secondary {
        let key = normalize_name(&record.name);
        if key.is_empty() {
            continue;
        }
        if let Some(replaced) = index.insert(key, record) {
            warn!(
                "secondary row {} shadows row {} with the same name '{}'",
                record.id.index(),
                replaced.id.index(),
                record.name.trim()
            );
            shadowed.push(replaced.id);
        }
    }
    info!("secondary lookup built: {} unique key(s)", index.len());

    let mut verdicts = Vec::with_capacity(primary.len() + index.len());
    for record in primary {
        let key = normalize_name(&record.name);
        let outcome = match_one(&key, &mut index, threshold, method);
        debug!("row {}: '{}' -> {:?}", record.id.index(), key, outcome);
        verdicts.push(Verdict { primary: Some(record.id), outcome });
    }

    verdicts.extend(index.iter().map(|(_, record)| Verdict {
        primary: None,
        outcome: MatchOutcome::UnmatchedSecondary { secondary: record.id },
    }));

    Reconciliation { verdicts, shadowed }
}

fn match_one(
    key: &NormalizedKey,
    index: &mut SecondaryIndex<'_>,
    threshold: u8,
    method: ScoreMethod,
) -> MatchOutcome {
    if key.is_empty() {
        return MatchOutcome::EmptyIdentity;
    }

    if let Some(found) = index.claim(key) {
        return MatchOutcome::FullMatch { secondary: found.id, score: 100 };
    }

    let mut best: Option<(&NormalizedKey, u8)> = None;
    let mut best_score = 0u8;
    for (candidate, _) in index.iter() {
        let s = score(key, candidate, method);
        if s > best_score {
            best_score = s;
            best = Some((candidate, s));
        }
    }

    match best {
        Some((candidate, s)) if s >= threshold => {
            let candidate = candidate.clone();
            match index.claim(&candidate) {
                Some(found) => MatchOutcome::PartialMatch { secondary: found.id, score: s },
                None => MatchOutcome::NoMatch { score: s },
            }
        }
        _ => MatchOutcome::NoMatch { score: best_score },
    }
}
