use std::collections::BTreeMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single cell of the input table, as loaded by the IO boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) | Self::Bool(_) => false,
        }
    }

    /// String form of the cell. Integral numbers render without decimals.
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Self::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

/// One sheet of input: a header row plus data rows.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    /// Index of the first header equal to `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at (row, col). Short rows read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&CellValue::Empty)
    }
}

/// Opaque handle for an input row, assigned at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub(crate) usize);

impl RecordId {
    /// Zero-based position of the record among the table's data rows.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Primary,
    Secondary,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Secondary => write!(f, "secondary"),
        }
    }
}

/// Canonical comparison key: lower-cased, whitespace-collapsed, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormalizedKey(pub(crate) String);

impl NormalizedKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A classified input row. `name` is the identity text as it appeared in the
/// table (joined parts or the full-name cell), before normalization.
#[derive(Debug, Clone)]
pub struct Record {
    pub id: RecordId,
    pub source: Source,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Verdicts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    FullMatch,
    PartialMatch,
    NoMatch,
    EmptyIdentity,
    UnmatchedSecondary,
}

impl MatchStatus {
    pub const ALL: [MatchStatus; 5] = [
        Self::FullMatch,
        Self::PartialMatch,
        Self::NoMatch,
        Self::EmptyIdentity,
        Self::UnmatchedSecondary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullMatch => "full_match",
            Self::PartialMatch => "partial_match",
            Self::NoMatch => "no_match",
            Self::EmptyIdentity => "empty_identity",
            Self::UnmatchedSecondary => "unmatched_secondary",
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchOutcome {
    FullMatch { secondary: RecordId, score: u8 },
    PartialMatch { secondary: RecordId, score: u8 },
    NoMatch { score: u8 },
    EmptyIdentity,
    UnmatchedSecondary { secondary: RecordId },
}

impl MatchOutcome {
    pub fn status(&self) -> MatchStatus {
        match self {
            Self::FullMatch { .. } => MatchStatus::FullMatch,
            Self::PartialMatch { .. } => MatchStatus::PartialMatch,
            Self::NoMatch { .. } => MatchStatus::NoMatch,
            Self::EmptyIdentity => MatchStatus::EmptyIdentity,
            Self::UnmatchedSecondary { .. } => MatchStatus::UnmatchedSecondary,
        }
    }

    /// Score reported in the output. Zero for outcomes without a comparison.
    pub fn score(&self) -> u8 {
        match self {
            Self::FullMatch { score, .. }
            | Self::PartialMatch { score, .. }
            | Self::NoMatch { score } => *score,
            Self::EmptyIdentity | Self::UnmatchedSecondary { .. } => 0,
        }
    }

    /// The secondary record this outcome cites, if any.
    pub fn secondary(&self) -> Option<RecordId> {
        match self {
            Self::FullMatch { secondary, .. }
            | Self::PartialMatch { secondary, .. }
            | Self::UnmatchedSecondary { secondary } => Some(*secondary),
            Self::NoMatch { .. } | Self::EmptyIdentity => None,
        }
    }
}

/// One reconciliation verdict. `primary` is `None` only for unmatched secondary rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub primary: Option<RecordId>,
    #[serde(flatten)]
    pub outcome: MatchOutcome,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct OutputRow {
    pub record: RecordId,
    pub source: Source,
    pub status: MatchStatus,
    pub cells: Vec<CellValue>,
}

/// Assembled result table. Presentation maps `status` to a row style.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OutputTable {
    pub headers: Vec<String>,
    pub rows: Vec<OutputRow>,
}

// ---------------------------------------------------------------------------
// Summary + Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconSummary {
    pub total_rows: usize,
    pub primary_rows: usize,
    pub secondary_rows: usize,
    pub unclassified_rows: usize,
    pub shadowed_secondary: usize,
    pub status_counts: BTreeMap<MatchStatus, usize>,
}

impl ReconSummary {
    pub fn count(&self, status: MatchStatus) -> usize {
        self.status_counts.get(&status).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
    pub threshold: u8,
    pub scorer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub verdicts: Vec<Verdict>,
    pub table: OutputTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_text_forms() {
        assert_eq!(CellValue::Number(42.0).as_text(), "42");
        assert_eq!(CellValue::Number(1.5).as_text(), "1.5");
        assert_eq!(CellValue::Empty.as_text(), "");
        assert!(CellValue::text("   ").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }

    #[test]
    fn short_rows_read_as_empty() {
        let mut t = Table::new(vec!["a".into(), "b".into()]);
        t.push_row(vec![CellValue::from("x")]);
        assert_eq!(t.cell(0, 1), &CellValue::Empty);
        assert_eq!(t.cell(5, 0), &CellValue::Empty);
    }

    #[test]
    fn outcome_accessors() {
        let o = MatchOutcome::NoMatch { score: 40 };
        assert_eq!(o.status(), MatchStatus::NoMatch);
        assert_eq!(o.score(), 40);
        assert_eq!(o.secondary(), None);

        let o = MatchOutcome::UnmatchedSecondary { secondary: RecordId(3) };
        assert_eq!(o.score(), 0);
        assert_eq!(o.secondary(), Some(RecordId(3)));
    }

    #[test]
    fn verdict_serializes_flat() {
        let v = Verdict {
            primary: Some(RecordId(0)),
            outcome: MatchOutcome::PartialMatch { secondary: RecordId(4), score: 92 },
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["status"], "partial_match");
        assert_eq!(json["secondary"], 4);
        assert_eq!(json["score"], 92);
        assert_eq!(json["primary"], 0);
    }
}
