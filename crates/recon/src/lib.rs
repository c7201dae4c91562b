//! `namematch-recon` — reconcile two person lists by normalized full name.
//!
//! Pure engine crate: receives a loaded table, returns verdicts and the
//! assembled output table. No CLI or IO dependencies.

pub mod assemble;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod score;
pub mod summary;

pub use config::MatchConfig;
pub use engine::{reconcile, run};
pub use error::ReconError;
pub use model::{
    CellValue, MatchOutcome, MatchStatus, OutputTable, ReconResult, Record, RecordId, Source, Table,
    Verdict,
};
pub use normalize::normalize_name;
pub use score::ScoreMethod;
