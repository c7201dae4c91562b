use std::fmt;

use crate::model::Source;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (threshold out of range, empty keyword, etc.).
    ConfigValidation(String),
    /// The source column used to classify rows is absent from the table.
    MissingSourceColumn { column: String },
    /// Neither the three name-part columns nor a full-name column exist.
    MissingNameColumns { parts: Vec<String>, keywords: Vec<String> },
    /// No rows were classified into one of the two partitions.
    EmptyPartition { side: Source, keyword: String },
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingSourceColumn { column } => {
                write!(f, "source column '{column}' not found")
            }
            Self::MissingNameColumns { parts, keywords } => write!(
                f,
                "no name columns found: need either {} or a column whose header contains one of {}",
                parts.iter().map(|p| format!("'{p}'")).collect::<Vec<_>>().join(", "),
                keywords.iter().map(|k| format!("'{k}'")).collect::<Vec<_>>().join(", "),
            ),
            Self::EmptyPartition { side, keyword } => {
                write!(f, "no {side} records found (source containing '{keyword}')")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

impl ReconError {
    /// Schema-level problems with the input table (as opposed to config or IO).
    pub fn is_input_schema(&self) -> bool {
        matches!(self, Self::MissingSourceColumn { .. } | Self::MissingNameColumns { .. })
    }
}
