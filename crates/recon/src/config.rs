use serde::Deserialize;

use crate::error::ReconError;
use crate::model::MatchStatus;
use crate::score::ScoreMethod;

pub const DEFAULT_THRESHOLD: u8 = 85;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Reconciliation settings. Every field has a default, so an empty document
/// reproduces the stock ЗУП / портал comparison.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchConfig {
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    #[serde(default)]
    pub scorer: ScoreMethod,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub names: NamesConfig,
    #[serde(default)]
    pub labels: StatusLabels,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_threshold() -> u8 {
    DEFAULT_THRESHOLD
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            scorer: ScoreMethod::default(),
            source: SourceConfig::default(),
            names: NamesConfig::default(),
            labels: StatusLabels::default(),
            output: OutputConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Source classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Header of the free-text source tag column.
    pub column: String,
    /// Substring (case-insensitive) marking a primary row.
    pub primary_keyword: String,
    /// Substring (case-insensitive) marking a secondary row.
    pub secondary_keyword: String,
    pub primary_label: String,
    pub secondary_label: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            column: "источник".into(),
            primary_keyword: "зуп".into(),
            secondary_keyword: "портал".into(),
            primary_label: "ЗУП".into(),
            secondary_label: "портал".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Name columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamesConfig {
    /// Family, given, patronymic headers, in that order.
    pub parts: Vec<String>,
    /// Header substrings identifying a single full-name column.
    pub full_name_keywords: Vec<String>,
    /// Headers dropped from the output when equal (case-insensitive).
    pub drop_columns: Vec<String>,
}

impl Default for NamesConfig {
    fn default() -> Self {
        Self {
            parts: vec!["Фамилия".into(), "Имя".into(), "Отчество".into()],
            full_name_keywords: vec![
                "фио".into(),
                "фам".into(),
                "фамилия".into(),
                "полное".into(),
            ],
            drop_columns: vec!["фио".into()],
        }
    }
}

// ---------------------------------------------------------------------------
// Labels + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatusLabels {
    pub full_match: String,
    pub partial_match: String,
    pub no_match: String,
    pub empty_identity: String,
    pub unmatched_secondary: String,
}

impl Default for StatusLabels {
    fn default() -> Self {
        Self {
            full_match: "Полное совпадение".into(),
            partial_match: "Частичное совпадение".into(),
            no_match: "Совпадений не найдено".into(),
            empty_identity: "Пустое ФИО в ЗУП".into(),
            unmatched_secondary: "Нет в ЗУП".into(),
        }
    }
}

impl StatusLabels {
    pub fn label(&self, status: MatchStatus) -> &str {
        match status {
            MatchStatus::FullMatch => &self.full_match,
            MatchStatus::PartialMatch => &self.partial_match,
            MatchStatus::NoMatch => &self.no_match,
            MatchStatus::EmptyIdentity => &self.empty_identity,
            MatchStatus::UnmatchedSecondary => &self.unmatched_secondary,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub status_column: String,
    pub matched_name_column: String,
    pub score_column: String,
    pub primary_name_column: String,
    /// Appended to the input file stem when naming the result file.
    pub file_suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            status_column: "статус_совпадения".into(),
            matched_name_column: "совпадение_с_порталом".into(),
            score_column: "процент_совпадения".into(),
            primary_name_column: "фио_в_зуп".into(),
            file_suffix: "_результат".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MatchConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: MatchConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self, ReconError> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    /// Replace the threshold (e.g. from a command-line flag) and re-validate.
    pub fn with_threshold(mut self, threshold: u8) -> Result<Self, ReconError> {
        self.threshold = threshold;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.threshold > 100 {
            return Err(ReconError::ConfigValidation(format!(
                "threshold must be between 0 and 100, got {}",
                self.threshold
            )));
        }

        if self.source.column.trim().is_empty() {
            return Err(ReconError::ConfigValidation("source.column must not be empty".into()));
        }

        let primary = self.source.primary_keyword.trim().to_lowercase();
        let secondary = self.source.secondary_keyword.trim().to_lowercase();
        if primary.is_empty() || secondary.is_empty() {
            return Err(ReconError::ConfigValidation(
                "source keywords must not be empty".into(),
            ));
        }
        if primary == secondary {
            return Err(ReconError::ConfigValidation(format!(
                "primary and secondary keywords are identical ('{primary}')"
            )));
        }

        if self.names.parts.len() != 3 {
            return Err(ReconError::ConfigValidation(format!(
                "names.parts must list exactly 3 headers (family, given, patronymic), got {}",
                self.names.parts.len()
            )));
        }
        if self.names.full_name_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ReconError::ConfigValidation(
                "names.full_name_keywords must not contain empty entries".into(),
            ));
        }

        let out = &self.output;
        let computed = [
            &out.status_column,
            &out.matched_name_column,
            &out.score_column,
            &out.primary_name_column,
        ];
        for (i, a) in computed.iter().enumerate() {
            if a.trim().is_empty() {
                return Err(ReconError::ConfigValidation("output column names must not be empty".into()));
            }
            if computed[i + 1..].contains(a) || **a == self.source.column {
                return Err(ReconError::ConfigValidation(format!(
                    "output column '{a}' is used twice"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
