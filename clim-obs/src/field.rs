use serde::{Deserialize, Serialize};
use std::fmt;

/// Names that select the paired TX/TN analysis.
pub const PAIRED_NAMES: [&str; 4] = ["txtn", "tx+tn", "tx/tn", "paired"];

/// The numeric field an aggregation run reads from each record.
///
/// `Paired` reads TX and TN together and is only meaningful for the strict
/// annual aggregation; every other variant yields one value per record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnalysisField {
    #[default]
    Paired,
    Tx,
    Tn,
    Column(String),
}

impl AnalysisField {
    /// Map a well-known field name. Extra columns need a `Dataset` to resolve.
    pub fn from_known_name(name: &str) -> Option<AnalysisField> {
        let lowered = name.trim().to_ascii_lowercase();
        if PAIRED_NAMES.contains(&lowered.as_str()) {
            return Some(AnalysisField::Paired);
        }
        match lowered.as_str() {
            "tx" => Some(AnalysisField::Tx),
            "tn" => Some(AnalysisField::Tn),
            _ => None,
        }
    }

    pub fn is_paired(&self) -> bool {
        matches!(self, AnalysisField::Paired)
    }

    /// Label used in chart captions and tooltips.
    pub fn label(&self) -> String {
        match self {
            AnalysisField::Paired => "TX/TN".to_string(),
            AnalysisField::Tx => "TX".to_string(),
            AnalysisField::Tn => "TN".to_string(),
            AnalysisField::Column(name) => name.clone(),
        }
    }
}

/// Unknown names become `Column`; `Dataset::resolve` checks they exist.
impl From<&str> for AnalysisField {
    fn from(name: &str) -> Self {
        AnalysisField::from_known_name(name)
            .unwrap_or_else(|| AnalysisField::Column(name.trim().to_string()))
    }
}

impl From<String> for AnalysisField {
    fn from(name: String) -> Self {
        AnalysisField::from(name.as_str())
    }
}

impl From<AnalysisField> for String {
    fn from(field: AnalysisField) -> Self {
        match field {
            AnalysisField::Paired => "TXTN".to_string(),
            AnalysisField::Tx => "TX".to_string(),
            AnalysisField::Tn => "TN".to_string(),
            AnalysisField::Column(name) => name,
        }
    }
}

impl fmt::Display for AnalysisField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Raised when a field name matches neither TX/TN nor a dataset column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub name: String,
    pub available: Vec<String>,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown analysis field {:?}; expected TX, TN, TXTN", self.name)?;
        if !self.available.is_empty() {
            write!(f, " or one of: {}", self.available.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldError {}
