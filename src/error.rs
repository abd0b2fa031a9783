use crate::schema::Cadence;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatementError {
    #[error("Record dated {period_end} declares {found:?} cadence, expected {expected:?}")]
    Schema {
        expected: Cadence,
        found: Cadence,
        period_end: NaiveDate,
    },

    #[error("Invalid metric vocabulary: {0}")]
    InvalidVocabulary(String),

    #[error("Source failure: {0}")]
    Source(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "alpha-vantage")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, StatementError>;
