use crate::error::{Result, StatementError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum StatementType {
    Income,
    Balance,
    CashFlow,
}

impl StatementType {
    pub const ALL: [StatementType; 3] = [Self::Income, Self::Balance, Self::CashFlow];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Cadence {
    Quarterly,
    Annual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum UnitKind {
    Currency,
    Ratio,
    PerShare,
    Count,
}

/// One reporting period as returned by the provider, untouched: field names
/// are the provider's own, values are at source magnitude. A `None` value
/// means the provider reported the line item as empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodRecord {
    pub statement_type: StatementType,
    pub cadence: Cadence,
    pub period_end: NaiveDate,
    pub fields: BTreeMap<String, Option<f64>>,
}

/// A metric in the canonical vocabulary. `source_field_candidates` lists the
/// provider field names that may carry this metric, in priority order: the
/// first candidate present and non-null in a period wins, regardless of what
/// any later candidate holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalMetric {
    pub id: String,
    pub display_name: String,
    pub statement_type: StatementType,
    pub source_field_candidates: Vec<String>,
    pub unit_kind: UnitKind,
    pub is_ttm_eligible: bool,
    pub definition: String,
}

/// The ordered set of canonical metrics. Declaration order here is the row
/// order of every normalized table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricVocabulary {
    pub metrics: Vec<CanonicalMetric>,
}

impl MetricVocabulary {
    pub fn new(metrics: Vec<CanonicalMetric>) -> Self {
        Self { metrics }
    }

    pub fn get(&self, id: &str) -> Option<&CanonicalMetric> {
        self.metrics.iter().find(|m| m.id == id)
    }

    /// Whether any metric owned by `statement_type` claims `field` as a
    /// candidate. Used to flag provider fields with no canonical mapping.
    pub fn owns_field(&self, statement_type: StatementType, field: &str) -> bool {
        self.metrics.iter().any(|m| {
            m.statement_type == statement_type
                && m.source_field_candidates.iter().any(|c| c == field)
        })
    }

    /// Startup validation: metric ids must be unique, every metric must name
    /// at least one candidate field, and no provider field may be claimed by
    /// two metrics of the same statement type.
    pub fn validate(&self) -> Result<()> {
        if self.metrics.is_empty() {
            return Err(StatementError::InvalidVocabulary(
                "vocabulary contains no metrics".to_string(),
            ));
        }

        let mut ids = BTreeSet::new();
        let mut claimed: BTreeSet<(StatementType, &str)> = BTreeSet::new();

        for metric in &self.metrics {
            if !ids.insert(metric.id.as_str()) {
                return Err(StatementError::InvalidVocabulary(format!(
                    "duplicate metric id '{}'",
                    metric.id
                )));
            }

            if metric.source_field_candidates.is_empty() {
                return Err(StatementError::InvalidVocabulary(format!(
                    "metric '{}' has no source field candidates",
                    metric.id
                )));
            }

            for candidate in &metric.source_field_candidates {
                if !claimed.insert((metric.statement_type, candidate.as_str())) {
                    return Err(StatementError::InvalidVocabulary(format!(
                        "field '{}' on {:?} is claimed by more than one metric",
                        candidate, metric.statement_type
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Run-scoped context threaded through the pipeline. There is no process
/// global "current ticker": everything a run needs travels in this value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    pub ticker: String,
}

impl RunContext {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(id: &str, statement_type: StatementType, candidates: &[&str]) -> CanonicalMetric {
        CanonicalMetric {
            id: id.to_string(),
            display_name: id.to_string(),
            statement_type,
            source_field_candidates: candidates.iter().map(|c| c.to_string()).collect(),
            unit_kind: UnitKind::Currency,
            is_ttm_eligible: false,
            definition: String::new(),
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_vocabulary() {
        let vocab = MetricVocabulary::new(vec![
            metric("revenue", StatementType::Income, &["totalRevenue"]),
            metric("cash", StatementType::Balance, &["cashAndCashEquivalents"]),
        ]);
        assert!(vocab.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let vocab = MetricVocabulary::new(vec![
            metric("revenue", StatementType::Income, &["totalRevenue"]),
            metric("revenue", StatementType::Income, &["revenue"]),
        ]);
        assert!(matches!(
            vocab.validate(),
            Err(StatementError::InvalidVocabulary(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_candidates() {
        let vocab = MetricVocabulary::new(vec![metric("revenue", StatementType::Income, &[])]);
        assert!(vocab.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_double_claimed_field() {
        let vocab = MetricVocabulary::new(vec![
            metric("revenue", StatementType::Income, &["totalRevenue"]),
            metric("sales", StatementType::Income, &["totalRevenue"]),
        ]);
        assert!(vocab.validate().is_err());
    }

    #[test]
    fn test_same_field_on_different_statements_is_allowed() {
        let vocab = MetricVocabulary::new(vec![
            metric("income_dr", StatementType::Income, &["deferredRevenue"]),
            metric("balance_dr", StatementType::Balance, &["deferredRevenue"]),
        ]);
        assert!(vocab.validate().is_ok());
    }

    #[test]
    fn test_owns_field_is_scoped_to_statement_type() {
        let vocab = MetricVocabulary::new(vec![metric(
            "revenue",
            StatementType::Income,
            &["totalRevenue"],
        )]);
        assert!(vocab.owns_field(StatementType::Income, "totalRevenue"));
        assert!(!vocab.owns_field(StatementType::Balance, "totalRevenue"));
        assert!(!vocab.owns_field(StatementType::Income, "netIncome"));
    }
}
