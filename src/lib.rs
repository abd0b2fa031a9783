//! # Statement Tables
//!
//! A library for turning a company's raw quarterly and annual financial
//! statements (Income Statement, Balance Sheet, Cash Flow) into two
//! normalized metric tables ready for report rendering.
//!
//! ## Core Concepts
//!
//! - **PeriodRecord**: one reporting period as the provider returned it,
//!   fields still under provider names
//! - **Canonical Vocabulary**: the fixed metric schema; each metric lists
//!   its provider field candidates in priority order (first match wins)
//! - **MetricTable**: rows = canonical metrics, columns = period-end dates,
//!   absent cells are absent, never zero
//! - **TTM rows**: trailing-twelve-month sums over four consecutive
//!   quarters, derived on the quarterly table only
//! - **Derived rows**: margins, ratios and growth rates computed from
//!   normalized cells
//!
//! The pipeline is a pure function of the fetched input: fetch, normalize,
//! derive, hand off. No state survives a run, and a run either completes or
//! aborts whole; partially populated tables are never surfaced.
//!
//! ## Example
//!
//! ```rust
//! use statement_tables::*;
//! use chrono::NaiveDate;
//! use std::collections::BTreeMap;
//!
//! let mut fields = BTreeMap::new();
//! fields.insert("totalRevenue".to_string(), Some(1000.0));
//!
//! let source = StaticSource::new(vec![PeriodRecord {
//!     statement_type: StatementType::Income,
//!     cadence: Cadence::Quarterly,
//!     period_end: NaiveDate::from_ymd_opt(2023, 3, 31).unwrap(),
//!     fields,
//! }]);
//!
//! let vocabulary = alpha_vantage_vocabulary();
//! let bundle = build_report(&source, &vocabulary, &RunContext::new("ACME")).unwrap();
//! assert_eq!(
//!     bundle.quarterly.value("revenue", NaiveDate::from_ymd_opt(2023, 3, 31).unwrap()),
//!     Some(1000.0)
//! );
//! ```

pub mod derived;
pub mod error;
pub mod normalizer;
pub mod schema;
pub mod source;
pub mod table;
pub mod ttm;
pub mod utils;
pub mod vocabulary;

#[cfg(feature = "alpha-vantage")]
pub mod alpha_vantage;

pub use error::{Result, StatementError};
pub use normalizer::Normalizer;
pub use schema::*;
pub use source::{StatementSource, StaticSource};
pub use table::{MetricRow, MetricTable};
pub use ttm::{derive_ttm, TTM_SUFFIX};
pub use vocabulary::alpha_vantage_vocabulary;

use log::{debug, info};
use serde::{Deserialize, Serialize};

/// One glossary line for the report's definitions sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub metric: String,
    pub definition: String,
}

/// Everything the report sink consumes: the two normalized tables plus the
/// glossary. Quarterly columns are strictly newest-first, annual columns
/// strictly oldest-first; the sink's chart ranges depend on both.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportBundle {
    pub ticker: String,
    pub quarterly: MetricTable,
    pub annual: MetricTable,
    pub glossary: Vec<GlossaryEntry>,
}

/// Runs the full pipeline for one company: validate the vocabulary, fetch
/// all six statement/cadence combinations, normalize each cadence, derive
/// TTM rows on the quarterly table, append ratio and growth rows, and bundle
/// the result. Any error aborts the run; there are no retries and no partial
/// tables.
pub fn build_report<S: StatementSource>(
    source: &S,
    vocabulary: &MetricVocabulary,
    ctx: &RunContext,
) -> Result<ReportBundle> {
    vocabulary.validate()?;
    info!("Building statement tables for {}", ctx.ticker);

    let quarterly = build_cadence_table(source, vocabulary, ctx, Cadence::Quarterly)?;
    let annual = build_cadence_table(source, vocabulary, ctx, Cadence::Annual)?;

    Ok(ReportBundle {
        ticker: ctx.ticker.clone(),
        quarterly,
        annual,
        glossary: build_glossary(vocabulary),
    })
}

fn build_cadence_table<S: StatementSource>(
    source: &S,
    vocabulary: &MetricVocabulary,
    ctx: &RunContext,
    cadence: Cadence,
) -> Result<MetricTable> {
    let mut records = Vec::new();
    for statement_type in StatementType::ALL {
        let fetched = source.fetch_statement(&ctx.ticker, statement_type, cadence)?;
        debug!(
            "{} {:?} {:?}: {} period records",
            ctx.ticker,
            statement_type,
            cadence,
            fetched.len()
        );
        records.extend(fetched);
    }

    let mut table = Normalizer::new(vocabulary).normalize(&records, cadence)?;
    if cadence == Cadence::Quarterly {
        ttm::derive_ttm(&mut table, vocabulary);
    }
    derived::append_derived_rows(&mut table);
    Ok(table)
}

/// Glossary in presentation order: canonical metrics with their TTM
/// variants, then the derived ratios and both growth families.
pub fn build_glossary(vocabulary: &MetricVocabulary) -> Vec<GlossaryEntry> {
    let mut glossary = Vec::new();

    for metric in &vocabulary.metrics {
        glossary.push(GlossaryEntry {
            metric: metric.display_name.clone(),
            definition: metric.definition.clone(),
        });
        if metric.is_ttm_eligible {
            glossary.push(GlossaryEntry {
                metric: format!("TTM {}", metric.display_name),
                definition: format!(
                    "Trailing twelve months: sum of the four most recent quarters of {}.",
                    metric.display_name
                ),
            });
        }
    }

    for ratio in derived::ratio_metrics() {
        glossary.push(GlossaryEntry {
            metric: ratio.display_name.to_string(),
            definition: ratio.definition.to_string(),
        });
    }
    for cadence in [Cadence::Quarterly, Cadence::Annual] {
        for growth in derived::growth_metrics(cadence) {
            glossary.push(GlossaryEntry {
                metric: growth.display_name.to_string(),
                definition: growth.definition.to_string(),
            });
        }
    }

    glossary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(
        statement_type: StatementType,
        cadence: Cadence,
        period_end: NaiveDate,
        fields: &[(&str, f64)],
    ) -> PeriodRecord {
        PeriodRecord {
            statement_type,
            cadence,
            period_end,
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), Some(*v)))
                .collect(),
        }
    }

    fn quarterly_income_source() -> StaticSource {
        let quarters = [
            (date(2023, 3, 31), 100.0),
            (date(2023, 6, 30), 110.0),
            (date(2023, 9, 30), 120.0),
            (date(2023, 12, 31), 130.0),
        ];
        StaticSource::new(
            quarters
                .iter()
                .map(|&(d, revenue)| {
                    record(
                        StatementType::Income,
                        Cadence::Quarterly,
                        d,
                        &[("totalRevenue", revenue)],
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn test_build_report_end_to_end() {
        let source = quarterly_income_source();
        let vocabulary = alpha_vantage_vocabulary();
        let bundle = build_report(&source, &vocabulary, &RunContext::new("ACME")).unwrap();

        assert_eq!(bundle.ticker, "ACME");
        // Quarterly columns newest first.
        assert_eq!(bundle.quarterly.periods()[0], date(2023, 12, 31));
        // TTM Revenue at the newest quarter is the sum of all four.
        assert_eq!(
            bundle.quarterly.value("revenue_ttm", date(2023, 12, 31)),
            Some(460.0)
        );
        // Oldest quarter has only one observation behind it.
        assert_eq!(
            bundle.quarterly.value("revenue_ttm", date(2023, 3, 31)),
            None
        );
        // Annual table exists even with zero annual records.
        assert!(bundle.annual.periods().is_empty());
        assert!(!bundle.annual.metrics().is_empty());
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let source = quarterly_income_source();
        let vocabulary = alpha_vantage_vocabulary();
        let ctx = RunContext::new("ACME");

        let first = build_report(&source, &vocabulary, &ctx).unwrap();
        let second = build_report(&source, &vocabulary, &ctx).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_vocabulary_aborts_before_fetching() {
        let source = quarterly_income_source();
        let vocabulary = MetricVocabulary::new(vec![]);
        let result = build_report(&source, &vocabulary, &RunContext::new("ACME"));
        assert!(matches!(
            result,
            Err(StatementError::InvalidVocabulary(_))
        ));
    }

    #[test]
    fn test_source_error_aborts_the_run() {
        struct FailingSource;
        impl StatementSource for FailingSource {
            fn fetch_statement(
                &self,
                _ticker: &str,
                _statement_type: StatementType,
                _cadence: Cadence,
            ) -> Result<Vec<PeriodRecord>> {
                Err(StatementError::Source("401 unauthorized".to_string()))
            }
        }

        let vocabulary = alpha_vantage_vocabulary();
        let result = build_report(&FailingSource, &vocabulary, &RunContext::new("ACME"));
        assert!(matches!(result, Err(StatementError::Source(_))));
    }

    #[test]
    fn test_glossary_covers_ttm_and_derived_rows() {
        let vocabulary = alpha_vantage_vocabulary();
        let glossary = build_glossary(&vocabulary);

        let names: Vec<&str> = glossary.iter().map(|e| e.metric.as_str()).collect();
        assert!(names.contains(&"Revenue"));
        assert!(names.contains(&"TTM Revenue"));
        assert!(names.contains(&"Free Cash Flow"));
        assert!(names.contains(&"QoQ Revenue Growth"));
        assert!(names.contains(&"YoY FCF Growth"));

        // A TTM definition sits right after its parent metric.
        let revenue_idx = names.iter().position(|&n| n == "Revenue").unwrap();
        assert_eq!(names[revenue_idx + 1], "TTM Revenue");
    }
}
