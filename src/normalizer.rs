use crate::error::{Result, StatementError};
use crate::schema::{Cadence, MetricVocabulary, PeriodRecord, StatementType};
use crate::table::{MetricRow, MetricTable};
use chrono::NaiveDate;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

/// Maps provider field names onto the canonical vocabulary, one table per
/// cadence. Missing fields become absent cells, never zeros and never errors;
/// the only failure mode is a record whose cadence contradicts the table
/// being built, which means the source broke its contract.
pub struct Normalizer<'a> {
    vocabulary: &'a MetricVocabulary,
}

impl<'a> Normalizer<'a> {
    pub fn new(vocabulary: &'a MetricVocabulary) -> Self {
        Self { vocabulary }
    }

    /// Builds one [`MetricTable`] from all records of one cadence, joining
    /// statement types on exact period-end equality. Column order is
    /// newest-first for quarterly and oldest-first for annual; both orders
    /// are relied on by the report sink for chart ranges. Row order is the
    /// vocabulary's declaration order, and every vocabulary metric gets a
    /// row even when no period carries a matching field.
    pub fn normalize(&self, records: &[PeriodRecord], cadence: Cadence) -> Result<MetricTable> {
        let mut by_key: BTreeMap<(StatementType, NaiveDate), &PeriodRecord> = BTreeMap::new();
        let mut period_set: BTreeSet<NaiveDate> = BTreeSet::new();
        let mut unmapped: BTreeSet<(StatementType, &str)> = BTreeSet::new();

        for record in records {
            if record.cadence != cadence {
                return Err(StatementError::Schema {
                    expected: cadence,
                    found: record.cadence,
                    period_end: record.period_end,
                });
            }

            period_set.insert(record.period_end);

            let key = (record.statement_type, record.period_end);
            if by_key.contains_key(&key) {
                debug!(
                    "Duplicate {:?} record for {}, keeping the first",
                    record.statement_type, record.period_end
                );
            } else {
                by_key.insert(key, record);
            }

            for field in record.fields.keys() {
                if !self.vocabulary.owns_field(record.statement_type, field) {
                    unmapped.insert((record.statement_type, field.as_str()));
                }
            }
        }

        for (statement_type, field) in unmapped {
            debug!(
                "Provider field '{}' on {:?} has no canonical mapping",
                field, statement_type
            );
        }

        let mut periods: Vec<NaiveDate> = period_set.into_iter().collect();
        if cadence == Cadence::Quarterly {
            periods.reverse();
        }

        let mut table = MetricTable::new(cadence, periods.clone());

        for metric in &self.vocabulary.metrics {
            table.push_row(MetricRow::from(metric));

            for &period in &periods {
                let Some(record) = by_key.get(&(metric.statement_type, period)) else {
                    continue;
                };
                for candidate in &metric.source_field_candidates {
                    if let Some(Some(value)) = record.fields.get(candidate) {
                        table.set(&metric.id, period, *value);
                        break;
                    }
                }
            }
        }

        Ok(table)
    }
}
