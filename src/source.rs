use crate::error::Result;
use crate::schema::{Cadence, PeriodRecord, StatementType};

/// The raw statement boundary. A full run performs exactly six fetches, one
/// per statement type and cadence. Returning zero records is legal (the run
/// produces an empty-column table); transport or authorization failures must
/// surface as [`crate::StatementError::Source`] and abort the run.
pub trait StatementSource {
    fn fetch_statement(
        &self,
        ticker: &str,
        statement_type: StatementType,
        cadence: Cadence,
    ) -> Result<Vec<PeriodRecord>>;
}

/// In-memory source for tests and batch replay: serves whatever records it
/// was loaded with, filtered by statement type and cadence.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<PeriodRecord>,
}

impl StaticSource {
    pub fn new(records: Vec<PeriodRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: PeriodRecord) {
        self.records.push(record);
    }
}

impl StatementSource for StaticSource {
    fn fetch_statement(
        &self,
        _ticker: &str,
        statement_type: StatementType,
        cadence: Cadence,
    ) -> Result<Vec<PeriodRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.statement_type == statement_type && r.cadence == cadence)
            .cloned()
            .collect())
    }
}
