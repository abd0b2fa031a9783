use crate::schema::{Cadence, CanonicalMetric, UnitKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Row descriptor of a [`MetricTable`]: either a canonical metric or a row
/// synthesized downstream (TTM, ratios, growth).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRow {
    pub id: String,
    pub display_name: String,
    pub unit_kind: UnitKind,
}

impl From<&CanonicalMetric> for MetricRow {
    fn from(metric: &CanonicalMetric) -> Self {
        Self {
            id: metric.id.clone(),
            display_name: metric.display_name.clone(),
            unit_kind: metric.unit_kind,
        }
    }
}

/// One normalized table per cadence: rows are metrics, columns are period-end
/// dates, cells are values at source magnitude. A cell that was never set is
/// absent, which is distinct from a cell holding 0.0 - the report sink relies
/// on that distinction when formatting and charting.
///
/// Column order is a contract: quarterly tables are newest-first, annual
/// tables oldest-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTable {
    pub cadence: Cadence,
    metrics: Vec<MetricRow>,
    periods: Vec<NaiveDate>,
    values: BTreeMap<String, BTreeMap<NaiveDate, f64>>,
}

impl MetricTable {
    /// `periods` must already be unique and ordered per the cadence contract;
    /// the normalizer is the only producer and guarantees both.
    pub fn new(cadence: Cadence, periods: Vec<NaiveDate>) -> Self {
        Self {
            cadence,
            metrics: Vec::new(),
            periods,
            values: BTreeMap::new(),
        }
    }

    pub fn metrics(&self) -> &[MetricRow] {
        &self.metrics
    }

    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    pub fn row_index(&self, metric_id: &str) -> Option<usize> {
        self.metrics.iter().position(|m| m.id == metric_id)
    }

    pub fn push_row(&mut self, row: MetricRow) {
        self.metrics.push(row);
    }

    /// Inserts `row` immediately after the row identified by `anchor_id`,
    /// or at the end when the anchor is not present.
    pub fn insert_row_after(&mut self, anchor_id: &str, row: MetricRow) {
        match self.row_index(anchor_id) {
            Some(idx) => self.metrics.insert(idx + 1, row),
            None => self.metrics.push(row),
        }
    }

    pub fn set(&mut self, metric_id: &str, period: NaiveDate, value: f64) {
        self.values
            .entry(metric_id.to_string())
            .or_default()
            .insert(period, value);
    }

    pub fn value(&self, metric_id: &str, period: NaiveDate) -> Option<f64> {
        self.values.get(metric_id)?.get(&period).copied()
    }

    /// Cells of one row in column order; absent cells come back as `None`.
    pub fn row_cells(&self, metric_id: &str) -> Vec<Option<f64>> {
        self.periods
            .iter()
            .map(|&p| self.value(metric_id, p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(id: &str) -> MetricRow {
        MetricRow {
            id: id.to_string(),
            display_name: id.to_string(),
            unit_kind: UnitKind::Currency,
        }
    }

    #[test]
    fn test_absent_cell_is_none_not_zero() {
        let mut table = MetricTable::new(Cadence::Quarterly, vec![date(2023, 3, 31)]);
        table.push_row(row("revenue"));
        assert_eq!(table.value("revenue", date(2023, 3, 31)), None);

        table.set("revenue", date(2023, 3, 31), 0.0);
        assert_eq!(table.value("revenue", date(2023, 3, 31)), Some(0.0));
    }

    #[test]
    fn test_insert_row_after_anchor() {
        let mut table = MetricTable::new(Cadence::Quarterly, vec![]);
        table.push_row(row("revenue"));
        table.push_row(row("net_income"));
        table.insert_row_after("revenue", row("revenue_ttm"));

        let ids: Vec<&str> = table.metrics().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["revenue", "revenue_ttm", "net_income"]);
    }

    #[test]
    fn test_insert_row_after_missing_anchor_appends() {
        let mut table = MetricTable::new(Cadence::Annual, vec![]);
        table.push_row(row("revenue"));
        table.insert_row_after("no_such_row", row("orphan"));

        let ids: Vec<&str> = table.metrics().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["revenue", "orphan"]);
    }

    #[test]
    fn test_row_cells_follow_column_order() {
        let periods = vec![date(2023, 6, 30), date(2023, 3, 31)];
        let mut table = MetricTable::new(Cadence::Quarterly, periods);
        table.push_row(row("revenue"));
        table.set("revenue", date(2023, 3, 31), 100.0);

        assert_eq!(table.row_cells("revenue"), vec![None, Some(100.0)]);
    }
}
