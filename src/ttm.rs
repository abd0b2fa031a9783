use crate::schema::{Cadence, MetricVocabulary};
use crate::table::{MetricRow, MetricTable};
use crate::utils::months_between;
use chrono::NaiveDate;
use log::debug;
use std::cmp::Reverse;
use std::collections::BTreeMap;

pub const TTM_SUFFIX: &str = "_ttm";

/// Appends trailing-twelve-month rows to a quarterly table, one per metric
/// marked TTM-eligible, inserted directly after the metric they derive from.
///
/// TTM at a period is the sum of that period and the three before it, and is
/// only produced when all four values are present and the periods are
/// consecutive quarters. Consecutiveness is judged against the modal
/// inter-period gap of the table (in whole months), so an irregular or
/// missing quarter breaks every window that spans it. Windows that cannot be
/// formed leave the cell absent; a short history must not understate trailing
/// performance by summing fewer quarters.
pub fn derive_ttm(table: &mut MetricTable, vocabulary: &MetricVocabulary) {
    if table.cadence != Cadence::Quarterly {
        debug!("TTM derivation skipped: table cadence is {:?}", table.cadence);
        return;
    }

    let periods: Vec<NaiveDate> = table.periods().to_vec();
    let modal_gap = modal_gap_months(&periods);

    for metric in vocabulary.metrics.iter().filter(|m| m.is_ttm_eligible) {
        if table.row_index(&metric.id).is_none() {
            continue;
        }

        let ttm_id = format!("{}{}", metric.id, TTM_SUFFIX);
        let mut cells: Vec<(NaiveDate, f64)> = Vec::new();

        if let Some(gap) = modal_gap {
            for i in 0..periods.len().saturating_sub(3) {
                let window = &periods[i..i + 4];
                if let Some(sum) = window_sum(table, &metric.id, window, gap) {
                    cells.push((window[0], sum));
                }
            }
        }

        // The row is appended even when no window resolves, so the row set
        // of a quarterly table does not depend on how much history exists.
        table.insert_row_after(
            &metric.id,
            MetricRow {
                id: ttm_id.clone(),
                display_name: format!("TTM {}", metric.display_name),
                unit_kind: metric.unit_kind,
            },
        );
        for (period, sum) in cells {
            table.set(&ttm_id, period, sum);
        }
    }
}

/// Sum of the metric over a four-period window (newest first), or `None`
/// when any value is absent or any adjacent gap differs from the modal one.
fn window_sum(
    table: &MetricTable,
    metric_id: &str,
    window: &[NaiveDate],
    modal_gap: i32,
) -> Option<f64> {
    for pair in window.windows(2) {
        if months_between(pair[1], pair[0]) != modal_gap {
            return None;
        }
    }

    let mut sum = 0.0;
    for &period in window {
        sum += table.value(metric_id, period)?;
    }
    Some(sum)
}

/// The most common gap, in whole months, between adjacent columns. Ties go
/// to the smaller gap. `None` when the table has fewer than two columns.
fn modal_gap_months(periods: &[NaiveDate]) -> Option<i32> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for pair in periods.windows(2) {
        *counts.entry(months_between(pair[1], pair[0])).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by_key(|&(gap, count)| (count, Reverse(gap)))
        .map(|(gap, _)| gap)
}
