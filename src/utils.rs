use chrono::{Datelike, NaiveDate};

/// Whole months from `start` to `end`, ignoring day-of-month. Fiscal quarter
/// ends drift by a day or two (Mar 31 vs Apr 1 filings), so gap checks are
/// done in months rather than days.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    let year_diff = end.year() - start.year();
    let month_diff = end.month() as i32 - start.month() as i32;
    year_diff * 12 + month_diff
}
