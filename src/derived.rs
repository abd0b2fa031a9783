//! Ratio and growth rows computed from already-normalized cells.
//!
//! A ratio cell is absent whenever any input cell is absent or a denominator
//! is zero; absence is never coerced to zero so the sink can tell "no data"
//! from "ratio happens to be zero".

use crate::schema::{Cadence, UnitKind};
use crate::table::{MetricRow, MetricTable};
use chrono::NaiveDate;

pub struct RatioMetric {
    pub id: &'static str,
    pub display_name: &'static str,
    pub unit_kind: UnitKind,
    pub definition: &'static str,
    compute: fn(&MetricTable, NaiveDate) -> Option<f64>,
}

pub struct GrowthMetric {
    pub id: &'static str,
    pub display_name: &'static str,
    pub definition: &'static str,
    /// Row the percent change is taken over.
    pub source_id: &'static str,
}

pub fn ratio_metrics() -> &'static [RatioMetric] {
    RATIOS
}

pub fn growth_metrics(cadence: Cadence) -> &'static [GrowthMetric] {
    match cadence {
        Cadence::Quarterly => QOQ_GROWTH,
        Cadence::Annual => YOY_GROWTH,
    }
}

const RATIOS: &[RatioMetric] = &[
    RatioMetric {
        id: "gross_margin",
        display_name: "Gross Margin",
        unit_kind: UnitKind::Ratio,
        definition: "Profit after COGS, as a percentage of revenue.",
        compute: gross_margin,
    },
    RatioMetric {
        id: "free_cash_flow",
        display_name: "Free Cash Flow",
        unit_kind: UnitKind::Currency,
        definition: "CFFO - CapEx. Cash available after funding operations and capital projects.",
        compute: free_cash_flow,
    },
    RatioMetric {
        id: "operating_margin",
        display_name: "Operating Margin",
        unit_kind: UnitKind::Ratio,
        definition: "Operating Income / Revenue. Core business profitability.",
        compute: operating_margin,
    },
    RatioMetric {
        id: "net_profit_margin",
        display_name: "Net Profit Margin",
        unit_kind: UnitKind::Ratio,
        definition: "Net Income / Revenue. Overall profitability after all expenses.",
        compute: net_profit_margin,
    },
    RatioMetric {
        id: "roe",
        display_name: "ROE",
        unit_kind: UnitKind::Ratio,
        definition:
            "Return on Equity (Net Income / Shareholders' Equity). Profit generated with shareholder money.",
        compute: roe,
    },
    RatioMetric {
        id: "roa",
        display_name: "ROA",
        unit_kind: UnitKind::Ratio,
        definition: "Return on Assets (Net Income / Total Assets). Profit generated from all assets.",
        compute: roa,
    },
    RatioMetric {
        id: "current_ratio",
        display_name: "Current Ratio",
        unit_kind: UnitKind::Ratio,
        definition: "Total Current Assets / Total Current Liabilities. Short-term liquidity.",
        compute: current_ratio,
    },
    RatioMetric {
        id: "quick_ratio",
        display_name: "Quick Ratio",
        unit_kind: UnitKind::Ratio,
        definition: "(Cash + Accts. Receivable) / Total Current Liabilities. Stricter liquidity test.",
        compute: quick_ratio,
    },
    RatioMetric {
        id: "debt_to_equity",
        display_name: "Debt-to-Equity",
        unit_kind: UnitKind::Ratio,
        definition: "Total Debt / Shareholders' Equity. Financial leverage/risk.",
        compute: debt_to_equity,
    },
    RatioMetric {
        id: "interest_coverage",
        display_name: "Interest Coverage",
        unit_kind: UnitKind::Ratio,
        definition: "Operating Income / Interest Expense. Ability to pay interest on debt.",
        compute: interest_coverage,
    },
];

const QOQ_GROWTH: &[GrowthMetric] = &[
    GrowthMetric {
        id: "qoq_revenue_growth",
        display_name: "QoQ Revenue Growth",
        definition: "Quarter-over-Quarter revenue growth percentage.",
        source_id: "revenue",
    },
    GrowthMetric {
        id: "qoq_net_income_growth",
        display_name: "QoQ Net Income Growth",
        definition: "Quarter-over-Quarter net income growth percentage.",
        source_id: "net_income",
    },
    GrowthMetric {
        id: "qoq_eps_growth",
        display_name: "QoQ EPS Growth",
        definition: "Quarter-over-Quarter EPS growth percentage.",
        source_id: "eps",
    },
];

const YOY_GROWTH: &[GrowthMetric] = &[
    GrowthMetric {
        id: "yoy_revenue_growth",
        display_name: "YoY Revenue Growth",
        definition: "Year-over-Year revenue growth percentage.",
        source_id: "revenue",
    },
    GrowthMetric {
        id: "yoy_net_income_growth",
        display_name: "YoY Net Income Growth",
        definition: "Year-over-Year net income growth percentage.",
        source_id: "net_income",
    },
    GrowthMetric {
        id: "yoy_eps_growth",
        display_name: "YoY EPS Growth",
        definition: "Year-over-Year EPS growth percentage.",
        source_id: "eps",
    },
    GrowthMetric {
        id: "yoy_fcf_growth",
        display_name: "YoY FCF Growth",
        definition: "Year-over-Year free cash flow growth percentage.",
        source_id: "free_cash_flow",
    },
];

/// Appends the ratio rows, then the cadence's growth rows. Ratios come first
/// so growth over a derived row (FCF) sees its cells populated.
pub fn append_derived_rows(table: &mut MetricTable) {
    for ratio in RATIOS {
        let cells: Vec<(NaiveDate, f64)> = table
            .periods()
            .iter()
            .filter_map(|&p| (ratio.compute)(table, p).map(|v| (p, v)))
            .collect();

        table.push_row(MetricRow {
            id: ratio.id.to_string(),
            display_name: ratio.display_name.to_string(),
            unit_kind: ratio.unit_kind,
        });
        for (period, value) in cells {
            table.set(ratio.id, period, value);
        }
    }

    for growth in growth_metrics(table.cadence) {
        let cells: Vec<(NaiveDate, f64)> = table
            .periods()
            .iter()
            .filter_map(|&p| percent_change(table, growth.source_id, p).map(|v| (p, v)))
            .collect();

        table.push_row(MetricRow {
            id: growth.id.to_string(),
            display_name: growth.display_name.to_string(),
            unit_kind: UnitKind::Ratio,
        });
        for (period, value) in cells {
            table.set(growth.id, period, value);
        }
    }
}

/// Percent change against the chronologically previous column. Absent for
/// the oldest column, when either side is absent, or when the prior value
/// is zero.
fn percent_change(table: &MetricTable, metric_id: &str, period: NaiveDate) -> Option<f64> {
    let prior_period = table
        .periods()
        .iter()
        .filter(|&&p| p < period)
        .max()
        .copied()?;
    let current = table.value(metric_id, period)?;
    let prior = table.value(metric_id, prior_period)?;
    if prior == 0.0 {
        return None;
    }
    Some((current - prior) / prior)
}

fn gross_margin(table: &MetricTable, period: NaiveDate) -> Option<f64> {
    let revenue = table.value("revenue", period)?;
    let cogs = table.value("cogs", period)?;
    if revenue == 0.0 {
        return None;
    }
    Some((revenue - cogs) / revenue)
}

fn free_cash_flow(table: &MetricTable, period: NaiveDate) -> Option<f64> {
    let cffo = table.value("cffo", period)?;
    let capex = table.value("capex", period)?;
    Some(cffo - capex)
}

fn operating_margin(table: &MetricTable, period: NaiveDate) -> Option<f64> {
    divide(table, "operating_income", "revenue", period)
}

fn net_profit_margin(table: &MetricTable, period: NaiveDate) -> Option<f64> {
    divide(table, "net_income", "revenue", period)
}

fn roe(table: &MetricTable, period: NaiveDate) -> Option<f64> {
    divide(table, "net_income", "equity", period)
}

fn roa(table: &MetricTable, period: NaiveDate) -> Option<f64> {
    divide(table, "net_income", "assets", period)
}

fn current_ratio(table: &MetricTable, period: NaiveDate) -> Option<f64> {
    divide(table, "current_assets", "current_liabilities", period)
}

fn quick_ratio(table: &MetricTable, period: NaiveDate) -> Option<f64> {
    let cash = table.value("cash", period)?;
    let receivables = table.value("receivables", period)?;
    let liabilities = table.value("current_liabilities", period)?;
    if liabilities == 0.0 {
        return None;
    }
    Some((cash + receivables) / liabilities)
}

fn debt_to_equity(table: &MetricTable, period: NaiveDate) -> Option<f64> {
    divide(table, "debt", "equity", period)
}

fn interest_coverage(table: &MetricTable, period: NaiveDate) -> Option<f64> {
    let operating_income = table.value("operating_income", period)?;
    let interest = table.value("interest_expense", period)?;
    // Coverage is meaningless at zero or negative interest expense.
    if interest <= 0.0 {
        return None;
    }
    Some(operating_income / interest)
}

fn divide(
    table: &MetricTable,
    numerator_id: &str,
    denominator_id: &str,
    period: NaiveDate,
) -> Option<f64> {
    let numerator = table.value(numerator_id, period)?;
    let denominator = table.value(denominator_id, period)?;
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator)
}
