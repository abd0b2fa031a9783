//! The canonical metric vocabulary for Alpha Vantage statement payloads.
//!
//! Candidate field lists exist because the provider has renamed line items
//! across filing regimes (`netIncome` vs `netIncomeLoss`); resolution order
//! is a fixed priority, first match wins.

use crate::schema::{CanonicalMetric, MetricVocabulary, StatementType, UnitKind};

fn metric(
    id: &str,
    display_name: &str,
    statement_type: StatementType,
    candidates: &[&str],
    unit_kind: UnitKind,
    is_ttm_eligible: bool,
    definition: &str,
) -> CanonicalMetric {
    CanonicalMetric {
        id: id.to_string(),
        display_name: display_name.to_string(),
        statement_type,
        source_field_candidates: candidates.iter().map(|c| c.to_string()).collect(),
        unit_kind,
        is_ttm_eligible,
        definition: definition.to_string(),
    }
}

/// Builds the default vocabulary. Declaration order is the row order of
/// every output table: income statement, then balance sheet, then cash flow.
pub fn alpha_vantage_vocabulary() -> MetricVocabulary {
    use StatementType::{Balance, CashFlow, Income};
    use UnitKind::{Count, Currency, PerShare};

    MetricVocabulary::new(vec![
        // Income statement
        metric(
            "revenue",
            "Revenue",
            Income,
            &["totalRevenue", "revenue"],
            Currency,
            true,
            "Total sales before any costs are deducted.",
        ),
        metric(
            "cogs",
            "COGS",
            Income,
            &["costOfRevenue", "costofGoodsAndServicesSold"],
            Currency,
            false,
            "Cost of goods sold, the direct costs of producing goods/services.",
        ),
        metric(
            "rd",
            "R&D",
            Income,
            &["researchAndDevelopment"],
            Currency,
            false,
            "Research & Development expenses.",
        ),
        metric(
            "sga",
            "G&A",
            Income,
            &["sellingGeneralAndAdministrative"],
            Currency,
            false,
            "General & Administrative overhead costs.",
        ),
        metric(
            "opex",
            "OpEx",
            Income,
            &["operatingExpenses"],
            Currency,
            false,
            "Operating expenses (R&D + G&A).",
        ),
        metric(
            "operating_income",
            "OpInc",
            Income,
            &["operatingIncome"],
            Currency,
            false,
            "Operating income (Gross profit - OpEx).",
        ),
        metric(
            "interest_expense",
            "Interest Expense",
            Income,
            &["interestExpense"],
            Currency,
            false,
            "Interest paid on outstanding debt.",
        ),
        metric(
            "pretax_income",
            "Pretax Income",
            Income,
            &["incomeBeforeTax"],
            Currency,
            false,
            "Income before income taxes.",
        ),
        metric(
            "taxes",
            "Taxes",
            Income,
            &["incomeTaxExpense"],
            Currency,
            false,
            "Income tax expense for the period.",
        ),
        metric(
            "net_income",
            "Net Income",
            Income,
            &["netIncome", "netIncomeLoss"],
            Currency,
            true,
            "Final profit after taxes.",
        ),
        metric(
            "eps",
            "EPS",
            Income,
            &["reportedEPS"],
            PerShare,
            false,
            "Earnings per share (Net Income / Shares).",
        ),
        metric(
            "shares",
            "Shares",
            Income,
            &["commonStockSharesOutstanding"],
            Count,
            false,
            "Weighted average shares outstanding.",
        ),
        // Balance sheet
        metric(
            "cash",
            "Cash",
            Balance,
            &[
                "cashAndCashEquivalentsAtCarryingValue",
                "cashAndShortTermInvestments",
            ],
            Currency,
            false,
            "Cash and equivalents.",
        ),
        metric(
            "receivables",
            "AR",
            Balance,
            &["currentNetReceivables"],
            Currency,
            false,
            "Accounts receivable, outstanding customer balances.",
        ),
        metric(
            "ppe",
            "PP&E",
            Balance,
            &["propertyPlantEquipment"],
            Currency,
            false,
            "Property, Plant & Equipment.",
        ),
        metric(
            "goodwill",
            "Goodwill",
            Balance,
            &["goodwill"],
            Currency,
            false,
            "Premium paid on acquisitions.",
        ),
        metric(
            "current_assets",
            "Total Current Assets",
            Balance,
            &["totalCurrentAssets"],
            Currency,
            false,
            "Assets expected to convert to cash within a year.",
        ),
        metric(
            "current_liabilities",
            "Total Current Liabilities",
            Balance,
            &["totalCurrentLiabilities"],
            Currency,
            false,
            "Obligations due within a year.",
        ),
        metric(
            "accounts_payable",
            "AP",
            Balance,
            &["currentAccountsPayable"],
            Currency,
            false,
            "Accounts Payable.",
        ),
        metric(
            "deferred_revenue",
            "DR",
            Balance,
            &["deferredRevenue", "currentDeferredRevenue"],
            Currency,
            false,
            "Deferred Revenue.",
        ),
        metric(
            "debt",
            "Debt",
            Balance,
            &["shortLongTermDebtTotal"],
            Currency,
            false,
            "Short + Long-term debt.",
        ),
        metric(
            "equity",
            "SE",
            Balance,
            &["totalShareholderEquity", "totalShareholdersEquity"],
            Currency,
            false,
            "Shareholders' Equity.",
        ),
        metric(
            "liabilities",
            "Total Liabilities",
            Balance,
            &["totalLiabilities"],
            Currency,
            false,
            "Total company liabilities.",
        ),
        metric(
            "assets",
            "Assets",
            Balance,
            &["totalAssets"],
            Currency,
            false,
            "Total company assets.",
        ),
        // Cash flow
        metric(
            "cffo",
            "CFFO",
            CashFlow,
            &["operatingCashflow", "netCashProvidedByOperatingActivities"],
            Currency,
            true,
            "Cash Flow From Operations.",
        ),
        metric(
            "capex",
            "CapEx",
            CashFlow,
            &["capitalExpenditures"],
            Currency,
            false,
            "Capital Expenditures (investments in assets like PP&E).",
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vocabulary_is_valid() {
        let vocab = alpha_vantage_vocabulary();
        assert!(vocab.validate().is_ok());
    }

    #[test]
    fn test_ttm_eligible_metrics() {
        let vocab = alpha_vantage_vocabulary();
        let eligible: Vec<&str> = vocab
            .metrics
            .iter()
            .filter(|m| m.is_ttm_eligible)
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(eligible, vec!["revenue", "net_income", "cffo"]);
    }

    #[test]
    fn test_net_income_candidate_priority() {
        let vocab = alpha_vantage_vocabulary();
        let net_income = vocab.get("net_income").unwrap();
        assert_eq!(
            net_income.source_field_candidates,
            vec!["netIncome", "netIncomeLoss"]
        );
    }

    #[test]
    fn test_every_metric_has_a_definition() {
        let vocab = alpha_vantage_vocabulary();
        assert!(vocab.metrics.iter().all(|m| !m.definition.is_empty()));
    }
}
