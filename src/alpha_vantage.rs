//! Alpha Vantage statement client, enabled by the `alpha-vantage` feature.
//!
//! Fetches the INCOME_STATEMENT, BALANCE_SHEET and CASH_FLOW endpoints for a
//! ticker and converts the payloads into [`PeriodRecord`]s. All fetching is
//! eager: the result is an in-memory [`CompanyStatements`] that implements
//! [`StatementSource`], so the normalization pipeline itself never awaits.

use crate::error::{Result, StatementError};
use crate::schema::{Cadence, PeriodRecord, StatementType};
use crate::source::StatementSource;
use chrono::NaiveDate;
use log::{debug, info};
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;

const ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query";

#[derive(Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantageClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: ALPHA_VANTAGE_URL.to_string(),
        }
    }

    /// Pulls all three statements for `ticker`, both cadences each, and
    /// returns them as an in-memory source.
    pub async fn fetch_company(&self, ticker: &str) -> Result<CompanyStatements> {
        info!("Fetching statements for {}", ticker);
        let mut records = Vec::new();

        for statement_type in StatementType::ALL {
            let body = self.fetch_raw(ticker, statement_type).await?;
            for cadence in [Cadence::Quarterly, Cadence::Annual] {
                let parsed = parse_reports(&body, statement_type, cadence);
                debug!(
                    "{} {:?} {:?}: {} period records",
                    ticker,
                    statement_type,
                    cadence,
                    parsed.len()
                );
                records.extend(parsed);
            }
        }

        Ok(CompanyStatements { records })
    }

    async fn fetch_raw(&self, ticker: &str, statement_type: StatementType) -> Result<Value> {
        let function = function_for(statement_type);
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", function),
                ("symbol", ticker),
                ("apikey", &self.api_key),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        check_api_errors(&body, function, ticker)?;
        Ok(body)
    }
}

/// The fetched statements of one company. Implements [`StatementSource`] so
/// the pipeline consumes live data exactly like replayed test data.
#[derive(Debug, Clone)]
pub struct CompanyStatements {
    records: Vec<PeriodRecord>,
}

impl StatementSource for CompanyStatements {
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

fn function_for(statement_type: StatementType) -> &'static str {
    match statement_type {
        StatementType::Income => "INCOME_STATEMENT",
        StatementType::Balance => "BALANCE_SHEET",
        StatementType::CashFlow => "CASH_FLOW",
    }
}

/// Alpha Vantage reports API-level failures inside a 200 response body:
/// "Error Message" for bad requests, "Information" when rate limited, and
/// an empty object for unknown symbols.
fn check_api_errors(body: &Value, function: &str, ticker: &str) -> Result<()> {
    if let Some(message) = body.get("Error Message").and_then(Value::as_str) {
        return Err(StatementError::Source(format!(
            "{function} {ticker}: {message}"
        )));
    }
    if let Some(message) = body.get("Information").and_then(Value::as_str) {
        return Err(StatementError::Source(format!(
            "{function} {ticker}: {message} (this often means a rate limit was hit)"
        )));
    }
    if body.as_object().map_or(true, |o| o.is_empty()) {
        return Err(StatementError::Source(format!(
            "{function} {ticker}: empty response body"
        )));
    }
    Ok(())
}

/// Converts one cadence's report list into records. Entries without a
/// parseable `fiscalDateEnding` are skipped; every other field is kept under
/// its provider name with "None" and non-numeric strings mapped to null.
fn parse_reports(body: &Value, statement_type: StatementType, cadence: Cadence) -> Vec<PeriodRecord> {
    let key = match cadence {
        Cadence::Quarterly => "quarterlyReports",
        Cadence::Annual => "annualReports",
    };
    let Some(reports) = body.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut records = Vec::new();
    for report in reports {
        let Some(object) = report.as_object() else {
            continue;
        };
        let Some(period_end) = object
            .get("fiscalDateEnding")
            .and_then(Value::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        else {
            debug!("Skipping {} entry without a parseable fiscalDateEnding", key);
            continue;
        };

        let mut fields = BTreeMap::new();
        for (name, value) in object {
            if name == "fiscalDateEnding" || name == "reportedCurrency" {
                continue;
            }
            fields.insert(name.clone(), parse_numeric(value));
        }

        records.push(PeriodRecord {
            statement_type,
            cadence,
            period_end,
            fields,
        });
    }
    records
}

/// Numbers arrive as strings; "None" and anything unparseable become null,
/// mirroring the absent-not-zero table contract.
fn parse_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
