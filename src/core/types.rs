use serde::{Deserialize, Serialize};

/// When a periodic contribution lands relative to the growth step.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Timing {
    /// Contribution at the end of the period (ordinary annuity).
    #[default]
    #[serde(alias = "end")]
    Ordinary,
    /// Contribution at the start of the period (annuity due).
    #[serde(alias = "start", alias = "begin")]
    Due,
}

/// One row of a growth breakdown. `index` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRecord {
    pub index: u32,
    pub period_contribution: f64,
    pub cumulative_contributed: f64,
    pub cumulative_growth: f64,
    pub ending_balance: f64,
}

/// One row of a loan amortization breakdown. `index` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRecord {
    pub index: u32,
    pub payment: f64,
    pub principal_paid: f64,
    pub interest_paid: f64,
    pub ending_balance: f64,
}
