use serde::{Deserialize, Serialize};

use crate::core::coerce;
use crate::core::finance::{
    effective_annual_rate, future_value, periodic_rate, periods_for_years, yearly_snapshots,
};
use crate::core::types::{PeriodRecord, Timing};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compounding {
    #[serde(alias = "yearly")]
    Annually,
    #[serde(alias = "semiannually")]
    SemiAnnually,
    Quarterly,
    #[default]
    Monthly,
    Daily,
}

impl Compounding {
    pub fn periods_per_year(self) -> u32 {
        match self {
            Compounding::Annually => 1,
            Compounding::SemiAnnually => 2,
            Compounding::Quarterly => 4,
            Compounding::Monthly => 12,
            Compounding::Daily => 365,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompoundInterestInput {
    #[serde(deserialize_with = "coerce::number")]
    pub principal: f64,
    /// Nominal annual rate in percent.
    #[serde(deserialize_with = "coerce::number")]
    pub annual_rate: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub years: f64,
    pub compounding: Compounding,
    /// Added once per compounding period.
    #[serde(deserialize_with = "coerce::number")]
    pub contribution: f64,
    pub contribution_timing: Timing,
}

impl Default for CompoundInterestInput {
    fn default() -> Self {
        Self {
            principal: 10_000.0,
            annual_rate: 7.0,
            years: 10.0,
            compounding: Compounding::Monthly,
            contribution: 100.0,
            contribution_timing: Timing::Ordinary,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundInterestResult {
    pub periods: u32,
    pub final_balance: f64,
    pub total_contributions: f64,
    pub total_interest: f64,
    pub effective_annual_rate: f64,
    pub yearly: Vec<PeriodRecord>,
}

pub fn evaluate(input: &CompoundInterestInput) -> CompoundInterestResult {
    let per_year = input.compounding.periods_per_year();
    let periods = periods_for_years(input.years, per_year);
    let rate = periodic_rate(input.annual_rate, per_year);
    let principal = input.principal.max(0.0);
    let contribution = input.contribution.max(0.0);

    let final_balance = future_value(
        principal,
        contribution,
        rate,
        periods,
        input.contribution_timing,
    );
    let total_contributions = principal + contribution * periods as f64;
    let yearly = yearly_snapshots(
        principal,
        contribution,
        rate,
        periods,
        per_year,
        input.contribution_timing,
    );

    CompoundInterestResult {
        periods,
        final_balance,
        total_contributions,
        total_interest: final_balance - total_contributions,
        effective_annual_rate: effective_annual_rate(input.annual_rate / 100.0, per_year) * 100.0,
        yearly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn annual_compounding_without_contributions() {
        let result = evaluate(&CompoundInterestInput {
            principal: 1_000.0,
            annual_rate: 5.0,
            years: 10.0,
            compounding: Compounding::Annually,
            contribution: 0.0,
            contribution_timing: Timing::Ordinary,
        });
        assert_eq!(result.periods, 10);
        assert_approx_tol(result.final_balance, 1_628.894_626_777_442, 1e-6);
        assert_approx_tol(result.total_interest, 628.894_626_777_442, 1e-6);
        assert_approx_tol(result.effective_annual_rate, 5.0, 1e-9);
        assert_eq!(result.yearly.len(), 10);
    }

    #[test]
    fn daily_compounding_rolls_up_by_year() {
        let result = evaluate(&CompoundInterestInput {
            principal: 1_000.0,
            annual_rate: 3.65,
            years: 2.0,
            compounding: Compounding::Daily,
            contribution: 0.0,
            contribution_timing: Timing::Ordinary,
        });
        assert_eq!(result.periods, 730);
        assert_eq!(result.yearly.len(), 2);
        assert_approx_tol(result.final_balance, 1_000.0 * 1.0001f64.powi(730), 1e-6);
        assert!(result.effective_annual_rate > 3.65);
    }

    #[test]
    fn contributions_at_start_earn_more() {
        let mut input = CompoundInterestInput::default();
        let ordinary = evaluate(&input);
        input.contribution_timing = Timing::Due;
        let due = evaluate(&input);
        assert!(due.final_balance > ordinary.final_balance);
        assert_approx_tol(due.total_contributions, ordinary.total_contributions, 1e-9);
    }

    #[test]
    fn compounding_aliases_parse() {
        let input: CompoundInterestInput =
            serde_json::from_str(r#"{"compounding": "yearly", "contributionTiming": "start"}"#)
                .expect("payload should parse");
        assert_eq!(input.compounding, Compounding::Annually);
        assert_eq!(input.contribution_timing, Timing::Due);
        assert_approx_tol(input.principal, 10_000.0, 0.0);
    }
}
