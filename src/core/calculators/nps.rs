use serde::{Deserialize, Serialize};

use crate::core::coerce;
use crate::core::finance::{
    MONTHS_PER_YEAR, future_value, growth_schedule, periodic_rate, periods_for_years,
    yearly_rollup,
};
use crate::core::types::{PeriodRecord, Timing};

/// Smallest share of the maturity corpus the scheme lets you take as cash.
pub const MIN_ANNUITY_PERCENT: f64 = 40.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NpsInput {
    #[serde(deserialize_with = "coerce::whole")]
    pub current_age: u32,
    #[serde(deserialize_with = "coerce::whole")]
    pub retirement_age: u32,
    #[serde(deserialize_with = "coerce::number")]
    pub monthly_contribution: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub employer_contribution: f64,
    /// Percent per year.
    #[serde(deserialize_with = "coerce::number")]
    pub annual_return: f64,
    /// Share of the corpus used to buy an annuity, in percent.
    #[serde(deserialize_with = "coerce::number")]
    pub annuity_percent: f64,
    /// Annuity payout rate, percent per year.
    #[serde(deserialize_with = "coerce::number")]
    pub annuity_rate: f64,
}

impl Default for NpsInput {
    fn default() -> Self {
        Self {
            current_age: 30,
            retirement_age: 60,
            monthly_contribution: 5_000.0,
            employer_contribution: 2_000.0,
            annual_return: 10.0,
            annuity_percent: MIN_ANNUITY_PERCENT,
            annuity_rate: 6.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NpsResult {
    pub investment_years: u32,
    pub employee_invested: f64,
    pub employer_invested: f64,
    pub total_invested: f64,
    pub interest_earned: f64,
    pub corpus_at_maturity: f64,
    pub annuity_percent: f64,
    pub annuity_corpus: f64,
    pub lump_sum: f64,
    pub monthly_pension: f64,
    pub yearly: Vec<PeriodRecord>,
}

pub fn evaluate(input: &NpsInput) -> NpsResult {
    let investment_years = input.retirement_age.saturating_sub(input.current_age);
    let months = periods_for_years(investment_years as f64, MONTHS_PER_YEAR);
    let rate = periodic_rate(input.annual_return, MONTHS_PER_YEAR);
    let employee = input.monthly_contribution.max(0.0);
    let employer = input.employer_contribution.max(0.0);
    let monthly_total = employee + employer;

    let corpus_at_maturity = future_value(0.0, monthly_total, rate, months, Timing::Ordinary);
    let total_invested = monthly_total * months as f64;
    let annuity_percent = input.annuity_percent.clamp(0.0, 100.0);
    let annuity_corpus = corpus_at_maturity * annuity_percent / 100.0;
    let schedule = growth_schedule(0.0, monthly_total, rate, months, Timing::Ordinary);

    NpsResult {
        investment_years,
        employee_invested: employee * months as f64,
        employer_invested: employer * months as f64,
        total_invested,
        interest_earned: corpus_at_maturity - total_invested,
        corpus_at_maturity,
        annuity_percent,
        annuity_corpus,
        lump_sum: corpus_at_maturity - annuity_corpus,
        monthly_pension: annuity_corpus * input.annuity_rate.max(0.0) / 100.0 / 12.0,
        yearly: yearly_rollup(&schedule, MONTHS_PER_YEAR),
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
    fn default_plan_splits_corpus() {
        let result = evaluate(&NpsInput::default());
        assert_eq!(result.investment_years, 30);
        assert_approx_tol(result.total_invested, 7_000.0 * 360.0, 1e-6);
        assert_approx_tol(result.employer_invested, 2_000.0 * 360.0, 1e-6);

        let i: f64 = 0.10 / 12.0;
        let corpus = 7_000.0 * ((1.0 + i).powi(360) - 1.0) / i;
        assert_approx_tol(result.corpus_at_maturity, corpus, corpus * 1e-9);
        assert_approx_tol(result.annuity_corpus, corpus * 0.4, corpus * 1e-9);
        assert_approx_tol(result.lump_sum, corpus * 0.6, corpus * 1e-9);
        assert_approx_tol(
            result.monthly_pension,
            corpus * 0.4 * 0.06 / 12.0,
            corpus * 1e-9,
        );
        assert_eq!(result.yearly.len(), 30);
    }

    #[test]
    fn annuity_share_is_clamped() {
        let full = evaluate(&NpsInput {
            annuity_percent: 150.0,
            ..NpsInput::default()
        });
        assert_approx_tol(full.annuity_percent, 100.0, 0.0);
        assert_approx_tol(full.lump_sum, 0.0, 1e-6);

        let none = evaluate(&NpsInput {
            annuity_percent: -10.0,
            ..NpsInput::default()
        });
        assert_approx_tol(none.annuity_corpus, 0.0, 0.0);
        assert_approx_tol(none.monthly_pension, 0.0, 0.0);
    }

    #[test]
    fn retirement_age_below_current_age_yields_nothing() {
        let result = evaluate(&NpsInput {
            current_age: 65,
            retirement_age: 60,
            ..NpsInput::default()
        });
        assert_eq!(result.investment_years, 0);
        assert_approx_tol(result.corpus_at_maturity, 0.0, 0.0);
        assert!(result.yearly.is_empty());
    }
}
