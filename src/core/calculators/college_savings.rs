use serde::{Deserialize, Serialize};

use crate::core::coerce;
use crate::core::finance::{
    MAX_YEARS, MONTHS_PER_YEAR, future_value, growth_schedule, periodic_rate, periods_for_years,
    ratio_percent, required_contribution, yearly_rollup,
};
use crate::core::types::{PeriodRecord, Timing};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollegeSavingsInput {
    #[serde(deserialize_with = "coerce::whole")]
    pub child_age: u32,
    #[serde(deserialize_with = "coerce::whole")]
    pub college_start_age: u32,
    #[serde(deserialize_with = "coerce::whole")]
    pub years_in_college: u32,
    /// Yearly tuition, fees and board in today's money.
    #[serde(deserialize_with = "coerce::number")]
    pub annual_cost: f64,
    /// Percent per year.
    #[serde(deserialize_with = "coerce::number")]
    pub cost_inflation: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub current_savings: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub monthly_contribution: f64,
    /// Percent per year.
    #[serde(deserialize_with = "coerce::number")]
    pub annual_return: f64,
}

impl Default for CollegeSavingsInput {
    fn default() -> Self {
        Self {
            child_age: 5,
            college_start_age: 18,
            years_in_college: 4,
            annual_cost: 25_000.0,
            cost_inflation: 5.0,
            current_savings: 10_000.0,
            monthly_contribution: 300.0,
            annual_return: 6.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollegeSavingsResult {
    pub years_until_college: u32,
    pub first_year_cost: f64,
    pub projected_total_cost: f64,
    pub projected_savings: f64,
    pub total_contributions: f64,
    pub shortfall: f64,
    pub surplus: f64,
    pub funded_percent: f64,
    pub required_monthly_contribution: f64,
    pub yearly: Vec<PeriodRecord>,
}

/// Inflated cost of each college year, first year first.
pub fn projected_costs(input: &CollegeSavingsInput, years_until: u32) -> Vec<f64> {
    let annual_cost = input.annual_cost.max(0.0);
    let growth = 1.0 + input.cost_inflation / 100.0;
    let years = input.years_in_college.min(MAX_YEARS as u32);
    (0..years)
        .map(|k| annual_cost * growth.max(0.0).powf((years_until + k) as f64))
        .collect()
}

pub fn evaluate(input: &CollegeSavingsInput) -> CollegeSavingsResult {
    let years_until_college = input.college_start_age.saturating_sub(input.child_age);
    let months = periods_for_years(years_until_college as f64, MONTHS_PER_YEAR);
    let rate = periodic_rate(input.annual_return, MONTHS_PER_YEAR);
    let current = input.current_savings.max(0.0);
    let monthly = input.monthly_contribution.max(0.0);

    let costs = projected_costs(input, years_until_college);
    let projected_total_cost: f64 = costs.iter().sum();
    let projected_savings = future_value(current, monthly, rate, months, Timing::Ordinary);
    let schedule = growth_schedule(current, monthly, rate, months, Timing::Ordinary);

    CollegeSavingsResult {
        years_until_college,
        first_year_cost: costs.first().copied().unwrap_or(0.0),
        projected_total_cost,
        projected_savings,
        total_contributions: current + monthly * months as f64,
        shortfall: (projected_total_cost - projected_savings).max(0.0),
        surplus: (projected_savings - projected_total_cost).max(0.0),
        funded_percent: ratio_percent(projected_savings, projected_total_cost),
        required_monthly_contribution: required_contribution(
            projected_total_cost,
            current,
            rate,
            months,
            Timing::Ordinary,
        ),
        yearly: yearly_rollup(&schedule, MONTHS_PER_YEAR),
    }
}
