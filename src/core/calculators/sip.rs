use serde::{Deserialize, Serialize};

use crate::core::coerce;
use crate::core::finance::{
    MONTHS_PER_YEAR, future_value, growth_schedule, periodic_rate, periods_for_years,
    yearly_rollup,
};
use crate::core::types::{PeriodRecord, Timing};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SipInput {
    #[serde(deserialize_with = "coerce::number")]
    pub monthly_investment: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub years: f64,
    /// Expected annual return in percent.
    #[serde(deserialize_with = "coerce::number")]
    pub annual_return: f64,
    /// Optional one-off amount invested at the start.
    #[serde(deserialize_with = "coerce::number")]
    pub lump_sum: f64,
}

impl Default for SipInput {
    fn default() -> Self {
        Self {
            monthly_investment: 500.0,
            years: 10.0,
            annual_return: 8.0,
            lump_sum: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SipResult {
    pub months: u32,
    pub total_invested: f64,
    pub estimated_returns: f64,
    pub total_value: f64,
    pub yearly: Vec<PeriodRecord>,
}

/// SIP instalments are invested at the start of each month.
pub fn evaluate(input: &SipInput) -> SipResult {
    let monthly = input.monthly_investment.max(0.0);
    let lump_sum = input.lump_sum.max(0.0);
    let months = periods_for_years(input.years, MONTHS_PER_YEAR);
    let rate = periodic_rate(input.annual_return, MONTHS_PER_YEAR);

    let total_value = future_value(lump_sum, monthly, rate, months, Timing::Due);
    let total_invested = lump_sum + monthly * months as f64;
    let schedule = growth_schedule(lump_sum, monthly, rate, months, Timing::Due);

    SipResult {
        months,
        total_invested,
        estimated_returns: total_value - total_invested,
        total_value,
        yearly: yearly_rollup(&schedule, MONTHS_PER_YEAR),
    }
}
