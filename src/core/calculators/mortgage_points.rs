use serde::{Deserialize, Serialize};

use crate::core::classify::Breakpoints;
use crate::core::coerce;
use crate::core::finance::{
    MONTHS_PER_YEAR, amortization_schedule, amortization_yearly, loan_payment, periodic_rate,
    periods_for_years,
};
use crate::core::types::AmortizationRecord;

#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Serialize)]
pub enum PointsGrade {
    A,
    B,
    C,
    D,
}

/// Break-even horizon in months mapped to a grade.
pub const GRADE_BREAKPOINTS: Breakpoints<'static, PointsGrade> = Breakpoints::new(
    &[
        (36.0, PointsGrade::A),
        (60.0, PointsGrade::B),
        (84.0, PointsGrade::C),
    ],
    PointsGrade::D,
);

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MortgagePointsInput {
    #[serde(deserialize_with = "coerce::number")]
    pub loan_amount: f64,
    /// Annual rate before points, percent.
    #[serde(deserialize_with = "coerce::number")]
    pub interest_rate: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub term_years: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub points: f64,
    /// Cost of one point as a percent of the loan.
    #[serde(deserialize_with = "coerce::number")]
    pub cost_per_point: f64,
    /// Rate cut per point, percentage points.
    #[serde(deserialize_with = "coerce::number")]
    pub rate_reduction_per_point: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub years_in_home: f64,
}

impl Default for MortgagePointsInput {
    fn default() -> Self {
        Self {
            loan_amount: 300_000.0,
            interest_rate: 7.0,
            term_years: 30.0,
            points: 2.0,
            cost_per_point: 1.0,
            rate_reduction_per_point: 0.25,
            years_in_home: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgagePointsResult {
    pub discounted_rate: f64,
    pub base_monthly_payment: f64,
    pub discounted_monthly_payment: f64,
    pub monthly_savings: f64,
    pub upfront_cost: f64,
    /// Absent when the points never pay for themselves.
    pub break_even_months: Option<f64>,
    pub lifetime_interest_saved: f64,
    pub net_savings_over_stay: f64,
    pub worth_it: bool,
    pub grade: PointsGrade,
    pub recommendation: String,
    pub yearly: Vec<AmortizationRecord>,
}

pub fn evaluate(input: &MortgagePointsInput) -> MortgagePointsResult {
    let loan = input.loan_amount.max(0.0);
    let points = input.points.max(0.0);
    let months = periods_for_years(input.term_years, MONTHS_PER_YEAR);
    let base_rate = input.interest_rate.max(0.0);
    let discounted_rate =
        (base_rate - points * input.rate_reduction_per_point.max(0.0)).max(0.0);

    let base_monthly_payment =
        loan_payment(loan, periodic_rate(base_rate, MONTHS_PER_YEAR), months);
    let discounted_periodic = periodic_rate(discounted_rate, MONTHS_PER_YEAR);
    let discounted_monthly_payment = loan_payment(loan, discounted_periodic, months);
    let monthly_savings = base_monthly_payment - discounted_monthly_payment;
    let upfront_cost = loan * points * input.cost_per_point.max(0.0) / 100.0;

    let break_even_months = if upfront_cost <= 0.0 {
        Some(0.0)
    } else if monthly_savings > 0.0 {
        Some(upfront_cost / monthly_savings)
    } else {
        None
    };

    let stay_months = periods_for_years(input.years_in_home, MONTHS_PER_YEAR).min(months);
    let net_savings_over_stay = monthly_savings * stay_months as f64 - upfront_cost;
    let grade = GRADE_BREAKPOINTS.classify(break_even_months.unwrap_or(f64::INFINITY));
    let worth_it = points > 0.0 && net_savings_over_stay > 0.0;

    let schedule = amortization_schedule(loan, discounted_periodic, months);

    MortgagePointsResult {
        discounted_rate,
        base_monthly_payment,
        discounted_monthly_payment,
        monthly_savings,
        upfront_cost,
        break_even_months,
        lifetime_interest_saved: monthly_savings * months as f64,
        net_savings_over_stay,
        worth_it,
        grade,
        recommendation: recommendation(grade, break_even_months, stay_months, worth_it),
        yearly: amortization_yearly(&schedule, MONTHS_PER_YEAR),
    }
}

fn recommendation(
    grade: PointsGrade,
    break_even_months: Option<f64>,
    stay_months: u32,
    worth_it: bool,
) -> String {
    let Some(months) = break_even_months else {
        return "The points never pay for themselves at this rate reduction.".to_string();
    };
    let outlook = match grade {
        PointsGrade::A => "a quick payback",
        PointsGrade::B => "a reasonable payback",
        PointsGrade::C => "a slow payback",
        PointsGrade::D => "a very long payback",
    };
    let stay = if worth_it {
        format!("You come out ahead within your planned {stay_months} months in the home.")
    } else {
        format!("You would not recoup the cost within your planned {stay_months} months.")
    };
    format!("Break-even after {months:.1} months is {outlook}. {stay}")
}
