use serde::{Deserialize, Serialize};

use crate::core::classify::Breakpoints;
use crate::core::coerce;
use crate::core::finance::ratio_percent;

#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Serialize)]
pub enum DtiCategory {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl DtiCategory {
    pub fn guidance(self) -> &'static str {
        match self {
            DtiCategory::Excellent => "Lenders see this as a healthy level of debt.",
            DtiCategory::Good => "Most lenders will approve, though some may ask for more detail.",
            DtiCategory::Fair => "Approval is harder; paying down debt would help.",
            DtiCategory::Poor => "Debt payments take up too much income for most lenders.",
        }
    }
}

pub const DTI_BREAKPOINTS: Breakpoints<'static, DtiCategory> = Breakpoints::new(
    &[
        (36.0, DtiCategory::Excellent),
        (43.0, DtiCategory::Good),
        (50.0, DtiCategory::Fair),
    ],
    DtiCategory::Poor,
);

/// Share of income lenders generally treat as the comfortable ceiling.
pub const RECOMMENDED_MAX_RATIO: f64 = 36.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DtiInput {
    #[serde(deserialize_with = "coerce::number")]
    pub gross_monthly_income: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub housing: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub auto_loan: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub student_loan: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub credit_card: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub other: f64,
}

impl Default for DtiInput {
    fn default() -> Self {
        Self {
            gross_monthly_income: 5_000.0,
            housing: 1_200.0,
            auto_loan: 400.0,
            student_loan: 200.0,
            credit_card: 100.0,
            other: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DtiResult {
    pub total_monthly_debt: f64,
    pub ratio: f64,
    pub front_end_ratio: f64,
    pub category: DtiCategory,
    pub guidance: &'static str,
    pub max_recommended_debt: f64,
    pub remaining_capacity: f64,
}

pub fn evaluate(input: &DtiInput) -> DtiResult {
    let total_monthly_debt = [
        input.housing,
        input.auto_loan,
        input.student_loan,
        input.credit_card,
        input.other,
    ]
    .iter()
    .map(|v| v.max(0.0))
    .sum::<f64>();

    let ratio = ratio_percent(total_monthly_debt, input.gross_monthly_income);
    let front_end_ratio = ratio_percent(input.housing.max(0.0), input.gross_monthly_income);
    let category = DTI_BREAKPOINTS.classify(ratio);
    let max_recommended_debt = input.gross_monthly_income.max(0.0) * RECOMMENDED_MAX_RATIO / 100.0;

    DtiResult {
        total_monthly_debt,
        ratio,
        front_end_ratio,
        category,
        guidance: category.guidance(),
        max_recommended_debt,
        remaining_capacity: (max_recommended_debt - total_monthly_debt).max(0.0),
    }
}
