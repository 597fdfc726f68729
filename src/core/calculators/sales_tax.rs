use serde::{Deserialize, Serialize};

use crate::core::coerce;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaxMode {
    /// Pre-tax price in, tax and total out.
    #[default]
    #[serde(alias = "add")]
    Forward,
    /// Tax-inclusive total in, pre-tax price out.
    #[serde(alias = "remove", alias = "reverse-tax")]
    Reverse,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SalesTaxInput {
    pub mode: TaxMode,
    /// Pre-tax price in forward mode, tax-inclusive total in reverse mode.
    #[serde(deserialize_with = "coerce::number")]
    pub amount: f64,
    /// Percent, e.g. `8.25`.
    #[serde(deserialize_with = "coerce::number")]
    pub rate: f64,
}

impl Default for SalesTaxInput {
    fn default() -> Self {
        Self {
            mode: TaxMode::Forward,
            amount: 100.0,
            rate: 8.25,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesTaxResult {
    pub mode: TaxMode,
    pub pre_tax_amount: f64,
    pub tax_amount: f64,
    pub total: f64,
    pub rate: f64,
}

pub fn forward(price: f64, rate_percent: f64) -> (f64, f64) {
    let tax = price * rate_percent / 100.0;
    (tax, price + tax)
}

/// Pre-tax amount for a tax-inclusive total. A rate at or below -100% has no
/// inverse; the total is returned unchanged.
pub fn reverse(total: f64, rate_percent: f64) -> f64 {
    let divisor = 1.0 + rate_percent / 100.0;
    if divisor <= 0.0 {
        return total;
    }
    total / divisor
}

pub fn evaluate(input: &SalesTaxInput) -> SalesTaxResult {
    match input.mode {
        TaxMode::Forward => {
            let (tax_amount, total) = forward(input.amount, input.rate);
            SalesTaxResult {
                mode: input.mode,
                pre_tax_amount: input.amount,
                tax_amount,
                total,
                rate: input.rate,
            }
        }
        TaxMode::Reverse => {
            let pre_tax_amount = reverse(input.amount, input.rate);
            SalesTaxResult {
                mode: input.mode,
                pre_tax_amount,
                tax_amount: input.amount - pre_tax_amount,
                total: input.amount,
                rate: input.rate,
            }
        }
    }
}
