//! Shared time-value-of-money helpers used by every growth and loan calculator.
//!
//! Rates are per period as fractions (`0.08 / 12` for 8% compounded monthly).
//! Closed forms are O(1); the schedule builders unroll the same recurrence so
//! the two can be cross-checked.

use super::types::{AmortizationRecord, PeriodRecord, Timing};

/// Horizon cap for every loop in the crate.
pub const MAX_YEARS: f64 = 50.0;
pub const MONTHS_PER_YEAR: u32 = 12;

const ZERO_RATE: f64 = 1e-12;

/// Converts a duration in years to a whole number of periods. Negative or
/// non-finite durations give zero periods; long ones are capped at
/// [`MAX_YEARS`].
pub fn periods_for_years(years: f64, periods_per_year: u32) -> u32 {
    if !years.is_finite() || years <= 0.0 {
        return 0;
    }
    (years.min(MAX_YEARS) * periods_per_year as f64).round() as u32
}

/// Annual percentage (e.g. `8.0`) to a per-period fraction.
pub fn periodic_rate(annual_percent: f64, periods_per_year: u32) -> f64 {
    if periods_per_year == 0 {
        return 0.0;
    }
    annual_percent / 100.0 / periods_per_year as f64
}

/// `numerator / denominator * 100`, or `0` when the denominator is not a
/// positive finite number.
pub fn ratio_percent(numerator: f64, denominator: f64) -> f64 {
    if !denominator.is_finite() || denominator <= 0.0 || !numerator.is_finite() {
        return 0.0;
    }
    numerator / denominator * 100.0
}

pub fn future_value_lump(principal: f64, rate: f64, periods: u32) -> f64 {
    principal * (1.0 + rate).powf(periods as f64)
}

/// Future value of one unit contributed each period.
pub fn annuity_factor(rate: f64, periods: u32, timing: Timing) -> f64 {
    let n = periods as f64;
    if rate.abs() < ZERO_RATE {
        return n;
    }
    let ordinary = ((1.0 + rate).powf(n) - 1.0) / rate;
    match timing {
        Timing::Ordinary => ordinary,
        Timing::Due => ordinary * (1.0 + rate),
    }
}

pub fn future_value(
    principal: f64,
    contribution: f64,
    rate: f64,
    periods: u32,
    timing: Timing,
) -> f64 {
    future_value_lump(principal, rate, periods) + contribution * annuity_factor(rate, periods, timing)
}

pub fn present_value(future: f64, rate: f64, periods: u32) -> f64 {
    let growth = (1.0 + rate).powf(periods as f64);
    if !growth.is_finite() || growth <= 0.0 {
        return 0.0;
    }
    future / growth
}

/// Level contribution per period that grows `principal` to `target`.
/// Zero when the principal alone already reaches the target or there are no
/// periods left.
pub fn required_contribution(
    target: f64,
    principal: f64,
    rate: f64,
    periods: u32,
    timing: Timing,
) -> f64 {
    let gap = target - future_value_lump(principal, rate, periods);
    let factor = annuity_factor(rate, periods, timing);
    if gap <= 0.0 || factor <= 0.0 {
        return 0.0;
    }
    gap / factor
}

/// `(1 + nominal / m)^m - 1`.
pub fn effective_annual_rate(nominal_annual: f64, periods_per_year: u32) -> f64 {
    if periods_per_year == 0 {
        return 0.0;
    }
    let m = periods_per_year as f64;
    (1.0 + nominal_annual / m).powf(m) - 1.0
}

/// Per-period growth breakdown. `cumulative_contributed` includes the
/// opening principal.
pub fn growth_schedule(
    principal: f64,
    contribution: f64,
    rate: f64,
    periods: u32,
    timing: Timing,
) -> Vec<PeriodRecord> {
    let mut schedule = Vec::with_capacity(periods as usize);
    let mut balance = principal;
    let mut contributed = principal;
    for index in 1..=periods {
        balance = match timing {
            Timing::Due => (balance + contribution) * (1.0 + rate),
            Timing::Ordinary => balance * (1.0 + rate) + contribution,
        };
        contributed += contribution;
        schedule.push(PeriodRecord {
            index,
            period_contribution: contribution,
            cumulative_contributed: contributed,
            cumulative_growth: balance - contributed,
            ending_balance: balance,
        });
    }
    schedule
}

/// Folds a per-period schedule into one record per year. A trailing partial
/// year is kept.
pub fn yearly_rollup(schedule: &[PeriodRecord], periods_per_year: u32) -> Vec<PeriodRecord> {
    let chunk = periods_per_year.max(1) as usize;
    schedule
        .chunks(chunk)
        .zip(1u32..)
        .filter_map(|(rows, year)| {
            let last = rows.last()?;
            Some(PeriodRecord {
                index: year,
                period_contribution: rows.iter().map(|r| r.period_contribution).sum(),
                cumulative_contributed: last.cumulative_contributed,
                cumulative_growth: last.cumulative_growth,
                ending_balance: last.ending_balance,
            })
        })
        .collect()
}

/// Year-end balances straight from the closed form, for frequencies where
/// unrolling every period would be wasteful (daily compounding).
pub fn yearly_snapshots(
    principal: f64,
    contribution: f64,
    rate: f64,
    periods: u32,
    periods_per_year: u32,
    timing: Timing,
) -> Vec<PeriodRecord> {
    let per_year = periods_per_year.max(1);
    let years = periods.div_ceil(per_year);
    (1..=years)
        .map(|year| {
            let start = (year - 1) * per_year;
            let end = (year * per_year).min(periods);
            let balance = future_value(principal, contribution, rate, end, timing);
            let contributed = principal + contribution * end as f64;
            PeriodRecord {
                index: year,
                period_contribution: contribution * (end - start) as f64,
                cumulative_contributed: contributed,
                cumulative_growth: balance - contributed,
                ending_balance: balance,
            }
        })
        .collect()
}

/// Level payment that retires `principal` over `periods`. Negative rates
/// are treated as zero.
pub fn loan_payment(principal: f64, rate: f64, periods: u32) -> f64 {
    if principal <= 0.0 || periods == 0 {
        return 0.0;
    }
    let n = periods as f64;
    let rate = rate.max(0.0);
    if rate < ZERO_RATE {
        return principal / n;
    }
    let denom = 1.0 - (1.0 + rate).powf(-n);
    if denom <= ZERO_RATE {
        return principal / n;
    }
    principal * rate / denom
}

pub fn amortization_schedule(principal: f64, rate: f64, periods: u32) -> Vec<AmortizationRecord> {
    let rate = rate.max(0.0);
    let payment = loan_payment(principal, rate, periods);
    let mut schedule = Vec::with_capacity(periods as usize);
    let mut balance = principal.max(0.0);
    for index in 1..=periods {
        let interest = balance * rate;
        let mut principal_paid = (payment - interest).clamp(0.0, balance);
        if index == periods {
            // Final payment clears the rounding residue.
            principal_paid = balance;
        }
        balance -= principal_paid;
        schedule.push(AmortizationRecord {
            index,
            payment: principal_paid + interest,
            principal_paid,
            interest_paid: interest,
            ending_balance: balance,
        });
    }
    schedule
}

pub fn amortization_yearly(
    schedule: &[AmortizationRecord],
    periods_per_year: u32,
) -> Vec<AmortizationRecord> {
    let chunk = periods_per_year.max(1) as usize;
    schedule
        .chunks(chunk)
        .zip(1u32..)
        .filter_map(|(rows, year)| {
            let last = rows.last()?;
            Some(AmortizationRecord {
                index: year,
                payment: rows.iter().map(|r| r.payment).sum(),
                principal_paid: rows.iter().map(|r| r.principal_paid).sum(),
                interest_paid: rows.iter().map(|r| r.interest_paid).sum(),
                ending_balance: last.ending_balance,
            })
        })
        .collect()
}
