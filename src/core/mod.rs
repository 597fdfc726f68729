pub mod calculators;
pub mod classify;
pub mod coerce;
pub mod finance;
mod types;

pub use calculators::Calculator;
pub use classify::Breakpoints;
pub use types::{AmortizationRecord, PeriodRecord, Timing};
