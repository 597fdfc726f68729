pub mod body_water;
pub mod college_savings;
pub mod compound_interest;
pub mod dti;
pub mod mortgage_points;
pub mod nps;
pub mod sales_tax;
pub mod sip;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde::de::{self, DeserializeOwned, Unexpected};
use serde_json::Value;

use crate::error::{Error, Result};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Calculator {
    BodyWater,
    CollegeSavings,
    CompoundInterest,
    DebtToIncome,
    MortgagePoints,
    Nps,
    SalesTax,
    Sip,
}

impl Calculator {
    pub const ALL: [Calculator; 8] = [
        Calculator::BodyWater,
        Calculator::CollegeSavings,
        Calculator::CompoundInterest,
        Calculator::DebtToIncome,
        Calculator::MortgagePoints,
        Calculator::Nps,
        Calculator::SalesTax,
        Calculator::Sip,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Calculator::BodyWater => "body-water",
            Calculator::CollegeSavings => "college-savings",
            Calculator::CompoundInterest => "compound-interest",
            Calculator::DebtToIncome => "debt-to-income",
            Calculator::MortgagePoints => "mortgage-points",
            Calculator::Nps => "nps",
            Calculator::SalesTax => "sales-tax",
            Calculator::Sip => "sip",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Calculator::BodyWater => "Body Water Percentage Calculator",
            Calculator::CollegeSavings => "College Savings Calculator",
            Calculator::CompoundInterest => "Compound Interest Calculator",
            Calculator::DebtToIncome => "Debt-to-Income Ratio Calculator",
            Calculator::MortgagePoints => "Mortgage Points Calculator",
            Calculator::Nps => "NPS Calculator",
            Calculator::SalesTax => "Sales Tax Calculator",
            Calculator::Sip => "SIP Calculator",
        }
    }

    /// Evaluates with every field at its default.
    pub fn evaluate_defaults(self) -> Result<Value> {
        self.evaluate_json(Value::Object(Default::default()))
    }

    /// Deserializes an input record from `payload`, evaluates it and returns
    /// the serialized result. Missing fields take their defaults.
    pub fn evaluate_json(self, payload: Value) -> Result<Value> {
        match self {
            Calculator::BodyWater => run(payload, "body-water", body_water::evaluate),
            Calculator::CollegeSavings => {
                run(payload, "college-savings", college_savings::evaluate)
            }
            Calculator::CompoundInterest => {
                run(payload, "compound-interest", compound_interest::evaluate)
            }
            Calculator::DebtToIncome => run(payload, "debt-to-income", dti::evaluate),
            Calculator::MortgagePoints => {
                run(payload, "mortgage-points", mortgage_points::evaluate)
            }
            Calculator::Nps => run(payload, "nps", nps::evaluate),
            Calculator::SalesTax => run(payload, "sales-tax", sales_tax::evaluate),
            Calculator::Sip => run(payload, "sip", sip::evaluate),
        }
    }
}

fn run<I, O>(payload: Value, context: &'static str, evaluate: fn(&I) -> O) -> Result<Value>
where
    I: DeserializeOwned,
    O: Serialize,
{
    // Input records are keyed objects; a sequence would bind positionally.
    if !payload.is_object() {
        return Err(Error::invalid_payload(context, not_an_object(&payload)));
    }
    let input: I =
        serde_json::from_value(payload).map_err(|e| Error::invalid_payload(context, e))?;
    serde_json::to_value(evaluate(&input)).map_err(|e| Error::invalid_payload(context, e))
}

fn not_an_object(payload: &Value) -> serde_json::Error {
    let unexpected = match payload {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    };
    <serde_json::Error as de::Error>::invalid_type(unexpected, &"a JSON object")
}

impl fmt::Display for Calculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Calculator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        let found = match normalized.as_str() {
            "dti" => Some(Calculator::DebtToIncome),
            "tbw" => Some(Calculator::BodyWater),
            other => Calculator::ALL.into_iter().find(|c| c.slug() == other),
        };
        found.ok_or_else(|| Error::UnknownCalculator(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_calculator_round_trips_its_slug() {
        for calculator in Calculator::ALL {
            assert_eq!(calculator.slug().parse::<Calculator>().ok(), Some(calculator));
        }
    }

    #[test]
    fn aliases_and_case_are_accepted() {
        assert_eq!("DTI".parse::<Calculator>().ok(), Some(Calculator::DebtToIncome));
        assert_eq!("sales_tax".parse::<Calculator>().ok(), Some(Calculator::SalesTax));
        assert_eq!("tbw".parse::<Calculator>().ok(), Some(Calculator::BodyWater));
    }

    #[test]
    fn unknown_calculator_is_rejected() {
        let err = "loan-shark".parse::<Calculator>().expect_err("must reject");
        assert!(matches!(err, Error::UnknownCalculator(ref name) if name == "loan-shark"));
    }

    #[test]
    fn every_calculator_evaluates_its_defaults() {
        for calculator in Calculator::ALL {
            let value = calculator
                .evaluate_defaults()
                .unwrap_or_else(|e| panic!("{calculator} failed: {e}"));
            assert!(value.is_object(), "{calculator} should produce an object");
        }
    }

    #[test]
    fn evaluate_json_uses_camel_case_keys() {
        let value = Calculator::DebtToIncome
            .evaluate_json(json!({
                "grossMonthlyIncome": 5000,
                "housing": 1200,
                "autoLoan": 400,
                "studentLoan": 200,
                "creditCard": 100
            }))
            .expect("valid payload");
        assert_eq!(value["totalMonthlyDebt"], json!(1900.0));
        assert_eq!(value["ratio"], json!(38.0));
        assert_eq!(value["category"], json!("Good"));
    }

    #[test]
    fn wrong_payload_shape_is_an_error() {
        let err = Calculator::Sip
            .evaluate_json(json!([1, 2, 3]))
            .expect_err("arrays are not inputs");
        assert!(err.is_client_error());
        assert!(err.to_string().contains("a JSON object"));
    }

    #[test]
    fn non_object_payloads_are_rejected_for_every_calculator() {
        for calculator in Calculator::ALL {
            for payload in [json!([5000, 1200]), json!(null), json!("sip"), json!(42)] {
                let err = calculator
                    .evaluate_json(payload.clone())
                    .expect_err("only objects are inputs");
                assert!(
                    matches!(err, Error::InvalidPayload { .. }),
                    "{calculator} accepted {payload}"
                );
            }
        }
    }

    #[test]
    fn bad_enum_value_is_an_error() {
        let err = Calculator::SalesTax
            .evaluate_json(json!({"mode": "sideways"}))
            .expect_err("unknown mode");
        assert!(err.to_string().contains("sales-tax"));
    }
}
