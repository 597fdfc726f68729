use serde::{Deserialize, Serialize};

use crate::core::classify::Breakpoints;
use crate::core::coerce;
use crate::core::finance::ratio_percent;

const CM_PER_INCH: f64 = 2.54;
const KG_PER_POUND: f64 = 0.453_592_37;
const LITRES_PER_US_GALLON: f64 = 3.785_411_784;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[default]
    #[serde(alias = "m")]
    Male,
    #[serde(alias = "f")]
    Female,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Centimetres and kilograms.
    #[default]
    Metric,
    /// Inches and pounds.
    Imperial,
}

/// Two-sided: both `Low` and `High` are outside the healthy range, so the
/// variants carry no severity order. Use [`HydrationCategory::severity`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum HydrationCategory {
    Low,
    Normal,
    High,
}

impl HydrationCategory {
    /// 0 inside the healthy range, 1 on either side of it.
    pub fn severity(self) -> u8 {
        match self {
            HydrationCategory::Normal => 0,
            HydrationCategory::Low | HydrationCategory::High => 1,
        }
    }
}

/// Healthy adult ranges as percent of body weight.
pub const MALE_RANGE: (f64, f64) = (50.0, 65.0);
pub const FEMALE_RANGE: (f64, f64) = (45.0, 60.0);

const MALE_BREAKPOINTS: Breakpoints<'static, HydrationCategory> = Breakpoints::new(
    &[
        (MALE_RANGE.0, HydrationCategory::Low),
        (MALE_RANGE.1, HydrationCategory::Normal),
    ],
    HydrationCategory::High,
);

const FEMALE_BREAKPOINTS: Breakpoints<'static, HydrationCategory> = Breakpoints::new(
    &[
        (FEMALE_RANGE.0, HydrationCategory::Low),
        (FEMALE_RANGE.1, HydrationCategory::Normal),
    ],
    HydrationCategory::High,
);

pub fn breakpoints(sex: Sex) -> Breakpoints<'static, HydrationCategory> {
    match sex {
        Sex::Male => MALE_BREAKPOINTS,
        Sex::Female => FEMALE_BREAKPOINTS,
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BodyWaterInput {
    pub sex: Sex,
    #[serde(deserialize_with = "coerce::number")]
    pub age: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub height: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub weight: f64,
    pub units: UnitSystem,
}

impl Default for BodyWaterInput {
    fn default() -> Self {
        Self {
            sex: Sex::Male,
            age: 30.0,
            height: 175.0,
            weight: 70.0,
            units: UnitSystem::Metric,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyWaterResult {
    pub total_body_water_litres: f64,
    pub total_body_water_gallons: f64,
    pub percentage: f64,
    pub category: HydrationCategory,
    pub healthy_range_low: f64,
    pub healthy_range_high: f64,
}

/// Watson formula; height in centimetres, weight in kilograms.
pub fn watson_tbw(sex: Sex, age: f64, height_cm: f64, weight_kg: f64) -> f64 {
    let litres = match sex {
        Sex::Male => 2.447 - 0.09516 * age + 0.1074 * height_cm + 0.3362 * weight_kg,
        Sex::Female => -2.097 + 0.1069 * height_cm + 0.2466 * weight_kg,
    };
    litres.max(0.0)
}

pub fn evaluate(input: &BodyWaterInput) -> BodyWaterResult {
    let (height_cm, weight_kg) = match input.units {
        UnitSystem::Metric => (input.height, input.weight),
        UnitSystem::Imperial => (input.height * CM_PER_INCH, input.weight * KG_PER_POUND),
    };
    let (height_cm, weight_kg, age) = (height_cm.max(0.0), weight_kg.max(0.0), input.age.max(0.0));

    let litres = if weight_kg > 0.0 {
        watson_tbw(input.sex, age, height_cm, weight_kg)
    } else {
        0.0
    };
    // One litre of body water weighs about one kilogram.
    let percentage = ratio_percent(litres, weight_kg);
    let (healthy_range_low, healthy_range_high) = match input.sex {
        Sex::Male => MALE_RANGE,
        Sex::Female => FEMALE_RANGE,
    };

    BodyWaterResult {
        total_body_water_litres: litres,
        total_body_water_gallons: litres / LITRES_PER_US_GALLON,
        percentage,
        category: breakpoints(input.sex).classify(percentage),
        healthy_range_low,
        healthy_range_high,
    }
}
