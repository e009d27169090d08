use serde::{Deserialize, Serialize};
use std::fmt;

/// Grouping unit for aggregation and threshold rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Transport,
    Energy,
    Food,
    Waste,
    Other,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Transport => "transport",
            Category::Energy => "energy",
            Category::Food => "food",
            Category::Waste => "waste",
            Category::Other => "other",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "transport" => Category::Transport,
            "energy" => Category::Energy,
            "food" => Category::Food,
            "waste" => Category::Waste,
            _ => Category::Other,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmissionEstimate {
    pub calculated_co2: f64,
    pub category: Category,
}

struct EmissionRule {
    type_fragment: &'static str,
    unit: &'static str,
    factor: f64,
    category: Category,
}

/// Fixed emission factors in kg CO2 per unit. Evaluated top to bottom and the
/// first match wins, so overlapping fragments (an activity type mentioning
/// both "bus" and "car") resolve by table order.
const EMISSION_RULES: &[EmissionRule] = &[
    EmissionRule { type_fragment: "car", unit: "km", factor: 0.21, category: Category::Transport },
    EmissionRule { type_fragment: "bus", unit: "km", factor: 0.105, category: Category::Transport },
    EmissionRule { type_fragment: "train", unit: "km", factor: 0.041, category: Category::Transport },
    EmissionRule { type_fragment: "flight", unit: "km", factor: 0.255, category: Category::Transport },
    EmissionRule { type_fragment: "electricity", unit: "kwh", factor: 0.85, category: Category::Energy },
    EmissionRule { type_fragment: "gas", unit: "hour", factor: 2.0, category: Category::Energy },
    EmissionRule { type_fragment: "heating", unit: "hour", factor: 1.5, category: Category::Energy },
    EmissionRule { type_fragment: "beef", unit: "kg", factor: 27.0, category: Category::Food },
    EmissionRule { type_fragment: "chicken", unit: "kg", factor: 6.9, category: Category::Food },
    EmissionRule { type_fragment: "vegetables", unit: "kg", factor: 2.0, category: Category::Food },
    EmissionRule { type_fragment: "dairy", unit: "kg", factor: 3.2, category: Category::Food },
    EmissionRule { type_fragment: "plastic", unit: "kg", factor: 6.0, category: Category::Waste },
    EmissionRule { type_fragment: "paper", unit: "kg", factor: 1.5, category: Category::Waste },
    EmissionRule { type_fragment: "food_waste", unit: "kg", factor: 2.5, category: Category::Waste },
];

/// Converts one logged activity into an estimated CO2 mass and category.
///
/// Activity types are matched by case-sensitive substring containment against
/// the rule table; the unit must match exactly. Anything unrecognized falls
/// through to `{0.0, other}` rather than erroring, so a misspelled activity is
/// still accepted (recorded with zero impact).
pub fn calculate(activity_type: &str, activity_value: f64, unit: &str) -> EmissionEstimate {
    EMISSION_RULES
        .iter()
        .find(|rule| activity_type.contains(rule.type_fragment) && unit == rule.unit)
        .map(|rule| EmissionEstimate {
            calculated_co2: round2(activity_value * rule.factor),
            category: rule.category,
        })
        .unwrap_or(EmissionEstimate {
            calculated_co2: 0.0,
            category: Category::Other,
        })
}

/// Round half away from zero to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{Category, calculate, round2};

    #[test]
    fn car_travel_in_km() {
        let estimate = calculate("car_drive", 10.0, "km");
        assert_eq!(estimate.calculated_co2, 2.10);
        assert_eq!(estimate.category, Category::Transport);
    }

    #[test]
    fn beef_consumption_in_kg() {
        let estimate = calculate("beef_consumption", 2.0, "kg");
        assert_eq!(estimate.calculated_co2, 54.00);
        assert_eq!(estimate.category, Category::Food);
    }

    #[test]
    fn unit_must_match_for_rule_to_fire() {
        let estimate = calculate("car_drive", 10.0, "miles");
        assert_eq!(estimate.calculated_co2, 0.0);
        assert_eq!(estimate.category, Category::Other);
    }

    #[test]
    fn unknown_activity_falls_back_to_other() {
        let estimate = calculate("kayaking", 3.0, "hour");
        assert_eq!(estimate.calculated_co2, 0.0);
        assert_eq!(estimate.category, Category::Other);
    }

    #[test]
    fn overlapping_fragments_resolve_by_table_order() {
        // Contains both "bus" and "car"; the car rule is listed first.
        let estimate = calculate("bus_to_carpark", 10.0, "km");
        assert_eq!(estimate.calculated_co2, 2.10);
        assert_eq!(estimate.category, Category::Transport);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let estimate = calculate("Car_drive", 10.0, "km");
        assert_eq!(estimate.category, Category::Other);
    }

    #[test]
    fn result_is_rounded_to_two_decimals() {
        // 7 km by train: 7 * 0.041 = 0.287 -> 0.29
        let estimate = calculate("train_ride", 7.0, "km");
        assert_eq!(estimate.calculated_co2, 0.29);
    }

    #[test]
    fn round2_is_half_away_from_zero() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(2.1), 2.1);
    }
}
