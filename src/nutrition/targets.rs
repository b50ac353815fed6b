use std::ops::AddAssign;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Nutrients tracked on every food log, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Calories,
    Protein,
    Carbohydrates,
    Fat,
    Fiber,
    Sugar,
    Sodium,
    Potassium,
    Calcium,
    Iron,
    Magnesium,
    VitaminA,
    VitaminC,
    VitaminD,
    VitaminB12,
    Folate,
    Cholesterol,
    Zinc,
}

impl Nutrient {
    pub const ALL: [Nutrient; 18] = [
        Nutrient::Calories,
        Nutrient::Protein,
        Nutrient::Carbohydrates,
        Nutrient::Fat,
        Nutrient::Fiber,
        Nutrient::Sugar,
        Nutrient::Sodium,
        Nutrient::Potassium,
        Nutrient::Calcium,
        Nutrient::Iron,
        Nutrient::Magnesium,
        Nutrient::VitaminA,
        Nutrient::VitaminC,
        Nutrient::VitaminD,
        Nutrient::VitaminB12,
        Nutrient::Folate,
        Nutrient::Cholesterol,
        Nutrient::Zinc,
    ];

    /// Column name and JSON key.
    pub fn key(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Protein => "protein",
            Nutrient::Carbohydrates => "carbohydrates",
            Nutrient::Fat => "fat",
            Nutrient::Fiber => "fiber",
            Nutrient::Sugar => "sugar",
            Nutrient::Sodium => "sodium",
            Nutrient::Potassium => "potassium",
            Nutrient::Calcium => "calcium",
            Nutrient::Iron => "iron",
            Nutrient::Magnesium => "magnesium",
            Nutrient::VitaminA => "vitamin_a",
            Nutrient::VitaminC => "vitamin_c",
            Nutrient::VitaminD => "vitamin_d",
            Nutrient::VitaminB12 => "vitamin_b12",
            Nutrient::Folate => "folate",
            Nutrient::Cholesterol => "cholesterol",
            Nutrient::Zinc => "zinc",
        }
    }

    /// Display name; also the name the recipe API uses in nutrition blocks.
    pub fn label(self) -> &'static str {
        match self {
            Nutrient::Calories => "Calories",
            Nutrient::Protein => "Protein",
            Nutrient::Carbohydrates => "Carbohydrates",
            Nutrient::Fat => "Fat",
            Nutrient::Fiber => "Fiber",
            Nutrient::Sugar => "Sugar",
            Nutrient::Sodium => "Sodium",
            Nutrient::Potassium => "Potassium",
            Nutrient::Calcium => "Calcium",
            Nutrient::Iron => "Iron",
            Nutrient::Magnesium => "Magnesium",
            Nutrient::VitaminA => "Vitamin A",
            Nutrient::VitaminC => "Vitamin C",
            Nutrient::VitaminD => "Vitamin D",
            Nutrient::VitaminB12 => "Vitamin B12",
            Nutrient::Folate => "Folate",
            Nutrient::Cholesterol => "Cholesterol",
            Nutrient::Zinc => "Zinc",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Nutrient::Calories => "kcal",
            Nutrient::Protein
            | Nutrient::Carbohydrates
            | Nutrient::Fat
            | Nutrient::Fiber
            | Nutrient::Sugar => "g",
            Nutrient::Sodium
            | Nutrient::Potassium
            | Nutrient::Calcium
            | Nutrient::Iron
            | Nutrient::Magnesium
            | Nutrient::VitaminC
            | Nutrient::Cholesterol
            | Nutrient::Zinc => "mg",
            Nutrient::VitaminA | Nutrient::VitaminD | Nutrient::VitaminB12 | Nutrient::Folate => {
                "µg"
            }
        }
    }

    /// Fixed daily reference value (FDA daily values for adults).
    pub fn daily_target(self) -> f64 {
        match self {
            Nutrient::Calories => 2000.0,
            Nutrient::Protein => 50.0,
            Nutrient::Carbohydrates => 275.0,
            Nutrient::Fat => 78.0,
            Nutrient::Fiber => 28.0,
            Nutrient::Sugar => 50.0,
            Nutrient::Sodium => 2300.0,
            Nutrient::Potassium => 4700.0,
            Nutrient::Calcium => 1300.0,
            Nutrient::Iron => 18.0,
            Nutrient::Magnesium => 420.0,
            Nutrient::VitaminA => 900.0,
            Nutrient::VitaminC => 90.0,
            Nutrient::VitaminD => 20.0,
            Nutrient::VitaminB12 => 2.4,
            Nutrient::Folate => 400.0,
            Nutrient::Cholesterol => 300.0,
            Nutrient::Zinc => 11.0,
        }
    }

    /// Nutrients with an upper limit rather than an intake goal. They are
    /// never reported as deficient and never reward a recipe.
    pub fn is_limit(self) -> bool {
        matches!(
            self,
            Nutrient::Sodium | Nutrient::Sugar | Nutrient::Cholesterol
        )
    }

    /// Converts an amount reported in `unit` into this nutrient's unit.
    /// Returns `None` when the unit cannot be converted.
    pub fn normalize_amount(self, amount: f64, unit: &str) -> Option<f64> {
        if unit.trim().is_empty() {
            return Some(amount);
        }
        let from = canonical_unit(unit)?;
        let to = self.unit();
        if from == to {
            return Some(amount);
        }
        match (from, to) {
            ("IU", "µg") => match self {
                // retinol activity equivalents
                Nutrient::VitaminA => Some(amount * 0.3),
                Nutrient::VitaminD => Some(amount * 0.025),
                _ => None,
            },
            ("IU", _) => None,
            ("kcal", _) | (_, "kcal") => None,
            (from, to) => Some(amount * mass_in_mg(from)? / mass_in_mg(to)?),
        }
    }

    pub fn from_api_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|n| n.label().eq_ignore_ascii_case(name))
    }
}

fn canonical_unit(unit: &str) -> Option<&'static str> {
    match unit.trim().to_ascii_lowercase().as_str() {
        "g" => Some("g"),
        "mg" => Some("mg"),
        "µg" | "μg" | "mcg" | "ug" => Some("µg"),
        "kcal" | "cal" => Some("kcal"),
        "iu" => Some("IU"),
        _ => None,
    }
}

fn mass_in_mg(unit: &str) -> Option<f64> {
    match unit {
        "g" => Some(1000.0),
        "mg" => Some(1.0),
        "µg" => Some(0.001),
        _ => None,
    }
}

/// One amount per tracked nutrient. Missing fields deserialize as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(default)]
pub struct Nutrients {
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub sodium: f64,
    pub potassium: f64,
    pub calcium: f64,
    pub iron: f64,
    pub magnesium: f64,
    pub vitamin_a: f64,
    pub vitamin_c: f64,
    pub vitamin_d: f64,
    pub vitamin_b12: f64,
    pub folate: f64,
    pub cholesterol: f64,
    pub zinc: f64,
}

impl Nutrients {
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein,
            Nutrient::Carbohydrates => self.carbohydrates,
            Nutrient::Fat => self.fat,
            Nutrient::Fiber => self.fiber,
            Nutrient::Sugar => self.sugar,
            Nutrient::Sodium => self.sodium,
            Nutrient::Potassium => self.potassium,
            Nutrient::Calcium => self.calcium,
            Nutrient::Iron => self.iron,
            Nutrient::Magnesium => self.magnesium,
            Nutrient::VitaminA => self.vitamin_a,
            Nutrient::VitaminC => self.vitamin_c,
            Nutrient::VitaminD => self.vitamin_d,
            Nutrient::VitaminB12 => self.vitamin_b12,
            Nutrient::Folate => self.folate,
            Nutrient::Cholesterol => self.cholesterol,
            Nutrient::Zinc => self.zinc,
        }
    }

    pub fn get_mut(&mut self, nutrient: Nutrient) -> &mut f64 {
        match nutrient {
            Nutrient::Calories => &mut self.calories,
            Nutrient::Protein => &mut self.protein,
            Nutrient::Carbohydrates => &mut self.carbohydrates,
            Nutrient::Fat => &mut self.fat,
            Nutrient::Fiber => &mut self.fiber,
            Nutrient::Sugar => &mut self.sugar,
            Nutrient::Sodium => &mut self.sodium,
            Nutrient::Potassium => &mut self.potassium,
            Nutrient::Calcium => &mut self.calcium,
            Nutrient::Iron => &mut self.iron,
            Nutrient::Magnesium => &mut self.magnesium,
            Nutrient::VitaminA => &mut self.vitamin_a,
            Nutrient::VitaminC => &mut self.vitamin_c,
            Nutrient::VitaminD => &mut self.vitamin_d,
            Nutrient::VitaminB12 => &mut self.vitamin_b12,
            Nutrient::Folate => &mut self.folate,
            Nutrient::Cholesterol => &mut self.cholesterol,
            Nutrient::Zinc => &mut self.zinc,
        }
    }

    /// Values in `Nutrient::ALL` order, matching the column order used by the repo.
    pub fn values(&self) -> [f64; 18] {
        Nutrient::ALL.map(|n| self.get(n))
    }

    /// Every amount divided by `divisor`, e.g. a per-day average.
    pub fn divided(&self, divisor: f64) -> Self {
        let mut out = *self;
        for n in Nutrient::ALL {
            *out.get_mut(n) /= divisor;
        }
        out
    }
}

impl AddAssign<&Nutrients> for Nutrients {
    fn add_assign(&mut self, rhs: &Nutrients) {
        for n in Nutrient::ALL {
            *self.get_mut(n) += rhs.get(n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_serde_names() {
        for n in Nutrient::ALL {
            let json = serde_json::to_value(n).unwrap();
            assert_eq!(json, n.key());
        }
    }

    #[test]
    fn api_names_resolve_case_insensitively() {
        assert_eq!(Nutrient::from_api_name("Vitamin B12"), Some(Nutrient::VitaminB12));
        assert_eq!(Nutrient::from_api_name("carbohydrates"), Some(Nutrient::Carbohydrates));
        assert_eq!(Nutrient::from_api_name("Net Carbohydrates"), None);
    }

    #[test]
    fn limit_nutrients() {
        let limits: Vec<_> = Nutrient::ALL.into_iter().filter(|n| n.is_limit()).collect();
        assert_eq!(
            limits,
            vec![Nutrient::Sugar, Nutrient::Sodium, Nutrient::Cholesterol]
        );
    }

    #[test]
    fn amounts_convert_to_tracked_units() {
        assert_eq!(Nutrient::VitaminA.normalize_amount(5000.0, "IU"), Some(1500.0));
        assert_eq!(Nutrient::VitaminD.normalize_amount(400.0, "IU"), Some(10.0));
        assert_eq!(Nutrient::VitaminB12.normalize_amount(2.4, "mcg"), Some(2.4));
        assert_eq!(Nutrient::Sodium.normalize_amount(1.5, "g"), Some(1500.0));
        assert_eq!(Nutrient::Calories.normalize_amount(250.0, "kcal"), Some(250.0));
        assert_eq!(Nutrient::Iron.normalize_amount(3.0, "IU"), None);
        assert_eq!(Nutrient::Protein.normalize_amount(3.0, "oz"), None);
        assert_eq!(Nutrient::Calories.normalize_amount(3.0, "g"), None);
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let n: Nutrients = serde_json::from_str(r#"{"calories": 120, "zinc": 1.5}"#).unwrap();
        assert_eq!(n.calories, 120.0);
        assert_eq!(n.zinc, 1.5);
        assert_eq!(n.protein, 0.0);
    }

    #[test]
    fn add_and_divide() {
        let mut total = Nutrients::default();
        let a = Nutrients {
            protein: 10.0,
            iron: 2.0,
            ..Default::default()
        };
        total += &a;
        total += &a;
        assert_eq!(total.protein, 20.0);
        assert_eq!(total.divided(2.0).iron, 2.0);
        assert_eq!(total.values()[1], 20.0);
    }
}
