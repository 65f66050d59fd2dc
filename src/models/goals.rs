//! Goal model
//!
//! Fixed daily targets used as denominators for every percentage and
//! adherence computation in the engine.

use serde::Serialize;

/// Daily targets
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Goals {
    /// grams
    pub protein: f64,
    /// kilocalories
    pub kcal: f64,
    /// milliliters
    pub water: f64,
}

impl Goals {
    /// The standard bulking targets
    pub fn standard() -> Self {
        Self {
            protein: 235.0,
            kcal: 3350.0,
            water: 3000.0,
        }
    }

    pub fn protein_fraction(&self, value: f64) -> f64 {
        fraction(value, self.protein)
    }

    pub fn kcal_fraction(&self, value: f64) -> f64 {
        fraction(value, self.kcal)
    }

    pub fn water_fraction(&self, value: f64) -> f64 {
        fraction(value, self.water)
    }
}

impl Default for Goals {
    fn default() -> Self {
        Self::standard()
    }
}

/// Fraction of a goal, guarding the zero/negative denominator by reporting 0
pub fn fraction(value: f64, goal: f64) -> f64 {
    if goal <= 0.0 {
        0.0
    } else {
        value / goal
    }
}

/// Percentage of a goal, rounded to whole percent, zero-guarded
pub fn percent(value: f64, goal: f64) -> f64 {
    (fraction(value, goal) * 100.0).round()
}
