//! BMI and a rough muscle mass estimate from weight and height.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LauvitError, Result};

/// Share of body weight assumed to be muscle when no measurement is given.
pub const ESTIMATED_MUSCLE_RATIO: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    #[serde(rename = "Normal weight")]
    NormalWeight,
    Overweight,
    Obesity,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 24.9 {
            BmiCategory::NormalWeight
        } else if bmi < 29.9 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obesity
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::NormalWeight => "Normal weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obesity => "Obesity",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyMetrics {
    pub weight_kg: f64,
    pub height_cm: f64,
    #[serde(default)]
    pub muscle_mass_kg: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyAnalysis {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi: f64,
    pub category: BmiCategory,
    pub muscle_mass_kg: f64,
    pub muscle_mass_estimated: bool,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(LauvitError::validation(format!(
            "{name} must be positive, got {value}"
        )));
    }
    Ok(())
}

impl BodyMetrics {
    pub fn analyze(&self) -> Result<BodyAnalysis> {
        require_positive("weight", self.weight_kg)?;
        require_positive("height", self.height_cm)?;
        if let Some(muscle) = self.muscle_mass_kg {
            require_positive("muscle mass", muscle)?;
        }

        let height_m = self.height_cm / 100.0;
        let bmi = round2(self.weight_kg / (height_m * height_m));
        let (muscle_mass_kg, muscle_mass_estimated) = match self.muscle_mass_kg {
            Some(measured) => (measured, false),
            None => (round2(self.weight_kg * ESTIMATED_MUSCLE_RATIO), true),
        };

        Ok(BodyAnalysis {
            weight_kg: self.weight_kg,
            height_cm: self.height_cm,
            bmi,
            category: BmiCategory::from_bmi(bmi),
            muscle_mass_kg,
            muscle_mass_estimated,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyCompositionRecord {
    pub id: String,
    pub date: DateTime<Utc>,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi: f64,
    pub muscle_mass_kg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BodyCompositionRecord {
    pub fn category(&self) -> BmiCategory {
        BmiCategory::from_bmi(self.bmi)
    }
}
