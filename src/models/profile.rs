use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
  WeightLoss,
  MuscleGain,
  Endurance,
  #[default]
  GeneralFitness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
  #[default]
  Beginner,
  Intermediate,
  Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
  Sedentary,
  #[default]
  Light,
  Moderate,
  Active,
  VeryActive,
}

/// Identity and physical attributes. The decision logic only reads this;
/// changes go through `Store::set_profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
  pub name: String,
  pub age: Option<u8>,
  pub weight_kg: Option<f64>,
  pub height_cm: Option<f64>,
  #[serde(default)]
  pub goal: Goal,
  #[serde(default)]
  pub experience: ExperienceLevel,
  #[serde(default)]
  pub activity_level: ActivityLevel,
  /// Free text, passed through to providers untouched
  pub medical_notes: Option<String>,
}

impl Default for Profile {
  fn default() -> Self {
    Self {
      name: "User".to_string(),
      age: None,
      weight_kg: None,
      height_cm: None,
      goal: Goal::default(),
      experience: ExperienceLevel::default(),
      activity_level: ActivityLevel::default(),
      medical_notes: None,
    }
  }
}
