use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStyle {
  #[default]
  Strength,
  Hypertrophy,
}

impl TrainingStyle {
  pub fn toggled(&self) -> Self {
    match self {
      TrainingStyle::Strength => TrainingStyle::Hypertrophy,
      TrainingStyle::Hypertrophy => TrainingStyle::Strength,
    }
  }
}

/// One logged set-block for an exercise. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
  pub exercise_name: String,
  /// kg
  pub weight: f64,
  pub reps: u32,
  pub sets: u32,
  /// 1-10
  pub rpe: u8,
  pub completed: bool,
  pub date: NaiveDate,
  #[serde(default)]
  pub training_style: TrainingStyle,
}

impl PerformanceRecord {
  /// Failed, or close enough to failure to count against progression
  pub fn is_struggle(&self) -> bool {
    !self.completed || self.rpe >= 9
  }
}
