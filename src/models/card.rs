use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::actions::CardAction;
use crate::llm::WorkoutPlan;
use crate::models::daily_log::{BodyLocation, PainSeverity};
use crate::readiness::ReadinessReport;

/// ---------------------------------------------------------------------------
/// Time context
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
  Morning,
  Afternoon,
  Evening,
  Night,
}

impl TimePeriod {
  /// Boundaries: 6 / 12 / 18 / 22
  pub fn from_hour(hour: u32) -> Self {
    match hour {
      6..=11 => TimePeriod::Morning,
      12..=17 => TimePeriod::Afternoon,
      18..=21 => TimePeriod::Evening,
      _ => TimePeriod::Night,
    }
  }

  pub fn suggested_intensity(&self) -> Intensity {
    match self {
      TimePeriod::Morning | TimePeriod::Afternoon => Intensity::High,
      TimePeriod::Evening => Intensity::Moderate,
      TimePeriod::Night => Intensity::Low,
    }
  }

  pub fn greeting(&self) -> &'static str {
    match self {
      TimePeriod::Morning => "Morning",
      TimePeriod::Afternoon => "Afternoon",
      TimePeriod::Evening | TimePeriod::Night => "Evening",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
  Low,
  #[serde(alias = "medium")]
  Moderate,
  #[serde(rename = "moderate-high")]
  ModerateHigh,
  High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeContext {
  pub period: TimePeriod,
  pub hour: u32,
  pub date: NaiveDate,
  /// A suggestion, not a rule
  pub suggested_intensity: Intensity,
}

/// ---------------------------------------------------------------------------
/// Content unit
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
  SleepCheck,
  MotivationCheck,
  StressCheck,
  PainCheck,
  HydrationPrompt,
  WorkoutPlan,
  MealCheck,
  DaySummary,
}

/// What the host renders for one decision cycle. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentUnit {
  pub kind: CardKind,
  pub payload: CardPayload,
  pub time_context: TimeContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CardPayload {
  Check(CheckPrompt),
  Workout(Box<WorkoutCard>),
  Summary(DaySummary),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckPrompt {
  pub title: String,
  pub question: String,
  pub options: ResponseOptions,
  pub reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum ResponseOptions {
  /// Fixed choices, each carrying the action the host sends back
  Choice { choices: Vec<Choice> },
  PainSelector {
    locations: Vec<BodyLocation>,
    severities: Vec<PainSeverity>,
  },
  Stepper { current: u32, goal: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
  pub label: String,
  pub action: CardAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutCard {
  pub title: String,
  pub plan: WorkoutPlan,
  pub can_regenerate: bool,
  /// Pain filter removed more than half of the plan
  pub needs_regeneration: bool,
  pub warning: Option<String>,
  pub modification_note: Option<String>,
  pub removed_exercises: Vec<String>,
  /// Provider chain failed or timed out; `plan` is the fixed fallback
  pub degraded: bool,
  pub readiness: ReadinessReport,
  pub reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
  pub title: String,
  pub insight: String,
  pub stats: DayStats,
  pub tomorrow_focus: String,
  pub tomorrow_detail: String,
  pub reasoning: String,
  /// Insight provider failed or timed out; focus and detail are computed locally
  pub degraded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStats {
  pub workouts_completed: u32,
  pub meals_logged: u32,
  pub hydration_glasses: u32,
  pub hydration_goal: u32,
  pub readiness_score: u8,
}
