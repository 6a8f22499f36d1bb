//! Proactive nudges
//!
//! Checks today's state against a fixed list of triggers and returns at most
//! one message, highest priority first. Pure: the caller gathers the inputs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{DailyLog, Memory, Motivation, ProgressionStatus, SleepQuality};

/// Afternoon window (inclusive start, exclusive end) for the hydration nudge
const HYDRATION_WINDOW: (u32, u32) = (14, 18);
const HYDRATION_NUDGE_BELOW: u32 = 4;
const INACTIVE_DAYS: i64 = 3;
const HIGH_STRESS: u8 = 4;
/// Logged workouts before a streak is worth celebrating
const CELEBRATION_MIN_WORKOUTS: u32 = 10;
const CELEBRATION_STREAK: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
  PoorSleep,
  LowMotivation,
  HighStress,
  LowHydration,
  WorkoutSkipped,
  PlateauDetected,
  ProgressCelebration,
}

impl Trigger {
  /// Suggested reply button for the host
  pub fn recommended_response(&self) -> &'static str {
    match self {
      Trigger::PoorSleep => "Switch to active recovery",
      Trigger::LowMotivation => "Take today off",
      Trigger::HighStress => "Do gentle yoga",
      Trigger::LowHydration => "Set reminder",
      Trigger::WorkoutSkipped => "Tell me what's up",
      Trigger::PlateauDetected => "Try variation",
      Trigger::ProgressCelebration => "Thanks!",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
  Low,
  Medium,
  High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProactiveMessage {
  pub trigger: Trigger,
  pub message: String,
  pub suggested_action: String,
  pub priority: Priority,
  /// Exercises behind a plateau nudge
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub exercises: Vec<String>,
}

impl ProactiveMessage {
  fn new(trigger: Trigger, message: String, suggested_action: &str, priority: Priority) -> Self {
    Self {
      trigger,
      message,
      suggested_action: suggested_action.to_string(),
      priority,
      exercises: Vec::new(),
    }
  }
}

/// Workout history summarised from recent daily logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkoutHistory {
  pub last_workout: Option<NaiveDate>,
  pub logged: u32,
  /// Completed workouts in a row, counting back from the latest
  pub completed_streak: u32,
}

impl WorkoutHistory {
  /// `logs` oldest first, as `Store::recent_logs` returns them
  pub fn from_logs(logs: &[DailyLog]) -> Self {
    let records: Vec<(NaiveDate, bool)> = logs
      .iter()
      .flat_map(|log| log.workouts.iter().map(move |w| (log.date, w.completed)))
      .collect();

    Self {
      last_workout: records.iter().rev().find(|(_, done)| *done).map(|(d, _)| *d),
      logged: records.len() as u32,
      completed_streak: records.iter().rev().take_while(|(_, done)| *done).count() as u32,
    }
  }
}

/// First matching trigger for `log`, or `None` when nothing needs saying
pub fn check_triggers(
  log: &DailyLog,
  memory: &Memory,
  history: &WorkoutHistory,
  hour: u32,
) -> Option<ProactiveMessage> {
  if let Some(quality @ (SleepQuality::Poor | SleepQuality::VeryPoor)) = log.sleep {
    return Some(ProactiveMessage::new(
      Trigger::PoorSleep,
      format!(
        "I see you logged \"{}\" sleep. I've adjusted today's workout to focus on active recovery. Rest is progress too!",
        quality.label()
      ),
      "view_recovery_workout",
      Priority::High,
    ));
  }

  if log.motivation == Some(Motivation::Low) {
    return Some(ProactiveMessage::new(
      Trigger::LowMotivation,
      "Not feeling it today? That's totally okay. Want to take a rest day or do something super light?"
        .to_string(),
      "suggest_rest_or_light",
      Priority::High,
    ));
  }

  if log.stress.is_some_and(|s| s.value() >= HIGH_STRESS) {
    return Some(ProactiveMessage::new(
      Trigger::HighStress,
      "You seem stressed today. How about some calming yoga or a gentle walk instead of high intensity?"
        .to_string(),
      "switch_to_yoga",
      Priority::High,
    ));
  }

  if (HYDRATION_WINDOW.0..HYDRATION_WINDOW.1).contains(&hour)
    && log.hydration < HYDRATION_NUDGE_BELOW
  {
    return Some(ProactiveMessage::new(
      Trigger::LowHydration,
      format!(
        "You've only had {} glasses of water today. Want a reminder to drink more?",
        log.hydration
      ),
      "set_hydration_reminder",
      Priority::Medium,
    ));
  }

  if let Some(last) = history.last_workout {
    let days = (log.date - last).num_days();
    if days >= INACTIVE_DAYS {
      return Some(ProactiveMessage::new(
        Trigger::WorkoutSkipped,
        format!(
          "I noticed you haven't worked out in {} days. Everything okay? I can adjust your plan.",
          days
        ),
        "adjust_plan",
        Priority::Medium,
      ));
    }
  }

  let struggling: Vec<String> = memory
    .progression_status
    .iter()
    .filter(|(_, status)| **status == ProgressionStatus::Struggling)
    .map(|(exercise, _)| exercise.clone())
    .collect();
  if let Some(first) = struggling.first() {
    let mut message = ProactiveMessage::new(
      Trigger::PlateauDetected,
      format!(
        "I've noticed you're plateauing on {}. Want to try a different training approach or swap to a variation?",
        first
      ),
      "suggest_variation",
      Priority::Low,
    );
    message.exercises = struggling;
    return Some(message);
  }

  if history.logged >= CELEBRATION_MIN_WORKOUTS && history.completed_streak >= CELEBRATION_STREAK {
    return Some(ProactiveMessage::new(
      Trigger::ProgressCelebration,
      format!(
        "You've completed {} workouts in a row! That's amazing consistency.",
        history.completed_streak
      ),
      "view_progress",
      Priority::Low,
    ));
  }

  None
}
