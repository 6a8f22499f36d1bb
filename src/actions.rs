//! Host -> core action protocol
//!
//! The host turns a rendered card into one of these actions and hands it back.
//! Each action answers exactly one card kind and becomes writes against the
//! store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{
  CardKind, InjuryWatch, LogPatch, Meal, MemoryPatch, Motivation, PainReport, PerformanceRecord,
  SleepQuality, StressLevel, WorkoutRecord,
};
use crate::progression::ProgressiveOverload;
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum CardAction {
  LogSleep(SleepQuality),
  LogMotivation(Motivation),
  LogStress(StressLevel),
  LogPain(PainReport),
  LogHydration { glasses: u32 },
  LogMeal { meal: Meal, eaten: bool },
  CompleteWorkout {
    record: WorkoutRecord,
    #[serde(default)]
    performances: Vec<PerformanceRecord>,
  },
  /// "I love this one" on a planned exercise
  LoveExercise { exercise: String },
}

impl CardAction {
  pub fn answers(&self) -> CardKind {
    match self {
      CardAction::LogSleep(_) => CardKind::SleepCheck,
      CardAction::LogMotivation(_) => CardKind::MotivationCheck,
      CardAction::LogStress(_) => CardKind::StressCheck,
      CardAction::LogPain(_) => CardKind::PainCheck,
      CardAction::LogHydration { .. } => CardKind::HydrationPrompt,
      CardAction::LogMeal { .. } => CardKind::MealCheck,
      CardAction::CompleteWorkout { .. } | CardAction::LoveExercise { .. } => CardKind::WorkoutPlan,
    }
  }

  /// Persist the user's response for `date`
  pub fn apply<S: Store>(self, store: &mut S, date: NaiveDate) {
    debug!(%date, kind = ?self.answers(), "Applying card action");

    match self {
      CardAction::LogSleep(quality) => store.append_log(date, LogPatch::Sleep(quality)),
      CardAction::LogMotivation(level) => store.append_log(date, LogPatch::Motivation(level)),
      CardAction::LogStress(level) => store.append_log(date, LogPatch::Stress(level)),
      CardAction::LogPain(report) => {
        // Moderate and severe pain stays on the injury watch
        for area in report.active_areas().iter().filter(|a| a.severity.is_serious()) {
          store.mutate_memory(MemoryPatch::WatchInjury(InjuryWatch {
            location: area.location,
            severity: area.severity,
            recorded_on: date,
          }));
        }
        store.append_log(date, LogPatch::Pain(report));
      }
      CardAction::LogHydration { glasses } => store.append_log(date, LogPatch::AddHydration(glasses)),
      CardAction::LogMeal { meal, eaten } => store.append_log(date, LogPatch::Meal { meal, eaten }),
      CardAction::CompleteWorkout {
        record,
        performances,
      } => {
        store.append_log(date, LogPatch::Workout(record));
        let mut engine = ProgressiveOverload::new(store);
        for performance in performances {
          engine.record_performance(performance);
        }
      }
      CardAction::LoveExercise { exercise } => {
        store.mutate_memory(MemoryPatch::AddLoved { exercise });
      }
    }
  }
}
