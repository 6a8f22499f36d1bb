//! Profile, memory, daily log and performance storage
//!
//! Components take a `Store` at construction instead of reaching for a
//! process-wide singleton. Calls are synchronous; the host serializes writes
//! per user.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{DailyLog, LogPatch, Memory, MemoryPatch, PerformanceRecord, Profile};

pub trait Store {
  fn profile(&self) -> &Profile;

  /// Explicit profile update. Decision logic never calls this.
  fn set_profile(&mut self, profile: Profile);

  /// Today's log, created empty on first access
  fn today_log(&mut self, date: NaiveDate) -> &DailyLog;

  fn append_log(&mut self, date: NaiveDate, patch: LogPatch);

  fn memory(&self) -> &Memory;

  fn mutate_memory(&mut self, patch: MemoryPatch);

  /// Oldest first
  fn performance_history(&self, exercise: &str) -> Vec<PerformanceRecord>;

  fn append_performance(&mut self, record: PerformanceRecord);

  /// Most recent date, not after `on_or_before`, with a completed workout
  fn last_workout_date(&self, on_or_before: NaiveDate) -> Option<NaiveDate>;

  /// Logs in `(until - days, until]` that exist, oldest first
  fn recent_logs(&self, until: NaiveDate, days: u32) -> Vec<DailyLog>;
}

impl<T: Store + ?Sized> Store for &mut T {
  fn profile(&self) -> &Profile {
    (**self).profile()
  }

  fn set_profile(&mut self, profile: Profile) {
    (**self).set_profile(profile)
  }

  fn today_log(&mut self, date: NaiveDate) -> &DailyLog {
    (**self).today_log(date)
  }

  fn append_log(&mut self, date: NaiveDate, patch: LogPatch) {
    (**self).append_log(date, patch)
  }

  fn memory(&self) -> &Memory {
    (**self).memory()
  }

  fn mutate_memory(&mut self, patch: MemoryPatch) {
    (**self).mutate_memory(patch)
  }

  fn performance_history(&self, exercise: &str) -> Vec<PerformanceRecord> {
    (**self).performance_history(exercise)
  }

  fn append_performance(&mut self, record: PerformanceRecord) {
    (**self).append_performance(record)
  }

  fn last_workout_date(&self, on_or_before: NaiveDate) -> Option<NaiveDate> {
    (**self).last_workout_date(on_or_before)
  }

  fn recent_logs(&self, until: NaiveDate, days: u32) -> Vec<DailyLog> {
    (**self).recent_logs(until, days)
  }
}

/// ---------------------------------------------------------------------------
/// In-memory store
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InMemoryStore {
  pub profile: Profile,
  pub memory: Memory,
  pub logs: BTreeMap<NaiveDate, DailyLog>,
  pub performance: Vec<PerformanceRecord>,
}

impl InMemoryStore {
  pub fn new(profile: Profile) -> Self {
    Self {
      profile,
      ..Default::default()
    }
  }

  fn log_mut(&mut self, date: NaiveDate) -> &mut DailyLog {
    self.logs.entry(date).or_insert_with(|| {
      debug!(%date, "Creating daily log");
      DailyLog::empty(date)
    })
  }
}

impl Store for InMemoryStore {
  fn profile(&self) -> &Profile {
    &self.profile
  }

  fn set_profile(&mut self, profile: Profile) {
    self.profile = profile;
  }

  fn today_log(&mut self, date: NaiveDate) -> &DailyLog {
    self.log_mut(date)
  }

  fn append_log(&mut self, date: NaiveDate, patch: LogPatch) {
    self.log_mut(date).apply(patch);
  }

  fn memory(&self) -> &Memory {
    &self.memory
  }

  fn mutate_memory(&mut self, patch: MemoryPatch) {
    self.memory.apply(patch);
  }

  fn performance_history(&self, exercise: &str) -> Vec<PerformanceRecord> {
    let mut history: Vec<PerformanceRecord> = self
      .performance
      .iter()
      .filter(|r| r.exercise_name.eq_ignore_ascii_case(exercise))
      .cloned()
      .collect();
    // Stable: same-day records keep insertion order
    history.sort_by_key(|r| r.date);
    history
  }

  fn append_performance(&mut self, record: PerformanceRecord) {
    self.performance.push(record);
  }

  fn last_workout_date(&self, on_or_before: NaiveDate) -> Option<NaiveDate> {
    self
      .logs
      .range(..=on_or_before)
      .rev()
      .find(|(_, log)| log.workout_completed())
      .map(|(date, _)| *date)
  }

  fn recent_logs(&self, until: NaiveDate, days: u32) -> Vec<DailyLog> {
    let from = until - Duration::days(i64::from(days));
    self
      .logs
      .range(from..=until)
      .filter(|(date, _)| **date > from)
      .map(|(_, log)| log.clone())
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{SleepQuality, WorkoutRecord};
  use crate::test_utils::*;

  #[test]
  fn test_today_log_is_created_lazily_and_unique() {
    let mut store = InMemoryStore::default();
    let date = test_date();

    assert!(store.logs.is_empty());
    assert_eq!(store.today_log(date).date, date);
    store.append_log(date, LogPatch::Sleep(SleepQuality::Well));
    store.today_log(date);

    assert_eq!(store.logs.len(), 1);
    assert_eq!(store.logs[&date].sleep, Some(SleepQuality::Well));
  }

  #[test]
  fn test_last_workout_date_skips_incomplete() {
    let mut store = InMemoryStore::default();
    let today = test_date();
    let three_days_ago = today - Duration::days(3);
    let yesterday = today - Duration::days(1);

    store.append_log(
      three_days_ago,
      LogPatch::Workout(WorkoutRecord {
        workout_type: "Strength".to_string(),
        duration_minutes: 45,
        completed: true,
      }),
    );
    store.append_log(
      yesterday,
      LogPatch::Workout(WorkoutRecord {
        workout_type: "Strength".to_string(),
        duration_minutes: 10,
        completed: false,
      }),
    );

    assert_eq!(store.last_workout_date(today), Some(three_days_ago));
    assert_eq!(store.last_workout_date(three_days_ago - Duration::days(1)), None);
  }

  #[test]
  fn test_performance_history_is_per_exercise_and_ordered() {
    let mut store = InMemoryStore::default();
    let today = test_date();
    store.append_performance(create_test_record("Squat", 60.0, 8, today, true));
    store.append_performance(create_test_record("Bench Press", 40.0, 8, today, true));
    store.append_performance(create_test_record(
      "Squat",
      55.0,
      8,
      today - Duration::days(7),
      true,
    ));

    let history = store.performance_history("squat");

    assert_eq!(history.len(), 2);
    assert_approx_eq!(history[0].weight, 55.0);
    assert_approx_eq!(history[1].weight, 60.0);
  }

  #[test]
  fn test_recent_logs_window() {
    let mut store = InMemoryStore::default();
    let today = test_date();
    for offset in 0..10 {
      store.today_log(today - Duration::days(offset));
    }

    let logs = store.recent_logs(today, 7);

    assert_eq!(logs.len(), 7);
    assert_eq!(logs.first().map(|l| l.date), Some(today - Duration::days(6)));
    assert_eq!(logs.last().map(|l| l.date), Some(today));
  }

  #[test]
  fn test_mutable_reference_is_a_store() {
    fn hydrate<S: Store>(mut store: S, date: NaiveDate) {
      store.append_log(date, LogPatch::AddHydration(3));
    }

    let mut store = InMemoryStore::default();
    hydrate(&mut store, test_date());

    assert_eq!(store.logs[&test_date()].hydration, 3);
  }
}
