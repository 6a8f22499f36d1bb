//! Weekday psychological patterns
//!
//! Advisory only: the result is stored in Memory and handed to plan
//! generation, never used to gate a card.

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::info;

use crate::models::{DailyLog, MemoryPatch, Motivation, PsychPattern};
use crate::store::Store;

/// Samples needed on a weekday before it can carry a pattern
const MIN_SAMPLES: u32 = 3;
const PATTERN_RATE: f64 = 0.6;
/// History considered by `refresh_patterns`
pub const PATTERN_WINDOW_DAYS: u32 = 56;

const WEEK: [Weekday; 7] = [
  Weekday::Sun,
  Weekday::Mon,
  Weekday::Tue,
  Weekday::Wed,
  Weekday::Thu,
  Weekday::Fri,
  Weekday::Sat,
];

fn day_name(day: Weekday) -> &'static str {
  match day {
    Weekday::Mon => "Monday",
    Weekday::Tue => "Tuesday",
    Weekday::Wed => "Wednesday",
    Weekday::Thu => "Thursday",
    Weekday::Fri => "Friday",
    Weekday::Sat => "Saturday",
    Weekday::Sun => "Sunday",
  }
}

#[derive(Debug, Default, Clone, Copy)]
struct DayStats {
  motivation_logged: u32,
  low_motivation: u32,
  stress_logged: u32,
  high_stress: u32,
}

fn rate_hits(hits: u32, total: u32) -> bool {
  total >= MIN_SAMPLES && f64::from(hits) / f64::from(total) >= PATTERN_RATE
}

/// Sunday first; motivation before stress within a day
pub fn detect_patterns(logs: &[DailyLog]) -> Vec<PsychPattern> {
  let mut stats = [DayStats::default(); 7];

  for log in logs {
    let day = &mut stats[log.date.weekday().num_days_from_sunday() as usize];
    if let Some(motivation) = log.motivation {
      day.motivation_logged += 1;
      if motivation == Motivation::Low {
        day.low_motivation += 1;
      }
    }
    if let Some(stress) = log.stress {
      day.stress_logged += 1;
      if stress.is_high() {
        day.high_stress += 1;
      }
    }
  }

  let mut patterns = Vec::new();
  for (weekday, day) in WEEK.iter().zip(stats.iter()) {
    let name = day_name(*weekday);

    if rate_hits(day.low_motivation, day.motivation_logged) {
      patterns.push(PsychPattern {
        pattern: format!("Low motivation on {}s", name),
        frequency: day.low_motivation,
        recommendation: format!("Schedule active recovery or rest on {}s", name),
      });
    }

    if rate_hits(day.high_stress, day.stress_logged) {
      patterns.push(PsychPattern {
        pattern: format!("High stress on {}s", name),
        frequency: day.high_stress,
        recommendation: format!("Avoid HIIT on {}s, prefer yoga or gentle cardio", name),
      });
    }
  }

  patterns
}

/// Recompute patterns over the trailing window and replace Memory's copy
pub fn refresh_patterns<S: Store>(store: &mut S, today: NaiveDate) -> Vec<PsychPattern> {
  let logs = store.recent_logs(today, PATTERN_WINDOW_DAYS);
  let patterns = detect_patterns(&logs);

  info!(count = patterns.len(), "Psychological patterns refreshed");
  store.mutate_memory(MemoryPatch::ReplacePatterns(patterns.clone()));
  patterns
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{LogPatch, StressLevel};
  use crate::store::InMemoryStore;
  use chrono::Duration;

  /// 2025-03-03 is a Monday
  fn monday(week: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap() + Duration::weeks(week)
  }

  fn log(date: NaiveDate, motivation: Option<Motivation>, stress: Option<u8>) -> DailyLog {
    let mut log = DailyLog::empty(date);
    if let Some(m) = motivation {
      log.apply(LogPatch::Motivation(m));
    }
    if let Some(s) = stress.and_then(StressLevel::new) {
      log.apply(LogPatch::Stress(s));
    }
    log
  }

  #[test]
  fn test_low_motivation_pattern_on_mondays() {
    // Arrange: 2 of 3 Mondays low = 67%
    let logs = vec![
      log(monday(0), Some(Motivation::Low), None),
      log(monday(1), Some(Motivation::Low), None),
      log(monday(2), Some(Motivation::High), None),
    ];

    // Act
    let patterns = detect_patterns(&logs);

    // Assert
    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0].pattern, "Low motivation on Mondays");
    assert_eq!(patterns[0].frequency, 2);
    assert_eq!(patterns[0].recommendation, "Schedule active recovery or rest on Mondays");
  }

  #[test]
  fn test_needs_three_samples() {
    let logs = vec![
      log(monday(0), Some(Motivation::Low), Some(5)),
      log(monday(1), Some(Motivation::Low), Some(5)),
    ];

    assert!(detect_patterns(&logs).is_empty());
  }

  #[test]
  fn test_below_rate_is_not_a_pattern() {
    // 2 of 4 = 50%
    let logs: Vec<DailyLog> = (0..4)
      .map(|w| {
        let stress = if w < 2 { 4 } else { 2 };
        log(monday(w), None, Some(stress))
      })
      .collect();

    assert!(detect_patterns(&logs).is_empty());
  }

  #[test]
  fn test_stress_pattern_uses_stress_samples() {
    // Fridays: stress logged three times, motivation never
    let friday = |w| monday(w) + Duration::days(4);
    let logs = vec![
      log(friday(0), None, Some(4)),
      log(friday(1), None, Some(5)),
      log(friday(2), None, Some(4)),
    ];

    let patterns = detect_patterns(&logs);

    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0].pattern, "High stress on Fridays");
    assert_eq!(patterns[0].frequency, 3);
  }

  #[test]
  fn test_refresh_replaces_memory_patterns() {
    let mut store = InMemoryStore::default();
    for w in 0..3 {
      store.append_log(monday(w), LogPatch::Motivation(Motivation::Low));
    }

    let patterns = refresh_patterns(&mut store, monday(2));

    assert_eq!(patterns.len(), 1);
    assert_eq!(store.memory.psychological_patterns, patterns);

    // Window has moved past all samples
    let later = monday(2) + Duration::days(i64::from(PATTERN_WINDOW_DAYS) + 14);
    assert!(refresh_patterns(&mut store, later).is_empty());
    assert!(store.memory.psychological_patterns.is_empty());
  }
}
