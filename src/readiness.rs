//! Readiness (recovery) scoring
//!
//! Base 50, plus sleep, hydration and nutrition. Low motivation or high stress
//! caps the running score at 40 and returns before any other term is added.
//! Otherwise psychological points, pain deductions, a biometric penalty and a
//! rest bonus follow. The result is clamped to 0-100 and rounded.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{DailyLog, Intensity, Motivation, PainSeverity, SleepQuality, HYDRATION_GOAL};

/// ---------------------------------------------------------------------------
/// Constants
/// ---------------------------------------------------------------------------

const BASE_SCORE: f64 = 50.0;
const ABSENT_SLEEP_POINTS: f64 = 15.0;
const MAX_HYDRATION_POINTS: f64 = 15.0;
const MAX_NUTRITION_POINTS: f64 = 10.0;
const MEALS_PER_DAY: f64 = 3.0;
const OVERRIDE_CAP: f64 = 40.0;
const SYSTEMIC_STRESS_PENALTY: f64 = 15.0;
const MAX_REST_BONUS: f64 = 10.0;
const REST_BONUS_PER_DAY: f64 = 3.0;

/// bpm above baseline before resting HR counts as elevated
const RHR_ELEVATION_BPM: f64 = 5.0;
/// % below baseline before HRV counts as lowered
const HRV_DECREASE_PCT: f64 = 15.0;

fn sleep_points(sleep: Option<SleepQuality>) -> f64 {
  match sleep {
    None => ABSENT_SLEEP_POINTS,
    Some(SleepQuality::VeryPoor) => 0.0,
    Some(SleepQuality::Poor) => 10.0,
    Some(SleepQuality::Neutral) => 18.0,
    Some(SleepQuality::Well) => 25.0,
    Some(SleepQuality::VeryWell) => 30.0,
  }
}

fn motivation_points(motivation: Motivation) -> f64 {
  match motivation {
    Motivation::High => 15.0,
    Motivation::Neutral => 8.0,
    Motivation::Low => 0.0,
  }
}

fn stress_points(level: u8) -> f64 {
  match level {
    1 => 10.0,
    2 => 8.0,
    3 => 5.0,
    4 => 2.0,
    _ => 0.0,
  }
}

fn pain_deduction(severity: PainSeverity) -> f64 {
  match severity {
    PainSeverity::Severe => 20.0,
    PainSeverity::Moderate => 12.0,
    PainSeverity::Mild => 5.0,
  }
}

/// ---------------------------------------------------------------------------
/// Biometrics
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiometricBaseline {
  pub avg_resting_hr: Option<f64>,
  pub avg_hrv: Option<f64>,
}

/// Passive readings with a caller-supplied 7-day baseline
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiometricSnapshot {
  pub resting_hr: Option<f64>,
  pub hrv: Option<f64>,
  pub baseline: BiometricBaseline,
}

impl BiometricSnapshot {
  pub fn rhr_elevated(&self) -> bool {
    match (self.resting_hr, self.baseline.avg_resting_hr) {
      (Some(rhr), Some(avg)) if avg > 0.0 => rhr > avg + RHR_ELEVATION_BPM,
      _ => false,
    }
  }

  pub fn hrv_lowered(&self) -> bool {
    match (self.hrv, self.baseline.avg_hrv) {
      (Some(hrv), Some(avg)) if avg > 0.0 => (avg - hrv) / avg * 100.0 > HRV_DECREASE_PCT,
      _ => false,
    }
  }

  pub fn systemic_stress(&self) -> bool {
    self.rhr_elevated() || self.hrv_lowered()
  }
}

/// ---------------------------------------------------------------------------
/// Report
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessCategory {
  Excellent,
  Good,
  Moderate,
  Poor,
}

impl ReadinessCategory {
  pub fn from_score(score: u8) -> Self {
    match score {
      80.. => ReadinessCategory::Excellent,
      60..=79 => ReadinessCategory::Good,
      40..=59 => ReadinessCategory::Moderate,
      _ => ReadinessCategory::Poor,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
  /// Psychological override fired
  Recovery,
  Excellent,
  Good,
  Moderate,
  Poor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessRecommendation {
  pub kind: RecommendationKind,
  pub message: String,
  pub suggested_intensity: Intensity,
  pub activities: Vec<String>,
}

impl ReadinessRecommendation {
  fn new(
    kind: RecommendationKind,
    message: &str,
    suggested_intensity: Intensity,
    activities: &[&str],
  ) -> Self {
    Self {
      kind,
      message: message.to_string(),
      suggested_intensity,
      activities: activities.iter().map(|a| a.to_string()).collect(),
    }
  }

  pub fn for_report(score: u8, recovery_mode: bool) -> Self {
    if recovery_mode {
      return Self::new(
        RecommendationKind::Recovery,
        "Your mental state needs rest today",
        Intensity::Low,
        &["Gentle Yoga", "Walking", "Stretching", "Active Recovery"],
      );
    }

    match ReadinessCategory::from_score(score) {
      ReadinessCategory::Excellent => Self::new(
        RecommendationKind::Excellent,
        "You're fully recovered and ready for intense training",
        Intensity::High,
        &["HIIT", "Heavy Strength Training", "Power Workouts"],
      ),
      ReadinessCategory::Good => Self::new(
        RecommendationKind::Good,
        "Good recovery - moderate to high intensity is suitable",
        Intensity::ModerateHigh,
        &["Strength Training", "Moderate Cardio", "Skill Work"],
      ),
      ReadinessCategory::Moderate => Self::new(
        RecommendationKind::Moderate,
        "Moderate recovery - stick to lighter workouts",
        Intensity::Moderate,
        &["Light Cardio", "Bodyweight Exercises", "Technique Work"],
      ),
      ReadinessCategory::Poor => Self::new(
        RecommendationKind::Poor,
        "Low recovery - prioritize rest and recovery",
        Intensity::Low,
        &["Rest Day", "Gentle Stretching", "Walking", "Mobility Work"],
      ),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessReport {
  /// 0-100
  pub score: u8,
  pub category: ReadinessCategory,
  /// Low motivation or high stress forced the cap
  pub recovery_mode: bool,
  pub systemic_stress: bool,
  pub recommendation: ReadinessRecommendation,
}

/// ---------------------------------------------------------------------------
/// Scoring
/// ---------------------------------------------------------------------------

fn finish(score: f64) -> u8 {
  score.clamp(0.0, 100.0).round() as u8
}

/// Deterministic: identical inputs always give an identical report.
///
/// `last_workout` is the most recent day with a completed workout; the rest
/// bonus applies when it is at least a day before `today.date`.
pub fn score_readiness(
  today: &DailyLog,
  last_workout: Option<NaiveDate>,
  biometrics: Option<&BiometricSnapshot>,
) -> ReadinessReport {
  let systemic_stress = biometrics.is_some_and(BiometricSnapshot::systemic_stress);
  let (score, recovery_mode) = calculate_score(today, last_workout, systemic_stress);

  ReadinessReport {
    score,
    category: ReadinessCategory::from_score(score),
    recovery_mode,
    systemic_stress,
    recommendation: ReadinessRecommendation::for_report(score, recovery_mode),
  }
}

/// Returns the score and whether the psychological override fired
fn calculate_score(
  today: &DailyLog,
  last_workout: Option<NaiveDate>,
  systemic_stress: bool,
) -> (u8, bool) {
  let mut score = BASE_SCORE;

  score += sleep_points(today.sleep);
  score += (f64::from(today.hydration) / f64::from(HYDRATION_GOAL) * MAX_HYDRATION_POINTS)
    .min(MAX_HYDRATION_POINTS);
  score += f64::from(today.meals.eaten_count()) / MEALS_PER_DAY * MAX_NUTRITION_POINTS;

  let low_motivation = today.motivation == Some(Motivation::Low);
  let high_stress = today.stress.is_some_and(|s| s.is_high());
  if low_motivation || high_stress {
    return (finish(score.min(OVERRIDE_CAP)), true);
  }

  if let Some(motivation) = today.motivation {
    score += motivation_points(motivation);
  }
  if let Some(stress) = today.stress {
    score += stress_points(stress.value());
  }

  for area in today.active_pain() {
    score -= pain_deduction(area.severity);
  }

  if systemic_stress {
    score -= SYSTEMIC_STRESS_PENALTY;
  }

  if let Some(last) = last_workout {
    let days_since = (today.date - last).num_days();
    if days_since >= 1 {
      score += (days_since as f64 * REST_BONUS_PER_DAY).min(MAX_REST_BONUS);
    }
  }

  (finish(score), false)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{BodyLocation, LogPatch, Meal, PainEntry, PainReport, StressLevel};
  use crate::test_utils::*;
  use chrono::Duration;

  fn log_with(patches: Vec<LogPatch>) -> DailyLog {
    let mut log = DailyLog::empty(test_date());
    for patch in patches {
      log.apply(patch);
    }
    log
  }

  fn all_meals() -> Vec<LogPatch> {
    [Meal::Breakfast, Meal::Lunch, Meal::Dinner]
      .into_iter()
      .map(|meal| LogPatch::Meal { meal, eaten: true })
      .collect()
  }

  #[test]
  fn test_empty_log_scores_base_plus_neutral_sleep() {
    let report = score_readiness(&DailyLog::empty(test_date()), None, None);

    assert_eq!(report.score, 65);
    assert_eq!(report.category, ReadinessCategory::Good);
    assert!(!report.recovery_mode);
  }

  #[test]
  fn test_perfect_day_clamps_to_100() {
    let mut patches = vec![
      LogPatch::Sleep(SleepQuality::VeryWell),
      LogPatch::AddHydration(12),
      LogPatch::Motivation(Motivation::High),
      LogPatch::Stress(StressLevel::new(1).unwrap()),
    ];
    patches.extend(all_meals());

    let report = score_readiness(&log_with(patches), Some(test_date() - Duration::days(5)), None);

    assert_eq!(report.score, 100);
    assert_eq!(report.category, ReadinessCategory::Excellent);
    assert_eq!(report.recommendation.kind, RecommendationKind::Excellent);
  }

  #[test]
  fn test_low_motivation_caps_at_40_even_with_maximal_inputs() {
    // 50 + 30 + 15 + 10 = 105 before the override
    let mut patches = vec![
      LogPatch::Sleep(SleepQuality::VeryWell),
      LogPatch::AddHydration(8),
      LogPatch::Motivation(Motivation::Low),
    ];
    patches.extend(all_meals());

    let report = score_readiness(&log_with(patches), Some(test_date() - Duration::days(3)), None);

    assert_eq!(report.score, 40);
    assert!(report.recovery_mode);
    assert_eq!(report.category, ReadinessCategory::Moderate);
    assert_eq!(report.recommendation.kind, RecommendationKind::Recovery);
    assert_eq!(report.recommendation.suggested_intensity, Intensity::Low);
  }

  #[test]
  fn test_high_stress_override_keeps_lower_running_score() {
    let report = score_readiness(
      &log_with(vec![
        LogPatch::Sleep(SleepQuality::VeryPoor),
        LogPatch::Stress(StressLevel::new(5).unwrap()),
      ]),
      None,
      None,
    );

    // 50 + 0, then capped
    assert_eq!(report.score, 40);
    let report = score_readiness(
      &log_with(vec![LogPatch::Stress(StressLevel::new(4).unwrap())]),
      None,
      None,
    );
    assert!(report.recovery_mode);
    assert!(report.score <= 40);
  }

  #[test]
  fn test_override_skips_pain_and_biometric_terms() {
    let stressed = BiometricSnapshot {
      resting_hr: Some(75.0),
      hrv: None,
      baseline: BiometricBaseline {
        avg_resting_hr: Some(60.0),
        avg_hrv: None,
      },
    };
    let log = log_with(vec![
      LogPatch::Motivation(Motivation::Low),
      LogPatch::Pain(PainReport::with_areas(vec![PainEntry {
        location: BodyLocation::Knees,
        severity: PainSeverity::Severe,
      }])),
    ]);

    let report = score_readiness(&log, None, Some(&stressed));

    assert_eq!(report.score, 40);
    assert!(report.systemic_stress);
  }

  #[test]
  fn test_pain_and_systemic_stress_deduct() {
    let stressed = BiometricSnapshot {
      resting_hr: Some(58.0),
      hrv: Some(40.0),
      baseline: BiometricBaseline {
        avg_resting_hr: Some(60.0),
        avg_hrv: Some(50.0),
      },
    };
    let log = log_with(vec![
      LogPatch::Sleep(SleepQuality::Well),
      LogPatch::Motivation(Motivation::Neutral),
      LogPatch::Stress(StressLevel::new(2).unwrap()),
      LogPatch::Pain(PainReport::with_areas(vec![
        PainEntry {
          location: BodyLocation::Knees,
          severity: PainSeverity::Moderate,
        },
        PainEntry {
          location: BodyLocation::Wrists,
          severity: PainSeverity::Mild,
        },
      ])),
    ]);

    let report = score_readiness(&log, None, Some(&stressed));

    // 50 + 25 + 8 + 8 - 12 - 5 - 15
    assert_eq!(report.score, 59);
    assert_eq!(report.category, ReadinessCategory::Moderate);
  }

  #[test]
  fn test_rest_bonus_scales_and_caps() {
    let log = DailyLog::empty(test_date());
    let days_ago = |d: i64| Some(test_date() - Duration::days(d));

    assert_eq!(score_readiness(&log, days_ago(0), None).score, 65);
    assert_eq!(score_readiness(&log, days_ago(1), None).score, 68);
    assert_eq!(score_readiness(&log, days_ago(3), None).score, 74);
    assert_eq!(score_readiness(&log, days_ago(10), None).score, 75);
  }

  #[test]
  fn test_partial_hydration_and_meals_round() {
    let log = log_with(vec![
      LogPatch::Sleep(SleepQuality::Poor),
      LogPatch::AddHydration(3),
      LogPatch::Meal {
        meal: Meal::Breakfast,
        eaten: true,
      },
    ]);

    // 50 + 10 + 5.625 + 3.33 = 68.96
    assert_eq!(score_readiness(&log, None, None).score, 69);
  }

  #[test]
  fn test_score_always_within_bounds() {
    let sleeps = [None]
      .into_iter()
      .chain(SleepQuality::ALL.into_iter().map(Some));
    for sleep in sleeps {
      for motivation in [None, Some(Motivation::Low), Some(Motivation::Neutral), Some(Motivation::High)] {
        for stress in [None, Some(1), Some(3), Some(4), Some(5)] {
          for hydration in [0, 4, 20] {
            for severity in [None, Some(PainSeverity::Mild), Some(PainSeverity::Severe)] {
              let mut log = DailyLog::empty(test_date());
              log.sleep = sleep;
              log.motivation = motivation;
              log.stress = stress.and_then(StressLevel::new);
              log.hydration = hydration;
              if let Some(severity) = severity {
                log.pain = Some(PainReport::with_areas(
                  BodyLocation::ALL
                    .iter()
                    .map(|&location| PainEntry { location, severity })
                    .collect(),
                ));
              }

              let report = score_readiness(&log, Some(test_date() - Duration::days(2)), None);

              assert!(report.score <= 100);
              if motivation == Some(Motivation::Low) || stress.is_some_and(|s| s >= 4) {
                assert!(report.score <= 40);
                assert!(matches!(
                  report.category,
                  ReadinessCategory::Moderate | ReadinessCategory::Poor
                ));
              }
            }
          }
        }
      }
    }
  }

  #[test]
  fn test_systemic_stress_thresholds() {
    let baseline = BiometricBaseline {
      avg_resting_hr: Some(60.0),
      avg_hrv: Some(50.0),
    };
    let at = |rhr: f64, hrv: f64| BiometricSnapshot {
      resting_hr: Some(rhr),
      hrv: Some(hrv),
      baseline,
    };

    assert!(!at(65.0, 50.0).systemic_stress());
    assert!(at(65.5, 50.0).systemic_stress());
    assert!(!at(60.0, 43.0).systemic_stress());
    assert!(at(60.0, 42.0).systemic_stress());
    assert!(!BiometricSnapshot::default().systemic_stress());
  }
}
