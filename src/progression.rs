//! Progressive Overload Engine
//!
//! Per-exercise load prescription from the trailing performance history:
//! - First attempt: fixed starting prescription
//! - Plateau (2 of the last 3 sessions failed or RPE >= 9): toggle training style
//! - Too hard (failed or RPE >= 9): weight x0.95
//! - Too easy (RPE <= 6): weight x1.05
//! - Optimal (RPE 7-8): hold
//!
//! History is append-only. Weights round to one decimal place.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{MemoryPatch, PerformanceRecord, ProgressionStatus, TrainingStyle};
use crate::store::Store;

// ---------------------------------------------------------------------------
/// Constants
// ---------------------------------------------------------------------------

pub const STARTING_WEIGHT: f64 = 20.0;
pub const STARTING_REPS: u32 = 8;
pub const STARTING_SETS: u32 = 3;

/// Sessions inspected for plateau detection
const PLATEAU_WINDOW: usize = 3;
/// Struggling sessions within the window that declare a plateau
const PLATEAU_STRUGGLES: usize = 2;

const TOO_HARD_FACTOR: f64 = 0.95;
const TOO_EASY_FACTOR: f64 = 1.05;
const TO_HYPERTROPHY_FACTOR: f64 = 0.75;
const TO_STRENGTH_FACTOR: f64 = 1.1;

const HYPERTROPHY_MAX_REPS: u32 = 15;
const STRENGTH_MIN_REPS: u32 = 5;
const REP_SHIFT: u32 = 4;

// ---------------------------------------------------------------------------
/// Branch: which rule produced the recommendation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionBranch {
    FirstAttempt,
    Plateau,
    TooHard,
    TooEasy,
    Maintain,
}

impl std::fmt::Display for ProgressionBranch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstAttempt => write!(f, "first_attempt"),
            Self::Plateau => write!(f, "plateau"),
            Self::TooHard => write!(f, "too_hard"),
            Self::TooEasy => write!(f, "too_easy"),
            Self::Maintain => write!(f, "maintain"),
        }
    }
}

impl std::str::FromStr for ProgressionBranch {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first_attempt" => Ok(Self::FirstAttempt),
            "plateau" => Ok(Self::Plateau),
            "too_hard" => Ok(Self::TooHard),
            "too_easy" => Ok(Self::TooEasy),
            "maintain" => Ok(Self::Maintain),
            _ => Err(format!("Unknown progression branch: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
/// Recommendation: next-session prescription
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub exercise: String,
    /// kg, one decimal place
    pub weight: f64,
    pub reps: u32,
    pub sets: u32,
    pub training_style: TrainingStyle,
    pub branch: ProgressionBranch,
    /// Human-readable account of the branch that fired
    pub reasoning: String,
}

fn round_weight(weight: f64) -> f64 {
    (weight * 10.0).round() / 10.0
}

/// True when at least 2 of the last 3 sessions were a struggle.
/// Fewer than 3 sessions never count as a plateau.
pub fn detect_plateau(history: &[PerformanceRecord]) -> bool {
    if history.len() < PLATEAU_WINDOW {
        return false;
    }

    let recent = &history[history.len() - PLATEAU_WINDOW..];
    recent.iter().filter(|r| r.is_struggle()).count() >= PLATEAU_STRUGGLES
}

/// Next prescription for one exercise. `history` is that exercise's records,
/// oldest first; the most recent record is its last element.
pub fn calculate_progression(exercise: &str, history: &[PerformanceRecord]) -> Recommendation {
    let Some(last) = history.last() else {
        return Recommendation {
            exercise: exercise.to_string(),
            weight: STARTING_WEIGHT,
            reps: STARTING_REPS,
            sets: STARTING_SETS,
            training_style: TrainingStyle::default(),
            branch: ProgressionBranch::FirstAttempt,
            reasoning: "First time - starting with moderate weight".to_string(),
        };
    };

    if detect_plateau(history) {
        return resolve_plateau(exercise, last);
    }

    let (factor, branch, reasoning) = if last.is_struggle() {
        let reasoning = if last.rpe >= 9 {
            "RPE too high - reducing weight"
        } else {
            "Failed last attempt - reducing weight"
        };
        (TOO_HARD_FACTOR, ProgressionBranch::TooHard, reasoning)
    } else if last.rpe <= 6 {
        (
            TOO_EASY_FACTOR,
            ProgressionBranch::TooEasy,
            "Last session was easy - increasing weight",
        )
    } else {
        (
            1.0,
            ProgressionBranch::Maintain,
            "Perfect intensity - maintaining weight",
        )
    };

    Recommendation {
        exercise: exercise.to_string(),
        weight: round_weight(last.weight * factor),
        reps: last.reps,
        sets: last.sets,
        training_style: last.training_style,
        branch,
        reasoning: reasoning.to_string(),
    }
}

fn resolve_plateau(exercise: &str, last: &PerformanceRecord) -> Recommendation {
    let next_style = last.training_style.toggled();
    let (weight, reps, reasoning) = match next_style {
        TrainingStyle::Hypertrophy => (
            last.weight * TO_HYPERTROPHY_FACTOR,
            (last.reps + REP_SHIFT).min(HYPERTROPHY_MAX_REPS),
            "Plateau detected - switching to hypertrophy (higher volume, lower weight)",
        ),
        TrainingStyle::Strength => (
            last.weight * TO_STRENGTH_FACTOR,
            last.reps.saturating_sub(REP_SHIFT).max(STRENGTH_MIN_REPS),
            "Plateau detected - switching back to strength (lower reps, higher weight)",
        ),
    };

    info!(
        exercise,
        from = ?last.training_style,
        to = ?next_style,
        "Plateau detected, toggling training style"
    );

    Recommendation {
        exercise: exercise.to_string(),
        weight: round_weight(weight),
        reps,
        sets: last.sets,
        training_style: next_style,
        branch: ProgressionBranch::Plateau,
        reasoning: reasoning.to_string(),
    }
}

/// Status stored in Memory after a session is recorded
pub fn progression_status(record: &PerformanceRecord) -> ProgressionStatus {
    if !record.completed {
        ProgressionStatus::Struggling
    } else if record.rpe <= 6 {
        ProgressionStatus::ProgressingWell
    } else if record.rpe <= 8 {
        ProgressionStatus::Optimal
    } else {
        ProgressionStatus::TooDifficult
    }
}

// ---------------------------------------------------------------------------
/// Engine bound to a store
// ---------------------------------------------------------------------------

pub struct ProgressiveOverload<S> {
    store: S,
}

impl<S: Store> ProgressiveOverload<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn recommend(&self, exercise: &str) -> Recommendation {
        let history = self.store.performance_history(exercise);
        calculate_progression(exercise, &history)
    }

    /// Append a session and refresh the exercise's status in Memory.
    /// RPE outside 1-10 is clamped.
    pub fn record_performance(&mut self, mut record: PerformanceRecord) -> ProgressionStatus {
        record.rpe = record.rpe.clamp(1, 10);
        let status = progression_status(&record);

        self.store.mutate_memory(MemoryPatch::SetProgressionStatus {
            exercise: record.exercise_name.clone(),
            status,
        });
        self.store.append_performance(record);

        status
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::test_utils::*;
    use chrono::Duration;

    fn session(weight: f64, reps: u32, rpe: u8, completed: bool) -> PerformanceRecord {
        PerformanceRecord {
            rpe,
            ..create_test_record("Bench Press", weight, reps, test_date(), completed)
        }
    }

    #[test]
    fn test_first_attempt_uses_starting_prescription() {
        let rec = calculate_progression("Bench Press", &[]);

        assert_eq!(rec.branch, ProgressionBranch::FirstAttempt);
        assert_approx_eq!(rec.weight, STARTING_WEIGHT);
        assert_eq!(rec.reps, 8);
        assert_eq!(rec.sets, 3);
        assert!(rec.reasoning.contains("First time"));
    }

    #[test]
    fn test_rpe_seven_completed_maintains_weight() {
        let history = vec![session(50.0, 8, 7, true)];

        let rec = calculate_progression("Bench Press", &history);

        assert_approx_eq!(rec.weight, 50.0);
        assert_eq!(rec.branch, ProgressionBranch::Maintain);
        assert!(rec.reasoning.contains("maintain"));
        assert_eq!(rec.reps, 8);
        assert_eq!(rec.sets, 3);
    }

    #[test]
    fn test_easy_session_increases_weight() {
        let history = vec![session(42.5, 8, 6, true)];

        let rec = calculate_progression("Bench Press", &history);

        // 42.5 * 1.05 = 44.625
        assert_approx_eq!(rec.weight, 44.6);
        assert_eq!(rec.branch, ProgressionBranch::TooEasy);
    }

    #[test]
    fn test_failed_session_reduces_weight() {
        let history = vec![session(60.0, 5, 8, false)];

        let rec = calculate_progression("Bench Press", &history);

        assert_approx_eq!(rec.weight, 57.0);
        assert_eq!(rec.branch, ProgressionBranch::TooHard);
        assert_eq!(rec.reasoning, "Failed last attempt - reducing weight");

        let history = vec![session(60.0, 5, 9, true)];
        let rec = calculate_progression("Bench Press", &history);
        assert_eq!(rec.reasoning, "RPE too high - reducing weight");
    }

    #[test]
    fn test_three_hard_sessions_toggle_to_hypertrophy() {
        // Arrange
        let history = vec![
            session(80.0, 5, 9, true),
            session(80.0, 5, 9, true),
            session(80.0, 5, 10, true),
        ];

        // Act
        let rec = calculate_progression("Bench Press", &history);

        // Assert
        assert!(detect_plateau(&history));
        assert_eq!(rec.branch, ProgressionBranch::Plateau);
        assert_eq!(rec.training_style, TrainingStyle::Hypertrophy);
        assert_approx_eq!(rec.weight, 60.0);
        assert_eq!(rec.reps, 9);
    }

    #[test]
    fn test_plateau_in_hypertrophy_toggles_back_to_strength() {
        let history: Vec<PerformanceRecord> = [(9, true), (7, true), (8, false)]
            .into_iter()
            .map(|(rpe, completed)| PerformanceRecord {
                training_style: TrainingStyle::Hypertrophy,
                ..session(40.0, 12, rpe, completed)
            })
            .collect();

        let rec = calculate_progression("Bench Press", &history);

        assert_eq!(rec.training_style, TrainingStyle::Strength);
        assert_approx_eq!(rec.weight, 44.0);
        assert_eq!(rec.reps, 8);
    }

    #[test]
    fn test_rep_bounds_on_toggle() {
        let into_hypertrophy = vec![session(50.0, 13, 10, false); 3];
        assert_eq!(calculate_progression("Bench Press", &into_hypertrophy).reps, 15);

        let into_strength: Vec<PerformanceRecord> = (0..3)
            .map(|_| PerformanceRecord {
                training_style: TrainingStyle::Hypertrophy,
                ..session(50.0, 6, 10, false)
            })
            .collect();
        assert_eq!(calculate_progression("Bench Press", &into_strength).reps, 5);
    }

    #[test]
    fn test_plateau_needs_three_sessions() {
        let history = vec![session(80.0, 5, 10, false), session(80.0, 5, 10, false)];

        assert!(!detect_plateau(&history));
        assert_eq!(
            calculate_progression("Bench Press", &history).branch,
            ProgressionBranch::TooHard
        );
    }

    #[test]
    fn test_plateau_only_looks_at_last_three() {
        let history = vec![
            session(70.0, 5, 10, false),
            session(70.0, 5, 10, false),
            session(70.0, 5, 7, true),
            session(70.0, 5, 8, true),
            session(70.0, 5, 9, true),
        ];

        assert!(!detect_plateau(&history));
    }

    #[test]
    fn test_progression_status_mapping() {
        assert_eq!(progression_status(&session(50.0, 8, 5, false)), ProgressionStatus::Struggling);
        assert_eq!(progression_status(&session(50.0, 8, 6, true)), ProgressionStatus::ProgressingWell);
        assert_eq!(progression_status(&session(50.0, 8, 8, true)), ProgressionStatus::Optimal);
        assert_eq!(progression_status(&session(50.0, 8, 9, true)), ProgressionStatus::TooDifficult);
    }

    #[test]
    fn test_record_performance_appends_and_updates_memory() {
        let mut store = InMemoryStore::default();
        let mut engine = ProgressiveOverload::new(&mut store);

        let first = engine.recommend("Squat");
        engine.record_performance(PerformanceRecord {
            rpe: 6,
            ..create_test_record("Squat", first.weight, first.reps, test_date(), true)
        });
        let status = engine.record_performance(PerformanceRecord {
            rpe: 12,
            ..create_test_record("Squat", 22.0, 8, test_date() + Duration::days(2), true)
        });
        let next = engine.recommend("Squat");

        assert_eq!(status, ProgressionStatus::TooDifficult);
        assert_eq!(next.branch, ProgressionBranch::TooHard);
        assert_approx_eq!(next.weight, 20.9);
        assert_eq!(store.performance.len(), 2);
        assert_eq!(store.performance[1].rpe, 10);
        assert_eq!(
            store.memory.progression_status.get("Squat"),
            Some(&ProgressionStatus::TooDifficult)
        );
    }

    #[test]
    fn test_branch_round_trips_through_str() {
        for branch in [
            ProgressionBranch::FirstAttempt,
            ProgressionBranch::Plateau,
            ProgressionBranch::Maintain,
        ] {
            assert_eq!(branch.to_string().parse::<ProgressionBranch>(), Ok(branch));
        }
    }
}
