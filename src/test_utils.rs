//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock data factories
//! - Scripted providers for router and orchestrator tests
//! - Helper assertions

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::clock::{Clock, FixedClock};
use crate::llm::{
  MemoryDigest, PlannedExercise, Provider, ProviderError, ProviderId, ProviderOutput,
  ProviderSettings, PsychologicalState, Reps, TaskPayload, WorkoutPlan, WorkoutRequest,
};
use crate::models::{
  BodyLocation, DailyLog, InjuryWatch, Intensity, Memory, PainSeverity, PerformanceRecord,
  Profile, TrainingStyle,
};
use crate::readiness::score_readiness;
use crate::router::TaskKind;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// A fixed Monday, so tests never depend on the wall clock
pub fn test_date() -> NaiveDate {
  NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid test date")
}

/// Performance record with RPE 7 and 3 sets
pub fn create_test_record(
  exercise: &str,
  weight: f64,
  reps: u32,
  date: NaiveDate,
  completed: bool,
) -> PerformanceRecord {
  PerformanceRecord {
    exercise_name: exercise.to_string(),
    weight,
    reps,
    sets: 3,
    rpe: 7,
    completed,
    date,
    training_style: TrainingStyle::Strength,
  }
}

/// Plan with 3x10 of each named exercise
pub fn create_test_plan(names: &[&str]) -> WorkoutPlan {
  WorkoutPlan {
    workout_type: "Strength".to_string(),
    reasoning: "Test plan".to_string(),
    duration_minutes: 45,
    intensity: Intensity::Moderate,
    exercises: names
      .iter()
      .map(|name| PlannedExercise {
        name: name.to_string(),
        sets: 3,
        reps: Reps::Count(10),
        rest_seconds: Some(60),
      })
      .collect(),
  }
}

pub fn create_test_injury(location: BodyLocation) -> InjuryWatch {
  InjuryWatch {
    location,
    severity: PainSeverity::Moderate,
    recorded_on: test_date(),
  }
}

/// Workout-generation payload for an empty morning
pub fn create_test_workout_payload() -> TaskPayload {
  let time_context = FixedClock::at(test_date(), 9)
    .expect("valid test hour")
    .time_context();

  TaskPayload::Workout(Box::new(WorkoutRequest {
    profile: Profile::default(),
    readiness: score_readiness(&DailyLog::empty(test_date()), None, None),
    psychological_state: PsychologicalState {
      motivation: None,
      stress: None,
    },
    memory: MemoryDigest::from(&Memory::default()),
    time_context,
    pain: Vec::new(),
    previous_exercises: Vec::new(),
  }))
}

pub fn test_provider_settings(base_url: &str) -> ProviderSettings {
  ProviderSettings {
    api_key: "test-key".to_string(),
    base_url: base_url.parse().expect("valid mock server URL"),
    model: "test-model".to_string(),
  }
}

/// ---------------------------------------------------------------------------
/// Scripted Providers
/// ---------------------------------------------------------------------------

enum Script {
  Fail,
  Succeed(ProviderOutput),
  Hang,
}

/// Provider whose behaviour is fixed at construction
pub struct ScriptedProvider {
  id: ProviderId,
  script: Script,
}

impl ScriptedProvider {
  pub fn failing(id: ProviderId) -> Arc<dyn Provider> {
    Arc::new(Self {
      id,
      script: Script::Fail,
    })
  }

  pub fn succeeding(id: ProviderId, output: ProviderOutput) -> Arc<dyn Provider> {
    Arc::new(Self {
      id,
      script: Script::Succeed(output),
    })
  }

  /// Never answers; only useful behind a deadline
  pub fn hanging(id: ProviderId) -> Arc<dyn Provider> {
    Arc::new(Self {
      id,
      script: Script::Hang,
    })
  }
}

#[async_trait]
impl Provider for ScriptedProvider {
  fn id(&self) -> ProviderId {
    self.id
  }

  async fn generate(
    &self,
    _task: TaskKind,
    _payload: &TaskPayload,
  ) -> Result<ProviderOutput, ProviderError> {
    match &self.script {
      Script::Fail => Err(ProviderError::Api(format!("503: {} is down", self.id))),
      Script::Succeed(output) => Ok(output.clone()),
      Script::Hang => std::future::pending().await,
    }
  }

  async fn health_check(&self) -> bool {
    !matches!(self.script, Script::Fail)
  }
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr) => {
    $crate::assert_approx_eq!($left, $right, 1e-6)
  };
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    // Verify key tables exist
    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('profile', 'memory', 'daily_logs', 'performance_records')"
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 4, "Expected 4 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let plan = create_test_plan(&["Deadlift", "Plank"]);
    assert!(plan.validate().is_ok());
    assert_eq!(plan.exercises.len(), 2);

    let record = create_test_record("Deadlift", 100.0, 5, test_date(), true);
    assert_eq!(record.rpe, 7);
    assert!(!record.is_struggle());

    let TaskPayload::Workout(request) = create_test_workout_payload() else {
      panic!("expected workout payload");
    };
    assert_eq!(request.readiness.score, 65);
  }

  #[tokio::test]
  async fn test_scripted_providers() {
    let payload = create_test_workout_payload();

    let failing = ScriptedProvider::failing(ProviderId::Chat);
    assert!(failing.generate(TaskKind::Chat, &payload).await.is_err());
    assert!(!failing.health_check().await);

    let output = ProviderOutput::Text {
      text: "ok".to_string(),
    };
    let succeeding = ScriptedProvider::succeeding(ProviderId::Chat, output.clone());
    assert_eq!(succeeding.generate(TaskKind::Chat, &payload).await, Ok(output));
  }
}
