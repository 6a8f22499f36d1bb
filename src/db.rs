//! SQLite persistence for the store snapshot
//!
//! The decision core works against `InMemoryStore`; the host loads it at the
//! start of a session and flushes it back when done.

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::CoachConfig;
use crate::models::{DailyLog, Memory, PerformanceRecord, Profile};
use crate::store::InMemoryStore;

pub type DbPool = SqlitePool;

#[derive(Error, Debug)]
pub enum DbError {
  #[error("Database error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration failed: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error("Stored record is not valid JSON: {0}")]
  Json(#[from] serde_json::Error),

  #[error("Failed to prepare database directory: {0}")]
  Io(#[from] std::io::Error),
}

/// Open (creating if needed) the database file and run migrations
pub async fn initialize_db(path: &Path) -> Result<DbPool, DbError> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent)?;
  }

  let db_url = format!("sqlite://{}?mode=rwc", path.display());
  info!(path = %path.display(), "Initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(&db_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("Database initialized");
  Ok(pool)
}

/// Pool for the configured database file, if there is one
pub async fn open(config: &CoachConfig) -> Result<Option<DbPool>, DbError> {
  match &config.database_path {
    Some(path) => initialize_db(path).await.map(Some),
    None => Ok(None),
  }
}

/// Read the whole snapshot. An empty database yields a default store.
pub async fn load_store(pool: &DbPool) -> Result<InMemoryStore, DbError> {
  let profile: Option<String> = sqlx::query_scalar("SELECT data_json FROM profile WHERE id = 1")
    .fetch_optional(pool)
    .await?;
  let memory: Option<String> = sqlx::query_scalar("SELECT data_json FROM memory WHERE id = 1")
    .fetch_optional(pool)
    .await?;

  let log_rows: Vec<(NaiveDate, String)> =
    sqlx::query_as("SELECT log_date, data_json FROM daily_logs ORDER BY log_date")
      .fetch_all(pool)
      .await?;
  let performance_rows: Vec<String> =
    sqlx::query_scalar("SELECT data_json FROM performance_records ORDER BY seq")
      .fetch_all(pool)
      .await?;

  let mut store = InMemoryStore {
    profile: match profile {
      Some(json) => serde_json::from_str::<Profile>(&json)?,
      None => Profile::default(),
    },
    memory: match memory {
      Some(json) => serde_json::from_str::<Memory>(&json)?,
      None => Memory::default(),
    },
    ..InMemoryStore::default()
  };

  for (date, json) in log_rows {
    store.logs.insert(date, serde_json::from_str::<DailyLog>(&json)?);
  }
  for json in performance_rows {
    store
      .performance
      .push(serde_json::from_str::<PerformanceRecord>(&json)?);
  }

  debug!(
    logs = store.logs.len(),
    performance = store.performance.len(),
    "Store loaded"
  );
  Ok(store)
}

/// Write the snapshot in one transaction. Logs are upserted by date;
/// performance records are append-only, so only the unsaved tail is inserted.
pub async fn save_store(pool: &DbPool, store: &InMemoryStore) -> Result<(), DbError> {
  let now = Utc::now();
  let mut tx = pool.begin().await?;

  sqlx::query(
    r#"
    INSERT INTO profile (id, data_json, updated_at)
    VALUES (1, ?1, ?2)
    ON CONFLICT(id) DO UPDATE SET
      data_json = excluded.data_json,
      updated_at = excluded.updated_at
    "#,
  )
  .bind(serde_json::to_string(&store.profile)?)
  .bind(now)
  .execute(&mut *tx)
  .await?;

  sqlx::query(
    r#"
    INSERT INTO memory (id, data_json, updated_at)
    VALUES (1, ?1, ?2)
    ON CONFLICT(id) DO UPDATE SET
      data_json = excluded.data_json,
      updated_at = excluded.updated_at
    "#,
  )
  .bind(serde_json::to_string(&store.memory)?)
  .bind(now)
  .execute(&mut *tx)
  .await?;

  for (date, log) in &store.logs {
    sqlx::query(
      r#"
      INSERT INTO daily_logs (log_date, data_json, updated_at)
      VALUES (?1, ?2, ?3)
      ON CONFLICT(log_date) DO UPDATE SET
        data_json = excluded.data_json,
        updated_at = excluded.updated_at
      "#,
    )
    .bind(date)
    .bind(serde_json::to_string(log)?)
    .bind(now)
    .execute(&mut *tx)
    .await?;
  }

  let saved: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM performance_records")
    .fetch_one(&mut *tx)
    .await?;
  let saved = usize::try_from(saved).unwrap_or(0);

  for record in store.performance.iter().skip(saved) {
    sqlx::query(
      r#"
      INSERT INTO performance_records (exercise_name, record_date, data_json)
      VALUES (?1, ?2, ?3)
      "#,
    )
    .bind(&record.exercise_name)
    .bind(record.date)
    .bind(serde_json::to_string(record)?)
    .execute(&mut *tx)
    .await?;
  }

  tx.commit().await?;

  debug!(
    logs = store.logs.len(),
    new_performance = store.performance.len().saturating_sub(saved),
    "Store saved"
  );
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{LogPatch, MemoryPatch, SleepQuality};
  use crate::store::Store;
  use crate::test_utils::*;

  #[tokio::test]
  async fn test_empty_database_loads_default_store() {
    let pool = setup_test_db().await;

    let store = load_store(&pool).await.unwrap();

    assert_eq!(store, InMemoryStore::default());
    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_snapshot_round_trip() {
    // Arrange
    let pool = setup_test_db().await;
    let mut store = InMemoryStore::new(Profile {
      name: "Riley".to_string(),
      ..Profile::default()
    });
    store.append_log(test_date(), LogPatch::Sleep(SleepQuality::Poor));
    store.append_log(test_date(), LogPatch::AddHydration(3));
    store.mutate_memory(MemoryPatch::AddLoved {
      exercise: "Deadlift".to_string(),
    });
    store.append_performance(create_test_record("Deadlift", 100.0, 5, test_date(), true));

    // Act
    save_store(&pool, &store).await.unwrap();
    let loaded = load_store(&pool).await.unwrap();

    // Assert
    assert_eq!(loaded, store);
    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_logs_upsert_and_performance_appends() {
    let pool = setup_test_db().await;
    let mut store = InMemoryStore::default();
    store.append_log(test_date(), LogPatch::AddHydration(2));
    store.append_performance(create_test_record("Bench Press", 60.0, 8, test_date(), true));
    save_store(&pool, &store).await.unwrap();

    store.append_log(test_date(), LogPatch::AddHydration(2));
    store.append_performance(create_test_record("Bench Press", 62.5, 8, test_date(), true));
    save_store(&pool, &store).await.unwrap();
    save_store(&pool, &store).await.unwrap();

    let logs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM daily_logs")
      .fetch_one(&pool)
      .await
      .unwrap();
    let records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM performance_records")
      .fetch_one(&pool)
      .await
      .unwrap();
    assert_eq!(logs, 1);
    assert_eq!(records, 2);

    let loaded = load_store(&pool).await.unwrap();
    assert_eq!(loaded.logs[&test_date()].hydration, 4);
    assert_eq!(loaded.performance_history("bench press").len(), 2);
    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_open_without_path_is_none() {
    let pool = open(&CoachConfig::default()).await.unwrap();
    assert!(pool.is_none());
  }
}
