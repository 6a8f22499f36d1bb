use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{self, Equipment};
use crate::models::daily_log::{BodyLocation, PainSeverity};

/// Rejections after which an exercise is treated as disliked for good
pub const DISLIKE_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjuryWatch {
  pub location: BodyLocation,
  pub severity: PainSeverity,
  pub recorded_on: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionStatus {
  /// Last attempt not completed
  Struggling,
  /// RPE <= 6, ready for more load
  ProgressingWell,
  /// RPE 7-8
  Optimal,
  /// RPE >= 9
  TooDifficult,
}

impl ProgressionStatus {
  pub fn describe(&self) -> &'static str {
    match self {
      Self::Struggling => "Struggling - consider reducing weight",
      Self::ProgressingWell => "Progressing well - ready for increase",
      Self::Optimal => "Optimal intensity - maintain",
      Self::TooDifficult => "Too difficult - reduce weight",
    }
  }
}

/// Advisory pattern derived from check-in history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsychPattern {
  pub pattern: String,
  pub frequency: u32,
  pub recommendation: String,
}

/// ---------------------------------------------------------------------------
/// Memory: long-lived preference record (one per user)
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Memory {
  pub disliked_exercises: BTreeSet<String>,
  pub loved_exercises: BTreeSet<String>,
  pub equipment_preferences: BTreeSet<Equipment>,
  pub rejection_counts: BTreeMap<String, u32>,
  pub injury_watch: Vec<InjuryWatch>,
  pub progression_status: BTreeMap<String, ProgressionStatus>,
  pub psychological_patterns: Vec<PsychPattern>,
}

/// Key under which an exercise is remembered: the catalog spelling when the
/// catalog knows it, otherwise the trimmed lowercase name
pub fn exercise_key(name: &str) -> String {
  match catalog::find(name) {
    Some(exercise) => exercise.name.to_string(),
    None => name.trim().to_lowercase(),
  }
}

impl Memory {
  pub fn rejection_count(&self, exercise: &str) -> u32 {
    self
      .rejection_counts
      .get(&exercise_key(exercise))
      .copied()
      .unwrap_or(0)
  }

  pub fn is_disliked(&self, exercise: &str) -> bool {
    self.disliked_exercises.contains(&exercise_key(exercise))
  }

  pub fn is_loved(&self, exercise: &str) -> bool {
    self.loved_exercises.contains(&exercise_key(exercise))
  }

  pub fn apply(&mut self, patch: MemoryPatch) {
    match patch {
      MemoryPatch::RecordRejection { exercise } => {
        let key = exercise_key(&exercise);
        let count = self.rejection_counts.entry(key.clone()).or_insert(0);
        *count = count.saturating_add(1);
        if *count >= DISLIKE_THRESHOLD {
          self.disliked_exercises.insert(key);
        }
      }
      MemoryPatch::AddLoved { exercise } => {
        self.loved_exercises.insert(exercise_key(&exercise));
      }
      MemoryPatch::AddEquipmentPreferences(equipment) => {
        self.equipment_preferences.extend(equipment);
      }
      MemoryPatch::WatchInjury(entry) => self.injury_watch.push(entry),
      MemoryPatch::SetProgressionStatus { exercise, status } => {
        self.progression_status.insert(exercise, status);
      }
      MemoryPatch::ReplacePatterns(patterns) => self.psychological_patterns = patterns,
    }
  }
}

/// Single mutation against Memory. Rejections and dislikes never shrink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MemoryPatch {
  RecordRejection { exercise: String },
  AddLoved { exercise: String },
  AddEquipmentPreferences(Vec<Equipment>),
  WatchInjury(InjuryWatch),
  SetProgressionStatus { exercise: String, status: ProgressionStatus },
  ReplacePatterns(Vec<PsychPattern>),
}

#[cfg(test)]
mod tests {
  use super::*;

  fn reject(memory: &mut Memory, exercise: &str) {
    memory.apply(MemoryPatch::RecordRejection {
      exercise: exercise.to_string(),
    });
  }

  #[test]
  fn test_third_rejection_marks_disliked() {
    let mut memory = Memory::default();
    reject(&mut memory, "Burpees");
    reject(&mut memory, "Burpees");
    assert!(!memory.is_disliked("Burpees"));

    reject(&mut memory, "Burpees");
    assert!(memory.is_disliked("Burpees"));
    assert_eq!(memory.rejection_count("Burpees"), 3);
  }

  #[test]
  fn test_fourth_rejection_does_not_duplicate() {
    let mut memory = Memory::default();
    for _ in 0..4 {
      reject(&mut memory, "Burpees");
    }
    assert_eq!(memory.disliked_exercises.len(), 1);
    assert_eq!(memory.rejection_count("Burpees"), 4);
  }

  #[test]
  fn test_rejections_count_across_spellings() {
    // Arrange
    let mut memory = Memory::default();

    // Act
    reject(&mut memory, "Bench Press");
    reject(&mut memory, "bench press");
    reject(&mut memory, "BENCH PRESS ");

    // Assert
    assert_eq!(memory.rejection_counts.len(), 1);
    assert_eq!(memory.rejection_count("Bench Press"), 3);
    assert!(memory.disliked_exercises.contains("Bench Press"));
    assert!(memory.is_disliked("bench press"));
  }

  #[test]
  fn test_unknown_exercises_are_keyed_lowercase() {
    let mut memory = Memory::default();
    reject(&mut memory, "Atlas Stones");
    reject(&mut memory, " atlas stones");
    reject(&mut memory, "ATLAS STONES");

    assert!(memory.disliked_exercises.contains("atlas stones"));
    assert!(memory.is_disliked("Atlas Stones"));
  }

  #[test]
  fn test_loved_exercise_uses_catalog_spelling() {
    let mut memory = Memory::default();
    memory.apply(MemoryPatch::AddLoved {
      exercise: "deadlift".to_string(),
    });

    assert!(memory.loved_exercises.contains("Deadlift"));
    assert!(memory.is_loved("DEADLIFT"));
  }

  #[test]
  fn test_injury_watch_is_keyed_by_location() {
    let entry: InjuryWatch = serde_json::from_str(
      r#"{"exercise": null, "location": "Knees", "severity": "Severe", "recordedOn": "2025-03-10"}"#,
    )
    .unwrap();
    assert_eq!(entry.severity, PainSeverity::Severe);

    let json = serde_json::to_value(&entry).unwrap();
    assert!(json.get("exercise").is_none());
    assert!(json.get("location").is_some());
  }

  #[test]
  fn test_memory_deserializes_with_missing_fields() {
    let memory: Memory = serde_json::from_str(r#"{"lovedExercises":["Deadlift"]}"#).unwrap();
    assert!(memory.loved_exercises.contains("Deadlift"));
    assert!(memory.disliked_exercises.is_empty());
  }
}
