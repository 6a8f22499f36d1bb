//! Exercise Negotiator
//!
//! Handles "swap this exercise" requests: counts the rejection, folds Memory
//! into the caller's constraints and returns up to three ranked alternatives
//! from the catalog. The returned list is never empty.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::{self, Difficulty, Equipment, Exercise, LookupConstraints, MuscleGroup};
use crate::models::memory::DISLIKE_THRESHOLD;
use crate::models::MemoryPatch;
use crate::pain;
use crate::store::Store;

pub const MAX_ALTERNATIVES: usize = 3;

/// ---------------------------------------------------------------------------
/// Request / response types
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapReason {
  DontLike,
  GymAnxiety,
  DontKnowEquipment,
  EquipmentUnavailable,
  Pain,
  Other,
}

impl SwapReason {
  /// Reasons that narrow the pool to bodyweight/dumbbell work
  pub fn wants_approachable(&self) -> bool {
    matches!(self, SwapReason::GymAnxiety | SwapReason::DontKnowEquipment)
  }
}

/// Caller-supplied constraints, merged with Memory before lookup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SwapConstraints {
  pub unavailable_equipment: BTreeSet<Equipment>,
  pub preferred_equipment: BTreeSet<Equipment>,
  pub excluded_exercises: BTreeSet<String>,
  pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
  pub name: &'static str,
  pub group: MuscleGroup,
  pub equipment: &'static [Equipment],
  pub muscles: &'static [&'static str],
  pub difficulty: Difficulty,
  pub description: String,
  /// Same muscle group as the exercise being replaced
  pub same_targets: bool,
  pub easier_to_learn: bool,
}

fn join_equipment(equipment: &[Equipment]) -> String {
  equipment
    .iter()
    .map(Equipment::label)
    .collect::<Vec<_>>()
    .join(", ")
}

fn describe(exercise: &Exercise, reason: SwapReason, same_targets: bool) -> String {
  if !same_targets {
    return format!(
      "{} is a gentle option while we find something that suits you.",
      exercise.name
    );
  }

  match reason {
    SwapReason::GymAnxiety | SwapReason::DontKnowEquipment => format!(
      "{} is easier to learn and requires {}.",
      exercise.name,
      join_equipment(exercise.equipment)
    ),
    SwapReason::DontLike => format!(
      "{} is a great alternative that targets the same muscles.",
      exercise.name
    ),
    SwapReason::EquipmentUnavailable => format!(
      "{} uses {} instead.",
      exercise.name,
      join_equipment(exercise.equipment)
    ),
    SwapReason::Pain | SwapReason::Other => format!(
      "{} targets {} and is {} level.",
      exercise.name,
      exercise.muscles.join(", "),
      exercise.difficulty
    ),
  }
}

fn to_alternative(exercise: &'static Exercise, reason: SwapReason, same_targets: bool) -> Alternative {
  Alternative {
    name: exercise.name,
    group: exercise.group,
    equipment: exercise.equipment,
    muscles: exercise.muscles,
    difficulty: exercise.difficulty,
    description: describe(exercise, reason, same_targets),
    same_targets,
    easier_to_learn: exercise.difficulty == Difficulty::Beginner,
  }
}

/// ---------------------------------------------------------------------------
/// Negotiator
/// ---------------------------------------------------------------------------

pub struct ExerciseNegotiator<S> {
  store: S,
}

impl<S: Store> ExerciseNegotiator<S> {
  pub fn new(store: S) -> Self {
    Self { store }
  }

  pub fn into_inner(self) -> S {
    self.store
  }

  /// Record the rejection, then return at most three alternatives
  pub fn request_swap(
    &mut self,
    exercise: &str,
    reason: SwapReason,
    constraints: SwapConstraints,
  ) -> Vec<Alternative> {
    self.record_rejection(exercise);

    let lookup = self.effective_constraints(constraints);
    let injury_avoid = self.injury_avoid_list();
    let safe = |e: &&'static Exercise| !pain::is_avoided(e.name, injury_avoid.iter().map(String::as_str));

    let pool: Vec<&'static Exercise> = catalog::alternatives(exercise, &lookup)
      .into_iter()
      .filter(safe)
      .collect();

    let pool = if reason.wants_approachable() {
      let narrowed: Vec<&'static Exercise> =
        pool.iter().copied().filter(|e| e.is_approachable()).collect();
      if narrowed.is_empty() {
        debug!(exercise, "No approachable alternatives, using full pool");
        pool
      } else {
        narrowed
      }
    } else {
      pool
    };

    if !pool.is_empty() {
      return pool
        .into_iter()
        .take(MAX_ALTERNATIVES)
        .map(|e| to_alternative(e, reason, true))
        .collect();
    }

    // Nothing in the same group survived: offer recovery work instead
    debug!(exercise, "No same-group alternatives, falling back to recovery");
    self
      .fallback_pool(exercise, &lookup, &safe)
      .into_iter()
      .take(MAX_ALTERNATIVES)
      .map(|e| to_alternative(e, reason, false))
      .collect()
  }

  /// Recovery work under the full constraints, then under Memory alone, then
  /// anything not disliked. Disliked exercises are never offered.
  fn fallback_pool(
    &self,
    exercise: &str,
    lookup: &LookupConstraints,
    safe: &dyn Fn(&&'static Exercise) -> bool,
  ) -> Vec<&'static Exercise> {
    let constrained: Vec<&'static Exercise> =
      catalog::candidates(MuscleGroup::Recovery, Some(exercise), lookup)
        .into_iter()
        .filter(|e| safe(e))
        .collect();
    if !constrained.is_empty() {
      return constrained;
    }

    debug!(exercise, "Relaxing caller constraints for recovery fallback");
    let memory_only = self.effective_constraints(SwapConstraints::default());
    let relaxed: Vec<&'static Exercise> =
      catalog::candidates(MuscleGroup::Recovery, Some(exercise), &memory_only)
        .into_iter()
        .filter(|e| safe(e))
        .collect();
    if !relaxed.is_empty() {
      return relaxed;
    }

    let memory = self.store.memory();
    catalog::EXERCISES
      .iter()
      .filter(|e| !e.name.eq_ignore_ascii_case(exercise.trim()))
      .filter(|e| !memory.is_disliked(e.name))
      .filter(|e| safe(e))
      .collect()
  }

  /// The user picked `chosen`; its equipment becomes preferred
  pub fn select_alternative(&mut self, chosen: &str) -> Option<&'static Exercise> {
    let exercise = catalog::find(chosen)?;
    self.store.mutate_memory(MemoryPatch::AddEquipmentPreferences(
      exercise.equipment.to_vec(),
    ));
    Some(exercise)
  }

  fn record_rejection(&mut self, exercise: &str) {
    let was_disliked = self.store.memory().is_disliked(exercise);
    self.store.mutate_memory(MemoryPatch::RecordRejection {
      exercise: exercise.to_string(),
    });

    let memory = self.store.memory();
    if !was_disliked && memory.is_disliked(exercise) {
      info!(
        exercise,
        rejections = memory.rejection_count(exercise),
        threshold = DISLIKE_THRESHOLD,
        "Exercise moved to disliked set"
      );
    }
  }

  fn effective_constraints(&self, constraints: SwapConstraints) -> LookupConstraints {
    let memory = self.store.memory();

    let mut excluded = constraints.excluded_exercises;
    excluded.extend(memory.disliked_exercises.iter().cloned());

    let mut preferred = constraints.preferred_equipment;
    preferred.extend(memory.equipment_preferences.iter().copied());

    LookupConstraints {
      excluded,
      unavailable_equipment: constraints.unavailable_equipment,
      preferred_equipment: preferred,
      difficulty: constraints.difficulty,
    }
  }

  fn injury_avoid_list(&self) -> Vec<String> {
    self
      .store
      .memory()
      .injury_watch
      .iter()
      .flat_map(|w| pain::exercises_to_avoid(w.location, w.severity).iter())
      .map(|name| name.to_string())
      .collect()
  }
}
