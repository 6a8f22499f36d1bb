//! Pain-based exercise exclusion
//!
//! Each reported {location, severity} maps to a fixed list of exercise names to
//! avoid. A plan exercise is dropped when its name contains an avoided name or
//! is contained by one (case-insensitive).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::llm::WorkoutPlan;
use crate::models::{BodyLocation, PainEntry, PainSeverity};

/// Exercise names to keep away from for a single pain entry
pub fn exercises_to_avoid(location: BodyLocation, severity: PainSeverity) -> &'static [&'static str] {
  let serious = severity.is_serious();
  match location {
    BodyLocation::Neck if serious => &[
      "Overhead Press",
      "Deadlift",
      "Barbell Squat",
      "Shoulder Press",
      "Pull-ups",
    ],
    BodyLocation::Neck => &["Overhead Press", "Shoulder Press"],

    BodyLocation::Shoulders if serious => &[
      "Overhead Press",
      "Shoulder Press",
      "Bench Press",
      "Dumbbell Press",
      "Lateral Raises",
      "Front Raises",
      "Push-ups",
      "Dips",
    ],
    BodyLocation::Shoulders => &["Overhead Press", "Shoulder Press", "Lateral Raises"],

    BodyLocation::UpperBack if serious => &[
      "Deadlift",
      "Barbell Row",
      "Pull-ups",
      "Lat Pulldown",
      "T-Bar Row",
    ],
    BodyLocation::UpperBack => &["Deadlift", "Barbell Row"],

    BodyLocation::LowerBack if serious => &[
      "Deadlift",
      "Barbell Squat",
      "Romanian Deadlift",
      "Bent Over Row",
      "Overhead Press",
      "Good Mornings",
    ],
    BodyLocation::LowerBack => &["Deadlift", "Barbell Squat", "Romanian Deadlift"],

    BodyLocation::Chest if serious => &[
      "Bench Press",
      "Dumbbell Press",
      "Push-ups",
      "Dips",
      "Cable Fly",
      "Incline Press",
    ],
    BodyLocation::Chest => &["Bench Press", "Dumbbell Press", "Dips"],

    BodyLocation::Hips if serious => &[
      "Squat",
      "Deadlift",
      "Lunges",
      "Leg Press",
      "Romanian Deadlift",
      "Hip Thrusts",
    ],
    BodyLocation::Hips => &["Squat", "Deadlift", "Lunges"],

    BodyLocation::Knees if serious => &[
      "Squat",
      "Lunges",
      "Leg Press",
      "Leg Extension",
      "Jump Rope",
      "Burpees",
      "Running",
    ],
    BodyLocation::Knees => &["Squat", "Lunges", "Jump Rope"],

    BodyLocation::Ankles if serious => &[
      "Running",
      "Jump Rope",
      "Burpees",
      "Box Jumps",
      "Lunges",
      "Calf Raises",
    ],
    BodyLocation::Ankles => &["Running", "Jump Rope", "Burpees"],

    BodyLocation::Wrists if serious => &[
      "Bench Press",
      "Push-ups",
      "Overhead Press",
      "Barbell Curl",
      "Plank",
      "Burpees",
    ],
    BodyLocation::Wrists => &["Bench Press", "Push-ups", "Plank"],

    BodyLocation::Elbows if serious => &[
      "Bench Press",
      "Tricep Extension",
      "Overhead Press",
      "Dips",
      "Skull Crushers",
      "Pull-ups",
    ],
    BodyLocation::Elbows => &["Tricep Extension", "Skull Crushers", "Overhead Press"],
  }
}

/// Union of avoid lists across all entries
pub fn avoided_for(entries: &[PainEntry]) -> BTreeSet<&'static str> {
  entries
    .iter()
    .flat_map(|p| exercises_to_avoid(p.location, p.severity).iter().copied())
    .collect()
}

/// Substring match in either direction
pub fn is_avoided<'a, I>(exercise: &str, avoided: I) -> bool
where
  I: IntoIterator<Item = &'a str>,
{
  let name = exercise.to_lowercase();
  avoided.into_iter().any(|avoid| {
    let avoid = avoid.to_lowercase();
    name.contains(&avoid) || avoid.contains(&name)
  })
}

/// ---------------------------------------------------------------------------
/// Plan filtering
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredPlan {
  pub plan: WorkoutPlan,
  pub removed: Vec<String>,
  /// More than half of the plan was removed
  pub needs_regeneration: bool,
  pub warning: Option<String>,
}

impl FilteredPlan {
  pub fn modified(&self) -> bool {
    !self.removed.is_empty()
  }
}

pub fn filter_plan(plan: WorkoutPlan, pain: &[PainEntry]) -> FilteredPlan {
  let avoided = avoided_for(pain);
  if avoided.is_empty() {
    return FilteredPlan {
      plan,
      removed: Vec::new(),
      needs_regeneration: false,
      warning: None,
    };
  }

  let total = plan.exercises.len();
  let (kept, dropped): (Vec<_>, Vec<_>) = plan
    .exercises
    .into_iter()
    .partition(|ex| !is_avoided(&ex.name, avoided.iter().copied()));
  let removed: Vec<String> = dropped.into_iter().map(|ex| ex.name).collect();

  let needs_regeneration = removed.len() * 2 > total;
  let warning = needs_regeneration.then(|| {
    format!(
      "{} exercises removed due to pain. Consider full regeneration.",
      removed.len()
    )
  });

  FilteredPlan {
    plan: WorkoutPlan {
      exercises: kept,
      ..plan
    },
    removed,
    needs_regeneration,
    warning,
  }
}

/// User-facing note, graded by the worst severity reported
pub fn modification_message(pain: &[PainEntry]) -> Option<String> {
  if pain.is_empty() {
    return None;
  }

  let locations_with = |severity: PainSeverity| -> Vec<&'static str> {
    pain
      .iter()
      .filter(|p| p.severity == severity)
      .map(|p| p.location.label())
      .collect()
  };

  let severe = locations_with(PainSeverity::Severe);
  if !severe.is_empty() {
    return Some(format!(
      "I've removed all exercises that could stress your {}. Safety is our top priority.",
      severe.join(", ")
    ));
  }

  let moderate = locations_with(PainSeverity::Moderate);
  if !moderate.is_empty() {
    return Some(format!(
      "Modified workout to avoid stressing your {}. Let me know if anything still hurts.",
      moderate.join(", ")
    ));
  }

  let all: Vec<&str> = pain.iter().map(|p| p.location.label()).collect();
  Some(format!(
    "Adjusted exercise selection to be gentle on your {}.",
    all.join(", ")
  ))
}
