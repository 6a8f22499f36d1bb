//! Static exercise catalog
//!
//! A flat table of exercises, each tagged with its muscle group. Alternatives
//! are drawn from the same group as the exercise being replaced.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// ---------------------------------------------------------------------------
/// Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MuscleGroup {
  Chest,
  Back,
  Legs,
  Shoulders,
  Arms,
  Core,
  Cardio,
  Recovery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Equipment {
  Barbell,
  Bench,
  #[serde(alias = "Dumbbells")]
  Dumbbell,
  Bodyweight,
  #[serde(rename = "Cable Machine")]
  CableMachine,
  #[serde(rename = "Dip Bars")]
  DipBars,
  #[serde(rename = "Pull-up Bar")]
  PullUpBar,
  #[serde(rename = "Squat Rack")]
  SquatRack,
  #[serde(rename = "Leg Press Machine")]
  LegPressMachine,
  #[serde(rename = "Leg Curl Machine")]
  LegCurlMachine,
  #[serde(rename = "Leg Extension Machine")]
  LegExtensionMachine,
  Treadmill,
  Bike,
  #[serde(rename = "Rowing Machine")]
  RowingMachine,
  #[serde(rename = "Jump Rope")]
  JumpRope,
  #[serde(rename = "Yoga Mat")]
  YogaMat,
  #[serde(rename = "Foam Roller")]
  FoamRoller,
}

impl Equipment {
  /// What someone uneasy in a gym can pick up without instruction
  pub fn is_approachable(&self) -> bool {
    matches!(self, Equipment::Bodyweight | Equipment::Dumbbell)
  }

  pub fn label(&self) -> &'static str {
    match self {
      Equipment::Barbell => "Barbell",
      Equipment::Bench => "Bench",
      Equipment::Dumbbell => "Dumbbell",
      Equipment::Bodyweight => "Bodyweight",
      Equipment::CableMachine => "Cable Machine",
      Equipment::DipBars => "Dip Bars",
      Equipment::PullUpBar => "Pull-up Bar",
      Equipment::SquatRack => "Squat Rack",
      Equipment::LegPressMachine => "Leg Press Machine",
      Equipment::LegCurlMachine => "Leg Curl Machine",
      Equipment::LegExtensionMachine => "Leg Extension Machine",
      Equipment::Treadmill => "Treadmill",
      Equipment::Bike => "Bike",
      Equipment::RowingMachine => "Rowing Machine",
      Equipment::JumpRope => "Jump Rope",
      Equipment::YogaMat => "Yoga Mat",
      Equipment::FoamRoller => "Foam Roller",
    }
  }
}

impl fmt::Display for Equipment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Beginner,
  Intermediate,
  Advanced,
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Difficulty::Beginner => write!(f, "beginner"),
      Difficulty::Intermediate => write!(f, "intermediate"),
      Difficulty::Advanced => write!(f, "advanced"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
  Compound,
  Isolation,
  Isometric,
  Cardio,
  ActiveRecovery,
  Flexibility,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exercise {
  pub name: &'static str,
  pub group: MuscleGroup,
  pub equipment: &'static [Equipment],
  pub muscles: &'static [&'static str],
  pub difficulty: Difficulty,
  pub movement: MovementType,
}

impl Exercise {
  pub fn uses_any(&self, equipment: &BTreeSet<Equipment>) -> bool {
    self.equipment.iter().any(|e| equipment.contains(e))
  }

  pub fn is_approachable(&self) -> bool {
    self.equipment.iter().any(Equipment::is_approachable)
  }
}

/// ---------------------------------------------------------------------------
/// Catalog table
/// ---------------------------------------------------------------------------

macro_rules! exercise {
  ($name:expr, $group:ident, [$($eq:ident),*], [$($m:expr),*], $diff:ident, $mv:ident) => {
    Exercise {
      name: $name,
      group: MuscleGroup::$group,
      equipment: &[$(Equipment::$eq),*],
      muscles: &[$($m),*],
      difficulty: Difficulty::$diff,
      movement: MovementType::$mv,
    }
  };
}

pub static EXERCISES: &[Exercise] = &[
  // chest
  exercise!("Bench Press", Chest, [Barbell, Bench], ["Chest", "Triceps"], Intermediate, Compound),
  exercise!("Dumbbell Bench Press", Chest, [Dumbbell, Bench], ["Chest", "Triceps"], Intermediate, Compound),
  exercise!("Push-ups", Chest, [Bodyweight], ["Chest", "Triceps", "Shoulders"], Beginner, Compound),
  exercise!("Incline Dumbbell Press", Chest, [Dumbbell, Bench], ["Upper Chest", "Triceps"], Intermediate, Compound),
  exercise!("Cable Fly", Chest, [CableMachine], ["Chest"], Beginner, Isolation),
  exercise!("Dips", Chest, [DipBars], ["Chest", "Triceps"], Intermediate, Compound),
  // back
  exercise!("Deadlift", Back, [Barbell], ["Back", "Legs", "Core"], Advanced, Compound),
  exercise!("Pull-ups", Back, [PullUpBar], ["Back", "Biceps"], Intermediate, Compound),
  exercise!("Lat Pulldown", Back, [CableMachine], ["Lats", "Biceps"], Beginner, Compound),
  exercise!("Dumbbell Row", Back, [Dumbbell, Bench], ["Back", "Biceps"], Beginner, Compound),
  exercise!("Seated Cable Row", Back, [CableMachine], ["Mid Back", "Biceps"], Beginner, Compound),
  exercise!("T-Bar Row", Back, [Barbell], ["Mid Back"], Intermediate, Compound),
  // legs
  exercise!("Barbell Squat", Legs, [Barbell, SquatRack], ["Quads", "Glutes", "Hamstrings"], Intermediate, Compound),
  exercise!("Goblet Squat", Legs, [Dumbbell], ["Quads", "Glutes"], Beginner, Compound),
  exercise!("Leg Press", Legs, [LegPressMachine], ["Quads", "Glutes"], Beginner, Compound),
  exercise!("Lunges", Legs, [Dumbbell], ["Quads", "Glutes"], Beginner, Compound),
  exercise!("Romanian Deadlift", Legs, [Barbell], ["Hamstrings", "Glutes", "Lower Back"], Intermediate, Compound),
  exercise!("Leg Curl", Legs, [LegCurlMachine], ["Hamstrings"], Beginner, Isolation),
  exercise!("Leg Extension", Legs, [LegExtensionMachine], ["Quads"], Beginner, Isolation),
  exercise!("Calf Raises", Legs, [Dumbbell], ["Calves"], Beginner, Isolation),
  // shoulders
  exercise!("Overhead Press", Shoulders, [Barbell], ["Shoulders", "Triceps"], Intermediate, Compound),
  exercise!("Dumbbell Shoulder Press", Shoulders, [Dumbbell], ["Shoulders", "Triceps"], Beginner, Compound),
  exercise!("Lateral Raises", Shoulders, [Dumbbell], ["Side Delts"], Beginner, Isolation),
  exercise!("Front Raises", Shoulders, [Dumbbell], ["Front Delts"], Beginner, Isolation),
  exercise!("Face Pulls", Shoulders, [CableMachine], ["Rear Delts"], Beginner, Isolation),
  // arms
  exercise!("Barbell Curl", Arms, [Barbell], ["Biceps"], Beginner, Isolation),
  exercise!("Dumbbell Curl", Arms, [Dumbbell], ["Biceps"], Beginner, Isolation),
  exercise!("Hammer Curl", Arms, [Dumbbell], ["Biceps", "Forearms"], Beginner, Isolation),
  exercise!("Tricep Dips", Arms, [Bench], ["Triceps"], Intermediate, Compound),
  exercise!("Tricep Pushdown", Arms, [CableMachine], ["Triceps"], Beginner, Isolation),
  exercise!("Skull Crushers", Arms, [Barbell, Bench], ["Triceps"], Intermediate, Isolation),
  // core
  exercise!("Plank", Core, [Bodyweight], ["Core"], Beginner, Isometric),
  exercise!("Russian Twists", Core, [Dumbbell], ["Obliques"], Beginner, Isolation),
  exercise!("Bicycle Crunches", Core, [Bodyweight], ["Abs", "Obliques"], Beginner, Isolation),
  exercise!("Hanging Leg Raises", Core, [PullUpBar], ["Lower Abs"], Intermediate, Isolation),
  exercise!("Cable Crunches", Core, [CableMachine], ["Abs"], Beginner, Isolation),
  // cardio
  exercise!("Running", Cardio, [Treadmill], ["Legs", "Cardio"], Beginner, Cardio),
  exercise!("Cycling", Cardio, [Bike], ["Legs", "Cardio"], Beginner, Cardio),
  exercise!("Rowing", Cardio, [RowingMachine], ["Full Body", "Cardio"], Beginner, Cardio),
  exercise!("Jump Rope", Cardio, [JumpRope], ["Legs", "Cardio"], Beginner, Cardio),
  exercise!("Burpees", Cardio, [Bodyweight], ["Full Body", "Cardio"], Intermediate, Cardio),
  // recovery
  exercise!("Walking", Recovery, [Bodyweight], ["Legs"], Beginner, ActiveRecovery),
  exercise!("Yoga Flow", Recovery, [YogaMat], ["Full Body"], Beginner, Flexibility),
  exercise!("Stretching Routine", Recovery, [YogaMat], ["Full Body"], Beginner, Flexibility),
  exercise!("Foam Rolling", Recovery, [FoamRoller], ["Full Body"], Beginner, ActiveRecovery),
];

/// ---------------------------------------------------------------------------
/// Lookup
/// ---------------------------------------------------------------------------

pub fn find(name: &str) -> Option<&'static Exercise> {
  EXERCISES.iter().find(|e| e.name.eq_ignore_ascii_case(name.trim()))
}

pub fn muscle_group_of(name: &str) -> Option<MuscleGroup> {
  find(name).map(|e| e.group)
}

pub fn in_group(group: MuscleGroup) -> impl Iterator<Item = &'static Exercise> {
  EXERCISES.iter().filter(move |e| e.group == group)
}

/// Filters applied when looking for a replacement
#[derive(Debug, Clone, Default)]
pub struct LookupConstraints {
  /// Matched by exact name, case-insensitive
  pub excluded: BTreeSet<String>,
  pub unavailable_equipment: BTreeSet<Equipment>,
  pub preferred_equipment: BTreeSet<Equipment>,
  pub difficulty: Option<Difficulty>,
}

impl LookupConstraints {
  fn excludes(&self, exercise: &Exercise) -> bool {
    self
      .excluded
      .iter()
      .any(|name| name.eq_ignore_ascii_case(exercise.name))
  }
}

/// Same-group candidates for `name`, excluding `name` itself and anything the
/// constraints rule out. Preferred-equipment matches come first; order is
/// otherwise catalog order. Unknown exercises yield an empty list.
pub fn alternatives(name: &str, constraints: &LookupConstraints) -> Vec<&'static Exercise> {
  let Some(group) = muscle_group_of(name) else {
    return Vec::new();
  };
  candidates(group, Some(name), constraints)
}

/// Filtered, preference-sorted members of a group
pub fn candidates(
  group: MuscleGroup,
  skip: Option<&str>,
  constraints: &LookupConstraints,
) -> Vec<&'static Exercise> {
  let mut found: Vec<&'static Exercise> = in_group(group)
    .filter(|e| skip.map_or(true, |s| !e.name.eq_ignore_ascii_case(s.trim())))
    .filter(|e| !constraints.excludes(e))
    .filter(|e| !e.uses_any(&constraints.unavailable_equipment))
    .filter(|e| constraints.difficulty.map_or(true, |d| e.difficulty == d))
    .collect();

  // sort_by_key is stable
  found.sort_by_key(|e| !e.uses_any(&constraints.preferred_equipment));
  found
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_every_group_is_populated() {
    for group in [
      MuscleGroup::Chest,
      MuscleGroup::Back,
      MuscleGroup::Legs,
      MuscleGroup::Shoulders,
      MuscleGroup::Arms,
      MuscleGroup::Core,
      MuscleGroup::Cardio,
      MuscleGroup::Recovery,
    ] {
      assert!(in_group(group).count() >= 4, "{:?} is too small", group);
    }
  }

  #[test]
  fn test_catalog_names_are_unique() {
    let names: BTreeSet<&str> = EXERCISES.iter().map(|e| e.name).collect();
    assert_eq!(names.len(), EXERCISES.len());
  }

  #[test]
  fn test_find_is_case_insensitive() {
    assert_eq!(muscle_group_of("bench press"), Some(MuscleGroup::Chest));
    assert_eq!(muscle_group_of("Unknown Lift"), None);
  }

  #[test]
  fn test_alternatives_exclude_original() {
    let alts = alternatives("Deadlift", &LookupConstraints::default());

    assert!(!alts.is_empty());
    assert!(alts.iter().all(|e| e.name != "Deadlift"));
    assert!(alts.iter().all(|e| e.group == MuscleGroup::Back));
  }

  #[test]
  fn test_alternatives_respect_unavailable_equipment() {
    let constraints = LookupConstraints {
      unavailable_equipment: [Equipment::CableMachine].into_iter().collect(),
      ..Default::default()
    };

    let alts = alternatives("Deadlift", &constraints);

    assert!(alts.iter().all(|e| !e.equipment.contains(&Equipment::CableMachine)));
    assert!(alts.iter().any(|e| e.name == "Pull-ups"));
  }

  #[test]
  fn test_alternatives_put_preferred_equipment_first() {
    let constraints = LookupConstraints {
      preferred_equipment: [Equipment::Dumbbell].into_iter().collect(),
      ..Default::default()
    };

    let alts = alternatives("Bench Press", &constraints);

    assert_eq!(alts[0].name, "Dumbbell Bench Press");
    assert_eq!(alts[1].name, "Incline Dumbbell Press");
    // Remaining keep catalog order
    assert_eq!(alts[2].name, "Push-ups");
  }

  #[test]
  fn test_alternatives_for_unknown_exercise_is_empty() {
    assert!(alternatives("Zercher Carry", &LookupConstraints::default()).is_empty());
  }

  #[test]
  fn test_dumbbells_alias_deserializes() {
    let eq: Equipment = serde_json::from_str(r#""Dumbbells""#).unwrap();
    assert_eq!(eq, Equipment::Dumbbell);
    assert_eq!(serde_json::to_string(&Equipment::PullUpBar).unwrap(), r#""Pull-up Bar""#);
  }
}
