use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// UI-facing hydration goal (glasses per day)
pub const HYDRATION_GOAL: u32 = 8;

/// ---------------------------------------------------------------------------
/// Check-in values
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SleepQuality {
  #[serde(rename = "Very Poor")]
  VeryPoor,
  Poor,
  Neutral,
  Well,
  #[serde(rename = "Very Well")]
  VeryWell,
}

impl SleepQuality {
  pub const ALL: [SleepQuality; 5] = [
    SleepQuality::VeryPoor,
    SleepQuality::Poor,
    SleepQuality::Neutral,
    SleepQuality::Well,
    SleepQuality::VeryWell,
  ];

  pub fn label(&self) -> &'static str {
    match self {
      SleepQuality::VeryPoor => "Very Poor",
      SleepQuality::Poor => "Poor",
      SleepQuality::Neutral => "Neutral",
      SleepQuality::Well => "Well",
      SleepQuality::VeryWell => "Very Well",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Motivation {
  Low,
  Neutral,
  High,
}

/// Self-reported stress on a 1-5 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct StressLevel(u8);

impl StressLevel {
  pub const MIN: u8 = 1;
  pub const MAX: u8 = 5;

  pub fn new(level: u8) -> Option<Self> {
    (Self::MIN..=Self::MAX).contains(&level).then_some(Self(level))
  }

  pub fn value(&self) -> u8 {
    self.0
  }

  /// 4 and 5 force recovery mode
  pub fn is_high(&self) -> bool {
    self.0 >= 4
  }
}

impl TryFrom<u8> for StressLevel {
  type Error = String;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Self::new(value).ok_or_else(|| format!("Stress level must be 1-5, got {}", value))
  }
}

impl From<StressLevel> for u8 {
  fn from(level: StressLevel) -> Self {
    level.0
  }
}

/// ---------------------------------------------------------------------------
/// Pain
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PainSeverity {
  Mild,
  Moderate,
  Severe,
}

impl PainSeverity {
  pub fn is_serious(&self) -> bool {
    matches!(self, PainSeverity::Moderate | PainSeverity::Severe)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BodyLocation {
  Neck,
  Shoulders,
  #[serde(rename = "Upper Back")]
  UpperBack,
  #[serde(rename = "Lower Back")]
  LowerBack,
  Chest,
  Hips,
  Knees,
  Ankles,
  Wrists,
  Elbows,
}

impl BodyLocation {
  pub const ALL: [BodyLocation; 10] = [
    BodyLocation::Neck,
    BodyLocation::Shoulders,
    BodyLocation::UpperBack,
    BodyLocation::LowerBack,
    BodyLocation::Chest,
    BodyLocation::Hips,
    BodyLocation::Knees,
    BodyLocation::Ankles,
    BodyLocation::Wrists,
    BodyLocation::Elbows,
  ];

  pub fn label(&self) -> &'static str {
    match self {
      BodyLocation::Neck => "Neck",
      BodyLocation::Shoulders => "Shoulders",
      BodyLocation::UpperBack => "Upper Back",
      BodyLocation::LowerBack => "Lower Back",
      BodyLocation::Chest => "Chest",
      BodyLocation::Hips => "Hips",
      BodyLocation::Knees => "Knees",
      BodyLocation::Ankles => "Ankles",
      BodyLocation::Wrists => "Wrists",
      BodyLocation::Elbows => "Elbows",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PainEntry {
  pub location: BodyLocation,
  pub severity: PainSeverity,
}

/// Answer to the pain check. `has_pain = false` still counts as "logged".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PainReport {
  pub has_pain: bool,
  #[serde(default)]
  pub areas: Vec<PainEntry>,
}

impl PainReport {
  pub fn none() -> Self {
    Self::default()
  }

  pub fn with_areas(areas: Vec<PainEntry>) -> Self {
    Self {
      has_pain: !areas.is_empty(),
      areas,
    }
  }

  /// Areas that should affect today's training
  pub fn active_areas(&self) -> &[PainEntry] {
    if self.has_pain {
      &self.areas
    } else {
      &[]
    }
  }
}

/// ---------------------------------------------------------------------------
/// Meals and workouts
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Meal {
  Breakfast,
  Lunch,
  Dinner,
}

impl Meal {
  /// Meal most likely being asked about at a given hour
  pub fn for_hour(hour: u32) -> Self {
    if hour < 11 {
      Meal::Breakfast
    } else if hour < 15 {
      Meal::Lunch
    } else {
      Meal::Dinner
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Meal::Breakfast => "breakfast",
      Meal::Lunch => "lunch",
      Meal::Dinner => "dinner",
    }
  }
}

/// `None` = not logged, `Some(false)` = logged as skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MealFlags {
  pub breakfast: Option<bool>,
  pub lunch: Option<bool>,
  pub dinner: Option<bool>,
}

impl MealFlags {
  pub fn get(&self, meal: Meal) -> Option<bool> {
    match meal {
      Meal::Breakfast => self.breakfast,
      Meal::Lunch => self.lunch,
      Meal::Dinner => self.dinner,
    }
  }

  pub fn set(&mut self, meal: Meal, eaten: bool) {
    match meal {
      Meal::Breakfast => self.breakfast = Some(eaten),
      Meal::Lunch => self.lunch = Some(eaten),
      Meal::Dinner => self.dinner = Some(eaten),
    }
  }

  pub fn eaten_count(&self) -> u32 {
    [self.breakfast, self.lunch, self.dinner]
      .iter()
      .filter(|m| **m == Some(true))
      .count() as u32
  }

  pub fn logged_count(&self) -> u32 {
    [self.breakfast, self.lunch, self.dinner]
      .iter()
      .filter(|m| m.is_some())
      .count() as u32
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
  pub workout_type: String,
  pub duration_minutes: u32,
  pub completed: bool,
}

/// ---------------------------------------------------------------------------
/// Daily Log
/// ---------------------------------------------------------------------------

/// One record per calendar date, created lazily on first access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
  pub date: NaiveDate,
  pub sleep: Option<SleepQuality>,
  pub motivation: Option<Motivation>,
  pub stress: Option<StressLevel>,
  pub pain: Option<PainReport>,
  #[serde(default)]
  pub hydration: u32,
  #[serde(default)]
  pub meals: MealFlags,
  #[serde(default)]
  pub workouts: Vec<WorkoutRecord>,
}

impl DailyLog {
  pub fn empty(date: NaiveDate) -> Self {
    Self {
      date,
      sleep: None,
      motivation: None,
      stress: None,
      pain: None,
      hydration: 0,
      meals: MealFlags::default(),
      workouts: Vec::new(),
    }
  }

  pub fn workout_completed(&self) -> bool {
    self.workouts.iter().any(|w| w.completed)
  }

  pub fn active_pain(&self) -> &[PainEntry] {
    self.pain.as_ref().map(|p| p.active_areas()).unwrap_or(&[])
  }

  pub fn apply(&mut self, patch: LogPatch) {
    match patch {
      LogPatch::Sleep(quality) => self.sleep = Some(quality),
      LogPatch::Motivation(level) => self.motivation = Some(level),
      LogPatch::Stress(level) => self.stress = Some(level),
      LogPatch::Pain(report) => self.pain = Some(report),
      LogPatch::AddHydration(glasses) => self.hydration = self.hydration.saturating_add(glasses),
      LogPatch::Meal { meal, eaten } => self.meals.set(meal, eaten),
      LogPatch::Workout(record) => self.workouts.push(record),
    }
  }
}

/// A single write against today's log. Hydration only ever grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum LogPatch {
  Sleep(SleepQuality),
  Motivation(Motivation),
  Stress(StressLevel),
  Pain(PainReport),
  AddHydration(u32),
  Meal { meal: Meal, eaten: bool },
  Workout(WorkoutRecord),
}
