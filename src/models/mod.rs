pub mod card;
pub mod daily_log;
pub mod memory;
pub mod performance;
pub mod profile;

pub use card::{CardKind, CardPayload, ContentUnit, Intensity, TimeContext, TimePeriod};
pub use daily_log::{
  BodyLocation, DailyLog, LogPatch, Meal, MealFlags, Motivation, PainEntry, PainReport,
  PainSeverity, SleepQuality, StressLevel, WorkoutRecord, HYDRATION_GOAL,
};
pub use memory::{InjuryWatch, Memory, MemoryPatch, ProgressionStatus, PsychPattern};
pub use performance::{PerformanceRecord, TrainingStyle};
pub use profile::{ActivityLevel, ExperienceLevel, Goal, Profile};
