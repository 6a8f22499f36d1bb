//! Card Orchestrator
//!
//! One decision cycle reads today's log once, picks exactly one card from the
//! period's precedence chain and assembles its payload. The workout card and
//! the day summary suspend on a provider call bounded by a deadline; both
//! degrade to a locally built payload. Check cards have no side effects; the
//! user's answer comes back later as a `CardAction`.

use std::time::Duration;

use chrono::NaiveDate;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::actions::CardAction;
use crate::clock::Clock;
use crate::config::CoachConfig;
use crate::llm::{
  MemoryDigest, ProviderOutput, PsychologicalState, TaskPayload, WorkoutPlan, WorkoutRequest,
};
use crate::models::card::{CheckPrompt, Choice, DayStats, DaySummary, ResponseOptions, WorkoutCard};
use crate::models::{
  BodyLocation, CardKind, CardPayload, ContentUnit, DailyLog, Meal, Motivation, PainSeverity,
  SleepQuality, StressLevel, TimeContext, TimePeriod, HYDRATION_GOAL,
};
use crate::pain;
use crate::proactive::{self, ProactiveMessage, WorkoutHistory};
use crate::readiness::{score_readiness, BiometricSnapshot, ReadinessReport};
use crate::router::{ProviderRouter, TaskKind};
use crate::store::Store;

pub const DEFAULT_PROVIDER_DEADLINE: Duration = Duration::from_secs(5);

/// Morning hydration prompt shows below this many glasses
const MORNING_HYDRATION_MIN: u32 = 2;
/// Afternoon hydration prompt shows below this many glasses
const AFTERNOON_HYDRATION_MIN: u32 = 4;
/// Days of logs read when summarising workout history for nudges
const NUDGE_HISTORY_DAYS: u32 = 30;
const FALLBACK_INSIGHT: &str = "Great work today! Keep up the momentum.";

/// ---------------------------------------------------------------------------
/// Selection
/// ---------------------------------------------------------------------------

/// What has already been answered today. Taken once per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Freshness {
  pub sleep_logged: bool,
  pub motivation_logged: bool,
  pub stress_logged: bool,
  pub pain_logged: bool,
  pub hydration: u32,
  pub dinner_logged: bool,
  pub workout_completed: bool,
}

impl Freshness {
  pub fn from_log(log: &DailyLog) -> Self {
    Self {
      sleep_logged: log.sleep.is_some(),
      motivation_logged: log.motivation.is_some(),
      stress_logged: log.stress.is_some(),
      pain_logged: log.pain.is_some(),
      hydration: log.hydration,
      dinner_logged: log.meals.get(Meal::Dinner).is_some(),
      workout_completed: log.workout_completed(),
    }
  }
}

/// Precedence chain for a period. The last entry is always due.
pub fn precedence(period: TimePeriod) -> &'static [CardKind] {
  match period {
    TimePeriod::Morning => &[
      CardKind::SleepCheck,
      CardKind::MotivationCheck,
      CardKind::StressCheck,
      CardKind::PainCheck,
      CardKind::HydrationPrompt,
      CardKind::WorkoutPlan,
    ],
    TimePeriod::Afternoon => &[
      CardKind::HydrationPrompt,
      CardKind::WorkoutPlan,
      CardKind::DaySummary,
    ],
    TimePeriod::Evening => &[CardKind::MealCheck, CardKind::DaySummary],
    TimePeriod::Night => &[CardKind::DaySummary],
  }
}

fn is_due(kind: CardKind, period: TimePeriod, fresh: &Freshness) -> bool {
  match kind {
    CardKind::SleepCheck => !fresh.sleep_logged,
    CardKind::MotivationCheck => !fresh.motivation_logged,
    CardKind::StressCheck => !fresh.stress_logged,
    CardKind::PainCheck => !fresh.pain_logged,
    CardKind::HydrationPrompt => match period {
      TimePeriod::Morning => fresh.hydration < MORNING_HYDRATION_MIN,
      _ => fresh.hydration < AFTERNOON_HYDRATION_MIN,
    },
    // Morning ends on the workout regardless; afternoon only until it's done
    CardKind::WorkoutPlan => period == TimePeriod::Morning || !fresh.workout_completed,
    CardKind::MealCheck => !fresh.dinner_logged,
    CardKind::DaySummary => true,
  }
}

/// First due card in the period's chain
pub fn select_card(period: TimePeriod, fresh: &Freshness) -> CardKind {
  precedence(period)
    .iter()
    .copied()
    .find(|kind| is_due(*kind, period, fresh))
    .unwrap_or(CardKind::DaySummary)
}

/// ---------------------------------------------------------------------------
/// Check payloads
/// ---------------------------------------------------------------------------

fn choice(label: &str, action: CardAction) -> Choice {
  Choice {
    label: label.to_string(),
    action,
  }
}

fn sleep_check(time: &TimeContext, name: &str) -> CheckPrompt {
  CheckPrompt {
    title: format!("Good {}, {}!", time.period.greeting(), name),
    question: "How did you sleep last night?".to_string(),
    options: ResponseOptions::Choice {
      choices: SleepQuality::ALL
        .iter()
        .map(|q| choice(q.label(), CardAction::LogSleep(*q)))
        .collect(),
    },
    reasoning: "Sleep quality determines today's workout intensity".to_string(),
  }
}

fn motivation_check() -> CheckPrompt {
  CheckPrompt {
    title: "Quick check-in".to_string(),
    question: "What's your energy level for today's plan?".to_string(),
    options: ResponseOptions::Choice {
      choices: vec![
        choice("Ready to crush it!", CardAction::LogMotivation(Motivation::High)),
        choice("Can manage", CardAction::LogMotivation(Motivation::Neutral)),
        choice("Need a break", CardAction::LogMotivation(Motivation::Low)),
      ],
    },
    reasoning: "Mental readiness is as important as physical readiness".to_string(),
  }
}

fn stress_check() -> CheckPrompt {
  const LABELS: [&str; 5] = [
    "Very Low (Zen)",
    "Low (Calm)",
    "Neutral",
    "High (Tense)",
    "Very High (Overwhelmed)",
  ];

  let choices = (StressLevel::MIN..=StressLevel::MAX)
    .zip(LABELS)
    .filter_map(|(level, label)| {
      StressLevel::new(level).map(|s| choice(label, CardAction::LogStress(s)))
    })
    .collect();

  CheckPrompt {
    title: "How are you feeling?".to_string(),
    question: "What's your current stress level?".to_string(),
    options: ResponseOptions::Choice { choices },
    reasoning: "High stress requires recovery mode".to_string(),
  }
}

fn pain_check() -> CheckPrompt {
  CheckPrompt {
    title: "Safety Check".to_string(),
    question: "Any pain or issues today that might affect your training?".to_string(),
    options: ResponseOptions::PainSelector {
      locations: BodyLocation::ALL.to_vec(),
      severities: vec![PainSeverity::Mild, PainSeverity::Moderate, PainSeverity::Severe],
    },
    reasoning: "Safety is our top priority - exercises that could aggravate pain are avoided"
      .to_string(),
  }
}

fn hydration_prompt(current: u32) -> CheckPrompt {
  CheckPrompt {
    title: "Stay hydrated!".to_string(),
    question: "How many glasses of water have you had today?".to_string(),
    options: ResponseOptions::Stepper {
      current,
      goal: HYDRATION_GOAL,
    },
    reasoning: "Hydration affects performance and recovery".to_string(),
  }
}

fn meal_check(hour: u32) -> CheckPrompt {
  let meal = Meal::for_hour(hour);
  CheckPrompt {
    title: "Meal check".to_string(),
    question: format!("Did you eat {}?", meal.as_str()),
    options: ResponseOptions::Choice {
      choices: vec![
        choice("Yes", CardAction::LogMeal { meal, eaten: true }),
        choice("No", CardAction::LogMeal { meal, eaten: false }),
      ],
    },
    reasoning: "Nutrition tracking affects recovery score".to_string(),
  }
}

/// ---------------------------------------------------------------------------
/// Day summary
/// ---------------------------------------------------------------------------

fn day_stats(log: &DailyLog, readiness: &ReadinessReport) -> DayStats {
  DayStats {
    workouts_completed: log.workouts.iter().filter(|w| w.completed).count() as u32,
    meals_logged: log.meals.logged_count(),
    hydration_glasses: log.hydration,
    hydration_goal: HYDRATION_GOAL,
    readiness_score: readiness.score,
  }
}

/// Focus and detail for tomorrow, from today's numbers only
fn tomorrow_preview(log: &DailyLog, readiness: &ReadinessReport) -> (&'static str, &'static str) {
  if readiness.recovery_mode || readiness.score < 40 {
    (
      "Recovery",
      "Gentle mobility and an early night. Tomorrow is about feeling better, not training harder.",
    )
  } else if !log.active_pain().is_empty() {
    (
      "Pain-free movement",
      "Keep tomorrow easy on today's sore areas and check in again in the morning.",
    )
  } else if log.workout_completed() {
    (
      "Active recovery",
      "You trained today. Light cardio or stretching lets tomorrow's body catch up.",
    )
  } else if readiness.score >= 60 {
    (
      "Strength session",
      "You're well recovered. A full session fits tomorrow.",
    )
  } else {
    (
      "Moderate session",
      "A moderate workout keeps momentum without digging into recovery.",
    )
  }
}

/// Context handed to the insight provider
fn insight_context(
  log: &DailyLog,
  stats: &DayStats,
  readiness: &ReadinessReport,
  biometrics: Option<&BiometricSnapshot>,
) -> serde_json::Value {
  json!({
    "recoveryScore": readiness.score,
    "recoveryMode": readiness.recovery_mode,
    "hydration": stats.hydration_glasses,
    "hydrationGoal": stats.hydration_goal,
    "workoutsCompleted": stats.workouts_completed,
    "mealsLogged": stats.meals_logged,
    "sleep": log.sleep.map(|q| q.label()),
    "painAreas": log.active_pain(),
    "hrv": biometrics.and_then(|b| b.hrv),
    "restingHr": biometrics.and_then(|b| b.resting_hr),
  })
}

/// ---------------------------------------------------------------------------
/// Orchestrator
/// ---------------------------------------------------------------------------

pub struct CardOrchestrator<S, C> {
  store: S,
  clock: C,
  router: ProviderRouter,
  deadline: Duration,
}

impl<S: Store, C: Clock> CardOrchestrator<S, C> {
  pub fn new(store: S, clock: C, router: ProviderRouter) -> Self {
    Self {
      store,
      clock,
      router,
      deadline: DEFAULT_PROVIDER_DEADLINE,
    }
  }

  /// HTTP providers and deadline taken from the environment configuration
  pub fn from_config(store: S, clock: C, config: &CoachConfig) -> Self {
    Self::new(store, clock, ProviderRouter::from_config(config)).with_deadline(config.provider_timeout)
  }

  /// Deadline for each provider call
  pub fn with_deadline(mut self, deadline: Duration) -> Self {
    self.deadline = deadline;
    self
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  pub fn into_inner(self) -> S {
    self.store
  }

  /// Write the user's answer against today's log
  pub fn respond(&mut self, action: CardAction) {
    let today = self.clock.today();
    action.apply(&mut self.store, today);
  }

  /// Run one decision cycle. Always yields exactly one card.
  pub async fn next_card(&mut self, biometrics: Option<&BiometricSnapshot>) -> ContentUnit {
    let time = self.clock.time_context();
    let today = self.store.today_log(time.date).clone();
    let fresh = Freshness::from_log(&today);

    let kind = select_card(time.period, &fresh);
    info!(period = ?time.period, kind = ?kind, date = %time.date, "Card selected");

    let payload = match kind {
      CardKind::SleepCheck => CardPayload::Check(sleep_check(&time, &self.store.profile().name)),
      CardKind::MotivationCheck => CardPayload::Check(motivation_check()),
      CardKind::StressCheck => CardPayload::Check(stress_check()),
      CardKind::PainCheck => CardPayload::Check(pain_check()),
      CardKind::HydrationPrompt => CardPayload::Check(hydration_prompt(today.hydration)),
      CardKind::MealCheck => CardPayload::Check(meal_check(time.hour)),
      CardKind::WorkoutPlan => {
        let readiness = self.readiness(&today, time.date, biometrics);
        let card = self.workout_card(&today, &time, readiness, Vec::new()).await;
        CardPayload::Workout(Box::new(card))
      }
      CardKind::DaySummary => {
        let readiness = self.readiness(&today, time.date, biometrics);
        CardPayload::Summary(self.day_summary(&today, &readiness, biometrics).await)
      }
    };

    ContentUnit {
      kind,
      payload,
      time_context: time,
    }
  }

  /// Fresh workout card in place of `previous`, outside the normal selection
  pub async fn regenerate_workout(
    &mut self,
    previous: &WorkoutPlan,
    biometrics: Option<&BiometricSnapshot>,
  ) -> WorkoutCard {
    let time = self.clock.time_context();
    let today = self.store.today_log(time.date).clone();
    let readiness = self.readiness(&today, time.date, biometrics);
    info!(date = %time.date, replaced = previous.exercises.len(), "Regenerating workout");

    let previous_exercises = previous.exercises.iter().map(|e| e.name.clone()).collect();
    self
      .workout_card(&today, &time, readiness, previous_exercises)
      .await
  }

  /// Highest-priority nudge for right now, if any
  pub fn proactive_nudge(&mut self) -> Option<ProactiveMessage> {
    let time = self.clock.time_context();
    let today = self.store.today_log(time.date).clone();
    let mut history = WorkoutHistory::from_logs(&self.store.recent_logs(time.date, NUDGE_HISTORY_DAYS));
    history.last_workout = self.store.last_workout_date(time.date);

    let message = proactive::check_triggers(&today, self.store.memory(), &history, time.hour);
    if let Some(message) = &message {
      info!(trigger = ?message.trigger, priority = ?message.priority, "Proactive nudge");
    }
    message
  }

  fn readiness(
    &self,
    today: &DailyLog,
    date: NaiveDate,
    biometrics: Option<&BiometricSnapshot>,
  ) -> ReadinessReport {
    let report = score_readiness(today, self.store.last_workout_date(date), biometrics);
    debug!(
      score = report.score,
      recovery_mode = report.recovery_mode,
      "Readiness scored"
    );
    report
  }

  async fn workout_card(
    &self,
    today: &DailyLog,
    time: &TimeContext,
    readiness: ReadinessReport,
    previous_exercises: Vec<String>,
  ) -> WorkoutCard {
    let pain_areas = today.active_pain();
    let request = WorkoutRequest {
      profile: self.store.profile().clone(),
      readiness: readiness.clone(),
      psychological_state: PsychologicalState {
        motivation: today.motivation,
        stress: today.stress.map(|s| s.value()),
      },
      memory: MemoryDigest::from(self.store.memory()),
      time_context: *time,
      pain: pain_areas.to_vec(),
      previous_exercises,
    };

    let result = self
      .router
      .route_with_deadline(
        TaskKind::WorkoutGeneration,
        &TaskPayload::Workout(Box::new(request)),
        self.deadline,
      )
      .await;

    let (plan, degraded) = match result.into_output() {
      Some(ProviderOutput::WorkoutPlan(plan)) => (plan, false),
      _ => {
        warn!("Workout generation degraded, using fallback plan");
        (WorkoutPlan::fallback(), true)
      }
    };

    let filtered = pain::filter_plan(plan, pain_areas);
    let modified = filtered.modified();
    let reasoning = if modified {
      format!(
        "{} (Modified for safety due to reported pain)",
        filtered.plan.reasoning
      )
    } else {
      filtered.plan.reasoning.clone()
    };

    WorkoutCard {
      title: "Your workout for today".to_string(),
      can_regenerate: true,
      needs_regeneration: filtered.needs_regeneration,
      warning: filtered.warning,
      modification_note: if modified {
        pain::modification_message(pain_areas)
      } else {
        None
      },
      removed_exercises: filtered.removed,
      degraded,
      readiness,
      reasoning,
      plan: filtered.plan,
    }
  }

  async fn day_summary(
    &self,
    today: &DailyLog,
    readiness: &ReadinessReport,
    biometrics: Option<&BiometricSnapshot>,
  ) -> DaySummary {
    let stats = day_stats(today, readiness);
    let payload = TaskPayload::Context {
      context: insight_context(today, &stats, readiness, biometrics),
    };
    let result = self
      .router
      .route_with_deadline(TaskKind::DayInsight, &payload, self.deadline)
      .await;

    let (insight, focus, detail, degraded) = match result.into_output() {
      Some(ProviderOutput::DayInsight(insight)) => (
        insight.insight_text,
        insight.next_day_focus,
        insight.next_day_detail,
        false,
      ),
      _ => {
        warn!("Day insight degraded, using local preview");
        let (focus, detail) = tomorrow_preview(today, readiness);
        (
          FALLBACK_INSIGHT.to_string(),
          focus.to_string(),
          detail.to_string(),
          true,
        )
      }
    };

    DaySummary {
      title: "Your day at a glance".to_string(),
      insight,
      stats,
      tomorrow_focus: focus,
      tomorrow_detail: detail,
      reasoning: "Reflect and prepare for tomorrow".to_string(),
      degraded,
    }
  }
}
