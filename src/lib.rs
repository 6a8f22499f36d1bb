//! Adaptive coaching decision core
//!
//! Decides what the user should see next and how today's training load should
//! change, from stored history plus fresh daily check-ins. The host owns
//! rendering, persistence wiring and the tracing subscriber; this crate is
//! invoked in-process.

#[cfg(test)]
#[macro_use]
mod test_utils;

pub mod actions;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod db;
pub mod llm;
pub mod models;
pub mod negotiator;
pub mod orchestrator;
pub mod pain;
pub mod patterns;
pub mod proactive;
pub mod progression;
pub mod readiness;
pub mod router;
pub mod store;

pub use actions::CardAction;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{CoachConfig, ConfigError};
pub use db::DbError;
pub use llm::{HttpProvider, Provider, ProviderError, ProviderId, ProviderOutput, WorkoutPlan};
pub use negotiator::{Alternative, ExerciseNegotiator, SwapConstraints, SwapReason};
pub use orchestrator::{select_card, CardOrchestrator, Freshness};
pub use proactive::{check_triggers, ProactiveMessage, Trigger, WorkoutHistory};
pub use progression::{calculate_progression, ProgressiveOverload, Recommendation};
pub use readiness::{score_readiness, BiometricSnapshot, ReadinessReport};
pub use router::{ErrorEnvelope, ProviderRouter, RouteResult, TaskKind};
pub use store::{InMemoryStore, Store};
