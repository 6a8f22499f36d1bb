//! Provider Router
//!
//! Static task-kind -> provider mapping with a fixed fallback chain per task.
//! Failures never escape: an exhausted chain (or an expired deadline) becomes
//! an `ErrorEnvelope`, which callers treat as a degraded but valid result.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::CoachConfig;
use crate::llm::{
  HttpProvider, Provider, ProviderError, ProviderId, ProviderOutput, ResponseSchema, TaskPayload,
};

/// ---------------------------------------------------------------------------
/// Task kinds
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
  WorkoutGeneration,
  ProgressionAnalysis,
  PatternDetection,
  Chat,
  ProactiveMessage,
  DailyTip,
  DayInsight,
  WorkoutEstimation,
}

impl TaskKind {
  pub fn primary(&self) -> ProviderId {
    match self {
      TaskKind::WorkoutGeneration | TaskKind::ProgressionAnalysis | TaskKind::PatternDetection => {
        ProviderId::Reasoning
      }
      TaskKind::Chat | TaskKind::ProactiveMessage | TaskKind::DailyTip => ProviderId::Chat,
      TaskKind::DayInsight | TaskKind::WorkoutEstimation => ProviderId::Multimodal,
    }
  }

  /// Providers tried, in order, when the primary fails
  pub fn fallbacks(&self) -> &'static [ProviderId] {
    match self.primary() {
      ProviderId::Reasoning => &[ProviderId::Chat],
      ProviderId::Chat => &[ProviderId::Multimodal],
      ProviderId::Multimodal => &[],
    }
  }

  pub fn chain(&self) -> impl Iterator<Item = ProviderId> {
    std::iter::once(self.primary()).chain(self.fallbacks().iter().copied())
  }

  pub fn schema(&self) -> ResponseSchema {
    match self {
      TaskKind::WorkoutGeneration => ResponseSchema::WorkoutPlan,
      TaskKind::DayInsight => ResponseSchema::DayInsight,
      _ => ResponseSchema::Text,
    }
  }

  /// Task line placed ahead of the serialized context
  pub fn instruction(&self) -> &'static str {
    match self {
      TaskKind::WorkoutGeneration => "Generate today's workout for this athlete.",
      TaskKind::ProgressionAnalysis => {
        "Analyse this exercise history for plateaus, overtraining or healthy progression."
      }
      TaskKind::PatternDetection => {
        "Look for recurring motivation or stress patterns in these check-ins."
      }
      TaskKind::Chat => "Reply to the athlete.",
      TaskKind::ProactiveMessage => "Write a short, encouraging nudge for the athlete.",
      TaskKind::DailyTip => "Give one practical training or nutrition tip for this goal.",
      TaskKind::DayInsight => "Summarise the athlete's day and suggest tomorrow's focus.",
      TaskKind::WorkoutEstimation => "Estimate calories burned and effort for this workout.",
    }
  }

  fn as_str(&self) -> &'static str {
    match self {
      TaskKind::WorkoutGeneration => "workout_generation",
      TaskKind::ProgressionAnalysis => "progression_analysis",
      TaskKind::PatternDetection => "pattern_detection",
      TaskKind::Chat => "chat",
      TaskKind::ProactiveMessage => "proactive_message",
      TaskKind::DailyTip => "daily_tip",
      TaskKind::DayInsight => "day_insight",
      TaskKind::WorkoutEstimation => "workout_estimation",
    }
  }
}

impl fmt::Display for TaskKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// ---------------------------------------------------------------------------
/// Results
/// ---------------------------------------------------------------------------

/// Non-fatal "feature temporarily degraded" result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
  pub error: String,
  /// Always true
  pub fallback: bool,
  pub message: String,
  pub task: TaskKind,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub detail: Option<String>,
}

impl ErrorEnvelope {
  pub fn exhausted(task: TaskKind, last_error: Option<&ProviderError>) -> Self {
    let (error, message) = match task.primary() {
      ProviderId::Reasoning => (
        "All AI services unavailable",
        "AI services are temporarily unavailable. Please try again in a moment.",
      ),
      ProviderId::Chat => (
        "Chat service unavailable",
        "Chat is temporarily unavailable. Please try again.",
      ),
      ProviderId::Multimodal => (
        "Service unavailable",
        "This feature is temporarily unavailable. Please try again in a moment.",
      ),
    };

    Self {
      error: error.to_string(),
      fallback: true,
      message: message.to_string(),
      task,
      detail: last_error.map(|e| e.to_string()),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RouteResult {
  Success {
    provider: ProviderId,
    output: ProviderOutput,
    /// Served by a provider other than the primary
    fell_back: bool,
  },
  Degraded(ErrorEnvelope),
}

impl RouteResult {
  pub fn output(&self) -> Option<&ProviderOutput> {
    match self {
      RouteResult::Success { output, .. } => Some(output),
      RouteResult::Degraded(_) => None,
    }
  }

  pub fn into_output(self) -> Option<ProviderOutput> {
    match self {
      RouteResult::Success { output, .. } => Some(output),
      RouteResult::Degraded(_) => None,
    }
  }

  pub fn is_degraded(&self) -> bool {
    matches!(self, RouteResult::Degraded(_))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderHealth {
  Online,
  Offline,
  /// No credentials configured
  Missing,
}

/// ---------------------------------------------------------------------------
/// Router
/// ---------------------------------------------------------------------------

#[derive(Default, Clone)]
pub struct ProviderRouter {
  providers: HashMap<ProviderId, Arc<dyn Provider>>,
}

impl ProviderRouter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register (or replace) the provider for its `id()`
  pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
    self.providers.insert(provider.id(), provider);
    self
  }

  /// HTTP providers for every configured API key
  pub fn from_config(config: &CoachConfig) -> Self {
    config
      .providers
      .iter()
      .fold(Self::new(), |router, (id, settings)| {
        router.with_provider(Arc::new(HttpProvider::new(*id, settings.clone())))
      })
  }

  pub fn has_provider(&self, id: ProviderId) -> bool {
    self.providers.contains_key(&id)
  }

  /// Try the task's chain in order; the first conforming output wins
  pub async fn route(&self, task: TaskKind, payload: &TaskPayload) -> RouteResult {
    let primary = task.primary();
    let mut last_error = None;

    for id in task.chain() {
      let Some(provider) = self.providers.get(&id) else {
        debug!(task = %task, provider = %id, "Provider not registered, skipping");
        last_error = Some(ProviderError::NotConfigured(id));
        continue;
      };

      debug!(task = %task, provider = %id, "Routing task");
      let result = provider.generate(task, payload).await.and_then(|output| {
        if output.schema() != task.schema() {
          return Err(ProviderError::Malformed(format!(
            "expected {:?}, got {:?}",
            task.schema(),
            output.schema()
          )));
        }
        output.validate()?;
        Ok(output)
      });

      match result {
        Ok(output) => {
          if id != primary {
            info!(task = %task, provider = %id, "Served by fallback provider");
          }
          return RouteResult::Success {
            provider: id,
            output,
            fell_back: id != primary,
          };
        }
        Err(e) => {
          warn!(task = %task, provider = %id, error = %e, "Provider failed");
          last_error = Some(e);
        }
      }
    }

    warn!(task = %task, "All providers failed, returning degraded result");
    RouteResult::Degraded(ErrorEnvelope::exhausted(task, last_error.as_ref()))
  }

  /// `route` raced against `deadline`. On expiry the in-flight call is
  /// dropped, so a late response can never be applied.
  pub async fn route_with_deadline(
    &self,
    task: TaskKind,
    payload: &TaskPayload,
    deadline: Duration,
  ) -> RouteResult {
    match tokio::time::timeout(deadline, self.route(task, payload)).await {
      Ok(result) => result,
      Err(_) => {
        warn!(task = %task, deadline_ms = deadline.as_millis() as u64, "Provider deadline expired");
        RouteResult::Degraded(ErrorEnvelope::exhausted(task, Some(&ProviderError::Timeout)))
      }
    }
  }

  /// Online/offline per provider slot
  pub async fn health_check(&self) -> BTreeMap<ProviderId, ProviderHealth> {
    let mut status = BTreeMap::new();
    for id in [ProviderId::Reasoning, ProviderId::Chat, ProviderId::Multimodal] {
      let health = match self.providers.get(&id) {
        None => ProviderHealth::Missing,
        Some(provider) if provider.health_check().await => ProviderHealth::Online,
        Some(_) => ProviderHealth::Offline,
      };
      status.insert(id, health);
    }
    status
  }
}
