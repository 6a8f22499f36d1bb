//! Generative text providers
//!
//! Each provider is reached through the OpenAI-compatible chat-completions
//! API (DeepSeek, Groq and Gemini all expose one). Responses are parsed into a
//! per-task schema and validated; anything that does not conform is a
//! `ProviderError::Malformed` and counts as a provider failure.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::models::{
  BodyLocation, Intensity, Memory, Motivation, PainEntry, ProgressionStatus, Profile,
  TimeContext,
};
use crate::readiness::ReadinessReport;
use crate::router::TaskKind;

/// ---------------------------------------------------------------------------
/// Configuration
/// ---------------------------------------------------------------------------

const MAX_TOKENS: u32 = 1500;
const SYSTEM_PROMPT: &str = include_str!("prompts/coach_system.txt");

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum ProviderError {
  #[error("Provider not configured: {0}")]
  NotConfigured(ProviderId),

  #[error("Request failed: {0}")]
  Request(String),

  #[error("API error: {0}")]
  Api(String),

  #[error("Malformed response: {0}")]
  Malformed(String),

  #[error("Provider timed out")]
  Timeout,
}

/// ---------------------------------------------------------------------------
/// Provider identity
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
  /// Reasoning-heavy generation (DeepSeek)
  Reasoning,
  /// Latency-sensitive chat (Groq)
  Chat,
  /// Multimodal and estimation (Gemini)
  Multimodal,
}

impl fmt::Display for ProviderId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ProviderId::Reasoning => write!(f, "reasoning"),
      ProviderId::Chat => write!(f, "chat"),
      ProviderId::Multimodal => write!(f, "multimodal"),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Response schemas
/// ---------------------------------------------------------------------------

/// Reps are a count ("8") or a description ("20 minutes", "8-12")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reps {
  Count(u32),
  Description(String),
}

impl fmt::Display for Reps {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Reps::Count(n) => write!(f, "{}", n),
      Reps::Description(s) => f.write_str(s),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedExercise {
  pub name: String,
  pub sets: u32,
  pub reps: Reps,
  #[serde(default, alias = "rest_seconds")]
  pub rest_seconds: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
  #[serde(alias = "workout_type")]
  pub workout_type: String,
  pub reasoning: String,
  #[serde(alias = "duration_minutes")]
  pub duration_minutes: u32,
  pub intensity: Intensity,
  pub exercises: Vec<PlannedExercise>,
}

impl WorkoutPlan {
  /// Minimal plan used when generation fails or times out
  pub fn fallback() -> Self {
    Self {
      workout_type: "Light Activity".to_string(),
      reasoning: "AI service temporarily unavailable - here's a simple workout".to_string(),
      duration_minutes: 20,
      intensity: Intensity::Low,
      exercises: vec![PlannedExercise {
        name: "Walking".to_string(),
        sets: 1,
        reps: Reps::Description("20 minutes".to_string()),
        rest_seconds: Some(0),
      }],
    }
  }

  pub fn validate(&self) -> Result<(), ProviderError> {
    if self.workout_type.trim().is_empty() {
      return Err(ProviderError::Malformed("workout type is empty".to_string()));
    }
    if self.duration_minutes == 0 {
      return Err(ProviderError::Malformed("duration must be positive".to_string()));
    }
    if self.exercises.is_empty() {
      return Err(ProviderError::Malformed("workout has no exercises".to_string()));
    }
    for exercise in &self.exercises {
      if exercise.name.trim().is_empty() {
        return Err(ProviderError::Malformed("exercise without a name".to_string()));
      }
      if exercise.sets == 0 {
        return Err(ProviderError::Malformed(format!(
          "{} has zero sets",
          exercise.name
        )));
      }
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayInsight {
  #[serde(alias = "insight_text")]
  pub insight_text: String,
  #[serde(alias = "next_day_focus")]
  pub next_day_focus: String,
  #[serde(alias = "next_day_detail")]
  pub next_day_detail: String,
}

impl DayInsight {
  fn validate(&self) -> Result<(), ProviderError> {
    if self.insight_text.trim().is_empty() || self.next_day_focus.trim().is_empty() {
      return Err(ProviderError::Malformed("insight fields are empty".to_string()));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSchema {
  WorkoutPlan,
  DayInsight,
  Text,
}

/// Validated provider result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "schema", content = "data", rename_all = "snake_case")]
pub enum ProviderOutput {
  WorkoutPlan(WorkoutPlan),
  DayInsight(DayInsight),
  Text { text: String },
}

impl ProviderOutput {
  pub fn schema(&self) -> ResponseSchema {
    match self {
      ProviderOutput::WorkoutPlan(_) => ResponseSchema::WorkoutPlan,
      ProviderOutput::DayInsight(_) => ResponseSchema::DayInsight,
      ProviderOutput::Text { .. } => ResponseSchema::Text,
    }
  }

  pub fn validate(&self) -> Result<(), ProviderError> {
    match self {
      ProviderOutput::WorkoutPlan(plan) => plan.validate(),
      ProviderOutput::DayInsight(insight) => insight.validate(),
      ProviderOutput::Text { text } if text.trim().is_empty() => {
        Err(ProviderError::Malformed("empty text".to_string()))
      }
      ProviderOutput::Text { .. } => Ok(()),
    }
  }
}

impl ResponseSchema {
  /// Turn raw completion text into a validated output
  pub fn parse(&self, raw: &str) -> Result<ProviderOutput, ProviderError> {
    let output = match self {
      ResponseSchema::Text => ProviderOutput::Text {
        text: raw.trim().to_string(),
      },
      ResponseSchema::WorkoutPlan => {
        let json = extract_json(raw)?;
        let plan: WorkoutPlan = serde_json::from_str(&json)
          .map_err(|e| ProviderError::Malformed(format!("{}: {}", e, json)))?;
        ProviderOutput::WorkoutPlan(plan)
      }
      ResponseSchema::DayInsight => {
        let json = extract_json(raw)?;
        let insight: DayInsight = serde_json::from_str(&json)
          .map_err(|e| ProviderError::Malformed(format!("{}: {}", e, json)))?;
        ProviderOutput::DayInsight(insight)
      }
    };
    output.validate()?;
    Ok(output)
  }

  /// Output format appended to the user message
  fn format_instructions(&self) -> Option<&'static str> {
    match self {
      ResponseSchema::Text => None,
      ResponseSchema::WorkoutPlan => Some(
        r#"Respond with valid JSON only, in this exact format:
{
  "workoutType": "string",
  "reasoning": "string",
  "durationMinutes": number,
  "intensity": "low|moderate|high",
  "exercises": [{"name": "string", "sets": number, "reps": "string or number", "restSeconds": number}]
}"#,
      ),
      ResponseSchema::DayInsight => Some(
        r#"Respond with valid JSON only, in this exact format:
{"insightText": "string", "nextDayFocus": "string", "nextDayDetail": "string"}"#,
      ),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Task payloads
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
  System,
  User,
  Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
  pub role: ChatRole,
  pub content: String,
}

impl ChatMessage {
  pub fn user(content: impl Into<String>) -> Self {
    Self {
      role: ChatRole::User,
      content: content.into(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsychologicalState {
  pub motivation: Option<Motivation>,
  pub stress: Option<u8>,
}

/// The parts of Memory a plan generator needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryDigest {
  pub disliked_exercises: Vec<String>,
  pub loved_exercises: Vec<String>,
  pub equipment_preferences: Vec<String>,
  pub injury_watch: Vec<BodyLocation>,
  pub progression_status: BTreeMap<String, ProgressionStatus>,
}

impl From<&Memory> for MemoryDigest {
  fn from(memory: &Memory) -> Self {
    let mut injury_watch: Vec<BodyLocation> =
      memory.injury_watch.iter().map(|w| w.location).collect();
    injury_watch.sort();
    injury_watch.dedup();

    Self {
      disliked_exercises: memory.disliked_exercises.iter().cloned().collect(),
      loved_exercises: memory.loved_exercises.iter().cloned().collect(),
      equipment_preferences: memory
        .equipment_preferences
        .iter()
        .map(|e| e.label().to_string())
        .collect(),
      injury_watch,
      progression_status: memory.progression_status.clone(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRequest {
  pub profile: Profile,
  pub readiness: ReadinessReport,
  pub psychological_state: PsychologicalState,
  pub memory: MemoryDigest,
  pub time_context: TimeContext,
  pub pain: Vec<PainEntry>,
  /// Exercises of a plan the user asked to replace
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub previous_exercises: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskPayload {
  Workout(Box<WorkoutRequest>),
  Chat { messages: Vec<ChatMessage> },
  /// Free-form context for insights, tips and analyses
  Context { context: serde_json::Value },
}

/// ---------------------------------------------------------------------------
/// Provider trait
/// ---------------------------------------------------------------------------

#[async_trait]
pub trait Provider: Send + Sync {
  fn id(&self) -> ProviderId;

  /// Produce output matching `task.schema()`
  async fn generate(
    &self,
    task: TaskKind,
    payload: &TaskPayload,
  ) -> Result<ProviderOutput, ProviderError>;

  async fn health_check(&self) -> bool {
    true
  }
}

/// ---------------------------------------------------------------------------
/// OpenAI-compatible HTTP provider
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CompletionRequest {
  model: String,
  max_tokens: u32,
  messages: Vec<ChatMessage>,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
  #[serde(rename = "type")]
  format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
  choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
  content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
  error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
  message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
  pub api_key: String,
  pub base_url: Url,
  pub model: String,
}

pub struct HttpProvider {
  id: ProviderId,
  client: Client,
  settings: ProviderSettings,
}

impl HttpProvider {
  pub fn new(id: ProviderId, settings: ProviderSettings) -> Self {
    Self {
      id,
      client: Client::new(),
      settings,
    }
  }

  fn endpoint(&self, path: &str) -> String {
    format!(
      "{}/{}",
      self.settings.base_url.as_str().trim_end_matches('/'),
      path
    )
  }

  /// One chat completion; returns the assistant's text
  pub async fn complete(
    &self,
    messages: Vec<ChatMessage>,
    json_mode: bool,
  ) -> Result<String, ProviderError> {
    let request = CompletionRequest {
      model: self.settings.model.clone(),
      max_tokens: MAX_TOKENS,
      messages,
      response_format: json_mode.then_some(ResponseFormat {
        format_type: "json_object",
      }),
    };

    let response = self
      .client
      .post(self.endpoint("chat/completions"))
      .bearer_auth(&self.settings.api_key)
      .json(&request)
      .send()
      .await
      .map_err(|e| ProviderError::Request(e.to_string()))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| ProviderError::Request(e.to_string()))?;

    if !status.is_success() {
      if let Ok(error_resp) = serde_json::from_str::<ApiErrorResponse>(&body) {
        return Err(ProviderError::Api(error_resp.error.message));
      }
      return Err(ProviderError::Api(format!("HTTP {}: {}", status, body)));
    }

    let completion: CompletionResponse =
      serde_json::from_str(&body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    completion
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .filter(|text| !text.trim().is_empty())
      .ok_or_else(|| ProviderError::Malformed("No content in response".to_string()))
  }

  fn build_messages(task: TaskKind, payload: &TaskPayload) -> Result<Vec<ChatMessage>, ProviderError> {
    let system = ChatMessage {
      role: ChatRole::System,
      content: SYSTEM_PROMPT.to_string(),
    };

    let body = match payload {
      TaskPayload::Chat { messages } => {
        let mut all = vec![system];
        all.extend(messages.iter().cloned());
        return Ok(all);
      }
      TaskPayload::Workout(request) => serde_json::to_string_pretty(request),
      TaskPayload::Context { context } => serde_json::to_string_pretty(context),
    }
    .map_err(|e| ProviderError::Request(format!("Failed to encode payload: {}", e)))?;

    let mut user = format!("{}\n\nCONTEXT:\n{}", task.instruction(), body);
    if let Some(format) = task.schema().format_instructions() {
      user.push_str("\n\n");
      user.push_str(format);
    }

    Ok(vec![system, ChatMessage::user(user)])
  }
}

#[async_trait]
impl Provider for HttpProvider {
  fn id(&self) -> ProviderId {
    self.id
  }

  async fn generate(
    &self,
    task: TaskKind,
    payload: &TaskPayload,
  ) -> Result<ProviderOutput, ProviderError> {
    let schema = task.schema();
    let messages = Self::build_messages(task, payload)?;

    debug!(provider = %self.id, task = %task, model = %self.settings.model, "Calling provider");
    let text = self.complete(messages, schema != ResponseSchema::Text).await?;

    schema.parse(&text)
  }

  async fn health_check(&self) -> bool {
    match self
      .client
      .get(self.endpoint("models"))
      .bearer_auth(&self.settings.api_key)
      .send()
      .await
    {
      Ok(response) => response.status().is_success(),
      Err(e) => {
        debug!(provider = %self.id, error = %e, "Health check failed");
        false
      }
    }
  }
}

/// Extract JSON from a completion (handles markdown code blocks)
fn extract_json(text: &str) -> Result<String, ProviderError> {
  let trimmed = text.trim();
  if trimmed.starts_with('{') {
    return Ok(trimmed.to_string());
  }

  if let Some(start) = text.find("```json") {
    let start = start + 7;
    if let Some(end) = text[start..].find("```") {
      return Ok(text[start..start + end].trim().to_string());
    }
  }

  if let Some(start) = text.find("```") {
    let start = start + 3;
    // Skip language identifier if present
    let content_start = text[start..]
      .find('\n')
      .map(|i| start + i + 1)
      .unwrap_or(start);
    if let Some(end) = text[content_start..].find("```") {
      return Ok(text[content_start..content_start + end].trim().to_string());
    }
  }

  if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
    if start < end {
      return Ok(text[start..=end].to_string());
    }
  }

  Err(ProviderError::Malformed(
    "Could not extract JSON from response".to_string(),
  ))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
