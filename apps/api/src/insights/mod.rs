//! Insight adapter for motivational quotes and "smart insights" from the
//! generative-language API.
//!
//! Nothing here analyses data. Logs and the goal are handed to the model and
//! whatever matches the response schema is returned. Every failure path
//! (missing key, transport, non-2xx, bad JSON) degrades to fixed fallback
//! content and is only logged.

pub mod handlers;
pub mod prompts;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::insights::prompts::{insight_schema, INSIGHT_PROMPT_TEMPLATE, QUOTES_PROMPT};
use crate::llm_client::prompts::string_array_schema;
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::WaterLog;
use crate::storage::{KeyValueStorage, StorageError};

/// Storage key for a credential entered at runtime.
pub const API_KEY_STORAGE_KEY: &str = "GEMINI_API_KEY";
pub const MAX_QUOTES: usize = 3;

/// Returned when the model answers with no text.
pub const EMPTY_QUOTES: [&str; 3] = [
    "Stay hydrated, stay winning.",
    "Water is life.",
    "Discipline equals freedom.",
];

/// Returned on any quote request failure.
pub const FALLBACK_QUOTES: [&str; 3] = [
    "Hydration is the key to performance.",
    "Your body is your temple.",
    "Drink water, conquer the day.",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartInsight {
    pub pattern_analysis: String,
    /// 0 – 100
    pub hydration_score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_suggestion: Option<String>,
    pub recommendation: String,
}

impl SmartInsight {
    pub fn fallback() -> Self {
        Self {
            pattern_analysis: "Not enough data to analyze patterns yet.".to_string(),
            hydration_score: 50,
            goal_suggestion: Some("Keep at 2000ml".to_string()),
            recommendation: "Try to log water every time you finish a glass.".to_string(),
        }
    }
}

/// Wire shape of the model's answer. The score is range-checked afterwards.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInsight {
    pattern_analysis: String,
    hydration_score: i64,
    goal_suggestion: Option<String>,
    recommendation: String,
}

impl From<RawInsight> for SmartInsight {
    fn from(raw: RawInsight) -> Self {
        Self {
            pattern_analysis: raw.pattern_analysis,
            hydration_score: raw.hydration_score.clamp(0, 100) as u8,
            goal_suggestion: raw.goal_suggestion,
            recommendation: raw.recommendation,
        }
    }
}

/// One entry of the log summary sent to the model.
#[derive(Debug, Serialize)]
struct LogSummary {
    time: String,
    amount: u32,
}

#[derive(Clone)]
pub struct InsightService {
    generator: Arc<dyn TextGenerator>,
    storage: Arc<dyn KeyValueStorage>,
    configured_key: Option<String>,
}

impl InsightService {
    /// `configured_key` is the deploy-time credential and wins over any key
    /// saved through `set_api_key`.
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        storage: Arc<dyn KeyValueStorage>,
        configured_key: Option<String>,
    ) -> Self {
        Self {
            generator,
            storage,
            configured_key: configured_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub async fn api_key(&self) -> Option<String> {
        if let Some(key) = &self.configured_key {
            return Some(key.clone());
        }
        match self.storage.get(API_KEY_STORAGE_KEY).await {
            Ok(stored) => stored.filter(|k| !k.trim().is_empty()),
            Err(e) => {
                warn!("Could not read stored API key: {e}");
                None
            }
        }
    }

    pub async fn has_api_key(&self) -> bool {
        self.api_key().await.is_some()
    }

    pub async fn set_api_key(&self, key: &str) -> Result<(), StorageError> {
        self.storage.set(API_KEY_STORAGE_KEY, key.trim()).await
    }

    /// Up to three quotes. Never fails.
    pub async fn get_motivational_quotes(&self) -> Vec<String> {
        match self.try_quotes().await {
            Ok(Some(mut quotes)) => {
                quotes.truncate(MAX_QUOTES);
                quotes
            }
            Ok(None) => EMPTY_QUOTES.iter().map(|q| q.to_string()).collect(),
            Err(e) => {
                log_failure("quote", &e);
                FALLBACK_QUOTES.iter().map(|q| q.to_string()).collect()
            }
        }
    }

    /// Model commentary on `logs`, or `SmartInsight::fallback()` on any failure.
    pub async fn get_smart_insights(&self, logs: &[WaterLog], daily_goal: u32) -> SmartInsight {
        match self.try_insights(logs, daily_goal).await {
            Ok(insight) => insight,
            Err(e) => {
                log_failure("insight", &e);
                SmartInsight::fallback()
            }
        }
    }

    /// Skips the request entirely when there is no credential or nothing to
    /// analyse.
    pub async fn insights_for(&self, logs: &[WaterLog], daily_goal: u32) -> Option<SmartInsight> {
        if logs.is_empty() || !self.has_api_key().await {
            return None;
        }
        Some(self.get_smart_insights(logs, daily_goal).await)
    }

    async fn try_quotes(&self) -> Result<Option<Vec<String>>, LlmError> {
        let api_key = self.api_key().await.ok_or(LlmError::MissingApiKey)?;
        let text = self
            .generator
            .generate_json(&api_key, QUOTES_PROMPT, &string_array_schema())
            .await?;
        match text {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn try_insights(
        &self,
        logs: &[WaterLog],
        daily_goal: u32,
    ) -> Result<SmartInsight, LlmError> {
        let api_key = self.api_key().await.ok_or(LlmError::MissingApiKey)?;
        let prompt = build_insight_prompt(logs, daily_goal)?;
        let text = self
            .generator
            .generate_json(&api_key, &prompt, &insight_schema())
            .await?
            .ok_or(LlmError::EmptyContent)?;
        let raw: RawInsight = serde_json::from_str(&text)?;
        Ok(raw.into())
    }
}

fn build_insight_prompt(logs: &[WaterLog], daily_goal: u32) -> Result<String, LlmError> {
    let summary: Vec<LogSummary> = logs
        .iter()
        .map(|l| LogSummary {
            time: l.created_at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            amount: l.amount_ml,
        })
        .collect();
    let logs_json = serde_json::to_string(&summary)?;
    Ok(INSIGHT_PROMPT_TEMPLATE
        .replace("{daily_goal}", &daily_goal.to_string())
        .replace("{logs_json}", &logs_json))
}

fn log_failure(kind: &str, e: &LlmError) {
    match e {
        LlmError::MissingApiKey => warn!("Gemini {kind} request skipped: {e}"),
        _ => error!("Gemini {kind} error: {e}"),
    }
}
