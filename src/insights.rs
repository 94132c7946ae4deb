//! Pattern analysis through a hosted language model.
//!
//! The model only ever sees a compact copy of the log; whatever goes wrong on
//! the way, callers get a readable message back and stored data is untouched.

use crate::config::LlmConfig;
use crate::models::{
    ChatMessage, ChatRole, EntryType, InsightsRequest, InsightsResponse, LogEntry, UserSettings,
};
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const MIN_ENTRIES: usize = 3;
pub const MAX_CONTEXT_ENTRIES: usize = 100;

pub const NOT_ENOUGH_DATA: &str = "I need at least 3 logs to start detecting patterns!";
pub const EMPTY_REPLY: &str = "I couldn't generate insights at this moment.";
pub const FALLBACK_REPLY: &str =
    "Oops! Something went wrong while talking to the AI. Please try again later.";
const SUMMARY_REQUEST: &str = "Analyze my hydration and voiding data and provide a summary report.";

#[derive(Debug, Error)]
pub enum InsightsError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct CompactEntry<'a> {
    t: EntryType,
    a: u32,
    ts: DateTime<Utc>,
    n: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content,
    contents: &'a [Content],
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    fn text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

pub fn build_system_instruction(
    entries: &[LogEntry],
    settings: &UserSettings,
    today: NaiveDate,
) -> Result<String, serde_json::Error> {
    let compact: Vec<CompactEntry<'_>> = entries
        .iter()
        .take(MAX_CONTEXT_ENTRIES)
        .map(|e| CompactEntry {
            t: e.entry_type,
            a: e.amount,
            ts: e.timestamp,
            n: &e.notes,
        })
        .collect();
    let logs = serde_json::to_string(&compact)?;

    Ok(format!(
        "You are AquaFlow AI, a health data analyst specializing in urological and hydration tracking.
User Metadata: Age {age}, Sex {sex}.
Data: {logs}

Tasks:
1. Identify 'Latency': usual time between drinking and urinating. Does it change by time of day?
2. Identify 'Trigger Volume': Total intake volume that typically precedes a void.
3. Normality: Check if flows/net balances are within medical ranges for age/sex.
4. Provide actionable recommendations.

Format output with clear headings, bullet points, and use Markdown. Keep it encouraging but clinically informed.
Current Date: {today}",
        age = settings.age,
        sex = settings.sex.as_str(),
        today = today.format("%Y-%m-%d"),
    ))
}

/// Conversation sent to the model: the prior chat plus the new prompt, or a
/// single summary request when there is no prompt.
pub fn build_contents(prompt: Option<&str>, history: &[ChatMessage]) -> Vec<Content> {
    match prompt {
        Some(prompt) => history
            .iter()
            .map(|m| {
                let role = match m.role {
                    ChatRole::User => "user",
                    ChatRole::Model => "model",
                };
                Content::text(Some(role), &m.text)
            })
            .chain(std::iter::once(Content::text(Some("user"), prompt)))
            .collect(),
        None => vec![Content::text(None, SUMMARY_REQUEST)],
    }
}

#[derive(Clone)]
pub struct InsightsClient {
    client: Client,
    config: LlmConfig,
}

impl InsightsClient {
    pub fn new(config: LlmConfig) -> Result<Self, InsightsError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Returns the model's reply, or [`EMPTY_REPLY`] when it answered with nothing.
    pub async fn generate(&self, system: &str, contents: &[Content]) -> Result<String, InsightsError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(InsightsError::MissingApiKey)?;
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        let body = GenerateRequest {
            system_instruction: Content::text(None, system),
            contents,
        };

        debug!("requesting insights from {}", self.config.model);
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(InsightsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        Ok(parsed.text().unwrap_or_else(|| EMPTY_REPLY.to_string()))
    }
}

/// Runs one analysis request. Never fails: problems are logged and turned
/// into a fallback message, and the chat history only grows on success.
pub async fn analyze(
    client: &InsightsClient,
    entries: &[LogEntry],
    settings: &UserSettings,
    today: NaiveDate,
    request: InsightsRequest,
) -> InsightsResponse {
    let InsightsRequest { prompt, mut history } = request;
    let prompt = prompt.filter(|p| !p.trim().is_empty());

    if entries.len() < MIN_ENTRIES {
        return InsightsResponse {
            text: NOT_ENOUGH_DATA.to_string(),
            history,
        };
    }

    let reply = match build_system_instruction(entries, settings, today) {
        Ok(system) => {
            let contents = build_contents(prompt.as_deref(), &history);
            client.generate(&system, &contents).await
        }
        Err(err) => Err(err.into()),
    };

    match reply {
        Ok(text) => {
            if let Some(prompt) = prompt {
                history.push(ChatMessage {
                    role: ChatRole::User,
                    text: prompt,
                });
                history.push(ChatMessage {
                    role: ChatRole::Model,
                    text: text.clone(),
                });
            }
            InsightsResponse { text, history }
        }
        Err(err) => {
            warn!("insights request failed: {err}");
            InsightsResponse {
                text: FALLBACK_REPLY.to_string(),
                history,
            }
        }
    }
}
