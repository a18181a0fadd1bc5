use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use thiserror::Error;

use super::types::{CurationResult, CurationStatus, ModerationInput};
use crate::config::CurationConfig;

/// Title budget (characters) sent to the provider.
pub const TITLE_LIMIT: usize = 300;
/// Content budget (characters) sent to the provider.
pub const CONTENT_LIMIT: usize = 6000;

const ELLIPSIS: &str = "...";

const SYSTEM_PROMPT: &str = "You are a strict content moderator for an educational platform. \
Given a resource's title, content, language, and format, classify it as Approved (safe, educational), \
Pending (uncertain or needs manual review), or Rejected (inappropriate, unsafe, spam, hateful, explicit, illegal). \
Respond ONLY in JSON: {\"status\":\"Approved|Pending|Rejected\",\"reason\":\"short reason\"}. Keep reason concise.";

// Checked in this order: any rejection marker beats any approval marker.
const REJECTION_MARKERS: [&str; 3] = ["reject", "unsafe", "inappropriate"];
const APPROVAL_MARKERS: [&str; 2] = ["approve", "safe"];

/// GatewayError
///
/// Everything that can go wrong talking to the classification provider. The orchestrator
/// never lets one of these escape: each maps to a Pending verdict.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("xAI request timed out")]
    Timeout,

    #[error("xAI request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("xAI API status {0}")]
    Status(u16),

    #[error("xAI response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("xAI: no choices in response")]
    NoChoices,
}

/// ClassificationGateway
///
/// The external classification boundary. Implemented by the real xAI client and by
/// `MockGateway` for tests, so the orchestrator can be exercised without a network.
#[async_trait]
pub trait ClassificationGateway: Send + Sync {
    async fn classify(&self, input: ModerationInput<'_>) -> Result<CurationResult, GatewayError>;
}

// --- Wire types (OpenAI-compatible chat completions) ---

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// The JSON contract the system prompt asks the model to answer with. Missing and `null`
/// fields both read as absent; capitalized keys are accepted too.
#[derive(Debug, Deserialize)]
struct ProviderVerdict {
    #[serde(default, alias = "Status")]
    status: Option<String>,
    #[serde(default, alias = "Reason")]
    reason: Option<String>,
}

/// XaiGateway
///
/// Talks to the xAI (Grok) chat completions endpoint. One attempt per call, bounded by the
/// client-wide timeout from `CurationConfig`.
pub struct XaiGateway {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl XaiGateway {
    pub fn new(config: &CurationConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(GatewayError::Client)?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ClassificationGateway for XaiGateway {
    async fn classify(&self, input: ModerationInput<'_>) -> Result<CurationResult, GatewayError> {
        // A missing key is an expected deployment state, not a failure.
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(CurationResult::pending("XAI_API_KEY not configured"));
        };

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_user_prompt(&input),
                },
            ],
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(transport_error)?;
        let parsed: ChatResponse = serde_json::from_slice(&body)?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or(GatewayError::NoChoices)?;

        tracing::debug!(model = %self.model, "xAI classification received");

        Ok(interpret_verdict(&text))
    }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Transport(err)
    }
}

/// Builds the user message carrying the resource fields, with title and content truncated.
pub fn build_user_prompt(input: &ModerationInput<'_>) -> String {
    format!(
        "Title: {}\nLanguage: {}\nFormat: {}\nContent:\n{}",
        truncate(input.title, TITLE_LIMIT),
        input.language,
        input.format,
        truncate(input.content, CONTENT_LIMIT),
    )
}

/// truncate
///
/// Character-based truncation. Text longer than `limit` keeps `limit - 3` characters plus
/// `"..."`, so the result is exactly `limit` long. Limits of 3 or less hard-cut with no marker.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    if limit <= ELLIPSIS.len() {
        return text.chars().take(limit).collect();
    }
    let mut out: String = text.chars().take(limit - ELLIPSIS.len()).collect();
    out.push_str(ELLIPSIS);
    out
}

/// interpret_verdict
///
/// Two sequential attempts: the strict JSON contract first, then substring matching on the
/// raw model text.
pub fn interpret_verdict(text: &str) -> CurationResult {
    match serde_json::from_str::<ProviderVerdict>(text) {
        Ok(verdict) => verdict_to_result(verdict),
        Err(_) => classify_free_text(text),
    }
}

fn verdict_to_result(verdict: ProviderVerdict) -> CurationResult {
    let reason = verdict.reason.unwrap_or_default();
    let status = verdict.status.unwrap_or_default();
    if status.trim().is_empty() {
        return CurationResult::pending(reason);
    }
    match CurationStatus::parse_loose(&status) {
        Some(status) => CurationResult::new(status, reason),
        None => {
            tracing::warn!(status = %status, "provider returned an unknown status");
            CurationResult::pending(reason)
        }
    }
}

fn classify_free_text(text: &str) -> CurationResult {
    let lower = text.to_lowercase();
    if REJECTION_MARKERS.iter().any(|marker| lower.contains(marker)) {
        CurationResult::rejected("Model indicated rejection")
    } else if APPROVAL_MARKERS.iter().any(|marker| lower.contains(marker)) {
        CurationResult::approved("Model indicated approval")
    } else {
        CurationResult::pending("Unclear model response")
    }
}

/// MockGateway
///
/// Test double for `ClassificationGateway`. Returns a canned verdict (or a simulated provider
/// outage) and counts how many times it was consulted.
#[derive(Clone, Default)]
pub struct MockGateway {
    /// When true, every call fails as if the provider answered 503.
    pub should_fail: bool,
    /// Verdict returned on success. `None` yields an unclear-response Pending.
    pub verdict: Option<CurationResult>,
    calls: Arc<AtomicUsize>,
}

impl MockGateway {
    pub fn new(verdict: CurationResult) -> Self {
        Self {
            verdict: Some(verdict),
            ..Self::default()
        }
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Number of `classify` calls seen by this mock and all of its clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClassificationGateway for MockGateway {
    async fn classify(&self, _input: ModerationInput<'_>) -> Result<CurationResult, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(GatewayError::Status(503));
        }
        Ok(self
            .verdict
            .clone()
            .unwrap_or_else(|| CurationResult::pending("Unclear model response")))
    }
}
