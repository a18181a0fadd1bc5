use std::sync::Arc;

use super::gateway::{ClassificationGateway, GatewayError, XaiGateway};
use super::heuristic;
use super::types::{CurationResult, CurationStatus, ModerationInput};
use crate::config::CurationConfig;

/// CurationProvider
///
/// The configured classification backend. Only xAI is supported; any other name is kept
/// as `Unknown` and resolves to a Pending verdict instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurationProvider {
    Xai,
    Unknown(String),
}

impl CurationProvider {
    /// Case-insensitive match on the provider identifier (`xai`, `grok`, `grok3`).
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "xai" | "grok" | "grok3" => CurationProvider::Xai,
            _ => CurationProvider::Unknown(name.to_string()),
        }
    }
}

/// CurationService
///
/// The orchestrator called by the resource create/update handlers. Its single entry point,
/// `curate_content`, always yields a verdict: heuristics may reject outright, otherwise the
/// provider decides, and every provider failure degrades to Pending.
///
/// Built once at startup and shared through `AppState`; holds no mutable state.
pub struct CurationService {
    provider: CurationProvider,
    gateway: Arc<dyn ClassificationGateway>,
}

impl CurationService {
    /// Wires the real xAI gateway from the injected configuration.
    pub fn from_config(config: &CurationConfig) -> Result<Self, GatewayError> {
        let gateway = XaiGateway::new(config)?;
        Ok(Self::with_gateway(
            CurationProvider::from_name(&config.provider),
            Arc::new(gateway),
        ))
    }

    pub fn with_gateway(provider: CurationProvider, gateway: Arc<dyn ClassificationGateway>) -> Self {
        Self { provider, gateway }
    }

    pub fn provider(&self) -> &CurationProvider {
        &self.provider
    }

    /// curate_content
    ///
    /// 1. Heuristic filter; only a Rejected outcome short-circuits.
    /// 2. Provider dispatch; unknown providers resolve to Pending.
    /// 3. Gateway errors resolve to Pending carrying the error detail.
    pub async fn curate_content(
        &self,
        title: &str,
        content: &str,
        language: &str,
        format: &str,
    ) -> CurationResult {
        let local = heuristic::evaluate(title, content);
        if local.status == CurationStatus::Rejected {
            tracing::info!(reason = %local.reason, "curation rejected by heuristics");
            return local;
        }

        let result = match &self.provider {
            CurationProvider::Xai => {
                let input = ModerationInput {
                    title,
                    content,
                    language,
                    format,
                };
                match self.gateway.classify(input).await {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::warn!(error = %e, "AI curation error");
                        CurationResult::pending(format!("AI curation error: {}", e))
                    }
                }
            }
            CurationProvider::Unknown(name) => {
                tracing::warn!(provider = %name, "unknown curation provider");
                CurationResult::pending("Unknown curation provider; defaulting to Pending")
            }
        };

        tracing::info!(status = %result.status, reason = %result.reason, "curation decision");
        result
    }
}
