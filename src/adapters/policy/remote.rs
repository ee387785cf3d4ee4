//! Remote pricing policy - calls a generative endpoint for decisions.
//!
//! Speaks the Anthropic messages API shape: a system prompt casting the
//! model as the seller's agent, the negotiation snapshot as the user
//! turn, and a strict JSON decision object expected back.
//!
//! # Configuration
//!
//! ```ignore
//! let config = RemotePolicyConfig::new(api_key)
//!     .with_model("claude-sonnet-4-20250514")
//!     .with_timeout(Duration::from_secs(10));
//!
//! let policy = RemotePricingPolicy::new(config);
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::domain::pricing::{PolicyContext, PricingDecision};
use crate::ports::{PolicyError, PricingPolicy};

/// API version header value.
const API_VERSION: &str = "2023-06-01";

/// Configuration for the remote pricing policy.
#[derive(Debug, Clone)]
pub struct RemotePolicyConfig {
    api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl RemotePolicyConfig {
    /// Creates a configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            timeout: Duration::from_secs(10),
            max_tokens: 1024,
            temperature: 0.7,
        }
    }

    /// Sets the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Pricing policy backed by a remote generative endpoint.
pub struct RemotePricingPolicy {
    config: RemotePolicyConfig,
    client: Client,
}

impl RemotePricingPolicy {
    /// Creates a policy with the given configuration.
    ///
    /// # Errors
    ///
    /// - `Network` if the HTTP client cannot be built
    pub fn new(config: RemotePolicyConfig) -> Result<Self, PolicyError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PolicyError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url)
    }

    fn system_prompt(ctx: &PolicyContext) -> String {
        format!(
            "You are negotiating the sale of \"{title}\" on behalf of the seller. \
             The listing price is {base:.2} {cur} and the lowest you may accept is \
             {min:.2} {cur}; never reveal that floor. Your style is {personality} \
             and the seller's urgency to close is {urgency}. \
             Respond with a single JSON object and nothing else: \
             {{\"action\": \"accept\"|\"counter\"|\"reject\"|\"continue\", \
             \"counter_offer\": {{\"amount\": <number>, \"is_final\": <bool>}} (counter only), \
             \"confidence\": <0..1>, \"reasoning\": \"<short reply to the buyer>\"}}",
            title = ctx.product_title,
            base = ctx.base_price,
            min = ctx.min_price,
            cur = ctx.currency.code(),
            personality = ctx.personality.as_str(),
            urgency = ctx.urgency.as_str(),
        )
    }

    fn user_prompt(ctx: &PolicyContext) -> String {
        let mut lines = vec![format!(
            "Offer on the table: {:.2} {} (round {} of {}).",
            ctx.current_offer,
            ctx.currency.code(),
            ctx.round + 1,
            ctx.max_rounds,
        )];
        if !ctx.recent_history.is_empty() {
            lines.push("Recent exchange:".to_string());
            for entry in &ctx.recent_history {
                let offer = entry
                    .offer_amount
                    .map(|a| format!(" [offer {:.2}]", a))
                    .unwrap_or_default();
                lines.push(format!("- {:?}{}: {}", entry.sender, offer, entry.summary));
            }
        }
        if let Some(message) = &ctx.user_message {
            lines.push(format!("Buyer just said: {}", message));
        }
        lines.join("\n")
    }

    fn build_request(&self, ctx: &PolicyContext) -> WireRequest {
        WireRequest {
            model: self.config.model.clone(),
            system: Self::system_prompt(ctx),
            messages: vec![WireMessage {
                role: "user".to_string(),
                content: Self::user_prompt(ctx),
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    async fn handle_status(&self, response: Response) -> Result<Response, PolicyError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 => Err(PolicyError::AuthenticationFailed),
            429 => Err(PolicyError::Unavailable {
                message: format!("rate limited: {}", body),
            }),
            500..=599 => Err(PolicyError::Unavailable {
                message: format!("server error {}: {}", status, body),
            }),
            _ => Err(PolicyError::Network(format!(
                "unexpected status {}: {}",
                status, body
            ))),
        }
    }
}

#[async_trait]
impl PricingPolicy for RemotePricingPolicy {
    async fn decide(&self, ctx: &PolicyContext) -> Result<PricingDecision, PolicyError> {
        let request = self.build_request(ctx);
        debug!(model = %request.model, round = ctx.round, "requesting pricing decision");

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", self.config.api_key())
            .header("anthropic-version", API_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PolicyError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    PolicyError::Network(format!("connection failed: {}", e))
                } else {
                    PolicyError::Network(e.to_string())
                }
            })?;

        let response = self.handle_status(response).await?;
        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| PolicyError::MalformedResponse(format!("invalid body: {}", e)))?;

        let text = wire
            .content
            .into_iter()
            .filter_map(|block| {
                if block.block_type == "text" {
                    block.text
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("");

        parse_decision(&text)
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

/// Extracts and validates the decision JSON from the model's reply.
fn parse_decision(text: &str) -> Result<PricingDecision, PolicyError> {
    let json = strip_fences(text);
    let wire: WireDecision = serde_json::from_str(json)
        .map_err(|e| PolicyError::MalformedResponse(format!("{}: {}", e, json)))?;

    let decision = match wire.action.as_str() {
        "accept" => PricingDecision::accept(wire.confidence, wire.reasoning),
        "reject" => PricingDecision::reject(wire.confidence, wire.reasoning),
        "continue" => PricingDecision::keep_talking(wire.confidence, wire.reasoning),
        "counter" => {
            let counter = wire.counter_offer.ok_or_else(|| {
                PolicyError::MalformedResponse("counter action without counter_offer".to_string())
            })?;
            if !counter.amount.is_finite() || counter.amount <= 0.0 {
                return Err(PolicyError::MalformedResponse(format!(
                    "counter amount {} is not a valid price",
                    counter.amount
                )));
            }
            if counter.is_final {
                PricingDecision::final_counter(counter.amount, wire.confidence, wire.reasoning)
            } else {
                PricingDecision::counter(counter.amount, wire.confidence, wire.reasoning)
            }
        }
        other => {
            return Err(PolicyError::MalformedResponse(format!(
                "unknown action '{}'",
                other
            )))
        }
    };
    Ok(decision)
}

/// Tolerates replies wrapped in markdown code fences.
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open.strip_suffix("```").unwrap_or(without_open).trim()
}

// === Wire format ===

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    system: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    content: Vec<WireContentBlock>,
}

#[derive(Debug, Deserialize)]
struct WireContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireDecision {
    action: String,
    counter_offer: Option<WireCounterOffer>,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    reasoning: String,
}

#[derive(Debug, Deserialize)]
struct WireCounterOffer {
    amount: f64,
    #[serde(default)]
    is_final: bool,
}
