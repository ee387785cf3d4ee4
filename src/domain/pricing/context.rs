//! Inputs handed to a pricing policy for one decision.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Currency;
use crate::domain::negotiation::{Message, MessageSender, Negotiation};

/// How eager the seller is to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::Low => "low",
            UrgencyLevel::Medium => "medium",
            UrgencyLevel::High => "high",
        }
    }
}

/// Tone the AI counterparty negotiates with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellerPersonality {
    Firm,
    #[default]
    Balanced,
    Flexible,
}

impl SellerPersonality {
    pub fn as_str(&self) -> &'static str {
        match self {
            SellerPersonality::Firm => "firm",
            SellerPersonality::Balanced => "balanced",
            SellerPersonality::Flexible => "flexible",
        }
    }
}

/// One prior exchange, condensed for the policy prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub sender: MessageSender,
    pub summary: String,
    pub offer_amount: Option<f64>,
}

/// Snapshot of a negotiation at decision time.
///
/// Policies receive only this context, never the aggregate, so a remote
/// policy and the local fallback see exactly the same inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyContext {
    pub product_title: String,
    pub base_price: f64,
    pub min_price: f64,
    pub currency: Currency,
    pub current_offer: f64,
    /// Completed exchanges so far.
    pub round: u32,
    pub max_rounds: u32,
    pub urgency: UrgencyLevel,
    pub personality: SellerPersonality,
    /// Most recent visible exchanges, oldest first.
    pub recent_history: Vec<HistoryEntry>,
    /// The buyer text that triggered this decision, if any.
    pub user_message: Option<String>,
}

impl PolicyContext {
    /// Builds a context from a negotiation's active-branch view.
    ///
    /// `history_window` caps how many trailing messages are condensed
    /// into `recent_history`.
    pub fn from_negotiation(
        negotiation: &Negotiation,
        urgency: UrgencyLevel,
        personality: SellerPersonality,
        history_window: usize,
        user_message: Option<String>,
    ) -> Self {
        let visible = negotiation
            .visible_messages(negotiation.active_branch())
            .unwrap_or_default();
        let start = visible.len().saturating_sub(history_window);
        let recent_history = visible[start..]
            .iter()
            .map(|m| condense(m))
            .collect();

        let pricing = negotiation.pricing();
        Self {
            product_title: negotiation.product_title().to_string(),
            base_price: pricing.base_price(),
            min_price: pricing.min_price(),
            currency: pricing.currency(),
            current_offer: pricing.current_offer(),
            round: negotiation.rounds(),
            max_rounds: negotiation.max_rounds(),
            urgency,
            personality,
            recent_history,
            user_message,
        }
    }

    /// Returns true if the decision being asked for concludes the last
    /// allowed round.
    pub fn is_final_round(&self) -> bool {
        self.round + 1 >= self.max_rounds
    }
}

fn condense(message: &Message) -> HistoryEntry {
    const SUMMARY_LIMIT: usize = 200;
    let content = message.content();
    let summary = if content.chars().count() > SUMMARY_LIMIT {
        content.chars().take(SUMMARY_LIMIT).collect()
    } else {
        content.to_string()
    };
    HistoryEntry {
        sender: message.sender(),
        summary,
        offer_amount: message.offer().map(|o| o.amount),
    }
}
