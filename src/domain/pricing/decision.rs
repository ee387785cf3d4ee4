//! The decision a pricing policy hands back.

use serde::{Deserialize, Serialize};

/// What the AI counterparty does with the offer on the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    /// Close the deal at the current offer.
    Accept,
    /// Walk away for good.
    Reject,
    /// Propose a different amount.
    Counter,
    /// Keep talking without moving the price.
    Continue,
}

/// Counter terms attached to a `Counter` decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CounterOffer {
    pub amount: f64,
    /// True when this is declared the last counter.
    pub is_final: bool,
}

/// A pricing policy's verdict for one decision point.
///
/// `confidence` is always within `[0.0, 1.0]`; constructors clamp it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingDecision {
    pub action: DecisionAction,
    pub counter: Option<CounterOffer>,
    pub confidence: f64,
    /// Reply text shown to the buyer.
    pub reasoning: String,
    /// True when the local heuristic decided instead of the primary.
    pub is_fallback: bool,
}

impl PricingDecision {
    fn new(
        action: DecisionAction,
        counter: Option<CounterOffer>,
        confidence: f64,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            action,
            counter,
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: reasoning.into(),
            is_fallback: false,
        }
    }

    /// Accepts the offer on the table.
    pub fn accept(confidence: f64, reasoning: impl Into<String>) -> Self {
        Self::new(DecisionAction::Accept, None, confidence, reasoning)
    }

    /// Turns the offer down for good.
    pub fn reject(confidence: f64, reasoning: impl Into<String>) -> Self {
        Self::new(DecisionAction::Reject, None, confidence, reasoning)
    }

    /// Counters at the given amount.
    pub fn counter(amount: f64, confidence: f64, reasoning: impl Into<String>) -> Self {
        Self::new(
            DecisionAction::Counter,
            Some(CounterOffer {
                amount,
                is_final: false,
            }),
            confidence,
            reasoning,
        )
    }

    /// Counters at the given amount, declared final.
    pub fn final_counter(amount: f64, confidence: f64, reasoning: impl Into<String>) -> Self {
        Self::new(
            DecisionAction::Counter,
            Some(CounterOffer {
                amount,
                is_final: true,
            }),
            confidence,
            reasoning,
        )
    }

    /// Keeps the conversation going without moving the price.
    pub fn keep_talking(confidence: f64, reasoning: impl Into<String>) -> Self {
        Self::new(DecisionAction::Continue, None, confidence, reasoning)
    }

    /// The neutral low-confidence continue used when the heuristic has
    /// nothing better to say.
    pub fn fallback_continue() -> Self {
        Self::keep_talking(
            0.3,
            "Let me think about that. Could you tell me a bit more about what you're looking for?",
        )
        .as_fallback()
    }

    /// Marks this decision as produced by the fallback heuristic.
    pub fn as_fallback(mut self) -> Self {
        self.is_fallback = true;
        self
    }

    /// Returns the counter amount, if this is a counter.
    pub fn counter_amount(&self) -> Option<f64> {
        self.counter.map(|c| c.amount)
    }

    /// Returns true if this is a counter declared final.
    pub fn is_final_counter(&self) -> bool {
        self.counter.map(|c| c.is_final).unwrap_or(false)
    }

    /// Returns the reply text for the buyer, falling back to a canned
    /// line per action when the policy gave none.
    pub fn reply_text(&self) -> String {
        if !self.reasoning.trim().is_empty() {
            return self.reasoning.clone();
        }
        match self.action {
            DecisionAction::Accept => "Deal. Let's close at that price.".to_string(),
            DecisionAction::Reject => "I'm sorry, that's too far from what I can do.".to_string(),
            DecisionAction::Counter => match self.counter {
                Some(c) => format!("I can't do that, but I could do {:.2}.", c.amount),
                None => "Let me counter that.".to_string(),
            },
            DecisionAction::Continue => "Tell me more about what you have in mind.".to_string(),
        }
    }
}
