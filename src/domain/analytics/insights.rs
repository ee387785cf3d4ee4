//! Read-only derivations over a negotiation's main timeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::negotiation::{
    BranchName, Message, MessageSender, Negotiation, NegotiationStatus,
};

use super::sentiment::Sentiment;

/// One offer as it landed on the table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OfferPoint {
    pub sender: MessageSender,
    pub amount: f64,
}

/// Per-sender activity counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityCounts {
    pub messages: HashMap<MessageSender, usize>,
    pub offers: HashMap<MessageSender, usize>,
}

/// Derived metrics for one negotiation. Pure reads; computing insights
/// never mutates the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationInsights {
    pub status: NegotiationStatus,
    pub rounds: u32,
    pub counts: ActivityCounts,
    /// Offers in the order they landed, all senders.
    pub offer_trajectory: Vec<OfferPoint>,
    /// Mean step between consecutive buyer offers; positive means the
    /// buyer moved up. None with fewer than two buyer offers.
    pub buyer_concession_rate: Option<f64>,
    /// Mean step between consecutive AI counters; negative means the
    /// seller side came down. None with fewer than two counters.
    pub seller_concession_rate: Option<f64>,
    /// Sentiment over all buyer text, concatenated.
    pub buyer_sentiment: Sentiment,
    /// Mean seconds from a counterparty message to the next buyer
    /// message. None when the buyer never replied.
    pub avg_buyer_response_seconds: Option<f64>,
    /// Gap between the listing price and the offer on the table.
    pub distance_to_base: f64,
}

impl NegotiationInsights {
    /// Derives insights from the main-branch timeline.
    pub fn derive(negotiation: &Negotiation) -> Self {
        let messages = negotiation
            .visible_messages(&BranchName::main())
            .unwrap_or_default();

        let mut counts = ActivityCounts::default();
        let mut trajectory = Vec::new();
        let mut buyer_text = String::new();

        for message in &messages {
            *counts.messages.entry(message.sender()).or_insert(0) += 1;
            if let Some(offer) = message.offer() {
                *counts.offers.entry(message.sender()).or_insert(0) += 1;
                trajectory.push(OfferPoint {
                    sender: message.sender(),
                    amount: offer.amount,
                });
            }
            if message.sender() == MessageSender::Buyer {
                buyer_text.push_str(message.content());
                buyer_text.push(' ');
            }
        }

        let pricing = negotiation.pricing();
        Self {
            status: negotiation.status(),
            rounds: negotiation.rounds(),
            buyer_concession_rate: concession_rate(&trajectory, MessageSender::Buyer),
            seller_concession_rate: concession_rate(&trajectory, MessageSender::Ai),
            buyer_sentiment: Sentiment::of(&buyer_text),
            avg_buyer_response_seconds: avg_buyer_response_seconds(&messages),
            distance_to_base: pricing.base_price() - pricing.current_offer(),
            counts,
            offer_trajectory: trajectory,
        }
    }
}

fn concession_rate(trajectory: &[OfferPoint], sender: MessageSender) -> Option<f64> {
    let amounts: Vec<f64> = trajectory
        .iter()
        .filter(|p| p.sender == sender)
        .map(|p| p.amount)
        .collect();
    if amounts.len() < 2 {
        return None;
    }
    let total: f64 = amounts.windows(2).map(|w| w[1] - w[0]).sum();
    Some(total / (amounts.len() - 1) as f64)
}

fn avg_buyer_response_seconds(messages: &[&Message]) -> Option<f64> {
    let mut gaps = Vec::new();
    for pair in messages.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if next.sender() == MessageSender::Buyer && prev.sender() != MessageSender::Buyer {
            let gap = next
                .created_at()
                .duration_since(&prev.created_at())
                .num_seconds();
            gaps.push(gap.max(0) as f64);
        }
    }
    if gaps.is_empty() {
        None
    } else {
        Some(gaps.iter().sum::<f64>() / gaps.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Currency, ProductId, UserId};
    use crate::domain::negotiation::OpenNegotiation;
    use crate::domain::pricing::PricingDecision;

    fn buyer() -> UserId {
        UserId::new("buyer").unwrap()
    }

    fn negotiation() -> Negotiation {
        Negotiation::open(OpenNegotiation {
            product_id: ProductId::new(),
            product_title: "Espresso machine".to_string(),
            seller_id: UserId::new("seller").unwrap(),
            buyer_id: buyer(),
            initial_offer: 780.0,
            opening_message: Some("Would you take 780? Looks like a great machine.".to_string()),
            base_price: 900.0,
            min_price: 750.0,
            currency: Currency::Usd,
            max_rounds: 5,
            expires_at: None,
        })
        .unwrap()
    }

    #[test]
    fn counts_group_by_sender() {
        let mut n = negotiation();
        n.post_message(&buyer(), "any flexibility?").unwrap();
        n.apply_decision(&PricingDecision::counter(860.0, 0.9, "860?"), false)
            .unwrap();

        let insights = NegotiationInsights::derive(&n);
        assert_eq!(insights.counts.messages[&MessageSender::Buyer], 2);
        assert_eq!(insights.counts.messages[&MessageSender::Ai], 1);
        assert_eq!(insights.counts.offers[&MessageSender::Buyer], 1);
        assert_eq!(insights.counts.offers[&MessageSender::Ai], 1);
    }

    #[test]
    fn trajectory_preserves_order() {
        let mut n = negotiation();
        n.apply_decision(&PricingDecision::counter(860.0, 0.9, "860?"), true)
            .unwrap();
        n.submit_offer(&buyer(), 810.0, None).unwrap();

        let insights = NegotiationInsights::derive(&n);
        let amounts: Vec<f64> = insights.offer_trajectory.iter().map(|p| p.amount).collect();
        assert_eq!(amounts, vec![780.0, 860.0, 810.0]);
    }

    #[test]
    fn buyer_concession_rate_tracks_upward_movement() {
        let mut n = negotiation();
        n.submit_offer(&buyer(), 800.0, None).unwrap();
        n.submit_offer(&buyer(), 830.0, None).unwrap();

        let insights = NegotiationInsights::derive(&n);
        // 780 -> 800 -> 830: mean step 25
        assert_eq!(insights.buyer_concession_rate, Some(25.0));
    }

    #[test]
    fn concession_rate_needs_two_offers() {
        let insights = NegotiationInsights::derive(&negotiation());
        assert_eq!(insights.buyer_concession_rate, None);
        assert_eq!(insights.seller_concession_rate, None);
    }

    #[test]
    fn sentiment_reads_buyer_text_only() {
        let mut n = negotiation();
        n.post_message(&buyer(), "any movement on price?").unwrap();
        n.apply_decision(
            &PricingDecision::reject(0.9, "That's a terrible, insulting offer"),
            false,
        )
        .unwrap();

        let insights = NegotiationInsights::derive(&n);
        // Buyer text is the friendly opening line; AI negativity ignored.
        assert!(insights.buyer_sentiment.score >= 0.0);
    }

    #[test]
    fn branch_messages_do_not_leak_into_insights() {
        let mut n = negotiation();
        let branch = crate::domain::negotiation::BranchName::new("what-if").unwrap();
        n.create_branch(
            branch.clone(),
            crate::domain::negotiation::BranchKind::Scenario,
            BranchName::main(),
        )
        .unwrap();
        n.switch_branch(branch).unwrap();
        n.post_message(&buyer(), "branch-only message").unwrap();

        let insights = NegotiationInsights::derive(&n);
        assert_eq!(insights.counts.messages[&MessageSender::Buyer], 1);
    }

    #[test]
    fn distance_to_base_tracks_current_offer() {
        let insights = NegotiationInsights::derive(&negotiation());
        assert_eq!(insights.distance_to_base, 120.0);
    }
}
