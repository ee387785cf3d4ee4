//! Deterministic local pricing heuristic.
//!
//! Engaged whenever the primary policy errors or times out, so its
//! output must be a pure function of the context: same snapshot, same
//! decision, no randomness and no clock reads.

use super::context::PolicyContext;
use super::decision::PricingDecision;

/// Offer at or above `min_price * 1.1` draws a midpoint counter.
const COUNTER_RATIO: f64 = 1.1;

/// Offer below `min_price * 0.8` is rejected outright.
const REJECT_RATIO: f64 = 0.8;

/// Fraction of the gap to the base price conceded by a counter.
const CONCESSION_SPLIT: f64 = 0.5;

/// Rule-based stand-in for the remote pricing policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackPolicy;

impl FallbackPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Decides on the current offer. Never fails.
    pub fn decide(&self, ctx: &PolicyContext) -> PricingDecision {
        let offer = ctx.current_offer;
        let min = ctx.min_price;

        if offer >= min * COUNTER_RATIO {
            let amount = round_cents(offer + (ctx.base_price - offer) * CONCESSION_SPLIT);
            let reasoning = format!(
                "That's getting close. I could meet you at {:.2}.",
                amount
            );
            let decision = if ctx.is_final_round() {
                PricingDecision::final_counter(amount, 0.75, reasoning)
            } else {
                PricingDecision::counter(amount, 0.75, reasoning)
            };
            return decision.as_fallback();
        }

        if offer < min * REJECT_RATIO {
            return PricingDecision::reject(
                0.85,
                "I appreciate the interest, but that's too far below what I can accept.",
            )
            .as_fallback();
        }

        if ctx.is_final_round() {
            if offer >= min {
                return PricingDecision::accept(
                    0.8,
                    "We're out of back-and-forth, and your offer works. Deal.",
                )
                .as_fallback();
            }
            return PricingDecision::reject(
                0.8,
                "We're out of back-and-forth and I can't go that low. I'll have to pass.",
            )
            .as_fallback();
        }

        PricingDecision::fallback_continue()
    }
}

// Counters land on whole cents; a fractional midpoint rounds to the
// nearest cent, not the nearest whole unit.
fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Currency;
    use crate::domain::pricing::{DecisionAction, SellerPersonality, UrgencyLevel};

    fn ctx(offer: f64, round: u32, max_rounds: u32) -> PolicyContext {
        PolicyContext {
            product_title: "Road bike".to_string(),
            base_price: 900.0,
            min_price: 750.0,
            currency: Currency::Usd,
            current_offer: offer,
            round,
            max_rounds,
            urgency: UrgencyLevel::Medium,
            personality: SellerPersonality::Balanced,
            recent_history: Vec::new(),
            user_message: None,
        }
    }

    #[test]
    fn mid_range_offer_keeps_talking() {
        // 760 is below the 825 counter threshold, above the 600 reject
        // threshold, and rounds remain.
        let d = FallbackPolicy.decide(&ctx(760.0, 1, 5));
        assert_eq!(d.action, DecisionAction::Continue);
        assert_eq!(d.confidence, 0.3);
        assert!(d.is_fallback);
    }

    #[test]
    fn acceptable_offer_on_final_round_is_accepted() {
        let d = FallbackPolicy.decide(&ctx(820.0, 4, 5));
        assert_eq!(d.action, DecisionAction::Accept);
    }

    #[test]
    fn sub_floor_offer_on_final_round_is_rejected() {
        let d = FallbackPolicy.decide(&ctx(700.0, 4, 5));
        assert_eq!(d.action, DecisionAction::Reject);
    }

    #[test]
    fn lowball_is_rejected() {
        // 500 < 750 * 0.8
        let d = FallbackPolicy.decide(&ctx(500.0, 1, 5));
        assert_eq!(d.action, DecisionAction::Reject);
    }

    #[test]
    fn strong_offer_draws_midpoint_counter() {
        let d = FallbackPolicy.decide(&ctx(830.0, 1, 5));
        assert_eq!(d.action, DecisionAction::Counter);
        assert_eq!(d.counter_amount(), Some(865.0));
    }

    #[test]
    fn offer_at_base_price_counters_at_base_price() {
        let d = FallbackPolicy.decide(&ctx(900.0, 1, 5));
        assert_eq!(d.counter_amount(), Some(900.0));
    }

    #[test]
    fn fractional_midpoint_counters_to_the_nearest_cent() {
        // 812.5 + (900 - 812.5) * 0.5 = 856.25
        let d = FallbackPolicy.decide(&ctx(812.5, 1, 5));
        assert_eq!(d.counter_amount(), Some(856.25));
    }

    #[test]
    fn final_round_counter_is_declared_final() {
        let d = FallbackPolicy.decide(&ctx(830.0, 4, 5));
        assert_eq!(d.action, DecisionAction::Counter);
        assert!(d.is_final_counter());
    }

    #[test]
    fn decisions_are_deterministic() {
        let context = ctx(812.5, 2, 5);
        let first = FallbackPolicy.decide(&context);
        let second = FallbackPolicy.decide(&context);
        assert_eq!(first, second);
    }
}
