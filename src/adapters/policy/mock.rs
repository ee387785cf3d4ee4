//! Scripted pricing policy for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::pricing::{PolicyContext, PricingDecision};
use crate::ports::{PolicyError, PricingPolicy};

/// Test double for [`PricingPolicy`].
///
/// Plays back scripted decisions in order, optionally repeats a single
/// decision forever, or fails every call. Records every context it was
/// asked about for assertions.
pub struct MockPolicy {
    script: Mutex<VecDeque<PricingDecision>>,
    default: Option<PricingDecision>,
    fail: Option<PolicyError>,
    delay: Option<Duration>,
    calls: Mutex<Vec<PolicyContext>>,
}

impl MockPolicy {
    /// Repeats one decision on every call.
    pub fn returning(decision: PricingDecision) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default: Some(decision),
            fail: None,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Plays back decisions in order, then errors when exhausted.
    pub fn scripted(decisions: Vec<PricingDecision>) -> Self {
        Self {
            script: Mutex::new(decisions.into()),
            default: None,
            fail: None,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call with the given error.
    pub fn failing(error: PolicyError) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default: None,
            fail: Some(error),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Adds an artificial delay before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns every context this policy was asked about.
    pub fn calls(&self) -> Vec<PolicyContext> {
        self.calls.lock().expect("MockPolicy: calls lock poisoned").clone()
    }

    /// Returns the number of calls received.
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("MockPolicy: calls lock poisoned").len()
    }
}

// PolicyError does not derive Clone; rebuild the stored error per call.
fn replay_error(error: &PolicyError) -> PolicyError {
    match error {
        PolicyError::Timeout { timeout_secs } => PolicyError::Timeout {
            timeout_secs: *timeout_secs,
        },
        PolicyError::Unavailable { message } => PolicyError::Unavailable {
            message: message.clone(),
        },
        PolicyError::AuthenticationFailed => PolicyError::AuthenticationFailed,
        PolicyError::MalformedResponse(s) => PolicyError::MalformedResponse(s.clone()),
        PolicyError::Network(s) => PolicyError::Network(s.clone()),
    }
}

#[async_trait]
impl PricingPolicy for MockPolicy {
    async fn decide(&self, ctx: &PolicyContext) -> Result<PricingDecision, PolicyError> {
        self.calls
            .lock()
            .expect("MockPolicy: calls lock poisoned")
            .push(ctx.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = &self.fail {
            return Err(replay_error(error));
        }

        if let Some(next) = self
            .script
            .lock()
            .expect("MockPolicy: script lock poisoned")
            .pop_front()
        {
            return Ok(next);
        }

        self.default.clone().ok_or_else(|| PolicyError::Unavailable {
            message: "mock policy script exhausted".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Currency;
    use crate::domain::pricing::{DecisionAction, SellerPersonality, UrgencyLevel};

    fn ctx() -> PolicyContext {
        PolicyContext {
            product_title: "Lamp".to_string(),
            base_price: 60.0,
            min_price: 40.0,
            currency: Currency::Eur,
            current_offer: 45.0,
            round: 0,
            max_rounds: 3,
            urgency: UrgencyLevel::Low,
            personality: SellerPersonality::Firm,
            recent_history: Vec::new(),
            user_message: None,
        }
    }

    #[tokio::test]
    async fn scripted_decisions_play_in_order() {
        let mock = MockPolicy::scripted(vec![
            PricingDecision::counter(55.0, 0.9, "55?"),
            PricingDecision::accept(0.9, "Deal"),
        ]);

        assert_eq!(
            mock.decide(&ctx()).await.unwrap().action,
            DecisionAction::Counter
        );
        assert_eq!(
            mock.decide(&ctx()).await.unwrap().action,
            DecisionAction::Accept
        );
        assert!(mock.decide(&ctx()).await.is_err());
    }

    #[tokio::test]
    async fn returning_repeats_forever() {
        let mock = MockPolicy::returning(PricingDecision::reject(0.8, "No"));
        for _ in 0..3 {
            assert_eq!(
                mock.decide(&ctx()).await.unwrap().action,
                DecisionAction::Reject
            );
        }
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn failing_mock_records_calls() {
        let mock = MockPolicy::failing(PolicyError::AuthenticationFailed);
        assert!(mock.decide(&ctx()).await.is_err());
        assert!(mock.decide(&ctx()).await.is_err());
        assert_eq!(mock.calls().len(), 2);
        assert_eq!(mock.calls()[0].product_title, "Lamp");
    }
}
