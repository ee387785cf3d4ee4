//! Price bounds and the moving offer for one negotiation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Currency, ValidationError};

/// Lowest acceptable offer as a fraction of the listing's minimum price.
///
/// Offers below `min_price * OFFER_FLOOR_RATIO` are rejected outright
/// as not worth negotiating over.
pub const OFFER_FLOOR_RATIO: f64 = 0.5;

/// Pricing state of a negotiation.
///
/// `base_price` and `min_price` are copied from the product at creation
/// and never change afterwards, even if the listing is edited. Only
/// `current_offer` moves as offers and counters land.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingTerms {
    initial_offer: f64,
    current_offer: f64,
    base_price: f64,
    min_price: f64,
    currency: Currency,
}

impl PricingTerms {
    /// Creates pricing terms from product bounds and an opening offer.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if bounds are non-finite, non-positive, or
    ///   `min_price > base_price`
    pub fn new(
        initial_offer: f64,
        base_price: f64,
        min_price: f64,
        currency: Currency,
    ) -> Result<Self, ValidationError> {
        if !base_price.is_finite() || !min_price.is_finite() || !initial_offer.is_finite() {
            return Err(ValidationError::invalid_format(
                "pricing",
                "prices must be finite numbers",
            ));
        }
        if base_price <= 0.0 || min_price <= 0.0 {
            return Err(ValidationError::invalid_format(
                "pricing",
                "prices must be positive",
            ));
        }
        if min_price > base_price {
            return Err(ValidationError::invalid_format(
                "pricing",
                "min_price cannot exceed base_price",
            ));
        }
        Ok(Self {
            initial_offer,
            current_offer: initial_offer,
            base_price,
            min_price,
            currency,
        })
    }

    /// Reconstitutes pricing terms from persistence.
    pub fn reconstitute(
        initial_offer: f64,
        current_offer: f64,
        base_price: f64,
        min_price: f64,
        currency: Currency,
    ) -> Self {
        Self {
            initial_offer,
            current_offer,
            base_price,
            min_price,
            currency,
        }
    }

    /// Returns the buyer's opening offer.
    pub fn initial_offer(&self) -> f64 {
        self.initial_offer
    }

    /// Returns the offer currently on the table.
    pub fn current_offer(&self) -> f64 {
        self.current_offer
    }

    /// Returns the listing price.
    pub fn base_price(&self) -> f64 {
        self.base_price
    }

    /// Returns the seller's floor price.
    pub fn min_price(&self) -> f64 {
        self.min_price
    }

    /// Returns the negotiation currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the lowest offer worth entertaining.
    pub fn offer_floor(&self) -> f64 {
        self.min_price * OFFER_FLOOR_RATIO
    }

    /// Returns true if `amount` is within `[offer_floor, base_price]`.
    pub fn is_within_bounds(&self, amount: f64) -> bool {
        amount.is_finite() && amount >= self.offer_floor() && amount <= self.base_price
    }

    /// Records a new offer on the table.
    pub fn record_offer(&mut self, amount: f64) {
        self.current_offer = amount;
    }

    /// Clamps a counter amount into `[min_price, base_price]`.
    pub fn clamp_counter(&self, amount: f64) -> f64 {
        amount.clamp(self.min_price, self.base_price)
    }
}
