//! Currency value object.
//!
//! Offer amounts are plain decimal values as quoted by sellers; the
//! engine never does sub-cent arithmetic, so `f64` with explicit
//! rounding at counter-offer computation is sufficient.

use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO-4217 style currency code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Inr,
}

impl Currency {
    /// Returns the three-letter code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Inr => "INR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_three_letter_code() {
        assert_eq!(Currency::Eur.to_string(), "EUR");
        assert_eq!(Currency::default().code(), "USD");
    }

    #[test]
    fn serializes_uppercase() {
        let json = serde_json::to_string(&Currency::Gbp).unwrap();
        assert_eq!(json, "\"GBP\"");
        let back: Currency = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Currency::Gbp);
    }
}
