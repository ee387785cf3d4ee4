//! Domain layer: pure business logic, no IO.

pub mod analytics;
pub mod foundation;
pub mod negotiation;
pub mod pricing;
