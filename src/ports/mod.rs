//! Ports - interfaces between the domain and the outside world.
//!
//! Following hexagonal architecture, ports define contracts; adapters
//! implement them.
//!
//! - `PricingPolicy` - AI decision-making for offers
//! - `NegotiationRepository` - aggregate persistence
//! - `EventPublisher` / `EventSubscriber` - domain event transport
//! - `ProductService` - listing lookups and the sold-state side effect
//! - `StatsService` - transaction counters

mod event_publisher;
mod event_subscriber;
mod negotiation_repository;
mod pricing_policy;
mod product_service;
mod stats_service;

pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventHandler, EventSubscriber};
pub use negotiation_repository::NegotiationRepository;
pub use pricing_policy::{PolicyError, PricingPolicy};
pub use product_service::{ProductService, ProductSnapshot};
pub use stats_service::{SaleRecord, StatsService};
