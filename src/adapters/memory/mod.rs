//! In-memory adapters for persistence and collaborator ports.

mod negotiation_store;
mod product_service;
mod stats_service;

pub use negotiation_store::InMemoryNegotiationStore;
pub use product_service::InMemoryProductService;
pub use stats_service::InMemoryStatsService;
