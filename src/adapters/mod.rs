//! Adapters - implementations of the ports.

pub mod events;
pub mod memory;
pub mod policy;
