//! Haggle - AI-mediated price negotiation engine.
//!
//! This crate implements marketplace price negotiations where an AI
//! counterparty answers buyer offers on the seller's behalf, with
//! branchable conversation timelines and a deterministic local
//! fallback when the remote pricing policy is unavailable.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
