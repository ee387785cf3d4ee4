//! Application layer: command handling over the domain and ports.

pub mod context;
pub mod engine;
pub mod export;

pub use context::{ContextCoordinator, ResumeMessage, ResumeSummary};
pub use engine::{
    CreateBranchCommand, NegotiationEngine, PostMessageCommand, StartNegotiationCommand,
    SubmitOfferCommand,
};
pub use export::{ExportFormat, NegotiationSnapshot};
