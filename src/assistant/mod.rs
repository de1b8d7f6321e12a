//! AI ranking/filtering engine
//!
//! Reduces oversized candidate sets (flights, hotels, activities) to small
//! budget-appropriate shortlists through a conversational reasoning backend,
//! handling batching, rate-limit pacing and structured-output extraction.

pub mod backend;
pub mod engine;
pub mod pacing;

pub use backend::{OpenAiAssistantClient, ReasoningBackend, RunOutcome};
pub use engine::{Ranked, RankingConfig, RankingEngine};
pub use pacing::PacingGate;
