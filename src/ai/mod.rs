pub mod error;
pub mod gemini;
pub mod prompt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::InsightError;
pub use gemini::GeminiClient;
pub use prompt::{build_insight_prompt, MAX_PROMPT_TRADES};

use crate::models::Trade;

/// Seam for the text-generation backend, so the journal and tests are not
/// tied to a concrete API client.
#[async_trait]
pub trait InsightProvider: Send + Sync {
    /// Produces a free-text summary of the given trades, or reports that
    /// generation failed. Single attempt; retrying is the caller's choice.
    async fn generate_insight(&self, trades: &[Trade]) -> Result<String, InsightError>;
}

/// A generated insight tagged with the store revision it was requested
/// against. A result whose revision no longer matches the store is stale
/// and must be disregarded, not applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub text: String,
    pub revision: u64,
}
