use anyhow::Result;
use async_trait::async_trait;

use crate::models::MediaItem;

mod client;
mod map;
mod prompt;
mod schema;

pub use client::GeminiClient;

/// Boundary to the generative recommendation provider.
///
/// One outbound call: free text plus genre hints in, a normalized list of
/// titles out, in provider order. Transport failures, provider error
/// responses and malformed replies all surface as a single opaque error;
/// callers show a generic retry message and never retry automatically.
///
/// The caller guarantees at least one of the two inputs is non-empty; the
/// client issues the request regardless and leaves the both-empty case to
/// the provider.
#[async_trait]
pub trait RecommendationApi: Send + Sync {
    async fn get_recommendations(
        &self,
        query: &str,
        selected_genres: &[String],
    ) -> Result<Vec<MediaItem>>;
}
