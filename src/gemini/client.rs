use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::env;
use std::time::Duration;
use tracing::debug;

use super::map::{into_media_items, RawItem};
use super::prompt::build_prompt;
use super::schema::response_schema;
use super::RecommendationApi;
use crate::models::MediaItem;

const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("GEMINI_API_KEY").context("GEMINI_API_KEY not set")?;
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let user_agent = format!("cinematch/{}", env!("CARGO_PKG_VERSION"));
        // Connect timeout only: a grounded generation call can legitimately
        // run long, and the caller accepts an unbounded wait.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()
            .context("Failed to build Gemini HTTP client")?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        #[derive(Deserialize)]
        struct GenerateResponse {
            candidates: Option<Vec<Candidate>>,
        }
        #[derive(Deserialize)]
        struct Candidate {
            content: Option<Content>,
        }
        #[derive(Deserialize)]
        struct Content {
            parts: Option<Vec<Part>>,
        }
        #[derive(Deserialize)]
        struct Part {
            text: Option<String>,
        }

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "tools": [{ "google_search": {} }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
            }
        });

        let url = format!("{GEMINI_BASE}/models/{}:generateContent", self.model);
        let res = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = res.status();
        let text = res.text().await.context("Failed to read Gemini body")?;
        if !status.is_success() {
            return Err(anyhow!("Gemini HTTP error (status {}): {}", status, text));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).context("Failed to parse Gemini JSON")?;
        // Grounded replies may split the payload across parts; join them.
        let reply = parsed
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .map(|parts| parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .unwrap_or_default();
        if reply.is_empty() {
            return Err(anyhow!("Gemini returned no text candidate"));
        }
        Ok(reply)
    }
}

/// Strip a markdown fence if the model wrapped its reply despite the JSON
/// response mime type.
fn strip_code_fence(reply: &str) -> &str {
    let reply = reply.trim();
    reply
        .strip_prefix("```json")
        .or_else(|| reply.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(reply)
}

#[async_trait]
impl RecommendationApi for GeminiClient {
    async fn get_recommendations(
        &self,
        query: &str,
        selected_genres: &[String],
    ) -> Result<Vec<MediaItem>> {
        let prompt = build_prompt(query, selected_genres);
        debug!(
            "Requesting recommendations for '{}' ({} genre hints)",
            query,
            selected_genres.len()
        );
        let reply = self.generate(&prompt).await?;
        let raw: Vec<RawItem> = serde_json::from_str(strip_code_fence(&reply))
            .context("Gemini reply did not match the recommendation contract")?;
        let batch_ts = Utc::now().timestamp_millis();
        into_media_items(raw, batch_ts)
    }
}
