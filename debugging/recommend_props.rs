//! Fetch live recommendations and print the normalized items.
//! Usage:
//!   cargo run --bin recommend_props -- "<query>" [genre ...]
//! Requires GEMINI_API_KEY in the environment (.env supported).

use anyhow::Result;
use cinematch::gemini::{GeminiClient, RecommendationApi};
use dotenvy::dotenv;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: cargo run --bin recommend_props -- \"<query>\" [genre ...]");
        std::process::exit(1);
    }
    let query = args[1].clone();
    let genres: Vec<String> = args[2..].to_vec();

    let client = GeminiClient::from_env()?;
    let items = client.get_recommendations(&query, &genres).await?;
    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}
