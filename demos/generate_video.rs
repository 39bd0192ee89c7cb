//! This example drives the long-running video pipeline on its own:
//! submitting a scene, polling the operation and downloading the result.
//!
//! Usage:
//! `cargo run --example generate_video "A fox in a room full of stars" [timeout_secs]`

use std::env;
use std::time::Duration;
use storycrafter::{Config, GeminiClient, GenerateVideoInput, GenerationBackend, VideoConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let scene = env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("Please provide a scene description."))?;
    let timeout = env::args()
        .nth(2)
        .map(|secs| secs.parse::<u64>())
        .transpose()?
        .map(Duration::from_secs);

    let config = Config::from_dotenv()?.with_video_config(VideoConfig {
        timeout,
        ..Default::default()
    });
    let client = GeminiClient::from_config(&config)?;

    println!("Generating video for `{scene}`...");
    let output = client
        .generate_video(&GenerateVideoInput::new(scene))
        .await?;
    println!("Done: {} characters of data URI", output.video_data_uri.len());

    Ok(())
}
