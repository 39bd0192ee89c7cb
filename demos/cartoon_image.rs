//! This example calls the cartoon image adapter directly.
//!
//! Usage:
//! `cargo run --example cartoon_image "A brave knight in a dark cave"`

use storycrafter::{GeminiClient, GenerateImageInput, GenerationBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let client = GeminiClient::new(None)?;
    let description = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "A brave knight in a dark cave with a sleeping dragon".to_string());

    let output = client
        .generate_image(&GenerateImageInput::new(description))
        .await?;
    let (mime_type, payload) = storycrafter::media::parse_data_uri(&output.cartoon_image_data_uri)
        .ok_or_else(|| anyhow::anyhow!("unexpected image payload"))?;
    println!("Generated {mime_type} image, {} base64 characters", payload.len());

    Ok(())
}
