//! This example generates story pages from the command line:
//! 1. Reading each argument as the user's next story fragment.
//! 2. Running the full continuation, video/image and narration pipeline.
//! 3. Printing what each page would render.
//!
//! To run this example, you must have the `GEMINI_API_KEY` environment variable set
//! (a `.env` file works too).
//!
//! Usage:
//! `cargo run --example continue_story "The fox opened the door" "Then the stars began to sing"`

use storycrafter::{Config, GeminiClient, PrimaryVisual, Story, StoryOrchestrator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_dotenv()?;
    let orchestrator = StoryOrchestrator::new(GeminiClient::from_config(&config)?);

    let inputs: Vec<String> = std::env::args().skip(1).collect();
    if inputs.is_empty() {
        anyhow::bail!("Please provide at least one story fragment as a command-line argument.");
    }

    let mut story = Story::new();
    for input in inputs {
        println!("\n> {input}");
        match orchestrator.continue_session(&mut story, &input).await {
            Ok(part) => {
                println!("#{} {}", part.id, part.text());
                match part.primary_visual() {
                    PrimaryVisual::Video(uri) => println!("  video: {} bytes of data URI", uri.len()),
                    PrimaryVisual::Image(url) => println!("  image: {url}"),
                    PrimaryVisual::Loading => println!("  (no visual)"),
                }
                if let Some(hint) = &part.fields.image_hint {
                    println!("  hint: {hint}");
                }
                println!(
                    "  narration: {}",
                    if part.fields.audio_url.is_some() { "yes" } else { "no" }
                );
            }
            Err(code) => eprintln!("  failed: {code}"),
        }
    }

    println!("\nStory so far:\n{}", story.transcript());
    Ok(())
}
