use anyhow::Context;
use auto_podcast::api::GeminiClient;
use auto_podcast::pipeline::{Collaborators, PodcastPipeline, PodcastRequest};
use auto_podcast::Configuration;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "auto-podcast")]
#[command(about = "Research a topic and turn it into a two-speaker video podcast", long_about = None)]
struct Args {
    /// Topic to research
    #[arg(short, long)]
    topic: Option<String>,

    /// Video URL to analyze alongside web search
    #[arg(short, long)]
    video_url: Option<String>,

    /// Existing dialogue script (skips research and script writing)
    #[arg(short = 'f', long)]
    transcript: Option<PathBuf>,

    /// Output video file path (defaults to <work-dir>/podcast_video.mp4)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Working directory for scripts, images and temporary audio
    #[arg(short = 'w', long, default_value = "./podcast")]
    work_dir: PathBuf,

    /// Skip image generation (use existing images)
    #[arg(long)]
    skip_images: bool,

    /// Gemini API key
    #[arg(long)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .init();

    dotenvy::dotenv().ok();
    let args = Args::parse();

    let api_key = match args.api_key.or_else(|| std::env::var("GEMINI_API_KEY").ok()) {
        Some(key) => key,
        None => {
            eprintln!("Error: GEMINI_API_KEY not found. Please set it via --api-key or GEMINI_API_KEY environment variable");
            std::process::exit(1);
        }
    };

    let transcript = match &args.transcript {
        Some(path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read transcript: {}", path.display()))?,
        ),
        None => None,
    };

    let topic = match (args.topic, &transcript) {
        (Some(topic), _) => topic,
        (None, Some(_)) => String::new(),
        (None, None) => {
            eprintln!("Error: Either --topic or --transcript must be provided");
            std::process::exit(1);
        }
    };

    let config = Configuration::from_env().context("Failed to load configuration")?;
    info!("Starting podcast generation...");

    tokio::fs::create_dir_all(&args.work_dir)
        .await
        .context("Failed to create work directory")?;

    let client = GeminiClient::new(api_key, config.tts_model.clone(), config.image_model.clone())
        .context("Failed to create Gemini client")?;
    let pipeline = PodcastPipeline::new(config, Collaborators::gemini(client), &args.work_dir);

    let request = PodcastRequest {
        topic,
        video_url: args.video_url,
        transcript,
        output_path: args.output,
        skip_images: args.skip_images,
    };

    match pipeline.run(request).await {
        Ok(output) => {
            info!("Video created successfully: {}", output.video_path.display());
            Ok(())
        }
        Err(e) => {
            error!("Podcast generation failed: {}", e);
            std::process::exit(1);
        }
    }
}
