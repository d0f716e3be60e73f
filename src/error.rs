use thiserror::Error;

#[derive(Error, Debug)]
pub enum PodcastError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Speech synthesis error: {0}")]
    SynthesisError(String),

    #[error("Audio format mismatch: {0}")]
    AudioFormatMismatch(String),

    #[error("No video clips were created - cannot generate video")]
    EmptyComposite,

    #[error("Transcript analysis error: {0}")]
    AnalysisError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Video generation error: {0}")]
    VideoGenerationError(String),

    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("WAV error: {0}")]
    WavError(#[from] hound::Error),

    #[error("Image decode error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Base64 decode error: {0}")]
    DecodeError(#[from] base64::DecodeError),

    #[error("Failed to persist temporary file: {0}")]
    PersistError(#[from] tempfile::PersistError),
}

pub type Result<T> = std::result::Result<T, PodcastError>;
