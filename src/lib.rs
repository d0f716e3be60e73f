pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod segment;
pub mod video;

pub use config::Configuration;
pub use error::{PodcastError, Result};
