pub mod ffmpeg;
mod generator;
mod timeline;

pub use generator::{AudioTrack, RenderSettings, VideoGenerator};
pub use timeline::{fit_audio, AudioFit, Clip, ClipKind, Timeline};
