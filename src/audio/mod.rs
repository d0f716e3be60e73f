mod synthesizer;
pub mod wav;

pub use synthesizer::{SpeechSynthesizer, SynthesizedAudio};
