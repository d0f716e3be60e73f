use super::wav;
use crate::api::SpeechSynthesize;
use crate::config::{AudioFormat, VoicePresets};
use crate::error::{PodcastError, Result};
use crate::segment::Segment;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{info, warn};

const AUDIO_FILE_NAME: &str = "podcast_audio.wav";

/// 语音合成结果：完整音轨和带实际时长的片段
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedAudio {
    /// 没有片段时为 None
    pub audio_path: Option<PathBuf>,
    pub segments: Vec<Segment>,
}

impl SynthesizedAudio {
    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration).sum()
    }
}

pub struct SpeechSynthesizer {
    speech: Arc<dyn SpeechSynthesize>,
    format: AudioFormat,
    voices: VoicePresets,
    work_dir: PathBuf,
}

impl SpeechSynthesizer {
    pub fn new(
        speech: Arc<dyn SpeechSynthesize>,
        format: AudioFormat,
        voices: VoicePresets,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            speech,
            format,
            voices,
            work_dir: work_dir.into(),
        }
    }

    /// 合成音轨的最终路径
    pub fn audio_path(&self) -> PathBuf {
        self.work_dir.join(AUDIO_FILE_NAME)
    }

    /// 逐段合成语音、测量时长，再拼接为一条音轨
    ///
    /// 任何一段失败都会中止；已生成的临时文件随之删除。
    pub async fn synthesize(&self, segments: &[Segment]) -> Result<SynthesizedAudio> {
        if segments.is_empty() {
            warn!("No segments to synthesize");
            return Ok(SynthesizedAudio {
                audio_path: None,
                segments: Vec::new(),
            });
        }

        tokio::fs::create_dir_all(&self.work_dir).await?;
        info!("Generating TTS audio for {} segments...", segments.len());

        let mut parts: Vec<NamedTempFile> = Vec::with_capacity(segments.len());
        let mut updated = Vec::with_capacity(segments.len());

        for (i, segment) in segments.iter().enumerate() {
            info!(
                "Generating audio for segment {}/{}: {}",
                i + 1,
                segments.len(),
                segment.speaker
            );

            let voice = self.voices.voice_for(segment.speaker);
            let pcm = self
                .speech
                .synthesize(&segment.speech_text(), voice)
                .await
                .map_err(|e| {
                    PodcastError::SynthesisError(format!("segment {} ({}): {}", i + 1, segment.speaker, e))
                })?;

            let part = tempfile::Builder::new()
                .prefix("segment_")
                .suffix(".wav")
                .tempfile_in(&self.work_dir)?;
            wav::write_pcm(part.path(), &pcm, self.format)?;
            let duration = wav::measure_duration(part.path())?;

            if duration > 0.0 {
                info!("Generated {:.1}s audio for {}", duration, segment.speaker);
            } else {
                warn!("Segment {} produced no audio", i + 1);
            }

            updated.push(Segment {
                duration,
                ..segment.clone()
            });
            parts.push(part);
        }

        info!("Concatenating all audio segments...");
        let output = tempfile::Builder::new()
            .prefix("podcast_audio_")
            .suffix(".wav")
            .tempfile_in(&self.work_dir)?;
        let part_paths: Vec<_> = parts.iter().map(|p| p.path()).collect();
        wav::concatenate(&part_paths, output.path())?;

        let audio_path = self.audio_path();
        output.persist(&audio_path)?;

        for part in parts {
            part.close()?;
        }

        let result = SynthesizedAudio {
            audio_path: Some(audio_path),
            segments: updated,
        };
        info!(
            "Generated complete audio file ({:.1} seconds)",
            result.total_duration()
        );
        Ok(result)
    }
}
