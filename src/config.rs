use crate::error::{PodcastError, Result};
use crate::segment::Speaker;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 流水线配置（模型、温度、语音、音频格式）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Configuration {
    pub search_model: String,
    pub synthesis_model: String,
    pub video_model: String,
    pub tts_model: String,
    pub image_model: String,

    pub search_temperature: f32,
    pub synthesis_temperature: f32,
    pub podcast_temperature: f32,

    /// Mike 的预置语音
    pub mike_voice: String,
    /// Dr. Lisa 的预置语音
    pub lisa_voice: String,
    /// 声道数，非正数时按单声道处理
    pub tts_channel: i32,
    /// 采样率（Hz）
    pub tts_rate: u32,
    /// 采样宽度（字节）
    pub tts_sample_width: u16,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            search_model: "gemini-2.5-flash".to_string(),
            synthesis_model: "gemini-2.5-flash".to_string(),
            video_model: "gemini-2.5-flash".to_string(),
            tts_model: "gemini-2.5-flash-preview-tts".to_string(),
            image_model: "gemini-2.0-flash-preview-image-generation".to_string(),
            search_temperature: 0.0,
            synthesis_temperature: 0.3,
            podcast_temperature: 0.4,
            mike_voice: "Puck".to_string(),
            lisa_voice: "Kore".to_string(),
            tts_channel: 1,
            tts_rate: 24000,
            tts_sample_width: 2,
        }
    }
}

impl Configuration {
    /// 从环境变量读取配置，变量名为字段名的大写形式
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        override_string(&mut config.search_model, get("SEARCH_MODEL"));
        override_string(&mut config.synthesis_model, get("SYNTHESIS_MODEL"));
        override_string(&mut config.video_model, get("VIDEO_MODEL"));
        override_string(&mut config.tts_model, get("TTS_MODEL"));
        override_string(&mut config.image_model, get("IMAGE_MODEL"));
        override_string(&mut config.mike_voice, get("MIKE_VOICE"));
        override_string(&mut config.lisa_voice, get("LISA_VOICE"));

        override_parsed(&mut config.search_temperature, "SEARCH_TEMPERATURE", get("SEARCH_TEMPERATURE"))?;
        override_parsed(&mut config.synthesis_temperature, "SYNTHESIS_TEMPERATURE", get("SYNTHESIS_TEMPERATURE"))?;
        override_parsed(&mut config.podcast_temperature, "PODCAST_TEMPERATURE", get("PODCAST_TEMPERATURE"))?;
        override_parsed(&mut config.tts_channel, "TTS_CHANNEL", get("TTS_CHANNEL"))?;
        override_parsed(&mut config.tts_rate, "TTS_RATE", get("TTS_RATE"))?;
        override_parsed(&mut config.tts_sample_width, "TTS_SAMPLE_WIDTH", get("TTS_SAMPLE_WIDTH"))?;
        config.audio_format()?;

        Ok(config)
    }

    /// 语音合成输出的 PCM 格式
    pub fn audio_format(&self) -> Result<AudioFormat> {
        let channels = if self.tts_channel > 0 {
            u16::try_from(self.tts_channel).map_err(|_| {
                PodcastError::ConfigError(format!("Invalid value for TTS_CHANNEL: {}", self.tts_channel))
            })?
        } else {
            1
        };
        Ok(AudioFormat {
            channels,
            sample_rate: self.tts_rate,
            sample_width: self.tts_sample_width,
        })
    }

    pub fn voices(&self) -> VoicePresets {
        VoicePresets {
            interviewer: self.mike_voice.clone(),
            expert: self.lisa_voice.clone(),
        }
    }
}

fn override_string(field: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *field = value;
    }
}

fn override_parsed<T: FromStr>(field: &mut T, key: &str, value: Option<String>) -> Result<()> {
    if let Some(value) = value {
        *field = value.trim().parse().map_err(|_| {
            PodcastError::ConfigError(format!("Invalid value for {}: {}", key, value))
        })?;
    }
    Ok(())
}

/// 原始 PCM 数据的格式参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub channels: u16,
    pub sample_rate: u32,
    /// 每个采样的字节数
    pub sample_width: u16,
}

impl AudioFormat {
    pub fn frame_size(&self) -> usize {
        self.channels as usize * self.sample_width as usize
    }
}

/// 两位说话人各自的语音
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoicePresets {
    pub interviewer: String,
    pub expert: String,
}

impl VoicePresets {
    pub fn voice_for(&self, speaker: Speaker) -> &str {
        match speaker {
            Speaker::Mike => &self.interviewer,
            Speaker::DrLisa => &self.expert,
        }
    }
}
