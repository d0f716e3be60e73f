mod gemini;

pub use gemini::GeminiClient;

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// 文本生成请求
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: Option<f32>,
    /// 启用网络搜索
    pub web_search: bool,
    /// 需要一并分析的视频地址
    pub video_url: Option<String>,
}

impl TextRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            temperature: None,
            web_search: false,
            video_url: None,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_web_search(mut self) -> Self {
        self.web_search = true;
        self
    }

    pub fn with_video(mut self, url: impl Into<String>) -> Self {
        self.video_url = Some(url.into());
        self
    }
}

/// 搜索引用来源
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedText {
    pub text: String,
    pub sources: Vec<Source>,
}

impl GeneratedText {
    /// 编号的来源列表，每条两行
    pub fn sources_text(&self) -> String {
        self.sources
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {}\n   {}", i + 1, s.title, s.uri))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
pub trait TextGenerate: Send + Sync {
    async fn generate(&self, request: TextRequest) -> Result<GeneratedText>;
}

#[async_trait]
pub trait ImageGenerate: Send + Sync {
    /// 生成图片并写入 `destination`，模型没有返回图片时为 `Ok(None)`
    async fn generate_image(&self, prompt: &str, destination: &Path) -> Result<Option<PathBuf>>;
}

#[async_trait]
pub trait SpeechSynthesize: Send + Sync {
    /// 返回原始 PCM 字节；失败必须是 `Err`，空音频是 `Ok(vec![])`
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>>;
}
