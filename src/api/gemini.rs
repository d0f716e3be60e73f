use super::{GeneratedText, ImageGenerate, Source, SpeechSynthesize, TextGenerate, TextRequest};
use crate::error::{PodcastError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    tts_model: String,
    image_model: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    title: Option<String>,
    uri: Option<String>,
}

impl GenerateResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .into_iter()
            .flat_map(|c| c.parts.iter())
    }

    fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self.parts().filter_map(|p| p.text.as_deref()).collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }

    fn inline_data(&self) -> Option<&InlineData> {
        self.parts().find_map(|p| p.inline_data.as_ref())
    }

    fn sources(&self) -> Vec<Source> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|m| {
                m.grounding_chunks
                    .iter()
                    .filter_map(|chunk| chunk.web.as_ref())
                    .map(|web| Source {
                        title: web.title.clone().unwrap_or_else(|| "No title".to_string()),
                        uri: web.uri.clone().unwrap_or_else(|| "No URI".to_string()),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl GeminiClient {
    pub fn new(api_key: String, tts_model: String, image_model: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()?;

        Ok(Self {
            api_key,
            tts_model,
            image_model,
            client,
        })
    }

    async fn generate_content(&self, model: &str, body: Value) -> Result<GenerateResponse> {
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, model);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(PodcastError::ApiError(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        Ok(response.json().await?)
    }
}

fn text_request_body(request: &TextRequest) -> Value {
    let mut parts = Vec::new();
    if let Some(url) = &request.video_url {
        parts.push(json!({ "file_data": { "file_uri": url } }));
    }
    parts.push(json!({ "text": request.prompt }));

    let mut body = json!({ "contents": [{ "parts": parts }] });
    if let Some(temperature) = request.temperature {
        body["generationConfig"] = json!({ "temperature": temperature });
    }
    if request.web_search {
        body["tools"] = json!([{ "google_search": {} }]);
    }
    body
}

fn speech_request_body(text: &str, voice: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": text }] }],
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": {
                    "prebuiltVoiceConfig": { "voiceName": voice }
                }
            }
        }
    })
}

fn image_request_body(prompt: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": { "responseModalities": ["TEXT", "IMAGE"] }
    })
}

/// 模型可能返回 JPEG 或 WebP，统一解码后按 PNG 保存；无法解码时不写文件
fn save_png(bytes: &[u8], destination: &Path) -> Result<()> {
    let decoded = image::load_from_memory(bytes)?;
    decoded.save_with_format(destination, ImageFormat::Png)?;
    Ok(())
}

#[async_trait]
impl TextGenerate for GeminiClient {
    async fn generate(&self, request: TextRequest) -> Result<GeneratedText> {
        info!("Generating text with {}", request.model);
        let response = self
            .generate_content(&request.model, text_request_body(&request))
            .await?;

        let text = response
            .text()
            .ok_or_else(|| PodcastError::ApiError("Failed to extract generated text".to_string()))?;

        Ok(GeneratedText {
            sources: response.sources(),
            text,
        })
    }
}

#[async_trait]
impl ImageGenerate for GeminiClient {
    async fn generate_image(&self, prompt: &str, destination: &Path) -> Result<Option<PathBuf>> {
        info!("Generating image: {}", destination.display());
        let response = self
            .generate_content(&self.image_model, image_request_body(prompt))
            .await?;

        if let Some(text) = response.text() {
            debug!("Image model text: {}", text);
        }

        let Some(inline) = response.inline_data() else {
            warn!("Image generation produced no image for {}", destination.display());
            return Ok(None);
        };

        let bytes = STANDARD.decode(inline.data.as_bytes())?;
        debug!(
            "Image payload: {} bytes ({})",
            bytes.len(),
            inline.mime_type.as_deref().unwrap_or("unknown type")
        );
        save_png(&bytes, destination)?;
        info!("Image saved to: {}", destination.display());
        Ok(Some(destination.to_path_buf()))
    }
}

#[async_trait]
impl SpeechSynthesize for GeminiClient {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        let response = self
            .generate_content(&self.tts_model, speech_request_body(text, voice))
            .await?;

        let inline = response.inline_data().ok_or_else(|| {
            PodcastError::SynthesisError("No audio data in speech response".to_string())
        })?;

        Ok(STANDARD.decode(inline.data.as_bytes())?)
    }
}
