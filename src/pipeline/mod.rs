mod analysis;
mod prompts;

pub use analysis::{SpeakerProfile, TranscriptAnalysis};

use crate::api::{GeminiClient, ImageGenerate, SpeechSynthesize, TextGenerate, TextRequest};
use crate::audio::SpeechSynthesizer;
use crate::config::Configuration;
use crate::error::Result;
use crate::segment::{
    assign_backgrounds, segment, Section, SectionBackgrounds, Speaker, SpeakerImageMap,
};
use crate::video::{RenderSettings, VideoGenerator};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

const NO_VIDEO_TEXT: &str = "No video provided for analysis.";

/// 外部生成服务
#[derive(Clone)]
pub struct Collaborators {
    pub text: Arc<dyn TextGenerate>,
    pub images: Arc<dyn ImageGenerate>,
    pub speech: Arc<dyn SpeechSynthesize>,
}

impl Collaborators {
    pub fn gemini(client: GeminiClient) -> Self {
        let client = Arc::new(client);
        Self {
            text: client.clone(),
            images: client.clone(),
            speech: client,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PodcastRequest {
    pub topic: String,
    pub video_url: Option<String>,
    /// 已有的对白脚本，提供时跳过调研和写稿
    pub transcript: Option<String>,
    pub output_path: Option<PathBuf>,
    /// 只使用磁盘上已有的图片
    pub skip_images: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Research {
    pub search_text: String,
    pub search_sources_text: String,
    pub video_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PodcastOutput {
    pub report: Option<String>,
    pub podcast_script: String,
    pub video_path: PathBuf,
}

pub struct PodcastPipeline {
    config: Configuration,
    collaborators: Collaborators,
    work_dir: PathBuf,
    render: RenderSettings,
}

impl PodcastPipeline {
    pub fn new(config: Configuration, collaborators: Collaborators, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            collaborators,
            work_dir: work_dir.into(),
            render: RenderSettings::default(),
        }
    }

    pub fn with_render_settings(mut self, render: RenderSettings) -> Self {
        self.render = render;
        self
    }

    fn speakers_dir(&self) -> PathBuf {
        self.work_dir.join("images").join("speakers")
    }

    fn backgrounds_dir(&self) -> PathBuf {
        self.work_dir.join("images").join("backgrounds")
    }

    pub async fn run(&self, request: PodcastRequest) -> Result<PodcastOutput> {
        tokio::fs::create_dir_all(self.speakers_dir()).await?;
        tokio::fs::create_dir_all(self.backgrounds_dir()).await?;

        let (report, podcast_script) = match request.transcript {
            Some(transcript) => {
                info!("Using provided transcript, skipping research");
                (None, transcript)
            }
            None => {
                info!("Step 1/5: Researching \"{}\"...", request.topic);
                let research = self
                    .research(&request.topic, request.video_url.as_deref())
                    .await?;
                let report = self
                    .write_report(&request.topic, &research, request.video_url.as_deref())
                    .await?;
                info!("Step 2/5: Writing podcast script...");
                let script = self.write_script(&request.topic, &research).await?;
                (Some(report), script)
            }
        };

        info!("Step 3/5: Analyzing transcript...");
        let analysis = self.analyze_transcript(&podcast_script).await?;

        info!("Step 4/5: Preparing images...");
        let generate = !request.skip_images;
        let speaker_images = self.speaker_images(&analysis, generate).await?;
        let backgrounds = self.section_backgrounds(&analysis.sections, generate).await?;

        info!("Step 5/5: Creating video...");
        let output_path = request
            .output_path
            .unwrap_or_else(|| self.work_dir.join("podcast_video.mp4"));
        let video_path = self
            .create_video(
                &podcast_script,
                &analysis.sections,
                &speaker_images,
                &backgrounds,
                &output_path,
            )
            .await?;

        Ok(PodcastOutput {
            report,
            podcast_script,
            video_path,
        })
    }

    /// 网络搜索，有视频地址时再分析视频
    pub async fn research(&self, topic: &str, video_url: Option<&str>) -> Result<Research> {
        let search = self
            .collaborators
            .text
            .generate(
                TextRequest::new(&self.config.search_model, prompts::search(topic))
                    .temperature(self.config.search_temperature)
                    .with_web_search(),
            )
            .await?;
        info!("Search returned {} sources", search.sources.len());

        let video_text = match video_url {
            Some(url) => {
                info!("Analyzing video: {}", url);
                self.collaborators
                    .text
                    .generate(TextRequest::new(&self.config.video_model, prompts::video(topic)).with_video(url))
                    .await?
                    .text
            }
            None => NO_VIDEO_TEXT.to_string(),
        };

        Ok(Research {
            search_sources_text: search.sources_text(),
            search_text: search.text,
            video_text,
        })
    }

    pub async fn write_report(&self, topic: &str, research: &Research, video_url: Option<&str>) -> Result<String> {
        let synthesis = self
            .collaborators
            .text
            .generate(
                TextRequest::new(
                    &self.config.synthesis_model,
                    prompts::synthesis(topic, &research.search_text, &research.video_text),
                )
                .temperature(self.config.synthesis_temperature),
            )
            .await?;

        let report = prompts::report(topic, &synthesis.text, video_url, &research.search_sources_text);
        let path = self.work_dir.join("report.md");
        tokio::fs::write(&path, &report).await?;
        info!("Research report saved to: {}", path.display());
        Ok(report)
    }

    pub async fn write_script(&self, topic: &str, research: &Research) -> Result<String> {
        let script = self
            .collaborators
            .text
            .generate(
                TextRequest::new(
                    &self.config.synthesis_model,
                    prompts::script(topic, &research.search_text, &research.video_text),
                )
                .temperature(self.config.podcast_temperature),
            )
            .await?
            .text;

        let path = self.work_dir.join("script.txt");
        tokio::fs::write(&path, &script).await?;
        info!("Podcast script saved to: {}", path.display());
        Ok(script)
    }

    pub async fn analyze_transcript(&self, transcript: &str) -> Result<TranscriptAnalysis> {
        let response = self
            .collaborators
            .text
            .generate(
                TextRequest::new(&self.config.synthesis_model, prompts::analysis(transcript))
                    .temperature(self.config.synthesis_temperature),
            )
            .await?;

        let analysis = TranscriptAnalysis::parse(&response.text)?;
        info!(
            "Transcript analysis: {} speakers, {} sections",
            analysis.speakers.len(),
            analysis.sections.len()
        );

        tokio::fs::create_dir_all(&self.work_dir).await?;
        tokio::fs::write(
            self.work_dir.join("analysis.json"),
            serde_json::to_string_pretty(&analysis)?,
        )
        .await?;
        Ok(analysis)
    }

    /// 为每位说话人生成头像；图片生成失败只记录日志
    pub async fn speaker_images(&self, analysis: &TranscriptAnalysis, generate: bool) -> Result<SpeakerImageMap> {
        let dir = self.speakers_dir();
        tokio::fs::create_dir_all(&dir).await?;
        let mut images = SpeakerImageMap::new();

        for (name, profile) in &analysis.speakers {
            let Some(speaker) = Speaker::normalize(name) else {
                warn!("Skipping image for unrecognized speaker: {}", name);
                continue;
            };
            if images.contains_key(&speaker) {
                continue;
            }

            let path = dir.join(format!("{}.png", safe_file_name(name)));
            if let Some(image) = self
                .prepare_image(&path, generate, || prompts::speaker_portrait(name, profile))
                .await?
            {
                info!("Image ready for {}: {}", speaker, image.display());
                images.insert(speaker, image);
            }
        }

        Ok(images)
    }

    /// 为每个章节生成背景图，键为 `section_NN`
    pub async fn section_backgrounds(&self, sections: &[Section], generate: bool) -> Result<SectionBackgrounds> {
        let dir = self.backgrounds_dir();
        tokio::fs::create_dir_all(&dir).await?;
        let mut backgrounds = SectionBackgrounds::new();

        for (i, section) in sections.iter().enumerate() {
            info!("Preparing background for section {}: {}", i, section.title);
            let key = SectionBackgrounds::key_for(i);
            let path = dir.join(format!("{}_{}.png", key, safe_file_name(&section.title)));

            if let Some(image) = self
                .prepare_image(&path, generate, || prompts::background(section))
                .await?
            {
                backgrounds.insert(key, image);
            }
        }

        Ok(backgrounds)
    }

    /// 已有文件直接复用，不再请求提示词
    async fn prepare_image<F>(&self, path: &Path, generate: bool, request: F) -> Result<Option<PathBuf>>
    where
        F: FnOnce() -> String,
    {
        if tokio::fs::metadata(path).await.is_ok() {
            info!("Image already exists, skipping generation: {}", path.display());
            return Ok(Some(path.to_path_buf()));
        }
        if !generate {
            warn!("Image not found, skipping: {}", path.display());
            return Ok(None);
        }

        let prompt = self
            .collaborators
            .text
            .generate(
                TextRequest::new(&self.config.synthesis_model, request())
                    .temperature(self.config.synthesis_temperature),
            )
            .await?
            .text
            .trim()
            .to_string();

        match self.collaborators.images.generate_image(&prompt, path).await {
            Ok(Some(image)) => Ok(Some(image)),
            Ok(None) => {
                warn!("Failed to generate image: {}", path.display());
                Ok(None)
            }
            Err(e) => {
                error!("Error generating image {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    /// 分段、配图、合成语音、渲染；合成的音轨在渲染后删除
    pub async fn create_video(
        &self,
        transcript: &str,
        sections: &[Section],
        speaker_images: &SpeakerImageMap,
        backgrounds: &SectionBackgrounds,
        output_path: &Path,
    ) -> Result<PathBuf> {
        info!("Parsing transcript into segments...");
        let segments = segment(transcript, sections);

        info!("Assigning images to segments...");
        let segments = assign_backgrounds(&segments, backgrounds);

        info!("Generating TTS audio with accurate segment durations...");
        let synthesizer = SpeechSynthesizer::new(
            self.collaborators.speech.clone(),
            self.config.audio_format()?,
            self.config.voices(),
            &self.work_dir,
        );
        let synthesized = synthesizer.synthesize(&segments).await?;

        info!("Creating final video...");
        let result = VideoGenerator::new(self.render.clone())
            .render(
                &synthesized.segments,
                speaker_images,
                output_path,
                synthesized.audio_path.as_deref(),
            )
            .await;

        if let Some(audio) = &synthesized.audio_path {
            match tokio::fs::remove_file(audio).await {
                Ok(()) => info!("Cleaned up temporary audio file: {}", audio.display()),
                Err(e) => warn!("Could not clean up temporary file {}: {}", audio.display(), e),
            }
        }

        result
    }
}

/// 文件名只保留字母数字、空格、`-` 和 `_`
fn safe_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_names() {
        assert_eq!(safe_file_name("Dr. Lisa"), "Dr Lisa");
        assert_eq!(safe_file_name("AI: past & future "), "AI past  future");
        assert_eq!(safe_file_name("step-by_step"), "step-by_step");
    }
}
