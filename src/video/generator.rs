use super::ffmpeg;
use super::timeline::{fit_audio, AudioFit, ClipKind, Timeline};
use crate::audio::wav;
use crate::error::Result;
use crate::segment::{Segment, SpeakerImageMap};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 渲染参数
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// 头像边长（像素）
    pub speaker_size: u32,
    pub video_codec: String,
    pub audio_codec: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 24,
            speaker_size: 200,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
        }
    }
}

/// 附加到视频的音轨
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTrack {
    pub path: PathBuf,
    /// 截断后的时长
    pub trim_to: Option<f64>,
}

pub struct VideoGenerator {
    settings: RenderSettings,
}

impl Default for VideoGenerator {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}

impl VideoGenerator {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    /// 合成最终视频，成功时返回 `output_path`
    pub async fn render(
        &self,
        segments: &[Segment],
        speaker_images: &SpeakerImageMap,
        output_path: &Path,
        audio_path: Option<&Path>,
    ) -> Result<PathBuf> {
        info!("Creating video with {} segments...", segments.len());
        let timeline = Timeline::layout(segments, speaker_images)?;
        let video_duration = timeline.duration();
        info!(
            "Combining {} clips ({:.1}s)...",
            timeline.clips().len(),
            video_duration
        );

        let audio = audio_track(audio_path, video_duration).await?;

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        info!("Writing video to {}...", output_path.display());
        let args = self.ffmpeg_args(&timeline, audio.as_ref(), output_path);
        ffmpeg::run_ffmpeg(&args).await?;

        info!("Video generation completed: {}", output_path.display());
        Ok(output_path.to_path_buf())
    }

    /// 构造 ffmpeg 参数：每个图片片段一个输入，按时间窗口叠加到黑色底板上
    pub fn ffmpeg_args(
        &self,
        timeline: &Timeline,
        audio: Option<&AudioTrack>,
        output_path: &Path,
    ) -> Vec<String> {
        let s = &self.settings;
        let total = timeline.duration();
        let mut args: Vec<String> = vec!["-y".into()];

        for clip in timeline.clips() {
            args.extend([
                "-loop".into(),
                "1".into(),
                "-framerate".into(),
                s.fps.to_string(),
                "-t".into(),
                format!("{:.3}", clip.duration),
                "-i".into(),
                clip.image.to_string_lossy().into_owned(),
            ]);
        }

        let audio_input = timeline.clips().len();
        if let Some(track) = audio {
            if let Some(to) = track.trim_to {
                args.extend(["-t".into(), format!("{:.3}", to)]);
            }
            args.extend(["-i".into(), track.path.to_string_lossy().into_owned()]);
        }

        let mut graph = format!(
            "color=c=black:s={}x{}:r={}:d={:.3}[base]",
            s.width, s.height, s.fps, total
        );
        let mut previous = "base".to_string();
        for (i, clip) in timeline.clips().iter().enumerate() {
            let (scale, x) = match clip.kind {
                ClipKind::Background => (format!("{}:{}", s.width, s.height), "0".to_string()),
                ClipKind::Speaker(_) => (
                    format!("{}:{}", s.speaker_size, s.speaker_size),
                    "(W-w)/2".to_string(),
                ),
            };
            graph.push_str(&format!(
                ";[{i}:v]scale={scale},setsar=1,setpts=PTS-STARTPTS+{start:.3}/TB[c{i}]\
                 ;[{previous}][c{i}]overlay=x={x}:y=0:eof_action=pass:enable='between(t,{start:.3},{end:.3})'[v{i}]",
                i = i,
                scale = scale,
                start = clip.start,
                previous = previous,
                x = x,
                end = clip.end(),
            ));
            previous = format!("v{}", i);
        }
        graph.push_str(&format!(";[{}]format=yuv420p[vout]", previous));

        args.extend(["-filter_complex".into(), graph, "-map".into(), "[vout]".into()]);

        match audio {
            Some(_) => args.extend([
                "-map".into(),
                format!("{}:a", audio_input),
                "-c:a".into(),
                s.audio_codec.clone(),
            ]),
            None => args.push("-an".into()),
        }

        args.extend([
            "-c:v".into(),
            s.video_codec.clone(),
            "-pix_fmt".into(),
            "yuv420p".into(),
            "-r".into(),
            s.fps.to_string(),
            "-t".into(),
            format!("{:.3}", total),
            output_path.to_string_lossy().into_owned(),
        ]);
        args
    }
}

/// 决定是否附加音轨以及是否截断；文件不存在时渲染无声视频
async fn audio_track(audio_path: Option<&Path>, video_duration: f64) -> Result<Option<AudioTrack>> {
    let Some(path) = audio_path else {
        warn!("No audio file provided - generating silent video");
        return Ok(None);
    };
    if tokio::fs::metadata(path).await.is_err() {
        warn!("Audio file {} doesn't exist - generating silent video", path.display());
        return Ok(None);
    }

    let audio_duration = audio_duration(path).await?;
    let trim_to = match fit_audio(audio_duration, video_duration) {
        AudioFit::Truncate(to) => {
            info!("Truncating audio from {:.1}s to {:.1}s", audio_duration, to);
            Some(to)
        }
        AudioFit::Short { audio, video } => {
            warn!("Audio ({:.1}s) is shorter than video ({:.1}s)", audio, video);
            None
        }
        AudioFit::Full => None,
    };
    info!("Adding audio from: {}", path.display());
    Ok(Some(AudioTrack {
        path: path.to_path_buf(),
        trim_to,
    }))
}

/// 中间音频是 WAV，其它格式交给 ffprobe
async fn audio_duration(path: &Path) -> Result<f64> {
    match wav::measure_duration(path) {
        Ok(duration) => Ok(duration),
        Err(_) => ffmpeg::probe_duration(path).await,
    }
}
