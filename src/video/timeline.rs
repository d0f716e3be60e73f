use crate::error::{PodcastError, Result};
use crate::segment::{Segment, Speaker, SpeakerImageMap};
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipKind {
    /// 全屏背景
    Background,
    /// 顶部居中的说话人头像
    Speaker(Speaker),
}

/// 时间轴上的一张静态图片
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub kind: ClipKind,
    pub image: PathBuf,
    pub start: f64,
    pub duration: f64,
}

impl Clip {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    clips: Vec<Clip>,
}

impl Timeline {
    /// 按片段顺序首尾相接地排列背景和头像
    pub fn layout(segments: &[Segment], speaker_images: &SpeakerImageMap) -> Result<Self> {
        let mut clips = Vec::new();
        let mut current_time = 0.0;

        for (i, segment) in segments.iter().enumerate() {
            debug!(
                "Processing segment {}/{}: {} at {:.1}s",
                i + 1,
                segments.len(),
                segment.speaker,
                current_time
            );

            match &segment.background {
                Some(background) => clips.push(Clip {
                    kind: ClipKind::Background,
                    image: background.clone(),
                    start: current_time,
                    duration: segment.duration,
                }),
                None => warn!("Skipping background for segment {} - no image available", i + 1),
            }

            match speaker_images
                .get(&segment.speaker)
                .filter(|p| !p.as_os_str().is_empty())
            {
                Some(image) => clips.push(Clip {
                    kind: ClipKind::Speaker(segment.speaker),
                    image: image.clone(),
                    start: current_time,
                    duration: segment.duration,
                }),
                None => warn!("No speaker image available for {}", segment.speaker),
            }

            current_time += segment.duration;
        }

        if clips.is_empty() {
            return Err(PodcastError::EmptyComposite);
        }

        Ok(Self { clips })
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    /// 所有片段中最晚的结束时间
    pub fn duration(&self) -> f64 {
        self.clips.iter().map(Clip::end).fold(0.0, f64::max)
    }
}

/// 音轨与画面时长的对齐方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioFit {
    /// 原样使用
    Full,
    /// 截断到画面时长
    Truncate(f64),
    /// 音频较短，结尾无声
    Short { audio: f64, video: f64 },
}

pub fn fit_audio(audio_duration: f64, video_duration: f64) -> AudioFit {
    if audio_duration > video_duration {
        AudioFit::Truncate(video_duration)
    } else if audio_duration < video_duration {
        AudioFit::Short {
            audio: audio_duration,
            video: video_duration,
        }
    } else {
        AudioFit::Full
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timed(speaker: Speaker, duration: f64, background: Option<&str>) -> Segment {
        Segment {
            duration,
            background: background.map(PathBuf::from),
            ..Segment::new(speaker, "line", 0)
        }
    }

    #[test]
    fn clips_start_at_cumulative_times() {
        let segments = vec![
            timed(Speaker::Mike, 2.0, Some("bg0.png")),
            timed(Speaker::DrLisa, 3.5, Some("bg0.png")),
            timed(Speaker::Mike, 1.0, Some("bg1.png")),
        ];
        let timeline = Timeline::layout(&segments, &SpeakerImageMap::new()).unwrap();

        let starts: Vec<f64> = timeline.clips().iter().map(|c| c.start).collect();
        assert_eq!(starts, vec![0.0, 2.0, 5.5]);
        assert_eq!(timeline.duration(), 6.5);
    }

    #[test]
    fn speaker_clips_share_segment_timing() {
        let segments = vec![
            timed(Speaker::Mike, 2.0, Some("bg.png")),
            timed(Speaker::DrLisa, 3.0, None),
        ];
        let speakers: SpeakerImageMap = [
            (Speaker::Mike, PathBuf::from("mike.png")),
            (Speaker::DrLisa, PathBuf::from("lisa.png")),
        ]
        .into_iter()
        .collect();

        let timeline = Timeline::layout(&segments, &speakers).unwrap();
        let clips = timeline.clips();

        assert_eq!(clips.len(), 3);
        assert_eq!(clips[0].kind, ClipKind::Background);
        assert_eq!(clips[1].kind, ClipKind::Speaker(Speaker::Mike));
        assert_eq!((clips[1].start, clips[1].duration), (0.0, 2.0));
        assert_eq!(clips[2].kind, ClipKind::Speaker(Speaker::DrLisa));
        assert_eq!((clips[2].start, clips[2].duration), (2.0, 3.0));
        assert_eq!(timeline.duration(), 5.0);
    }

    #[test]
    fn gaps_do_not_shift_later_clips() {
        let segments = vec![
            timed(Speaker::Mike, 4.0, None),
            timed(Speaker::DrLisa, 1.0, Some("bg.png")),
        ];
        let timeline = Timeline::layout(&segments, &SpeakerImageMap::new()).unwrap();
        assert_eq!(timeline.clips().len(), 1);
        assert_eq!(timeline.clips()[0].start, 4.0);
        assert_eq!(timeline.duration(), 5.0);
    }

    #[test]
    fn nothing_to_show_is_rejected() {
        let segments = vec![timed(Speaker::Mike, 2.0, None), timed(Speaker::DrLisa, 1.0, None)];
        let err = Timeline::layout(&segments, &SpeakerImageMap::new()).unwrap_err();
        assert!(matches!(err, PodcastError::EmptyComposite));

        let err = Timeline::layout(&[], &SpeakerImageMap::new()).unwrap_err();
        assert!(matches!(err, PodcastError::EmptyComposite));
    }

    #[test]
    fn audio_fit() {
        assert_eq!(fit_audio(10.0, 6.5), AudioFit::Truncate(6.5));
        assert_eq!(fit_audio(5.0, 6.5), AudioFit::Short { audio: 5.0, video: 6.5 });
        assert_eq!(fit_audio(6.5, 6.5), AudioFit::Full);
    }
}
