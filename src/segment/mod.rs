mod assign;
mod parser;

pub use assign::assign_backgrounds;
pub use parser::segment;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// 固定的两位说话人
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    /// 主持人
    #[serde(rename = "Mike")]
    Mike,
    /// 研究专家
    #[serde(rename = "Dr. Lisa")]
    DrLisa,
}

impl Speaker {
    pub const ALL: [Speaker; 2] = [Speaker::Mike, Speaker::DrLisa];

    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::Mike => "Mike",
            Speaker::DrLisa => "Dr. Lisa",
        }
    }

    /// 将模型输出的说话人名称规范化，无法识别时返回 None
    pub fn normalize(raw: &str) -> Option<Speaker> {
        let raw = raw.trim();
        if let Some(exact) = Self::ALL.into_iter().find(|s| s.as_str() == raw) {
            return Some(exact);
        }

        let lower = raw.to_lowercase();
        if lower.contains("mike") {
            Some(Speaker::Mike)
        } else if lower.contains("lisa") || lower.contains("dr") {
            Some(Speaker::DrLisa)
        } else {
            None
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一句对白
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub speaker: Speaker,
    pub content: String,
    /// 所属章节序号
    pub section_idx: usize,
    /// 实际音频时长（秒），合成语音前为 0
    pub duration: f64,
    /// 背景图片路径
    pub background: Option<PathBuf>,
}

impl Segment {
    pub fn new(speaker: Speaker, content: impl Into<String>, section_idx: usize) -> Self {
        Self {
            speaker,
            content: content.into(),
            section_idx,
            duration: 0.0,
            background: None,
        }
    }

    /// 送入语音合成的文本
    pub fn speech_text(&self) -> String {
        format!("{}: {}", self.speaker, self.content)
    }
}

/// 由转录分析得到的主题章节
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Section {
    pub title: String,
    pub start_text: String,
    pub end_text: String,
    pub theme: String,
    pub mood: String,
    pub key_concepts: Vec<String>,
    /// 预估时长（秒），分段时不参与计算
    #[serde(deserialize_with = "lenient_seconds")]
    pub duration_estimate: f64,
}

/// 模型偶尔把数字写成字符串，如 "45" 或 "45 seconds"
fn lenient_seconds<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s
            .split_whitespace()
            .next()
            .and_then(|n| n.parse().ok())
            .unwrap_or(0.0),
        _ => 0.0,
    })
}

/// 说话人头像
pub type SpeakerImageMap = HashMap<Speaker, PathBuf>;

/// 章节背景图，按插入顺序保存
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionBackgrounds {
    entries: Vec<(String, PathBuf)>,
}

impl SectionBackgrounds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_for(section_idx: usize) -> String {
        format!("section_{:02}", section_idx)
    }

    /// 插入或替换，替换时保留原位置
    pub fn insert(&mut self, key: impl Into<String>, path: impl Into<PathBuf>) {
        let key = key.into();
        let path = path.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = path,
            None => self.entries.push((key, path)),
        }
    }

    /// 只返回非空路径
    pub fn get(&self, key: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, p)| p.as_path())
            .filter(|p| !p.as_os_str().is_empty())
    }

    pub fn first_available(&self) -> Option<&Path> {
        self.entries
            .iter()
            .map(|(_, p)| p.as_path())
            .find(|p| !p.as_os_str().is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, P: Into<PathBuf>> FromIterator<(K, P)> for SectionBackgrounds {
    fn from_iter<I: IntoIterator<Item = (K, P)>>(iter: I) -> Self {
        let mut backgrounds = Self::new();
        for (key, path) in iter {
            backgrounds.insert(key, path);
        }
        backgrounds
    }
}
