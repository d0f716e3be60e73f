use crate::error::{PodcastError, Result};
use crate::segment::Section;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeakerProfile {
    pub role: String,
    pub characteristics: String,
}

/// 转录分析结果：说话人与章节
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptAnalysis {
    /// 按名称排序；同一说话人有多个写法时，排在前面的名称优先
    pub speakers: BTreeMap<String, SpeakerProfile>,
    pub sections: Vec<Section>,
}

fn json_block() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("json block pattern is valid"))
}

impl TranscriptAnalysis {
    /// 模型回复中可能夹杂说明文字或 markdown，取第一个 `{` 到最后一个 `}`
    pub fn parse(response: &str) -> Result<Self> {
        let json = json_block()
            .find(response)
            .map(|m| m.as_str())
            .unwrap_or(response);

        serde_json::from_str(json)
            .map_err(|e| PodcastError::AnalysisError(format!("Failed to parse analysis JSON: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_inside_markdown() {
        let response = r#"Here is the analysis:
```json
{
  "speakers": {
    "Mike": {"role": "host", "characteristics": "friendly, 30s"},
    "Dr. Lisa": {"role": "researcher", "characteristics": "glasses"}
  },
  "sections": [
    {"title": "Intro", "theme": "basics", "mood": "bright", "key_concepts": ["a"], "duration_estimate": 30},
    {"title": "Risks", "theme": "safety", "mood": "serious", "key_concepts": [], "duration_estimate": 45}
  ]
}
```"#;
        let analysis = TranscriptAnalysis::parse(response).unwrap();
        assert_eq!(analysis.speakers.len(), 2);
        assert_eq!(analysis.speakers["Mike"].role, "host");
        assert_eq!(analysis.sections.len(), 2);
        assert_eq!(analysis.sections[1].title, "Risks");
        assert_eq!(analysis.sections[0].duration_estimate, 30.0);
    }

    #[test]
    fn missing_keys_default_to_empty() {
        let analysis = TranscriptAnalysis::parse(r#"{"sections": []}"#).unwrap();
        assert!(analysis.speakers.is_empty());
        assert!(analysis.sections.is_empty());
    }

    #[test]
    fn garbage_is_an_analysis_error() {
        let err = TranscriptAnalysis::parse("no json here").unwrap_err();
        assert!(matches!(err, PodcastError::AnalysisError(_)));

        let err = TranscriptAnalysis::parse("{ not: valid }").unwrap_err();
        assert!(matches!(err, PodcastError::AnalysisError(_)));
    }
}
