use super::{Section, Segment, Speaker};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;
use tracing::{info, warn};

fn dialogue_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([^:]+):\s*(.+)$").expect("dialogue pattern is valid"))
}

/// 把对白文本切分为片段，并按行数平均分配到各章节
pub fn segment(transcript: &str, sections: &[Section]) -> Vec<Segment> {
    let lines: Vec<&str> = transcript
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    // 配额只统计直接写出规范名字的对白行
    let dialogue_lines = lines
        .iter()
        .filter(|line| {
            line.contains(':') && Speaker::ALL.iter().any(|s| line.contains(s.as_str()))
        })
        .count();
    let per_section = if sections.is_empty() {
        dialogue_lines
    } else {
        (dialogue_lines / sections.len()).max(1)
    };

    let mut segments = Vec::new();
    let mut section_idx = 0;
    let mut in_section = 0;

    for line in lines {
        let Some(caps) = dialogue_pattern().captures(line) else {
            continue;
        };
        let raw_speaker = caps[1].trim();
        let content = caps[2].trim();

        let Some(speaker) = Speaker::normalize(raw_speaker) else {
            warn!("Skipping unrecognized speaker: {}", raw_speaker);
            continue;
        };

        if !sections.is_empty() && in_section >= per_section && section_idx + 1 < sections.len() {
            section_idx += 1;
            in_section = 0;
        }

        segments.push(Segment::new(speaker, content, section_idx));
        in_section += 1;
    }

    let used: BTreeSet<usize> = segments.iter().map(|s| s.section_idx).collect();
    info!(
        "Parsed {} segments from transcript across {} sections",
        segments.len(),
        used.len()
    );
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections(n: usize) -> Vec<Section> {
        (0..n)
            .map(|i| Section {
                title: format!("Section {}", i),
                ..Section::default()
            })
            .collect()
    }

    fn dialogue(n: usize) -> String {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    format!("Mike: question {}", i)
                } else {
                    format!("Dr. Lisa: answer {}", i)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn distributes_lines_evenly_across_sections() {
        let segments = segment(&dialogue(6), &sections(3));
        let idx: Vec<usize> = segments.iter().map(|s| s.section_idx).collect();
        assert_eq!(idx, vec![0, 0, 1, 1, 2, 2]);
        assert!(segments.iter().all(|s| s.duration == 0.0 && s.background.is_none()));
    }

    #[test]
    fn remainder_stays_in_last_section() {
        let segments = segment(&dialogue(7), &sections(3));
        let idx: Vec<usize> = segments.iter().map(|s| s.section_idx).collect();
        assert_eq!(idx, vec![0, 0, 1, 1, 2, 2, 2]);
    }

    #[test]
    fn more_sections_than_lines() {
        let segments = segment(&dialogue(2), &sections(5));
        let idx: Vec<usize> = segments.iter().map(|s| s.section_idx).collect();
        assert_eq!(idx, vec![0, 1]);
    }

    #[test]
    fn section_index_is_monotonic_and_bounded() {
        for lines in 0..20 {
            for count in 1..6 {
                let segments = segment(&dialogue(lines), &sections(count));
                assert_eq!(segments.len(), lines);
                assert!(segments.windows(2).all(|w| w[0].section_idx <= w[1].section_idx));
                assert!(segments.iter().all(|s| s.section_idx < count));
            }
        }
    }

    #[test]
    fn no_sections_puts_everything_in_zero() {
        let segments = segment(&dialogue(5), &[]);
        assert_eq!(segments.len(), 5);
        assert!(segments.iter().all(|s| s.section_idx == 0));
    }

    #[test]
    fn empty_transcript_yields_nothing() {
        assert!(segment("", &sections(2)).is_empty());
        assert!(segment("  \n\n  ", &[]).is_empty());
    }

    #[test]
    fn normalizes_and_drops_speakers() {
        let transcript = "\
            **Mike**: Welcome back.\n\
            Narrator: This is skipped.\n\
            Dr Lisa:   Thanks for having me.  \n\
            Just some stage direction\n\
            Host: also skipped";
        let segments = segment(transcript, &[]);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].speaker, Speaker::Mike);
        assert_eq!(segments[0].content, "Welcome back.");
        assert_eq!(segments[1].speaker, Speaker::DrLisa);
        assert_eq!(segments[1].content, "Thanks for having me.");
    }

    #[test]
    fn content_keeps_inner_colons() {
        let segments = segment("Dr. Lisa: Ratio is 3:1 here", &[]);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].speaker, Speaker::DrLisa);
        assert_eq!(segments[0].content, "Ratio is 3:1 here");
    }
}
