use super::{SectionBackgrounds, Segment};
use tracing::{debug, warn};

/// 按章节为片段分配背景图
///
/// 优先使用 `section_NN` 对应的图片，其次使用第一张可用图片，都没有时为 None。
pub fn assign_backgrounds(segments: &[Segment], backgrounds: &SectionBackgrounds) -> Vec<Segment> {
    segments
        .iter()
        .map(|segment| {
            let key = SectionBackgrounds::key_for(segment.section_idx);
            let background = match backgrounds.get(&key) {
                Some(path) => {
                    debug!("Assigned background {} to {}", path.display(), key);
                    Some(path.to_path_buf())
                }
                None => match backgrounds.first_available() {
                    Some(path) => {
                        warn!("No background for {}, using fallback {}", key, path.display());
                        Some(path.to_path_buf())
                    }
                    None => {
                        warn!(
                            "No background images available for segment '{}' in section {}",
                            segment.speaker, segment.section_idx
                        );
                        None
                    }
                },
            };

            Segment {
                background,
                ..segment.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Speaker;
    use std::path::PathBuf;

    fn segments() -> Vec<Segment> {
        vec![
            Segment::new(Speaker::Mike, "Hi", 0),
            Segment::new(Speaker::DrLisa, "Hello", 1),
        ]
    }

    #[test]
    fn exact_key_then_fallback() {
        let backgrounds: SectionBackgrounds = [("section_00", "bg0.png")].into_iter().collect();
        let assigned = assign_backgrounds(&segments(), &backgrounds);
        assert_eq!(assigned[0].background, Some(PathBuf::from("bg0.png")));
        assert_eq!(assigned[1].background, Some(PathBuf::from("bg0.png")));
    }

    #[test]
    fn empty_map_leaves_backgrounds_unset() {
        let assigned = assign_backgrounds(&segments(), &SectionBackgrounds::new());
        assert!(assigned.iter().all(|s| s.background.is_none()));
    }

    #[test]
    fn empty_values_are_skipped() {
        let backgrounds: SectionBackgrounds = [
            ("section_00", ""),
            ("section_01", "bg1.png"),
            ("section_02", "bg2.png"),
        ]
        .into_iter()
        .collect();
        let assigned = assign_backgrounds(&segments(), &backgrounds);
        assert_eq!(assigned[0].background, Some(PathBuf::from("bg1.png")));
        assert_eq!(assigned[1].background, Some(PathBuf::from("bg1.png")));
    }

    #[test]
    fn assignment_is_idempotent() {
        let backgrounds: SectionBackgrounds =
            [("section_01", "one.png"), ("section_00", "zero.png")].into_iter().collect();
        let once = assign_backgrounds(&segments(), &backgrounds);
        let twice = assign_backgrounds(&once, &backgrounds);
        assert_eq!(once, twice);
        assert_eq!(once[0].background, Some(PathBuf::from("zero.png")));
        assert_eq!(once[1].background, Some(PathBuf::from("one.png")));
    }

    #[test]
    fn input_is_not_modified() {
        let input = segments();
        let backgrounds: SectionBackgrounds = [("section_00", "bg0.png")].into_iter().collect();
        let _ = assign_backgrounds(&input, &backgrounds);
        assert!(input.iter().all(|s| s.background.is_none()));
    }
}
