use crate::config::AudioFormat;
use crate::error::{PodcastError, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;
use tracing::warn;

/// 把原始小端 PCM 字节写成 WAV，返回写入的帧数
pub fn write_pcm(path: &Path, pcm: &[u8], format: AudioFormat) -> Result<u32> {
    let width = format.sample_width as usize;
    if !(1..=4).contains(&width) {
        return Err(PodcastError::ConfigError(format!(
            "Unsupported sample width: {} bytes",
            format.sample_width
        )));
    }
    if format.channels == 0 || format.sample_rate == 0 {
        return Err(PodcastError::ConfigError(format!(
            "Invalid audio format: {} channels at {} Hz",
            format.channels, format.sample_rate
        )));
    }

    let frame_size = format.frame_size();
    let whole = pcm.len() / frame_size * frame_size;
    if whole < pcm.len() {
        warn!(
            "Dropping {} trailing bytes that do not form a whole frame",
            pcm.len() - whole
        );
    }

    let spec = WavSpec {
        channels: format.channels,
        sample_rate: format.sample_rate,
        bits_per_sample: format.sample_width * 8,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for chunk in pcm[..whole].chunks_exact(width) {
        match chunk {
            // 8 位 WAV 是无符号的
            [b] => writer.write_sample((*b as i16 - 128) as i8)?,
            [b0, b1] => writer.write_sample(i16::from_le_bytes([*b0, *b1]))?,
            [b0, b1, b2] => writer.write_sample(i32::from_le_bytes([0, *b0, *b1, *b2]) >> 8)?,
            [b0, b1, b2, b3] => writer.write_sample(i32::from_le_bytes([*b0, *b1, *b2, *b3]))?,
            _ => unreachable!("chunks_exact yields {} bytes", width),
        }
    }
    writer.finalize()?;

    Ok((whole / frame_size) as u32)
}

/// 以文件实际帧数计算时长（秒）
pub fn measure_duration(path: &Path) -> Result<f64> {
    let reader = WavReader::open(path)?;
    let frames = reader.duration();
    Ok(frames as f64 / reader.spec().sample_rate as f64)
}

/// 按顺序拼接 WAV 文件，输出沿用第一个文件的格式
pub fn concatenate<P: AsRef<Path>>(inputs: &[P], output: &Path) -> Result<()> {
    let Some(first) = inputs.first() else {
        return Err(PodcastError::SynthesisError("No audio files to concatenate".to_string()));
    };
    let spec = WavReader::open(first.as_ref())?.spec();
    let mut writer = WavWriter::create(output, spec)?;

    for input in inputs {
        let input = input.as_ref();
        let mut reader = WavReader::open(input)?;
        if reader.spec() != spec {
            return Err(PodcastError::AudioFormatMismatch(format!(
                "{} is {:?}, expected {:?}",
                input.display(),
                reader.spec(),
                spec
            )));
        }

        match spec.sample_format {
            SampleFormat::Int => {
                for sample in reader.samples::<i32>() {
                    writer.write_sample(sample?)?;
                }
            }
            SampleFormat::Float => {
                for sample in reader.samples::<f32>() {
                    writer.write_sample(sample?)?;
                }
            }
        }
    }

    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono16(rate: u32) -> AudioFormat {
        AudioFormat {
            channels: 1,
            sample_rate: rate,
            sample_width: 2,
        }
    }

    fn tone(frames: usize, format: AudioFormat) -> Vec<u8> {
        (0..frames * format.frame_size()).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn written_file_reports_exact_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.wav");
        let format = mono16(24000);

        let frames = write_pcm(&path, &tone(36000, format), format).unwrap();
        assert_eq!(frames, 36000);
        assert!((measure_duration(&path).unwrap() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn samples_survive_the_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.wav");
        let pcm: Vec<u8> = [1i16, -2, 300, i16::MIN]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        write_pcm(&path, &pcm, mono16(8000)).unwrap();

        let samples: Vec<i16> = WavReader::open(&path)
            .unwrap()
            .into_samples::<i16>()
            .map(|s| s.unwrap())
            .collect();
        assert_eq!(samples, vec![1, -2, 300, i16::MIN]);
    }

    #[test]
    fn partial_frames_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let format = AudioFormat {
            channels: 2,
            sample_rate: 100,
            sample_width: 2,
        };
        let frames = write_pcm(&path, &[0u8; 4 * 10 + 3], format).unwrap();
        assert_eq!(frames, 10);
        assert!((measure_duration(&path).unwrap() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn empty_audio_has_zero_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        assert_eq!(write_pcm(&path, &[], mono16(24000)).unwrap(), 0);
        assert_eq!(measure_duration(&path).unwrap(), 0.0);
    }

    #[test]
    fn unsupported_width_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let format = AudioFormat {
            channels: 1,
            sample_rate: 24000,
            sample_width: 5,
        };
        let err = write_pcm(&dir.path().join("x.wav"), &[0; 10], format).unwrap_err();
        assert!(matches!(err, PodcastError::ConfigError(_)));
    }

    #[test]
    fn concatenated_duration_is_the_sum() {
        let dir = tempfile::tempdir().unwrap();
        let format = mono16(24000);
        let mut paths = Vec::new();
        let mut total = 0.0;
        for (i, frames) in [12000usize, 30001, 7].into_iter().enumerate() {
            let path = dir.path().join(format!("part_{}.wav", i));
            write_pcm(&path, &tone(frames, format), format).unwrap();
            total += measure_duration(&path).unwrap();
            paths.push(path);
        }

        let output = dir.path().join("all.wav");
        concatenate(&paths, &output).unwrap();

        let joined = measure_duration(&output).unwrap();
        assert!((joined - total).abs() <= 1.0 / 24000.0);
        assert_eq!(WavReader::open(&output).unwrap().spec().sample_rate, 24000);
    }

    #[test]
    fn eight_and_twenty_four_bit_concatenate() {
        let dir = tempfile::tempdir().unwrap();
        for width in [1u16, 3] {
            let format = AudioFormat {
                channels: 1,
                sample_rate: 1000,
                sample_width: width,
            };
            let a = dir.path().join(format!("a{}.wav", width));
            let b = dir.path().join(format!("b{}.wav", width));
            write_pcm(&a, &tone(100, format), format).unwrap();
            write_pcm(&b, &tone(50, format), format).unwrap();

            let out = dir.path().join(format!("out{}.wav", width));
            concatenate(&[&a, &b], &out).unwrap();
            assert!((measure_duration(&out).unwrap() - 0.15).abs() < 1e-9);
        }
    }

    #[test]
    fn mismatched_formats_fail_fast() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");
        write_pcm(&a, &tone(10, mono16(24000)), mono16(24000)).unwrap();
        write_pcm(&b, &tone(10, mono16(16000)), mono16(16000)).unwrap();

        let err = concatenate(&[&a, &b], &dir.path().join("out.wav")).unwrap_err();
        assert!(matches!(err, PodcastError::AudioFormatMismatch(_)));
    }

    #[test]
    fn nothing_to_concatenate() {
        let dir = tempfile::tempdir().unwrap();
        let none: [&Path; 0] = [];
        assert!(concatenate(&none, &dir.path().join("out.wav")).is_err());
    }
}
