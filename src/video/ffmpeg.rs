use crate::error::{PodcastError, Result};
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// 运行 ffmpeg，失败时带上 stderr
pub async fn run_ffmpeg(args: &[String]) -> Result<()> {
    debug!("ffmpeg {}", args.join(" "));
    let output = Command::new("ffmpeg")
        .args(args)
        .output()
        .await
        .map_err(|e| PodcastError::FfmpegError(format!("Failed to run FFmpeg: {}", e)))?;

    if !output.status.success() {
        let error = String::from_utf8_lossy(&output.stderr);
        return Err(PodcastError::FfmpegError(format!(
            "FFmpeg exited with {}: {}",
            output.status,
            error.trim()
        )));
    }

    Ok(())
}

/// 用 ffprobe 读取媒体时长（秒）
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .await
        .map_err(|e| PodcastError::FfmpegError(format!("Failed to run FFprobe: {}", e)))?;

    if !output.status.success() {
        let error = String::from_utf8_lossy(&output.stderr);
        return Err(PodcastError::FfmpegError(format!(
            "FFprobe failed for {}: {}",
            path.display(),
            error.trim()
        )));
    }

    parse_duration(&String::from_utf8_lossy(&output.stdout))
}

fn parse_duration(stdout: &str) -> Result<f64> {
    stdout
        .trim()
        .parse()
        .map_err(|_| PodcastError::FfmpegError(format!("Unexpected FFprobe output: {}", stdout.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_probe_output() {
        assert_eq!(parse_duration("12.480000\n").unwrap(), 12.48);
        assert!(parse_duration("N/A").is_err());
    }
}
