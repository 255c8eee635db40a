use crate::core::error::{ToolError, ToolResult};
use crate::video::probe::probe_video;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};

/// Sequential access to the decoded frames of a video.
pub trait FrameSource {
    /// Total frames reported by the container, if known
    fn frame_count(&self) -> Option<u64>;

    /// Source frames per second, 0.0 if unknown
    fn frame_rate(&self) -> f64;

    /// Next frame in display orientation, `None` once the stream is exhausted.
    fn next_frame(&mut self) -> ToolResult<Option<RgbImage>>;
}

/// Decodes through an `ffmpeg` child that writes raw RGB24 frames to a pipe.
///
/// ffmpeg applies the rotation metadata while decoding, so frames arrive at
/// the display size reported by ffprobe.
pub struct FfmpegFrameSource {
    child: Child,
    stdout: BufReader<ChildStdout>,
    stderr_thread: Option<JoinHandle<String>>,
    width: u32,
    height: u32,
    frame_rate: f64,
    frame_count: Option<u64>,
    frames_read: u64,
}

impl FfmpegFrameSource {
    pub fn open(ffmpeg: &Path, ffprobe: &Path, video: &Path) -> ToolResult<Self> {
        let info = probe_video(ffprobe, video).map_err(|e| match e {
            ToolError::SourceUnavailable(_) => e,
            other => ToolError::SourceUnavailable(format!("{} ({})", video.display(), other)),
        })?;
        let (width, height) = info.display_size().ok_or_else(|| {
            ToolError::SourceUnavailable(format!("{} has no frame size", video.display()))
        })?;

        let mut child = Command::new(ffmpeg)
            .arg("-v").arg("error")
            .arg("-nostdin")
            .arg("-i").arg(video)
            .arg("-f").arg("rawvideo")
            .arg("-pix_fmt").arg("rgb24")
            .arg("pipe:1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("failed to capture decoder stdout"))?;
        let stderr_thread = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || read_lossy(stderr))
        });

        log::info!(
            "Opened {} for decoding: {}, {:.3} fps, {:?} frames",
            video.display(),
            info.describe(),
            info.frame_rate.unwrap_or(0.0),
            info.frame_count
        );

        Ok(Self {
            child,
            stdout: BufReader::new(stdout),
            stderr_thread,
            width,
            height,
            frame_rate: info.frame_rate.unwrap_or(0.0),
            frame_count: info.frame_count,
            frames_read: 0,
        })
    }

    fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    fn finish(&mut self) -> ToolResult<()> {
        let status = self.child.wait()?;
        let diagnostics = self
            .stderr_thread
            .take()
            .and_then(|t| t.join().ok())
            .unwrap_or_default();

        if !status.success() && self.frames_read == 0 {
            return Err(ToolError::SourceUnavailable(diagnostics.trim().to_string()));
        }
        if !status.success() {
            log::warn!("Decoder stopped early after {} frames: {}", self.frames_read, diagnostics.trim());
        }
        Ok(())
    }
}

impl FrameSource for FfmpegFrameSource {
    fn frame_count(&self) -> Option<u64> {
        self.frame_count
    }

    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn next_frame(&mut self) -> ToolResult<Option<RgbImage>> {
        let mut buf = vec![0u8; self.frame_len()];
        let mut filled = 0;

        while filled < buf.len() {
            match self.stdout.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if filled < buf.len() {
            if filled > 0 {
                log::warn!("Discarding truncated frame ({} of {} bytes)", filled, buf.len());
            }
            self.finish()?;
            return Ok(None);
        }

        self.frames_read += 1;
        let frame = RgbImage::from_raw(self.width, self.height, buf)
            .ok_or_else(|| std::io::Error::other("decoded frame has the wrong size"))?;
        Ok(Some(frame))
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Reads a diagnostics stream to the end, replacing bytes that are not UTF-8.
fn read_lossy(mut stream: impl Read) -> String {
    let mut raw = Vec::new();
    if let Err(e) = stream.read_to_end(&mut raw) {
        log::warn!("Error reading decoder stderr: {}", e);
    }
    String::from_utf8_lossy(&raw).into_owned()
}

pub fn save_jpeg(frame: &RgbImage, path: &Path, quality: u8) -> ToolResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
    frame.write_with_encoder(encoder)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_jpeg_writes_decodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame_000.jpg");
        let frame = RgbImage::from_pixel(16, 8, image::Rgb([200, 40, 40]));

        save_jpeg(&frame, &path, 95).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }

    #[test]
    fn test_save_jpeg_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("frame_000.jpg");
        let frame = RgbImage::new(2, 2);

        assert!(matches!(save_jpeg(&frame, &path, 95), Err(ToolError::Io(_))));
    }

    #[test]
    fn test_decoder_diagnostics_survive_non_utf8() {
        let stderr: &[u8] = b"/videos/caf\xe9.mp4: Invalid data found when processing input\n";
        let diagnostics = read_lossy(stderr);

        assert!(diagnostics.starts_with("/videos/caf"));
        assert!(diagnostics.contains("Invalid data found when processing input"));
    }

    #[test]
    fn test_open_missing_file() {
        let result = FfmpegFrameSource::open(
            Path::new("ffmpeg"),
            Path::new("ffprobe"),
            Path::new("/definitely/not/here.mp4"),
        );
        assert!(matches!(result, Err(ToolError::SourceUnavailable(_))));
    }
}
