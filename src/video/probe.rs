use crate::core::error::{ToolError, ToolResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use tokio::sync::mpsc;

/// Geometry and timing of the first video stream of a file.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub original_width: u32,
    pub original_height: u32,
    pub rotation: i32,
    /// Width as shown to the viewer, i.e. after applying the rotation
    pub display_width: u32,
    pub display_height: u32,
    pub duration: Option<f64>,
    pub frame_rate: Option<f64>,
    pub frame_count: Option<u64>,
}

impl VideoInfo {
    pub fn new(original_width: u32, original_height: u32, rotation: i32) -> Self {
        // Only quarter turns swap the axes; other angles are taken as-is
        let (display_width, display_height) = if is_quarter_turn(rotation) {
            (original_height, original_width)
        } else {
            (original_width, original_height)
        };

        Self {
            original_width,
            original_height,
            rotation,
            display_width,
            display_height,
            duration: None,
            frame_rate: None,
            frame_count: None,
        }
    }

    pub fn is_rotated(&self) -> bool {
        is_quarter_turn(self.rotation)
    }

    pub fn display_size(&self) -> Option<(u32, u32)> {
        if self.display_width > 0 && self.display_height > 0 {
            Some((self.display_width, self.display_height))
        } else {
            None
        }
    }

    pub fn describe(&self) -> String {
        if self.is_rotated() {
            format!("{}x{}px (rotated)", self.display_width, self.display_height)
        } else {
            format!("{}x{}px", self.display_width, self.display_height)
        }
    }
}

fn is_quarter_turn(rotation: i32) -> bool {
    matches!(rotation.rem_euclid(360), 90 | 270)
}

/// Folds container rotation metadata into whole degrees within one turn,
/// keeping the sign ffprobe reports. Non-finite values count as unrotated.
fn normalize_rotation(degrees: f64) -> i32 {
    if !degrees.is_finite() {
        return 0;
    }
    (degrees % 360.0).round() as i32 % 360
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    side_data_list: Vec<SideData>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SideData {
    #[serde(default)]
    side_data_type: String,
    rotation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Builds the ffprobe invocation for the first video stream.
pub fn probe_command(ffprobe: &Path, file: &Path) -> Command {
    let mut cmd = Command::new(ffprobe);
    cmd.arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_streams")
        .arg("-select_streams").arg("v:0")
        .arg("-show_format")
        .arg(file);
    cmd
}

pub fn probe_video(ffprobe: &Path, file: &Path) -> ToolResult<VideoInfo> {
    if !file.is_file() {
        return Err(ToolError::SourceUnavailable(file.display().to_string()));
    }

    let output = probe_command(ffprobe, file).output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let diagnostics = if stderr.is_empty() {
            format!("exit code {:?} for {}", output.status.code(), file.display())
        } else {
            stderr
        };
        return Err(ToolError::ToolFailed {
            tool: "ffprobe".to_string(),
            diagnostics,
        });
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    parse_probe_output(&json_str)
}

/// Extracts [`VideoInfo`] from `ffprobe -print_format json` output.
pub fn parse_probe_output(json: &str) -> ToolResult<VideoInfo> {
    let probe: ProbeOutput = serde_json::from_str(json)?;
    let stream = probe
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| ToolError::Probe("no video stream found".to_string()))?;

    let rotation = stream
        .side_data_list
        .iter()
        .find(|side_data| side_data.side_data_type == "Display Matrix")
        .and_then(|side_data| side_data.rotation)
        .or_else(|| stream.tags.get("rotate").and_then(|r| r.trim().parse::<f64>().ok()))
        .map(normalize_rotation)
        .unwrap_or(0);

    let mut info = VideoInfo::new(stream.width, stream.height, rotation);

    info.frame_rate = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_frame_rate));

    info.duration = stream
        .duration
        .as_deref()
        .or_else(|| probe.format.as_ref().and_then(|f| f.duration.as_deref()))
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0);

    info.frame_count = stream
        .nb_frames
        .as_deref()
        .and_then(|n| n.parse::<u64>().ok())
        .filter(|&n| n > 0)
        .or_else(|| match (info.duration, info.frame_rate) {
            (Some(duration), Some(fps)) => Some((duration * fps).round() as u64),
            _ => None,
        });

    Ok(info)
}

/// Parses ffprobe rates such as `30000/1001` or `25`.
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let value = match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.trim().parse().ok()?,
    };

    if value.is_finite() && value > 0.0 {
        Some(value)
    } else {
        None
    }
}

/// Result of a background probe
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub request_id: u64,
    pub file_path: PathBuf,
    pub result: Result<VideoInfo, String>,
}

/// Runs ffprobe off the UI thread; results are collected with [`ProbeLoader::poll`].
pub struct ProbeLoader {
    ffprobe: PathBuf,
    result_sender: mpsc::UnboundedSender<ProbeResult>,
    result_receiver: mpsc::UnboundedReceiver<ProbeResult>,
    next_request_id: u64,
}

impl ProbeLoader {
    pub fn new(ffprobe: PathBuf) -> Self {
        let (result_sender, result_receiver) = mpsc::unbounded_channel();
        Self {
            ffprobe,
            result_sender,
            result_receiver,
            next_request_id: 0,
        }
    }

    /// Request video info for a file (non-blocking)
    pub fn request(&mut self, file_path: PathBuf) -> u64 {
        self.next_request_id += 1;
        let request_id = self.next_request_id;
        let ffprobe = self.ffprobe.clone();
        let result_tx = self.result_sender.clone();

        thread::spawn(move || {
            log::debug!("Probing video info for: {:?}", file_path);

            let result = match probe_video(&ffprobe, &file_path) {
                Ok(info) => {
                    log::debug!("Probed {:?}: {} rotation {}", file_path, info.describe(), info.rotation);
                    Ok(info)
                }
                Err(e) => {
                    log::warn!("Failed to probe {:?} - {}", file_path, e);
                    Err(e.to_string())
                }
            };

            let response = ProbeResult {
                request_id,
                file_path,
                result,
            };
            if let Err(e) = result_tx.send(response) {
                log::error!("Failed to send probe result: {}", e);
            }
        });

        request_id
    }

    /// Completed probe results (non-blocking)
    pub fn poll(&mut self) -> Vec<ProbeResult> {
        let mut results = Vec::new();
        while let Ok(result) = self.result_receiver.try_recv() {
            results.push(result);
        }
        results
    }
}
