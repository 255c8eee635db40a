use crate::core::aspect::ResolutionFields;
use crate::core::config::AppConfig;
use crate::core::request::{ConversionRequest, ExtractionRequest};
use crate::video::probe::VideoInfo;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Spinbox range shared by the extractor's interval and FPS fields
pub const SAMPLING_RANGE: RangeInclusive<u32> = 1..=60;

/// Everything the converter window collects before a job can start.
#[derive(Debug, Clone)]
pub struct ConverterForm {
    pub input: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub file_name: String,
    pub format: String,
    /// `None` keeps the source pixel format
    pub pixel_format: Option<String>,
    pub resolution: ResolutionFields,
    video_info: Option<VideoInfo>,
}

impl ConverterForm {
    pub fn new(config: &AppConfig) -> Self {
        let mut resolution = ResolutionFields::new(
            config.default_width,
            config.default_height,
            2..=config.max_width,
            2..=config.max_height,
        );
        resolution.set_mode(config.default_scale_mode);

        Self {
            input: None,
            output_dir: None,
            file_name: String::new(),
            format: config
                .output_formats
                .first()
                .cloned()
                .unwrap_or_else(|| "mp4".to_string()),
            pixel_format: None,
            resolution,
            video_info: None,
        }
    }

    /// Picks a new input. The output defaults to `<stem>_converted` next to it
    /// and any previous probe result is dropped.
    pub fn select_input(&mut self, path: PathBuf) {
        if let Some(parent) = path.parent() {
            self.output_dir = Some(parent.to_path_buf());
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            self.file_name = format!("{}_converted", stem);
        }
        self.input = Some(path);
        self.set_video_info(None);
    }

    pub fn select_output_dir(&mut self, path: PathBuf) {
        self.output_dir = Some(path);
    }

    pub fn set_video_info(&mut self, info: Option<VideoInfo>) {
        self.resolution
            .set_display_size(info.as_ref().and_then(VideoInfo::display_size));
        self.video_info = info;
    }

    pub fn video_info(&self) -> Option<&VideoInfo> {
        self.video_info.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.input.is_some() && self.output_dir.is_some() && !self.file_name.trim().is_empty()
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        let dir = self.output_dir.as_ref()?;
        let name = self.file_name.trim();
        if name.is_empty() {
            return None;
        }
        Some(dir.join(format!("{}.{}", name, self.format)))
    }

    /// True when starting would overwrite an existing file.
    pub fn needs_overwrite_confirmation(&self) -> bool {
        self.output_path().map_or(false, |path| path.exists())
    }

    pub fn build_request(&self) -> Option<ConversionRequest> {
        if !self.is_ready() {
            return None;
        }
        let input = self.input.clone()?;
        let output = self.output_path()?;

        Some(ConversionRequest {
            input,
            output,
            format: self.format.clone(),
            pixel_format: self.pixel_format.clone(),
            width: self.resolution.width(),
            height: self.resolution.height(),
            scale_mode: self.resolution.mode(),
            rotation: self.video_info.as_ref().map_or(0, |info| info.rotation),
            source_duration: self.video_info.as_ref().and_then(|info| info.duration),
        })
    }
}

/// Everything the frame extractor window collects before a job can start.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorForm {
    pub video: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub extract_all: bool,
    pub interval_secs: u32,
    pub target_fps: u32,
}

impl Default for ExtractorForm {
    fn default() -> Self {
        Self {
            video: None,
            output_dir: None,
            extract_all: false,
            interval_secs: 1,
            target_fps: 1,
        }
    }
}

impl ExtractorForm {
    pub fn is_ready(&self) -> bool {
        self.video.is_some() && self.output_dir.is_some()
    }

    /// Interval and FPS only matter when not extracting every frame.
    pub fn sampling_fields_enabled(&self) -> bool {
        !self.extract_all
    }

    pub fn build_request(&self) -> Option<ExtractionRequest> {
        Some(ExtractionRequest {
            video: self.video.clone()?,
            output_dir: self.output_dir.clone()?,
            extract_all: self.extract_all,
            interval_secs: clamp_sampling(self.interval_secs),
            target_fps: clamp_sampling(self.target_fps),
        })
    }
}

fn clamp_sampling(value: u32) -> u32 {
    value.clamp(*SAMPLING_RANGE.start(), *SAMPLING_RANGE.end())
}

/// File name for display in the path labels.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
