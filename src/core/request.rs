use crate::core::scale::{ScaleMode, ScalePlan};
use std::path::PathBuf;

/// Everything a conversion job needs. Built by the form, then moved into the worker.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: String,
    /// `None` keeps the source pixel format
    pub pixel_format: Option<String>,
    pub width: u32,
    pub height: u32,
    pub scale_mode: ScaleMode,
    /// Source rotation in degrees. Kept in the output through `-map_metadata 0`.
    pub rotation: i32,
    pub source_duration: Option<f64>,
}

impl ConversionRequest {
    pub fn scale_plan(&self) -> ScalePlan {
        ScalePlan::new(self.width, self.height, self.scale_mode)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    pub video: PathBuf,
    pub output_dir: PathBuf,
    pub extract_all: bool,
    /// Shown in the UI and logged; sampling is driven by `target_fps`
    pub interval_secs: u32,
    pub target_fps: u32,
}
