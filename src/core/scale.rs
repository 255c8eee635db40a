use serde::{Deserialize, Serialize};
use std::fmt;

/// How the requested resolution is applied to the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// Stretch to exactly the requested size, ignoring the source aspect ratio
    Exact,
    /// Keep the aspect ratio and fit inside the requested box
    #[default]
    AspectFit,
    /// Keep the aspect ratio, fit inside the box and pad the rest with black
    AspectPad,
}

impl ScaleMode {
    pub const ALL: [ScaleMode; 3] = [ScaleMode::Exact, ScaleMode::AspectFit, ScaleMode::AspectPad];

    pub fn label(self) -> &'static str {
        match self {
            ScaleMode::Exact => "Exact size (ignores aspect ratio, may stretch)",
            ScaleMode::AspectFit => "Keep aspect ratio - fit (fits inside the box)",
            ScaleMode::AspectPad => "Keep aspect ratio - pad (black bars, exact size)",
        }
    }
}

/// Rounds an odd dimension up to the next even value; encoders reject odd sizes.
pub fn even(value: u32) -> u32 {
    value.checked_add(value % 2).unwrap_or(value - 1)
}

/// A single entry of an ffmpeg `-vf` chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOp {
    Scale { width: u32, height: u32 },
    ScaleDecrease { width: u32, height: u32 },
    TruncateToEven,
    Pad { width: u32, height: u32 },
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOp::Scale { width, height } => write!(f, "scale={}:{}", width, height),
            FilterOp::ScaleDecrease { width, height } => write!(
                f,
                "scale={}:{}:force_original_aspect_ratio=decrease",
                width, height
            ),
            FilterOp::TruncateToEven => write!(f, "scale=trunc(iw/2)*2:trunc(ih/2)*2"),
            FilterOp::Pad { width, height } => write!(f, "pad={}:{}:-1:-1:black", width, height),
        }
    }
}

/// Joins filter operations into the comma separated form ffmpeg expects.
pub fn filter_chain(filters: &[FilterOp]) -> String {
    filters
        .iter()
        .map(|op| op.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Target box after even coercion, plus the mode used to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalePlan {
    pub width: u32,
    pub height: u32,
    pub mode: ScaleMode,
}

impl ScalePlan {
    pub fn new(width: u32, height: u32, mode: ScaleMode) -> Self {
        Self {
            width: even(width),
            height: even(height),
            mode,
        }
    }

    /// A zero dimension means "leave the resolution alone".
    pub fn is_active(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn filters(&self) -> Vec<FilterOp> {
        if !self.is_active() {
            return Vec::new();
        }

        let (width, height) = (self.width, self.height);
        match self.mode {
            ScaleMode::Exact => vec![FilterOp::Scale { width, height }],
            ScaleMode::AspectFit => vec![
                FilterOp::ScaleDecrease { width, height },
                FilterOp::TruncateToEven,
            ],
            ScaleMode::AspectPad => vec![
                FilterOp::ScaleDecrease { width, height },
                FilterOp::TruncateToEven,
                FilterOp::Pad { width, height },
            ],
        }
    }

    /// Frame size ffmpeg will produce for a source of the given display size.
    ///
    /// Mirrors `force_original_aspect_ratio=decrease`: both candidate sizes are
    /// rescaled with round-to-nearest and clamped to the box.
    pub fn output_size(&self, source_width: u32, source_height: u32) -> (u32, u32) {
        if !self.is_active() {
            return (source_width, source_height);
        }

        match self.mode {
            ScaleMode::Exact | ScaleMode::AspectPad => (self.width, self.height),
            ScaleMode::AspectFit => {
                if source_width == 0 || source_height == 0 {
                    return (self.width, self.height);
                }
                let fit_width = rescale(self.height, source_width, source_height).min(self.width);
                let fit_height = rescale(self.width, source_height, source_width).min(self.height);
                (fit_width - fit_width % 2, fit_height - fit_height % 2)
            }
        }
    }
}

fn rescale(value: u32, numerator: u32, denominator: u32) -> u32 {
    let denominator = denominator as u64;
    ((value as u64 * numerator as u64 + denominator / 2) / denominator) as u32
}
