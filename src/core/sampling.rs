/// Decides which sequentially decoded frames get written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingPolicy {
    interval: u64,
}

impl SamplingPolicy {
    pub fn new(extract_all: bool, source_fps: f64, target_fps: u32) -> Self {
        let interval = if extract_all || target_fps == 0 {
            1
        } else {
            let ratio = source_fps / target_fps as f64;
            if ratio.is_finite() && ratio >= 1.0 {
                ratio.floor() as u64
            } else {
                1
            }
        };
        Self { interval }
    }

    pub fn every_frame() -> Self {
        Self { interval: 1 }
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// `index` is the 0-based position of the frame in the decoded stream.
    pub fn keeps(&self, index: u64) -> bool {
        index % self.interval == 0
    }
}

/// Name of the `saved`-th written frame, counted from zero.
pub fn frame_filename(saved: u64) -> String {
    format!("frame_{:03}.jpg", saved)
}

/// Whole percent of frames read so far, `None` while the total is unknown.
pub fn progress_percent(frames_read: u64, total_frames: u64) -> Option<u8> {
    if total_frames == 0 {
        return None;
    }
    let percent = frames_read.saturating_mul(100) / total_frames;
    Some(percent.min(100) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_from_fps() {
        assert_eq!(SamplingPolicy::new(false, 30.0, 1).interval(), 30);
        assert_eq!(SamplingPolicy::new(false, 29.97, 1).interval(), 29);
        assert_eq!(SamplingPolicy::new(false, 30.0, 4).interval(), 7);
        assert_eq!(SamplingPolicy::new(false, 24.0, 60).interval(), 1);
    }

    #[test]
    fn test_kept_indices_at_one_fps() {
        let policy = SamplingPolicy::new(false, 30.0, 1);
        let kept: Vec<u64> = (0..100).filter(|&i| policy.keeps(i)).collect();
        assert_eq!(kept, vec![0, 30, 60, 90]);
    }

    #[test]
    fn test_extract_all_keeps_everything() {
        let policy = SamplingPolicy::new(true, 30.0, 1);
        assert_eq!(policy.interval(), 1);
        assert!((0..50).all(|i| policy.keeps(i)));
        assert_eq!(policy, SamplingPolicy::every_frame());
    }

    #[test]
    fn test_unknown_source_fps_keeps_everything() {
        assert_eq!(SamplingPolicy::new(false, 0.0, 1).interval(), 1);
        assert_eq!(SamplingPolicy::new(false, f64::NAN, 1).interval(), 1);
    }

    #[test]
    fn test_frame_filename_padding() {
        assert_eq!(frame_filename(0), "frame_000.jpg");
        assert_eq!(frame_filename(42), "frame_042.jpg");
        assert_eq!(frame_filename(1234), "frame_1234.jpg");
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(1, 3), Some(33));
        assert_eq!(progress_percent(3, 3), Some(100));
        assert_eq!(progress_percent(5, 3), Some(100));
        assert_eq!(progress_percent(1, 0), None);
    }
}
