use crate::core::error::{ToolError, ToolResult};
use crate::core::scale::{even, ScaleMode};
use std::ops::RangeInclusive;

/// Width/height pair that keeps itself in the source aspect ratio while the
/// mode is [`ScaleMode::AspectFit`].
///
/// Editing one field writes the other through the same setter. The
/// `updating` token is held for the duration of that write so the paired
/// setter does not bounce the change back.
#[derive(Debug, Clone)]
pub struct ResolutionFields {
    width: u32,
    height: u32,
    width_range: RangeInclusive<u32>,
    height_range: RangeInclusive<u32>,
    mode: ScaleMode,
    display_size: Option<(u32, u32)>,
    updating: bool,
}

impl ResolutionFields {
    pub fn new(
        width: u32,
        height: u32,
        width_range: RangeInclusive<u32>,
        height_range: RangeInclusive<u32>,
    ) -> Self {
        let width = clamp(width, &width_range);
        let height = clamp(height, &height_range);
        Self {
            width,
            height,
            width_range,
            height_range,
            mode: ScaleMode::default(),
            display_size: None,
            updating: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mode(&self) -> ScaleMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ScaleMode) {
        self.mode = mode;
    }

    pub fn width_range(&self) -> RangeInclusive<u32> {
        self.width_range.clone()
    }

    pub fn height_range(&self) -> RangeInclusive<u32> {
        self.height_range.clone()
    }

    /// Rotation-adjusted size of the probed source, `None` until a file is probed.
    pub fn set_display_size(&mut self, display_size: Option<(u32, u32)>) {
        self.display_size = display_size.filter(|&(w, h)| w > 0 && h > 0);
    }

    pub fn display_size(&self) -> Option<(u32, u32)> {
        self.display_size
    }

    pub fn is_updating(&self) -> bool {
        self.updating
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = clamp(width, &self.width_range);
        if let Some((dw, dh)) = self.linked_source() {
            let height = linked_dimension(self.width, dh, dw);
            log::debug!("Width {} -> linked height {}", self.width, height);
            self.with_token(|fields| fields.set_height(height));
        }
    }

    pub fn set_height(&mut self, height: u32) {
        self.height = clamp(height, &self.height_range);
        if let Some((dw, dh)) = self.linked_source() {
            let width = linked_dimension(self.height, dw, dh);
            log::debug!("Height {} -> linked width {}", self.height, width);
            self.with_token(|fields| fields.set_width(width));
        }
    }

    /// Sets both fields without linking, e.g. for the 720p/1080p/4K buttons.
    pub fn apply_preset(&mut self, width: u32, height: u32) {
        self.with_token(|fields| {
            fields.set_width(width);
            fields.set_height(height);
        });
    }

    /// Resets both fields to the probed display size.
    pub fn apply_original(&mut self) -> ToolResult<()> {
        let (width, height) = self.display_size.ok_or(ToolError::NoSourceDimensions)?;
        self.apply_preset(width, height);
        Ok(())
    }

    fn linked_source(&self) -> Option<(u32, u32)> {
        if self.updating || self.mode != ScaleMode::AspectFit {
            return None;
        }
        self.display_size
    }

    fn with_token(&mut self, update: impl FnOnce(&mut Self)) {
        let was_updating = self.updating;
        self.updating = true;
        update(self);
        self.updating = was_updating;
    }
}

fn linked_dimension(value: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = (value as f64 * numerator as f64 / denominator as f64).round() as u32;
    even(scaled)
}

fn clamp(value: u32, range: &RangeInclusive<u32>) -> u32 {
    // An odd upper bound would let a linked value come back odd
    let upper = (*range.end() - range.end() % 2).max(*range.start());
    value.clamp(*range.start(), upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> ResolutionFields {
        ResolutionFields::new(1280, 720, 2..=7680, 2..=4320)
    }

    #[test]
    fn test_width_change_updates_height() {
        let mut fields = fields();
        fields.set_display_size(Some((1920, 1080)));

        fields.set_width(1920);
        assert_eq!(fields.height(), 1080);
        assert!(!fields.is_updating());
    }

    #[test]
    fn test_height_change_updates_width() {
        let mut fields = fields();
        fields.set_display_size(Some((1920, 1080)));

        fields.set_height(1080);
        assert_eq!(fields.width(), 1920);
    }

    #[test]
    fn test_linked_value_is_even() {
        let mut fields = fields();
        fields.set_display_size(Some((1920, 1080)));

        // 1000 * 1080 / 1920 = 562.5 -> 563 -> 564
        fields.set_width(1000);
        assert_eq!(fields.height(), 564);
        assert_eq!(fields.width(), 1000);
    }

    #[test]
    fn test_round_trip_reproduces_width() {
        let mut fields = fields();
        fields.set_display_size(Some((1920, 1080)));

        fields.set_width(1280);
        let height = fields.height();
        assert_eq!(height, 720);

        fields.set_height(height);
        assert!((fields.width() as i64 - 1280).abs() <= 1);
    }

    #[test]
    fn test_round_trip_stays_within_four_pixels() {
        // Both directions round and then force even, so each leg can drift
        // by up to 1.5px before rescaling; 4px is the observed ceiling.
        for source in [(1920, 1080), (1280, 720), (1080, 1920), (1280, 536), (3840, 1600), (640, 480)] {
            let mut fields = fields();
            fields.set_display_size(Some(source));

            for width in (2..=7680u32).step_by(2) {
                fields.set_width(width);
                let height = fields.height();
                if height == 4320 {
                    continue;
                }
                fields.set_height(height);

                let drift = (fields.width() as i64 - width as i64).abs();
                assert!(drift <= 4, "{:?}: {} -> {} -> {}", source, width, height, fields.width());
                assert_eq!(drift % 2, 0);
            }
        }
    }

    #[test]
    fn test_round_trip_drift_on_16_9() {
        let mut fields = fields();
        fields.set_display_size(Some((1920, 1080)));

        // 1002 * 1080 / 1920 = 563.6 -> 564; 564 * 1920 / 1080 = 1002.7 -> 1003 -> 1004
        fields.set_width(1002);
        assert_eq!(fields.height(), 564);
        fields.set_height(564);
        assert_eq!(fields.width(), 1004);
    }

    #[test]
    fn test_odd_maximum_clamps_to_even() {
        let mut fields = ResolutionFields::new(1280, 720, 2..=1921, 2..=1081);
        fields.set_display_size(Some((1080, 1920)));

        fields.set_height(4000);
        assert_eq!(fields.height(), 1080);
        assert_eq!(fields.width() % 2, 0);
    }

    #[test]
    fn test_rotated_source_uses_display_size() {
        let mut fields = fields();
        // 1920x1080 stored, rotated 90 degrees
        fields.set_display_size(Some((1080, 1920)));

        fields.set_width(720);
        assert_eq!(fields.height(), 1280);
    }

    #[test]
    fn test_no_link_without_source() {
        let mut fields = fields();
        fields.set_width(1000);
        assert_eq!(fields.width(), 1000);
        assert_eq!(fields.height(), 720);
    }

    #[test]
    fn test_no_link_outside_aspect_fit() {
        let mut fields = fields();
        fields.set_display_size(Some((1920, 1080)));

        for mode in [ScaleMode::Exact, ScaleMode::AspectPad] {
            fields.set_mode(mode);
            fields.set_width(640);
            assert_eq!(fields.height(), 720);
        }
    }

    #[test]
    fn test_preset_does_not_link() {
        let mut fields = fields();
        fields.set_display_size(Some((1080, 1920)));

        fields.apply_preset(3840, 2160);
        assert_eq!((fields.width(), fields.height()), (3840, 2160));
        assert!(!fields.is_updating());
    }

    #[test]
    fn test_apply_original() {
        let mut fields = fields();
        assert!(matches!(fields.apply_original(), Err(ToolError::NoSourceDimensions)));

        fields.set_display_size(Some((1080, 1920)));
        fields.apply_original().unwrap();
        assert_eq!((fields.width(), fields.height()), (1080, 1920));
    }

    #[test]
    fn test_linked_value_is_clamped() {
        let mut fields = fields();
        fields.set_display_size(Some((1080, 1920)));

        fields.set_width(7680);
        assert_eq!(fields.height(), 4320);
    }

    #[test]
    fn test_zero_display_size_is_ignored() {
        let mut fields = fields();
        fields.set_display_size(Some((0, 1080)));
        assert!(fields.display_size().is_none());
    }
}
