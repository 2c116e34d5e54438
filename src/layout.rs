use crate::error::HoesgenResult;
use crate::model::AnchorPosition;
use crate::text::TextMeasure;

/// Fixed output surface edge, in pixels. The canvas is always square.
pub const CANVAS_SIZE: u32 = 500;

/// Title banner starts at this font size and shrinks from here.
pub const TITLE_MAX_FONT_SIZE: f32 = 24.0;
/// Title shrink floor; the loop never goes below this.
pub const TITLE_MIN_FONT_SIZE: f32 = 12.0;
/// Title shrink decrement per iteration.
pub const TITLE_FONT_STEP: f32 = 2.0;
/// Total horizontal margin the title text must fit inside.
pub const TITLE_MARGIN: f32 = 40.0;
/// Horizontal padding on each side of the title text.
pub const TITLE_PAD_X: f32 = 12.0;
/// Banner height as a multiple of the fitted font size.
pub const TITLE_HEIGHT_FACTOR: f32 = 1.8;
/// Vertical center of the banner, from the canvas top.
pub const TITLE_CENTER_Y: f32 = 30.0;
/// Banner corner radius.
pub const TITLE_CORNER_RADIUS: f32 = 8.0;

/// Label pills use this fixed font size, independent of title shrink.
pub const LABEL_FONT_SIZE: f32 = 22.0;
/// Horizontal padding on each side of a pill's text.
pub const LABEL_PAD_X: f32 = 12.0;
/// Vertical padding above and below a pill's text.
pub const LABEL_PAD_Y: f32 = 8.0;
/// Pill outline stroke width.
pub const LABEL_OUTLINE_WIDTH: f32 = 3.0;

/// Result of the title shrink-to-fit computation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TitleFit {
    /// Fitted font size, in `[TITLE_MIN_FONT_SIZE, TITLE_MAX_FONT_SIZE]`.
    pub font_size: f32,
    /// Measured text width at the fitted size.
    pub text_width: f32,
    /// Banner box width (text width plus padding).
    pub box_width: f32,
    /// Banner box height (font size times the height factor).
    pub box_height: f32,
}

/// Shrink the title font until the measured text fits the horizontal margin.
///
/// This is a monotone shrink loop, not a binary search: start at the maximum
/// size, measure, and step down by [`TITLE_FONT_STEP`] while the width exceeds
/// `canvas_width - TITLE_MARGIN` and the size is above the floor. Determinism
/// requires `measure` to be the same primitive the compositor draws with.
pub fn fit_title(
    measure: &mut dyn TextMeasure,
    text: &str,
    canvas_width: f32,
) -> HoesgenResult<TitleFit> {
    let max_width = canvas_width - TITLE_MARGIN;
    let mut font_size = TITLE_MAX_FONT_SIZE;
    let mut text_width = measure.text_width(text, font_size)?;
    while text_width > max_width && font_size > TITLE_MIN_FONT_SIZE {
        font_size -= TITLE_FONT_STEP;
        text_width = measure.text_width(text, font_size)?;
    }
    Ok(TitleFit {
        font_size,
        text_width,
        box_width: text_width + TITLE_PAD_X * 2.0,
        box_height: font_size * TITLE_HEIGHT_FACTOR,
    })
}

/// Geometry of one label pill, centered on its anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PillGeometry {
    /// Pill center x in pixels.
    pub center_x: f32,
    /// Pill center y in pixels.
    pub center_y: f32,
    /// Measured text width at [`LABEL_FONT_SIZE`].
    pub text_width: f32,
    /// Box width (text width plus padding).
    pub width: f32,
    /// Box height (font size plus padding).
    pub height: f32,
}

impl PillGeometry {
    /// Fully-rounded corner radius: half the pill height.
    pub fn radius(&self) -> f32 {
        self.height / 2.0
    }

    /// Bounding rect of the pill.
    pub fn rect(&self) -> kurbo::Rect {
        kurbo::Rect::new(
            f64::from(self.center_x - self.width / 2.0),
            f64::from(self.center_y - self.height / 2.0),
            f64::from(self.center_x + self.width / 2.0),
            f64::from(self.center_y + self.height / 2.0),
        )
    }
}

/// Convert an anchor percentage to absolute pixel coordinates.
pub fn anchor_to_px(anchor: AnchorPosition, canvas_width: f32, canvas_height: f32) -> (f32, f32) {
    (
        anchor.x / 100.0 * canvas_width,
        anchor.y / 100.0 * canvas_height,
    )
}

/// Compute pill geometry for one label at its anchor.
pub fn label_pill(
    measure: &mut dyn TextMeasure,
    text: &str,
    anchor: AnchorPosition,
    canvas_width: f32,
    canvas_height: f32,
) -> HoesgenResult<PillGeometry> {
    let (center_x, center_y) = anchor_to_px(anchor, canvas_width, canvas_height);
    let text_width = measure.text_width(text, LABEL_FONT_SIZE)?;
    Ok(PillGeometry {
        center_x,
        center_y,
        text_width,
        width: text_width + LABEL_PAD_X * 2.0,
        height: LABEL_FONT_SIZE + LABEL_PAD_Y * 2.0,
    })
}

/// "Contain" scale and centered placement of an image inside the canvas.
///
/// Returns `(scale, offset_x, offset_y)` such that the scaled image fits
/// entirely within the canvas with its aspect ratio preserved.
pub fn contain_placement(
    image_width: u32,
    image_height: u32,
    canvas_width: f32,
    canvas_height: f32,
) -> (f32, f32, f32) {
    let w = image_width as f32;
    let h = image_height as f32;
    let scale = (canvas_width / w).min(canvas_height / h);
    let x = canvas_width / 2.0 - w / 2.0 * scale;
    let y = canvas_height / 2.0 - h / 2.0 * scale;
    (scale, x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HoesgenResult;

    /// Fixed-advance measurement double: every glyph is 0.6 em wide.
    struct FixedAdvance;

    impl TextMeasure for FixedAdvance {
        fn text_width(&mut self, text: &str, size_px: f32) -> HoesgenResult<f32> {
            Ok(text.chars().count() as f32 * size_px * 0.6)
        }
    }

    #[test]
    fn short_title_keeps_maximum_font_size() {
        let fit = fit_title(&mut FixedAdvance, "Hoes", 500.0).unwrap();
        assert_eq!(fit.font_size, TITLE_MAX_FONT_SIZE);
        assert_eq!(fit.box_width, fit.text_width + 24.0);
        assert_eq!(fit.box_height, TITLE_MAX_FONT_SIZE * TITLE_HEIGHT_FACTOR);
    }

    #[test]
    fn long_title_shrinks_in_steps_of_two_until_it_fits() {
        // 40 chars * 0.6 em: fits at 19.16 px, so the loop should stop at 18.
        let title = "A".repeat(40);
        let fit = fit_title(&mut FixedAdvance, &title, 500.0).unwrap();
        assert_eq!(fit.font_size, 18.0);
        assert!(fit.text_width <= 460.0);
        // One step larger would not have fit.
        assert!(40.0 * 20.0 * 0.6 > 460.0);
    }

    #[test]
    fn shrink_is_bounded_by_the_floor() {
        let title = "A".repeat(400);
        let fit = fit_title(&mut FixedAdvance, &title, 500.0).unwrap();
        assert_eq!(fit.font_size, TITLE_MIN_FONT_SIZE);
        // Floor hit: the text still overflows, which is accepted.
        assert!(fit.text_width > 460.0);
    }

    #[test]
    fn fitted_size_is_always_within_bounds() {
        for len in [0usize, 1, 10, 30, 50, 80, 200] {
            let title = "x".repeat(len);
            let fit = fit_title(&mut FixedAdvance, &title, 500.0).unwrap();
            assert!(fit.font_size <= TITLE_MAX_FONT_SIZE);
            assert!(fit.font_size >= TITLE_MIN_FONT_SIZE);
            // Sizes only ever move in whole steps from the maximum.
            let steps = (TITLE_MAX_FONT_SIZE - fit.font_size) / TITLE_FONT_STEP;
            assert_eq!(steps.fract(), 0.0);
        }
    }

    #[test]
    fn anchor_percentages_convert_to_pixels() {
        let anchor = AnchorPosition { x: 50.0, y: 85.0 };
        let (x, y) = anchor_to_px(anchor, 500.0, 500.0);
        assert_eq!((x, y), (250.0, 425.0));
    }

    #[test]
    fn pill_geometry_uses_fixed_label_font_and_padding() {
        let anchor = AnchorPosition { x: 10.0, y: 20.0 };
        let pill = label_pill(&mut FixedAdvance, "\u{2194} 220 cm", anchor, 500.0, 500.0).unwrap();
        assert_eq!(pill.center_x, 50.0);
        assert_eq!(pill.center_y, 100.0);
        assert_eq!(pill.width, pill.text_width + 24.0);
        assert_eq!(pill.height, LABEL_FONT_SIZE + 16.0);
        assert_eq!(pill.radius(), pill.height / 2.0);
    }

    #[test]
    fn contain_placement_centers_and_preserves_aspect() {
        // Wide image: width-bound.
        let (scale, x, y) = contain_placement(1000, 500, 500.0, 500.0);
        assert_eq!(scale, 0.5);
        assert_eq!(x, 0.0);
        assert_eq!(y, 125.0);

        // Tall image: height-bound.
        let (scale, x, y) = contain_placement(250, 1000, 500.0, 500.0);
        assert_eq!(scale, 0.5);
        assert_eq!(x, 187.5);
        assert_eq!(y, 0.0);
    }
}
