use std::sync::Arc;

use crate::error::{HoesgenError, HoesgenResult};

/// RGBA8 brush color carried through Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

/// Width measurement seam shared by the fit computation and the draw path.
///
/// The title shrink loop and the compositor must agree on text extents, so
/// both go through this trait; in production it is implemented by
/// [`TextEngine`], and layout unit tests substitute a fixed-advance double.
pub trait TextMeasure {
    /// Measured width in pixels of `text` rendered at `size_px`.
    fn text_width(&mut self, text: &str, size_px: f32) -> HoesgenResult<f32>;
}

/// Parley-backed text layout and measurement engine.
///
/// Fonts are explicit input: the engine registers caller-provided font bytes
/// and hands the same bytes to the raster backend as `FontData`, so shaped
/// glyph ids and the drawn face can never diverge.
pub struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    font_bytes: Arc<Vec<u8>>,
    font_data: Option<vello_cpu::peniko::FontData>,
}

impl TextEngine {
    /// Build an engine from raw TTF/OTF font bytes.
    pub fn from_font_bytes(font_bytes: Vec<u8>) -> HoesgenResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            HoesgenError::validation("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| HoesgenError::validation("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font_bytes: Arc::new(font_bytes),
            font_data: None,
        })
    }

    /// Family name of the registered font.
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Shape and lay out a single line of bold text.
    pub fn layout_plain(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> HoesgenResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(HoesgenError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::BOLD,
        ));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Font for the raster backend, built from the registered bytes.
    pub fn font_data(&mut self) -> vello_cpu::peniko::FontData {
        if let Some(font) = &self.font_data {
            return font.clone();
        }
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(self.font_bytes.as_ref().clone()),
            0,
        );
        self.font_data = Some(font.clone());
        font
    }
}

impl TextMeasure for TextEngine {
    fn text_width(&mut self, text: &str, size_px: f32) -> HoesgenResult<f32> {
        let layout = self.layout_plain(text, size_px, TextBrushRgba8::default())?;
        Ok(layout.full_width())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_font_bytes() {
        assert!(TextEngine::from_font_bytes(vec![0u8; 16]).is_err());
    }
}
