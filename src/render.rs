use std::sync::Arc;

use vello_cpu::kurbo::{Affine, Rect, RoundedRect, Shape};

use crate::error::{HoesgenError, HoesgenResult};
use crate::layout::{
    CANVAS_SIZE, LABEL_FONT_SIZE, LABEL_OUTLINE_WIDTH, TITLE_CENTER_Y, TITLE_CORNER_RADIUS,
    contain_placement, fit_title, label_pill,
};
use crate::model::{LabelKind, ProjectState, Rgba8, SourceImage};
use crate::text::{TextBrushRgba8, TextEngine};

/// Message drawn in place of the photo until one is loaded.
const PLACEHOLDER_MESSAGE: &str = "Upload een afbeelding";
/// Placeholder font size.
const PLACEHOLDER_FONT_SIZE: f32 = 20.0;

const CANVAS_BG: Rgba8 = Rgba8::rgb(0xff, 0xff, 0xff);
const PLACEHOLDER_BG: Rgba8 = Rgba8::rgb(0xf1, 0xf5, 0xf9);
const PLACEHOLDER_FG: Rgba8 = Rgba8::rgb(0x94, 0xa3, 0xb8);
const TITLE_FG: Rgba8 = Rgba8::rgb(0x0f, 0x17, 0x2a);
const LABEL_FG: Rgba8 = Rgba8::rgb(0x1e, 0x29, 0x3b);
// Banner is white at 95% opacity so the photo shows through faintly.
const BANNER_BG: Rgba8 = Rgba8::rgba(0xff, 0xff, 0xff, 242);
const PILL_BG: Rgba8 = Rgba8::rgb(0xff, 0xff, 0xff);

/// Text sits 2px below the geometric box center, matching the banner/pill
/// baseline placement the layout was tuned for.
const TEXT_NUDGE_Y: f32 = 2.0;

/// One fully rendered 500x500 frame in premultiplied RGBA8.
///
/// Frames are recomputed wholesale on every render call; there is no partial
/// update state. Identical inputs yield byte-identical frames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8 bytes.
    pub data: Vec<u8>,
}

/// The compositor: draws background, photo, title banner and label pills.
///
/// Owns the text engine so the fit computation and the glyph draw path share
/// one measurement primitive. Pure given its inputs: rendering has no hidden
/// state beyond the image paint cache, which never affects output pixels.
pub struct Renderer {
    text: TextEngine,
    image_paint: Option<(Arc<Vec<u8>>, vello_cpu::Image)>,
}

impl Renderer {
    /// Build a renderer around a text engine.
    pub fn new(text: TextEngine) -> Self {
        Self {
            text,
            image_paint: None,
        }
    }

    /// Mutable access to the shared text engine.
    pub fn text_engine_mut(&mut self) -> &mut TextEngine {
        &mut self.text
    }

    /// Render the state's active record onto a fresh canvas.
    ///
    /// Draw order is fixed because later draws sit on top: background, photo
    /// (or placeholder), title banner, then label pills in [`LabelKind::ALL`]
    /// order. Labels whose record value is empty are skipped entirely.
    pub fn render(&mut self, state: &ProjectState) -> HoesgenResult<Frame> {
        let edge: u16 = CANVAS_SIZE
            .try_into()
            .map_err(|_| HoesgenError::render("canvas edge exceeds u16"))?;
        let canvas = CANVAS_SIZE as f32;
        let mut ctx = vello_cpu::RenderContext::new(edge, edge);

        self.draw_background(&mut ctx, state.image.as_ref(), canvas)?;

        if !state.title.is_empty()
            && let Some(record) = state.active_record()
        {
            let full_title = format!("{} - {}", state.title, record.size_label());
            self.draw_title_banner(&mut ctx, &full_title, canvas)?;
        }

        if let Some(record) = state.active_record() {
            for kind in LabelKind::ALL {
                if kind.value(record).is_empty() {
                    continue;
                }
                let text = kind.label_text(record);
                let pill = label_pill(
                    &mut self.text,
                    &text,
                    state.positions.get(kind),
                    canvas,
                    canvas,
                )?;
                self.draw_pill(&mut ctx, &text, pill, kind.color())?;
            }
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(edge, edge);
        ctx.render_to_pixmap(&mut pixmap);

        Ok(Frame {
            width: CANVAS_SIZE,
            height: CANVAS_SIZE,
            data: pixmap.data_as_u8_slice().to_vec(),
        })
    }

    fn draw_background(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        image: Option<&SourceImage>,
        canvas: f32,
    ) -> HoesgenResult<()> {
        let full = Rect::new(0.0, 0.0, f64::from(canvas), f64::from(canvas));
        match image {
            Some(image) => {
                fill_rect(ctx, full, CANVAS_BG);

                let paint = self.image_paint_for(image)?;
                let (scale, x, y) = contain_placement(image.width, image.height, canvas, canvas);
                ctx.set_paint_transform(Affine::IDENTITY);
                ctx.set_transform(
                    Affine::translate((f64::from(x), f64::from(y)))
                        * Affine::scale(f64::from(scale)),
                );
                ctx.set_paint(paint);
                ctx.fill_rect(&Rect::new(
                    0.0,
                    0.0,
                    f64::from(image.width),
                    f64::from(image.height),
                ));
            }
            None => {
                fill_rect(ctx, full, PLACEHOLDER_BG);
                self.draw_text_centered(
                    ctx,
                    PLACEHOLDER_MESSAGE,
                    PLACEHOLDER_FONT_SIZE,
                    PLACEHOLDER_FG,
                    canvas / 2.0,
                    canvas / 2.0,
                )?;
            }
        }
        Ok(())
    }

    fn draw_title_banner(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        full_title: &str,
        canvas: f32,
    ) -> HoesgenResult<()> {
        let fit = fit_title(&mut self.text, full_title, canvas)?;
        let rect = rect_from_center(
            canvas / 2.0,
            TITLE_CENTER_Y,
            fit.box_width,
            fit.box_height,
        );

        draw_shadow(ctx, rect, f64::from(TITLE_CORNER_RADIUS), 2.0, 4.0, 51);
        fill_rounded(ctx, rect, f64::from(TITLE_CORNER_RADIUS), BANNER_BG);
        self.draw_text_centered(
            ctx,
            full_title,
            fit.font_size,
            TITLE_FG,
            canvas / 2.0,
            TITLE_CENTER_Y + TEXT_NUDGE_Y,
        )
    }

    fn draw_pill(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        pill: crate::layout::PillGeometry,
        outline: Rgba8,
    ) -> HoesgenResult<()> {
        let rect = rect_to_cpu(pill.rect());
        let radius = f64::from(pill.radius());
        let half_stroke = f64::from(LABEL_OUTLINE_WIDTH) / 2.0;

        draw_shadow(ctx, rect, radius, 3.0, 6.0, 77);
        // Outline as two fills: colored ring under an inset white body.
        fill_rounded(
            ctx,
            rect.inflate(half_stroke, half_stroke),
            radius + half_stroke,
            outline,
        );
        fill_rounded(
            ctx,
            rect.inflate(-half_stroke, -half_stroke),
            (radius - half_stroke).max(0.0),
            PILL_BG,
        );
        self.draw_text_centered(
            ctx,
            text,
            LABEL_FONT_SIZE,
            LABEL_FG,
            pill.center_x,
            pill.center_y + TEXT_NUDGE_Y,
        )
    }

    fn draw_text_centered(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        size_px: f32,
        color: Rgba8,
        center_x: f32,
        center_y: f32,
    ) -> HoesgenResult<()> {
        let brush = TextBrushRgba8 {
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        };
        let layout = self.text.layout_plain(text, size_px, brush)?;
        let font = self.text.font_data();

        let origin_x = f64::from(center_x - layout.full_width() / 2.0);
        let origin_y = f64::from(center_y - layout.height() / 2.0);
        ctx.set_transform(Affine::translate((origin_x, origin_y)));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn image_paint_for(&mut self, image: &SourceImage) -> HoesgenResult<vello_cpu::Image> {
        if let Some((cached_pixels, paint)) = &self.image_paint
            && Arc::ptr_eq(cached_pixels, &image.rgba8_premul)
        {
            return Ok(paint.clone());
        }

        let pixmap =
            image_premul_bytes_to_pixmap(image.rgba8_premul.as_slice(), image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_paint = Some((image.rgba8_premul.clone(), paint.clone()));
        Ok(paint)
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn rect_to_cpu(r: kurbo::Rect) -> Rect {
    Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn rect_from_center(cx: f32, cy: f32, width: f32, height: f32) -> Rect {
    let cx = f64::from(cx);
    let cy = f64::from(cy);
    let w = f64::from(width);
    let h = f64::from(height);
    Rect::new(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
}

fn fill_rect(ctx: &mut vello_cpu::RenderContext, rect: Rect, color: Rgba8) {
    ctx.set_transform(Affine::IDENTITY);
    ctx.set_paint(color_to_cpu(color));
    ctx.fill_rect(&rect);
}

fn fill_rounded(ctx: &mut vello_cpu::RenderContext, rect: Rect, radius: f64, color: Rgba8) {
    ctx.set_transform(Affine::IDENTITY);
    ctx.set_paint(color_to_cpu(color));
    let path = RoundedRect::from_rect(rect, radius).to_path(0.1);
    ctx.fill_path(&path);
}

/// Soft drop shadow approximated with three stacked translucent fills.
///
/// `blur` controls how far the outermost layer extends past the box and
/// `alpha` is the total shadow opacity split across the layers.
fn draw_shadow(
    ctx: &mut vello_cpu::RenderContext,
    rect: Rect,
    radius: f64,
    offset_y: f64,
    blur: f64,
    alpha: u8,
) {
    let layer_alpha = alpha / 3;
    let offset = rect.with_origin((rect.x0, rect.y0 + offset_y));
    for spread in [blur, blur / 2.0, 0.0] {
        fill_rounded(
            ctx,
            offset.inflate(spread, spread),
            radius + spread,
            Rgba8::rgba(0, 0, 0, layer_alpha),
        );
    }
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> HoesgenResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| HoesgenError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| HoesgenError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(HoesgenError::render("source image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_from_center_is_symmetric() {
        let r = rect_from_center(250.0, 30.0, 100.0, 40.0);
        assert_eq!((r.x0, r.y0, r.x1, r.y1), (200.0, 10.0, 300.0, 50.0));
    }

    #[test]
    fn pixmap_conversion_validates_byte_length() {
        assert!(image_premul_bytes_to_pixmap(&[0u8; 4], 2, 2).is_err());
        assert!(image_premul_bytes_to_pixmap(&[0u8; 16], 2, 2).is_ok());
    }
}
