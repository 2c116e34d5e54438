use std::sync::Arc;

use crate::error::{HoesgenError, HoesgenResult};
use crate::parse::parse_dimensions;

/// Display unit appended to every parsed dimension value.
///
/// The unit is fixed; it is never parsed out of the input text.
pub const DISPLAY_UNIT: &str = "cm";

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with an explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// One parsed set of dimensions, corresponding to one input line.
///
/// Numeric fields stay display strings; no arithmetic is ever performed on
/// them. `front_height` is the empty string for the common three-value lines.
/// Records are immutable once created and are recreated wholesale whenever the
/// raw input text changes.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DimensionRecord {
    /// 0-based position in the filtered (non-discarded) input sequence.
    pub index: usize,
    /// Width value as entered.
    pub width: String,
    /// Depth value as entered.
    pub depth: String,
    /// Height value as entered.
    pub height: String,
    /// Optional front-height variant; empty when the line had no 4th token.
    pub front_height: String,
    /// Fixed display unit.
    pub unit: String,
}

impl DimensionRecord {
    /// Concatenated size string: `"{w}x{d}x{h}[/{fh}]{unit}"`.
    pub fn size_label(&self) -> String {
        let mut s = format!("{}x{}x{}", self.width, self.depth, self.height);
        if !self.front_height.is_empty() {
            s.push('/');
            s.push_str(&self.front_height);
        }
        s.push_str(&self.unit);
        s
    }
}

/// The closed set of label kinds drawn over the canvas.
///
/// Each kind carries its directional glyph, abbreviation, outline color, and
/// record accessor, so adding a kind is a single variant addition rather than
/// a scatter of per-case branches. Declaration order is draw order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelKind {
    Width,
    Depth,
    Height,
    FrontHeight,
}

impl LabelKind {
    /// All kinds in fixed draw order.
    pub const ALL: [LabelKind; 4] = [
        LabelKind::Width,
        LabelKind::Depth,
        LabelKind::Height,
        LabelKind::FrontHeight,
    ];

    /// Directional glyph shown before the value.
    pub fn glyph(self) -> &'static str {
        match self {
            LabelKind::Width => "\u{2194}",       // ↔
            LabelKind::Depth => "\u{2199}",       // ↙
            LabelKind::Height => "\u{2195}",      // ↕
            LabelKind::FrontHeight => "\u{2195}", // ↕
        }
    }

    /// Abbreviation appended directly to the glyph; empty for most kinds.
    pub fn abbreviation(self) -> &'static str {
        match self {
            LabelKind::FrontHeight => "VH",
            _ => "",
        }
    }

    /// Pill outline color.
    pub fn color(self) -> Rgba8 {
        match self {
            LabelKind::Width => Rgba8::rgb(0x25, 0x63, 0xeb), // blue
            LabelKind::Depth => Rgba8::rgb(0x16, 0xa3, 0x4a), // green
            LabelKind::Height => Rgba8::rgb(0xdc, 0x26, 0x26), // red
            LabelKind::FrontHeight => Rgba8::rgb(0xf9, 0x73, 0x16), // orange
        }
    }

    /// The record field this kind labels.
    pub fn value(self, record: &DimensionRecord) -> &str {
        match self {
            LabelKind::Width => &record.width,
            LabelKind::Depth => &record.depth,
            LabelKind::Height => &record.height,
            LabelKind::FrontHeight => &record.front_height,
        }
    }

    /// Full pill text: glyph + abbreviation + value + unit.
    pub fn label_text(self, record: &DimensionRecord) -> String {
        format!(
            "{}{} {} {}",
            self.glyph(),
            self.abbreviation(),
            self.value(record),
            record.unit
        )
    }
}

/// Percentage coordinates of a label pill center, relative to the canvas.
///
/// Both axes live in `[0, 100]` and are clamped on every update.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnchorPosition {
    /// Horizontal position as a percentage of canvas width.
    pub x: f32,
    /// Vertical position as a percentage of canvas height.
    pub y: f32,
}

impl AnchorPosition {
    /// Build a position, clamping both axes into `[0, 100]`.
    pub fn clamped(x: f32, y: f32) -> Self {
        Self {
            x: x.clamp(0.0, 100.0),
            y: y.clamp(0.0, 100.0),
        }
    }
}

/// One anchor per label kind.
///
/// Positions persist across record switches and re-renders; they are per
/// project, not per record.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnchorPositions {
    pub width: AnchorPosition,
    pub depth: AnchorPosition,
    pub height: AnchorPosition,
    pub front_height: AnchorPosition,
}

impl Default for AnchorPositions {
    fn default() -> Self {
        Self {
            width: AnchorPosition { x: 50.0, y: 85.0 },
            depth: AnchorPosition { x: 85.0, y: 65.0 },
            height: AnchorPosition { x: 15.0, y: 50.0 },
            front_height: AnchorPosition { x: 35.0, y: 65.0 },
        }
    }
}

impl AnchorPositions {
    /// Anchor for a label kind.
    pub fn get(&self, kind: LabelKind) -> AnchorPosition {
        match kind {
            LabelKind::Width => self.width,
            LabelKind::Depth => self.depth,
            LabelKind::Height => self.height,
            LabelKind::FrontHeight => self.front_height,
        }
    }

    /// Replace an anchor, clamping into `[0, 100]` on both axes.
    pub fn set(&mut self, kind: LabelKind, x: f32, y: f32) {
        let pos = AnchorPosition::clamped(x, y);
        match kind {
            LabelKind::Width => self.width = pos,
            LabelKind::Depth => self.depth = pos,
            LabelKind::Height => self.height = pos,
            LabelKind::FrontHeight => self.front_height = pos,
        }
    }
}

/// Decoded source photo in premultiplied RGBA8 form.
///
/// Immutable after load; replaced wholesale on re-upload.
#[derive(Clone, Debug)]
pub struct SourceImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Shared mutable state behind the render and export routines.
///
/// Everything the compositor reads lives here and is passed by reference, so
/// there is exactly one writer and the sequential export protocol (switch
/// record, render, encode) stays race-free.
#[derive(Clone, Debug, Default)]
pub struct ProjectState {
    /// Product title shown in the banner.
    pub title: String,
    /// Parsed records in input order.
    pub records: Vec<DimensionRecord>,
    /// Index of the record the preview/export currently targets.
    pub active: usize,
    /// Label pill anchors.
    pub positions: AnchorPositions,
    /// Loaded source photo, if any.
    pub image: Option<SourceImage>,
    /// Set while a batch export is in flight; rejects re-entrant exports.
    pub exporting: bool,
}

impl ProjectState {
    /// Re-parse the raw dimension text, replacing all records.
    ///
    /// The active selection resets to the first record, matching the
    /// wholesale-recreate lifecycle of `DimensionRecord`.
    pub fn set_dimensions_text(&mut self, text: &str) {
        self.records = parse_dimensions(text);
        self.active = 0;
    }

    /// Select the record to preview/export next.
    pub fn set_active(&mut self, index: usize) -> HoesgenResult<()> {
        if index >= self.records.len() {
            return Err(HoesgenError::validation(format!(
                "record index {index} out of range ({} records)",
                self.records.len()
            )));
        }
        self.active = index;
        Ok(())
    }

    /// Currently selected record, if any records exist.
    pub fn active_record(&self) -> Option<&DimensionRecord> {
        self.records.get(self.active)
    }

    /// Apply a drag update to a label anchor; the latest position wins.
    pub fn drag_to(&mut self, kind: LabelKind, x_pct: f32, y_pct: f32) {
        self.positions.set(kind, x_pct, y_pct);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(w: &str, d: &str, h: &str, fh: &str) -> DimensionRecord {
        DimensionRecord {
            index: 0,
            width: w.into(),
            depth: d.into(),
            height: h.into(),
            front_height: fh.into(),
            unit: DISPLAY_UNIT.into(),
        }
    }

    #[test]
    fn size_label_includes_front_height_only_when_present() {
        assert_eq!(record("220", "90", "80", "").size_label(), "220x90x80cm");
        assert_eq!(
            record("180", "90", "75", "60").size_label(),
            "180x90x75/60cm"
        );
    }

    #[test]
    fn label_text_combines_glyph_abbreviation_value_unit() {
        let rec = record("180", "90", "75", "60");
        assert_eq!(LabelKind::Width.label_text(&rec), "\u{2194} 180 cm");
        assert_eq!(LabelKind::FrontHeight.label_text(&rec), "\u{2195}VH 60 cm");
    }

    #[test]
    fn anchors_clamp_to_percentage_range() {
        let mut positions = AnchorPositions::default();
        positions.set(LabelKind::Width, -5.0, 130.0);
        assert_eq!(positions.width, AnchorPosition { x: 0.0, y: 100.0 });
        positions.set(LabelKind::Depth, 100.0, 0.0);
        assert_eq!(positions.depth, AnchorPosition { x: 100.0, y: 0.0 });
    }

    #[test]
    fn drag_updates_clamp_and_persist() {
        let mut state = ProjectState::default();
        state.drag_to(LabelKind::Height, 250.0, 42.5);
        assert_eq!(
            state.positions.get(LabelKind::Height),
            AnchorPosition { x: 100.0, y: 42.5 }
        );
        // Positions survive record churn.
        state.set_dimensions_text("220 x 90 x 80");
        assert_eq!(
            state.positions.get(LabelKind::Height),
            AnchorPosition { x: 100.0, y: 42.5 }
        );
    }

    #[test]
    fn set_dimensions_text_resets_active_selection() {
        let mut state = ProjectState::default();
        state.set_dimensions_text("220 x 90 x 80\n210 x 100 x 80");
        state.set_active(1).unwrap();
        state.set_dimensions_text("220 x 90 x 80");
        assert_eq!(state.active, 0);
        assert!(state.set_active(1).is_err());
    }

    #[test]
    fn positions_round_trip_through_json() {
        let positions = AnchorPositions::default();
        let json = serde_json::to_string(&positions).unwrap();
        let back: AnchorPositions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, positions);
    }
}
