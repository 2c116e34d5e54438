use anyhow::Context;
use image::ImageEncoder as _;

use crate::error::{HoesgenError, HoesgenResult};
use crate::model::DimensionRecord;
use crate::render::Frame;

/// Fixed export quality on the encoder's 0-100 scale.
pub const EXPORT_QUALITY: u8 = 92;

/// File extension of exported artifacts.
pub const EXPORT_EXTENSION: &str = "jpg";

/// Deterministic artifact name for one record:
/// `hoes-{width}x{depth}x{height}[-{front_height}].jpg`.
pub fn artifact_file_name(record: &DimensionRecord) -> String {
    let mut name = format!(
        "hoes-{}x{}x{}",
        record.width, record.depth, record.height
    );
    if !record.front_height.is_empty() {
        name.push('-');
        name.push_str(&record.front_height);
    }
    name.push('.');
    name.push_str(EXPORT_EXTENSION);
    name
}

/// Encode a rendered frame as a lossy JPEG at the given quality.
///
/// The frame's premultiplied pixels are unpremultiplied and flattened to RGB
/// first; the canvas is always fully opaque, so this is lossless in practice.
pub fn encode_jpeg(frame: &Frame, quality: u8) -> HoesgenResult<Vec<u8>> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.data.len() != expected {
        return Err(HoesgenError::encode(format!(
            "frame byte length {} does not match {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }

    let mut rgb = Vec::with_capacity(frame.width as usize * frame.height as usize * 3);
    for px in frame.data.chunks_exact(4) {
        let [r, g, b] = unpremultiply(px[0], px[1], px[2], px[3]);
        rgb.extend_from_slice(&[r, g, b]);
    }

    let mut out = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
    encoder
        .write_image(
            &rgb,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgb8,
        )
        .context("encode jpeg artifact")?;
    Ok(out)
}

fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> [u8; 3] {
    match a {
        0 => [0, 0, 0],
        255 => [r, g, b],
        a => {
            let un = |c: u8| -> u8 {
                ((u16::from(c) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8
            };
            [un(r), un(g), un(b)]
        }
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
            unit: "cm".into(),
        }
    }

    #[test]
    fn artifact_names_are_derived_from_dimensions() {
        assert_eq!(
            artifact_file_name(&record("220", "90", "80", "")),
            "hoes-220x90x80.jpg"
        );
        assert_eq!(
            artifact_file_name(&record("180", "90", "75", "60")),
            "hoes-180x90x75-60.jpg"
        );
    }

    #[test]
    fn encode_produces_a_jpeg_stream() {
        let frame = Frame {
            width: 4,
            height: 4,
            data: vec![255u8; 4 * 4 * 4],
        };
        let bytes = encode_jpeg(&frame, EXPORT_QUALITY).unwrap();
        // JPEG SOI marker.
        assert_eq!(&bytes[..2], &[0xff, 0xd8]);
    }

    #[test]
    fn encode_rejects_truncated_frames() {
        let frame = Frame {
            width: 4,
            height: 4,
            data: vec![255u8; 7],
        };
        assert!(encode_jpeg(&frame, EXPORT_QUALITY).is_err());
    }

    #[test]
    fn unpremultiply_round_trips_opaque_and_zero() {
        assert_eq!(unpremultiply(10, 20, 30, 255), [10, 20, 30]);
        assert_eq!(unpremultiply(0, 0, 0, 0), [0, 0, 0]);
        // Half-alpha premultiplied 64 unpremultiplies back near 128.
        let [r, _, _] = unpremultiply(64, 64, 64, 128);
        assert!((i32::from(r) - 128).abs() <= 1);
    }
}
