//! Debug output: draw located matches onto the main image.

use super::error::{LocateError, LocateResult};
use super::types::CandidatePoint;
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_cross_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use std::path::Path;

const MARKER: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Copy of `main` with a box the size of the sub image around every match
/// and a cross on its center point.
pub fn annotate_matches(
    main: &DynamicImage,
    points: &[CandidatePoint],
    sub_width: u32,
    sub_height: u32,
) -> RgbaImage {
    let mut canvas = main.to_rgba8();
    for p in points {
        let left = p.x as i32 - (sub_width / 2) as i32;
        let top = p.y as i32 - (sub_height / 2) as i32;
        let rect = Rect::at(left, top).of_size(sub_width.max(1), sub_height.max(1));
        draw_hollow_rect_mut(&mut canvas, rect, MARKER);
        draw_cross_mut(&mut canvas, MARKER, p.x as i32, p.y as i32);
    }
    canvas
}

/// Annotate and write to `output`; format follows the file extension.
pub fn save_annotated(
    main: &DynamicImage,
    points: &[CandidatePoint],
    sub_width: u32,
    sub_height: u32,
    output: &Path,
) -> LocateResult<()> {
    annotate_matches(main, points, sub_width, sub_height)
        .save(output)
        .map_err(|source| LocateError::AnnotationWrite {
            path: output.to_path_buf(),
            source,
        })?;
    log::info!("🖍️ Annotated image saved to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_drawn_around_match() {
        let main = DynamicImage::ImageRgba8(RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 255])));
        let out = annotate_matches(&main, &[CandidatePoint::new(10, 10)], 4, 4);

        // Box spans (8,8)..(11,11); corners and center are marked.
        assert_eq!(out.get_pixel(8, 8), &MARKER);
        assert_eq!(out.get_pixel(11, 11), &MARKER);
        assert_eq!(out.get_pixel(10, 10), &MARKER);
        assert_eq!(out.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("missing").join("annotated.png");
        let main = DynamicImage::ImageRgba8(RgbaImage::new(8, 8));

        let err = save_annotated(&main, &[CandidatePoint::new(4, 4)], 2, 2, &output).unwrap_err();
        match err {
            LocateError::AnnotationWrite { path, .. } => assert_eq!(path, output),
            other => panic!("expected AnnotationWrite, got {other:?}"),
        }
        assert!(!output.exists());
    }
}
