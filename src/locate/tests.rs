//! End-to-end tests for the locate pipeline, using synthetic PNGs on disk.

use crate::locate::threshold;
use crate::locate::{
    CandidatePoint, ImageRole, LocateConfig, LocateError, MatchLocator, create_ui_config, locate,
    match_template,
};
use image::{GrayImage, Luma};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const BACKGROUND: u8 = 30;
const BRIGHT: u8 = 220;

/// Uniform background with a `size`x`size` bright block at each top-left.
fn blocks_image(width: u32, height: u32, size: u32, corners: &[(u32, u32)]) -> GrayImage {
    let mut img = GrayImage::from_pixel(width, height, Luma([BACKGROUND]));
    for &(bx, by) in corners {
        for y in by..by + size {
            for x in bx..bx + size {
                img.put_pixel(x, y, Luma([BRIGHT]));
            }
        }
    }
    img
}

/// A small textured icon: a ring-like pattern that is not flat.
fn icon(size: u32) -> GrayImage {
    GrayImage::from_fn(size, size, |x, y| {
        let edge = x == 0 || y == 0 || x == size - 1 || y == size - 1;
        let diag = x == y;
        Luma([if edge { 240 } else if diag { 10 } else { 120 }])
    })
}

fn paste(canvas: &mut GrayImage, patch: &GrayImage, x: u32, y: u32) {
    image::imageops::replace(canvas, patch, x as i64, y as i64);
}

fn write(dir: &TempDir, name: &str, img: &GrayImage) -> PathBuf {
    let path = dir.path().join(name);
    img.save(&path).unwrap();
    path
}

#[test]
fn test_single_block_located_at_center() {
    let dir = TempDir::new().unwrap();
    let main = write(&dir, "main.png", &blocks_image(20, 20, 4, &[(8, 8)]));
    let sub = write(&dir, "sub.png", &GrayImage::from_pixel(4, 4, Luma([BRIGHT])));

    assert_eq!(locate(&main, &sub, 0.8).unwrap(), vec![(10, 10)]);
}

#[test]
fn test_two_blocks_in_scan_order() {
    let dir = TempDir::new().unwrap();
    let main = write(&dir, "main.png", &blocks_image(20, 20, 4, &[(0, 0), (15, 15)]));
    let sub = write(&dir, "sub.png", &GrayImage::from_pixel(4, 4, Luma([BRIGHT])));

    assert_eq!(locate(&main, &sub, 0.8).unwrap(), vec![(2, 2), (17, 17)]);
}

#[test]
fn test_textured_icon_exact_center() {
    let dir = TempDir::new().unwrap();
    let patch = icon(9);
    let mut canvas = GrayImage::from_pixel(60, 40, Luma([BACKGROUND]));
    paste(&mut canvas, &patch, 23, 11);

    let main = write(&dir, "main.png", &canvas);
    let sub = write(&dir, "sub.png", &patch);

    assert_eq!(locate(&main, &sub, 0.9).unwrap(), vec![(27, 15)]);
}

#[test]
fn test_two_icon_occurrences_apart() {
    let dir = TempDir::new().unwrap();
    let patch = icon(8);
    let mut canvas = GrayImage::from_pixel(80, 50, Luma([BACKGROUND]));
    // Second one appears first in scan order (smaller y).
    paste(&mut canvas, &patch, 5, 30);
    paste(&mut canvas, &patch, 60, 4);

    let main = write(&dir, "main.png", &canvas);
    let sub = write(&dir, "sub.png", &patch);

    assert_eq!(locate(&main, &sub, 0.95).unwrap(), vec![(64, 8), (9, 34)]);
}

#[test]
fn test_overlapping_windows_collapse_to_one_point() {
    let dir = TempDir::new().unwrap();
    // A horizontal ramp still correlates well when shifted by a pixel or two,
    // so several adjacent windows exceed a low threshold.
    let patch = GrayImage::from_fn(6, 6, |x, _| Luma([(x * 40) as u8]));
    let mut canvas = GrayImage::from_pixel(40, 40, Luma([BACKGROUND]));
    paste(&mut canvas, &patch, 17, 17);

    let scores = match_template(&canvas, &patch).unwrap();
    let candidates = threshold::filter(&scores, 0.5, 6, 6);
    assert!(candidates.len() > 1, "expected over-generation");

    let main = write(&dir, "main.png", &canvas);
    let sub = write(&dir, "sub.png", &patch);

    let points = MatchLocator::new().locate(&main, &sub, 0.5).unwrap();
    assert_eq!(points, vec![candidates[0]]);
    assert!(points[0].distance(&CandidatePoint::new(20, 20)) <= 5.0);
}

#[test]
fn test_no_match_returns_empty() {
    let dir = TempDir::new().unwrap();
    let main = write(&dir, "main.png", &GrayImage::from_pixel(30, 30, Luma([BACKGROUND])));
    let sub = write(&dir, "sub.png", &icon(6));

    assert!(locate(&main, &sub, 0.8).unwrap().is_empty());
}

#[test]
fn test_idempotent() {
    let dir = TempDir::new().unwrap();
    let patch = icon(7);
    let mut canvas = GrayImage::from_pixel(50, 50, Luma([BACKGROUND]));
    paste(&mut canvas, &patch, 3, 3);
    paste(&mut canvas, &patch, 30, 20);
    paste(&mut canvas, &patch, 12, 40);

    let main = write(&dir, "main.png", &canvas);
    let sub = write(&dir, "sub.png", &patch);

    let first = locate(&main, &sub, 0.9).unwrap();
    let second = locate(&main, &sub, 0.9).unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[test]
fn test_confidence_one_accepts_exact_match() {
    let dir = TempDir::new().unwrap();
    let patch = icon(5);
    let mut canvas = GrayImage::from_pixel(25, 25, Luma([BACKGROUND]));
    paste(&mut canvas, &patch, 10, 4);

    let main = write(&dir, "main.png", &canvas);
    let sub = write(&dir, "sub.png", &patch);

    assert_eq!(locate(&main, &sub, 1.0).unwrap(), vec![(12, 6)]);
}

#[test]
fn test_invalid_confidence_reported_even_with_valid_paths() {
    let dir = TempDir::new().unwrap();
    let main = write(&dir, "main.png", &blocks_image(10, 10, 2, &[(1, 1)]));
    let sub = write(&dir, "sub.png", &GrayImage::from_pixel(2, 2, Luma([BRIGHT])));

    for bad in [-0.01, 1.01, 7.0, f32::INFINITY] {
        let err = locate(&main, &sub, bad).unwrap_err();
        let errors = err.validation_errors().expect("validation error");
        assert_eq!(errors.len(), 1);
        assert!(errors.has_invalid_parameter("confidence"), "for {bad}");
    }
}

#[test]
fn test_all_violations_reported_together() {
    let missing_main = Path::new("no/such/main.png");
    let missing_sub = Path::new("no/such/sub.png");

    let err = locate(missing_main, missing_sub, 1.5).unwrap_err();
    let errors = err.validation_errors().expect("validation error");
    assert_eq!(errors.len(), 3);
    assert!(errors.has_missing_path(ImageRole::Main));
    assert!(errors.has_missing_path(ImageRole::Sub));
    assert!(errors.has_invalid_parameter("confidence"));
}

#[test]
fn test_single_missing_path() {
    let dir = TempDir::new().unwrap();
    let main = write(&dir, "main.png", &blocks_image(10, 10, 2, &[(1, 1)]));

    let err = locate(&main, dir.path().join("absent.png"), 0.5).unwrap_err();
    let errors = err.validation_errors().expect("validation error");
    assert_eq!(errors.len(), 1);
    assert!(errors.has_missing_path(ImageRole::Sub));
}

#[test]
fn test_corrupt_image_surfaces_decode_error() {
    let dir = TempDir::new().unwrap();
    let main = dir.path().join("main.png");
    std::fs::write(&main, b"garbage").unwrap();
    let sub = write(&dir, "sub.png", &icon(3));

    let err = locate(&main, &sub, 0.5).unwrap_err();
    assert!(matches!(
        err,
        LocateError::ImageDecode {
            which: ImageRole::Main,
            ..
        }
    ));
}

#[test]
fn test_sub_larger_than_main() {
    let dir = TempDir::new().unwrap();
    let main = write(&dir, "main.png", &icon(4));
    let sub = write(&dir, "sub.png", &icon(6));

    let err = locate(&main, &sub, 0.5).unwrap_err();
    assert!(matches!(err, LocateError::TemplateTooLarge { .. }));
}

#[test]
fn test_wider_radius_merges_close_occurrences() {
    let dir = TempDir::new().unwrap();
    let main = write(&dir, "main.png", &blocks_image(30, 30, 3, &[(2, 2), (9, 2)]));
    let sub = write(&dir, "sub.png", &GrayImage::from_pixel(3, 3, Luma([BRIGHT])));

    let default_points = locate(&main, &sub, 0.9).unwrap();
    assert_eq!(default_points, vec![(3, 3), (10, 3)]);

    let wide = MatchLocator::with_config(LocateConfig::default().with_cluster_radius(8.0));
    let merged = wide.locate(&main, &sub, 0.9).unwrap();
    assert_eq!(merged.len(), 1);
    assert_eq!((merged[0].x, merged[0].y), (3, 3));
}

#[test]
fn test_configured_confidence_is_used() {
    let dir = TempDir::new().unwrap();
    let patch = icon(7);
    let mut canvas = GrayImage::from_pixel(40, 40, Luma([BACKGROUND]));
    paste(&mut canvas, &patch, 10, 20);

    let main = write(&dir, "main.png", &canvas);
    let sub = write(&dir, "sub.png", &patch);

    let ui = MatchLocator::with_config(create_ui_config());
    assert_eq!(ui.locate_configured(&main, &sub).unwrap(), vec![CandidatePoint::new(13, 23)]);

    let strict = MatchLocator::with_config(LocateConfig::default().with_confidence(1.5));
    let err = strict.locate_configured(&main, &sub).unwrap_err();
    assert!(err.validation_errors().unwrap().has_invalid_parameter("confidence"));
}
