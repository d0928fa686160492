//! Integration tests for tree-level sanitization.

mod common;

use common::{book_tree, jpeg_with_orientation, put, rgb_bytes};
use folioforge::config::SanitizeConfig;
use folioforge::sanitizer::{fast_path, sanitize_file, Sanitizer, Settings};
use folioforge_common::{paths::to_slash_relative, ImageFormat as Sniffed, SanitizeStatus};
use folioforge_image::dpi::{jpeg::read_jfif_density, png::read_phys};
use folioforge_image::{is_placeholder, read_orientation};
use image::ImageFormat;
use std::path::Path;

fn sanitizer(workers: usize) -> Sanitizer {
    Sanitizer::new(SanitizeConfig {
        max_workers: workers,
        ..SanitizeConfig::default()
    })
}

/// (relative path, status, actions, size_after) for order-sensitive comparison.
fn summarize(root: &Path, workers: usize) -> Vec<(String, SanitizeStatus, Vec<String>, u64)> {
    sanitizer(workers)
        .sanitize_tree(root)
        .into_iter()
        .map(|r| (to_slash_relative(&r.path, root), r.status, r.actions, r.size_after))
        .collect()
}

#[test]
fn png_without_phys_gets_96_dpi() {
    let dir = tempfile::tempdir().unwrap();
    let path = put(dir.path(), "img.png", &rgb_bytes(100, 100, ImageFormat::Png));
    assert_eq!(read_phys(&std::fs::read(&path).unwrap()), None);

    let reports = sanitizer(8).sanitize_tree(dir.path());
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert!(report.has_action("FORCE_96DPI"), "{:?}", report.actions);
    assert!(matches!(report.status, SanitizeStatus::Ok | SanitizeStatus::Repaired));
    assert_eq!(read_phys(&std::fs::read(&path).unwrap()), Some((3780, 3780, 1)));
}

#[test]
fn worker_count_does_not_change_reports() {
    let one = tempfile::tempdir().unwrap();
    let eight = tempfile::tempdir().unwrap();
    book_tree(one.path());
    book_tree(eight.path());
    for i in 0..20u32 {
        let name = format!("OEBPS/extra/{i:02}.png");
        put(one.path(), &name, &rgb_bytes(8 + i, 8, ImageFormat::Png));
        put(eight.path(), &name, &rgb_bytes(8 + i, 8, ImageFormat::Png));
    }

    let sequential = summarize(one.path(), 1);
    let parallel = summarize(eight.path(), 8);
    assert_eq!(sequential.len(), 26);
    assert_eq!(sequential, parallel);
}

#[test]
fn book_tree_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    book_tree(dir.path());

    let reports = sanitizer(4).sanitize_tree(dir.path());
    let by_name = |name: &str| {
        reports
            .iter()
            .find(|r| r.path.ends_with(name))
            .unwrap_or_else(|| panic!("no report for {name}"))
    };

    let cover = by_name("cover.jpg");
    assert_eq!(cover.actions, vec!["FAST_96DPI"]);
    assert_eq!(cover.status, SanitizeStatus::Ok);

    let overlay = by_name("overlay.png");
    assert!(overlay.has_action("ALPHA_FLAT_WHITE"));
    assert_eq!(overlay.status, SanitizeStatus::Repaired);

    let spoofed = by_name("spoofed.jpg");
    assert_eq!(spoofed.actions[0], "SPOOF_jpeg→png");

    let garbage = by_name("garbage.gif");
    assert_eq!(garbage.status, SanitizeStatus::Failed);
    assert_eq!(garbage.actions, vec!["INVALID_REPLACED"]);
    let svg = dir.path().join("OEBPS/images/garbage.svg");
    assert!(is_placeholder(&std::fs::read(svg).unwrap()));

    let truncated = by_name("truncated.png");
    assert_eq!(truncated.status, SanitizeStatus::Replaced);
    assert_eq!(truncated.actions, vec!["DECODE_FAIL_REPLACED"]);

    // Non-image files are not visited
    assert!(reports.iter().all(|r| !r.path.ends_with("content.opf")));
}

#[test]
fn pixel_bomb_header_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    // IHDR claims 60000x60000; there is no pixel data to back it.
    let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
    let mut ihdr = b"IHDR".to_vec();
    ihdr.extend_from_slice(&60_000u32.to_be_bytes());
    ihdr.extend_from_slice(&60_000u32.to_be_bytes());
    ihdr.extend_from_slice(&[8, 2, 0, 0, 0]);
    png.extend_from_slice(&13u32.to_be_bytes());
    png.extend_from_slice(&ihdr);
    png.extend_from_slice(&folioforge_image::dpi::crc32(&ihdr).to_be_bytes());
    let path = put(dir.path(), "bomb.png", &png);

    let reports = sanitizer(1).sanitize_tree(dir.path());
    assert_eq!(reports[0].status, SanitizeStatus::Replaced);
    assert!(reports[0].error.is_some());
    assert!(!path.exists());
}

#[test]
fn exif_rotated_jpeg_takes_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = put(dir.path(), "photo.jpg", &jpeg_with_orientation(30, 10, 6));

    let orientation = read_orientation(&path, Sniffed::Jpeg);
    assert_eq!(orientation, Some(6));
    assert!(!fast_path::is_eligible(&path, Sniffed::Jpeg, orientation));

    let report = sanitize_file(&path, &Settings::default());
    assert_eq!(
        report.actions,
        vec!["EXIF_ROT_270", "FORCE_sRGB", "FORCE_96DPI", "CLEAN_BINARY"]
    );
    assert_eq!(report.status, SanitizeStatus::Repaired);
    assert_eq!(image::image_dimensions(&path).unwrap(), (10, 30));
}

#[test]
fn fast_path_density_matches_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = rgb_bytes(24, 16, ImageFormat::Jpeg);
    let fast = put(dir.path(), "fast.jpg", &bytes);
    let full = put(dir.path(), "full.jpg", &bytes);

    let fast_report = sanitize_file(&fast, &Settings::default());
    let full_report = sanitize_file(
        &full,
        &Settings {
            fast_path: false,
            ..Settings::default()
        },
    );
    assert_eq!(fast_report.actions, vec!["FAST_96DPI"]);
    assert!(full_report.has_action("FORCE_96DPI"));

    let fast_density = read_jfif_density(&std::fs::read(&fast).unwrap());
    let full_density = read_jfif_density(&std::fs::read(&full).unwrap());
    assert_eq!(fast_density, Some((1, 96, 96)));
    assert_eq!(fast_density, full_density);
}
