//! Shared fixtures for integration tests.
//!
//! Builds small images and EPUB archives on disk so each test owns an
//! isolated temp directory.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Encoded bytes of a `width`x`height` opaque RGB image.
pub fn rgb_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
    encode(DynamicImage::ImageRgb8(img), format)
}

/// Encoded PNG of a half-transparent RGBA image.
pub fn translucent_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 100]));
    encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

/// JPEG carrying an APP1 Exif block whose only tag is Orientation.
pub fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let plain = rgb_bytes(width, height, ImageFormat::Jpeg);

    let mut exif = b"Exif\0\0".to_vec();
    exif.extend_from_slice(b"MM\0\x2A");
    exif.extend_from_slice(&8u32.to_be_bytes());
    exif.extend_from_slice(&1u16.to_be_bytes());
    // Orientation (0x0112), SHORT, count 1, value left-justified
    exif.extend_from_slice(&0x0112u16.to_be_bytes());
    exif.extend_from_slice(&3u16.to_be_bytes());
    exif.extend_from_slice(&1u32.to_be_bytes());
    exif.extend_from_slice(&orientation.to_be_bytes());
    exif.extend_from_slice(&[0, 0]);
    exif.extend_from_slice(&0u32.to_be_bytes());

    let mut out = plain[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((exif.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&exif);
    out.extend_from_slice(&plain[2..]);
    out
}

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).expect("encode fixture");
    buf.into_inner()
}

/// Write `bytes` to `root/relative`, creating parent directories.
pub fn put(root: &Path, relative: &str, bytes: &[u8]) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create fixture dir");
    }
    std::fs::write(&path, bytes).expect("write fixture");
    path
}

/// An unpacked book with one image of each interesting kind.
pub fn book_tree(root: &Path) {
    put(root, "mimetype", b"application/epub+zip");
    put(root, "META-INF/container.xml", b"<container/>");
    put(root, "OEBPS/content.opf", b"<package/>");
    put(root, "OEBPS/images/cover.jpg", &rgb_bytes(32, 48, ImageFormat::Jpeg));
    put(root, "OEBPS/images/figure.png", &rgb_bytes(100, 100, ImageFormat::Png));
    put(root, "OEBPS/images/overlay.png", &translucent_png(20, 20));
    put(root, "OEBPS/images/spoofed.jpg", &rgb_bytes(10, 10, ImageFormat::Png));
    put(root, "OEBPS/images/garbage.gif", b"this is not a gif at all");
    put(root, "OEBPS/images/truncated.png", &rgb_bytes(50, 50, ImageFormat::Png)[..40]);
}

/// Write a zip at `path` with the given entries, in order, deflated.
pub fn build_epub(path: &Path, entries: &[(&str, Vec<u8>)]) {
    let file = std::fs::File::create(path).expect("create epub");
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, data) in entries {
        zip.start_file(*name, options).expect("start entry");
        zip.write_all(data).expect("write entry");
    }
    zip.finish().expect("finish epub");
}

/// Entry names of a zip in central-directory order.
pub fn entry_names(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).expect("open epub");
    let mut archive = zip::ZipArchive::new(file).expect("read epub");
    (0..archive.len())
        .map(|i| archive.by_index(i).expect("entry").name().to_string())
        .collect()
}

/// Read one entry's bytes.
pub fn read_entry(path: &Path, name: &str) -> Vec<u8> {
    use std::io::Read;
    let file = std::fs::File::open(path).expect("open epub");
    let mut archive = zip::ZipArchive::new(file).expect("read epub");
    let mut entry = archive.by_name(name).expect("entry");
    let mut out = Vec::new();
    entry.read_to_end(&mut out).expect("read entry");
    out
}
