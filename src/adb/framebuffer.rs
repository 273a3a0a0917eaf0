//! Framebuffer to PNG conversion
//!
//! Devices hand back screenshots in several shapes: already-encoded PNG,
//! JPEG, or raw pixels (RGBA, RGB, RGB565, 8-bit) possibly behind a small
//! header. Everything is normalised to PNG so the locate pipeline can decode
//! it like any file on disk.

use super::error::{AdbError, AdbResult};
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use std::io::Cursor;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8];

/// Header sizes seen in the wild before raw pixel data.
const HEADER_CANDIDATES: [usize; 5] = [0, 12, 16, 20, 24];

fn conversion_error(description: impl Into<String>) -> AdbError {
    AdbError::FramebufferToPngFailed {
        description: description.into(),
    }
}

fn encode_png(img: DynamicImage) -> AdbResult<Vec<u8>> {
    let mut data = Vec::new();
    img.write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
        .map_err(|e| conversion_error(format!("PNG encode failed: {e}")))?;
    Ok(data)
}

/// Convert captured framebuffer bytes for a `width`x`height` screen to PNG.
pub fn to_png(data: Vec<u8>, width: u32, height: u32) -> AdbResult<Vec<u8>> {
    if data.starts_with(PNG_MAGIC) {
        log::trace!("Framebuffer data is already PNG");
        return Ok(data);
    }
    if data.starts_with(JPEG_MAGIC) {
        log::debug!("Framebuffer data is JPEG, converting to PNG");
        let img = image::load_from_memory_with_format(&data, ImageFormat::Jpeg)
            .map_err(|e| conversion_error(format!("JPEG decode failed: {e}")))?;
        return encode_png(img);
    }

    let pixel_count = width as usize * height as usize;
    if pixel_count == 0 {
        return Err(conversion_error("screen dimensions unknown"));
    }

    let total = data.len();
    let candidates = move || HEADER_CANDIDATES.iter().filter(move |&&h| h < total);
    // A header that leaves exactly width*height*bpp bytes wins; otherwise
    // take the first header whose remainder holds a whole frame.
    let exact = candidates().find_map(|&h| {
        let len = total - h;
        (1..=4)
            .rev()
            .find(|&bpp| len == pixel_count * bpp)
            .map(|bpp| (h, bpp))
    });
    let (header, bpp) = exact
        .or_else(|| {
            candidates().find_map(|&h| {
                let len = total - h;
                (1..=4)
                    .rev()
                    .find(|&bpp| len >= pixel_count * bpp && len < pixel_count * (bpp + 1))
                    .map(|bpp| (h, bpp))
            })
        })
        .ok_or_else(|| {
            conversion_error(format!(
                "{} bytes for {} pixels ({:.2} bytes/pixel)",
                data.len(),
                pixel_count,
                data.len() as f64 / pixel_count as f64
            ))
        })?;

    log::debug!(
        "Framebuffer: {} bytes, header {} bytes, {} bytes per pixel",
        data.len(),
        header,
        bpp
    );

    let pixels = &data[header..header + pixel_count * bpp];
    let img = match bpp {
        4 => RgbaImage::from_raw(width, height, pixels.to_vec()).map(DynamicImage::ImageRgba8),
        3 => RgbImage::from_raw(width, height, pixels.to_vec()).map(DynamicImage::ImageRgb8),
        2 => {
            let rgb: Vec<u8> = pixels
                .chunks_exact(2)
                .flat_map(|px| {
                    let v = u16::from_le_bytes([px[0], px[1]]);
                    let r = ((v >> 11) & 0x1F) as u8;
                    let g = ((v >> 5) & 0x3F) as u8;
                    let b = (v & 0x1F) as u8;
                    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
                })
                .collect();
            RgbImage::from_raw(width, height, rgb).map(DynamicImage::ImageRgb8)
        }
        _ => GrayImage::from_raw(width, height, pixels.to_vec()).map(DynamicImage::ImageLuma8),
    }
    .ok_or_else(|| conversion_error(format!("{bpp} bytes/pixel buffer does not fit {width}x{height}")))?;

    encode_png(img)
}
