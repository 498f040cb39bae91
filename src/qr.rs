//! QR code generation.
//!
//! Renders a payload (typically a public image URL) as a PNG QR code,
//! generated locally instead of round-tripping through a chart service.
//! The requested pixel size is clamped to a sane range and the code is
//! centered on a white canvas with the standard four-module quiet zone.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, GrayImage, ImageEncoder, Luma};
use qrcode::{Color, QrCode};

use crate::error::QrError;

/// Default edge length in pixels of a generated QR code.
pub const DEFAULT_QR_SIZE: u32 = 200;

/// Minimum edge length in pixels.
pub const MIN_QR_SIZE: u32 = 64;

/// Maximum edge length in pixels.
pub const MAX_QR_SIZE: u32 = 1024;

/// Quiet zone width in modules on each side of the code.
const QUIET_ZONE: u32 = 4;

/// Render `data` as a square PNG QR code.
///
/// `size` is clamped to `[MIN_QR_SIZE, MAX_QR_SIZE]`, then grown when
/// the code plus its quiet zone needs more pixels than that, so every
/// module keeps at least one pixel. The code is scaled to the largest
/// whole-module factor that fits and centered on a white canvas.
pub fn qr_png(data: &str, size: u32) -> Result<Vec<u8>, QrError> {
    let size = size.clamp(MIN_QR_SIZE, MAX_QR_SIZE);

    let code = QrCode::new(data.as_bytes()).map_err(|e| QrError::Encode(e.to_string()))?;
    let modules = code.width() as u32;
    let colors = code.to_colors();

    // A long payload can need more modules than the requested size has
    // pixels; a cropped code would not scan
    let size = size.max(modules + 2 * QUIET_ZONE);

    // Largest whole-pixel module size that fits with the quiet zone
    let scale = (size / (modules + 2 * QUIET_ZONE)).max(1);
    let code_px = modules * scale;
    let offset_x = size.saturating_sub(code_px) / 2;
    let offset_y = offset_x;

    let mut canvas = GrayImage::from_pixel(size, size, Luma([255u8]));

    for my in 0..modules {
        for mx in 0..modules {
            if colors[(my * modules + mx) as usize] != Color::Dark {
                continue;
            }
            for py in 0..scale {
                for px in 0..scale {
                    let x = offset_x + mx * scale + px;
                    let y = offset_y + my * scale + py;
                    if x < size && y < size {
                        canvas.put_pixel(x, y, Luma([0u8]));
                    }
                }
            }
        }
    }

    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(canvas.as_raw(), size, size, ExtendedColorType::L8)
        .map_err(|e| QrError::Render(e.to_string()))?;

    Ok(out)
}

// =============================================================================
// Tests
// =============================================================================
