//! Synthetic test pattern.
//!
//! Vertical colour bars that scroll one bar-width per second of frames, with
//! a per-device tint so front and back cameras are distinguishable.

use camera_capture_core::models::frame::PixelFormat;

const BARS: [[u8; 3]; 8] = [
    [255, 255, 255],
    [255, 255, 0],
    [0, 255, 255],
    [0, 255, 0],
    [255, 0, 255],
    [255, 0, 0],
    [0, 0, 255],
    [0, 0, 0],
];

/// Pixel format every virtual camera produces.
pub const PATTERN_FORMAT: PixelFormat = PixelFormat::Bgra8;

/// Render frame number `index` of a `width` x `height` BGRA pattern.
pub fn render(width: u32, height: u32, index: u64, tint: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(PATTERN_FORMAT.buffer_len(width, height));
    if width == 0 || height == 0 {
        return data;
    }

    let bar_width = (width as usize / BARS.len()).max(1);
    let shift = (index as usize) % width as usize;

    for _ in 0..height {
        for x in 0..width as usize {
            let bar = ((x + shift) / bar_width) % BARS.len();
            let [r, g, b] = BARS[bar];
            data.extend_from_slice(&[b ^ tint, g, r, 255]);
        }
    }
    data
}

/// Tint derived from a device id.
pub fn tint_for(device_id: &str) -> u8 {
    device_id.bytes().fold(0u8, |acc, b| acc.wrapping_mul(31).wrapping_add(b))
}
