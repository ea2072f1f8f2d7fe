//! Compass icon drawn over the finished map.

use crate::rendering::orientation::rotate;
use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Rotates `icon` by the heading, scales it to `size` and draws it with its
/// top-left corner at `position`. Parts falling outside `output` are clipped.
pub fn overlay_compass(
    output: &mut RgbaImage,
    icon: &RgbaImage,
    size: (u32, u32),
    position: (i64, i64),
    heading_deg: f64,
) {
    if size.0 == 0 || size.1 == 0 || icon.width() == 0 || icon.height() == 0 {
        log::warn!("compass of size {}x{} skipped", size.0, size.1);
        return;
    }

    let turned = rotate(icon, heading_deg);
    let scaled = imageops::resize(&turned, size.0, size.1, FilterType::Triangle);

    let mut layer = RgbaImage::new(output.width(), output.height());
    imageops::replace(&mut layer, &scaled, position.0, position.1);
    imageops::overlay(output, &layer, 0, 0);
    log::debug!(
        "compass {}x{} drawn at ({}, {})",
        size.0,
        size.1,
        position.0,
        position.1
    );
}
