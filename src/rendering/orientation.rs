//! Turns the stitched raster into the output rectangle: square crop around
//! the center, rotation by the heading, final crop.

use crate::core::viewport::diagonal_px;
use image::imageops;
use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Copies the `side × side` square centered on `center` out of `raster`.
///
/// `center` is in the raster's own pixel frame. Parts of the square outside
/// the raster come out transparent.
pub fn crop_square(raster: &RgbaImage, center: (i64, i64), side: u32) -> RgbaImage {
    let left = center.0 - (side / 2) as i64;
    let top = center.1 - (side / 2) as i64;
    let inside = left >= 0
        && top >= 0
        && left + side as i64 <= raster.width() as i64
        && top + side as i64 <= raster.height() as i64;
    if !inside {
        log::warn!(
            "{}px square at ({}, {}) exceeds {}x{} raster, clipping",
            side,
            left,
            top,
            raster.width(),
            raster.height()
        );
    }

    let mut square = RgbaImage::new(side, side);
    imageops::replace(&mut square, raster, -left, -top);
    square
}

/// Rotates about the image center, positive degrees counter-clockwise.
/// Corners uncovered by the rotation become transparent.
pub fn rotate(image: &RgbaImage, heading_deg: f64) -> RgbaImage {
    if heading_deg.rem_euclid(360.0) == 0.0 {
        return image.clone();
    }
    // imageproc turns clockwise for positive angles
    let theta = -heading_deg.to_radians() as f32;
    rotate_about_center(image, theta, Interpolation::Bilinear, TRANSPARENT)
}

/// Copies the `width × height` rectangle centered on the image center
pub fn crop_center(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if width > image.width() || height > image.height() {
        let mut out = RgbaImage::new(width, height);
        let x = (width / 2) as i64 - (image.width() / 2) as i64;
        let y = (height / 2) as i64 - (image.height() / 2) as i64;
        imageops::replace(&mut out, image, x, y);
        return out;
    }
    let x = image.width() / 2 - width / 2;
    let y = image.height() / 2 - height / 2;
    imageops::crop_imm(image, x, y, width, height).to_image()
}

/// Full orientation pass. The pixel at `center` in `raster` ends up at
/// `(width / 2, height / 2)` of the result.
pub fn orient(
    raster: &RgbaImage,
    center: (i64, i64),
    width: u32,
    height: u32,
    heading_deg: f64,
) -> RgbaImage {
    let side = diagonal_px(width, height) as u32;
    log::debug!(
        "orienting {}x{} around ({}, {}) via {}px square, heading {}",
        width,
        height,
        center.0,
        center.1,
        side,
        heading_deg
    );
    let square = crop_square(raster, center, side);
    let rotated = rotate(&square, heading_deg);
    crop_center(&rotated, width, height)
}
