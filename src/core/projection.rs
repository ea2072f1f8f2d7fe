//! Web-Mercator conversions between geographic coordinates, absolute pyramid
//! pixels and tile indices.
//!
//! An absolute pixel addresses the full pyramid raster at one zoom level,
//! which is `TILE_SIZE * 2^zoom` pixels on a side. Tile indices are absolute
//! pixels divided by [`TILE_SIZE`], so `pixel / TILE_SIZE == tile` holds for
//! every valid pixel.

use crate::core::constants::{MAX_ZOOM, PIXEL_SNAP_EPSILON, TILE_SIZE};
use crate::core::geo::{GeoPoint, LatLonDelta};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

/// Pixel coordinate in the full pyramid raster at a fixed zoom level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AbsolutePixel {
    pub x: i64,
    pub y: i64,
}

impl AbsolutePixel {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Tile containing this pixel
    pub fn to_tile(&self, zoom: u8) -> TileIndex {
        let size = TILE_SIZE as i64;
        TileIndex::new(
            self.x.div_euclid(size) as u32,
            self.y.div_euclid(size) as u32,
            zoom,
        )
    }
}

/// Addresses one `TILE_SIZE × TILE_SIZE` tile image in the slippy map pyramid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileIndex {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

impl TileIndex {
    pub fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }

    /// Absolute pixel of the tile's north-west corner
    pub fn origin(&self) -> AbsolutePixel {
        AbsolutePixel::new(
            self.x as i64 * TILE_SIZE as i64,
            self.y as i64 * TILE_SIZE as i64,
        )
    }

    /// Checks if the tile is valid for its zoom level
    pub fn is_valid(&self) -> bool {
        self.zoom <= MAX_ZOOM && {
            let max_coord = 1_u64 << self.zoom;
            (self.x as u64) < max_coord && (self.y as u64) < max_coord
        }
    }
}

fn check_zoom(zoom: u8) -> Result<()> {
    if zoom > MAX_ZOOM {
        return Err(MapError::InvalidZoom { zoom });
    }
    Ok(())
}

/// Side length in pixels of the pyramid raster at `zoom`
pub fn max_abspx(zoom: u8) -> Result<i64> {
    check_zoom(zoom)?;
    Ok((TILE_SIZE as i64) << zoom)
}

/// Truncates a projected coordinate, snapping values that sit within float
/// noise of the next integer onto it.
fn snap_to_pixel(value: f64) -> f64 {
    let nearest = value.round();
    if (nearest - value).abs() < PIXEL_SNAP_EPSILON {
        nearest
    } else {
        value.floor()
    }
}

/// Forward spherical Web-Mercator projection to the nearest absolute pixel.
///
/// Longitude is wrapped into [-180, 180) first. Fails with
/// [`MapError::OutOfRange`] when the pixel falls outside the pyramid, which
/// happens for latitudes beyond the Mercator cut-off; do not rely on this near
/// the poles.
pub fn lat_lon_to_absolute_pixel(zoom: u8, lat: f64, lon: f64) -> Result<AbsolutePixel> {
    let max = max_abspx(zoom)?;
    let max_f = max as f64;

    let lon = GeoPoint::wrap_lon(lon);
    let xd = max_f * (lon + 180.0) / 360.0;
    let sin_lat = lat.to_radians().sin();
    let yd = -(0.5 * ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / PI - 1.0) * max_f / 2.0;

    if !xd.is_finite() || !yd.is_finite() {
        return Err(MapError::OutOfRange { zoom, x: xd, y: yd });
    }
    let x = snap_to_pixel(xd);
    let y = snap_to_pixel(yd);
    if x < 0.0 || x >= max_f || y < 0.0 || y >= max_f {
        return Err(MapError::OutOfRange { zoom, x: xd, y: yd });
    }
    Ok(AbsolutePixel::new(x as i64, y as i64))
}

/// Inverse projection of an absolute pixel.
///
/// `x` and `y` wrap modulo the pyramid size first, so negative or overflowing
/// pixels land back on the cylinder. Longitude is returned in (-180, 180].
pub fn absolute_pixel_to_lat_lon(zoom: u8, x: i64, y: i64) -> Result<GeoPoint> {
    let max = max_abspx(zoom)?;
    let x = x.rem_euclid(max) as f64;
    let y = y.rem_euclid(max) as f64;
    let max_f = max as f64;

    let mut lon = x * 360.0 / max_f - 180.0;
    if lon <= -180.0 {
        lon += 360.0;
    }
    let expo = PI * (1.0 - 2.0 * y / max_f);
    let lat = (2.0 * expo.exp().atan() - FRAC_PI_2).to_degrees();
    Ok(GeoPoint::new(lat, lon))
}

/// Largest lat/lon change seen when `x` and `y` are moved independently by
/// `pixel_offset` pixels.
///
/// Bounds the precision lost by pixel quantization. Near the antimeridian or
/// the poles the wraparound masks the true delta and the margin comes out
/// artificially low, so it is meaningless there.
pub fn absolute_pixel_to_lat_lon_error_margin(
    zoom: u8,
    x: i64,
    y: i64,
    pixel_offset: i64,
) -> Result<LatLonDelta> {
    let val = absolute_pixel_to_lat_lon(zoom, x, y)?;
    let val_x = absolute_pixel_to_lat_lon(zoom, x + pixel_offset, y)?;
    let val_y = absolute_pixel_to_lat_lon(zoom, x, y + pixel_offset)?;
    Ok(LatLonDelta::new(
        (val.lat - val_x.lat).abs().max((val.lat - val_y.lat).abs()),
        (val.lon - val_x.lon).abs().max((val.lon - val_y.lon).abs()),
    ))
}

/// Tile containing a coordinate
pub fn lat_lon_to_tile(zoom: u8, lat: f64, lon: f64) -> Result<TileIndex> {
    Ok(lat_lon_to_absolute_pixel(zoom, lat, lon)?.to_tile(zoom))
}

/// North-west corner of a tile
pub fn tile_to_lat_lon(tile: TileIndex) -> Result<GeoPoint> {
    let origin = tile.origin();
    absolute_pixel_to_lat_lon(tile.zoom, origin.x, origin.y)
}

/// Error margin over a whole tile, see [`absolute_pixel_to_lat_lon_error_margin`]
pub fn tile_to_lat_lon_error_margin(tile: TileIndex) -> Result<LatLonDelta> {
    let origin = tile.origin();
    absolute_pixel_to_lat_lon_error_margin(tile.zoom, origin.x, origin.y, TILE_SIZE as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_max_abspx() {
        assert_eq!(max_abspx(0).unwrap(), 256);
        assert_eq!(max_abspx(8).unwrap(), 65_536);
        assert_eq!(max_abspx(MAX_ZOOM).unwrap(), 268_435_456);
        assert!(matches!(
            max_abspx(MAX_ZOOM + 1),
            Err(MapError::InvalidZoom { zoom: 21 })
        ));
    }

    #[test]
    fn test_equator_and_prime_meridian_is_pyramid_center() {
        for zoom in 0..=MAX_ZOOM {
            let px = lat_lon_to_absolute_pixel(zoom, 0.0, 0.0).unwrap();
            let half = max_abspx(zoom).unwrap() / 2;
            assert_eq!(px, AbsolutePixel::new(half, half));
        }
    }

    #[test]
    fn test_pole_is_out_of_range() {
        assert!(matches!(
            lat_lon_to_absolute_pixel(5, 90.0, 0.0),
            Err(MapError::OutOfRange { .. })
        ));
        assert!(matches!(
            lat_lon_to_absolute_pixel(5, -89.0, 0.0),
            Err(MapError::OutOfRange { .. })
        ));
        assert!(lat_lon_to_absolute_pixel(5, f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_antimeridian_wraps_to_first_column() {
        let px = lat_lon_to_absolute_pixel(3, 10.0, 180.0).unwrap();
        assert_eq!(px.x, 0);
        let px = lat_lon_to_absolute_pixel(3, 10.0, -180.0).unwrap();
        assert_eq!(px.x, 0);
    }

    #[test]
    fn test_inverse_wraps_pixels() {
        let max = max_abspx(4).unwrap();
        let a = absolute_pixel_to_lat_lon(4, 100, 200).unwrap();
        let b = absolute_pixel_to_lat_lon(4, 100 - max, 200 + max).unwrap();
        assert_eq!(a, b);

        let west_edge = absolute_pixel_to_lat_lon(4, 0, max / 2).unwrap();
        assert_eq!(west_edge.lon, 180.0);
        assert_abs_diff_eq!(west_edge.lat, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tile_round_trip() {
        for zoom in 0..=MAX_ZOOM {
            let n = 1_u32 << zoom;
            let step = (n / 16).max(1);
            let mut coords: Vec<u32> = (0..n).step_by(step as usize).collect();
            coords.push(n - 1);
            for &ty in &coords {
                for &tx in &coords {
                    let tile = TileIndex::new(tx, ty, zoom);
                    let corner = tile_to_lat_lon(tile).unwrap();
                    let back = lat_lon_to_tile(zoom, corner.lat, corner.lon).unwrap();
                    assert_eq!(back, tile, "zoom {} corner {:?}", zoom, corner);
                }
            }
        }
    }

    #[test]
    fn test_error_margin_shrinks_with_offset() {
        let zoom = 10;
        let (x, y) = (67_247, 97_459);
        let mut previous = absolute_pixel_to_lat_lon_error_margin(zoom, x, y, 64).unwrap();
        for offset in [32, 16, 8, 4, 2, 1] {
            let margin = absolute_pixel_to_lat_lon_error_margin(zoom, x, y, offset).unwrap();
            assert!(margin.lat >= 0.0 && margin.lon >= 0.0);
            assert!(margin.lat < previous.lat);
            assert!(margin.lon < previous.lon);
            previous = margin;
        }
    }

    #[test]
    fn test_tile_validity() {
        assert!(TileIndex::new(3, 3, 2).is_valid());
        assert!(!TileIndex::new(4, 0, 2).is_valid());
        assert!(!TileIndex::new(0, 0, MAX_ZOOM + 1).is_valid());
    }
}
