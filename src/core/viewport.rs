use crate::core::bounds::{region_tile_bounds, TileRange};
use crate::core::constants::{EARTH_RADIUS_KM, ROTATION_PADDING};
use crate::core::geo::{
    bounding_region, max_radius_from_center, spherical_centroid, BoundingRegion, GeoPoint,
};
use crate::core::projection::{absolute_pixel_to_lat_lon, lat_lon_to_absolute_pixel, max_abspx};
use crate::core::zoom::{select_zoom_level, ZoomSelection};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// Diagonal of a `width × height` rectangle, rounded up to whole pixels
pub fn diagonal_px(width: u32, height: u32) -> i64 {
    (width as f64).hypot(height as f64).ceil() as i64
}

/// Side of a square that still holds the output rectangle at any rotation
pub fn padding_side_px(width: u32, height: u32) -> i64 {
    (ROTATION_PADDING * diagonal_px(width, height) as f64).ceil() as i64
}

/// The region a render covers, derived from the requested points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRegion {
    pub center: GeoPoint,
    pub radius_km: f64,
    pub bounds: BoundingRegion,
}

/// Zoom and tile range chosen for one output size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TilePlan {
    pub zoom: ZoomSelection,
    pub range: TileRange,
    /// Side of the rotation padding square the zoom was chosen for
    pub padding_px: i64,
}

impl ResolvedRegion {
    /// Center, radius and bounds for a point list.
    ///
    /// A single point is its own center and uses `default_radius_km`. For
    /// several points the center is their spherical centroid and the radius
    /// the distance to the farthest one.
    pub fn resolve(points: &[GeoPoint], default_radius_km: f64) -> Result<Self> {
        let points: Vec<GeoPoint> = points.iter().map(GeoPoint::normalized).collect();
        if let Some(bad) = points.iter().find(|p| !p.is_valid()) {
            return Err(MapError::InvalidRequest(format!(
                "coordinate ({}, {}) outside of the projectable range",
                bad.lat, bad.lon
            )));
        }

        let (center, radius_km) = match points.as_slice() {
            [] => {
                return Err(MapError::InvalidRequest(
                    "at least one point is required".to_string(),
                ))
            }
            [single] => (*single, default_radius_km),
            many => {
                let center = spherical_centroid(many).ok_or_else(|| {
                    MapError::InvalidRequest("at least one point is required".to_string())
                })?;
                let radius = max_radius_from_center(&center, many, EARTH_RADIUS_KM);
                (center, radius)
            }
        };

        let bounds = bounding_region(&center, radius_km, EARTH_RADIUS_KM)?;
        log::debug!(
            "resolved {} point(s) to center ({:.5}, {:.5}) radius {:.3} km",
            points.len(),
            center.lat,
            center.lon,
            radius_km
        );
        Ok(Self {
            center,
            radius_km,
            bounds,
        })
    }

    /// Zoom and tiles whose stitched raster holds a `width × height` output
    /// at any rotation
    pub fn plan(&self, width: u32, height: u32) -> Result<TilePlan> {
        let padding_px = padding_side_px(width, height);
        let zoom = select_zoom_level(padding_px, padding_px, &self.bounds, &self.center)?;
        let range = region_tile_bounds(zoom.zoom, &self.bounds)?;
        log::debug!(
            "zoom {} tiles x {}..={} y {}..={} for {}px padding",
            zoom.zoom,
            range.x_min,
            range.x_max,
            range.y_min,
            range.y_max,
            padding_px
        );
        Ok(TilePlan {
            zoom,
            range,
            padding_px,
        })
    }
}

/// Maps between pixels of a finished output image and coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputViewport {
    pub zoom: u8,
    pub center: GeoPoint,
    pub width: u32,
    pub height: u32,
    /// Degrees, positive counter-clockwise
    pub heading: f64,
}

impl OutputViewport {
    pub fn new(zoom: u8, center: GeoPoint, width: u32, height: u32, heading: f64) -> Self {
        Self {
            zoom,
            center,
            width,
            height,
            heading,
        }
    }

    fn half_size(&self) -> (f64, f64) {
        ((self.width / 2) as f64, (self.height / 2) as f64)
    }

    /// Coordinate under an output pixel. Fails with [`MapError::OutOfRange`]
    /// for pixels outside the image.
    pub fn pixel_to_lat_lon(&self, x: i64, y: i64) -> Result<GeoPoint> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return Err(MapError::OutOfRange {
                zoom: self.zoom,
                x: x as f64,
                y: y as f64,
            });
        }
        let (half_w, half_h) = self.half_size();
        let ox = x as f64 - half_w;
        let oy = y as f64 - half_h;

        // undo the map rotation
        let (sin, cos) = self.heading.to_radians().sin_cos();
        let mx = ox * cos - oy * sin;
        let my = ox * sin + oy * cos;

        let center = lat_lon_to_absolute_pixel(self.zoom, self.center.lat, self.center.lon)?;
        absolute_pixel_to_lat_lon(
            self.zoom,
            center.x + mx.round() as i64,
            center.y + my.round() as i64,
        )
    }

    /// Output pixel of a coordinate. The result may lie outside the image.
    pub fn lat_lon_to_pixel(&self, lat: f64, lon: f64) -> Result<(i64, i64)> {
        let max = max_abspx(self.zoom)?;
        let center = lat_lon_to_absolute_pixel(self.zoom, self.center.lat, self.center.lon)?;
        let target = lat_lon_to_absolute_pixel(self.zoom, lat, lon)?;

        // shortest way around the cylinder
        let mx = (target.x - center.x + max / 2).rem_euclid(max) - max / 2;
        let my = target.y - center.y;

        let (sin, cos) = self.heading.to_radians().sin_cos();
        let (mx, my) = (mx as f64, my as f64);
        let ox = mx * cos + my * sin;
        let oy = -mx * sin + my * cos;

        let (half_w, half_h) = self.half_size();
        Ok(((half_w + ox).round() as i64, (half_h + oy).round() as i64))
    }
}
