//! Zoom-level selection for a region that has to cover a pixel box.

use crate::core::bounds::region_tile_bounds;
use crate::core::constants::MAX_ZOOM;
use crate::core::geo::{BoundingRegion, GeoPoint};
use crate::core::projection::lat_lon_to_absolute_pixel;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// Outcome of [`select_zoom_level`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomSelection {
    pub zoom: u8,
    /// False when no zoom up to [`MAX_ZOOM`] fits the box; the zoom is then
    /// a best effort and the stitched raster may not cover the request.
    pub fits: bool,
}

/// Picks the zoom level at which the tiles covering `region` first contain
/// a `required_width × required_height` pixel box centered on `center`.
///
/// Levels are tried from 0 upward. At each level the stitched tile raster
/// must be at least as large as the box on both axes, and `center`, moved
/// into the raster's local frame, must leave room for half the box on every
/// side. The first level that passes is returned; if none does up to
/// [`MAX_ZOOM`] the ceiling is returned with `fits == false`.
pub fn select_zoom_level(
    required_width: i64,
    required_height: i64,
    region: &BoundingRegion,
    center: &GeoPoint,
) -> Result<ZoomSelection> {
    if required_width < 0 || required_height < 0 {
        return Err(MapError::InvalidRegion(format!(
            "pixel box has negative size {}x{}",
            required_width, required_height
        )));
    }

    for zoom in 0..=MAX_ZOOM {
        if box_fits(zoom, required_width, required_height, region, center)? {
            log::debug!(
                "zoom {} fits {}x{} box around ({:.5}, {:.5})",
                zoom,
                required_width,
                required_height,
                center.lat,
                center.lon
            );
            return Ok(ZoomSelection { zoom, fits: true });
        }
    }

    log::warn!(
        "no zoom level fits {}x{} box, falling back to {}",
        required_width,
        required_height,
        MAX_ZOOM
    );
    Ok(ZoomSelection {
        zoom: MAX_ZOOM,
        fits: false,
    })
}

fn box_fits(
    zoom: u8,
    width: i64,
    height: i64,
    region: &BoundingRegion,
    center: &GeoPoint,
) -> Result<bool> {
    let tiles = region_tile_bounds(zoom, region)?;
    let (size_x, size_y) = tiles.pixel_size();
    let (size_x, size_y) = (size_x as i64, size_y as i64);
    if size_x < width || size_y < height {
        return Ok(false);
    }

    // center relative to the stitched raster's (0,0)
    let center_px = lat_lon_to_absolute_pixel(zoom, center.lat, center.lon)?;
    let (local_x, local_y) = tiles.local_pixel(&center_px);

    let left = local_x - width / 2;
    let top = local_y - height / 2;
    let right = left + width;
    let bottom = top + height;
    Ok(left >= 0 && top >= 0 && right <= size_x && bottom <= size_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::{EARTH_RADIUS_KM, TILE_SIZE};
    use crate::core::geo::bounding_region;

    fn region_around(center: GeoPoint, radius_km: f64) -> BoundingRegion {
        bounding_region(&center, radius_km, EARTH_RADIUS_KM).unwrap()
    }

    #[test]
    fn test_rejects_negative_box() {
        let center = GeoPoint::new(10.0, 10.0);
        let region = region_around(center, 5.0);
        assert!(matches!(
            select_zoom_level(-1, 10, &region, &center),
            Err(MapError::InvalidRegion(_))
        ));
        assert!(matches!(
            select_zoom_level(10, -1, &region, &center),
            Err(MapError::InvalidRegion(_))
        ));
    }

    #[test]
    fn test_empty_box_fits_at_zoom_zero() {
        let center = GeoPoint::new(10.0, 10.0);
        let region = region_around(center, 5.0);
        let selection = select_zoom_level(0, 0, &region, &center).unwrap();
        assert_eq!(selection, ZoomSelection { zoom: 0, fits: true });
    }

    #[test]
    fn test_selected_zoom_covers_box() {
        let center = GeoPoint::new(41.85, -87.65);
        for (radius_km, side) in [(1.0, 600), (25.0, 1200), (400.0, 2829)] {
            let region = region_around(center, radius_km);
            let selection = select_zoom_level(side, side, &region, &center).unwrap();
            assert!(selection.fits);

            let tiles = region_tile_bounds(selection.zoom, &region).unwrap();
            let (w, h) = tiles.pixel_size();
            assert!(w as i64 >= side && h as i64 >= side);

            // one level lower must not have fit, otherwise it would have been chosen
            if selection.zoom > 0 {
                assert!(!box_fits(selection.zoom - 1, side, side, &region, &center).unwrap());
            }
        }
    }

    #[test]
    fn test_larger_regions_choose_lower_zoom() {
        let center = GeoPoint::new(48.85, 2.35);
        let small = select_zoom_level(1000, 1000, &region_around(center, 2.0), &center).unwrap();
        let large = select_zoom_level(1000, 1000, &region_around(center, 200.0), &center).unwrap();
        assert!(large.zoom < small.zoom);
    }

    #[test]
    fn test_antimeridian_region_fits() {
        let center = GeoPoint::new(-16.75, 179.4);
        let region = region_around(center, 80.0);
        assert!(region.crosses_antimeridian());
        let selection = select_zoom_level(1000, 1000, &region, &center).unwrap();
        assert!(selection.fits);
        assert!(selection.zoom < 12);
    }

    #[test]
    fn test_best_effort_when_nothing_fits() {
        let center = GeoPoint::new(0.0, 0.0);
        let region = BoundingRegion::new(center, center);
        // a single pixel region never grows past one tile
        let side = 4 * TILE_SIZE as i64;
        let selection = select_zoom_level(side, side, &region, &center).unwrap();
        assert_eq!(
            selection,
            ZoomSelection {
                zoom: MAX_ZOOM,
                fits: false
            }
        );
    }
}
