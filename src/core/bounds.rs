use crate::core::constants::TILE_SIZE;
use crate::core::geo::{BoundingRegion, GeoPoint};
use crate::core::projection::{lat_lon_to_absolute_pixel, max_abspx, AbsolutePixel, TileIndex};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Latitude limit for region corners, a hair inside the Mercator cut-off so
/// the corner still truncates into the first/last pixel row at every zoom
const CORNER_LAT_LIMIT: f64 = 85.05;

/// Last longitude that still projects into the pyramid's eastern pixel column
const EAST_EDGE_LON: f64 = 180.0 - 1e-5;

/// Inclusive rectangle of absolute pixels at one zoom level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBounds {
    pub zoom: u8,
    pub min: AbsolutePixel,
    pub max: AbsolutePixel,
}

impl PixelBounds {
    /// Creates bounds from two corners in any order
    pub fn from_corners(zoom: u8, a: AbsolutePixel, b: AbsolutePixel) -> Self {
        Self {
            zoom,
            min: AbsolutePixel::new(a.x.min(b.x), a.y.min(b.y)),
            max: AbsolutePixel::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Number of pixels along x, inclusive
    pub fn count_x(&self) -> i64 {
        self.max.x - self.min.x + 1
    }

    /// Number of pixels along y, inclusive
    pub fn count_y(&self) -> i64 {
        self.max.y - self.min.y + 1
    }

    pub fn contains(&self, px: &AbsolutePixel) -> bool {
        px.x >= self.min.x && px.x <= self.max.x && px.y >= self.min.y && px.y <= self.max.y
    }

    /// Tiles covering these pixels
    pub fn to_tile_range(&self) -> TileRange {
        let min = self.min.to_tile(self.zoom);
        let max = self.max.to_tile(self.zoom);
        TileRange::new(self.zoom, min.x, min.y, max.x, max.y)
    }
}

/// Inclusive rectangle of tile indices at one zoom level.
///
/// A range crossing the antimeridian keeps counting columns past the east
/// edge, so `x_max` may exceed `2^zoom - 1`. [`TileRange::iter`] wraps those
/// columns back onto the pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTileRange")]
pub struct TileRange {
    pub zoom: u8,
    pub x_min: u32,
    pub y_min: u32,
    pub x_max: u32,
    pub y_max: u32,
}

#[derive(Deserialize)]
struct RawTileRange {
    zoom: u8,
    x_min: u32,
    y_min: u32,
    x_max: u32,
    y_max: u32,
}

impl From<RawTileRange> for TileRange {
    fn from(raw: RawTileRange) -> Self {
        TileRange::new(raw.zoom, raw.x_min, raw.y_min, raw.x_max, raw.y_max)
    }
}

impl TileRange {
    pub fn new(zoom: u8, x_min: u32, y_min: u32, x_max: u32, y_max: u32) -> Self {
        Self {
            zoom,
            x_min: x_min.min(x_max),
            y_min: y_min.min(y_max),
            x_max: x_min.max(x_max),
            y_max: y_min.max(y_max),
        }
    }

    /// A range holding exactly one tile
    pub fn single(tile: TileIndex) -> Self {
        Self::new(tile.zoom, tile.x, tile.y, tile.x, tile.y)
    }

    pub fn count_x(&self) -> u32 {
        self.x_max - self.x_min + 1
    }

    pub fn count_y(&self) -> u32 {
        self.y_max - self.y_min + 1
    }

    pub fn tile_count(&self) -> usize {
        self.count_x() as usize * self.count_y() as usize
    }

    /// Absolute pixel of the range's north-west corner, i.e. the origin of a
    /// raster stitched from these tiles
    pub fn origin(&self) -> AbsolutePixel {
        TileIndex::new(self.x_min, self.y_min, self.zoom).origin()
    }

    /// Width and height in pixels of the stitched raster
    pub fn pixel_size(&self) -> (u64, u64) {
        (
            self.count_x() as u64 * TILE_SIZE as u64,
            self.count_y() as u64 * TILE_SIZE as u64,
        )
    }

    /// Number of tile columns in the pyramid at this zoom
    fn columns(&self) -> u64 {
        1_u64 << self.zoom
    }

    /// True when columns run past the east edge of the pyramid
    pub fn wraps(&self) -> bool {
        self.x_max as u64 >= self.columns()
    }

    pub fn contains(&self, tile: &TileIndex) -> bool {
        if tile.zoom != self.zoom || tile.y < self.y_min || tile.y > self.y_max {
            return false;
        }
        let x = tile.x as u64;
        let (min, max) = (self.x_min as u64, self.x_max as u64);
        (x >= min && x <= max) || (x + self.columns() >= min && x + self.columns() <= max)
    }

    /// Tiles in raster order: row by row, west to east. Columns past the east
    /// edge come out wrapped modulo `2^zoom`.
    pub fn iter(&self) -> impl Iterator<Item = TileIndex> + '_ {
        let columns = self.columns();
        (self.y_min..=self.y_max).flat_map(move |y| {
            (self.x_min..=self.x_max)
                .map(move |x| TileIndex::new((x as u64 % columns) as u32, y, self.zoom))
        })
    }

    /// Position of an absolute pixel in the raster stitched from this range.
    /// Pixels west of `x_min` are taken one pyramid width further east, so a
    /// point just past the antimeridian lands inside a wrapping range.
    pub fn local_pixel(&self, px: &AbsolutePixel) -> (i64, i64) {
        let origin = self.origin();
        let mut x = px.x - origin.x;
        if x < 0 && self.wraps() {
            x += self.columns() as i64 * TILE_SIZE as i64;
        }
        (x, px.y - origin.y)
    }

    /// Tiles of this range overlapping the pixel rectangle `[left, left + width)
    /// × [top, top + height)` given in the range's local frame. The rectangle
    /// is clamped to the range; the result is never empty.
    pub fn window(&self, left: i64, top: i64, width: u32, height: u32) -> TileRange {
        let size = TILE_SIZE as i64;
        let last_x = self.count_x() as i64 - 1;
        let last_y = self.count_y() as i64 - 1;
        let right = left + width.max(1) as i64 - 1;
        let bottom = top + height.max(1) as i64 - 1;

        let c0 = left.div_euclid(size).clamp(0, last_x) as u32;
        let c1 = right.div_euclid(size).clamp(0, last_x) as u32;
        let r0 = top.div_euclid(size).clamp(0, last_y) as u32;
        let r1 = bottom.div_euclid(size).clamp(0, last_y) as u32;
        TileRange::new(
            self.zoom,
            self.x_min + c0,
            self.y_min + r0,
            self.x_min + c1,
            self.y_min + r1,
        )
    }
}

/// Pulls a region corner onto the square pyramid: polar latitudes are clamped
/// to the Mercator cut-off and the eastern edge stays in the last pixel column
/// rather than wrapping back to column zero.
fn clamp_to_pyramid(point: &GeoPoint) -> GeoPoint {
    let lat = point.lat.clamp(-CORNER_LAT_LIMIT, CORNER_LAT_LIMIT);
    let lon = if point.lon >= 180.0 {
        EAST_EDGE_LON
    } else {
        point.lon
    };
    GeoPoint::new(lat, lon)
}

/// Absolute pixel rectangle spanned by two corner coordinates
pub fn abspx_bounds(zoom: u8, corner_a: &GeoPoint, corner_b: &GeoPoint) -> Result<PixelBounds> {
    let a = clamp_to_pyramid(corner_a);
    let b = clamp_to_pyramid(corner_b);
    let px_a = lat_lon_to_absolute_pixel(zoom, a.lat, a.lon)?;
    let px_b = lat_lon_to_absolute_pixel(zoom, b.lat, b.lon)?;
    Ok(PixelBounds::from_corners(zoom, px_a, px_b))
}

/// Inclusive tile rectangle spanned by two corner coordinates
pub fn tile_index_bounds(zoom: u8, corner_a: &GeoPoint, corner_b: &GeoPoint) -> Result<TileRange> {
    Ok(abspx_bounds(zoom, corner_a, corner_b)?.to_tile_range())
}

/// Tile rectangle covering a bounding region.
///
/// A region crossing the antimeridian has its eastern corner moved one
/// pyramid width east, giving a contiguous range that wraps.
pub fn region_tile_bounds(zoom: u8, region: &BoundingRegion) -> Result<TileRange> {
    if !region.crosses_antimeridian() {
        return tile_index_bounds(zoom, &region.a, &region.b);
    }
    let west = clamp_to_pyramid(&region.a);
    let east = clamp_to_pyramid(&region.b);
    let px_west = lat_lon_to_absolute_pixel(zoom, west.lat, west.lon)?;
    let px_east = lat_lon_to_absolute_pixel(zoom, east.lat, east.lon)?;
    let shifted = AbsolutePixel::new(px_east.x + max_abspx(zoom)?, px_east.y);
    Ok(PixelBounds::from_corners(zoom, px_west, shifted).to_tile_range())
}
