//! Core constants of the Web-Mercator tile pyramid and the spherical earth model.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Highest supported zoom level. `TILE_SIZE * 2^MAX_ZOOM` must stay well inside
/// the integer range used for absolute pixels, and most tile sources stop below it.
pub const MAX_ZOOM: u8 = 20;

/// Mean earth radius used for great-circle distances and bounding regions.
pub const EARTH_RADIUS_KM: f64 = 6371.03;

/// Latitude at which the square Web-Mercator pyramid is cut off.
pub const MAX_MERCATOR_LAT: f64 = 85.0511287798;

/// Side factor applied to the output diagonal so the padding square still
/// contains the output rectangle after a 45° rotation.
pub const ROTATION_PADDING: f64 = 2.0 * std::f64::consts::SQRT_2;

/// Fractional pixel distance under which a projected coordinate snaps to the
/// nearest integer instead of being truncated.
pub(crate) const PIXEL_SNAP_EPSILON: f64 = 1e-6;

/// Default radius (km) used when a render covers a single point.
pub const DEFAULT_RADIUS_KM: f64 = 1.0;
