use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

/// Represents a geographical coordinate with latitude and longitude in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Creates a new GeoPoint coordinate
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Validates that the coordinates are finite, off the poles and within
    /// the longitude range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && self.lat > -90.0
            && self.lat < 90.0
            && self.lon >= -180.0
            && self.lon <= 180.0
    }

    /// Wraps longitude to the [-180, 180) range
    pub fn wrap_lon(lon: f64) -> f64 {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }

    /// Returns the same point with its longitude wrapped to [-180, 180)
    pub fn normalized(&self) -> Self {
        Self::new(self.lat, Self::wrap_lon(self.lon))
    }

    /// Converts to a unit vector on the sphere
    pub fn to_unit_vector(&self) -> UnitVector {
        geo_to_unit_vector(self.lat, self.lon)
    }

    /// Great-circle distance to another point, in the units of `sphere_radius`
    pub fn distance_to(&self, other: &GeoPoint, sphere_radius: f64) -> f64 {
        great_circle_distance(self, other, sphere_radius)
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self::new(lat, lon)
    }
}

/// Cartesian vector on the unit sphere. Only used as a computational basis
/// for averaging coordinates; the vector need not be normalized when
/// converted back since only its direction matters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UnitVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl UnitVector {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn to_geo(&self) -> GeoPoint {
        unit_vector_to_geo(self.x, self.y, self.z)
    }
}

/// Absolute latitude/longitude difference, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLonDelta {
    pub lat: f64,
    pub lon: f64,
}

impl LatLonDelta {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Opposite corners of a lat/lon box.
///
/// `a` holds the southern/western values and `b` the northern/eastern ones.
/// When the box crosses the antimeridian `a.lon > b.lon`; when it reaches a
/// pole the latitude is clamped to ±90° and the longitude spans the full
/// [-180, 180] range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingRegion {
    pub a: GeoPoint,
    pub b: GeoPoint,
}

impl BoundingRegion {
    pub fn new(a: GeoPoint, b: GeoPoint) -> Self {
        Self { a, b }
    }

    /// Creates a region from individual coordinates
    pub fn from_coords(a_lat: f64, a_lon: f64, b_lat: f64, b_lon: f64) -> Self {
        Self::new(GeoPoint::new(a_lat, a_lon), GeoPoint::new(b_lat, b_lon))
    }

    /// Smallest lat/lon box containing the spherical cap around `center`
    pub fn around(center: &GeoPoint, radius_km: f64, sphere_radius: f64) -> Result<Self> {
        bounding_region(center, radius_km, sphere_radius)
    }

    /// True when the box wraps across the ±180° meridian
    pub fn crosses_antimeridian(&self) -> bool {
        self.a.lon > self.b.lon
    }

    /// True when the box degenerated into a full-longitude latitude band
    pub fn is_lat_band(&self) -> bool {
        self.a.lon <= -180.0 && self.b.lon >= 180.0
    }

    /// Checks if the region contains a point, honouring antimeridian wrap
    pub fn contains(&self, point: &GeoPoint) -> bool {
        if point.lat < self.a.lat || point.lat > self.b.lat {
            return false;
        }
        if self.crosses_antimeridian() {
            point.lon >= self.a.lon || point.lon <= self.b.lon
        } else {
            point.lon >= self.a.lon && point.lon <= self.b.lon
        }
    }
}

/// Converts geographic degrees to a unit cartesian vector
pub fn geo_to_unit_vector(lat: f64, lon: f64) -> UnitVector {
    let rad_lat = lat.to_radians();
    let rad_lon = lon.to_radians();
    UnitVector::new(
        rad_lat.cos() * rad_lon.cos(),
        rad_lat.cos() * rad_lon.sin(),
        rad_lat.sin(),
    )
}

/// Converts a cartesian vector (of any magnitude) back to geographic degrees
pub fn unit_vector_to_geo(x: f64, y: f64, z: f64) -> GeoPoint {
    let rad_lon = y.atan2(x);
    let hyp = (x * x + y * y).sqrt();
    let rad_lat = z.atan2(hyp);
    GeoPoint::new(rad_lat.to_degrees(), rad_lon.to_degrees())
}

/// Approximate center of a point set on the sphere.
///
/// Every point is turned into a unit vector, the vectors are averaged
/// component-wise and the (non-unit) mean is converted back to degrees.
/// This is not a geodesic centroid: for widely dispersed or near-antipodal
/// points the mean vector approaches zero length and the resulting
/// latitude/longitude become numerically unstable.
///
/// Returns `None` for an empty point set.
pub fn spherical_centroid(points: &[GeoPoint]) -> Option<GeoPoint> {
    if points.is_empty() {
        return None;
    }
    let mut sum = UnitVector::default();
    for point in points {
        let v = point.to_unit_vector();
        sum.x += v.x;
        sum.y += v.y;
        sum.z += v.z;
    }
    let len = points.len() as f64;
    Some(unit_vector_to_geo(sum.x / len, sum.y / len, sum.z / len))
}

/// Arc distance between two points on a sphere (spherical law of cosines),
/// in the same units as `sphere_radius`
pub fn great_circle_distance(a: &GeoPoint, b: &GeoPoint, sphere_radius: f64) -> f64 {
    let rad_a_lat = a.lat.to_radians();
    let rad_b_lat = b.lat.to_radians();
    let delta_lon = (a.lon - b.lon).to_radians();
    let cos_angle = rad_a_lat.sin() * rad_b_lat.sin()
        + rad_a_lat.cos() * rad_b_lat.cos() * delta_lon.cos();
    // rounding can push identical points just past 1.0
    cos_angle.clamp(-1.0, 1.0).acos() * sphere_radius
}

/// Largest great-circle distance from `center` to any of `points`
pub fn max_radius_from_center(center: &GeoPoint, points: &[GeoPoint], sphere_radius: f64) -> f64 {
    points
        .iter()
        .map(|p| great_circle_distance(center, p, sphere_radius))
        .fold(0.0, f64::max)
}

/// Lat/lon box containing the spherical cap of `radius_km` around `center`.
///
/// If the cap stays clear of both poles the longitude half-width is
/// `asin(sin(d) / cos(lat))` and each side wraps back into [-180, 180] on
/// overflow. If the cap reaches a pole the latitude is clamped to [-90, 90]
/// and the longitude spans the whole range.
pub fn bounding_region(
    center: &GeoPoint,
    radius_km: f64,
    sphere_radius: f64,
) -> Result<BoundingRegion> {
    if radius_km < 0.0 || sphere_radius < 0.0 || radius_km.is_nan() || sphere_radius.is_nan() {
        return Err(MapError::InvalidDistance {
            radius_km,
            sphere_radius,
        });
    }

    let rad_lat = center.lat.to_radians();
    let rad_lon = center.lon.to_radians();
    let rad_dist = radius_km / sphere_radius;

    let mut a_lat = rad_lat - rad_dist;
    let mut b_lat = rad_lat + rad_dist;
    let (a_lon, b_lon);

    if a_lat > -FRAC_PI_2 && b_lat < FRAC_PI_2 {
        let delta_lon = (rad_dist.sin() / rad_lat.cos()).asin();
        let mut min_lon = rad_lon - delta_lon;
        if min_lon < -PI {
            min_lon += 2.0 * PI;
        }
        let mut max_lon = rad_lon + delta_lon;
        if max_lon > PI {
            max_lon -= 2.0 * PI;
        }
        a_lon = min_lon;
        b_lon = max_lon;
    } else {
        a_lat = a_lat.max(-FRAC_PI_2);
        b_lat = b_lat.min(FRAC_PI_2);
        a_lon = -PI;
        b_lon = PI;
    }

    Ok(BoundingRegion::from_coords(
        a_lat.to_degrees(),
        a_lon.to_degrees(),
        b_lat.to_degrees(),
        b_lon.to_degrees(),
    ))
}
