use crate::core::bounds::TileRange;
use crate::core::constants::TILE_SIZE;
use crate::core::geo::GeoPoint;
use crate::core::projection::{lat_lon_to_absolute_pixel, AbsolutePixel};
use crate::core::viewport::{diagonal_px, OutputViewport, ResolvedRegion, TilePlan};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// One render call: output size, heading and the points to cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub width: u32,
    pub height: u32,
    /// Degrees, positive counter-clockwise
    #[serde(default)]
    pub heading: f64,
    pub points: Vec<GeoPoint>,
    /// Radius around a single point. Falls back to the configured default.
    #[serde(default)]
    pub default_radius_km: Option<f64>,
}

impl RenderRequest {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            heading: 0.0,
            points: Vec::new(),
            default_radius_km: None,
        }
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = heading;
        self
    }

    pub fn with_point(mut self, point: GeoPoint) -> Self {
        self.points.push(point);
        self
    }

    pub fn with_points(mut self, points: impl IntoIterator<Item = GeoPoint>) -> Self {
        self.points.extend(points);
        self
    }

    pub fn with_default_radius(mut self, radius_km: f64) -> Self {
        self.default_radius_km = Some(radius_km);
        self
    }

    /// Rejects requests no render can satisfy
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MapError::InvalidRequest(format!(
                "output size {}x{} must be positive",
                self.width, self.height
            )));
        }
        if !self.heading.is_finite() {
            return Err(MapError::InvalidRequest(format!(
                "heading {} is not finite",
                self.heading
            )));
        }
        if self.points.is_empty() {
            return Err(MapError::InvalidRequest(
                "at least one point is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Geometry worked out for one request before any pixel is drawn
#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    pub request: RenderRequest,
    pub region: ResolvedRegion,
    pub plan: TilePlan,
    /// Absolute pixel of the region center at the chosen zoom
    pub center_px: AbsolutePixel,
}

impl RenderContext {
    pub fn new(request: RenderRequest, fallback_radius_km: f64) -> Result<Self> {
        request.validate()?;
        let radius = request.default_radius_km.unwrap_or(fallback_radius_km);
        let region = ResolvedRegion::resolve(&request.points, radius)?;
        let plan = region.plan(request.width, request.height)?;
        let center_px =
            lat_lon_to_absolute_pixel(plan.zoom.zoom, region.center.lat, region.center.lon)?;
        Ok(Self {
            request,
            region,
            plan,
            center_px,
        })
    }

    pub fn zoom(&self) -> u8 {
        self.plan.zoom.zoom
    }

    /// Region center in the frame of the stitched raster, whose origin is
    /// the top-left corner of the first tile
    pub fn center_in_raster(&self) -> (i64, i64) {
        self.plan.range.local_pixel(&self.center_px)
    }

    /// The part of the planned range the orientation square touches, and the
    /// center in that window's frame.
    ///
    /// Stitching only these tiles gives the same output as stitching the
    /// whole range, since everything outside the square is cropped away.
    pub fn window(&self) -> (TileRange, (i64, i64)) {
        let side = diagonal_px(self.request.width, self.request.height);
        let (cx, cy) = self.center_in_raster();
        let left = cx - side / 2;
        let top = cy - side / 2;
        let window = self.plan.range.window(left, top, side as u32, side as u32);

        let size = TILE_SIZE as i64;
        let dx = (window.x_min - self.plan.range.x_min) as i64 * size;
        let dy = (window.y_min - self.plan.range.y_min) as i64 * size;
        (window, (cx - dx, cy - dy))
    }

    pub fn viewport(&self) -> OutputViewport {
        OutputViewport::new(
            self.zoom(),
            self.region.center,
            self.request.width,
            self.request.height,
            self.request.heading,
        )
    }
}
