//! # maprender
//!
//! Projection math and tile composition for rendering an oriented map image
//! from a Web-Mercator tile pyramid.
//!
//! Given a set of geographic points the library picks a zoom level, works out
//! which tiles cover the region, stitches the tiles it is handed into one
//! raster, then rotates and crops that raster to the requested output size and
//! heading. Fetching tiles is left to the caller through [`TileLookup`].

pub mod core;
pub mod prelude;
pub mod rendering;
pub mod tiles;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    bounds::{PixelBounds, TileRange},
    config::{CompassOverlay, DownloadSettings, RenderConfig},
    geo::{BoundingRegion, GeoPoint, LatLonDelta, UnitVector},
    projection::{AbsolutePixel, TileIndex},
    viewport::{OutputViewport, ResolvedRegion, TilePlan},
    zoom::ZoomSelection,
};

pub use crate::rendering::{
    context::{RenderContext, RenderRequest},
    pipeline::{RenderPipeline, RenderedMap},
};

pub use crate::tiles::{
    cache::TileCache,
    loader::{DirectoryTileLookup, FileIconLookup, MemoryTileLookup},
    source::TileSource,
};

pub use crate::traits::{IconLookup, TileLookup};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Invalid zoom level {zoom}: must be within 0..={max}", max = crate::constants::MAX_ZOOM)]
    InvalidZoom { zoom: u8 },

    #[error("Pixel ({x}, {y}) outside of valid range at zoom {zoom}")]
    OutOfRange { zoom: u8, x: f64, y: f64 },

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Invalid distance: radius {radius_km} km on sphere of radius {sphere_radius}")]
    InvalidDistance { radius_km: f64, sphere_radius: f64 },

    #[error("Invalid render request: {0}")]
    InvalidRequest(String),

    #[error("Raster {width}x{height} does not fit in one image buffer")]
    RasterTooLarge { width: u64, height: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = MapError;
