//! Prelude module for common maprender types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use maprender::prelude::*;`

pub use crate::core::{
    bounds::{abspx_bounds, tile_index_bounds, PixelBounds, TileRange},
    config::{CompassOverlay, DownloadSettings, RenderConfig},
    constants::{EARTH_RADIUS_KM, MAX_ZOOM, TILE_SIZE},
    geo::{
        bounding_region, great_circle_distance, max_radius_from_center, spherical_centroid,
        BoundingRegion, GeoPoint, LatLonDelta,
    },
    projection::{
        absolute_pixel_to_lat_lon, lat_lon_to_absolute_pixel, lat_lon_to_tile, max_abspx,
        tile_to_lat_lon, AbsolutePixel, TileIndex,
    },
    viewport::{OutputViewport, ResolvedRegion, TilePlan},
    zoom::{select_zoom_level, ZoomSelection},
};

pub use crate::rendering::{RenderContext, RenderPipeline, RenderRequest, RenderedMap};

pub use crate::tiles::{DirectoryTileLookup, FileIconLookup, MemoryTileLookup, TileCache, TileSource};

pub use crate::traits::{IconLookup, TileLookup};

pub use crate::{Error as MapError, Result};

pub use std::sync::Arc;
