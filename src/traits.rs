//! Collaborator traits
//!
//! The renderer never fetches anything itself. Tiles and icons are handed to
//! it through these traits so fetching, caching and retry policy stay with
//! the caller.

use crate::core::projection::TileIndex;
use crate::tiles::source::TileSource;
use image::RgbaImage;
use std::path::Path;
use std::sync::Arc;

/// Answers "give me the image for this tile, or nothing".
///
/// Returning `None` is a normal outcome: the tile renders as transparent.
/// Images are shared, so a lookup that keeps decoded tiles can hand out the
/// same buffer without copying it. Implementations shared across concurrent
/// renders must be safe for concurrent reads.
pub trait TileLookup: Send + Sync {
    fn tile(&self, source: &TileSource, tile: TileIndex) -> Option<Arc<RgbaImage>>;
}

/// Loads the compass icon.
pub trait IconLookup: Send + Sync {
    fn icon(&self, path: &Path) -> Option<RgbaImage>;
}

impl<T: TileLookup + ?Sized> TileLookup for Arc<T> {
    fn tile(&self, source: &TileSource, tile: TileIndex) -> Option<Arc<RgbaImage>> {
        (**self).tile(source, tile)
    }
}

impl<T: TileLookup + ?Sized> TileLookup for &T {
    fn tile(&self, source: &TileSource, tile: TileIndex) -> Option<Arc<RgbaImage>> {
        (**self).tile(source, tile)
    }
}

impl<T: IconLookup + ?Sized> IconLookup for Arc<T> {
    fn icon(&self, path: &Path) -> Option<RgbaImage> {
        (**self).icon(path)
    }
}
