use crate::core::projection::TileIndex;
use crate::tiles::source::TileSource;
use crate::traits::{IconLookup, TileLookup};
use image::RgbaImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Reads tiles a downloader has already written into a folder, named by
/// [`TileSource::filename`].
#[derive(Debug, Clone)]
pub struct DirectoryTileLookup {
    root: PathBuf,
}

impl DirectoryTileLookup {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the tile is expected on disk
    pub fn tile_path(&self, source: &TileSource, tile: TileIndex) -> PathBuf {
        self.root.join(source.filename(tile))
    }
}

impl TileLookup for DirectoryTileLookup {
    fn tile(&self, source: &TileSource, tile: TileIndex) -> Option<Arc<RgbaImage>> {
        let path = self.tile_path(source, tile);
        if !path.is_file() {
            log::trace!("tile {:?} of source {} not on disk", tile, source.id);
            return None;
        }
        match image::open(&path) {
            Ok(img) => Some(Arc::new(img.to_rgba8())),
            Err(e) => {
                log::warn!("unreadable tile file {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Tiles already decoded in memory, keyed by source id and tile index
#[derive(Debug, Clone, Default)]
pub struct MemoryTileLookup {
    tiles: HashMap<(u32, TileIndex), Arc<RgbaImage>>,
}

impl MemoryTileLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source_id: u32, tile: TileIndex, image: RgbaImage) {
        self.tiles.insert((source_id, tile), Arc::new(image));
    }

    pub fn with_tile(mut self, source_id: u32, tile: TileIndex, image: RgbaImage) -> Self {
        self.insert(source_id, tile, image);
        self
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl TileLookup for MemoryTileLookup {
    fn tile(&self, source: &TileSource, tile: TileIndex) -> Option<Arc<RgbaImage>> {
        self.tiles.get(&(source.id, tile)).cloned()
    }
}

/// Loads icons straight from the filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileIconLookup;

impl IconLookup for FileIconLookup {
    fn icon(&self, path: &Path) -> Option<RgbaImage> {
        if !path.is_file() {
            log::warn!("compass icon {} not found", path.display());
            return None;
        }
        match image::open(path) {
            Ok(img) => Some(img.to_rgba8()),
            Err(e) => {
                log::warn!("unreadable compass icon {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn source() -> TileSource {
        TileSource::new(3, "Test", "https://example.com/{z}/{x}/{y}.png")
    }

    #[test]
    fn test_directory_lookup_reads_saved_tile() {
        let dir = tempfile::tempdir().unwrap();
        let lookup = DirectoryTileLookup::new(dir.path());
        let tile = TileIndex::new(65, 95, 8);
        let img = RgbaImage::from_pixel(256, 256, Rgba([10, 20, 30, 255]));
        img.save(lookup.tile_path(&source(), tile)).unwrap();

        let loaded = lookup.tile(&source(), tile).unwrap();
        assert_eq!(loaded.dimensions(), (256, 256));
        assert_eq!(loaded.get_pixel(100, 100), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_directory_lookup_missing_and_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let lookup = DirectoryTileLookup::new(dir.path());
        let tile = TileIndex::new(1, 1, 2);
        assert!(lookup.tile(&source(), tile).is_none());

        std::fs::write(lookup.tile_path(&source(), tile), b"not a png").unwrap();
        assert!(lookup.tile(&source(), tile).is_none());
    }

    #[test]
    fn test_memory_lookup_is_keyed_by_source() {
        let tile = TileIndex::new(0, 0, 0);
        let lookup = MemoryTileLookup::new().with_tile(3, tile, RgbaImage::new(256, 256));
        assert_eq!(lookup.len(), 1);
        assert!(lookup.tile(&source(), tile).is_some());

        let other = TileSource::new(4, "Other", "https://example.com/{z}/{x}/{y}.png");
        assert!(lookup.tile(&other, tile).is_none());
    }

    #[test]
    fn test_file_icon_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compass.png");
        assert!(FileIconLookup.icon(&path).is_none());

        RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();
        assert_eq!(FileIconLookup.icon(&path).unwrap().dimensions(), (16, 16));
    }
}
