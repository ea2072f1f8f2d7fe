use crate::core::projection::TileIndex;
use crate::tiles::source::TileSource;
use crate::traits::TileLookup;
use image::RgbaImage;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

type CacheKey = (u32, TileIndex);

/// In-memory cache of decoded tiles using LRU eviction, wrapped around
/// another lookup. Misses are forwarded and never cached, so a tile that
/// shows up later is picked up on the next render. Hits hand out the cached
/// buffer itself.
#[derive(Debug)]
pub struct TileCache<L> {
    inner: L,
    cache: Arc<Mutex<LruCache<CacheKey, Arc<RgbaImage>>>>,
}

impl<L: TileLookup> TileCache<L> {
    /// Create a new tile cache with the given capacity
    pub fn new(inner: L, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Create a new tile cache with default capacity (256 tiles)
    pub fn with_default_capacity(inner: L) -> Self {
        Self::new(inner, 256)
    }

    /// Get a cached tile without touching the wrapped lookup
    pub fn get(&self, source_id: u32, tile: &TileIndex) -> Option<Arc<RgbaImage>> {
        self.cache.lock().ok()?.get(&(source_id, *tile)).cloned()
    }

    /// Check if a tile is in the cache
    pub fn contains(&self, source_id: u32, tile: &TileIndex) -> bool {
        self.cache
            .lock()
            .ok()
            .map(|cache| cache.contains(&(source_id, *tile)))
            .unwrap_or(false)
    }

    /// Clear all tiles from the cache
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    /// Get the current number of cached tiles
    pub fn len(&self) -> usize {
        self.cache.lock().ok().map(|cache| cache.len()).unwrap_or(0)
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.cache
            .lock()
            .ok()
            .map(|cache| cache.cap().get())
            .unwrap_or(0)
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<L: TileLookup> TileLookup for TileCache<L> {
    fn tile(&self, source: &TileSource, tile: TileIndex) -> Option<Arc<RgbaImage>> {
        if let Some(hit) = self.get(source.id, &tile) {
            log::trace!("tile cache hit {:?}", tile);
            return Some(hit);
        }
        // the lock is not held across the inner lookup, which may be slow
        let image = self.inner.tile(source, tile)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.put((source.id, tile), Arc::clone(&image));
        }
        Some(image)
    }
}
