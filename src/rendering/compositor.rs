//! Stitches tiles of a [`TileRange`] into one raster.

use crate::core::bounds::TileRange;
use crate::core::constants::TILE_SIZE;
use crate::tiles::source::TileSource;
use crate::traits::TileLookup;
use crate::{MapError, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Transparent raster the size of `range`
pub fn blank_raster(range: &TileRange) -> Result<RgbaImage> {
    let (width, height) = range.pixel_size();
    let too_large = || MapError::RasterTooLarge { width, height };
    let w = u32::try_from(width).map_err(|_| too_large())?;
    let h = u32::try_from(height).map_err(|_| too_large())?;
    // the buffer length is computed in usize, which may overflow on 32-bit
    if (w as usize).checked_mul(h as usize).and_then(|n| n.checked_mul(4)).is_none() {
        return Err(too_large());
    }
    Ok(RgbaImage::new(w, h))
}

/// Draws every tile of one source at its tile-aligned offset. Tiles the
/// lookup does not have stay transparent. In a range that wraps past the
/// antimeridian, tiles are placed by their column within the range, not by
/// their wrapped index.
pub fn compose_tiles<L>(range: &TileRange, source: &TileSource, lookup: &L) -> Result<RgbaImage>
where
    L: TileLookup + ?Sized,
{
    let mut raster = blank_raster(range)?;
    let mut missing = 0usize;

    let columns = range.count_x() as usize;
    for (i, tile) in range.iter().enumerate() {
        let Some(image) = lookup.tile(source, tile) else {
            missing += 1;
            continue;
        };
        let resized;
        let image: &RgbaImage = if image.dimensions() == (TILE_SIZE, TILE_SIZE) {
            &image
        } else {
            log::debug!(
                "resizing {}x{} tile {:?} to {}",
                image.width(),
                image.height(),
                tile,
                TILE_SIZE
            );
            resized = imageops::resize(image.as_ref(), TILE_SIZE, TILE_SIZE, FilterType::Triangle);
            &resized
        };
        let x = (i % columns) as i64 * TILE_SIZE as i64;
        let y = (i / columns) as i64 * TILE_SIZE as i64;
        imageops::replace(&mut raster, image, x, y);
    }

    if missing > 0 {
        log::debug!(
            "source {}: {} of {} tiles missing",
            source.id,
            missing,
            range.tile_count()
        );
    }
    Ok(raster)
}

/// Composites each source in order, later sources drawn on top
pub fn compose_layers<L>(range: &TileRange, sources: &[TileSource], lookup: &L) -> Result<RgbaImage>
where
    L: TileLookup + ?Sized,
{
    let mut layers = sources.iter();
    let Some(first) = layers.next() else {
        log::warn!("no tile sources configured, raster stays transparent");
        return blank_raster(range);
    };

    let mut raster = compose_tiles(range, first, lookup)?;
    for source in layers {
        let layer = compose_tiles(range, source, lookup)?;
        imageops::overlay(&mut raster, &layer, 0, 0);
    }
    Ok(raster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::projection::TileIndex;
    use crate::tiles::loader::MemoryTileLookup;
    use image::Rgba;

    fn source(id: u32) -> TileSource {
        TileSource::new(id, format!("Source {}", id), "https://example.com/{z}/{x}/{y}.png")
    }

    fn solid(color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(TILE_SIZE, TILE_SIZE, Rgba(color))
    }

    #[test]
    fn test_missing_tile_is_transparent() {
        let range = TileRange::single(TileIndex::new(3, 4, 5));
        let raster = compose_tiles(&range, &source(1), &MemoryTileLookup::new()).unwrap();
        assert_eq!(raster.dimensions(), (256, 256));
        assert!(raster.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_tiles_land_at_their_offsets() {
        let range = TileRange::new(4, 2, 3, 3, 4);
        let lookup = MemoryTileLookup::new()
            .with_tile(1, TileIndex::new(2, 3, 4), solid([255, 0, 0, 255]))
            .with_tile(1, TileIndex::new(3, 4, 4), solid([0, 0, 255, 255]));

        let raster = compose_tiles(&range, &source(1), &lookup).unwrap();
        assert_eq!(raster.dimensions(), (512, 512));
        assert_eq!(raster.get_pixel(10, 10), &Rgba([255, 0, 0, 255]));
        assert_eq!(raster.get_pixel(300, 300), &Rgba([0, 0, 255, 255]));
        // the two tiles never fetched
        assert_eq!(raster.get_pixel(300, 10).0[3], 0);
        assert_eq!(raster.get_pixel(10, 300).0[3], 0);
    }

    #[test]
    fn test_odd_sized_tiles_are_scaled() {
        let tile = TileIndex::new(0, 0, 0);
        let small = RgbaImage::from_pixel(64, 64, Rgba([9, 9, 9, 255]));
        let lookup = MemoryTileLookup::new().with_tile(1, tile, small);
        let raster = compose_tiles(&TileRange::single(tile), &source(1), &lookup).unwrap();
        let corner = raster.get_pixel(255, 255);
        assert!(corner.0[..3].iter().all(|c| c.abs_diff(9) <= 1));
        assert_eq!(corner.0[3], 255);
    }

    #[test]
    fn test_later_source_on_top() {
        let tile = TileIndex::new(1, 1, 1);
        let mut half = RgbaImage::new(TILE_SIZE, TILE_SIZE);
        for y in 0..TILE_SIZE / 2 {
            for x in 0..TILE_SIZE {
                half.put_pixel(x, y, Rgba([0, 255, 0, 255]));
            }
        }
        let lookup = MemoryTileLookup::new()
            .with_tile(1, tile, solid([255, 0, 0, 255]))
            .with_tile(2, tile, half);

        let range = TileRange::single(tile);
        let raster = compose_layers(&range, &[source(1), source(2)], &lookup).unwrap();
        assert_eq!(raster.get_pixel(5, 5), &Rgba([0, 255, 0, 255]));
        assert_eq!(raster.get_pixel(5, 200), &Rgba([255, 0, 0, 255]));

        let reversed = compose_layers(&range, &[source(2), source(1)], &lookup).unwrap();
        assert_eq!(reversed.get_pixel(5, 5), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_no_sources_gives_blank_raster() {
        let range = TileRange::new(2, 0, 0, 1, 0);
        let raster = compose_layers(&range, &[], &MemoryTileLookup::new()).unwrap();
        assert_eq!(raster.dimensions(), (512, 256));
        assert!(raster.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_raster_wider_than_u32_is_rejected() {
        // 2^24 columns of 256 px is 2^32 px wide
        let range = TileRange::new(24, 0, 0, (1 << 24) - 1, 0);
        assert!(matches!(
            blank_raster(&range),
            Err(MapError::RasterTooLarge { width, height: 256 }) if width == 1 << 32
        ));
    }

    #[test]
    fn test_wrapped_range_keeps_column_order() {
        // columns 3, 4 at zoom 2 are tiles x = 3 and x = 0
        let range = TileRange::new(2, 3, 1, 4, 1);
        assert!(range.wraps());
        let lookup = MemoryTileLookup::new()
            .with_tile(1, TileIndex::new(3, 1, 2), solid([255, 0, 0, 255]))
            .with_tile(1, TileIndex::new(0, 1, 2), solid([0, 0, 255, 255]));

        let raster = compose_tiles(&range, &source(1), &lookup).unwrap();
        assert_eq!(raster.dimensions(), (512, 256));
        assert_eq!(raster.get_pixel(10, 10), &Rgba([255, 0, 0, 255]));
        assert_eq!(raster.get_pixel(300, 10), &Rgba([0, 0, 255, 255]));
    }
}
