use image::{Rgba, RgbaImage};
use maprender::prelude::*;

/// Renders a rotated map without any network access.
///
/// Usage: `headless [TILE_DIR] [OUTPUT_PNG]`, with an optional JSON
/// configuration named by `MAPRENDER_CONFIG`. Without a tile directory a
/// checkerboard is generated in memory so the output still shows the layout.
fn main() -> maprender::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let tile_dir = args.next();
    let output = args.next().unwrap_or_else(|| "headless.png".to_string());

    println!("🗺️ maprender Headless Example");
    println!("=============================");

    let config = match std::env::var("MAPRENDER_CONFIG") {
        Ok(path) => {
            println!("⚙️ Loading configuration from {}", path);
            RenderConfig::from_json_file(path)?
        }
        Err(_) => RenderConfig::default().with_source(TileSource::openstreetmap(1)),
    };
    let request = RenderRequest::new(800, 600)
        .with_heading(30.0)
        .with_point(GeoPoint::new(41.85, -87.65))
        .with_default_radius(5.0);

    let planner = RenderPipeline::new(config.clone(), Arc::new(MemoryTileLookup::new()));
    let context = planner.prepare(&request)?;
    println!("✅ Region resolved:");
    println!(
        "   Center: {:.4}, {:.4}",
        context.region.center.lat, context.region.center.lon
    );
    println!("   Radius: {:.2} km", context.region.radius_km);
    println!(
        "   Zoom: {} ({} tiles)",
        context.zoom(),
        context.plan.range.tile_count()
    );

    let tiles: Arc<dyn TileLookup> = match tile_dir {
        Some(dir) => {
            println!("📂 Reading tiles from {}", dir);
            Arc::new(TileCache::with_default_capacity(DirectoryTileLookup::new(dir)))
        }
        None => {
            println!("🏁 No tile directory given, using a checkerboard");
            let ids: Vec<u32> = config.sources.iter().map(|s| s.id).collect();
            Arc::new(checkerboard(&context.plan.range, &ids))
        }
    };

    let pipeline = RenderPipeline::new(config, tiles);
    let map = pipeline.render(&request)?;
    map.image.save(&output)?;
    println!("💾 Saved {}x{} image to {}", map.image.width(), map.image.height(), output);

    println!("\n🎯 Output corners:");
    let (w, h) = (map.viewport.width as i64, map.viewport.height as i64);
    for (name, x, y) in [
        ("top-left", 0, 0),
        ("top-right", w - 1, 0),
        ("bottom-left", 0, h - 1),
        ("bottom-right", w - 1, h - 1),
    ] {
        let p = map.viewport.pixel_to_lat_lon(x, y)?;
        println!("   📍 {:<12} {:.5}, {:.5}", name, p.lat, p.lon);
    }

    Ok(())
}

fn checkerboard(range: &TileRange, source_ids: &[u32]) -> MemoryTileLookup {
    let mut lookup = MemoryTileLookup::new();
    for &id in source_ids {
        for tile in range.iter() {
            let shade = if (tile.x + tile.y) % 2 == 0 { 200 } else { 90 };
            let color = Rgba([shade, shade, 255 - shade, 255]);
            lookup.insert(id, tile, RgbaImage::from_pixel(TILE_SIZE, TILE_SIZE, color));
        }
    }
    lookup
}
