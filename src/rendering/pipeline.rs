use crate::core::config::RenderConfig;
use crate::core::viewport::OutputViewport;
use crate::rendering::compass::overlay_compass;
use crate::rendering::compositor::compose_layers;
use crate::rendering::context::{RenderContext, RenderRequest};
use crate::rendering::orientation::orient;
use crate::tiles::loader::FileIconLookup;
use crate::traits::{IconLookup, TileLookup};
use crate::Result;
use image::RgbaImage;
use std::sync::Arc;

/// Output of one render
#[derive(Debug, Clone)]
pub struct RenderedMap {
    pub image: RgbaImage,
    /// Maps pixels of `image` back to coordinates and vice versa
    pub viewport: OutputViewport,
}

/// Resolves the region, stitches tiles, orients the result and draws the
/// compass. Holds no per-render state, so one pipeline can serve concurrent
/// renders.
#[derive(Clone)]
pub struct RenderPipeline {
    config: RenderConfig,
    tiles: Arc<dyn TileLookup>,
    icons: Arc<dyn IconLookup>,
}

impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RenderPipeline {
    pub fn new(config: RenderConfig, tiles: Arc<dyn TileLookup>) -> Self {
        Self {
            config,
            tiles,
            icons: Arc::new(FileIconLookup),
        }
    }

    pub fn with_icon_lookup(mut self, icons: Arc<dyn IconLookup>) -> Self {
        self.icons = icons;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Geometry for a request without drawing anything
    pub fn prepare(&self, request: &RenderRequest) -> Result<RenderContext> {
        RenderContext::new(request.clone(), self.config.default_radius_km)
    }

    pub fn render(&self, request: &RenderRequest) -> Result<RenderedMap> {
        let context = self.prepare(request)?;
        self.render_context(&context)
    }

    /// Draws a prepared context
    pub fn render_context(&self, context: &RenderContext) -> Result<RenderedMap> {
        let request = &context.request;
        let (window, center) = context.window();
        log::debug!(
            "stitching {} of {} planned tile(s)",
            window.tile_count(),
            context.plan.range.tile_count()
        );
        let raster = compose_layers(&window, &self.config.sources, self.tiles.as_ref())?;
        let mut image = orient(
            &raster,
            center,
            request.width,
            request.height,
            request.heading,
        );

        if let Some(compass) = &self.config.compass {
            match self.icons.icon(&compass.icon) {
                Some(icon) => overlay_compass(
                    &mut image,
                    &icon,
                    compass.size,
                    compass.position,
                    request.heading,
                ),
                None => log::warn!("compass icon {} unavailable", compass.icon.display()),
            }
        }

        log::info!(
            "rendered {}x{} at zoom {} from {} tile(s)",
            request.width,
            request.height,
            context.zoom(),
            context.plan.range.tile_count()
        );
        Ok(RenderedMap {
            image,
            viewport: context.viewport(),
        })
    }
}
