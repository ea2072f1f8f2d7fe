pub mod compass;
pub mod compositor;
pub mod context;
pub mod orientation;
pub mod pipeline;

// Re-export main types
pub use compass::overlay_compass;
pub use compositor::{compose_layers, compose_tiles};
pub use context::{RenderContext, RenderRequest};
pub use orientation::orient;
pub use pipeline::{RenderPipeline, RenderedMap};
