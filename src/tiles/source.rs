use crate::core::projection::TileIndex;
use serde::{Deserialize, Serialize};

/// One entry of a tile-source catalog: how to address a tile by URL for the
/// downloader and by filename once it sits on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSource {
    pub id: u32,
    pub name: String,
    /// Free-form category, e.g. "Satellite" or "Streets"
    #[serde(default)]
    pub kind: String,
    /// URL with `{z}`, `{x}`, `{y}` and optional `{s}` placeholders
    pub url_template: String,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default)]
    pub subdomains: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_extension() -> String {
    "png".to_string()
}

impl TileSource {
    pub fn new(id: u32, name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: String::new(),
            url_template: url_template.into(),
            extension: default_extension(),
            subdomains: Vec::new(),
            notes: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_subdomains<I, S>(mut self, subdomains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subdomains = subdomains.into_iter().map(Into::into).collect();
        self
    }

    /// Default OpenStreetMap tile server
    pub fn openstreetmap(id: u32) -> Self {
        Self::new(
            id,
            "OpenStreetMap",
            "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
        )
        .with_kind("Streets")
        .with_subdomains(["a", "b", "c"])
    }

    /// Build a URL for the requested `tile`.
    pub fn url(&self, tile: TileIndex) -> String {
        let subdomain = if self.subdomains.is_empty() {
            ""
        } else {
            let idx = ((tile.x as u64 + tile.y as u64) % self.subdomains.len() as u64) as usize;
            self.subdomains[idx].as_str()
        };
        self.url_template
            .replace("{s}", subdomain)
            .replace("{z}", &tile.zoom.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }

    /// Name of the tile's file inside a download folder
    pub fn filename(&self, tile: TileIndex) -> String {
        format!(
            "{}_{}_{}_{}.{}",
            self.id, tile.x, tile.y, tile.zoom, self.extension
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_substitution() {
        let source = TileSource::new(1, "Test", "https://example.com/{z}/{x}/{y}.jpg");
        assert_eq!(
            source.url(TileIndex::new(65, 95, 8)),
            "https://example.com/8/65/95.jpg"
        );
    }

    #[test]
    fn test_subdomain_rotation() {
        let source = TileSource::openstreetmap(0);
        assert_eq!(
            source.url(TileIndex::new(0, 0, 1)),
            "https://a.tile.openstreetmap.org/1/0/0.png"
        );
        assert_eq!(
            source.url(TileIndex::new(1, 0, 1)),
            "https://b.tile.openstreetmap.org/1/1/0.png"
        );
        assert_eq!(
            source.url(TileIndex::new(1, 1, 1)),
            "https://c.tile.openstreetmap.org/1/1/1.png"
        );
    }

    #[test]
    fn test_filename() {
        let source = TileSource::new(9090, "Sat", "https://example.com/{z}/{x}/{y}").with_extension("jpg");
        assert_eq!(source.filename(TileIndex::new(3, 4, 5)), "9090_3_4_5.jpg");
    }

    #[test]
    fn test_catalog_entry_defaults() {
        let source: TileSource = serde_json::from_str(
            r#"{ "id": 2, "name": "Test Source", "url_template": "https://t/{z}/{x}/{y}" }"#,
        )
        .unwrap();
        assert_eq!(source.extension, "png");
        assert!(source.subdomains.is_empty());
        assert!(source.notes.is_none());
    }
}
