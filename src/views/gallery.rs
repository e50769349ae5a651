use serde::Serialize;
use tera::{Context, Tera};

use crate::models::image::StoredImage;
use crate::storage::ImageStore;

/// Gallery layout; chosen per request and never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    /// Unknown or missing values fall back to the grid.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("list") => ViewMode::List,
            _ => ViewMode::Grid,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Grid => ViewMode::List,
            ViewMode::List => ViewMode::Grid,
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct GalleryItem {
    pub id: String,
    pub url: String,
    pub download_url: String,
    pub label: String,
}

pub fn gallery_items(store: &dyn ImageStore, images: Vec<StoredImage>) -> Vec<GalleryItem> {
    images
        .into_iter()
        .enumerate()
        .map(|(index, image)| GalleryItem {
            id: format!("preview-{}", index),
            download_url: store.download_url(&image.url),
            label: label_for(&image.url),
            url: image.url,
        })
        .collect()
}

fn label_for(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(path)
        .to_string()
}

/// Renders the gallery; `notice` is shown when the listing failed.
pub fn render_gallery(
    tera: &Tera,
    items: &[GalleryItem],
    mode: ViewMode,
    notice: Option<&str>,
) -> Result<String, tera::Error> {
    let mut context = Context::new();
    context.insert("items", items);
    context.insert("mode", &mode);
    context.insert("toggle", &mode.toggled());
    context.insert("notice", &notice);
    tera.render("gallery.html", &context)
}
