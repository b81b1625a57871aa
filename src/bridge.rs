//! Interfaces to the collaborators that live outside the editor core: the
//! image generation backend, local image processing and project storage.
//!
//! Implementations are supplied by the host. The editor only consumes their
//! finished results, see `EditorContext::apply_image_result`.

use std::io::Cursor;
use std::sync::Arc;

use egui::{Pos2, Vec2, vec2};
use futures::future::BoxFuture;
use thiserror::Error;

use crate::error::EditorError;
use crate::layer::{ImageSource, LayerId};
use crate::state::DocumentSnapshot;
use crate::tools::BrushMode;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Backend request failed: {0}")]
    Backend(String),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request was cancelled")]
    Cancelled,

    #[error("Result could not be applied: {0}")]
    Rejected(#[from] EditorError),
}

pub type BridgeResult<T> = Result<T, BridgeError>;
pub type BridgeFuture<'a, T> = BoxFuture<'a, BridgeResult<T>>;

/// Encoded image bytes exchanged with the bridges.
#[derive(Clone, PartialEq)]
pub struct ImageData {
    bytes: Arc<[u8]>,
}

impl std::fmt::Debug for ImageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ImageData(<{} bytes>)", self.bytes.len())
    }
}

impl ImageData {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self { bytes: bytes.into() }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Natural pixel size read from the encoded header.
    pub fn dimensions(&self) -> BridgeResult<Vec2> {
        let (width, height) = image::ImageReader::new(Cursor::new(&self.bytes[..]))
            .with_guessed_format()?
            .into_dimensions()?;
        Ok(vec2(width as f32, height as f32))
    }

    pub fn to_source(&self) -> ImageSource {
        ImageSource::Encoded(Arc::clone(&self.bytes))
    }
}

/// Points of a finished brush stroke used as a processing mask.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeMask {
    /// The image layer the stroke was drawn over, if any.
    pub target: Option<LayerId>,
    /// Logical canvas coordinates.
    pub points: Vec<Pos2>,
    pub brush_size: f32,
    pub mode: BrushMode,
}

/// Where a finished image result lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImagePlacement {
    /// A new root image layer at `position`, sized to the decoded image.
    NewLayer { position: Pos2 },
    /// Swap the pixels of an existing image layer, keeping its frame.
    Replace(LayerId),
}

/// A piece cut out of a source image, positioned relative to its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedImage {
    pub image: ImageData,
    pub offset: Vec2,
}

pub trait ImageBackend: Send + Sync {
    fn generate_image<'a>(&'a self, prompt: &'a str, references: &'a [ImageData]) -> BridgeFuture<'a, ImageData>;

    fn edit_image<'a>(&'a self, image: &'a ImageData, prompt: &'a str) -> BridgeFuture<'a, ImageData>;

    fn remove_background<'a>(&'a self, image: &'a ImageData) -> BridgeFuture<'a, ImageData>;

    fn blend_images<'a>(&'a self, images: &'a [ImageData], style: &'a str) -> BridgeFuture<'a, ImageData>;
}

/// Local pixel operations driven by brush masks. Mask rasterisation is the
/// implementor's job.
pub trait ImageProcessor: Send + Sync {
    fn smart_extract<'a>(&'a self, source: &'a ImageData, mask: &'a StrokeMask) -> BridgeFuture<'a, Vec<ExtractedImage>>;

    fn heal<'a>(&'a self, source: &'a ImageData, mask: &'a StrokeMask) -> BridgeFuture<'a, ImageData>;
}

pub trait PersistenceBridge: Send + Sync {
    fn save<'a>(&'a self, snapshot: &'a DocumentSnapshot) -> BridgeFuture<'a, ()>;

    fn load(&self) -> BridgeFuture<'_, DocumentSnapshot>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_png_dimensions() {
        let data = test_support::png(3, 7);
        assert_eq!(data.dimensions().unwrap(), vec2(3.0, 7.0));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let data = ImageData::new(vec![0u8, 1, 2, 3]);
        assert!(data.dimensions().is_err());
    }
}
