mod patch;
mod shape;

pub use patch::LayerPatch;
pub use shape::{ShapeGeometry, ShapeKind};

use std::fmt;
use std::sync::Arc;

use egui::{Color32, Pos2, Rect, Vec2, pos2, vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::compositing::{BlendMode, Filters};
use crate::geometry::{Transform, calculate_bounds};

/// A unique identifier for a layer, stable for the layer's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(Uuid);

impl LayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for LayerId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Flat type tag of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerType {
    Image,
    Text,
    Line,
    Group,
    Polygon,
    Star,
    RoundedRect,
    Ellipse,
    Arrow,
    Wedge,
    Ring,
    Arc,
}

impl LayerType {
    pub fn label(&self) -> &'static str {
        match self {
            LayerType::Image => "Image",
            LayerType::Text => "Text",
            LayerType::Line => "Line",
            LayerType::Group => "Group",
            LayerType::Polygon => "Polygon",
            LayerType::Star => "Star",
            LayerType::RoundedRect => "Rectangle",
            LayerType::Ellipse => "Ellipse",
            LayerType::Arrow => "Arrow",
            LayerType::Wedge => "Wedge",
            LayerType::Ring => "Ring",
            LayerType::Arc => "Arc",
        }
    }
}

/// Reference to the pixels of an image layer.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub enum ImageSource {
    /// Path, URL or data URI resolved by the host.
    Uri(String),
    /// Encoded image bytes (PNG, JPEG, ...).
    Encoded(Arc<[u8]>),
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Uri(uri) => f.debug_tuple("Uri").field(uri).finish(),
            ImageSource::Encoded(bytes) => write!(f, "Encoded(<{} bytes>)", bytes.len()),
        }
    }
}

/// Outline drawn around shapes and text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub color: Color32,
    pub width: f32,
    #[serde(default)]
    pub dash: Vec<f32>,
}

/// Type-specific content of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LayerKind {
    Image {
        src: ImageSource,
        #[serde(default)]
        filters: Filters,
    },
    Text {
        text: String,
        font_size: f32,
        font_family: String,
        fill: Color32,
    },
    /// Freehand stroke. Points are in the layer's local space.
    Line {
        points: Vec<Pos2>,
        stroke_width: f32,
        color: Color32,
        /// Host size captured when this line was created as an erase mask.
        #[serde(default)]
        original_parent_size: Option<Vec2>,
    },
    Group,
    Shape {
        shape: ShapeKind,
        fill: Color32,
    },
}

/// A single entity of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub kind: LayerKind,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    /// Degrees.
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub opacity: f32,
    pub visible: bool,
    #[serde(default)]
    pub parent_id: Option<LayerId>,
    #[serde(default)]
    pub stroke: Option<Outline>,
    #[serde(default)]
    pub blend_mode: BlendMode,
}

impl Layer {
    pub fn new(kind: LayerKind, x: f32, y: f32) -> Self {
        Self {
            id: LayerId::new(),
            name: String::new(),
            kind,
            x,
            y,
            width: None,
            height: None,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            opacity: 1.0,
            visible: true,
            parent_id: None,
            stroke: None,
            blend_mode: BlendMode::default(),
        }
    }

    pub fn image(src: ImageSource, position: Pos2, size: Vec2) -> Self {
        Self::new(
            LayerKind::Image {
                src,
                filters: Filters::default(),
            },
            position.x,
            position.y,
        )
        .with_size(size)
    }

    pub fn text(text: impl Into<String>, position: Pos2, font_size: f32, font_family: impl Into<String>, fill: Color32) -> Self {
        Self::new(
            LayerKind::Text {
                text: text.into(),
                font_size,
                font_family: font_family.into(),
                fill,
            },
            position.x,
            position.y,
        )
    }

    /// Freehand stroke with points in logical canvas space.
    pub fn line(points: Vec<Pos2>, stroke_width: f32, color: Color32) -> Self {
        Self::new(
            LayerKind::Line {
                points,
                stroke_width,
                color,
                original_parent_size: None,
            },
            0.0,
            0.0,
        )
    }

    pub fn group(frame: Rect) -> Self {
        Self::new(LayerKind::Group, frame.min.x, frame.min.y).with_size(frame.size())
    }

    pub fn shape(shape: ShapeKind, frame: Rect, fill: Color32) -> Self {
        Self::new(LayerKind::Shape { shape, fill }, frame.min.x, frame.min.y).with_size(frame.size())
    }

    pub fn with_id(mut self, id: LayerId) -> Self {
        self.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.width = Some(size.x);
        self.height = Some(size.y);
        self
    }

    pub fn with_parent(mut self, parent: LayerId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    pub fn layer_type(&self) -> LayerType {
        match &self.kind {
            LayerKind::Image { .. } => LayerType::Image,
            LayerKind::Text { .. } => LayerType::Text,
            LayerKind::Line { .. } => LayerType::Line,
            LayerKind::Group => LayerType::Group,
            LayerKind::Shape { shape, .. } => shape.layer_type(),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, LayerKind::Group)
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, LayerKind::Text { .. })
    }

    /// Erase masks are line layers owned by another layer with the erase operator.
    pub fn is_erase_mask(&self) -> bool {
        matches!(self.kind, LayerKind::Line { .. })
            && self.parent_id.is_some()
            && self.blend_mode == BlendMode::Erase
    }

    /// Image and line layers may own erase masks.
    pub fn can_host_masks(&self) -> bool {
        match self.kind {
            LayerKind::Image { .. } => true,
            LayerKind::Line { .. } => !self.is_erase_mask(),
            _ => false,
        }
    }

    pub fn position(&self) -> Pos2 {
        pos2(self.x, self.y)
    }

    pub fn size(&self) -> Option<Vec2> {
        Some(vec2(self.width?, self.height?))
    }

    /// Transform from this layer's local space into its parent's space.
    pub fn local_transform(&self) -> Transform {
        Transform::from_parts(self.x, self.y, self.rotation, self.scale_x, self.scale_y)
    }

    /// Extent of the layer's content in its own local space.
    pub fn local_bounds(&self) -> Rect {
        match &self.kind {
            LayerKind::Line { points, stroke_width, .. } => calculate_bounds(points, stroke_width / 2.0),
            LayerKind::Text { text, font_size, .. } => {
                // Rough glyph box; the host measures real text.
                let width = self.width.unwrap_or_else(|| {
                    let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
                    longest as f32 * font_size * 0.6
                });
                let lines = text.lines().count().max(1) as f32;
                let height = self.height.unwrap_or(font_size * 1.2 * lines);
                Rect::from_min_size(Pos2::ZERO, vec2(width, height))
            }
            _ => match self.size() {
                Some(size) => Rect::from_min_size(Pos2::ZERO, size),
                None => Rect::from_min_size(Pos2::ZERO, Vec2::ZERO),
            },
        }
    }

    /// Axis-aligned frame in the parent's space used for grouping.
    ///
    /// Layers with an explicit size contribute `x..x+width`, lines contribute
    /// their point extent, and anything else contributes only its origin.
    pub fn frame(&self) -> Rect {
        match (&self.kind, self.size()) {
            (LayerKind::Line { points, .. }, _) if !points.is_empty() => {
                calculate_bounds(points, 0.0).translate(vec2(self.x, self.y))
            }
            (_, Some(size)) => Rect::from_min_size(self.position(), size),
            _ => Rect::from_min_size(self.position(), Vec2::ZERO),
        }
    }

    /// Size used to stamp and rescale erase masks owned by this layer.
    ///
    /// Lines have none: resizing a line rescales its masks directly, see
    /// `Document::complete_transform`.
    pub fn mask_host_size(&self) -> Option<Vec2> {
        match &self.kind {
            LayerKind::Line { .. } => None,
            _ => self.size(),
        }
    }

    /// Bakes `scale_x`/`scale_y` into the type's own geometry and resets the
    /// scale to 1. Groups keep their scale so children stay untouched.
    pub fn complete_transform(&mut self) {
        let (sx, sy) = (self.scale_x, self.scale_y);
        if (sx - 1.0).abs() <= f32::EPSILON && (sy - 1.0).abs() <= f32::EPSILON {
            return;
        }
        match &mut self.kind {
            LayerKind::Group => return,
            LayerKind::Image { .. } => {
                self.width = self.width.map(|w| w * sx);
                self.height = self.height.map(|h| h * sy);
            }
            LayerKind::Shape { shape, .. } => {
                shape.scale_by(sx, sy);
                self.width = self.width.map(|w| w * sx);
                self.height = self.height.map(|h| h * sy);
            }
            LayerKind::Text { font_size, .. } => {
                *font_size *= sy;
                self.width = self.width.map(|w| w * sx);
                self.height = self.height.map(|h| h * sy);
            }
            LayerKind::Line { points, .. } => {
                for point in points.iter_mut() {
                    *point = pos2(point.x * sx, point.y * sy);
                }
            }
        }
        self.scale_x = 1.0;
        self.scale_y = 1.0;
    }
}
