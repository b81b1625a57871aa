use egui::{Color32, Pos2};
use log::debug;

use super::{ImageSource, Layer, LayerKind, Outline, ShapeKind};
use crate::compositing::{BlendMode, Filters};

/// Partial layer attributes merged shallowly by `update_layer`.
///
/// `None` leaves the attribute untouched. Type-specific fields are ignored
/// on layers whose kind does not carry them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerPatch {
    pub name: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub rotation: Option<f32>,
    pub scale_x: Option<f32>,
    pub scale_y: Option<f32>,
    pub opacity: Option<f32>,
    pub visible: Option<bool>,
    pub stroke: Option<Option<Outline>>,
    pub blend_mode: Option<BlendMode>,
    pub text: Option<String>,
    pub font_size: Option<f32>,
    pub font_family: Option<String>,
    pub fill: Option<Color32>,
    pub points: Option<Vec<Pos2>>,
    pub stroke_width: Option<f32>,
    pub src: Option<ImageSource>,
    pub filters: Option<Filters>,
    pub shape: Option<ShapeKind>,
}

impl LayerPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(pos: Pos2) -> Self {
        Self {
            x: Some(pos.x),
            y: Some(pos.y),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_scale(mut self, scale_x: f32, scale_y: f32) -> Self {
        self.scale_x = Some(scale_x);
        self.scale_y = Some(scale_y);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_src(mut self, src: ImageSource) -> Self {
        self.src = Some(src);
        self
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = Some(blend_mode);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges the set attributes into `layer`.
    pub fn apply(&self, layer: &mut Layer) {
        if let Some(name) = &self.name {
            layer.name = name.clone();
        }
        if let Some(x) = self.x {
            layer.x = x;
        }
        if let Some(y) = self.y {
            layer.y = y;
        }
        if let Some(width) = self.width {
            layer.width = Some(width);
        }
        if let Some(height) = self.height {
            layer.height = Some(height);
        }
        if let Some(rotation) = self.rotation {
            layer.rotation = rotation;
        }
        if let Some(scale_x) = self.scale_x {
            layer.scale_x = scale_x;
        }
        if let Some(scale_y) = self.scale_y {
            layer.scale_y = scale_y;
        }
        if let Some(opacity) = self.opacity {
            layer.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(visible) = self.visible {
            layer.visible = visible;
        }
        if let Some(stroke) = &self.stroke {
            layer.stroke = stroke.clone();
        }
        if let Some(blend_mode) = self.blend_mode {
            layer.blend_mode = blend_mode;
        }
        self.apply_kind(layer);
    }

    fn apply_kind(&self, layer: &mut Layer) {
        let id = layer.id;
        match &mut layer.kind {
            LayerKind::Text { text, font_size, font_family, fill } => {
                if let Some(value) = &self.text {
                    *text = value.clone();
                }
                if let Some(value) = self.font_size {
                    *font_size = value;
                }
                if let Some(value) = &self.font_family {
                    *font_family = value.clone();
                }
                if let Some(value) = self.fill {
                    *fill = value;
                }
            }
            LayerKind::Line { points, stroke_width, color, .. } => {
                if let Some(value) = &self.points {
                    *points = value.clone();
                }
                if let Some(value) = self.stroke_width {
                    *stroke_width = value;
                }
                if let Some(value) = self.fill {
                    *color = value;
                }
            }
            LayerKind::Image { src, filters } => {
                if let Some(value) = &self.src {
                    *src = value.clone();
                }
                if let Some(value) = &self.filters {
                    *filters = value.clone();
                }
            }
            LayerKind::Shape { shape, fill } => {
                if let Some(value) = &self.shape {
                    *shape = value.clone();
                }
                if let Some(value) = self.fill {
                    *fill = value;
                }
            }
            LayerKind::Group => {}
        }
        if self.carries_foreign_fields(&layer.kind) {
            debug!("Ignored attributes that layer {} does not carry", id);
        }
    }

    fn carries_foreign_fields(&self, kind: &LayerKind) -> bool {
        let text = self.text.is_some() || self.font_size.is_some() || self.font_family.is_some();
        let line = self.points.is_some() || self.stroke_width.is_some();
        let image = self.src.is_some() || self.filters.is_some();
        let shape = self.shape.is_some();
        match kind {
            LayerKind::Text { .. } => line || image || shape,
            LayerKind::Line { .. } => text || image || shape,
            LayerKind::Image { .. } => text || line || shape || self.fill.is_some(),
            LayerKind::Shape { .. } => text || line || image,
            LayerKind::Group => text || line || image || shape || self.fill.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_patch_merges_only_set_fields() {
        let mut layer = Layer::text("a", pos2(1.0, 2.0), 12.0, "Arial", Color32::BLACK);
        LayerPatch::position(pos2(5.0, 6.0)).with_text("b").apply(&mut layer);
        assert_eq!(layer.position(), pos2(5.0, 6.0));
        assert_eq!(layer.rotation, 0.0);
        match &layer.kind {
            LayerKind::Text { text, font_size, .. } => {
                assert_eq!(text, "b");
                assert_eq!(*font_size, 12.0);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_opacity_is_clamped() {
        let mut layer = Layer::text("a", pos2(0.0, 0.0), 12.0, "Arial", Color32::BLACK);
        LayerPatch::new().with_opacity(3.0).apply(&mut layer);
        assert_eq!(layer.opacity, 1.0);
    }

    #[test]
    fn test_foreign_fields_are_ignored() {
        let mut layer = Layer::line(vec![pos2(0.0, 0.0), pos2(1.0, 1.0)], 2.0, Color32::RED);
        let before = layer.clone();
        LayerPatch::new().with_text("nope").apply(&mut layer);
        assert_eq!(layer, before);
    }
}
