//! Backend-neutral render plan.
//!
//! The host paints the returned tree with its own scene graph. Each node
//! carries its local transform (applied once and inherited by children),
//! compositing settings and its erase masks already rescaled to the host's
//! current size.

use egui::{Color32, Pos2, Vec2};

use crate::compositing::{FilterOp, ResolvedMask, resolve_masks};
use crate::document::Document;
use crate::geometry::Transform;
use crate::layer::{ImageSource, Layer, LayerId, LayerKind, Outline, ShapeGeometry};

#[derive(Debug, Clone, PartialEq)]
pub enum RenderContent {
    Image {
        src: ImageSource,
        size: Vec2,
        filters: Vec<FilterOp>,
    },
    Text {
        text: String,
        font_size: f32,
        font_family: String,
        fill: Color32,
        width: Option<f32>,
    },
    Line {
        points: Vec<Pos2>,
        stroke_width: f32,
        color: Color32,
    },
    Shape {
        geometry: ShapeGeometry,
        fill: Color32,
    },
    Group {
        children: Vec<RenderNode>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode {
    pub id: LayerId,
    pub transform: Transform,
    pub opacity: f32,
    /// Canvas composite operation name, e.g. `source-over`.
    pub composite: &'static str,
    pub outline: Option<Outline>,
    pub masks: Vec<ResolvedMask>,
    pub content: RenderContent,
}

/// Render nodes for the visible root layers, bottom to top.
pub fn build_render_tree(document: &Document) -> Vec<RenderNode> {
    build_children(document, None)
}

fn build_children(document: &Document, parent: Option<LayerId>) -> Vec<RenderNode> {
    document
        .children(parent)
        .filter(|layer| layer.visible && !layer.is_erase_mask())
        .map(|layer| build_node(document, layer))
        .collect()
}

fn build_node(document: &Document, layer: &Layer) -> RenderNode {
    let content = match &layer.kind {
        LayerKind::Image { src, filters } => RenderContent::Image {
            src: src.clone(),
            size: layer.size().unwrap_or(Vec2::ZERO),
            filters: filters.pipeline(),
        },
        LayerKind::Text {
            text,
            font_size,
            font_family,
            fill,
        } => RenderContent::Text {
            text: text.clone(),
            font_size: *font_size,
            font_family: font_family.clone(),
            fill: *fill,
            width: layer.width,
        },
        LayerKind::Line {
            points,
            stroke_width,
            color,
            ..
        } => RenderContent::Line {
            points: points.clone(),
            stroke_width: *stroke_width,
            color: *color,
        },
        LayerKind::Shape { shape, fill } => RenderContent::Shape {
            geometry: shape.geometry(layer.size().unwrap_or(Vec2::ZERO)),
            fill: *fill,
        },
        LayerKind::Group => RenderContent::Group {
            children: build_children(document, Some(layer.id)),
        },
    };
    let masks = if layer.can_host_masks() {
        resolve_masks(document, layer.id)
    } else {
        Vec::new()
    };
    RenderNode {
        id: layer.id,
        transform: layer.local_transform(),
        opacity: layer.opacity,
        composite: layer.blend_mode.composite_operation(),
        outline: layer.stroke.clone(),
        masks,
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Rect, pos2, vec2};

    use crate::compositing::BlendMode;

    #[test]
    fn test_masks_attach_to_host() {
        let mut doc = Document::new();
        let image = doc
            .add_layer(Layer::image(ImageSource::Uri("a.png".into()), pos2(0.0, 0.0), vec2(100.0, 100.0)))
            .unwrap();
        let mut mask = Layer::line(vec![pos2(10.0, 10.0), pos2(20.0, 20.0)], 4.0, Color32::BLACK)
            .with_parent(image)
            .with_blend_mode(BlendMode::Erase);
        if let LayerKind::Line { original_parent_size, .. } = &mut mask.kind {
            *original_parent_size = Some(vec2(50.0, 50.0));
        }
        doc.add_layer(mask).unwrap();

        let tree = build_render_tree(&doc);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].masks.len(), 1);
        assert_eq!(tree[0].masks[0].points, vec![pos2(20.0, 20.0), pos2(40.0, 40.0)]);
        assert_eq!(tree[0].masks[0].stroke_width, 8.0);
    }

    #[test]
    fn test_groups_nest_children() {
        let mut doc = Document::new();
        let group = doc.add_layer(Layer::group(Rect::from_min_size(pos2(5.0, 5.0), vec2(10.0, 10.0)))).unwrap();
        let mut hidden = Layer::text("x", pos2(0.0, 0.0), 10.0, "Arial", Color32::BLACK).with_parent(group);
        hidden.visible = false;
        doc.add_layer(hidden).unwrap();
        doc.add_layer(Layer::text("y", pos2(1.0, 1.0), 10.0, "Arial", Color32::BLACK).with_parent(group))
            .unwrap();

        let tree = build_render_tree(&doc);
        match &tree[0].content {
            RenderContent::Group { children } => assert_eq!(children.len(), 1),
            other => panic!("expected a group, got {other:?}"),
        }
    }
}
