use egui::{Pos2, Rect};
use log::debug;

use super::{Transform, distance_to_line_segment};
use crate::document::Document;
use crate::layer::{Layer, LayerId, LayerKind};

/// Extra slack in logical units around thin content such as strokes.
pub const DEFAULT_HIT_TOLERANCE: f32 = 4.0;

/// The deepest layer under a point together with its group ancestry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitPath {
    pub layer: LayerId,
    /// Enclosing groups, nearest first.
    pub ancestors: Vec<LayerId>,
}

impl HitPath {
    /// The outermost ancestor, or the hit layer itself when it is a root.
    pub fn root(&self) -> LayerId {
        self.ancestors.last().copied().unwrap_or(self.layer)
    }

    /// The hit layer followed by its ancestors, nearest first.
    pub fn chain(&self) -> impl Iterator<Item = LayerId> + '_ {
        std::iter::once(self.layer).chain(self.ancestors.iter().copied())
    }
}

/// Resolves a logical canvas point to the node drawn on top at that point.
pub trait HitTester {
    fn hit_test(&self, document: &Document, point: Pos2) -> Option<HitPath>;
}

/// Hit tester working on the layer geometry alone.
#[derive(Debug, Clone, Copy)]
pub struct GeometricHitTester {
    pub tolerance: f32,
}

impl Default for GeometricHitTester {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_HIT_TOLERANCE,
        }
    }
}

impl HitTester for GeometricHitTester {
    fn hit_test(&self, document: &Document, point: Pos2) -> Option<HitPath> {
        hit_test(document, point, self.tolerance)
    }
}

/// Walks root layers top-down, descending into groups. Invisible layers and
/// erase masks never receive hits.
pub fn hit_test(document: &Document, point: Pos2, tolerance: f32) -> Option<HitPath> {
    let mut chain = Vec::new();
    let hit = hit_children(document, None, Transform::IDENTITY, point, tolerance, &mut chain);
    if let Some(path) = &hit {
        debug!("Hit layer {} (root {})", path.layer, path.root());
    }
    hit
}

fn hit_children(
    document: &Document,
    parent: Option<LayerId>,
    parent_transform: Transform,
    point: Pos2,
    tolerance: f32,
    chain: &mut Vec<LayerId>,
) -> Option<HitPath> {
    let siblings: Vec<&Layer> = document
        .children(parent)
        .filter(|l| l.visible && !l.is_erase_mask())
        .collect();
    for layer in siblings.into_iter().rev() {
        let transform = parent_transform.then(&layer.local_transform());
        if layer.is_group() {
            chain.push(layer.id);
            let hit = hit_children(document, Some(layer.id), transform, point, tolerance, chain);
            chain.pop();
            if hit.is_some() {
                return hit;
            }
            continue;
        }
        if contains_point(layer, &transform, point, tolerance) {
            return Some(HitPath {
                layer: layer.id,
                ancestors: chain.iter().rev().copied().collect(),
            });
        }
    }
    None
}

/// True when `point` (canvas space) falls on `layer` drawn with `transform`.
pub fn contains_point(layer: &Layer, transform: &Transform, point: Pos2, tolerance: f32) -> bool {
    let Some(inverse) = transform.inverse() else {
        return false;
    };
    let local = inverse.apply(point);
    let scale = transform.average_scale();
    let slack = if scale > 0.0 { tolerance / scale } else { tolerance };
    match &layer.kind {
        LayerKind::Line { points, stroke_width, .. } => match points.as_slice() {
            [] => false,
            [only] => (local - *only).length() <= stroke_width / 2.0 + slack,
            _ => points
                .windows(2)
                .any(|seg| distance_to_line_segment(local, seg[0], seg[1]) <= stroke_width / 2.0 + slack),
        },
        _ => {
            let bounds = layer.local_bounds();
            if !bounds.is_finite() {
                return false;
            }
            Rect::from_two_pos(bounds.min, bounds.max).contains(local)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Color32, pos2, vec2};

    use crate::layer::ShapeKind;

    fn square(x: f32, y: f32, size: f32) -> Layer {
        Layer::shape(
            ShapeKind::default(),
            Rect::from_min_size(pos2(x, y), vec2(size, size)),
            Color32::WHITE,
        )
    }

    #[test]
    fn test_topmost_layer_wins() {
        let mut doc = Document::new();
        doc.add_layer(square(0.0, 0.0, 100.0)).unwrap();
        let top = doc.add_layer(square(50.0, 50.0, 100.0)).unwrap();
        let hit = hit_test(&doc, pos2(60.0, 60.0), 0.0).unwrap();
        assert_eq!(hit.layer, top);
        assert!(hit.ancestors.is_empty());
    }

    #[test]
    fn test_invisible_layers_are_skipped() {
        let mut doc = Document::new();
        let mut hidden = square(0.0, 0.0, 10.0);
        hidden.visible = false;
        doc.add_layer(hidden).unwrap();
        assert!(hit_test(&doc, pos2(5.0, 5.0), 0.0).is_none());
    }

    #[test]
    fn test_rotated_layer_uses_local_space() {
        let mut doc = Document::new();
        let mut layer = square(100.0, 100.0, 50.0);
        layer.rotation = 90.0;
        let id = doc.add_layer(layer).unwrap();
        // Rotated a quarter turn about its origin the square covers x in [50, 100].
        assert_eq!(hit_test(&doc, pos2(75.0, 125.0), 0.0).map(|h| h.layer), Some(id));
        assert!(hit_test(&doc, pos2(125.0, 125.0), 0.0).is_none());
    }

    #[test]
    fn test_grouped_child_reports_ancestors() {
        let mut doc = Document::new();
        let outer = doc.add_layer(Layer::group(Rect::from_min_size(pos2(10.0, 10.0), vec2(50.0, 50.0)))).unwrap();
        let inner = doc
            .add_layer(Layer::group(Rect::from_min_size(pos2(5.0, 5.0), vec2(20.0, 20.0))).with_parent(outer))
            .unwrap();
        let leaf = doc.add_layer(square(0.0, 0.0, 20.0).with_parent(inner)).unwrap();
        let hit = hit_test(&doc, pos2(20.0, 20.0), 0.0).unwrap();
        assert_eq!(hit.layer, leaf);
        assert_eq!(hit.ancestors, vec![inner, outer]);
        assert_eq!(hit.root(), outer);
    }

    #[test]
    fn test_line_hit_uses_stroke_width() {
        let mut doc = Document::new();
        let id = doc
            .add_layer(Layer::line(vec![pos2(0.0, 0.0), pos2(100.0, 0.0)], 10.0, Color32::BLACK))
            .unwrap();
        assert_eq!(hit_test(&doc, pos2(50.0, 4.0), 0.0).map(|h| h.layer), Some(id));
        assert!(hit_test(&doc, pos2(50.0, 8.0), 0.0).is_none());
    }
}
