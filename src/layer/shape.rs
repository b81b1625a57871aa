use egui::{Pos2, Rect, Vec2, pos2, vec2};
use serde::{Deserialize, Serialize};

use super::LayerType;

/// Vector shape variants. Radii are derived from the layer frame; the
/// stored values are ratios and angles so a resized frame stays consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "kebab-case")]
pub enum ShapeKind {
    Polygon { sides: u32 },
    Star { points: u32, inner_ratio: f32 },
    RoundedRect { corner_radius: f32 },
    Ellipse,
    Arrow { pointer_length: f32, pointer_width: f32 },
    /// `angle` in degrees.
    Wedge { angle: f32 },
    Ring { inner_ratio: f32 },
    /// `angle` in degrees.
    Arc { inner_ratio: f32, angle: f32 },
}

impl Default for ShapeKind {
    fn default() -> Self {
        ShapeKind::RoundedRect { corner_radius: 0.0 }
    }
}

/// Renderer-neutral outline of a shape in its local frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeGeometry {
    Polygon(Vec<Pos2>),
    RoundedRect { rect: Rect, corner_radius: f32 },
    Ellipse { center: Pos2, radius: Vec2 },
    Arrow { from: Pos2, to: Pos2, pointer_length: f32, pointer_width: f32 },
    Wedge { center: Pos2, radius: f32, angle: f32 },
    Ring { center: Pos2, inner_radius: f32, outer_radius: f32 },
    Arc { center: Pos2, inner_radius: f32, outer_radius: f32, angle: f32 },
}

impl ShapeKind {
    pub fn polygon() -> Self {
        ShapeKind::Polygon { sides: 6 }
    }

    pub fn star() -> Self {
        ShapeKind::Star { points: 5, inner_ratio: 0.5 }
    }

    pub fn arrow() -> Self {
        ShapeKind::Arrow { pointer_length: 20.0, pointer_width: 20.0 }
    }

    pub fn wedge() -> Self {
        ShapeKind::Wedge { angle: 60.0 }
    }

    pub fn ring() -> Self {
        ShapeKind::Ring { inner_ratio: 0.5 }
    }

    pub fn arc() -> Self {
        ShapeKind::Arc { inner_ratio: 0.5, angle: 90.0 }
    }

    pub fn layer_type(&self) -> LayerType {
        match self {
            ShapeKind::Polygon { .. } => LayerType::Polygon,
            ShapeKind::Star { .. } => LayerType::Star,
            ShapeKind::RoundedRect { .. } => LayerType::RoundedRect,
            ShapeKind::Ellipse => LayerType::Ellipse,
            ShapeKind::Arrow { .. } => LayerType::Arrow,
            ShapeKind::Wedge { .. } => LayerType::Wedge,
            ShapeKind::Ring { .. } => LayerType::Ring,
            ShapeKind::Arc { .. } => LayerType::Arc,
        }
    }

    /// Scales absolute measurements; ratio and angle parameters are unchanged.
    pub(crate) fn scale_by(&mut self, sx: f32, sy: f32) {
        match self {
            ShapeKind::RoundedRect { corner_radius } => *corner_radius *= (sx.abs() + sy.abs()) / 2.0,
            ShapeKind::Arrow { pointer_length, pointer_width } => {
                *pointer_length *= sx.abs();
                *pointer_width *= sy.abs();
            }
            _ => {}
        }
    }

    /// Outline of the shape inside a `size` frame anchored at the origin.
    pub fn geometry(&self, size: Vec2) -> ShapeGeometry {
        let center = pos2(size.x / 2.0, size.y / 2.0);
        let radius = vec2(size.x.abs() / 2.0, size.y.abs() / 2.0);
        let min_radius = radius.x.min(radius.y);
        match self {
            ShapeKind::Polygon { sides } => {
                let sides = (*sides).max(3);
                ShapeGeometry::Polygon(
                    (0..sides)
                        .map(|i| radial_point(center, radius, i as f32 * 360.0 / sides as f32))
                        .collect(),
                )
            }
            ShapeKind::Star { points, inner_ratio } => {
                let points = (*points).max(2);
                let step = 180.0 / points as f32;
                ShapeGeometry::Polygon(
                    (0..points * 2)
                        .map(|i| {
                            let r = if i % 2 == 0 { radius } else { radius * *inner_ratio };
                            radial_point(center, r, i as f32 * step)
                        })
                        .collect(),
                )
            }
            ShapeKind::RoundedRect { corner_radius } => ShapeGeometry::RoundedRect {
                rect: Rect::from_min_size(Pos2::ZERO, size),
                corner_radius: corner_radius.max(0.0).min(min_radius),
            },
            ShapeKind::Ellipse => ShapeGeometry::Ellipse { center, radius },
            ShapeKind::Arrow { pointer_length, pointer_width } => ShapeGeometry::Arrow {
                from: pos2(0.0, center.y),
                to: pos2(size.x, center.y),
                pointer_length: *pointer_length,
                pointer_width: *pointer_width,
            },
            ShapeKind::Wedge { angle } => ShapeGeometry::Wedge {
                center,
                radius: min_radius,
                angle: *angle,
            },
            ShapeKind::Ring { inner_ratio } => ShapeGeometry::Ring {
                center,
                inner_radius: min_radius * inner_ratio,
                outer_radius: min_radius,
            },
            ShapeKind::Arc { inner_ratio, angle } => ShapeGeometry::Arc {
                center,
                inner_radius: min_radius * inner_ratio,
                outer_radius: min_radius,
                angle: *angle,
            },
        }
    }
}

/// Point on the ellipse `radius` around `center`, starting at twelve o'clock.
fn radial_point(center: Pos2, radius: Vec2, degrees: f32) -> Pos2 {
    let (sin, cos) = (degrees - 90.0).to_radians().sin_cos();
    pos2(center.x + radius.x * cos, center.y + radius.y * sin)
}
