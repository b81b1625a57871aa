//! Coordinate conversion between screen and logical canvas space, and the
//! small amount of rectangle math the layer model needs.

pub mod hit_testing;
mod transform;

pub use transform::Transform;

use egui::{Pos2, Rect, Vec2, pos2};
use serde::{Deserialize, Serialize};

use crate::error::{EditorError, EditorResult};

/// Pan offset and zoom of the canvas inside its host widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    offset: Vec2,
    scale: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(offset: Vec2, scale: f32) -> EditorResult<Self> {
        validate_scale(scale)?;
        Ok(Self { offset, scale })
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    /// Rejects non-positive or non-finite values and keeps the old scale.
    pub fn set_scale(&mut self, scale: f32) -> EditorResult<()> {
        validate_scale(scale)?;
        self.scale = scale;
        Ok(())
    }

    pub fn screen_to_logical(&self, screen: Pos2) -> Pos2 {
        pos2(
            (screen.x - self.offset.x) / self.scale,
            (screen.y - self.offset.y) / self.scale,
        )
    }

    pub fn logical_to_screen(&self, logical: Pos2) -> Pos2 {
        pos2(
            logical.x * self.scale + self.offset.x,
            logical.y * self.scale + self.offset.y,
        )
    }

    /// Multiplies the zoom by `factor` while keeping `anchor` (screen space)
    /// over the same logical point.
    pub fn zoom_at(&mut self, anchor: Pos2, factor: f32) -> EditorResult<()> {
        let new_scale = self.scale * factor;
        validate_scale(new_scale)?;
        let logical = self.screen_to_logical(anchor);
        self.scale = new_scale;
        self.offset = Vec2::new(
            anchor.x - logical.x * new_scale,
            anchor.y - logical.y * new_scale,
        );
        Ok(())
    }
}

fn validate_scale(scale: f32) -> EditorResult<()> {
    if scale > 0.0 && scale.is_finite() {
        Ok(())
    } else {
        Err(EditorError::InvalidScale(scale))
    }
}

/// Clamps a logical point into `[0, size.x] x [0, size.y]`.
pub fn clamp_point_to_canvas(point: Pos2, size: Vec2) -> Pos2 {
    pos2(
        point.x.max(0.0).min(size.x.max(0.0)),
        point.y.max(0.0).min(size.y.max(0.0)),
    )
}

/// Smallest rectangle enclosing all of `rects`, or `None` when empty.
pub fn union_rects(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|acc, r| acc.union(r))
}

/// True when `inner` lies entirely inside `outer` (edges inclusive).
pub fn rect_within(inner: Rect, outer: Rect) -> bool {
    inner.min.x >= outer.min.x
        && inner.min.y >= outer.min.y
        && inner.max.x <= outer.max.x
        && inner.max.y <= outer.max.y
}

/// Calculate the bounding box for a set of points
pub(crate) fn calculate_bounds(points: &[Pos2], padding: f32) -> Rect {
    if points.is_empty() {
        return Rect::NOTHING;
    }
    let mut rect = Rect::NOTHING;
    for point in points {
        rect.extend_with(*point);
    }
    rect.expand(padding)
}

/// Calculate distance from a point to a line segment (used for stroke hit testing)
pub(crate) fn distance_to_line_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    let line_vec = line_end - line_start;
    let point_vec = point - line_start;

    let line_len = line_vec.length();
    if line_len == 0.0 {
        return point_vec.length();
    }

    let t = ((point_vec.x * line_vec.x + point_vec.y * line_vec.y) / line_len).clamp(0.0, line_len);
    let projection = line_start + (line_vec * t / line_len);
    (point - projection).length()
}
