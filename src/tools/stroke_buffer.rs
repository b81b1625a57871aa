use egui::{Color32, Pos2, Vec2};

use crate::geometry::clamp_point_to_canvas;

/// Gesture-local point buffer for brush and eraser strokes.
///
/// Every point is clamped to the canvas before it is stored, so a committed
/// stroke never leaves `[0, width] x [0, height]`.
#[derive(Debug, Clone)]
pub struct StrokeBuffer {
    points: Vec<Pos2>,
    color: Color32,
    thickness: f32,
    canvas_size: Vec2,
}

impl StrokeBuffer {
    /// Starts a buffer seeded with `start`.
    pub fn new(start: Pos2, color: Color32, thickness: f32, canvas_size: Vec2) -> Self {
        Self {
            points: vec![clamp_point_to_canvas(start, canvas_size)],
            color,
            thickness,
            canvas_size,
        }
    }

    pub fn add_point(&mut self, point: Pos2) {
        self.points.push(clamp_point_to_canvas(point, self.canvas_size));
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A single point is a click, not a stroke.
    pub fn is_stroke(&self) -> bool {
        self.points.len() > 1
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    pub fn into_points(self) -> Vec<Pos2> {
        self.points
    }
}
