use egui::{Pos2, Rect, pos2};

/// A 2D affine transform stored as a 3x3 row-major matrix.
///
/// Layer transforms are built as translate · rotate · scale around the
/// layer origin, so a point in layer space maps into the parent space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: [[f32; 3]; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    /// Creates a new identity transform
    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn translation(x: f32, y: f32) -> Self {
        Self {
            matrix: [[1.0, 0.0, x], [0.0, 1.0, y], [0.0, 0.0, 1.0]],
        }
    }

    /// Rotation in degrees; positive values turn clockwise on a y-down canvas.
    pub fn rotation(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            matrix: [[cos, -sin, 0.0], [sin, cos, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            matrix: [[sx, 0.0, 0.0], [0.0, sy, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// translate(x, y) · rotate(rotation) · scale(sx, sy)
    pub fn from_parts(x: f32, y: f32, rotation: f32, sx: f32, sy: f32) -> Self {
        Self::translation(x, y)
            .then(&Self::rotation(rotation))
            .then(&Self::scale(sx, sy))
    }

    /// Returns `self · other`: `other` is applied first, then `self`.
    pub fn then(&self, other: &Transform) -> Transform {
        Transform {
            matrix: multiply_matrices(&self.matrix, &other.matrix),
        }
    }

    pub fn apply(&self, point: Pos2) -> Pos2 {
        let m = &self.matrix;
        pos2(
            m[0][0] * point.x + m[0][1] * point.y + m[0][2],
            m[1][0] * point.x + m[1][1] * point.y + m[1][2],
        )
    }

    /// Inverse transform, or `None` when the matrix is singular (zero scale).
    pub fn inverse(&self) -> Option<Transform> {
        let m = &self.matrix;
        let det = m[0][0] * m[1][1] - m[0][1] * m[1][0];
        if det.abs() <= f32::EPSILON || !det.is_finite() {
            return None;
        }
        let inv_det = 1.0 / det;
        let a = m[1][1] * inv_det;
        let b = -m[0][1] * inv_det;
        let c = -m[1][0] * inv_det;
        let d = m[0][0] * inv_det;
        let tx = -(a * m[0][2] + b * m[1][2]);
        let ty = -(c * m[0][2] + d * m[1][2]);
        Some(Transform {
            matrix: [[a, b, tx], [c, d, ty], [0.0, 0.0, 1.0]],
        })
    }

    /// Axis-aligned box enclosing the transformed corners of `rect`.
    pub fn map_rect(&self, rect: Rect) -> Rect {
        let corners = [
            rect.left_top(),
            rect.right_top(),
            rect.left_bottom(),
            rect.right_bottom(),
        ];
        let mut out = Rect::NOTHING;
        for corner in corners {
            out.extend_with(self.apply(corner));
        }
        out
    }

    /// Average of the horizontal and vertical scale factors.
    pub fn average_scale(&self) -> f32 {
        let m = &self.matrix;
        let sx = (m[0][0] * m[0][0] + m[1][0] * m[1][0]).sqrt();
        let sy = (m[0][1] * m[0][1] + m[1][1] * m[1][1]).sqrt();
        (sx + sy) / 2.0
    }

    pub fn to_matrix(&self) -> [[f32; 3]; 3] {
        self.matrix
    }
}

fn multiply_matrices(a: &[[f32; 3]; 3], b: &[[f32; 3]; 3]) -> [[f32; 3]; 3] {
    let mut result = [[0.0; 3]; 3];
    for (i, row) in result.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    result
}
