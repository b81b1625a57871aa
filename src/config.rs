use egui::{Color32, Rect, Vec2, vec2};
use serde::{Deserialize, Serialize};

use crate::error::{EditorError, EditorResult};
use crate::geometry::hit_testing::DEFAULT_HIT_TOLERANCE;
use crate::layer::ShapeKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    /// Screen-space size; divided by the zoom when a stroke is created.
    pub size: f32,
    pub color: Color32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            size: 10.0,
            color: Color32::BLACK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextDefaults {
    pub font_size: f32,
    pub font_family: String,
    pub fill: Color32,
    pub placeholder: String,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            font_size: 24.0,
            font_family: "Arial".to_owned(),
            fill: Color32::BLACK,
            placeholder: "Text".to_owned(),
        }
    }
}

/// Editor-wide settings supplied by the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub canvas_size: Vec2,
    /// Nudge applied to duplicated and pasted layers.
    pub duplicate_offset: Vec2,
    /// Initial edge length of a shape placed by the shape tool.
    pub default_shape_size: f32,
    /// Shapes not larger than this on both axes are discarded on release.
    pub min_shape_size: f32,
    pub shape: ShapeKind,
    pub shape_fill: Color32,
    pub brush: BrushSettings,
    pub eraser_size: f32,
    pub text: TextDefaults,
    /// `None` keeps every history entry.
    pub history_limit: Option<usize>,
    pub hit_tolerance: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            canvas_size: vec2(1024.0, 1024.0),
            duplicate_offset: vec2(20.0, 20.0),
            default_shape_size: 100.0,
            min_shape_size: 5.0,
            shape: ShapeKind::default(),
            shape_fill: Color32::from_rgb(0x4a, 0x90, 0xe2),
            brush: BrushSettings::default(),
            eraser_size: 20.0,
            text: TextDefaults::default(),
            history_limit: None,
            hit_tolerance: DEFAULT_HIT_TOLERANCE,
        }
    }
}

impl CanvasConfig {
    pub fn validate(&self) -> EditorResult<()> {
        let size = self.canvas_size;
        if !(size.x > 0.0 && size.y > 0.0 && size.x.is_finite() && size.y.is_finite()) {
            return Err(EditorError::InvalidCanvasSize {
                width: size.x,
                height: size.y,
            });
        }
        for value in [
            self.default_shape_size,
            self.brush.size,
            self.eraser_size,
            self.text.font_size,
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(EditorError::InvalidScale(value));
            }
        }
        if self.min_shape_size < 0.0 || self.hit_tolerance < 0.0 {
            return Err(EditorError::InvalidScale(self.min_shape_size.min(self.hit_tolerance)));
        }
        Ok(())
    }

    pub fn canvas_rect(&self) -> Rect {
        Rect::from_min_size(egui::Pos2::ZERO, self.canvas_size)
    }
}
