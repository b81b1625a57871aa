use egui::{Modifiers, Pos2};
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::config::CanvasConfig;
use crate::document::Document;
use crate::geometry::Viewport;
use crate::geometry::hit_testing::HitPath;
use crate::layer::ShapeKind;
use crate::selection::Selection;

mod brush_tool;
mod eraser_tool;
mod select_tool;
mod shape_tool;
mod stroke_buffer;
mod text_tool;

pub use brush_tool::BrushTool;
pub use eraser_tool::EraserTool;
pub use select_tool::{SelectState, SelectTool};
pub use shape_tool::ShapeTool;
pub use stroke_buffer::StrokeBuffer;
pub use text_tool::TextTool;

/// Identifies the active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    #[default]
    Select,
    Text,
    Brush,
    Eraser,
    Shape,
    /// Click-to-select while the host's generation panel drives the rest.
    AiGen,
}

/// Sub-mode of the brush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BrushMode {
    #[default]
    Paint,
    /// Strokes mark a region for the generation backend.
    AiAssist,
    /// Strokes mark a region for the healing processor.
    Heal,
}

/// Read-only view of the editor handed to tools on each pointer event.
pub struct ToolContext<'a> {
    pub document: &'a Document,
    pub selection: &'a Selection,
    pub config: &'a CanvasConfig,
    pub viewport: &'a Viewport,
    /// Hit under the pointer; only resolved for pointer-down.
    pub hit: Option<HitPath>,
    pub modifiers: Modifiers,
}

impl ToolContext<'_> {
    /// Shift or the platform command key extends the selection.
    pub fn multi_select(&self) -> bool {
        self.modifiers.shift || self.modifiers.command || self.modifiers.ctrl
    }
}

/// Tool trait defines the interface for all canvas tools.
///
/// Tools never mutate the document. They keep gesture state privately and
/// return commands that the editor executes.
pub trait Tool: Send + Sync {
    /// Return the name of the tool
    fn name(&self) -> &'static str;

    fn kind(&self) -> ToolKind;

    /// Called when the tool is selected (activated).
    fn activate(&mut self, _doc: &Document) {}

    /// Called when the tool is deselected. Any unfinished gesture is dropped.
    fn deactivate(&mut self, _doc: &Document);

    /// Handle pointer press. `pos` is in logical canvas space, unclamped.
    fn on_pointer_down(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command>;

    /// Handle pointer drag while the pointer is held down.
    fn on_pointer_move(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command>;

    /// Handle pointer release. Also used to wind down abandoned gestures.
    fn on_pointer_up(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command>;

    /// True while a gesture is in progress.
    fn is_busy(&self) -> bool;

    /// Whether intermediate pointer moves may be dropped (latest wins).
    fn coalesces_moves(&self) -> bool {
        true
    }

    fn current_state_name(&self) -> &'static str;
}

/// Enum representing all available tool types
#[derive(Debug, Clone)]
pub enum ToolType {
    Select(SelectTool),
    Text(TextTool),
    Brush(BrushTool),
    Eraser(EraserTool),
    Shape(ShapeTool),
}

impl ToolType {
    /// Factory for a fresh tool of `kind`.
    pub fn new(kind: ToolKind, config: &CanvasConfig) -> Self {
        match kind {
            ToolKind::Select => Self::Select(SelectTool::new()),
            ToolKind::AiGen => Self::Select(SelectTool::click_only()),
            ToolKind::Text => Self::Text(TextTool::new()),
            ToolKind::Brush => Self::Brush(BrushTool::new(BrushMode::Paint)),
            ToolKind::Eraser => Self::Eraser(EraserTool::new()),
            ToolKind::Shape => Self::Shape(ShapeTool::new(config.shape.clone())),
        }
    }

    pub fn as_brush_mut(&mut self) -> Option<&mut BrushTool> {
        match self {
            Self::Brush(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn as_shape_mut(&mut self) -> Option<&mut ShapeTool> {
        match self {
            Self::Shape(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn set_shape(&mut self, shape: ShapeKind) -> bool {
        match self.as_shape_mut() {
            Some(tool) => {
                tool.set_shape(shape);
                true
            }
            None => false,
        }
    }
}

impl Tool for ToolType {
    fn name(&self) -> &'static str {
        match self {
            Self::Select(tool) => tool.name(),
            Self::Text(tool) => tool.name(),
            Self::Brush(tool) => tool.name(),
            Self::Eraser(tool) => tool.name(),
            Self::Shape(tool) => tool.name(),
        }
    }

    fn kind(&self) -> ToolKind {
        match self {
            Self::Select(tool) => tool.kind(),
            Self::Text(tool) => tool.kind(),
            Self::Brush(tool) => tool.kind(),
            Self::Eraser(tool) => tool.kind(),
            Self::Shape(tool) => tool.kind(),
        }
    }

    fn activate(&mut self, doc: &Document) {
        match self {
            Self::Select(tool) => tool.activate(doc),
            Self::Text(tool) => tool.activate(doc),
            Self::Brush(tool) => tool.activate(doc),
            Self::Eraser(tool) => tool.activate(doc),
            Self::Shape(tool) => tool.activate(doc),
        }
    }

    fn deactivate(&mut self, doc: &Document) {
        match self {
            Self::Select(tool) => tool.deactivate(doc),
            Self::Text(tool) => tool.deactivate(doc),
            Self::Brush(tool) => tool.deactivate(doc),
            Self::Eraser(tool) => tool.deactivate(doc),
            Self::Shape(tool) => tool.deactivate(doc),
        }
    }

    fn on_pointer_down(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command> {
        match self {
            Self::Select(tool) => tool.on_pointer_down(pos, ctx),
            Self::Text(tool) => tool.on_pointer_down(pos, ctx),
            Self::Brush(tool) => tool.on_pointer_down(pos, ctx),
            Self::Eraser(tool) => tool.on_pointer_down(pos, ctx),
            Self::Shape(tool) => tool.on_pointer_down(pos, ctx),
        }
    }

    fn on_pointer_move(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command> {
        match self {
            Self::Select(tool) => tool.on_pointer_move(pos, ctx),
            Self::Text(tool) => tool.on_pointer_move(pos, ctx),
            Self::Brush(tool) => tool.on_pointer_move(pos, ctx),
            Self::Eraser(tool) => tool.on_pointer_move(pos, ctx),
            Self::Shape(tool) => tool.on_pointer_move(pos, ctx),
        }
    }

    fn on_pointer_up(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command> {
        match self {
            Self::Select(tool) => tool.on_pointer_up(pos, ctx),
            Self::Text(tool) => tool.on_pointer_up(pos, ctx),
            Self::Brush(tool) => tool.on_pointer_up(pos, ctx),
            Self::Eraser(tool) => tool.on_pointer_up(pos, ctx),
            Self::Shape(tool) => tool.on_pointer_up(pos, ctx),
        }
    }

    fn is_busy(&self) -> bool {
        match self {
            Self::Select(tool) => tool.is_busy(),
            Self::Text(tool) => tool.is_busy(),
            Self::Brush(tool) => tool.is_busy(),
            Self::Eraser(tool) => tool.is_busy(),
            Self::Shape(tool) => tool.is_busy(),
        }
    }

    fn coalesces_moves(&self) -> bool {
        match self {
            Self::Select(tool) => tool.coalesces_moves(),
            Self::Text(tool) => tool.coalesces_moves(),
            Self::Brush(tool) => tool.coalesces_moves(),
            Self::Eraser(tool) => tool.coalesces_moves(),
            Self::Shape(tool) => tool.coalesces_moves(),
        }
    }

    fn current_state_name(&self) -> &'static str {
        match self {
            Self::Select(tool) => tool.current_state_name(),
            Self::Text(tool) => tool.current_state_name(),
            Self::Brush(tool) => tool.current_state_name(),
            Self::Eraser(tool) => tool.current_state_name(),
            Self::Shape(tool) => tool.current_state_name(),
        }
    }
}
