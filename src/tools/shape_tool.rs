use egui::{Pos2, Rect, Vec2};
use log::debug;

use crate::command::{Command, HistoryKind};
use crate::document::Document;
use crate::geometry::clamp_point_to_canvas;
use crate::layer::{Layer, LayerId, LayerPatch, ShapeKind};
use crate::tools::{Tool, ToolContext, ToolKind};

#[derive(Debug, Clone, PartialEq)]
struct ShapeDrag {
    id: LayerId,
    start: Pos2,
    resized: bool,
}

/// Drag-to-size vector shapes.
///
/// The shape is inserted at its default size on press so it is visible
/// while sizing. On release a shape that is not larger than the minimum on
/// both axes is hidden instead of committed.
#[derive(Debug, Clone)]
pub struct ShapeTool {
    shape: ShapeKind,
    drag: Option<ShapeDrag>,
}

impl ShapeTool {
    pub fn new(shape: ShapeKind) -> Self {
        Self { shape, drag: None }
    }

    pub fn shape(&self) -> &ShapeKind {
        &self.shape
    }

    pub fn set_shape(&mut self, shape: ShapeKind) {
        self.shape = shape;
    }

    fn frame(start: Pos2, pos: Pos2, canvas_size: Vec2) -> Rect {
        Rect::from_two_pos(start, clamp_point_to_canvas(pos, canvas_size))
    }
}

impl Tool for ShapeTool {
    fn name(&self) -> &'static str {
        "Shape"
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Shape
    }

    fn deactivate(&mut self, _doc: &Document) {
        self.drag = None;
    }

    fn on_pointer_down(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command> {
        let start = clamp_point_to_canvas(pos, ctx.config.canvas_size);
        let size = Vec2::splat(ctx.config.default_shape_size);
        let mut layer = Layer::shape(self.shape.clone(), Rect::from_min_size(start, size), ctx.config.shape_fill);
        layer.name = ctx.document.next_name(&layer);
        self.drag = Some(ShapeDrag {
            id: layer.id,
            start,
            resized: false,
        });
        Some(Command::AddLayer {
            layer,
            select: false,
            record: None,
        })
    }

    fn on_pointer_move(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command> {
        let drag = self.drag.as_mut()?;
        drag.resized = true;
        let frame = Self::frame(drag.start, pos, ctx.config.canvas_size);
        Some(Command::UpdateLayer {
            id: drag.id,
            patch: LayerPatch::position(frame.min).with_size(frame.width(), frame.height()),
            record: None,
        })
    }

    fn on_pointer_up(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command> {
        let drag = self.drag.take()?;
        let frame = if drag.resized {
            Self::frame(drag.start, pos, ctx.config.canvas_size)
        } else {
            Rect::from_min_size(drag.start, Vec2::splat(ctx.config.default_shape_size))
        };
        let patch = LayerPatch::position(frame.min).with_size(frame.width(), frame.height());
        let min = ctx.config.min_shape_size;
        if frame.width() > min && frame.height() > min {
            return Some(Command::Batch(vec![
                Command::UpdateLayer {
                    id: drag.id,
                    patch,
                    record: None,
                },
                Command::Select {
                    id: Some(drag.id),
                    multi: false,
                },
                Command::Record(HistoryKind::Add),
            ]));
        }
        debug!("Shape {} too small ({:?}); hiding it", drag.id, frame.size());
        Some(Command::UpdateLayer {
            id: drag.id,
            patch: patch.with_visible(false),
            record: None,
        })
    }

    fn is_busy(&self) -> bool {
        self.drag.is_some()
    }

    fn current_state_name(&self) -> &'static str {
        if self.drag.is_some() { "Sizing" } else { "Idle" }
    }
}
