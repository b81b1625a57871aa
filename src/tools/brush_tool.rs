use egui::Pos2;
use log::debug;

use crate::bridge::StrokeMask;
use crate::command::{Command, HistoryKind};
use crate::document::Document;
use crate::layer::{Layer, LayerId, LayerKind};
use crate::tools::{BrushMode, StrokeBuffer, Tool, ToolContext, ToolKind};

/// Freehand drawing. In the assist and heal modes the stroke also marks a
/// region of the image under the pointer for the image bridges.
#[derive(Debug, Clone)]
pub struct BrushTool {
    mode: BrushMode,
    buffer: Option<StrokeBuffer>,
    mask_target: Option<LayerId>,
}

impl BrushTool {
    pub fn new(mode: BrushMode) -> Self {
        Self {
            mode,
            buffer: None,
            mask_target: None,
        }
    }

    pub fn mode(&self) -> BrushMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: BrushMode) {
        self.mode = mode;
    }

    pub fn buffer(&self) -> Option<&StrokeBuffer> {
        self.buffer.as_ref()
    }
}

impl Tool for BrushTool {
    fn name(&self) -> &'static str {
        "Brush"
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Brush
    }

    fn deactivate(&mut self, _doc: &Document) {
        self.buffer = None;
        self.mask_target = None;
    }

    fn on_pointer_down(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command> {
        let thickness = ctx.config.brush.size / ctx.viewport.scale();
        self.buffer = Some(StrokeBuffer::new(pos, ctx.config.brush.color, thickness, ctx.config.canvas_size));
        self.mask_target = None;

        if self.mode == BrushMode::Paint {
            return None;
        }
        let image = ctx.hit.as_ref().and_then(|hit| {
            hit.chain()
                .find(|id| matches!(ctx.document.get(*id).map(|l| &l.kind), Some(LayerKind::Image { .. })))
        })?;
        self.mask_target = Some(image);
        Some(Command::Select {
            id: Some(ctx.document.resolve_root_id(image)),
            multi: false,
        })
    }

    fn on_pointer_move(&mut self, pos: Pos2, _ctx: &ToolContext<'_>) -> Option<Command> {
        if let Some(buffer) = &mut self.buffer {
            buffer.add_point(pos);
        }
        None
    }

    fn on_pointer_up(&mut self, _pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command> {
        let buffer = self.buffer.take()?;
        let target = self.mask_target.take();
        if !buffer.is_stroke() {
            debug!("Discarding single-point brush stroke");
            return None;
        }
        let (color, thickness) = (buffer.color(), buffer.thickness());
        let points = buffer.into_points();
        let mut layer = Layer::line(points.clone(), thickness, color);
        layer.name = ctx.document.next_name(&layer);
        let add = Command::AddLayer {
            layer,
            select: false,
            record: Some(HistoryKind::Draw),
        };
        if self.mode == BrushMode::Paint {
            return Some(add);
        }
        Some(Command::Batch(vec![
            add,
            Command::MaskStroke(StrokeMask {
                target,
                points,
                brush_size: thickness,
                mode: self.mode,
            }),
        ]))
    }

    fn is_busy(&self) -> bool {
        self.buffer.is_some()
    }

    fn coalesces_moves(&self) -> bool {
        false
    }

    fn current_state_name(&self) -> &'static str {
        if self.buffer.is_some() { "Drawing" } else { "Idle" }
    }
}
