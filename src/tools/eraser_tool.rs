use egui::{Color32, Pos2};
use log::{debug, warn};

use crate::command::{Command, HistoryKind};
use crate::compositing::BlendMode;
use crate::document::Document;
use crate::layer::{Layer, LayerId, LayerKind};
use crate::tools::{StrokeBuffer, Tool, ToolContext, ToolKind};

/// Erasing strokes.
///
/// A stroke that starts on an image or line becomes an erase mask owned by
/// that layer, stored in its local space. Anything else produces a
/// top-level destination-out stroke.
#[derive(Debug, Clone, Default)]
pub struct EraserTool {
    buffer: Option<StrokeBuffer>,
    target: Option<LayerId>,
}

impl EraserTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<LayerId> {
        self.target
    }

    fn mask_layer(points: &[Pos2], thickness: f32, target: LayerId, doc: &Document) -> Option<Layer> {
        let host = doc.get(target)?;
        let transform = doc.absolute_transform(target);
        let Some(inverse) = transform.inverse() else {
            warn!("Erase target {} has a degenerate transform", target);
            return None;
        };
        let scale = transform.average_scale();
        let local: Vec<Pos2> = points.iter().map(|p| inverse.apply(*p)).collect();
        let mut layer = Layer::new(
            LayerKind::Line {
                points: local,
                stroke_width: if scale > 0.0 { thickness / scale } else { thickness },
                color: Color32::BLACK,
                original_parent_size: host.mask_host_size(),
            },
            0.0,
            0.0,
        )
        .with_parent(target)
        .with_blend_mode(BlendMode::Erase);
        layer.name = format!("{} mask", host.name);
        Some(layer)
    }
}

impl Tool for EraserTool {
    fn name(&self) -> &'static str {
        "Eraser"
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Eraser
    }

    fn deactivate(&mut self, _doc: &Document) {
        self.buffer = None;
        self.target = None;
    }

    fn on_pointer_down(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command> {
        let thickness = ctx.config.eraser_size / ctx.viewport.scale();
        self.buffer = Some(StrokeBuffer::new(pos, Color32::BLACK, thickness, ctx.config.canvas_size));
        // Nearest layer in the hit chain that can own masks.
        self.target = ctx.hit.as_ref().and_then(|hit| {
            hit.chain()
                .find(|id| ctx.document.get(*id).is_some_and(|l| l.can_host_masks()))
        });
        debug!("Eraser target: {:?}", self.target);
        None
    }

    fn on_pointer_move(&mut self, pos: Pos2, _ctx: &ToolContext<'_>) -> Option<Command> {
        if let Some(buffer) = &mut self.buffer {
            buffer.add_point(pos);
        }
        None
    }

    fn on_pointer_up(&mut self, _pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command> {
        let buffer = self.buffer.take()?;
        let target = self.target.take();
        if !buffer.is_stroke() {
            return None;
        }
        let thickness = buffer.thickness();
        let points = buffer.into_points();

        let layer = match target.and_then(|t| Self::mask_layer(&points, thickness, t, ctx.document)) {
            Some(mask) => mask,
            None => {
                let mut layer = Layer::line(points, thickness, Color32::BLACK).with_blend_mode(BlendMode::Erase);
                layer.name = ctx.document.next_name(&layer);
                layer
            }
        };
        Some(Command::AddLayer {
            layer,
            select: false,
            record: Some(HistoryKind::Erase),
        })
    }

    fn is_busy(&self) -> bool {
        self.buffer.is_some()
    }

    fn coalesces_moves(&self) -> bool {
        false
    }

    fn current_state_name(&self) -> &'static str {
        if self.buffer.is_some() { "Erasing" } else { "Idle" }
    }
}
