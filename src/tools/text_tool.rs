use egui::Pos2;

use crate::command::{Command, HistoryKind};
use crate::document::Document;
use crate::geometry::clamp_point_to_canvas;
use crate::layer::Layer;
use crate::tools::{Tool, ToolContext, ToolKind};

/// Places text layers, also on top of existing ones; double-click edits
/// those. Editing continues in the host's inline overlay, so the tool has no
/// gesture of its own.
#[derive(Debug, Clone, Default)]
pub struct TextTool;

impl TextTool {
    pub fn new() -> Self {
        Self
    }
}

impl Tool for TextTool {
    fn name(&self) -> &'static str {
        "Text"
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Text
    }

    fn deactivate(&mut self, _doc: &Document) {}

    fn on_pointer_down(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command> {
        let defaults = &ctx.config.text;
        let position = clamp_point_to_canvas(pos, ctx.config.canvas_size);
        let mut layer = Layer::text(
            defaults.placeholder.clone(),
            position,
            defaults.font_size,
            defaults.font_family.clone(),
            defaults.fill,
        );
        layer.name = ctx.document.next_name(&layer);
        let id = layer.id;
        Some(Command::Batch(vec![
            Command::AddLayer {
                layer,
                select: true,
                record: Some(HistoryKind::Add),
            },
            Command::BeginTextEdit { id },
        ]))
    }

    fn on_pointer_move(&mut self, _pos: Pos2, _ctx: &ToolContext<'_>) -> Option<Command> {
        None
    }

    fn on_pointer_up(&mut self, _pos: Pos2, _ctx: &ToolContext<'_>) -> Option<Command> {
        None
    }

    fn is_busy(&self) -> bool {
        false
    }

    fn current_state_name(&self) -> &'static str {
        "Idle"
    }
}
