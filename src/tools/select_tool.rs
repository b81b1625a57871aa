use egui::{Pos2, Vec2};
use log::debug;

use crate::command::{Command, HistoryKind};
use crate::document::Document;
use crate::layer::{LayerId, LayerPatch};
use crate::tools::{Tool, ToolContext, ToolKind};

/// Gesture state of the select tool.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectState {
    Idle,
    Dragging {
        start: Pos2,
        /// Copies of each dragged layer's position at pointer-down.
        origins: Vec<(LayerId, Pos2)>,
        /// The drag began on empty canvas.
        from_background: bool,
        moved: bool,
    },
}

/// Click-to-select and drag-to-move for root layers.
///
/// Drags are not clamped: existing layers may be moved fully off canvas.
#[derive(Debug, Clone)]
pub struct SelectTool {
    state: SelectState,
    drag_enabled: bool,
}

impl Default for SelectTool {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectTool {
    pub fn new() -> Self {
        Self {
            state: SelectState::Idle,
            drag_enabled: true,
        }
    }

    /// Selection without dragging, used while the generation panel is active.
    pub fn click_only() -> Self {
        Self {
            state: SelectState::Idle,
            drag_enabled: false,
        }
    }

    pub fn state(&self) -> &SelectState {
        &self.state
    }

    fn begin_drag(&mut self, start: Pos2, ids: &[LayerId], doc: &Document, from_background: bool) {
        let origins: Vec<(LayerId, Pos2)> = ids
            .iter()
            .filter_map(|id| doc.get(*id).map(|l| (*id, l.position())))
            .collect();
        if origins.is_empty() {
            return;
        }
        debug!("Drag of {} layer(s) started at {:?}", origins.len(), start);
        self.state = SelectState::Dragging {
            start,
            origins,
            from_background,
            moved: false,
        };
    }
}

fn moved_positions(origins: &[(LayerId, Pos2)], delta: Vec2) -> Vec<(LayerId, LayerPatch)> {
    origins
        .iter()
        .map(|(id, origin)| (*id, LayerPatch::position(*origin + delta)))
        .collect()
}

impl Tool for SelectTool {
    fn name(&self) -> &'static str {
        if self.drag_enabled { "Select" } else { "AI Generate" }
    }

    fn kind(&self) -> ToolKind {
        if self.drag_enabled { ToolKind::Select } else { ToolKind::AiGen }
    }

    fn deactivate(&mut self, _doc: &Document) {
        self.state = SelectState::Idle;
    }

    fn on_pointer_down(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command> {
        self.state = SelectState::Idle;
        let multi = ctx.multi_select();

        let Some(hit) = &ctx.hit else {
            if ctx.selection.is_empty() {
                return None;
            }
            if self.drag_enabled {
                // Empty-canvas press drags the current selection; a plain
                // click deselects on release.
                self.begin_drag(pos, ctx.selection.ids(), ctx.document, true);
                return None;
            }
            if ctx.selection.has_out_of_bounds(ctx.document, ctx.config.canvas_rect()) {
                return None;
            }
            return Some(Command::ClearSelection);
        };

        let root = ctx.document.resolve_root_id(hit.layer);
        let already_selected = ctx.selection.contains(root);
        let (command, dragged): (Option<Command>, Vec<LayerId>) = if multi {
            let mut next: Vec<LayerId> = ctx.selection.ids().to_vec();
            if already_selected {
                next.retain(|id| *id != root);
            } else {
                next.push(root);
            }
            let drag = if already_selected { Vec::new() } else { next };
            (Some(Command::Select { id: Some(root), multi: true }), drag)
        } else if already_selected {
            (None, ctx.selection.ids().to_vec())
        } else {
            (Some(Command::Select { id: Some(root), multi: false }), vec![root])
        };

        if self.drag_enabled && !dragged.is_empty() {
            self.begin_drag(pos, &dragged, ctx.document, false);
        }
        command
    }

    fn on_pointer_move(&mut self, pos: Pos2, _ctx: &ToolContext<'_>) -> Option<Command> {
        let SelectState::Dragging { start, origins, moved, .. } = &mut self.state else {
            return None;
        };
        let delta = pos - *start;
        if delta == Vec2::ZERO && !*moved {
            return None;
        }
        *moved = true;
        Some(Command::UpdateLayers {
            updates: moved_positions(origins, delta),
            record: None,
        })
    }

    fn on_pointer_up(&mut self, pos: Pos2, ctx: &ToolContext<'_>) -> Option<Command> {
        let SelectState::Dragging {
            start,
            origins,
            from_background,
            moved,
        } = std::mem::replace(&mut self.state, SelectState::Idle)
        else {
            return None;
        };

        let delta = pos - start;
        if delta != Vec2::ZERO {
            debug!("Drag finished with delta {:?}", delta);
            return Some(Command::UpdateLayers {
                updates: moved_positions(&origins, delta),
                record: Some(HistoryKind::Move),
            });
        }

        let restore = moved.then(|| Command::UpdateLayers {
            updates: moved_positions(&origins, Vec2::ZERO),
            record: None,
        });
        let deselect = from_background
            && !ctx.selection.has_out_of_bounds(ctx.document, ctx.config.canvas_rect());
        match (restore, deselect) {
            (Some(restore), true) => Some(Command::Batch(vec![restore, Command::ClearSelection])),
            (Some(restore), false) => Some(restore),
            (None, true) => Some(Command::ClearSelection),
            (None, false) => None,
        }
    }

    fn is_busy(&self) -> bool {
        matches!(self.state, SelectState::Dragging { .. })
    }

    fn current_state_name(&self) -> &'static str {
        match self.state {
            SelectState::Idle => "Idle",
            SelectState::Dragging { .. } => "Dragging",
        }
    }
}
