use log::debug;

use super::{CommandResult, HistoryKind};
use crate::bridge::StrokeMask;
use crate::document::ReorderDirection;
use crate::error::EditorError;
use crate::event::EditorEvent;
use crate::layer::{Layer, LayerId, LayerPatch};
use crate::state::EditorContext;

/// Mutations produced by tools and editor operations.
///
/// `record` decides whether the change becomes a history entry. Live drag
/// and sizing previews pass `None` and commit once at the end of the gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddLayer {
        layer: Layer,
        select: bool,
        record: Option<HistoryKind>,
    },
    UpdateLayer {
        id: LayerId,
        patch: LayerPatch,
        record: Option<HistoryKind>,
    },
    UpdateLayers {
        updates: Vec<(LayerId, LayerPatch)>,
        record: Option<HistoryKind>,
    },
    /// Removes the layers with their descendants.
    DeleteLayers {
        ids: Vec<LayerId>,
    },
    ReorderLayer {
        id: LayerId,
        direction: ReorderDirection,
    },
    DuplicateLayer {
        id: LayerId,
    },
    GroupSelection,
    UngroupSelection,
    /// Selects the root of `id`; see `Selection::select`.
    Select {
        id: Option<LayerId>,
        multi: bool,
    },
    SetSelection(Vec<LayerId>),
    ClearSelection,
    /// Commits the current document as a history entry.
    Record(HistoryKind),
    BeginTextEdit {
        id: LayerId,
    },
    MaskStroke(StrokeMask),
    /// Runs each command in order. The first failure stops the batch and
    /// rolls back what the earlier commands changed.
    Batch(Vec<Command>),
}

impl Command {
    /// Execute the command against the editor
    pub fn execute(self, editor: &mut EditorContext) -> CommandResult {
        match self {
            Command::AddLayer { layer, select, record } => {
                let id = editor.document.add_layer(layer)?;
                debug!("Added layer {}", id);
                if select {
                    let root = editor.document.resolve_root_id(id);
                    editor.set_selection(vec![root]);
                }
                if let Some(kind) = record {
                    editor.commit(kind);
                }
                Ok(())
            }

            Command::UpdateLayer { id, patch, record } => {
                editor.document.update_layer(id, &patch)?;
                if let Some(kind) = record {
                    editor.commit(kind);
                }
                Ok(())
            }

            Command::UpdateLayers { updates, record } => {
                let mut applied = 0;
                for (id, patch) in &updates {
                    match editor.document.update_layer(*id, patch) {
                        Ok(()) => applied += 1,
                        Err(err) => debug!("Skipping update: {}", err),
                    }
                }
                if applied == 0 {
                    return Err(EditorError::NothingToApply);
                }
                if let Some(kind) = record {
                    editor.commit(kind);
                }
                Ok(())
            }

            Command::DeleteLayers { ids } => {
                if editor.document.delete_layers(&ids).is_empty() {
                    return Err(EditorError::NothingToApply);
                }
                editor.prune_selection();
                editor.commit(HistoryKind::Delete);
                Ok(())
            }

            Command::ReorderLayer { id, direction } => {
                if editor.document.reorder_layer(id, direction)? {
                    editor.commit(HistoryKind::Reorder);
                }
                Ok(())
            }

            Command::DuplicateLayer { id } => {
                let offset = editor.config().duplicate_offset;
                let copy = editor.document.duplicate_layer(id, offset)?;
                let root = editor.document.resolve_root_id(copy);
                editor.set_selection(vec![root]);
                editor.commit(HistoryKind::Duplicate);
                Ok(())
            }

            Command::GroupSelection => editor.group_selection().map(|_| ()),

            Command::UngroupSelection => editor.ungroup_selection().map(|_| ()),

            Command::Select { id, multi } => {
                let root = id.map(|id| editor.document.resolve_root_id(id));
                editor.select(root, multi);
                Ok(())
            }

            Command::SetSelection(ids) => {
                editor.set_selection(ids);
                Ok(())
            }

            Command::ClearSelection => {
                editor.set_selection(Vec::new());
                Ok(())
            }

            Command::Record(kind) => {
                editor.commit(kind);
                Ok(())
            }

            Command::BeginTextEdit { id } => editor.begin_text_edit(id),

            Command::MaskStroke(mask) => {
                editor.emit(EditorEvent::MaskStrokeCompleted(mask));
                Ok(())
            }

            Command::Batch(commands) => {
                let checkpoint = editor.checkpoint();
                for command in commands {
                    if let Err(err) = command.execute(editor) {
                        editor.rollback(checkpoint);
                        return Err(err);
                    }
                }
                Ok(())
            }
        }
    }

    /// Returns true if executing the command may add a history entry
    pub fn records_history(&self) -> bool {
        match self {
            Command::AddLayer { record, .. }
            | Command::UpdateLayer { record, .. }
            | Command::UpdateLayers { record, .. } => record.is_some(),
            Command::DeleteLayers { .. }
            | Command::ReorderLayer { .. }
            | Command::DuplicateLayer { .. }
            | Command::GroupSelection
            | Command::UngroupSelection
            | Command::Record(_) => true,
            Command::Select { .. }
            | Command::SetSelection(_)
            | Command::ClearSelection
            | Command::BeginTextEdit { .. }
            | Command::MaskStroke(_) => false,
            Command::Batch(commands) => commands.iter().any(Command::records_history),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Color32, pos2};

    #[test]
    fn test_records_history() {
        let layer = Layer::text("a", pos2(0.0, 0.0), 10.0, "Arial", Color32::BLACK);
        let preview = Command::AddLayer {
            layer,
            select: false,
            record: None,
        };
        assert!(!preview.records_history());
        assert!(Command::Batch(vec![preview, Command::Record(HistoryKind::Add)]).records_history());
        assert!(!Command::ClearSelection.records_history());
    }
}
