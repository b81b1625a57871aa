use std::collections::VecDeque;

use egui::{Key, Modifiers, PointerButton};
use log::debug;

use super::InputEvent;
use crate::document::ReorderDirection;
use crate::state::EditorContext;

/// Keyboard commands understood by the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
    Delete,
    Group,
    Ungroup,
    Duplicate,
    Copy,
    Cut,
    Paste,
    SelectAll,
    Deselect,
    BringForward,
    SendBackward,
}

/// Maps a key press to its shortcut. Ctrl and the platform command key are
/// interchangeable.
pub fn shortcut_for(key: Key, modifiers: Modifiers) -> Option<Shortcut> {
    let command = modifiers.command || modifiers.ctrl;
    let shortcut = match (key, command, modifiers.shift) {
        (Key::Z, true, false) => Shortcut::Undo,
        (Key::Z, true, true) | (Key::Y, true, false) => Shortcut::Redo,
        (Key::Delete | Key::Backspace, false, _) => Shortcut::Delete,
        (Key::G, true, false) => Shortcut::Group,
        (Key::G, true, true) => Shortcut::Ungroup,
        (Key::D, true, false) => Shortcut::Duplicate,
        (Key::C, true, false) => Shortcut::Copy,
        (Key::X, true, false) => Shortcut::Cut,
        (Key::V, true, false) => Shortcut::Paste,
        (Key::A, true, false) => Shortcut::SelectAll,
        (Key::Escape, _, _) => Shortcut::Deselect,
        (Key::CloseBracket, true, false) => Shortcut::BringForward,
        (Key::OpenBracket, true, false) => Shortcut::SendBackward,
        _ => return None,
    };
    Some(shortcut)
}

/// Routes an input event to the editor. Returns true if the event changed
/// anything.
pub fn route_event(event: &InputEvent, editor: &mut EditorContext) -> bool {
    match event {
        InputEvent::PointerDown {
            location,
            button,
            modifiers,
        } => {
            if *button != PointerButton::Primary {
                return false;
            }
            editor.set_modifiers(*modifiers);
            editor.pointer_down(location.position)
        }
        InputEvent::PointerMove { location } => editor.pointer_move(location.position),
        InputEvent::PointerUp { location, button } => {
            *button == PointerButton::Primary && editor.pointer_up(location.position)
        }
        InputEvent::PointerLeave { .. } => editor.pointer_cancel(),
        InputEvent::DoubleClick { location } => editor.double_click(location.position),
        InputEvent::KeyDown { key, modifiers } => match shortcut_for(*key, *modifiers) {
            Some(shortcut) => apply_shortcut(shortcut, editor),
            None => false,
        },
    }
}

fn apply_shortcut(shortcut: Shortcut, editor: &mut EditorContext) -> bool {
    // The host's text overlay owns the keyboard while editing.
    if editor.state().editing_layer().is_some() {
        if shortcut == Shortcut::Deselect {
            editor.cancel_text_edit();
            return true;
        }
        return false;
    }
    debug!("Shortcut {:?}", shortcut);
    match shortcut {
        Shortcut::Undo => editor.undo(),
        Shortcut::Redo => editor.redo(),
        Shortcut::Delete => editor.delete_selection(),
        Shortcut::Group => editor.group_selection().is_ok(),
        Shortcut::Ungroup => editor.ungroup_selection().is_ok(),
        Shortcut::Duplicate => !editor.duplicate_selection().is_empty(),
        Shortcut::Copy => editor.copy() > 0,
        Shortcut::Cut => editor.cut(),
        Shortcut::Paste => !editor.paste().is_empty(),
        Shortcut::SelectAll => {
            editor.select_all();
            true
        }
        Shortcut::Deselect => {
            let had_selection = !editor.selection().is_empty();
            editor.clear_selection();
            had_selection
        }
        Shortcut::BringForward | Shortcut::SendBackward => {
            let direction = if shortcut == Shortcut::BringForward {
                ReorderDirection::Up
            } else {
                ReorderDirection::Down
            };
            let ids = editor.selection().ids().to_vec();
            ids.into_iter().fold(false, |changed, id| editor.reorder_layer(id, direction) || changed)
        }
    }
}

/// Collects input between frames. On flush, consecutive pointer moves
/// collapse to the latest one unless the active tool needs every point.
#[derive(Debug, Default)]
pub struct FrameQueue {
    pending: VecDeque<InputEvent>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.pending.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Routes the queued events and returns how many were delivered.
    pub fn flush(&mut self, editor: &mut EditorContext) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.pending.pop_front() {
            let superseded = matches!(event, InputEvent::PointerMove { .. })
                && matches!(self.pending.front(), Some(InputEvent::PointerMove { .. }))
                && editor.coalesces_moves();
            if superseded {
                continue;
            }
            route_event(&event, editor);
            delivered += 1;
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcut_table() {
        assert_eq!(shortcut_for(Key::Z, Modifiers::COMMAND), Some(Shortcut::Undo));
        assert_eq!(shortcut_for(Key::Z, Modifiers::COMMAND | Modifiers::SHIFT), Some(Shortcut::Redo));
        assert_eq!(shortcut_for(Key::Y, Modifiers::CTRL), Some(Shortcut::Redo));
        assert_eq!(shortcut_for(Key::Backspace, Modifiers::NONE), Some(Shortcut::Delete));
        assert_eq!(shortcut_for(Key::G, Modifiers::CTRL | Modifiers::SHIFT), Some(Shortcut::Ungroup));
        assert_eq!(shortcut_for(Key::Z, Modifiers::NONE), None);
    }
}
