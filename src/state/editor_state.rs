/// The interaction state machine of the canvas editor.
///
/// The editor is either idle, in the middle of a pointer gesture owned by
/// one tool, or waiting for the host's inline text editor to finish.
///
/// # State Transitions
///
/// ```text
///              ┌─────────────┐
///        ┌─────►   Gesture   ├─────┐
///        │     └─────────────┘     │
/// ┌──────┴───┐                 ┌───▼──────┐
/// │   Idle   │                 │   Idle   │
/// └──────┬───┘                 └───▲──────┘
///        │     ┌─────────────┐     │
///        └─────► TextEditing ├─────┘
///              └─────────────┘
/// ```
///
/// Gesture scratch data (stroke buffers, drag origins) stays inside the
/// tool; this state only records who owns the pointer.
use serde::{Deserialize, Serialize};

use crate::error::{EditorError, EditorResult};
use crate::layer::LayerId;
use crate::tools::ToolKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum EditorState {
    /// No active operation
    #[default]
    Idle,
    /// A pointer-down to pointer-up sequence handled by `tool`
    Gesture { tool: ToolKind },
    /// The host overlay is editing the text of `layer_id`
    TextEditing {
        layer_id: LayerId,
        /// Text at the start of the session, to detect real changes.
        original: String,
    },
}

impl EditorState {
    /// Validates whether a transition to the new state is allowed
    pub fn can_transition_to(&self, new_state: &EditorState) -> bool {
        matches!(
            (self, new_state),
            (EditorState::Idle, EditorState::Gesture { .. })
                | (EditorState::Idle, EditorState::TextEditing { .. })
                | (EditorState::Gesture { .. }, EditorState::Idle)
                | (EditorState::TextEditing { .. }, EditorState::Idle)
        )
    }

    /// Moves to `new_state` if the transition is allowed.
    pub fn transition_to(&mut self, new_state: EditorState) -> EditorResult<()> {
        if !self.can_transition_to(&new_state) {
            return Err(EditorError::InvalidTransition {
                from: self.name(),
                to: new_state.name(),
            });
        }
        *self = new_state;
        Ok(())
    }

    pub fn name(&self) -> &'static str {
        match self {
            EditorState::Idle => "Idle",
            EditorState::Gesture { .. } => "Gesture",
            EditorState::TextEditing { .. } => "TextEditing",
        }
    }

    /// Returns true if the editor is currently in an idle state
    pub fn is_idle(&self) -> bool {
        matches!(self, EditorState::Idle)
    }

    pub fn is_gesture(&self) -> bool {
        matches!(self, EditorState::Gesture { .. })
    }

    pub fn editing_layer(&self) -> Option<LayerId> {
        match self {
            EditorState::TextEditing { layer_id, .. } => Some(*layer_id),
            _ => None,
        }
    }
}
