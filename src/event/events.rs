use egui::{Color32, Pos2};

use crate::bridge::StrokeMask;
use crate::command::HistoryKind;
use crate::layer::LayerId;
use crate::tools::ToolKind;

/// Payload for the host's inline text editor overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEditRequest {
    pub layer_id: LayerId,
    pub text: String,
    /// Canvas-space origin of the text layer.
    pub position: Pos2,
    pub rotation: f32,
    pub font_size: f32,
    pub font_family: String,
    pub fill: Color32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    HistoryChanged {
        cursor: usize,
        len: usize,
        description: HistoryKind,
    },
    SelectionChanged {
        selected: Vec<LayerId>,
    },
    ToolChanged {
        old: ToolKind,
        new: ToolKind,
    },
    TextEditRequested(TextEditRequest),
    /// A brush stroke in an image-processing mode finished; the host turns it
    /// into a mask for the processing bridge.
    MaskStrokeCompleted(StrokeMask),
    GestureCancelled {
        tool: ToolKind,
    },
}
