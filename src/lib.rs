#![warn(clippy::all, rust_2018_idioms)]

pub mod bridge;
pub mod clipboard;
pub mod command;
pub mod compositing;
pub mod config;
pub mod document;
pub mod error;
pub mod event;
pub mod geometry;
pub mod grouping;
pub mod input;
pub mod layer;
pub mod renderer;
pub mod selection;
pub mod state;
pub mod tools;
pub mod util;

pub use bridge::{BridgeError, BridgeResult, ImageBackend, ImageData, ImagePlacement, ImageProcessor, PersistenceBridge};
pub use command::{Command, History, HistoryKind};
pub use compositing::{BlendMode, Filters};
pub use config::CanvasConfig;
pub use document::{Document, ReorderDirection};
pub use error::{EditorError, EditorResult};
pub use event::{EditorEvent, EventBus};
pub use geometry::{Transform, Viewport};
pub use input::{FrameQueue, InputEvent, InputLocation, route_event};
pub use layer::{Layer, LayerId, LayerKind, LayerPatch};
pub use renderer::{RenderNode, build_render_tree};
pub use selection::Selection;
pub use state::{DocumentSnapshot, EditorContext, EditorState, TransformUpdate};
pub use tools::{BrushMode, Tool, ToolKind};
