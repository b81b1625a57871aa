//! The editor facade that owns the document and coordinates every other
//! component.
//!
//! `EditorContext` is the only place commands run. Tools see a read-only
//! [`ToolContext`] and hand back [`Command`]s; the context executes them,
//! keeps the selection consistent with the document, records history and
//! emits events.
//!
//! # Example
//!
//! ```rust
//! use eframe_canvas::{CanvasConfig, EditorContext, ToolKind};
//! use egui::pos2;
//!
//! let mut editor = EditorContext::new(CanvasConfig::default()).unwrap();
//! editor.set_tool(ToolKind::Brush);
//! editor.pointer_down(pos2(10.0, 10.0));
//! editor.pointer_move(pos2(20.0, 20.0));
//! editor.pointer_move(pos2(30.0, 30.0));
//! editor.pointer_up(pos2(30.0, 30.0));
//! assert_eq!(editor.document().len(), 1);
//! assert!(editor.undo());
//! assert!(editor.document().is_empty());
//! ```

use egui::{Modifiers, Pos2, Vec2};
use log::{debug, info, warn};

use super::{DocumentSnapshot, EditorState};
use crate::bridge::{BridgeResult, ExtractedImage, ImageData, ImagePlacement};
use crate::clipboard::Clipboard;
use crate::command::{Command, History, HistoryKind};
use crate::compositing::{BlendMode, Filters};
use crate::config::CanvasConfig;
use crate::document::{Document, ReorderDirection};
use crate::error::{EditorError, EditorResult};
use crate::event::{
    DeferredNotifier, EditorEvent, EventBus, EventHandler, HistoryListener, HistoryNotice, TextEditRequest,
};
use crate::geometry::Viewport;
use crate::geometry::hit_testing::{GeometricHitTester, HitPath, HitTester};
use crate::grouping;
use crate::layer::{Layer, LayerId, LayerKind, LayerPatch, ShapeKind};
use crate::renderer::{RenderNode, build_render_tree};
use crate::selection::Selection;
use crate::tools::{BrushMode, Tool, ToolContext, ToolKind, ToolType};
use crate::util::time;

/// Result of the host's transformer widget for one layer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransformUpdate {
    pub position: Option<Pos2>,
    /// Degrees.
    pub rotation: Option<f32>,
    pub scale: Option<Vec2>,
    pub size: Option<Vec2>,
}

/// Document and selection captured before a batch of commands.
pub(crate) struct Checkpoint {
    document: Document,
    selection: Vec<LayerId>,
    revision: u64,
}

#[derive(Debug, Clone, Copy)]
enum PointerPhase {
    Down,
    Move,
    Up,
}

pub struct EditorContext {
    pub(crate) document: Document,
    selection: Selection,
    history: History,
    state: EditorState,
    tool: ToolType,
    viewport: Viewport,
    config: CanvasConfig,
    clipboard: Clipboard,
    hit_tester: Box<dyn HitTester>,
    event_bus: EventBus,
    notifier: DeferredNotifier,
    listeners: Vec<Box<dyn HistoryListener>>,
    modifiers: Modifiers,
    /// Last pointer position in logical space.
    last_pointer: Option<Pos2>,
}

impl std::fmt::Debug for EditorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorContext")
            .field("layers", &self.document.len())
            .field("selection", &self.selection)
            .field("history_cursor", &self.history.cursor())
            .field("state", &self.state)
            .field("tool", &self.tool.name())
            .field("viewport", &self.viewport)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EditorContext {
    pub fn new(config: CanvasConfig) -> EditorResult<Self> {
        Self::with_document(config, Document::new())
    }

    /// Starts editing `document`; it becomes the initial history entry.
    pub fn with_document(config: CanvasConfig, document: Document) -> EditorResult<Self> {
        config.validate()?;
        let history = History::new(document.layers().to_vec()).with_limit(config.history_limit);
        let hit_tester = GeometricHitTester {
            tolerance: config.hit_tolerance,
        };
        Ok(Self {
            document,
            selection: Selection::new(),
            history,
            state: EditorState::Idle,
            tool: ToolType::new(ToolKind::default(), &config),
            viewport: Viewport::default(),
            config,
            clipboard: Clipboard::new(),
            hit_tester: Box::new(hit_tester),
            event_bus: EventBus::new(),
            notifier: DeferredNotifier::new(),
            listeners: Vec::new(),
            modifiers: Modifiers::NONE,
            last_pointer: None,
        })
    }

    /// Replaces the geometric hit tester, e.g. with one backed by the host's
    /// scene graph.
    pub fn with_hit_tester(mut self, hit_tester: Box<dyn HitTester>) -> Self {
        self.hit_tester = hit_tester;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn tool(&self) -> &ToolType {
        &self.tool
    }

    pub fn active_tool(&self) -> ToolKind {
        self.tool.kind()
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Modifier keys applied to subsequent pointer events.
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.event_bus.subscribe(handler);
    }

    pub fn add_history_listener(&mut self, listener: Box<dyn HistoryListener>) {
        self.listeners.push(listener);
    }

    /// Shared handle to the pending history notice.
    pub fn notifier(&self) -> DeferredNotifier {
        self.notifier.clone()
    }

    /// Whether intermediate pointer moves may be dropped for the active tool.
    pub fn coalesces_moves(&self) -> bool {
        self.tool.coalesces_moves()
    }

    // Pointer handling

    /// Screen-space pointer press.
    pub fn pointer_down(&mut self, screen: Pos2) -> bool {
        if self.state.editing_layer().is_some() {
            self.cancel_text_edit();
        }
        if self.state.is_gesture() {
            warn!("Pointer down during an active gesture, finishing it first");
            self.finish_gesture();
        }
        let pos = self.viewport.screen_to_logical(screen);
        self.last_pointer = Some(pos);
        let hit = self.hit_tester.hit_test(&self.document, pos);
        debug!("Pointer down at {:?} on {:?}", pos, hit.as_ref().map(|h| h.layer));

        let command = self.dispatch(PointerPhase::Down, pos, hit);
        if self.tool.is_busy() {
            let gesture = EditorState::Gesture { tool: self.tool.kind() };
            if let Err(err) = self.state.transition_to(gesture) {
                warn!("Could not start gesture: {}", err);
            }
        }
        command.is_some_and(|command| self.execute(command))
    }

    pub fn pointer_move(&mut self, screen: Pos2) -> bool {
        let pos = self.viewport.screen_to_logical(screen);
        self.last_pointer = Some(pos);
        if !self.state.is_gesture() {
            return false;
        }
        match self.dispatch(PointerPhase::Move, pos, None) {
            Some(command) => self.execute(command),
            None => false,
        }
    }

    pub fn pointer_up(&mut self, screen: Pos2) -> bool {
        let pos = self.viewport.screen_to_logical(screen);
        self.last_pointer = Some(pos);
        if !self.state.is_gesture() {
            return false;
        }
        self.end_gesture(pos)
    }

    /// Ends an interrupted gesture at the last known position, as if the
    /// pointer had been released there.
    pub fn pointer_cancel(&mut self) -> bool {
        if !self.state.is_gesture() {
            return false;
        }
        let tool = self.tool.kind();
        info!("Cancelling {} gesture", self.tool.name());
        self.emit(EditorEvent::GestureCancelled { tool });
        self.finish_gesture()
    }

    /// Double-click on a text layer begins editing it, whatever the tool.
    pub fn double_click(&mut self, screen: Pos2) -> bool {
        if self.state.is_gesture() {
            self.finish_gesture();
        }
        let pos = self.viewport.screen_to_logical(screen);
        let Some(hit) = self.hit_tester.hit_test(&self.document, pos) else {
            return false;
        };
        if !self.document.get(hit.layer).is_some_and(Layer::is_text) {
            return false;
        }
        match self.begin_text_edit(hit.layer) {
            Ok(()) => true,
            Err(err) => {
                warn!("Could not edit text: {}", err);
                false
            }
        }
    }

    fn dispatch(&mut self, phase: PointerPhase, pos: Pos2, hit: Option<HitPath>) -> Option<Command> {
        let ctx = ToolContext {
            document: &self.document,
            selection: &self.selection,
            config: &self.config,
            viewport: &self.viewport,
            hit,
            modifiers: self.modifiers,
        };
        match phase {
            PointerPhase::Down => self.tool.on_pointer_down(pos, &ctx),
            PointerPhase::Move => self.tool.on_pointer_move(pos, &ctx),
            PointerPhase::Up => self.tool.on_pointer_up(pos, &ctx),
        }
    }

    fn end_gesture(&mut self, pos: Pos2) -> bool {
        let command = self.dispatch(PointerPhase::Up, pos, None);
        if let Err(err) = self.state.transition_to(EditorState::Idle) {
            warn!("Could not end gesture: {}", err);
        }
        command.is_some_and(|command| self.execute(command))
    }

    fn finish_gesture(&mut self) -> bool {
        match self.last_pointer {
            Some(pos) if self.state.is_gesture() => self.end_gesture(pos),
            _ => false,
        }
    }

    // Tools

    /// Switches tools. An unfinished gesture is finished first and the
    /// selection is cleared.
    pub fn set_tool(&mut self, kind: ToolKind) {
        let old = self.tool.kind();
        if old == kind {
            return;
        }
        self.finish_gesture();
        self.cancel_text_edit();
        self.tool.deactivate(&self.document);
        self.tool = ToolType::new(kind, &self.config);
        self.tool.activate(&self.document);
        self.set_selection(Vec::new());
        info!("Switched tool {:?} -> {:?}", old, kind);
        self.emit(EditorEvent::ToolChanged { old, new: kind });
    }

    /// Changes the brush sub-mode, activating the brush if needed.
    pub fn set_brush_mode(&mut self, mode: BrushMode) {
        self.set_tool(ToolKind::Brush);
        if let Some(brush) = self.tool.as_brush_mut() {
            brush.set_mode(mode);
        }
    }

    /// Sets the shape drawn by the shape tool.
    pub fn set_shape(&mut self, shape: ShapeKind) {
        self.config.shape = shape.clone();
        self.tool.set_shape(shape);
    }

    // History

    pub fn undo(&mut self) -> bool {
        self.finish_gesture();
        self.cancel_text_edit();
        let layers = self.history.undo().map(|entry| entry.layers.clone());
        self.restore(layers)
    }

    pub fn redo(&mut self) -> bool {
        self.finish_gesture();
        self.cancel_text_edit();
        let layers = self.history.redo().map(|entry| entry.layers.clone());
        self.restore(layers)
    }

    pub fn jump_to_step(&mut self, step: usize) -> bool {
        self.finish_gesture();
        self.cancel_text_edit();
        let layers = self.history.jump_to_step(step).map(|entry| entry.layers.clone());
        self.restore(layers)
    }

    fn restore(&mut self, layers: Option<Vec<Layer>>) -> bool {
        let Some(layers) = layers else {
            return false;
        };
        self.document = Document::from_layers(layers);
        self.prune_selection();
        self.announce_history(true);
        true
    }

    /// Replaces the document and starts a fresh history.
    pub fn load_document(&mut self, document: Document) {
        self.finish_gesture();
        self.cancel_text_edit();
        info!("Loading document with {} layer(s)", document.len());
        self.history.reset(document.layers().to_vec());
        self.document = document;
        self.set_selection(Vec::new());
        self.notifier.cancel();
        self.announce_history(false);
    }

    pub fn load_snapshot(&mut self, snapshot: DocumentSnapshot) {
        self.load_document(snapshot.into_document());
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot::new(&self.document)
    }

    /// Records the current document as a new history entry.
    pub(crate) fn commit(&mut self, kind: HistoryKind) {
        self.history.commit(self.document.layers().to_vec(), kind);
        debug!("Committed '{}' at step {}", kind.label(), self.history.cursor());
        self.announce_history(true);
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            document: self.document.clone(),
            selection: self.selection.ids().to_vec(),
            revision: self.history.revision(),
        }
    }

    /// Undoes a partially applied batch. If the batch already committed, the
    /// document returns to that entry so it keeps matching history.
    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        self.document = if self.history.revision() == checkpoint.revision {
            checkpoint.document
        } else {
            Document::from_layers(self.history.current().layers.clone())
        };
        warn!("Rolled back a partially applied batch");
        self.set_selection(checkpoint.selection);
    }

    fn announce_history(&mut self, schedule: bool) {
        let cursor = self.history.cursor();
        let len = self.history.len();
        let description = self.history.current().description;
        self.emit(EditorEvent::HistoryChanged {
            cursor,
            len,
            description,
        });
        if schedule {
            self.notifier.schedule(HistoryNotice {
                cursor,
                len,
                description,
                timestamp: time::timestamp_millis(),
            });
        }
    }

    /// Delivers the pending history notice to listeners. Returns true if
    /// there was one.
    pub fn run_idle(&mut self) -> bool {
        let Some(notice) = self.notifier.take() else {
            return false;
        };
        for listener in self.listeners.iter_mut() {
            listener.on_history_committed(&notice, &self.document);
        }
        true
    }

    // Selection

    pub(crate) fn set_selection(&mut self, ids: Vec<LayerId>) {
        let next = Selection::from_ids(ids.into_iter().filter(|id| self.document.contains(*id)));
        self.replace_selection(next);
    }

    pub(crate) fn select(&mut self, id: Option<LayerId>, multi: bool) {
        let mut next = self.selection.clone();
        next.select(id, multi);
        self.replace_selection(next);
    }

    /// Drops selected ids that no longer exist.
    pub(crate) fn prune_selection(&mut self) {
        let mut next = self.selection.clone();
        if next.retain_existing(&self.document) {
            self.replace_selection(next);
        }
    }

    fn replace_selection(&mut self, next: Selection) {
        if next == self.selection {
            return;
        }
        self.selection = next;
        let selected = self.selection.ids().to_vec();
        self.emit(EditorEvent::SelectionChanged { selected });
    }

    /// Selects every visible root layer.
    pub fn select_all(&mut self) {
        let ids = self
            .document
            .root_layers()
            .filter(|layer| layer.visible)
            .map(|layer| layer.id)
            .collect();
        self.set_selection(ids);
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(Vec::new());
    }

    // Document operations

    /// Runs `command`, logging and absorbing failures.
    pub fn execute(&mut self, command: Command) -> bool {
        match command.execute(self) {
            Ok(()) => true,
            Err(err) => {
                warn!("Command failed: {}", err);
                false
            }
        }
    }

    pub fn delete_selection(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        let ids = self.selection.ids().to_vec();
        self.execute(Command::DeleteLayers { ids })
    }

    /// Duplicates each selected layer; the copies become the selection.
    pub fn duplicate_selection(&mut self) -> Vec<LayerId> {
        let offset = self.config.duplicate_offset;
        let mut copies = Vec::new();
        for id in self.selection.ids().to_vec() {
            match self.document.duplicate_layer(id, offset) {
                Ok(copy) => copies.push(copy),
                Err(err) => warn!("Could not duplicate {}: {}", id, err),
            }
        }
        if !copies.is_empty() {
            self.set_selection(copies.clone());
            self.commit(HistoryKind::Duplicate);
        }
        copies
    }

    /// Groups the selected layers; the new group becomes the selection.
    pub fn group_selection(&mut self) -> EditorResult<LayerId> {
        let ids = self.selection.ids().to_vec();
        let group = grouping::group_layers(&mut self.document, &ids)?;
        self.set_selection(vec![group]);
        self.commit(HistoryKind::Group);
        Ok(group)
    }

    /// Dissolves the selected groups; their former children become the
    /// selection.
    pub fn ungroup_selection(&mut self) -> EditorResult<Vec<LayerId>> {
        let ids = self.selection.ids().to_vec();
        let freed = grouping::ungroup_layers(&mut self.document, &ids)?;
        self.set_selection(freed.clone());
        self.commit(HistoryKind::Ungroup);
        Ok(freed)
    }

    pub fn reorder_layer(&mut self, id: LayerId, direction: ReorderDirection) -> bool {
        self.execute(Command::ReorderLayer { id, direction })
    }

    pub fn rename_layer(&mut self, id: LayerId, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.document.get(id).is_some_and(|layer| layer.name == name) {
            return false;
        }
        self.update_with(id, LayerPatch::new().with_name(name), HistoryKind::Rename)
    }

    pub fn set_visibility(&mut self, id: LayerId, visible: bool) -> bool {
        if self.document.get(id).is_some_and(|layer| layer.visible == visible) {
            return false;
        }
        self.update_with(id, LayerPatch::new().with_visible(visible), HistoryKind::Visibility)
    }

    /// Applies style attributes such as opacity, fill or outline.
    pub fn set_style(&mut self, id: LayerId, patch: LayerPatch) -> bool {
        if patch.is_empty() {
            return false;
        }
        self.update_with(id, patch, HistoryKind::Style)
    }

    pub fn set_filters(&mut self, id: LayerId, filters: Filters) -> bool {
        self.set_style(id, LayerPatch::new().with_filters(filters))
    }

    pub fn set_blend_mode(&mut self, id: LayerId, blend_mode: BlendMode) -> bool {
        self.set_style(id, LayerPatch::new().with_blend_mode(blend_mode))
    }

    fn update_with(&mut self, id: LayerId, patch: LayerPatch, kind: HistoryKind) -> bool {
        self.execute(Command::UpdateLayer {
            id,
            patch,
            record: Some(kind),
        })
    }

    /// Merges the host transformer's result into `id`, bakes the scale into
    /// the layer's own geometry and records what changed.
    pub fn apply_transform(&mut self, id: LayerId, update: TransformUpdate) -> EditorResult<HistoryKind> {
        let before = self.document.get(id).ok_or(EditorError::LayerNotFound(id))?;
        let moved = update.position.is_some_and(|p| p != before.position());
        let rotated = update.rotation.is_some_and(|r| r != before.rotation);
        let scaled = update.scale.is_some_and(|s| s.x != before.scale_x || s.y != before.scale_y);
        let sized = update.size.is_some_and(|s| before.size() != Some(s));
        let kind = match (moved, rotated, scaled || sized) {
            (false, false, false) => return Err(EditorError::NothingToApply),
            (true, false, false) => HistoryKind::Move,
            (false, true, false) => HistoryKind::Rotate,
            (false, false, true) => HistoryKind::Resize,
            _ => HistoryKind::Transform,
        };

        let mut patch = LayerPatch::new();
        if let Some(position) = update.position {
            patch.x = Some(position.x);
            patch.y = Some(position.y);
        }
        patch.rotation = update.rotation;
        if let Some(scale) = update.scale {
            patch = patch.with_scale(scale.x, scale.y);
        }
        if let Some(size) = update.size {
            patch = patch.with_size(size.x, size.y);
        }
        let mut working = self.document.clone();
        working.update_layer(id, &patch)?;
        working.complete_transform(id)?;
        self.document = working;
        self.commit(kind);
        Ok(kind)
    }

    // Clipboard

    pub fn copy(&mut self) -> usize {
        self.clipboard.copy(&self.document, self.selection.ids())
    }

    pub fn cut(&mut self) -> bool {
        self.copy() > 0 && self.delete_selection()
    }

    pub fn paste(&mut self) -> Vec<LayerId> {
        match self.clipboard.paste(&mut self.document, self.config.duplicate_offset) {
            Ok(roots) => {
                self.set_selection(roots.clone());
                self.commit(HistoryKind::Paste);
                roots
            }
            Err(err) => {
                debug!("Nothing pasted: {}", err);
                Vec::new()
            }
        }
    }

    // Text editing

    /// Opens an inline edit session for the text layer `id`.
    pub(crate) fn begin_text_edit(&mut self, id: LayerId) -> EditorResult<()> {
        let layer = self.document.get(id).ok_or(EditorError::LayerNotFound(id))?;
        let LayerKind::Text {
            text,
            font_size,
            font_family,
            fill,
        } = &layer.kind
        else {
            return Err(EditorError::NothingToApply);
        };
        let rotation = layer.rotation
            + self
                .document
                .ancestors(id)
                .iter()
                .filter_map(|a| self.document.get(*a))
                .map(|a| a.rotation)
                .sum::<f32>();
        let request = TextEditRequest {
            layer_id: id,
            text: text.clone(),
            position: self.document.absolute_transform(id).apply(Pos2::ZERO),
            rotation,
            font_size: *font_size,
            font_family: font_family.clone(),
            fill: *fill,
        };
        self.state.transition_to(EditorState::TextEditing {
            layer_id: id,
            original: text.clone(),
        })?;
        debug!("Editing text of {}", id);
        self.emit(EditorEvent::TextEditRequested(request));
        Ok(())
    }

    /// Ends the edit session, writing `text` back when it differs from the
    /// text the session started with.
    pub fn commit_text_edit(&mut self, text: &str) -> bool {
        if self.state.editing_layer().is_none() {
            return false;
        }
        let EditorState::TextEditing { layer_id, original } = std::mem::take(&mut self.state) else {
            return false;
        };
        if text == original || !self.document.contains(layer_id) {
            return false;
        }
        self.update_with(layer_id, LayerPatch::new().with_text(text), HistoryKind::Text)
    }

    pub fn cancel_text_edit(&mut self) {
        if let Some(id) = self.state.editing_layer() {
            debug!("Cancelled text edit of {}", id);
            self.state = EditorState::Idle;
        }
    }

    // Bridge results

    /// Applies a finished image request. Failures are logged and returned
    /// without touching the document.
    pub fn apply_image_result(
        &mut self,
        result: BridgeResult<ImageData>,
        placement: ImagePlacement,
    ) -> BridgeResult<LayerId> {
        let data = result.inspect_err(|err| warn!("Image request failed: {}", err))?;
        let size = data
            .dimensions()
            .inspect_err(|err| warn!("Discarding undecodable image: {}", err))?;

        let id = match placement {
            ImagePlacement::NewLayer { position } => {
                let mut layer = Layer::image(data.to_source(), position, size);
                layer.name = self.document.next_name(&layer);
                let id = self.document.add_layer(layer)?;
                self.set_selection(vec![id]);
                id
            }
            ImagePlacement::Replace(id) => {
                let target = self.document.get(id).ok_or(EditorError::LayerNotFound(id))?;
                if !matches!(target.kind, LayerKind::Image { .. }) {
                    return Err(EditorError::NothingToApply.into());
                }
                self.document
                    .update_layer(id, &LayerPatch::new().with_src(data.to_source()))?;
                id
            }
        };
        info!("Applied image result to {}", id);
        self.commit(HistoryKind::Generate);
        Ok(id)
    }

    /// Adds each extracted piece as a new image layer directly above
    /// `source`, offset from the source's origin.
    pub fn apply_extraction(
        &mut self,
        source: LayerId,
        result: BridgeResult<Vec<ExtractedImage>>,
    ) -> BridgeResult<Vec<LayerId>> {
        let pieces = result.inspect_err(|err| warn!("Extraction failed: {}", err))?;
        let origin = self.document.get(source).ok_or(EditorError::LayerNotFound(source))?;
        let (position, parent) = (origin.position(), origin.parent_id);

        let mut layers = Vec::with_capacity(pieces.len());
        for piece in &pieces {
            let size = piece
                .image
                .dimensions()
                .inspect_err(|err| warn!("Discarding undecodable extraction: {}", err))?;
            let mut layer = Layer::image(piece.image.to_source(), position + piece.offset, size);
            layer.parent_id = parent;
            layers.push(layer);
        }
        if layers.is_empty() {
            return Ok(Vec::new());
        }

        let mut index = self.document.index_of(source).map_or(self.document.len(), |i| i + 1);
        let mut ids = Vec::with_capacity(layers.len());
        for mut layer in layers {
            layer.name = self.document.next_name(&layer);
            ids.push(self.document.insert_layer(index, layer)?);
            index += 1;
        }
        info!("Extracted {} layer(s) from {}", ids.len(), source);
        self.set_selection(ids.clone());
        self.commit(HistoryKind::Add);
        Ok(ids)
    }

    // Output

    pub fn render_tree(&self) -> Vec<RenderNode> {
        build_render_tree(&self.document)
    }

    pub(crate) fn emit(&self, event: EditorEvent) {
        self.event_bus.emit(event);
    }
}
