use serde::{Deserialize, Serialize};

use crate::layer::Layer;
use crate::util::time;

/// What kind of edit produced a history entry. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryKind {
    Initial,
    Add,
    Delete,
    Move,
    Resize,
    Rotate,
    Transform,
    Rename,
    Group,
    Ungroup,
    Paste,
    Duplicate,
    Reorder,
    Draw,
    Erase,
    Text,
    Style,
    Visibility,
    Generate,
}

impl HistoryKind {
    pub fn label(&self) -> &'static str {
        match self {
            HistoryKind::Initial => "Initial state",
            HistoryKind::Add => "Add layer",
            HistoryKind::Delete => "Delete",
            HistoryKind::Move => "Move",
            HistoryKind::Resize => "Resize",
            HistoryKind::Rotate => "Rotate",
            HistoryKind::Transform => "Transform",
            HistoryKind::Rename => "Rename",
            HistoryKind::Group => "Group",
            HistoryKind::Ungroup => "Ungroup",
            HistoryKind::Paste => "Paste",
            HistoryKind::Duplicate => "Duplicate",
            HistoryKind::Reorder => "Reorder",
            HistoryKind::Draw => "Draw",
            HistoryKind::Erase => "Erase",
            HistoryKind::Text => "Edit text",
            HistoryKind::Style => "Style",
            HistoryKind::Visibility => "Visibility",
            HistoryKind::Generate => "Generate image",
        }
    }
}

/// A full copy of the document layers at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub layers: Vec<Layer>,
    pub description: HistoryKind,
    /// Milliseconds since the UNIX epoch.
    pub timestamp: u64,
}

impl HistoryEntry {
    pub fn new(layers: Vec<Layer>, description: HistoryKind) -> Self {
        Self {
            layers,
            description,
            timestamp: time::timestamp_millis(),
        }
    }
}

/// Linear snapshot timeline with a cursor.
///
/// The timeline is never empty and `cursor` always indexes a valid entry.
/// Committing after an undo drops the entries past the cursor, so redo is
/// only possible until the next edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    limit: Option<usize>,
    /// Bumped on every commit, including ones that evict old entries.
    #[serde(skip)]
    revision: u64,
}

impl History {
    pub fn new(initial: Vec<Layer>) -> Self {
        Self {
            entries: vec![HistoryEntry::new(initial, HistoryKind::Initial)],
            cursor: 0,
            limit: None,
            revision: 0,
        }
    }

    /// Caps the number of retained entries; the oldest ones are dropped first.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.map(|l| l.max(1));
        self.enforce_limit();
        self
    }

    pub fn commit(&mut self, layers: Vec<Layer>, description: HistoryKind) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(HistoryEntry::new(layers, description));
        self.cursor = self.entries.len() - 1;
        self.revision += 1;
        self.enforce_limit();
    }

    fn enforce_limit(&mut self) {
        if let Some(limit) = self.limit {
            if self.entries.len() > limit {
                let excess = self.entries.len() - limit;
                self.entries.drain(..excess);
                self.cursor = self.cursor.saturating_sub(excess);
            }
        }
    }

    /// Steps back one entry; `None` at the start of the timeline.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Steps forward one entry; `None` at the end of the timeline.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn jump_to_step(&mut self, step: usize) -> Option<&HistoryEntry> {
        if step >= self.entries.len() {
            return None;
        }
        self.cursor = step;
        self.entries.get(step)
    }

    /// Replaces the whole timeline with a single initial entry.
    pub fn reset(&mut self, layers: Vec<Layer>) {
        self.entries = vec![HistoryEntry::new(layers, HistoryKind::Initial)];
        self.cursor = 0;
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.cursor]
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub(crate) fn revision(&self) -> u64 {
        self.revision
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: the timeline keeps at least its initial entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }
}
