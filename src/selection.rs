use egui::Rect;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::geometry::rect_within;
use crate::layer::LayerId;

/// The set of selected root-level layers, in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    ids: Vec<LayerId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids(ids: impl IntoIterator<Item = LayerId>) -> Self {
        let mut selection = Self::new();
        for id in ids {
            if !selection.contains(id) {
                selection.ids.push(id);
            }
        }
        selection
    }

    pub fn ids(&self) -> &[LayerId] {
        &self.ids
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// `multi` toggles `id`; otherwise the selection becomes `{id}`.
    /// `None` clears unless `multi` is set, in which case nothing changes.
    pub fn select(&mut self, id: Option<LayerId>, multi: bool) {
        match (id, multi) {
            (Some(id), true) => {
                if let Some(pos) = self.ids.iter().position(|s| *s == id) {
                    self.ids.remove(pos);
                } else {
                    self.ids.push(id);
                }
            }
            (Some(id), false) => {
                self.ids.clear();
                self.ids.push(id);
            }
            (None, false) => self.ids.clear(),
            (None, true) => {}
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drops ids that no longer exist in `document`. Returns true if any were removed.
    pub fn retain_existing(&mut self, document: &Document) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| document.contains(*id));
        self.ids.len() != before
    }

    /// True when some selected layer sticks out of `canvas`. A background
    /// click then keeps the selection so off-canvas layers stay reachable.
    pub fn has_out_of_bounds(&self, document: &Document, canvas: Rect) -> bool {
        self.ids
            .iter()
            .filter_map(|id| document.absolute_bounds(*id))
            .any(|bounds| !rect_within(bounds, canvas))
    }
}
