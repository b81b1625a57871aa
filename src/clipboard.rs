use egui::Vec2;
use log::info;

use crate::document::{Document, clone_subtree};
use crate::error::{EditorError, EditorResult};
use crate::layer::{Layer, LayerId};

/// In-process copy buffer holding detached layer subtrees.
///
/// Each paste lands one `offset` further from the originals than the
/// previous paste, so repeated pastes fan out instead of stacking.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    layers: Vec<Layer>,
    roots: Vec<LayerId>,
    paste_count: u32,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Copies `ids` with all of their descendants, in paint order.
    pub fn copy(&mut self, document: &Document, ids: &[LayerId]) -> usize {
        let roots: Vec<LayerId> = document
            .layers()
            .iter()
            .map(|l| l.id)
            .filter(|id| ids.contains(id))
            .collect();
        let mut layers = Vec::new();
        for root in &roots {
            let mut subtree = vec![*root];
            subtree.extend(document.descendants(*root));
            layers.extend(subtree.iter().filter_map(|id| document.get(*id).cloned()));
        }
        self.layers = layers;
        self.roots = roots;
        self.paste_count = 0;
        info!("Copied {} layer(s)", self.roots.len());
        self.roots.len()
    }

    /// Inserts fresh copies at the top of `document` and returns the new
    /// root ids. Copied roots always land at the root level. On error the
    /// document and the paste offset are left as they were.
    pub fn paste(&mut self, document: &mut Document, offset: Vec2) -> EditorResult<Vec<LayerId>> {
        if self.is_empty() {
            return Err(EditorError::NothingToApply);
        }
        let shift = offset * (self.paste_count + 1) as f32;
        let ids: Vec<LayerId> = self.layers.iter().map(|l| l.id).collect();
        let clones = clone_subtree(&self.layers, &ids);

        let mut pasted_roots = Vec::new();
        let mut pending = Vec::with_capacity(clones.len());
        for (original, mut clone) in self.layers.iter().zip(clones) {
            if self.roots.contains(&original.id) {
                clone.parent_id = None;
                clone.x += shift.x;
                clone.y += shift.y;
                pasted_roots.push(clone.id);
            }
            pending.push(clone);
        }

        // Group members precede their group in paint order, so insert in
        // passes until every owner is present.
        let mut working = document.clone();
        while !pending.is_empty() {
            let (ready, rest): (Vec<Layer>, Vec<Layer>) = pending
                .into_iter()
                .partition(|l| l.parent_id.is_none_or(|p| working.contains(p)));
            if ready.is_empty() {
                return Err(EditorError::LayerNotFound(rest[0].parent_id.unwrap_or(rest[0].id)));
            }
            for layer in ready {
                working.add_layer(layer)?;
            }
            pending = rest;
        }
        *document = working;
        self.paste_count += 1;
        Ok(pasted_roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Color32, Rect, pos2, vec2};

    #[test]
    fn test_repeated_paste_accumulates_offset() {
        let mut doc = Document::new();
        let id = doc
            .add_layer(Layer::shape(Default::default(), Rect::from_min_size(pos2(10.0, 10.0), vec2(5.0, 5.0)), Color32::RED))
            .unwrap();
        let mut clipboard = Clipboard::new();
        assert_eq!(clipboard.copy(&doc, &[id]), 1);

        let first = clipboard.paste(&mut doc, vec2(20.0, 20.0)).unwrap();
        let second = clipboard.paste(&mut doc, vec2(20.0, 20.0)).unwrap();
        assert_eq!(doc.get(first[0]).unwrap().position(), pos2(30.0, 30.0));
        assert_eq!(doc.get(second[0]).unwrap().position(), pos2(50.0, 50.0));
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn test_empty_paste_is_refused() {
        let mut doc = Document::new();
        assert_eq!(Clipboard::new().paste(&mut doc, Vec2::ZERO), Err(EditorError::NothingToApply));
    }
}
