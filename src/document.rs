//! The ordered, flat collection of layers.
//!
//! Layers refer to their owner through `parent_id`; child lists are derived
//! by filtering so reparenting never has to patch child arrays. List order
//! is paint order: later layers draw on top of earlier siblings.

use std::collections::{HashMap, HashSet};

use egui::{Rect, Vec2, pos2};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{EditorError, EditorResult};
use crate::geometry::Transform;
use crate::layer::{Layer, LayerId, LayerKind, LayerPatch};

/// Direction for `reorder_layer`. "Up" moves toward the front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReorderDirection {
    Up,
    Down,
    ToFront,
    ToBack,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    layers: Vec<Layer>,
}

impl Document {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Builds a document from untrusted layers: later duplicates of an id are
    /// dropped and parent links that would close a cycle are cut.
    pub fn from_layers(layers: Vec<Layer>) -> Self {
        let mut seen = HashSet::new();
        let mut doc = Self {
            layers: layers
                .into_iter()
                .filter(|layer| {
                    let fresh = seen.insert(layer.id);
                    if !fresh {
                        warn!("Dropping duplicate layer id {}", layer.id);
                    }
                    fresh
                })
                .collect(),
        };
        doc.break_parent_cycles();
        doc
    }

    fn break_parent_cycles(&mut self) {
        let ids: Vec<LayerId> = self.layers.iter().map(|l| l.id).collect();
        for id in ids {
            if self.chain_has_cycle(id) {
                warn!("Breaking parent cycle at layer {}", id);
                if let Some(layer) = self.get_mut(id) {
                    layer.parent_id = None;
                }
            }
        }
    }

    /// True when following parents from `id` revisits a layer.
    fn chain_has_cycle(&self, id: LayerId) -> bool {
        let mut visited = HashSet::from([id]);
        let mut current = self.get(id).and_then(|l| l.parent_id);
        while let Some(parent) = current {
            if !visited.insert(parent) {
                return true;
            }
            current = self.get(parent).and_then(|l| l.parent_id);
        }
        false
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn into_layers(self) -> Vec<Layer> {
        self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Direct children of `parent` in paint order; `None` yields root layers.
    pub fn children(&self, parent: Option<LayerId>) -> impl Iterator<Item = &Layer> + '_ {
        self.layers.iter().filter(move |l| l.parent_id == parent)
    }

    /// Layers without a parent, bottom to top.
    pub fn root_layers(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.children(None)
    }

    /// Parent chain of `id`, nearest first. Stops at an unknown parent.
    pub fn ancestors(&self, id: LayerId) -> Vec<LayerId> {
        let mut chain = Vec::new();
        let mut current = self.get(id).and_then(|l| l.parent_id);
        while let Some(parent) = current {
            if !self.contains(parent) || chain.contains(&parent) || parent == id {
                break;
            }
            chain.push(parent);
            current = self.get(parent).and_then(|l| l.parent_id);
        }
        chain
    }

    /// Walks `parent_id` upward to the outermost ancestor present in the
    /// document. Ids that are not found are already treated as roots.
    pub fn resolve_root_id(&self, id: LayerId) -> LayerId {
        self.ancestors(id).last().copied().unwrap_or(id)
    }

    /// All transitive descendants of `id`, found by fixed-point iteration.
    pub fn descendants(&self, id: LayerId) -> Vec<LayerId> {
        let closure = self.closure_with_descendants(&[id]);
        self.layers
            .iter()
            .map(|l| l.id)
            .filter(|candidate| *candidate != id && closure.contains(candidate))
            .collect()
    }

    fn closure_with_descendants(&self, ids: &[LayerId]) -> HashSet<LayerId> {
        let mut doomed: HashSet<LayerId> = ids.iter().copied().filter(|id| self.contains(*id)).collect();
        loop {
            let before = doomed.len();
            for layer in &self.layers {
                if let Some(parent) = layer.parent_id {
                    if doomed.contains(&parent) {
                        doomed.insert(layer.id);
                    }
                }
            }
            if doomed.len() == before {
                return doomed;
            }
        }
    }

    fn validate_parent(&self, child: &Layer, parent: LayerId) -> EditorResult<()> {
        let parent_layer = self.get(parent).ok_or(EditorError::LayerNotFound(parent))?;
        let allowed = match parent_layer.kind {
            LayerKind::Group => true,
            LayerKind::Image { .. } | LayerKind::Line { .. } => child.is_erase_mask() && parent_layer.can_host_masks(),
            _ => false,
        };
        if !allowed {
            return Err(EditorError::InvalidParent {
                child: child.id,
                parent,
            });
        }
        if parent == child.id || self.ancestors(parent).contains(&child.id) {
            return Err(EditorError::ParentCycle {
                child: child.id,
                parent,
            });
        }
        Ok(())
    }

    /// Appends a layer on top of the paint order.
    pub fn add_layer(&mut self, layer: Layer) -> EditorResult<LayerId> {
        let index = self.layers.len();
        self.insert_layer(index, layer)
    }

    /// Inserts a layer at `index` (clamped to the list length).
    pub fn insert_layer(&mut self, index: usize, layer: Layer) -> EditorResult<LayerId> {
        if self.contains(layer.id) {
            return Err(EditorError::DuplicateId(layer.id));
        }
        if let Some(parent) = layer.parent_id {
            self.validate_parent(&layer, parent)?;
        }
        let id = layer.id;
        let index = index.min(self.layers.len());
        self.layers.insert(index, layer);
        Ok(id)
    }

    /// Shallow attribute merge.
    pub fn update_layer(&mut self, id: LayerId, patch: &LayerPatch) -> EditorResult<()> {
        let layer = self.get_mut(id).ok_or(EditorError::LayerNotFound(id))?;
        patch.apply(layer);
        Ok(())
    }

    /// Moves `id` under `parent` (or to the root). Position is left as is.
    pub(crate) fn set_parent(&mut self, id: LayerId, parent: Option<LayerId>) -> EditorResult<()> {
        let layer = self.get(id).ok_or(EditorError::LayerNotFound(id))?;
        if let Some(parent) = parent {
            self.validate_parent(layer, parent)?;
        }
        if let Some(layer) = self.get_mut(id) {
            layer.parent_id = parent;
        }
        Ok(())
    }

    /// Moves `ids` (in the given order) so they sit contiguously right below
    /// `anchor` in paint order.
    pub(crate) fn move_below(&mut self, ids: &[LayerId], anchor: LayerId) -> EditorResult<()> {
        if !self.contains(anchor) {
            return Err(EditorError::LayerNotFound(anchor));
        }
        let mut moved = Vec::with_capacity(ids.len());
        for id in ids {
            if *id == anchor {
                continue;
            }
            if let Some(index) = self.index_of(*id) {
                moved.push(self.layers.remove(index));
            }
        }
        let at = self.index_of(anchor).ok_or(EditorError::LayerNotFound(anchor))?;
        self.layers.splice(at..at, moved);
        Ok(())
    }

    /// Removes `ids` and all of their transitive descendants, returning the
    /// removed layers in their former order.
    pub fn delete_layers(&mut self, ids: &[LayerId]) -> Vec<Layer> {
        let doomed = self.closure_with_descendants(ids);
        if doomed.is_empty() {
            return Vec::new();
        }
        let (removed, kept): (Vec<Layer>, Vec<Layer>) =
            std::mem::take(&mut self.layers).into_iter().partition(|l| doomed.contains(&l.id));
        self.layers = kept;
        info!("Deleted {} layer(s)", removed.len());
        removed
    }

    /// Swaps `id` with its nearest sibling in `direction`. Returns `false`
    /// when the layer is already at that end of its sibling list.
    pub fn reorder_layer(&mut self, id: LayerId, direction: ReorderDirection) -> EditorResult<bool> {
        let layer = self.get(id).ok_or(EditorError::LayerNotFound(id))?;
        let parent = layer.parent_id;
        let siblings: Vec<usize> = self
            .layers
            .iter()
            .enumerate()
            .filter(|(_, l)| l.parent_id == parent)
            .map(|(i, _)| i)
            .collect();
        let Some(pos) = siblings.iter().position(|&i| self.layers[i].id == id) else {
            return Ok(false);
        };
        let path: Vec<usize> = match direction {
            ReorderDirection::Up => siblings.get(pos + 1).copied().into_iter().collect(),
            ReorderDirection::Down => pos.checked_sub(1).map(|p| siblings[p]).into_iter().collect(),
            ReorderDirection::ToFront => siblings[pos + 1..].to_vec(),
            ReorderDirection::ToBack => siblings[..pos].iter().rev().copied().collect(),
        };
        if path.is_empty() {
            return Ok(false);
        }
        let mut current = siblings[pos];
        for next in path {
            self.layers.swap(current, next);
            current = next;
        }
        Ok(true)
    }

    /// Clones `id` and its whole subtree with fresh ids. The top clone is
    /// nudged by `offset`, keeps the parent and lands right above the original.
    pub fn duplicate_layer(&mut self, id: LayerId, offset: Vec2) -> EditorResult<LayerId> {
        let index = self.index_of(id).ok_or(EditorError::LayerNotFound(id))?;
        let mut subtree = vec![id];
        subtree.extend(self.descendants(id));
        let clones = clone_subtree(&self.layers, &subtree);
        let top = clones[0].id;
        let mut insert_at = index + 1;
        for (i, mut clone) in clones.into_iter().enumerate() {
            if i == 0 {
                clone.x += offset.x;
                clone.y += offset.y;
            }
            self.layers.insert(insert_at.min(self.layers.len()), clone);
            insert_at += 1;
        }
        Ok(top)
    }

    /// Transform from `id`'s local space to logical canvas space.
    pub fn absolute_transform(&self, id: LayerId) -> Transform {
        let Some(layer) = self.get(id) else {
            return Transform::IDENTITY;
        };
        self.ancestors(id)
            .iter()
            .rev()
            .filter_map(|a| self.get(*a))
            .fold(Transform::IDENTITY, |acc, a| acc.then(&a.local_transform()))
            .then(&layer.local_transform())
    }

    pub fn absolute_opacity(&self, id: LayerId) -> f32 {
        let own = self.get(id).map(|l| l.opacity).unwrap_or(1.0);
        self.ancestors(id)
            .iter()
            .filter_map(|a| self.get(*a))
            .fold(own, |acc, a| acc * a.opacity)
    }

    /// Bakes the layer's scale into its geometry. Line layers scale their
    /// points about the origin, so their erase masks get the same factors.
    pub fn complete_transform(&mut self, id: LayerId) -> EditorResult<()> {
        let layer = self.get_mut(id).ok_or(EditorError::LayerNotFound(id))?;
        let (sx, sy) = (layer.scale_x, layer.scale_y);
        let is_line = matches!(layer.kind, LayerKind::Line { .. });
        layer.complete_transform();
        if !is_line || ((sx - 1.0).abs() <= f32::EPSILON && (sy - 1.0).abs() <= f32::EPSILON) {
            return Ok(());
        }
        for mask in self.layers.iter_mut() {
            if mask.parent_id != Some(id) || !mask.is_erase_mask() {
                continue;
            }
            mask.x *= sx;
            mask.y *= sy;
            if let LayerKind::Line { points, stroke_width, .. } = &mut mask.kind {
                for point in points.iter_mut() {
                    *point = pos2(point.x * sx, point.y * sy);
                }
                *stroke_width *= (sx + sy) / 2.0;
            }
        }
        Ok(())
    }

    /// Axis-aligned box of the layer's rendered content in canvas space.
    /// Groups use the union of their visible children.
    pub fn absolute_bounds(&self, id: LayerId) -> Option<Rect> {
        let layer = self.get(id)?;
        if layer.is_group() {
            return crate::geometry::union_rects(
                self.children(Some(id))
                    .filter(|c| c.visible && !c.is_erase_mask())
                    .filter_map(|c| self.absolute_bounds(c.id)),
            );
        }
        let local = layer.local_bounds();
        if !local.is_finite() {
            return None;
        }
        Some(self.absolute_transform(id).map_rect(local))
    }

    /// Default display name for a new layer of the same type.
    pub fn next_name(&self, layer: &Layer) -> String {
        let kind = layer.layer_type();
        let count = self.layers.iter().filter(|l| l.layer_type() == kind).count();
        format!("{} {}", kind.label(), count + 1)
    }
}

/// Copies the layers in `ids` with fresh ids, rewriting parent links inside
/// the copied set. Order follows `ids`.
pub(crate) fn clone_subtree(layers: &[Layer], ids: &[LayerId]) -> Vec<Layer> {
    let remap: HashMap<LayerId, LayerId> = ids.iter().map(|id| (*id, LayerId::new())).collect();
    ids.iter()
        .filter_map(|id| layers.iter().find(|l| l.id == *id))
        .map(|layer| {
            let mut clone = layer.clone();
            clone.id = remap[&layer.id];
            clone.parent_id = layer.parent_id.map(|p| remap.get(&p).copied().unwrap_or(p));
            clone
        })
        .collect()
}
