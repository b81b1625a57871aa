//! Wrapping layers into groups and flattening groups back out.
//!
//! While grouped, a child's `x`/`y` are relative to the group origin and the
//! group's rotation, scale and opacity apply on top of the child's own at
//! render time. Ungrouping bakes that composition into the child.
//!
//! Both operations work on a copy of the document that replaces the original
//! only on success, so a failure leaves nothing half applied.

use egui::pos2;
use log::{debug, info};

use crate::document::Document;
use crate::error::{EditorError, EditorResult};
use crate::geometry::union_rects;
use crate::layer::{Layer, LayerId};

/// Wraps `ids` in a new group and returns the group id.
///
/// Needs at least two distinct existing layers that share a parent. The
/// group takes the union of the members' frames and is placed right above
/// the topmost member.
pub fn group_layers(document: &mut Document, ids: &[LayerId]) -> EditorResult<LayerId> {
    let mut working = document.clone();
    let group_id = group_into(&mut working, ids)?;
    *document = working;
    Ok(group_id)
}

fn group_into(document: &mut Document, ids: &[LayerId]) -> EditorResult<LayerId> {
    let mut members: Vec<LayerId> = Vec::new();
    for id in ids {
        if document.contains(*id) && !members.contains(id) {
            members.push(*id);
        }
    }
    if members.len() < 2 {
        return Err(EditorError::GroupTooSmall(members.len()));
    }

    let parent = document.get(members[0]).and_then(|l| l.parent_id);
    if members.iter().any(|id| document.get(*id).map(|l| l.parent_id) != Some(parent)) {
        return Err(EditorError::MixedParents);
    }

    let frame = union_rects(members.iter().filter_map(|id| document.get(*id)).map(Layer::frame))
        .ok_or(EditorError::GroupTooSmall(0))?;
    let top_index = members
        .iter()
        .filter_map(|id| document.index_of(*id))
        .max()
        .ok_or(EditorError::GroupTooSmall(0))?;

    let mut group = Layer::group(frame);
    group.parent_id = parent;
    group.name = document.next_name(&group);
    let group_id = document.insert_layer(top_index + 1, group)?;

    for id in &members {
        document.set_parent(*id, Some(group_id))?;
        if let Some(layer) = document.get_mut(*id) {
            layer.x -= frame.min.x;
            layer.y -= frame.min.y;
        }
    }
    info!("Grouped {} layer(s) into {}", members.len(), group_id);
    Ok(group_id)
}

/// Dissolves a single group, baking its transform into each direct child.
/// Returns the freed children in paint order.
pub fn ungroup_layer(document: &mut Document, group_id: LayerId) -> EditorResult<Vec<LayerId>> {
    let mut working = document.clone();
    let freed = dissolve(&mut working, group_id)?;
    *document = working;
    Ok(freed)
}

fn dissolve(document: &mut Document, group_id: LayerId) -> EditorResult<Vec<LayerId>> {
    let group = document
        .get(group_id)
        .cloned()
        .ok_or(EditorError::LayerNotFound(group_id))?;
    if !group.is_group() {
        return Err(EditorError::NotAGroup(group_id));
    }

    // A dangling owner counts as the root, as in `resolve_root_id`.
    let new_parent = group.parent_id.filter(|p| document.contains(*p));
    let children: Vec<LayerId> = document.children(Some(group_id)).map(|l| l.id).collect();
    let (sin, cos) = group.rotation.to_radians().sin_cos();
    for id in &children {
        document.set_parent(*id, new_parent)?;
        if let Some(child) = document.get_mut(*id) {
            let rel = pos2(child.x * group.scale_x, child.y * group.scale_y);
            child.x = group.x + rel.x * cos - rel.y * sin;
            child.y = group.y + rel.x * sin + rel.y * cos;
            child.rotation += group.rotation;
            child.scale_x *= group.scale_x;
            child.scale_y *= group.scale_y;
            child.opacity = (child.opacity * group.opacity).clamp(0.0, 1.0);
        }
    }

    document.move_below(&children, group_id)?;
    document.delete_layers(&[group_id]);
    info!("Ungrouped {} into {} layer(s)", group_id, children.len());
    Ok(children)
}

/// Ungroups every group in `ids`; other layers are skipped. Fails when none
/// of the ids is a group, or when any group cannot be dissolved, in which
/// case no group is.
pub fn ungroup_layers(document: &mut Document, ids: &[LayerId]) -> EditorResult<Vec<LayerId>> {
    let mut working = document.clone();
    let mut freed = Vec::new();
    let mut any_group = false;
    for id in ids {
        match working.get(*id) {
            Some(layer) if layer.is_group() => {
                any_group = true;
                freed.extend(dissolve(&mut working, *id)?);
            }
            _ => debug!("Skipping ungroup of non-group {}", id),
        }
    }
    if !any_group {
        return Err(ids
            .first()
            .map(|id| EditorError::NotAGroup(*id))
            .unwrap_or(EditorError::NothingToApply));
    }
    *document = working;
    Ok(freed)
}
