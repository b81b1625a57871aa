use eframe_canvas::grouping::group_layers;
use eframe_canvas::{
    CanvasConfig, Command, Document, EditorContext, HistoryKind, Layer, LayerId, LayerPatch, ReorderDirection,
};
use egui::{Color32, Rect, pos2, vec2};

fn square(x: f32, y: f32) -> Layer {
    Layer::shape(Default::default(), Rect::from_min_size(pos2(x, y), vec2(10.0, 10.0)), Color32::GRAY)
}

/// Two groups nested inside each other: outer { inner { a, b }, c }.
fn nested() -> (Document, LayerId, LayerId, [LayerId; 3]) {
    let mut doc = Document::new();
    let a = doc.add_layer(square(0.0, 0.0)).unwrap();
    let b = doc.add_layer(square(20.0, 0.0)).unwrap();
    let c = doc.add_layer(square(40.0, 40.0)).unwrap();
    let inner = group_layers(&mut doc, &[a, b]).unwrap();
    let outer = group_layers(&mut doc, &[inner, c]).unwrap();
    (doc, outer, inner, [a, b, c])
}

#[test]
fn test_delete_cascades_through_nested_groups() {
    let (mut doc, outer, _, _) = nested();
    let survivor = doc.add_layer(square(100.0, 100.0)).unwrap();

    let removed = doc.delete_layers(&[outer]);
    assert_eq!(removed.len(), 5);
    assert_eq!(doc.len(), 1);
    assert!(doc.contains(survivor));
}

#[test]
fn test_nested_layer_resolves_to_outer_root() {
    let (doc, outer, inner, [a, _, c]) = nested();
    assert_eq!(doc.resolve_root_id(a), outer);
    assert_eq!(doc.resolve_root_id(c), outer);
    assert_eq!(doc.ancestors(a), vec![inner, outer]);
    assert_eq!(doc.descendants(outer).len(), 4);
}

#[test]
fn test_reorder_at_edges_is_a_no_op() {
    let mut doc = Document::new();
    let bottom = doc.add_layer(square(0.0, 0.0)).unwrap();
    let top = doc.add_layer(square(5.0, 5.0)).unwrap();

    assert_eq!(doc.reorder_layer(top, ReorderDirection::Up), Ok(false));
    assert_eq!(doc.reorder_layer(bottom, ReorderDirection::Down), Ok(false));
    assert_eq!(doc.reorder_layer(bottom, ReorderDirection::Up), Ok(true));
    assert_eq!(doc.index_of(bottom), Some(1));
}

#[test]
fn test_duplicate_copies_subtree_with_offset() {
    let (mut doc, outer, _, _) = nested();
    let copy = doc.duplicate_layer(outer, vec2(20.0, 20.0)).unwrap();

    assert_eq!(doc.len(), 10);
    let original = doc.get(outer).unwrap().position();
    assert_eq!(doc.get(copy).unwrap().position(), original + vec2(20.0, 20.0));
    let copied = doc.descendants(copy);
    assert_eq!(copied.len(), 4);
    assert!(copied.iter().all(|id| doc.resolve_root_id(*id) == copy));
}

#[test]
fn test_failed_batch_rolls_back_earlier_commands() {
    let mut editor = EditorContext::new(CanvasConfig::default()).unwrap();
    let added = square(0.0, 0.0);
    let added_id = added.id;
    let batch = Command::Batch(vec![
        Command::AddLayer {
            layer: added,
            select: true,
            record: None,
        },
        Command::UpdateLayer {
            id: LayerId::new(),
            patch: LayerPatch::position(pos2(5.0, 5.0)),
            record: Some(HistoryKind::Move),
        },
    ]);

    assert!(!editor.execute(batch));
    assert!(!editor.document().contains(added_id));
    assert!(editor.selection().is_empty());
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn test_failed_batch_keeps_what_it_already_committed() {
    let mut editor = EditorContext::new(CanvasConfig::default()).unwrap();
    let kept = square(0.0, 0.0);
    let dropped = square(30.0, 0.0);
    let (kept_id, dropped_id) = (kept.id, dropped.id);
    let batch = Command::Batch(vec![
        Command::AddLayer {
            layer: kept,
            select: false,
            record: Some(HistoryKind::Add),
        },
        Command::AddLayer {
            layer: dropped,
            select: false,
            record: None,
        },
        Command::DuplicateLayer { id: LayerId::new() },
    ]);

    assert!(!editor.execute(batch));
    assert!(editor.document().contains(kept_id));
    assert!(!editor.document().contains(dropped_id));
    assert_eq!(editor.document().layers(), editor.history().current().layers.as_slice());
    assert_eq!(editor.history().len(), 2);
}
