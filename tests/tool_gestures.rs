use std::sync::{Arc, Mutex};

use eframe_canvas::layer::ImageSource;
use eframe_canvas::{
    BlendMode, BrushMode, CanvasConfig, Document, EditorContext, EditorEvent, HistoryKind, Layer, LayerId, LayerKind,
    ToolKind,
};
use egui::{Color32, Rect, pos2, vec2};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn editor_with(layers: Vec<Layer>) -> EditorContext {
    init();
    EditorContext::with_document(CanvasConfig::default(), Document::from_layers(layers)).unwrap()
}

fn square(x: f32, y: f32, size: f32) -> Layer {
    Layer::shape(Default::default(), Rect::from_min_size(pos2(x, y), vec2(size, size)), Color32::GRAY)
}

fn record_events(editor: &EditorContext) -> Arc<Mutex<Vec<EditorEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    editor.subscribe(Box::new(move |event: &EditorEvent| sink.lock().unwrap().push(event.clone())));
    events
}

#[test]
fn test_brush_commits_one_line() {
    let mut editor = editor_with(Vec::new());
    editor.set_tool(ToolKind::Brush);
    editor.pointer_down(pos2(10.0, 10.0));
    editor.pointer_move(pos2(20.0, 20.0));
    editor.pointer_move(pos2(30.0, 30.0));
    editor.pointer_up(pos2(30.0, 30.0));

    assert_eq!(editor.document().len(), 1);
    match &editor.document().layers()[0].kind {
        LayerKind::Line { points, .. } => assert_eq!(points.len(), 3),
        other => panic!("expected a line, got {other:?}"),
    }
    assert_eq!(editor.history().len(), 2);
    assert_eq!(editor.history().current().description, HistoryKind::Draw);
    assert!(editor.state().is_idle());
}

#[test]
fn test_single_point_brush_commits_nothing() {
    let mut editor = editor_with(Vec::new());
    editor.set_tool(ToolKind::Brush);
    editor.pointer_down(pos2(10.0, 10.0));
    editor.pointer_up(pos2(10.0, 10.0));

    assert!(editor.document().is_empty());
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn test_brush_points_are_clamped_to_canvas() {
    let mut editor = editor_with(Vec::new());
    editor.set_tool(ToolKind::Brush);
    editor.pointer_down(pos2(-50.0, 10.0));
    editor.pointer_move(pos2(2000.0, 3000.0));
    editor.pointer_up(pos2(2000.0, 3000.0));

    match &editor.document().layers()[0].kind {
        LayerKind::Line { points, .. } => assert_eq!(points, &vec![pos2(0.0, 10.0), pos2(1024.0, 1024.0)]),
        other => panic!("expected a line, got {other:?}"),
    }
}

#[test]
fn test_small_shape_is_hidden_not_committed() {
    let mut editor = editor_with(Vec::new());
    editor.set_tool(ToolKind::Shape);
    editor.pointer_down(pos2(100.0, 100.0));
    editor.pointer_move(pos2(103.0, 103.0));
    editor.pointer_up(pos2(103.0, 103.0));

    assert_eq!(editor.document().len(), 1);
    assert!(!editor.document().layers()[0].visible);
    assert_eq!(editor.history().len(), 1);

    editor.pointer_down(pos2(200.0, 200.0));
    editor.pointer_up(pos2(200.0, 200.0));
    let placed = &editor.document().layers()[1];
    assert!(placed.visible);
    assert_eq!(placed.size(), Some(vec2(100.0, 100.0)));
    assert_eq!(editor.history().current().description, HistoryKind::Add);
    assert_eq!(editor.selection().ids(), &[placed.id]);
}

#[test]
fn test_drag_move_commits_once() {
    let layer = square(10.0, 10.0, 50.0);
    let id = layer.id;
    let mut editor = editor_with(vec![layer]);

    editor.pointer_down(pos2(20.0, 20.0));
    editor.pointer_move(pos2(30.0, 30.0));
    editor.pointer_move(pos2(40.0, 40.0));
    assert_eq!(editor.history().len(), 1);
    editor.pointer_up(pos2(40.0, 40.0));

    assert_eq!(editor.document().get(id).unwrap().position(), pos2(30.0, 30.0));
    assert_eq!(editor.history().len(), 2);
    assert_eq!(editor.history().current().description, HistoryKind::Move);

    // A click without movement selects but records nothing.
    editor.pointer_down(pos2(35.0, 35.0));
    editor.pointer_up(pos2(35.0, 35.0));
    assert_eq!(editor.history().len(), 2);
    assert_eq!(editor.selection().ids(), &[id]);
}

#[test]
fn test_drag_is_not_clamped() {
    let layer = square(10.0, 10.0, 50.0);
    let id = layer.id;
    let mut editor = editor_with(vec![layer]);

    editor.pointer_down(pos2(20.0, 20.0));
    editor.pointer_move(pos2(-200.0, 20.0));
    editor.pointer_up(pos2(-200.0, 20.0));
    assert_eq!(editor.document().get(id).unwrap().position(), pos2(-210.0, 10.0));
}

#[test]
fn test_background_click_deselects() {
    let layer = square(10.0, 10.0, 50.0);
    let id = layer.id;
    let mut editor = editor_with(vec![layer]);

    editor.pointer_down(pos2(20.0, 20.0));
    editor.pointer_up(pos2(20.0, 20.0));
    assert_eq!(editor.selection().ids(), &[id]);

    editor.pointer_down(pos2(500.0, 500.0));
    editor.pointer_up(pos2(500.0, 500.0));
    assert!(editor.selection().is_empty());
}

#[test]
fn test_background_click_keeps_off_canvas_selection() {
    let layer = square(-100.0, -100.0, 50.0);
    let id = layer.id;
    let mut editor = editor_with(vec![layer]);

    editor.pointer_down(pos2(-80.0, -80.0));
    editor.pointer_up(pos2(-80.0, -80.0));
    assert_eq!(editor.selection().ids(), &[id]);

    editor.pointer_down(pos2(500.0, 500.0));
    editor.pointer_up(pos2(500.0, 500.0));
    assert_eq!(editor.selection().ids(), &[id]);
}

#[test]
fn test_background_drag_moves_selection() {
    let layer = square(10.0, 10.0, 50.0);
    let id = layer.id;
    let mut editor = editor_with(vec![layer]);
    editor.pointer_down(pos2(20.0, 20.0));
    editor.pointer_up(pos2(20.0, 20.0));

    editor.pointer_down(pos2(500.0, 500.0));
    editor.pointer_move(pos2(510.0, 505.0));
    editor.pointer_up(pos2(510.0, 505.0));
    assert_eq!(editor.document().get(id).unwrap().position(), pos2(20.0, 15.0));
    assert_eq!(editor.selection().ids(), &[id]);
}

#[test]
fn test_click_on_grouped_child_selects_outer_group() {
    let a = square(0.0, 0.0, 10.0);
    let b = square(20.0, 0.0, 10.0);
    let c = square(40.0, 40.0, 10.0);
    let a_id = a.id;
    let mut editor = editor_with(vec![a.clone(), b.clone(), c.clone()]);

    editor.execute(eframe_canvas::Command::SetSelection(vec![a.id, b.id]));
    let inner = editor.group_selection().unwrap();
    editor.execute(eframe_canvas::Command::SetSelection(vec![inner, c.id]));
    let outer = editor.group_selection().unwrap();
    editor.clear_selection();

    editor.pointer_down(pos2(5.0, 5.0));
    editor.pointer_up(pos2(5.0, 5.0));
    assert_eq!(editor.document().resolve_root_id(a_id), outer);
    assert_eq!(editor.selection().ids(), &[outer]);
}

#[test]
fn test_eraser_stroke_becomes_mask_of_hit_image() {
    let image = Layer::image(ImageSource::Uri("a.png".into()), pos2(100.0, 100.0), vec2(200.0, 200.0));
    let image_id = image.id;
    let mut editor = editor_with(vec![image]);
    editor.set_tool(ToolKind::Eraser);

    editor.pointer_down(pos2(150.0, 150.0));
    editor.pointer_move(pos2(160.0, 160.0));
    editor.pointer_up(pos2(160.0, 160.0));

    let mask = &editor.document().layers()[1];
    assert_eq!(mask.parent_id, Some(image_id));
    assert_eq!(mask.blend_mode, BlendMode::Erase);
    assert!(mask.is_erase_mask());
    match &mask.kind {
        LayerKind::Line {
            points,
            original_parent_size,
            ..
        } => {
            assert_eq!(points, &vec![pos2(50.0, 50.0), pos2(60.0, 60.0)]);
            assert_eq!(*original_parent_size, Some(vec2(200.0, 200.0)));
        }
        other => panic!("expected a line, got {other:?}"),
    }
    assert_eq!(editor.history().current().description, HistoryKind::Erase);
}

#[test]
fn test_eraser_on_background_draws_global_stroke() {
    let mut editor = editor_with(Vec::new());
    editor.set_tool(ToolKind::Eraser);
    editor.pointer_down(pos2(10.0, 10.0));
    editor.pointer_move(pos2(20.0, 10.0));
    editor.pointer_up(pos2(20.0, 10.0));

    let stroke = &editor.document().layers()[0];
    assert_eq!(stroke.parent_id, None);
    assert_eq!(stroke.blend_mode.composite_operation(), "destination-out");
}

#[test]
fn test_assist_brush_selects_image_and_reports_mask() {
    let image = Layer::image(ImageSource::Uri("a.png".into()), pos2(0.0, 0.0), vec2(100.0, 100.0));
    let image_id = image.id;
    let mut editor = editor_with(vec![image]);
    editor.set_brush_mode(BrushMode::AiAssist);
    let events = record_events(&editor);

    editor.pointer_down(pos2(10.0, 10.0));
    assert_eq!(editor.selection().ids(), &[image_id]);
    editor.pointer_move(pos2(20.0, 20.0));
    editor.pointer_up(pos2(20.0, 20.0));

    let events = events.lock().unwrap();
    let mask = events.iter().find_map(|event| match event {
        EditorEvent::MaskStrokeCompleted(mask) => Some(mask.clone()),
        _ => None,
    });
    let mask = mask.expect("mask stroke event");
    assert_eq!(mask.target, Some(image_id));
    assert_eq!(mask.mode, BrushMode::AiAssist);
}

#[test]
fn test_pointer_cancel_finishes_stroke() {
    let mut editor = editor_with(Vec::new());
    editor.set_tool(ToolKind::Brush);
    let events = record_events(&editor);

    editor.pointer_down(pos2(10.0, 10.0));
    editor.pointer_move(pos2(20.0, 20.0));
    assert!(editor.pointer_cancel());

    assert_eq!(editor.document().len(), 1);
    assert!(editor.state().is_idle());
    assert!(events.lock().unwrap().contains(&EditorEvent::GestureCancelled { tool: ToolKind::Brush }));
}

#[test]
fn test_undo_during_gesture_finishes_it_first() {
    let mut editor = editor_with(Vec::new());
    editor.set_tool(ToolKind::Brush);
    editor.pointer_down(pos2(10.0, 10.0));
    editor.pointer_move(pos2(20.0, 20.0));

    assert!(editor.undo());
    assert!(editor.document().is_empty());
    assert!(editor.redo());
    assert_eq!(editor.document().len(), 1);
}

#[test]
fn test_text_tool_places_and_edits() {
    let mut editor = editor_with(Vec::new());
    editor.set_tool(ToolKind::Text);
    let events = record_events(&editor);

    editor.pointer_down(pos2(2000.0, 40.0));
    let id: LayerId = editor.state().editing_layer().expect("editing");
    assert_eq!(editor.document().get(id).unwrap().position(), pos2(1024.0, 40.0));
    assert!(events
        .lock()
        .unwrap()
        .iter()
        .any(|event| matches!(event, EditorEvent::TextEditRequested(request) if request.layer_id == id)));

    assert!(editor.commit_text_edit("Hello"));
    assert_eq!(editor.history().current().description, HistoryKind::Text);
    assert_eq!(editor.history().len(), 3);
}

#[test]
fn test_text_tool_on_existing_text_places_a_new_layer() {
    let existing = Layer::text("caption", pos2(100.0, 100.0), 24.0, "Arial", Color32::BLACK);
    let existing_id = existing.id;
    let mut editor = editor_with(vec![existing]);
    editor.set_tool(ToolKind::Text);

    editor.pointer_down(pos2(105.0, 105.0));
    let placed = editor.state().editing_layer().expect("editing");
    assert_ne!(placed, existing_id);
    assert_eq!(editor.document().len(), 2);
    assert_eq!(editor.document().get(placed).unwrap().position(), pos2(105.0, 105.0));
    assert_eq!(editor.history().current().description, HistoryKind::Add);

    editor.cancel_text_edit();
    match &editor.document().get(existing_id).unwrap().kind {
        LayerKind::Text { text, .. } => assert_eq!(text, "caption"),
        other => panic!("expected text, got {other:?}"),
    }
}
