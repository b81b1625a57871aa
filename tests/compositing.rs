use eframe_canvas::compositing::{mask_scale, scale_mask_points, scale_mask_width};
use eframe_canvas::geometry::clamp_point_to_canvas;
use eframe_canvas::layer::ImageSource;
use eframe_canvas::compositing::ResolvedMask;
use eframe_canvas::{
    BlendMode, CanvasConfig, Document, EditorContext, Filters, Layer, LayerId, LayerKind, ToolKind, TransformUpdate,
    build_render_tree,
};
use egui::{Color32, Pos2, Vec2, pos2, vec2};
use proptest::prelude::*;

proptest! {
    #[test]
    fn clamp_is_idempotent_and_in_bounds(
        x in -5000.0f32..5000.0,
        y in -5000.0f32..5000.0,
        w in 1.0f32..4000.0,
        h in 1.0f32..4000.0,
    ) {
        let size = vec2(w, h);
        let once = clamp_point_to_canvas(pos2(x, y), size);
        prop_assert_eq!(clamp_point_to_canvas(once, size), once);
        prop_assert!(once.x >= 0.0 && once.x <= w);
        prop_assert!(once.y >= 0.0 && once.y <= h);
    }

    #[test]
    fn mask_rescale_round_trips(
        px in 0.0f32..500.0,
        py in 0.0f32..500.0,
        ow in 10.0f32..1000.0,
        oh in 10.0f32..1000.0,
        cw in 10.0f32..1000.0,
        ch in 10.0f32..1000.0,
    ) {
        let original = vec2(ow, oh);
        let current = vec2(cw, ch);
        let forward = mask_scale(Some(original), Some(current));
        let back = mask_scale(Some(current), Some(original));
        let there = scale_mask_points(&[pos2(px, py)], forward);
        let again = scale_mask_points(&there, back);
        prop_assert!((again[0] - pos2(px, py)).length() < 1e-2);
    }
}

#[test]
fn test_missing_original_size_draws_unscaled() {
    assert_eq!(mask_scale(None, Some(vec2(10.0, 10.0))), vec2(1.0, 1.0));
    assert_eq!(mask_scale(Some(vec2(0.0, 10.0)), Some(vec2(10.0, 10.0))), vec2(1.0, 1.0));
    assert_eq!(scale_mask_width(4.0, vec2(2.0, 4.0)), 12.0);
}

#[test]
fn test_resized_host_rescales_its_masks() {
    let mut doc = Document::new();
    let image = doc
        .add_layer(Layer::image(ImageSource::Uri("a.png".into()), pos2(0.0, 0.0), vec2(100.0, 100.0)))
        .unwrap();
    let mut mask = Layer::line(vec![pos2(10.0, 10.0), pos2(50.0, 50.0)], 10.0, Color32::BLACK)
        .with_parent(image)
        .with_blend_mode(BlendMode::Erase);
    if let LayerKind::Line { original_parent_size, .. } = &mut mask.kind {
        *original_parent_size = Some(vec2(100.0, 100.0));
    }
    doc.add_layer(mask).unwrap();

    let host = doc.get_mut(image).unwrap();
    host.width = Some(200.0);
    host.height = Some(50.0);

    let tree = build_render_tree(&doc);
    assert_eq!(tree.len(), 1);
    let resolved = &tree[0].masks[0];
    assert_eq!(resolved.points, vec![pos2(20.0, 5.0), pos2(100.0, 25.0)]);
    assert_eq!(resolved.stroke_width, 12.5);
}

#[test]
fn test_filter_pipeline_only_lists_active_filters() {
    assert!(Filters::default().is_identity());
    let filters = Filters {
        brightness: 0.2,
        ..Default::default()
    };
    assert_eq!(filters.pipeline().len(), 1);
}

fn erase(editor: &mut EditorContext, from: Pos2, to: Pos2) {
    editor.set_tool(ToolKind::Eraser);
    editor.pointer_down(from);
    editor.pointer_move(to);
    editor.pointer_up(to);
}

fn resize(editor: &mut EditorContext, id: LayerId, factor: f32) {
    let update = TransformUpdate {
        scale: Some(Vec2::splat(factor)),
        ..Default::default()
    };
    editor.apply_transform(id, update).unwrap();
}

fn host_masks(editor: &EditorContext, host: LayerId) -> Vec<ResolvedMask> {
    editor
        .render_tree()
        .into_iter()
        .find(|node| node.id == host)
        .map(|node| node.masks)
        .unwrap_or_default()
}

fn assert_points_close(actual: &[Pos2], expected: &[Pos2]) {
    assert_eq!(actual.len(), expected.len());
    for (a, b) in actual.iter().zip(expected) {
        assert!((*a - *b).length() < 1e-3, "{actual:?} != {expected:?}");
    }
}

#[test]
fn test_resized_line_keeps_its_mask_on_the_stroke() {
    let line = Layer::line(vec![pos2(500.0, 500.0), pos2(600.0, 500.0)], 10.0, Color32::BLUE);
    let line_id = line.id;
    let mut editor = EditorContext::with_document(CanvasConfig::default(), Document::from_layers(vec![line])).unwrap();
    erase(&mut editor, pos2(550.0, 500.0), pos2(560.0, 500.0));

    let before = host_masks(&editor, line_id);
    assert_eq!(before.len(), 1);
    assert_points_close(&before[0].points, &[pos2(550.0, 500.0), pos2(560.0, 500.0)]);

    resize(&mut editor, line_id, 2.0);

    match &editor.document().get(line_id).unwrap().kind {
        LayerKind::Line { points, .. } => assert_eq!(points, &vec![pos2(1000.0, 1000.0), pos2(1200.0, 1000.0)]),
        other => panic!("expected a line, got {other:?}"),
    }
    let after = host_masks(&editor, line_id);
    assert_points_close(&after[0].points, &[pos2(1100.0, 1000.0), pos2(1120.0, 1000.0)]);
    assert!((after[0].stroke_width - before[0].stroke_width * 2.0).abs() < 1e-3);
}

#[test]
fn test_mask_survives_resize_there_and_back() {
    let image = Layer::image(ImageSource::Uri("a.png".into()), pos2(100.0, 100.0), vec2(200.0, 100.0));
    let line = Layer::line(vec![pos2(700.0, 300.0), pos2(800.0, 340.0)], 12.0, Color32::BLUE);
    let (image_id, line_id) = (image.id, line.id);
    let mut editor =
        EditorContext::with_document(CanvasConfig::default(), Document::from_layers(vec![image, line])).unwrap();
    erase(&mut editor, pos2(150.0, 120.0), pos2(220.0, 180.0));
    erase(&mut editor, pos2(700.0, 300.0), pos2(750.0, 320.0));

    for host in [image_id, line_id] {
        let original = host_masks(&editor, host);
        assert_eq!(original.len(), 1);

        resize(&mut editor, host, 2.0);
        let doubled = host_masks(&editor, host);
        let expected: Vec<Pos2> = original[0].points.iter().map(|p| pos2(p.x * 2.0, p.y * 2.0)).collect();
        assert_points_close(&doubled[0].points, &expected);

        resize(&mut editor, host, 0.5);
        let restored = host_masks(&editor, host);
        assert_points_close(&restored[0].points, &original[0].points);
        assert!((restored[0].stroke_width - original[0].stroke_width).abs() < 1e-3);
    }
}
