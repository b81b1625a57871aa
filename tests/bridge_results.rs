use std::io::Cursor;
use std::sync::{Arc, Mutex};

use eframe_canvas::bridge::{BridgeFuture, ExtractedImage};
use eframe_canvas::event::HistoryNotice;
use eframe_canvas::layer::ImageSource;
use eframe_canvas::{
    BridgeError, CanvasConfig, Document, EditorContext, HistoryKind, ImageBackend, ImageData, ImagePlacement,
    LayerKind,
};
use egui::{pos2, vec2};
use futures::executor::block_on;
use image::{ImageFormat, Rgba, RgbaImage};

fn png(width: u32, height: u32) -> ImageData {
    let img = RgbaImage::from_pixel(width, height, Rgba([0, 128, 255, 255]));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png).unwrap();
    ImageData::new(bytes.into_inner())
}

/// Backend that answers every request with the same canned result.
struct CannedBackend {
    image: Option<ImageData>,
}

impl CannedBackend {
    fn respond(&self) -> BridgeFuture<'_, ImageData> {
        let result = self
            .image
            .clone()
            .ok_or_else(|| BridgeError::Backend("quota exceeded".into()));
        Box::pin(async move { result })
    }
}

impl ImageBackend for CannedBackend {
    fn generate_image<'a>(&'a self, _prompt: &'a str, _references: &'a [ImageData]) -> BridgeFuture<'a, ImageData> {
        self.respond()
    }

    fn edit_image<'a>(&'a self, _image: &'a ImageData, _prompt: &'a str) -> BridgeFuture<'a, ImageData> {
        self.respond()
    }

    fn remove_background<'a>(&'a self, _image: &'a ImageData) -> BridgeFuture<'a, ImageData> {
        self.respond()
    }

    fn blend_images<'a>(&'a self, _images: &'a [ImageData], _style: &'a str) -> BridgeFuture<'a, ImageData> {
        self.respond()
    }
}

fn editor() -> EditorContext {
    let _ = env_logger::builder().is_test(true).try_init();
    EditorContext::new(CanvasConfig::default()).unwrap()
}

#[test]
fn test_failed_generation_leaves_document_untouched() {
    let mut editor = editor();
    let backend = CannedBackend { image: None };

    let result = block_on(backend.generate_image("a cat", &[]));
    let applied = editor.apply_image_result(result, ImagePlacement::NewLayer { position: pos2(0.0, 0.0) });

    assert!(matches!(applied, Err(BridgeError::Backend(_))));
    assert!(editor.document().is_empty());
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn test_generated_image_becomes_layer_with_natural_size() {
    let mut editor = editor();
    let backend = CannedBackend { image: Some(png(64, 32)) };

    let result = block_on(backend.generate_image("a cat", &[]));
    let id = editor
        .apply_image_result(result, ImagePlacement::NewLayer { position: pos2(10.0, 20.0) })
        .unwrap();

    let layer = editor.document().get(id).unwrap();
    assert_eq!(layer.position(), pos2(10.0, 20.0));
    assert_eq!(layer.size(), Some(vec2(64.0, 32.0)));
    assert_eq!(editor.history().current().description, HistoryKind::Generate);
    assert_eq!(editor.selection().ids(), &[id]);
}

#[test]
fn test_replace_keeps_frame_and_swaps_pixels() {
    let mut editor = editor();
    let id = editor
        .apply_image_result(Ok(png(10, 10)), ImagePlacement::NewLayer { position: pos2(0.0, 0.0) })
        .unwrap();
    let backend = CannedBackend { image: Some(png(20, 20)) };

    let edited = block_on(backend.remove_background(&png(10, 10)));
    assert_eq!(editor.apply_image_result(edited, ImagePlacement::Replace(id)).unwrap(), id);

    let layer = editor.document().get(id).unwrap();
    assert_eq!(layer.size(), Some(vec2(10.0, 10.0)));
    match &layer.kind {
        LayerKind::Image { src: ImageSource::Encoded(bytes), .. } => {
            assert_eq!(&bytes[..], png(20, 20).bytes());
        }
        other => panic!("expected encoded image, got {other:?}"),
    }
    assert_eq!(editor.history().len(), 3);
}

#[test]
fn test_undecodable_result_is_rejected() {
    let mut editor = editor();
    let garbage = ImageData::new(vec![1u8, 2, 3, 4, 5]);
    let applied = editor.apply_image_result(Ok(garbage), ImagePlacement::NewLayer { position: pos2(0.0, 0.0) });
    assert!(applied.is_err());
    assert!(editor.document().is_empty());
}

#[test]
fn test_extraction_lands_above_source() {
    let mut editor = editor();
    let source = editor
        .apply_image_result(Ok(png(100, 100)), ImagePlacement::NewLayer { position: pos2(50.0, 50.0) })
        .unwrap();
    let pieces = vec![
        ExtractedImage {
            image: png(10, 10),
            offset: vec2(5.0, 5.0),
        },
        ExtractedImage {
            image: png(20, 10),
            offset: vec2(30.0, 0.0),
        },
    ];

    let ids = editor.apply_extraction(source, Ok(pieces)).unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(editor.document().index_of(ids[0]), Some(1));
    assert_eq!(editor.document().get(ids[1]).unwrap().position(), pos2(80.0, 50.0));
    assert_eq!(editor.history().current().description, HistoryKind::Add);
}

#[test]
fn test_snapshot_save_and_reload_resets_history() {
    let mut editor = editor();
    editor
        .apply_image_result(Ok(png(8, 8)), ImagePlacement::NewLayer { position: pos2(0.0, 0.0) })
        .unwrap();
    let json = editor.snapshot().to_json().unwrap();

    let mut restored = EditorContext::with_document(CanvasConfig::default(), Document::new()).unwrap();
    restored.load_snapshot(eframe_canvas::DocumentSnapshot::from_json(&json).unwrap());
    assert_eq!(restored.document().layers(), editor.document().layers());
    assert_eq!(restored.history().len(), 1);
    assert!(!restored.history().can_undo());
}

#[test]
fn test_idle_listener_sees_latest_commit() {
    let saved = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&saved);
    let mut editor = editor();
    editor.add_history_listener(Box::new(move |notice: &HistoryNotice, document: &Document| {
        sink.lock().unwrap().push((notice.description, document.len()))
    }));
    editor
        .apply_image_result(Ok(png(8, 8)), ImagePlacement::NewLayer { position: pos2(0.0, 0.0) })
        .unwrap();
    editor
        .apply_image_result(Ok(png(8, 8)), ImagePlacement::NewLayer { position: pos2(9.0, 0.0) })
        .unwrap();

    let notifier = editor.notifier();
    assert!(notifier.is_pending());
    assert!(editor.run_idle());
    assert!(!notifier.is_pending());
    assert_eq!(*saved.lock().unwrap(), vec![(HistoryKind::Generate, 2)]);
}
