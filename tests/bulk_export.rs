use std::sync::Mutex;

use image::{Rgba, RgbaImage};
use layerforge_lib::core::{EditorConfig, ExportProgress, Layer, ProgressType, ProjectCanvas, SourceRef};
use layerforge_lib::processing::encode::{encode_png, to_data_uri};
use layerforge_lib::processing::{export_items, Compositor, ItemStatus, SourceDecoder};
use layerforge_lib::project::{add_layer, toggle_visibility, IdentityResolver, NewLayer, PresetStore};
use layerforge_lib::sink::MemorySink;
use layerforge_lib::tasks::{TaskContext, TaskManager, TaskOutcome, TaskRequest};
use layerforge_lib::utils::ExportFormat;
use pretty_assertions::assert_eq;

const GREEN: Rgba<u8> = Rgba([0, 200, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

fn inline_layer(layers: &mut Vec<Layer>, name: &str, width: u32, height: u32, color: Rgba<u8>) -> Layer {
    let bytes = encode_png(&RgbaImage::from_pixel(width, height, color)).unwrap();
    let uri = to_data_uri(&bytes, ExportFormat::Png);
    add_layer(
        layers,
        NewLayer {
            name: name.into(),
            file_path: uri.clone(),
            source: SourceRef::DataUri(uri),
            width,
            height,
        },
    )
}

#[tokio::test]
async fn bulk_export_continues_past_a_failed_item() {
    let mut layers = Vec::new();
    let background = inline_layer(&mut layers, "background", 6, 6, GREEN);
    let badge = inline_layer(&mut layers, "badge", 6, 2, BLUE);

    // Presets capture the current visibility at save time.
    let mut presets = PresetStore::default();
    toggle_visibility(&mut layers, &badge.id);
    presets.save("Plain", &layers).unwrap();
    toggle_visibility(&mut layers, &badge.id);
    presets.save("With badge", &layers).unwrap();
    toggle_visibility(&mut layers, &background.id);
    presets.save("Badge only", &layers).unwrap();
    toggle_visibility(&mut layers, &background.id);

    let mut config = EditorConfig::default();
    config.export.inter_item_delay_ms = 1;
    let mut items = export_items(presets.presets(), &config.export);
    items[2].format = ExportFormat::Jpg;
    items[2].quality = 95;

    let sink = MemorySink::new().fail_writes_named("With badge");
    let mut manager = TaskManager::new(Compositor::new(SourceDecoder), sink, IdentityResolver, config);
    let ctx = TaskContext {
        layers,
        presets: presets.presets().to_vec(),
        canvas: ProjectCanvas::new(6, 6),
        project_name: "Sheet".into(),
    };

    let events: Mutex<Vec<ExportProgress>> = Mutex::new(Vec::new());
    let outcome = manager
        .dispatch(TaskRequest::BulkExport { items }, &ctx, |p| events.lock().unwrap().push(p.clone()))
        .await
        .unwrap();
    let TaskOutcome::BulkExported(report) = outcome else {
        panic!("expected a bulk export report");
    };

    assert_eq!(report.enabled_count, 3);
    assert_eq!((report.succeeded(), report.failed()), (2, 1));
    assert!(matches!(&report.items[1].status, ItemStatus::Failed { error } if error.contains("With badge")));

    let written = manager.sink().written();
    let names: Vec<_> = written.iter().map(|f| f.file_name.as_str()).collect();
    assert_eq!(names, ["Plain.png", "Badge only.jpg"]);

    let plain = image::load_from_memory(&written[0].bytes).unwrap().into_rgba8();
    assert_eq!(plain.get_pixel(0, 3), &GREEN);

    // Background hidden: jpg composites onto white, the badge sits in the middle rows.
    let badge_only = image::load_from_memory(&written[1].bytes).unwrap().into_rgb8();
    let corner = badge_only.get_pixel(0, 0);
    assert!(corner.0.iter().all(|c| *c > 235), "expected white, got {corner:?}");
    let middle = badge_only.get_pixel(3, 3);
    assert!(middle[2] > 200 && middle[0] < 40, "expected blue, got {middle:?}");

    let events = events.into_inner().unwrap();
    let summary: Vec<_> = events
        .iter()
        .map(|e| (e.progress_type, e.completed_items, e.current_item.clone()))
        .collect();
    assert_eq!(
        summary,
        [
            (ProgressType::Start, 0, None),
            (ProgressType::Progress, 0, Some("Plain".to_string())),
            (ProgressType::Progress, 1, Some("With badge".to_string())),
            (ProgressType::Error, 2, Some("With badge".to_string())),
            (ProgressType::Progress, 2, Some("Badge only".to_string())),
            (ProgressType::Complete, 3, None),
        ]
    );
    assert_eq!(events.last().unwrap().progress_percentage, 100);
}
