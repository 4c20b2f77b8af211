use std::io::Cursor;

use image::RgbImage;
use tempfile::tempdir;

use parkwatch::{Analyzer, Detection, Error, ParkwatchConfig, StubBackend};

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = image::DynamicImage::ImageRgb8(RgbImage::new(width, height));
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, image::ImageFormat::Png)
        .expect("encode png");
    buf.into_inner()
}

fn det(x1: f32, y1: f32, x2: f32, y2: f32, class_id: usize) -> Detection {
    Detection {
        x1,
        y1,
        x2,
        y2,
        confidence: 0.8,
        class_id,
    }
}

fn analyzer_in(dir: &std::path::Path) -> Analyzer {
    let mut cfg = ParkwatchConfig::default();
    cfg.history_path = dir.join("history.json");
    Analyzer::new(cfg)
}

#[test]
fn full_pipeline_records_the_analysis() {
    let dir = tempdir().expect("tempdir");
    let analyzer = analyzer_in(dir.path());

    // Five vehicles and one pedestrian; only the vehicles count.
    let mut backend = StubBackend::with_detections(vec![
        det(0.0, 0.0, 20.0, 20.0, 2),
        det(30.0, 0.0, 50.0, 20.0, 2),
        det(60.0, 0.0, 80.0, 20.0, 7),
        det(0.0, 30.0, 20.0, 50.0, 5),
        det(30.0, 30.0, 50.0, 50.0, 3),
        det(60.0, 30.0, 70.0, 55.0, 0),
    ]);

    let outcome = analyzer
        .analyze(&mut backend, &png_bytes(100, 60), "lot1.jpg", 20)
        .expect("analyze");

    assert!(outcome.history_error.is_none());
    let record = &outcome.record;
    assert_eq!(record.filename, "lot1.jpg");
    assert_eq!(record.total_spaces, 20);
    assert_eq!(record.detected_cars, 5);
    assert_eq!(record.free_spaces, 15);
    assert_eq!(record.occupancy_percentage, 25.0);
    assert!(!record.id.is_empty());
    assert!(!record.timestamp.is_empty());
    assert_eq!(outcome.annotated.dimensions(), (100, 60));

    let records = analyzer.history().load();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0], *record);
}

#[test]
fn overcount_clamps_and_records() {
    let dir = tempdir().expect("tempdir");
    let analyzer = analyzer_in(dir.path());

    let detections: Vec<Detection> = (0..15)
        .map(|i| {
            let x = (i % 5) as f32 * 20.0;
            let y = (i / 5) as f32 * 20.0;
            det(x, y, x + 15.0, y + 15.0, 2)
        })
        .collect();
    let mut backend = StubBackend::with_detections(detections);

    let outcome = analyzer
        .analyze(&mut backend, &png_bytes(120, 80), "packed.jpg", 10)
        .expect("analyze");

    assert_eq!(outcome.record.detected_cars, 15);
    assert_eq!(outcome.record.free_spaces, 0);
    assert_eq!(outcome.record.occupancy_percentage, 150.0);
}

#[test]
fn decode_failure_leaves_history_untouched() {
    let dir = tempdir().expect("tempdir");
    let analyzer = analyzer_in(dir.path());
    let mut backend = StubBackend::new();

    let err = analyzer
        .analyze(&mut backend, b"definitely not an image", "bad.jpg", 50)
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));

    assert!(analyzer.history().load().is_empty());
    assert!(!dir.path().join("history.json").exists());
}

#[test]
fn history_write_failure_is_surfaced_not_swallowed() {
    let dir = tempdir().expect("tempdir");
    // Point the history at a path whose parent directory does not exist.
    let mut cfg = ParkwatchConfig::default();
    cfg.history_path = dir.path().join("no-such-dir").join("history.json");
    let analyzer = Analyzer::new(cfg);

    let mut backend = StubBackend::with_detections(vec![det(0.0, 0.0, 10.0, 10.0, 2)]);
    let outcome = analyzer
        .analyze(&mut backend, &png_bytes(32, 32), "lot.jpg", 50)
        .expect("analysis itself succeeds");

    assert!(matches!(outcome.history_error, Some(Error::HistoryWrite(_))));
    // The computed result is still available.
    assert_eq!(outcome.record.detected_cars, 1);
    assert_eq!(outcome.record.free_spaces, 49);
}

#[test]
fn successive_analyses_accumulate() {
    let dir = tempdir().expect("tempdir");
    let analyzer = analyzer_in(dir.path());

    let mut backend = StubBackend::with_detections(vec![det(0.0, 0.0, 10.0, 10.0, 2)]);
    for i in 0..3 {
        analyzer
            .analyze(&mut backend, &png_bytes(32, 32), &format!("f{}.jpg", i), 50)
            .expect("analyze");
    }

    let records = analyzer.history().load();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].filename, "f2.jpg");
}
