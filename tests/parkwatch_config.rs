use std::sync::Mutex;

use tempfile::NamedTempFile;

use parkwatch::ParkwatchConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "PARKWATCH_CONFIG",
        "PARKWATCH_MODEL_PATH",
        "PARKWATCH_HISTORY_PATH",
        "PARKWATCH_CONFIDENCE",
        "PARKWATCH_IOU",
        "PARKWATCH_IMGSZ",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn defaults_without_config() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = ParkwatchConfig::load().expect("load config");
    assert_eq!(cfg.model_path.to_str().unwrap(), "yolov8m.onnx");
    assert_eq!(cfg.history_path.to_str().unwrap(), "history.json");
    assert_eq!(cfg.default_capacity, 50);
    assert_eq!(cfg.detector.confidence, 0.25);
    assert_eq!(cfg.detector.iou, 0.5);
    assert_eq!(cfg.detector.imgsz, 1280);

    clear_env();
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "model_path": "models/lot.onnx",
        "history_path": "data/history.json",
        "default_capacity": 120,
        "detector": {
            "confidence": 0.3,
            "iou": 0.45,
            "imgsz": 640
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("PARKWATCH_CONFIG", file.path());
    std::env::set_var("PARKWATCH_HISTORY_PATH", "elsewhere/history.json");
    std::env::set_var("PARKWATCH_CONFIDENCE", "0.4");

    let cfg = ParkwatchConfig::load().expect("load config");
    assert_eq!(cfg.model_path.to_str().unwrap(), "models/lot.onnx");
    assert_eq!(cfg.history_path.to_str().unwrap(), "elsewhere/history.json");
    assert_eq!(cfg.default_capacity, 120);
    assert_eq!(cfg.detector.confidence, 0.4);
    assert_eq!(cfg.detector.iou, 0.45);
    assert_eq!(cfg.detector.imgsz, 640);

    clear_env();
}

#[test]
fn rejects_out_of_range_confidence() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("PARKWATCH_CONFIDENCE", "1.5");
    assert!(ParkwatchConfig::load().is_err());

    clear_env();
}

#[test]
fn rejects_non_multiple_of_32_imgsz() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("PARKWATCH_IMGSZ", "1000");
    assert!(ParkwatchConfig::load().is_err());

    clear_env();
}
