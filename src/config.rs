use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_MODEL_PATH: &str = "yolov8m.onnx";
const DEFAULT_HISTORY_PATH: &str = "history.json";
const DEFAULT_CONFIDENCE: f32 = 0.25;
const DEFAULT_IOU: f32 = 0.5;
const DEFAULT_IMGSZ: u32 = 1280;
const DEFAULT_CAPACITY: u32 = 50;

#[derive(Debug, Deserialize, Default)]
struct ParkwatchConfigFile {
    model_path: Option<String>,
    history_path: Option<String>,
    default_capacity: Option<u32>,
    detector: Option<DetectorConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    confidence: Option<f32>,
    iou: Option<f32>,
    imgsz: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct ParkwatchConfig {
    pub model_path: PathBuf,
    pub history_path: PathBuf,
    pub default_capacity: u32,
    pub detector: DetectorSettings,
}

/// Inference tuning. Defaults match the values the pretrained model is run
/// with for parking scenes: long-side 1280, confidence 0.25, IoU 0.5.
#[derive(Debug, Clone, Copy)]
pub struct DetectorSettings {
    pub confidence: f32,
    pub iou: f32,
    pub imgsz: u32,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            confidence: DEFAULT_CONFIDENCE,
            iou: DEFAULT_IOU,
            imgsz: DEFAULT_IMGSZ,
        }
    }
}

impl ParkwatchConfig {
    /// Load configuration: optional JSON file named by `PARKWATCH_CONFIG`,
    /// then env overrides, then validation.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("PARKWATCH_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: ParkwatchConfigFile) -> Self {
        let model_path = file
            .model_path
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));
        let history_path = file
            .history_path
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_PATH));
        let default_capacity = file.default_capacity.unwrap_or(DEFAULT_CAPACITY);
        let detector = DetectorSettings {
            confidence: file
                .detector
                .as_ref()
                .and_then(|d| d.confidence)
                .unwrap_or(DEFAULT_CONFIDENCE),
            iou: file
                .detector
                .as_ref()
                .and_then(|d| d.iou)
                .unwrap_or(DEFAULT_IOU),
            imgsz: file
                .detector
                .as_ref()
                .and_then(|d| d.imgsz)
                .unwrap_or(DEFAULT_IMGSZ),
        };
        Self {
            model_path,
            history_path,
            default_capacity,
            detector,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("PARKWATCH_MODEL_PATH") {
            if !path.trim().is_empty() {
                self.model_path = PathBuf::from(path);
            }
        }
        if let Ok(path) = std::env::var("PARKWATCH_HISTORY_PATH") {
            if !path.trim().is_empty() {
                self.history_path = PathBuf::from(path);
            }
        }
        if let Ok(value) = std::env::var("PARKWATCH_CONFIDENCE") {
            self.detector.confidence = value
                .parse()
                .map_err(|_| anyhow!("PARKWATCH_CONFIDENCE must be a number"))?;
        }
        if let Ok(value) = std::env::var("PARKWATCH_IOU") {
            self.detector.iou = value
                .parse()
                .map_err(|_| anyhow!("PARKWATCH_IOU must be a number"))?;
        }
        if let Ok(value) = std::env::var("PARKWATCH_IMGSZ") {
            self.detector.imgsz = value
                .parse()
                .map_err(|_| anyhow!("PARKWATCH_IMGSZ must be an integer"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.detector.confidence) {
            return Err(anyhow!("confidence must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.detector.iou) {
            return Err(anyhow!("iou must be within [0, 1]"));
        }
        if self.detector.imgsz == 0 || self.detector.imgsz % 32 != 0 {
            return Err(anyhow!("imgsz must be a positive multiple of 32"));
        }
        if self.default_capacity == 0 {
            return Err(anyhow!("default capacity must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for ParkwatchConfig {
    fn default() -> Self {
        Self::from_file(ParkwatchConfigFile::default())
    }
}

fn read_config_file(path: &Path) -> Result<ParkwatchConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
