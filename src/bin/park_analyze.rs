//! park_analyze - run one parking-lot image through the pipeline
//!
//! Detects vehicles, prints the occupancy figures, writes the annotated
//! image, and appends the analysis to the history file.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;

#[cfg(feature = "backend-tract")]
use parkwatch::{Analyzer, ParkwatchConfig};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Parking lot image (PNG or JPEG).
    image: PathBuf,
    /// Declared capacity of the lot. Defaults to the configured capacity
    /// (50 unless overridden).
    #[arg(long)]
    spaces: Option<u32>,
    /// Where to write the annotated image. Defaults to
    /// `<image stem>.annotated.png` next to the input.
    #[arg(long)]
    annotated: Option<PathBuf>,
    /// History file path override.
    #[arg(long, env = "PARKWATCH_HISTORY_PATH")]
    history: Option<PathBuf>,
    /// ONNX model path override.
    #[arg(long, env = "PARKWATCH_MODEL_PATH")]
    model: Option<PathBuf>,
}

#[cfg(feature = "backend-tract")]
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = ParkwatchConfig::load()?;
    if let Some(history) = &args.history {
        cfg.history_path = history.clone();
    }
    if let Some(model) = &args.model {
        cfg.model_path = model.clone();
    }
    let spaces = args.spaces.unwrap_or(cfg.default_capacity);
    if spaces == 0 {
        return Err(anyhow!("--spaces must be greater than zero"));
    }

    let image_bytes = std::fs::read(&args.image)
        .map_err(|e| anyhow!("failed to read {}: {}", args.image.display(), e))?;
    let filename = args
        .image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("{} has no file name", args.image.display()))?;

    let backend = parkwatch::shared_backend(&cfg)?;
    let mut backend = backend.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    let analyzer = Analyzer::new(cfg);
    let outcome = analyzer.analyze(&mut *backend, &image_bytes, &filename, spaces)?;
    drop(backend);

    let annotated_path = args
        .annotated
        .unwrap_or_else(|| args.image.with_extension("annotated.png"));
    outcome
        .annotated
        .save(&annotated_path)
        .map_err(|e| anyhow!("failed to write {}: {}", annotated_path.display(), e))?;

    let record = &outcome.record;
    println!("file:            {}", record.filename);
    println!("total spaces:    {}", record.total_spaces);
    println!("cars detected:   {}", record.detected_cars);
    println!("free spaces:     {}", record.free_spaces);
    println!("occupancy:       {}%", record.occupancy_percentage);
    println!("annotated image: {}", annotated_path.display());

    if let Some(err) = outcome.history_error {
        // The analysis above is valid; only the recording failed.
        return Err(err.into());
    }
    println!("recorded as {} at {}", record.id, record.timestamp);
    Ok(())
}

#[cfg(not(feature = "backend-tract"))]
fn main() -> Result<()> {
    let _ = Args::parse();
    Err(anyhow!(
        "park_analyze was built without the backend-tract feature; no detector is available"
    ))
}
