use thiserror::Error;

/// Failure classes for the analysis pipeline.
///
/// History *read* failures are intentionally absent: a missing or unreadable
/// history degrades to an empty one (see `HistoryStore::load`).
#[derive(Debug, Error)]
pub enum Error {
    /// Uploaded content is not a decodable image. The operation aborts and
    /// no history entry is written.
    #[error("could not decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// The detection model could not be loaded (missing weights,
    /// incompatible runtime). Fatal to the current operation.
    #[error("detection model unavailable: {0}")]
    ModelLoad(#[source] anyhow::Error),

    /// Inference itself failed after the model loaded.
    #[error("detection failed: {0}")]
    Inference(#[source] anyhow::Error),

    /// The analysis succeeded but could not be recorded.
    #[error("analysis was not recorded: {0}")]
    HistoryWrite(#[source] anyhow::Error),

    /// Spreadsheet serialization failed.
    #[error("spreadsheet export failed: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}
