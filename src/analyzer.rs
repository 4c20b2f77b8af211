//! Orchestration: upload -> detect -> metrics -> record -> history.

use image::RgbImage;

use crate::config::ParkwatchConfig;
use crate::detect::{decode_image, detect_vehicles, DetectorBackend};
use crate::error::Error;
use crate::history::{AnalysisRecord, HistoryStore, NewAnalysis};
use crate::metrics;

/// Everything one analysis produces.
#[derive(Debug)]
pub struct AnalysisOutcome {
    /// Annotated source image, RGB, ready for display or saving.
    pub annotated: RgbImage,
    /// The record as appended (or as it would have been appended, when
    /// persistence failed).
    pub record: AnalysisRecord,
    /// Set when the analysis succeeded but could not be recorded. The
    /// analysis result above is still valid; callers must surface this
    /// rather than report unqualified success.
    pub history_error: Option<Error>,
}

/// Drives the detection-to-history pipeline and fronts the history surface.
///
/// Holds no state beyond its configuration and the store handle; the current
/// request's result lives only in the returned [`AnalysisOutcome`].
pub struct Analyzer {
    config: ParkwatchConfig,
    history: HistoryStore,
}

impl Analyzer {
    pub fn new(config: ParkwatchConfig) -> Self {
        let history = HistoryStore::new(&config.history_path);
        Self { config, history }
    }

    pub fn config(&self) -> &ParkwatchConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Analyze one uploaded image against a declared capacity.
    ///
    /// Decode and detection failures abort the operation; nothing is written
    /// to history in that case. A history-write failure does not abort:
    /// it is reported through [`AnalysisOutcome::history_error`].
    pub fn analyze(
        &self,
        backend: &mut dyn DetectorBackend,
        image_bytes: &[u8],
        filename: &str,
        total_spaces: u32,
    ) -> Result<AnalysisOutcome, Error> {
        let image = decode_image(image_bytes)?;
        let output = detect_vehicles(backend, &image)?;
        let figures = metrics::compute(total_spaces, output.vehicle_count);

        let analysis = NewAnalysis {
            filename: filename.to_string(),
            total_spaces,
            detected_cars: output.vehicle_count,
            free_spaces: figures.free_spaces,
            occupancy_percentage: figures.occupancy_pct,
        };

        let (record, history_error) = match self.history.append(analysis.clone()) {
            Ok(record) => (record, None),
            // Preserve the computed result even when it was not recorded;
            // id/timestamp are placeholders for a record that never hit disk.
            Err(e) => (
                AnalysisRecord {
                    id: String::new(),
                    timestamp: String::new(),
                    filename: analysis.filename,
                    total_spaces: analysis.total_spaces,
                    detected_cars: analysis.detected_cars,
                    free_spaces: analysis.free_spaces,
                    occupancy_percentage: analysis.occupancy_percentage,
                },
                Some(e),
            ),
        };

        Ok(AnalysisOutcome {
            annotated: output.annotated,
            record,
            history_error,
        })
    }
}
