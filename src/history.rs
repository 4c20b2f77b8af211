//! Append-only analysis history.
//!
//! The history is a single JSON array on disk. Every append rewrites the
//! whole collection through a temp-file-then-rename, so a crash mid-write
//! leaves the previous file intact. Records are immutable once written;
//! there is no update or delete path. Concurrent writers are not supported:
//! the last whole-file rewrite wins.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;
use log::warn;
use rust_xlsxwriter::Workbook;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Display labels for the listing and spreadsheet projections, in the only
/// order they are ever shown. `id` is internal and never appears here.
pub const DISPLAY_COLUMNS: [&str; 6] = [
    "Date/Time",
    "File Name",
    "Total Parking Spaces",
    "Cars Detected",
    "Free Spaces",
    "Occupancy Percent",
];

const SPREADSHEET_SHEET_NAME: &str = "Parking History";

/// One persisted analysis. Serde field names are the on-disk contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: String,
    pub timestamp: String,
    pub filename: String,
    pub total_spaces: u32,
    pub detected_cars: u32,
    pub free_spaces: u32,
    pub occupancy_percentage: f64,
}

impl AnalysisRecord {
    /// The six display values, matching `DISPLAY_COLUMNS` position for
    /// position.
    pub fn display_row(&self) -> [String; 6] {
        [
            self.timestamp.clone(),
            self.filename.clone(),
            self.total_spaces.to_string(),
            self.detected_cars.to_string(),
            self.free_spaces.to_string(),
            // Stored precision is two decimals; the listing shows the same.
            format!("{:.2}", self.occupancy_percentage),
        ]
    }
}

/// Domain fields of an analysis about to be recorded. `id` and `timestamp`
/// are synthesized by the store at append time.
#[derive(Clone, Debug)]
pub struct NewAnalysis {
    pub filename: String,
    pub total_spaces: u32,
    pub detected_cars: u32,
    pub free_spaces: u32,
    pub occupancy_percentage: f64,
}

/// Durable append-only log of [`AnalysisRecord`].
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one analysis, synthesizing its `id` and `timestamp`, and
    /// rewrite the collection. Returns the record as written.
    ///
    /// A record is written whole or not at all.
    pub fn append(&self, analysis: NewAnalysis) -> Result<AnalysisRecord, Error> {
        let record = AnalysisRecord {
            id: Uuid::new_v4().to_string(),
            timestamp: Local::now().to_rfc3339(),
            filename: analysis.filename,
            total_spaces: analysis.total_spaces,
            detected_cars: analysis.detected_cars,
            free_spaces: analysis.free_spaces,
            occupancy_percentage: analysis.occupancy_percentage,
        };

        let mut records = self.load();
        records.push(record.clone());
        self.rewrite(&records).map_err(Error::HistoryWrite)?;
        Ok(record)
    }

    /// Read the full history in append order.
    ///
    /// A missing, empty, or unparsable file yields an empty history. The
    /// cause is logged but never surfaced: a broken history must not take
    /// the listing or export surface down with it.
    pub fn load(&self) -> Vec<AnalysisRecord> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("history {} unreadable: {}", self.path.display(), e);
                return Vec::new();
            }
        };
        if raw.is_empty() {
            return Vec::new();
        }
        match serde_json::from_slice(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    "history {} does not parse, treating as empty: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// The persisted collection's serialized form, verbatim, internal field
    /// names included. `[]` when no store exists.
    pub fn export_json(&self) -> Vec<u8> {
        match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("history {} unreadable: {}", self.path.display(), e);
                }
                b"[]".to_vec()
            }
        }
    }

    /// Single-sheet XLSX workbook with the six display columns, one row per
    /// record, no index column.
    pub fn export_spreadsheet(&self) -> Result<Vec<u8>, Error> {
        let records = self.load();

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SPREADSHEET_SHEET_NAME)?;

        for (col, label) in DISPLAY_COLUMNS.iter().enumerate() {
            sheet.write_string(0, col as u16, *label)?;
        }
        for (i, record) in records.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_string(row, 0, &record.timestamp)?;
            sheet.write_string(row, 1, &record.filename)?;
            sheet.write_number(row, 2, f64::from(record.total_spaces))?;
            sheet.write_number(row, 3, f64::from(record.detected_cars))?;
            sheet.write_number(row, 4, f64::from(record.free_spaces))?;
            sheet.write_number(row, 5, record.occupancy_percentage)?;
        }

        Ok(workbook.save_to_buffer()?)
    }

    fn rewrite(&self, records: &[AnalysisRecord]) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(records).context("serialize history")?;

        // Temp file in the same directory so the rename cannot cross
        // filesystems.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json)
            .with_context(|| format!("write temp history {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replace history {}", self.path.display()))?;
        Ok(())
    }
}
