//! park_history - list and export the analysis history

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use parkwatch::{HistoryStore, ParkwatchConfig, DISPLAY_COLUMNS};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// History file path override.
    #[arg(long, env = "PARKWATCH_HISTORY_PATH")]
    history: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the history as a table.
    List,
    /// Write the raw history JSON to a file.
    ExportJson {
        #[arg(long, default_value = "history_export.json")]
        output: PathBuf,
    },
    /// Write the history as a single-sheet XLSX workbook.
    ExportXlsx {
        #[arg(long, default_value = "history_export.xlsx")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = ParkwatchConfig::load()?;
    if let Some(history) = &args.history {
        cfg.history_path = history.clone();
    }
    let store = HistoryStore::new(&cfg.history_path);

    match args.command {
        Command::List => list(&store),
        Command::ExportJson { output } => {
            let json = store.export_json();
            std::fs::write(&output, json)
                .map_err(|e| anyhow!("failed to write {}: {}", output.display(), e))?;
            println!("history JSON written to {}", output.display());
            Ok(())
        }
        Command::ExportXlsx { output } => {
            let workbook = store.export_spreadsheet()?;
            std::fs::write(&output, workbook)
                .map_err(|e| anyhow!("failed to write {}: {}", output.display(), e))?;
            println!("history workbook written to {}", output.display());
            Ok(())
        }
    }
}

fn list(store: &HistoryStore) -> Result<()> {
    let records = store.load();
    if records.is_empty() {
        println!("history is empty");
        return Ok(());
    }

    let rows: Vec<[String; 6]> = records.iter().map(|r| r.display_row()).collect();
    let mut widths: [usize; 6] = [0; 6];
    for (i, label) in DISPLAY_COLUMNS.iter().enumerate() {
        widths[i] = label.len();
    }
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    print_row(&DISPLAY_COLUMNS.map(String::from), &widths);
    for row in &rows {
        print_row(row, &widths);
    }
    Ok(())
}

fn print_row(cells: &[String; 6], widths: &[usize; 6]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", line.trim_end());
}
