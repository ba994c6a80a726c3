//! Reading projects and layer tables, writing result tables

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use crate::embedment::ApportionmentResult;
use crate::input::{LayerInput, ProjectInput};
use crate::types::format_decimal_de;

/// Field separator of the CSV tables; keeps decimal commas intact
pub const CSV_DELIMITER: u8 = b';';

#[derive(Debug, thiserror::Error)]
pub enum ProjectFileError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlWriteError(#[from] toml::ser::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Unsupported project file: {0}")]
    UnsupportedFormat(String),
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> Result<Format, ProjectFileError> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        _ => Err(ProjectFileError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Load a project from a `.json` or `.toml` file
pub fn load_project(path: impl AsRef<Path>) -> Result<ProjectInput, ProjectFileError> {
    let path = path.as_ref();
    let format = format_of(path)?;
    let text = fs::read_to_string(path)?;
    let project = match format {
        Format::Json => serde_json::from_str(&text)?,
        Format::Toml => toml::from_str(&text)?,
    };
    tracing::debug!(path = %path.display(), "project loaded");
    Ok(project)
}

/// Save a project as `.json` or `.toml`, chosen by extension
pub fn save_project(path: impl AsRef<Path>, project: &ProjectInput) -> Result<(), ProjectFileError> {
    let path = path.as_ref();
    let text = match format_of(path)? {
        Format::Json => serde_json::to_string_pretty(project)?,
        Format::Toml => toml::to_string_pretty(project)?,
    };
    fs::write(path, text)?;
    Ok(())
}

/// Layer table with a header row using the project field names
pub fn read_layers_csv<R: io::Read>(reader: R) -> Result<Vec<LayerInput>, ProjectFileError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(CSV_DELIMITER)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut layers = Vec::new();
    for record in csv_reader.deserialize() {
        let layer: LayerInput = record?;
        layers.push(layer);
    }
    Ok(layers)
}

pub fn read_layers_csv_file(path: impl AsRef<Path>) -> Result<Vec<LayerInput>, ProjectFileError> {
    read_layers_csv(fs::File::open(path)?)
}

/// One exported line of an apportionment table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApportionmentRecord {
    pub position: String,
    pub support: String,
    pub zone: String,
    pub layer_no: usize,
    pub layer: String,
    pub thickness_m: String,
    pub governing_depth_m: String,
    pub share_pct: String,
    pub remaining_pct: String,
    pub depth_used_m: String,
    pub cumulative_depth_m: String,
}

/// Records of the layers that took part in each apportionment
pub fn apportionment_records(blocks: &[ApportionmentResult]) -> Vec<ApportionmentRecord> {
    blocks
        .iter()
        .flat_map(|block| {
            block.rows.iter().filter(|row| !row.is_skipped()).map(move |row| ApportionmentRecord {
                position: block.position.clone(),
                support: block.support.key().to_string(),
                zone: block.zone.to_string(),
                layer_no: row.layer_index + 1,
                layer: row.layer.clone(),
                thickness_m: format_decimal_de(row.thickness_m, 2),
                governing_depth_m: format_decimal_de(row.governing_depth_m, 2),
                share_pct: format_decimal_de(row.share_pct.unwrap_or(f64::NAN), 1),
                remaining_pct: format_decimal_de(row.remaining_pct, 1),
                depth_used_m: format_decimal_de(row.depth_used_m, 2),
                cumulative_depth_m: format_decimal_de(row.cumulative_depth_m, 2),
            })
        })
        .collect()
}

/// Apportionment tables of all positions with decimal commas
pub fn write_apportionment_csv<W: io::Write>(
    writer: W,
    blocks: &[ApportionmentResult],
) -> Result<(), ProjectFileError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(CSV_DELIMITER)
        .from_writer(writer);
    for record in apportionment_records(blocks) {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_apportionment_csv_file(
    path: impl AsRef<Path>,
    blocks: &[ApportionmentResult],
) -> Result<(), ProjectFileError> {
    write_apportionment_csv(fs::File::create(path)?, blocks)
}
