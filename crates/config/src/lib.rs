//! Thruster record models and loaders for the thruster arrangement utility.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// A thruster record parsed from a layout file.
///
/// Position and orientation are required; thrust bounds and current curves
/// are optional and fall back to the defaults carried by the thruster crate
/// when absent.
#[derive(Debug, Deserialize, Clone)]
pub struct ThrusterRecord {
    /// Mount position relative to the vehicle origin.
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Azimuth of the thrust axis in degrees, measured in the x-y plane.
    pub theta: f64,
    /// Polar angle of the thrust axis in degrees, measured from +z.
    pub phi: f64,
    /// (min, max) thrust bounds in kgf; min is the (negative) reverse limit.
    #[serde(default)]
    pub max_thrusts: Option<[f64; 2]>,
    /// Quadratic current coefficients (a, b, c) for forward thrust.
    #[serde(default)]
    pub fwd_current: Option<[f64; 3]>,
    /// Quadratic current coefficients (a, b, c) for reverse thrust.
    #[serde(default)]
    pub rev_current: Option<[f64; 3]>,
}

/// Errors that can occur while loading layout files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read layout: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Load thruster records from a layout file.
///
/// Dispatches on the path: a directory is read as a set of per-thruster
/// `.toml` records (sorted by filename), a `.toml` file holds a single
/// record, a `.json` file an array of records, and anything else parses as
/// a YAML sequence.
pub fn load_thrusters<P: AsRef<Path>>(path: P) -> Result<Vec<ThrusterRecord>, ConfigError> {
    load_records(path)
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else if path.extension().map(|ext| ext == "json").unwrap_or(false) {
        let reader = File::open(path)?;
        Ok(serde_json::from_reader(reader)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map(|ext| ext == "toml").unwrap_or(false))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}
