use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::constants;
use crate::domain::{Descriptor, Engine, Source};
use crate::error::{Result, TableError};

/// The four metadata documents, in declared order
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub engines: Vec<Engine>,
    pub sources: Vec<Source>,
    pub evals: Vec<Descriptor>,
    pub searches: Vec<Descriptor>,
}

/// A rating file that parsed as a JSON array
#[derive(Debug, Clone)]
pub struct RatingFile {
    pub path: PathBuf,
    /// File name without the `.json` extension; the raw source id
    pub stem: String,
    pub entries: Vec<Value>,
}

#[derive(Debug, Default)]
pub struct LoadedData {
    pub metadata: Metadata,
    /// Sorted by file name
    pub rating_files: Vec<RatingFile>,
    pub warnings: Vec<String>,
}

/// Checks every required path, then reads metadata and rating files.
pub fn load(config: &Config) -> Result<LoadedData> {
    ensure_dir(&config.data_dir)?;
    ensure_dir(&config.ratings_dir)?;
    if !config.template.is_file() {
        return Err(TableError::MissingFile(config.template.clone()));
    }

    let metadata = load_metadata(&config.data_dir)?;
    info!(
        engines = metadata.engines.len(),
        sources = metadata.sources.len(),
        evals = metadata.evals.len(),
        searches = metadata.searches.len(),
        "Loaded metadata"
    );

    let mut warnings = Vec::new();
    let rating_files = load_rating_files(&config.ratings_dir, &mut warnings)?;
    info!(files = rating_files.len(), "Loaded rating files");

    Ok(LoadedData { metadata, rating_files, warnings })
}

pub fn load_metadata(data_dir: &Path) -> Result<Metadata> {
    Ok(Metadata {
        engines: read_json(&data_dir.join(constants::ENGINES_FILE))?,
        sources: read_json(&data_dir.join(constants::SOURCES_FILE))?,
        evals: read_json(&data_dir.join(constants::EVAL_FILE))?,
        searches: read_json(&data_dir.join(constants::SEARCH_FILE))?,
    })
}

/// Reads every `*.json` file in the ratings dir, in file name order.
///
/// Files that are not a top-level array are skipped with a warning; a parse
/// failure is fatal.
pub fn load_rating_files(ratings_dir: &Path, warnings: &mut Vec<String>) -> Result<Vec<RatingFile>> {
    let read_dir = fs::read_dir(ratings_dir).map_err(|e| TableError::io(ratings_dir, e))?;

    let mut candidates = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| TableError::io(ratings_dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
            let msg = format!("Skipping {}: file name is not valid UTF-8", path.display());
            warn!("{}", msg);
            warnings.push(msg);
            continue;
        };
        if let Some(stem) = json_stem(&file_name) {
            candidates.push((file_name.clone(), stem.to_string(), path));
        }
    }
    candidates.sort_by(|a, b| a.0.cmp(&b.0));

    let mut files = Vec::with_capacity(candidates.len());
    for (_, stem, path) in candidates {
        match read_json::<Value>(&path)? {
            Value::Array(entries) => {
                debug!(file = %path.display(), entries = entries.len(), "Read rating file");
                files.push(RatingFile { path, stem, entries });
            }
            _ => {
                let msg = format!("Skipping {}: not an array", path.display());
                warn!("{}", msg);
                warnings.push(msg);
            }
        }
    }
    Ok(files)
}

/// `"ccrl.JSON"` -> `Some("ccrl")`; other extensions and a bare `.json` -> `None`
fn json_stem(file_name: &str) -> Option<&str> {
    let split = file_name.len().checked_sub(".json".len())?;
    if !file_name.is_char_boundary(split) {
        return None;
    }
    let (stem, ext) = file_name.split_at(split);
    (ext.eq_ignore_ascii_case(".json") && !stem.is_empty()).then_some(stem)
}

fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(TableError::MissingDir(path.to_path_buf()))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(TableError::MissingFile(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|e| TableError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| TableError::json(path, e))
}
