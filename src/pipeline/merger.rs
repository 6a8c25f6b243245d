use serde_json::{Number, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

use super::loader::RatingFile;
use crate::constants;
use crate::domain::{RatingCell, RatingEntry, Source};

/// One (engine, build) combination and its winning cell per source
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub engine_id: String,
    pub build: String,
    pub ratings: BTreeMap<String, RatingCell>,
}

/// Result of folding every rating file into rows
#[derive(Debug, Default)]
pub struct MergeOutcome {
    /// In first-seen order
    pub rows: Vec<MergedRow>,
    /// Source ids seen in rating data that are not declared in `sources.json`
    pub adhoc_sources: Vec<String>,
    pub entries_total: usize,
    pub entries_merged: usize,
    pub entries_skipped: usize,
    pub warnings: Vec<String>,
}

/// Folds rating entries into (engine id, build) rows, resolving each cell
/// with the recency rule in [`resolve_conflict`].
pub struct Merger<'a> {
    /// Declared source ids in metadata order, reserved field names excluded
    declared: Vec<&'a str>,
    known: HashSet<&'a str>,
    index: HashMap<(String, String), usize>,
    outcome: MergeOutcome,
}

impl<'a> Merger<'a> {
    pub fn new(sources: &'a [Source]) -> Self {
        let mut outcome = MergeOutcome::default();
        let mut declared = Vec::with_capacity(sources.len());
        for source in sources {
            if constants::is_reserved_field(&source.id) {
                let msg = format!(
                    "Ignoring source '{}' in sources.json: id collides with a built-in column",
                    source.id
                );
                warn!("{}", msg);
                outcome.warnings.push(msg);
            } else {
                declared.push(source.id.as_str());
            }
        }

        Self {
            known: declared.iter().copied().collect(),
            declared,
            index: HashMap::new(),
            outcome,
        }
    }

    /// Exact id match first, then case-insensitive; unknown ids pass through.
    pub fn resolve_source_id(&self, raw: &str) -> Option<&'a str> {
        if let Some(&id) = self.known.get(raw) {
            return Some(id);
        }
        let lower = raw.to_lowercase();
        self.declared
            .iter()
            .copied()
            .find(|id| id.to_lowercase() == lower)
    }

    pub fn add_file(&mut self, file: &RatingFile) {
        let source_id = match self.resolve_source_id(&file.stem) {
            Some(id) => id.to_string(),
            None => {
                self.warn(format!(
                    "source {} (from {}) not in sources.json",
                    file.stem,
                    file.path.display()
                ));
                file.stem.clone()
            }
        };

        if constants::is_reserved_field(&source_id) {
            self.warn(format!(
                "Skipping {}: source id '{}' collides with a built-in column",
                file.path.display(),
                source_id
            ));
            return;
        }

        let is_adhoc = !self.known.contains(source_id.as_str());
        let mut merged_any = false;

        for raw in &file.entries {
            self.outcome.entries_total += 1;
            match parse_entry(raw) {
                Ok(entry) => {
                    if entry.elo.is_none() {
                        self.warn(format!(
                            "Rating in {} has no numeric elo: {}",
                            file.path.display(),
                            raw
                        ));
                    }
                    self.add_entry(&source_id, entry);
                    self.outcome.entries_merged += 1;
                    merged_any = true;
                }
                Err(reason) => {
                    self.outcome.entries_skipped += 1;
                    self.warn(format!(
                        "Skipping invalid rating in {} ({}): {}",
                        file.path.display(),
                        reason,
                        raw
                    ));
                }
            }
        }

        if is_adhoc && merged_any && !self.outcome.adhoc_sources.contains(&source_id) {
            self.outcome.adhoc_sources.push(source_id);
        }
        debug!(file = %file.path.display(), "Merged rating file");
    }

    pub fn add_entry(&mut self, source_id: &str, entry: RatingEntry) {
        let key = (entry.engine_id.clone(), entry.build.clone());
        let rows = &mut self.outcome.rows;
        let idx = *self.index.entry(key).or_insert_with(|| {
            rows.push(MergedRow {
                engine_id: entry.engine_id.clone(),
                build: entry.build.clone(),
                ratings: BTreeMap::new(),
            });
            rows.len() - 1
        });

        let incoming = RatingCell::from(entry);
        let ratings = &mut rows[idx].ratings;
        let replace = match ratings.get(source_id) {
            Some(existing) => resolve_conflict(existing, &incoming),
            None => true,
        };
        if replace {
            ratings.insert(source_id.to_string(), incoming);
        }
    }

    pub fn finish(mut self) -> MergeOutcome {
        self.outcome.adhoc_sources.sort();
        self.outcome
    }

    fn warn(&mut self, msg: String) {
        warn!("{}", msg);
        self.outcome.warnings.push(msg);
    }
}

/// Whether `incoming` replaces `existing` in a cell.
///
/// A later parseable date wins, a dated candidate beats an undated one, and
/// between two undated candidates the incoming one wins. Equal dates keep the
/// existing cell.
pub fn resolve_conflict(existing: &RatingCell, incoming: &RatingCell) -> bool {
    match (existing.parsed_date(), incoming.parsed_date()) {
        (None, None) => true,
        (None, Some(_)) => true,
        (Some(_), None) => false,
        (Some(ed), Some(nd)) => nd > ed,
    }
}

/// Validates one rating element. Engine id and build are required.
pub fn parse_entry(raw: &Value) -> Result<RatingEntry, &'static str> {
    let obj = raw.as_object().ok_or("not an object")?;

    let engine_id = match obj.get("engine-id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err("missing engine-id"),
    };

    let build = match obj.get("build") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err("missing build"),
    };

    let elo = match obj.get("elo") {
        Some(Value::Number(n)) => Some(n.clone()),
        Some(Value::String(s)) => parse_number(s),
        _ => None,
    };

    let date = obj.get("date").and_then(Value::as_str).map(str::to_string);

    Ok(RatingEntry { engine_id, build, elo, date })
}

fn parse_number(s: &str) -> Option<Number> {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::from(i));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Merges every file in order.
pub fn merge(sources: &[Source], files: &[RatingFile]) -> MergeOutcome {
    let mut merger = Merger::new(sources);
    for file in files {
        merger.add_file(file);
    }
    merger.finish()
}
