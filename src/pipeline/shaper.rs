use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

use super::loader::Metadata;
use super::merger::{MergeOutcome, MergedRow};
use crate::constants;
use crate::domain::{Descriptor, Engine, Source};
use crate::text::{escape_html, locale_compare};

/// Display metadata for one table column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub field: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoz_align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_formatter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_tooltip: Option<String>,
}

impl Column {
    fn identity(field: &str, title: &str) -> Self {
        Self {
            field: field.to_string(),
            title: title.to_string(),
            hoz_align: None,
            sorter: None,
            header_filter: Some("input".to_string()),
            formatter: None,
            title_formatter: None,
            header_tooltip: None,
        }
    }

    fn rating(field: &str, title: String) -> Self {
        Self {
            field: field.to_string(),
            title,
            hoz_align: Some("right".to_string()),
            sorter: Some("number".to_string()),
            header_filter: Some("input".to_string()),
            formatter: None,
            title_formatter: None,
            header_tooltip: None,
        }
    }

    fn for_source(source: &Source) -> Self {
        let label = escape_html(source.display_label());
        let mut column = match source.url.as_deref().filter(|u| !u.is_empty()) {
            // The click handler keeps the link from toggling the header sort
            Some(url) => {
                let mut column = Self::rating(
                    &source.id,
                    format!(
                        "{label} <a href=\"{}\" target=\"_blank\" rel=\"noopener\" class=\"source-link\" \
                         title=\"{label}\" onclick=\"event.stopPropagation()\">&#8599;</a>",
                        escape_html(url)
                    ),
                );
                column.title_formatter = Some("html".to_string());
                column
            }
            None => Self::rating(&source.id, label),
        };
        column.header_tooltip = source
            .overview
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        column
    }
}

/// One rendered table row.
///
/// Rating fields are flattened after the identity fields, one per source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    #[serde(rename = "engine-id")]
    pub engine_id: String,
    pub engine: String,
    #[serde(rename = "engine-url")]
    pub engine_url: Option<String>,
    pub build: String,
    pub country: String,
    pub language: String,
    pub eval: String,
    pub search: String,
    #[serde(flatten)]
    pub ratings: Map<String, Value>,
    /// Plain engine label the rows are ordered by
    #[serde(skip)]
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<TableRow>,
}

/// Id -> engine and id -> label lookups over the metadata.
/// Later duplicates of an id replace earlier ones.
struct Lookups<'a> {
    engines: HashMap<&'a str, &'a Engine>,
    evals: HashMap<&'a str, &'a str>,
    searches: HashMap<&'a str, &'a str>,
}

impl<'a> Lookups<'a> {
    fn new(metadata: &'a Metadata) -> Self {
        Self {
            engines: metadata.engines.iter().map(|e| (e.id.as_str(), e)).collect(),
            evals: label_map(&metadata.evals),
            searches: label_map(&metadata.searches),
        }
    }
}

fn label_map(descriptors: &[Descriptor]) -> HashMap<&str, &str> {
    descriptors.iter().map(|d| (d.id.as_str(), d.display_label())).collect()
}

/// Resolves `id` through `labels`, falling back to the raw id, then to "".
fn descriptor_label(labels: &HashMap<&str, &str>, id: Option<&str>) -> String {
    match id {
        Some(id) => labels.get(id).copied().unwrap_or(id).to_string(),
        None => String::new(),
    }
}

/// Declared sources, first declaration of each id only. Ids that name a
/// built-in field are left out; the merger reports them.
fn declared_sources(sources: &[Source]) -> Vec<&Source> {
    let mut seen = HashSet::new();
    sources
        .iter()
        .filter(|s| !constants::is_reserved_field(&s.id))
        .filter(|s| seen.insert(s.id.as_str()))
        .collect()
}

/// Builds the column list and the sorted rows.
pub fn shape(metadata: &Metadata, merged: &MergeOutcome) -> Table {
    let lookups = Lookups::new(metadata);
    let sources = declared_sources(&metadata.sources);

    let mut adhoc: Vec<&str> = merged.adhoc_sources.iter().map(String::as_str).collect();
    adhoc.sort_unstable();
    adhoc.dedup();

    let rating_fields: Vec<&str> = sources
        .iter()
        .map(|s| s.id.as_str())
        .chain(adhoc.iter().copied())
        .collect();

    let mut rows: Vec<TableRow> = merged
        .rows
        .iter()
        .map(|row| shape_row(row, &lookups, &rating_fields))
        .collect();
    rows.sort_by(|a, b| {
        locale_compare(&a.label, &b.label).then_with(|| locale_compare(&a.build, &b.build))
    });

    let mut columns: Vec<Column> = constants::IDENTITY_COLUMNS
        .iter()
        .map(|(field, title)| Column::identity(field, title))
        .collect();
    if let Some(engine) = columns.first_mut() {
        engine.formatter = Some("html".to_string());
    }
    columns.extend(sources.iter().map(|s| Column::for_source(s)));
    columns.extend(adhoc.iter().map(|id| Column::rating(id, escape_html(id))));

    Table { columns, rows }
}

fn shape_row(row: &MergedRow, lookups: &Lookups<'_>, rating_fields: &[&str]) -> TableRow {
    let engine = lookups.engines.get(row.engine_id.as_str()).copied();

    let label = engine
        .map(Engine::display_label)
        .unwrap_or(&row.engine_id)
        .to_string();
    let engine_url = engine
        .and_then(|e| e.url.as_deref())
        .filter(|u| !u.is_empty())
        .map(str::to_string);
    let rendered = match &engine_url {
        Some(url) => format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
            escape_html(url),
            escape_html(&label)
        ),
        None => escape_html(&label),
    };

    let mut ratings = Map::new();
    for field in rating_fields {
        let value = row
            .ratings
            .get(*field)
            .and_then(|cell| cell.elo.clone())
            .map(Value::Number)
            .unwrap_or(Value::Null);
        ratings.insert(field.to_string(), value);
    }

    TableRow {
        engine_id: row.engine_id.clone(),
        engine: rendered,
        engine_url,
        build: row.build.clone(),
        country: engine.and_then(|e| e.country.clone()).unwrap_or_default(),
        language: engine.and_then(|e| e.language.clone()).unwrap_or_default(),
        eval: descriptor_label(&lookups.evals, engine.and_then(|e| e.eval_id.as_deref())),
        search: descriptor_label(&lookups.searches, engine.and_then(|e| e.search_id.as_deref())),
        ratings,
        label,
    }
}
