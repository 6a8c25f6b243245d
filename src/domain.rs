use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Number;

/// A chess engine as described in `engines.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Engine {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(rename = "eval-id", default)]
    pub eval_id: Option<String>,
    #[serde(rename = "search-id", default)]
    pub search_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Engine {
    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.id)
    }
}

/// A rating provider from `sources.json`; each one owns a rating column
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Source {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "description")]
    pub overview: Option<String>,
}

impl Source {
    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.id)
    }
}

/// Evaluation function or search algorithm; only its label is used
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Descriptor {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Descriptor {
    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.id)
    }
}

/// One validated line of a rating file
#[derive(Debug, Clone, PartialEq)]
pub struct RatingEntry {
    pub engine_id: String,
    pub build: String,
    pub elo: Option<Number>,
    pub date: Option<String>,
}

/// The rating a row holds for one source
#[derive(Debug, Clone, PartialEq)]
pub struct RatingCell {
    pub elo: Option<Number>,
    pub date: Option<String>,
}

impl RatingCell {
    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        self.date.as_deref().and_then(parse_rating_date)
    }
}

impl From<RatingEntry> for RatingCell {
    fn from(entry: RatingEntry) -> Self {
        Self { elo: entry.elo, date: entry.date }
    }
}

/// Parses the date formats rating lists use. Offset-less values are UTC.
pub fn parse_rating_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc());
        }
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc());
    }

    // Partial dates: "2024-05" and "2024"
    let parts: Vec<&str> = s.split('-').collect();
    let year = parts.first()?;
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month: u32 = match parts.as_slice() {
        [_] => 1,
        [_, m] if m.len() == 2 => m.parse().ok()?,
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}
