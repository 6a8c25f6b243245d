/// Default locations, relative to the site root.
pub const DEFAULT_DATA_DIR: &str = "dat";
pub const DEFAULT_RATINGS_DIR: &str = "dat/ratings";
pub const DEFAULT_TEMPLATE: &str = "src/template.htm";
pub const DEFAULT_OUTPUT: &str = "index.htm";

/// Config file looked up in the root when `--config` is not given
pub const CONFIG_FILE_NAME: &str = "rating_table.toml";

// Metadata documents inside the data dir
pub const ENGINES_FILE: &str = "engines.json";
pub const SOURCES_FILE: &str = "sources.json";
pub const EVAL_FILE: &str = "eval.json";
pub const SEARCH_FILE: &str = "search.json";

/// Placeholder in the template that receives the data payload
pub const DATA_MARKER: &str = "<!-- DATA -->";

/// Global the payload is assigned to in the emitted page
pub const DEFAULT_GLOBAL_NAME: &str = "__TABLE_DATA__";

// Row fields produced for every row, independent of the rating sources
pub const FIELD_ENGINE_ID: &str = "engine-id";
pub const FIELD_ENGINE: &str = "engine";
pub const FIELD_ENGINE_URL: &str = "engine-url";
pub const FIELD_BUILD: &str = "build";
pub const FIELD_COUNTRY: &str = "country";
pub const FIELD_LANGUAGE: &str = "language";
pub const FIELD_EVAL: &str = "eval";
pub const FIELD_SEARCH: &str = "search";

/// Field names a rating source id may not take over
pub const RESERVED_FIELDS: [&str; 8] = [
    FIELD_ENGINE_ID,
    FIELD_ENGINE,
    FIELD_ENGINE_URL,
    FIELD_BUILD,
    FIELD_COUNTRY,
    FIELD_LANGUAGE,
    FIELD_EVAL,
    FIELD_SEARCH,
];

/// Identity columns in display order, as (field, title)
pub const IDENTITY_COLUMNS: [(&str, &str); 6] = [
    (FIELD_ENGINE, "Engine"),
    (FIELD_BUILD, "Build"),
    (FIELD_COUNTRY, "Nat"),
    (FIELD_LANGUAGE, "Lang"),
    (FIELD_EVAL, "Eval"),
    (FIELD_SEARCH, "Search"),
];

pub fn is_reserved_field(id: &str) -> bool {
    RESERVED_FIELDS.contains(&id)
}
