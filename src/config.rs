use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::error::{Result, TableError};

/// Explicit pipeline configuration. Relative paths resolve against `root`.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub root: PathBuf,
    pub data_dir: PathBuf,
    pub ratings_dir: PathBuf,
    pub template: PathBuf,
    pub output: PathBuf,
    pub marker: String,
    pub global_name: String,
    pub log_dir: Option<PathBuf>,
}

/// On-disk shape of `rating_table.toml`; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    paths: PathsSection,
    #[serde(default)]
    template: TemplateSection,
    #[serde(default)]
    logging: LoggingSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PathsSection {
    data_dir: Option<PathBuf>,
    ratings_dir: Option<PathBuf>,
    template: Option<PathBuf>,
    output: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplateSection {
    marker: Option<String>,
    global_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingSection {
    dir: Option<PathBuf>,
}

impl Config {
    /// Defaults for a site rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            data_dir: root.join(constants::DEFAULT_DATA_DIR),
            ratings_dir: root.join(constants::DEFAULT_RATINGS_DIR),
            template: root.join(constants::DEFAULT_TEMPLATE),
            output: root.join(constants::DEFAULT_OUTPUT),
            marker: constants::DATA_MARKER.to_string(),
            global_name: constants::DEFAULT_GLOBAL_NAME.to_string(),
            log_dir: None,
            root,
        }
    }

    /// Defaults overlaid with a TOML config file.
    ///
    /// An explicitly named file must exist. Without one, `rating_table.toml`
    /// in the root is used if present.
    pub fn load(root: impl Into<PathBuf>, config_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::new(root);

        let path = match config_path {
            Some(p) => {
                let p = config.resolve(p);
                if !p.is_file() {
                    return Err(TableError::MissingFile(p));
                }
                Some(p)
            }
            None => {
                let p = config.root.join(constants::CONFIG_FILE_NAME);
                p.is_file().then_some(p)
            }
        };

        if let Some(path) = path {
            let content = fs::read_to_string(&path).map_err(|e| TableError::io(&path, e))?;
            let file: ConfigFile = toml::from_str(&content)
                .map_err(|source| TableError::Toml { path: path.clone(), source })?;
            config.apply(file);
        }

        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, file: ConfigFile) {
        // An overridden data dir moves the default ratings dir along with it
        if let Some(data_dir) = file.paths.data_dir {
            self.data_dir = self.resolve(&data_dir);
            self.ratings_dir = self.data_dir.join("ratings");
        }
        if let Some(p) = file.paths.ratings_dir {
            self.ratings_dir = self.resolve(&p);
        }
        if let Some(p) = file.paths.template {
            self.template = self.resolve(&p);
        }
        if let Some(p) = file.paths.output {
            self.output = self.resolve(&p);
        }
        if let Some(marker) = file.template.marker {
            self.marker = marker;
        }
        if let Some(name) = file.template.global_name {
            self.global_name = name;
        }
        if let Some(dir) = file.logging.dir {
            self.log_dir = Some(self.resolve(&dir));
        }
    }

    pub fn with_template(mut self, path: impl AsRef<Path>) -> Self {
        self.template = self.resolve(path.as_ref());
        self
    }

    pub fn with_output(mut self, path: impl AsRef<Path>) -> Self {
        self.output = self.resolve(path.as_ref());
        self
    }

    /// Joins relative paths onto the root; absolute paths pass through.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.marker.is_empty() {
            return Err(TableError::Config("template marker must not be empty".to_string()));
        }
        let valid_ident = self
            .global_name
            .chars()
            .enumerate()
            .all(|(i, c)| c == '_' || c == '$' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()));
        if self.global_name.is_empty() || !valid_ident {
            return Err(TableError::Config(format!(
                "global name '{}' is not a valid JavaScript identifier",
                self.global_name
            )));
        }
        Ok(())
    }
}
