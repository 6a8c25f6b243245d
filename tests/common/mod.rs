#![allow(dead_code)]

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use rating_table::config::Config;

pub const TEMPLATE: &str = "<!DOCTYPE html>\n<html>\n<body>\n  <div id=\"table\"></div>\n  <!-- DATA -->\n</body>\n</html>\n";

/// A throwaway site root laid out like a real one: `dat/`, `dat/ratings/`,
/// `src/template.htm`.
pub struct Site {
    pub dir: TempDir,
}

impl Site {
    pub fn new() -> Self {
        let site = Self { dir: tempfile::tempdir().unwrap() };
        fs::create_dir_all(site.root().join("dat/ratings")).unwrap();
        fs::create_dir_all(site.root().join("src")).unwrap();
        site.write("dat/engines.json", "[]");
        site.write("dat/sources.json", "[]");
        site.write("dat/eval.json", "[]");
        site.write("dat/search.json", "[]");
        site.write("src/template.htm", TEMPLATE);
        site
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn output(&self) -> PathBuf {
        self.root().join("index.htm")
    }

    pub fn config(&self) -> Config {
        Config::new(self.root())
    }

    pub fn write(&self, rel: &str, contents: &str) {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    pub fn write_json(&self, rel: &str, value: Value) {
        self.write(rel, &serde_json::to_string_pretty(&value).unwrap());
    }

    pub fn rating_file(&self, name: &str, value: Value) {
        self.write_json(&format!("dat/ratings/{name}"), value);
    }
}

/// Pulls the JSON payload back out of a written page.
pub fn payload_of(page: &str) -> Value {
    let start = page.find("window.__TABLE_DATA__ = ").unwrap() + "window.__TABLE_DATA__ = ".len();
    let end = page[start..].find(";</script>").unwrap() + start;
    serde_json::from_str(&page[start..end]).unwrap()
}
