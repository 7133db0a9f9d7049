use std::collections::HashMap;
use std::env;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::Serialize;

use crate::controller::{builtin_resources, ResourceSpec};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConfigFile {
    #[serde(alias = "api_url")]
    pub base_url: Option<String>,
    pub document_url: Option<String>,
    pub collection_keys: Option<Vec<String>>,
    pub proxy: Option<String>,
    pub output: Option<String>,
    pub no_color: Option<bool>,
    #[serde(default)]
    pub resources: HashMap<String, ResourceSpec>,
}

impl ConfigFile {
    /// Built-in resources with the configured ones layered on top.
    pub fn resources(&self) -> HashMap<String, ResourceSpec> {
        let mut out = builtin_resources();
        for (name, spec) in &self.resources {
            out.insert(name.clone(), spec.clone());
        }
        out
    }
}

const CONFIG_DIR: &str = ".recordview";
const CONFIG_FILE: &str = "config.yml";

fn home_dir() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .iter()
        .find_map(|key| env::var_os(key).filter(|v| !v.is_empty()))
        .map(PathBuf::from)
}

pub fn default_config_path() -> Option<PathBuf> {
    home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\"))
    };
    match (rest, home_dir()) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

impl ConfigFile {
    /// An empty file, or a missing one when `allow_missing`, yields the defaults.
    pub fn load(path: &Path, allow_missing: bool) -> Result<Self, String> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound && allow_missing => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(format!("config file not found '{}'", path.display()))
            }
            Err(e) => return Err(format!("failed to read config '{}': {e}", path.display())),
        };
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Self = serde_yaml::from_str(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            resources = cfg.resources.len(),
            "config loaded"
        );
        Ok(cfg)
    }
}

const DEFAULT_CONFIG_YAML: &str = r#"# recordview config
#
# Location (default):
#   ~/.recordview/config.yml

# REST backend (json-server style)
base_url: http://localhost:3000

# Static JSON document for `recordview document`
# document_url: https://example.com/db.json
# Keys searched, in order, when the document is not a bare array
collection_keys: [products, items, users, data]

# HTTP (optional)
# proxy: http://127.0.0.1:8080

# Output (optional, defaults to stdout)
# output: ./view.html

no_color: false

# Extra or overriding resources. Built in: posts, comments, products.
# resources:
#   users:
#     search_field: name
#     required: [name, email]
#     view:
#       layout: cards
#       soft_delete_badge: true
#       actions: true
#       columns:
#         - header: Name
#           field: name
#         - header: Email
#           field: email
"#;

/// Returns `false` when a file already exists at `path`; it is left untouched.
pub fn write_default_config(path: &Path) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .map_err(|e| format!("failed to create config directory '{}': {e}", dir.display()))?;
    }
    std::fs::write(path, DEFAULT_CONFIG_YAML)
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Layout;

    #[test]
    fn default_yaml_parses() {
        let cfg: ConfigFile = serde_yaml::from_str(DEFAULT_CONFIG_YAML).unwrap();
        assert_eq!(cfg.base_url.as_deref(), Some(DEFAULT_BASE_URL));
        assert_eq!(cfg.collection_keys.unwrap().len(), 4);
        assert!(cfg.resources.is_empty());
    }

    #[test]
    fn missing_file_is_allowed_on_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yml");
        assert!(ConfigFile::load(&path, true).is_ok());
        assert!(ConfigFile::load(&path, false)
            .unwrap_err()
            .starts_with("config file not found"));
    }

    #[test]
    fn empty_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.yml");
        std::fs::write(&path, "\n  \n").unwrap();
        let cfg = ConfigFile::load(&path, false).unwrap();
        assert!(cfg.base_url.is_none());
    }

    #[test]
    fn default_is_written_once_and_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yml");
        assert!(write_default_config(&path).unwrap());
        std::fs::write(&path, "base_url: http://mock:4000\n").unwrap();
        assert!(!write_default_config(&path).unwrap());
        let cfg = ConfigFile::load(&path, false).unwrap();
        assert_eq!(cfg.base_url.as_deref(), Some("http://mock:4000"));
    }

    #[test]
    fn tilde_expands_only_as_a_prefix() {
        assert_eq!(expand_tilde("./out.html"), PathBuf::from("./out.html"));
        assert_eq!(expand_tilde("a/~/b"), PathBuf::from("a/~/b"));
        if let Some(home) = home_dir() {
            assert_eq!(expand_tilde("~"), home);
            assert_eq!(expand_tilde("~/view.html"), home.join("view.html"));
        }
    }

    #[test]
    fn configured_resources_override_builtins() {
        let cfg: ConfigFile = serde_yaml::from_str(
            r#"
resources:
  posts:
    search_field: body
  users:
    required: [name]
    view:
      layout: cards
      columns:
        - header: Name
          field: name
"#,
        )
        .unwrap();
        let resources = cfg.resources();
        assert_eq!(resources["posts"].search_field, "body");
        assert_eq!(resources["users"].view.layout, Layout::Cards);
        assert_eq!(resources["users"].search_field, "title");
        assert!(resources.contains_key("comments"));
    }

    #[test]
    fn invalid_yaml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yml");
        std::fs::write(&path, "resources: [").unwrap();
        let err = ConfigFile::load(&path, false).unwrap_err();
        assert!(err.contains("bad.yml"));
    }
}
