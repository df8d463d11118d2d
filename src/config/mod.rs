//! Configuration aggregation across a repository.
//!
//! Every `.properties`, `.yml` and `.yaml` file under the root is parsed and
//! merged into one flat `ConfigMap`. Files are merged in discovery order, so a
//! key defined in several files keeps the value from the last one. A file that
//! fails to load is logged and contributes nothing.

pub mod properties;
pub mod yaml;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use globset::GlobSet;
use thiserror::Error;

use crate::files;

/// Flat configuration: dot-separated key to string value (or null).
pub type ConfigMap = BTreeMap<String, Option<String>>;

/// Extensions of properties-style files.
pub const PROPERTIES_EXTENSIONS: &[&str] = &["properties"];

/// Extensions of YAML-style files.
pub const YAML_EXTENSIONS: &[&str] = &["yml", "yaml"];

/// Errors loading a single configuration file.
#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid properties: {0}")]
    Properties(#[from] properties::PropertiesError),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("YAML is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("unsupported config file extension")]
    Unsupported,
}

/// Load one config file into flat key/value pairs, in file order.
pub fn load_file(path: &Path) -> Result<Vec<(String, Option<String>)>, ConfigFileError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let bytes = fs::read(path)?;

    if PROPERTIES_EXTENSIONS.contains(&ext) {
        let content = decode_properties(bytes);
        let pairs = properties::parse(&content)?;
        Ok(pairs.into_iter().map(|(k, v)| (k, Some(v))).collect())
    } else if YAML_EXTENSIONS.contains(&ext) {
        let content = String::from_utf8(bytes)?;
        Ok(yaml::flatten_documents(&content)?)
    } else {
        Err(ConfigFileError::Unsupported)
    }
}

/// Properties files are UTF-8 in practice but historically ISO-8859-1.
fn decode_properties(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

/// Walks a repository and merges all of its configuration files.
pub struct ConfigAggregator {
    excludes: GlobSet,
}

impl ConfigAggregator {
    pub fn new() -> Self {
        Self {
            excludes: GlobSet::empty(),
        }
    }

    /// Skip paths matching these globs (relative to the scanned root).
    pub fn excludes(mut self, excludes: GlobSet) -> Self {
        self.excludes = excludes;
        self
    }

    /// Aggregate every config file under `root` into one map.
    pub fn aggregate(&self, root: &Path) -> ConfigMap {
        let extensions: Vec<&str> = PROPERTIES_EXTENSIONS
            .iter()
            .chain(YAML_EXTENSIONS)
            .copied()
            .collect();
        let config_files = files::collect_files(root, &extensions, &self.excludes);

        let mut config = ConfigMap::new();
        for file in &config_files {
            match load_file(file) {
                Ok(pairs) => {
                    log::info!("Loaded {} key(s) from {}", pairs.len(), file.display());
                    config.extend(pairs);
                }
                Err(e) => log::warn!("Failed to load config file {}: {}", file.display(), e),
            }
        }
        config
    }
}

impl Default for ConfigAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn value(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_properties_and_yaml_scenario() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "application.properties", "key1=value1\n");
        write(temp.path(), "application.yml", "key3: value3\na:\n  b: value4\n");

        let config = ConfigAggregator::new().aggregate(temp.path());

        let mut expected = ConfigMap::new();
        expected.insert("key1".to_string(), value("value1"));
        expected.insert("key3".to_string(), value("value3"));
        expected.insert("a.b".to_string(), value("value4"));
        assert_eq!(config, expected);
    }

    #[test]
    fn test_last_file_wins() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.properties", "shared=from-a\nonly.a=1\n");
        write(temp.path(), "b.yaml", "shared: from-b\n");
        write(temp.path(), "c/application.properties", "shared=from-c\n");

        let config = ConfigAggregator::new().aggregate(temp.path());
        assert_eq!(config["shared"], value("from-c"));
        assert_eq!(config["only.a"], value("1"));
    }

    #[test]
    fn test_broken_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "bad.yml", "a: [unclosed\n");
        write(temp.path(), "good.yml", "server:\n  port: 8080\n");
        write(temp.path(), "bad.properties", "x=\\uZZZZ\n");

        let config = ConfigAggregator::new().aggregate(temp.path());
        assert_eq!(config.len(), 1);
        assert_eq!(config["server.port"], value("8080"));
    }

    #[test]
    fn test_yaml_null_preserved() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "application.yaml", "spring:\n  profiles:\n");

        let config = ConfigAggregator::new().aggregate(temp.path());
        assert_eq!(config.get("spring.profiles"), Some(&None));
    }

    #[test]
    fn test_latin1_properties_fallback() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("legacy.properties");
        fs::write(&path, b"name=caf\xe9\n").unwrap();

        let pairs = load_file(&path).unwrap();
        assert_eq!(pairs, vec![("name".to_string(), value("café"))]);
    }

    #[test]
    fn test_yaml_invalid_utf8_is_load_failure() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("application.yml");
        fs::write(&path, b"name: caf\xe9\n").unwrap();

        assert!(matches!(load_file(&path), Err(ConfigFileError::Encoding(_))));
        assert!(ConfigAggregator::new().aggregate(temp.path()).is_empty());
    }

    #[test]
    fn test_hidden_directory_config_aggregated() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            ".mvn/wrapper/maven-wrapper.properties",
            "distributionUrl=http://x\n",
        );

        let config = ConfigAggregator::new().aggregate(temp.path());
        assert_eq!(config["distributionUrl"], value("http://x"));
    }

    #[test]
    fn test_yaml_duplicate_keys_do_not_drop_file() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "application.yml", "server:\n  port: 1\nname: a\nname: b\n");

        let config = ConfigAggregator::new().aggregate(temp.path());
        assert_eq!(config["name"], value("b"));
        assert_eq!(config["server.port"], value("1"));
    }

    #[test]
    fn test_excluded_paths_ignored() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "target/classes/application.yml", "stale: true\n");
        write(temp.path(), "src/main/resources/application.yml", "fresh: true\n");

        let excludes = files::build_excludes(&["target/**".to_string()]).unwrap();
        let config = ConfigAggregator::new().excludes(excludes).aggregate(temp.path());
        assert!(config.contains_key("fresh"));
        assert!(!config.contains_key("stale"));
    }

    #[test]
    fn test_empty_directory() {
        let temp = TempDir::new().unwrap();
        assert!(ConfigAggregator::new().aggregate(temp.path()).is_empty());
    }
}
