//! YAML persistence for leave configs.
//!
//! Parsing and dumping go through a [`YamlProvider`] so the `serde_yaml`
//! backend stays behind a single seam. [`set_provider`] installs another
//! implementation, but only before the first config is read or written.

use std::{fs, path::Path, sync::OnceLock};

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};

pub use serde_yaml::Value as YamlValue;

const FILE_BANNER: &str = "# leave-normalizer configuration\n";

pub trait YamlProvider: Send + Sync {
    fn parse_str(&self, input: &str) -> Result<YamlValue>;
    fn dump_value(&self, value: &YamlValue) -> Result<String>;
}

struct SerdeYamlProvider;

impl YamlProvider for SerdeYamlProvider {
    fn parse_str(&self, input: &str) -> Result<YamlValue> {
        Ok(serde_yaml::from_str(input)?)
    }

    fn dump_value(&self, value: &YamlValue) -> Result<String> {
        Ok(serde_yaml::to_string(value)?)
    }
}

static YAML_PROVIDER: OnceLock<Box<dyn YamlProvider>> = OnceLock::new();

pub fn provider() -> &'static dyn YamlProvider {
    YAML_PROVIDER
        .get_or_init(|| Box::new(SerdeYamlProvider))
        .as_ref()
}

/// Installs a custom provider. Fails once a provider is already in place.
pub fn set_provider(provider: Box<dyn YamlProvider>) -> std::result::Result<(), &'static str> {
    YAML_PROVIDER
        .set(provider)
        .map_err(|_| "YAML provider already set")
}

pub fn load_from_path<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("Reading YAML file {path:?}"))?;
    let value = provider().parse_str(&raw)?;
    // An empty document means "all defaults".
    let value = if value.is_null() {
        YamlValue::Mapping(Default::default())
    } else {
        value
    };
    Ok(serde_yaml::from_value(value)?)
}

pub fn save_to_path<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Creating directory {parent:?}"))?;
    }
    let body = to_string(data)?;
    fs::write(path, format!("{FILE_BANNER}{body}"))
        .with_context(|| format!("Writing YAML file {path:?}"))
}

pub fn to_string<T: Serialize>(value: &T) -> Result<String> {
    let yaml_value = serde_yaml::to_value(value)?;
    provider().dump_value(&yaml_value)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn provider_can_only_be_installed_once() {
        // Another test may already have initialised the default provider.
        let _ = set_provider(Box::new(SerdeYamlProvider));
        assert_eq!(
            set_provider(Box::new(SerdeYamlProvider)),
            Err("YAML provider already set")
        );
        let value = provider().parse_str("approved_status: approved\n").unwrap();
        assert!(value.as_mapping().is_some());
    }

    #[test]
    fn empty_file_loads_as_empty_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.yml");
        fs::write(&path, "# nothing here\n").unwrap();
        let loaded: BTreeMap<String, String> = load_from_path(&path).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn saved_file_starts_with_banner_and_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cfg.yml");
        let mut data = BTreeMap::new();
        data.insert("approved_status".to_string(), "approved".to_string());
        save_to_path(&path, &data).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(FILE_BANNER));
        assert!(text.contains("approved_status: approved"));
    }
}
