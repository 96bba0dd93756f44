use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Dashboard settings. Every field has a default so a config file only needs
/// the keys it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Indicator table to load at startup.
    pub data_path: PathBuf,
    /// Country named in titles.
    pub country: String,
    /// Footer lines under the raw data table.
    pub source_note: Vec<String>,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("suite-of-food-security-indicators_zwe.csv"),
            country: "Zimbabwe".to_string(),
            source_note: vec![
                "Data Source: FAO Suite of Food Security Indicators".to_string(),
                "Note: Data marked with 'E' are estimated, with 'X' indicating official figures"
                    .to_string(),
            ],
            window_width: 1280.0,
            window_height: 860.0,
        }
    }
}

impl DashboardConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolve from command-line arguments (program name already skipped).
    ///
    /// A `.json` argument is a config file; anything else is the data path.
    pub fn from_args<I>(mut args: I) -> Result<Self>
    where
        I: Iterator<Item = String>,
    {
        match args.next() {
            None => Ok(Self::default()),
            Some(arg) => {
                let path = PathBuf::from(arg);
                let is_json = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("json"));
                if is_json {
                    Self::from_json_file(&path)
                } else {
                    Ok(Self {
                        data_path: path,
                        ..Self::default()
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn defaults_without_arguments() {
        let config = DashboardConfig::from_args(args(&[])).expect("defaults");
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn data_path_argument() {
        let config = DashboardConfig::from_args(args(&["data/zwe.csv"])).expect("config");
        assert_eq!(config.data_path, PathBuf::from("data/zwe.csv"));
        assert_eq!(config.country, "Zimbabwe");
    }

    #[test]
    fn json_argument_is_a_config_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("dashboard.json");
        std::fs::write(
            &path,
            r#"{ "data_path": "mwi.csv", "country": "Malawi" }"#,
        )
        .expect("write config");

        let config =
            DashboardConfig::from_args(args(&[path.to_str().expect("utf8 path")])).expect("config");
        assert_eq!(config.data_path, PathBuf::from("mwi.csv"));
        assert_eq!(config.country, "Malawi");
        assert_eq!(config.window_width, DashboardConfig::default().window_width);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, r#"{ "colour": "red" }"#).expect("write config");
        assert!(DashboardConfig::from_json_file(&path).is_err());
    }
}
