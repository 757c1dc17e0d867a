//! Metric configuration loading.
//!
//! Loads metric templates from YAML files in config/metrics/. Templates
//! are read-only: request parameters are merged into per-request values
//! by the extraction crate, never written back here.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use extract_common::{CalibrationRange, ExtractError, ExtractResult, MetricId, ViewState};

/// Root configuration loaded from a metric YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricConfig {
    pub metric: MetricInfo,
    pub source: SourceConfig,
    pub calibration: CalibrationConfig,
}

/// Basic metric identification.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Map page source configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the map visualization page
    pub base_url: String,
    /// Fixed query parameters, already URL-encoded (may be empty)
    #[serde(default)]
    pub static_parameters: String,
    /// Layer identifiers, base layers first; joined in order
    pub layers: Vec<String>,
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Time selector in the page's own format
    pub time: String,
    /// DOM id of the map element to screenshot
    #[serde(default = "default_element_id")]
    pub element_id: String,
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_element_id() -> String {
    "wv-map".to_string()
}

/// Color ramp calibration bounds.
#[derive(Debug, Clone, Deserialize)]
pub struct CalibrationConfig {
    pub min: f64,
    pub max: f64,
}

impl MetricConfig {
    /// Load a metric configuration from a YAML file.
    pub fn load(path: &Path) -> ExtractResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExtractError::config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let config: MetricConfig = serde_yaml::from_str(&content).map_err(|e| {
            ExtractError::config(format!("failed to parse {}: {}", path.display(), e))
        })?;

        config.validate()?;
        debug!(metric = %config.metric.id, path = %path.display(), "Loaded metric config");
        Ok(config)
    }

    /// Reject templates whose layer list or calibration cannot produce
    /// meaningful decoded values.
    fn validate(&self) -> ExtractResult<()> {
        if self.metric.id.is_empty() {
            return Err(ExtractError::config("metric id must not be empty"));
        }
        if self.source.base_url.is_empty() {
            return Err(ExtractError::config(format!(
                "metric '{}': base_url must not be empty",
                self.metric.id
            )));
        }
        if self.source.layers.is_empty() {
            return Err(ExtractError::config(format!(
                "metric '{}': at least one layer is required",
                self.metric.id
            )));
        }
        if !(self.calibration.min < self.calibration.max) {
            return Err(ExtractError::config(format!(
                "metric '{}': calibration min {} must be below max {}",
                self.metric.id, self.calibration.min, self.calibration.max
            )));
        }
        Ok(())
    }

    pub fn metric_id(&self) -> MetricId {
        MetricId::new(&self.metric.id)
    }

    pub fn calibration_range(&self) -> CalibrationRange {
        CalibrationRange::new(self.calibration.min, self.calibration.max)
    }

    /// Assemble the full page URL for one request.
    ///
    /// Parameter order is contractual: static parameters, then layers,
    /// locale, time, and the caller's view state last. Layers join with
    /// commas. Empty segments are elided so the URL never carries a
    /// dangling `&`.
    pub fn view_url(&self, view_state: &ViewState) -> String {
        let mut segments: Vec<String> = Vec::with_capacity(5);
        if !self.source.static_parameters.is_empty() {
            segments.push(self.source.static_parameters.clone());
        }
        segments.push(format!("l={}", self.source.layers.join(",")));
        segments.push(format!("lg={}", self.source.locale));
        segments.push(format!("t={}", self.source.time));
        if !view_state.is_empty() {
            segments.push(view_state.as_str().to_string());
        }

        format!(
            "{}?{}",
            self.source.base_url.trim_end_matches('?'),
            segments.join("&")
        )
    }
}

/// All enabled metric configurations, in deterministic order.
#[derive(Debug, Clone)]
pub struct MetricConfigStore {
    configs: Vec<MetricConfig>,
}

impl MetricConfigStore {
    /// Load all enabled metric configurations from `config_dir/metrics`.
    ///
    /// Files load in filename order so every request fans out over the
    /// same metric sequence; response slots depend on it. Unparseable
    /// or invalid files are skipped with a warning rather than taking
    /// the service down.
    pub fn load(config_dir: &Path) -> ExtractResult<Self> {
        let metrics_dir = config_dir.join("metrics");

        if !metrics_dir.exists() {
            warn!(path = %metrics_dir.display(), "Metrics config directory not found");
            return Ok(Self {
                configs: Vec::new(),
            });
        }

        let mut paths: Vec<_> = std::fs::read_dir(&metrics_dir)
            .map_err(|e| {
                ExtractError::config(format!(
                    "failed to read {}: {}",
                    metrics_dir.display(),
                    e
                ))
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .map_or(false, |ext| ext == "yaml" || ext == "yml")
            })
            .collect();
        paths.sort();

        let mut configs = Vec::new();
        for path in paths {
            match MetricConfig::load(&path) {
                Ok(config) => {
                    if config.metric.enabled {
                        info!(
                            metric = %config.metric.id,
                            name = %config.metric.name,
                            "Loaded metric configuration"
                        );
                        configs.push(config);
                    } else {
                        debug!(metric = %config.metric.id, "Skipping disabled metric");
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to load metric config");
                }
            }
        }

        info!(count = configs.len(), "Loaded metric configurations");
        Ok(Self { configs })
    }

    pub fn configs(&self) -> &[MetricConfig] {
        &self.configs
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&MetricConfig> {
        self.configs.iter().find(|c| c.metric.id == id)
    }

    pub fn metric_ids(&self) -> Vec<MetricId> {
        self.configs.iter().map(|c| c.metric_id()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> MetricConfig {
        let yaml = r#"
metric:
  id: temperature
  name: "Air Temperature (day)"
  enabled: true

source:
  base_url: "https://map.example.com/"
  static_parameters: "ca=true&cm=opacity"
  layers:
    - "Coastlines"
    - "AIRS_Surface_Air_Temperature_Daily_Day"
  locale: "en"
  time: "2024-01-15-T12-00-00Z"

calibration:
  min: 200.0
  max: 340.0
"#;
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_parse_full_config() {
        let config = sample_config();
        assert_eq!(config.metric.id, "temperature");
        assert!(config.metric.enabled);
        assert_eq!(config.source.layers.len(), 2);
        assert_eq!(config.source.element_id, "wv-map"); // default applies
        assert_eq!(config.calibration.min, 200.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_view_url_parameter_order() {
        let config = sample_config();
        let view = ViewState::new("v=-130.0,20.0,-60.0,55.0&p=geographic");
        let url = config.view_url(&view);
        assert_eq!(
            url,
            "https://map.example.com/?ca=true&cm=opacity\
             &l=Coastlines,AIRS_Surface_Air_Temperature_Daily_Day\
             &lg=en&t=2024-01-15-T12-00-00Z\
             &v=-130.0,20.0,-60.0,55.0&p=geographic"
        );
    }

    #[test]
    fn test_view_url_elides_empty_segments() {
        let mut config = sample_config();
        config.source.static_parameters = String::new();
        let url = config.view_url(&ViewState::new(""));
        assert_eq!(
            url,
            "https://map.example.com/?l=Coastlines,AIRS_Surface_Air_Temperature_Daily_Day\
             &lg=en&t=2024-01-15-T12-00-00Z"
        );
        assert!(!url.contains("??"));
        assert!(!url.contains("&&"));
        assert!(!url.ends_with('&'));
    }

    #[test]
    fn test_view_url_strips_trailing_question_mark() {
        let mut config = sample_config();
        config.source.base_url = "https://map.example.com/?".to_string();
        let url = config.view_url(&ViewState::new("v=0,0,1,1"));
        assert!(url.starts_with("https://map.example.com/?ca="));
        assert!(!url.contains("??"));
    }

    #[test]
    fn test_validate_rejects_inverted_calibration() {
        let mut config = sample_config();
        config.calibration.min = 100.0;
        config.calibration.max = 100.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must be below max"));
    }

    #[test]
    fn test_validate_rejects_empty_layers() {
        let mut config = sample_config();
        config.source.layers.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at least one layer"));
    }

    #[test]
    fn test_calibration_range_conversion() {
        let config = sample_config();
        let range = config.calibration_range();
        assert_eq!(range.min, 200.0);
        assert_eq!(range.max, 340.0);
    }
}
