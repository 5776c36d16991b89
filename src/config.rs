//! Filter configuration files
//!
//! A config lists named filters that are applied to one stream in order, e.g. a
//! mains notch followed by a DC-removal highpass:
//!
//! ```toml
//! [[filter]]
//! name = "mains"
//! order = 3
//! cutoff = [45, 55]
//! filter_type = "bandstop"
//! design = "cheby1"
//! ripple_db = 0.01
//! sample_rate_hz = 1000
//!
//! [[filter]]
//! name = "dc"
//! order = 4
//! cutoff = 0.002
//! filter_type = "highpass"
//! ```
//!
//! TOML is tried first, then JSON.

use crate::error::{ConfigError, ConfigResult};
use crate::params::FilterParams;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One named entry of a filter config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedFilter {
    /// Human-readable label, used in diagnostics
    pub name: String,
    #[serde(flatten)]
    pub params: FilterParams,
}

/// Ordered list of filters for one stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(rename = "filter", default)]
    pub filters: Vec<NamedFilter>,
}

impl ChainConfig {
    /// Load from a .toml or .json file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse from string content
    pub fn parse(content: &str) -> ConfigResult<Self> {
        parse_toml_or_json(content)
    }

    /// Convert to TOML string
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Look up an entry by name
    pub fn get(&self, name: &str) -> Option<&FilterParams> {
        self.filters
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.params)
    }
}

/// Deserialize TOML, or JSON if the content is not TOML.
///
/// When both fail the TOML error is reported, since that is the primary format.
pub(crate) fn parse_toml_or_json<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    let toml_err = match toml::from_str(content) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    if let Ok(value) = serde_json::from_str(content) {
        return Ok(value);
    }

    Err(ConfigError::ParseError(toml_err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Cutoff;

    const MAINS_AND_DC: &str = r#"
[[filter]]
name = "mains"
order = 3
cutoff = [45, 55]
filter_type = "bandstop"
design = "cheby1"
ripple_db = 0.01
sample_rate_hz = 1000

[[filter]]
name = "dc"
order = 4
cutoff = 0.002
filter_type = "highpass"
"#;

    #[test]
    fn test_parse_chain_config() {
        let config = ChainConfig::parse(MAINS_AND_DC).unwrap();
        assert_eq!(config.filters.len(), 2);
        assert_eq!(config.filters[0].name, "mains");
        assert_eq!(config.filters[1].name, "dc");

        let dc = config.get("dc").unwrap();
        assert_eq!(dc.design, "butter");
        assert_eq!(dc.cutoff, Cutoff::Single(0.002));
        assert!(config.get("missing").is_none());
    }

    #[test]
    fn test_parse_json_chain_config() {
        let json = r#"{"filter": [{"name": "lp", "order": 2, "cutoff": 0.25, "filter_type": "lowpass"}]}"#;
        let config = ChainConfig::parse(json).unwrap();
        assert_eq!(config.filters.len(), 1);
        assert_eq!(config.filters[0].params.order, 2);
    }

    #[test]
    fn test_parse_garbage_reports_error() {
        let result = ChainConfig::parse("[[filter]\nname = ");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_toml_roundtrip_keeps_order() {
        let config = ChainConfig::parse(MAINS_AND_DC).unwrap();
        let text = config.to_toml().unwrap();
        let reparsed = ChainConfig::parse(&text).unwrap();
        assert_eq!(reparsed, config);
    }
}
