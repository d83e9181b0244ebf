use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Reference palette from the desktop charts: blue, orange, green, purple,
/// yellow, cyan, pink, lime. Entities cycle through it in discovery order.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#3399ff", "#ff6633", "#33cc66", "#cc33cc", "#ffcc33", "#33cccc", "#ff99cc", "#99cc33",
];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub charts: ChartsConfig,
    pub sampling: SamplingConfig,
    pub colors: ColorsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub sample_rate_ms: u64,
    pub render_throttle_ms: u64,
    pub color_support: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            sample_rate_ms: 1000,
            render_throttle_ms: 200,
            color_support: "auto".to_string(),
        }
    }
}

/// Rolling-window length per chart, in points.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ChartsConfig {
    pub cpu_points: usize,
    pub disk_points: usize,
    pub network_points: usize,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        ChartsConfig {
            cpu_points: 20,
            disk_points: 60,
            network_points: 15,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// "rebaseline" drops the tick on a counter reset; "clamp" reports a
    /// zero rate instead.
    pub reset_policy: String,
    /// Upper bound on one counter read before the tick is abandoned.
    pub read_timeout_ms: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            reset_policy: "rebaseline".to_string(),
            read_timeout_ms: 750,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub palette: Vec<String>,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        ColorsConfig {
            palette: DEFAULT_PALETTE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sysdash").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.general.sample_rate_ms, 1000);
        assert_eq!(config.general.render_throttle_ms, 200);
        assert_eq!(config.general.color_support, "auto");
        assert_eq!(config.charts.cpu_points, 20);
        assert_eq!(config.charts.disk_points, 60);
        assert_eq!(config.charts.network_points, 15);
        assert_eq!(config.sampling.reset_policy, "rebaseline");
        assert_eq!(config.colors.palette.len(), 8);
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
[general]
sample_rate_ms = 500
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.sample_rate_ms, 500);
        // Other fields should be defaults
        assert_eq!(config.general.render_throttle_ms, 200);
        assert_eq!(config.charts.disk_points, 60);
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r##"
[general]
sample_rate_ms = 750
render_throttle_ms = 100
color_support = "256"

[charts]
cpu_points = 30
disk_points = 90
network_points = 45

[sampling]
reset_policy = "clamp"
read_timeout_ms = 500

[colors]
palette = ["#ffffff", "#000000"]
"##;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.sample_rate_ms, 750);
        assert_eq!(config.general.render_throttle_ms, 100);
        assert_eq!(config.general.color_support, "256");
        assert_eq!(config.charts.cpu_points, 30);
        assert_eq!(config.charts.network_points, 45);
        assert_eq!(config.sampling.reset_policy, "clamp");
        assert_eq!(config.sampling.read_timeout_ms, 500);
        assert_eq!(config.colors.palette, vec!["#ffffff", "#000000"]);
    }

    #[test]
    fn missing_file_returns_default() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.toml"));
        assert_eq!(config.general.sample_rate_ms, 1000);
    }

    #[test]
    fn invalid_toml_returns_default() {
        let temp = std::env::temp_dir().join("sysdash_test_invalid.toml");
        std::fs::write(&temp, "this is not valid toml {{{{").unwrap();
        let config = load_config_from_path(&temp);
        assert_eq!(config.general.sample_rate_ms, 1000);
        let _ = std::fs::remove_file(&temp);
    }
}
