//! Backtest configuration loaded from TOML.

use crate::portfolio::weight_sum_warning;
use crate::types::{RebalancePeriod, TargetWeights};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Portfolio definition and simulation settings.
///
/// Example file:
///
/// ```toml
/// initial_cash = 100000
/// rebalance = "Q"
/// benchmark = "^GSPC"
///
/// [weights]
/// VTI = 0.6
/// BND = 0.4
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BacktestConfig {
    /// Starting capital
    pub initial_cash: f64,
    /// Rebalance frequency code (`N`, `M`, `Q`, `A`)
    pub rebalance: RebalancePeriod,
    /// Benchmark ticker to compare against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<String>,
    /// Target weight per ticker
    pub weights: TargetWeights,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_cash: 100_000.0,
            rebalance: RebalancePeriod::Quarterly,
            benchmark: Some("^GSPC".to_string()),
            weights: [("VTI".to_string(), 0.6), ("BND".to_string(), 0.4)].into(),
        }
    }
}

impl BacktestConfig {
    /// Get the default config file path.
    ///
    /// Default path: `<config dir>/rebalance/config.toml`
    /// Can be overridden with `REBALANCE_CONFIG_FILE` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("REBALANCE_CONFIG_FILE") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("rebalance/config.toml"))
            .unwrap_or_else(|| PathBuf::from("rebalance.toml"))
    }

    /// Load config from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Load config from a specific path, falling back to defaults if it does not exist.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Tickers in the portfolio.
    pub fn tickers(&self) -> Vec<String> {
        self.weights.keys().cloned().collect()
    }

    /// Check that the config can be simulated.
    ///
    /// Weights that do not sum to 1 only produce a warning.
    pub fn validate(&self) -> Result<()> {
        if !self.initial_cash.is_finite() || self.initial_cash <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "initial_cash must be positive, got {}",
                self.initial_cash
            )));
        }

        if let Some((ticker, weight)) = self
            .weights
            .iter()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(Error::InvalidConfig(format!(
                "Weight for {} must be a non-negative number, got {}",
                ticker, weight
            )));
        }

        if let Some(sum) = weight_sum_warning(&self.weights) {
            tracing::warn!("Weights sum to {:.2}, not 1.0", sum);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = BacktestConfig::default();
        assert_eq!(config.tickers(), vec!["BND".to_string(), "VTI".to_string()]);
        assert_eq!(config.rebalance, RebalancePeriod::Quarterly);
        assert_eq!(config.initial_cash, 100_000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let config: BacktestConfig = toml::from_str(
            r#"
            initial_cash = 50000
            rebalance = "ME"

            [weights]
            VTI = 0.5
            VXUS = 0.3
            BND = 0.2
            "#,
        )
        .unwrap();

        assert_eq!(config.initial_cash, 50_000.0);
        assert_eq!(config.rebalance, RebalancePeriod::Monthly);
        assert_eq!(config.weights.len(), 3);
        assert_eq!(config.weights["VXUS"], 0.3);
        // Unspecified fields keep their defaults
        assert_eq!(config.benchmark, Some("^GSPC".to_string()));
    }

    #[test]
    fn test_parse_toml_bad_period() {
        let result = toml::from_str::<BacktestConfig>(r#"rebalance = "W""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate() {
        let mut config = BacktestConfig {
            initial_cash: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        config.initial_cash = 1_000.0;
        config.weights.insert("VTI".to_string(), -0.1);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        // Unnormalized weights are accepted
        config.weights = [("VTI".to_string(), 0.9), ("BND".to_string(), 0.9)].into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let config = BacktestConfig {
            initial_cash: 25_000.0,
            rebalance: RebalancePeriod::Annually,
            benchmark: Some("VT".to_string()),
            weights: [("VTI".to_string(), 0.7), ("^GSPC".to_string(), 0.3)].into(),
        };
        config.save_to_path(&path).unwrap();

        let loaded = BacktestConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_from_env_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "initial_cash = 5000\nrebalance = \"100Y\"\n").unwrap();

        env::set_var("REBALANCE_CONFIG_FILE", &path);
        assert_eq!(BacktestConfig::default_path(), path);
        let loaded = BacktestConfig::load();
        env::remove_var("REBALANCE_CONFIG_FILE");

        let loaded = loaded.unwrap();
        assert_eq!(loaded.initial_cash, 5_000.0);
        assert_eq!(loaded.rebalance, RebalancePeriod::Never);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let loaded = BacktestConfig::load_from_path(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, BacktestConfig::default());
    }
}
