//! Serializable backtest configuration.
//!
//! A run is described by one TOML file:
//!
//! ```toml
//! [backtest]
//! initial_balance = 10000.0
//! risk_pct = 1.0
//! sl_pct = 1.0
//! tp_pct = 2.0
//! fee_rate = 0.0005
//! fill = "close"
//!
//! [strategy]
//! type = "ict"
//! swing_strength = 3
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use candlekit_core::engine::{EngineConfig, EngineError};
use candlekit_core::strategies::{FactoryError, StrategyConfig};

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Strategy(#[from] FactoryError),
}

/// Everything needed to reproduce one run over a given series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    #[serde(default)]
    pub backtest: EngineConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
}

impl BacktestConfig {
    pub fn new(backtest: EngineConfig, strategy: StrategyConfig) -> Self {
        Self { backtest, strategy }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backtest.validate()?;
        self.strategy.validate()?;
        Ok(())
    }

    /// Deterministic hash of the configuration.
    ///
    /// Two runs with identical configs share a RunId.
    pub fn run_id(&self) -> RunId {
        // Plain data with no maps or custom serializers; serialization cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }
}
