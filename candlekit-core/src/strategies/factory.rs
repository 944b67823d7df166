//! Factory: converts a `StrategyConfig` into a runtime `Box<dyn Strategy>`.
//!
//! Configs are a serde-tagged enum so a TOML table like
//!
//! ```toml
//! [strategy]
//! type = "smc"
//! swing_strength = 5
//! ```
//!
//! deserializes directly; omitted parameters take their defaults.

use serde::{Deserialize, Serialize};

use super::crt::{CrtParams, CrtStrategy};
use super::ict::{IctParams, IctStrategy};
use super::smc::{SmcParams, SmcStrategy};
use super::structure::{MarketStructureStrategy, StructureParams};
use super::{NullStrategy, Strategy};

// ─── Error type ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FactoryError {
    #[error("unknown strategy type: {0}")]
    UnknownStrategy(String),
    #[error("invalid parameter for {strategy}: {reason}")]
    InvalidParam {
        strategy: &'static str,
        reason: String,
    },
}

// ─── Config ──────────────────────────────────────────────────────────

/// Strategy selection plus its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    Smc(SmcParams),
    Crt(CrtParams),
    Ict(IctParams),
    MarketStructure(StructureParams),
    Null,
}

impl StrategyConfig {
    /// Config for `name` with default parameters.
    pub fn from_name(name: &str) -> Result<Self, FactoryError> {
        match name {
            "smc" => Ok(Self::Smc(SmcParams::default())),
            "crt" => Ok(Self::Crt(CrtParams::default())),
            "ict" => Ok(Self::Ict(IctParams::default())),
            "market_structure" => Ok(Self::MarketStructure(StructureParams::default())),
            "null" => Ok(Self::Null),
            other => Err(FactoryError::UnknownStrategy(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Smc(_) => "smc",
            Self::Crt(_) => "crt",
            Self::Ict(_) => "ict",
            Self::MarketStructure(_) => "market_structure",
            Self::Null => "null",
        }
    }

    /// Reject parameter sets no strategy could run with.
    pub fn validate(&self) -> Result<(), FactoryError> {
        let strategy = self.name();
        let fail = |reason: String| Err(FactoryError::InvalidParam { strategy, reason });

        match self {
            Self::Smc(p) => {
                check_window(strategy, p.window)?;
                if !(p.displacement_factor.is_finite() && p.displacement_factor > 0.0) {
                    return fail(format!(
                        "displacement_factor must be > 0, got {}",
                        p.displacement_factor
                    ));
                }
            }
            Self::Crt(p) => {
                check_window(strategy, p.window)?;
                check_ratio(strategy, "body_ratio", p.body_ratio)?;
                check_ratio(strategy, "wick_ratio", p.wick_ratio)?;
                if !(p.range_factor.is_finite() && p.range_factor > 0.0) {
                    return fail(format!("range_factor must be > 0, got {}", p.range_factor));
                }
            }
            Self::Ict(p) => {
                check_window(strategy, p.window)?;
                check_ratio(strategy, "ote_low", p.ote_low)?;
                check_ratio(strategy, "ote_high", p.ote_high)?;
                if p.ote_low > p.ote_high {
                    return fail(format!(
                        "ote_low ({}) must not exceed ote_high ({})",
                        p.ote_low, p.ote_high
                    ));
                }
            }
            Self::MarketStructure(p) => {
                check_window(strategy, p.window)?;
                if !(p.level_tolerance_pct.is_finite() && p.level_tolerance_pct >= 0.0) {
                    return fail(format!(
                        "level_tolerance_pct must be >= 0, got {}",
                        p.level_tolerance_pct
                    ));
                }
            }
            Self::Null => {}
        }
        Ok(())
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::Smc(SmcParams::default())
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn check_window(strategy: &'static str, window: usize) -> Result<(), FactoryError> {
    if window == 0 {
        return Err(FactoryError::InvalidParam {
            strategy,
            reason: "window must be >= 1".into(),
        });
    }
    Ok(())
}

fn check_ratio(strategy: &'static str, name: &str, value: f64) -> Result<(), FactoryError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(FactoryError::InvalidParam {
            strategy,
            reason: format!("{name} must be within [0, 1], got {value}"),
        });
    }
    Ok(())
}

// ─── Strategy factory ────────────────────────────────────────────────

/// Validate `config` and build the strategy it describes.
pub fn create_strategy(config: &StrategyConfig) -> Result<Box<dyn Strategy>, FactoryError> {
    config.validate()?;
    let strategy: Box<dyn Strategy> = match config {
        StrategyConfig::Smc(p) => Box::new(SmcStrategy::new(p.clone())),
        StrategyConfig::Crt(p) => Box::new(CrtStrategy::new(p.clone())),
        StrategyConfig::Ict(p) => Box::new(IctStrategy::new(p.clone())),
        StrategyConfig::MarketStructure(p) => Box::new(MarketStructureStrategy::new(p.clone())),
        StrategyConfig::Null => Box::new(NullStrategy),
    };
    Ok(strategy)
}
