//! TOML configuration for slots and the pricing chain.
//!
//! ```toml
//! [strategy]
//! default = "merge"
//!
//! [pricing]
//! preorder_discount = 0.9
//! premium_discount = 0.85
//! ```
//!
//! Every section and key is optional.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{PatternError, Result};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub strategy: StrategyConfig,
    pub pricing: PricingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrategyConfig {
    /// Strategy a configured slot starts with; `None` leaves it empty.
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PricingConfig {
    /// Multiplier applied to every preorder total.
    pub preorder_discount: f64,
    /// Extra multiplier applied by the premium layer.
    pub premium_discount: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            preorder_discount: 0.9,
            premium_discount: 0.9,
        }
    }
}

impl PricingConfig {
    pub fn validate(&self) -> Result<()> {
        check_factor("pricing.preorder_discount", self.preorder_discount)?;
        check_factor("pricing.premium_discount", self.premium_discount)
    }
}

pub(crate) fn check_factor(field: &str, value: f64) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(PatternError::config(format!(
            "{field} must be in (0, 1], got {value}"
        )))
    }
}

impl CatalogConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CatalogConfig = toml::from_str(content)?;
        config.pricing.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|err| {
            PatternError::config(format!("failed to read {}: {err}", path.display()))
        })?;
        debug!(path = %path.display(), "loading catalog config");
        Self::from_toml_str(&content)
    }
}
