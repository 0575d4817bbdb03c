//! Training loop configuration.
//!
//! [`TrainConfig`] bounds a training run by epoch count and/or an error
//! threshold. With the `serde` feature it can be loaded from JSON:
//!
//! ```json
//! {
//!   "method": { "kind": "backprop", "learning_rate": 0.7, "momentum": 0.3 },
//!   "max_epochs": 5000,
//!   "target_error": 0.01,
//!   "seed": 7
//! }
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use std::path::Path;

use crate::{Error, Result, TrainingMethod};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    pub method: TrainingMethod,
    /// Upper bound on epochs.
    pub max_epochs: usize,
    /// Stop as soon as an epoch's error is at or below this value.
    pub target_error: Option<f64>,
    /// Randomize the network's weights from this seed before the first epoch.
    pub seed: Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            method: TrainingMethod::Rprop,
            max_epochs: 1000,
            target_error: None,
            seed: None,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        self.method.validate()?;
        if self.max_epochs == 0 {
            return Err(Error::InvalidConfig("max_epochs must be > 0".to_owned()));
        }
        if let Some(target) = self.target_error
            && !(target.is_finite() && target >= 0.0)
        {
            return Err(Error::InvalidConfig(format!(
                "target_error must be finite and >= 0, got {target}"
            )));
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl TrainConfig {
    /// Parse and validate a config from a JSON string. Missing fields take
    /// their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: TrainConfig = serde_json::from_str(s)
            .map_err(|e| Error::InvalidConfig(format!("failed to parse config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load and validate a config from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let s = std::fs::read_to_string(p)
            .map_err(|e| Error::InvalidConfig(format!("failed to read {}: {e}", p.display())))?;
        Self::from_json_str(&s)
    }
}
