//! Simulator configuration
//!
//! Values come from, lowest precedence first: built-in defaults, an
//! optional TOML file, then environment variables (a `.env` file in the
//! working directory is loaded on first use).
//!
//! | key               | env                   | default  |
//! |-------------------|-----------------------|----------|
//! | `norm_tolerance`  | `QSIM_NORM_TOLERANCE` | `1e-5`   |
//! | `kernel_path`     | `QSIM_KERNEL_PATH`    | embedded |
//! | `sampler_seed`    | `QSIM_SEED`           | entropy  |
//! | `workgroup_size`  |                       | `64`     |
//! | `default_backend` | `QSIM_BACKEND`        | `scalar` |

use std::env;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{QuantumError, QuantumResult};
use crate::register::Backend;

// Automatically load .env when config module is accessed
static DOTENV_INIT: Lazy<()> = Lazy::new(|| {
    let _ = dotenv::dotenv();
});

#[inline]
fn ensure_loaded() {
    let _ = &*DOTENV_INIT;
}

/// Workgroup width compiled into the device kernel
pub const KERNEL_WORKGROUP_SIZE: u32 = 64;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Absolute tolerance of |Σ|a|² - 1| for normalization checks
    pub norm_tolerance: f64,
    /// Replaces the embedded device kernel source
    pub kernel_path: Option<PathBuf>,
    pub sampler_seed: Option<u64>,
    /// Must equal the `@workgroup_size` of the device kernel
    pub workgroup_size: u32,
    pub default_backend: Backend,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            norm_tolerance: 1e-5,
            kernel_path: None,
            sampler_seed: None,
            workgroup_size: KERNEL_WORKGROUP_SIZE,
            default_backend: Backend::Scalar,
        }
    }
}

impl SimConfig {
    /// Defaults overridden by the environment
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// TOML file, then the environment on top
    pub fn load(path: &Path) -> QuantumResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?.with_env();
        tracing::debug!(path = %path.display(), ?config, "configuration loaded");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> QuantumResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| QuantumError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `QSIM_*` variables; unparsable values are ignored
    pub fn with_env(mut self) -> Self {
        ensure_loaded();

        if let Some(v) = parsed_var("QSIM_NORM_TOLERANCE").filter(|v: &f64| v.is_finite() && *v > 0.0) {
            self.norm_tolerance = v;
        }
        if let Ok(path) = env::var("QSIM_KERNEL_PATH") {
            if !path.is_empty() {
                self.kernel_path = Some(PathBuf::from(path));
            }
        }
        if let Some(seed) = parsed_var("QSIM_SEED") {
            self.sampler_seed = Some(seed);
        }
        if let Some(backend) = parsed_var("QSIM_BACKEND") {
            self.default_backend = backend;
        }
        self
    }

    pub fn validate(&self) -> QuantumResult<()> {
        if !(self.norm_tolerance.is_finite() && self.norm_tolerance > 0.0) {
            return Err(QuantumError::Config(format!(
                "norm_tolerance must be positive, got {}",
                self.norm_tolerance
            )));
        }
        if self.workgroup_size != KERNEL_WORKGROUP_SIZE {
            return Err(QuantumError::Config(format!(
                "workgroup_size {} does not match the kernel ({KERNEL_WORKGROUP_SIZE})",
                self.workgroup_size
            )));
        }
        Ok(())
    }

    /// Kernel source override, if configured
    pub fn kernel_source(&self) -> QuantumResult<Option<String>> {
        self.kernel_path
            .as_deref()
            .map(std::fs::read_to_string)
            .transpose()
            .map_err(QuantumError::from)
    }
}

fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
