#![forbid(unsafe_code)]

//! Motion-policy loading.
//!
//! The policy itself lives in `limelight-core::motion`; this module only
//! attaches file and string loaders so hosts can ship a
//! `limelight-motion.toml` (or JSON blob) instead of recompiling timings.
//! Unknown fields are rejected by neither format (every field defaults),
//! and loaded values pass through [`MotionPolicy::validated`].
//!
//! ```toml
//! # limelight-motion.toml
//! [mount]
//! item_ms = 800
//! stagger_ms = 150
//!
//! [orbit]
//! period_ms = 2500
//! ```

use std::fmt;
use std::path::Path;

use limelight_core::MotionPolicy;

/// Loading a motion policy failed.
#[derive(Debug)]
pub enum MotionConfigError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The TOML document did not parse or deserialize.
    Toml(toml::de::Error),
    /// The JSON document did not parse or deserialize.
    Json(serde_json::Error),
}

impl fmt::Display for MotionConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionConfigError::Io(err) => write!(f, "failed to read motion config: {err}"),
            MotionConfigError::Toml(err) => write!(f, "invalid motion config TOML: {err}"),
            MotionConfigError::Json(err) => write!(f, "invalid motion config JSON: {err}"),
        }
    }
}

impl std::error::Error for MotionConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MotionConfigError::Io(err) => Some(err),
            MotionConfigError::Toml(err) => Some(err),
            MotionConfigError::Json(err) => Some(err),
        }
    }
}

/// Load a policy from a TOML string.
pub fn from_toml_str(s: &str) -> Result<MotionPolicy, MotionConfigError> {
    toml::from_str::<MotionPolicy>(s)
        .map(MotionPolicy::validated)
        .map_err(MotionConfigError::Toml)
}

/// Load a policy from a TOML file on disk.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<MotionPolicy, MotionConfigError> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(MotionConfigError::Io)?;
    from_toml_str(&content)
}

/// Load a policy from a JSON string.
pub fn from_json_str(s: &str) -> Result<MotionPolicy, MotionConfigError> {
    serde_json::from_str::<MotionPolicy>(s)
        .map(MotionPolicy::validated)
        .map_err(MotionConfigError::Json)
}
