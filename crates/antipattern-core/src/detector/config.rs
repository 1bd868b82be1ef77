//! Configuration for the detector set.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Controls which detectors run. By default, all detectors are enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectorConfig {
    /// Master toggle for detection (default: true).
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Detector codes to skip (e.g., ["NAIVE_REGEXP_CONTAINS"]).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_detectors: Vec<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            disabled_detectors: Vec::new(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

impl DetectorConfig {
    /// Returns true if the detector with this code should run.
    ///
    /// Codes are matched case-insensitively so CLI input need not be exact.
    pub fn is_detector_enabled(&self, code: &str) -> bool {
        self.enabled
            && !self
                .disabled_detectors
                .iter()
                .any(|d| d.eq_ignore_ascii_case(code))
    }
}
