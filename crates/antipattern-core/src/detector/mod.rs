//! Antipattern detectors.
//!
//! Each detector is an independent, stateless check over one parsed statement.
//! [`DetectorSet`] runs the enabled detectors in registry order and tags every
//! message with the code of the detector that produced it.

pub mod codes;
pub mod config;
pub mod rules;
pub mod walk;

use config::DetectorConfig;
use sqlparser::ast::Statement;
#[cfg(feature = "tracing")]
use tracing::debug;

use crate::types::Finding;

/// A single structural check over a parsed SQL statement.
///
/// Implementations hold no state between calls: everything `run` accumulates
/// lives on its own stack, so one instance may be shared across threads and
/// statements.
pub trait Detector: Send + Sync {
    /// Stable machine-readable code (e.g., `"CTE_MULTIPLE_REFERENCES"`).
    fn code(&self) -> &'static str;

    /// Short human-readable name.
    fn name(&self) -> &'static str;

    /// What the detector looks for.
    fn description(&self) -> &'static str;

    /// Inspects one statement and returns its messages in detection order.
    ///
    /// Never fails: node shapes the detector does not handle are skipped.
    fn run(&self, stmt: &Statement) -> Vec<String>;
}

/// The enabled detectors, in registry order.
pub struct DetectorSet {
    detectors: Vec<Box<dyn Detector>>,
}

impl DetectorSet {
    pub fn new(config: &DetectorConfig) -> Self {
        let detectors = rules::all_detectors()
            .into_iter()
            .filter(|d| config.is_detector_enabled(d.code()))
            .collect();
        Self { detectors }
    }

    /// Codes of the detectors that will run, in order.
    pub fn codes(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.code()).collect()
    }

    /// Runs every enabled detector over one statement.
    pub fn run(&self, stmt: &Statement) -> Vec<Finding> {
        let mut findings = Vec::new();
        for detector in &self.detectors {
            let messages = detector.run(stmt);
            #[cfg(feature = "tracing")]
            debug!(
                detector = detector.code(),
                count = messages.len(),
                "detector finished"
            );
            findings.extend(
                messages
                    .into_iter()
                    .map(|message| Finding::new(detector.code(), message)),
            );
        }
        findings
    }
}

impl Default for DetectorSet {
    fn default() -> Self {
        Self::new(&DetectorConfig::default())
    }
}
