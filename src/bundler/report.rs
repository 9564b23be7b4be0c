//! Soft failures: things that went wrong without invalidating the artifact.

use std::fmt;

/// Result of a phase that is allowed to degrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Everything the phase attempted succeeded.
    Completed,
    /// The phase finished, but part of it failed and was tolerated.
    Degraded(String),
    /// The phase did not run.
    Skipped(String),
}

impl StepOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// A tolerated failure attributed to a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftFailure {
    pub phase: &'static str,
    pub message: String,
}

impl fmt::Display for SoftFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.phase, self.message)
    }
}

/// Everything tolerated during one build, in the order it happened.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    soft_failures: Vec<SoftFailure>,
    skipped: Vec<SoftFailure>,
}

impl BuildReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of `phase`. Completed outcomes leave no trace.
    pub fn record(&mut self, phase: &'static str, outcome: &StepOutcome) {
        match outcome {
            StepOutcome::Completed => {}
            StepOutcome::Degraded(message) => self.soft_failures.push(SoftFailure {
                phase,
                message: message.clone(),
            }),
            StepOutcome::Skipped(message) => self.skipped.push(SoftFailure {
                phase,
                message: message.clone(),
            }),
        }
    }

    pub fn soft_failures(&self) -> &[SoftFailure] {
        &self.soft_failures
    }

    pub fn skipped(&self) -> &[SoftFailure] {
        &self.skipped
    }

    pub fn is_clean(&self) -> bool {
        self.soft_failures.is_empty() && self.skipped.is_empty()
    }

    /// Whether `phase` was skipped.
    pub fn was_skipped(&self, phase: &str) -> bool {
        self.skipped.iter().any(|s| s.phase == phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_sorts_outcomes() {
        let mut report = BuildReport::new();
        report.record("packages", &StepOutcome::Completed);
        report.record("packages", &StepOutcome::Degraded("tk failed".into()));
        report.record("smoke test", &StepOutcome::Skipped("cross build".into()));

        assert!(!report.is_clean());
        assert_eq!(report.soft_failures().len(), 1);
        assert_eq!(report.soft_failures()[0].to_string(), "packages: tk failed");
        assert!(report.was_skipped("smoke test"));
        assert!(!report.was_skipped("packages"));
    }
}
