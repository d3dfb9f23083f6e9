use crate::models::job::{JobStatus, Verdict};

/// Minimum normalized score for a passing submission.
pub const DEFAULT_PASS_THRESHOLD: f64 = 80.0;

/// Maps a normalized score to a binary outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerdictPolicy {
    threshold: f64,
}

impl Default for VerdictPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PASS_THRESHOLD)
    }
}

impl VerdictPolicy {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// `Success` iff `score >= threshold`. Scores are not clamped.
    pub fn decide(&self, score: f64) -> Verdict {
        let status = if score >= self.threshold {
            JobStatus::Success
        } else {
            JobStatus::Failure
        };
        Verdict { status, score }
    }
}
