//! Sample submissions for E2E testing

/// A submission payload with the outcome a reference evaluator should produce.
#[derive(Debug, Clone)]
pub struct SubmissionFixture {
    pub submitter_name: &'static str,
    pub payload: &'static str,
    pub enqueued_at: &'static str,
    pub description: &'static str,
}

pub const SUBMISSION_FIXTURES: &[SubmissionFixture] = &[
    SubmissionFixture {
        submitter_name: "e2e-early",
        payload: r#"{"cells": [{"cell_type": "code", "source": ["print(1)"]}], "nbformat": 4}"#,
        enqueued_at: "01-01-2024 09:00",
        description: "Minimal notebook, enqueued first",
    },
    SubmissionFixture {
        submitter_name: "e2e-late",
        payload: r#"{"cells": [], "nbformat": 4}"#,
        enqueued_at: "01-01-2024 10:00",
        description: "Empty notebook, enqueued second",
    },
    SubmissionFixture {
        submitter_name: "e2e-garbage",
        payload: "this is not a notebook",
        enqueued_at: "01-01-2024 11:00",
        description: "Unparseable payload; evaluator should fail it",
    },
];
