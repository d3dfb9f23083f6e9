//! Test helper utilities for E2E testing

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use uuid::Uuid;

use crate::fixtures::SubmissionFixture;

/// Response from POST /api/v1/submissions
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub id: Uuid,
    pub status: String,
}

/// Response from GET /api/v1/submissions/{id}
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionStatusResponse {
    pub id: Uuid,
    pub submitter_name: String,
    pub enqueued_at: String,
    pub status: String,
    pub score: f64,
}

/// Submit a fixture to the intake endpoint
pub async fn submit_fixture(
    client: &reqwest::Client,
    base_url: &str,
    fixture: &SubmissionFixture,
) -> Result<SubmitResponse, Box<dyn std::error::Error>> {
    let response = client
        .post(format!("{}/api/v1/submissions", base_url))
        .json(&serde_json::json!({
            "submitter_name": fixture.submitter_name,
            "payload": fixture.payload,
            "enqueued_at": fixture.enqueued_at,
        }))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await?;
        return Err(format!("Submit failed with status {}: {}", status, error_text).into());
    }

    Ok(response.json::<SubmitResponse>().await?)
}

/// Poll a submission until it leaves Pending (with timeout)
pub async fn wait_for_verdict(
    client: &reqwest::Client,
    base_url: &str,
    id: Uuid,
    timeout_secs: u64,
) -> Result<SubmissionStatusResponse, Box<dyn std::error::Error>> {
    let max_attempts = timeout_secs * 2; // Poll every 500ms

    for attempt in 0..max_attempts {
        let response = client
            .get(format!("{}/api/v1/submissions/{}", base_url, id))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(format!("Status check failed: {}", error_text).into());
        }

        let body = response.json::<SubmissionStatusResponse>().await?;

        match body.status.as_str() {
            "Success" | "Failure" => return Ok(body),
            "Pending" => {
                if attempt % 10 == 0 && attempt > 0 {
                    println!("  ... still waiting (attempt {}/{})", attempt, max_attempts);
                }
                sleep(Duration::from_millis(500)).await;
            }
            other => return Err(format!("Unknown submission status: {}", other).into()),
        }
    }

    Err(format!("Submission {} not resolved within {} seconds", id, timeout_secs).into())
}
