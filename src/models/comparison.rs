use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Request to compare one staged submission against a folder of others.
#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub file_path: PathBuf,
    pub folder_path: PathBuf,
}

/// Plagiarism score of one file in the compared folder, in percent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonResult {
    pub file_name: String,
    pub plagiarism: f64,
}
