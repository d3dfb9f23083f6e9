use serde_json::Value;

/// Extract the normalized accuracy from raw evaluator output.
///
/// The evaluator prints diagnostics first; its final non-empty line is a JSON
/// record with an `accuracy` field. A missing or `null` field counts as 0.
pub fn parse_score(output: &str) -> Result<f64, ParseError> {
    extract_accuracy(output).map(normalize_accuracy)
}

/// Raw `accuracy` value from the last non-empty line, before normalization.
pub fn extract_accuracy(output: &str) -> Result<f64, ParseError> {
    let line = output
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or(ParseError::Empty)?;

    let record: Value = serde_json::from_str(line).map_err(|source| ParseError::InvalidRecord {
        line: truncate(line),
        source,
    })?;

    match record.get("accuracy") {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| ParseError::InvalidAccuracy(n.to_string())),
        Some(other) => Err(ParseError::InvalidAccuracy(other.to_string())),
    }
}

/// Values strictly between 0 and 1 are fractions and are scaled to percent.
/// Exactly 0 and exactly 1 are left as they are.
pub fn normalize_accuracy(accuracy: f64) -> f64 {
    if accuracy > 0.0 && accuracy < 1.0 {
        accuracy * 100.0
    } else {
        accuracy
    }
}

fn truncate(line: &str) -> String {
    const MAX: usize = 120;
    match line.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &line[..idx]),
        None => line.to_string(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Evaluator produced no output")]
    Empty,

    #[error("Final output line is not a JSON record ({line}): {source}")]
    InvalidRecord {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Accuracy is not numeric: {0}")]
    InvalidAccuracy(String),
}
