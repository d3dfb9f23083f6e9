use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::comparison::ComparisonResult;

/// Upper bound on a single character diff; past it the diff degrades to a coarser result.
const DIFF_DEADLINE: Duration = Duration::from_secs(1);

/// Trimmed, non-blank lines of `text`.
pub fn normalize_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Percentage of `other` that also appears in `source`, compared on normalized lines.
///
/// Identical non-empty texts score 100. Otherwise the score is the number of
/// bytes a character diff marks as equal, divided by the length of `other`.
pub fn similarity(source: &str, other: &str) -> f64 {
    let source = normalize_lines(source).join("\n");
    let other = normalize_lines(other).join("\n");

    if source == other && !source.is_empty() {
        return 100.0;
    }
    if other.is_empty() {
        return 0.0;
    }

    let diff = TextDiff::configure()
        .timeout(DIFF_DEADLINE)
        .diff_chars(source.as_str(), other.as_str());

    let equal: usize = diff
        .iter_all_changes()
        .filter(|change| change.tag() == ChangeTag::Equal)
        .map(|change| change.value().len())
        .sum();

    equal as f64 / other.len() as f64 * 100.0
}

/// Compare `file_path` against every regular file in `folder_path`.
///
/// Both paths must resolve inside `root`. The file itself scores 0, as does
/// any file that cannot be read. Results are ordered by file name.
pub async fn compare_against_folder(
    root: &Path,
    file_path: &Path,
    folder_path: &Path,
) -> Result<Vec<ComparisonResult>, PlagiarismError> {
    let root = canonical(root).await?;
    let file_path = canonical(file_path).await?;
    let folder_path = canonical(folder_path).await?;

    for path in [&file_path, &folder_path] {
        if !path.starts_with(&root) {
            return Err(PlagiarismError::OutsideRoot(path.clone()));
        }
    }

    let source = tokio::fs::read(&file_path)
        .await
        .map_err(|source| PlagiarismError::Read {
            path: file_path.clone(),
            source,
        })?;
    let source = String::from_utf8_lossy(&source);
    let source_name = file_path.file_name();

    let mut entries = tokio::fs::read_dir(&folder_path)
        .await
        .map_err(|source| PlagiarismError::Read {
            path: folder_path.clone(),
            source,
        })?;

    let mut candidates = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|source| PlagiarismError::Read {
            path: folder_path.clone(),
            source,
        })?
    {
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);
        if is_file {
            candidates.push(entry);
        }
    }
    candidates.sort_by_key(|entry| entry.file_name());

    let mut results = Vec::with_capacity(candidates.len());
    for entry in candidates {
        let name = entry.file_name();
        let file_name = name.to_string_lossy().into_owned();

        if Some(name.as_os_str()) == source_name {
            results.push(ComparisonResult {
                file_name,
                plagiarism: 0.0,
            });
            continue;
        }

        let plagiarism = match tokio::fs::read(entry.path()).await {
            Ok(bytes) => similarity(&source, &String::from_utf8_lossy(&bytes)),
            Err(e) => {
                tracing::warn!(file = %file_name, error = %e, "Skipping unreadable file");
                0.0
            }
        };
        results.push(ComparisonResult {
            file_name,
            plagiarism,
        });
    }

    Ok(results)
}

async fn canonical(path: &Path) -> Result<PathBuf, PlagiarismError> {
    tokio::fs::canonicalize(path)
        .await
        .map_err(|source| PlagiarismError::Read {
            path: path.to_path_buf(),
            source,
        })
}

#[derive(Debug, thiserror::Error)]
pub enum PlagiarismError {
    #[error("Unable to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path is outside the comparison root: {0}")]
    OutsideRoot(PathBuf),
}
