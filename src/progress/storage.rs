use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use super::types::{ProgressLog, ProgressRecord};

/// Get the default progress log path (~/.config/campaign-drill/progress.jsonl)
pub fn get_progress_path() -> PathBuf {
    crate::config::get_config_dir().join("progress.jsonl")
}

/// Load the progress log, one JSON record per line.
///
/// If the file doesn't exist, returns an empty log. Blank lines are skipped;
/// a line that isn't a valid record is an error naming its line number.
pub fn load_progress(path: &Path) -> Result<ProgressLog> {
    if !path.exists() {
        return Ok(ProgressLog::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open progress log at {}", path.display()))?;

    let mut log = ProgressLog::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line
            .with_context(|| format!("Failed to read progress log at {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: ProgressRecord = serde_json::from_str(&line).with_context(|| {
            format!("Invalid progress record on line {} of {}", index + 1, path.display())
        })?;
        log.append(record);
    }

    Ok(log)
}

/// Append one record to the end of the log, creating it and its directory if
/// needed. Existing records are never read or rewritten.
pub fn append_progress(path: &Path, record: &ProgressRecord) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut line = serde_json::to_string(record).context("Failed to serialize progress record")?;
    line.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open progress log at {}", path.display()))?;

    // The whole line in one write
    file.write_all(line.as_bytes())
        .with_context(|| format!("Failed to append to progress log at {}", path.display()))?;

    Ok(())
}
