use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::path::{Path, PathBuf};

use super::types::{AllocationScenario, Level, ProjectionScenario, ScenarioFile};
use super::validation::{check_file_version, drop_invalid_records, validate_scenario_file};
use crate::buffered_eprintln;

/// Get the default scenario store path (~/.config/campaign-drill/scenarios.json)
pub fn get_scenarios_path() -> PathBuf {
    crate::config::get_config_dir().join("scenarios.json")
}

/// File-backed scenario store.
///
/// Reads are async; the store is seeded out-of-band by `init`, never written
/// during a drill.
#[derive(Debug, Clone)]
pub struct ScenarioStore {
    path: PathBuf,
}

impl ScenarioStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole store document.
    ///
    /// A missing file is an empty store. An unreadable file, invalid JSON or
    /// an unsupported version is an error.
    pub async fn load(&self) -> Result<ScenarioFile> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .with_context(|| format!("Failed to check scenario store at {}", self.path.display()))?;
        if !exists {
            return Ok(ScenarioFile::new());
        }

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read scenario store at {}", self.path.display()))?;

        let file: ScenarioFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse scenario store at {}", self.path.display()))?;

        check_file_version(file.version).map_err(anyhow::Error::msg)?;

        Ok(file)
    }

    /// Load the store without records that fail validation, warning about
    /// each one dropped.
    async fn load_valid(&self) -> Result<ScenarioFile> {
        let mut file = self.load().await?;
        for message in drop_invalid_records(&mut file) {
            buffered_eprintln!("{}", message);
        }
        Ok(file)
    }

    /// Allocation scenarios, optionally filtered by level, oldest first.
    pub async fn fetch_allocation(&self, level: Option<Level>) -> Result<Vec<AllocationScenario>> {
        let mut scenarios = self.load_valid().await?.allocation;
        if let Some(level) = level {
            scenarios.retain(|s| s.level == level);
        }
        scenarios.sort_by_key(|s| s.created_at);
        Ok(scenarios)
    }

    /// Projection scenarios, oldest first.
    pub async fn fetch_projection(&self) -> Result<Vec<ProjectionScenario>> {
        let mut scenarios = self.load_valid().await?.projection;
        scenarios.sort_by_key(|s| s.created_at);
        Ok(scenarios)
    }

    /// Replace the store contents atomically, creating parent directories.
    ///
    /// A document that would fail validation is refused and nothing is written.
    pub fn write(&self, file: &ScenarioFile) -> Result<()> {
        if let Err(errors) = validate_scenario_file(file) {
            anyhow::bail!("Invalid scenario store: {}", errors.join("; "));
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let mut out = AtomicWriteFile::open(&self.path)
            .with_context(|| format!("Failed to open atomic write file at {}", self.path.display()))?;

        serde_json::to_writer_pretty(&mut out, file).context("Failed to serialize scenarios")?;

        out.commit().context("Failed to save scenario store")?;

        Ok(())
    }
}
