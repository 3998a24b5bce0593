use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use super::{load_config, write_config, Config, HintConfig};
use crate::prompt::Prompter;
use crate::scenario::{get_scenarios_path, seed_scenarios, ScenarioStore};
use crate::session::HintPolicy;

/// Where `init` put things.
#[derive(Debug, Clone, PartialEq)]
pub struct InitOutcome {
    pub config_written: bool,
    pub scenarios_seeded: bool,
    pub scenarios_path: PathBuf,
}

fn required<T>(answer: Option<T>) -> Result<T> {
    answer.context("Input closed before setup finished")
}

/// Ask before replacing an existing file, unless forced.
fn confirm_replace<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    what: &str,
    path: &Path,
    force: bool,
) -> Result<bool> {
    if force || !path.exists() {
        return Ok(true);
    }
    required(prompter.ask_yes_no(
        &format!("{} already exists at {}. Overwrite?", what, path.display()),
        false,
    )?)
}

/// Run the interactive setup: write a config file and install the built-in
/// scenarios.
///
/// Declining to overwrite the config keeps it and still offers to seed the
/// scenario store it points at.
pub fn run_init_wizard<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    config_path: &Path,
    force: bool,
) -> Result<InitOutcome> {
    prompter.say("")?;
    prompter.say("Campaign Drill Setup")?;
    prompter.say("====================")?;
    prompter.say("")?;

    let config_written = confirm_replace(prompter, "Config", config_path, force)?;

    let config = if config_written {
        let name = required(prompter.ask("Your name (leave blank to be asked each run): ")?)?;
        let user_name = if name.is_empty() { None } else { Some(name) };

        let default_scenarios = get_scenarios_path();
        let scenarios = required(prompter.ask_with_default(
            "Where should scenarios be stored?",
            &default_scenarios.display().to_string(),
        )?)?;
        let scenarios = PathBuf::from(scenarios);
        let scenarios_path = if scenarios == default_scenarios {
            None
        } else {
            Some(scenarios)
        };

        let defaults = HintPolicy::default();
        let config = Config {
            user_name,
            scenarios_path,
            progress_path: None,
            hints: Some(HintConfig {
                after_failures: Some(defaults.after_failures),
                below_score: Some(defaults.below_score),
            }),
        };
        write_config(config_path, &config)?;
        prompter.say(&format!("Config written to {}", config_path.display()))?;
        config
    } else {
        prompter.say("Keeping existing config.")?;
        load_config(Some(config_path.to_path_buf()))?
    };

    let scenarios_path = config.scenarios_path();
    let store = ScenarioStore::new(&scenarios_path);
    let scenarios_seeded = confirm_replace(prompter, "Scenario store", &scenarios_path, force)?;
    if scenarios_seeded {
        store.write(&seed_scenarios())?;
        prompter.say(&format!(
            "Built-in scenarios written to {}",
            scenarios_path.display()
        ))?;
    }

    prompter.say("")?;
    prompter.say("Run `campaign-drill` to start practicing.")?;

    Ok(InitOutcome {
        config_written,
        scenarios_seeded,
        scenarios_path,
    })
}
