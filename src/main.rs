use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use campaign_drill::config::Config;
use campaign_drill::practice::{resolve_user_name, DrillSummary};
use campaign_drill::prompt::Prompter;
use campaign_drill::scenario::{Level, ScenarioKind, ScenarioStore};
use campaign_drill::session::Session;
use campaign_drill::stderr_buffer::HeldWarnings;

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 1;
const EXIT_STORE: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Practice splitting a budget across channels (default if no subcommand)
    Allocation {
        /// Only scenarios of this level (basic, intermediate, advanced)
        #[arg(short, long)]
        level: Option<Level>,
    },
    /// Practice computing CAC, LTV, ROI and ROAS
    Projection,
    /// List available scenarios
    Scenarios {
        /// Only list this kind (allocation or projection)
        kind: Option<ScenarioKind>,
    },
    /// Show recorded attempts
    Progress {
        /// Only attempts by this user
        #[arg(short, long)]
        user: Option<String>,

        /// Tab-separated output for scripts
        #[arg(long)]
        tsv: bool,
    },
    /// Write a config file and install the built-in scenarios
    Init {
        /// Overwrite existing files without asking
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "campaign-drill")]
#[command(about = "Marketing budget and metrics practice drills", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/campaign-drill/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Name to record attempts under (overrides the config file)
    #[arg(short, long, global = true)]
    name: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

type StdPrompter = Prompter<std::io::StdinLock<'static>, std::io::Stdout>;

/// Shared tail of both drills: name the user, run the drill with warnings
/// held back, then report. Returns the exit code.
fn run_drill<F>(name_flag: Option<String>, config: &Config, use_colors: bool, drill: F) -> i32
where
    F: FnOnce(&mut StdPrompter, &mut Session) -> anyhow::Result<DrillSummary>,
{
    let mut prompter = Prompter::new(std::io::stdin().lock(), std::io::stdout());
    let user_name = match resolve_user_name(name_flag, config, &mut prompter) {
        Ok(Some(name)) => name,
        Ok(None) => {
            eprintln!("No user name given.");
            return EXIT_INPUT;
        }
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            return EXIT_INPUT;
        }
    };
    let mut session = Session::new(user_name, config.hint_policy());

    let held = campaign_drill::stderr_buffer::hold();
    let result = drill(&mut prompter, &mut session);
    report_warnings(held);

    match result {
        Ok(summary) => {
            print_summary(&summary, use_colors);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            EXIT_INPUT
        }
    }
}

fn print_summary(summary: &DrillSummary, use_colors: bool) {
    if let Some(best) = summary.best() {
        println!();
        println!(
            "Completed {} attempt{}. Best score: {}",
            summary.scores.len(),
            if summary.scores.len() == 1 { "" } else { "s" },
            campaign_drill::output::format_score(best, use_colors)
        );
    }
}

fn report_warnings(held: HeldWarnings) {
    for warning in held.release() {
        eprintln!("{}", warning);
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Allocation { level: None });
    let start_time = Instant::now();

    let config_path = cli.config.map(PathBuf::from);

    // init creates the config, so it runs before loading one
    if let Commands::Init { force } = command {
        let path = config_path
            .map(|p| campaign_drill::config::expand_home(&p))
            .unwrap_or_else(campaign_drill::config::get_config_path);
        let mut prompter = Prompter::new(std::io::stdin().lock(), std::io::stdout());
        match campaign_drill::config::init::run_init_wizard(&mut prompter, &path, force) {
            Ok(outcome) => {
                if cli.verbose {
                    eprintln!(
                        "Config written: {}, scenarios seeded: {} ({})",
                        outcome.config_written,
                        outcome.scenarios_seeded,
                        outcome.scenarios_path.display()
                    );
                }
                std::process::exit(EXIT_SUCCESS);
            }
            Err(e) => {
                eprintln!("Init failed: {:#}", e);
                std::process::exit(EXIT_STORE);
            }
        }
    }

    let config = match campaign_drill::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = campaign_drill::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let store = ScenarioStore::new(config.scenarios_path());
    let progress_path = config.progress_path();
    let use_colors = campaign_drill::output::should_use_colors();

    if cli.verbose {
        eprintln!("Scenario store: {}", store.path().display());
        eprintln!("Progress log: {}", progress_path.display());
    }

    match command {
        Commands::Allocation { level } => {
            let scenarios = campaign_drill::practice::load_allocation_scenarios(&store, level).await;
            if cli.verbose {
                eprintln!(
                    "Loaded {} allocation scenarios in {:?}",
                    scenarios.len(),
                    start_time.elapsed()
                );
            }

            let code = run_drill(cli.name, &config, use_colors, |prompter, session| {
                campaign_drill::practice::run_allocation_drill(
                    prompter,
                    session,
                    &scenarios,
                    &progress_path,
                    use_colors,
                )
            });
            if code != EXIT_SUCCESS {
                std::process::exit(code);
            }
        }
        Commands::Projection => {
            let scenarios = campaign_drill::practice::load_projection_scenarios(&store).await;
            if cli.verbose {
                eprintln!(
                    "Loaded {} projection scenarios in {:?}",
                    scenarios.len(),
                    start_time.elapsed()
                );
            }

            let code = run_drill(cli.name, &config, use_colors, |prompter, session| {
                campaign_drill::practice::run_projection_drill(
                    prompter,
                    session,
                    &scenarios,
                    &progress_path,
                    use_colors,
                )
            });
            if code != EXIT_SUCCESS {
                std::process::exit(code);
            }
        }
        Commands::Scenarios { kind } => {
            // Each fetch reads the whole store, so hold warnings to report each once
            let held = campaign_drill::stderr_buffer::hold();
            if kind != Some(ScenarioKind::Projection) {
                let scenarios =
                    campaign_drill::practice::load_allocation_scenarios(&store, None).await;
                println!(
                    "{}",
                    campaign_drill::output::format_allocation_list(&scenarios, use_colors)
                );
            }
            if kind.is_none() {
                println!();
            }
            if kind != Some(ScenarioKind::Allocation) {
                let scenarios = campaign_drill::practice::load_projection_scenarios(&store).await;
                println!(
                    "{}",
                    campaign_drill::output::format_projection_list(&scenarios, use_colors)
                );
            }
            report_warnings(held);
        }
        Commands::Progress { user, tsv } => {
            let log = match campaign_drill::progress::load_progress(&progress_path) {
                Ok(log) => log,
                Err(e) => {
                    eprintln!("Progress error: {:#}", e);
                    std::process::exit(EXIT_STORE);
                }
            };

            let records: Vec<_> = match user.as_deref() {
                Some(name) => log.for_user(name).collect(),
                None => log.records.iter().collect(),
            };

            if tsv {
                if !records.is_empty() {
                    println!("{}", campaign_drill::output::format_progress_tsv(&records));
                }
            } else {
                println!(
                    "{}",
                    campaign_drill::output::format_progress_table(
                        &records,
                        chrono::Utc::now(),
                        use_colors
                    )
                );
            }

            if cli.verbose {
                eprintln!();
                eprintln!("Total: {} attempts in {:?}", records.len(), start_time.elapsed());
            }
        }
        Commands::Init { .. } => {}
    }

    std::process::exit(EXIT_SUCCESS);
}
