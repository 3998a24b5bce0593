//! The interactive drill: prompt for answers, gate them, score them, record
//! the attempt and ask what to do next.

use anyhow::Result;
use chrono::Utc;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::buffered_eprintln;
use crate::config::Config;
use crate::output::{
    format_allocation_result, format_allocation_scenario, format_projection_result,
    format_projection_scenario, format_score,
};
use crate::progress::{append_progress, load_progress, ProgressRecord};
use crate::prompt::Prompter;
use crate::scenario::{AllocationScenario, Level, ProjectionScenario, ScenarioKind, ScenarioStore};
use crate::scoring::{
    coerce_input, evaluate_allocation, evaluate_projection, validate_allocation, AllocationResult,
    InputStatus, ProjectionResult, Submission,
};
use crate::session::Session;

/// What the user wants after seeing a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    Retry,
    Next,
    Quit,
}

/// Scores of every submission made during one drill, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrillSummary {
    pub scores: Vec<u8>,
}

impl DrillSummary {
    pub fn best(&self) -> Option<u8> {
        self.scores.iter().copied().max()
    }
}

/// Fetch allocation scenarios, treating a failed fetch as "none available".
pub async fn load_allocation_scenarios(
    store: &ScenarioStore,
    level: Option<Level>,
) -> Vec<AllocationScenario> {
    match store.fetch_allocation(level).await {
        Ok(scenarios) => scenarios,
        Err(e) => {
            buffered_eprintln!("Could not load allocation scenarios: {:#}", e);
            Vec::new()
        }
    }
}

/// Fetch projection scenarios, treating a failed fetch as "none available".
pub async fn load_projection_scenarios(store: &ScenarioStore) -> Vec<ProjectionScenario> {
    match store.fetch_projection().await {
        Ok(scenarios) => scenarios,
        Err(e) => {
            buffered_eprintln!("Could not load projection scenarios: {:#}", e);
            Vec::new()
        }
    }
}

/// Read one number per field. Returns `None` if input ends.
fn collect_values<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    fields: &[String],
    suffix: &str,
) -> Result<Option<Submission>> {
    let mut answer = BTreeMap::new();
    for field in fields {
        let Some(raw) = prompter.ask(&format!("  {}{}: ", field, suffix))? else {
            return Ok(None);
        };
        let coerced = coerce_input(&raw);
        if coerced.status == InputStatus::Invalid {
            prompter.say(&format!("  '{}' is not a number; counting it as 0.", raw))?;
        }
        answer.insert(field.clone(), coerced.value);
    }
    Ok(Some(answer))
}

/// Prompt for a full allocation until it passes the submission gate.
pub fn collect_allocation<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    scenario: &AllocationScenario,
) -> Result<Option<Submission>> {
    loop {
        let Some(answer) = collect_values(prompter, &scenario.channels, " (%)")? else {
            return Ok(None);
        };
        match validate_allocation(&answer, &scenario.channels) {
            Ok(()) => return Ok(Some(answer)),
            Err(errors) => {
                for error in errors {
                    prompter.say(&format!("  {}", error))?;
                }
                prompter.say("  Please enter the allocation again.")?;
            }
        }
    }
}

/// Prompt for every metric in the answer key.
pub fn collect_projection<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    scenario: &ProjectionScenario,
) -> Result<Option<Submission>> {
    let metrics: Vec<String> = scenario.answer_key.keys().cloned().collect();
    collect_values(prompter, &metrics, "")
}

/// Append a record; a failed write is reported and otherwise ignored.
fn record_progress(progress_path: &Path, record: &ProgressRecord) {
    if let Err(e) = append_progress(progress_path, record) {
        buffered_eprintln!("Warning: could not save progress: {:#}", e);
    }
}

/// Score an allocation that already passed the gate and record the attempt.
pub fn submit_allocation(
    session: &mut Session,
    scenario: &AllocationScenario,
    answer: Submission,
    progress_path: &Path,
) -> (AllocationResult, ProgressRecord) {
    let result = evaluate_allocation(&answer, &scenario.answer_key);
    session.record_score(result.score);

    let record = ProgressRecord {
        user_name: session.user_name.clone(),
        scenario_kind: ScenarioKind::Allocation,
        scenario_id: scenario.id.clone(),
        score: result.score,
        user_answer: answer,
        attempt_number: session.next_attempt(ScenarioKind::Allocation, &scenario.id),
        completed_at: Utc::now(),
    };
    record_progress(progress_path, &record);

    (result, record)
}

/// Score a projection and record the attempt.
pub fn submit_projection(
    session: &mut Session,
    scenario: &ProjectionScenario,
    answer: Submission,
    progress_path: &Path,
) -> (ProjectionResult, ProgressRecord) {
    let result = evaluate_projection(&answer, &scenario.answer_key);
    session.record_score(result.score);

    let record = ProgressRecord {
        user_name: session.user_name.clone(),
        scenario_kind: ScenarioKind::Projection,
        scenario_id: scenario.id.clone(),
        score: result.score,
        user_answer: answer,
        attempt_number: session.next_attempt(ScenarioKind::Projection, &scenario.id),
        completed_at: Utc::now(),
    };
    record_progress(progress_path, &record);

    (result, record)
}

/// Pick the user name from the command line, then the config, then by asking.
///
/// Returns `None` if input ends before a name is given.
pub fn resolve_user_name<R: BufRead, W: Write>(
    flag: Option<String>,
    config: &Config,
    prompter: &mut Prompter<R, W>,
) -> Result<Option<String>> {
    let given = flag
        .or_else(|| config.user_name.clone())
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    if given.is_some() {
        return Ok(given);
    }

    loop {
        match prompter.ask("Your name: ")? {
            None => return Ok(None),
            Some(name) if !name.is_empty() => return Ok(Some(name)),
            Some(_) => prompter.say("  A name is needed to record your progress.")?,
        }
    }
}

/// Highest score on record for the user and scenario of `latest`.
///
/// `latest` always counts, so a failed save or unreadable log still shows
/// the current score.
pub fn best_so_far(progress_path: &Path, latest: &ProgressRecord) -> u8 {
    load_progress(progress_path)
        .ok()
        .and_then(|log| {
            log.best_score(&latest.user_name, latest.scenario_kind, &latest.scenario_id)
        })
        .map_or(latest.score, |best| best.max(latest.score))
}

fn say_attempt<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    session: &Session,
    kind: ScenarioKind,
    scenario_id: &str,
) -> Result<()> {
    prompter.say(&format!("Attempt {}", session.attempts(kind, scenario_id) + 1))
}

/// Ask whether to retry, move on or stop. End of input means stop.
pub fn ask_next_step<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>) -> Result<NextStep> {
    loop {
        let Some(answer) = prompter.ask("[r]etry, [n]ext scenario, [q]uit [n]: ")? else {
            return Ok(NextStep::Quit);
        };
        match answer.to_lowercase().as_str() {
            "r" | "retry" => return Ok(NextStep::Retry),
            "" | "n" | "next" => return Ok(NextStep::Next),
            "q" | "quit" => return Ok(NextStep::Quit),
            _ => prompter.say("  Please answer r, n or q.")?,
        }
    }
}

/// Run allocation scenarios in store order until the user quits.
pub fn run_allocation_drill<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    session: &mut Session,
    scenarios: &[AllocationScenario],
    progress_path: &Path,
    use_colors: bool,
) -> Result<DrillSummary> {
    let mut summary = DrillSummary::default();
    if scenarios.is_empty() {
        prompter.say(
            "No allocation scenarios available. Run `campaign-drill init` to install the built-in set.",
        )?;
        return Ok(summary);
    }

    let mut index = 0;
    loop {
        let scenario = &scenarios[index];
        prompter.say("")?;
        say_attempt(prompter, session, ScenarioKind::Allocation, &scenario.id)?;
        prompter.say(&format_allocation_scenario(scenario, use_colors))?;

        let Some(answer) = collect_allocation(prompter, scenario)? else {
            break;
        };
        let (result, record) = submit_allocation(session, scenario, answer, progress_path);

        prompter.say("")?;
        prompter.say(&format_allocation_result(
            scenario,
            &record.user_answer,
            &result,
            use_colors,
        ))?;
        prompter.say(&format!(
            "Best so far: {}",
            format_score(best_so_far(progress_path, &record), use_colors)
        ))?;
        summary.scores.push(result.score);

        match ask_next_step(prompter)? {
            NextStep::Retry => {}
            NextStep::Next => index = (index + 1) % scenarios.len(),
            NextStep::Quit => break,
        }
    }

    Ok(summary)
}

/// Run projection scenarios in store order until the user quits.
///
/// Hints show once the session has collected enough low scores.
pub fn run_projection_drill<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    session: &mut Session,
    scenarios: &[ProjectionScenario],
    progress_path: &Path,
    use_colors: bool,
) -> Result<DrillSummary> {
    let mut summary = DrillSummary::default();
    if scenarios.is_empty() {
        prompter.say(
            "No projection scenarios available. Run `campaign-drill init` to install the built-in set.",
        )?;
        return Ok(summary);
    }

    let mut index = 0;
    loop {
        let scenario = &scenarios[index];
        prompter.say("")?;
        say_attempt(prompter, session, ScenarioKind::Projection, &scenario.id)?;
        prompter.say(&format_projection_scenario(
            scenario,
            session.hints_unlocked(),
            use_colors,
        ))?;

        let Some(answer) = collect_projection(prompter, scenario)? else {
            break;
        };
        let hints_were_unlocked = session.hints_unlocked();
        let (result, record) = submit_projection(session, scenario, answer, progress_path);

        prompter.say("")?;
        prompter.say(&format_projection_result(&result, use_colors))?;
        prompter.say(&format!(
            "Best so far: {}",
            format_score(best_so_far(progress_path, &record), use_colors)
        ))?;
        if !hints_were_unlocked && session.hints_unlocked() {
            prompter.say("")?;
            prompter.say("Hints are now unlocked. Retry to see them.")?;
        }
        summary.scores.push(result.score);

        match ask_next_step(prompter)? {
            NextStep::Retry => {}
            NextStep::Next => index = (index + 1) % scenarios.len(),
            NextStep::Quit => break,
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::seed::{seed_allocation_scenarios, seed_projection_scenarios};
    use crate::session::HintPolicy;
    use std::env;
    use std::io::Cursor;

    type TestPrompter = Prompter<Cursor<Vec<u8>>, Vec<u8>>;

    fn prompter(input: &str) -> TestPrompter {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(prompter: TestPrompter) -> String {
        String::from_utf8(prompter.into_output()).unwrap()
    }

    fn temp_progress(name: &str) -> std::path::PathBuf {
        let path = env::temp_dir().join(format!("campaign_drill_test_practice_{}.jsonl", name));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn test_collect_allocation_reprompts_until_total_is_100() {
        let scenario = &seed_allocation_scenarios()[0];
        let mut p = prompter("50\n30\n10\n50\n30\n20\n");
        let answer = collect_allocation(&mut p, scenario).unwrap().unwrap();

        assert_eq!(answer["Email Marketing"], 20.0);
        let out = output(p);
        assert!(out.contains("Allocations must total exactly 100% (currently 90%)"));
        assert!(out.contains("Please enter the allocation again."));
    }

    #[test]
    fn test_collect_allocation_eof() {
        let scenario = &seed_allocation_scenarios()[0];
        let mut p = prompter("50\n");
        assert_eq!(collect_allocation(&mut p, scenario).unwrap(), None);
    }

    #[test]
    fn test_invalid_input_counts_as_zero_with_warning() {
        let scenario = &seed_projection_scenarios()[0];
        // Metrics prompt in key order: CAC, LTV, ROAS, ROI
        let mut p = prompter("fifty\n90\n1.8\n0.8\n");
        let answer = collect_projection(&mut p, scenario).unwrap().unwrap();

        assert_eq!(answer["CAC"], 0.0);
        assert_eq!(answer["LTV"], 90.0);
        assert!(output(p).contains("'fifty' is not a number; counting it as 0."));
    }

    #[test]
    fn test_blank_input_counts_as_zero_silently() {
        let scenario = &seed_projection_scenarios()[0];
        let mut p = prompter("\n90\n1.8\n0.8\n");
        let answer = collect_projection(&mut p, scenario).unwrap().unwrap();

        assert_eq!(answer["CAC"], 0.0);
        assert!(!output(p).contains("not a number"));
    }

    #[test]
    fn test_ask_next_step() {
        let mut p = prompter("r\nwhat\nq\n\n");
        assert_eq!(ask_next_step(&mut p).unwrap(), NextStep::Retry);
        assert_eq!(ask_next_step(&mut p).unwrap(), NextStep::Quit);
        assert_eq!(ask_next_step(&mut p).unwrap(), NextStep::Next);
        assert_eq!(ask_next_step(&mut p).unwrap(), NextStep::Quit);
    }

    #[test]
    fn test_submit_allocation_records_attempts() {
        let path = temp_progress("submit_allocation");
        let scenario = &seed_allocation_scenarios()[0];
        let mut session = Session::new("ana", HintPolicy::default());

        let answer = scenario.answer_key.clone();
        let (result, record) = submit_allocation(&mut session, scenario, answer.clone(), &path);
        assert_eq!(result.score, 100);
        assert_eq!(record.attempt_number, 1);

        let (_, record) = submit_allocation(&mut session, scenario, answer, &path);
        assert_eq!(record.attempt_number, 2);

        let log = load_progress(&path).unwrap();
        assert_eq!(log.records.len(), 2);
        assert_eq!(log.records[0].user_name, "ana");
        assert_eq!(log.records[0].scenario_kind, ScenarioKind::Allocation);
        assert_eq!(log.records[0].scenario_id, "alloc-b2b-saas-leads");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_failed_save_keeps_result() {
        // A directory can't be opened as a log file
        let path = env::temp_dir();
        let scenario = &seed_projection_scenarios()[0];
        let mut session = Session::new("ana", HintPolicy::default());

        let (result, record) =
            submit_projection(&mut session, scenario, scenario.answer_key.clone(), &path);
        assert_eq!(result.score, 100);
        assert_eq!(record.attempt_number, 1);
    }

    #[test]
    fn test_allocation_drill_retry_then_next() {
        let path = temp_progress("allocation_drill");
        let scenarios = seed_allocation_scenarios();
        let mut session = Session::new("ana", HintPolicy::default());
        let input = "60\n25\n15\nr\n50\n30\n20\nn\n";
        let mut p = prompter(input);

        let summary =
            run_allocation_drill(&mut p, &mut session, &scenarios, &path, false).unwrap();

        assert_eq!(summary.scores, vec![87, 100]);
        assert_eq!(summary.best(), Some(100));
        let out = output(p);
        assert!(out.contains("Good job! A few tweaks could improve efficiency."));
        assert!(out.contains("Excellent work! Your allocation is nearly optimal."));
        assert!(out.contains("Best so far: 87/100"));
        assert!(out.contains("Best so far: 100/100"));
        assert!(out.contains("Attempt 2"));
        // Moved on to the second scenario before input ran out
        assert!(out.contains(&scenarios[1].title));

        let log = load_progress(&path).unwrap();
        let attempts: Vec<u32> = log.records.iter().map(|r| r.attempt_number).collect();
        assert_eq!(attempts, vec![1, 2]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_projection_drill_unlocks_hints() {
        let path = temp_progress("projection_drill");
        let scenarios = seed_projection_scenarios();
        let policy = HintPolicy {
            after_failures: 1,
            below_score: 70,
        };
        let mut session = Session::new("ana", policy);
        let mut p = prompter("0\n0\n0\n0\nr\n");

        let summary =
            run_projection_drill(&mut p, &mut session, &scenarios, &path, false).unwrap();

        assert_eq!(summary.scores, vec![25]);
        assert!(session.hints_unlocked());
        let out = output(p);
        assert!(out.contains("Hints are now unlocked."));
        // The retry shows the hints before input runs out
        assert!(out.contains("Divide ad spend by the number of new customers."));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_empty_scenarios() {
        let path = temp_progress("empty");
        let mut session = Session::new("ana", HintPolicy::default());
        let mut p = prompter("");
        let summary = run_allocation_drill(&mut p, &mut session, &[], &path, false).unwrap();
        assert!(summary.scores.is_empty());
        assert!(output(p).contains("No allocation scenarios available."));
    }

    #[tokio::test]
    async fn test_failed_fetch_is_empty() {
        let path = env::temp_dir().join("campaign_drill_test_practice_corrupt_store.json");
        std::fs::write(&path, "not json").unwrap();
        let store = ScenarioStore::new(&path);

        assert!(load_allocation_scenarios(&store, None).await.is_empty());
        assert!(load_projection_scenarios(&store).await.is_empty());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_user_name_prefers_flag_then_config() {
        let config = Config {
            user_name: Some("Config Name".to_string()),
            ..Config::default()
        };

        let mut p = prompter("");
        let name = resolve_user_name(Some("Flag Name".to_string()), &config, &mut p).unwrap();
        assert_eq!(name.as_deref(), Some("Flag Name"));

        let name = resolve_user_name(None, &config, &mut p).unwrap();
        assert_eq!(name.as_deref(), Some("Config Name"));
        // Neither asked
        assert_eq!(output(p), "");
    }

    #[test]
    fn test_user_name_prompts_until_given() {
        let config = Config {
            user_name: Some("   ".to_string()),
            ..Config::default()
        };
        let mut p = prompter("\nana\n");
        let name = resolve_user_name(Some(String::new()), &config, &mut p).unwrap();
        assert_eq!(name.as_deref(), Some("ana"));
        assert!(output(p).contains("A name is needed to record your progress."));

        let mut p = prompter("");
        assert_eq!(resolve_user_name(None, &Config::default(), &mut p).unwrap(), None);
    }

    #[test]
    fn test_best_so_far_includes_earlier_runs() {
        let path = temp_progress("best_so_far");
        let scenarios = seed_allocation_scenarios();
        let mut session = Session::new("ana", HintPolicy::default());
        let (_, earlier) =
            submit_allocation(&mut session, &scenarios[0], scenarios[0].answer_key.clone(), &path);
        assert_eq!(earlier.score, 100);

        // A later run scores lower but still shows the earlier best
        let mut session = Session::new("ana", HintPolicy::default());
        let mut p = prompter("60\n25\n15\nq\n");
        run_allocation_drill(&mut p, &mut session, &scenarios, &path, false).unwrap();
        let out = output(p);
        assert!(out.contains("Score: 87/100"));
        assert!(out.contains("Best so far: 100/100"));
        assert!(out.contains("Attempt 1"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_best_so_far_without_log_is_latest() {
        let path = temp_progress("best_missing");
        let scenario = &seed_projection_scenarios()[0];
        let record = ProgressRecord {
            user_name: "ana".to_string(),
            scenario_kind: ScenarioKind::Projection,
            scenario_id: scenario.id.clone(),
            score: 42,
            user_answer: Submission::new(),
            attempt_number: 1,
            completed_at: Utc::now(),
        };
        assert_eq!(best_so_far(&path, &record), 42);
    }
}
