use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::progress::ProgressRecord;
use crate::scenario::{AllocationScenario, ProjectionScenario};
use crate::scoring::{projection_narrative, AllocationResult, ProjectionResult, Submission};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format a number without trailing zeros: 50 -> "50", 0.8 -> "0.8", 1/3 -> "0.33"
pub fn format_number(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Format a currency amount with thousands separators: 50000 -> "$50,000"
pub fn format_currency(amount: f64) -> String {
    let whole = amount.round().abs() as u64;
    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0.0 && whole > 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// "87/100", colored green/yellow/red when colors are on
pub fn format_score(score: u8, use_colors: bool) -> String {
    paint_score(format!("{}/100", score), score, use_colors)
}

/// Color text by score band (traffic light)
fn paint_score(text: String, score: u8, use_colors: bool) -> String {
    if !use_colors {
        return text;
    }
    if score >= 90 {
        text.green().bold().to_string()
    } else if score >= 60 {
        text.yellow().bold().to_string()
    } else {
        text.red().bold().to_string()
    }
}

/// How long ago something happened, to the minute: "2h 5m ago", "just now"
pub fn format_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0) as u64;
    if secs < 60 {
        return "just now".to_string();
    }
    let rounded = std::time::Duration::from_secs(secs / 60 * 60);
    format!("{} ago", humantime::format_duration(rounded))
}

pub fn format_allocation_scenario(scenario: &AllocationScenario, use_colors: bool) -> String {
    let title = if use_colors {
        scenario.title.bold().to_string()
    } else {
        scenario.title.clone()
    };
    let lines = vec![
        format!("{} ({})", title, scenario.level),
        scenario.description.clone(),
        format!("  Budget: {}", format_currency(scenario.total_budget)),
        format!("  Goal:   {}", scenario.goal),
        format!("  Channels: {}", scenario.channels.join(", ")),
        String::new(),
        "Enter the percentage of budget for each channel (must total 100).".to_string(),
    ];
    lines.join("\n")
}

/// Result of an allocation, channels in the scenario's display order.
pub fn format_allocation_result(
    scenario: &AllocationScenario,
    answer: &Submission,
    result: &AllocationResult,
    use_colors: bool,
) -> String {
    let mut lines = vec![format!("Score: {}", format_score(result.score, use_colors))];
    lines.extend(result.messages.iter().cloned());
    lines.push(format!(
        "Average deviation: {} points",
        format_number(result.average_deviation)
    ));
    lines.push(String::new());

    let name_width = scenario
        .channels
        .iter()
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(0);

    for channel in &scenario.channels {
        let user = answer.get(channel).copied().unwrap_or(0.0);
        let optimal = scenario.answer_key.get(channel).copied().unwrap_or(0.0);
        let feedback = result
            .channel_feedback
            .get(channel)
            .map(String::as_str)
            .unwrap_or("");
        let name = format!("{:<width$}", channel, width = name_width);
        let name = if use_colors {
            name.cyan().to_string()
        } else {
            name
        };
        lines.push(format!(
            "  {}  you {:>5}%  optimal {:>5}%  {}",
            name,
            format_number(user),
            format_number(optimal),
            feedback
        ));
    }

    lines.join("\n")
}

pub fn format_projection_scenario(
    scenario: &ProjectionScenario,
    show_hints: bool,
    use_colors: bool,
) -> String {
    let title = if use_colors {
        scenario.title.bold().to_string()
    } else {
        scenario.title.clone()
    };
    let mut lines = vec![title, scenario.description.clone(), String::new()];
    for (name, value) in &scenario.metrics {
        lines.push(format!("  {}: {}", name, format_number(*value)));
    }
    lines.push(String::new());
    lines.push(format!(
        "Compute: {}",
        scenario
            .answer_key
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    ));
    if show_hints && !scenario.hints.is_empty() {
        lines.push(String::new());
        lines.push("Hints:".to_string());
        for (metric, hint) in scenario
            .answer_key
            .keys()
            .filter_map(|metric| scenario.hint(metric).map(|hint| (metric, hint)))
        {
            let line = format!("  {}: {}", metric, hint);
            lines.push(if use_colors {
                line.dimmed().to_string()
            } else {
                line
            });
        }
    }
    lines.join("\n")
}

pub fn format_projection_result(result: &ProjectionResult, use_colors: bool) -> String {
    let mut lines = vec![
        format!(
            "Score: {}  ({} of {} metrics within 10%)",
            format_score(result.score, use_colors),
            result.correct_count(),
            result.per_metric.len()
        ),
        projection_narrative(result.score).to_string(),
        String::new(),
    ];

    for (metric, outcome) in &result.per_metric {
        let mark = match (outcome.is_correct, use_colors) {
            (true, true) => "ok ".green().to_string(),
            (true, false) => "ok ".to_string(),
            (false, true) => "off".red().to_string(),
            (false, false) => "off".to_string(),
        };
        lines.push(format!(
            "  [{}] {}: you {}, correct {} ({}% off)",
            mark,
            metric,
            format_number(outcome.user_value),
            format_number(outcome.correct_value),
            format_number(outcome.deviation_percent)
        ));
    }

    lines.join("\n")
}

/// Progress records as a table: when, kind, scenario, attempt, score.
pub fn format_progress_table(records: &[&ProgressRecord], now: DateTime<Utc>, use_colors: bool) -> String {
    if records.is_empty() {
        return "No attempts recorded yet.".to_string();
    }

    let when: Vec<String> = records.iter().map(|r| format_ago(r.completed_at, now)).collect();
    let when_width = when.iter().map(|w| w.len()).max().unwrap_or(0);
    let kind_width = "allocation".len();
    let score_width = "100/100".len();
    let separator = "  ";
    let fixed_width = when_width + kind_width + score_width + "#99".len() + separator.len() * 4;

    let term_width = get_terminal_width();

    records
        .iter()
        .zip(when)
        .map(|(record, when)| {
            let scenario = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate(&record.scenario_id, width - fixed_width)
                }
                Some(_) => truncate(&record.scenario_id, 20),
                None => record.scenario_id.clone(),
            };
            // Pad before coloring so escape codes don't skew alignment
            let score = paint_score(
                format!("{:>width$}", format!("{}/100", record.score), width = score_width),
                record.score,
                use_colors,
            );
            format!(
                "{:<ww$}{sep}{:<kw$}{sep}{}{sep}#{:<2}{sep}{}",
                when,
                record.scenario_kind.to_string(),
                score,
                record.attempt_number,
                scenario,
                ww = when_width,
                kw = kind_width,
                sep = separator,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Progress records as tab-separated values for scripting
/// Columns: completed_at, user, kind, scenario_id, attempt, score (no headers, no colors)
pub fn format_progress_tsv(records: &[&ProgressRecord]) -> String {
    records
        .iter()
        .map(|r| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                r.completed_at.to_rfc3339(),
                r.user_name,
                r.scenario_kind,
                r.scenario_id,
                r.attempt_number,
                r.score
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_allocation_list(scenarios: &[AllocationScenario], use_colors: bool) -> String {
    if scenarios.is_empty() {
        return "No allocation scenarios available.".to_string();
    }
    scenarios
        .iter()
        .enumerate()
        .map(|(idx, s)| {
            let index = format!("{:>2}.", idx + 1);
            let index = if use_colors {
                index.dimmed().to_string()
            } else {
                index
            };
            format!(
                "{} {:<13}{}  ({}, {} channels)",
                index,
                s.level.to_string(),
                s.title,
                format_currency(s.total_budget),
                s.channels.len()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_projection_list(scenarios: &[ProjectionScenario], use_colors: bool) -> String {
    if scenarios.is_empty() {
        return "No projection scenarios available.".to_string();
    }
    scenarios
        .iter()
        .enumerate()
        .map(|(idx, s)| {
            let index = format!("{:>2}.", idx + 1);
            let index = if use_colors {
                index.dimmed().to_string()
            } else {
                index
            };
            format!("{} {}  ({} metrics)", index, s.title, s.answer_key.len())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
