use std::collections::HashSet;

use super::types::{
    AllocationScenario, ProjectionScenario, ScenarioFile, ScenarioKind, SCENARIO_FILE_VERSION,
};

/// Check an allocation scenario is well-formed enough to be scored.
/// Returns all problems at once (not just the first).
pub fn validate_allocation_scenario(scenario: &AllocationScenario) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if scenario.id.trim().is_empty() {
        errors.push("id: must not be empty".to_string());
    }
    if scenario.title.trim().is_empty() {
        errors.push("title: must not be empty".to_string());
    }
    if scenario.total_budget.is_nan() || scenario.total_budget < 0.0 {
        errors.push(format!(
            "total_budget: must be non-negative (got {})",
            scenario.total_budget
        ));
    }
    if scenario.channels.is_empty() {
        errors.push("channels: at least one channel is required".to_string());
    }

    let mut seen = HashSet::new();
    for channel in &scenario.channels {
        if !seen.insert(channel.as_str()) {
            errors.push(format!("channels: duplicate channel '{}'", channel));
        }
        if !scenario.answer_key.contains_key(channel) {
            errors.push(format!("answer_key: missing channel '{}'", channel));
        }
    }

    for (channel, value) in &scenario.answer_key {
        if !seen.contains(channel.as_str()) {
            errors.push(format!("answer_key: unknown channel '{}'", channel));
        }
        if !(0.0..=100.0).contains(value) {
            errors.push(format!(
                "answer_key.{}: must be between 0 and 100 (got {})",
                channel, value
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check a projection scenario is well-formed enough to be scored.
pub fn validate_projection_scenario(scenario: &ProjectionScenario) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if scenario.id.trim().is_empty() {
        errors.push("id: must not be empty".to_string());
    }
    if scenario.title.trim().is_empty() {
        errors.push("title: must not be empty".to_string());
    }
    if scenario.answer_key.is_empty() {
        errors.push("answer_key: at least one metric is required".to_string());
    }
    for (metric, value) in &scenario.answer_key {
        if !value.is_finite() {
            errors.push(format!("answer_key.{}: must be a finite number", metric));
        }
    }
    for metric in scenario.hints.keys() {
        if !scenario.answer_key.contains_key(metric) {
            errors.push(format!("hints.{}: no such metric in answer_key", metric));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check the document version is one this build reads.
pub fn check_file_version(version: u32) -> Result<(), String> {
    if version == SCENARIO_FILE_VERSION {
        Ok(())
    } else {
        Err(format!("Unsupported scenario store version {}", version))
    }
}

fn allocation_id(scenario: &AllocationScenario) -> &str {
    &scenario.id
}

fn projection_id(scenario: &ProjectionScenario) -> &str {
    &scenario.id
}

/// Problems per record index. A record reusing an earlier record's id is a
/// duplicate even if that earlier record is itself invalid.
fn record_problems<T>(
    records: &[T],
    id: fn(&T) -> &str,
    validate: fn(&T) -> Result<(), Vec<String>>,
) -> Vec<(usize, Vec<String>)> {
    let mut seen = HashSet::new();
    let mut problems = Vec::new();
    for (i, record) in records.iter().enumerate() {
        let mut errors = validate(record).err().unwrap_or_default();
        if !seen.insert(id(record)) {
            errors.push(format!("id: duplicate id '{}'", id(record)));
        }
        if !errors.is_empty() {
            problems.push((i, errors));
        }
    }
    problems
}

/// Validate a whole store document, prefixing each error with the record it
/// came from (e.g. `allocation[2].channels: ...`).
pub fn validate_scenario_file(file: &ScenarioFile) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Err(e) = check_file_version(file.version) {
        errors.push(format!("version: {}", e));
    }

    for (i, problems) in record_problems(&file.allocation, allocation_id, validate_allocation_scenario) {
        errors.extend(problems.into_iter().map(|e| format!("allocation[{}].{}", i, e)));
    }
    for (i, problems) in record_problems(&file.projection, projection_id, validate_projection_scenario) {
        errors.extend(problems.into_iter().map(|e| format!("projection[{}].{}", i, e)));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn drop_records<T>(
    records: &mut Vec<T>,
    kind: ScenarioKind,
    id: fn(&T) -> &str,
    validate: fn(&T) -> Result<(), Vec<String>>,
) -> Vec<String> {
    let problems = record_problems(records, id, validate);
    let messages = problems
        .iter()
        .map(|(i, errors)| {
            format!(
                "Skipping {} scenario '{}': {}",
                kind,
                id(&records[*i]),
                errors.join("; ")
            )
        })
        .collect();

    let mut index = 0;
    records.retain(|_| {
        let keep = !problems.iter().any(|(i, _)| *i == index);
        index += 1;
        keep
    });
    messages
}

/// Remove every record `validate_scenario_file` would complain about, keeping
/// the first record for each id. Returns one message per dropped record.
pub fn drop_invalid_records(file: &mut ScenarioFile) -> Vec<String> {
    let mut messages = drop_records(
        &mut file.allocation,
        ScenarioKind::Allocation,
        allocation_id,
        validate_allocation_scenario,
    );
    messages.extend(drop_records(
        &mut file.projection,
        ScenarioKind::Projection,
        projection_id,
        validate_projection_scenario,
    ));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::types::Level;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn allocation() -> AllocationScenario {
        AllocationScenario {
            id: "a1".to_string(),
            level: Level::Basic,
            title: "Spring launch".to_string(),
            description: "Split the budget".to_string(),
            total_budget: 10_000.0,
            goal: "Leads".to_string(),
            channels: vec!["Search".to_string(), "Social".to_string()],
            answer_key: [("Search".to_string(), 70.0), ("Social".to_string(), 30.0)]
                .into_iter()
                .collect(),
            created_at: Utc::now(),
        }
    }

    fn projection() -> ProjectionScenario {
        ProjectionScenario {
            id: "p1".to_string(),
            title: "Webinar".to_string(),
            description: "Compute CAC".to_string(),
            metrics: BTreeMap::new(),
            answer_key: [("CAC".to_string(), 50.0)].into_iter().collect(),
            hints: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_valid_allocation() {
        assert!(validate_allocation_scenario(&allocation()).is_ok());
    }

    #[test]
    fn test_allocation_key_must_match_channels() {
        let mut scenario = allocation();
        scenario.channels.push("Email".to_string());
        scenario.answer_key.insert("Radio".to_string(), 0.0);

        let errors = validate_allocation_scenario(&scenario).unwrap_err();
        assert!(errors.contains(&"answer_key: missing channel 'Email'".to_string()));
        assert!(errors.contains(&"answer_key: unknown channel 'Radio'".to_string()));
    }

    #[test]
    fn test_allocation_rejects_out_of_range_and_duplicates() {
        let mut scenario = allocation();
        scenario.channels.push("Search".to_string());
        scenario.answer_key.insert("Search".to_string(), 140.0);

        let errors = validate_allocation_scenario(&scenario).unwrap_err();
        assert!(errors.contains(&"channels: duplicate channel 'Search'".to_string()));
        assert!(errors
            .iter()
            .any(|e| e.starts_with("answer_key.Search: must be between 0 and 100")));
    }

    #[test]
    fn test_allocation_key_need_not_sum_to_100() {
        let mut scenario = allocation();
        scenario.answer_key.insert("Social".to_string(), 20.0);
        assert!(validate_allocation_scenario(&scenario).is_ok());
    }

    #[test]
    fn test_projection_hint_must_name_metric() {
        let mut scenario = projection();
        scenario
            .hints
            .insert("LTV".to_string(), "Revenue per customer".to_string());
        let errors = validate_projection_scenario(&scenario).unwrap_err();
        assert_eq!(errors, vec!["hints.LTV: no such metric in answer_key".to_string()]);
    }

    #[test]
    fn test_projection_allows_zero_and_negative_values() {
        let mut scenario = projection();
        scenario.answer_key.insert("ROI".to_string(), 0.0);
        scenario.answer_key.insert("Net".to_string(), -1200.0);
        assert!(validate_projection_scenario(&scenario).is_ok());
    }

    #[test]
    fn test_projection_requires_metrics() {
        let mut scenario = projection();
        scenario.answer_key.clear();
        assert!(validate_projection_scenario(&scenario).is_err());
    }

    #[test]
    fn test_file_prefixes_and_duplicate_ids() {
        let mut file = ScenarioFile::new();
        file.allocation.push(allocation());
        let mut broken = allocation();
        broken.title = String::new();
        file.allocation.push(broken);
        file.projection.push(projection());

        let errors = validate_scenario_file(&file).unwrap_err();
        assert_eq!(
            errors,
            vec![
                "allocation[1].title: must not be empty".to_string(),
                "allocation[1].id: duplicate id 'a1'".to_string(),
            ]
        );
    }

    #[test]
    fn test_file_version_checked() {
        let mut file = ScenarioFile::new();
        file.version = 7;
        let errors = validate_scenario_file(&file).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_drop_invalid_records_keeps_the_rest() {
        let mut file = ScenarioFile::new();
        file.allocation.push(allocation());
        file.allocation.push(allocation());
        let mut other = allocation();
        other.id = "a2".to_string();
        other.channels.clear();
        file.allocation.push(other);
        file.projection.push(projection());

        let messages = drop_invalid_records(&mut file);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], "Skipping allocation scenario 'a1': id: duplicate id 'a1'");
        assert!(messages[1].starts_with("Skipping allocation scenario 'a2': "));

        assert_eq!(file.allocation.len(), 1);
        assert_eq!(file.projection.len(), 1);
        assert_eq!(validate_scenario_file(&file), Ok(()));
    }

    #[test]
    fn test_check_file_version() {
        assert!(check_file_version(SCENARIO_FILE_VERSION).is_ok());
        assert_eq!(
            check_file_version(3),
            Err("Unsupported scenario store version 3".to_string())
        );
    }
}
