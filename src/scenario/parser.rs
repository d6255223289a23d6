use std::sync::LazyLock;

use regex::Regex;

use crate::error::MatchError;
use crate::scenario::step::{Step, StepAction, TargetHint};
use crate::scenario::suite::Scenario;

#[derive(Debug, Clone, Copy)]
enum Grammar {
    Open,
    Enter,
    Select,
    Click,
    AssertString,
    AssertTitle,
    Transition,
}

static PATTERNS: LazyLock<Vec<(Grammar, Regex)>> = LazyLock::new(|| {
    [
        (Grammar::Open, r#"^open "([^"]+)"$"#),
        (Grammar::Enter, r#"^enter "([^"]+)" in "([^"]+)"$"#),
        (Grammar::Select, r#"^select "([^"]+)" from "([^"]+)"$"#),
        (Grammar::Click, r#"^click "([^"]+)"$"#),
        (Grammar::AssertString, r#"^assert string "([^"]+)" exist$"#),
        (Grammar::AssertTitle, r#"^assert title is "([^"]+)"$"#),
        (Grammar::Transition, r"^---$"),
    ]
    .into_iter()
    .map(|(g, p)| (g, Regex::new(p).expect("step pattern compiles")))
    .collect()
});

/// Parse one step line of the scenario DSL.
pub fn parse_step(scenario: &str, index: usize, raw: &str) -> Result<Step, MatchError> {
    let line = raw.trim();

    for (grammar, pattern) in PATTERNS.iter() {
        let Some(caps) = pattern.captures(line) else {
            continue;
        };
        let arg = |i: usize| caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default();

        let action = match grammar {
            Grammar::Open => StepAction::Open { url: arg(1) },
            Grammar::Enter => StepAction::Enter {
                value: arg(1),
                target: TargetHint::parse(&arg(2)),
            },
            Grammar::Select => StepAction::Select {
                value: arg(1),
                target: TargetHint::parse(&arg(2)),
            },
            Grammar::Click => StepAction::Click {
                target: TargetHint::parse(&arg(1)),
            },
            Grammar::AssertString => StepAction::AssertString { value: arg(1) },
            Grammar::AssertTitle => StepAction::AssertTitle { value: arg(1) },
            Grammar::Transition => StepAction::PageTransition,
        };
        return Ok(Step::new(index, line, action));
    }

    Err(MatchError::InvalidStep {
        scenario: scenario.to_string(),
        raw: raw.to_string(),
    })
}

/// Parse every line of a scenario and validate its shape.
pub fn parse_scenario<S: AsRef<str>>(name: &str, lines: &[S]) -> Result<Scenario, MatchError> {
    let steps = lines
        .iter()
        .enumerate()
        .map(|(i, line)| parse_step(name, i, line.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Scenario::new(name, steps)
}
