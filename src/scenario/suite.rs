use std::path::Path;

use serde::Serialize;
use serde_yaml::Value;

use crate::error::MatchError;
use crate::scenario::parser::parse_scenario;
use crate::scenario::step::{Step, StepAction};

/// A named, validated step sequence starting with `open`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub name: String,
    pub start_url: String,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Result<Self, MatchError> {
        let name = name.into();
        let start_url = match steps.first().map(|s| &s.action) {
            None => return Err(MatchError::EmptyScenario { scenario: name }),
            Some(StepAction::Open { url }) => url.clone(),
            Some(_) => return Err(MatchError::MissingOpen { scenario: name }),
        };
        Ok(Self {
            name,
            start_url,
            steps,
        })
    }

    /// Steps grouped by page, split on transition markers (markers dropped).
    ///
    /// There is always one more group than there are markers.
    pub fn pages(&self) -> Vec<Vec<&Step>> {
        let mut pages = vec![Vec::new()];
        for step in &self.steps {
            if step.is_transition() {
                pages.push(Vec::new());
            } else if let Some(page) = pages.last_mut() {
                page.push(step);
            }
        }
        pages
    }

    pub fn page_count(&self) -> usize {
        self.steps.iter().filter(|s| s.is_transition()).count() + 1
    }
}

/// Scenarios of one suite file.
///
/// A scenario that fails to parse or validate is kept out of `scenarios`
/// and recorded with its error; the others are unaffected.
#[derive(Debug, Default)]
pub struct Suite {
    pub scenarios: Vec<Scenario>,
    pub failures: Vec<(String, MatchError)>,
}

impl Suite {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Names of every scenario read, valid or not, in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenarios
            .iter()
            .map(|s| s.name.as_str())
            .chain(self.failures.iter().map(|(name, _)| name.as_str()))
    }
}

/// Parse a suite document: a YAML mapping of scenario name to step lines.
///
/// Scenarios not named in `only` are skipped unparsed; an empty `only`
/// keeps all of them. Only a document that is not such a mapping is an
/// error for the whole suite.
pub fn parse_suite(content: &str, source: &str, only: &[String]) -> Result<Suite, MatchError> {
    let doc: Value = serde_yaml::from_str(content).map_err(|e| MatchError::SuiteLoad {
        path: source.to_string(),
        reason: e.to_string(),
    })?;

    let Value::Mapping(mapping) = doc else {
        return Err(MatchError::SuiteLoad {
            path: source.to_string(),
            reason: "top level must map scenario names to step lists".into(),
        });
    };

    let mut suite = Suite::default();
    for (key, value) in mapping {
        let name = match key {
            Value::String(s) => s,
            other => serde_yaml::to_string(&other)
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
        };
        if !only.is_empty() && !only.contains(&name) {
            continue;
        }

        let parsed = serde_yaml::from_value::<Vec<String>>(value)
            .map_err(|e| MatchError::SuiteLoad {
                path: source.to_string(),
                reason: format!("scenario '{}': {}", name, e),
            })
            .and_then(|lines| parse_scenario(&name, &lines));
        match parsed {
            Ok(scenario) => suite.scenarios.push(scenario),
            Err(e) => suite.failures.push((name, e)),
        }
    }
    Ok(suite)
}

/// Load a suite file, keeping only the named scenarios when `only` is non-empty.
pub fn load_suite(path: &Path, only: &[String]) -> Result<Suite, MatchError> {
    let content = std::fs::read_to_string(path).map_err(|e| MatchError::SuiteLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_suite(&content, &path.display().to_string(), only)
}
