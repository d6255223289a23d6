use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::MatchError;
use crate::page::element::Locator;
use crate::plan::resolved::{ResolvedPlan, ResolvedStep};
use crate::scenario::step::StepAction;

// ============================================================================
// Selenium script emitter
// ============================================================================

/// Run parameters written at the top of a generated script.
#[derive(Debug, Clone)]
pub struct ScriptHeader {
    pub generated_at: DateTime<Local>,
    pub search_width: usize,
    pub beam_width: usize,
    pub text_weight: f64,
    pub generation_secs: f64,
}

impl ScriptHeader {
    /// `yymmddHHMM`, used in the header and the file name.
    pub fn stamp(&self) -> String {
        self.generated_at.format("%y%m%d%H%M").to_string()
    }

    pub fn render(&self) -> String {
        format!(
            "# date : {}\n# search width: {}\n# beam width: {}\n# text weight: {}\n# generation time: {:.3}\n",
            self.stamp(),
            self.search_width,
            self.beam_width,
            self.text_weight,
            self.generation_secs
        )
    }
}

/// Escape a value for a single-quoted Python string literal.
fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn find(locator: &Locator) -> String {
    format!(
        "driver.find_element_by_{}('{}')",
        locator.kind.strategy(),
        quote(&locator.value)
    )
}

/// Python statements for one step; transitions render nothing.
pub fn render_step(step: &ResolvedStep) -> Vec<String> {
    match (&step.action, &step.locator) {
        (StepAction::Open { url }, _) => vec![format!("driver.get('{}')", quote(url))],
        (StepAction::Enter { value, .. }, Some(loc)) => vec![
            format!("{}.clear()", find(loc)),
            format!("{}.send_keys('{}')", find(loc), quote(value)),
        ],
        (StepAction::Select { value, .. }, Some(loc)) => vec![format!(
            "Select({}).select_by_visible_text('{}')",
            find(loc),
            quote(value)
        )],
        (StepAction::Click { .. }, Some(loc)) => vec![format!("{}.click()", find(loc))],
        (StepAction::Enter { .. } | StepAction::Select { .. } | StepAction::Click { .. }, None) => {
            vec![format!("# unresolved: {}", step.raw)]
        }
        (StepAction::AssertTitle { value }, _) => vec![format!(
            "assert '{v}' == driver.title, 'expected title: \"{v}\", but actual: \"{{}}\"'.format(driver.title)",
            v = quote(value)
        )],
        (StepAction::AssertString { value }, _) => vec![format!(
            "assert '{v}' in driver.page_source, 'string \"{v}\" is not exist'",
            v = quote(value)
        )],
        (StepAction::PageTransition, _) => vec![],
    }
}

/// A valid Python identifier derived from a scenario name.
pub fn function_name(scenario: &str) -> String {
    let mut name: String = scenario
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// `def <scenario>(driver):` with one indented line per statement.
pub fn render_scenario(plan: &ResolvedPlan) -> String {
    let mut lines: Vec<String> = plan.steps.iter().flat_map(render_step).collect();
    if lines.is_empty() {
        lines.push("pass".to_string());
    }

    let mut out = format!("def {}(driver):\n", function_name(&plan.scenario));
    for line in lines {
        out.push_str("    ");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn render_script(header: &ScriptHeader, plans: &[ResolvedPlan]) -> String {
    let mut out = header.render();
    out.push_str("from selenium.webdriver.support.select import Select\n");
    for plan in plans {
        out.push('\n');
        out.push_str(&render_scenario(plan));
    }
    out
}

/// Write `test_script_<stamp>.py` under `dir`, creating it if needed.
pub fn write_script(dir: &Path, header: &ScriptHeader, plans: &[ResolvedPlan]) -> Result<PathBuf, MatchError> {
    fs::create_dir_all(dir).map_err(|e| MatchError::Io {
        context: format!("creating {}", dir.display()),
        source: e,
    })?;

    let path = dir.join(format!("test_script_{}.py", header.stamp()));
    fs::write(&path, render_script(header, plans)).map_err(|e| MatchError::Io {
        context: format!("writing {}", path.display()),
        source: e,
    })?;
    Ok(path)
}
