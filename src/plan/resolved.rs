use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;

use crate::page::element::Locator;
use crate::scenario::step::{OperationKind, StepAction};
use crate::scenario::suite::Scenario;
use crate::search::variation::{PageVariation, StepAssignment};

/// One scenario step with what it resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStep {
    pub index: usize,
    pub raw: String,
    /// Page group the step belongs to
    pub page: usize,
    #[serde(flatten)]
    pub action: StepAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<OperationKind>,
    /// `None` for a locatable step whose kind had no variation on its page
    pub locator: Option<Locator>,
    /// Positional path of the chosen element, or the explicit locator value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_path: Option<String>,
    /// Locator named by the step itself rather than found by search
    pub explicit: bool,
}

impl ResolvedStep {
    pub fn is_unresolved(&self) -> bool {
        self.kind.is_some() && self.locator.is_none()
    }
}

/// Output of one scenario's generation: the best path laid onto its steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPlan {
    pub scenario: String,
    pub score: f64,
    pub page_scores: Vec<f64>,
    pub steps: Vec<ResolvedStep>,
}

impl ResolvedPlan {
    /// Lay `path` (one page variation per page) onto the scenario's steps.
    ///
    /// Pages beyond the end of `path` keep only their explicit locators.
    pub fn from_path(scenario: &Scenario, path: &[Rc<PageVariation>], score: f64) -> Self {
        let empty = PageVariation::new(None, None, None);

        let mut assigned: HashMap<usize, StepAssignment<'_>> = HashMap::new();
        for (page, steps) in scenario.pages().iter().enumerate() {
            let variation = path.get(page).map(|v| v.as_ref()).unwrap_or(&empty);
            for assignment in variation.assign(steps) {
                assigned.insert(assignment.step.index, assignment);
            }
        }

        let mut page = 0;
        let mut steps = Vec::with_capacity(scenario.steps.len());
        for step in &scenario.steps {
            if step.is_transition() {
                page += 1;
            }

            let (locator, audit_path, explicit) = match assigned.remove(&step.index) {
                Some(a) => {
                    let explicit = a.locator.is_some() && a.element.is_none();
                    let audit = match (&a.element, &a.locator) {
                        (Some(el), _) => Some(el.positional_path.clone()),
                        (None, Some(loc)) => Some(loc.value.clone()),
                        (None, None) => None,
                    };
                    (a.locator, audit, explicit)
                }
                None => (None, None, false),
            };

            steps.push(ResolvedStep {
                index: step.index,
                raw: step.raw.clone(),
                page,
                action: step.action.clone(),
                kind: step.kind(),
                locator,
                audit_path,
                explicit,
            });
        }

        Self {
            scenario: scenario.name.clone(),
            score,
            page_scores: path.iter().map(|p| p.score()).collect(),
            steps,
        }
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &ResolvedStep> {
        self.steps.iter().filter(|s| s.is_unresolved())
    }
}
