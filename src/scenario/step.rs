use serde::{Deserialize, Serialize};

use crate::browser::session::Session;
use crate::error::MatchError;
use crate::page::element::Locator;

/// Operation kinds that need an element on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Enter,
    Select,
    Click,
}

impl OperationKind {
    pub const ALL: [OperationKind; 3] = [
        OperationKind::Enter,
        OperationKind::Select,
        OperationKind::Click,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Enter => "enter",
            OperationKind::Select => "select",
            OperationKind::Click => "click",
        }
    }
}

/// Where a locatable step's element comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TargetHint {
    /// `#id`
    Id(String),
    /// `xpath:/html/...`
    #[serde(rename = "xpath")]
    XPath(String),
    /// `link:text`
    LinkText(String),
    /// Anything else; resolved by similarity search
    Text(String),
}

impl TargetHint {
    pub fn parse(raw: &str) -> Self {
        if let Some(id) = raw.strip_prefix('#') {
            TargetHint::Id(id.to_string())
        } else if let Some(path) = raw.strip_prefix("xpath:") {
            TargetHint::XPath(path.to_string())
        } else if let Some(text) = raw.strip_prefix("link:") {
            TargetHint::LinkText(text.to_string())
        } else {
            TargetHint::Text(raw.to_string())
        }
    }

    /// The locator named directly by the hint, if any.
    pub fn explicit_locator(&self) -> Option<Locator> {
        match self {
            TargetHint::Id(v) => Some(Locator::id(v.clone())),
            TargetHint::XPath(v) => Some(Locator::xpath(v.clone())),
            TargetHint::LinkText(v) => Some(Locator::link_text(v.clone())),
            TargetHint::Text(_) => None,
        }
    }

    /// Free text for similarity search.
    pub fn free_text(&self) -> Option<&str> {
        match self {
            TargetHint::Text(t) => Some(t),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StepAction {
    Open { url: String },
    Enter { target: TargetHint, value: String },
    Select { target: TargetHint, value: String },
    Click { target: TargetHint },
    AssertTitle { value: String },
    AssertString { value: String },
    PageTransition,
}

/// One scenario instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Position in the scenario (0-based)
    pub index: usize,
    /// Step text as written
    pub raw: String,
    pub action: StepAction,
}

impl Step {
    pub fn new(index: usize, raw: impl Into<String>, action: StepAction) -> Self {
        Self {
            index,
            raw: raw.into(),
            action,
        }
    }

    pub fn kind(&self) -> Option<OperationKind> {
        match self.action {
            StepAction::Enter { .. } => Some(OperationKind::Enter),
            StepAction::Select { .. } => Some(OperationKind::Select),
            StepAction::Click { .. } => Some(OperationKind::Click),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<&TargetHint> {
        match &self.action {
            StepAction::Enter { target, .. }
            | StepAction::Select { target, .. }
            | StepAction::Click { target } => Some(target),
            _ => None,
        }
    }

    pub fn is_locatable(&self) -> bool {
        self.kind().is_some()
    }

    pub fn is_transition(&self) -> bool {
        matches!(self.action, StepAction::PageTransition)
    }

    /// Whether the step's element must be found by similarity search.
    pub fn needs_search(&self) -> bool {
        self.target().is_some_and(|t| t.free_text().is_some())
    }

    /// Perform the step against a session.
    ///
    /// Locatable steps without a locator and non-interactive steps
    /// (assertions, transitions) do nothing.
    pub fn execute(&self, locator: Option<&Locator>, session: &mut dyn Session) -> Result<(), MatchError> {
        match (&self.action, locator) {
            (StepAction::Open { url }, _) => session.open(url),
            (StepAction::Enter { value, .. }, Some(locator)) => session.enter(locator, value),
            (StepAction::Select { value, .. }, Some(locator)) => session.select(locator, value),
            (StepAction::Click { .. }, Some(locator)) => session.click(locator),
            _ => Ok(()),
        }
    }
}
