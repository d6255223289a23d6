use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::search::variation::PageVariation;
use crate::scenario::step::OperationKind;

/// One line of the JSONL search trace.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub scenario: String,
    /// `snapshot`, `node` or `frontier`
    pub event: &'static str,
    pub depth: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_score: Option<f64>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locators: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl TraceEvent {
    pub fn now(event: &'static str, scenario: &str, depth: usize) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            scenario: scenario.to_string(),
            event,
            depth,
            node: None,
            parent: None,
            score: None,
            page_score: None,
            locators: vec![],
            fingerprint: None,
            count: None,
        }
    }

    pub fn with_node(mut self, node: usize, parent: Option<usize>) -> Self {
        self.node = Some(node);
        self.parent = parent;
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Page score plus `kind: locator` for every element the variation picked.
    pub fn with_page(mut self, page: &PageVariation) -> Self {
        self.page_score = Some(page.score());
        self.locators = OperationKind::ALL
            .iter()
            .filter_map(|&kind| page.get(kind).map(|v| (kind, v)))
            .flat_map(|(kind, v)| {
                v.elements()
                    .iter()
                    .map(move |e| format!("{}: {}", kind.as_str(), e.locator()))
            })
            .collect();
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: impl ToString) -> Self {
        self.fingerprint = Some(fingerprint.to_string());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}
