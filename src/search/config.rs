use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::MatchError;
use crate::page::extractor::ExtractConfig;

/// How the browser is brought to the page a search state stands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPolicy {
    /// Keep one session; replay only the newest page's interactions.
    Persistent,
    /// Relaunch the session and replay the whole path from the start.
    #[default]
    ResetPerBranch,
}

/// Knobs of candidate ranking and the multi-page beam search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Logarithm base of IDF weights; the closer to 1, the larger the weights
    #[serde(default = "default_idf_weight")]
    pub idf_weight: f64,

    /// Weight of text similarity against attribute similarity
    #[serde(default = "default_text_weight")]
    pub text_weight: f64,

    /// Candidates kept per step after ranking
    #[serde(default = "default_page_matching_width")]
    pub page_matching_width: usize,

    /// Variations kept per kind, and page variations kept per state
    #[serde(default = "default_five")]
    pub search_width: usize,

    /// States kept per depth
    #[serde(default = "default_five")]
    pub beam_width: usize,

    /// Tuples examined per Cartesian product before giving up on the rest
    #[serde(default = "default_max_combinations")]
    pub max_combinations: usize,

    #[serde(default)]
    pub policy: SessionPolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            idf_weight: default_idf_weight(),
            text_weight: default_text_weight(),
            page_matching_width: default_page_matching_width(),
            search_width: default_five(),
            beam_width: default_five(),
            max_combinations: default_max_combinations(),
            policy: SessionPolicy::default(),
        }
    }
}

fn default_idf_weight() -> f64 { 1.5 }
fn default_text_weight() -> f64 { 3.0 }
fn default_page_matching_width() -> usize { 10 }
fn default_five() -> usize { 5 }
fn default_max_combinations() -> usize { 100_000 }

impl SearchConfig {
    pub fn validate(&self) -> Result<(), MatchError> {
        if !(self.idf_weight.is_finite() && self.idf_weight > 1.0) {
            return Err(MatchError::Config(format!(
                "idf_weight must be greater than 1, got {}",
                self.idf_weight
            )));
        }
        if !(self.text_weight.is_finite() && self.text_weight >= 0.0) {
            return Err(MatchError::Config(format!(
                "text_weight must be non-negative, got {}",
                self.text_weight
            )));
        }
        for (name, value) in [
            ("page_matching_width", self.page_matching_width),
            ("search_width", self.search_width),
            ("beam_width", self.beam_width),
            ("max_combinations", self.max_combinations),
        ] {
            if value == 0 {
                return Err(MatchError::Config(format!("{} must be at least 1", name)));
            }
        }
        Ok(())
    }
}

/// Everything one scenario's generation needs besides its collaborators.
#[derive(Debug, Clone, Default)]
pub struct MatcherConfig {
    pub search: SearchConfig,
    pub extract: ExtractConfig,
    /// Pause before every interaction
    pub step_delay: Duration,
    /// Pause after navigation and after each replayed page
    pub transition_delay: Duration,
}
