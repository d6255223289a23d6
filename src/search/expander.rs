use std::rc::Rc;
use std::thread;

use tracing::{debug, info};

use crate::browser::session::{SessionGuard, SessionLauncher};
use crate::error::MatchError;
use crate::page::extractor::PageSnapshot;
use crate::scenario::step::{OperationKind, Step, StepAction};
use crate::scenario::suite::Scenario;
use crate::scoring::similarity::SimilarityScorer;
use crate::scoring::vectors::VectorLookup;
use crate::search::beam::PageExpander;
use crate::search::config::{MatcherConfig, SearchConfig, SessionPolicy};
use crate::search::ranker::rank_candidates;
use crate::search::variation::{PageVariation, compose_page_variations, enumerate_variations};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

// ============================================================================
// Offline: one page's variations from a snapshot
// ============================================================================

/// Ranked page variations for the steps of one page, best first.
///
/// Only steps with a free-text target take part; per kind, every step is
/// ranked against the snapshot's candidates of that kind, the rankings are
/// enumerated into variations, and the kinds are composed.
pub fn page_variations_for(
    steps: &[&Step],
    snapshot: &PageSnapshot,
    lookup: &dyn VectorLookup,
    config: &SearchConfig,
) -> Result<Vec<PageVariation>, MatchError> {
    let scorer = SimilarityScorer::new(lookup, snapshot.idf(), config.text_weight);

    let mut per_kind = Vec::with_capacity(OperationKind::ALL.len());
    for kind in OperationKind::ALL {
        let pool = snapshot.of_kind(kind);
        let mut ranked = Vec::new();
        for step in steps.iter().filter(|s| s.kind() == Some(kind)) {
            if let Some(text) = step.target().and_then(|t| t.free_text()) {
                ranked.push(rank_candidates(text, &pool, &scorer, config.page_matching_width)?);
            }
        }

        let variations = enumerate_variations(&ranked, config.max_combinations);
        debug!(
            kind = kind.as_str(),
            steps = ranked.len(),
            pool = pool.len(),
            variations = variations.len(),
            "enumerated variations"
        );
        per_kind.push(variations);
    }

    Ok(compose_page_variations(
        &per_kind[0],
        &per_kind[1],
        &per_kind[2],
        config.search_width,
    ))
}

// ============================================================================
// Live: re-establish the page a state stands on, then snapshot it
// ============================================================================

/// Expands search states against a real session.
///
/// Under `ResetPerBranch` every expansion after the first starts a new
/// session and replays the whole path from the start URL. Under
/// `Persistent` the session is kept and only the newest page of the path is
/// replayed, so sibling states observe each other's side effects.
pub struct LiveExpander<'a> {
    guard: &'a mut SessionGuard,
    launcher: &'a mut dyn SessionLauncher,
    scenario: &'a Scenario,
    pages: Vec<Vec<&'a Step>>,
    lookup: &'a dyn VectorLookup,
    config: &'a MatcherConfig,
    trace: &'a TraceLogger,
    /// Session is at the start URL with nothing replayed yet
    fresh: bool,
}

impl<'a> LiveExpander<'a> {
    /// `guard` must hold a session already at the scenario's start URL.
    pub fn new(
        guard: &'a mut SessionGuard,
        launcher: &'a mut dyn SessionLauncher,
        scenario: &'a Scenario,
        lookup: &'a dyn VectorLookup,
        config: &'a MatcherConfig,
        trace: &'a TraceLogger,
    ) -> Self {
        Self {
            guard,
            launcher,
            scenario,
            pages: scenario.pages(),
            lookup,
            config,
            trace,
            fresh: true,
        }
    }

    fn reset(&mut self) -> Result<(), MatchError> {
        debug!(scenario = %self.scenario.name, "relaunching session");
        self.guard.relaunch(&mut *self.launcher)?;
        self.guard.session()?.open(&self.scenario.start_url)?;
        thread::sleep(self.config.transition_delay);
        Ok(())
    }

    /// Perform the interactions of one page under one variation.
    ///
    /// Interaction failures are expected while exploring and skip the step.
    fn replay_page(&mut self, page: usize, variation: &PageVariation) -> Result<(), MatchError> {
        let steps = self.pages.get(page).cloned().unwrap_or_default();
        for assignment in variation.assign(&steps) {
            let step = assignment.step;
            if step.index == 0 && matches!(step.action, StepAction::Open { .. }) {
                continue;
            }

            thread::sleep(self.config.step_delay);
            let session = self.guard.session()?;
            match step.execute(assignment.locator.as_ref(), session) {
                Ok(()) => {}
                Err(e) if e.is_interaction() => {
                    debug!(step = %step.raw, error = %e, "interaction failed, step skipped");
                }
                Err(e) => return Err(e),
            }
        }
        self.fresh = false;
        thread::sleep(self.config.transition_delay);
        Ok(())
    }
}

impl PageExpander for LiveExpander<'_> {
    fn expand(&mut self, depth: usize, path: &[Rc<PageVariation>]) -> Result<Vec<PageVariation>, MatchError> {
        match self.config.search.policy {
            SessionPolicy::ResetPerBranch => {
                if !self.fresh {
                    self.reset()?;
                }
                for (page, variation) in path.iter().enumerate() {
                    self.replay_page(page, variation)?;
                }
            }
            SessionPolicy::Persistent => {
                if let Some(last) = path.last() {
                    self.replay_page(path.len() - 1, last)?;
                }
            }
        }

        let markup = self.guard.session()?.read_markup()?;
        let snapshot = PageSnapshot::build(
            &markup,
            &self.config.extract,
            self.lookup,
            self.config.search.idf_weight,
            self.config.search.text_weight,
        )?;

        self.trace.log(
            &TraceEvent::now("snapshot", &self.scenario.name, depth)
                .with_fingerprint(snapshot.fingerprint())
                .with_count(snapshot.elements().len()),
        );

        let steps = self.pages.get(depth).cloned().unwrap_or_default();
        let variations = page_variations_for(&steps, &snapshot, self.lookup, &self.config.search)?;
        info!(
            scenario = %self.scenario.name,
            depth,
            elements = snapshot.elements().len(),
            variations = variations.len(),
            "page expanded"
        );
        Ok(variations)
    }
}
