use std::thread;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::browser::session::{SessionGuard, SessionLauncher};
use crate::error::MatchError;
use crate::plan::resolved::ResolvedPlan;
use crate::scenario::suite::{Scenario, Suite};
use crate::scoring::vectors::VectorLookup;
use crate::search::beam::BeamSearch;
use crate::search::config::MatcherConfig;
use crate::search::expander::LiveExpander;
use crate::trace::logger::TraceLogger;

/// Resolve every step target of `scenario` against live pages.
///
/// The session is held by a guard for the whole search and closed on
/// every exit path, including errors.
pub fn generate(
    scenario: &Scenario,
    launcher: &mut dyn SessionLauncher,
    lookup: &dyn VectorLookup,
    config: &MatcherConfig,
    trace: &TraceLogger,
) -> Result<ResolvedPlan, MatchError> {
    config.search.validate()?;

    let start = Instant::now();
    let pages = scenario.page_count();
    info!(scenario = %scenario.name, pages, policy = ?config.search.policy, "generating");

    let mut guard = SessionGuard::launch(launcher)?;
    guard.session()?.open(&scenario.start_url)?;
    thread::sleep(config.transition_delay);

    let outcome = {
        let mut expander = LiveExpander::new(&mut guard, launcher, scenario, lookup, config, trace);
        BeamSearch::new(config.search.search_width, config.search.beam_width).run(pages, &mut expander)?
    };
    guard.close();

    trace.log_search(&scenario.name, &outcome);

    let plan = ResolvedPlan::from_path(scenario, &outcome.path, outcome.score);
    for step in plan.unresolved() {
        warn!(scenario = %scenario.name, step = %step.raw, "no element found for step");
    }
    info!(
        scenario = %scenario.name,
        score = plan.score,
        nodes = outcome.tree.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "scenario resolved"
    );
    Ok(plan)
}

/// Resolve each scenario in turn.
///
/// A failing scenario is logged and skipped; the flag is `false` when any
/// scenario failed.
pub fn generate_all(
    scenarios: &[Scenario],
    launcher: &mut dyn SessionLauncher,
    lookup: &dyn VectorLookup,
    config: &MatcherConfig,
    trace: &TraceLogger,
) -> (Vec<ResolvedPlan>, bool) {
    let mut plans = Vec::with_capacity(scenarios.len());
    let mut all_ok = true;

    for scenario in scenarios {
        match generate(scenario, launcher, lookup, config, trace) {
            Ok(plan) => plans.push(plan),
            Err(e) => {
                error!(scenario = %scenario.name, error = %e, "scenario failed");
                all_ok = false;
            }
        }
    }
    (plans, all_ok)
}

/// Resolve the valid scenarios of a suite.
///
/// Scenarios rejected while loading are logged and count as failures.
pub fn generate_suite(
    suite: &Suite,
    launcher: &mut dyn SessionLauncher,
    lookup: &dyn VectorLookup,
    config: &MatcherConfig,
    trace: &TraceLogger,
) -> (Vec<ResolvedPlan>, bool) {
    for (name, e) in &suite.failures {
        error!(scenario = %name, error = %e, "scenario rejected");
    }
    let (plans, all_ok) = generate_all(&suite.scenarios, launcher, lookup, config, trace);
    (plans, all_ok && suite.is_clean())
}
