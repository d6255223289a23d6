mod common;

use std::time::Duration;

use scenario_matcher::error::MatchError;
use scenario_matcher::page::element::{Locator, LocatorKind};
use scenario_matcher::plan::generator::{generate, generate_all, generate_suite};
use scenario_matcher::scenario::suite::parse_suite;
use scenario_matcher::search::config::{MatcherConfig, SearchConfig, SessionPolicy};
use scenario_matcher::trace::logger::TraceLogger;

use crate::common::{FakeLauncher, FakeSite, HOME_PAGE, HOME_URL, LOGIN_PAGE, LOGIN_URL, scenario, vectors};

fn config(policy: SessionPolicy) -> MatcherConfig {
    MatcherConfig {
        search: SearchConfig {
            policy,
            ..SearchConfig::default()
        },
        step_delay: Duration::ZERO,
        transition_delay: Duration::ZERO,
        ..MatcherConfig::default()
    }
}

fn site() -> FakeSite {
    FakeSite::default()
        .page(LOGIN_URL, LOGIN_PAGE)
        .page(HOME_URL, HOME_PAGE)
        .link("id=submitBtn", HOME_URL)
}

#[test]
fn free_text_target_resolves_by_attribute_similarity() {
    let scenario = scenario(
        "login",
        &[r#"open "http://app.test/login""#, r#"enter "x" in "username""#],
    );
    let mut launcher = FakeLauncher::new(site());
    let plan = generate(
        &scenario,
        &mut launcher,
        &vectors(),
        &config(SessionPolicy::ResetPerBranch),
        &TraceLogger::disabled(),
    )
    .unwrap();

    let enter = &plan.steps[1];
    assert_eq!(enter.locator, Some(Locator::name("user_name")));
    assert!(!enter.explicit);
    assert_eq!(enter.audit_path.as_deref(), Some("/html/body/form/input[1]"));
    assert!(plan.score > 0.9);
    assert_eq!(plan.page_scores.len(), 1);
}

#[test]
fn explicit_id_bypasses_search() {
    let scenario = scenario(
        "submit",
        &[r#"open "http://app.test/nowhere""#, r##"click "#submitBtn""##],
    );
    // the page is empty: nothing to match against
    let mut launcher = FakeLauncher::new(FakeSite::default());
    let plan = generate(
        &scenario,
        &mut launcher,
        &vectors(),
        &config(SessionPolicy::ResetPerBranch),
        &TraceLogger::disabled(),
    )
    .unwrap();

    let click = &plan.steps[1];
    assert_eq!(click.locator, Some(Locator::id("submitBtn")));
    assert_eq!(click.locator.as_ref().map(|l| l.kind), Some(LocatorKind::Id));
    assert!(click.explicit);
    assert_eq!(click.audit_path.as_deref(), Some("submitBtn"));
    assert_eq!(plan.score, 0.0);
}

fn two_page_scenario() -> scenario_matcher::scenario::suite::Scenario {
    scenario(
        "login_then_search",
        &[
            r#"open "http://app.test/login""#,
            r#"enter "alice" in "username""#,
            r#"enter "secret" in "password""#,
            r##"click "#submitBtn""##,
            "---",
            r#"enter "rust" in "search""#,
            r#"assert title is "Home""#,
        ],
    )
}

#[test]
fn multi_page_scenario_reaches_the_second_page() {
    let scenario = two_page_scenario();
    let mut launcher = FakeLauncher::new(site());
    let plan = generate(
        &scenario,
        &mut launcher,
        &vectors(),
        &config(SessionPolicy::ResetPerBranch),
        &TraceLogger::disabled(),
    )
    .unwrap();

    let locators: Vec<Option<Locator>> = plan.steps.iter().map(|s| s.locator.clone()).collect();
    assert_eq!(
        locators,
        vec![
            None,
            Some(Locator::name("user_name")),
            Some(Locator::name("password")),
            Some(Locator::id("submitBtn")),
            None,
            Some(Locator::id("q")),
            None,
        ]
    );
    let pages: Vec<usize> = plan.steps.iter().map(|s| s.page).collect();
    assert_eq!(pages, vec![0, 0, 0, 0, 1, 1, 1]);
    assert_eq!(plan.page_scores.len(), 2);
    assert!((plan.page_scores.iter().sum::<f64>() - plan.score).abs() < 1e-9);
    assert_eq!(plan.unresolved().count(), 0);
}

#[test]
fn reset_policy_relaunches_and_replays_from_the_start() {
    let scenario = two_page_scenario();
    let mut launcher = FakeLauncher::new(site());
    let config = MatcherConfig {
        search: SearchConfig {
            beam_width: 2,
            ..SearchConfig::default()
        },
        ..config(SessionPolicy::ResetPerBranch)
    };
    generate(&scenario, &mut launcher, &vectors(), &config, &TraceLogger::disabled()).unwrap();

    // page 0 has two Enter variations, so two states are expanded at depth 1;
    // the first reuses the untouched session, the second relaunches
    assert_eq!(launcher.launches(), 2);
    assert_eq!(launcher.closes(), 2);

    let calls = launcher.calls();
    let opens = calls.iter().filter(|c| c.starts_with("open ")).count();
    assert_eq!(opens, 2);
    let clicks = calls.iter().filter(|c| c.as_str() == "click id=submitBtn").count();
    assert_eq!(clicks, 2);
}

#[test]
fn persistent_policy_keeps_one_session() {
    let scenario = two_page_scenario();
    let mut launcher = FakeLauncher::new(site());
    let config = MatcherConfig {
        search: SearchConfig {
            beam_width: 2,
            policy: SessionPolicy::Persistent,
            ..SearchConfig::default()
        },
        ..config(SessionPolicy::Persistent)
    };
    let plan = generate(&scenario, &mut launcher, &vectors(), &config, &TraceLogger::disabled()).unwrap();

    assert_eq!(launcher.launches(), 1);
    assert_eq!(launcher.closes(), 1);
    assert_eq!(plan.steps[1].locator, Some(Locator::name("user_name")));
}

#[test]
fn interaction_failure_is_a_no_op() {
    let scenario = two_page_scenario();
    let mut launcher = FakeLauncher::new(site().failing("name=password"));
    let plan = generate(
        &scenario,
        &mut launcher,
        &vectors(),
        &config(SessionPolicy::ResetPerBranch),
        &TraceLogger::disabled(),
    )
    .unwrap();

    assert!(launcher.calls().iter().any(|c| c.starts_with("enter name=password")));
    assert_eq!(plan.steps[5].locator, Some(Locator::id("q")));
}

#[test]
fn session_is_closed_when_generation_fails() {
    let scenario = two_page_scenario();
    let mut launcher = FakeLauncher::new(site().broken(HOME_URL));
    let err = generate(
        &scenario,
        &mut launcher,
        &vectors(),
        &config(SessionPolicy::ResetPerBranch),
        &TraceLogger::disabled(),
    )
    .unwrap_err();

    assert!(matches!(err, MatchError::SessionIO(_)));
    assert_eq!(launcher.launches(), launcher.closes());
}

#[test]
fn invalid_config_fails_before_launching() {
    let scenario = two_page_scenario();
    let mut launcher = FakeLauncher::new(site());
    let config = MatcherConfig {
        search: SearchConfig {
            beam_width: 0,
            ..SearchConfig::default()
        },
        ..MatcherConfig::default()
    };
    let err = generate(&scenario, &mut launcher, &vectors(), &config, &TraceLogger::disabled()).unwrap_err();
    assert!(matches!(err, MatchError::Config(_)));
    assert_eq!(launcher.launches(), 0);
}

#[test]
fn batch_continues_after_a_failing_scenario() {
    let broken = scenario(
        "broken",
        &[r#"open "http://app.test/crash""#, r#"enter "x" in "username""#],
    );
    let ok = scenario(
        "login",
        &[r#"open "http://app.test/login""#, r#"enter "x" in "username""#],
    );
    let mut launcher = FakeLauncher::new(site().broken("http://app.test/crash"));

    let (plans, all_ok) = generate_all(
        &[broken, ok],
        &mut launcher,
        &vectors(),
        &config(SessionPolicy::ResetPerBranch),
        &TraceLogger::disabled(),
    );
    assert!(!all_ok);
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].scenario, "login");
    assert_eq!(launcher.launches(), launcher.closes());
}

#[test]
fn rejected_scenario_fails_the_run_but_not_its_neighbours() {
    let content = r#"
login:
  - open "http://app.test/login"
  - enter "alice" in "username"
typo:
  - open "http://app.test/login"
  - entr "alice" in "username"
"#;
    let suite = parse_suite(content, "suite.yaml", &[]).unwrap();
    let mut launcher = FakeLauncher::new(site());
    let (plans, all_ok) = generate_suite(
        &suite,
        &mut launcher,
        &vectors(),
        &config(SessionPolicy::ResetPerBranch),
        &TraceLogger::disabled(),
    );

    assert!(!all_ok);
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].scenario, "login");
    assert_eq!(plans[0].steps[1].locator, Some(Locator::name("user_name")));
    assert_eq!(launcher.launches(), 1);
}

#[test]
fn clean_suite_reports_success() {
    let content = "login:\n  - open \"http://app.test/login\"\n  - enter \"alice\" in \"username\"\n";
    let suite = parse_suite(content, "suite.yaml", &[]).unwrap();
    let mut launcher = FakeLauncher::new(site());
    let (plans, all_ok) = generate_suite(
        &suite,
        &mut launcher,
        &vectors(),
        &config(SessionPolicy::ResetPerBranch),
        &TraceLogger::disabled(),
    );

    assert!(all_ok);
    assert_eq!(plans.len(), 1);
}

#[test]
fn kind_without_candidates_leaves_the_step_unresolved() {
    let scenario = scenario(
        "pick",
        &[r#"open "http://app.test/login""#, r#"select "Japan" from "country""#],
    );
    let mut launcher = FakeLauncher::new(site());
    let plan = generate(
        &scenario,
        &mut launcher,
        &vectors(),
        &config(SessionPolicy::ResetPerBranch),
        &TraceLogger::disabled(),
    )
    .unwrap();

    assert!(plan.steps[1].is_unresolved());
    assert_eq!(plan.unresolved().count(), 1);
    assert_eq!(plan.score, 0.0);
}
