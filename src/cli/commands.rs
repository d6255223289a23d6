use std::path::Path;
use std::time::Instant;

use chrono::Local;
use tracing::{info, warn};

use crate::browser::session::BrowserLauncher;
use crate::cli::config::{AppConfig, OutputFormat, ResolveOverrides, build_vectors};
use crate::page::extractor::PageSnapshot;
use crate::page::markup::MarkupDocument;
use crate::plan::generator::generate_suite;
use crate::report::locators::LocatorAudit;
use crate::report::script::{ScriptHeader, write_script};
use crate::scenario::step::OperationKind;
use crate::scenario::suite::load_suite;
use crate::scoring::similarity::SimilarityScorer;
use crate::search::ranker::rank_candidates;
use crate::trace::logger::TraceLogger;

// ============================================================================
// resolve subcommand
// ============================================================================

/// Resolve the selected scenarios and write the outputs.
///
/// Returns whether every scenario resolved.
pub fn cmd_resolve(
    suite_path: &str,
    only: &[String],
    format: OutputFormat,
    overrides: &ResolveOverrides,
    config: AppConfig,
) -> Result<bool, Box<dyn std::error::Error>> {
    let config = config.with_overrides(overrides);
    let matcher = config.matcher_config()?;

    let suite = load_suite(Path::new(suite_path), only)?;
    if suite.scenarios.is_empty() && suite.is_clean() {
        warn!(suite = suite_path, "no scenarios selected");
        return Ok(true);
    }
    for name in only {
        if !suite.names().any(|n| n == name) {
            warn!(scenario = %name, "scenario not found in suite");
        }
    }

    let lookup = build_vectors(&config.vectors)?;
    let trace = match &config.output.trace {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };
    let mut launcher = BrowserLauncher::new(&config.browser.program, &config.browser.script);

    info!(
        scenarios = suite.scenarios.len(),
        rejected = suite.failures.len(),
        suite = suite_path,
        "resolving suite"
    );
    let start = Instant::now();
    let (plans, all_ok) = generate_suite(&suite, &mut launcher, lookup.as_ref(), &matcher, &trace);

    let header = ScriptHeader {
        generated_at: Local::now(),
        search_width: matcher.search.search_width,
        beam_width: matcher.search.beam_width,
        text_weight: matcher.search.text_weight,
        generation_secs: start.elapsed().as_secs_f64(),
    };
    let out_dir = Path::new(&config.output.dir);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plans)?),
        OutputFormat::Script => {
            let path = write_script(out_dir, &header, &plans)?;
            println!("Wrote {} scenario(s) to {}", plans.len(), path.display());
        }
    }

    if config.output.write_locators {
        let mut audit = LocatorAudit::new();
        for plan in &plans {
            audit.record_plan(plan);
        }
        let path = out_dir.join(format!("locator_{}.csv", header.stamp()));
        audit.write_to(&path)?;
        println!("Wrote locators to {}", path.display());
    }

    Ok(all_ok)
}

// ============================================================================
// rank subcommand
// ============================================================================

pub fn cmd_rank(
    markup_path: &str,
    target: &str,
    kind: OperationKind,
    config: AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let matcher = config.matcher_config()?;
    let markup = std::fs::read_to_string(markup_path)?;
    let lookup = build_vectors(&config.vectors)?;

    let snapshot = PageSnapshot::build(
        &markup,
        &matcher.extract,
        lookup.as_ref(),
        matcher.search.idf_weight,
        matcher.search.text_weight,
    )?;
    let scorer = SimilarityScorer::new(lookup.as_ref(), snapshot.idf(), matcher.search.text_weight);
    let pool = snapshot.of_kind(kind);
    let ranked = rank_candidates(target, &pool, &scorer, matcher.search.page_matching_width)?;

    let title = MarkupDocument::parse(&markup).title().unwrap_or_default();
    println!(
        "{} [{}] {} candidates of kind {}",
        markup_path,
        title,
        pool.len(),
        kind.as_str()
    );
    for (rank, candidate) in ranked.iter().enumerate() {
        println!(
            "  {:>2}. {:.4}  {:<40} {}",
            rank + 1,
            candidate.similarity,
            candidate.element.locator().to_string(),
            candidate.element.attr_words.join(" ")
        );
    }
    Ok(())
}

// ============================================================================
// parse subcommand
// ============================================================================

pub fn cmd_parse(suite_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let suite = load_suite(Path::new(suite_path), &[])?;

    for scenario in &suite.scenarios {
        println!("{} ({})", scenario.name, scenario.start_url);
        for (page, steps) in scenario.pages().iter().enumerate() {
            println!("  page {}:", page);
            for step in steps {
                let marker = if step.needs_search() { "?" } else { " " };
                println!("    {} [{:>2}] {}", marker, step.index, step.raw);
            }
        }
    }
    for (name, e) in &suite.failures {
        println!("{} INVALID: {}", name, e);
    }

    if !suite.is_clean() {
        return Err(format!("{} of {} scenario(s) invalid", suite.failures.len(), suite.names().count()).into());
    }
    println!("{} scenario(s) OK", suite.scenarios.len());
    Ok(())
}
