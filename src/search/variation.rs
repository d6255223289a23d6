use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::warn;

use crate::page::element::{Locator, PageElement};
use crate::scenario::step::{OperationKind, Step};
use crate::search::ranker::RankedCandidate;

/// One element per same-kind step of a page, no element used twice.
#[derive(Debug, Clone, PartialEq)]
pub struct Variation {
    elements: Vec<Rc<PageElement>>,
    score: f64,
}

impl Variation {
    pub fn new(elements: Vec<Rc<PageElement>>, score: f64) -> Self {
        Self { elements, score }
    }

    pub fn elements(&self) -> &[Rc<PageElement>] {
        &self.elements
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Every duplicate-free assignment of ranked candidates to steps, best first.
///
/// `candidates[i]` is the ranked list of step `i`. With no steps the result
/// is a single empty variation scoring 0. When no duplicate-free tuple
/// exists the result is `[None]`: the kind is absent from the page.
///
/// At most `max_combinations` tuples are examined.
pub fn enumerate_variations(
    candidates: &[Vec<RankedCandidate>],
    max_combinations: usize,
) -> Vec<Option<Variation>> {
    let steps = candidates.len();
    let mut variations = Vec::new();

    if candidates.iter().all(|c| !c.is_empty()) {
        let mut cursor = vec![0usize; steps];
        let mut examined = 0usize;

        loop {
            if examined == max_combinations {
                warn!(
                    examined,
                    steps, "combination limit reached, remaining tuples skipped"
                );
                break;
            }
            examined += 1;

            let tuple: Vec<&RankedCandidate> =
                cursor.iter().zip(candidates).map(|(&i, list)| &list[i]).collect();

            if !has_duplicate(&tuple) {
                let mut score: f64 = tuple.iter().map(|c| c.similarity).sum();
                // A raw sum of exactly zero is left as is.
                if score != 0.0 && steps > 0 {
                    score /= steps as f64;
                }
                variations.push(Variation::new(
                    tuple.iter().map(|c| Rc::clone(&c.element)).collect(),
                    score,
                ));
            }

            if !advance(&mut cursor, candidates) {
                break;
            }
        }
    }

    if variations.is_empty() {
        return vec![None];
    }
    variations.sort_by(|a, b| b.score.total_cmp(&a.score));
    variations.into_iter().map(Some).collect()
}

/// Odometer step over the candidate lists; false once every tuple was visited.
fn advance(cursor: &mut [usize], candidates: &[Vec<RankedCandidate>]) -> bool {
    for pos in (0..cursor.len()).rev() {
        cursor[pos] += 1;
        if cursor[pos] < candidates[pos].len() {
            return true;
        }
        cursor[pos] = 0;
    }
    false
}

fn has_duplicate(tuple: &[&RankedCandidate]) -> bool {
    tuple.iter().enumerate().any(|(i, a)| {
        tuple[i + 1..]
            .iter()
            .any(|b| a.element.index == b.element.index)
    })
}

// ============================================================================
// Page variations
// ============================================================================

/// One variation (or none) per operation kind for a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageVariation {
    variations: BTreeMap<OperationKind, Option<Variation>>,
}

impl PageVariation {
    pub fn new(enter: Option<Variation>, select: Option<Variation>, click: Option<Variation>) -> Self {
        let variations = BTreeMap::from([
            (OperationKind::Enter, enter),
            (OperationKind::Select, select),
            (OperationKind::Click, click),
        ]);
        Self { variations }
    }

    pub fn get(&self, kind: OperationKind) -> Option<&Variation> {
        self.variations.get(&kind).and_then(|v| v.as_ref())
    }

    /// Sum of the present kinds' scores; absent kinds add nothing.
    pub fn score(&self) -> f64 {
        self.variations.values().flatten().map(Variation::score).sum()
    }

    /// Pair each step of the page with the element or locator it resolves to.
    ///
    /// Steps with an explicit locator hint keep it. The n-th searched step of
    /// a kind takes the n-th element of that kind's variation.
    pub fn assign<'s>(&self, steps: &[&'s Step]) -> Vec<StepAssignment<'s>> {
        let mut ordinals: BTreeMap<OperationKind, usize> = BTreeMap::new();

        steps
            .iter()
            .map(|&step| {
                let explicit = step.target().and_then(|t| t.explicit_locator());
                if explicit.is_some() {
                    return StepAssignment {
                        step,
                        locator: explicit,
                        element: None,
                    };
                }

                let element = step.kind().and_then(|kind| {
                    let ordinal = ordinals.entry(kind).or_insert(0);
                    let element = self.get(kind)?.elements().get(*ordinal).cloned();
                    *ordinal += 1;
                    element
                });
                StepAssignment {
                    step,
                    locator: element.as_ref().map(|e| e.locator()),
                    element,
                }
            })
            .collect()
    }
}

/// A step with what it resolved to on its page.
#[derive(Debug, Clone)]
pub struct StepAssignment<'s> {
    pub step: &'s Step,
    pub locator: Option<Locator>,
    /// Set when the locator came from similarity search
    pub element: Option<Rc<PageElement>>,
}

/// Cartesian product of the per-kind variation lists, each cut to `width`,
/// best total first.
pub fn compose_page_variations(
    enter: &[Option<Variation>],
    select: &[Option<Variation>],
    click: &[Option<Variation>],
    width: usize,
) -> Vec<PageVariation> {
    let mut pages = Vec::new();
    for e in enter.iter().take(width) {
        for s in select.iter().take(width) {
            for c in click.iter().take(width) {
                pages.push(PageVariation::new(e.clone(), s.clone(), c.clone()));
            }
        }
    }
    pages.sort_by(|a, b| b.score().total_cmp(&a.score()));
    pages
}
