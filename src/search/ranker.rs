use std::rc::Rc;

use crate::error::MatchError;
use crate::page::element::PageElement;
use crate::scoring::similarity::SimilarityScorer;
use crate::text::words::normalize;

/// An element with its similarity to one step's target.
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub element: Rc<PageElement>,
    pub similarity: f64,
}

/// Rank `pool` against a free-text target and keep the best `width`.
///
/// Equal scores keep extraction order.
pub fn rank_candidates(
    target: &str,
    pool: &[Rc<PageElement>],
    scorer: &SimilarityScorer<'_>,
    width: usize,
) -> Result<Vec<RankedCandidate>, MatchError> {
    let query = scorer.query_vector(&normalize(target))?;

    let mut ranked: Vec<RankedCandidate> = pool
        .iter()
        .map(|el| RankedCandidate {
            similarity: scorer.similarity(&query, el),
            element: Rc::clone(el),
        })
        .collect();

    ranked.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    ranked.truncate(width);
    Ok(ranked)
}
