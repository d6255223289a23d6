use std::rc::Rc;

use tracing::{debug, info};

use crate::error::MatchError;
use crate::search::variation::PageVariation;

/// Produces the ranked page variations available to a search state.
pub trait PageExpander {
    /// Variations for page `depth`, given the choices made on earlier pages.
    fn expand(&mut self, depth: usize, path: &[Rc<PageVariation>]) -> Result<Vec<PageVariation>, MatchError>;
}

// ============================================================================
// Score tree
// ============================================================================

/// One explored choice; the root (id 0) has no page variation.
#[derive(Debug, Clone)]
pub struct SearchNode {
    pub id: usize,
    pub parent: Option<usize>,
    pub depth: usize,
    pub total_score: f64,
    pub page: Option<Rc<PageVariation>>,
    pub children: Vec<usize>,
}

/// Every node expanded during one search, for diagnostics.
#[derive(Debug, Clone)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl SearchTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![SearchNode {
                id: 0,
                parent: None,
                depth: 0,
                total_score: 0.0,
                page: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> &SearchNode {
        &self.nodes[0]
    }

    pub fn node(&self, id: usize) -> Option<&SearchNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[SearchNode] {
        &self.nodes
    }

    /// Node count, root included; never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    fn add_child(&mut self, parent: usize, total_score: f64, page: Rc<PageVariation>) -> usize {
        let id = self.nodes.len();
        let depth = self.nodes[parent].depth + 1;
        self.nodes.push(SearchNode {
            id,
            parent: Some(parent),
            depth,
            total_score,
            page: Some(page),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }
}

impl Default for SearchTree {
    fn default() -> Self {
        Self::new()
    }
}

/// A frontier entry: a tree node plus the page choices leading to it.
#[derive(Debug, Clone)]
pub struct BeamState {
    pub node: usize,
    pub score: f64,
    pub path: Vec<Rc<PageVariation>>,
}

impl BeamState {
    pub fn root() -> Self {
        Self {
            node: 0,
            score: 0.0,
            path: Vec::new(),
        }
    }
}

/// Result of a completed search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Best path, one page variation per page
    pub path: Vec<Rc<PageVariation>>,
    pub score: f64,
    pub tree: SearchTree,
    /// Frontier size after the cut at each depth
    pub frontier_sizes: Vec<usize>,
}

// ============================================================================
// Beam search
// ============================================================================

/// Page-by-page beam search over page variations.
///
/// Exhaustive whenever `beam_width` and `search_width` are at least the
/// branching factor at every depth; otherwise the best path can be pruned
/// away and the result is only the best surviving path.
#[derive(Debug, Clone, Copy)]
pub struct BeamSearch {
    pub search_width: usize,
    pub beam_width: usize,
}

impl BeamSearch {
    pub fn new(search_width: usize, beam_width: usize) -> Self {
        Self {
            search_width,
            beam_width,
        }
    }

    /// Search `pages` pages deep and return the best full path.
    pub fn run(&self, pages: usize, expander: &mut dyn PageExpander) -> Result<SearchOutcome, MatchError> {
        let mut tree = SearchTree::new();
        let mut frontier = vec![BeamState::root()];
        let mut frontier_sizes = Vec::with_capacity(pages);

        for depth in 0..pages {
            frontier = self.advance(&mut tree, &frontier, depth, expander)?;
            frontier_sizes.push(frontier.len());
        }

        let best = frontier.into_iter().next().unwrap_or_else(BeamState::root);
        info!(score = best.score, pages, nodes = tree.len(), "beam search finished");

        Ok(SearchOutcome {
            path: best.path,
            score: best.score,
            tree,
            frontier_sizes,
        })
    }

    /// Expand every state of `frontier` by one page and keep the best
    /// `beam_width` children across all of them.
    pub fn advance(
        &self,
        tree: &mut SearchTree,
        frontier: &[BeamState],
        depth: usize,
        expander: &mut dyn PageExpander,
    ) -> Result<Vec<BeamState>, MatchError> {
        let mut children = Vec::new();

        for state in frontier {
            let variations = expander.expand(depth, &state.path)?;
            for page in variations.into_iter().take(self.search_width) {
                let page = Rc::new(page);
                let score = state.score + page.score();
                let node = tree.add_child(state.node, score, Rc::clone(&page));

                let mut path = state.path.clone();
                path.push(page);
                children.push(BeamState { node, score, path });
            }
        }

        if children.is_empty() {
            return Err(MatchError::SearchExhausted { depth });
        }

        let expanded = children.len();
        children.sort_by(|a, b| b.score.total_cmp(&a.score));
        children.truncate(self.beam_width);

        debug!(
            depth,
            expanded,
            kept = children.len(),
            best = children.first().map(|c| c.score),
            "beam cut"
        );
        Ok(children)
    }
}
