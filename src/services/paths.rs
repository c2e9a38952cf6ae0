use std::collections::HashSet;

use crate::models::{AccountKey, Graph, ItemKey, Node, ReviewKey};

/// Default number of hops walked from the starting account
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Paths need more edges than this to count as a multi-hop candidate
pub const MIN_PATH_EDGES: usize = 2;

/// Alternating sequence of review edges starting at the querying account
pub type ReviewPath = Vec<ReviewKey>;

/// Item endpoints already claimed during one query.
///
/// Seeded with the items the account has already seen; the first path to reach
/// any other item claims it and later paths to the same item are dropped.
#[derive(Debug, Default, Clone)]
pub struct EndpointSet {
    claimed: HashSet<ItemKey>,
}

impl EndpointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(items: impl IntoIterator<Item = ItemKey>) -> Self {
        Self {
            claimed: items.into_iter().collect(),
        }
    }

    pub fn contains(&self, item: ItemKey) -> bool {
        self.claimed.contains(&item)
    }

    /// Returns false when the item was already claimed
    pub fn claim(&mut self, item: ItemKey) -> bool {
        self.claimed.insert(item)
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

/// Per-walk bookkeeping threaded through the recursion
struct Walk<'e> {
    nodes: Vec<Node>,
    edges: Vec<ReviewKey>,
    endpoints: &'e mut EndpointSet,
    visits: usize,
    exhausted: bool,
    found: Vec<ReviewPath>,
}

/// Bounded depth-first enumeration of account/item paths.
///
/// Neighbors are visited in review insertion order, which fixes which path
/// claims an endpoint when several reach the same item.
#[derive(Debug, Clone, Copy)]
pub struct PathEnumerator<'g> {
    graph: &'g Graph,
    max_depth: usize,
    visit_budget: Option<usize>,
}

impl<'g> PathEnumerator<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            max_depth: DEFAULT_MAX_DEPTH,
            visit_budget: None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Caps the number of nodes expanded per enumeration
    pub fn with_visit_budget(mut self, budget: Option<usize>) -> Self {
        self.visit_budget = budget;
        self
    }

    /// Enumerates candidate paths from `start`, each ending at an item not yet
    /// claimed in `endpoints`. Claimed items are added to `endpoints`.
    pub fn enumerate(&self, start: AccountKey, endpoints: &mut EndpointSet) -> Vec<ReviewPath> {
        let mut walk = Walk {
            nodes: vec![Node::Account(start)],
            edges: Vec::new(),
            endpoints,
            visits: 0,
            exhausted: false,
            found: Vec::new(),
        };
        self.visit(Node::Account(start), 0, &mut walk);

        if walk.exhausted {
            tracing::warn!(
                visits = walk.visits,
                found = walk.found.len(),
                "Path enumeration stopped at visit budget"
            );
        }
        tracing::debug!(
            visits = walk.visits,
            found = walk.found.len(),
            claimed = walk.endpoints.len(),
            "Path enumeration finished"
        );
        walk.found
    }

    fn visit(&self, node: Node, depth: usize, walk: &mut Walk<'_>) {
        if walk.exhausted {
            return;
        }
        walk.visits += 1;
        if let Some(budget) = self.visit_budget {
            if walk.visits > budget {
                walk.exhausted = true;
                return;
            }
        }

        if depth == self.max_depth || node.is_dead_end(self.graph) {
            self.record(walk);
            return;
        }

        for (next, review) in self.graph.neighbors(node) {
            if walk.nodes.contains(&next) {
                continue;
            }
            walk.nodes.push(next);
            walk.edges.push(review);
            self.visit(next, depth + 1, walk);
            walk.nodes.pop();
            walk.edges.pop();
        }
    }

    fn record(&self, walk: &mut Walk<'_>) {
        if walk.edges.len() <= MIN_PATH_EDGES {
            return;
        }
        let endpoint = walk
            .nodes
            .iter()
            .rev()
            .take(2)
            .find_map(|node| node.as_item());
        if let Some(item) = endpoint {
            if walk.endpoints.claim(item) {
                walk.found.push(walk.edges.clone());
            }
        }
    }
}

/// Item reached by the last edge of a path
pub fn path_endpoint(graph: &Graph, path: &[ReviewKey]) -> Option<ItemKey> {
    path.last().map(|review| graph.review(*review).item)
}
