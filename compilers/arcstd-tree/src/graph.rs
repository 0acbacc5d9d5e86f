use std::collections::HashMap;

use arcstd_protocol::{Token, TokenId};
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};
use petgraph::{Directed, Direction};

use crate::TreeError;

/// Head -> dependent edges over the tokens of one sentence plus ROOT.
pub struct DependencyGraph {
    graph: Graph<TokenId, (), Directed>,
    index_map: HashMap<TokenId, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        let mut graph = Graph::new();
        let root = graph.add_node(TokenId::ROOT);
        let mut index_map = HashMap::new();
        index_map.insert(TokenId::ROOT, root);
        Self { graph, index_map }
    }

    /// Builds the graph from parsed tokens. Every token must carry a head
    /// that is ROOT or another token of the sentence.
    pub fn from_tokens(tokens: &[Token]) -> Result<Self, TreeError> {
        let mut tree = Self::new();
        for token in tokens {
            tree.add_token(token.id);
        }
        for token in tokens {
            let head = token.head().ok_or(TreeError::MissingHead(token.id))?;
            if !tree.index_map.contains_key(&head) {
                return Err(TreeError::UnknownHead {
                    dependent: token.id,
                    head,
                });
            }
            tree.add_arc(head, token.id);
        }
        Ok(tree)
    }

    pub fn add_token(&mut self, id: TokenId) {
        if !self.index_map.contains_key(&id) {
            let idx = self.graph.add_node(id);
            self.index_map.insert(id, idx);
        }
    }

    pub fn add_arc(&mut self, head: TokenId, dependent: TokenId) {
        let head_idx = *self.index_map.entry(head).or_insert_with(|| self.graph.add_node(head));
        let dep_idx = *self
            .index_map
            .entry(dependent)
            .or_insert_with(|| self.graph.add_node(dependent));

        self.graph.add_edge(head_idx, dep_idx, ());
    }

    pub fn token_count(&self) -> usize {
        self.graph.node_count() - 1
    }

    /// Tokens attached directly to ROOT.
    pub fn root_children(&self) -> Vec<TokenId> {
        let mut children: Vec<TokenId> = self
            .graph
            .edges(self.index_map[&TokenId::ROOT])
            .map(|edge| self.graph[edge.target()])
            .collect();
        children.sort();
        children
    }

    /// Checks the arc set is a tree hanging from ROOT: one head per token,
    /// none for ROOT, no cycles, and every token reachable from ROOT.
    pub fn validate(&self) -> Result<(), TreeError> {
        // 1. Head counts
        for idx in self.graph.node_indices() {
            let id = self.graph[idx];
            let heads = self.graph.edges_directed(idx, Direction::Incoming).count();
            match (id.is_root(), heads) {
                (true, 0) | (false, 1) => {}
                (true, _) => return Err(TreeError::RootHasHead),
                (false, 0) => return Err(TreeError::MissingHead(id)),
                (false, count) => return Err(TreeError::MultipleHeads { dependent: id, count }),
            }
        }

        // 2. Cycles
        if is_cyclic_directed(&self.graph) {
            return Err(TreeError::Cycle);
        }

        // 3. Reachability
        let root = self.index_map[&TokenId::ROOT];
        let mut reached = vec![false; self.graph.node_count()];
        let mut dfs = Dfs::new(&self.graph, root);
        while let Some(idx) = dfs.next(&self.graph) {
            reached[idx.index()] = true;
        }
        if let Some(idx) = self.graph.node_indices().find(|idx| !reached[idx.index()]) {
            return Err(TreeError::Unreachable(self.graph[idx]));
        }

        Ok(())
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
