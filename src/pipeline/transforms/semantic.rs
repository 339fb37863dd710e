//! Embedding-similarity merging under a token budget.

use std::fmt;
use std::sync::Arc;

use crate::embeddings::{cosine_similarity, validate_embeddings, EmbeddingsClient};
use crate::error::{Error, Result};
use crate::node::{sort_nodes, Node};

use super::ProcessingStep;

/// Merges adjacent nodes whose embeddings are similar, keeping merged nodes
/// within `max_tokens`.
///
/// Each outer pass embeds every node text in a single batch call, then scans
/// left to right. A merged node is re-tested against its new neighbour
/// using the vectors from the start of the pass; its own fresh vector is
/// only computed on the next pass. Passes repeat until one performs no
/// merge, and each pass that continues has removed at least one node, so
/// the loop is bounded by the input length.
pub struct CombineNodesSemantically {
    client: Arc<dyn EmbeddingsClient>,
    min_similarity: f32,
    max_tokens: usize,
}

impl fmt::Debug for CombineNodesSemantically {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombineNodesSemantically")
            .field("client", &self.client.name())
            .field("min_similarity", &self.min_similarity)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl CombineNodesSemantically {
    /// Create the step.
    ///
    /// # Arguments
    ///
    /// * `client` - Embedding capability, shared read-only
    /// * `min_similarity` - Cosine similarity threshold in `[-1, 1]`
    /// * `max_tokens` - Upper bound on the token count of a merged node
    pub fn new(
        client: Arc<dyn EmbeddingsClient>,
        min_similarity: f32,
        max_tokens: usize,
    ) -> Result<Self> {
        if !(-1.0..=1.0).contains(&min_similarity) {
            return Err(Error::InvalidConfig(format!(
                "min_similarity must be in [-1, 1], got {}",
                min_similarity
            )));
        }
        if max_tokens == 0 {
            return Err(Error::InvalidConfig(
                "max_tokens must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            client,
            min_similarity,
            max_tokens,
        })
    }

    /// Similarity threshold.
    pub fn min_similarity(&self) -> f32 {
        self.min_similarity
    }

    /// Token ceiling for a merged node.
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    fn embed(&self, nodes: &[Node]) -> Result<Vec<Vec<f32>>> {
        let texts: Vec<&str> = nodes.iter().map(Node::text).collect();
        let vectors = self.client.embed_many(&texts)?;
        validate_embeddings(texts.len(), &vectors)?;
        Ok(vectors)
    }

    /// Similarity of each node to its predecessor; the first entry is `0`.
    ///
    /// Nodes are taken in the order given. Useful for choosing a threshold
    /// for a corpus before running the merge.
    pub fn neighbor_similarities(&self, nodes: &[Node]) -> Result<Vec<f32>> {
        if nodes.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self.embed(nodes)?;
        let mut similarities = Vec::with_capacity(nodes.len());
        similarities.push(0.0);
        similarities.extend(vectors.windows(2).map(|w| cosine_similarity(&w[0], &w[1])));
        Ok(similarities)
    }

    /// One outer pass over freshly embedded nodes. Returns the merge count.
    fn pass(&self, nodes: &mut Vec<Node>) -> Result<usize> {
        let mut vectors = self.embed(nodes)?;
        let mut merges = 0;
        let mut i = 0;
        while i + 1 < nodes.len() {
            let similarity = cosine_similarity(&vectors[i], &vectors[i + 1]);
            let combined = nodes[i].tokens() + nodes[i + 1].tokens();
            if similarity >= self.min_similarity && combined <= self.max_tokens {
                let next = nodes.remove(i + 1);
                vectors.remove(i + 1);
                nodes[i].absorb(next);
                merges += 1;
                continue;
            }
            i += 1;
        }
        Ok(merges)
    }
}

impl ProcessingStep for CombineNodesSemantically {
    fn process(&self, mut nodes: Vec<Node>) -> Result<Vec<Node>> {
        let mut pass = 0;
        loop {
            sort_nodes(&mut nodes);
            if nodes.len() < 2 {
                break;
            }
            pass += 1;
            let before = nodes.len();
            let merges = self.pass(&mut nodes)?;
            log::debug!(
                "CombineNodesSemantically pass {} ({}): {} -> {} nodes",
                pass,
                self.client.name(),
                before,
                nodes.len()
            );
            if merges == 0 {
                break;
            }
        }
        Ok(nodes)
    }

    fn name(&self) -> &'static str {
        "CombineNodesSemantically"
    }
}
