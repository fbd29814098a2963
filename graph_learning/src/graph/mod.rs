mod propagate;

pub use propagate::Compute;

use crate::{MlErr, Result};

/// A directed graph over the nodes `0..num_nodes`, stored as an edge list.
///
/// The edge list is append-only: the only mutation allowed after construction
/// is `add_self_loops`, which can be applied once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    num_nodes: usize,
    src: Vec<usize>,
    dst: Vec<usize>,
    self_loops: bool,
}

impl Graph {
    /// Creates a new `Graph`.
    ///
    /// # Arguments
    /// * `num_nodes` - The amount of nodes in the graph.
    /// * `edges` - The `(src, dst)` pairs of the directed edges.
    ///
    /// # Returns
    /// A new `Graph` or an error if an edge references a node out of bounds.
    pub fn new<I>(num_nodes: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let edges = edges.into_iter();
        let (lower, _) = edges.size_hint();
        let mut src = Vec::with_capacity(lower);
        let mut dst = Vec::with_capacity(lower);

        for (u, v) in edges {
            for node in [u, v] {
                if node >= num_nodes {
                    return Err(MlErr::NodeOutOfBounds { node, num_nodes });
                }
            }

            src.push(u);
            dst.push(v);
        }

        Ok(Self {
            num_nodes,
            src,
            dst,
            self_loops: false,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn num_edges(&self) -> usize {
        self.src.len()
    }

    /// Whether `add_self_loops` has been applied.
    pub fn has_self_loops(&self) -> bool {
        self.self_loops
    }

    /// Iterates the `(src, dst)` pairs in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.src.iter().copied().zip(self.dst.iter().copied())
    }

    /// Appends the edge `(v, v)` for every node of the graph, so each node keeps
    /// its own features when aggregating over its neighbourhood.
    ///
    /// # Returns
    /// An error if the self loops were already added, the graph is left untouched.
    pub fn add_self_loops(&mut self) -> Result<()> {
        if self.self_loops {
            return Err(MlErr::SelfLoopsAlreadyAdded);
        }

        self.src.extend(0..self.num_nodes);
        self.dst.extend(0..self.num_nodes);
        self.self_loops = true;
        Ok(())
    }

    /// Counts the incoming edges of every node.
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.num_nodes];

        for &v in &self.dst {
            degrees[v] += 1;
        }

        degrees
    }

    /// Builds the compressed incoming adjacency: for every destination node the
    /// sources of its incoming edges, in insertion order.
    ///
    /// # Returns
    /// A tuple `(offsets, sources)` where the sources of node `v` are
    /// `sources[offsets[v]..offsets[v + 1]]`.
    pub(crate) fn in_adjacency(&self) -> (Vec<usize>, Vec<usize>) {
        let mut offsets = vec![0; self.num_nodes + 1];

        for &v in &self.dst {
            offsets[v + 1] += 1;
        }

        for v in 0..self.num_nodes {
            offsets[v + 1] += offsets[v];
        }

        let mut cursor = offsets.clone();
        let mut sources = vec![0; self.src.len()];

        for (u, v) in self.edges() {
            sources[cursor[v]] = u;
            cursor[v] += 1;
        }

        (offsets, sources)
    }
}
