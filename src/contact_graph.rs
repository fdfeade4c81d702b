/*!

A `ContactGraph` stores the static potential-contact relationships of a population as
undirected adjacency lists indexed by `PersonId`.

The graph is generated once at setup and never gains edges afterwards. The only mutation is
`remove_node`, which detaches a person from all of their neighbors permanently. Removed
slots stay in place, so a `PersonId` keeps naming the same slot for the whole run and indexes
held by other structures never need to be rewritten.

*/

use log::{debug, trace};
use rand::Rng;

use crate::error::SimError;
use crate::person::PersonId;

/// The underlying storage type representing one adjacency list
type AdjacencyList = Vec<PersonId>;

#[derive(Debug, Clone, Default)]
pub struct ContactGraph {
    adjacency_lists: Vec<AdjacencyList>,
    removed: Vec<bool>,
    live_nodes: usize,
    edge_count: usize,
}

impl ContactGraph {
    /// Creates a graph with `node_count` nodes and no edges.
    #[must_use]
    pub fn with_nodes(node_count: usize) -> Self {
        ContactGraph {
            adjacency_lists: vec![AdjacencyList::new(); node_count],
            removed: vec![false; node_count],
            live_nodes: node_count,
            edge_count: 0,
        }
    }

    /// Generates a G(n, p) random graph in which every pair of distinct nodes is joined
    /// independently with probability `connection_odds`.
    ///
    /// Runs in time proportional to the number of edges using the geometric skipping method
    /// of Batagelj and Brandes, "Efficient generation of large random networks" (2005).
    ///
    /// # Errors
    /// Returns `SimError::InvalidConfig` if `connection_odds` is not in [0, 1].
    pub fn erdos_renyi<R: Rng>(
        node_count: usize,
        connection_odds: f64,
        rng: &mut R,
    ) -> Result<Self, SimError> {
        if !(0.0..=1.0).contains(&connection_odds) {
            return Err(SimError::invalid_config(format!(
                "connection odds must be in [0, 1], got {connection_odds}"
            )));
        }

        let mut graph = ContactGraph::with_nodes(node_count);
        if connection_odds == 0.0 || node_count < 2 {
            return Ok(graph);
        }

        if connection_odds == 1.0 {
            for v in 1..node_count {
                for w in 0..v {
                    graph.push_edge(PersonId::new(v), PersonId::new(w));
                }
            }
        } else {
            // Walk the pairs (v, w), w < v, in order, jumping a geometric number of pairs
            // between edges.
            let log_q = (-connection_odds).ln_1p();
            let pair_count = node_count * (node_count - 1) / 2;
            let (mut v, mut w) = (1_usize, 0_usize);
            while log_q < 0.0 && v < node_count {
                let log_r = (1.0 - rng.random::<f64>()).ln();
                let skip = (log_r / log_q).floor();
                let remaining = pair_count - (v * (v - 1) / 2 + w);
                if skip >= remaining as f64 {
                    break;
                }
                w += skip as usize;
                while w >= v {
                    w -= v;
                    v += 1;
                }
                graph.push_edge(PersonId::new(v), PersonId::new(w));
                w += 1;
                if w == v {
                    w = 0;
                    v += 1;
                }
            }
        }

        debug!(
            "generated contact graph with {} nodes and {} edges (p={})",
            node_count, graph.edge_count, connection_odds
        );
        Ok(graph)
    }

    // Edges produced by the generators are unique by construction.
    fn push_edge(&mut self, a: PersonId, b: PersonId) {
        trace!("adding edge {a} <-> {b}");
        self.adjacency_lists[a.index()].push(b);
        self.adjacency_lists[b.index()].push(a);
        self.edge_count += 1;
    }

    /// Inserts an undirected edge between `a` and `b`.
    ///
    /// # Errors
    /// Returns `SimError::GraphError` for self-edges, duplicate edges and ids that are out of
    /// range or removed.
    pub fn add_edge(&mut self, a: PersonId, b: PersonId) -> Result<(), SimError> {
        if a == b {
            return Err(SimError::GraphError(format!("cannot make edge from {a} to self")));
        }
        for id in [a, b] {
            if !self.contains_node(id) {
                return Err(SimError::GraphError(format!("{id} is not in the graph")));
            }
        }
        if self.has_edge(a, b) {
            return Err(SimError::GraphError(format!("edge {a} <-> {b} already exists")));
        }
        self.push_edge(a, b);
        Ok(())
    }

    #[must_use]
    pub fn has_edge(&self, a: PersonId, b: PersonId) -> bool {
        self.neighbors(a).contains(&b)
    }

    /// The neighbors of `id`. Empty for removed or unknown ids.
    #[must_use]
    pub fn neighbors(&self, id: PersonId) -> &[PersonId] {
        self.adjacency_lists
            .get(id.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn degree(&self, id: PersonId) -> usize {
        self.neighbors(id).len()
    }

    /// True if `id` names a slot that exists and has not been removed.
    #[must_use]
    pub fn contains_node(&self, id: PersonId) -> bool {
        self.removed.get(id.index()).is_some_and(|removed| !removed)
    }

    /// Number of nodes that have not been removed.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.live_nodes
    }

    /// Number of slots ever allocated, including removed ones.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.adjacency_lists.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Iterates the ids of nodes that have not been removed, in id order.
    pub fn nodes(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.removed
            .iter()
            .enumerate()
            .filter_map(|(index, removed)| (!removed).then_some(PersonId::new(index)))
    }

    /// Removes `id` and all of its incident edges. Returns the number of edges removed.
    ///
    /// # Errors
    /// Returns `SimError::GraphError` if `id` is out of range or already removed.
    pub fn remove_node(&mut self, id: PersonId) -> Result<usize, SimError> {
        if !self.contains_node(id) {
            return Err(SimError::GraphError(format!(
                "cannot remove {id}: not in the graph"
            )));
        }
        let neighbors = std::mem::take(&mut self.adjacency_lists[id.index()]);
        for neighbor in &neighbors {
            self.adjacency_lists[neighbor.index()].retain(|other| *other != id);
        }
        self.removed[id.index()] = true;
        self.live_nodes -= 1;
        self.edge_count -= neighbors.len();
        trace!("removed {id} and {} incident edges", neighbors.len());
        Ok(neighbors.len())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    fn p(id: usize) -> PersonId {
        PersonId::new(id)
    }

    #[test]
    fn add_edge_is_undirected() {
        let mut graph = ContactGraph::with_nodes(3);
        graph.add_edge(p(0), p(1)).unwrap();
        assert!(graph.has_edge(p(0), p(1)));
        assert!(graph.has_edge(p(1), p(0)));
        assert!(!graph.has_edge(p(0), p(2)));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn add_edge_errors() {
        let mut graph = ContactGraph::with_nodes(3);
        graph.add_edge(p(0), p(1)).unwrap();
        assert!(matches!(graph.add_edge(p(0), p(0)), Err(SimError::GraphError(_))));
        assert!(matches!(graph.add_edge(p(1), p(0)), Err(SimError::GraphError(_))));
        assert!(matches!(graph.add_edge(p(0), p(7)), Err(SimError::GraphError(_))));
    }

    #[test]
    fn remove_node_detaches_neighbors() {
        let mut graph = ContactGraph::with_nodes(4);
        graph.add_edge(p(0), p(1)).unwrap();
        graph.add_edge(p(0), p(2)).unwrap();
        graph.add_edge(p(2), p(3)).unwrap();

        assert_eq!(graph.remove_node(p(0)).unwrap(), 2);
        assert!(!graph.contains_node(p(0)));
        assert!(graph.neighbors(p(0)).is_empty());
        assert!(graph.neighbors(p(1)).is_empty());
        assert_eq!(graph.neighbors(p(2)), &[p(3)]);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.slot_count(), 4);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.nodes().collect::<Vec<_>>(), vec![p(1), p(2), p(3)]);

        // Removal is permanent and cannot be repeated.
        assert!(graph.remove_node(p(0)).is_err());
        assert!(graph.add_edge(p(0), p(3)).is_err());
    }

    #[test]
    fn erdos_renyi_complete_and_empty() {
        let mut rng = SmallRng::seed_from_u64(0);
        let complete = ContactGraph::erdos_renyi(10, 1.0, &mut rng).unwrap();
        assert_eq!(complete.edge_count(), 45);
        assert!(complete.nodes().all(|id| complete.degree(id) == 9));

        let empty = ContactGraph::erdos_renyi(10, 0.0, &mut rng).unwrap();
        assert_eq!(empty.edge_count(), 0);
        assert_eq!(empty.node_count(), 10);
    }

    #[test]
    fn erdos_renyi_tiny_odds() {
        let mut rng = SmallRng::seed_from_u64(1);
        for odds in [1e-17, 1e-300, f64::MIN_POSITIVE] {
            let graph = ContactGraph::erdos_renyi(50, odds, &mut rng).unwrap();
            assert_eq!(graph.node_count(), 50);
            assert_eq!(graph.edge_count(), 0);
        }
    }

    #[test]
    fn erdos_renyi_near_certain_odds() {
        let mut rng = SmallRng::seed_from_u64(5);
        let graph = ContactGraph::erdos_renyi(40, 1.0 - 1e-12, &mut rng).unwrap();
        assert_eq!(graph.edge_count(), 40 * 39 / 2);
    }

    #[test]
    fn erdos_renyi_rejects_bad_odds() {
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(ContactGraph::erdos_renyi(10, 1.5, &mut rng).is_err());
        assert!(ContactGraph::erdos_renyi(10, -0.1, &mut rng).is_err());
    }

    #[test]
    fn erdos_renyi_edge_density() {
        let mut rng = SmallRng::seed_from_u64(42);
        let n = 2000;
        let odds = 0.01;
        let graph = ContactGraph::erdos_renyi(n, odds, &mut rng).unwrap();
        let expected = odds * (n * (n - 1) / 2) as f64;
        approx::assert_relative_eq!(graph.edge_count() as f64, expected, max_relative = 0.05);

        // No self-edges and no duplicates.
        for id in graph.nodes() {
            let neighbors = graph.neighbors(id);
            assert!(!neighbors.contains(&id));
            let mut sorted = neighbors.to_vec();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), neighbors.len());
        }
    }

    #[test]
    fn erdos_renyi_is_deterministic() {
        let a = ContactGraph::erdos_renyi(300, 0.05, &mut SmallRng::seed_from_u64(9)).unwrap();
        let b = ContactGraph::erdos_renyi(300, 0.05, &mut SmallRng::seed_from_u64(9)).unwrap();
        for id in a.nodes() {
            assert_eq!(a.neighbors(id), b.neighbors(id));
        }
    }
}
