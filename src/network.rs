//! The static social contact graph.
//!
//! Friendships are durable, symmetric ties between people that exist independently of where
//! anyone happens to be. The graph is generated once per world with a small-world
//! (Watts–Strogatz) construction and never changes during a run. When the requested lattice
//! cannot be built for the population size, a sparse random (Erdős–Rényi) graph is used instead.

use std::collections::BTreeSet;

use log::{debug, warn};

use crate::error::EpinetError;
use crate::person::PersonId;
use crate::random::SimRng;

/// Edge probability of the random-graph fallback.
pub const FALLBACK_EDGE_PROB: f64 = 0.05;

/// An undirected simple graph over person indices.
#[derive(Clone, Debug, Default)]
pub struct SocialGraph {
    // Ordered sets keep neighbor iteration deterministic.
    adjacency: Vec<BTreeSet<usize>>,
}

impl SocialGraph {
    #[must_use]
    pub fn new(node_count: usize) -> Self {
        SocialGraph {
            adjacency: vec![BTreeSet::new(); node_count],
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(BTreeSet::len).sum::<usize>() / 2
    }

    fn check_node(&self, person: PersonId) -> Result<(), EpinetError> {
        if person.0 >= self.adjacency.len() {
            return Err(EpinetError::GraphError(format!(
                "person {person} is not in a graph of {} people",
                self.adjacency.len()
            )));
        }
        Ok(())
    }

    /// Adds an undirected edge.
    ///
    /// # Errors
    ///
    /// Returns an `EpinetError::GraphError` for self-loops, duplicate edges, or people outside
    /// the graph.
    pub fn add_edge_bidi(&mut self, person1: PersonId, person2: PersonId) -> Result<(), EpinetError> {
        self.check_node(person1)?;
        self.check_node(person2)?;
        if person1 == person2 {
            return Err(EpinetError::GraphError(String::from(
                "Cannot make edge to self",
            )));
        }
        if self.has_edge(person1, person2) {
            return Err(EpinetError::GraphError(String::from("Edge already exists")));
        }
        self.adjacency[person1.0].insert(person2.0);
        self.adjacency[person2.0].insert(person1.0);
        Ok(())
    }

    /// Removes an undirected edge.
    ///
    /// # Errors
    ///
    /// Returns an `EpinetError::GraphError` if the edge does not exist.
    pub fn remove_edge_bidi(
        &mut self,
        person1: PersonId,
        person2: PersonId,
    ) -> Result<(), EpinetError> {
        if !self.has_edge(person1, person2) {
            return Err(EpinetError::GraphError(String::from("Edge does not exist")));
        }
        self.adjacency[person1.0].remove(&person2.0);
        self.adjacency[person2.0].remove(&person1.0);
        Ok(())
    }

    #[must_use]
    pub fn has_edge(&self, person1: PersonId, person2: PersonId) -> bool {
        self.adjacency
            .get(person1.0)
            .is_some_and(|neighbors| neighbors.contains(&person2.0))
    }

    #[must_use]
    pub fn degree(&self, person: PersonId) -> usize {
        self.adjacency.get(person.0).map_or(0, BTreeSet::len)
    }

    /// One neighbor list per person, indexed by person id.
    #[must_use]
    pub fn into_neighbor_lists(self) -> Vec<Vec<PersonId>> {
        self.adjacency
            .into_iter()
            .map(|neighbors| neighbors.into_iter().map(PersonId).collect())
            .collect()
    }
}

/// A Watts–Strogatz small-world graph: a ring lattice where every node is joined to its
/// `k / 2` nearest neighbors on each side, after which each lattice edge `(u, u + j)` is
/// rewired with probability `rewire_prob` to a uniformly chosen node that `u` is not yet joined
/// to.
///
/// # Errors
///
/// Returns an `EpinetError::GraphError` if `k >= n`, where no proper lattice exists.
pub fn small_world_graph(
    n: usize,
    k: usize,
    rewire_prob: f64,
    rng: &mut SimRng,
) -> Result<SocialGraph, EpinetError> {
    if k >= n {
        return Err(EpinetError::GraphError(format!(
            "small-world graph needs k < n (k={k}, n={n})"
        )));
    }
    let mut graph = SocialGraph::new(n);
    let half = k / 2;
    for j in 1..=half {
        for u in 0..n {
            graph.add_edge_bidi(PersonId(u), PersonId((u + j) % n))?;
        }
    }

    let nodes: Vec<usize> = (0..n).collect();
    for j in 1..=half {
        for u in 0..n {
            let (pu, pv) = (PersonId(u), PersonId((u + j) % n));
            if !rng.sample_bool(rewire_prob) {
                continue;
            }
            let Some(&first) = rng.choose(&nodes) else {
                continue;
            };
            let mut w = PersonId(first);
            let mut saturated = false;
            while w == pu || graph.has_edge(pu, w) {
                if let Some(&next) = rng.choose(&nodes) {
                    w = PersonId(next);
                }
                if graph.degree(pu) >= n - 1 {
                    saturated = true;
                    break;
                }
            }
            if saturated || !graph.has_edge(pu, pv) {
                continue;
            }
            graph.remove_edge_bidi(pu, pv)?;
            graph.add_edge_bidi(pu, w)?;
        }
    }
    Ok(graph)
}

/// A G(n, p) random graph: every unordered pair is joined independently with probability `p`.
///
/// # Errors
///
/// Propagates any `EpinetError::GraphError` from adding an edge.
pub fn random_graph(n: usize, p: f64, rng: &mut SimRng) -> Result<SocialGraph, EpinetError> {
    let mut graph = SocialGraph::new(n);
    for u in 0..n {
        for v in (u + 1)..n {
            if rng.sample_bool(p) {
                graph.add_edge_bidi(PersonId(u), PersonId(v))?;
            }
        }
    }
    Ok(graph)
}

/// Builds the social contact graph for `n` people, falling back to a random graph when the
/// small-world parameters are infeasible.
pub fn generate_contact_graph(
    n: usize,
    k: usize,
    rewire_prob: f64,
    rng: &mut SimRng,
) -> SocialGraph {
    let graph = match small_world_graph(n, k, rewire_prob, rng) {
        Ok(graph) => graph,
        Err(e) => {
            warn!("{e}; falling back to a random graph (p={FALLBACK_EDGE_PROB})");
            random_graph(n, FALLBACK_EDGE_PROB, rng).unwrap_or_else(|e| {
                warn!("{e}; leaving the contact graph empty");
                SocialGraph::new(n)
            })
        }
    };
    debug!(
        "contact graph: {} people, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_symmetric(graph: &SocialGraph) {
        let lists = graph.clone().into_neighbor_lists();
        for (u, neighbors) in lists.iter().enumerate() {
            assert_eq!(neighbors.len(), graph.degree(PersonId(u)));
            for &v in neighbors {
                assert!(graph.has_edge(v, PersonId(u)), "{u} -> {v} not mirrored");
                assert_ne!(v, PersonId(u));
            }
        }
    }

    #[test]
    fn add_edge_rejects_self_and_duplicates() {
        let mut graph = SocialGraph::new(3);
        graph.add_edge_bidi(PersonId(0), PersonId(1)).unwrap();
        assert!(matches!(
            graph.add_edge_bidi(PersonId(1), PersonId(0)),
            Err(EpinetError::GraphError(_))
        ));
        assert!(graph.add_edge_bidi(PersonId(2), PersonId(2)).is_err());
        assert!(graph.add_edge_bidi(PersonId(2), PersonId(7)).is_err());
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn remove_edge() {
        let mut graph = SocialGraph::new(3);
        graph.add_edge_bidi(PersonId(0), PersonId(2)).unwrap();
        graph.remove_edge_bidi(PersonId(2), PersonId(0)).unwrap();
        assert!(!graph.has_edge(PersonId(0), PersonId(2)));
        assert!(graph.remove_edge_bidi(PersonId(0), PersonId(2)).is_err());
    }

    #[test]
    fn ring_lattice_without_rewiring() {
        let mut rng = SimRng::new(42);
        let graph = small_world_graph(20, 4, 0.0, &mut rng).unwrap();
        assert_eq!(graph.edge_count(), 40);
        assert!((0..20).all(|u| graph.degree(PersonId(u)) == 4));
        assert!(graph.has_edge(PersonId(0), PersonId(19)));
        assert!(graph.has_edge(PersonId(0), PersonId(2)));
        assert!(!graph.has_edge(PersonId(0), PersonId(3)));
    }

    #[test]
    fn rewiring_preserves_edge_count_and_symmetry() {
        let mut rng = SimRng::new(7);
        let graph = small_world_graph(500, 5, 0.1, &mut rng).unwrap();
        // k = 5 gives two lattice neighbors per side.
        assert_eq!(graph.edge_count(), 1000);
        assert_symmetric(&graph);
    }

    #[test]
    fn random_graph_is_simple() {
        let mut rng = SimRng::new(11);
        let graph = random_graph(80, 0.2, &mut rng).unwrap();
        let degree_sum: usize = (0..80).map(|u| graph.degree(PersonId(u))).sum();
        assert_eq!(degree_sum, 2 * graph.edge_count());
        assert!(graph.edge_count() > 0);
        assert_symmetric(&graph);
    }

    #[test]
    fn dense_rewiring_stays_simple() {
        // Near-complete lattice: most rewiring targets are already neighbors.
        let mut rng = SimRng::new(5);
        let graph = small_world_graph(9, 8, 1.0, &mut rng).unwrap();
        assert_eq!(graph.edge_count(), 36);
        assert_symmetric(&graph);
    }

    #[test]
    fn infeasible_lattice_is_error() {
        let mut rng = SimRng::new(1);
        assert!(small_world_graph(5, 5, 0.1, &mut rng).is_err());
        assert!(small_world_graph(3, 10, 0.1, &mut rng).is_err());
    }

    #[test]
    fn fallback_graph_is_symmetric() {
        let mut rng = SimRng::new(3);
        let graph = generate_contact_graph(60, 80, 0.1, &mut rng);
        assert_eq!(graph.node_count(), 60);
        assert!(graph.edge_count() > 0);
        assert_symmetric(&graph);
    }

    #[test]
    fn same_seed_same_graph() {
        let a = generate_contact_graph(200, 6, 0.3, &mut SimRng::new(9)).into_neighbor_lists();
        let b = generate_contact_graph(200, 6, 0.3, &mut SimRng::new(9)).into_neighbor_lists();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_population() {
        let graph = generate_contact_graph(0, 5, 0.1, &mut SimRng::new(0));
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }
}
