//! Spatial deduplication of candidate points
//!
//! Density-based connectivity with a minimum cluster size of one: two points
//! are directly connected when their Euclidean distance is at most `eps`, and a
//! cluster is the transitive closure of that relation. There is no noise
//! category; every point lands in exactly one cluster.
//!
//! Connected components are built with union-find. Candidate pairs come from a
//! uniform grid whose cells are at least `eps` wide, so each point is only
//! compared against the 3x3 block of cells around it.

use super::config::DEFAULT_CLUSTER_RADIUS;
use super::types::CandidatePoint;
use std::collections::HashMap;

/// Disjoint-set forest with path halving and union by size.
struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        let (big, small) = if self.size[ra] >= self.size[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[small] = big;
        self.size[big] += self.size[small];
    }
}

#[derive(Debug, Clone)]
pub struct ClusterDeduplicator {
    eps: f64,
}

impl Default for ClusterDeduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_CLUSTER_RADIUS)
    }
}

impl ClusterDeduplicator {
    pub fn new(eps: f64) -> Self {
        Self { eps }
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Cluster label per input point. Labels are dense and numbered in order
    /// of each cluster's first member, so label 0 is the first point's cluster.
    pub fn labels(&self, points: &[CandidatePoint]) -> Vec<usize> {
        let mut sets = DisjointSet::new(points.len());

        if self.eps >= 0.0 && self.eps.is_finite() {
            let eps_sq = self.eps * self.eps;
            let cell = self.eps.ceil().max(1.0) as u64;
            let mut grid: HashMap<(u64, u64), Vec<usize>> = HashMap::new();

            for (i, p) in points.iter().enumerate() {
                let (cx, cy) = (p.x as u64 / cell, p.y as u64 / cell);
                for nx in cx.saturating_sub(1)..=cx + 1 {
                    for ny in cy.saturating_sub(1)..=cy + 1 {
                        let Some(bucket) = grid.get(&(nx, ny)) else {
                            continue;
                        };
                        for &j in bucket {
                            if p.distance_squared(&points[j]) as f64 <= eps_sq {
                                sets.union(i, j);
                            }
                        }
                    }
                }
                grid.entry((cx, cy)).or_default().push(i);
            }
        }

        let mut label_of_root: Vec<Option<usize>> = vec![None; points.len()];
        let mut next_label = 0;
        (0..points.len())
            .map(|i| {
                let root = sets.find(i);
                *label_of_root[root].get_or_insert_with(|| {
                    next_label += 1;
                    next_label - 1
                })
            })
            .collect()
    }

    /// One representative per cluster: its first member in input order.
    /// Output order follows the order in which clusters were first seen.
    pub fn deduplicate(&self, points: &[CandidatePoint]) -> Vec<CandidatePoint> {
        let labels = self.labels(points);
        let mut seen = vec![false; labels.len()];
        let representatives: Vec<CandidatePoint> = points
            .iter()
            .zip(&labels)
            .filter_map(|(p, &label)| {
                if seen[label] {
                    None
                } else {
                    seen[label] = true;
                    Some(*p)
                }
            })
            .collect();

        log::debug!(
            "🧮 Collapsed {} candidate(s) into {} cluster(s) (eps={})",
            points.len(),
            representatives.len(),
            self.eps
        );
        representatives
    }
}

/// Deduplicate with the default radius.
pub fn deduplicate(points: &[CandidatePoint]) -> Vec<CandidatePoint> {
    ClusterDeduplicator::default().deduplicate(points)
}
