//! Proximity clustering of live agents

use glam::Vec3;

use crate::core::config::ClusterMode;
use crate::core::types::{horizontal_distance, AgentId};

/// Group agents by proximity
///
/// Every agent lands in exactly one cluster. Input order is preserved inside
/// each cluster and clusters are ordered by their first member.
pub fn cluster_agents(agents: &[(AgentId, Vec3)], distance: f32, mode: ClusterMode) -> Vec<Vec<AgentId>> {
    match mode {
        ClusterMode::SeedRadius => seed_radius(agents, distance),
        ClusterMode::ConnectedComponents => connected_components(agents, distance),
    }
}

/// Each unvisited agent seeds a cluster and takes every unvisited agent
/// within `distance` of the seed
fn seed_radius(agents: &[(AgentId, Vec3)], distance: f32) -> Vec<Vec<AgentId>> {
    let mut visited = vec![false; agents.len()];
    let mut clusters = Vec::new();

    for (i, &(seed_id, seed_pos)) in agents.iter().enumerate() {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        let mut cluster = vec![seed_id];

        for (j, &(id, pos)) in agents.iter().enumerate().skip(i + 1) {
            if !visited[j] && horizontal_distance(seed_pos, pos) <= distance {
                visited[j] = true;
                cluster.push(id);
            }
        }
        clusters.push(cluster);
    }

    clusters
}

/// Disjoint-set forest over agent indices
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
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
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Transitive closure of the within-`distance` relation
fn connected_components(agents: &[(AgentId, Vec3)], distance: f32) -> Vec<Vec<AgentId>> {
    let mut sets = DisjointSet::new(agents.len());
    for i in 0..agents.len() {
        for j in (i + 1)..agents.len() {
            if horizontal_distance(agents[i].1, agents[j].1) <= distance {
                sets.union(i, j);
            }
        }
    }

    let mut root_slot: Vec<Option<usize>> = vec![None; agents.len()];
    let mut clusters: Vec<Vec<AgentId>> = Vec::new();
    for (i, &(id, _)) in agents.iter().enumerate() {
        let root = sets.find(i);
        match root_slot[root] {
            Some(slot) => clusters[slot].push(id),
            None => {
                root_slot[root] = Some(clusters.len());
                clusters.push(vec![id]);
            }
        }
    }

    clusters
}
