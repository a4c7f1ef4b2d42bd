//! Conjunction clustering: collapse tightly conjunct bodies into one node.

use crate::aspects::circular_mean;
use crate::ephemeris::PositionMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque handle for one cluster within a [`ConjunctionClusters`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClusterId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: ClusterId,
    /// Members in ascending longitude; the first is the anchor
    pub members: Vec<String>,
    /// Circular mean of the member longitudes
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConjunctionClusters {
    clusters: Vec<Cluster>,
    anchor: HashMap<String, ClusterId>,
}

impl ConjunctionClusters {
    /// Chain-link `members` whose successive longitude gaps are within `orb`.
    ///
    /// Members absent from `positions` are skipped. A chain running across 0°
    /// is joined into a single cluster.
    pub fn build<'a, I>(positions: &PositionMap, members: I, orb: f64) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut sorted: Vec<(&str, f64)> = members
            .into_iter()
            .filter_map(|m| positions.get(m).map(|lon| (m, lon)))
            .collect();
        sorted.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        sorted.dedup_by(|a, b| a.0 == b.0);

        let mut groups: Vec<Vec<(&str, f64)>> = Vec::new();
        for (name, lon) in sorted {
            let chained = groups
                .last()
                .and_then(|current| current.last())
                .is_some_and(|(_, prev)| lon - prev <= orb);
            match groups.last_mut() {
                Some(current) if chained => current.push((name, lon)),
                _ => {
                    groups.push(vec![(name, lon)]);
                }
            }
        }

        if groups.len() > 1 {
            let first_lon = groups[0][0].1;
            let last_lon = groups[groups.len() - 1]
                .last()
                .map(|(_, lon)| *lon)
                .unwrap_or(first_lon);
            if first_lon + 360.0 - last_lon <= orb {
                if let Some(mut tail) = groups.pop() {
                    tail.extend(groups[0].drain(..));
                    groups[0] = tail;
                }
            }
        }

        let mut clusters = Vec::with_capacity(groups.len());
        let mut anchor = HashMap::new();
        for (idx, group) in groups.into_iter().enumerate() {
            let id = ClusterId(idx);
            let longitudes: Vec<f64> = group.iter().map(|(_, lon)| *lon).collect();
            let members: Vec<String> = group.iter().map(|(name, _)| name.to_string()).collect();
            for member in &members {
                anchor.insert(member.clone(), id);
            }
            clusters.push(Cluster {
                id,
                members,
                longitude: circular_mean(&longitudes).unwrap_or(0.0),
            });
        }

        let merged = clusters.iter().filter(|c| c.members.len() > 1).count();
        if merged > 0 {
            log::trace!(
                "Conjunction clustering: {} members -> {} clusters ({} multi-body)",
                anchor.len(),
                clusters.len(),
                merged
            );
        }

        Self { clusters, anchor }
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ClusterId> + '_ {
        self.clusters.iter().map(|c| c.id)
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// The cluster a member was folded into.
    pub fn rep_of(&self, member: &str) -> Option<ClusterId> {
        self.anchor.get(member).copied()
    }

    pub fn members_of(&self, id: ClusterId) -> &[String] {
        self.clusters
            .get(id.0)
            .map(|c| c.members.as_slice())
            .unwrap_or(&[])
    }

    pub fn longitude(&self, id: ClusterId) -> Option<f64> {
        self.clusters.get(id.0).map(|c| c.longitude)
    }

    /// Expand cluster handles back to the original bodies, in the given order.
    pub fn expand(&self, ids: &[ClusterId]) -> Vec<String> {
        ids.iter()
            .flat_map(|id| self.members_of(*id).iter().cloned())
            .collect()
    }
}
