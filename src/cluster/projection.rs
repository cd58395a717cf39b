//! Pruning, triplet-to-point projection, and cluster-id writeback.

use std::collections::HashMap;

use log::debug;

use crate::cluster::ClusterGroup;
use crate::core::PointCloud;
use crate::triplet::Triplet;

/// Remove clusters with fewer than `min_triplets` members.
///
/// Applied to triplet-index clusters, before projection, so the threshold
/// counts triplets rather than points.
pub fn prune_small_clusters(group: &mut ClusterGroup, min_triplets: usize) {
    let old_size = group.len();
    group.retain(|cluster| cluster.len() >= min_triplets);
    debug!("pruning removed {} clusters", old_size - group.len());
}

/// Replace each triplet-index cluster with the sorted, deduplicated union
/// of its member triplets' point indices.
pub fn clusters_to_point_indices(triplets: &[Triplet], group: &mut ClusterGroup) {
    for cluster in group.iter_mut() {
        let mut point_indices: Vec<usize> = cluster
            .iter()
            .flat_map(|&t| [triplets[t].a, triplets[t].b, triplets[t].c])
            .collect();
        point_indices.sort_unstable();
        point_indices.dedup();
        *cluster = point_indices;
    }
}

/// Write each cluster's id into its member points' id sets.
///
/// With `extract_overlap`, points that ended up in more than one cluster
/// are moved out of their clusters into overlap clusters appended to the
/// group, one per distinct id set, in first-encounter order. Point labels
/// themselves are untouched; the overlap clusters exist so that rendering
/// can show shared points separately.
pub fn assign_cluster_ids(cloud: &mut PointCloud, group: &mut ClusterGroup, extract_overlap: bool) {
    for (id, cluster) in group.iter().enumerate() {
        for &point_index in cluster {
            cloud[point_index].cluster_ids.insert(id);
        }
    }

    if !extract_overlap {
        return;
    }

    // Group shared points by their exact id set; the sorted id sequence is
    // the key, so equal memberships always collide.
    let mut overlap_clusters: Vec<Vec<usize>> = Vec::new();
    let mut by_id_set: HashMap<Vec<usize>, usize> = HashMap::new();

    for i in 0..cloud.len() {
        if cloud[i].cluster_ids.len() <= 1 {
            continue;
        }
        let key: Vec<usize> = cloud[i].cluster_ids.iter().copied().collect();

        let slot = *by_id_set.entry(key.clone()).or_insert_with(|| {
            overlap_clusters.push(Vec::new());
            overlap_clusters.len() - 1
        });
        overlap_clusters[slot].push(i);

        for &id in &key {
            group[id].retain(|&p| p != i);
        }
    }
    group.extend(overlap_clusters);
}
