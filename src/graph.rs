//! Euclidean minimum spanning tree and gap splitting of point clusters.
//!
//! A cluster that the triplet metric cannot separate (collinear segments of
//! the same line, for instance) may still contain spatial gaps. The
//! splitter builds the complete graph on the cluster's points weighted by
//! squared Euclidean distance, extracts its MST, removes every edge longer
//! than the gap threshold, and re-emits the connected components.
//!
//! Kruskal with union-by-replacement is sufficient here: clusters are
//! small compared to the full cloud, and the edge sort dominates anyway.

use crate::cluster::{Cluster, ClusterGroup};
use crate::core::PointCloud;

/// An edge between two cluster-local vertex ids.
#[derive(Clone, Copy, Debug)]
struct Edge {
    src: usize,
    dest: usize,
    /// Squared Euclidean distance between the endpoints.
    weight: f64,
}

/// Complete-graph edges over the cluster's points, ascending by weight.
///
/// Distances are measured on `cloud` in input coordinates.
fn create_edges(cloud: &PointCloud, cluster: &Cluster) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(cluster.len() * cluster.len().saturating_sub(1) / 2);
    for vertex1 in 0..cluster.len() {
        for vertex2 in (vertex1 + 1)..cluster.len() {
            let p = &cloud[cluster[vertex1]];
            let q = &cloud[cluster[vertex2]];
            edges.push(Edge {
                src: vertex1,
                dest: vertex2,
                weight: (q - p).squared_norm(),
            });
        }
    }
    edges.sort_by(|a, b| a.weight.partial_cmp(&b.weight).unwrap());
    edges
}

/// Kruskal over pre-sorted edges; group membership by replacement.
fn minimum_spanning_tree(edges: &[Edge], vertex_count: usize) -> Vec<Edge> {
    let mut groups: Vec<usize> = (0..vertex_count).collect();
    let mut mst_edges = Vec::with_capacity(vertex_count.saturating_sub(1));

    for edge in edges {
        let group_a = groups[edge.src];
        let group_b = groups[edge.dest];
        if group_a != group_b {
            for g in groups.iter_mut() {
                if *g == group_b {
                    *g = group_a;
                }
            }
            mst_edges.push(*edge);
        }
    }
    mst_edges
}

/// Connected components over an adjacency list, by iterative DFS in
/// ascending start-vertex order. Components carry original point indices.
fn connected_components(
    cluster: &Cluster,
    adjacency: &[Vec<usize>],
) -> Vec<Cluster> {
    let vertex_count = cluster.len();
    let mut visited = vec![false; vertex_count];
    let mut components = Vec::new();

    for start in 0..vertex_count {
        if visited[start] {
            continue;
        }
        let mut component = Cluster::new();
        let mut stack = vec![start];
        while let Some(v) = stack.pop() {
            if visited[v] {
                continue;
            }
            visited[v] = true;
            component.push(cluster[v]);
            for &next in &adjacency[v] {
                if !visited[next] {
                    stack.push(next);
                }
            }
        }
        components.push(component);
    }
    components
}

/// Split `cluster` at spatial gaps wider than `max_gap`.
///
/// MST edges with squared weight above `max_gap²` are removed and the
/// resulting components of size ≥ `min_size` are appended to
/// `new_clusters`. If no edge was removed the cluster was not actually
/// split, and every component is kept regardless of size.
pub fn split_at_gaps(
    new_clusters: &mut ClusterGroup,
    cluster: &Cluster,
    cloud: &PointCloud,
    max_gap: f64,
    min_size: usize,
) {
    let vertex_count = cluster.len();
    let edges = create_edges(cloud, cluster);
    let mut mst_edges = minimum_spanning_tree(&edges, vertex_count);

    let before = mst_edges.len();
    let max_gap_squared = max_gap * max_gap;
    mst_edges.retain(|e| e.weight <= max_gap_squared);
    let removed = before - mst_edges.len();

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); vertex_count];
    for edge in &mst_edges {
        adjacency[edge.src].push(edge.dest);
        adjacency[edge.dest].push(edge.src);
    }

    for component in connected_components(cluster, &adjacency) {
        if component.len() >= min_size || removed == 0 {
            new_clusters.push(component);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PointCloud;

    fn gapped_line_cloud() -> (PointCloud, Cluster) {
        // 0..=4 at unit spacing, then a 10-unit gap, then 15..=19.
        let mut coords = Vec::new();
        for i in 0..5 {
            coords.push((i as f64, 0.0, 0.0));
        }
        for i in 15..20 {
            coords.push((i as f64, 0.0, 0.0));
        }
        let cloud = PointCloud::from_coords(&coords);
        let cluster: Cluster = (0..cloud.len()).collect();
        (cloud, cluster)
    }

    #[test]
    fn test_mst_has_vertex_count_minus_one_edges() {
        let (cloud, cluster) = gapped_line_cloud();
        let edges = create_edges(&cloud, &cluster);
        let mst = minimum_spanning_tree(&edges, cluster.len());
        assert_eq!(mst.len(), cluster.len() - 1);

        // The bridge across the gap is the single heaviest MST edge.
        let max_weight = mst.iter().map(|e| e.weight).fold(0.0, f64::max);
        assert_eq!(max_weight, 121.0);
    }

    #[test]
    fn test_split_at_gap() {
        let (cloud, cluster) = gapped_line_cloud();
        let mut result = ClusterGroup::new();
        split_at_gaps(&mut result, &cluster, &cloud, 2.0, 3);

        assert_eq!(result.len(), 2);
        let mut sides: Vec<Vec<usize>> = result
            .iter()
            .map(|c| {
                let mut c = c.clone();
                c.sort_unstable();
                c
            })
            .collect();
        sides.sort();
        assert_eq!(sides[0], vec![0, 1, 2, 3, 4]);
        assert_eq!(sides[1], vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_no_removed_edges_keeps_all_components() {
        let (cloud, cluster) = gapped_line_cloud();
        let mut result = ClusterGroup::new();
        // Gap threshold above the bridge: nothing is removed, so even
        // undersized components (none here) would be kept.
        split_at_gaps(&mut result, &cluster, &cloud, 100.0, 1000);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].len(), cluster.len());
    }

    #[test]
    fn test_small_fragments_are_dropped() {
        // A lone outlier beyond the gap threshold.
        let cloud = PointCloud::from_coords(&[
            (0.0, 0.0, 0.0),
            (1.0, 0.0, 0.0),
            (2.0, 0.0, 0.0),
            (50.0, 0.0, 0.0),
        ]);
        let cluster: Cluster = (0..4).collect();
        let mut result = ClusterGroup::new();
        split_at_gaps(&mut result, &cluster, &cloud, 2.0, 3);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0], vec![0, 1, 2]);
    }

    #[test]
    fn test_gap_split_separation_property() {
        // After splitting, no two points in the same emitted cluster are
        // joined by a removed MST edge.
        let (cloud, cluster) = gapped_line_cloud();
        let mut result = ClusterGroup::new();
        split_at_gaps(&mut result, &cluster, &cloud, 2.0, 3);

        for component in &result {
            for &p in component {
                for &q in component {
                    if p != q {
                        let d2 = (&cloud[p] - &cloud[q]).squared_norm();
                        // All intra-component neighbor hops fit the gap
                        // bound; the 10-unit bridge never joins them.
                        assert!(d2 < 121.0);
                    }
                }
            }
        }
    }
}
