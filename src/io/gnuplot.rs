//! Gnuplot script emission for labeled clouds.
//!
//! Produces self-contained scripts: a `plot` (2D) or ranged `splot` (3D)
//! command listing one inline data block per visible group — noise first,
//! then every non-empty cluster with a deterministic colour derived from
//! its index. Overlap clusters are titled with their id set so shared
//! points are recognisable in the plot.

use std::io::Write;

use crate::cluster::ClusterGroup;
use crate::core::{Point, PointCloud};

/// Deterministic RGB colour for a cluster index.
pub fn cluster_colour(cluster_index: usize) -> u32 {
    let r = ((cluster_index * 23) % 19) as f64 / 18.0;
    let g = ((cluster_index * 23) % 7) as f64 / 6.0;
    let b = ((cluster_index * 23) % 3) as f64 / 2.0;
    let r = (r * 255.0) as u32;
    let g = (g * 255.0) as u32;
    let b = (b * 255.0) as u32;
    (r << 16) | (g << 8) | b
}

/// Componentwise bounding box of a non-empty cloud.
fn bounds(cloud: &PointCloud) -> (Point, Point) {
    let mut min = cloud[0].clone();
    let mut max = cloud[0].clone();
    for p in cloud {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        min.z = min.z.min(p.z);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
        max.z = max.z.max(p.z);
    }
    (min, max)
}

/// `set xrange …` header for 3D plots; degenerate axes are widened by one
/// unit on each side so gnuplot accepts the range.
fn write_range_header<W: Write>(w: &mut W, cloud: &PointCloud) -> std::io::Result<()> {
    let (min, max) = bounds(cloud);
    for (axis, lo, hi) in [
        ("x", min.x, max.x),
        ("y", min.y, max.y),
        ("z", min.z, max.z),
    ] {
        if hi > lo {
            writeln!(w, "set {axis}range [{lo:.6}:{hi:.6}]")?;
        } else {
            writeln!(w, "set {axis}range [{:.6}:{:.6}]", lo - 1.0, hi + 1.0)?;
        }
    }
    Ok(())
}

fn write_point_row<W: Write>(w: &mut W, point: &Point, is2d: bool) -> std::io::Result<()> {
    if is2d {
        writeln!(w, "{:.6} {:.6}", point.x, point.y)
    } else {
        writeln!(w, "{:.6} {:.6} {:.6}", point.x, point.y, point.z)
    }
}

/// Write the clustered cloud as a gnuplot script.
///
/// Noise points are those whose cluster-id set is empty; every labeled
/// point sits in exactly one cluster block (overlap points in their
/// overlap cluster's block).
pub fn write_clusters_gnuplot<W: Write>(
    w: &mut W,
    cloud: &PointCloud,
    group: &ClusterGroup,
) -> std::io::Result<()> {
    let is2d = cloud.is2d();
    let noise: Vec<usize> = (0..cloud.len())
        .filter(|&i| cloud[i].cluster_ids.is_empty())
        .collect();

    let mut series: Vec<String> = Vec::new();
    if !noise.is_empty() {
        series.push("'-' with points lc 'red' title 'noise'".to_string());
    }
    for (cluster_index, cluster) in group.iter().enumerate() {
        // A drained cluster survives only through its overlap cluster.
        if cluster.is_empty() {
            continue;
        }
        let colour = cluster_colour(cluster_index);
        let ids = &cloud[cluster[0]].cluster_ids;
        let title = if ids.len() > 1 {
            let joined: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
            format!("overlap {}", joined.join(";"))
        } else {
            format!("curve {}", ids.iter().next().copied().unwrap_or(cluster_index))
        };
        series.push(format!("'-' with points lc '#{colour:06x}' title '{title}'"));
    }

    if !is2d {
        write_range_header(w, cloud)?;
        writeln!(w, "splot {}", series.join(", "))?;
    } else {
        writeln!(w, "plot {}", series.join(", "))?;
    }

    if !noise.is_empty() {
        for &i in &noise {
            write_point_row(w, &cloud[i], is2d)?;
        }
        writeln!(w, "e")?;
    }
    for cluster in group {
        if cluster.is_empty() {
            continue;
        }
        for &i in cluster {
            write_point_row(w, &cloud[i], is2d)?;
        }
        writeln!(w, "e")?;
    }
    writeln!(w, "pause mouse keypress")?;
    Ok(())
}

/// Original-vs-smoothed overlay script, for smoothing diagnostics.
pub fn write_smoothing_gnuplot<W: Write>(
    w: &mut W,
    cloud: &PointCloud,
    smoothed: &PointCloud,
) -> std::io::Result<()> {
    let is2d = cloud.is2d();
    if !is2d {
        write_range_header(w, cloud)?;
        write!(w, "splot ")?;
    } else {
        write!(w, "plot ")?;
    }
    writeln!(
        w,
        "'-' with points lc 'black' title 'original', '-' with points lc 'red' title 'smoothed'"
    )?;

    for point in cloud {
        write_point_row(w, point, is2d)?;
    }
    writeln!(w, "e")?;
    for point in smoothed {
        write_point_row(w, point, is2d)?;
    }
    writeln!(w, "e")?;
    writeln!(w, "pause mouse keypress")?;
    Ok(())
}
