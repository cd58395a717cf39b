//! CSV ingest and emission.
//!
//! Input rows are `x<delim>y[<delim>z[<delim>…]]`; two-column rows are 2D
//! points with z = 0, extra columns are ignored. Lines starting with `#`
//! and blank lines are skipped and do not advance point indices. A file
//! must be uniformly 2D or 3D.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::core::{Point, PointCloud};
use crate::error::{Error, Result};

/// Load a point cloud from a delimited text file.
///
/// `skip` leading lines are dropped unconditionally (headers). Point
/// `index` values are assigned in point order, so a chronological file
/// yields chronological indices.
pub fn load_csv<P: AsRef<Path>>(path: P, delimiter: char, skip: usize) -> Result<PointCloud> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut cloud = PointCloud::new();
    let mut rows_2d = 0usize;
    let mut row = 0usize;

    for line in reader.lines() {
        let line = line?;
        row += 1;
        if row <= skip {
            continue;
        }
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }

        let mut items: Vec<&str> = line.split(delimiter).collect();
        if items.len() < 2 {
            return Err(Error::TooFewColumns { row });
        }
        if items.len() == 2 {
            items.push("0");
            rows_2d += 1;
        }

        let mut coords = [0.0f64; 3];
        for (column, item) in items.iter().take(3).enumerate() {
            coords[column] = item.trim().parse().map_err(|_| Error::InvalidNumber {
                row,
                column: column + 1,
                value: (*item).to_string(),
            })?;
        }

        let index = cloud.len();
        cloud.push(Point::with_index(coords[0], coords[1], coords[2], index));
    }

    if rows_2d > 0 && rows_2d != cloud.len() {
        return Err(Error::MixedDimensions);
    }
    if rows_2d > 0 {
        cloud.set_2d(true);
    }
    Ok(cloud)
}

/// Write the labeled cloud as CSV: `x,y[,z],id;id;…`, with `-1` for
/// points whose id set is empty (noise).
pub fn write_clusters_csv<W: Write>(w: &mut W, cloud: &PointCloud) -> std::io::Result<()> {
    let is2d = cloud.is2d();
    writeln!(w, "# Comment: curveID -1 represents noise")?;
    writeln!(w, "# x, y, z, curveID")?;

    for point in cloud {
        write!(w, "{:.6},{:.6},", point.x, point.y)?;
        if !is2d {
            write!(w, "{:.6},", point.z)?;
        }
        if point.cluster_ids.is_empty() {
            writeln!(w, "-1")?;
        } else {
            let ids: Vec<String> = point.cluster_ids.iter().map(|id| id.to_string()).collect();
            writeln!(w, "{}", ids.join(";"))?;
        }
    }
    Ok(())
}

/// Debug dump of a (smoothed) cloud as plain CSV coordinates.
pub fn write_cloud_csv<W: Write>(w: &mut W, cloud: &PointCloud) -> std::io::Result<()> {
    let is2d = cloud.is2d();
    writeln!(w, "# x,y,z")?;
    for point in cloud {
        if is2d {
            writeln!(w, "{:.6},{:.6}", point.x, point.y)?;
        } else {
            writeln!(w, "{:.6},{:.6},{:.6}", point.x, point.y, point.z)?;
        }
    }
    Ok(())
}
