use geo::{Distance, Geodesic};
use polars::prelude::*;

use crate::error::{GridError, Result};
use crate::geometry::GridCells;
use crate::grid::Grid;
use crate::raster::Point;

/// WGS84 geodesic distance, in meters, from each cell's centroid to its
/// nearest depot. Results are in poly_index order.
///
/// O(cells x depots); at thousands of cells and tens of depots no spatial
/// index is warranted.
pub fn min_depot_distances(cells: &GridCells, depots: &[Point]) -> Result<Vec<f64>> {
    if depots.is_empty() {
        return Err(GridError::NoDepots);
    }
    Ok(cells
        .iter()
        .map(|cell| {
            let center = cell.center();
            let centroid = geo::Point::new(center.x, center.y);
            depots
                .iter()
                .map(|depot| Geodesic.distance(centroid, geo::Point::new(depot.lon, depot.lat)))
                .fold(f64::INFINITY, f64::min)
        })
        .collect())
}

/// Exchange table `(poly_index, distance_km)`, ordered by poly_index.
pub fn depot_distance_table(grid: &Grid, depots: &[Point]) -> anyhow::Result<DataFrame> {
    let meters = min_depot_distances(&grid.cells(), depots)?;
    let poly_index: Vec<u32> = (1..=meters.len() as u32).collect();
    let distance_km: Vec<f64> = meters.iter().map(|m| m / 1000.0).collect();
    Ok(df! {
        "poly_index" => poly_index,
        "distance_km" => distance_km,
    }?)
}
