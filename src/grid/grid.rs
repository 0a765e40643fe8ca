use geo::{coord, Rect};
use ndarray::Array2;
use polars::prelude::*;
use wkt::ToWkt;

use super::align::{adjust_span, end_index, start_index};
use crate::error::{GridError, Result};
use crate::geometry::GridCells;
use crate::raster::{Point, RasterSpec};

/// A polygon grid over a coverage area, aligned to the reference raster.
/// Every cell spans `poly_size` raster cells per side, so raster values can
/// be attributed to grid polygons by index arithmetic alone.
///
/// Immutable once constructed; safe to share across concurrent overlay
/// computations.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    poly_size: usize,
    raster: RasterSpec,
    x_start: usize,
    x_end: usize,
    y_start: usize,
    y_end: usize,
    x_width: usize,
    y_height: usize,
    reference_index: Vec<u64>,
    poly_index: Vec<u32>,
}

impl Grid {
    /// Align the bounding box to the reference raster and derive the index
    /// arrays. Fails fast on an invalid configuration; no partial grid is
    /// ever observable.
    pub fn new(
        upper_left: Point,
        bottom_right: Point,
        poly_size: usize,
        raster: RasterSpec,
    ) -> Result<Self> {
        if poly_size == 0 {
            return Err(GridError::ZeroPolySize);
        }
        if upper_left.lon >= bottom_right.lon || upper_left.lat <= bottom_right.lat {
            return Err(GridError::InvalidBounds);
        }

        let raw_x_start = start_index(raster.origin.lon, upper_left.lon, &raster.lon_increment);
        let raw_y_start = start_index(raster.origin.lat, upper_left.lat, &raster.lat_increment);
        let raw_x_end = end_index(raster.origin.lon, bottom_right.lon, &raster.lon_increment);
        let raw_y_end = end_index(raster.origin.lat, bottom_right.lat, &raster.lat_increment);

        let (x_start, x_end) = adjust_span(raw_x_start, raw_x_end, poly_size);
        let (y_start, y_end) = adjust_span(raw_y_start, raw_y_end, poly_size);

        if x_start < 0 || y_start < 0 || x_end >= raster.x_size as i64 {
            return Err(GridError::OutsideReference);
        }

        let mut grid = Self {
            poly_size,
            raster,
            x_start: x_start as usize,
            x_end: x_end as usize,
            y_start: y_start as usize,
            y_end: y_end as usize,
            x_width: (x_end - x_start + 1) as usize,
            y_height: (y_end - y_start + 1) as usize,
            reference_index: Vec::new(),
            poly_index: Vec::new(),
        };
        grid.reference_index = grid.build_reference_index();
        grid.poly_index = grid.build_poly_index();
        Ok(grid)
    }

    /// Row-major linear ids of the reference-raster cells the grid covers.
    /// Ids match positions in the producer's flattened data files.
    fn build_reference_index(&self) -> Vec<u64> {
        let width = self.raster.x_size as u64;
        Array2::from_shape_fn((self.y_height, self.x_width), |(row, col)| {
            (self.y_start + row) as u64 * width + (self.x_start + col) as u64
        })
        .into_raw_vec()
    }

    /// Polygon id of every covered raster cell, flattened in the same
    /// row-major order as `reference_index` so position `i` in both arrays
    /// refers to the same cell. Ids are 1-based and assigned row-major over
    /// `poly_size` x `poly_size` blocks, matching the traversal of `cells`.
    fn build_poly_index(&self) -> Vec<u32> {
        let blocks_per_row = (self.x_width / self.poly_size) as u32;
        Array2::from_shape_fn((self.y_height, self.x_width), |(row, col)| {
            let block_row = (row / self.poly_size) as u32;
            let block_col = (col / self.poly_size) as u32;
            block_row * blocks_per_row + block_col + 1
        })
        .into_raw_vec()
    }

    #[inline]
    pub fn poly_size(&self) -> usize {
        self.poly_size
    }

    #[inline]
    pub fn raster(&self) -> &RasterSpec {
        &self.raster
    }

    /// Zero-based bounds of the grid within the reference raster.
    #[inline]
    pub fn x_start(&self) -> usize {
        self.x_start
    }

    #[inline]
    pub fn x_end(&self) -> usize {
        self.x_end
    }

    #[inline]
    pub fn y_start(&self) -> usize {
        self.y_start
    }

    #[inline]
    pub fn y_end(&self) -> usize {
        self.y_end
    }

    /// Width and height in reference-raster cells, each divisible by
    /// `poly_size`.
    #[inline]
    pub fn x_width(&self) -> usize {
        self.x_width
    }

    #[inline]
    pub fn y_height(&self) -> usize {
        self.y_height
    }

    /// Number of reference-raster cells covered.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.x_width * self.y_height
    }

    /// Number of distinct grid polygons.
    #[inline]
    pub fn poly_count(&self) -> usize {
        (self.x_width / self.poly_size) * (self.y_height / self.poly_size)
    }

    #[inline]
    pub fn reference_index(&self) -> &[u64] {
        &self.reference_index
    }

    #[inline]
    pub fn poly_index(&self) -> &[u32] {
        &self.poly_index
    }

    /// Geographic upper-left corner of the grid. May sit north/west of the
    /// requested box after span adjustment.
    fn geo_upper_left(&self) -> Point {
        Point::new(
            self.raster.origin.lon + self.x_start as f64 * self.raster.lon_increment.step(),
            self.raster.origin.lat + self.y_start as f64 * self.raster.lat_increment.step(),
        )
    }

    /// Polygon geometries, one box per poly_index, emitted in the same
    /// row-major traversal used for `poly_index` assignment: the cell at
    /// position `k` carries poly_index `k + 1`.
    pub fn cells(&self) -> GridCells {
        let lon_step = self.raster.lon_increment.step() * self.poly_size as f64;
        let lat_step = self.raster.lat_increment.step() * self.poly_size as f64;
        let origin = self.geo_upper_left();
        let rows = self.y_height / self.poly_size;
        let cols = self.x_width / self.poly_size;

        let mut boxes = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            let lat_a = origin.lat + row as f64 * lat_step;
            let lat_b = lat_a + lat_step;
            for col in 0..cols {
                let lon_a = origin.lon + col as f64 * lon_step;
                let lon_b = lon_a + lon_step;
                // Rect::new orders the corners itself
                boxes.push(Rect::new(
                    coord! { x: lon_a, y: lat_a },
                    coord! { x: lon_b, y: lat_b },
                ));
            }
        }
        GridCells::new(boxes)
    }

    /// Exchange table: `(poly_index, geometry)` with WKT geometry, one row
    /// per polygon, ordered by poly_index ascending.
    pub fn to_dataframe(&self) -> anyhow::Result<DataFrame> {
        let cells = self.cells();
        let poly_index: Vec<u32> = (1..=cells.len() as u32).collect();
        let geometry: Vec<String> = cells
            .iter()
            .map(|rect| rect.to_polygon().wkt_string())
            .collect();
        Ok(df! {
            "poly_index" => poly_index,
            "geometry" => geometry,
        }?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Increment;

    /// Iowa coverage area over the unmasked SNODAS raster.
    fn iowa() -> Grid {
        Grid::new(
            Point::new(-96.639704, 43.501196),
            Point::new(-90.140061, 40.375501),
            10,
            RasterSpec::snodas_unmasked(),
        )
        .unwrap()
    }

    /// A tiny 10x10-cell raster window for exhaustive checks.
    fn small() -> Grid {
        let raster = RasterSpec {
            origin: Point::new(-10.0, 10.0),
            x_size: 100,
            lon_increment: Increment::new(0.1, 1),
            lat_increment: Increment::new(0.1, -1),
        };
        Grid::new(Point::new(-9.95, 9.95), Point::new(-9.05, 9.05), 5, raster).unwrap()
    }

    #[test]
    fn iowa_alignment() {
        let grid = iowa();
        assert_eq!(grid.x_start(), 4061);
        assert_eq!(grid.x_end(), 4850);
        assert_eq!(grid.x_width(), 790);
        assert_eq!(grid.y_start(), 1765);
        assert_eq!(grid.y_end(), 2144);
        assert_eq!(grid.y_height(), 380);
        assert_eq!(grid.poly_count(), 79 * 38);
    }

    #[test]
    fn index_arrays_stay_in_lockstep() {
        let grid = iowa();
        assert_eq!(grid.x_width() % grid.poly_size(), 0);
        assert_eq!(grid.y_height() % grid.poly_size(), 0);
        assert_eq!(grid.reference_index().len(), grid.cell_count());
        assert_eq!(grid.poly_index().len(), grid.cell_count());

        let mut counts = vec![0usize; grid.poly_count() + 1];
        for &id in grid.poly_index() {
            counts[id as usize] += 1;
        }
        assert_eq!(counts[0], 0);
        // every polygon covers exactly poly_size^2 raster cells
        assert!(counts[1..].iter().all(|&n| n == 100));
    }

    #[test]
    fn reference_index_is_row_major() {
        let grid = small();
        assert_eq!(grid.x_start(), 0);
        assert_eq!(grid.y_start(), 0);
        let width = grid.raster().x_size as u64;
        // first row: columns x_start..=x_end of row y_start
        assert_eq!(grid.reference_index()[0], 0);
        assert_eq!(grid.reference_index()[9], 9);
        // second row jumps by the full raster width
        assert_eq!(grid.reference_index()[10], width);
    }

    #[test]
    fn poly_index_pairs_with_cell_geometry() {
        let grid = small();
        let cells = grid.cells();
        assert_eq!(cells.len(), grid.poly_count());

        let width = grid.raster().x_size as u64;
        let origin = grid.raster().origin;
        let lon_step = grid.raster().lon_increment.step();
        let lat_step = grid.raster().lat_increment.step();

        for (pos, &ref_id) in grid.reference_index().iter().enumerate() {
            let col = (ref_id % width) as f64;
            let row = (ref_id / width) as f64;
            let center_lon = origin.lon + (col + 0.5) * lon_step;
            let center_lat = origin.lat + (row + 0.5) * lat_step;

            let rect = cells.get(grid.poly_index()[pos] as usize - 1);
            assert!(rect.min().x <= center_lon && center_lon <= rect.max().x);
            assert!(rect.min().y <= center_lat && center_lat <= rect.max().y);
        }
    }

    #[test]
    fn construction_is_idempotent() {
        assert_eq!(iowa(), iowa());
    }

    #[test]
    fn rejects_invalid_configuration() {
        let raster = RasterSpec::snodas_unmasked();
        let ul = Point::new(-96.639704, 43.501196);
        let br = Point::new(-90.140061, 40.375501);

        assert!(matches!(
            Grid::new(br, ul, 10, raster),
            Err(GridError::InvalidBounds)
        ));
        assert!(matches!(
            Grid::new(ul, br, 0, raster),
            Err(GridError::ZeroPolySize)
        ));
        // entirely west of the raster origin
        assert!(matches!(
            Grid::new(
                Point::new(-140.0, 43.0),
                Point::new(-135.0, 40.0),
                10,
                raster
            ),
            Err(GridError::OutsideReference)
        ));
    }

    #[test]
    fn dataframe_is_ordered_by_poly_index() {
        let grid = small();
        let df = grid.to_dataframe().unwrap();
        assert_eq!(df.shape(), (4, 2));

        let ids = df
            .column("poly_index")
            .unwrap()
            .as_materialized_series()
            .u32()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 2, 3, 4]);

        let wkts = df
            .column("geometry")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .get(0)
            .unwrap()
            .to_string();
        assert!(wkts.starts_with("POLYGON"));
    }
}
