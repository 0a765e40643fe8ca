mod bbox;

use bbox::BoundingBox;
use geo::Rect;
use rstar::{RTree, AABB};

/// The polygon cells of a derived grid, in poly_index order and R-tree
/// indexed for candidate lookups. The cell at position `k` carries
/// poly_index `k + 1`.
#[derive(Debug, Clone)]
pub struct GridCells {
    cells: Vec<Rect<f64>>,
    rtree: RTree<BoundingBox>,
}

impl GridCells {
    /// Build from an ordered sequence of axis-aligned cell boxes.
    pub fn new(cells: Vec<Rect<f64>>) -> Self {
        Self {
            rtree: RTree::bulk_load(
                cells
                    .iter()
                    .enumerate()
                    .map(|(i, rect)| BoundingBox::new(i, *rect))
                    .collect(),
            ),
            cells,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn get(&self, idx: usize) -> &Rect<f64> {
        &self.cells[idx]
    }

    /// Cells in poly_index order.
    pub fn iter(&self) -> impl Iterator<Item = &Rect<f64>> {
        self.cells.iter()
    }

    /// Indices of cells whose bounding box intersects `rect`, ascending.
    pub(crate) fn candidates(&self, rect: &Rect<f64>) -> Vec<usize> {
        let search = AABB::from_corners(rect.min().into(), rect.max().into());
        let mut found: Vec<usize> = self
            .rtree
            .locate_in_envelope_intersecting(&search)
            .map(|bb| bb.idx())
            .collect();
        found.sort_unstable();
        found
    }
}
