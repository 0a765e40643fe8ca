use geo::{BooleanOps, BoundingRect, Geodesic, Intersects, Length};

use super::feature::{AttributeKind, LineFeature, OverlayFragment};
use crate::error::{GridError, Result};
use crate::geometry::GridCells;

/// What to do with a feature whose pre-clip geodesic length is zero or
/// non-finite. The ratio is undefined for such features, so they never
/// reach attribution either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegeneratePolicy {
    /// Abort the whole run.
    Fail,
    /// Record the feature index, warn, and keep going.
    #[default]
    Skip,
}

/// Result of an overlay run.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    pub fragments: Vec<OverlayFragment>,
    /// Indices of features skipped for zero/non-finite length.
    pub skipped: Vec<usize>,
    /// Count of intersections that degenerated to points and were dropped.
    pub discarded: usize,
}

/// Splits line features across grid cells and redistributes their
/// attributes proportionally to the geodesic length captured in each cell.
#[derive(Debug, Clone, Copy)]
pub struct OverlayAttributor<'a> {
    cells: &'a GridCells,
    policy: DegeneratePolicy,
}

impl<'a> OverlayAttributor<'a> {
    pub fn new(cells: &'a GridCells) -> Self {
        Self {
            cells,
            policy: DegeneratePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Clip every feature against every cell it overlaps and attribute its
    /// quantities to the containing polygons. A malformed feature never
    /// aborts the run under the default policy.
    pub fn attribute(&self, features: &[LineFeature]) -> Result<Overlay> {
        let mut out = Overlay::default();

        for (i, feature) in features.iter().enumerate() {
            // full pre-clip length; length-derived quantities key off this
            let orig_m = Geodesic.length(&feature.geometry);
            if !orig_m.is_finite() || orig_m <= 0.0 {
                match self.policy {
                    DegeneratePolicy::Fail => return Err(GridError::DegenerateGeometry(i)),
                    DegeneratePolicy::Skip => {
                        eprintln!("overlay: skipping feature {i} with degenerate length {orig_m}");
                        out.skipped.push(i);
                        continue;
                    }
                }
            }

            let Some(bbox) = feature.geometry.bounding_rect() else {
                continue; // unreachable: empty geometry has zero length
            };

            for idx in self.cells.candidates(&bbox) {
                let cell = self.cells.get(idx);
                let clipped = cell.to_polygon().clip(&feature.geometry, false);
                let length_m = Geodesic.length(&clipped);

                if clipped.0.is_empty() || length_m == 0.0 {
                    // bbox candidate that only touches the cell boundary:
                    // the intersection is not line-typed, drop it
                    if feature.geometry.intersects(cell) {
                        out.discarded += 1;
                    }
                    continue;
                }

                let ratio = length_m / orig_m;
                let values = feature
                    .attributes
                    .iter()
                    .map(|attr| {
                        let value = match attr.kind {
                            AttributeKind::Density => (length_m / 1000.0) * attr.value,
                            AttributeKind::Scalar => ratio * attr.value,
                        };
                        (attr.name.clone(), value)
                    })
                    .collect();

                out.fragments.push(OverlayFragment {
                    poly_index: idx as u32 + 1,
                    feature: i,
                    length_m,
                    ratio,
                    jurisdiction: feature.jurisdiction.clone(),
                    date: feature.date,
                    road_class: feature.road_class,
                    values,
                });
            }
        }

        Ok(out)
    }
}
