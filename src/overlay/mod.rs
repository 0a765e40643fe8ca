mod aggregate;
mod feature;
mod overlay;

pub use aggregate::{
    aggregate_table, collapse_jurisdictions, partial_sums, partial_table, PartialSum, PolySum,
};
pub use feature::{Attribute, AttributeKind, LineFeature, OverlayFragment};
pub use overlay::{DegeneratePolicy, Overlay, OverlayAttributor};
