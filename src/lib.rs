#![doc = "Raster-aligned polygon grids and proportional overlay attribution"]
mod depot;
mod error;
mod geometry;
mod grid;
mod overlay;
mod raster;
mod snodas;
mod storm;
mod table;

#[doc(inline)]
pub use error::GridError;

#[doc(inline)]
pub use raster::{Increment, Point, RasterSpec, MISSING};

#[doc(inline)]
pub use grid::Grid;

#[doc(inline)]
pub use geometry::GridCells;

#[doc(inline)]
pub use depot::{depot_distance_table, min_depot_distances};

#[doc(inline)]
pub use overlay::{
    aggregate_table, collapse_jurisdictions, partial_sums, partial_table, Attribute,
    AttributeKind, DegeneratePolicy, LineFeature, Overlay, OverlayAttributor, OverlayFragment,
    PartialSum, PolySum,
};

#[doc(inline)]
pub use snodas::{aggregate_by_poly, normalize_missing, raster_table, MAX_VARS, MIN_VARS};

#[doc(inline)]
pub use storm::{storm_dates, unique_storm_dates};

#[doc(inline)]
pub use table::{read_from_csv, write_to_csv};
