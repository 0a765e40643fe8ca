mod align;
mod grid;

pub use grid::Grid;
