use serde::{Deserialize, Serialize};

/// A longitude/latitude pair in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
}

impl Point {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Per-cell angular step along one raster axis, travelling away from the
/// raster's origin. `direction` is +1 or -1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Increment {
    pub degrees: f64,
    pub direction: i8,
}

impl Increment {
    pub fn new(degrees: f64, direction: i8) -> Self {
        Self { degrees, direction }
    }

    /// Signed degrees moved per cell.
    #[inline]
    pub fn step(&self) -> f64 {
        self.degrees * f64::from(self.direction)
    }
}

/// Sentinel the raster producer writes for missing observations.
pub const MISSING: f64 = -9999.0;

/// Fixed parameters of the reference raster that all derived grids align to.
/// These are constants of the raster's producer and must match between
/// invocations processing the same raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterSpec {
    /// Upper-left corner of the raster.
    pub origin: Point,
    /// Width of the raster in cells.
    pub x_size: usize,
    pub lon_increment: Increment,
    pub lat_increment: Increment,
}

impl RasterSpec {
    /// The unmasked SNODAS grid (post Oct 2013): 8192 cells wide,
    /// 30 arc-second cells, upper-left origin at (-130.5167, 58.2333).
    pub fn snodas_unmasked() -> Self {
        Self {
            origin: Point::new(-130.5167, 58.2333),
            x_size: 8192,
            lon_increment: Increment::new(30.0 / 3600.0, 1),
            lat_increment: Increment::new(30.0 / 3600.0, -1),
        }
    }
}
