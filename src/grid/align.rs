use crate::raster::Increment;

/// Zero-based index of the reference cell that contains the start boundary
/// of the coverage area along one axis. Truncates rather than rounds so the
/// cell overlapping the start coordinate is included.
pub(crate) fn start_index(ref_coord: f64, target_coord: f64, inc: &Increment) -> i64 {
    ((ref_coord.abs() - target_coord.abs()) / inc.degrees).floor() as i64
}

/// Zero-based index of the reference cell that contains the end boundary.
/// Advances the origin by one signed increment first (the far edge of the
/// origin cell), then rounds up so the cell overlapping the end coordinate
/// is included.
pub(crate) fn end_index(ref_coord: f64, target_coord: f64, inc: &Increment) -> i64 {
    let advanced = ref_coord + inc.step();
    ((advanced.abs() - target_coord.abs()) / inc.degrees).ceil() as i64
}

/// Widen `[start, end]` so its size is the next multiple of `poly_size`
/// (no-op if already a multiple). The padding is split between both ends,
/// favoring the end by one cell when it is odd, keeping the span roughly
/// centered over the requested area.
pub(crate) fn adjust_span(start: i64, end: i64, poly_size: usize) -> (i64, i64) {
    let ps = poly_size as i64;
    let size = end - start + 1;
    // Ceiling division; `i64::div_ceil` is unstable (int_roundings).
    let chunks = size.div_euclid(ps) + (size.rem_euclid(ps) != 0) as i64;
    let pad = chunks * ps - size;
    (start - pad / 2, end + pad / 2 + pad % 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RasterSpec;

    #[test]
    fn iowa_longitude_axis() {
        let spec = RasterSpec::snodas_unmasked();
        let start = start_index(spec.origin.lon, -96.639704, &spec.lon_increment);
        let end = end_index(spec.origin.lon, -90.140061, &spec.lon_increment);
        assert_eq!(start, 4065);
        assert_eq!(end, 4845);
        assert_eq!(adjust_span(start, end, 10), (4061, 4850));
    }

    #[test]
    fn iowa_latitude_axis() {
        let spec = RasterSpec::snodas_unmasked();
        let start = start_index(spec.origin.lat, 43.501196, &spec.lat_increment);
        let end = end_index(spec.origin.lat, 40.375501, &spec.lat_increment);
        assert_eq!(start, 1767);
        assert_eq!(end, 2142);
        assert_eq!(adjust_span(start, end, 10), (1765, 2144));
    }

    #[test]
    fn adjust_span_is_noop_on_exact_multiples() {
        assert_eq!(adjust_span(10, 29, 10), (10, 29));
        assert_eq!(adjust_span(0, 0, 1), (0, 0));
    }

    #[test]
    fn adjust_span_favors_end_on_odd_padding() {
        // size 5 -> 8, pad 3: one cell off the start, two onto the end
        assert_eq!(adjust_span(10, 14, 4), (9, 16));
        // size 6 -> 8, pad 2: one each way
        assert_eq!(adjust_span(10, 15, 4), (9, 16));
    }

    #[test]
    fn start_index_truncates_toward_containing_cell() {
        let inc = Increment::new(0.5, 1);
        // 1.9 cells east of the origin: still inside cell 1
        assert_eq!(start_index(-10.0, -9.05, &inc), 1);
        assert_eq!(start_index(-10.0, -9.0, &inc), 2);
    }
}
