//! Core side of the raster-extraction interface: tag externally decoded
//! raster slices with the grid's join keys, scrub the missing-value
//! sentinel, and reduce to one value per polygon with null-aware
//! statistics.

use polars::prelude::*;

use crate::error::GridError;
use crate::grid::Grid;
use crate::raster::MISSING;

/// Variables reduced with `max` per polygon (accumulations).
pub const MAX_VARS: [&str; 6] = [
    "solid_precip",
    "liquid_precip",
    "swe",
    "snow_depth",
    "runoff",
    "sub_pack",
];

/// Variables reduced with `min` per polygon (temperature, blowing
/// sublimation).
pub const MIN_VARS: [&str; 2] = ["sub_blow", "sp_temp"];

/// Build the per-date raster table `(date, poly_index, reference_index,
/// variable columns...)`. Each slice holds one value per covered raster
/// cell, aligned to `reference_index`.
pub fn raster_table(
    grid: &Grid,
    date: &str,
    variables: &[(&str, &[f64])],
) -> anyhow::Result<DataFrame> {
    let n = grid.cell_count();
    let mut columns = vec![
        Column::new("date".into(), vec![date.to_string(); n]),
        Column::new("poly_index".into(), grid.poly_index().to_vec()),
        Column::new("reference_index".into(), grid.reference_index().to_vec()),
    ];
    for (name, values) in variables {
        if values.len() != n {
            return Err(GridError::SliceLength {
                variable: (*name).to_string(),
                got: values.len(),
                expected: n,
            }
            .into());
        }
        columns.push(Column::new((*name).into(), values.to_vec()));
    }
    Ok(DataFrame::new(columns)?)
}

/// Replace the producer's -9999 sentinel with null in every numeric
/// column. Sentinels are data-quality signals, not errors; downstream
/// max/min reductions ignore nulls.
pub fn normalize_missing(df: &mut DataFrame) -> anyhow::Result<()> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    for name in names {
        let series = df.column(&name)?.as_materialized_series();
        let scrubbed = match series.dtype() {
            DataType::Float64 => series
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| *x != MISSING))
                .collect::<Float64Chunked>()
                .into_series(),
            DataType::Int64 => series
                .i64()?
                .into_iter()
                .map(|v| v.filter(|x| *x != MISSING as i64))
                .collect::<Int64Chunked>()
                .into_series(),
            DataType::Int32 => series
                .i32()?
                .into_iter()
                .map(|v| v.filter(|x| *x != MISSING as i32))
                .collect::<Int32Chunked>()
                .into_series(),
            _ => continue,
        };
        df.replace(&name, scrubbed.with_name(name.as_str().into()))?;
    }
    Ok(())
}

/// Reduce raster values to one row per (date, poly_index): `max` for the
/// accumulation variables, `min` for the rest, nulls ignored.
pub fn aggregate_by_poly(
    df: DataFrame,
    max_vars: &[&str],
    min_vars: &[&str],
) -> anyhow::Result<DataFrame> {
    let mut aggs: Vec<Expr> = Vec::with_capacity(max_vars.len() + min_vars.len());
    aggs.extend(max_vars.iter().map(|v| col(*v).max()));
    aggs.extend(min_vars.iter().map(|v| col(*v).min()));

    let out = df
        .lazy()
        .group_by([col("date"), col("poly_index")])
        .agg(aggs)
        .sort(["date", "poly_index"], SortMultipleOptions::default())
        .collect()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{Increment, Point, RasterSpec};

    fn small_grid() -> Grid {
        let raster = RasterSpec {
            origin: Point::new(-10.0, 10.0),
            x_size: 100,
            lon_increment: Increment::new(0.1, 1),
            lat_increment: Increment::new(0.1, -1),
        };
        // 4x4 cells, 2x2 polygons
        Grid::new(Point::new(-9.95, 9.95), Point::new(-9.65, 9.65), 2, raster).unwrap()
    }

    #[test]
    fn raster_table_carries_join_keys() {
        let grid = small_grid();
        let values: Vec<f64> = (0..grid.cell_count()).map(|i| i as f64).collect();
        let df = raster_table(&grid, "2022-01-15", &[("swe", &values)]).unwrap();

        assert_eq!(df.shape(), (16, 4));
        let poly = df
            .column("poly_index")
            .unwrap()
            .as_materialized_series()
            .u32()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap())
            .collect::<Vec<_>>();
        // first raster row covers polygons 1 and 2
        assert_eq!(&poly[..4], &[1, 1, 2, 2]);
    }

    #[test]
    fn misaligned_slice_is_rejected() {
        let grid = small_grid();
        let short = vec![0.0; 3];
        assert!(raster_table(&grid, "2022-01-15", &[("swe", &short)]).is_err());
    }

    #[test]
    fn sentinels_become_null() {
        let mut df = df! {
            "poly_index" => [1u32, 1, 2],
            "swe" => [4.0, MISSING, 2.0],
        }
        .unwrap();
        normalize_missing(&mut df).unwrap();

        let swe = df.column("swe").unwrap().as_materialized_series();
        assert_eq!(swe.null_count(), 1);
        assert_eq!(swe.f64().unwrap().get(1), None);
        assert_eq!(swe.f64().unwrap().get(0), Some(4.0));
    }

    #[test]
    fn aggregation_ignores_nulls() {
        let mut df = df! {
            "date" => ["2022-01-15", "2022-01-15", "2022-01-15", "2022-01-15"],
            "poly_index" => [1u32, 1, 2, 2],
            "swe" => [4.0, MISSING, 2.0, 3.0],
            "sp_temp" => [-5.0, -7.0, MISSING, -1.0],
        }
        .unwrap();
        normalize_missing(&mut df).unwrap();

        let out = aggregate_by_poly(df, &["swe"], &["sp_temp"]).unwrap();
        assert_eq!(out.height(), 2);

        let swe = out.column("swe").unwrap().as_materialized_series();
        assert_eq!(swe.f64().unwrap().get(0), Some(4.0));
        assert_eq!(swe.f64().unwrap().get(1), Some(3.0));

        let temp = out.column("sp_temp").unwrap().as_materialized_series();
        assert_eq!(temp.f64().unwrap().get(0), Some(-7.0));
        assert_eq!(temp.f64().unwrap().get(1), Some(-1.0));
    }
}
