use std::sync::Arc;

use ahash::AHashMap;
use chrono::NaiveDate;
use polars::prelude::*;

use super::feature::OverlayFragment;

/// Running per-group sums for one (poly_index, date, jurisdiction) group.
#[derive(Debug, Clone)]
pub struct PartialSum {
    pub poly_index: u32,
    pub date: Option<NaiveDate>,
    pub jurisdiction: Option<Arc<str>>,
    values: AHashMap<Arc<str>, f64>,
}

impl PartialSum {
    /// Summed value for an attribute column, zero if absent.
    pub fn value(&self, name: &str) -> f64 {
        self.values.get(name).copied().unwrap_or(0.0)
    }
}

/// One row of the final per-polygon table.
#[derive(Debug, Clone)]
pub struct PolySum {
    pub poly_index: u32,
    pub date: Option<NaiveDate>,
    /// Space-joined labels of every jurisdiction contributing to the
    /// polygon, in first-seen order.
    pub jurisdiction: Option<String>,
    values: AHashMap<Arc<str>, f64>,
}

impl PolySum {
    pub fn value(&self, name: &str) -> f64 {
        self.values.get(name).copied().unwrap_or(0.0)
    }
}

/// Phase 1: sum fragment values by (poly_index, date, jurisdiction), in
/// first-seen order. Fragments tagged with a road class also feed
/// per-class columns named `{attribute}_{class}`.
///
/// Jurisdictions must stay separate here: the per-jurisdiction sums come
/// from different source files, and collapsing them before they are
/// complete would silently merge incompatible partial sums.
pub fn partial_sums(fragments: &[OverlayFragment]) -> Vec<PartialSum> {
    let mut index: AHashMap<(u32, Option<NaiveDate>, Option<Arc<str>>), usize> = AHashMap::new();
    let mut rows: Vec<PartialSum> = Vec::new();

    for frag in fragments {
        let key = (frag.poly_index, frag.date, frag.jurisdiction.clone());
        let at = match index.get(&key) {
            Some(&at) => at,
            None => {
                rows.push(PartialSum {
                    poly_index: frag.poly_index,
                    date: frag.date,
                    jurisdiction: frag.jurisdiction.clone(),
                    values: AHashMap::new(),
                });
                index.insert(key, rows.len() - 1);
                rows.len() - 1
            }
        };

        for (name, value) in &frag.values {
            *rows[at].values.entry(name.clone()).or_default() += value;
            if let Some(class) = frag.road_class {
                let tagged: Arc<str> = format!("{name}_{class}").into();
                *rows[at].values.entry(tagged).or_default() += value;
            }
        }
    }

    rows
}

/// Phase 2: collapse phase-1 output by (poly_index, date), summing values
/// and concatenating jurisdiction labels for polygons that straddle a
/// boundary. Always runs on phase-1 output so the straddling guarantee is
/// enforced by structure rather than by call order.
pub fn collapse_jurisdictions(partials: &[PartialSum]) -> Vec<PolySum> {
    let mut index: AHashMap<(u32, Option<NaiveDate>), usize> = AHashMap::new();
    let mut rows: Vec<PolySum> = Vec::new();

    for partial in partials {
        let key = (partial.poly_index, partial.date);
        let at = match index.get(&key) {
            Some(&at) => at,
            None => {
                rows.push(PolySum {
                    poly_index: partial.poly_index,
                    date: partial.date,
                    jurisdiction: None,
                    values: AHashMap::new(),
                });
                index.insert(key, rows.len() - 1);
                rows.len() - 1
            }
        };

        if let Some(label) = &partial.jurisdiction {
            match &mut rows[at].jurisdiction {
                Some(joined) => {
                    joined.push(' ');
                    joined.push_str(label);
                }
                none => *none = Some(label.to_string()),
            }
        }
        for (name, value) in &partial.values {
            *rows[at].values.entry(name.clone()).or_default() += value;
        }
    }

    rows
}

/// Attribute column names across all fragments, in first-seen order, with
/// class-tagged columns following the column they break down.
fn column_names(fragments: &[OverlayFragment]) -> Vec<Arc<str>> {
    let mut names: Vec<Arc<str>> = Vec::new();
    for frag in fragments {
        for (name, _) in &frag.values {
            if !names.iter().any(|n| n == name) {
                names.push(name.clone());
            }
            if let Some(class) = frag.road_class {
                let tagged: Arc<str> = format!("{name}_{class}").into();
                if !names.iter().any(|n| *n == tagged) {
                    names.push(tagged);
                }
            }
        }
    }
    names
}

/// Pre-final exchange table: one row per polygon x jurisdiction (x date).
pub fn partial_table(fragments: &[OverlayFragment]) -> anyhow::Result<DataFrame> {
    let names = column_names(fragments);
    let mut rows = partial_sums(fragments);
    rows.sort_by(|a, b| {
        (a.date, a.poly_index, a.jurisdiction.clone())
            .cmp(&(b.date, b.poly_index, b.jurisdiction.clone()))
    });

    let mut columns = vec![Column::new(
        "poly_index".into(),
        rows.iter().map(|r| r.poly_index).collect::<Vec<u32>>(),
    )];
    if rows.iter().any(|r| r.date.is_some()) {
        columns.push(Column::new(
            "date".into(),
            rows.iter()
                .map(|r| r.date.map(|d| d.to_string()))
                .collect::<Vec<Option<String>>>(),
        ));
    }
    if rows.iter().any(|r| r.jurisdiction.is_some()) {
        columns.push(Column::new(
            "jurisdiction".into(),
            rows.iter()
                .map(|r| r.jurisdiction.as_ref().map(|j| j.to_string()))
                .collect::<Vec<Option<String>>>(),
        ));
    }
    for name in &names {
        columns.push(Column::new(
            name.as_ref().into(),
            rows.iter().map(|r| r.value(name)).collect::<Vec<f64>>(),
        ));
    }
    Ok(DataFrame::new(columns)?)
}

/// Final exchange table: one row per polygon (x date), attribute values
/// summed across jurisdictions, labels concatenated for straddling
/// polygons. Sorted by (date, poly_index).
pub fn aggregate_table(fragments: &[OverlayFragment]) -> anyhow::Result<DataFrame> {
    let names = column_names(fragments);
    let partials = partial_sums(fragments);
    let mut rows = collapse_jurisdictions(&partials);
    rows.sort_by_key(|r| (r.date, r.poly_index));

    let mut columns = vec![Column::new(
        "poly_index".into(),
        rows.iter().map(|r| r.poly_index).collect::<Vec<u32>>(),
    )];
    if rows.iter().any(|r| r.date.is_some()) {
        columns.push(Column::new(
            "date".into(),
            rows.iter()
                .map(|r| r.date.map(|d| d.to_string()))
                .collect::<Vec<Option<String>>>(),
        ));
    }
    if rows.iter().any(|r| r.jurisdiction.is_some()) {
        columns.push(Column::new(
            "jurisdiction".into(),
            rows.iter()
                .map(|r| r.jurisdiction.clone())
                .collect::<Vec<Option<String>>>(),
        ));
    }
    for name in &names {
        columns.push(Column::new(
            name.as_ref().into(),
            rows.iter().map(|r| r.value(name)).collect::<Vec<f64>>(),
        ));
    }
    Ok(DataFrame::new(columns)?)
}
