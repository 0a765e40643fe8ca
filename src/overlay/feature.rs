use std::sync::Arc;

use chrono::NaiveDate;
use geo::MultiLineString;

/// How an attribute is measured, which decides how it splits across cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// A per-kilometre quantity (e.g. lane count). Fragment value is
    /// fragment kilometres x value.
    Density,
    /// A whole-feature quantity (e.g. total salt applied). Fragment value
    /// is the fragment's length ratio x value.
    Scalar,
}

/// A named quantity attached to a line feature.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: Arc<str>,
    pub kind: AttributeKind,
    pub value: f64,
}

impl Attribute {
    pub fn density(name: &str, value: f64) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Density,
            value,
        }
    }

    pub fn scalar(name: &str, value: f64) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Scalar,
            value,
        }
    }
}

/// An external vector record (road segment, salted-route segment).
/// Consumed per invocation and re-emitted as fragments; never retained.
#[derive(Debug, Clone)]
pub struct LineFeature {
    pub geometry: MultiLineString<f64>,
    /// Label of the administrative region the source file came from.
    pub jurisdiction: Option<Arc<str>>,
    /// Observation date the feature belongs to (e.g. storm date).
    pub date: Option<NaiveDate>,
    /// Road classification, if the source carries one.
    pub road_class: Option<u32>,
    pub attributes: Vec<Attribute>,
}

impl LineFeature {
    pub fn new(geometry: MultiLineString<f64>) -> Self {
        Self {
            geometry,
            jurisdiction: None,
            date: None,
            road_class: None,
            attributes: Vec::new(),
        }
    }

    pub fn with_jurisdiction(mut self, label: &str) -> Self {
        self.jurisdiction = Some(label.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_road_class(mut self, class: u32) -> Self {
        self.road_class = Some(class);
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// The intersection of one LineFeature with one grid cell, carrying the
/// proportional share of each of the feature's attributes.
#[derive(Debug, Clone)]
pub struct OverlayFragment {
    /// Identifier of the containing polygon.
    pub poly_index: u32,
    /// Position of the source feature in the overlay input.
    pub feature: usize,
    /// Geodesic length of the clipped geometry, meters.
    pub length_m: f64,
    /// `length_m` over the source feature's pre-clip length.
    pub ratio: f64,
    pub jurisdiction: Option<Arc<str>>,
    pub date: Option<NaiveDate>,
    pub road_class: Option<u32>,
    /// Attributed values, one per source attribute.
    pub values: Vec<(Arc<str>, f64)>,
}
