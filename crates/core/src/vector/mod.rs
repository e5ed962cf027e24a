//! Point features with attributes
//!
//! Point tools read a numeric attribute from every feature and write their
//! result into another attribute. Geometries other than points are carried
//! through untouched.

use geo_types::{Geometry, Point};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::raster::Extent;

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// Numeric view of the value; `None` for null, text, booleans and NaN
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(v) => Some(*v as f64),
            AttributeValue::Float(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    /// `Float(value)` or `Null` when there is no value
    pub fn from_optional(value: Option<f64>) -> Self {
        match value {
            Some(v) => AttributeValue::Float(v),
            None => AttributeValue::Null,
        }
    }
}

/// A geographic feature with geometry and attributes
#[derive(Debug, Clone)]
pub struct Feature {
    /// Feature geometry
    pub geometry: Option<Geometry<f64>>,
    /// Feature attributes
    pub properties: HashMap<String, AttributeValue>,
    /// Optional feature ID
    pub id: Option<String>,
}

impl Feature {
    /// Create a new feature with geometry
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            geometry: Some(geometry),
            properties: HashMap::new(),
            id: None,
        }
    }

    /// Create a point feature
    pub fn point(x: f64, y: f64) -> Self {
        Self::new(Geometry::Point(Point::new(x, y)))
    }

    /// Create a feature with no geometry
    pub fn empty() -> Self {
        Self {
            geometry: None,
            properties: HashMap::new(),
            id: None,
        }
    }

    /// Builder-style attribute setter
    pub fn with_property(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.set_property(key, value);
        self
    }

    /// Set an attribute
    pub fn set_property(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.properties.insert(key.into(), value);
    }

    /// Get an attribute
    pub fn get_property(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }

    /// Coordinates when the geometry is a point
    pub fn point_coords(&self) -> Option<(f64, f64)> {
        match self.geometry {
            Some(Geometry::Point(p)) => Some((p.x(), p.y())),
            _ => None,
        }
    }
}

/// Collection of features
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self { features: Vec::new() }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Feature> {
        self.features.iter_mut()
    }

    /// Bounding box of all point geometries, `None` if there are none
    pub fn point_extent(&self) -> Option<Extent> {
        Extent::from_points(self.features.iter().filter_map(Feature::point_coords))
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{line_string, Geometry};

    #[test]
    fn test_attribute_as_f64() {
        assert_eq!(AttributeValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(AttributeValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(AttributeValue::Float(f64::NAN).as_f64(), None);
        assert_eq!(AttributeValue::String("4".into()).as_f64(), None);
        assert_eq!(AttributeValue::Null.as_f64(), None);
    }

    #[test]
    fn test_point_extent_ignores_other_geometries() {
        let mut fc = FeatureCollection::new();
        fc.push(Feature::point(1.0, 2.0));
        fc.push(Feature::new(Geometry::LineString(line_string![
            (x: -50.0, y: -50.0),
            (x: 50.0, y: 50.0)
        ])));
        fc.push(Feature::point(3.0, -1.0));
        fc.push(Feature::empty());

        let e = fc.point_extent().unwrap();
        assert_eq!(e, Extent::new(1.0, -1.0, 3.0, 2.0));
    }

    #[test]
    fn test_empty_collection_has_no_extent() {
        let fc: FeatureCollection = vec![Feature::empty()].into_iter().collect();
        assert!(fc.point_extent().is_none());
    }
}
