//! Levels to points
//!
//! Interpolates a level stack to the height stored in an attribute of each
//! point feature and writes the result into another attribute.

use std::marker::PhantomData;

use gridlevels_core::vector::{AttributeValue, Feature, FeatureCollection};
use gridlevels_core::{Algorithm, Error, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::monitor::collect_rows;
use super::stack::LevelStack;
use super::state::{LevelInterpolation, LevelInterpolationParams, LevelInterpolator};

const DEFAULT_FIELD_NAME: &str = "Variable";

/// Parameters for [`levels_to_points`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsParams {
    pub levels: LevelInterpolationParams,
    /// Attribute holding the target height of each point
    pub z_field: String,
    /// Attribute receiving the interpolated value
    pub field_name: String,
}

impl Default for PointsParams {
    fn default() -> Self {
        Self {
            levels: LevelInterpolationParams::default(),
            z_field: "Z".into(),
            field_name: DEFAULT_FIELD_NAME.into(),
        }
    }
}

/// Levels to points tool
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelsToPoints<'a>(PhantomData<&'a ()>);

impl<'a> LevelsToPoints<'a> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<'a> Algorithm for LevelsToPoints<'a> {
    type Input = (&'a LevelStack<'a>, &'a FeatureCollection);
    type Output = FeatureCollection;
    type Params = PointsParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Levels to Points"
    }

    fn description(&self) -> &'static str {
        "Interpolate a stack of leveled grids to the heights stored in point attributes"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (levels, points) = input;
        levels_to_points(levels, points, &params)
    }
}

/// Interpolate `levels` at every point of `points`, returning a copy of the
/// collection with the result attribute added.
pub fn levels_to_points(
    levels: &LevelStack<'_>,
    points: &FeatureCollection,
    params: &PointsParams,
) -> Result<FeatureCollection> {
    let interpolator = LevelInterpolator::new(levels, params.levels);
    let mut result = points.clone();
    levels_to_points_in_place(&interpolator, &mut result, &params.z_field, &params.field_name)?;
    Ok(result)
}

/// Interpolate at every point of `points` and store the result in attribute
/// `field_name` (`"Variable"` when empty).
///
/// The height is read from the numeric attribute `z_field`. Points without
/// a height, non-point features and failed interpolations get `Null`.
pub fn levels_to_points_in_place(
    interpolator: &LevelInterpolator<'_>,
    points: &mut FeatureCollection,
    z_field: &str,
    field_name: &str,
) -> Result<()> {
    let target = points
        .point_extent()
        .ok_or_else(|| Error::Algorithm("No point features provided".into()))?;

    let mut state = interpolator.initialize(&target, None)?;

    let features = &points.features;
    let values: Vec<Option<f64>> = collect_rows(features.len(), interpolator.monitor(), |i| {
        vec![point_value(&state, &features[i], z_field)]
    })?;

    state.finalize();

    let field_name = if field_name.is_empty() {
        DEFAULT_FIELD_NAME
    } else {
        field_name
    };

    let mut valid = 0;
    for (feature, value) in points.iter_mut().zip(values) {
        if value.is_some() {
            valid += 1;
        }
        feature.set_property(field_name, AttributeValue::from_optional(value));
    }

    info!(
        "levels to points: {} of {} points interpolated",
        valid,
        points.len()
    );
    Ok(())
}

fn point_value(state: &LevelInterpolation<'_>, feature: &Feature, z_field: &str) -> Option<f64> {
    let (x, y) = feature.point_coords()?;
    let z = feature.get_property(z_field)?.as_f64()?;
    state.get_value(x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use gridlevels_core::{GeoTransform, Raster};

    fn grid(value: f64) -> Raster<f64> {
        let mut r = Raster::filled(4, 4, value);
        r.set_transform(GeoTransform::new(0.0, 4.0, 1.0, -1.0));
        r
    }

    fn point(x: f64, y: f64, z: AttributeValue) -> Feature {
        Feature::point(x, y).with_property("Z", z)
    }

    #[test]
    fn test_points() {
        let (a, b, c) = (grid(0.0), grid(100.0), grid(300.0));
        let stack = LevelStack::with_height_table(vec![&a, &b, &c], vec![0.0, 10.0, 20.0]);

        let points: FeatureCollection = vec![
            point(1.0, 1.0, AttributeValue::Float(5.0)),
            point(2.0, 3.0, AttributeValue::Int(15)),
            point(2.0, 2.0, AttributeValue::String("high".into())),
            point(2.0, 2.0, AttributeValue::Null),
            Feature::empty().with_property("Z", AttributeValue::Float(5.0)),
        ]
        .into_iter()
        .collect();

        let result = levels_to_points(&stack, &points, &PointsParams::default()).unwrap();
        assert_eq!(result.len(), 5);
        assert!(points.features[0].get_property("Variable").is_none());

        let value = |i: usize| result.features[i].get_property("Variable").cloned();
        match value(0) {
            Some(AttributeValue::Float(v)) => assert_relative_eq!(v, 50.0, epsilon = 1e-9),
            other => panic!("unexpected {:?}", other),
        }
        match value(1) {
            Some(AttributeValue::Float(v)) => assert_relative_eq!(v, 200.0, epsilon = 1e-9),
            other => panic!("unexpected {:?}", other),
        }
        for i in 2..5 {
            assert_eq!(value(i), Some(AttributeValue::Null), "feature {}", i);
        }
    }

    #[test]
    fn test_in_place_and_field_name_fallback() {
        let (a, b) = (grid(1.0), grid(3.0));
        let stack = LevelStack::with_height_table(vec![&a, &b], vec![0.0, 1.0]);
        let interpolator = LevelInterpolator::new(&stack, LevelInterpolationParams::default());

        let mut points: FeatureCollection = vec![
            Feature::point(1.5, 1.5).with_property("height", AttributeValue::Float(0.5)),
        ]
        .into_iter()
        .collect();

        levels_to_points_in_place(&interpolator, &mut points, "height", "").unwrap();
        match points.features[0].get_property("Variable") {
            Some(AttributeValue::Float(v)) => assert_relative_eq!(*v, 2.0, epsilon = 1e-9),
            other => panic!("unexpected {:?}", other),
        }

        levels_to_points_in_place(&interpolator, &mut points, "height", "T").unwrap();
        assert!(points.features[0].get_property("T").is_some());
    }

    #[test]
    fn test_no_points() {
        let a = grid(1.0);
        let stack = LevelStack::with_height_table(vec![&a], vec![0.0]);
        let err = levels_to_points(&stack, &FeatureCollection::new(), &PointsParams::default()).unwrap_err();
        assert!(matches!(err, Error::Algorithm(_)), "{}", err);
    }

    #[test]
    fn test_points_disjoint() {
        let (a, b) = (grid(1.0), grid(3.0));
        let stack = LevelStack::with_height_table(vec![&a, &b], vec![0.0, 1.0]);
        let points: FeatureCollection = vec![point(50.0, 50.0, AttributeValue::Float(0.5))]
            .into_iter()
            .collect();

        let tool = LevelsToPoints::new();
        let err = tool.execute_default((&stack, &points)).unwrap_err();
        assert!(matches!(err, Error::DisjointExtent), "{}", err);
    }
}
