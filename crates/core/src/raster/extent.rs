//! Axis-aligned bounding boxes

use serde::{Deserialize, Serialize};

/// Axis-aligned geographic extent `(x_min, y_min, x_max, y_max)`.
///
/// Intersection and containment tests are inclusive, so extents that only
/// touch, and degenerate extents built from a single point, still intersect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Extent {
    /// Create an extent, normalizing swapped corners
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min: x_min.min(x_max),
            y_min: y_min.min(y_max),
            x_max: x_min.max(x_max),
            y_max: y_min.max(y_max),
        }
    }

    /// Degenerate extent covering a single point
    pub fn from_point(x: f64, y: f64) -> Self {
        Self::new(x, y, x, y)
    }

    /// Smallest extent covering all given points, `None` if there are none
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        points.into_iter().fold(None, |acc: Option<Extent>, (x, y)| {
            Some(match acc {
                Some(e) => e.expand_to(x, y),
                None => Extent::from_point(x, y),
            })
        })
    }

    /// Grow the extent so that it covers (x, y)
    pub fn expand_to(self, x: f64, y: f64) -> Self {
        Self {
            x_min: self.x_min.min(x),
            y_min: self.y_min.min(y),
            x_max: self.x_max.max(x),
            y_max: self.y_max.max(y),
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Whether (x, y) lies inside or on the border
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }

    /// Whether the two extents share at least one point
    pub fn intersects(&self, other: &Extent) -> bool {
        self.x_min <= other.x_max
            && other.x_min <= self.x_max
            && self.y_min <= other.y_max
            && other.y_min <= self.y_max
    }
}

impl From<(f64, f64, f64, f64)> for Extent {
    fn from(bounds: (f64, f64, f64, f64)) -> Self {
        Extent::new(bounds.0, bounds.1, bounds.2, bounds.3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersects_overlap_and_touch() {
        let a = Extent::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Extent::new(5.0, 5.0, 15.0, 15.0)));
        assert!(a.intersects(&Extent::new(10.0, 0.0, 20.0, 10.0)));
        assert!(!a.intersects(&Extent::new(10.5, 0.0, 20.0, 10.0)));
        assert!(!a.intersects(&Extent::new(0.0, -5.0, 10.0, -0.1)));
    }

    #[test]
    fn test_point_extent() {
        let a = Extent::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Extent::from_point(3.0, 4.0)));
        assert!(!a.intersects(&Extent::from_point(30.0, 4.0)));
    }

    #[test]
    fn test_from_points() {
        assert!(Extent::from_points(Vec::new()).is_none());
        let e = Extent::from_points(vec![(1.0, 5.0), (-2.0, 3.0), (4.0, -1.0)]).unwrap();
        assert_eq!(e, Extent::new(-2.0, -1.0, 4.0, 5.0));
        assert_eq!(e.width(), 6.0);
        assert_eq!(e.height(), 6.0);
    }

    #[test]
    fn test_new_normalizes() {
        let e = Extent::new(10.0, 10.0, 0.0, 0.0);
        assert_eq!(e.x_min, 0.0);
        assert_eq!(e.y_max, 10.0);
        assert!(e.contains(0.0, 10.0));
    }
}
