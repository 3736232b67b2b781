//! Axis-aligned bounding boxes

use std::fmt;
use std::fmt::Debug;

use nalgebra::Vector3;

use crate::Real;

/// Type representing an axis aligned bounding box in three dimensions
#[derive(Clone, PartialEq)]
pub struct Aabb3d<R: Real> {
    min: Vector3<R>,
    max: Vector3<R>,
}

impl<R: Real> Aabb3d<R> {
    /// Constructs a degenerate AABB with min and max set to zero
    #[inline(always)]
    pub fn zeros() -> Self {
        Self::from_point(Vector3::zeros())
    }

    /// Constructs an AABB with the given min and max bounding points
    #[inline(always)]
    pub fn new(min: Vector3<R>, max: Vector3<R>) -> Self {
        Self { min, max }
    }

    /// Constructs a degenerate AABB with zero extents centered at the given point
    #[inline(always)]
    pub fn from_point(point: Vector3<R>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Constructs the smallest AABB fitting around all the given points
    /// ```
    /// use relief_lib::Aabb3d;
    /// use relief_lib::nalgebra::Vector3;
    ///
    /// assert_eq!(
    ///     Aabb3d::<f64>::from_points(&[]),
    ///     Aabb3d::<f64>::zeros()
    /// );
    ///
    /// let aabb = Aabb3d::<f64>::from_points(&[
    ///     Vector3::new(1.0, 1.0, 1.0),
    ///     Vector3::new(0.5, 3.0, 5.0),
    ///     Vector3::new(-1.0, 1.0, 1.0)
    /// ]);
    /// assert_eq!(aabb.min(), &Vector3::new(-1.0, 1.0, 1.0));
    /// assert_eq!(aabb.max(), &Vector3::new(1.0, 3.0, 5.0));
    /// ```
    pub fn from_points(points: &[Vector3<R>]) -> Self {
        let mut point_iter = points.iter();
        if let Some(first_point) = point_iter.next().cloned() {
            let mut aabb = Self::from_point(first_point);
            for next_point in point_iter {
                aabb.join_with_point(next_point)
            }
            aabb
        } else {
            Self::zeros()
        }
    }

    /// Tries to convert the AABB from one real type to another real type, returns None if conversion fails
    pub fn try_convert<T: Real>(&self) -> Option<Aabb3d<T>> {
        let convert = |v: &Vector3<R>| -> Option<Vector3<T>> {
            Some(Vector3::new(
                v.x.try_convert()?,
                v.y.try_convert()?,
                v.z.try_convert()?,
            ))
        };
        Some(Aabb3d::new(convert(&self.min)?, convert(&self.max)?))
    }

    /// Returns the min coordinate of the bounding box
    #[inline(always)]
    pub fn min(&self) -> &Vector3<R> {
        &self.min
    }

    /// Returns the max coordinate of the bounding box
    #[inline(always)]
    pub fn max(&self) -> &Vector3<R> {
        &self.max
    }

    /// Returns whether the AABB is consistent, i.e. `aabb.min()[i] <= aabb.max()[i]` for all `i`
    pub fn is_consistent(&self) -> bool {
        self.min <= self.max
    }

    /// Returns whether the AABB is degenerate in any dimension, i.e. `aabb.min()[i] == aabb.max()[i]` for any `i`
    pub fn is_degenerate(&self) -> bool {
        self.min.x == self.max.x || self.min.y == self.max.y || self.min.z == self.max.z
    }

    /// Returns the extents of the bounding box (vector connecting min and max point of the box)
    #[inline(always)]
    pub fn extents(&self) -> Vector3<R> {
        self.max - self.min
    }

    /// Enlarges this AABB to the smallest AABB enclosing both itself and another point
    pub fn join_with_point(&mut self, point: &Vector3<R>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }
}

impl<R: Real> Debug for Aabb3d<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Aabb3d {{ min: [{:.7}, {:.7}, {:.7}], max: [{:.7}, {:.7}, {:.7}] }}",
            self.min[0], self.min[1], self.min[2], self.max[0], self.max[1], self.max[2]
        )
    }
}

#[test]
fn test_aabb_from_points_is_consistent() {
    let aabb = Aabb3d::<f64>::from_points(&[
        Vector3::new(0.5, -0.5, 0.1),
        Vector3::new(-0.5, 0.5, 0.0),
        Vector3::new(0.0, 0.0, 0.2),
    ]);

    assert!(aabb.is_consistent());
    assert_eq!(aabb.min(), &Vector3::new(-0.5, -0.5, 0.0));
    assert_eq!(aabb.max(), &Vector3::new(0.5, 0.5, 0.2));
    assert_eq!(aabb.extents(), Vector3::new(1.0, 1.0, 0.2));
}

#[test]
fn test_aabb_degenerate() {
    assert!(Aabb3d::<f64>::zeros().is_degenerate());
    assert!(Aabb3d::<f64>::from_point(Vector3::new(1.0, 2.0, 3.0)).is_degenerate());
    assert!(
        !Aabb3d::new(Vector3::new(-1.0, 0.0, -3.0), Vector3::new(2.0, 2.0, 4.0)).is_degenerate()
    );
}
