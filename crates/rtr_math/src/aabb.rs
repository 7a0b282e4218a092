use crate::{Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box.
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create an empty AABB (contains nothing).
    pub fn empty() -> Self {
        Self {
            x: Interval::EMPTY,
            y: Interval::EMPTY,
            z: Interval::EMPTY,
        }
    }

    /// Smallest AABB containing every point yielded by `points`.
    ///
    /// Returns [`Aabb::empty`] for an empty iterator.
    pub fn enclosing<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        points.into_iter().fold(Self::empty(), |bbox, p| Self {
            x: bbox.x.include(p.x),
            y: bbox.y.include(p.y),
            z: bbox.z.include(p.z),
        })
    }

    /// True if the box contains nothing.
    pub fn is_empty(&self) -> bool {
        self.x.min > self.x.max || self.y.min > self.y.max || self.z.min > self.z.max
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Size of the box along each axis.
    pub fn extent(&self) -> Vec3 {
        Vec3::new(self.x.size(), self.y.size(), self.z.size())
    }

    /// Slab test: does `ray` pass through the box for some `t` in `ray_t`?
    ///
    /// Touching counts, so a flat box (zero size on one axis) can be hit.
    pub fn hit(&self, ray: &Ray, mut ray_t: Interval) -> bool {
        if self.is_empty() {
            return false;
        }
        let (min, max) = (self.min(), self.max());

        for axis in 0..3 {
            let adinv = 1.0 / ray.direction[axis];
            let mut t0 = (min[axis] - ray.origin[axis]) * adinv;
            let mut t1 = (max[axis] - ray.origin[axis]) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max < ray_t.min {
                return false;
            }
        }
        true
    }
}
