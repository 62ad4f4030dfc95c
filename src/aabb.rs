//! Axis-aligned bounding boxes for broadphase pruning.

use glam::Vec3;

/// World-space axis-aligned bounding box.
///
/// [`Aabb::EMPTY`] is inverted (`min = +inf`, `max = -inf`) so that including
/// the first point yields a degenerate box around it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Self = Self {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Zero-volume box around a single point.
    pub fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Bounds of a triangle.
    pub fn from_triangle(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let mut aabb = Self::from_point(a);
        aabb.include_point(b);
        aabb.include_point(c);
        aabb
    }

    /// Bounds of a point set. Empty input gives [`Aabb::EMPTY`].
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut aabb = Self::EMPTY;
        for p in points {
            aabb.include_point(p);
        }
        aabb
    }

    /// True while nothing has been included.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    #[inline]
    pub fn include_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    #[inline]
    pub fn include_aabb(&mut self, other: &Aabb) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Grow the box by `margin` on every side.
    pub fn inflated(&self, margin: f32) -> Aabb {
        Aabb {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }

    /// Overlap test on all three axes. Touching faces count as overlapping.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
            && self.min.z <= other.max.z
            && other.min.z <= self.max.z
    }

    /// True if `other` lies entirely inside this box.
    pub fn contains_aabb(&self, other: &Aabb) -> bool {
        self.min.cmple(other.min).all() && other.max.cmple(self.max).all()
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.min.cmple(point).all() && point.cmple(self.max).all()
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn extent_axis(&self, axis: usize) -> f32 {
        self.max[axis] - self.min[axis]
    }

    pub fn center(&self) -> Vec3 {
        (self.max + self.min) * 0.5
    }

    pub fn center_axis(&self, axis: usize) -> f32 {
        (self.max[axis] + self.min[axis]) * 0.5
    }

    /// Index of the longest axis (0 = X, 1 = Y, 2 = Z). Ties go to the lower index.
    pub fn longest_axis(&self) -> usize {
        let e = self.extent();
        if e.x >= e.y && e.x >= e.z {
            0
        } else if e.y >= e.z {
            1
        } else {
            2
        }
    }

    /// The 8 corners, indexed by bit pattern (bit 0 = x, bit 1 = y, bit 2 = z).
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            )
        })
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
