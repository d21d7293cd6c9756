use glam::Vec2;

use super::Key;

/// An axis-aligned rectangle: origin `(x, y)` and positive extents
/// `(w, h)`. Stored internally as `min`/`max`, the representation the
/// teacher's `Aabb` type uses, since it makes `union`/`contains`/
/// `overlaps` a pair of component-wise comparisons instead of four
/// scalar ones.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub const ZERO: Self = Self {
        min: Vec2::ZERO,
        max: Vec2::ZERO,
    };

    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        let min = Vec2::new(x, y);
        Self {
            min,
            max: min + Vec2::new(w, h),
        }
    }

    /// A zero-extent rectangle anchored at `point`, for point queries.
    pub fn at_point(point: Vec2) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    pub fn x(self) -> f32 {
        self.min.x
    }

    pub fn y(self) -> f32 {
        self.min.y
    }

    pub fn w(self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn h(self) -> f32 {
        self.max.y - self.min.y
    }
}

impl Key for Rect {
    type Delta = Vec2;

    fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    fn contained_in(self, other: Self) -> bool {
        (other.min.cmple(self.min) & self.max.cmple(other.max)).all()
    }

    fn overlaps(self, other: Self) -> bool {
        !(self.max.x < other.min.x
            || other.max.x < self.min.x
            || self.max.y < other.min.y
            || other.max.y < self.min.y)
    }

    fn expand(self, amount: f32) -> Self {
        let pad = Vec2::splat(amount);
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    fn surface_area(self) -> f32 {
        self.w() * self.h()
    }

    fn scale_delta(delta: Self::Delta, factor: f32) -> Self::Delta {
        delta * factor
    }

    /// Per axis: a negative component of `delta` pushes the low edge
    /// outward by its magnitude; a non-negative component pushes the
    /// high edge outward by `delta`. Skews a fat key toward the
    /// direction of motion.
    fn expand_towards(self, delta: Vec2) -> Self {
        let mut min = self.min;
        let mut max = self.max;

        if delta.x < 0.0 {
            min.x += delta.x;
        } else {
            max.x += delta.x;
        }

        if delta.y < 0.0 {
            min.y += delta.y;
        } else {
            max.y += delta.y;
        }

        Self { min, max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_is_tightest_enclosing_rect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, -5.0, 10.0, 10.0);
        let u = a.union(b);
        assert_eq!(u.min, Vec2::new(0.0, -5.0));
        assert_eq!(u.max, Vec2::new(15.0, 10.0));
    }

    #[test]
    fn contains_is_closed_on_both_ends() {
        let outer = Rect::new(0.0, 0.0, 10.0, 10.0);
        let touching_edge = Rect::new(10.0, 0.0, 0.0, 10.0);
        assert!(touching_edge.contained_in(outer));

        let escaping = Rect::new(10.0, 0.0, 0.1, 10.0);
        assert!(!escaping.contained_in(outer));
    }

    #[test]
    fn overlaps_counts_touching_boundaries() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(b));

        let c = Rect::new(10.1, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(c));
    }

    #[test]
    fn expand_grows_symmetrically_by_double() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let e = r.expand(2.0);
        assert_eq!(e.min, Vec2::new(-2.0, -2.0));
        assert_eq!(e.max, Vec2::new(12.0, 12.0));
        assert_eq!(e.w(), r.w() + 4.0);
    }

    #[test]
    fn surface_area_is_w_times_h() {
        let r = Rect::new(0.0, 0.0, 4.0, 3.0);
        assert_eq!(r.surface_area(), 12.0);
    }
}
