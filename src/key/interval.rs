use super::Key;

/// A 1-D interval: origin `x` and positive `length`. The dimensional
/// twin of [`Rect`](super::Rect) — same algorithm, one axis instead of two.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub const ZERO: Self = Self { min: 0.0, max: 0.0 };

    pub fn new(x: f32, length: f32) -> Self {
        Self {
            min: x,
            max: x + length,
        }
    }

    /// A zero-length interval anchored at `point`, for point queries.
    pub fn at_point(point: f32) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    pub fn x(self) -> f32 {
        self.min
    }

    pub fn length(self) -> f32 {
        self.max - self.min
    }
}

impl Key for Interval {
    type Delta = f32;

    fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    fn contained_in(self, other: Self) -> bool {
        other.min <= self.min && self.max <= other.max
    }

    fn overlaps(self, other: Self) -> bool {
        !(self.max < other.min || other.max < self.min)
    }

    fn expand(self, amount: f32) -> Self {
        Self {
            min: self.min - amount,
            max: self.max + amount,
        }
    }

    fn surface_area(self) -> f32 {
        self.length()
    }

    fn scale_delta(delta: Self::Delta, factor: f32) -> Self::Delta {
        delta * factor
    }

    /// A negative `delta` pushes the low edge outward by its magnitude;
    /// a non-negative `delta` pushes the high edge outward by `delta`.
    fn expand_towards(self, delta: f32) -> Self {
        if delta < 0.0 {
            Self {
                min: self.min + delta,
                max: self.max,
            }
        } else {
            Self {
                min: self.min,
                max: self.max + delta,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_is_tightest_enclosing_interval() {
        let a = Interval::new(0.0, 10.0);
        let b = Interval::new(5.0, 10.0);
        let u = a.union(b);
        assert_eq!(u.min, 0.0);
        assert_eq!(u.max, 15.0);
    }

    #[test]
    fn contains_is_closed_on_both_ends() {
        let outer = Interval::new(0.0, 10.0);
        let touching_edge = Interval::new(10.0, 0.0);
        assert!(touching_edge.contained_in(outer));

        let escaping = Interval::new(10.0, 0.1);
        assert!(!escaping.contained_in(outer));
    }

    #[test]
    fn expand_grows_symmetrically_by_double() {
        let i = Interval::new(0.0, 10.0);
        let e = i.expand(2.0);
        assert_eq!(e.min, -2.0);
        assert_eq!(e.max, 12.0);
        assert_eq!(e.length(), i.length() + 4.0);
    }

    #[test]
    fn surface_area_is_length() {
        let i = Interval::new(0.0, 7.0);
        assert_eq!(i.surface_area(), 7.0);
    }
}
