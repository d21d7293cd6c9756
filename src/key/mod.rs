//! The key abstraction the tree is generic over: a 2-D [`Rect`] or a 1-D
//! [`Interval`]. Both implement [`Key`]; the tree's algorithmic core never
//! names either type directly.

mod interval;
mod rect;

pub use interval::Interval;
pub use rect::Rect;

/// Operations the tree needs from a bounding key, independent of its
/// dimensionality.
///
/// `union`, `contains`, and `overlaps` are all closed on both ends (a key
/// that merely touches another at a boundary point counts as overlapping
/// and as contained).
pub trait Key: Copy {
    /// A per-axis motion vector: `glam::Vec2` for [`Rect`], `f32` for
    /// [`Interval`]. Used by `Tree::move_leaf`'s asymmetric padding.
    type Delta: Copy;

    /// The tightest key enclosing both `self` and `other`.
    fn union(self, other: Self) -> Self;

    /// `true` iff `self` lies entirely inside `other` (closed on both ends).
    fn contained_in(self, other: Self) -> bool;

    /// `true` iff `self` and `other` share at least one point.
    fn overlaps(self, other: Self) -> bool;

    /// Grow `self` outward by `amount` on each side, in every dimension
    /// (so each extent grows by `2 * amount`).
    fn expand(self, amount: f32) -> Self;

    /// The surface-area cost used by the optimal-sibling search: `w * h`
    /// for a rectangle, `length` for an interval.
    fn surface_area(self) -> f32;

    /// Scale a motion vector by a scalar factor (`Tree::move_leaf`'s
    /// `offset * move_constant`).
    fn scale_delta(delta: Self::Delta, factor: f32) -> Self::Delta;

    /// Extend `self` asymmetrically per axis: a negative component of
    /// `delta` pushes the low edge outward, a non-negative component
    /// pushes the high edge outward.
    fn expand_towards(self, delta: Self::Delta) -> Self;
}
