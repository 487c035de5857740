use terra_engine::coords::{Rect, Vec2};
use terra_engine::text::FontSystem;

/// Insets on four sides.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Edges {
    pub top:    f32,
    pub right:  f32,
    pub bottom: f32,
    pub left:   f32,
}

impl Edges {
    #[inline]
    pub fn all(v: f32) -> Self {
        Self { top: v, right: v, bottom: v, left: v }
    }

    #[inline]
    pub fn symmetric(vertical: f32, horizontal: f32) -> Self {
        Self { top: vertical, bottom: vertical, left: horizontal, right: horizontal }
    }

    #[inline]
    pub fn h(self) -> f32 {
        self.left + self.right
    }

    #[inline]
    pub fn v(self) -> f32 {
        self.top + self.bottom
    }

    #[inline]
    pub fn apply(self, rect: Rect) -> Rect {
        rect.inset(self.left, self.top, self.right, self.bottom)
    }
}

/// Size range a parent allows a child during measure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraints {
    pub min: Vec2,
    pub max: Vec2,
}

impl Constraints {
    #[inline]
    pub fn tight(size: Vec2) -> Self {
        Self { min: size, max: size }
    }

    #[inline]
    pub fn loose(max: Vec2) -> Self {
        Self { min: Vec2::ZERO, max }
    }

    /// Fixed width, any height up to `max_height`.
    #[inline]
    pub fn width(width: f32, max_height: f32) -> Self {
        Self { min: Vec2::new(width, 0.0), max: Vec2::new(width, max_height) }
    }

    #[must_use]
    pub fn constrain(self, size: Vec2) -> Vec2 {
        Vec2::new(
            size.x.max(self.min.x).min(self.max.x),
            size.y.max(self.min.y).min(self.max.y),
        )
    }

    /// Removes `edges` from the maximum; the minimum drops to zero.
    #[must_use]
    pub fn shrink(self, edges: Edges) -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::new((self.max.x - edges.h()).max(0.0), (self.max.y - edges.v()).max(0.0)),
        }
    }

    /// Width known, height left open: how vertical stacks measure children.
    #[must_use]
    pub fn for_row(self) -> Self {
        let w = if self.max.x.is_finite() { self.max.x } else { 0.0 };
        Self { min: Vec2::new(w, 0.0), max: Vec2::new(self.max.x, f32::INFINITY) }
    }
}

/// Shared resources for measure and event routing.
pub struct LayoutCtx<'a> {
    pub fonts: &'a FontSystem,
    pub scale: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constrain_clamps_both_ways() {
        let c = Constraints { min: Vec2::new(10.0, 10.0), max: Vec2::new(50.0, 50.0) };
        assert_eq!(c.constrain(Vec2::new(5.0, 80.0)), Vec2::new(10.0, 50.0));
        assert_eq!(c.constrain(Vec2::new(20.0, 30.0)), Vec2::new(20.0, 30.0));
    }

    #[test]
    fn shrink_never_goes_negative() {
        let c = Constraints::loose(Vec2::new(100.0, 8.0)).shrink(Edges::all(6.0));
        assert_eq!(c.max, Vec2::new(88.0, 0.0));
        assert_eq!(c.min, Vec2::ZERO);
    }

    #[test]
    fn row_constraints_fix_width_and_free_height() {
        let c = Constraints::loose(Vec2::new(200.0, 40.0)).for_row();
        assert_eq!(c.min.x, 200.0);
        assert!(c.max.y.is_infinite());

        let unbounded = Constraints::loose(Vec2::new(f32::INFINITY, 40.0)).for_row();
        assert_eq!(unbounded.min.x, 0.0);
    }

    #[test]
    fn edges_apply_insets_rect() {
        let e = Edges { top: 4.0, right: 10.0, bottom: 8.0, left: 6.0 };
        assert_eq!(e.apply(Rect::new(5.0, 5.0, 100.0, 60.0)), Rect::new(11.0, 9.0, 84.0, 48.0));
        assert_eq!((e.h(), e.v()), (16.0, 12.0));
    }
}
