use terra_engine::coords::{Rect, Vec2};

use crate::constraints::{Constraints, Edges, LayoutCtx};
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;
use crate::widget::{Element, Widget};

/// Vertical stack. Children get the full inner width and their measured
/// height.
#[derive(Default)]
pub struct Column {
    children: Vec<Element>,
    spacing:  f32,
    padding:  Edges,
}

impl Column {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spacing(mut self, v: f32) -> Self {
        self.spacing = v;
        self
    }

    pub fn padding(mut self, edges: Edges) -> Self {
        self.padding = edges;
        self
    }

    pub fn child(mut self, child: impl Into<Element>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn push(&mut self, child: impl Into<Element>) {
        self.children.push(child.into());
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn child_rects(&self, rect: Rect, ctx: &LayoutCtx) -> Vec<Rect> {
        let inner = self.padding.apply(rect);
        let constraints = Constraints::loose(inner.size).for_row();
        let mut y = inner.origin.y;
        self.children
            .iter()
            .map(|child| {
                let h = child.measure(constraints, ctx).y;
                let r = Rect::new(inner.origin.x, y, inner.size.x, h);
                y += h + self.spacing;
                r
            })
            .collect()
    }
}

impl Widget for Column {
    fn measure(&self, constraints: Constraints, ctx: &LayoutCtx) -> Vec2 {
        let inner = constraints.shrink(self.padding).for_row();
        let heights: f32 = self.children.iter().map(|c| c.measure(inner, ctx).y).sum();
        let gaps = self.spacing * self.children.len().saturating_sub(1) as f32;
        let width = if constraints.max.x.is_finite() { constraints.max.x } else { inner.min.x + self.padding.h() };
        constraints.constrain(Vec2::new(width, heights + gaps + self.padding.v()))
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        let rects = self.child_rects(rect, &painter.layout_ctx());
        for (child, r) in self.children.iter().zip(rects) {
            child.paint(painter, r);
        }
    }

    fn on_event(&mut self, event: &UiEvent, rect: Rect, ctx: &LayoutCtx) -> EventResult {
        let rects = self.child_rects(rect, ctx);
        let mut result = EventResult::Ignored;
        for (child, r) in self.children.iter_mut().zip(rects) {
            result = result.or(child.on_event(event, r, ctx));
            if result.is_consumed() && !matches!(event, UiEvent::Hover { .. }) {
                break;
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use terra_engine::text::FontSystem;

    use super::*;

    struct Fixed(f32);

    impl Widget for Fixed {
        fn measure(&self, c: Constraints, _ctx: &LayoutCtx) -> Vec2 {
            c.constrain(Vec2::new(0.0, self.0))
        }
        fn paint(&self, _painter: &mut Painter, _rect: Rect) {}
    }

    #[test]
    fn stacks_with_spacing_and_padding() {
        let fonts = FontSystem::new();
        let ctx = LayoutCtx { fonts: &fonts, scale: 1.0 };
        let col = Column::new().spacing(2.0).padding(Edges::all(5.0)).child(Fixed(10.0)).child(Fixed(20.0));

        let size = col.measure(Constraints::loose(Vec2::new(100.0, 500.0)), &ctx);
        assert_eq!(size, Vec2::new(100.0, 10.0 + 2.0 + 20.0 + 10.0));

        let rects = col.child_rects(Rect::new(0.0, 0.0, 100.0, size.y), &ctx);
        assert_eq!(rects, vec![Rect::new(5.0, 5.0, 90.0, 10.0), Rect::new(5.0, 17.0, 90.0, 20.0)]);
    }

    #[test]
    fn empty_column_is_just_padding() {
        let fonts = FontSystem::new();
        let ctx = LayoutCtx { fonts: &fonts, scale: 1.0 };
        let size = Column::new().padding(Edges::all(4.0)).measure(Constraints::loose(Vec2::new(50.0, 50.0)), &ctx);
        assert_eq!(size, Vec2::new(50.0, 8.0));
    }
}
