use terra_engine::coords::{Rect, Vec2};
use terra_engine::paint::Color;
use terra_engine::text::FontId;

use crate::constraints::{Constraints, LayoutCtx};
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;
use crate::theme::Theme;
use crate::widget::Widget;

/// Segmented control: one button per option, exactly one selected.
pub struct Choice {
    options:   Vec<String>,
    selected:  usize,
    height:    f32,
    font:      FontId,
    text_size: f32,
    idle:      Color,
    hover:     Color,
    active:    Color,
    text:      Color,
    on_select: Option<Box<dyn FnMut(usize)>>,
}

impl Choice {
    pub fn new<S: Into<String>>(theme: &Theme, options: impl IntoIterator<Item = S>) -> Self {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            selected: 0,
            height: theme.row_height,
            font: theme.font,
            text_size: theme.text_size,
            idle: theme.control_bg,
            hover: theme.hover_bg,
            active: theme.accent,
            text: theme.value,
            on_select: None,
        }
    }

    pub fn selected(mut self, index: usize) -> Self {
        self.selected = index;
        self
    }

    pub fn on_select(mut self, f: impl FnMut(usize) + 'static) -> Self {
        self.on_select = Some(Box::new(f));
        self
    }

    fn segments(&self, rect: Rect) -> Vec<Rect> {
        let n = self.options.len().max(1) as f32;
        let inner = rect.inset(0.0, 2.0, 0.0, 2.0);
        let w = inner.size.x / n;
        (0..self.options.len())
            .map(|i| Rect::new(inner.origin.x + w * i as f32, inner.origin.y, w - 1.0, inner.size.y))
            .collect()
    }
}

impl Widget for Choice {
    fn measure(&self, constraints: Constraints, _ctx: &LayoutCtx) -> Vec2 {
        let w = if constraints.max.x.is_finite() { constraints.max.x } else { 60.0 * self.options.len() as f32 };
        constraints.constrain(Vec2::new(w, self.height))
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        for (i, (seg, option)) in self.segments(rect).into_iter().zip(&self.options).enumerate() {
            let bg = if i == self.selected {
                self.active
            } else if painter.is_hovered(seg) {
                self.hover
            } else {
                self.idle
            };
            painter.fill_rect(seg, bg);

            let size = painter.measure_text(option, self.font, self.text_size);
            let label = Rect::new(seg.center().x - size.x * 0.5, seg.origin.y, size.x, seg.size.y);
            painter.push_clip(seg);
            painter.text_in(option, self.font, self.text_size, self.text, label, false);
            painter.pop_clip();
        }
    }

    fn on_event(&mut self, event: &UiEvent, rect: Rect, _ctx: &LayoutCtx) -> EventResult {
        let UiEvent::Click { pos } = event else {
            return EventResult::Ignored;
        };
        let Some(index) = self.segments(rect).iter().position(|s| s.contains(*pos)) else {
            return EventResult::Ignored;
        };
        if index != self.selected {
            self.selected = index;
            if let Some(f) = &mut self.on_select {
                f(index);
            }
        }
        EventResult::Consumed
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use terra_engine::text::FontSystem;

    use super::*;

    #[test]
    fn click_selects_segment_under_pointer() {
        let fonts = FontSystem::new();
        let ctx = LayoutCtx { fonts: &fonts, scale: 1.0 };
        let picked = Rc::new(Cell::new(None));
        let sink = Rc::clone(&picked);
        let mut choice = Choice::new(&Theme::default(), ["low", "medium", "high", "ultra"])
            .selected(1)
            .on_select(move |i| sink.set(Some(i)));

        let rect = Rect::new(0.0, 0.0, 400.0, 24.0);
        let click = UiEvent::Click { pos: Vec2::new(350.0, 12.0) };
        assert!(choice.on_event(&click, rect, &ctx).is_consumed());
        assert_eq!(picked.get(), Some(3));
    }

    #[test]
    fn reselecting_current_option_is_silent() {
        let fonts = FontSystem::new();
        let ctx = LayoutCtx { fonts: &fonts, scale: 1.0 };
        let picked = Rc::new(Cell::new(None));
        let sink = Rc::clone(&picked);
        let mut choice = Choice::new(&Theme::default(), ["a", "b"]).on_select(move |i| sink.set(Some(i)));

        let click = UiEvent::Click { pos: Vec2::new(10.0, 12.0) };
        assert!(choice.on_event(&click, Rect::new(0.0, 0.0, 100.0, 24.0), &ctx).is_consumed());
        assert_eq!(picked.get(), None);
    }

    #[test]
    fn click_outside_segments_is_ignored() {
        let fonts = FontSystem::new();
        let ctx = LayoutCtx { fonts: &fonts, scale: 1.0 };
        let mut choice = Choice::new(&Theme::default(), ["a", "b"]);
        let click = UiEvent::Click { pos: Vec2::new(10.0, 40.0) };
        assert_eq!(choice.on_event(&click, Rect::new(0.0, 0.0, 100.0, 24.0), &ctx), EventResult::Ignored);
    }
}
