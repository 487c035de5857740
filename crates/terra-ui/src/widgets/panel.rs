use std::cell::Cell;
use std::rc::Rc;

use terra_engine::coords::{Rect, Vec2};
use terra_engine::paint::Color;
use terra_engine::text::FontId;

use crate::constraints::{Constraints, Edges, LayoutCtx};
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;
use crate::theme::Theme;
use crate::widget::{Element, Widget};

/// Outer frame of a pane: title bar and a padded, opaque body. Clicking the
/// title collapses the body.
pub struct PanelFrame {
    title:      String,
    collapsed:  Rc<Cell<bool>>,
    body:       Element,
    title_h:    f32,
    padding:    Edges,
    font:       FontId,
    title_size: f32,
    bg:         Color,
    title_bg:   Color,
    text:       Color,
}

impl PanelFrame {
    pub fn new(theme: &Theme, title: impl Into<String>, collapsed: Rc<Cell<bool>>, body: impl Into<Element>) -> Self {
        Self {
            title: title.into(),
            collapsed,
            body: body.into(),
            title_h: theme.row_height + 2.0,
            padding: Edges::all(theme.padding),
            font: theme.font,
            title_size: theme.title_size,
            bg: theme.panel_bg,
            title_bg: theme.title_bg,
            text: theme.value,
        }
    }

    fn split(&self, rect: Rect) -> (Rect, Rect) {
        let (title, body) = rect.split_top(self.title_h);
        (title, self.padding.apply(body))
    }
}

impl Widget for PanelFrame {
    fn measure(&self, constraints: Constraints, ctx: &LayoutCtx) -> Vec2 {
        let w = if constraints.max.x.is_finite() { constraints.max.x } else { 280.0 };
        let body = if self.collapsed.get() {
            0.0
        } else {
            let inner = Constraints::width((w - self.padding.h()).max(0.0), f32::INFINITY);
            self.body.measure(inner, ctx).y + self.padding.v()
        };
        constraints.constrain(Vec2::new(w, self.title_h + body))
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        let (title, body) = self.split(rect);
        painter.fill_rect(rect, self.bg);
        painter.fill_rect(title, self.title_bg);
        painter.text_in(&self.title, self.font, self.title_size, self.text, title.inset(8.0, 0.0, 8.0, 0.0), false);
        let marker = if self.collapsed.get() { "+" } else { "-" };
        painter.text_in(marker, self.font, self.title_size, self.text, title.inset(8.0, 0.0, 10.0, 0.0), true);
        if !self.collapsed.get() {
            painter.push_clip(rect);
            self.body.paint(painter, body);
            painter.pop_clip();
        }
    }

    fn on_event(&mut self, event: &UiEvent, rect: Rect, ctx: &LayoutCtx) -> EventResult {
        let (title, body) = self.split(rect);
        if let UiEvent::Click { pos } = event {
            if title.contains(*pos) {
                self.collapsed.set(!self.collapsed.get());
                return EventResult::Consumed;
            }
        }
        if self.collapsed.get() {
            return EventResult::Ignored;
        }
        let result = self.body.on_event(event, body, ctx);
        // The frame is opaque; anything landing on it stops here.
        match event {
            UiEvent::Click { pos } if rect.contains(*pos) => EventResult::Consumed,
            _ => result,
        }
    }
}
