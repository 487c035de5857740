use std::cell::Cell;
use std::rc::Rc;

use terra_engine::coords::{Rect, Vec2};
use terra_engine::paint::Color;
use terra_engine::text::FontId;

use crate::constraints::{Constraints, LayoutCtx};
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;
use crate::theme::Theme;
use crate::widget::{Element, Widget};

/// Collapsible group: a clickable header over a body that is laid out only
/// while open.
///
/// The open flag lives outside the widget so it survives the per-frame
/// rebuild of the tree.
pub struct Folder {
    title:     String,
    open:      Rc<Cell<bool>>,
    body:      Element,
    header_h:  f32,
    font:      FontId,
    text_size: f32,
    header_bg: Color,
    hover_bg:  Color,
    text:      Color,
}

impl Folder {
    pub fn new(theme: &Theme, title: impl Into<String>, open: Rc<Cell<bool>>, body: impl Into<Element>) -> Self {
        Self {
            title: title.into(),
            open,
            body: body.into(),
            header_h: theme.row_height,
            font: theme.font,
            text_size: theme.text_size,
            header_bg: theme.folder_bg,
            hover_bg: theme.hover_bg,
            text: theme.value,
        }
    }

    fn split(&self, rect: Rect) -> (Rect, Rect) {
        rect.split_top(self.header_h)
    }
}

impl Widget for Folder {
    fn measure(&self, constraints: Constraints, ctx: &LayoutCtx) -> Vec2 {
        let w = if constraints.max.x.is_finite() { constraints.max.x } else { 240.0 };
        let body = if self.open.get() { self.body.measure(constraints.for_row(), ctx).y } else { 0.0 };
        constraints.constrain(Vec2::new(w, self.header_h + body))
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        let (header, body) = self.split(rect);
        painter.fill_rect(header, if painter.is_hovered(header) { self.hover_bg } else { self.header_bg });
        let marker = if self.open.get() { "v" } else { ">" };
        painter.text_in(marker, self.font, self.text_size, self.text, header.inset(6.0, 0.0, 0.0, 0.0), false);
        painter.text_in(&self.title, self.font, self.text_size, self.text, header.inset(20.0, 0.0, 6.0, 0.0), false);
        if self.open.get() {
            self.body.paint(painter, body);
        }
    }

    fn on_event(&mut self, event: &UiEvent, rect: Rect, ctx: &LayoutCtx) -> EventResult {
        let (header, body) = self.split(rect);
        if let UiEvent::Click { pos } = event {
            if header.contains(*pos) {
                self.open.set(!self.open.get());
                return EventResult::Consumed;
            }
        }
        if self.open.get() { self.body.on_event(event, body, ctx) } else { EventResult::Ignored }
    }
}
