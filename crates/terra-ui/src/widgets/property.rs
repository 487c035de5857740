use terra_engine::coords::{Rect, Vec2};
use terra_engine::paint::Color;
use terra_engine::text::FontId;

use crate::constraints::{Constraints, LayoutCtx};
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;
use crate::theme::Theme;
use crate::widget::{Element, Widget};

/// Label on the left, control on the right.
pub struct Property {
    label:       String,
    control:     Element,
    label_ratio: f32,
    font:        FontId,
    text_size:   f32,
    color:       Color,
}

impl Property {
    pub fn new(theme: &Theme, label: impl Into<String>, control: impl Into<Element>) -> Self {
        Self {
            label: label.into(),
            control: control.into(),
            label_ratio: theme.label_ratio,
            font: theme.font,
            text_size: theme.text_size,
            color: theme.label,
        }
    }

    fn split(&self, rect: Rect) -> (Rect, Rect) {
        rect.split_left(rect.size.x * self.label_ratio)
    }
}

impl Widget for Property {
    fn measure(&self, constraints: Constraints, ctx: &LayoutCtx) -> Vec2 {
        let w = if constraints.max.x.is_finite() { constraints.max.x } else { 240.0 };
        let control_w = w * (1.0 - self.label_ratio);
        let control = self.control.measure(Constraints::width(control_w, constraints.max.y), ctx);
        let label = ctx.fonts.measure_text(&self.label, self.font, self.text_size, None);
        constraints.constrain(Vec2::new(w, control.y.max(label.y)))
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        let (label, control) = self.split(rect);
        painter.push_clip(label);
        painter.text_in(&self.label, self.font, self.text_size, self.color, label.inset(0.0, 0.0, 6.0, 0.0), false);
        painter.pop_clip();
        self.control.paint(painter, control);
    }

    fn on_event(&mut self, event: &UiEvent, rect: Rect, ctx: &LayoutCtx) -> EventResult {
        let (_, control) = self.split(rect);
        self.control.on_event(event, control, ctx)
    }
}
