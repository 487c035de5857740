use terra_engine::coords::{Rect, Vec2};
use terra_engine::paint::Color;
use terra_engine::text::FontId;

use crate::constraints::{Constraints, LayoutCtx};
use crate::painter::Painter;
use crate::widget::Widget;

/// One line of text.
pub struct Label {
    text:  String,
    font:  FontId,
    size:  f32,
    color: Color,
}

impl Label {
    pub fn new(text: impl Into<String>, font: FontId, size: f32, color: Color) -> Self {
        Self { text: text.into(), font, size, color }
    }
}

impl Widget for Label {
    fn measure(&self, constraints: Constraints, ctx: &LayoutCtx) -> Vec2 {
        constraints.constrain(ctx.fonts.measure_text(&self.text, self.font, self.size, None))
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        painter.push_clip(rect);
        painter.text_in(&self.text, self.font, self.size, self.color, rect, false);
        painter.pop_clip();
    }
}
