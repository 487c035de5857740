use terra_engine::coords::{Rect, Vec2};
use terra_engine::paint::Color;
use terra_engine::text::FontId;

use crate::constraints::{Constraints, LayoutCtx};
use crate::painter::Painter;
use crate::theme::Theme;
use crate::widget::Widget;

const GRAPH_HEIGHT: f32 = 48.0;

/// Bar graph of samples in `0..=1`, newest on the right, with a caption in
/// the top-left corner.
pub struct Graph {
    samples:   Vec<f32>,
    caption:   String,
    font:      FontId,
    text_size: f32,
    bg:        Color,
    bar:       Color,
    text:      Color,
}

impl Graph {
    pub fn new(theme: &Theme, samples: Vec<f32>, caption: impl Into<String>) -> Self {
        Self {
            samples,
            caption: caption.into(),
            font: theme.font,
            text_size: theme.text_size,
            bg: theme.control_bg,
            bar: theme.graph,
            text: theme.value,
        }
    }

    fn bars(&self, area: Rect) -> impl Iterator<Item = Rect> + '_ {
        let n = self.samples.len().max(1) as f32;
        let w = area.size.x / n;
        self.samples.iter().enumerate().map(move |(i, s)| {
            let h = s.clamp(0.0, 1.0) * area.size.y;
            Rect::new(area.origin.x + w * i as f32, area.bottom() - h, w.max(1.0), h)
        })
    }
}

impl Widget for Graph {
    fn measure(&self, constraints: Constraints, _ctx: &LayoutCtx) -> Vec2 {
        let w = if constraints.max.x.is_finite() { constraints.max.x } else { 160.0 };
        constraints.constrain(Vec2::new(w, GRAPH_HEIGHT))
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        let area = rect.inset(0.0, 2.0, 0.0, 2.0);
        painter.fill_rect(area, self.bg);
        painter.push_clip(area);
        for bar in self.bars(area) {
            painter.fill_rect(bar, self.bar);
        }
        let line = self.text_size * 1.2;
        painter.text_in(&self.caption, self.font, self.text_size, self.text, Rect::new(area.origin.x + 4.0, area.origin.y + 2.0, area.size.x - 8.0, line), false);
        painter.pop_clip();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_grow_up_from_bottom() {
        let g = Graph::new(&Theme::default(), vec![0.0, 0.5, 1.5], "fps");
        let bars: Vec<_> = g.bars(Rect::new(0.0, 0.0, 30.0, 40.0)).collect();
        assert_eq!(bars, vec![
            Rect::new(0.0, 40.0, 10.0, 0.0),
            Rect::new(10.0, 20.0, 10.0, 20.0),
            Rect::new(20.0, 0.0, 10.0, 40.0),
        ]);
    }
}
