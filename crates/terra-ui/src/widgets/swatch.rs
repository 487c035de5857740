use terra_engine::coords::{Rect, Vec2};
use terra_engine::paint::Color;
use terra_engine::paint::color::linear_to_srgb;
use terra_engine::text::FontId;

use crate::constraints::{Constraints, LayoutCtx};
use crate::painter::Painter;
use crate::theme::Theme;
use crate::widget::Widget;

/// Colour preview box followed by its hex code.
pub struct Swatch {
    rgb:       [f32; 3],
    height:    f32,
    font:      FontId,
    text_size: f32,
    text:      Color,
    border:    Color,
}

impl Swatch {
    /// `rgb` is linear, as stored in the bound record.
    pub fn new(theme: &Theme, rgb: [f32; 3]) -> Self {
        Self {
            rgb,
            height: theme.row_height,
            font: theme.font,
            text_size: theme.text_size,
            text: theme.value,
            border: theme.hover_bg,
        }
    }

    /// `#rrggbb` of the sRGB-encoded colour.
    pub fn hex(&self) -> String {
        let [r, g, b] = self.rgb.map(|c| (linear_to_srgb(c) * 255.0).round() as u8);
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl Widget for Swatch {
    fn measure(&self, constraints: Constraints, _ctx: &LayoutCtx) -> Vec2 {
        let w = if constraints.max.x.is_finite() { constraints.max.x } else { 120.0 };
        constraints.constrain(Vec2::new(w, self.height))
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        let inner = rect.inset(0.0, 3.0, 0.0, 3.0);
        let (chip, rest) = inner.split_left(inner.size.y * 2.0);
        let [r, g, b] = self.rgb;
        painter.fill_rect(chip, Color::from_linear(r, g, b, 1.0));
        painter.stroke_rect(chip, 1.0, self.border);
        painter.text_in(&self.hex(), self.font, self.text_size, self.text, rest.inset(8.0, 0.0, 0.0, 0.0), false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_srgb_encoded() {
        let theme = Theme::default();
        assert_eq!(Swatch::new(&theme, [1.0, 0.0, 0.0]).hex(), "#ff0000");
        assert_eq!(Swatch::new(&theme, [0.0, 0.0, 0.0]).hex(), "#000000");
        assert_eq!(Swatch::new(&theme, [2.0, -1.0, 1.0]).hex(), "#ff00ff");
    }
}
