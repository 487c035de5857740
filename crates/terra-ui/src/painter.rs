use terra_engine::coords::{Rect, Vec2};
use terra_engine::paint::Color;
use terra_engine::scene::{DrawList, ZIndex};
use terra_engine::text::{FontId, FontSystem};

use crate::constraints::LayoutCtx;

/// Draw surface handed to [`Widget::paint`](crate::widget::Widget::paint).
///
/// Every call lands one layer above the previous one, so later calls paint
/// over earlier ones regardless of which renderer draws them.
pub struct Painter<'a> {
    draw_list: &'a mut DrawList,
    fonts:     &'a FontSystem,
    pub scale: f32,
    z:         i32,
    pub mouse_pos:     Option<Vec2>,
    pub mouse_pressed: bool,
}

impl<'a> Painter<'a> {
    pub fn new(
        draw_list: &'a mut DrawList,
        fonts: &'a FontSystem,
        mouse_pos: Option<Vec2>,
        mouse_pressed: bool,
        scale: f32,
        base_z: i32,
    ) -> Self {
        Self { draw_list, fonts, scale, z: base_z, mouse_pos, mouse_pressed }
    }

    #[inline]
    pub fn is_hovered(&self, rect: Rect) -> bool {
        self.mouse_pos.is_some_and(|p| rect.contains(p))
    }

    pub fn layout_ctx(&self) -> LayoutCtx<'_> {
        LayoutCtx { fonts: self.fonts, scale: self.scale }
    }

    pub fn measure_text(&self, text: &str, font: FontId, size: f32) -> Vec2 {
        self.fonts.measure_text(text, font, size, None)
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let z = self.next_z();
        self.draw_list.push_rect(z, rect, color);
    }

    /// One-pixel-wide outline drawn inside `rect`.
    pub fn stroke_rect(&mut self, rect: Rect, width: f32, color: Color) {
        let w = width.min(rect.size.x * 0.5).min(rect.size.y * 0.5);
        let (top, rest) = rect.split_top(w);
        let (body, bottom) = rest.split_top(rest.size.y - w);
        let (left, body) = body.split_left(w);
        let (_, right) = body.split_left(body.size.x - w);
        let z = self.next_z();
        for edge in [top, bottom, left, right] {
            self.draw_list.push_rect(z, edge, color);
        }
    }

    pub fn text(&mut self, text: impl Into<String>, font: FontId, size: f32, color: Color, origin: Vec2) {
        let z = self.next_z();
        self.draw_list.push_text(z, text, font, size, color, origin, None);
    }

    /// Text vertically centred in `rect`, aligned left or right.
    pub fn text_in(&mut self, text: &str, font: FontId, size: f32, color: Color, rect: Rect, right_align: bool) {
        let measured = self.measure_text(text, font, size);
        let y = rect.origin.y + (rect.size.y - size * 1.2) * 0.5;
        let x = if right_align { rect.right() - measured.x } else { rect.origin.x };
        self.text(text, font, size, color, Vec2::new(x, y));
    }

    pub fn push_clip(&mut self, rect: Rect) {
        self.draw_list.push_clip(rect);
    }

    pub fn pop_clip(&mut self) {
        self.draw_list.pop_clip();
    }

    #[inline]
    fn next_z(&mut self) -> ZIndex {
        let z = ZIndex(self.z);
        self.z += 1;
        z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_engine::scene::DrawCmd;

    #[test]
    fn later_calls_paint_on_top() {
        let fonts = FontSystem::new();
        let mut list = DrawList::new();
        {
            let mut p = Painter::new(&mut list, &fonts, None, false, 1.0, 10);
            p.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::WHITE);
            p.fill_rect(Rect::new(1.0, 0.0, 1.0, 1.0), Color::BLACK);
        }
        let zs: Vec<_> = list.items().iter().map(|i| i.z).collect();
        assert_eq!(zs, vec![ZIndex(10), ZIndex(11)]);
    }

    #[test]
    fn stroke_is_four_edges_inside_rect() {
        let fonts = FontSystem::new();
        let mut list = DrawList::new();
        let rect = Rect::new(0.0, 0.0, 10.0, 6.0);
        {
            let mut p = Painter::new(&mut list, &fonts, None, false, 1.0, 0);
            p.stroke_rect(rect, 1.0, Color::WHITE);
        }
        let rects: Vec<_> = list
            .items()
            .iter()
            .filter_map(|i| match &i.cmd {
                DrawCmd::Rect(r) => Some(r.rect),
                DrawCmd::Text(_) => None,
            })
            .collect();
        assert_eq!(rects, vec![
            Rect::new(0.0, 0.0, 10.0, 1.0),
            Rect::new(0.0, 5.0, 10.0, 1.0),
            Rect::new(0.0, 1.0, 1.0, 4.0),
            Rect::new(9.0, 1.0, 1.0, 4.0),
        ]);
    }

    #[test]
    fn hover_requires_pointer_in_window() {
        let fonts = FontSystem::new();
        let mut list = DrawList::new();
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let outside = Painter::new(&mut list, &fonts, None, false, 1.0, 0);
        assert!(!outside.is_hovered(rect));
        drop(outside);
        let inside = Painter::new(&mut list, &fonts, Some(Vec2::new(5.0, 5.0)), false, 1.0, 0);
        assert!(inside.is_hovered(rect));
    }
}
