use crate::coords::{Rect, Vec2};
use crate::paint::Color;
use crate::text::FontId;

use super::cmd::{DrawCmd, RectCmd, TextCmd};

/// Paint layer. Higher layers draw over lower ones.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ZIndex(pub i32);

#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub z:    ZIndex,
    order:    u32,
    pub cmd:  DrawCmd,
    /// Effective scissor in logical pixels; `None` draws everywhere.
    pub clip: Option<Rect>,
}

/// Draw commands recorded for one frame.
///
/// Items come back ordered by layer, then by insertion. Clips nest: each
/// pushed clip is intersected with its parent.
#[derive(Debug, Default)]
pub struct DrawList {
    items:      Vec<DrawItem>,
    next_order: u32,
    sorted:     bool,
    clip_stack: Vec<Rect>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all items but keeps the allocation.
    pub fn clear(&mut self) {
        self.items.clear();
        self.next_order = 0;
        self.sorted = true;
        self.clip_stack.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn push(&mut self, z: ZIndex, cmd: DrawCmd) {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);
        self.sorted = self.sorted && self.items.last().is_none_or(|last| last.z <= z);
        self.items.push(DrawItem { z, order, cmd, clip: self.clip_stack.last().copied() });
    }

    pub fn push_rect(&mut self, z: ZIndex, rect: Rect, color: Color) {
        self.push(z, DrawCmd::Rect(RectCmd { rect, color }));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn push_text(
        &mut self,
        z: ZIndex,
        text: impl Into<String>,
        font: FontId,
        size: f32,
        color: Color,
        origin: Vec2,
        max_width: Option<f32>,
    ) {
        self.push(z, DrawCmd::Text(TextCmd { text: text.into(), font, size, color, origin, max_width }));
    }

    pub fn push_clip(&mut self, rect: Rect) {
        let effective = match self.clip_stack.last() {
            None => rect,
            Some(parent) => parent.intersect(rect).unwrap_or_default(),
        };
        self.clip_stack.push(effective);
    }

    pub fn pop_clip(&mut self) {
        debug_assert!(!self.clip_stack.is_empty(), "pop_clip without push_clip");
        self.clip_stack.pop();
    }

    /// Items in paint order (back to front).
    pub fn items(&mut self) -> &[DrawItem] {
        if !self.sorted {
            self.items.sort_by_key(|item| (item.z, item.order));
            self.sorted = true;
        }
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_at(x: f32) -> Rect {
        Rect::new(x, 0.0, 1.0, 1.0)
    }

    fn xs(list: &mut DrawList) -> Vec<f32> {
        list.items()
            .iter()
            .filter_map(|i| match &i.cmd {
                DrawCmd::Rect(r) => Some(r.rect.origin.x),
                DrawCmd::Text(_) => None,
            })
            .collect()
    }

    #[test]
    fn layers_sort_before_insertion_order() {
        let mut list = DrawList::new();
        list.push_rect(ZIndex(1), rect_at(0.0), Color::WHITE);
        list.push_rect(ZIndex(0), rect_at(1.0), Color::WHITE);
        list.push_rect(ZIndex(1), rect_at(2.0), Color::WHITE);
        list.push_rect(ZIndex(0), rect_at(3.0), Color::WHITE);
        assert_eq!(xs(&mut list), vec![1.0, 3.0, 0.0, 2.0]);
    }

    #[test]
    fn nested_clips_intersect() {
        let mut list = DrawList::new();
        list.push_clip(Rect::new(0.0, 0.0, 10.0, 10.0));
        list.push_clip(Rect::new(5.0, 5.0, 10.0, 10.0));
        list.push_rect(ZIndex(0), rect_at(0.0), Color::WHITE);
        list.pop_clip();
        list.push_rect(ZIndex(0), rect_at(1.0), Color::WHITE);
        list.pop_clip();
        list.push_rect(ZIndex(0), rect_at(2.0), Color::WHITE);

        let clips: Vec<_> = list.items().iter().map(|i| i.clip).collect();
        assert_eq!(clips, vec![
            Some(Rect::new(5.0, 5.0, 5.0, 5.0)),
            Some(Rect::new(0.0, 0.0, 10.0, 10.0)),
            None,
        ]);
    }

    #[test]
    fn disjoint_clip_becomes_empty() {
        let mut list = DrawList::new();
        list.push_clip(Rect::new(0.0, 0.0, 5.0, 5.0));
        list.push_clip(Rect::new(50.0, 50.0, 5.0, 5.0));
        list.push_rect(ZIndex(0), rect_at(0.0), Color::WHITE);
        assert!(list.items()[0].clip.is_some_and(|c| c.is_empty()));
    }

    #[test]
    fn clear_resets_clip_stack() {
        let mut list = DrawList::new();
        list.push_clip(Rect::new(0.0, 0.0, 5.0, 5.0));
        list.clear();
        list.push_rect(ZIndex(0), rect_at(0.0), Color::WHITE);
        assert_eq!(list.len(), 1);
        assert_eq!(list.items()[0].clip, None);
    }
}
