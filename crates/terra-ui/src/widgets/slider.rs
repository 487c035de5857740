use terra_engine::coords::{Rect, Vec2};
use terra_engine::paint::Color;
use terra_engine::text::FontId;

use crate::constraints::{Constraints, LayoutCtx};
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;
use crate::theme::Theme;
use crate::widget::Widget;

const READOUT_WIDTH: f32 = 46.0;
const TRACK_HEIGHT: f32 = 4.0;
const THUMB_WIDTH: f32 = 6.0;

/// Horizontal slider with a numeric readout.
///
/// Dragging anywhere on the track reports the value under the pointer on
/// every frame of the drag. Values set with [`value`](Self::value) outside
/// the range are displayed as-is and pin the thumb to the nearest end.
pub struct Slider {
    value:     f32,
    min:       f32,
    max:       f32,
    step:      Option<f32>,
    decimals:  usize,
    height:    f32,
    font:      FontId,
    text_size: f32,
    track:     Color,
    fill:      Color,
    hover:     Color,
    text:      Color,
    on_change: Option<Box<dyn FnMut(f32)>>,
}

impl Slider {
    pub fn new(theme: &Theme, min: f32, max: f32) -> Self {
        Self {
            value: min,
            min,
            max,
            step: None,
            decimals: 2,
            height: theme.row_height,
            font: theme.font,
            text_size: theme.text_size,
            track: theme.control_bg,
            fill: theme.accent,
            hover: theme.hover_bg,
            text: theme.value,
            on_change: None,
        }
    }

    pub fn value(mut self, v: f32) -> Self {
        self.value = v;
        self
    }

    /// Snaps dragged values to multiples of `step` from `min`.
    pub fn step(mut self, step: f32) -> Self {
        self.step = (step > 0.0).then_some(step);
        self
    }

    pub fn decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn on_change(mut self, f: impl FnMut(f32) + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    fn normalized(&self) -> f32 {
        let span = self.max - self.min;
        if span.abs() < f32::EPSILON { 0.0 } else { ((self.value - self.min) / span).clamp(0.0, 1.0) }
    }

    fn value_at(&self, x: f32, track: Rect) -> f32 {
        let t = if track.size.x > 0.0 { ((x - track.origin.x) / track.size.x).clamp(0.0, 1.0) } else { 0.0 };
        let raw = self.min + t * (self.max - self.min);
        match self.step {
            Some(step) => (self.min + ((raw - self.min) / step).round() * step).clamp(self.min.min(self.max), self.max.max(self.min)),
            None => raw,
        }
    }

    fn readout(&self) -> String {
        format!("{:.*}", self.decimals, self.value)
    }

    fn split(rect: Rect) -> (Rect, Rect) {
        let (track_area, readout) = rect.split_left(rect.size.x - READOUT_WIDTH);
        (track_area.inset(0.0, 0.0, 6.0, 0.0), readout)
    }
}

impl Widget for Slider {
    fn measure(&self, constraints: Constraints, _ctx: &LayoutCtx) -> Vec2 {
        let w = if constraints.max.x.is_finite() { constraints.max.x } else { 160.0 };
        constraints.constrain(Vec2::new(w, self.height))
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        let (track_area, readout) = Self::split(rect);

        let cy = track_area.center().y;
        let track = Rect::new(track_area.origin.x, cy - TRACK_HEIGHT * 0.5, track_area.size.x, TRACK_HEIGHT);
        painter.fill_rect(track, self.track);

        let thumb_x = track.origin.x + self.normalized() * track.size.x;
        painter.fill_rect(Rect::new(track.origin.x, track.origin.y, thumb_x - track.origin.x, TRACK_HEIGHT), self.fill);

        let thumb_h = (track_area.size.y - 8.0).max(TRACK_HEIGHT);
        let thumb = Rect::new(thumb_x - THUMB_WIDTH * 0.5, cy - thumb_h * 0.5, THUMB_WIDTH, thumb_h);
        let thumb_color = if painter.is_hovered(track_area) { self.text } else { self.fill };
        painter.fill_rect(thumb, thumb_color);

        let box_rect = readout.inset(0.0, 3.0, 0.0, 3.0);
        painter.fill_rect(box_rect, if painter.is_hovered(rect) { self.hover } else { self.track });
        painter.text_in(&self.readout(), self.font, self.text_size, self.text, box_rect.inset(4.0, 0.0, 4.0, 0.0), true);
    }

    fn on_event(&mut self, event: &UiEvent, rect: Rect, _ctx: &LayoutCtx) -> EventResult {
        let (track, _) = Self::split(rect);
        match event {
            UiEvent::Drag { pos, start } | UiEvent::DragEnd { pos, start } if track.contains(*start) => {
                let v = self.value_at(pos.x, track);
                if v != self.value {
                    self.value = v;
                    if let Some(f) = &mut self.on_change {
                        f(v);
                    }
                }
                EventResult::Consumed
            }
            _ => EventResult::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use terra_engine::text::FontSystem;

    use super::*;

    fn track() -> Rect {
        Rect::new(100.0, 0.0, 200.0, 20.0)
    }

    // ── value mapping ─────────────────────────────────────────────────────

    #[test]
    fn pointer_maps_linearly_and_clamps() {
        let s = Slider::new(&Theme::default(), 0.0, 4.0);
        assert_eq!(s.value_at(100.0, track()), 0.0);
        assert_eq!(s.value_at(200.0, track()), 2.0);
        assert_eq!(s.value_at(350.0, track()), 4.0);
        assert_eq!(s.value_at(0.0, track()), 0.0);
    }

    #[test]
    fn step_snaps_from_min() {
        let s = Slider::new(&Theme::default(), 1.0, 2.0).step(0.25);
        assert_eq!(s.value_at(100.0 + 200.0 * 0.3, track()), 1.25);
        assert_eq!(s.value_at(300.0, track()), 2.0);
    }

    #[test]
    fn thumb_position_pins_out_of_range_values() {
        let theme = Theme::default();
        assert_eq!(Slider::new(&theme, 0.0, 1.0).value(7.0).normalized(), 1.0);
        assert_eq!(Slider::new(&theme, 0.0, 1.0).value(-3.0).normalized(), 0.0);
        assert_eq!(Slider::new(&theme, 2.0, 2.0).value(2.0).normalized(), 0.0);
    }

    #[test]
    fn readout_uses_decimals() {
        let s = Slider::new(&Theme::default(), 0.0, 1.0).value(0.123_456).decimals(3);
        assert_eq!(s.readout(), "0.123");
    }

    // ── events ────────────────────────────────────────────────────────────

    #[test]
    fn drag_started_on_track_reports_values() {
        let fonts = FontSystem::new();
        let ctx = LayoutCtx { fonts: &fonts, scale: 1.0 };
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut s = Slider::new(&Theme::default(), 0.0, 1.0).on_change(move |v| sink.borrow_mut().push(v));

        let rect = Rect::new(0.0, 0.0, 152.0, 24.0);
        let (track, _) = Slider::split(rect);
        let start = Vec2::new(track.origin.x, 12.0);
        let end = Vec2::new(track.right(), 12.0);

        assert!(s.on_event(&UiEvent::Drag { pos: start, start }, rect, &ctx).is_consumed());
        assert!(s.on_event(&UiEvent::DragEnd { pos: end, start }, rect, &ctx).is_consumed());
        // The first drag lands on the current value and reports nothing.
        assert_eq!(*seen.borrow(), vec![1.0]);
    }

    #[test]
    fn drag_started_elsewhere_is_ignored() {
        let fonts = FontSystem::new();
        let ctx = LayoutCtx { fonts: &fonts, scale: 1.0 };
        let mut s = Slider::new(&Theme::default(), 0.0, 1.0);
        let rect = Rect::new(0.0, 0.0, 152.0, 24.0);
        let event = UiEvent::Drag { pos: Vec2::new(10.0, 10.0), start: Vec2::new(10.0, 100.0) };
        assert_eq!(s.on_event(&event, rect, &ctx), EventResult::Ignored);
    }
}
