use terra_engine::coords::{Rect, Vec2};
use terra_engine::scene::DrawList;
use terra_engine::text::{FontId, FontLoadError, FontSystem};

use crate::constraints::{Constraints, LayoutCtx};
use crate::event::UiEvent;
use crate::painter::Painter;
use crate::widget::Element;

/// A release closer than this to its press counts as a click.
const CLICK_SLOP: f32 = 4.0;

/// Pointer snapshot for one frame, logical pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct UiInput {
    pub mouse_pos:  Option<Vec2>,
    /// Primary button held.
    pub mouse_down: bool,
}

/// Where the root element goes in the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Fill,
    /// Fixed width pinned to the top-right corner; height is measured.
    TopRight { width: f32, margin: f32 },
}

impl Placement {
    pub fn top_right(width: f32, margin: f32) -> Self {
        Placement::TopRight { width, margin }
    }

    fn resolve(self, root: &Element, viewport: Vec2, ctx: &LayoutCtx) -> Rect {
        match self {
            Placement::Fill => Rect::new(0.0, 0.0, viewport.x, viewport.y),
            Placement::TopRight { width, margin } => {
                let width = width.min((viewport.x - 2.0 * margin).max(0.0));
                let max_h = (viewport.y - 2.0 * margin).max(0.0);
                let size = root.measure(Constraints::width(width, max_h), ctx);
                Rect::new(viewport.x - margin - width, margin, width, size.y.min(max_h))
            }
        }
    }
}

/// Owns fonts and the UI draw list, and turns button state into drag and
/// click events across frames.
pub struct UiScene {
    pub fonts:     FontSystem,
    pub draw_list: DrawList,
    /// Device pixel ratio, forwarded to layout and painting.
    pub scale:     f32,
    /// Layer the root paints from, above anything the app drew first.
    pub base_z:    i32,
    drag_start:    Option<Vec2>,
    last_pos:      Option<Vec2>,
    root_rect:     Option<Rect>,
}

impl Default for UiScene {
    fn default() -> Self {
        Self {
            fonts:      FontSystem::new(),
            draw_list:  DrawList::new(),
            scale:      1.0,
            base_z:     0,
            drag_start: None,
            last_pos:   None,
            root_rect:  None,
        }
    }
}

impl UiScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        self.fonts.load_font(bytes)
    }

    /// Rect the root occupied last frame.
    pub fn root_rect(&self) -> Option<Rect> {
        self.root_rect
    }

    /// Whether `pos` is over the UI.
    pub fn contains(&self, pos: Vec2) -> bool {
        self.root_rect.is_some_and(|r| r.contains(pos))
    }

    /// Whether the drag in progress began over the UI.
    pub fn owns_drag(&self) -> bool {
        self.drag_start.is_some_and(|s| self.contains(s))
    }

    /// Lays out, paints and routes events for one frame.
    ///
    /// Painting happens before events, so a change made by this frame's
    /// events is visible on the next frame's rebuilt tree.
    pub fn frame(&mut self, mut root: Element, viewport: Vec2, placement: Placement, input: &UiInput) -> &mut DrawList {
        self.draw_list.clear();

        let rect = {
            let ctx = LayoutCtx { fonts: &self.fonts, scale: self.scale };
            placement.resolve(&root, viewport, &ctx)
        };
        self.root_rect = Some(rect);

        {
            let mut painter = Painter::new(
                &mut self.draw_list,
                &self.fonts,
                input.mouse_pos,
                input.mouse_down,
                self.scale,
                self.base_z,
            );
            root.paint(&mut painter, rect);
        }

        let events = self.pointer_events(input);
        let ctx = LayoutCtx { fonts: &self.fonts, scale: self.scale };
        for event in events {
            root.on_event(&event, rect, &ctx);
        }

        &mut self.draw_list
    }

    fn pointer_events(&mut self, input: &UiInput) -> Vec<UiEvent> {
        let mut events = Vec::new();
        if input.mouse_pos.is_some() {
            self.last_pos = input.mouse_pos;
        }
        let Some(pos) = self.last_pos else {
            return events;
        };

        if input.mouse_pos.is_some() {
            events.push(UiEvent::Hover { pos });
        }

        match (input.mouse_down, self.drag_start) {
            (true, None) => {
                self.drag_start = Some(pos);
                events.push(UiEvent::Drag { pos, start: pos });
            }
            (true, Some(start)) => events.push(UiEvent::Drag { pos, start }),
            (false, Some(start)) => {
                self.drag_start = None;
                events.push(UiEvent::DragEnd { pos, start });
                if (pos - start).length() <= CLICK_SLOP {
                    events.push(UiEvent::Click { pos });
                }
            }
            (false, None) => {}
        }
        events
    }
}
