use terra_engine::coords::Vec2;

/// Pointer events routed through the widget tree.
///
/// A press starts a drag; every frame the button stays down produces a
/// `Drag`, and the release produces a `DragEnd`. A release that barely moved
/// also produces a `Click`. Widgets claim drags by checking `start`.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Hover { pos: Vec2 },
    Drag { pos: Vec2, start: Vec2 },
    DragEnd { pos: Vec2, start: Vec2 },
    Click { pos: Vec2 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Consumed,
    Ignored,
}

impl EventResult {
    #[inline]
    pub fn is_consumed(self) -> bool {
        self == EventResult::Consumed
    }

    /// `Consumed` if either side consumed.
    #[inline]
    pub fn or(self, other: EventResult) -> EventResult {
        if self.is_consumed() { self } else { other }
    }
}
