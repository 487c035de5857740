//! Input subsystem.
//!
//! Window-system independent; the runtime translates winit events into
//! [`InputEvent`]s and feeds them through [`InputState::apply_event`].

mod frame;
mod state;
mod types;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{
    InputEvent,
    Key,
    KeyState,
    Modifiers,
    MouseButton,
    MouseButtonState,
    MouseWheelDelta,
    PointerButtonEvent,
    PointerMoveEvent,
};
