//! Per-frame draw stream consumed by the rect and text renderers.

mod cmd;
mod list;

pub use cmd::{DrawCmd, RectCmd, TextCmd};
pub use list::{DrawItem, DrawList, ZIndex};
