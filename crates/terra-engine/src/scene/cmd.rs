use crate::coords::{Rect, Vec2};
use crate::paint::Color;
use crate::text::FontId;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Rect(RectCmd),
    Text(TextCmd),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RectCmd {
    pub rect:  Rect,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextCmd {
    pub text:      String,
    pub font:      FontId,
    /// Logical pixels.
    pub size:      f32,
    pub color:     Color,
    /// Top-left of the laid-out block.
    pub origin:    Vec2,
    pub max_width: Option<f32>,
}
