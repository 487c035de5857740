use terra_engine::paint::Color;
use terra_engine::text::FontId;

/// Sizes and colours the pane's widgets are built with.
#[derive(Debug, Clone)]
pub struct Theme {
    pub font:        FontId,
    pub text_size:   f32,
    pub title_size:  f32,
    pub row_height:  f32,
    /// Share of a property row given to its label.
    pub label_ratio: f32,
    pub padding:     f32,
    pub spacing:     f32,

    pub panel_bg:    Color,
    pub title_bg:    Color,
    pub folder_bg:   Color,
    pub control_bg:  Color,
    pub hover_bg:    Color,
    pub label:       Color,
    pub value:       Color,
    pub accent:      Color,
    pub graph:       Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            font:        FontId::default(),
            text_size:   12.0,
            title_size:  13.0,
            row_height:  24.0,
            label_ratio: 0.38,
            padding:     6.0,
            spacing:     3.0,

            panel_bg:    Color::from_hex(0x28292e).with_alpha(0.94),
            title_bg:    Color::from_hex(0x37383d),
            folder_bg:   Color::from_hex(0x2f3035),
            control_bg:  Color::from_hex(0x3c3d43),
            hover_bg:    Color::from_hex(0x4a4b52),
            label:       Color::from_hex(0xaeb1b8),
            value:       Color::from_hex(0xe4e6eb),
            accent:      Color::from_hex(0x6c9bd8),
            graph:       Color::from_hex(0x7fc48a),
        }
    }
}

impl Theme {
    pub fn with_font(mut self, font: FontId) -> Self {
        self.font = font;
        self
    }
}
