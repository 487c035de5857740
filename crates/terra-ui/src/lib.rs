//! Terra UI: a small retained widget tree and the control pane built on it.
//!
//! The pane keeps typed bindings into a shared record; each frame it builds
//! a fresh widget tree from them, which [`UiScene`](scene::UiScene) lays out,
//! paints into the engine draw list and feeds pointer events.
//!
//! ```rust,ignore
//! let mut pane = Pane::new("Controls", Rc::clone(&settings));
//! pane.add_folder("Planet")
//!     .add_slider("Radius", RADIUS, 0.5, 5.0);
//!
//! // per frame
//! let list = scene.frame(pane.element(&theme), viewport, Placement::top_right(300.0, 12.0), &input);
//! ```

pub mod constraints;
pub mod event;
pub mod painter;
pub mod pane;
pub mod scene;
pub mod theme;
pub mod widget;
pub mod widgets;

pub mod prelude {
    pub use crate::constraints::{Constraints, Edges, LayoutCtx};
    pub use crate::event::{EventResult, UiEvent};
    pub use crate::painter::Painter;
    pub use crate::pane::{BindingError, BindingValue, Field, Folder, GraphSnapshot, Pane};
    pub use crate::scene::{Placement, UiInput, UiScene};
    pub use crate::theme::Theme;
    pub use crate::widget::{Element, Widget};
    pub use crate::widgets::{
        choice::Choice, column::Column, folder::Folder as FolderWidget, graph::Graph, label::Label,
        panel::PanelFrame, property::Property, slider::Slider, swatch::Swatch,
    };

    pub use terra_engine::coords::{Rect, Vec2};
    pub use terra_engine::paint::Color;
    pub use terra_engine::text::FontId;
}
