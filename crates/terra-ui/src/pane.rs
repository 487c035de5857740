//! Tweak-pane style control panel over a shared record.
//!
//! A [`Pane`] holds typed bindings (label + [`Field`] accessor) into an
//! `Rc<RefCell<R>>`. The bindings are the retained state; [`Pane::element`]
//! turns them into a fresh widget tree every frame, and each widget writes
//! through its own accessor only.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::constraints::Edges;
use crate::theme::Theme;
use crate::widget::Element;
use crate::widgets::choice::Choice;
use crate::widgets::column::Column;
use crate::widgets::folder::Folder as FolderWidget;
use crate::widgets::graph::Graph;
use crate::widgets::panel::PanelFrame;
use crate::widgets::property::Property;
use crate::widgets::slider::Slider;
use crate::widgets::swatch::Swatch;

/// Named accessor for one field of `R`.
pub struct Field<R, T> {
    pub key: &'static str,
    pub get: fn(&R) -> T,
    pub set: fn(&mut R, T),
}

impl<R, T> Field<R, T> {
    pub const fn new(key: &'static str, get: fn(&R) -> T, set: fn(&mut R, T)) -> Self {
        Self { key, get, set }
    }
}

impl<R, T> Clone for Field<R, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, T> Copy for Field<R, T> {}

impl<R, T> fmt::Debug for Field<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.key).finish()
    }
}

/// Value written or read through [`Pane::set`] / [`Pane::get`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BindingValue {
    Scalar(f32),
    Index(usize),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
}

impl BindingValue {
    pub fn kind(&self) -> &'static str {
        match self {
            BindingValue::Scalar(_) => "scalar",
            BindingValue::Index(_) => "index",
            BindingValue::Vec2(_) => "vec2",
            BindingValue::Vec3(_) => "vec3",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
    #[error("no control is bound to `{0}`")]
    UnknownKey(String),
    #[error("`{key}` takes a {expected} value, got {got}")]
    TypeMismatch { key: String, expected: &'static str, got: &'static str },
    #[error("`{key}` has {len} options, index {index} is out of range")]
    NoSuchOption { key: String, index: usize, len: usize },
}

/// What a graph binding shows this frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphSnapshot {
    /// Bar heights in `0..=1`, oldest first.
    pub samples: Vec<f32>,
    pub caption: String,
}

enum Binding<R> {
    Slider { label: String, field: Field<R, f32>, min: f32, max: f32 },
    Choice { label: String, field: Field<R, usize>, options: Vec<String>, hook: Rc<dyn Fn(usize)> },
    Color { label: String, field: Field<R, [f32; 3]> },
    Point { label: String, field: Field<R, [f32; 2]>, min: f32, max: f32 },
    Graph { label: String, source: Rc<dyn Fn() -> GraphSnapshot> },
}

impl<R> Binding<R> {
    fn key(&self) -> Option<&'static str> {
        match self {
            Binding::Slider { field, .. } => Some(field.key),
            Binding::Choice { field, .. } => Some(field.key),
            Binding::Color { field, .. } => Some(field.key),
            Binding::Point { field, .. } => Some(field.key),
            Binding::Graph { .. } => None,
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            Binding::Slider { .. } => "scalar",
            Binding::Choice { .. } => "index",
            Binding::Color { .. } => "vec3",
            Binding::Point { .. } => "vec2",
            Binding::Graph { .. } => "read-only",
        }
    }
}

/// A titled group of bindings, shown as a collapsible section.
pub struct Folder<R> {
    title:    String,
    open:     Rc<Cell<bool>>,
    bindings: Vec<Binding<R>>,
}

impl<R: 'static> Folder<R> {
    fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), open: Rc::new(Cell::new(true)), bindings: Vec::new() }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Slider over `min..=max`. The range limits dragging only.
    pub fn add_slider(&mut self, label: impl Into<String>, field: Field<R, f32>, min: f32, max: f32) -> &mut Self {
        self.bindings.push(Binding::Slider { label: label.into(), field, min, max });
        self
    }

    /// Drop-down over `options`. `hook` receives the new index after every
    /// change.
    pub fn add_choice_with<S: Into<String>>(
        &mut self,
        label: impl Into<String>,
        field: Field<R, usize>,
        options: impl IntoIterator<Item = S>,
        hook: impl Fn(usize) + 'static,
    ) -> &mut Self {
        let options = options.into_iter().map(Into::into).collect();
        self.bindings.push(Binding::Choice { label: label.into(), field, options, hook: Rc::new(hook) });
        self
    }

    /// Linear RGB colour, edited per channel.
    pub fn add_color(&mut self, label: impl Into<String>, field: Field<R, [f32; 3]>) -> &mut Self {
        self.bindings.push(Binding::Color { label: label.into(), field });
        self
    }

    /// 2D point, both axes over `min..=max`.
    pub fn add_point(&mut self, label: impl Into<String>, field: Field<R, [f32; 2]>, min: f32, max: f32) -> &mut Self {
        self.bindings.push(Binding::Point { label: label.into(), field, min, max });
        self
    }

    /// Read-only graph; `source` is polled every frame.
    pub fn add_graph(&mut self, label: impl Into<String>, source: impl Fn() -> GraphSnapshot + 'static) -> &mut Self {
        self.bindings.push(Binding::Graph { label: label.into(), source: Rc::new(source) });
        self
    }

    fn find(&self, key: &str) -> Option<&Binding<R>> {
        self.bindings.iter().find(|b| b.key() == Some(key))
    }

    fn rows(&self, target: &Rc<RefCell<R>>, theme: &Theme) -> Column {
        let mut col = Column::new().spacing(theme.spacing);
        for binding in &self.bindings {
            col.push(row(binding, target, theme));
        }
        col
    }
}

/// The panel: loose bindings on top, then folders in insertion order.
pub struct Pane<R: 'static> {
    title:     String,
    target:    Rc<RefCell<R>>,
    root:      Folder<R>,
    folders:   Vec<Folder<R>>,
    collapsed: Rc<Cell<bool>>,
}

impl<R: 'static> Pane<R> {
    pub fn new(title: impl Into<String>, target: Rc<RefCell<R>>) -> Self {
        Self {
            title: title.into(),
            target,
            root: Folder::new(""),
            folders: Vec::new(),
            collapsed: Rc::new(Cell::new(false)),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn add_folder(&mut self, title: impl Into<String>) -> &mut Folder<R> {
        self.folders.push(Folder::new(title));
        let last = self.folders.len() - 1;
        &mut self.folders[last]
    }

    pub fn folder_titles(&self) -> Vec<&str> {
        self.folders.iter().map(Folder::title).collect()
    }

    pub fn add_slider(&mut self, label: impl Into<String>, field: Field<R, f32>, min: f32, max: f32) -> &mut Folder<R> {
        self.root.add_slider(label, field, min, max)
    }

    pub fn add_choice_with<S: Into<String>>(
        &mut self,
        label: impl Into<String>,
        field: Field<R, usize>,
        options: impl IntoIterator<Item = S>,
        hook: impl Fn(usize) + 'static,
    ) -> &mut Folder<R> {
        self.root.add_choice_with(label, field, options, hook)
    }

    pub fn add_color(&mut self, label: impl Into<String>, field: Field<R, [f32; 3]>) -> &mut Folder<R> {
        self.root.add_color(label, field)
    }

    pub fn add_point(&mut self, label: impl Into<String>, field: Field<R, [f32; 2]>, min: f32, max: f32) -> &mut Folder<R> {
        self.root.add_point(label, field, min, max)
    }

    pub fn add_graph(&mut self, label: impl Into<String>, source: impl Fn() -> GraphSnapshot + 'static) -> &mut Folder<R> {
        self.root.add_graph(label, source)
    }

    pub fn set_collapsed(&self, collapsed: bool) {
        self.collapsed.set(collapsed);
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed.get()
    }

    /// Keys of every writable binding, in panel order.
    pub fn keys(&self) -> Vec<&'static str> {
        self.all_bindings().filter_map(Binding::key).collect()
    }

    /// Writes `value` through the binding for `key`, as if its widget had
    /// been used. Values are not clamped to the widget's range.
    pub fn set(&self, key: &str, value: BindingValue) -> Result<(), BindingError> {
        let binding = self.binding(key)?;
        let mismatch = || BindingError::TypeMismatch { key: key.to_owned(), expected: binding.expected(), got: value.kind() };
        match (binding, value) {
            (Binding::Slider { field, .. }, BindingValue::Scalar(v)) => write(&self.target, *field, v),
            (Binding::Color { field, .. }, BindingValue::Vec3(v)) => write(&self.target, *field, v),
            (Binding::Point { field, .. }, BindingValue::Vec2(v)) => write(&self.target, *field, v),
            (Binding::Choice { field, options, hook, .. }, BindingValue::Index(i)) => {
                if i >= options.len() {
                    return Err(BindingError::NoSuchOption { key: key.to_owned(), index: i, len: options.len() });
                }
                write(&self.target, *field, i);
                hook(i);
            }
            _ => return Err(mismatch()),
        }
        log::debug!("pane: {key} = {value:?}");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<BindingValue, BindingError> {
        let target = self.target.borrow();
        match self.binding(key)? {
            Binding::Slider { field, .. } => Ok(BindingValue::Scalar((field.get)(&target))),
            Binding::Choice { field, .. } => Ok(BindingValue::Index((field.get)(&target))),
            Binding::Color { field, .. } => Ok(BindingValue::Vec3((field.get)(&target))),
            Binding::Point { field, .. } => Ok(BindingValue::Vec2((field.get)(&target))),
            Binding::Graph { .. } => Err(BindingError::UnknownKey(key.to_owned())),
        }
    }

    /// Builds this frame's widget tree from the current record values.
    pub fn element(&self, theme: &Theme) -> Element {
        let mut body = self.root.rows(&self.target, theme);
        for folder in &self.folders {
            let rows = folder.rows(&self.target, theme).padding(Edges { top: theme.spacing, left: theme.padding, ..Edges::default() });
            body.push(FolderWidget::new(theme, &folder.title, Rc::clone(&folder.open), rows));
        }
        let body = body.spacing(theme.spacing);
        PanelFrame::new(theme, &self.title, Rc::clone(&self.collapsed), body).into()
    }

    fn all_bindings(&self) -> impl Iterator<Item = &Binding<R>> {
        self.root.bindings.iter().chain(self.folders.iter().flat_map(|f| f.bindings.iter()))
    }

    fn binding(&self, key: &str) -> Result<&Binding<R>, BindingError> {
        std::iter::once(&self.root)
            .chain(&self.folders)
            .find_map(|f| f.find(key))
            .ok_or_else(|| BindingError::UnknownKey(key.to_owned()))
    }
}

fn write<R, T>(target: &Rc<RefCell<R>>, field: Field<R, T>, value: T) {
    (field.set)(&mut target.borrow_mut(), value);
}

fn decimals_for(min: f32, max: f32) -> usize {
    match (max - min).abs() {
        s if s <= 0.1 => 4,
        s if s <= 10.0 => 2,
        _ => 1,
    }
}

fn row<R: 'static>(binding: &Binding<R>, target: &Rc<RefCell<R>>, theme: &Theme) -> Element {
    match binding {
        Binding::Slider { label, field, min, max } => {
            let value = (field.get)(&target.borrow());
            let slider = channel_slider(theme, target, *min, *max, value, *field, |_, v| v);
            Property::new(theme, label, slider).into()
        }
        Binding::Choice { label, field, options, hook } => {
            let selected = (field.get)(&target.borrow());
            let target = Rc::clone(target);
            let field = *field;
            let hook = Rc::clone(hook);
            let choice = Choice::new(theme, options.iter().cloned()).selected(selected).on_select(move |i| {
                write(&target, field, i);
                hook(i);
            });
            Property::new(theme, label, choice).into()
        }
        Binding::Color { label, field, .. } => {
            let rgb = (field.get)(&target.borrow());
            let mut col = Column::new().child(Swatch::new(theme, rgb));
            for (i, name) in ["r", "g", "b"].into_iter().enumerate() {
                let slider = channel_slider(theme, target, 0.0, 1.0, rgb[i], *field, move |mut c: [f32; 3], v| {
                    c[i] = v;
                    c
                });
                col.push(Property::new(theme, name, slider));
            }
            Property::new(theme, label, col).into()
        }
        Binding::Point { label, field, min, max } => {
            let p = (field.get)(&target.borrow());
            let mut col = Column::new();
            for (i, name) in ["x", "y"].into_iter().enumerate() {
                let slider = channel_slider(theme, target, *min, *max, p[i], *field, move |mut c: [f32; 2], v| {
                    c[i] = v;
                    c
                });
                col.push(Property::new(theme, name, slider));
            }
            Property::new(theme, label, col).into()
        }
        Binding::Graph { label, source } => {
            let GraphSnapshot { samples, caption } = source();
            Property::new(theme, label, Graph::new(theme, samples, caption)).into()
        }
    }
}

/// Slider that writes one component of `field`: `merge` folds the dragged
/// value into the field's current value.
fn channel_slider<R: 'static, T: 'static>(
    theme: &Theme,
    target: &Rc<RefCell<R>>,
    min: f32,
    max: f32,
    value: f32,
    field: Field<R, T>,
    merge: impl Fn(T, f32) -> T + 'static,
) -> Slider {
    let target = Rc::clone(target);
    Slider::new(theme, min, max).value(value).decimals(decimals_for(min, max)).on_change(move |v| {
        let mut record = target.borrow_mut();
        let current = (field.get)(&record);
        (field.set)(&mut record, merge(current, v));
    })
}

#[cfg(test)]
mod tests {
    use terra_engine::coords::Vec2;

    use super::*;
    use crate::scene::{Placement, UiInput, UiScene};

    #[derive(Debug, Clone, PartialEq)]
    struct Record {
        speed: f32,
        mode:  usize,
        tint:  [f32; 3],
        dir:   [f32; 2],
    }

    impl Default for Record {
        fn default() -> Self {
            Self { speed: 1.0, mode: 1, tint: [0.1, 0.2, 0.3], dir: [1.0, 1.0] }
        }
    }

    const SPEED: Field<Record, f32> = Field::new("speed", |r| r.speed, |r, v| r.speed = v);
    const MODE: Field<Record, usize> = Field::new("mode", |r| r.mode, |r, v| r.mode = v);
    const TINT: Field<Record, [f32; 3]> = Field::new("tint", |r| r.tint, |r, v| r.tint = v);
    const DIR: Field<Record, [f32; 2]> = Field::new("dir", |r| r.dir, |r, v| r.dir = v);

    fn pane() -> (Rc<RefCell<Record>>, Pane<Record>) {
        let target = Rc::new(RefCell::new(Record::default()));
        let mut pane = Pane::new("Controls", Rc::clone(&target));
        pane.add_slider("Speed", SPEED, 0.0, 4.0);
        pane.add_folder("Look")
            .add_choice_with("Mode", MODE, ["a", "b", "c"], |_| {})
            .add_color("Tint", TINT)
            .add_point("Direction", DIR, -2.0, 2.0)
            .add_graph("Graph", GraphSnapshot::default);
        (target, pane)
    }

    // ── programmatic access ───────────────────────────────────────────────

    #[test]
    fn keys_follow_panel_order_and_skip_graphs() {
        let (_, pane) = pane();
        assert_eq!(pane.keys(), vec!["speed", "mode", "tint", "dir"]);
        assert_eq!(pane.folder_titles(), vec!["Look"]);
        assert_eq!(pane.title(), "Controls");
    }

    #[test]
    fn set_writes_only_its_field() {
        let (target, pane) = pane();
        pane.set("dir", BindingValue::Vec2([0.5, -0.5])).unwrap();
        assert_eq!(*target.borrow(), Record { dir: [0.5, -0.5], ..Record::default() });
        assert_eq!(pane.get("dir"), Ok(BindingValue::Vec2([0.5, -0.5])));
    }

    #[test]
    fn set_does_not_clamp_to_slider_range() {
        let (target, pane) = pane();
        pane.set("speed", BindingValue::Scalar(40.0)).unwrap();
        assert_eq!(target.borrow().speed, 40.0);
    }

    #[test]
    fn set_rejects_unknown_keys_and_wrong_types() {
        let (target, pane) = pane();
        assert_eq!(pane.set("nope", BindingValue::Scalar(1.0)), Err(BindingError::UnknownKey("nope".into())));
        assert_eq!(
            pane.set("tint", BindingValue::Scalar(1.0)),
            Err(BindingError::TypeMismatch { key: "tint".into(), expected: "vec3", got: "scalar" })
        );
        assert_eq!(
            pane.set("mode", BindingValue::Index(3)),
            Err(BindingError::NoSuchOption { key: "mode".into(), index: 3, len: 3 })
        );
        assert_eq!(*target.borrow(), Record::default());
    }

    #[test]
    fn choice_hook_runs_after_write() {
        let target = Rc::new(RefCell::new(Record::default()));
        let seen = Rc::new(Cell::new(None));
        let sink = Rc::clone(&seen);
        let observed = Rc::clone(&target);
        let mut pane = Pane::new("Controls", Rc::clone(&target));
        pane.add_folder("Q").add_choice_with("Mode", MODE, ["a", "b", "c"], move |i| {
            sink.set(Some((i, observed.borrow().mode)));
        });

        pane.set("mode", BindingValue::Index(2)).unwrap();
        assert_eq!(seen.get(), Some((2, 2)));
    }

    // ── widgets ───────────────────────────────────────────────────────────

    fn frame(scene: &mut UiScene, pane: &Pane<Record>, pos: (f32, f32), down: bool) {
        let input = UiInput { mouse_pos: Some(pos.into()), mouse_down: down };
        let _ = scene.frame(pane.element(&Theme::default()), Vec2::new(300.0, 600.0), Placement::Fill, &input);
    }

    #[test]
    fn dragging_a_slider_writes_through_its_field() {
        let (target, pane) = pane();
        let mut scene = UiScene::new();

        // Title bar 26 + padding 6 puts the first row at y = 32..56; the
        // slider track starts at 6 + 288 * 0.38.
        frame(&mut scene, &pane, (120.0, 44.0), true);
        frame(&mut scene, &pane, (290.0, 44.0), true);
        frame(&mut scene, &pane, (290.0, 44.0), false);

        assert_eq!(*target.borrow(), Record { speed: 4.0, ..Record::default() });
    }

    #[test]
    fn collapsed_pane_ignores_body_drags() {
        let (target, pane) = pane();
        pane.set_collapsed(true);
        let mut scene = UiScene::new();
        frame(&mut scene, &pane, (120.0, 44.0), true);
        frame(&mut scene, &pane, (290.0, 44.0), false);
        assert_eq!(*target.borrow(), Record::default());
        assert!(pane.is_collapsed());
    }
}
