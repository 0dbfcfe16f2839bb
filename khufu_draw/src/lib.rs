use core::{borrow::Borrow, f32::consts::TAU};

use khufu::*;

mod svg;

pub use svg::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Self = Self::new(1., 1., 1.);
    pub const GREY: Self = Self::new(0.5, 0.5, 0.5);
    pub const GREEN: Self = Self::new(0., 0.8, 0.);
    pub const RED: Self = Self::new(1., 0., 0.);

    #[inline]
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// The color of the `i`-th of `n` rays of a sweep, cycling through the hues
    #[must_use]
    pub fn rainbow(i: usize, n: usize) -> Self {
        let x = 5. * i as f32 / n.max(1) as f32 * TAU / 6.;

        Self::new(
            0.5 + x.cos() / 2.,
            0.5 + (x + TAU / 3.).cos() / 2.,
            0.5 + (x + 2. * TAU / 3.).cos() / 2.,
        )
    }

    /// `#rrggbb`, channels are clamped to `[0, 1]`
    pub fn to_hex(&self) -> String {
        let channel = |v: f32| (v.clamp(0., 1.) * 255.).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }

    #[inline]
    #[must_use]
    pub fn of_material(material: Material) -> Self {
        match material {
            Material::Reflective => Self::new(0.9, 0.9, 0.9),
            Material::Absorbing => Self::new(0.9, 0.2, 0.2),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Segment {
        start: Vector,
        end: Vector,
        color: Color,
    },
    /// A small circle with a label next to it
    Point {
        at: Vector,
        label: String,
        color: Color,
    },
    Text {
        at: Vector,
        text: String,
        color: Color,
    },
}

impl DrawCommand {
    /// The points this command covers
    pub fn anchors(&self) -> impl Iterator<Item = &Vector> {
        let (a, b) = match self {
            Self::Segment { start, end, .. } => (start, Some(end)),
            Self::Point { at, .. } | Self::Text { at, .. } => (at, None),
        };
        core::iter::once(a).chain(b)
    }
}

/// A wrapper around a `Vec<T>` that only allows pushing
#[derive(Clone, Debug, Default, PartialEq)]
pub struct List<T>(Vec<T>);

impl<T> List<T> {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    #[inline]
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn push(&mut self, v: T) {
        self.0.push(v);
    }
}

impl List<DrawCommand> {
    #[inline]
    pub fn segment(&mut self, start: Vector, end: Vector, color: Color) {
        self.push(DrawCommand::Segment { start, end, color })
    }

    #[inline]
    pub fn point(&mut self, at: Vector, label: impl Into<String>, color: Color) {
        self.push(DrawCommand::Point {
            at,
            label: label.into(),
            color,
        })
    }

    #[inline]
    pub fn text(&mut self, at: Vector, text: impl Into<String>, color: Color) {
        self.push(DrawCommand::Text {
            at,
            text: text.into(),
            color,
        })
    }
}

/// Something that can be turned into a list of [`DrawCommand`]s
#[impl_trait_for_tuples::impl_for_tuples(1, 16)]
pub trait Drawable {
    fn append_draw_commands(&self, list: &mut List<DrawCommand>);
}

impl<T: Drawable> Drawable for [T] {
    fn append_draw_commands(&self, list: &mut List<DrawCommand>) {
        self.iter().for_each(|a| a.append_draw_commands(list));
    }
}

impl<const N: usize, T: Drawable> Drawable for [T; N] {
    fn append_draw_commands(&self, list: &mut List<DrawCommand>) {
        self.as_slice().append_draw_commands(list);
    }
}

impl<T: Drawable> Drawable for Vec<T> {
    fn append_draw_commands(&self, list: &mut List<DrawCommand>) {
        self.as_slice().append_draw_commands(list);
    }
}

impl Drawable for Segment {
    fn append_draw_commands(&self, list: &mut List<DrawCommand>) {
        list.segment(*self.start(), *self.end(), Color::of_material(self.material()));
    }
}

impl Drawable for Scene {
    fn append_draw_commands(&self, list: &mut List<DrawCommand>) {
        // backdrop first, so the blocking segments are drawn over it
        for segment in self.backdrop() {
            list.segment(*segment.start(), *segment.end(), Color::GREY);
        }
        self.segments().append_draw_commands(list);
    }
}

/// Pairs something with the color it should be drawn in
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Colored<T> {
    pub item: T,
    pub color: Color,
}

impl<T> Colored<T> {
    #[inline]
    #[must_use]
    pub const fn new(item: T, color: Color) -> Self {
        Self { item, color }
    }
}

impl<T: Borrow<TracePath>> Drawable for Colored<T> {
    fn append_draw_commands(&self, list: &mut List<DrawCommand>) {
        for leg in self.item.borrow().legs() {
            list.segment(leg.start, leg.end, self.color);
        }
    }
}

/// Each path drawn in the color of its position among `paths`
pub fn rainbow_paths(paths: &[TracePath]) -> Vec<Colored<&TracePath>> {
    paths
        .iter()
        .enumerate()
        .map(|(i, path)| Colored::new(path, Color::rainbow(i, paths.len())))
        .collect()
}

/// Text anchored at a point of the scene
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub at: Vector,
    pub text: String,
    pub color: Color,
}

impl Drawable for Label {
    fn append_draw_commands(&self, list: &mut List<DrawCommand>) {
        list.text(self.at, self.text.clone(), self.color);
    }
}

/// Formats `angle` (in radians) as `"{prefix} {degrees}.{minutes}'{seconds}\""`.
///
/// Every component is truncated, not rounded.
pub fn format_dms(prefix: &str, angle: Float) -> String {
    let a = 180. * angle / core::f64::consts::PI;

    let degrees = a.floor();
    let minutes = (60. * (a - degrees)) as i64;
    let seconds = ((a - degrees - minutes as Float / 60.) * 3600.).floor();

    format!("{prefix} {degrees}.{minutes}'{seconds}\"")
}

/// Collect the draw commands of `drawable` in a new list
pub fn draw(drawable: &(impl Drawable + ?Sized)) -> List<DrawCommand> {
    let mut list = List::new();
    drawable.append_draw_commands(&mut list);
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rainbow_starts_red() {
        let c = Color::rainbow(0, 50);
        assert!((c.r - 1.).abs() < 1e-6);
        assert!((c.g - 0.25).abs() < 1e-6);
        assert!((c.b - 0.25).abs() < 1e-6);
        assert_eq!(Color::rainbow(0, 50).to_hex(), "#ff4040");
    }

    #[test]
    fn rainbow_stays_in_range() {
        for i in 0..50 {
            let c = Color::rainbow(i, 50);
            for v in [c.r, c.g, c.b] {
                assert!((0. ..=1.).contains(&v));
            }
        }
        // no panic on an empty sweep
        let _ = Color::rainbow(0, 0);
    }

    #[test]
    fn dms() {
        assert_eq!(format_dms("a =", 0.5), "a = 28.38'52\"");
        assert_eq!(
            format_dms("Ascending angle =", 0.470322600181172),
            "Ascending angle = 26.56'51\""
        );
    }

    #[test]
    fn scene_draws_backdrop_first() {
        let mut scene = Scene::new();
        scene.insert(Segment::absorbing([0., 0.], [1., 0.]));
        scene.insert_backdrop(Segment::reflective([0., 1.], [1., 1.]));

        let list = draw(&scene).into_inner();
        assert_eq!(list.len(), 2);
        assert!(matches!(
            list[0],
            DrawCommand::Segment { color, .. } if color == Color::GREY
        ));
        assert!(matches!(
            list[1],
            DrawCommand::Segment { color, .. } if color == Color::of_material(Material::Absorbing)
        ));
    }

    #[test]
    fn tuples_and_paths() {
        let floor = [Segment::reflective([-10., 0.], [10., 0.])];
        let path = trace(
            &floor,
            &Ray::from_angle([0., 5.], 100., -core::f64::consts::FRAC_PI_4).with_max_reflections(0),
        );
        assert_eq!(path.len(), 1);

        let list = draw(&(floor, Colored::new(&path, Color::GREEN)));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn paths_in_rainbow_order() {
        let floor = [Segment::reflective([-10., 0.], [10., 0.])];
        let paths = Vec::from_iter((0..3).map(|i| {
            let ray = Ray::from_angle([i as Float, 5.], 100., -core::f64::consts::FRAC_PI_2);
            trace(&floor, &ray.with_max_reflections(0))
        }));

        let colored = rainbow_paths(&paths);
        assert_eq!(colored.len(), 3);
        for (i, c) in colored.iter().enumerate() {
            assert!(core::ptr::eq(c.item, &paths[i]));
            assert_eq!(c.color, Color::rainbow(i, 3));
        }

        let list = draw(&colored).into_inner();
        assert_eq!(list.len(), 3);
        assert!(matches!(
            list[2],
            DrawCommand::Segment { start, color, .. }
                if start.x == 2. && color == Color::rainbow(2, 3)
        ));
    }
}
