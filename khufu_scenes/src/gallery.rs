//! The grand gallery seen from its end: a reflective floor, absorbing walls, and stepped sides
//! rising on both sides.

use khufu_draw::{rainbow_paths, Color, DrawCommand, Drawable, Label, List};

use super::*;

pub const GALLERY_POINTS: usize = 21;

/// Steps on each side
pub const GALLERY_LEVELS: usize = 8;

const FLOOR_WIDTH: Float = 2. * CUBIT;
const STEP_WIDTH: Float = CUBIT / 7.;

fn level_heights() -> [Float; GALLERY_LEVELS] {
    let mut heights = [8.74; GALLERY_LEVELS];
    for (height, h) in heights
        .iter_mut()
        .zip([89.9, 129.9, 166.2, 211.7, 245.4, 278.7, 312.4])
    {
        *height = h * 4.22 / 166.2;
    }
    heights
}

/// The angle a ray leaving `from` must have to bounce once off the floor, in the middle of
/// the gallery, then reach `to`.
pub fn golden_angle(from: Vector, to: Vector) -> Float {
    let x = from.y * (to.x - from.x) / (from.y + to.y);
    (-from.y).atan2(x)
}

#[derive(Clone, Debug, PartialEq)]
pub struct GalleryScene {
    scene: Scene,
    points: Points<GALLERY_POINTS>,
}

impl GalleryScene {
    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    pub fn points(&self) -> &Points<GALLERY_POINTS> {
        &self.points
    }

    /// One ray per level, from its left step to the floor, with a single bounce allowed to
    /// reach the matching right step.
    pub fn probes(&self) -> Vec<Ray> {
        (0..GALLERY_LEVELS)
            .map(|i| {
                let (from, to) = (self.points[5 + 2 * i], self.points[6 + 2 * i]);
                Ray::from_angle(from, DEFAULT_RAY_LENGTH, golden_angle(from, to))
                    .with_max_reflections(1)
            })
            .collect()
    }
}

impl Drawable for GalleryScene {
    fn append_draw_commands(&self, list: &mut List<DrawCommand>) {
        self.scene.append_draw_commands(list);
        self.points.append_draw_commands(list);

        let probes = self.probes();
        let paths = Vec::from_iter(probes.iter().map(|ray| self.scene.trace(ray)));

        for (ray, path) in probes.iter().zip(&paths) {
            Label {
                at: Vector::new(0., ray.origin.y),
                text: format!("{:.3} m", path.distance()),
                color: Color::WHITE,
            }
            .append_draw_commands(list);
        }

        rainbow_paths(&paths).append_draw_commands(list);
    }
}

pub fn build_gallery() -> Result<GalleryScene, SceneError> {
    let mut scene = Scene::new();
    let mut p = Points::<GALLERY_POINTS>::new();

    p.set(0, Vector::zeros());
    p.set(1, Vector::new(-FLOOR_WIDTH / 2. - CUBIT, 0.));
    p.set(2, Vector::new(FLOOR_WIDTH / 2. + CUBIT, 0.));

    scene.line(
        Vector::new(-FLOOR_WIDTH / 2., 0.),
        Vector::new(FLOOR_WIDTH / 2., 0.),
    );
    scene.absorb_line(
        Vector::new(-FLOOR_WIDTH / 2., 0.),
        Vector::new(-FLOOR_WIDTH / 2., CUBIT),
    );
    scene.absorb_line(
        Vector::new(FLOOR_WIDTH / 2., 0.),
        Vector::new(FLOOR_WIDTH / 2., CUBIT),
    );

    p.set(
        3,
        scene.absorb_line(
            Vector::new(-FLOOR_WIDTH / 2., CUBIT),
            Vector::new(-FLOOR_WIDTH / 2. - CUBIT, CUBIT),
        ),
    );
    p.set(
        4,
        scene.absorb_line(
            Vector::new(FLOOR_WIDTH / 2., CUBIT),
            Vector::new(FLOOR_WIDTH / 2. + CUBIT, CUBIT),
        ),
    );

    let (mut left, mut right) = (p[3], p[4]);

    for (i, height) in level_heights().into_iter().enumerate() {
        let inset = i as Float * STEP_WIDTH;
        let l = p[1] + Vector::new(inset, height);
        let r = p[2] + Vector::new(-inset, height);
        p.set(5 + 2 * i, l);
        p.set(6 + 2 * i, r);

        scene.line(left, l);
        scene.line(right, r);

        if i + 1 < GALLERY_LEVELS {
            left = scene.line(l, l + Vector::new(STEP_WIDTH, 0.));
            right = scene.line(r, r + Vector::new(-STEP_WIDTH, 0.));
        }
    }

    scene.line(p[19], p[20]);

    p.check_finite()?;

    // the axis, and how high each step is
    scene.insert_backdrop(Segment::reflective(p[0], Vector::new(0., p[19].y)));
    for i in 5..GALLERY_POINTS {
        scene.insert_backdrop(Segment::reflective(p[i], Vector::new(p[i].x, p[3].y)));
    }

    log::debug!(
        "built gallery: {} segments, {} backdrop segments",
        scene.len(),
        scene.backdrop().len(),
    );

    Ok(GalleryScene { scene, points: p })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout() {
        let gallery = build_gallery().unwrap();
        let p = gallery.points();

        assert_eq!(gallery.scene().len(), 36);
        assert_eq!(
            gallery
                .scene()
                .segments()
                .iter()
                .filter(|s| s.material() == Material::Absorbing)
                .count(),
            4
        );
        assert_eq!(gallery.scene().backdrop().len(), 17);

        // symmetric about the axis
        for i in 0..GALLERY_LEVELS {
            let (l, r) = (p[5 + 2 * i], p[6 + 2 * i]);
            assert!((l.x + r.x).abs() < 1e-12);
            assert_eq!(l.y, r.y);
        }
        assert_eq!(p[19].y, 8.74);
    }

    #[test]
    fn probes_bounce_in_the_middle() {
        let gallery = build_gallery().unwrap();
        let probes = gallery.probes();
        assert_eq!(probes.len(), GALLERY_LEVELS);

        let mut last_distance = 0.;

        for (i, ray) in probes.iter().enumerate() {
            let path = gallery.scene().trace(ray);
            let legs = path.legs();

            assert_eq!(legs.len(), 2);
            assert_eq!(path.termination(), Termination::BudgetExhausted);
            assert!(legs[0].end.norm() < 1e-4);
            assert!((legs[1].end - gallery.points()[6 + 2 * i]).norm() < 1e-4);

            assert!(path.distance() > last_distance);
            last_distance = path.distance();
        }

        let first = gallery.scene().trace(&probes[0]).distance();
        assert!((first - 5.0127).abs() < 1e-3);
        assert!((last_distance - 17.5012).abs() < 1e-3);
    }

    #[test]
    fn golden_angle_of_a_symmetric_pair() {
        let angle = golden_angle(Vector::new(-1., 1.), Vector::new(1., 1.));
        assert!((angle + core::f64::consts::FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn drawing_labels_every_level() {
        let gallery = build_gallery().unwrap();
        let list = khufu_draw::draw(&gallery).into_inner();

        let labels: Vec<_> = list
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();

        assert_eq!(labels.len(), GALLERY_LEVELS);
        assert_eq!(labels[0], "5.013 m");
    }
}
