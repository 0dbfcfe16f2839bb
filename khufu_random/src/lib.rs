use khufu::{nalgebra::Unit, *};

use core::{f64::consts::TAU, iter};
pub use rand;

pub trait Random: Sized {
    /// Generate a randomized value of this type using the provided `rng`
    ///
    /// This method must not fail. If creating a value is faillible, keep trying until success
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self;
}

impl Random for Material {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        if rng.gen_bool(0.25) {
            Material::Absorbing
        } else {
            Material::Reflective
        }
    }
}

impl Random for Segment {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        loop {
            let material = Material::random(rng);
            if let Some(segment) =
                Segment::try_new(rand_vect(rng, 7.0), rand_vect(rng, 7.0), material)
            {
                break segment;
            }
        }
    }
}

impl Random for Ray {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        let origin = rand_vect(rng, 7.0);

        let direction = loop {
            if let Some(v) = Unit::try_new(rand_vect(rng, 1.0), Float::EPSILON * 8.0) {
                break v;
            }
        };

        Self::new(origin, direction, 100.)
    }
}

pub fn random_scene(rng: &mut (impl rand::Rng + ?Sized), num_segments: usize) -> Scene {
    iter::repeat_with(|| Segment::random(rng))
        .take(num_segments)
        .collect()
}

pub fn random_simulation(rng: &mut (impl rand::Rng + ?Sized)) -> (Scene, Vec<Ray>) {
    const MIN_NUM_SEGMENTS: usize = 1;
    const MAX_NUM_SEGMENTS: usize = 64;
    const MIN_NUM_RAYS: usize = 1;
    const MAX_NUM_RAYS: usize = 32;

    let num_segments = rng.gen_range(MIN_NUM_SEGMENTS..MAX_NUM_SEGMENTS);
    let num_rays = rng.gen_range(MIN_NUM_RAYS..MAX_NUM_RAYS);

    (
        random_scene(rng, num_segments),
        iter::repeat_with(|| Ray::random(rng))
            .take(num_rays)
            .collect(),
    )
}

/// A closed, convex polygon made of reflective segments, and a point strictly inside it.
///
/// The polygon has between 3 and 12 sides and fits in a circle of radius `max_radius`.
pub fn rand_convex_polygon(
    rng: &mut (impl rand::Rng + ?Sized),
    max_radius: Float,
) -> (Vec<Segment>, Vector) {
    let sides = rng.gen_range(3..=12usize);
    let radius = max_radius.abs() * rng.gen_range(0.2..1.0);
    let rotation = rng.gen::<Float>() * TAU;
    let center = rand_vect(rng, max_radius);

    let vertex = |i: usize| {
        let a = rotation + TAU * i as Float / sides as Float;
        center + Vector::new(a.cos(), a.sin()) * radius
    };

    let segments = (0..sides)
        .map(|i| Segment::reflective(vertex(i), vertex(i + 1)))
        .collect();

    // the inscribed circle has radius `radius * cos(π / sides)`, stay well within it
    let inner = radius * (TAU / 2. / sides as Float).cos() * 0.9;
    let angle = rng.gen::<Float>() * TAU;
    let inside = center + Vector::new(angle.cos(), angle.sin()) * inner * rng.gen::<Float>();

    (segments, inside)
}

pub fn rand_vect(rng: &mut (impl rand::Rng + ?Sized), max_coord_mag: Float) -> Vector {
    // the rng generates floats in 0.0..1.0, scale and translate the range accordingly

    Vector::from_fn(|_, _| (rng.gen::<Float>() - 0.5) * (max_coord_mag.abs() * 2.0))
}
