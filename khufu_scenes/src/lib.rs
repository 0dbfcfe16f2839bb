use core::f64::consts::{FRAC_PI_2, PI};

use khufu::*;
use thiserror::Error;

mod config;
mod gallery;
mod points;
mod pyramid;

pub use config::*;
pub use gallery::*;
pub use points::*;
pub use pyramid::*;

/// The royal cubit, in meters
pub const CUBIT: Float = PI / 6.;

/// Speed of light in vacuum, in meters per second
pub const SPEED_OF_LIGHT: Float = 299_792_458.;

/// Depth of the cups built by [`Sketch::absorb_container`]
pub const ABSORB_CONTAINER_DEPTH: Float = 0.4;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("cannot intersect {what}: the lines are parallel")]
    ParallelLines { what: &'static str },

    #[error("invalid {name} ({value}): {reason}")]
    InvalidParameter {
        name: &'static str,
        value: Float,
        reason: &'static str,
    },

    #[error("point {index} has non-finite coordinates")]
    NonFinitePoint { index: usize },
}

/// Intersection of the line through `p1` and `p2` with the line through `p3` and `p4`.
///
/// `what` names the intersection in the error.
pub fn cross(
    p1: Vector,
    p2: Vector,
    p3: Vector,
    p4: Vector,
    what: &'static str,
) -> Result<Vector, SceneError> {
    cross_point(&p1, &p2, &p3, &p4).ok_or(SceneError::ParallelLines { what })
}

/// `(cos(angle), sin(angle))`
#[inline]
#[must_use]
pub fn polar(angle: Float) -> Vector {
    Vector::new(angle.cos(), angle.sin())
}

/// Drawing primitives the builders lay their geometry out with.
///
/// Every method returns the last point it drew to, so drawing can carry on from there.
pub trait Sketch {
    fn line_with(&mut self, start: Vector, end: Vector, material: Material) -> Vector;

    /// A reflective segment from `start` to `end`
    #[inline]
    fn line(&mut self, start: Vector, end: Vector) -> Vector {
        self.line_with(start, end, Material::Reflective)
    }

    /// An absorbing segment from `start` to `end`
    #[inline]
    fn absorb_line(&mut self, start: Vector, end: Vector) -> Vector {
        self.line_with(start, end, Material::Absorbing)
    }

    /// A polyline of reflective segments starting at `start`, each of `steps` is relative
    /// to the end of the previous segment.
    fn path(&mut self, start: Vector, steps: &[Vector]) -> Vector {
        steps
            .iter()
            .fold(start, |current, step| self.line(current, current + step))
    }

    /// A cup of three absorbing segments, [`ABSORB_CONTAINER_DEPTH`] deep, hanging on the
    /// right hand side of the opening going from `start` to `end`.
    fn absorb_container(&mut self, start: Vector, end: Vector) -> Vector {
        let d = end - start;
        let offset = polar(d.y.atan2(d.x) - FRAC_PI_2) * ABSORB_CONTAINER_DEPTH;

        let (p1, p2) = (start + offset, end + offset);

        self.absorb_line(start, p1);
        self.absorb_line(end, p2);
        self.absorb_line(p1, p2)
    }
}

impl Sketch for Scene {
    #[inline]
    fn line_with(&mut self, start: Vector, end: Vector, material: Material) -> Vector {
        self.insert(Segment::new(start, end, material));
        end
    }
}

/// `count` parallel rays going in the direction of `angle`, their origins evenly spaced
/// along the segment from `start` to `end`.
///
/// The first ray starts at `start`, `end` itself is excluded.
pub fn beam(start: Vector, end: Vector, angle: Float, count: usize) -> Vec<Ray> {
    (0..count)
        .map(|i| {
            let origin = start.lerp(&end, i as Float / count as Float);
            Ray::from_angle(origin, DEFAULT_RAY_LENGTH, angle)
        })
        .collect()
}

fn ensure(
    ok: bool,
    name: &'static str,
    value: Float,
    reason: &'static str,
) -> Result<(), SceneError> {
    if ok {
        Ok(())
    } else {
        Err(SceneError::InvalidParameter {
            name,
            value,
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_follows_relative_steps() {
        let mut scene = Scene::new();
        let end = scene.path(
            Vector::new(1., 1.),
            &[Vector::new(2., 0.), Vector::new(0., 3.), Vector::new(-1., 0.)],
        );

        assert_eq!(end, Vector::new(2., 4.));
        assert_eq!(scene.len(), 3);
        assert_eq!(*scene.segments()[1].start(), Vector::new(3., 1.));
        assert!(scene
            .segments()
            .iter()
            .all(|s| s.material() == Material::Reflective));
    }

    #[test]
    fn container_hangs_below_a_rightward_opening() {
        let mut scene = Scene::new();
        scene.absorb_container(Vector::new(0., 0.), Vector::new(2., 0.));

        assert_eq!(scene.len(), 3);
        for s in scene.segments() {
            assert_eq!(s.material(), Material::Absorbing);
        }
        let bottom = scene.segments()[2];
        assert!((bottom.start() - Vector::new(0., -ABSORB_CONTAINER_DEPTH)).norm() < 1e-12);
        assert!((bottom.end() - Vector::new(2., -ABSORB_CONTAINER_DEPTH)).norm() < 1e-12);
    }

    #[test]
    fn beam_spacing() {
        let rays = beam(Vector::new(0., 0.), Vector::new(10., 0.), FRAC_PI_2, 5);

        assert_eq!(rays.len(), 5);
        for (i, ray) in rays.iter().enumerate() {
            assert!((ray.origin - Vector::new(2. * i as Float, 0.)).norm() < 1e-12);
            assert!((ray.angle() - FRAC_PI_2).abs() < 1e-12);
            assert_eq!(ray.length, DEFAULT_RAY_LENGTH);
        }
        assert!(beam(Vector::zeros(), Vector::zeros(), 0., 0).is_empty());
    }

    #[test]
    fn parallel_lines_fail_loudly() {
        let err = cross(
            Vector::new(0., 0.),
            Vector::new(1., 0.),
            Vector::new(0., 1.),
            Vector::new(1., 1.),
            "test lines",
        )
        .unwrap_err();

        assert_eq!(err, SceneError::ParallelLines { what: "test lines" });
        assert!(err.to_string().contains("test lines"));
    }
}
