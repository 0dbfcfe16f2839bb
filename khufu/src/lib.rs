
pub use nalgebra;

use nalgebra::{Unit, Vector2};

mod scene;
mod segment;

pub use scene::*;
pub use segment::*;

pub type Float = f64;

/// A point, or a direction, in the plane. Which one is up to the caller.
pub type Vector = Vector2<Float>;

/// How far along its direction a ray's first cast starts from its origin.
///
/// Rays are usually emitted from a corner of the scene, this keeps them from
/// hitting the segments anchored at that corner.
pub const SOURCE_OFFSET: Float = 0.01;

/// How far along the reflected direction the next cast starts from a hit point.
pub const BOUNCE_OFFSET: Float = 0.0001;

pub const DEFAULT_MAX_REFLECTIONS: usize = 300;

/// The cast length the demos give their rays
pub const DEFAULT_RAY_LENGTH: Float = 100.;

/// A light ray, cast from `origin` along `direction`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vector,
    pub direction: Unit<Vector>,
    /// The length of every cast, including the ones following a reflection.
    ///
    /// This is not a budget for the whole path: it isn't shortened by the distance already
    /// travelled, so a path can be longer, in total, than `length`.
    pub length: Float,
    pub max_reflections: usize,
}

impl Ray {
    #[inline]
    #[must_use]
    pub fn new(origin: impl Into<Vector>, direction: Unit<Vector>, length: Float) -> Self {
        Self {
            origin: origin.into(),
            direction,
            length,
            max_reflections: DEFAULT_MAX_REFLECTIONS,
        }
    }

    /// Returns `None` if `direction` is zero
    #[inline]
    #[must_use]
    pub fn try_new(
        origin: impl Into<Vector>,
        direction: impl Into<Vector>,
        length: Float,
    ) -> Option<Self> {
        Unit::try_new(direction.into(), 0.).map(|dir| Self::new(origin, dir, length))
    }

    /// A ray whose direction makes an angle of `angle` radians with the x axis.
    #[inline]
    #[must_use]
    pub fn from_angle(origin: impl Into<Vector>, length: Float, angle: Float) -> Self {
        // cos² + sin² = 1
        let direction = Unit::new_unchecked(Vector::new(angle.cos(), angle.sin()));
        Self::new(origin, direction, length)
    }

    #[inline]
    #[must_use]
    pub fn with_max_reflections(mut self, max_reflections: usize) -> Self {
        self.max_reflections = max_reflections;
        self
    }

    /// The angle, in radians, between the x axis and this ray's direction, in `[-π, π]`
    #[inline]
    #[must_use]
    pub fn angle(&self) -> Float {
        self.direction.y.atan2(self.direction.x)
    }

    /// Get the point at distance `t` (can be negative) from the ray's origin
    #[inline]
    #[must_use]
    pub fn at(&self, t: Float) -> Vector {
        self.origin + self.direction.as_ref() * t
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Material {
    /// Mirror-reflects incoming rays about the surface normal.
    Reflective,
    /// Stops rays on contact.
    Absorbing,
}

/// Where a cast hit a surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitRecord {
    pub point: Vector,
    /// Unit normal of the surface at `point`, facing the side the cast came from.
    pub normal: Unit<Vector>,
    pub material: Material,
}

/// Reflect `v` w.r.t. the line orthogonal to `normal`
#[inline]
#[must_use]
pub fn reflect(v: &Vector, normal: &Unit<Vector>) -> Vector {
    let n = normal.as_ref();
    v - n * (2. * v.dot(n))
}

/// Returns the intersection of the line through `p1` and `p2` with
/// the line through `p3` and `p4`.
///
/// Returns `None` if the lines are parallel or if one of them is degenerate
/// (both of its points are equal).
#[inline]
#[must_use]
pub fn cross_point(p1: &Vector, p2: &Vector, p3: &Vector, p4: &Vector) -> Option<Vector> {
    let u = p1 - p2;
    let v = p3 - p4;
    let d = u.perp(&v);

    if !d.is_finite() || d.abs() <= Float::EPSILON * u.norm() * v.norm() {
        return None;
    }

    let a = p1.perp(p2);
    let b = p3.perp(p4);

    Some((v * a - u * b) / d)
}

/// A single cast, from `source` to `destination`, and the closest hit reported so far.
#[derive(Clone, Debug, PartialEq)]
pub struct CastCtx {
    source: Vector,
    destination: Vector,
    closest: Option<(Float, HitRecord)>,
}

impl CastCtx {
    #[inline]
    #[must_use]
    pub fn new(source: Vector, destination: Vector) -> Self {
        Self {
            source,
            destination,
            closest: None,
        }
    }

    #[inline]
    pub fn source(&self) -> &Vector {
        &self.source
    }

    #[inline]
    pub fn destination(&self) -> &Vector {
        &self.destination
    }

    /// Report a hit at `source + fraction * (destination - source)`.
    ///
    /// Hits outside of `(0, 1]` are discarded. When two hits are at the exact
    /// same fraction, the first one reported is kept.
    #[inline]
    pub fn add_hit(&mut self, fraction: Float, hit: HitRecord) {
        if fraction > 0.
            && fraction <= 1.
            && self.closest.as_ref().map_or(true, |(t, _)| *t > fraction)
        {
            self.closest = Some((fraction, hit));
        }
    }

    #[inline]
    pub fn closest(&self) -> Option<&HitRecord> {
        self.closest.as_ref().map(|(_, hit)| hit)
    }

    #[inline]
    pub fn into_closest(self) -> Option<HitRecord> {
        self.closest.map(|(_, hit)| hit)
    }
}

/// Anything a ray can hit.
pub trait Surface {
    /// Reports, with [`ctx.add_hit(...)`](CastCtx::add_hit), the intersections between
    /// this surface and the cast going from [`ctx.source()`](CastCtx::source) to
    /// [`ctx.destination()`](CastCtx::destination), in no particular order.
    ///
    /// Reports nothing if the cast misses.
    ///
    /// This method must be deterministic: for the same cast it always reports the same hits.
    fn add_hits(&self, ctx: &mut CastCtx);
}

impl<T: Surface> Surface for [T] {
    #[inline]
    fn add_hits(&self, ctx: &mut CastCtx) {
        self.iter().for_each(|surface| surface.add_hits(ctx))
    }
}

impl<const N: usize, T: Surface> Surface for [T; N] {
    #[inline]
    fn add_hits(&self, ctx: &mut CastCtx) {
        self.as_slice().add_hits(ctx)
    }
}

impl<T: Surface> Surface for Vec<T> {
    #[inline]
    fn add_hits(&self, ctx: &mut CastCtx) {
        self.as_slice().add_hits(ctx)
    }
}

/// Returns the closest hit between `surface` and the cast from `source` to `destination`
#[inline]
#[must_use]
pub fn nearest_hit(
    surface: &(impl Surface + ?Sized),
    source: Vector,
    destination: Vector,
) -> Option<HitRecord> {
    let mut ctx = CastCtx::new(source, destination);
    surface.add_hits(&mut ctx);
    ctx.into_closest()
}

/// Why a ray stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Termination {
    /// A cast hit nothing, the ray left the scene.
    Escaped,
    /// The ray hit an absorbing surface.
    Absorbed,
    /// A cast had zero length, the ray couldn't move.
    Stalled,
    /// Every allowed cast hit a reflective surface.
    BudgetExhausted,
}

/// A straight piece of a ray's path, ending on a surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Leg {
    pub start: Vector,
    pub end: Vector,
    pub hit: HitRecord,
    /// The reflected direction the ray leaves `end` with.
    ///
    /// `None` if the ray stopped at `end`.
    pub outgoing: Option<Unit<Vector>>,
}

impl Leg {
    #[inline]
    #[must_use]
    pub fn length(&self) -> Float {
        (self.end - self.start).norm()
    }

    #[inline]
    #[must_use]
    pub fn incoming(&self) -> Option<Unit<Vector>> {
        Unit::try_new(self.end - self.start, 0.)
    }
}

/// Lazily computes the legs of a ray bouncing through a [`Surface`].
pub struct RayPath<'a, S: ?Sized> {
    surface: &'a S,
    length: Float,
    source: Vector,
    destination: Vector,
    casts_left: usize,
    distance: Float,
    termination: Option<Termination>,
}

impl<'a, S: Surface + ?Sized> RayPath<'a, S> {
    #[inline]
    pub fn new(surface: &'a S, ray: &Ray) -> Self {
        let source = ray.at(SOURCE_OFFSET);

        if ray.length == 0. {
            log::warn!(
                "ray from ({}, {}) has zero length, it will stall",
                ray.origin.x,
                ray.origin.y,
            );
        }

        Self {
            surface,
            length: ray.length,
            source,
            destination: source + ray.direction.as_ref() * ray.length,
            casts_left: ray.max_reflections.saturating_add(1),
            distance: 0.,
            termination: None,
        }
    }

    /// The sum of the lengths of the legs returned so far
    #[inline]
    pub fn distance(&self) -> Float {
        self.distance
    }

    /// `None` while the ray is still going
    #[inline]
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    #[inline]
    fn stop(&mut self, termination: Termination) -> Option<Leg> {
        self.termination = Some(termination);
        None
    }
}

impl<S: Surface + ?Sized> Iterator for RayPath<'_, S> {
    type Item = Leg;

    fn next(&mut self) -> Option<Self::Item> {
        if self.termination.is_some() {
            return None;
        }

        let Some(casts_left) = self.casts_left.checked_sub(1) else {
            return self.stop(Termination::BudgetExhausted);
        };
        self.casts_left = casts_left;

        if self.destination == self.source {
            return self.stop(Termination::Stalled);
        }

        let Some(hit) = nearest_hit(self.surface, self.source, self.destination) else {
            return self.stop(Termination::Escaped);
        };

        let start = self.source;
        let incoming = hit.point - start;
        self.distance += incoming.norm();

        log::trace!(
            "hit {:?} surface at ({}, {}) from ({}, {})",
            hit.material,
            hit.point.x,
            hit.point.y,
            start.x,
            start.y,
        );

        let outgoing = match hit.material {
            Material::Absorbing => {
                self.termination = Some(Termination::Absorbed);
                None
            }
            Material::Reflective => {
                let outgoing = Unit::try_new(reflect(&incoming, &hit.normal), 0.);

                match outgoing {
                    Some(dir) => {
                        self.destination = hit.point + dir.as_ref() * self.length;
                        self.source = hit.point + dir.as_ref() * BOUNCE_OFFSET;
                    }
                    None => self.termination = Some(Termination::Stalled),
                }

                outgoing
            }
        };

        Some(Leg {
            start,
            end: hit.point,
            hit,
            outgoing,
        })
    }
}

/// The bounced trajectory of a ray.
#[derive(Clone, Debug, PartialEq)]
pub struct TracePath {
    legs: Vec<Leg>,
    distance: Float,
    termination: Termination,
}

impl TracePath {
    #[inline]
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// The total length of all legs
    #[inline]
    pub fn distance(&self) -> Float {
        self.distance
    }

    #[inline]
    pub fn termination(&self) -> Termination {
        self.termination
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.legs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    #[inline]
    pub fn last_hit(&self) -> Option<&HitRecord> {
        self.legs.last().map(|leg| &leg.hit)
    }

    /// The path as a polyline: the start of the first leg, then the end of every leg.
    ///
    /// Empty if there are no legs.
    pub fn points(&self) -> Vec<Vector> {
        self.legs
            .first()
            .map(|leg| leg.start)
            .into_iter()
            .chain(self.legs.iter().map(|leg| leg.end))
            .collect()
    }
}

/// Bounce `ray` through `surface` until it escapes, gets absorbed, or runs out of reflections.
///
/// At most `ray.max_reflections + 1` legs are returned. A final cast that hits nothing
/// isn't part of the path.
pub fn trace<S: Surface + ?Sized>(surface: &S, ray: &Ray) -> TracePath {
    let mut path = RayPath::new(surface, ray);
    let legs: Vec<_> = path.by_ref().collect();

    // the iterator only stops once it has a reason to
    let termination = path.termination().unwrap_or(Termination::BudgetExhausted);

    log::debug!(
        "traced ray from ({}, {}): {} legs, distance {}, {:?}",
        ray.origin.x,
        ray.origin.y,
        legs.len(),
        path.distance(),
        termination,
    );

    TracePath {
        legs,
        distance: path.distance(),
        termination,
    }
}
