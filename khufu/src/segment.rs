use super::*;

/// A straight piece of scene geometry, blocking rays according to its [`Material`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    start: Vector,
    end: Vector,
    material: Material,
}

impl Segment {
    /// Segments whose endpoints are equal are allowed, but never report any hits.
    /// See [`Self::try_new`] to reject them.
    #[inline]
    #[must_use]
    pub fn new(start: impl Into<Vector>, end: impl Into<Vector>, material: Material) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            material,
        }
    }

    /// Returns `None` if `start == end`
    #[inline]
    #[must_use]
    pub fn try_new(
        start: impl Into<Vector>,
        end: impl Into<Vector>,
        material: Material,
    ) -> Option<Self> {
        Some(Self::new(start, end, material)).filter(|s| !s.is_degenerate())
    }

    #[inline]
    #[must_use]
    pub fn reflective(start: impl Into<Vector>, end: impl Into<Vector>) -> Self {
        Self::new(start, end, Material::Reflective)
    }

    #[inline]
    #[must_use]
    pub fn absorbing(start: impl Into<Vector>, end: impl Into<Vector>) -> Self {
        Self::new(start, end, Material::Absorbing)
    }

    #[inline]
    pub const fn start(&self) -> &Vector {
        &self.start
    }

    #[inline]
    pub const fn end(&self) -> &Vector {
        &self.end
    }

    #[inline]
    pub const fn material(&self) -> Material {
        self.material
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    /// Returns `(t, p)` where `p = source + t * (destination - source)` is the
    /// intersection point between this segment and the one from `source` to `destination`.
    ///
    /// `t` can be anywhere in `[0, 1]`, it is up to the caller to discard hits too close to `source`.
    ///
    /// Returns `None` if they don't intersect, are parallel, or either one is degenerate.
    #[must_use]
    pub fn intersection(&self, source: &Vector, destination: &Vector) -> Option<(Float, Vector)> {
        let r = destination - source;
        let e = self.end - self.start;

        let denom = r.perp(&e);

        if !denom.is_finite() || denom.abs() <= Float::EPSILON * r.norm() * e.norm() {
            return None;
        }

        let q = self.start - source;

        // source + t * r = start + u * e
        let t = q.perp(&e) / denom;
        let u = q.perp(&r) / denom;

        ((0. ..=1.).contains(&t) && (0. ..=1.).contains(&u)).then(|| (t, source + r * t))
    }

    /// The unit normal of this segment, on the side of `p`.
    ///
    /// Returns `None` if this segment is degenerate.
    #[must_use]
    pub fn normal_towards(&self, p: &Vector) -> Option<Unit<Vector>> {
        let e = self.end - self.start;

        Unit::try_new(Vector::new(e.y, -e.x), 0.).map(|n| {
            if n.dot(&(p - self.start)) < 0. {
                Unit::new_unchecked(-n.into_inner())
            } else {
                n
            }
        })
    }
}

impl Surface for Segment {
    fn add_hits(&self, ctx: &mut CastCtx) {
        let Some((t, point)) = self.intersection(ctx.source(), ctx.destination()) else {
            return;
        };

        if let Some(normal) = self.normal_towards(ctx.source()) {
            ctx.add_hit(
                t,
                HitRecord {
                    point,
                    normal,
                    material: self.material,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_new_rejects_degenerate() {
        assert!(Segment::try_new([1., 1.], [1., 1.], Material::Reflective).is_none());
        assert!(Segment::try_new([1., 1.], [1., 2.], Material::Reflective).is_some());
    }

    #[test]
    fn crossing_casts_intersect() {
        let s = Segment::reflective([0., -1.], [0., 1.]);
        let (t, p) = s
            .intersection(&Vector::new(-2., 0.5), &Vector::new(2., 0.5))
            .unwrap();
        assert!((t - 0.5).abs() < 1e-12);
        assert!((p - Vector::new(0., 0.5)).norm() < 1e-12);
    }

    #[test]
    fn misses() {
        let s = Segment::reflective([0., -1.], [0., 1.]);
        // passes above
        assert!(s
            .intersection(&Vector::new(-2., 1.5), &Vector::new(2., 1.5))
            .is_none());
        // stops short
        assert!(s
            .intersection(&Vector::new(-2., 0.), &Vector::new(-1., 0.))
            .is_none());
        // parallel
        assert!(s
            .intersection(&Vector::new(1., -5.), &Vector::new(1., 5.))
            .is_none());
    }

    #[test]
    fn normal_faces_the_query_point() {
        let s = Segment::absorbing([-1., 0.], [1., 0.]);
        let up = s.normal_towards(&Vector::new(0.3, 2.)).unwrap();
        let down = s.normal_towards(&Vector::new(0.3, -2.)).unwrap();
        assert!((up.as_ref() - Vector::new(0., 1.)).norm() < 1e-12);
        assert!((down.as_ref() - Vector::new(0., -1.)).norm() < 1e-12);
        assert!(Segment::absorbing([1., 0.], [1., 0.])
            .normal_towards(&Vector::zeros())
            .is_none());
    }

    #[test]
    fn hit_carries_material() {
        let s = Segment::absorbing([-1., 0.], [1., 0.]);
        let mut ctx = CastCtx::new(Vector::new(0., 1.), Vector::new(0., -1.));
        s.add_hits(&mut ctx);
        let hit = ctx.closest().unwrap();
        assert_eq!(hit.material, Material::Absorbing);
        assert!(hit.normal.y > 0.);
    }
}
