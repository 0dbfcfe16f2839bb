use super::*;

/// An unordered store of segments.
///
/// Only the segments inserted with [`Self::insert`] take part in ray queries. The backdrop
/// is geometry that is only there to be looked at: construction lines, transparent parts, etc...
///
/// A scene is never edited while rays are being traced through it, build a new one instead.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    segments: Vec<Segment>,
    backdrop: Vec<Segment>,
}

impl Scene {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a segment that blocks rays
    pub fn insert(&mut self, segment: Segment) {
        if segment.is_degenerate() {
            log::warn!(
                "inserting a zero-length segment at ({}, {}), it will never be hit",
                segment.start().x,
                segment.start().y,
            );
        }
        self.segments.push(segment);
    }

    /// Add a segment that is never considered by ray queries
    #[inline]
    pub fn insert_backdrop(&mut self, segment: Segment) {
        self.backdrop.push(segment);
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    pub fn backdrop(&self) -> &[Segment] {
        &self.backdrop
    }

    /// The number of ray-blocking segments
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the hit closest to `source`, strictly after it, and no further than `destination`
    #[inline]
    #[must_use]
    pub fn query_nearest_hit(&self, source: Vector, destination: Vector) -> Option<HitRecord> {
        nearest_hit(self, source, destination)
    }

    #[inline]
    pub fn trace(&self, ray: &Ray) -> TracePath {
        trace(self, ray)
    }
}

impl Surface for Scene {
    #[inline]
    fn add_hits(&self, ctx: &mut CastCtx) {
        self.segments.add_hits(ctx)
    }
}

impl Extend<Segment> for Scene {
    fn extend<T: IntoIterator<Item = Segment>>(&mut self, iter: T) {
        iter.into_iter().for_each(|segment| self.insert(segment))
    }
}

impl FromIterator<Segment> for Scene {
    fn from_iter<T: IntoIterator<Item = Segment>>(iter: T) -> Self {
        let mut scene = Self::new();
        scene.extend(iter);
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::FRAC_PI_2;

    #[test]
    fn backdrop_is_transparent() {
        let mut scene = Scene::new();
        scene.insert_backdrop(Segment::absorbing([-10., 2.], [10., 2.]));
        scene.insert(Segment::absorbing([-10., 0.], [10., 0.]));

        assert_eq!(scene.len(), 1);
        assert_eq!(scene.backdrop().len(), 1);

        let ray = Ray::from_angle([0., 5.], 20., -FRAC_PI_2);
        let path = scene.trace(&ray);
        assert_eq!(path.len(), 1);
        assert!(path.legs()[0].end.y.abs() < 1e-9);
    }

    #[test]
    fn nearest_of_many() {
        let scene: Scene = (1..=5)
            .map(|i| Segment::reflective([i as Float, -1.], [i as Float, 1.]))
            .collect();

        let hit = scene
            .query_nearest_hit(Vector::new(0., 0.), Vector::new(10., 0.))
            .unwrap();
        assert!((hit.point.x - 1.).abs() < 1e-12);
        assert!(hit.normal.x < 0.);

        let hit = scene
            .query_nearest_hit(Vector::new(2.5, 0.), Vector::new(10., 0.))
            .unwrap();
        assert!((hit.point.x - 3.).abs() < 1e-12);

        assert!(scene
            .query_nearest_hit(Vector::new(5.5, 0.), Vector::new(10., 0.))
            .is_none());
    }

    #[test]
    fn empty_scene_never_hits() {
        let scene = Scene::new();
        assert!(scene.is_empty());
        assert!(scene.trace(&Ray::from_angle([0., 0.], 100., 0.3)).is_empty());
    }
}
