use core::ops::Index;

use khufu_draw::{Color, DrawCommand, Drawable, List};

use super::*;

/// Numbered reference points of a construction, not all numbers need to be used.
#[derive(Clone, Debug, PartialEq)]
pub struct Points<const N: usize>([Option<Vector>; N]);

impl<const N: usize> Default for Points<N> {
    fn default() -> Self {
        Self([None; N])
    }
}

impl<const N: usize> Points<N> {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// if `index >= N`
    #[inline]
    pub fn set(&mut self, index: usize, point: Vector) {
        self.0[index] = Some(point);
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Vector> {
        self.0.get(index)?.as_ref()
    }

    /// The points that are set, with their numbers
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Vector)> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|p| (i, p)))
    }

    /// Fails on the first point with a non-finite coordinate
    pub fn check_finite(&self) -> Result<(), SceneError> {
        match self.iter().find(|(_, p)| !p.iter().all(|c| c.is_finite())) {
            Some((index, _)) => Err(SceneError::NonFinitePoint { index }),
            None => Ok(()),
        }
    }
}

impl<const N: usize> Index<usize> for Points<N> {
    type Output = Vector;

    /// # Panics
    ///
    /// if the point hasn't been set
    fn index(&self, index: usize) -> &Self::Output {
        self.get(index)
            .unwrap_or_else(|| panic!("point {index} is used before being set"))
    }
}

impl<const N: usize> Drawable for Points<N> {
    fn append_draw_commands(&self, list: &mut List<DrawCommand>) {
        for (i, p) in self.iter() {
            list.point(*p, i.to_string(), Color::WHITE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_points_are_skipped() {
        let mut points = Points::<4>::new();
        points.set(1, Vector::new(1., 2.));
        points.set(3, Vector::new(3., 4.));

        assert_eq!(points.get(0), None);
        assert_eq!(points.get(7), None);
        assert_eq!(points[3], Vector::new(3., 4.));
        assert_eq!(points.iter().map(|(i, _)| i).collect::<Vec<_>>(), [1, 3]);
        assert_eq!(points.check_finite(), Ok(()));

        points.set(2, Vector::new(Float::NAN, 0.));
        assert_eq!(
            points.check_finite(),
            Err(SceneError::NonFinitePoint { index: 2 })
        );
    }

    #[test]
    #[should_panic]
    fn reading_an_unset_point_panics() {
        let points = Points::<4>::new();
        let _point: Vector = points[2];
    }
}
