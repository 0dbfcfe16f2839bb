use core::ops::RangeInclusive;
use std::error::Error;

use khufu_json::{bool_field, float_field, serde_json, JsonDes, JsonSer};
use khufu_random::{rand, Random};

use super::*;

/// 26°56'51"
pub const DEFAULT_ASCENDING_ANGLE: Float = 0.470322600181172;
/// 26°26'46"
pub const DEFAULT_DESCENDING_ANGLE: Float = 0.46157171323714485;
/// How far, in radians, the corridor angles may stray from their defaults
pub const ANGLE_RANGE: Float = PI / 180.;

pub const CEILING_OFFSET_RANGE: RangeInclusive<Float> = 0.0..=12.0;
pub const QUEEN_ANGLE_RANGE: RangeInclusive<Float> = (PI / 6.)..=(5. * PI / 6.);

/// How the levels of a gallery wall are laid out
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WallMode {
    #[default]
    Horizontal,
    /// Parallel to the gallery floor
    Parallel,
}

impl WallMode {
    /// The slope of the levels, for a gallery floor rising at `ascending_angle`
    #[inline]
    #[must_use]
    pub fn angle(self, ascending_angle: Float) -> Float {
        match self {
            Self::Horizontal => 0.,
            Self::Parallel => ascending_angle,
        }
    }
}

/// What the gallery beams are made of
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BeamMaterial {
    /// Drawn, but never hit
    Transparent,
    Reflect,
    #[default]
    Absorb,
}

impl BeamMaterial {
    /// `None` for transparent beams
    #[inline]
    #[must_use]
    pub fn material(self) -> Option<Material> {
        match self {
            Self::Transparent => None,
            Self::Reflect => Some(Material::Reflective),
            Self::Absorb => Some(Material::Absorbing),
        }
    }
}

/// Everything [`build_pyramid`] can be tuned with.
///
/// Changing a parameter means building a new scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PyramidConfig {
    pub ascending_angle: Float,
    pub descending_angle: Float,
    /// Draw the construction lines where the two corridors meet
    pub show_corridors_crossing_problem: bool,
    /// Sweep the descending corridor's entrance with rays
    pub enable_input_ray: bool,
    /// Sweep the queen chamber's floor with rays
    pub enable_queen_ray: bool,
    pub queen_angle: Float,
    pub ceiling_parallel_to_floor: bool,
    /// How far the gallery ceiling is lowered, `0` for a flat ceiling
    pub gallery_ceiling_offset: Float,
    pub left_wall_mode: WallMode,
    pub right_wall_mode: WallMode,
    pub beam_material: BeamMaterial,
}

impl Default for PyramidConfig {
    fn default() -> Self {
        Self {
            ascending_angle: DEFAULT_ASCENDING_ANGLE,
            descending_angle: DEFAULT_DESCENDING_ANGLE,
            show_corridors_crossing_problem: false,
            enable_input_ray: false,
            enable_queen_ray: false,
            queen_angle: PI / 6.,
            ceiling_parallel_to_floor: true,
            gallery_ceiling_offset: 1.,
            left_wall_mode: WallMode::Horizontal,
            right_wall_mode: WallMode::Parallel,
            beam_material: BeamMaterial::Absorb,
        }
    }
}

impl PyramidConfig {
    #[inline]
    pub fn ascending_angle_range() -> RangeInclusive<Float> {
        (DEFAULT_ASCENDING_ANGLE - ANGLE_RANGE)..=(DEFAULT_ASCENDING_ANGLE + ANGLE_RANGE)
    }

    #[inline]
    pub fn descending_angle_range() -> RangeInclusive<Float> {
        (DEFAULT_DESCENDING_ANGLE - ANGLE_RANGE)..=(DEFAULT_DESCENDING_ANGLE + ANGLE_RANGE)
    }

    /// Checks every parameter against its allowed range
    pub fn validate(&self) -> Result<(), SceneError> {
        ensure(
            Self::ascending_angle_range().contains(&self.ascending_angle),
            "ascending angle",
            self.ascending_angle,
            "must be within 1° of 26°56'51\"",
        )?;
        ensure(
            Self::descending_angle_range().contains(&self.descending_angle),
            "descending angle",
            self.descending_angle,
            "must be within 1° of 26°26'46\"",
        )?;
        ensure(
            CEILING_OFFSET_RANGE.contains(&self.gallery_ceiling_offset),
            "gallery ceiling offset",
            self.gallery_ceiling_offset,
            "must be between 0 and 12",
        )?;
        ensure(
            QUEEN_ANGLE_RANGE.contains(&self.queen_angle),
            "queen chamber ray angle",
            self.queen_angle,
            "must be between 30° and 150°",
        )
    }
}

impl JsonSer for WallMode {
    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Horizontal => "horizontal",
            Self::Parallel => "parallel",
        }
        .into()
    }
}

impl JsonDes for WallMode {
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        match json.as_str().ok_or("wall mode must be a string")? {
            "horizontal" => Ok(Self::Horizontal),
            "parallel" => Ok(Self::Parallel),
            other => Err(format!("invalid wall mode: {other}").into()),
        }
    }
}

impl JsonSer for BeamMaterial {
    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Transparent => "transparent",
            Self::Reflect => "reflect",
            Self::Absorb => "absorb",
        }
        .into()
    }
}

impl JsonDes for BeamMaterial {
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        match json.as_str().ok_or("beam material must be a string")? {
            "transparent" => Ok(Self::Transparent),
            "reflect" => Ok(Self::Reflect),
            "absorb" => Ok(Self::Absorb),
            other => Err(format!("invalid beam material: {other}").into()),
        }
    }
}

impl JsonSer for PyramidConfig {
    /// The format of the returned object is explained in [`Self::from_json`]
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "ascending_angle": self.ascending_angle,
            "descending_angle": self.descending_angle,
            "show_corridors_crossing_problem": self.show_corridors_crossing_problem,
            "enable_input_ray": self.enable_input_ray,
            "enable_queen_ray": self.enable_queen_ray,
            "queen_angle": self.queen_angle,
            "ceiling_parallel_to_floor": self.ceiling_parallel_to_floor,
            "gallery_ceiling_offset": self.gallery_ceiling_offset,
            "left_wall_mode": self.left_wall_mode.to_json(),
            "right_wall_mode": self.right_wall_mode.to_json(),
            "beam_material": self.beam_material.to_json(),
        })
    }
}

impl JsonDes for PyramidConfig {
    /// Deserialize a pyramid config from a JSON object.
    ///
    /// Every field is optional, missing ones take their default value:
    ///
    /// ```json
    /// {
    ///     "ascending_angle": 0.470322600181172, // (radians)
    ///     "descending_angle": 0.46157171323714485, // (radians)
    ///     "show_corridors_crossing_problem": false,
    ///     "enable_input_ray": false,
    ///     "enable_queen_ray": false,
    ///     "queen_angle": 0.5235987755982988, // (radians)
    ///     "ceiling_parallel_to_floor": true,
    ///     "gallery_ceiling_offset": 1.0,
    ///     "left_wall_mode": "horizontal", // (or "parallel")
    ///     "right_wall_mode": "parallel",
    ///     "beam_material": "absorb", // (or "reflect", "transparent")
    /// }
    /// ```
    ///
    /// The resulting config is validated.
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        if !json.is_object() {
            return Err("pyramid config must be an object".into());
        }

        let d = Self::default();

        let config = Self {
            ascending_angle: float_field(json, "ascending_angle")?.unwrap_or(d.ascending_angle),
            descending_angle: float_field(json, "descending_angle")?
                .unwrap_or(d.descending_angle),
            show_corridors_crossing_problem: bool_field(json, "show_corridors_crossing_problem")?
                .unwrap_or(d.show_corridors_crossing_problem),
            enable_input_ray: bool_field(json, "enable_input_ray")?.unwrap_or(d.enable_input_ray),
            enable_queen_ray: bool_field(json, "enable_queen_ray")?.unwrap_or(d.enable_queen_ray),
            queen_angle: float_field(json, "queen_angle")?.unwrap_or(d.queen_angle),
            ceiling_parallel_to_floor: bool_field(json, "ceiling_parallel_to_floor")?
                .unwrap_or(d.ceiling_parallel_to_floor),
            gallery_ceiling_offset: float_field(json, "gallery_ceiling_offset")?
                .unwrap_or(d.gallery_ceiling_offset),
            left_wall_mode: json
                .get("left_wall_mode")
                .map(WallMode::from_json)
                .transpose()?
                .unwrap_or(d.left_wall_mode),
            right_wall_mode: json
                .get("right_wall_mode")
                .map(WallMode::from_json)
                .transpose()?
                .unwrap_or(d.right_wall_mode),
            beam_material: json
                .get("beam_material")
                .map(BeamMaterial::from_json)
                .transpose()?
                .unwrap_or(d.beam_material),
        };

        config.validate()?;

        Ok(config)
    }
}

impl Random for WallMode {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        if rng.gen() {
            Self::Horizontal
        } else {
            Self::Parallel
        }
    }
}

impl Random for BeamMaterial {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        match rng.gen_range(0usize..3) {
            0 => Self::Transparent,
            1 => Self::Reflect,
            2 => Self::Absorb,
            _ => unreachable!(),
        }
    }
}

impl Random for PyramidConfig {
    /// A valid config, with every parameter drawn from its allowed range
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        Self {
            ascending_angle: rng.gen_range(Self::ascending_angle_range()),
            descending_angle: rng.gen_range(Self::descending_angle_range()),
            show_corridors_crossing_problem: rng.gen(),
            enable_input_ray: rng.gen(),
            enable_queen_ray: rng.gen(),
            queen_angle: rng.gen_range(QUEEN_ANGLE_RANGE),
            ceiling_parallel_to_floor: rng.gen(),
            // a flat ceiling is worth testing on its own
            gallery_ceiling_offset: if rng.gen_bool(0.2) {
                0.
            } else {
                rng.gen_range(CEILING_OFFSET_RANGE)
            },
            left_wall_mode: WallMode::random(rng),
            right_wall_mode: WallMode::random(rng),
            beam_material: BeamMaterial::random(rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khufu_random::rand::{rngs::StdRng, SeedableRng};
    use serde_json::json;

    #[test]
    fn defaults_are_valid() {
        let config = PyramidConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.left_wall_mode, WallMode::Horizontal);
        assert_eq!(config.right_wall_mode, WallMode::Parallel);
        assert_eq!(config.beam_material, BeamMaterial::Absorb);
    }

    #[test]
    fn out_of_range_parameters() {
        let bad = [
            PyramidConfig {
                ascending_angle: DEFAULT_ASCENDING_ANGLE + 2. * ANGLE_RANGE,
                ..Default::default()
            },
            PyramidConfig {
                descending_angle: Float::NAN,
                ..Default::default()
            },
            PyramidConfig {
                gallery_ceiling_offset: 12.5,
                ..Default::default()
            },
            PyramidConfig {
                gallery_ceiling_offset: -0.1,
                ..Default::default()
            },
            PyramidConfig {
                queen_angle: 0.1,
                ..Default::default()
            },
        ];

        for config in bad {
            assert!(
                matches!(
                    config.validate(),
                    Err(SceneError::InvalidParameter { .. })
                ),
                "{config:?}"
            );
        }
    }

    #[test]
    fn json_fields_are_optional() {
        let config = PyramidConfig::from_json(&json!({})).unwrap();
        assert_eq!(config, PyramidConfig::default());

        let config = PyramidConfig::from_json(&json!({
            "gallery_ceiling_offset": 0.,
            "left_wall_mode": "parallel",
            "beam_material": "transparent",
            "enable_queen_ray": true,
        }))
        .unwrap();

        assert_eq!(config.gallery_ceiling_offset, 0.);
        assert_eq!(config.left_wall_mode, WallMode::Parallel);
        assert_eq!(config.right_wall_mode, WallMode::Parallel);
        assert_eq!(config.beam_material, BeamMaterial::Transparent);
        assert!(config.enable_queen_ray);
        assert!(!config.enable_input_ray);
    }

    #[test]
    fn json_is_validated() {
        assert!(PyramidConfig::from_json(&json!({ "queen_angle": 3.1 })).is_err());
        assert!(PyramidConfig::from_json(&json!({ "beam_material": "glass" })).is_err());
        assert!(PyramidConfig::from_json(&json!({ "enable_input_ray": 1 })).is_err());
        assert!(PyramidConfig::from_json(&json!([])).is_err());
    }

    #[test]
    fn json_round_trip() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = PyramidConfig::random(&mut rng);
        assert_eq!(PyramidConfig::from_json(&config.to_json()).unwrap(), config);
    }

    #[test]
    fn random_configs_are_valid() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            assert_eq!(PyramidConfig::random(&mut rng).validate(), Ok(()));
        }
    }
}
