use khufu::{nalgebra::Unit, *};
use std::error::Error;

pub use serde_json;

/// This is essentially `try_into` then `try_map` but the latter is nightly-only
pub fn json_array_to_float_array<const D: usize>(
    json_array: &[serde_json::Value],
) -> Option<[Float; D]> {
    let array: &[serde_json::Value; D] = json_array.try_into().ok()?;

    let mut coords = [0.; D];
    for (coord, value) in coords.iter_mut().zip(array) {
        *coord = value.as_f64()? as Float;
    }
    Some(coords)
}

pub fn json_array_to_vector(json_array: &[serde_json::Value]) -> Option<Vector> {
    json_array_to_float_array(json_array).map(Vector::from)
}

pub fn map_json_array<C: FromIterator<T>, T>(
    json: &serde_json::Value,
    map: impl FnMut(&serde_json::Value) -> Result<T, Box<dyn Error>>,
) -> Result<C, Box<dyn Error>> {
    json.as_array()
        .ok_or("json value must be an array")?
        .iter()
        .map(map)
        .collect()
}

/// Reads the `[x, y]` array at `json[field]`, returns `Ok(None)` if the field is absent.
pub fn vector_field(
    json: &serde_json::Value,
    field: &str,
) -> Result<Option<Vector>, Box<dyn Error>> {
    json.get(field)
        .map(|value| {
            value
                .as_array()
                .and_then(|array| json_array_to_vector(array))
                .ok_or_else(|| format!("{field} must be an array of 2 numbers").into())
        })
        .transpose()
}

/// Reads the number at `json[field]`, returns `Ok(None)` if the field is absent.
pub fn float_field(
    json: &serde_json::Value,
    field: &str,
) -> Result<Option<Float>, Box<dyn Error>> {
    json.get(field)
        .map(|value| {
            value
                .as_f64()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("{field} must be a finite number").into())
        })
        .transpose()
}

/// Reads the boolean at `json[field]`, returns `Ok(None)` if the field is absent.
pub fn bool_field(json: &serde_json::Value, field: &str) -> Result<Option<bool>, Box<dyn Error>> {
    json.get(field)
        .map(|value| {
            value
                .as_bool()
                .ok_or_else(|| format!("{field} must be a boolean").into())
        })
        .transpose()
}

pub trait JsonSer {
    /// Serialize `self` into a JSON object.
    fn to_json(&self) -> serde_json::Value;
}

impl<T: JsonSer> JsonSer for [T] {
    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(Vec::from_iter(self.iter().map(T::to_json)))
    }
}

impl<const N: usize, T: JsonSer> JsonSer for [T; N] {
    fn to_json(&self) -> serde_json::Value {
        self.as_slice().to_json()
    }
}

impl<T: JsonSer> JsonSer for Vec<T> {
    fn to_json(&self) -> serde_json::Value {
        self.as_slice().to_json()
    }
}

pub trait JsonDes {
    /// Deserialize from a JSON object.
    ///
    /// Returns an error if `json`'s format or values are invalid.
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>>
    where
        Self: Sized;
}

impl<T: JsonDes> JsonDes for Vec<T> {
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        map_json_array(json, T::from_json)
    }
}

impl JsonSer for Material {
    fn to_json(&self) -> serde_json::Value {
        match self {
            Material::Reflective => "reflect",
            Material::Absorbing => "absorb",
        }
        .into()
    }
}

impl JsonDes for Material {
    /// Either `"reflect"` or `"absorb"`
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        match json.as_str().ok_or("material must be a string")? {
            "reflect" => Ok(Material::Reflective),
            "absorb" => Ok(Material::Absorbing),
            other => Err(format!("invalid material: {other}").into()),
        }
    }
}

impl JsonSer for Segment {
    /// Serialize a segment into a JSON object.
    ///
    /// The format of the returned object is explained in [`Self::from_json`]
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "start": self.start().as_slice(),
            "end": self.end().as_slice(),
            "material": self.material().to_json(),
        })
    }
}

impl JsonDes for Segment {
    /// Deserialize a new segment from a JSON object.
    ///
    /// The JSON object must follow the following format:
    ///
    /// ```json
    /// {
    ///     "start": [1., 2.],
    ///     "end": [3., 4.],
    ///     "material": "absorb", // (optional, "reflect" or "absorb", defaults to "reflect")
    /// }
    /// ```
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        let start = vector_field(json, "start")?.ok_or("Missing segment start")?;
        let end = vector_field(json, "end")?.ok_or("Missing segment end")?;

        let material = json
            .get("material")
            .map(Material::from_json)
            .transpose()?
            .unwrap_or(Material::Reflective);

        Ok(Segment::new(start, end, material))
    }
}

impl JsonSer for Ray {
    /// Serialize a ray into a JSON object.
    ///
    /// The format of the returned object is explained in [`Self::from_json`]
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "origin": self.origin.as_slice(),
            "direction": self.direction.as_ref().as_slice(),
            "length": self.length,
            "max_reflections": self.max_reflections,
        })
    }
}

impl JsonDes for Ray {
    /// Deserialize a new ray from a JSON object.
    ///
    /// The JSON object must follow the following format:
    ///
    /// ```json
    /// {
    ///     "origin": [9., 8.],
    ///     "direction": [1., 1.], // (must have at least one non-zero value)
    ///     "length": 100., // (optional, defaults to 100)
    ///     "max_reflections": 300, // (optional, defaults to 300)
    /// }
    /// ```
    ///
    /// `"direction"` can be replaced by `"angle"`, in radians, counter-clockwise from the x axis.
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        let origin = vector_field(json, "origin")?.ok_or("Missing ray origin")?;

        let length = float_field(json, "length")?.unwrap_or(DEFAULT_RAY_LENGTH);
        if length < 0. {
            return Err("ray length must not be negative".into());
        }

        let ray = match (vector_field(json, "direction")?, float_field(json, "angle")?) {
            (Some(direction), None) => {
                let direction = Unit::try_new(direction, Float::EPSILON)
                    .ok_or("Unable to normalize ray direction")?;
                Ray::new(origin, direction, length)
            }
            (None, Some(angle)) => Ray::from_angle(origin, length, angle),
            (None, None) => return Err("Missing ray direction or angle".into()),
            (Some(_), Some(_)) => {
                return Err("a ray must have a direction or an angle, not both".into())
            }
        };

        let max_reflections = json
            .get("max_reflections")
            .map(|value| {
                value
                    .as_u64()
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or("max_reflections must be a non-negative integer")
            })
            .transpose()?
            .unwrap_or(DEFAULT_MAX_REFLECTIONS);

        Ok(ray.with_max_reflections(max_reflections))
    }
}

impl JsonSer for Scene {
    /// Serialize a scene into a JSON object.
    ///
    /// The format of the returned object is explained in [`Self::from_json`]
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "segments": self.segments().to_json(),
            "backdrop": self.backdrop().to_json(),
        })
    }
}

impl JsonDes for Scene {
    /// Deserialize a new scene from a JSON object.
    ///
    /// The JSON object must follow the following format:
    ///
    /// ```json
    /// {
    ///     "segments": [...], // (segments, in the format of Segment::from_json)
    ///     "backdrop": [...], // (optional, segments that are drawn but never hit)
    /// }
    /// ```
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        let mut scene: Scene = map_json_array::<Vec<_>, _>(
            json.get("segments").ok_or("Missing scene segments")?,
            Segment::from_json,
        )?
        .into_iter()
        .collect();

        if let Some(backdrop) = json.get("backdrop") {
            map_json_array::<Vec<_>, _>(backdrop, Segment::from_json)?
                .into_iter()
                .for_each(|segment| scene.insert_backdrop(segment));
        }

        Ok(scene)
    }
}

impl JsonSer for Termination {
    fn to_json(&self) -> serde_json::Value {
        match self {
            Termination::Escaped => "escaped",
            Termination::Absorbed => "absorbed",
            Termination::Stalled => "stalled",
            Termination::BudgetExhausted => "budget_exhausted",
        }
        .into()
    }
}

impl JsonSer for Leg {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "start": self.start.as_slice(),
            "end": self.end.as_slice(),
            "normal": self.hit.normal.as_ref().as_slice(),
            "material": self.hit.material.to_json(),
            "outgoing": self.outgoing.map(|dir| dir.into_inner().as_slice().to_vec()),
        })
    }
}

impl JsonSer for TracePath {
    /// ```json
    /// {
    ///     "legs": [
    ///         {
    ///             "start": [1., 2.],
    ///             "end": [3., 4.],
    ///             "normal": [0., 1.],
    ///             "material": "reflect",
    ///             "outgoing": [0.7071, 0.7071], // (null if the ray stopped here)
    ///         },
    ///         ...
    ///     ],
    ///     "distance": 2.828,
    ///     "termination": "escaped", // ("absorbed", "stalled" or "budget_exhausted")
    /// }
    /// ```
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "legs": self.legs().to_json(),
            "distance": self.distance(),
            "termination": self.termination().to_json(),
        })
    }
}

pub fn serialize_simulation(
    scene: &(impl JsonSer + ?Sized),
    rays: impl IntoIterator<Item = Ray>,
) -> serde_json::Value {
    serde_json::json!({
        "scene": scene.to_json(),
        "rays": Vec::from_iter(rays.into_iter().map(|ray| ray.to_json())),
    })
}

pub fn deserialize_simulation<M: JsonDes>(
    json: &serde_json::Value,
) -> Result<(M, Vec<Ray>), Box<dyn Error>> {
    Ok((
        M::from_json(json.get("scene").ok_or("scene field expected")?)?,
        map_json_array(
            json.get("rays").ok_or("rays field expected")?,
            Ray::from_json,
        )?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ray_from_angle() {
        let ray = Ray::from_json(&json!({ "origin": [1., 2.], "angle": 0. })).unwrap();

        assert_eq!(ray.origin, Vector::new(1., 2.));
        assert!((ray.direction.as_ref() - Vector::new(1., 0.)).norm() < 1e-12);
        assert_eq!(ray.length, DEFAULT_RAY_LENGTH);
        assert_eq!(ray.max_reflections, DEFAULT_MAX_REFLECTIONS);
    }

    #[test]
    fn ray_from_direction() {
        let ray = Ray::from_json(&json!({
            "origin": [0., 0.],
            "direction": [0., -3.],
            "length": 10.,
            "max_reflections": 4,
        }))
        .unwrap();

        assert!((ray.direction.as_ref() - Vector::new(0., -1.)).norm() < 1e-12);
        assert_eq!(ray.length, 10.);
        assert_eq!(ray.max_reflections, 4);
    }

    #[test]
    fn invalid_rays() {
        for json in [
            json!({ "angle": 0. }),
            json!({ "origin": [0., 0.] }),
            json!({ "origin": [0., 0., 0.], "angle": 0. }),
            json!({ "origin": [0., 0.], "direction": [0., 0.] }),
            json!({ "origin": [0., 0.], "direction": [1., 0.], "angle": 1. }),
            json!({ "origin": [0., 0.], "angle": 1., "length": -1. }),
            json!({ "origin": [0., 0.], "angle": 1., "max_reflections": -1 }),
        ] {
            assert!(Ray::from_json(&json).is_err(), "{json}");
        }
    }

    #[test]
    fn segment_material_defaults_to_reflect() {
        let s = Segment::from_json(&json!({ "start": [0., 0.], "end": [1., 0.] })).unwrap();
        assert_eq!(s.material(), Material::Reflective);

        let s = Segment::from_json(&json!({
            "start": [0., 0.],
            "end": [1., 0.],
            "material": "absorb",
        }))
        .unwrap();
        assert_eq!(s.material(), Material::Absorbing);

        assert!(Segment::from_json(&json!({
            "start": [0., 0.],
            "end": [1., 0.],
            "material": "glass",
        }))
        .is_err());
    }

    #[test]
    fn simulation_survives_a_round_trip() {
        let mut scene = Scene::new();
        scene.insert(Segment::reflective([-5., 0.], [5., 0.]));
        scene.insert(Segment::absorbing([-5., 3.], [5., 3.]));
        scene.insert_backdrop(Segment::reflective([0., 0.], [0., 3.]));

        let rays = [Ray::from_angle([0., 1.], 50., 1.).with_max_reflections(7)];

        let json = serialize_simulation(&scene, rays);
        let (parsed, parsed_rays) = deserialize_simulation::<Scene>(&json).unwrap();

        assert_eq!(parsed, scene);
        assert_eq!(parsed_rays.len(), 1);
        assert_eq!(parsed_rays[0].max_reflections, 7);
        assert!((parsed_rays[0].angle() - 1.).abs() < 1e-12);
    }

    #[test]
    fn trace_path_json() {
        let floor = [Segment::absorbing([-10., 0.], [10., 0.])];
        let path = trace(
            &floor,
            &Ray::from_angle([0., 5.], 100., -core::f64::consts::FRAC_PI_2),
        );

        let json = path.to_json();
        assert_eq!(json["termination"], "absorbed");
        assert_eq!(json["legs"].as_array().unwrap().len(), 1);
        assert_eq!(json["legs"][0]["material"], "absorb");
        assert!(json["legs"][0]["outgoing"].is_null());
    }
}
