//! A vertical cross-section of the Great Pyramid of Giza, with its corridors and chambers.
//!
//! Lengths are in meters, the origin is at the center of the pyramid's base.

use khufu_draw::{format_dms, Color, DrawCommand, Drawable, Label, List};

use super::*;

pub const PYRAMID_POINTS: usize = 92;

/// Width of the base, `c / (π(√2 - 1))` millionths of the speed of light, about 230.38 m
pub fn pyramid_width() -> Float {
    SPEED_OF_LIGHT / (PI * (2f64.sqrt() - 1.)) / 1e6
}

/// About 146.61 m
pub fn pyramid_height() -> Float {
    pyramid_width() * 14. / 22.
}

const QUEEN_CHAMBER_ROOF_ANGLE: Float = PI / 6.;
const QUEEN_CHAMBER_HEIGHT: Float = 6.26;
const QUEEN_CHAMBER_WIDTH: Float = 10. * CUBIT;
const QUEEN_CHAMBER_CENTER_LEVEL: Float = 0.88 + 0.83;
const QUEEN_CHAMBER_SMALLEST_BORDER: Float = 0.03;
const QUEEN_CHAMBER_ROOF_LENGTH: Float = 5.09;

const KING_CHAMBER_HEIGHT: Float = 10. * CUBIT;

const CORRIDOR_WIDTH: Float = 1.2;

const GALLERY_CEILING_FIRST_STEP_WIDTH: Float = 0.37;
const GALLERY_CEILING_STEPS: usize = 36;

const GALLERY_HOLE_SHORT_WIDTH_MUL: Float = 1. / 6.526;
const GALLERY_HOLE_LONG_WIDTH_MUL: Float = 1.13 / 6.526;
const GALLERY_HOLES_SPACE_MUL: Float = 2.198 / 6.526;
const GALLERY_BEAM_STEPS: usize = 14;

/// Entrance of the descending corridor, 26°56'51"
const ENTRANCE_ANGLE: Float = 0.470322600181172;
const ENTRANCE_BORDER_BOTTOM: Float = 0.03;
const ENTRANCE_BORDER_TOP: Float = 0.11;

/// Rays in the input and queen chamber sweeps
pub const SWEEP_RAYS: usize = 50;

fn king_chamber_width() -> Float {
    10. * 5f64.sqrt() * CUBIT / 2.
}

/// Heights of the seven levels of the gallery walls, above the floor
fn gallery_wall_levels() -> [Float; 7] {
    // 4.22 m for 166.2 units on the reference drawing
    [89.9, 129.9, 166.2, 211.7, 245.4, 278.7, 312.4].map(|h| h * 4.22 / 166.2)
}

/// The pyramid's scene, its reference points and the rays cast in it.
#[derive(Clone, Debug, PartialEq)]
pub struct PyramidScene {
    config: PyramidConfig,
    scene: Scene,
    points: Points<PYRAMID_POINTS>,
    emitters: Vec<Ray>,
}

impl PyramidScene {
    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    pub fn into_scene(self) -> Scene {
        self.scene
    }

    #[inline]
    pub fn points(&self) -> &Points<PYRAMID_POINTS> {
        &self.points
    }

    /// The rays the config asks for, in order: the gallery beam rays (always there), then the
    /// input sweep and the queen chamber sweep, if enabled.
    #[inline]
    pub fn emitters(&self) -> &[Ray] {
        &self.emitters
    }
}

impl Drawable for PyramidScene {
    fn append_draw_commands(&self, list: &mut List<DrawCommand>) {
        self.scene.append_draw_commands(list);
        self.points.append_draw_commands(list);

        let angles = [
            (16, "Ascending angle =", self.config.ascending_angle),
            (13, "Descending angle =", self.config.descending_angle),
        ];

        for (i, prefix, angle) in angles {
            if let Some(at) = self.points.get(i) {
                Label {
                    at: *at + Vector::new(0., -2.),
                    text: format_dms(prefix, angle),
                    color: Color::WHITE,
                }
                .append_draw_commands(list);
            }
        }
    }
}

/// Build the pyramid described by `config`.
///
/// Fails if `config` doesn't [validate](PyramidConfig::validate), or if it leads to
/// degenerate geometry.
pub fn build_pyramid(config: &PyramidConfig) -> Result<PyramidScene, SceneError> {
    config.validate()?;

    let points = main_points(config)?;

    let mut builder = Builder {
        config,
        p: &points,
        scene: Scene::new(),
        emitters: Vec::new(),
    };

    builder.corridors();
    builder.lower_chamber();
    builder.queen_chamber_floor();
    builder.gallery_walls();
    builder.gallery_ceiling()?;
    builder.gallery_floor()?;
    builder.gallery_beams();
    builder.queen_chamber_roof();
    builder.king_chamber();
    builder.construction_lines();
    builder.sweeps();

    let Builder {
        scene, emitters, ..
    } = builder;

    log::debug!(
        "built pyramid: {} segments, {} backdrop segments, {} emitters",
        scene.len(),
        scene.backdrop().len(),
        emitters.len(),
    );

    Ok(PyramidScene {
        config: *config,
        scene,
        points,
        emitters,
    })
}

fn main_points(config: &PyramidConfig) -> Result<Points<PYRAMID_POINTS>, SceneError> {
    let width = pyramid_width();
    let height = pyramid_height();
    let vertical_angle = (width / (2. * height)).atan();
    let kings_chamber_level = height * (1. - 1. / 2f64.sqrt());

    let a = config.ascending_angle;
    let d = config.descending_angle;
    let (sin_a, cos_a, tan_a) = (a.sin(), a.cos(), a.tan());
    let (sin_d, cos_d) = (d.sin(), d.cos());

    // up the ascending corridor, and its normal pointing up
    let up_a = Vector::new(-cos_a, sin_a);
    let n_a = Vector::new(sin_a, cos_a);
    // normal of the descending corridor, pointing up
    let n_d = Vector::new(-sin_d, cos_d);

    let mut p = Points::<PYRAMID_POINTS>::new();

    // outline and the king chamber level
    p.set(0, Vector::zeros());
    p.set(1, Vector::new(0., height));
    p.set(2, Vector::new(width / 2., 0.));
    p.set(
        3,
        height
            * (Vector::new(0., 1.) + Vector::new((2. * vertical_angle).sin(), -(2. * vertical_angle).cos())),
    );
    p.set(4, p[3] + Vector::new(0., -height));
    p.set(5, Vector::new(0., p[4].y));
    p.set(6, Vector::new(p[3].x, kings_chamber_level));
    p.set(7, Vector::new(0., kings_chamber_level));
    p.set(8, (p[6] + p[5]) / 2.);
    p.set(9, cross(p[1], p[2], p[5], p[6], "pyramid side and king chamber level")?);

    // corridors
    p.set(
        11,
        cross(p[1], p[2], p[8], p[8] + polar(d) * 100., "pyramid side and descending corridor")?,
    );
    p.set(13, p[8] - polar(d) * 77.13);
    p.set(14, p[13] + n_d * CORRIDOR_WIDTH);
    p.set(16, p[8] + up_a * 39.28);
    p.set(21, p[16] + up_a * 0.61 + n_a * CORRIDOR_WIDTH);
    p.set(19, p[8] + n_d * CORRIDOR_WIDTH);
    p.set(15, cross(p[8], p[16], p[14], p[19], "corridor floors")?);
    p.set(17, p[8] + n_a * CORRIDOR_WIDTH);
    p.set(18, p[16] + n_a * CORRIDOR_WIDTH);
    p.set(20, p[11] + n_d * CORRIDOR_WIDTH);
    p.set(22, p[8] + Vector::new(0., CORRIDOR_WIDTH / cos_d));
    p.set(10, cross(p[19], p[20], p[17], p[18], "corridor ceilings")?);
    p.set(12, cross(p[19], p[20], p[1], p[2], "descending ceiling and pyramid side")?);
    p.set(23, p[16] + up_a * 46.12);
    p.set(24, p[23] + up_a * 1.73);
    p.set(25, p[16] + up_a * 0.61 + Vector::new(-0.15 * tan_a, -0.15));
    p.set(26, p[25] + Vector::new(-(3.85 + 0.68), 1.17));

    // queen chamber
    let roof_left = Vector::new(-QUEEN_CHAMBER_ROOF_ANGLE.cos(), -QUEEN_CHAMBER_ROOF_ANGLE.sin())
        * QUEEN_CHAMBER_ROOF_LENGTH;
    let roof_right = Vector::new(QUEEN_CHAMBER_ROOF_ANGLE.cos(), -QUEEN_CHAMBER_ROOF_ANGLE.sin())
        * QUEEN_CHAMBER_ROOF_LENGTH;
    let chamber_up = Vector::new(0., 2. * QUEEN_CHAMBER_HEIGHT);

    p.set(30, Vector::new(p[23].x, p[26].y));
    p.set(
        31,
        p[30] + Vector::new(0., QUEEN_CHAMBER_HEIGHT - QUEEN_CHAMBER_CENTER_LEVEL),
    );
    p.set(32, p[30] + Vector::new(0., -QUEEN_CHAMBER_CENTER_LEVEL));
    p.set(33, p[32] - Vector::new(QUEEN_CHAMBER_WIDTH / 2., 0.));
    p.set(34, p[32] + Vector::new(QUEEN_CHAMBER_WIDTH / 2., 0.));
    p.set(
        35,
        cross(p[33], p[33] + chamber_up, p[31], p[31] + roof_left, "queen chamber left roof")?,
    );
    p.set(
        36,
        cross(p[34], p[34] + chamber_up, p[31], p[31] + roof_right, "queen chamber right roof")?,
    );
    p.set(37, Vector::new(p[30].x + QUEEN_CHAMBER_WIDTH / 2., p[26].y));
    p.set(38, cross(p[31], p[37], p[33], p[34], "queen chamber floor")?);
    p.set(39, cross(p[35], p[37], p[33], p[34], "queen chamber floor")?);
    p.set(40, p[25] + Vector::new(-(33.2 - (p[16].x - p[25].x)), 0.));

    let drop = p[40].y - p[32].y;
    p.set(
        42,
        p[40] + Vector::new(-drop * (p[39] - p[35]).x / (p[35] - p[33]).y, -drop),
    );
    p.set(43, p[34] + Vector::new(-(41.16 - 38.70), 0.));
    p.set(44, p[43] + Vector::new(-1.57, 0.));
    p.set(47, p[31] + Vector::new(0., -QUEEN_CHAMBER_SMALLEST_BORDER));
    p.set(
        45,
        cross(
            p[35] + Vector::new(0., -0.14),
            p[35] + Vector::new(-1., -0.14),
            p[47],
            p[47] + roof_left,
            "queen chamber left roof border",
        )?,
    );
    p.set(
        46,
        cross(
            p[36] + Vector::new(0., -0.14),
            p[36] + Vector::new(1., -0.14),
            p[47],
            p[47] + roof_right,
            "queen chamber right roof border",
        )?,
    );

    // top of the gallery, and the king chamber's antechamber floor
    p.set(48, p[24] + Vector::new(0., 43.03 - 42.9));
    p.set(49, p[23] + Vector::new(0., 0.9));
    p.set(50, p[48] + Vector::new(0., 1.11));
    p.set(
        51,
        cross(
            p[24],
            p[23],
            p[50] + Vector::new(0.55, 0.),
            p[50] + Vector::new(0.55, -10.),
            "gallery floor and its top wall",
        )?,
    );
    p.set(52, p[51] + Vector::new(0., 8.74));

    let levels = gallery_wall_levels();

    // right gallery wall
    p.set(
        61,
        cross(
            p[24],
            p[16],
            Vector::new(p[21].x - 0.5, p[21].y),
            Vector::new(p[21].x - 0.5, p[25].y),
            "gallery floor and its bottom wall",
        )?,
    );
    if config.ceiling_parallel_to_floor {
        p.set(54, p[61] + p[52] - p[51]);
    } else {
        p.set(54, p[61] + Vector::new(0., 8.48));
    }
    p.set(
        55,
        cross(
            p[21],
            p[21] - Vector::new(0., 10.),
            p[24],
            p[16],
            "gallery floor and the ascending corridor's end",
        )?,
    );
    for (i, step) in (56..=60).zip([0.120, 0.080, 0.090, 0.060, 0.075]) {
        p.set(i, p[i - 1] + Vector::new(-step, step * tan_a));
    }
    for (i, level) in (62..=68).zip(levels) {
        p.set(i, p[i - 7] + Vector::new(0., level));
    }

    // left gallery wall
    p.set(71, p[24] + Vector::new(0.09, -0.09 * tan_a));
    for (i, step) in (72..=76).zip([0.08, 0.07, 0.08, 0.10, 0.06]) {
        p.set(i, p[i - 1] + Vector::new(step, -step * tan_a));
    }
    for (i, level) in (77..=82).zip(levels) {
        p.set(i, p[i - 6] + Vector::new(0., level));
    }
    p.set(83, p[51] + Vector::new(0., levels[6]));

    // gallery ceiling
    let offset = config.gallery_ceiling_offset;
    let span = (p[54] - p[52]).norm();
    ensure(
        offset <= span,
        "gallery ceiling offset",
        offset,
        "larger than the gallery ceiling is long",
    )?;
    let ceiling_angle = (p[54].x - p[52].x).atan2(p[52].y - p[54].y) - (offset / span).asin();
    p.set(84, p[52] + polar(ceiling_angle) * offset);
    p.set(85, p[54] - polar(ceiling_angle) * offset);

    // gallery floor, one cubit above the corridor's
    p.set(90, p[23] + Vector::new(0., CUBIT / cos_a));
    p.set(91, p[55] + Vector::new(0., CUBIT / cos_a));

    p.check_finite()?;

    Ok(p)
}

struct Builder<'a> {
    config: &'a PyramidConfig,
    p: &'a Points<PYRAMID_POINTS>,
    scene: Scene,
    emitters: Vec<Ray>,
}

impl Builder<'_> {
    fn corridors(&mut self) {
        let p = self.p;
        for (a, b) in [(8, 11), (10, 12), (8, 13), (14, 15), (15, 16), (18, 10), (21, 18)] {
            self.scene.line(p[a], p[b]);
        }
    }

    fn lower_chamber(&mut self) {
        let p = self.p;
        let d = self.config.descending_angle;

        let top = self.scene.path(
            p[14],
            &[
                Vector::new(ENTRANCE_ANGLE.sin(), -ENTRANCE_ANGLE.cos()) * ENTRANCE_BORDER_TOP,
                Vector::new(-(8.27 - 3.21), 0.),
            ],
        );

        let bottom = self.scene.path(
            p[13],
            &[
                Vector::new(-d.sin(), d.cos()) * ENTRANCE_BORDER_BOTTOM,
                Vector::new(-8.91 - 8.28, 0.),
            ],
        );

        let pit = self.scene.path(
            bottom,
            &[
                Vector::new(0., 2.19 + 0.91),
                Vector::new(8.36, 0.),
                Vector::new(0., -2.19),
                Vector::new(8.78 - 7.39, 0.),
            ],
        );

        self.scene.absorb_container(top, pit);
    }

    fn queen_chamber_floor(&mut self) {
        let p = self.p;
        let a = self.config.ascending_angle;

        self.scene.path(
            p[16],
            &[
                Vector::new(-a.cos(), a.sin()) * 0.61,
                Vector::new(-0.15 * a.tan(), -0.15),
            ],
        );
        self.scene.line(p[25], p[40]);
        self.scene
            .line(p[40], p[40] + Vector::new(0., -(p[25].y - p[32].y)));
        self.scene.line(p[39], p[42]);

        self.scene.absorb_container(p[44], p[43]);
        self.scene.absorb_container(p[38], p[39]);
        self.scene
            .absorb_container(p[42], Vector::new(p[40].x, p[42].y));
    }

    fn gallery_walls(&mut self) {
        let p = self.p;
        let a = self.config.ascending_angle;

        let right = [21, 63, 64, 65, 66, 67, 68].map(|i| p[i]);
        wall_steps(&mut self.scene, &right, self.config.right_wall_mode.angle(a));
        self.scene.line(p[68], p[54]);

        let left = [50, 77, 78, 79, 80, 81, 82, 83].map(|i| p[i]);
        wall_steps(&mut self.scene, &left, self.config.left_wall_mode.angle(a));
        self.scene.line(p[83], p[52]);
    }

    fn gallery_ceiling(&mut self) -> Result<(), SceneError> {
        let p = self.p;

        if self.config.gallery_ceiling_offset == 0. {
            self.scene.line(p[52], p[54]);
            return Ok(());
        }

        let steps = GALLERY_CEILING_STEPS as Float;
        let step_width = ((p[52] - p[85]).norm() - GALLERY_CEILING_FIRST_STEP_WIDTH) / steps;
        let step_height = (p[84] - p[52]).norm() / steps;

        let angle = (p[52].y - p[85].y).atan2(p[85].x - p[52].x);
        let along = Vector::new(angle.cos(), -angle.sin());
        let up = Vector::new(angle.sin(), angle.cos());

        let mut previous = p[52];

        for i in 0..GALLERY_CEILING_STEPS {
            let i = i as Float;
            let run = along * (GALLERY_CEILING_FIRST_STEP_WIDTH + step_width * i);
            let rise = up * (step_height * i);

            let corner = cross(
                p[52] + run,
                p[84] + run,
                p[52] + rise,
                p[85] + rise,
                "gallery ceiling step",
            )?;
            let next = corner + up * step_height;

            self.scene.line(previous, corner);
            previous = self.scene.line(corner, next);
        }

        self.scene.line(previous, p[54]);

        Ok(())
    }

    fn gallery_floor(&mut self) -> Result<(), SceneError> {
        let p = self.p;
        let a = self.config.ascending_angle;

        // right
        let p28 = self.scene.path(
            p[26],
            &[Vector::new(0., 0.93), Vector::new(-a.cos(), a.sin()) * 1.53],
        );
        let p29 = cross(
            p28,
            p28 + Vector::new(0., 1.),
            p[23],
            p[16],
            "gallery floor and the queen chamber corridor",
        )?;
        self.scene.line(p28, p29);
        self.scene.line(p29, p[23]);

        // left
        self.scene.line(p[48], p[49]);
        self.scene.line(p[23], p[49]);

        Ok(())
    }

    /// The beams sitting in the cuttings along the gallery floor, and the rays shot straight
    /// up from them
    fn gallery_beams(&mut self) {
        let p = self.p;
        let a = self.config.ascending_angle;

        let slope = Vector::new(-a.cos(), a.sin());
        let step_size = 6.526 * (p[90] - p[91]).norm() / 88.036;
        let short = GALLERY_HOLE_SHORT_WIDTH_MUL * step_size;
        let ray_angle = FRAC_PI_2 - a;

        let material = self.config.beam_material.material();

        let square = |scene: &mut Scene, corner: Vector, width: Float| {
            let corners = [
                corner,
                corner + slope * width,
                corner + slope * width + Vector::new(0., short * 0.38),
                corner + Vector::new(0., short * 0.38),
            ];

            for i in 0..4 {
                let (start, end) = (corners[i], corners[(i + 1) % 4]);
                match material {
                    Some(material) => {
                        scene.line_with(start, end, material);
                    }
                    None => scene.insert_backdrop(Segment::reflective(start, end)),
                }
            }
        };

        for i in 1..GALLERY_BEAM_STEPS {
            let step = p[91] + slope * (step_size * i as Float);
            let long_hole = step + slope * (short + GALLERY_HOLES_SPACE_MUL * step_size);

            let short_cutting = step + Vector::new(0., short * 0.19);
            square(&mut self.scene, short_cutting, short);

            if i < GALLERY_BEAM_STEPS - 1 {
                let long_cutting = long_hole + Vector::new(0., short * 0.19);
                square(
                    &mut self.scene,
                    long_cutting,
                    GALLERY_HOLE_LONG_WIDTH_MUL * step_size,
                );

                self.emitters.push(
                    Ray::from_angle(long_cutting, DEFAULT_RAY_LENGTH, ray_angle)
                        .with_max_reflections(0),
                );
            }

            self.emitters.push(
                Ray::from_angle(short_cutting, DEFAULT_RAY_LENGTH, ray_angle)
                    .with_max_reflections(0),
            );
        }
    }

    fn queen_chamber_roof(&mut self) {
        let p = self.p;
        let border = Vector::new(0., -QUEEN_CHAMBER_SMALLEST_BORDER);
        let ledge = Vector::new(0., -0.14);

        let lines = [
            (p[31], p[35]),
            (p[31], p[36]),
            (p[35], p[35] + border),
            (p[36], p[36] + border),
            (p[35] + ledge, p[33]),
            (p[35] + ledge, p[45]),
            (p[36] + ledge, p[37]),
            (p[36] + ledge, p[46]),
            (p[35] + border, p[45]),
            (p[36] + border, p[46]),
            (p[26], p[37]),
            // floor
            (p[34], p[43]),
            (p[33], p[44]),
            (p[34], p[38]),
        ];

        for (start, end) in lines {
            self.scene.line(start, end);
        }
    }

    fn king_chamber(&mut self) {
        let p = self.p;
        let width = king_chamber_width();
        let step = p[50].y - p[48].y;

        let end = self.scene.path(
            p[48],
            &[
                Vector::new(-6.83, 0.),
                Vector::new(-width, 0.),
                Vector::new(0., KING_CHAMBER_HEIGHT),
                Vector::new(width, 0.),
                Vector::new(0., -(KING_CHAMBER_HEIGHT - step)),
                Vector::new(1.79 + 0.77, 0.),
                Vector::new(0., 3.77 - step),
                Vector::new(2.96, 0.),
                Vector::new(0., -(3.77 - step)),
            ],
        );
        self.scene.line(p[50], end);

        // the granite block hanging in the antechamber
        self.scene.path(
            p[50] + Vector::new(-1.24 - 0.54, 0.),
            &[
                Vector::new(0., 1.33),
                Vector::new(-0.39, 0.),
                Vector::new(0., -1.33),
                Vector::new(0.39, 0.),
            ],
        );
    }

    /// Drawn only: the outline of the pyramid and how the main points are found
    fn construction_lines(&mut self) {
        let p = self.p;
        let width = pyramid_width();
        let height = pyramid_height();
        let kings_chamber_level = p[7].y;

        let mut lines = vec![
            // outline
            (Vector::new(-width / 2., 0.), Vector::new(width / 2., 0.)),
            (Vector::new(-width / 2., 0.), Vector::new(0., height)),
            (Vector::new(width / 2., 0.), Vector::new(0., height)),
            (Vector::new(0., height), Vector::zeros()),
            (Vector::new(-width / 2., kings_chamber_level), p[6]),
        ];

        let pairs = [
            (1, 3),
            (3, 4),
            (0, 3),
            (0, 4),
            (1, 4),
            (5, 0),
            (5, 4),
            (5, 6),
            (4, 7),
            // corridors crossing
            (15, 8),
            (8, 17),
            (8, 19),
            (15, 19),
            (10, 19),
            (10, 17),
            // outer corner, entrance
            (11, 20),
            (20, 12),
            (13, 14),
        ];
        lines.extend(pairs.map(|(a, b)| (p[a], p[b])));

        if self.config.show_corridors_crossing_problem {
            lines.extend([(p[22], p[21]), (p[22], p[20]), (p[22], p[8])]);
        }

        for (start, end) in lines {
            self.scene.insert_backdrop(Segment::reflective(start, end));
        }
    }

    fn sweeps(&mut self) {
        let p = self.p;
        let d = self.config.descending_angle;

        if self.config.enable_input_ray {
            self.emitters.extend(beam(
                p[14] + Vector::new(d.sin(), -d.cos()) * ENTRANCE_BORDER_TOP,
                p[13] + Vector::new(-d.sin(), d.cos()) * ENTRANCE_BORDER_BOTTOM,
                ENTRANCE_ANGLE + PI,
                SWEEP_RAYS,
            ));
        }

        if self.config.enable_queen_ray {
            self.emitters.extend(beam(
                p[39],
                p[42],
                self.config.queen_angle,
                SWEEP_RAYS,
            ));
        }
    }
}

/// Stairs going from each of `levels` to the next: up (or down) first, then across.
///
/// The across part slopes at `angle`.
fn wall_steps(scene: &mut Scene, levels: &[Vector], angle: Float) {
    let tan = angle.tan();

    for pair in levels.windows(2) {
        let [from, to] = pair else { unreachable!() };

        let corner = Vector::new(from.x, to.y + (to.x - from.x) * tan);
        scene.line(*from, corner);
        scene.line(corner, *to);
    }
}
