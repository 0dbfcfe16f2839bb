use core::f64::consts::TAU;
use std::{error::Error, fs::File, io::BufReader};

use clap::Parser;
use khufu::{Ray, Scene, TracePath};
use khufu_draw::{draw, format_dms, rainbow_paths, to_svg, Drawable};
use khufu_json::{deserialize_simulation, serde_json, JsonSer};

mod cli;

fn init_logger(level: log::LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

/// One line describing how `ray` fared
fn report(index: usize, ray: &Ray, path: &TracePath) -> String {
    let exit = match path.legs().last().and_then(|leg| leg.outgoing) {
        Some(direction) => direction.y.atan2(direction.x),
        None => ray.angle(),
    };

    format!(
        "ray {index}: {:?} after {} legs, {:.4} traveled, {}",
        path.termination(),
        path.len(),
        path.distance(),
        format_dms("last heading", exit.rem_euclid(TAU)),
    )
}

/// Give every ray the same reflection budget, if one is set
fn override_max_reflections(rays: &mut [Ray], max_reflections: Option<usize>) {
    if let Some(max_reflections) = max_reflections {
        log::debug!("capping {} rays at {max_reflections} reflections", rays.len());
        for ray in rays {
            ray.max_reflections = max_reflections;
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = cli::Args::parse();
    init_logger(args.log_level.into());

    let json: serde_json::Value = serde_json::from_reader(BufReader::new(File::open(&args.file)?))?;
    let (scene, mut rays) = deserialize_simulation::<Scene>(&json)?;

    log::info!(
        "loaded {} segments and {} rays from {}",
        scene.len(),
        rays.len(),
        args.file.display(),
    );

    override_max_reflections(&mut rays, args.max_reflections);

    let paths = Vec::from_iter(rays.iter().map(|ray| scene.trace(ray)));

    for (i, (ray, path)) in rays.iter().zip(&paths).enumerate() {
        println!("{}", report(i, ray, path));
    }

    if let Some(svg_path) = &args.svg {
        let mut list = draw(&scene);
        rainbow_paths(&paths).append_draw_commands(&mut list);

        std::fs::write(svg_path, to_svg(list.as_slice(), args.width, args.height))?;
        log::info!("drew {} commands to {}", list.len(), svg_path.display());
    }

    if let Some(json_path) = &args.json {
        serde_json::to_writer_pretty(File::create(json_path)?, &paths.to_json())?;
        log::info!("wrote {} paths to {}", paths.len(), json_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use khufu::Segment;

    #[test]
    fn report_of_a_bounce() {
        let mut scene = Scene::new();
        scene.insert(Segment::reflective([-1., 0.], [1., 0.]));

        let ray = Ray::from_angle([0., 1.], 10., -core::f64::consts::FRAC_PI_2);
        let path = scene.trace(&ray);

        let line = report(3, &ray, &path);
        assert!(
            line.starts_with("ray 3: Escaped after 1 legs, 0.9900 traveled, last heading "),
            "{line}"
        );
    }

    #[test]
    fn max_reflections_override() {
        let mut rays = [
            Ray::from_angle([0., 1.], 10., 0.),
            Ray::from_angle([0., 2.], 10., 1.).with_max_reflections(7),
        ];

        override_max_reflections(&mut rays, None);
        assert_eq!(rays[0].max_reflections, khufu::DEFAULT_MAX_REFLECTIONS);
        assert_eq!(rays[1].max_reflections, 7);

        override_max_reflections(&mut rays, Some(2));
        assert!(rays.iter().all(|ray| ray.max_reflections == 2));

        // the override changes how far a trapped ray bounces
        let mut scene = Scene::new();
        scene.insert(Segment::reflective([-1., 0.], [1., 0.]));
        scene.insert(Segment::reflective([-1., 2.], [1., 2.]));
        let mut trapped = [Ray::from_angle([0., 1.], 10., core::f64::consts::FRAC_PI_2)];
        override_max_reflections(&mut trapped, Some(3));
        assert_eq!(scene.trace(&trapped[0]).len(), 4);
    }
}
