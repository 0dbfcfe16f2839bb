use core::iter;
use std::{error::Error, fs::File, io::BufReader};

use clap::Parser;
use cli::{Args, Kind};
use khufu::{Ray, Scene};
use khufu_draw::{draw, to_svg, DrawCommand, List};
use khufu_json::{serde_json, serialize_simulation, JsonDes, JsonSer};
use khufu_random::{
    rand::{self, rngs::StdRng, SeedableRng},
    random_scene, Random,
};
use khufu_scenes::{build_gallery, build_pyramid, PyramidConfig};

mod cli;

fn init_logger(level: log::LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

struct Generated {
    scene: Scene,
    rays: Vec<Ray>,
    drawing: List<DrawCommand>,
}

fn pyramid_config(args: &Args, rng: &mut StdRng) -> Result<PyramidConfig, Box<dyn Error>> {
    Ok(match &args.config {
        Some(path) => PyramidConfig::from_json(&serde_json::from_reader(BufReader::new(
            File::open(path)?,
        ))?)?,
        None if args.random_config => PyramidConfig::random(rng),
        None => PyramidConfig::default(),
    })
}

fn generate(args: &Args, rng: &mut StdRng) -> Result<Generated, Box<dyn Error>> {
    if args.kind != Kind::Pyramid && (args.config.is_some() || args.random_config) {
        log::warn!("pyramid config ignored for {:?} scenes", args.kind);
    }

    Ok(match args.kind {
        Kind::Pyramid => {
            let config = pyramid_config(args, rng)?;
            log::info!("pyramid config: {}", config.to_json());

            let pyramid = build_pyramid(&config)?;

            Generated {
                rays: pyramid.emitters().to_vec(),
                drawing: draw(&pyramid),
                scene: pyramid.into_scene(),
            }
        }
        Kind::Gallery => {
            let gallery = build_gallery()?;

            Generated {
                rays: gallery.probes(),
                drawing: draw(&gallery),
                scene: gallery.scene().clone(),
            }
        }
        Kind::Random => {
            let scene = random_scene(rng, args.segments);

            Generated {
                rays: iter::repeat_with(|| Ray::random(rng))
                    .take(args.rays)
                    .collect(),
                drawing: draw(&scene),
                scene,
            }
        }
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logger(args.log_level.into());

    let seed = args.seed.unwrap_or_else(rand::random);
    log::debug!("seed: {seed}");
    let mut rng = StdRng::seed_from_u64(seed);

    let Generated {
        scene,
        rays,
        drawing,
    } = generate(&args, &mut rng)?;

    log::info!(
        "generated {} segments, {} backdrop segments and {} rays",
        scene.len(),
        scene.backdrop().len(),
        rays.len(),
    );

    let json = serialize_simulation(&scene, rays);
    serde_json::to_writer_pretty(File::create(&args.out)?, &json)?;

    if let Some(svg_path) = &args.svg {
        std::fs::write(svg_path, to_svg(drawing.as_slice(), 1200, 900))?;
    }

    Ok(())
}
