mod output;
mod progress;
mod renderer;
mod utils;

use anyhow::Result;
use clap::Parser;
use renderer::Renderer;
use restir::{scene::SceneBuilder, utils::timer::timed_scope_log};
use utils::{AvailableOutput, AvailableSamplingMode, AvailableScene, AvailableShading, Dimensions};

#[derive(Parser, Debug)]
pub struct Args {
    #[arg(long, value_enum, default_value_t)]
    /// Scene selector
    scene: AvailableScene,

    #[arg(short, long, default_value = "400x400")]
    /// Screen dimension in format `width`x`height`
    dimensions: Dimensions,

    #[arg(short, long, default_value_t = 64)]
    /// Number of frames rendered and accumulated
    frames: u32,

    #[arg(long, default_value_t)]
    /// Seed to use for all the random stuff.
    /// Given a seed, the rendering is deterministic (the output only depends on x, y, frame and seed).
    seed: u64,

    #[arg(short, long, value_enum, default_value_t)]
    mode: AvailableSamplingMode,

    #[arg(long, value_enum, default_value_t)]
    shading: AvailableShading,

    #[arg(short, long, value_enum)]
    output: Vec<AvailableOutput>,

    #[arg(long, default_value = "output")]
    output_dir: std::path::PathBuf,

    /// Initial light candidates per pixel and frame
    #[arg(long, default_value_t = 4)]
    initial_candidates: u32,

    /// Random neighbours visited by spatial reuse
    #[arg(long, default_value_t = 5)]
    neighbour_count: u32,

    /// Radius of the spatial reuse disc, in pixels
    #[arg(long, default_value_t = 10.0)]
    neighbour_radius: f32,

    /// Temporal history cap, as a multiple of the current sample count
    #[arg(long, default_value_t = 20)]
    m_cap: u32,

    #[arg(long, default_value_t = 0.25)]
    normal_threshold: f32,

    #[arg(long, default_value_t = 0.5)]
    depth_threshold: f32,

    #[arg(long, default_value_t = 1e-3)]
    shadow_epsilon: f32,

    /// Add photon-traced virtual point lights to the light catalog
    #[arg(long)]
    photons: bool,

    #[arg(long, default_value_t = 1024)]
    direct_photons: usize,

    #[arg(long, default_value_t = 4096)]
    indirect_photons: usize,

    #[arg(long, default_value_t = 8)]
    max_bounces: u32,

    /// Bounces before russian roulette kicks in
    #[arg(long, default_value_t = 3)]
    min_bounces: u32,

    #[arg(long)]
    no_russian_roulette: bool,

    /// If provided, compare the accumulated image to a brute force render using that many samples
    /// per light
    #[arg(long)]
    ground_truth: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    log::info!("loading scene {:?}", args.scene);
    let mut builder = SceneBuilder::new();
    args.scene.insert_into(&mut builder);
    let mut world = timed_scope_log("Commit scene", || builder.commit()).res?;

    let renderer = Renderer::from_args(args, &mut world)?;
    renderer.run(&world)?;

    Ok(())
}
