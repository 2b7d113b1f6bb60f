use std::collections::HashSet;

use anyhow::Result;
use restir::{
    photon::PhotonConfig,
    renderer::{ground_truth, mse, Accumulator, FrameRenderer},
    resampling::RestirConfig,
    scene::World,
    utils::{counter, timer::timed_scope_log},
};

use crate::{
    output::{DummyOutput, FileOutput, FinalOutput, FrameOutput, Image},
    progress::Progress,
    utils::{AvailableScene, Dimensions},
    Args, AvailableOutput,
};

/// Scene, samples per light and seed of the reference render, if one can be compared.
///
/// The reference only integrates direct lighting from the area lights. After a photon pass the
/// render is lit by VPLs instead, so there is nothing to compare against.
fn ground_truth_request(
    scene: AvailableScene,
    samples_per_light: Option<u32>,
    seed: u64,
    photons: bool,
) -> Option<(AvailableScene, u32, u64)> {
    let samples_per_light = samples_per_light?;
    if photons {
        log::warn!("the ground truth only covers area light direct lighting, skipping it with --photons");
        return None;
    }
    Some((scene, samples_per_light, seed))
}

pub struct Renderer {
    pub frame_outputs: Vec<Box<dyn FrameOutput>>,
    pub final_outputs: Vec<Box<dyn FinalOutput>>,
    pub frame_renderer: FrameRenderer,
    pub accumulator: Accumulator,
    pub dimensions: Dimensions,
    pub frames: u32,
    pub ground_truth: Option<(AvailableScene, u32, u64)>,
}

impl Renderer {
    /// Builds the renderer, running the photon pass on `world` first if asked to
    pub fn from_args(args: Args, world: &mut World) -> Result<Self> {
        log::info!("building renderer");
        let outputs: HashSet<AvailableOutput> = HashSet::from_iter(args.output);

        if args.photons {
            let config = PhotonConfig {
                direct_photons: args.direct_photons,
                indirect_photons: args.indirect_photons,
                max_bounces: args.max_bounces,
                min_bounces: args.min_bounces,
                russian_roulette: !args.no_russian_roulette,
                ..Default::default()
            };
            let (direct, indirect) = timed_scope_log("Photon pass", || world.trace_vpls(config, args.seed)).res;
            log::info!("photon pass: {direct} direct and {indirect} indirect virtual point lights");
        }

        let config = RestirConfig {
            mode: args.mode.into(),
            initial_candidates: args.initial_candidates,
            neighbour_count: args.neighbour_count,
            neighbour_radius: args.neighbour_radius,
            m_cap: args.m_cap,
            normal_threshold: args.normal_threshold,
            depth_threshold: args.depth_threshold,
            shadow_epsilon: args.shadow_epsilon,
        };
        log::info!("sampling mode: {}, shading: {:?}", config.mode, args.shading);

        let camera = args.scene.camera(args.dimensions)?;
        let frame_renderer = FrameRenderer::new(camera, world, config, args.shading.into(), args.seed)?;
        let accumulator = Accumulator::new(frame_renderer.camera.pixel_count());

        let mut this = Self {
            frame_outputs: Vec::new(),
            final_outputs: Vec::new(),
            frame_renderer,
            accumulator,
            dimensions: args.dimensions,
            frames: args.frames,
            ground_truth: ground_truth_request(args.scene, args.ground_truth, args.seed, args.photons),
        };

        for o in outputs {
            match o {
                AvailableOutput::File => {
                    this.final_outputs.push(Box::new(FileOutput::new(&args.output_dir)));
                }
                AvailableOutput::Frames => {
                    this.frame_outputs.push(Box::new(FileOutput::ldr_only(&args.output_dir)));
                }
            }
        }

        Ok(this)
    }

    pub fn run(mut self, world: &World) -> Result<()> {
        log::info!("rendering {} frames of {}", self.frames, self.dimensions);
        let mut progress = Progress::new(self.frames as usize);
        timed_scope_log("Render frames", || -> Result<()> {
            for index in 0..self.frames {
                let frame = self.frame_renderer.render_frame(world)?;
                self.accumulator.add_frame(&frame)?;

                for output in self.frame_outputs.iter_mut() {
                    let image = Image {
                        dimensions: self.dimensions,
                        pixels: &frame,
                    };
                    if let Err(err) = output.send_frame(index, image) {
                        log::error!("frame output errored, it will not be used anymore: {err}");
                        *output = Box::new(DummyOutput {});
                    }
                }

                progress.add(1);
                progress.print();
            }
            println!();
            Ok(())
        })
        .res?;

        let accumulated = self.accumulator.mean();
        for final_output in &self.final_outputs {
            final_output.commit(Image {
                dimensions: self.dimensions,
                pixels: &accumulated,
            })?;
        }

        if let Some((scene, samples_per_light, seed)) = self.ground_truth {
            let camera = scene.camera(self.dimensions)?;
            let reference = timed_scope_log("Ground truth", || {
                ground_truth(world, &camera, samples_per_light, seed)
            })
            .res;
            match mse(&accumulated, &reference) {
                Some(err) => log::info!("MSE against ground truth after {} frames: {err:e}", self.accumulator.frames()),
                None => log::warn!("ground truth and render have different sizes"),
            }
        }

        log::info!("Done");
        counter::report_counters();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_truth_is_skipped_after_a_photon_pass() {
        assert!(matches!(
            ground_truth_request(AvailableScene::QuadOverPlane, Some(64), 3, false),
            Some((AvailableScene::QuadOverPlane, 64, 3))
        ));
        assert!(ground_truth_request(AvailableScene::QuadOverPlane, Some(64), 3, true).is_none());
        assert!(ground_truth_request(AvailableScene::CornellBox, None, 3, false).is_none());
    }
}
