use rayon::prelude::*;

use crate::{
    camera::Camera,
    color::{linear::BLACK, Rgb},
    error::{Error, Result},
    interaction::SurfaceInteraction,
    math::{distributions::Samples, stat::RgbSeries},
    resampling::{RestirConfig, RestirLightSampler},
    scene::World,
    shading::{Shader, ShadingMode},
    timed_scope_accumulate, Seed,
};

/// Camera, light sampler and shader of one view
pub struct FrameRenderer {
    pub camera: Camera,
    pub sampler: RestirLightSampler,
    pub shader: Shader,
}

impl FrameRenderer {
    /// Samples the lights the world catalog hands out for direct lighting
    pub fn new(camera: Camera, world: &World, config: RestirConfig, mode: ShadingMode, seed: u64) -> Result<Self> {
        let shadow_epsilon = config.shadow_epsilon;
        let sampler = RestirLightSampler::new(
            camera.width,
            camera.height,
            world.lights.sampled_handles(),
            config,
            seed,
        )?;
        let mut shader = Shader::new(mode, shadow_epsilon);
        if mode == ShadingMode::Vpl {
            shader.index_vpls(world);
        }
        Ok(Self {
            camera,
            sampler,
            shader,
        })
    }

    /// Picks up a new light catalog, e.g. after a photon pass. Drops the reservoir history.
    pub fn refresh_lights(&mut self, world: &World) {
        self.sampler.set_lights(world.lights.sampled_handles());
        if self.shader.mode == ShadingMode::Vpl {
            self.shader.index_vpls(world);
        }
    }

    /// Row major radiance of the next frame
    pub fn render_frame(&mut self, world: &World) -> Result<Vec<Rgb>> {
        let hits = timed_scope_accumulate!("Primary rays", || self.camera.surface_interactions(world));
        let samples = self.sampler.sample_lights(&hits, world)?;

        let shader = &self.shader;
        let frame: Vec<Rgb> = timed_scope_accumulate!("Shading", || {
            hits.par_iter()
                .zip(samples.par_iter())
                .map(|(hit, sample)| shader.shade(world, hit, sample))
                .collect::<Vec<_>>()
        });
        Ok(frame)
    }
}

/// Progressive per pixel mean of rendered frames
pub struct Accumulator {
    pixels: Vec<RgbSeries>,
    frames: usize,
}

impl Accumulator {
    pub fn new(pixel_count: usize) -> Self {
        Self {
            pixels: vec![RgbSeries::new(); pixel_count],
            frames: 0,
        }
    }

    pub fn add_frame(&mut self, frame: &[Rgb]) -> Result<()> {
        if frame.len() != self.pixels.len() {
            return Err(Error::FrameSizeMismatch {
                expected: self.pixels.len(),
                got: frame.len(),
            });
        }
        self.pixels
            .par_iter_mut()
            .zip(frame.par_iter())
            .for_each(|(series, &color)| series.add_sample(color));
        self.frames += 1;
        Ok(())
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn mean(&self) -> Vec<Rgb> {
        self.pixels.par_iter().map(RgbSeries::mean).collect()
    }

    pub fn reset(&mut self) {
        self.pixels.iter_mut().for_each(|series| *series = RgbSeries::new());
        self.frames = 0;
    }
}

/// Direct lighting of every pixel by brute force: `samples_per_light` uniform area samples on
/// each area light, each with its own shadow ray.
pub fn ground_truth(world: &World, camera: &Camera, samples_per_light: u32, seed: u64) -> Vec<Rgb> {
    let hits = camera.surface_interactions(world);
    let width = camera.width as usize;
    hits.par_iter()
        .enumerate()
        .map(|(index, hit)| {
            let seed = Seed {
                seed,
                x: (index % width) as u32,
                y: (index / width) as u32,
                sample_idx: 0,
            };
            direct_lighting(world, hit, samples_per_light, seed)
        })
        .collect()
}

fn direct_lighting(world: &World, hit: &SurfaceInteraction, samples_per_light: u32, seed: Seed) -> Rgb {
    if !hit.is_hit() {
        return crate::shading::sky_color(hit.ray.direction);
    }
    let Some(material) = world.material(hit.material) else {
        return BLACK;
    };
    if material.emits_light() {
        return material.emitted();
    }

    let mut rng = seed.into_rng(0);
    let mut radiance = BLACK;
    for light in world.lights.area_lights() {
        let area = light.triangle.area();
        let normal = light.normal_at(hit.position);
        let mut sum = BLACK;
        for _ in 0..samples_per_light {
            let point = light.triangle.sample_point(Samples::<2>::draw(&mut rng));
            let to_light = point - hit.position;
            let dist2 = to_light.length_squared();
            if !(dist2 > 0.0) || !world.unoccluded(hit.position, point, 1e-3) {
                continue;
            }
            let wi = to_light / dist2.sqrt();
            let geometry = hit.shading_normal.dot(wi).abs() * normal.dot(wi).abs() / dist2;
            sum += geometry * (light.radiance() * material.evaluate(hit, wi));
        }
        radiance += (area / samples_per_light.max(1) as f32) * sum;
    }
    radiance
}

/// Mean squared error over all pixels and channels, `None` when the images can not be compared
pub fn mse(a: &[Rgb], b: &[Rgb]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let sum: f64 = a
        .iter()
        .zip(b)
        .flat_map(|(a, b)| (0..3).map(move |c| (a.0[c] - b.0[c]) as f64))
        .map(|d| d * d)
        .sum();
    Some((sum / (3 * a.len()) as f64) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        photon::PhotonConfig,
        resampling::SamplingMode,
        scene::{
            examples::{CornellBoxScene, QuadOverPlaneScene},
            SceneBuilder,
        },
    };

    fn quad_over_plane(size: u32) -> (QuadOverPlaneScene, World, Camera) {
        let scene = QuadOverPlaneScene::default();
        let mut builder = SceneBuilder::new();
        scene.insert_into(&mut builder);
        let world = builder.commit().unwrap();
        let camera = scene.camera(size, size).unwrap();
        (scene, world, camera)
    }

    /// Mean of the pixel right below the light centre after `frames` frames
    fn centre_after(config: RestirConfig, frames: usize) -> (f32, Rgb) {
        let (scene, world, camera) = quad_over_plane(15);
        let mut renderer = FrameRenderer::new(camera, &world, config, ShadingMode::Shading, 42).unwrap();
        let mut accumulator = Accumulator::new(renderer.camera.pixel_count());
        for _ in 0..frames {
            let frame = renderer.render_frame(&world).unwrap();
            accumulator.add_frame(&frame).unwrap();
        }
        assert_eq!(accumulator.frames(), frames);
        (scene.reference_radiance_below_center(), accumulator.mean()[7 * 15 + 7])
    }

    #[test]
    fn restir_converges_below_the_light() {
        let config = RestirConfig {
            mode: SamplingMode::Restir,
            initial_candidates: 4,
            ..Default::default()
        };
        let (expected, centre) = centre_after(config, 200);
        for c in centre.to_array() {
            assert!(
                ((c - expected) / expected).abs() < 0.05,
                "{c} vs {expected}"
            );
        }
    }

    #[test]
    fn spatial_reuse_alone_converges_below_the_light() {
        // No history survives the temporal cap
        let config = RestirConfig {
            mode: SamplingMode::Restir,
            initial_candidates: 4,
            m_cap: 0,
            ..Default::default()
        };
        let (expected, centre) = centre_after(config, 200);
        for c in centre.to_array() {
            assert!(
                ((c - expected) / expected).abs() < 0.05,
                "{c} vs {expected}"
            );
        }
    }

    #[test]
    fn vpl_lighting_of_the_cornell_box() {
        let mut builder = SceneBuilder::new();
        CornellBoxScene::insert_into(&mut builder);
        let mut world = builder.commit().unwrap();
        let camera = CornellBoxScene::camera(12, 12).unwrap();
        let mut renderer =
            FrameRenderer::new(camera, &world, RestirConfig::default(), ShadingMode::Shading, 3).unwrap();
        renderer.render_frame(&world).unwrap();

        let config = PhotonConfig {
            direct_photons: 64,
            indirect_photons: 256,
            ..Default::default()
        };
        world.trace_vpls(config, 5);
        renderer.refresh_lights(&world);
        assert_eq!(renderer.sampler.num_lights(), world.lights.point_handles().len());

        let frame = renderer.render_frame(&world).unwrap();
        assert!(frame
            .iter()
            .all(|c| c.is_finite() && c.to_array().iter().all(|&v| v >= 0.0)));
        assert!(frame.iter().any(|c| c.max_element() > 0.0));
    }

    #[test]
    fn ground_truth_matches_the_closed_form() {
        let (scene, world, camera) = quad_over_plane(3);
        let truth = ground_truth(&world, &camera, 4096, 1);
        let expected = scene.reference_radiance_below_center();
        let centre = truth[4];
        assert!(((centre.0[0] - expected) / expected).abs() < 0.03, "{centre:?}");
    }

    #[test]
    fn accumulator_mean_and_reset() {
        let mut accumulator = Accumulator::new(2);
        accumulator
            .add_frame(&[Rgb::splat(1.0), Rgb::splat(0.0)])
            .unwrap();
        accumulator
            .add_frame(&[Rgb::splat(3.0), Rgb::splat(1.0)])
            .unwrap();
        assert_eq!(accumulator.mean(), vec![Rgb::splat(2.0), Rgb::splat(0.5)]);
        assert!(accumulator.add_frame(&[Rgb::splat(1.0)]).is_err());

        accumulator.reset();
        assert_eq!(accumulator.frames(), 0);
        accumulator.add_frame(&[Rgb::splat(4.0), Rgb::splat(4.0)]).unwrap();
        assert_eq!(accumulator.mean(), vec![Rgb::splat(4.0); 2]);
    }

    #[test]
    fn mean_squared_error() {
        let a = [Rgb::splat(1.0), Rgb::splat(0.0)];
        let b = [Rgb::splat(1.0), Rgb::splat(2.0)];
        assert_eq!(mse(&a, &b), Some(2.0));
        assert_eq!(mse(&a, &a), Some(0.0));
        assert_eq!(mse(&a, &b[..1]), None);
        assert_eq!(mse(&[], &[]), None);
    }
}
