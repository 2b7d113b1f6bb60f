//! Converts area lights into virtual point lights (VPLs) by tracing photons.
//!
//! Direct VPLs sit on the emitters, indirect ones are deposited where light paths bounce.

use glam::Vec3;
use rand::Rng as _;
use rayon::prelude::*;

use crate::{
    color::{linear::WHITE, Rgb},
    light::{AreaLight, Emission, PointLight},
    math::{distributions::Samples, point::Point},
    ray::Ray,
    scene::World,
    utils::{log_once::warn_once, timer::timed_scope_log},
    Rng, Seed,
};

const STREAM_DIRECT: u32 = 0;
const STREAM_INDIRECT: u32 = 1;

#[derive(Debug, Clone)]
pub struct PhotonConfig {
    /// Photon budget shared by all area lights
    pub direct_photons: usize,
    /// Minimum number of indirect VPLs to deposit
    pub indirect_photons: usize,
    /// Hard cap on deposits per path
    pub max_bounces: u32,
    /// Bounces before Russian roulette kicks in
    pub min_bounces: u32,
    pub russian_roulette: bool,
    /// Deposits are pushed off their surface by this much along the normal
    pub normal_offset: f32,
    /// Paths traced per parallel batch
    pub batch_size: usize,
}

impl Default for PhotonConfig {
    fn default() -> Self {
        Self {
            direct_photons: 1024,
            indirect_photons: 4096,
            max_bounces: 8,
            min_bounces: 3,
            russian_roulette: true,
            normal_offset: 1e-3,
            batch_size: 256,
        }
    }
}

/// A packet of light power in flight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Photon {
    pub position: Point,
    pub direction: Vec3,
    pub flux: Rgb,
    /// Product of the path's reflectance factors, including Russian roulette compensation
    pub throughput: Rgb,
    pub bounces: u32,
}

impl Photon {
    pub fn new(position: Point, direction: Vec3, flux: Rgb) -> Self {
        Self {
            position,
            direction: direction.normalize(),
            flux,
            throughput: WHITE,
            bounces: 0,
        }
    }
}

/// Point lights produced by one photon pass
#[derive(Debug, Clone, Default)]
pub struct Vpls {
    pub direct: Vec<PointLight>,
    pub indirect: Vec<PointLight>,
    /// Number of indirect paths launched
    pub paths: usize,
}

impl Vpls {
    pub fn len(&self) -> usize {
        self.direct.len() + self.indirect.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_point_lights(self) -> impl Iterator<Item = PointLight> {
        self.direct.into_iter().chain(self.indirect)
    }
}

pub struct PhotonTracer {
    pub config: PhotonConfig,
}

impl PhotonTracer {
    pub fn new(config: PhotonConfig) -> Self {
        Self { config }
    }

    pub fn trace(&self, world: &World, seed: u64) -> Vpls {
        let area_lights: Vec<&AreaLight> = world.lights.area_lights().collect();
        let direct = timed_scope_log("Direct photons", || {
            let mut rng = Seed {
                seed,
                x: 0,
                y: 0,
                sample_idx: 0,
            }
            .into_rng(STREAM_DIRECT);
            self.seed_direct(&area_lights, &mut rng)
        })
        .res;
        let (indirect, paths) =
            timed_scope_log("Indirect photons", || self.seed_indirect(world, &direct, seed)).res;

        log::info!(
            "photon pass: {} direct VPLs, {} indirect VPLs from {} paths",
            direct.len(),
            indirect.len(),
            paths
        );
        Vpls {
            direct,
            indirect,
            paths,
        }
    }

    /// Splits the photon budget proportionally to `intensity * area`, largest remainders first,
    /// so the allotments sum to the budget exactly.
    pub fn allot_direct_photons(&self, lights: &[&AreaLight]) -> Vec<usize> {
        let budget = self.config.direct_photons;
        let powers: Vec<f64> = lights
            .iter()
            .map(|l| (l.power() as f64).max(0.0))
            .map(|p| if p.is_finite() { p } else { 0.0 })
            .collect();
        let total: f64 = powers.iter().sum();
        if !(total > 0.0) {
            return vec![0; lights.len()];
        }

        let shares: Vec<f64> = powers.iter().map(|p| budget as f64 * p / total).collect();
        let mut allotted: Vec<usize> = shares.iter().map(|s| s.floor() as usize).collect();
        let mut order: Vec<usize> = (0..lights.len()).collect();
        order.sort_by(|&a, &b| {
            let ra = shares[a] - shares[a].floor();
            let rb = shares[b] - shares[b].floor();
            rb.total_cmp(&ra)
        });
        let missing = budget.saturating_sub(allotted.iter().sum());
        for &i in order.iter().filter(|&&i| powers[i] > 0.0).cycle().take(missing) {
            allotted[i] += 1;
        }
        allotted
    }

    /// One cosine emitting VPL per photon, on the light surface. The photons of a light share its
    /// power evenly.
    pub fn seed_direct(&self, lights: &[&AreaLight], rng: &mut Rng) -> Vec<PointLight> {
        let allotted = self.allot_direct_photons(lights);
        let mut direct = Vec::with_capacity(allotted.iter().sum());
        for (light, &count) in lights.iter().zip(&allotted) {
            if count == 0 {
                continue;
            }
            let intensity = light.power() / count as f32;
            for _ in 0..count {
                let position = light.triangle.sample_point(Samples::<2>::draw(rng));
                direct.push(PointLight::new(
                    position,
                    light.color,
                    intensity,
                    Emission::Cosine {
                        normal: light.normal_at(position),
                    },
                ));
            }
        }
        direct
    }

    /// Photon leaving a direct VPL chosen uniformly among `direct_count`
    pub fn launch(&self, light: &PointLight, direct_count: usize, rng: &mut Rng) -> Photon {
        let emitted = light.sample_direction(rng);
        let cos = light.emission.cosine(emitted.direction);
        let scale = if emitted.pdf > 0.0 {
            cos / emitted.pdf * direct_count as f32
        } else {
            0.0
        };
        Photon::new(light.position, emitted.direction, scale * light.radiance())
    }

    /// Follows one photon path, pushing a VPL at every diffuse bounce.
    ///
    /// A deposit holds the flux arriving at the hit times the BRDF, so it is taken before the
    /// bounce factor of the next direction is applied. Russian roulette survives with the path
    /// throughput, which does not depend on how much power the photon started with: bright and dim
    /// lights get paths of the same expected length.
    pub fn shoot(&self, mut photon: Photon, world: &World, rng: &mut Rng, deposits: &mut Vec<PointLight>) {
        let offset = self.config.normal_offset;
        let mut origin_offset = offset;

        while photon.bounces < self.config.max_bounces {
            let ray = Ray::new_with_range(photon.position, photon.direction, origin_offset..f32::INFINITY);
            let Some(hit) = world.intersect(&ray) else {
                break;
            };
            let Some(material) = world.material(hit.material) else {
                break;
            };
            if material.emits_light() {
                break;
            }

            let n = hit.shading_normal;
            let wo = -photon.direction;
            if n.dot(wo) <= 0.0 {
                break;
            }

            let deposit = photon.flux * material.evaluate(&hit, wo);
            if !deposit.is_finite() {
                crate::counter!("Photons discarded for non finite flux");
                warn_once!("discarding a photon with non finite flux");
                break;
            }
            let position = hit.position + offset * n;
            if !deposit.is_black() {
                deposits.push(PointLight::from_radiance(position, deposit, Emission::Cosine { normal: n }));
            }

            photon.bounces += 1;
            if photon.bounces >= self.config.max_bounces {
                break;
            }

            let Some(bounce) = material.sample_direction(n, rng) else {
                break;
            };
            let cos_out = n.dot(bounce.wi);
            if cos_out <= 0.0 {
                break;
            }
            let factor = (cos_out / bounce.pdf) * material.evaluate(&hit, bounce.wi);
            photon.flux = photon.flux * factor;
            photon.throughput = photon.throughput * factor;

            if self.config.russian_roulette && photon.bounces > self.config.min_bounces {
                let q = photon.throughput.max_element().clamp(0.05, 0.95);
                if rng.gen::<f32>() > q {
                    crate::counter!("Russian roulette terminations");
                    break;
                }
                photon.flux = photon.flux / q;
                photon.throughput = photon.throughput / q;
            }

            if !photon.flux.is_finite() {
                crate::counter!("Photons discarded for non finite flux");
                warn_once!("discarding a photon with non finite flux");
                break;
            }

            photon.position = position;
            photon.direction = bounce.wi;
            origin_offset = 0.0;
        }
    }

    /// Launches paths in parallel batches until enough VPLs were deposited, then normalizes them
    /// by the number of paths. Returns the VPLs and the path count.
    pub fn seed_indirect(&self, world: &World, direct: &[PointLight], seed: u64) -> (Vec<PointLight>, usize) {
        let budget = self.config.indirect_photons;
        if direct.is_empty() || budget == 0 || self.config.max_bounces == 0 {
            return (Vec::new(), 0);
        }

        let batch_size = self.config.batch_size.max(1);
        let max_paths = budget.saturating_mul(16).max(batch_size);
        let mut indirect = Vec::with_capacity(budget);
        let mut paths = 0;
        let mut batch = 0u32;

        while indirect.len() < budget && paths < max_paths {
            let deposits = (0..batch_size)
                .into_par_iter()
                .fold(Vec::new, |mut deposits, i| {
                    let mut rng = Seed {
                        seed,
                        x: batch,
                        y: i as u32,
                        sample_idx: 0,
                    }
                    .into_rng(STREAM_INDIRECT);
                    let light = &direct[rng.gen_range(0..direct.len())];
                    let photon = self.launch(light, direct.len(), &mut rng);
                    self.shoot(photon, world, &mut rng, &mut deposits);
                    deposits
                })
                .reduce(Vec::new, |mut a, mut b| {
                    a.append(&mut b);
                    a
                });
            indirect.extend(deposits);
            paths += batch_size;
            batch += 1;
        }

        if indirect.len() < budget {
            log::warn!(
                "photon budget not reached: {} indirect VPLs after {} paths",
                indirect.len(),
                paths
            );
        }

        let scale = 1.0 / paths as f32;
        for vpl in &mut indirect {
            vpl.intensity *= scale;
        }
        (indirect, paths)
    }
}

impl World {
    /// Runs a photon pass and installs its VPLs as the scene point lights.
    ///
    /// Every light handle issued before the call expires.
    pub fn trace_vpls(&mut self, config: PhotonConfig, seed: u64) -> (usize, usize) {
        let vpls = PhotonTracer::new(config).trace(self, seed);
        let counts = (vpls.direct.len(), vpls.indirect.len());
        self.lights.set_point_lights(vpls.into_point_lights());
        counts
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::{
        aggregate::SceneOracle,
        geometry::Triangle,
        interaction::SurfaceInteraction,
        light::LightCatalog,
        material::{Material, MaterialDescriptor, MaterialId},
        math::stat::VarianceSeries,
        scene::{examples::CornellBoxScene, SceneBuilder},
    };

    /// Two infinite grey planes at z = 0 and z = gap
    struct ParallelPlanes {
        gap: f32,
    }

    impl SceneOracle for ParallelPlanes {
        fn intersect(&self, ray: &Ray) -> Option<SurfaceInteraction> {
            let plane = if ray.direction.z > 0.0 {
                self.gap
            } else if ray.direction.z < 0.0 {
                0.0
            } else {
                return None;
            };
            let t = (plane - ray.origin.0.z) / ray.direction.z;
            if !ray.range().contains(&t) {
                return None;
            }
            let mut position = ray.at(t);
            position.0.z = plane;
            let normal = -ray.direction.z.signum() * Vec3::Z;
            Some(SurfaceInteraction {
                ray: *ray,
                t,
                position,
                geometric_normal: normal,
                shading_normal: normal,
                barycentric: [1.0, 0.0, 0.0],
                primitive: 0,
                material: MaterialId(0),
            })
        }
    }

    fn planes_world(albedo: f32) -> World {
        World::new(
            Box::new(ParallelPlanes { gap: 1.0 }),
            vec![MaterialDescriptor {
                label: None,
                material: Material::Lambertian {
                    albedo: Rgb::splat(albedo),
                },
            }],
            LightCatalog::default(),
        )
    }

    fn area_light(size: f32, intensity: f32) -> AreaLight {
        AreaLight {
            triangle: Triangle::new(
                [
                    Point::new(0., 0., 1.),
                    Point::new(size, 0., 1.),
                    Point::new(0., size, 1.),
                ],
                MaterialId(0),
            ),
            color: WHITE,
            intensity,
        }
    }

    #[test]
    fn direct_photons_carry_the_light_power() {
        let tracer = PhotonTracer::new(PhotonConfig {
            direct_photons: 101,
            ..Default::default()
        });
        let small = area_light(1.0, 1.0);
        let big = area_light(2.0, 3.0);
        let lights = [&small, &big];

        let allotted = tracer.allot_direct_photons(&lights);
        assert_eq!(allotted.iter().sum::<usize>(), 101);
        // Powers are 0.5 and 6
        assert_eq!(allotted, vec![8, 93]);

        let mut rng = Rng::seed_from_u64(0);
        let direct = tracer.seed_direct(&lights, &mut rng);
        assert_eq!(direct.len(), 101);
        let small_power: f32 = direct[..8].iter().map(|l| l.intensity).sum();
        let big_power: f32 = direct[8..].iter().map(|l| l.intensity).sum();
        assert!((small_power - small.power()).abs() < 1e-4);
        assert!((big_power - big.power()).abs() < 1e-4);
        assert!(direct.iter().all(|l| l.color == WHITE));
    }

    #[test]
    fn lights_without_power_get_no_photon() {
        let tracer = PhotonTracer::new(PhotonConfig::default());
        let dark = area_light(1.0, 0.0);
        assert_eq!(tracer.allot_direct_photons(&[&dark]), vec![0]);
        let lit = area_light(1.0, 1.0);
        assert_eq!(tracer.allot_direct_photons(&[&dark, &lit]), vec![0, 1024]);
    }

    #[test]
    fn launch_flux_accounts_for_the_vpl_count() {
        let tracer = PhotonTracer::new(PhotonConfig::default());
        let vpl = PointLight::new(Point::ORIGIN, Rgb::splat(0.5), 2.0, Emission::Cosine { normal: Vec3::Z });
        let mut rng = Rng::seed_from_u64(4);
        let photon = tracer.launch(&vpl, 10, &mut rng);
        // |cos| / pdf is 2π for the two sided lobe
        let expected = 2.0 * std::f32::consts::PI * 10.0;
        assert!((photon.flux.0[0] - expected).abs() < 1e-3 * expected);
        assert_eq!(photon.bounces, 0);
    }

    /// Each deposit carries `flux * ρ / π` and the flux is multiplied by ρ per bounce, so the
    /// deposits of a path sum to `(ρ / π) (1 - ρ^D) / (1 - ρ)` for a unit photon.
    fn mean_deposited_power(russian_roulette: bool) -> (VarianceSeries, VarianceSeries) {
        let albedo = 0.5f32;
        let world = planes_world(albedo);
        let tracer = PhotonTracer::new(PhotonConfig {
            max_bounces: 8,
            min_bounces: 3,
            russian_roulette,
            ..Default::default()
        });

        let mut rng = Rng::seed_from_u64(17);
        let mut power = VarianceSeries::new();
        let mut deposits_per_path = VarianceSeries::new();
        for _ in 0..20_000 {
            let mut deposits = Vec::new();
            tracer.shoot(
                Photon::new(Point::new(0., 0., 0.5), Vec3::Z, WHITE),
                &world,
                &mut rng,
                &mut deposits,
            );
            power.add_sample(deposits.iter().map(|l| l.radiance().0[0] as f64).sum());
            deposits_per_path.add_sample(deposits.len() as f64);
        }
        (power, deposits_per_path)
    }

    #[test]
    fn russian_roulette_keeps_the_mean() {
        let rho = 0.5f64;
        let expected = rho / std::f64::consts::PI * (1.0 - rho.powi(8)) / (1.0 - rho);

        let (plain, plain_deposits) = mean_deposited_power(false);
        assert!((plain.mean() - expected).abs() < 1e-3, "{}", plain.mean());
        assert!(plain_deposits.mean() > 7.99);

        let (roulette, roulette_deposits) = mean_deposited_power(true);
        let err = roulette.error_with_95_confidence().unwrap();
        assert!(
            (roulette.mean() - expected).abs() < 2.0 * err,
            "{} vs {} ± {}",
            roulette.mean(),
            expected,
            err
        );
        assert!(roulette_deposits.mean() < plain_deposits.mean());
    }

    #[test]
    fn roulette_ignores_the_photon_power() {
        let world = planes_world(0.5);
        let tracer = PhotonTracer::new(PhotonConfig {
            max_bounces: 8,
            min_bounces: 1,
            ..Default::default()
        });

        for seed in 0..64 {
            let trace = |flux: Rgb| {
                let mut rng = Rng::seed_from_u64(seed);
                let mut deposits = Vec::new();
                tracer.shoot(Photon::new(Point::new(0., 0., 0.5), Vec3::Z, flux), &world, &mut rng, &mut deposits);
                deposits
            };
            let dim = trace(WHITE);
            let bright = trace(1000.0 * WHITE);
            assert_eq!(dim.len(), bright.len());
            assert!(!dim.is_empty());
            // First deposit: incoming flux times ρ / π
            let first = 0.5 / std::f32::consts::PI;
            assert!((dim[0].radiance().0[0] - first).abs() < 1e-6);
            for (d, b) in dim.iter().zip(&bright) {
                let ratio = b.radiance().0[0] / d.radiance().0[0];
                assert!((ratio - 1000.0).abs() < 1e-2, "{ratio}");
            }
        }
    }

    #[test]
    fn cornell_box_photon_pass() {
        let mut builder = SceneBuilder::new();
        CornellBoxScene::insert_into(&mut builder);
        let mut world = builder.commit().unwrap();
        let area = world.lights.area_handles();

        let config = PhotonConfig {
            direct_photons: 64,
            indirect_photons: 256,
            batch_size: 64,
            ..Default::default()
        };
        let vpls = PhotonTracer::new(config.clone()).trace(&world, 1);
        assert_eq!(vpls.direct.len(), 64);
        assert!(vpls.indirect.len() >= 256);
        assert!(vpls.paths >= 64);
        for vpl in vpls.direct.iter().chain(&vpls.indirect) {
            assert!(vpl.intensity.is_finite() && vpl.intensity > 0.0);
            let p = vpl.position.0;
            assert!(p.cmpge(Vec3::splat(-0.01)).all() && p.cmple(Vec3::splat(1.01)).all(), "{p:?}");
        }

        let (direct, indirect) = world.trace_vpls(config, 1);
        assert_eq!(direct, 64);
        assert_eq!(world.lights.point_handles().len(), direct + indirect);
        assert!(world.lights.get(area[0]).is_none());
    }
}
