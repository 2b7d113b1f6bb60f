use rand::Rng;

use crate::{
    light::LightHandle,
    math::{float::FloatAsExt, point::Point},
};

const EPSILON: f64 = 1e-12;

/// A candidate light sample: which light, and where on it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleInfo {
    pub light: Option<LightHandle>,
    pub point: Point,
}

impl SampleInfo {
    pub const NONE: SampleInfo = SampleInfo {
        light: None,
        point: Point::ORIGIN,
    };
}

impl Default for SampleInfo {
    fn default() -> Self {
        Self::NONE
    }
}

/// Weighted reservoir holding one surviving sample out of a stream of `m` candidates.
///
/// * `w_sum` - sum of the resampling weights seen so far
/// * `phat` - target density of the kept sample
/// * `w` - unbiased contribution weight of the kept sample
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reservoir {
    pub y: SampleInfo,
    pub w_sum: f64,
    pub m: u32,
    pub phat: f64,
    pub w: f64,
}

impl Reservoir {
    pub const EMPTY: Reservoir = Reservoir {
        y: SampleInfo::NONE,
        w_sum: 0.0,
        m: 0,
        phat: 0.0,
        w: 0.0,
    };

    pub fn reset(&mut self) {
        *self = Self::EMPTY;
    }

    pub fn is_empty(&self) -> bool {
        self.m == 0
    }

    /// Streams one candidate in. It replaces the kept sample with probability `weight / w_sum`.
    ///
    /// Negative and non finite weights count as zero: the candidate still counts towards `m`,
    /// which saturates instead of wrapping.
    /// Returns whether the candidate was kept.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        sample: SampleInfo,
        weight: f64,
        phat: f64,
    ) -> bool {
        let weight = weight.finite_non_negative_or_zero();
        self.w_sum += weight;
        self.m = self.m.saturating_add(1);

        let accepted = weight > 0.0 && rng.gen::<f64>() * self.w_sum < weight;
        if accepted {
            self.y = sample;
            self.phat = phat;
        }
        accepted
    }

    /// Sets `w` from the current `w_sum`, `m` and `phat`.
    pub fn finalize(&mut self) {
        self.w = contribution_weight(self.phat, self.w_sum, self.m as f64);
    }

    /// Merges reservoirs into a new one.
    ///
    /// Each input must already carry its target density at the pixel doing the merge. The
    /// normalization only counts inputs whose sample has a non zero target there, which keeps the
    /// result unbiased when some inputs could not have produced the chosen sample.
    pub fn combine<R: Rng + ?Sized>(reservoirs: &[Reservoir], rng: &mut R) -> Reservoir {
        let mut combined = Reservoir::EMPTY;
        for r in reservoirs {
            combined.update(rng, r.y, r.phat * r.w * r.m as f64, r.phat);
        }
        combined.m = reservoirs.iter().fold(0u32, |m, r| m.saturating_add(r.m));

        let z = reservoirs
            .iter()
            .filter(|r| r.phat > 0.0)
            .fold(0u32, |z, r| z.saturating_add(r.m));
        combined.w = contribution_weight(combined.phat, combined.w_sum, z as f64);
        combined
    }
}

/// `W = w_sum / (phat * count)`, zero when the target vanishes
pub fn contribution_weight(phat: f64, w_sum: f64, count: f64) -> f64 {
    if !(phat > 0.0) {
        return 0.0;
    }
    let w = w_sum / (phat.max(EPSILON) * count.max(EPSILON));
    w.finite_non_negative_or_zero()
}
