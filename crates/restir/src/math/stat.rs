use crate::color::Rgb;

/// Running mean and variance of a series of samples
#[derive(Default, Clone, Debug)]
pub struct VarianceSeries {
    count: usize,
    sum: f64,
    sqsum: f64,
}

impl VarianceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sample(&mut self, sample: f64) {
        self.count += 1;
        self.sum += sample;
        self.sqsum += sample * sample;
    }

    pub fn merge(lhs: Self, rhs: Self) -> Self {
        Self {
            count: lhs.count + rhs.count,
            sum: lhs.sum + rhs.sum,
            sqsum: lhs.sqsum + rhs.sqsum,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    pub fn variance(&self) -> f64 {
        if self.count <= 2 {
            return f64::INFINITY;
        }

        // Unbiased thanks to the n - 1
        f64::max(
            0.0,
            (self.sqsum - self.sum * self.sum / self.count as f64) / (self.count as f64 - 1.0),
        )
    }

    /// Half width of the 95% confidence interval around the mean.
    ///
    /// Assumes the mean is normally distributed, which holds for large enough series.
    pub fn error_with_95_confidence(&self) -> Option<f64> {
        let df = self.count.checked_sub(1)?;
        if df < 15 {
            return None;
        }

        let t = STUDENT_5.get(df - 15).copied().unwrap_or(1.96);
        Some(t * (self.variance() / self.count as f64).sqrt())
    }
}

/// Two sided 95% quantiles of the Student distribution, from 15 degrees of freedom up to 30
///
/// ```python
/// from scipy import stats
/// [stats.t(df=i).interval(0.95)[1] for i in range(15, 31)]
/// ```
const STUDENT_5: [f64; 16] = [
    2.131, 2.120, 2.110, 2.101, 2.093, 2.086, 2.080, 2.074, 2.069, 2.064, 2.060, 2.056, 2.052,
    2.048, 2.045, 2.042,
];

/// Per channel running statistics, used to accumulate frames
#[derive(Default, Clone, Debug)]
pub struct RgbSeries {
    r: VarianceSeries,
    g: VarianceSeries,
    b: VarianceSeries,
}

impl RgbSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sample(&mut self, rgb: Rgb) {
        self.r.add_sample(rgb.0[0] as f64);
        self.g.add_sample(rgb.0[1] as f64);
        self.b.add_sample(rgb.0[2] as f64);
    }

    pub fn count(&self) -> usize {
        self.r.count()
    }

    pub fn mean(&self) -> Rgb {
        Rgb::from_array([self.r.mean(), self.g.mean(), self.b.mean()].map(|c| c as f32))
    }

    pub fn merge(lhs: Self, rhs: Self) -> Self {
        Self {
            r: VarianceSeries::merge(lhs.r, rhs.r),
            g: VarianceSeries::merge(lhs.g, rhs.g),
            b: VarianceSeries::merge(lhs.b, rhs.b),
        }
    }
}
