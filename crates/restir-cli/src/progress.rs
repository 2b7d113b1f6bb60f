use std::fmt::Display;

/// Frame counter printed on a single, rewritten terminal line
pub struct Progress {
    current: usize,
    max: usize,
}

impl Progress {
    pub fn new(max: usize) -> Self {
        Self { current: 0, max }
    }

    pub fn add(&mut self, k: usize) -> usize {
        self.current += k;
        self.current
    }

    pub fn print(&self) {
        print!("\r{self}");
    }
}

impl Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let percent = if self.max == 0 {
            1.0
        } else {
            (self.current as f32 / self.max as f32).clamp(0.0, 1.0)
        };
        write!(
            f,
            "{} {}/{} frames",
            PercentBar { percent, width: 50 },
            self.current,
            self.max
        )
    }
}

pub struct PercentBar {
    pub percent: f32,
    pub width: usize,
}

impl Display for PercentBar {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let filled = ((self.width - 1) as f32 * self.percent).round() as usize;
        write!(
            f,
            "[{empty:=>width_left$}>{empty:.<width_right$}] {percent:.1}%",
            empty = "",
            width_left = filled,
            width_right = self.width - 1 - filled,
            percent = 100. * self.percent
        )
    }
}
