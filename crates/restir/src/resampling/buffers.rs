use super::reservoir::Reservoir;

/// Two reservoir frames used alternately: one is written while the other is read.
#[derive(Debug, Clone, Default)]
pub struct ReservoirBuffers {
    buffers: [Vec<Reservoir>; 2],
    current: usize,
}

impl ReservoirBuffers {
    pub fn new(len: usize) -> Self {
        Self {
            buffers: [vec![Reservoir::EMPTY; len], vec![Reservoir::EMPTY; len]],
            current: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.buffers[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The written buffer becomes the read one
    pub fn swap(&mut self) {
        self.current ^= 1;
    }

    pub fn current(&self) -> &[Reservoir] {
        &self.buffers[self.current]
    }

    pub fn previous(&self) -> &[Reservoir] {
        &self.buffers[self.current ^ 1]
    }

    /// Mutable current buffer alongside the previous one
    pub fn split_mut(&mut self) -> (&mut [Reservoir], &[Reservoir]) {
        let current = self.current;
        let [a, b] = &mut self.buffers;
        if current == 0 {
            (a.as_mut_slice(), b.as_slice())
        } else {
            (b.as_mut_slice(), a.as_slice())
        }
    }

    pub fn clear(&mut self) {
        for buffer in &mut self.buffers {
            buffer.fill(Reservoir::EMPTY);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_pong() {
        let mut buffers = ReservoirBuffers::new(3);
        {
            let (current, previous) = buffers.split_mut();
            current[0].m = 7;
            assert_eq!(previous[0].m, 0);
        }
        buffers.swap();
        assert_eq!(buffers.previous()[0].m, 7);
        assert_eq!(buffers.current()[0].m, 0);
        {
            let (current, previous) = buffers.split_mut();
            current[0].m = previous[0].m + 1;
        }
        assert_eq!(buffers.current()[0].m, 8);
        buffers.clear();
        assert!(buffers.current().iter().chain(buffers.previous()).all(Reservoir::is_empty));
    }
}
