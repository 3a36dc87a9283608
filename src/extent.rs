/// Running mean of observed container extents.
///
/// Seeded with the configured estimate until the first measurement arrives.
/// Used only for estimation (range math, scroll-to-index); never for
/// committed layout.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ExtentEstimate {
    sum: u64,
    samples: u64,
    seed: u32,
}

impl ExtentEstimate {
    pub(crate) fn new(seed: u32) -> Self {
        Self {
            sum: 0,
            samples: 0,
            seed: seed.max(1),
        }
    }

    pub(crate) fn average(&self) -> u32 {
        if self.samples == 0 {
            return self.seed;
        }
        (self.sum / self.samples).max(1) as u32
    }

    /// Records a first measurement for a container.
    pub(crate) fn record(&mut self, extent: u32) {
        self.sum = self.sum.saturating_add(extent as u64);
        self.samples = self.samples.saturating_add(1);
    }

    /// Replaces a container's earlier sample with a re-measurement.
    pub(crate) fn amend(&mut self, prev: u32, extent: u32) {
        self.sum = self
            .sum
            .saturating_sub(prev as u64)
            .saturating_add(extent as u64);
    }

    pub(crate) fn total_for(&self, count: usize) -> u64 {
        (count as u64).saturating_mul(self.average() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_applies_until_first_sample() {
        let mut e = ExtentEstimate::new(25);
        assert_eq!(e.average(), 25);
        e.record(5);
        assert_eq!(e.average(), 5);
    }

    #[test]
    fn zero_seed_is_clamped() {
        let e = ExtentEstimate::new(0);
        assert_eq!(e.average(), 1);
    }

    #[test]
    fn amend_replaces_a_sample() {
        let mut e = ExtentEstimate::new(10);
        e.record(10);
        e.record(10);
        e.amend(10, 40);
        assert_eq!(e.average(), 25);
        assert_eq!(e.total_for(4), 100);
    }
}
