use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("process count {0} is not a power of two")]
    ProcessCountError(usize),
    #[error("array size {size} is not divisible by the process count {processes}")]
    DivisibilityError { size: usize, processes: usize },
    #[error("array size {size} leaves empty blocks on {processes} processes")]
    EmptyBlockError { size: usize, processes: usize },
}

///
/// Runtime shape of one sorting run: how many workers participate and
/// how many elements they sort between them. Checked once, before any
/// worker starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunConfig {
    pub processes: usize,
    pub size: usize,
}

impl RunConfig {
    pub fn new(processes: usize, size: usize) -> Result<Self, Error> {
        let config = RunConfig { processes, size };
        config.validate()?;
        Ok(config)
    }

    /// The process count must be a power of two and divide the array
    /// size into non-empty blocks.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.processes.is_power_of_two() {
            return Err(Error::ProcessCountError(self.processes));
        }
        if !self.size.is_multiple_of(self.processes) {
            return Err(Error::DivisibilityError {
                size: self.size,
                processes: self.processes,
            });
        }
        if self.size < self.processes {
            return Err(Error::EmptyBlockError {
                size: self.size,
                processes: self.processes,
            });
        }
        Ok(())
    }

    /// Elements held by each rank.
    pub fn block_len(&self) -> usize {
        self.size / self.processes
    }

    /// Stages of the sorting network.
    pub fn stages(&self) -> u32 {
        self.processes.ilog2()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_power_of_two_counts_dividing_the_size() {
        for (p, n) in [(1, 1), (2, 4), (4, 1024), (8, 8), (16, 48)] {
            let config = RunConfig::new(p, n).unwrap();
            assert_eq!(config.block_len(), n / p);
        }
    }

    #[test]
    fn rejects_non_power_of_two_counts() {
        for p in [0, 3, 6, 12] {
            assert_eq!(
                RunConfig::new(p, 24).unwrap_err(),
                Error::ProcessCountError(p)
            );
        }
    }

    #[test]
    fn rejects_indivisible_sizes() {
        assert_eq!(
            RunConfig::new(4, 1026).unwrap_err(),
            Error::DivisibilityError { size: 1026, processes: 4 }
        );
    }

    #[test]
    fn rejects_sizes_smaller_than_the_process_count() {
        assert_eq!(
            RunConfig::new(8, 0).unwrap_err(),
            Error::EmptyBlockError { size: 0, processes: 8 }
        );
    }

    #[test]
    fn stage_count_follows_the_process_count() {
        assert_eq!(RunConfig::new(1, 4).unwrap().stages(), 0);
        assert_eq!(RunConfig::new(8, 16).unwrap().stages(), 3);
    }
}
