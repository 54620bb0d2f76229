use crate::error::SimError;
use crate::modules::contiguous::PlacementPolicy;
use crate::modules::paging::ReplacementPolicy;

/// Configuration of one simulation scenario.
///
/// Validated by [`crate::Simulation::new`]; an invalid combination never
/// reaches the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Time units granted per dispatch slice. Must be positive.
    pub quantum: u32,
    /// Total bytes of simulated physical memory.
    pub memory_size: usize,
    /// Bytes per page. Must divide `memory_size` evenly; the quotient is
    /// the frame count.
    pub page_size: usize,
    /// Process table capacity. Excess input records are truncated.
    pub max_processes: usize,
    pub placement: PlacementPolicy,
    pub replacement: ReplacementPolicy,
}

impl SimConfig {
    pub(crate) fn validate(&self) -> Result<(), SimError> {
        if self.quantum == 0 {
            return Err(SimError::InvalidConfig("quantum must be positive"));
        }
        if self.page_size == 0 {
            return Err(SimError::InvalidConfig("page size must be positive"));
        }
        if self.memory_size == 0 || self.memory_size % self.page_size != 0 {
            return Err(SimError::InvalidConfig(
                "memory size must be a positive multiple of the page size",
            ));
        }
        if self.max_processes == 0 {
            return Err(SimError::InvalidConfig("process table capacity must be positive"));
        }
        Ok(())
    }

    /// Number of page frames backing the frame table.
    pub fn frame_count(&self) -> usize {
        self.memory_size / self.page_size
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            quantum: 3,
            memory_size: 1024,
            page_size: 64,
            max_processes: 100,
            placement: PlacementPolicy::FirstFit,
            replacement: ReplacementPolicy::Fifo,
        }
    }
}
