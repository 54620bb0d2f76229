use log::debug;

use crate::error::SimError;
use crate::modules::contiguous::{ContiguousAllocator, MemoryBlock};
use crate::modules::paging::{PageFrame, PageManager};
use crate::process::ProcessTable;
use crate::scheduler::RoundRobinScheduler;
use crate::sim_config::SimConfig;
use crate::trace::GanttTrace;

/// Everything one scenario run produces, for an external presentation
/// layer: the trace plus end-of-run snapshots of both subsystems. The
/// per-process metrics live in the table that was passed in.
#[derive(Debug)]
pub struct ScenarioResult {
    pub trace: GanttTrace,
    pub blocks: Vec<MemoryBlock>,
    pub frames: Vec<PageFrame>,
}

/// One validated simulation setup.
///
/// Each [`run_scenario`](Self::run_scenario) call constructs a fresh
/// allocator and page manager and resets the table first, so comparison
/// runs (say first-fit/FIFO against best-fit/LRU) can never leak
/// bindings into each other.
#[derive(Debug, Clone, Copy)]
pub struct Simulation {
    config: SimConfig,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn run_scenario(&self, table: &mut ProcessTable) -> Result<ScenarioResult, SimError> {
        table.reset_all();
        let mut allocator = ContiguousAllocator::new(self.config.memory_size);
        let mut pager = PageManager::new(self.config.frame_count());
        let scheduler = RoundRobinScheduler::new(
            self.config.quantum,
            self.config.placement,
            self.config.replacement,
        )?;

        debug!(
            "scenario: quantum={} placement={} replacement={}",
            self.config.quantum, self.config.placement, self.config.replacement
        );
        let trace = scheduler.run(table, &mut allocator, &mut pager)?;

        Ok(ScenarioResult {
            trace,
            blocks: allocator.blocks().to_vec(),
            frames: pager.frames().to_vec(),
        })
    }
}
