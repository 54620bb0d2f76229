use std::collections::VecDeque;

use log::{trace, warn};

use crate::error::{ProcessWarning, SimError};
use crate::modules::contiguous::{ContiguousAllocator, PlacementPolicy};
use crate::modules::paging::{PageManager, ReplacementPolicy};
use crate::process::ProcessTable;
use crate::trace::GanttTrace;

mod sjf;
pub use sjf::ShortestJobFirstScheduler;

/// Preemptive round-robin dispatcher with memory binding at the process
/// lifecycle edges: contiguous and page allocation on first dispatch,
/// release of both on completion.
pub struct RoundRobinScheduler {
    quantum: u32,
    placement: PlacementPolicy,
    replacement: ReplacementPolicy,
}

impl RoundRobinScheduler {
    pub fn new(
        quantum: u32,
        placement: PlacementPolicy,
        replacement: ReplacementPolicy,
    ) -> Result<Self, SimError> {
        if quantum == 0 {
            return Err(SimError::InvalidConfig("quantum must be positive"));
        }
        Ok(Self {
            quantum,
            placement,
            replacement,
        })
    }

    /// Runs every process of `table` to completion, producing the Gantt
    /// trace and writing per-process completion metrics.
    ///
    /// An empty table yields an empty trace. Terminates because every
    /// dispatch strictly decreases the dispatched process's remaining
    /// time, bounded below by 0.
    pub fn run(
        &self,
        table: &mut ProcessTable,
        allocator: &mut ContiguousAllocator,
        pager: &mut PageManager,
    ) -> Result<GanttTrace, SimError> {
        let mut trace_log = GanttTrace::new();
        let mut clock: u32 = 0;
        let mut completed: usize = 0;
        let mut ready: VecDeque<usize> = VecDeque::new();
        // explicit membership so a pid is never queued twice
        let mut queued = vec![false; table.len()];
        let mut dispatched_once = vec![false; table.len()];

        while completed < table.len() {
            if ready.is_empty() {
                // idle: jump to the next arrival and take every process
                // arriving at that instant, in ascending pid order
                match self.next_arrival(table, &queued) {
                    Some(next_arrival) => {
                        clock = clock.max(next_arrival);
                        self.enqueue_arrivals(table, &mut ready, &mut queued, clock);
                    }
                    None => break,
                }
                continue;
            }

            let index = match ready.pop_front() {
                Some(index) => index,
                None => continue,
            };

            if !dispatched_once[index] {
                dispatched_once[index] = true;
                self.bind_memory(table, allocator, pager, index)?;
            }

            let process = table.get(index);
            let slice = process.remaining_time.min(self.quantum);
            let pid = process.pid;
            trace!("dispatching P{} for {} units at t={}", pid, slice, clock);
            trace_log.push(pid, clock, clock + slice);

            // simulate page touches, at most one per elapsed time unit,
            // skipping unbound slots
            let touches = process.pages_needed.min(slice as usize);
            for page in 0..touches {
                if let Some(frame) = table.get(index).page_table[page] {
                    pager.access_page(frame);
                }
            }

            clock += slice;
            table.get_mut(index).remaining_time -= slice;

            // arrivals inside the elapsed interval take the queue ahead
            // of the preempted process
            self.enqueue_arrivals(table, &mut ready, &mut queued, clock);

            if table.get(index).remaining_time == 0 {
                table.get_mut(index).complete(clock);
                queued[index] = false;
                completed += 1;
                let pid = table.get(index).pid;
                if let Some(base) = table.get_mut(index).base_address.take() {
                    allocator.deallocate(pid, base)?;
                }
                pager.deallocate_pages(table, pid)?;
            } else {
                ready.push_back(index);
            }
        }

        Ok(trace_log)
    }

    /// Earliest arrival among processes that are neither completed nor
    /// already queued.
    fn next_arrival(&self, table: &ProcessTable, queued: &[bool]) -> Option<u32> {
        table
            .iter()
            .enumerate()
            .filter(|(index, p)| !p.is_completed() && !queued[*index])
            .map(|(_, p)| p.arrival_time)
            .min()
    }

    /// Appends every pending process with `arrival_time <= clock`, in
    /// (arrival_time, pid) order.
    fn enqueue_arrivals(
        &self,
        table: &ProcessTable,
        ready: &mut VecDeque<usize>,
        queued: &mut [bool],
        clock: u32,
    ) {
        let mut arrivals: Vec<usize> = table
            .iter()
            .enumerate()
            .filter(|(index, p)| {
                !p.is_completed() && !queued[*index] && p.arrival_time <= clock
            })
            .map(|(index, _)| index)
            .collect();
        arrivals.sort_by_key(|&index| (table.get(index).arrival_time, table.get(index).pid));
        for index in arrivals {
            queued[index] = true;
            ready.push_back(index);
        }
    }

    /// First-dispatch binding of both memory subsystems. Failures are
    /// warnings on the process, never fatal.
    fn bind_memory(
        &self,
        table: &mut ProcessTable,
        allocator: &mut ContiguousAllocator,
        pager: &mut PageManager,
        index: usize,
    ) -> Result<(), SimError> {
        let (pid, size) = {
            let p = table.get(index);
            (p.pid, p.memory_size)
        };

        match allocator.allocate(pid, size, self.placement)? {
            Some(base) => table.get_mut(index).base_address = Some(base),
            None => {
                warn!("could not allocate contiguous memory for P{}", pid);
                table
                    .get_mut(index)
                    .warnings
                    .push(ProcessWarning::AllocationFailed { requested: size });
            }
        }

        if !pager.allocate_pages(table, pid, self.replacement)? {
            let p = table.get_mut(index);
            let bound = p.page_table.iter().filter(|s| s.is_some()).count();
            let requested = p.pages_needed;
            warn!("could not bind all pages for P{} ({}/{})", pid, bound, requested);
            p.warnings.push(ProcessWarning::PagingShortfall { bound, requested });
        }

        Ok(())
    }
}
