use log::trace;

use crate::process::ProcessTable;
use crate::trace::GanttTrace;

/// Non-preemptive shortest-job-first scheduler.
///
/// At each step the arrived process with the smallest burst time runs to
/// completion (pid tie-break); when none has arrived yet the clock jumps
/// to the next arrival. No memory binding takes place here.
#[derive(Debug, Default)]
pub struct ShortestJobFirstScheduler;

impl ShortestJobFirstScheduler {
    pub fn new() -> Self {
        Self
    }

    pub fn run(&self, table: &mut ProcessTable) -> GanttTrace {
        let mut trace_log = GanttTrace::new();
        let mut clock: u32 = 0;
        let mut completed: usize = 0;

        while completed < table.len() {
            let next = table
                .iter()
                .enumerate()
                .filter(|(_, p)| !p.is_completed() && p.arrival_time <= clock)
                .min_by_key(|(_, p)| (p.burst_time, p.pid))
                .map(|(index, _)| index);

            let index = match next {
                Some(index) => index,
                None => {
                    // idle until the earliest pending arrival
                    match table
                        .iter()
                        .filter(|p| !p.is_completed())
                        .map(|p| p.arrival_time)
                        .min()
                    {
                        Some(arrival) => {
                            clock = clock.max(arrival);
                            continue;
                        }
                        None => break,
                    }
                }
            };

            let process = table.get_mut(index);
            let burst = process.burst_time;
            trace!("running P{} to completion at t={}", process.pid, clock);
            trace_log.push(process.pid, clock, clock + burst);
            clock += burst;
            process.remaining_time = 0;
            process.complete(clock);
            completed += 1;
        }

        trace_log
    }
}
