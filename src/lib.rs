//! Simulation of preemptive round-robin CPU scheduling coupled with
//! memory management: contiguous allocation (first/best/worst fit) and
//! paging with FIFO/LRU frame replacement.
//!
//! The dispatch loop, the address-ordered block list and the frame table
//! share one logical clock and are advanced strictly sequentially, so a
//! scenario run is fully deterministic.

mod error;
mod io;
mod process;
mod report;
mod scheduler;
mod sim_config;
mod simulation;
mod trace;

#[cfg(test)]
mod test;

pub use crate::error::{SimError, ProcessWarning};
pub use crate::io::{read_process_records, read_process_records_from_path, LoadOutcome, ProcessRecord};
pub use crate::process::{Pid, Process, ProcessTable};
pub use crate::scheduler::{RoundRobinScheduler, ShortestJobFirstScheduler};
pub use crate::sim_config::SimConfig;
pub use crate::simulation::{ScenarioResult, Simulation};
pub use crate::report::{render_gantt_chart, render_memory_status, render_scheduling_results};
pub use crate::trace::{GanttSegment, GanttTrace};
pub mod modules;
