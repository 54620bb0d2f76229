use crate::error::ProcessWarning;
use crate::io::ProcessRecord;

pub type Pid = u32;

/// Metrics written exactly once, when a process completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionMetrics {
    pub completion_time: u32,
    pub turnaround_time: u32,
    pub waiting_time: u32,
}

/// One simulated process with its scheduling state and memory bindings.
#[derive(Debug, Clone)]
pub struct Process {
    pub pid: Pid,
    pub arrival_time: u32,
    pub burst_time: u32,
    /// Monotonically non-increasing; exactly 0 once completed.
    pub remaining_time: u32,
    /// Derived, never supplied externally: `50 + 20 * pid` bytes.
    pub memory_size: usize,
    pub pages_needed: usize,
    /// Ordered page -> frame mapping. `None` marks an unbound slot that
    /// the access simulation must skip.
    pub page_table: Vec<Option<usize>>,
    /// Start address of the contiguous binding, if any.
    pub base_address: Option<usize>,
    pub metrics: Option<CompletionMetrics>,
    pub warnings: Vec<ProcessWarning>,
}

impl Process {
    pub(crate) fn from_record(record: &ProcessRecord, page_size: usize) -> Self {
        let memory_size = 50 + 20 * record.pid as usize;
        let pages_needed = (memory_size + page_size - 1) / page_size;
        Self {
            pid: record.pid,
            arrival_time: record.arrival_time,
            burst_time: record.burst_time,
            remaining_time: record.burst_time,
            memory_size,
            pages_needed,
            page_table: vec![None; pages_needed],
            base_address: None,
            metrics: None,
            warnings: Vec::new(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.metrics.is_some()
    }

    /// Writes the completion metric triple. Must only be called once,
    /// when `remaining_time` has reached 0.
    pub(crate) fn complete(&mut self, clock: u32) {
        debug_assert_eq!(self.remaining_time, 0);
        debug_assert!(self.metrics.is_none());
        let turnaround_time = clock - self.arrival_time;
        self.metrics = Some(CompletionMetrics {
            completion_time: clock,
            turnaround_time,
            waiting_time: turnaround_time - self.burst_time,
        });
    }

    /// Restores the pre-run state so an independent scenario can reuse
    /// the table. Bindings must never leak across scenarios.
    pub(crate) fn reset(&mut self) {
        self.remaining_time = self.burst_time;
        self.page_table = vec![None; self.pages_needed];
        self.base_address = None;
        self.metrics = None;
        self.warnings.clear();
    }
}

/// The set of processes taking part in a scenario, indexed by position.
#[derive(Debug, Clone)]
pub struct ProcessTable {
    processes: Vec<Process>,
}

impl ProcessTable {
    pub fn new(records: &[ProcessRecord], page_size: usize) -> Self {
        Self {
            processes: records
                .iter()
                .map(|r| Process::from_record(r, page_size))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.processes.iter()
    }

    pub fn get(&self, index: usize) -> &Process {
        &self.processes[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Process {
        &mut self.processes[index]
    }

    pub fn index_of(&self, pid: Pid) -> Option<usize> {
        self.processes.iter().position(|p| p.pid == pid)
    }

    pub(crate) fn reset_all(&mut self) {
        for process in &mut self.processes {
            process.reset();
        }
    }

    /// Average waiting time over completed processes.
    pub fn average_waiting_time(&self) -> f64 {
        self.average(|m| m.waiting_time)
    }

    /// Average turnaround time over completed processes.
    pub fn average_turnaround_time(&self) -> f64 {
        self.average(|m| m.turnaround_time)
    }

    fn average(&self, field: impl Fn(&CompletionMetrics) -> u32) -> f64 {
        let completed: Vec<u32> = self
            .processes
            .iter()
            .filter_map(|p| p.metrics.as_ref().map(&field))
            .collect();
        if completed.is_empty() {
            return 0.0;
        }
        completed.iter().map(|&t| t as f64).sum::<f64>() / completed.len() as f64
    }
}
