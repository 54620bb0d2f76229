use crate::process::Pid;

/// One dispatched slice of CPU time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GanttSegment {
    pub pid: Pid,
    pub start_time: u32,
    pub end_time: u32,
}

/// Append-only, time-ordered record of every dispatch.
///
/// Segments never overlap; gaps only appear where the CPU sat idle
/// waiting for the next arrival.
#[derive(Debug, Clone, Default)]
pub struct GanttTrace {
    segments: Vec<GanttSegment>,
}

impl GanttTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, pid: Pid, start_time: u32, end_time: u32) {
        debug_assert!(start_time < end_time);
        if let Some(last) = self.segments.last() {
            debug_assert!(last.end_time <= start_time);
        }
        self.segments.push(GanttSegment {
            pid,
            start_time,
            end_time,
        });
    }

    pub fn segments(&self) -> &[GanttSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
