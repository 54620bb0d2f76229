use crate::io::ProcessRecord;
use crate::process::{Pid, ProcessTable};


pub(crate) fn make_table(workload: &[(Pid, u32, u32)], page_size: usize) -> ProcessTable {
    let records: Vec<ProcessRecord> = workload
        .iter()
        .map(|&(pid, arrival_time, burst_time)| ProcessRecord {
            pid,
            arrival_time,
            burst_time,
            priority: 0,
        })
        .collect();
    ProcessTable::new(&records, page_size)
}
