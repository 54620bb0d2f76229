use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::warn;

use crate::error::SimError;
use crate::process::Pid;

/// One line of the process source. `priority` is accepted but ignored
/// by the schedulers here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: Pid,
    pub arrival_time: u32,
    pub burst_time: u32,
    pub priority: i32,
}

/// Result of loading a process source.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub records: Vec<ProcessRecord>,
    /// Records dropped because the table capacity was reached.
    pub truncated: usize,
}

/// Parses whitespace-separated `pid arrival burst priority` lines after
/// a single header line. Reads at most `capacity` records; the rest are
/// counted as truncated. Malformed lines abort the load.
pub fn read_process_records<R: BufRead>(reader: R, capacity: usize) -> Result<LoadOutcome, SimError> {
    let mut records = Vec::new();
    let mut truncated = 0;
    let mut seen: HashSet<Pid> = HashSet::new();

    for (number, line) in reader.lines().enumerate().skip(1) {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if records.len() >= capacity {
            truncated += 1;
            continue;
        }

        let record = parse_line(&line)
            .ok_or_else(|| SimError::Input(format!("malformed record on line {}", number + 1)))?;
        if record.burst_time == 0 {
            return Err(SimError::Input(format!(
                "burst time of P{} must be positive (line {})",
                record.pid,
                number + 1
            )));
        }
        if !seen.insert(record.pid) {
            return Err(SimError::Input(format!("duplicate pid {} (line {})", record.pid, number + 1)));
        }
        records.push(record);
    }

    if truncated > 0 {
        warn!("process table capacity {} reached, dropped {} records", capacity, truncated);
    }
    Ok(LoadOutcome { records, truncated })
}

pub fn read_process_records_from_path<P: AsRef<Path>>(
    path: P,
    capacity: usize,
) -> Result<LoadOutcome, SimError> {
    let file = File::open(path.as_ref()).map_err(|e| {
        SimError::Input(format!("could not open {}: {}", path.as_ref().display(), e))
    })?;
    read_process_records(BufReader::new(file), capacity)
}

fn parse_line(line: &str) -> Option<ProcessRecord> {
    let mut fields = line.split_whitespace();
    let pid = fields.next()?.parse().ok()?;
    let arrival_time = fields.next()?.parse().ok()?;
    let burst_time = fields.next()?.parse().ok()?;
    let priority = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some(ProcessRecord {
        pid,
        arrival_time,
        burst_time,
        priority,
    })
}
