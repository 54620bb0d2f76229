//! Textual rendering of scenario results. Pure string building; the
//! simulation core itself never formats or prints.

use std::fmt::Write;

use crate::process::ProcessTable;
use crate::simulation::ScenarioResult;
use crate::trace::GanttTrace;

pub fn render_gantt_chart(trace: &GanttTrace) -> String {
    if trace.is_empty() {
        return String::from("Gantt Chart: (empty)\n");
    }
    let mut out = String::from("Gantt Chart:\n|");
    for segment in trace.segments() {
        let _ = write!(out, " P{} |", segment.pid);
    }
    out.push('\n');
    let _ = write!(out, "{}", trace.segments()[0].start_time);
    for segment in trace.segments() {
        let _ = write!(out, "    {}", segment.end_time);
    }
    out.push('\n');
    out
}

pub fn render_scheduling_results(table: &ProcessTable) -> String {
    let mut out = String::from("Process Statistics:\nPID\tArrival\tBurst\tWaiting\tTurnaround\n");
    for process in table.iter() {
        let (waiting, turnaround) = process
            .metrics
            .map(|m| (m.waiting_time, m.turnaround_time))
            .unwrap_or((0, 0));
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            process.pid, process.arrival_time, process.burst_time, waiting, turnaround
        );
        for warning in &process.warnings {
            let _ = writeln!(out, "  warning: {}", warning);
        }
    }
    let _ = writeln!(out, "\nAverage Waiting Time:    {:.2}", table.average_waiting_time());
    let _ = writeln!(out, "Average Turnaround Time: {:.2}", table.average_turnaround_time());
    out
}

pub fn render_memory_status(result: &ScenarioResult) -> String {
    let mut out = String::from("Memory Status:\n\nContiguous Blocks:\nAddress\tSize\tStatus\n");
    for block in &result.blocks {
        match block.owner {
            Some(pid) => {
                let _ = writeln!(out, "{}\t{}\tP{}", block.start_address, block.size, pid);
            }
            None => {
                let _ = writeln!(out, "{}\t{}\tFREE", block.start_address, block.size);
            }
        }
    }
    let _ = writeln!(out, "\nPage Frames:\nFrame\tProcess\tPage\tLast Access");
    for (index, frame) in result.frames.iter().enumerate() {
        if let Some((pid, page)) = frame.owner {
            let _ = writeln!(out, "{}\tP{}\t{}\t{}", index, pid, page, frame.last_access);
        }
    }
    out
}
