use std::process::ExitCode;

use env_logger::{Builder, Env};

use memsched::modules::contiguous::PlacementPolicy;
use memsched::modules::paging::ReplacementPolicy;
use memsched::{
    read_process_records_from_path, render_gantt_chart, render_memory_status,
    render_scheduling_results, ProcessTable, SimConfig, Simulation,
};

fn main() -> ExitCode {
    Builder::from_env(Env::default())
        .format_module_path(false)
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "processes.txt".into());
    let config = SimConfig::default();

    let outcome = match read_process_records_from_path(&path, config.max_processes) {
        Ok(outcome) => outcome,
        Err(err) => {
            log::error!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    if outcome.truncated > 0 {
        println!("note: dropped {} records beyond table capacity", outcome.truncated);
    }

    let mut table = ProcessTable::new(&outcome.records, config.page_size);
    println!(
        "--- Round Robin Scheduling with Memory Management (quantum = {}) ---",
        config.quantum
    );
    println!(
        "Memory: {} bytes, page size {} ({} frames)\n",
        config.memory_size,
        config.page_size,
        config.frame_count()
    );

    let scenarios = [
        (PlacementPolicy::FirstFit, ReplacementPolicy::Fifo),
        (PlacementPolicy::BestFit, ReplacementPolicy::Lru),
    ];

    for (placement, replacement) in scenarios {
        println!("--- {} contiguous allocation with {} paging ---", placement, replacement);
        let simulation = match Simulation::new(SimConfig {
            placement,
            replacement,
            ..config
        }) {
            Ok(simulation) => simulation,
            Err(err) => {
                log::error!("{}", err);
                return ExitCode::FAILURE;
            }
        };
        match simulation.run_scenario(&mut table) {
            Ok(result) => {
                print!("{}", render_gantt_chart(&result.trace));
                print!("{}", render_scheduling_results(&table));
                println!("{}", render_memory_status(&result));
            }
            Err(err) => {
                log::error!("scenario aborted: {}", err);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
