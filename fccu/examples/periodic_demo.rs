//! Scheduler-driven processing: a periodic consumer thread drains the
//! collector while a producer injects faults through the detached reporter.
//!
//! Any scheduling mechanism works; here a plain thread with an interval
//! sleep stands in for the system tick.
//!
//! ```bash
//! cargo run --example periodic_demo
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use fccu::FaultCollector;
use fccu_common::prelude::*;

const TICK: Duration = Duration::from_millis(5);
const RUN_TICKS: u32 = 40;

fn main() -> Result<(), FccuError> {
    tracing_subscriber::fmt().compact().init();

    let mut collector: FaultCollector<8, 16, 4, 4> = FaultCollector::new();
    for index in 0..4u16 {
        collector.register_fault(index, 0x3000 + u32::from(index), FaultAttr::empty(), 1)?;
        collector.register_hook(
            index,
            Box::new(|event| {
                println!(
                    "    [hook] index={} code=0x{:04X} detail=0x{:X} -> handled",
                    event.fault_index, event.fault_code, event.detail
                );
                HookAction::Handled
            }),
        )?;
    }
    let collector = collector;

    let stop = AtomicBool::new(false);
    std::thread::scope(|scope| {
        // Consumer: periodic processing task.
        scope.spawn(|| {
            let mut tick = 0u32;
            while !stop.load(Ordering::Acquire) {
                let processed = collector.process_faults();
                if processed > 0 {
                    println!("  [scheduler tick={tick}] processed {processed} faults");
                }
                tick += 1;
                std::thread::sleep(TICK);
            }
            // Final drain after the producer finished.
            collector.process_faults();
        });

        // Producer: inject a fault every other tick via the reporter.
        scope.spawn(|| {
            let reporter = collector.reporter();
            for step in 0..RUN_TICKS / 2 {
                let index = (step % 4) as u16;
                let priority = if step % 2 == 0 {
                    FaultPriority::Medium
                } else {
                    FaultPriority::High
                };
                reporter.report(index, step * 0x10, priority);
                println!("  [injector step={step}] reported index={index}");
                std::thread::sleep(TICK * 2);
            }
            stop.store(true, Ordering::Release);
        });
    });

    let stats = collector.statistics();
    println!(
        "--- final statistics ---\nreported={} processed={} dropped={}",
        stats.total_reported, stats.total_processed, stats.total_dropped
    );
    println!("active faults: {}", collector.active_fault_count());
    println!("global state: {}", collector.global_hsm().state().as_str());

    Ok(())
}
