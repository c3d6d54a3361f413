//! Basic collector walk-through: register fault points, set hooks, report
//! at different priorities, process, query and clear.
//!
//! ```bash
//! cargo run --example basic_demo
//! ```

use fccu::FaultCollector;
use fccu_common::prelude::*;

/// Demo hook: defer criticals for manual review, handle the rest.
fn demo_hook() -> FaultHook {
    Box::new(|event| {
        println!(
            "  [hook] index={} code=0x{:04X} detail=0x{:X} priority={} count={}{}",
            event.fault_index,
            event.fault_code,
            event.detail,
            event.priority.as_str(),
            event.occurrence_count,
            if event.is_first { " (first)" } else { "" },
        );
        if event.priority == FaultPriority::Critical {
            println!("  [hook] critical fault -> defer for manual review");
            HookAction::Defer
        } else {
            HookAction::Handled
        }
    })
}

fn main() -> Result<(), FccuError> {
    tracing_subscriber::fmt().compact().init();

    // 16 fault points, 8-deep queues, 4 priority levels, 4 HSM slots.
    let mut collector: FaultCollector<16, 8, 4, 4> = FaultCollector::new();

    collector.register_fault(0, 0x1001, FaultAttr::SAFETY_RELEVANT, 1)?; // temperature sensor
    collector.register_fault(1, 0x1002, FaultAttr::empty(), 1)?; // voltage monitor
    collector.register_fault(2, 0x2001, FaultAttr::empty(), 3)?; // comm timeout, threshold 3
    for index in 0..3 {
        collector.register_hook(index, demo_hook())?;
    }

    collector.set_default_hook(Box::new(|event| {
        println!(
            "  [default] index={} code=0x{:04X} -> handled",
            event.fault_index, event.fault_code
        );
        HookAction::Handled
    }));
    collector.set_overflow_callback(Box::new(|index, priority| {
        println!(
            "  [overflow] index={index} priority={} dropped",
            priority.as_str()
        );
    }));
    collector.bind_fault_hsm(0, 1)?;

    println!("--- reporting ---");
    collector.report_fault(0, 0xDEAD, FaultPriority::Critical)?;
    collector.report_fault(1, 0xBEEF, FaultPriority::High)?;
    collector.report_fault(2, 0x0001, FaultPriority::Low)?;

    println!("active before processing: {}", collector.active_fault_count());
    println!("global state: {}", collector.global_hsm().state().as_str());
    println!("backpressure: {:?}", collector.backpressure_level());

    println!("--- processing ---");
    let processed = collector.process_faults();
    println!("processed {processed} faults");
    println!("active after processing: {}", collector.active_fault_count());
    println!("fault 0 active: {} (deferred)", collector.is_fault_active(0));
    println!("global state: {}", collector.global_hsm().state().as_str());

    let stats = collector.statistics();
    println!(
        "--- statistics ---\nreported={} processed={} dropped={}",
        stats.total_reported, stats.total_processed, stats.total_dropped
    );

    println!("--- recent faults (newest first) ---");
    collector.for_each_recent(16, |info| {
        println!(
            "  index={} detail=0x{:X} priority={} t={}us",
            info.fault_index,
            info.detail,
            info.priority.as_str(),
            info.timestamp_us
        );
    });

    println!("--- clearing fault 0 ---");
    collector.clear_fault(0);
    println!("active: {}", collector.active_fault_count());
    println!("global state: {}", collector.global_hsm().state().as_str());

    println!("--- detached reporter ---");
    let reporter = collector.reporter();
    reporter.report(1, 0xCAFE, FaultPriority::Medium);
    collector.process_faults();
    println!("active: {}", collector.active_fault_count());

    Ok(())
}
