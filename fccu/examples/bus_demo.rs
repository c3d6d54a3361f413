//! Multi-producer integration through a message-bus front-end.
//!
//! The collector core is single-producer; systems with many reporting
//! contexts put a bus in front and let its drain loop be the one producer.
//! Here `std::sync::mpsc` plays the bus: three worker threads send raw
//! reports into the channel, a funnel thread drains it into the collector,
//! and the bus notifier republishes processed events to a subscriber.
//!
//! ```bash
//! cargo run --example bus_demo
//! ```

use std::sync::mpsc;
use std::time::Duration;

use fccu::FaultCollector;
use fccu_common::prelude::*;

/// Raw report as sent by the producer side of the bus.
#[derive(Debug, Clone, Copy)]
struct RawReport {
    fault_index: u16,
    detail: u32,
    priority: FaultPriority,
}

fn main() -> Result<(), FccuError> {
    tracing_subscriber::fmt().compact().init();

    let mut collector: FaultCollector<8, 16, 4, 4> = FaultCollector::new();
    collector.register_fault(0, 0xA001, FaultAttr::empty(), 1)?;
    collector.register_fault(1, 0xA002, FaultAttr::empty(), 1)?;
    collector.register_fault(2, 0xA003, FaultAttr::empty(), 1)?;
    for index in 0..3 {
        collector.register_hook(index, Box::new(|_| HookAction::Handled))?;
    }

    // Processed events flow out to a subscriber over a second channel.
    let (event_tx, event_rx) = mpsc::channel::<FaultEvent>();
    collector.set_bus_notifier(Box::new(move |event| {
        let _ = event_tx.send(*event);
    }));
    let collector = collector;

    let (report_tx, report_rx) = mpsc::channel::<RawReport>();

    std::thread::scope(|scope| {
        // Three independent reporting contexts.
        for worker in 0..3u16 {
            let tx = report_tx.clone();
            scope.spawn(move || {
                for step in 0..4u32 {
                    tx.send(RawReport {
                        fault_index: worker,
                        detail: (u32::from(worker) << 8) | step,
                        priority: if step == 0 {
                            FaultPriority::High
                        } else {
                            FaultPriority::Medium
                        },
                    })
                    .expect("bus send");
                    std::thread::sleep(Duration::from_millis(2));
                }
            });
        }
        drop(report_tx);

        // Funnel: the bus drain loop is the single producer.
        let collector_ref = &collector;
        scope.spawn(move || {
            while let Ok(report) = report_rx.recv() {
                if let Err(err) = collector_ref.report_fault(
                    report.fault_index,
                    report.detail,
                    report.priority,
                ) {
                    eprintln!("report rejected: {err}");
                }
                collector_ref.process_faults();
            }
        });
    });

    println!("--- events republished over the bus ---");
    while let Ok(event) = event_rx.try_recv() {
        println!(
            "  [bus] index={} code=0x{:04X} detail=0x{:04X} priority={}",
            event.fault_index,
            event.fault_code,
            event.detail,
            event.priority.as_str()
        );
    }

    let stats = collector.statistics();
    println!(
        "--- statistics ---\nreported={} processed={} dropped={}",
        stats.total_reported, stats.total_processed, stats.total_dropped
    );
    assert_eq!(collector.active_fault_count(), 0);

    Ok(())
}
