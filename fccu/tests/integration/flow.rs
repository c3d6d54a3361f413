//! Report → process flows: hook verdicts, escalation, shutdown, the
//! detached reporter, and the entry/event round trip.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use fccu::FaultCollector;
use fccu_common::prelude::*;

type TestCollector = FaultCollector<16, 8, 4, 4>;

fn collector_with(count: u16) -> TestCollector {
    let mut collector = TestCollector::new();
    for index in 0..count {
        collector
            .register_fault(index, 0x1000 + index as u32, FaultAttr::empty(), 1)
            .expect("register");
    }
    collector
}

#[test]
fn basic_handled_flow() {
    let mut collector = collector_with(1);
    collector
        .register_hook(0, Box::new(|_| HookAction::Handled))
        .unwrap();

    assert!(collector.global_hsm().is_idle());
    collector.report_fault(0, 0xAA, FaultPriority::Medium).unwrap();
    assert_eq!(collector.active_fault_count(), 1);
    assert!(collector.is_fault_active(0));
    assert!(collector.global_hsm().is_active());

    assert_eq!(collector.process_faults(), 1);
    assert!(!collector.is_fault_active(0));
    assert_eq!(collector.active_fault_count(), 0);
    assert!(collector.global_hsm().is_idle());
}

#[test]
fn defer_keeps_fault_active() {
    let mut collector = collector_with(1);
    collector
        .register_hook(0, Box::new(|_| HookAction::Defer))
        .unwrap();

    collector.report_fault(0, 0xAA, FaultPriority::Medium).unwrap();
    assert_eq!(collector.process_faults(), 1);
    assert!(collector.is_fault_active(0));
    assert!(collector.global_hsm().is_active());
}

#[test]
fn escalation_reprocesses_at_higher_priority() {
    let mut collector = collector_with(1);
    let calls = Arc::new(AtomicU32::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let hook_calls = Arc::clone(&calls);
    let hook_seen = Arc::clone(&seen);
    collector
        .register_hook(
            0,
            Box::new(move |event| {
                hook_seen.lock().unwrap().push(event.priority);
                if hook_calls.fetch_add(1, Ordering::Relaxed) == 0 {
                    HookAction::Escalate
                } else {
                    HookAction::Handled
                }
            }),
        )
        .unwrap();

    collector.report_fault(0, 0, FaultPriority::Medium).unwrap();
    // Drain-until-empty picks up the escalated copy in the same call: the
    // hook runs at Medium, re-enqueues at High, and runs again.
    assert_eq!(collector.process_faults(), 2);
    assert_eq!(calls.load(Ordering::Relaxed), 2);
    assert!(!collector.is_fault_active(0));
    assert_eq!(
        *seen.lock().unwrap(),
        vec![FaultPriority::Medium, FaultPriority::High]
    );
    assert_eq!(collector.process_faults(), 0);
}

#[test]
fn escalate_at_critical_is_noop_but_counts_as_processed() {
    let mut collector = collector_with(1);
    collector
        .register_hook(0, Box::new(|_| HookAction::Escalate))
        .unwrap();

    collector
        .report_fault(0, 0, FaultPriority::Critical)
        .unwrap();
    assert_eq!(collector.process_faults(), 1);

    let stats = collector.statistics();
    assert_eq!(stats.total_processed, 1);
    assert_eq!(stats.total_dropped, 0);
    assert!(collector.is_fault_active(0));
    // Nothing was re-enqueued.
    assert_eq!(collector.process_faults(), 0);
}

#[test]
fn shutdown_hook_latches_and_fires_callback() {
    let mut collector = collector_with(1);
    collector
        .register_hook(0, Box::new(|_| HookAction::Shutdown))
        .unwrap();
    let shutdown_seen = Arc::new(AtomicU32::new(0));
    let callback_seen = Arc::clone(&shutdown_seen);
    collector.set_shutdown_callback(Box::new(move || {
        callback_seen.fetch_add(1, Ordering::Relaxed);
    }));

    collector.report_fault(0, 0, FaultPriority::High).unwrap();
    assert_eq!(collector.process_faults(), 1);
    assert!(collector.is_shutdown_requested());
    assert!(collector.global_hsm().is_shutdown());
    assert_eq!(shutdown_seen.load(Ordering::Relaxed), 1);

    // Processing is inert until reset.
    collector.report_fault(0, 0, FaultPriority::High).unwrap();
    assert_eq!(collector.process_faults(), 0);
}

#[test]
fn default_hook_used_when_no_specific_hook() {
    let mut collector = collector_with(1);
    let called = Arc::new(AtomicU32::new(0));
    let default_called = Arc::clone(&called);
    collector.set_default_hook(Box::new(move |_| {
        default_called.fetch_add(1, Ordering::Relaxed);
        HookAction::Handled
    }));

    collector.report_fault(0, 0, FaultPriority::Medium).unwrap();
    collector.process_faults();
    assert_eq!(called.load(Ordering::Relaxed), 1);
    assert!(!collector.is_fault_active(0));
}

#[test]
fn missing_hooks_treated_as_handled() {
    let collector = collector_with(1);
    collector.report_fault(0, 0, FaultPriority::Medium).unwrap();
    assert_eq!(collector.process_faults(), 1);
    assert!(!collector.is_fault_active(0));
}

#[test]
fn multiple_faults_across_priorities() {
    let mut collector = collector_with(3);
    for index in 0..3 {
        collector
            .register_hook(index, Box::new(|_| HookAction::Handled))
            .unwrap();
    }

    collector
        .report_fault(0, 0, FaultPriority::Critical)
        .unwrap();
    collector.report_fault(1, 0, FaultPriority::Medium).unwrap();
    collector.report_fault(2, 0, FaultPriority::Low).unwrap();

    assert_eq!(collector.active_fault_count(), 3);
    assert_eq!(collector.process_faults(), 3);
    assert_eq!(collector.active_fault_count(), 0);
}

#[test]
fn entry_round_trips_into_event() {
    let mut collector = collector_with(2);
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured);
    collector
        .register_hook(
            1,
            Box::new(move |event| {
                sink.lock().unwrap().push(*event);
                HookAction::Handled
            }),
        )
        .unwrap();

    collector
        .report_fault(1, 0xBEEF, FaultPriority::High)
        .unwrap();
    collector.process_faults();

    let events = captured.lock().unwrap();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.fault_index, 1);
    assert_eq!(event.detail, 0xBEEF);
    assert_eq!(event.priority, FaultPriority::High);
    assert_eq!(event.fault_code, 0x1001);
    assert_eq!(event.occurrence_count, 1);
    assert!(event.is_first);
}

#[test]
fn occurrence_count_accumulates_until_clear() {
    let mut collector = collector_with(1);
    collector
        .register_hook(0, Box::new(|_| HookAction::Defer))
        .unwrap();
    let counts = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&counts);
    collector.set_bus_notifier(Box::new(move |event| {
        sink.lock()
            .unwrap()
            .push((event.occurrence_count, event.is_first));
    }));

    for _ in 0..3 {
        collector.report_fault(0, 0, FaultPriority::Medium).unwrap();
        collector.process_faults();
    }
    assert_eq!(
        *counts.lock().unwrap(),
        vec![(1, true), (2, false), (3, false)]
    );
    assert!(collector.is_fault_active(0));

    collector.clear_fault(0);
    collector.report_fault(0, 0, FaultPriority::Medium).unwrap();
    collector.process_faults();
    assert_eq!(counts.lock().unwrap().last(), Some(&(1, true)));
}

#[test]
fn statistics_accuracy_and_reset() {
    let mut collector = collector_with(1);
    collector
        .register_hook(0, Box::new(|_| HookAction::Handled))
        .unwrap();

    collector.report_fault(0, 0, FaultPriority::High).unwrap();
    collector.report_fault(0, 0, FaultPriority::Medium).unwrap();
    collector.process_faults();

    let stats = collector.statistics();
    assert_eq!(stats.total_reported, 2);
    assert_eq!(stats.total_processed, 2);
    assert_eq!(stats.total_dropped, 0);
    assert_eq!(stats.reported_at(FaultPriority::High), 1);
    assert_eq!(stats.reported_at(FaultPriority::Medium), 1);
    assert!(stats.totals_consistent());

    collector.reset_statistics();
    let stats = collector.statistics();
    assert_eq!(stats.total_reported, 0);
    assert_eq!(stats.total_processed, 0);
}

#[test]
fn reporter_injection_point() {
    let mut collector = collector_with(1);
    collector
        .register_hook(0, Box::new(|_| HookAction::Handled))
        .unwrap();

    let reporter = collector.reporter();
    reporter.report(0, 0xCAFE, FaultPriority::Medium);
    assert!(collector.is_fault_active(0));

    collector.process_faults();
    assert!(!collector.is_fault_active(0));
}

#[test]
fn producer_and_consumer_on_separate_threads() {
    const REPORTS: usize = 2_000;

    let mut collector: FaultCollector<4, 64, 4, 4> = FaultCollector::new();
    collector
        .register_fault(0, 0xA001, FaultAttr::empty(), 1)
        .unwrap();
    collector
        .register_hook(0, Box::new(|_| HookAction::Handled))
        .unwrap();
    let collector = collector; // configuration done; share immutably

    let processed = AtomicUsize::new(0);
    std::thread::scope(|scope| {
        scope.spawn(|| {
            let reporter = collector.reporter();
            let mut sent = 0;
            while sent < REPORTS {
                // Critical bypasses admission, so only physical full backs off.
                if collector
                    .report_fault(0, sent as u32, FaultPriority::Critical)
                    .is_ok()
                {
                    sent += 1;
                } else {
                    std::hint::spin_loop();
                }
                // Exercise the detached handle as well.
                let _ = reporter.is_bound();
            }
        });
        scope.spawn(|| {
            while processed.load(Ordering::Relaxed) < REPORTS {
                let drained = collector.process_faults();
                if drained == 0 {
                    std::hint::spin_loop();
                } else {
                    processed.fetch_add(drained, Ordering::Relaxed);
                }
            }
        });
    });

    let stats = collector.statistics();
    assert_eq!(stats.total_processed, REPORTS as u64);
    assert!(stats.totals_consistent());
    assert_eq!(collector.process_faults(), 0);
}
