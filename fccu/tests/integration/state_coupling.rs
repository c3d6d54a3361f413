//! Coupling between the collector and the two state machine layers.

use fccu::hsm::per_fault::PerFaultEvent;
use fccu::FaultCollector;
use fccu_common::prelude::*;

type TestCollector = FaultCollector<16, 8, 4, 4>;

fn deferring_collector() -> TestCollector {
    let mut collector = TestCollector::new();
    collector
        .register_fault(0, 0x1001, FaultAttr::empty(), 1)
        .unwrap();
    collector
        .register_hook(0, Box::new(|_| HookAction::Defer))
        .unwrap();
    collector
}

#[test]
fn critical_report_degrades_before_processing() {
    let collector = deferring_collector();
    collector
        .report_fault(0, 0, FaultPriority::Critical)
        .unwrap();
    // Degraded immediately, without a process call.
    assert!(collector.global_hsm().is_degraded());
    assert_eq!(collector.global_hsm().critical_count(), 1);
}

#[test]
fn repeated_criticals_count_once_degraded_stays() {
    let collector = deferring_collector();
    collector
        .report_fault(0, 0, FaultPriority::Critical)
        .unwrap();
    collector
        .report_fault(0, 1, FaultPriority::Critical)
        .unwrap();
    assert!(collector.global_hsm().is_degraded());
    // Already Degraded: no second CriticalDetected dispatch or count bump.
    assert_eq!(collector.global_hsm().critical_count(), 1);
}

#[test]
fn non_critical_report_only_activates() {
    let collector = deferring_collector();
    collector.report_fault(0, 0, FaultPriority::High).unwrap();
    assert!(collector.global_hsm().is_active());
    assert_eq!(collector.global_hsm().critical_count(), 0);
}

#[test]
fn per_fault_threshold_confirmation() {
    let mut collector = deferring_collector();
    collector.bind_fault_hsm(0, 3).unwrap();

    for round in 1..=3u32 {
        collector.report_fault(0, 0, FaultPriority::Medium).unwrap();
        collector.process_faults();
        let hsm = collector.fault_hsm(0).expect("bound");
        assert_eq!(hsm.occurrence_count(), round);
        if round < 3 {
            assert!(hsm.is_detected(), "below threshold after round {round}");
        } else {
            assert!(hsm.is_active(), "confirmed at threshold");
        }
    }

    collector.clear_fault(0);
    let hsm = collector.fault_hsm(0).expect("bound");
    assert!(hsm.is_cleared());
    collector.clear_fault(0);
    assert!(hsm.is_dormant());
    assert_eq!(hsm.occurrence_count(), 0);
}

#[test]
fn detection_reaches_hsm_before_processing() {
    let mut collector = deferring_collector();
    collector.bind_fault_hsm(0, 2).unwrap();

    collector.report_fault(0, 0, FaultPriority::Medium).unwrap();
    // Detected at report time, before any process call.
    let hsm = collector.fault_hsm(0).expect("bound");
    assert!(hsm.is_detected());
    assert_eq!(hsm.occurrence_count(), 1);
}

#[test]
fn handled_hook_clears_bound_hsm() {
    let mut collector = TestCollector::new();
    collector
        .register_fault(0, 0x1001, FaultAttr::empty(), 1)
        .unwrap();
    collector
        .register_hook(0, Box::new(|_| HookAction::Handled))
        .unwrap();
    collector.bind_fault_hsm(0, 5).unwrap();

    collector.report_fault(0, 0, FaultPriority::Medium).unwrap();
    collector.process_faults();
    assert!(collector.fault_hsm(0).expect("bound").is_cleared());
}

#[test]
fn recovery_flow_through_accessor() {
    let mut collector = deferring_collector();
    collector.bind_fault_hsm(0, 1).unwrap();

    collector.report_fault(0, 0, FaultPriority::Medium).unwrap();
    collector.process_faults();
    let hsm = collector.fault_hsm(0).expect("bound");
    assert!(hsm.is_active());

    assert!(hsm.dispatch(PerFaultEvent::RecoveryStart));
    assert!(hsm.is_recovering());
    assert!(hsm.dispatch(PerFaultEvent::RecoveryDone));
    assert!(hsm.is_cleared());
}

#[test]
fn bind_slot_limit() {
    let mut collector: FaultCollector<16, 8, 4, 2> = FaultCollector::new();
    for index in 0..3 {
        collector
            .register_fault(index, 0x1000 + index as u32, FaultAttr::empty(), 1)
            .unwrap();
    }
    assert!(collector.bind_fault_hsm(0, 1).is_ok());
    assert!(collector.bind_fault_hsm(1, 1).is_ok());
    assert_eq!(collector.bind_fault_hsm(2, 1), Err(FccuError::HsmSlotFull));
    assert_eq!(
        collector.bind_fault_hsm(16, 1),
        Err(FccuError::InvalidIndex)
    );
}

#[test]
fn rebinding_an_index_updates_in_place() {
    let mut collector: FaultCollector<16, 8, 4, 2> = FaultCollector::new();
    collector
        .register_fault(0, 0x1001, FaultAttr::empty(), 1)
        .unwrap();
    collector
        .register_hook(0, Box::new(|_| HookAction::Defer))
        .unwrap();
    collector.bind_fault_hsm(0, 1).unwrap();

    collector.report_fault(0, 0, FaultPriority::Medium).unwrap();
    assert!(collector.fault_hsm(0).expect("bound").is_detected());

    // Rebind: new threshold, state back to Dormant, same slot.
    collector.bind_fault_hsm(0, 3).unwrap();
    let hsm = collector.fault_hsm(0).expect("still bound");
    assert_eq!(hsm.threshold(), 3);
    assert!(hsm.is_dormant());
    assert_eq!(hsm.occurrence_count(), 0);

    // Only one of the two slots is consumed; the second is still free,
    // and a third distinct index overflows as before.
    assert!(collector.bind_fault_hsm(1, 1).is_ok());
    assert_eq!(collector.bind_fault_hsm(2, 1), Err(FccuError::HsmSlotFull));
}

#[test]
fn unbound_index_has_no_hsm() {
    let mut collector = deferring_collector();
    collector.bind_fault_hsm(0, 1).unwrap();
    assert!(collector.fault_hsm(0).is_some());
    assert!(collector.fault_hsm(1).is_none());
}

#[test]
fn clear_single_fault_keeps_others_active() {
    let mut collector = TestCollector::new();
    for index in 0..2 {
        collector
            .register_fault(index, 0x1000 + index as u32, FaultAttr::empty(), 1)
            .unwrap();
        collector
            .register_hook(index, Box::new(|_| HookAction::Defer))
            .unwrap();
    }
    collector.report_fault(0, 0, FaultPriority::Medium).unwrap();
    collector.report_fault(1, 0, FaultPriority::Medium).unwrap();
    collector.process_faults();

    collector.clear_fault(0);
    assert!(!collector.is_fault_active(0));
    assert!(collector.is_fault_active(1));
    assert_eq!(collector.active_fault_count(), 1);
    // One fault still active: the global machine stays Active.
    assert!(collector.global_hsm().is_active());

    collector.clear_fault(1);
    assert!(collector.global_hsm().is_idle());
}

#[test]
fn clear_all_resets_hsms_counters_and_global() {
    let mut collector = deferring_collector();
    collector
        .register_fault(1, 0x1002, FaultAttr::empty(), 1)
        .unwrap();
    collector
        .register_hook(1, Box::new(|_| HookAction::Defer))
        .unwrap();
    collector.bind_fault_hsm(0, 2).unwrap();

    for _ in 0..2 {
        collector.report_fault(0, 0, FaultPriority::Medium).unwrap();
    }
    collector.report_fault(1, 0, FaultPriority::Medium).unwrap();
    collector.process_faults();
    assert_eq!(collector.active_fault_count(), 2);

    collector.clear_all_faults();
    assert_eq!(collector.active_fault_count(), 0);
    assert!(collector.global_hsm().is_idle());
    let hsm = collector.fault_hsm(0).expect("bound");
    assert!(hsm.is_dormant());
    assert_eq!(hsm.occurrence_count(), 0);

    // Counters restart from scratch after the clear.
    collector.report_fault(0, 0, FaultPriority::Medium).unwrap();
    collector.process_faults();
    assert_eq!(collector.fault_hsm(0).expect("bound").occurrence_count(), 1);
}
