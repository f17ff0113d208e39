use gat_core::{FaultScenario, FaultType, GatError, ProtectionTopology};
use gat_protection::{
    calculate_reward, coordination::find_coordination_issues, AdjustmentLimits, DeviceResponse,
    ProtectionConfig, ProtectionCoordinator,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn coordinator() -> ProtectionCoordinator {
    let mut config = ProtectionConfig::default();
    config.agent.seed = Some(2024);
    ProtectionCoordinator::new(ProtectionTopology::ieee14_two_zone(), config).unwrap()
}

fn coordinator_with_limits(limits: AdjustmentLimits, pickup: f64) -> ProtectionCoordinator {
    let mut topology = ProtectionTopology::ieee14_two_zone();
    for device in topology.devices_mut() {
        device.pickup_current = pickup;
    }
    let config = ProtectionConfig {
        limits,
        ..ProtectionConfig::default()
    };
    ProtectionCoordinator::new(topology, config).unwrap()
}

#[test]
fn bus4_three_phase_example() {
    let coordinator = coordinator();
    let fault_type: FaultType = "3-phase".parse().unwrap();
    let result = coordinator.simulate_fault(4, fault_type, 0.8);

    assert_eq!(result.affected_zone.as_ref().map(|z| z.as_str()), Some("Z1"));
    let current = result.fault_current_a.value();
    assert!(current.is_finite() && current > 0.0);
    assert_eq!(result.device_responses.len(), 8);
    let z1 = result
        .device_responses
        .iter()
        .filter(|r| r.zone.as_str() == "Z1")
        .count();
    assert_eq!(z1, 4);
}

#[test]
fn simulation_is_deterministic() {
    let coordinator = coordinator();
    for bus in 0..=15 {
        for fault_type in FaultType::ALL {
            let a = coordinator.simulate_fault(bus, fault_type, 0.7);
            let b = coordinator.simulate_fault(bus, fault_type, 0.7);
            assert_eq!(a.fault_current_a, b.fault_current_a);
            assert_eq!(a.device_responses, b.device_responses);
        }
    }
}

#[test]
fn fault_current_non_decreasing_in_severity() {
    let coordinator = coordinator();
    for bus in [1, 4, 7, 14, 99] {
        for fault_type in FaultType::ALL {
            let mut previous = 0.0;
            for step in 1..=20 {
                let severity = step as f64 / 20.0;
                let current = coordinator
                    .simulate_fault(bus, fault_type, severity)
                    .fault_current_a
                    .value();
                assert!(current >= previous, "bus {bus} {fault_type}: {current} < {previous}");
                previous = current;
            }
        }
    }
}

#[test]
fn issue_detection_is_symmetric() {
    let coordinator = coordinator();
    for scenario in [
        FaultScenario::new(4, FaultType::ThreePhase, 0.9),
        FaultScenario::new(14, FaultType::SinglePhase, 0.5),
        FaultScenario::new(9, FaultType::TwoPhase, 0.6),
    ] {
        let result = coordinator.simulate(&scenario);
        let operating: Vec<DeviceResponse> = result.operating().cloned().collect();
        for (i, a) in operating.iter().enumerate() {
            for b in &operating[i + 1..] {
                let forward = find_coordination_issues(&[a.clone(), b.clone()]);
                let reverse = find_coordination_issues(&[b.clone(), a.clone()]);
                assert_eq!(forward.len(), reverse.len());
            }
        }
    }
}

#[test]
fn settings_stay_within_limits_under_random_actions() {
    let mut coordinator = coordinator();
    let limits = coordinator.config().limits;
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..3_000 {
        coordinator.apply_action(rng.gen_range(0..40));
    }

    for device in coordinator.topology().devices() {
        assert!(limits.pickup_in_range(device.pickup_current), "{}: {}", device.id, device.pickup_current);
        assert!(limits.time_delay_in_range(device.time_delay), "{}: {}", device.id, device.time_delay);
    }
}

#[test]
fn decrease_pickup_applies_above_floor() {
    let limits = AdjustmentLimits {
        min_pickup: 50.0,
        max_pickup: 200.0,
        ..AdjustmentLimits::default()
    };
    let mut coordinator = coordinator_with_limits(limits, 100.0);

    assert!(coordinator.apply_action(0).is_applied());
    let pickup = coordinator.topology().device(0).unwrap().pickup_current;
    assert!((pickup - 95.0).abs() < 1e-9);

    let log = coordinator.adjustment_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].device_id.as_str(), "87T-TR1");
    assert_eq!(log[0].action_type, 0);
    assert!((log[0].pickup_current - 95.0).abs() < 1e-9);
}

#[test]
fn decrease_pickup_rejected_below_floor() {
    let limits = AdjustmentLimits {
        min_pickup: 96.0,
        max_pickup: 200.0,
        ..AdjustmentLimits::default()
    };
    let mut coordinator = coordinator_with_limits(limits, 100.0);

    assert!(!coordinator.apply_action(0).is_applied());
    assert_eq!(coordinator.topology().device(0).unwrap().pickup_current, 100.0);
    assert!(coordinator.adjustment_log().is_empty());
}

#[test]
fn coordinator_rejects_devices_outside_limits() {
    let config = ProtectionConfig {
        limits: AdjustmentLimits {
            min_time_delay: 0.1,
            ..AdjustmentLimits::default()
        },
        ..ProtectionConfig::default()
    };
    let err = ProtectionCoordinator::new(ProtectionTopology::ieee14_two_zone(), config).unwrap_err();
    assert!(matches!(err, GatError::Config(_)));
    assert!(err.to_string().contains("87T-TR1"));
}

#[test]
fn applied_steps_never_leave_limits() {
    let limits = AdjustmentLimits {
        min_pickup: 0.3,
        max_pickup: 1.4,
        min_time_delay: 0.02,
        max_time_delay: 1.4,
    };
    let config = ProtectionConfig {
        limits,
        ..ProtectionConfig::default()
    };
    let mut coordinator = ProtectionCoordinator::new(ProtectionTopology::ieee14_two_zone(), config).unwrap();

    for action in 0..coordinator.agent().action_space_size() {
        for _ in 0..40 {
            if coordinator.apply_action(action).is_applied() {
                let device = coordinator.topology().device(action / 4).unwrap();
                assert!(limits.pickup_in_range(device.pickup_current), "{}", device.id);
                assert!(limits.time_delay_in_range(device.time_delay), "{}", device.id);
            }
        }
    }
}

#[test]
fn coordinated_result_outscores_blackout() {
    let coordinator = coordinator();
    for scenario in gat_protection::default_training_batch() {
        let mut good = coordinator.simulate(&scenario);
        good.coordination_issues.clear();
        good.coordination_ok = true;
        for response in &mut good.device_responses {
            response.coordination_ok = true;
        }

        let mut bad = good.clone();
        bad.coordination_ok = false;

        assert!(calculate_reward(&good, false, false) > calculate_reward(&bad, false, true));
    }
}

#[test]
fn unknown_bus_degrades_gracefully() {
    let coordinator = coordinator();
    let result = coordinator.simulate_fault(42, FaultType::TwoPhaseGround, 1.0);
    assert!(result.affected_zone.is_none());
    let expected = 1000.0 * 0.95 / 0.15;
    assert!((result.fault_current_a.value() - expected).abs() < 1e-9);
    assert!(calculate_reward(&result, false, false).is_finite());
}
