use std::{thread, time::Duration};

use crate::{MaxRequests, Policy, Tollgate, WindowMs};

fn policy(window_ms: u64, max_requests: u64) -> Policy {
    Policy::new(
        WindowMs::try_from(window_ms).unwrap(),
        MaxRequests::try_from(max_requests).unwrap(),
    )
}

#[test]
fn reaper_evicts_stale_records() {
    let gate = Tollgate::new();
    let policy = policy(100, 10);

    gate.check("key1", &policy);
    gate.check("key2", &policy);
    gate.check("key3", &policy);
    assert_eq!(gate.size(), 3);

    // Aggressive timing: records go stale 100ms past their 100ms window.
    gate.run_reaper_loop_with_config(100, 50);

    thread::sleep(Duration::from_millis(400));
    assert_eq!(gate.size(), 0);

    gate.stop_reaper_loop();
}

#[test]
fn reaper_keeps_active_keys() {
    let gate = Tollgate::new();
    let policy = policy(200, 1000);

    gate.check("key1", &policy);
    gate.run_reaper_loop_with_config(500, 100);

    // Each admission refreshes the window boundary, so the key never goes
    // stale while it keeps seeing traffic.
    for _ in 0..5 {
        thread::sleep(Duration::from_millis(100));
        gate.check("key1", &policy);
    }

    assert_eq!(gate.size(), 1);

    gate.stop_reaper_loop();
}

#[test]
fn reaped_key_behaves_as_brand_new() {
    let gate = Tollgate::new();
    let policy = policy(100, 3);
    let key = "k";

    for _ in 0..3 {
        assert!(gate.check(key, &policy).is_allowed());
    }
    assert!(!gate.check(key, &policy).is_allowed());

    gate.run_reaper_loop_with_config(100, 50);
    thread::sleep(Duration::from_millis(400));
    assert_eq!(gate.size(), 0);

    let decision = gate.check(key, &policy);
    assert!(decision.is_allowed());
    assert_eq!(decision.remaining(), 2);
    assert_eq!(gate.status(key).expect("record exists").total_admitted, 1);

    gate.stop_reaper_loop();
}

#[test]
fn stop_reaper_loop_prevents_future_eviction() {
    let gate = Tollgate::new();
    let policy = policy(100, 10);

    gate.check("key1", &policy);
    assert_eq!(gate.size(), 1);

    // The key only goes stale at window + grace = 400ms; the first sweep runs
    // immediately, so stop before then.
    gate.run_reaper_loop_with_config(300, 80);
    thread::sleep(Duration::from_millis(20));

    // Idempotent stop
    gate.stop_reaper_loop();
    gate.stop_reaper_loop();

    // If the loop were still running, a later sweep would evict the key.
    thread::sleep(Duration::from_millis(500));
    assert_eq!(gate.size(), 1);
}

#[test]
fn run_reaper_loop_with_config_is_idempotent() {
    let gate = Tollgate::new();
    let policy = policy(100, 10);

    gate.check("key1", &policy);
    assert_eq!(gate.size(), 1);

    // Start with a long grace period.
    gate.run_reaper_loop_with_config(5_000, 50);

    // Second call is a no-op: no reconfiguration, no second loop.
    gate.run_reaper_loop_with_config(10, 50);

    // Wait long enough that the key would be stale under the second config.
    thread::sleep(Duration::from_millis(300));
    assert_eq!(gate.size(), 1);

    gate.stop_reaper_loop();
}

#[test]
fn stop_then_restart_reaper_works() {
    let gate = Tollgate::new();
    let policy = policy(100, 10);

    gate.check("key1", &policy);
    assert_eq!(gate.size(), 1);

    gate.run_reaper_loop_with_config(300, 80);
    thread::sleep(Duration::from_millis(20));
    gate.stop_reaper_loop();
    thread::sleep(Duration::from_millis(500));
    assert_eq!(gate.size(), 1);

    // Restart: the key is stale now, so the immediate first sweep evicts it.
    gate.run_reaper_loop_with_config(100, 80);
    thread::sleep(Duration::from_millis(300));
    assert_eq!(gate.size(), 0);

    gate.stop_reaper_loop();
}

#[test]
fn destroy_stops_reaper_and_clears_state() {
    let gate = Tollgate::new();
    let policy = policy(60_000, 10);

    gate.check("a", &policy);
    gate.check("b", &policy);
    gate.run_reaper_loop_with_config(60_000, 50);
    assert_eq!(gate.size(), 2);

    gate.destroy();
    assert_eq!(gate.size(), 0);

    // Idempotent, and the instance stays usable afterwards.
    gate.destroy();
    assert!(gate.check("a", &policy).is_allowed());
}
