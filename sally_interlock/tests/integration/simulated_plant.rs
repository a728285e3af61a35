//! Integration test: tick runner against the simulated plant.
//!
//! Configuration goes through the real loaders and the shipped `io.toml`;
//! the simulation driver plays the barriers and the operator panel.

use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;

use sally_common::config::ConfigError;
use sally_common::interlock::error::CycleFault;
use sally_common::interlock::state::{GateId, InterlockState};
use sally_common::io::role::IoRole;
use sally_hal::DriverRegistry;
use sally_interlock::config::{LoadedConfig, load_config, load_config_from_strings};
use sally_interlock::cycle::TickRunner;
use sally_interlock::status::status_channel;

const IO_TOML: &str = include_str!("../../../config/io.toml");

// ── Helpers ─────────────────────────────────────────────────────────

fn sally_toml(simulation: &str) -> String {
    format!(
        r#"
[shared]
service_name = "sally-port-sim"

[timing]
tick_period_ms = 1
open_timeout_ticks = 10
close_timeout_ticks = 40
status_period_ms = 1

[io]
config_path = "io.toml"
driver = "simulation"

[simulation]
{simulation}
"#
    )
}

fn loaded(simulation: &str) -> LoadedConfig {
    load_config_from_strings(&sally_toml(simulation), IO_TOML).unwrap()
}

fn runner(simulation: &str) -> TickRunner {
    let (publisher, _reader) = status_channel();
    TickRunner::from_config(loaded(simulation), &DriverRegistry::with_builtin(), publisher).unwrap()
}

/// Run `ticks` tick bodies; returns every state visited, in order.
fn drive(runner: &mut TickRunner, ticks: u32) -> Vec<InterlockState> {
    let mut visited = vec![runner.controller().state()];
    for _ in 0..ticks {
        runner.tick_once().unwrap();
        let state = runner.controller().state();
        if visited.last() != Some(&state) {
            visited.push(state);
        }
    }
    visited
}

const QUICK_GATES: &str = r#"
outer = { open_delay_ticks = 1, hold_open_ticks = 3, close_delay_ticks = 1 }
inner = { open_delay_ticks = 1, hold_open_ticks = 3, close_delay_ticks = 1 }
"#;

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn inbound_pass_through_simulated_gates() {
    let sim = format!(
        "{QUICK_GATES}stimulus = [ {{ tick = 2, role = \"InboundRequest\", duration = 2 }} ]"
    );
    let mut runner = runner(&sim);

    let mut beacon_seen = false;
    let mut visited = vec![];
    for _ in 0..40 {
        runner.tick_once().unwrap();
        let state = runner.controller().state();
        if visited.last() != Some(&state) {
            visited.push(state);
        }
        beacon_seen |= runner
            .registry()
            .read_do(&IoRole::GatesOpen, runner.do_bank())
            .unwrap_or(false);
    }

    assert_eq!(
        visited,
        vec![
            InterlockState::Idle,
            InterlockState::InboundStarted,
            InterlockState::InboundFirstWaiting,
            InterlockState::InboundFirstOpened,
            InterlockState::InboundFirstClosed,
            InterlockState::InboundSecondWaiting,
            InterlockState::InboundSecondOpened,
            InterlockState::InboundCompleted,
            InterlockState::Idle,
        ]
    );
    assert!(beacon_seen);
    assert_eq!(runner.controller().last_fault(), None);
    assert!(!runner.controller().gates_open());
}

#[test]
fn jammed_gate_is_freed_by_stuck_key() {
    let sim = r#"
outer = { open_delay_ticks = 1, hold_open_ticks = 3, close_delay_ticks = 1, jammed_open = true }
inner = { open_delay_ticks = 1, hold_open_ticks = 3, close_delay_ticks = 1 }
stimulus = [
    { tick = 2,  role = "InboundRequest" },
    { tick = 60, role = "StuckRequest" },
]
"#;
    let mut runner = runner(sim);

    // The outer gate opens and stays open: the cycle gives up on it.
    let visited = drive(&mut runner, 59);
    assert!(visited.contains(&InterlockState::InboundFirstOpened));
    assert!(!visited.contains(&InterlockState::InboundSecondWaiting));
    assert_eq!(runner.controller().state(), InterlockState::Idle);
    assert!(matches!(
        runner.controller().last_fault(),
        Some(CycleFault::CloseTimeout {
            gate: GateId::Outer,
            ..
        })
    ));
    assert!(runner.controller().gates()[GateId::Outer].is_open());

    let visited = drive(&mut runner, 15);
    assert!(visited.contains(&InterlockState::StuckOuterWaiting));
    assert!(visited.contains(&InterlockState::StuckComplete));
    assert_eq!(runner.controller().state(), InterlockState::Idle);
    assert!(runner.controller().gates()[GateId::Outer].is_closed());
}

#[test]
fn plant_starting_open_triggers_breach_recovery() {
    let sim = r#"
outer = { start_open = true, hold_open_ticks = 5, close_delay_ticks = 1 }
inner = { start_open = true, hold_open_ticks = 5, close_delay_ticks = 1 }
"#;
    let mut runner = runner(sim);
    let visited = drive(&mut runner, 20);

    assert_eq!(visited[1], InterlockState::StuckStarted);
    assert!(visited.contains(&InterlockState::StuckOuterOpened));
    assert_eq!(visited.last(), Some(&InterlockState::Idle));
    assert_eq!(runner.controller().last_fault(), None);
}

#[test]
fn disabled_outer_falls_back_to_single_gate() {
    let sim = format!(
        "{}stimulus = [ {{ tick = 1, role = \"OutboundRequest\" }} ]",
        QUICK_GATES.replace(
            "outer = { open_delay_ticks = 1,",
            "outer = { disabled = true, open_delay_ticks = 1,"
        )
    );
    let mut runner = runner(&sim);
    let visited = drive(&mut runner, 20);

    assert!(visited.contains(&InterlockState::SingleOpened));
    assert_eq!(visited.last(), Some(&InterlockState::Idle));
    assert!(!runner.controller().gates()[GateId::Outer].is_enabled());
}

#[test]
fn run_loop_from_files_stops_at_max_ticks() {
    let dir = tempfile::tempdir().unwrap();
    let sally_path = dir.path().join("sally.toml");
    fs::write(&sally_path, sally_toml(QUICK_GATES)).unwrap();
    fs::write(dir.path().join("io.toml"), IO_TOML).unwrap();

    let loaded = load_config(&sally_path).unwrap();
    assert_eq!(loaded.config.timing.open_timeout_ticks, 10);

    let (publisher, reader) = status_channel();
    let mut runner = TickRunner::from_config(loaded, &DriverRegistry::with_builtin(), publisher)
        .unwrap()
        .with_max_ticks(Some(25));

    let running = AtomicBool::new(true);
    let stats = runner.run(&running).unwrap();
    assert_eq!(stats.tick_count, 25);
    assert_eq!(runner.driver_diagnostics().unwrap().exchange_count, 25);
    assert_eq!(reader.load().state, InterlockState::Idle);

    runner.shutdown().unwrap();
}

#[test]
fn cleared_running_flag_runs_no_ticks() {
    let mut runner = runner(QUICK_GATES).with_max_ticks(Some(10));
    let stats = runner.run(&AtomicBool::new(false)).unwrap();
    assert_eq!(stats.tick_count, 0);
}

#[test]
fn missing_io_map_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let sally_path = dir.path().join("sally.toml");
    fs::write(&sally_path, sally_toml("")).unwrap();

    match load_config(&sally_path) {
        Err(ConfigError::FileNotFound(path)) => assert!(path.ends_with("io.toml")),
        other => panic!("expected FileNotFound, got {other:?}"),
    }
}

#[test]
fn unknown_driver_is_rejected() {
    let doc = sally_toml("").replace("driver = \"simulation\"", "driver = \"ethercat\"");
    let loaded = load_config_from_strings(&doc, IO_TOML).unwrap();
    let (publisher, _reader) = status_channel();
    assert!(TickRunner::from_config(loaded, &DriverRegistry::with_builtin(), publisher).is_err());
}

#[test]
fn shipped_config_loads() {
    let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../config/sally.toml"));
    let loaded = load_config(path).unwrap();
    assert_eq!(loaded.config.shared.service_name, "sally-port");
    assert_eq!(loaded.config.timing.open_timeout_ticks, 50);
    assert_eq!(loaded.config.timing.close_timeout_ticks, 1200);

    let (publisher, _reader) = status_channel();
    let mut runner =
        TickRunner::from_config(loaded, &DriverRegistry::with_builtin(), publisher).unwrap();
    let visited = drive(&mut runner, 30);
    assert!(visited.contains(&InterlockState::InboundFirstWaiting));
}
