//! ---
//! ers_section: "11-simulation"
//! ers_subsection: "tests"
//! ers_type: "source"
//! ers_scope: "test"
//! ers_description: "Scenario-level behaviour of the simulation clock."
//! ers_version: "v0.1.0"
//! ers_owner: "tbd"
//! ---
use ers_sim::{
    Feed, PhysicalModel, SimulationClock, SimulationSnapshot, TickOutcome, DELAY_STEPS, MAX_STEPS,
    MAX_TIME,
};

fn playing_clock() -> SimulationClock {
    let mut clock = SimulationClock::new();
    clock.play();
    clock
}

fn advance(clock: &mut SimulationClock, ticks: u32) -> Vec<SimulationSnapshot> {
    (0..ticks)
        .map(|_| {
            clock.tick();
            clock.snapshot()
        })
        .collect()
}

#[test]
fn delayed_input_at_tick_100_is_the_reset_value() {
    let mut clock = playing_clock();
    advance(&mut clock, DELAY_STEPS as u32);
    assert_eq!(clock.snapshot().time, 10.0);
    assert_eq!(clock.last_delayed().pressure_bar, 100.0);
    assert_eq!(clock.last_delayed().temperature_c, 110.0);
}

#[test]
fn bridge_input_trails_truth_by_ten_seconds() {
    let mut clock = playing_clock();
    advance(&mut clock, 250);
    let expected = PhysicalModel::evaluate(15.0);
    assert!((clock.last_delayed().pressure_bar - expected.pressure_bar).abs() < 1e-9);
    assert!((clock.last_delayed().temperature_c - expected.temperature_c).abs() < 1e-9);
}

#[test]
fn engine_feed_mirrors_truth_and_bridge_passes_consumption() {
    let mut clock = playing_clock();
    for snapshot in advance(&mut clock, 400) {
        assert_eq!(snapshot.engine_values, snapshot.true_values);
        assert_eq!(
            snapshot.bridge_values.consumption_lpm,
            snapshot.true_values.consumption_lpm
        );
    }
}

#[test]
fn bridge_values_stay_within_observed_range() {
    let mut clock = playing_clock();
    for snapshot in advance(&mut clock, MAX_STEPS - 1) {
        let p = snapshot.bridge_values.pressure_bar;
        let t = snapshot.bridge_values.temperature_c;
        assert!((100.0 - 1e-9..=140.0 + 1e-9).contains(&p), "pressure {p}");
        assert!((110.0 - 1e-9..=130.0 + 1e-9).contains(&t), "temperature {t}");
        assert!(p <= snapshot.true_values.pressure_bar + 1e-9);
    }
}

#[test]
fn alarms_at_fifteen_and_twenty_five_seconds() {
    let mut clock = playing_clock();
    advance(&mut clock, 150);
    let at_15 = clock.snapshot();
    assert!((at_15.true_values.pressure_bar - 110.0).abs() < 1e-9);
    assert!(!at_15.engine_alarm);
    assert!(!at_15.bridge_alarm);

    advance(&mut clock, 100);
    let at_25 = clock.snapshot();
    assert!((at_25.true_values.pressure_bar - 130.0).abs() < 1e-9);
    assert!(at_25.engine_alarm);
    assert!(!at_25.bridge_alarm);
}

#[test]
fn bridge_alarm_is_gated_even_when_filtered_pressure_is_high() {
    let mut clock = playing_clock();
    let history = advance(&mut clock, 351);
    for snapshot in history.iter().filter(|s| s.time <= 35.0) {
        assert!(!snapshot.bridge_alarm, "bridge alarm at {}", snapshot.time);
    }
    let at_35 = &history[349];
    assert_eq!(at_35.time, 35.0);
    assert!(at_35.bridge_values.pressure_bar > 120.0);
    assert!(history[350].bridge_alarm);
}

#[test]
fn engine_alarm_has_no_gate() {
    let mut clock = playing_clock();
    for snapshot in advance(&mut clock, 300) {
        assert_eq!(
            snapshot.engine_alarm,
            snapshot.true_values.pressure_bar > 120.0
        );
    }
}

#[test]
fn onsets_record_the_manipulation_lag() {
    let mut clock = playing_clock();
    let mut raised = Vec::new();
    loop {
        match clock.tick() {
            TickOutcome::Advanced { transitions } => raised.extend(transitions),
            TickOutcome::Finished | TickOutcome::Idle => break,
        }
    }
    let onsets = clock.alarm_onsets();
    let engine = onsets.engine.expect("engine alarm raised");
    let bridge = onsets.bridge.expect("bridge alarm raised");
    assert!((engine - 20.1).abs() < 1e-9);
    assert!((bridge - 35.1).abs() < 1e-9);
    assert!((onsets.bridge_lag().unwrap() - 15.0).abs() < 1e-9);

    assert_eq!(raised.len(), 2);
    assert_eq!(raised[0].feed, Feed::Engine);
    assert!(raised[0].raised);
    assert_eq!(raised[1].feed, Feed::Bridge);
}

#[test]
fn reset_twice_matches_reset_once() {
    let mut once = playing_clock();
    advance(&mut once, 321);
    once.reset();

    let mut twice = playing_clock();
    advance(&mut twice, 321);
    twice.reset();
    twice.reset();

    assert_eq!(once.snapshot(), twice.snapshot());
    assert_eq!(once.snapshot(), SimulationSnapshot::initial());
    assert_eq!(once.filter(), twice.filter());
    assert!(!twice.is_running());
    assert_eq!(twice.alarm_onsets().engine, None);
}

#[test]
fn reset_replays_identically() {
    let mut clock = playing_clock();
    let first = advance(&mut clock, 400);
    clock.reset();
    clock.play();
    let second = advance(&mut clock, 400);
    assert_eq!(first, second);
}

#[test]
fn auto_stop_clamps_to_max_time() {
    let mut clock = playing_clock();
    advance(&mut clock, MAX_STEPS - 1);
    let last_computed = clock.snapshot();
    assert!(last_computed.time < MAX_TIME);

    assert!(matches!(clock.tick(), TickOutcome::Finished));
    let clamped = clock.snapshot();
    assert_eq!(clamped.time, MAX_TIME);
    assert!(!clock.is_running());
    assert_eq!(clamped.true_values, last_computed.true_values);
    assert_eq!(clamped.bridge_values, last_computed.bridge_values);

    advance(&mut clock, 10);
    assert_eq!(clock.snapshot(), clamped);
}

#[test]
fn playing_after_the_end_stops_again_without_moving() {
    let mut clock = playing_clock();
    advance(&mut clock, MAX_STEPS);
    let clamped = clock.snapshot();
    clock.play();
    assert!(matches!(clock.tick(), TickOutcome::Finished));
    assert_eq!(clock.snapshot(), clamped);
    assert!(!clock.is_running());
}
