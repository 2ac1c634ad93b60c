use chrono::NaiveTime;
use nightcharge::charger::{ChargerMode, ChargerStateMachine, OperatorIntent};
use nightcharge::estimator::estimate_charge_levels;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn home(now: NaiveTime) -> OperatorIntent {
    OperatorIntent::new(true, true, now)
}

fn mode_at(slots: &[nightcharge::timeline::ProjectedState], time: NaiveTime) -> ChargerMode {
    slots
        .iter()
        .find(|s| s.time == time)
        .map(|s| s.mode())
        .unwrap()
}

#[test]
fn axis_runs_from_five_to_five() {
    let machine = ChargerStateMachine::default();
    let slots = machine.project(&home(t(12, 0)));
    assert_eq!(slots.len(), 49);
    assert_eq!(slots[0].time, t(5, 0));
    assert_eq!(slots[48].time, t(5, 0));
    assert_eq!(slots[48].offset_minutes, 1440);
}

#[test]
fn idle_machine_projects_the_window() {
    let machine = ChargerStateMachine::default();
    let slots = machine.project(&home(t(12, 0)));
    let charging: Vec<NaiveTime> = slots
        .iter()
        .filter(|s| s.is_charging)
        .map(|s| s.time)
        .collect();
    assert_eq!(
        charging,
        vec![t(2, 0), t(2, 30), t(3, 0), t(3, 30), t(4, 0), t(4, 30)]
    );
}

#[test]
fn boost_covers_sixty_minutes_from_now() {
    let mut machine = ChargerStateMachine::default();
    machine.start_charge(true, true, &home(t(10, 0))).unwrap();
    let slots = machine.project(&home(t(10, 0)));

    assert_eq!(mode_at(&slots, t(10, 0)), ChargerMode::BoostCharging);
    assert_eq!(mode_at(&slots, t(10, 30)), ChargerMode::BoostCharging);
    assert_eq!(mode_at(&slots, t(11, 0)), ChargerMode::Idle);
    assert_eq!(mode_at(&slots, t(2, 0)), ChargerMode::ScheduledCharging);
}

#[test]
fn canceled_schedule_blanks_the_window() {
    let mut machine = ChargerStateMachine::default();
    machine.evaluate(&home(t(2, 0)));
    machine.stop_charge().unwrap();

    let slots = machine.project(&home(t(2, 30)));
    assert!(slots.iter().all(|s| !s.is_charging));
}

#[test]
fn away_projects_no_scheduled_charging() {
    let machine = ChargerStateMachine::default();
    let slots = machine.project(&OperatorIntent::new(true, false, t(12, 0)));
    assert!(slots.iter().all(|s| !s.is_charging));
}

#[test]
fn projection_does_not_touch_live_state() {
    let mut machine = ChargerStateMachine::default();
    machine.start_charge(true, true, &home(t(10, 0))).unwrap();
    let before = machine.state();
    let _ = machine.project(&home(t(10, 0)));
    assert_eq!(machine.state(), before);
}

#[test]
fn charge_levels_start_at_baseline_and_stay_bounded() {
    let mut machine = ChargerStateMachine::default();
    machine.start_charge(true, true, &home(t(5, 0))).unwrap();
    let slots = machine.project(&home(t(5, 0)));
    let levels = estimate_charge_levels(&slots, &machine.settings().charge_level);

    assert_eq!(levels.len(), slots.len());
    assert_eq!(levels[0].state_of_charge, 60);
    assert!(
        levels
            .windows(2)
            .all(|w| w[0].state_of_charge <= w[1].state_of_charge)
    );
    assert!(levels.iter().all(|l| (60..=100).contains(&l.state_of_charge)));
    // Two boost slots plus six window slots
    assert_eq!(levels[48].state_of_charge, 100);
}
