use chrono::NaiveTime;
use nightcharge::charger::{
    ChargeWindow, ChargerState, ChargerStateMachine, NoticeLevel, OperatorIntent,
};
use nightcharge::controls::{StartRequest, control_panel, start_request, status_banner};

fn intent(plugged_in: bool, at_home: bool) -> OperatorIntent {
    OperatorIntent::new(plugged_in, at_home, NaiveTime::from_hms_opt(12, 0, 0).unwrap())
}

fn boosting() -> ChargerState {
    let mut machine = ChargerStateMachine::default();
    machine.start_charge(true, true, &intent(true, true)).unwrap();
    machine.state()
}

fn scheduled() -> ChargerState {
    let mut machine = ChargerStateMachine::default();
    machine.evaluate(&OperatorIntent::new(
        true,
        true,
        NaiveTime::from_hms_opt(2, 30, 0).unwrap(),
    ))
}

#[test]
fn unplugged_disables_both_buttons() {
    for state in [ChargerState::default(), boosting()] {
        let panel = control_panel(&intent(false, true), &state);
        assert_eq!(panel.start.label, "Start Charge (Car not plugged in)");
        assert_eq!(panel.stop.label, "Stop Charge (Car not plugged in)");
        assert!(!panel.start.enabled);
        assert!(!panel.stop.enabled);
    }
}

#[test]
fn away_offers_boost_only_when_idle() {
    let idle = control_panel(&intent(true, false), &ChargerState::default());
    assert_eq!(idle.start.label, "Start Charge: Boost (Away)");
    assert!(idle.start.enabled);
    assert!(!idle.stop.enabled);

    let charging = control_panel(&intent(true, false), &boosting());
    assert!(!charging.start.enabled);
    assert_eq!(charging.stop.label, "Stop Charge");
    assert!(charging.stop.enabled);
}

#[test]
fn home_panel_follows_charger_mode() {
    let boost = control_panel(&intent(true, true), &boosting());
    assert_eq!(boost.start.label, "Start Charge: Boost");
    assert!(!boost.start.enabled);
    assert_eq!(boost.stop.label, "Stop Charge (Boost Mode)");
    assert!(boost.stop.enabled);

    let sched = control_panel(&intent(true, true), &scheduled());
    assert_eq!(sched.start.label, "Scheduled Charging Active");
    assert!(!sched.start.enabled);
    assert_eq!(sched.stop.label, "Stop Charging");
    assert!(sched.stop.enabled);

    let idle = control_panel(&intent(true, true), &ChargerState::default());
    assert_eq!(idle.start.label, "Start Charge: Boost");
    assert!(idle.start.enabled);
    assert_eq!(idle.stop.label, "Stop Charge");
    assert!(!idle.stop.enabled);
}

#[test]
fn banner_reflects_location_and_cancellation() {
    let window = ChargeWindow::default();

    let active = status_banner(true, &ChargerState::default(), &window);
    assert_eq!(active.level, NoticeLevel::Success);
    assert_eq!(
        active.message,
        "Car is at home - charging schedule active (2am to 5am)"
    );

    let canceled = ChargerState {
        schedule_canceled_today: true,
        ..Default::default()
    };
    let resumed = status_banner(true, &canceled, &window);
    assert!(resumed.message.contains("resume tomorrow"));

    let away = status_banner(false, &canceled, &window);
    assert_eq!(away.level, NoticeLevel::Warning);
    assert_eq!(away.message, "Car is away - charging schedule disabled");
}

#[test]
fn start_press_maps_to_boost_command() {
    assert_eq!(
        start_request(&intent(true, true), &ChargerState::default()),
        Some(StartRequest {
            override_schedule: true,
            boost: true
        })
    );
    assert_eq!(
        start_request(&intent(true, false), &ChargerState::default()),
        Some(StartRequest {
            override_schedule: false,
            boost: true
        })
    );
    assert_eq!(start_request(&intent(true, true), &scheduled()), None);
}
