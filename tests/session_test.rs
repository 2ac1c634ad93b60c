use chrono::NaiveTime;
use nightcharge::charger::{ChargerSettings, OperatorIntent};
use nightcharge::error::NightchargeError;
use nightcharge::session::SessionRegistry;

fn at(h: u32, m: u32) -> OperatorIntent {
    OperatorIntent::new(true, true, NaiveTime::from_hms_opt(h, m, 0).unwrap())
}

#[test]
fn sessions_do_not_share_state() {
    let mut registry = SessionRegistry::default();
    let a = registry.create();
    let b = registry.create();
    assert_ne!(a, b);

    registry
        .machine_mut(&a)
        .unwrap()
        .start_charge(true, true, &at(10, 0))
        .unwrap();

    assert!(registry.get(&a).unwrap().machine().state().is_boost);
    assert!(!registry.get(&b).unwrap().machine().state().is_charging);
}

#[test]
fn unknown_session_is_reported() {
    let mut registry = SessionRegistry::default();
    assert!(matches!(
        registry.machine_mut("missing"),
        Err(NightchargeError::SessionNotFound { .. })
    ));
    assert!(registry.remove("missing").is_err());
}

#[test]
fn remove_drops_session() {
    let mut registry = SessionRegistry::default();
    let id = registry.create();
    assert_eq!(registry.len(), 1);
    registry.remove(&id).unwrap();
    assert!(registry.is_empty());
    assert!(registry.get(&id).is_err());
}

#[test]
fn full_registry_evicts_least_recently_used() {
    let mut registry = SessionRegistry::new(ChargerSettings::default(), 2);
    let first = registry.create();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = registry.create();
    std::thread::sleep(std::time::Duration::from_millis(5));

    // Touch the older session so the newer one becomes least recent
    registry.machine_mut(&first).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));

    let third = registry.create();
    assert_eq!(registry.len(), 2);
    assert!(registry.get(&first).is_ok());
    assert!(registry.get(&second).is_err());
    assert!(registry.get(&third).is_ok());
}

#[test]
fn summaries_list_oldest_first() {
    let mut registry = SessionRegistry::default();
    let first = registry.create();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = registry.create();

    let ids: Vec<String> = registry.summaries().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![first, second]);
}
