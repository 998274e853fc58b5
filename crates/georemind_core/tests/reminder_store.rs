use georemind_core::{
    FixtureReminderStore, Reminder, ReminderStore, SqliteReminderStore, StoreError,
};
use std::collections::HashSet;
use std::sync::Arc;

fn library() -> Reminder {
    Reminder::new(
        "Library Visit",
        "Borrow some books",
        "Central Library",
        6.55555,
        7.56565,
    )
}

fn grocery() -> Reminder {
    Reminder::new(
        "Grocery Shopping",
        "Buy fruits and vegetables",
        "Market Street",
        6.61234,
        7.43210,
    )
}

fn dinner() -> Reminder {
    Reminder::new(
        "Dinner with Friends",
        "Meet at the restaurant",
        "Downtown Plaza",
        6.74123,
        7.89123,
    )
}

fn sqlite_store() -> SqliteReminderStore {
    SqliteReminderStore::open_in_memory().unwrap()
}

fn check_found_after_saved(store: &dyn ReminderStore) {
    let reminders = [library(), grocery(), dinner()];
    for reminder in &reminders {
        store.save_reminder(reminder).unwrap();
    }

    for reminder in &reminders {
        let loaded = store.get_reminder(&reminder.id).unwrap();
        assert_eq!(loaded.id, reminder.id);
        assert_eq!(loaded.title, reminder.title);
        assert_eq!(loaded.description, reminder.description);
        assert_eq!(loaded.location_name, reminder.location_name);
        assert_eq!(loaded.latitude, reminder.latitude);
        assert_eq!(loaded.longitude, reminder.longitude);
    }
}

fn check_upsert_keeps_last_write(store: &dyn ReminderStore) {
    let mut reminder = library();
    store.save_reminder(&reminder).unwrap();

    reminder.title = Some("Return books".to_string());
    reminder.latitude = Some(10.0);
    reminder.longitude = Some(20.0);
    store.save_reminder(&reminder).unwrap();
    store.save_reminder(&reminder).unwrap();

    assert_eq!(store.get_reminder(&reminder.id).unwrap(), reminder);
    assert_eq!(store.get_reminders().unwrap().len(), 1);
}

fn check_bulk_clear(store: &dyn ReminderStore) {
    store.delete_all_reminders().unwrap();
    assert!(store.get_reminders().unwrap().is_empty());

    for reminder in [library(), grocery(), dinner()] {
        store.save_reminder(&reminder).unwrap();
    }
    store.delete_all_reminders().unwrap();

    assert!(store.get_reminders().unwrap().is_empty());
}

fn check_not_found_is_error(store: &dyn ReminderStore) {
    store.save_reminder(&library()).unwrap();

    let err = store.get_reminder("nonexistent").unwrap_err();
    assert!(matches!(err, StoreError::NotFound(ref id) if id == "nonexistent"));
    assert!(err.message().contains("Reminder not found"));
}

fn check_list_returns_every_record(store: &dyn ReminderStore) {
    let reminders = [library(), grocery(), dinner()];
    for reminder in &reminders {
        store.save_reminder(reminder).unwrap();
    }

    let listed: HashSet<String> = store
        .get_reminders()
        .unwrap()
        .into_iter()
        .map(|reminder| reminder.id)
        .collect();
    let expected: HashSet<String> = reminders.iter().map(|r| r.id.clone()).collect();
    assert_eq!(listed, expected);
}

fn check_same_write_rule_for_every_store(store: &dyn ReminderStore) {
    let mut latitude_only = Reminder::with_id("lat_only");
    latitude_only.latitude = Some(6.5);
    let mut out_of_range = Reminder::with_id("far");
    out_of_range.latitude = Some(95.0);
    out_of_range.longitude = Some(7.0);

    store.save_reminder(&latitude_only).unwrap();
    store.save_reminder(&out_of_range).unwrap();
    assert_eq!(store.get_reminder("lat_only").unwrap(), latitude_only);
    assert_eq!(store.get_reminder("far").unwrap(), out_of_range);

    let err = store.save_reminder(&Reminder::with_id("  ")).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(err.error_code(), "reminder_invalid");
    assert_eq!(store.get_reminders().unwrap().len(), 2);
}

#[test]
fn sqlite_found_after_saved() {
    check_found_after_saved(&sqlite_store());
}

#[test]
fn fixture_found_after_saved() {
    check_found_after_saved(&FixtureReminderStore::new());
}

#[test]
fn sqlite_upsert_keeps_last_write() {
    check_upsert_keeps_last_write(&sqlite_store());
}

#[test]
fn fixture_upsert_keeps_last_write() {
    check_upsert_keeps_last_write(&FixtureReminderStore::new());
}

#[test]
fn sqlite_bulk_clear() {
    check_bulk_clear(&sqlite_store());
}

#[test]
fn fixture_bulk_clear() {
    check_bulk_clear(&FixtureReminderStore::new());
}

#[test]
fn sqlite_not_found_is_error() {
    check_not_found_is_error(&sqlite_store());
}

#[test]
fn fixture_not_found_is_error() {
    check_not_found_is_error(&FixtureReminderStore::new());
}

#[test]
fn sqlite_list_returns_every_record() {
    check_list_returns_every_record(&sqlite_store());
}

#[test]
fn fixture_list_returns_every_record() {
    check_list_returns_every_record(&FixtureReminderStore::new());
}

#[test]
fn sqlite_same_write_rule_for_every_store() {
    check_same_write_rule_for_every_store(&sqlite_store());
}

#[test]
fn fixture_same_write_rule_for_every_store() {
    check_same_write_rule_for_every_store(&FixtureReminderStore::new());
}

#[test]
fn sqlite_keeps_reminders_without_text_or_coordinates() {
    let store = sqlite_store();
    let bare = Reminder::with_id("bare");
    store.save_reminder(&bare).unwrap();

    assert_eq!(store.get_reminder("bare").unwrap(), bare);
}

#[test]
fn fixture_error_mode_short_circuits_every_lookup() {
    let present = library();
    let store = FixtureReminderStore::with_reminders(Some(vec![present.clone()]));
    store.set_return_error(true);

    for id in [present.id.as_str(), "missing"] {
        assert!(matches!(
            store.get_reminder(id),
            Err(StoreError::Injected(_))
        ));
    }
    assert!(store.get_reminders().is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_saves_and_lookups_do_not_cross_contaminate() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteReminderStore::open(dir.path().join("concurrent.db")).unwrap());

    let mut first = Reminder::with_id("id1");
    first.title = Some("X".to_string());
    let mut second = Reminder::with_id("id2");
    second.title = Some("Y".to_string());

    let saves: Vec<_> = [first.clone(), second.clone()]
        .into_iter()
        .map(|reminder| {
            let store = Arc::clone(&store);
            tokio::task::spawn_blocking(move || store.save_reminder(&reminder))
        })
        .collect();
    for save in saves {
        save.await.unwrap().unwrap();
    }

    for _ in 0..20 {
        let lookups: Vec<_> = ["id2", "id1"]
            .into_iter()
            .map(|id| {
                let store = Arc::clone(&store);
                tokio::task::spawn_blocking(move || (id, store.get_reminder(id)))
            })
            .collect();
        for lookup in lookups {
            let (id, result) = lookup.await.unwrap();
            let reminder = result.unwrap();
            assert_eq!(reminder.id, id);
            let expected = if id == "id1" { &first } else { &second };
            assert_eq!(&reminder, expected);
        }
    }
}
