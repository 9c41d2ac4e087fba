use std::fs;
use tempfile::TempDir;
use tripsplit_application::{RepositoryError, Theme, TripRepository, TripService, TripState};
use tripsplit_domain::{Money, SplitPolicy};
use tripsplit_infrastructure::JsonFileTripRepository;

fn store_in(dir: &TempDir) -> JsonFileTripRepository {
    JsonFileTripRepository::new(dir.path().join("nested").join("trip.json"))
}

#[test]
fn missing_file_loads_as_empty() {
    let dir = TempDir::new().expect("tempdir");

    let loaded = store_in(&dir).load().expect("load");

    assert_eq!(loaded, None);
}

#[test]
fn service_state_survives_a_restart() {
    let dir = TempDir::new().expect("tempdir");

    let mut service = TripService::load(store_in(&dir)).expect("load");
    let a = service.add_member("A").expect("add A");
    service.add_member("B").expect("add B");
    service.add_member("C").expect("add C");
    service
        .add_expense(a.id(), Money::new(10_000, 2), SplitPolicy::Equal)
        .expect("expense");
    service.toggle_theme().expect("theme");
    let expected = service.settle().expect("settle");

    let restarted = TripService::load(store_in(&dir)).expect("reload");

    assert_eq!(restarted.state(), service.state());
    assert_eq!(restarted.theme(), Theme::Dark);
    assert_eq!(restarted.settle().expect("settle"), expected);
    assert!(!dir.path().join("nested").join("trip.json.tmp").exists());
}

#[test]
fn amounts_are_stored_as_strings() {
    let dir = TempDir::new().expect("tempdir");
    let repository = store_in(&dir);
    let mut service = TripService::load(&repository).expect("load");
    let a = service.add_member("A").expect("add A");
    service
        .add_expense(a.id(), Money::new(1234, 2), SplitPolicy::Equal)
        .expect("expense");

    let json = fs::read_to_string(repository.path()).expect("read");

    assert!(json.contains("\"12.34\""), "{json}");
    assert!(json.contains("\"version\": 1"), "{json}");
}

#[test]
fn malformed_file_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    let repository = store_in(&dir);
    fs::create_dir_all(dir.path().join("nested")).expect("mkdir");
    fs::write(repository.path(), "{ not json").expect("write");

    let result = repository.load();

    assert!(matches!(result, Err(RepositoryError::Serialization(_))));
}

#[test]
fn invalid_expense_in_file_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    let repository = store_in(&dir);
    fs::create_dir_all(dir.path().join("nested")).expect("mkdir");
    let json = r#"{
        "version": 1,
        "current": {
            "id": 1,
            "participants": [{ "id": 2, "name": "A" }],
            "expenses": [{ "id": 3, "payer": 2, "amount": "10", "allocations": { "2": "4" } }]
        },
        "next_id": 4
    }"#;
    fs::write(repository.path(), json).expect("write");

    let result = repository.load();

    assert!(matches!(result, Err(RepositoryError::Serialization(_))));
}

#[test]
fn saved_state_reads_back() {
    let dir = TempDir::new().expect("tempdir");
    let repository = store_in(&dir);
    let state = TripState::new();

    repository.save(&state).expect("save");

    assert_eq!(repository.load().expect("load"), Some(state));
}
