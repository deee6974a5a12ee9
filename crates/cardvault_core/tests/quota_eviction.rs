use cardvault_core::{CardRepository, ImportedCard, MemoryStore, RepoError};
use chrono::{Duration, Utc};

fn aged_draft(name: &str, image_data: &str, age_days: i64) -> ImportedCard {
    ImportedCard {
        name: Some(name.to_string()),
        image_data: Some(image_data.to_string()),
        created_at: Some(Utc::now() - Duration::days(age_days)),
        ..ImportedCard::default()
    }
}

#[test]
fn evict_stale_removes_only_records_older_than_cutoff() {
    let mut repo = CardRepository::new(MemoryStore::new());
    repo.import_cards(vec![
        aged_draft("Old", "data:AAA", 400),
        aged_draft("Recent", "data:BBB", 10),
    ])
    .unwrap();
    repo.create("Fresh", "data:CCC").unwrap();

    let evicted = repo.evict_stale(Duration::days(365));
    assert_eq!(evicted, 1);

    let names: Vec<_> = repo
        .read_all()
        .unwrap()
        .into_iter()
        .map(|card| card.name)
        .collect();
    assert_eq!(names, vec!["Recent", "Fresh"]);
}

#[test]
fn evict_stale_is_a_no_op_when_everything_is_young_enough() {
    let mut repo = CardRepository::new(MemoryStore::new());
    repo.import_cards(vec![aged_draft("Recent", "data:AAA", 10)])
        .unwrap();
    repo.create("Fresh", "data:BBB").unwrap();

    assert_eq!(repo.evict_stale(Duration::days(30)), 0);
    assert_eq!(repo.read_all().unwrap().len(), 2);

    // Repeated eviction never increases the collection.
    assert_eq!(repo.evict_stale(Duration::days(30)), 0);
    assert_eq!(repo.read_all().unwrap().len(), 2);
}

#[test]
fn evict_stale_on_empty_store_does_nothing() {
    let mut repo = CardRepository::new(MemoryStore::new());
    assert_eq!(repo.evict_stale(Duration::days(365)), 0);
    assert!(repo.read_all().unwrap().is_empty());
}

#[test]
fn full_store_evicts_stale_records_but_still_reports_storage_full() {
    // Capacity sized so one large card fits but two do not.
    let mut repo = CardRepository::new(MemoryStore::with_capacity(2000));
    let payload = format!("data:image/png;base64,{}", "x".repeat(1200));

    repo.import_cards(vec![aged_draft("Old", &payload, 400)])
        .unwrap();

    // The write is rejected, one eviction pass runs, and the error is
    // surfaced anyway so eviction-induced data loss stays visible.
    let err = repo.create("Fresh", &payload).unwrap_err();
    assert!(matches!(err, RepoError::StorageFull));
    assert!(repo.read_all().unwrap().is_empty());

    // The caller-decided retry now succeeds in the freed space.
    let card = repo.create("Fresh", &payload).unwrap();
    let names: Vec<_> = repo
        .read_all()
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Fresh"]);
    assert_eq!(card.name, "Fresh");
}

#[test]
fn full_store_with_nothing_stale_keeps_collection_intact() {
    let mut repo = CardRepository::new(MemoryStore::with_capacity(2000));
    let payload = format!("data:image/png;base64,{}", "x".repeat(1200));

    repo.import_cards(vec![aged_draft("Recent", &payload, 10)])
        .unwrap();

    let err = repo.create("Fresh", &payload).unwrap_err();
    assert!(matches!(err, RepoError::StorageFull));

    // Nothing was old enough to evict, so the stored card survives.
    let names: Vec<_> = repo
        .read_all()
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Recent"]);
}
